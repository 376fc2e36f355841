use log::{debug, info};
use reqwest::Method;
use serde::Deserialize;
use validator::Validate;

use super::models::{Interview, Question, StartInterviewRequest, SubmitAnswerRequest};
use super::{ApiClient, ApiError, Result};
use crate::interview::AnswerSubmission;

/// What the backend sends once every question of an interview is answered.
pub const EXHAUSTED_SENTINEL: &str = "All questions completed";

#[derive(Debug, Clone, PartialEq)]
pub enum NextQuestion {
    Question(Question),
    Exhausted,
}

impl NextQuestion {
    /// Reads a next-question body: either a question object or the
    /// exhaustion sentinel, JSON-quoted or bare.
    pub fn parse(body: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Body {
            Question(Question),
            Message(String),
        }

        let trimmed = body.trim();
        let message = match serde_json::from_str::<Body>(trimmed) {
            Ok(Body::Question(question)) => return Ok(NextQuestion::Question(question)),
            Ok(Body::Message(message)) => message,
            Err(_) => trimmed.to_string(),
        };

        if message.trim().eq_ignore_ascii_case(EXHAUSTED_SENTINEL) {
            Ok(NextQuestion::Exhausted)
        } else {
            Err(ApiError::Decode(format!(
                "expected a question or '{}', got: {}",
                EXHAUSTED_SENTINEL, message
            )))
        }
    }
}

impl ApiClient {
    pub async fn start_interview(&self, request: &StartInterviewRequest) -> Result<Interview> {
        request.validate()?;
        let interview: Interview = self
            .send_json(Method::POST, "/interviews/start", Some(request))
            .await?;
        info!(
            "🎬 Started interview {} ({} / {})",
            interview.id, interview.job_role, interview.domain
        );
        Ok(interview)
    }

    pub async fn get_interview(&self, id: i64) -> Result<Interview> {
        self.get(&format!("/interviews/{}", id)).await
    }

    pub async fn next_question(&self, id: i64) -> Result<NextQuestion> {
        let body = self
            .send(Method::GET, &format!("/interviews/{}/next-question", id), None::<&()>)
            .await?;
        let next = NextQuestion::parse(&body)?;
        debug!("❓ Next question for interview {}: {:?}", id, next_question_id(&next));
        Ok(next)
    }

    /// Sends one answer. The response body (the stored answer) is not needed
    /// by the client and is discarded.
    pub async fn submit_answer(&self, id: i64, submission: &AnswerSubmission) -> Result<()> {
        let body = SubmitAnswerRequest {
            question_id: submission.question_id(),
            answer_text: submission.answer_text(),
            time_taken_seconds: submission.time_taken_seconds(),
            answer_audio: None,
        };
        self.send(
            Method::POST,
            &format!("/interviews/{}/submit-answer", id),
            Some(&body),
        )
        .await?;
        info!(
            "📝 Submitted answer to question {} ({}s)",
            submission.question_id(),
            submission.time_taken_seconds()
        );
        Ok(())
    }

    pub async fn complete_interview(&self, id: i64) -> Result<Interview> {
        let interview: Interview = self
            .send_json(Method::POST, &format!("/interviews/{}/complete", id), None::<&()>)
            .await?;
        info!("🏁 Interview {} completed, score {}", id, interview.score_label());
        Ok(interview)
    }

    /// Newest first, as ordered by the backend.
    pub async fn my_interviews(&self) -> Result<Vec<Interview>> {
        self.get("/interviews/my-interviews").await
    }
}

fn next_question_id(next: &NextQuestion) -> Option<i64> {
    match next {
        NextQuestion::Question(q) => Some(q.id),
        NextQuestion::Exhausted => None,
    }
}
