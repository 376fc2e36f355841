use log::info;
use reqwest::Method;
use validator::Validate;

use super::models::{Question, QuestionDraft};
use super::{ApiClient, Result};

impl ApiClient {
    pub async fn create_question(&self, draft: &QuestionDraft) -> Result<Question> {
        draft.validate()?;
        let question: Question = self
            .send_json(Method::POST, "/admin/questions/create", Some(draft))
            .await?;
        info!("➕ Created question {}", question.id);
        Ok(question)
    }

    pub async fn update_question(&self, id: i64, draft: &QuestionDraft) -> Result<Question> {
        draft.validate()?;
        let question: Question = self
            .send_json(
                Method::PUT,
                &format!("/admin/questions/update/{}", id),
                Some(draft),
            )
            .await?;
        info!("✏️ Updated question {}", id);
        Ok(question)
    }

    /// Returns the backend's acknowledgement text.
    pub async fn delete_question(&self, id: i64) -> Result<String> {
        let ack = self
            .send(
                Method::DELETE,
                &format!("/admin/questions/delete/{}", id),
                None::<&()>,
            )
            .await?;
        info!("🗑️ Deleted question {}", id);
        Ok(ack.trim().trim_matches('"').to_string())
    }
}
