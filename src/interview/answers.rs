use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Please provide an answer before submitting")]
    EmptyAnswer,
}

/// One answer, ready to send. Built only through [`AnswerSubmission::new`],
/// so the text is never blank and the time taken stays within the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSubmission {
    question_id: i64,
    answer_text: String,
    time_taken_seconds: u32,
}

impl AnswerSubmission {
    pub fn new(
        question_id: i64,
        answer_text: &str,
        time_limit_seconds: u32,
        remaining_seconds: u32,
    ) -> Result<Self, SubmissionError> {
        if answer_text.trim().is_empty() {
            return Err(SubmissionError::EmptyAnswer);
        }

        let time_taken_seconds = time_limit_seconds
            .saturating_sub(remaining_seconds)
            .min(time_limit_seconds);

        Ok(Self {
            question_id,
            answer_text: answer_text.to_string(),
            time_taken_seconds,
        })
    }

    pub fn question_id(&self) -> i64 {
        self.question_id
    }

    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    pub fn time_taken_seconds(&self) -> u32 {
        self.time_taken_seconds
    }
}
