pub mod answers;
pub mod engine;
pub mod questions;
pub mod runner;
pub mod timer;

pub use answers::*;
pub use engine::*;
pub use questions::*;
pub use runner::*;
pub use timer::*;

use std::future::Future;

use crate::api::{ApiClient, ApiError, Interview, NextQuestion};

/// The backend operations an interview needs. [`ApiClient`] is the real
/// implementation; tests script their own.
pub trait InterviewBackend: Send + Sync + 'static {
    fn get_interview(&self, id: i64) -> impl Future<Output = Result<Interview, ApiError>> + Send;

    fn next_question(&self, id: i64) -> impl Future<Output = Result<NextQuestion, ApiError>> + Send;

    fn submit_answer(
        &self,
        id: i64,
        submission: &AnswerSubmission,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn complete_interview(&self, id: i64) -> impl Future<Output = Result<Interview, ApiError>> + Send;
}

impl InterviewBackend for ApiClient {
    fn get_interview(&self, id: i64) -> impl Future<Output = Result<Interview, ApiError>> + Send {
        ApiClient::get_interview(self, id)
    }

    fn next_question(&self, id: i64) -> impl Future<Output = Result<NextQuestion, ApiError>> + Send {
        ApiClient::next_question(self, id)
    }

    fn submit_answer(
        &self,
        id: i64,
        submission: &AnswerSubmission,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        ApiClient::submit_answer(self, id, submission)
    }

    fn complete_interview(&self, id: i64) -> impl Future<Output = Result<Interview, ApiError>> + Send {
        ApiClient::complete_interview(self, id)
    }
}
