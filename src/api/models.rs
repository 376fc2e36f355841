use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::session::Role;

/// Used when the backend omits a question's time limit or sends zero.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 60;

pub const MAX_QUESTIONS_PER_INTERVIEW: u32 = 10;
pub const DEFAULT_QUESTIONS_PER_INTERVIEW: u32 = 5;

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
}

#[derive(Serialize, Debug)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Validate, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "a valid email address is required"))]
    pub email: String,
    #[validate(custom = "not_blank")]
    pub password: String,
    #[validate(custom = "not_blank")]
    pub first_name: String,
    #[validate(custom = "not_blank")]
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[validate(custom = "not_blank")]
    pub target_role: String,
}

// ---------------------------------------------------------------------------
// Interviews
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewStatus {
    NotStarted,
    InProgress,
    Completed,
    Paused,
    Abandoned,
}

impl InterviewStatus {
    pub fn label(self) -> &'static str {
        match self {
            InterviewStatus::NotStarted => "NOT_STARTED",
            InterviewStatus::InProgress => "IN_PROGRESS",
            InterviewStatus::Completed => "COMPLETED",
            InterviewStatus::Paused => "PAUSED",
            InterviewStatus::Abandoned => "ABANDONED",
        }
    }

    /// Whether the dashboard offers to continue this interview.
    pub fn is_resumable(self) -> bool {
        matches!(self, InterviewStatus::InProgress | InterviewStatus::NotStarted)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: i64,
    pub job_role: String,
    pub domain: String,
    pub status: InterviewStatus,
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub questions_answered: Option<u32>,
    #[serde(default)]
    pub overall_score: Option<f64>,
}

impl Interview {
    pub fn is_completed(&self) -> bool {
        self.status == InterviewStatus::Completed
    }

    pub fn answered(&self) -> u32 {
        self.questions_answered.unwrap_or(0)
    }

    pub fn score_label(&self) -> String {
        format!("{:.1}/100", self.overall_score.unwrap_or(0.0))
    }
}

#[derive(Serialize, Validate, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewRequest {
    #[validate(custom = "not_blank")]
    pub job_role: String,
    #[validate(custom = "not_blank")]
    pub domain: String,
    #[validate(range(min = 1, max = 10, message = "between 1 and 10 questions"))]
    pub number_of_questions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_content: Option<String>,
}

impl StartInterviewRequest {
    pub fn new(job_role: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            job_role: job_role.into(),
            domain: domain.into(),
            number_of_questions: DEFAULT_QUESTIONS_PER_INTERVIEW,
            resume_content: None,
        }
    }

    pub fn with_questions(mut self, count: u32) -> Self {
        self.number_of_questions = count;
        self
    }

    pub fn with_resume(mut self, resume: impl Into<String>) -> Self {
        self.resume_content = Some(resume.into());
        self
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitAnswerRequest<'a> {
    pub question_id: i64,
    pub answer_text: &'a str,
    pub time_taken_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_audio: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionType {
    Technical,
    Behavioral,
    Coding,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Technical => "TECHNICAL",
            QuestionType::Behavioral => "BEHAVIORAL",
            QuestionType::Coding => "CODING",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TECHNICAL" => Ok(QuestionType::Technical),
            "BEHAVIORAL" | "BEHAVIOURAL" => Ok(QuestionType::Behavioral),
            "CODING" => Ok(QuestionType::Coding),
            other => Err(format!(
                "unknown question type '{}', expected technical, behavioral or coding",
                other
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "type", default)]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub expected_answer: Option<String>,
    #[serde(default)]
    pub hints: Option<String>,
    #[serde(default)]
    pub difficulty: Option<u8>,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
}

impl Question {
    pub fn time_limit_or(&self, fallback: u32) -> u32 {
        match self.time_limit_seconds {
            Some(limit) if limit > 0 => limit,
            _ => fallback,
        }
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit_or(DEFAULT_TIME_LIMIT_SECS)
    }

    pub fn hint(&self) -> Option<&str> {
        self.hints
            .as_deref()
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
    }
}

/// Body for admin create/update.
#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(rename = "question")]
    #[validate(custom = "not_blank")]
    pub prompt: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[validate(custom = "not_blank")]
    pub domain: String,
    #[validate(custom = "not_blank")]
    pub job_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<String>,
    #[validate(range(min = 1, max = 5, message = "difficulty must be between 1 and 5"))]
    pub difficulty: u8,
    #[validate(range(min = 1, message = "time limit must be at least one second"))]
    pub time_limit_seconds: u32,
}

impl QuestionDraft {
    pub fn new(
        prompt: impl Into<String>,
        question_type: QuestionType,
        domain: impl Into<String>,
        job_role: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            question_type,
            domain: domain.into(),
            job_role: job_role.into(),
            expected_answer: None,
            hints: None,
            difficulty: 1,
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub job_role: String,
    pub domain: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Analytics {
    pub total_interviews: u32,
    pub completed_interviews: u32,
    pub average_score: f64,
    pub best_score: f64,
    pub worst_score: f64,
    pub topic_strengths: String,
    pub topic_weaknesses: String,
    pub last_interview_date: Option<NaiveDateTime>,
    pub interview_history: Vec<HistoryEntry>,
    pub domain_performance: BTreeMap<String, f64>,
}

impl Analytics {
    pub fn completion_rate(&self) -> f64 {
        if self.total_interviews == 0 {
            return 0.0;
        }
        f64::from(self.completed_interviews) / f64::from(self.total_interviews) * 100.0
    }
}

/// Quick stats shown on top of the dashboard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

impl DashboardSummary {
    pub fn from_interviews(interviews: &[Interview]) -> Self {
        Self {
            total: interviews.len(),
            completed: interviews
                .iter()
                .filter(|i| i.status == InterviewStatus::Completed)
                .count(),
            in_progress: interviews
                .iter()
                .filter(|i| i.status == InterviewStatus::InProgress)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_question_defaults_time_limit() {
        let mut question: Question = serde_json::from_value(json!({
            "id": 1,
            "question": "What is ownership?",
            "type": "TECHNICAL",
            "difficulty": 2
        }))
        .unwrap();
        assert_eq!(question.time_limit(), 60);

        question.time_limit_seconds = Some(0);
        assert_eq!(question.time_limit(), 60);

        question.time_limit_seconds = Some(90);
        assert_eq!(question.time_limit(), 90);
    }

    #[test]
    fn test_interview_parses_backend_shape() {
        let interview: Interview = serde_json::from_value(json!({
            "id": 42,
            "jobRole": "Backend Engineer",
            "domain": "DSA",
            "status": "IN_PROGRESS",
            "startTime": "2024-03-01T10:15:30.123",
            "endTime": null,
            "totalQuestions": 5,
            "questionsAnswered": 2,
            "overallScore": 0.0,
            "resumeContextUsed": null,
            "questionIds": [3, 1, 4]
        }))
        .unwrap();
        assert_eq!(interview.status, InterviewStatus::InProgress);
        assert_eq!(interview.total_questions, Some(5));
        assert_eq!(interview.answered(), 2);
        assert!(interview.start_time.is_some());
        assert_eq!(interview.score_label(), "0.0/100");
    }

    #[test]
    fn test_register_request_validation() {
        let mut request = RegisterRequest {
            email: "ada@example.com".into(),
            password: "pw".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone_number: None,
            target_role: "Engineer".into(),
        };
        assert!(request.validate().is_ok());

        request.first_name = "  ".into();
        assert!(request.validate().is_err());

        request.first_name = "Ada".into();
        request.email = "not-an-email".into();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_wire_format() {
        let request = RegisterRequest {
            email: "a@b.co".into(),
            password: "pw".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            phone_number: None,
            target_role: "SRE".into(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["firstName"], "A");
        assert_eq!(body["targetRole"], "SRE");
        assert!(body.get("phoneNumber").is_none());
    }

    #[test]
    fn test_start_request_bounds() {
        assert!(StartInterviewRequest::new("SRE", "DSA").validate().is_ok());
        assert!(StartInterviewRequest::new("SRE", "DSA")
            .with_questions(0)
            .validate()
            .is_err());
        assert!(StartInterviewRequest::new("SRE", "DSA")
            .with_questions(11)
            .validate()
            .is_err());
    }

    #[test]
    fn test_question_draft_difficulty_range() {
        let mut draft = QuestionDraft::new("Explain CAP", QuestionType::Technical, "System Design", "SRE");
        assert!(draft.validate().is_ok());
        draft.difficulty = 6;
        assert!(draft.validate().is_err());
        draft.difficulty = 3;
        draft.time_limit_seconds = 0;
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_analytics_tolerates_sparse_payload() {
        let analytics: Analytics = serde_json::from_value(json!({
            "totalInterviews": 4,
            "completedInterviews": 3,
            "averageScore": 71.3,
            "domainPerformance": {"DSA": 80.0, "HR": 62.5},
            "interviewHistory": [
                {"id": 9, "jobRole": "SRE", "domain": "DSA", "score": 80.0, "date": "2024-03-01T10:00:00"}
            ]
        }))
        .unwrap();
        assert_eq!(analytics.completion_rate(), 75.0);
        assert_eq!(analytics.domain_performance.len(), 2);
        assert_eq!(analytics.interview_history[0].id, 9);
        assert_eq!(analytics.topic_strengths, "");
    }

    #[test]
    fn test_question_type_parsing() {
        assert_eq!("coding".parse::<QuestionType>(), Ok(QuestionType::Coding));
        assert!("trivia".parse::<QuestionType>().is_err());
    }
}
