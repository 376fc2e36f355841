use log::{debug, info, warn};
use serde::Serialize;

use super::answers::AnswerSubmission;
use super::questions::Progress;
use super::timer::{CountdownTimer, TickOutcome, TimerState};
use crate::api::{ApiError, Interview, NextQuestion, Question, DEFAULT_TIME_LIMIT_SECS};
use crate::router::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Loading,
    QuestionReady,
    Submitting,
    Completing,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user, shown where the action happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Work the controller asks its driver to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchInterview(i64),
    FetchNextQuestion(i64),
    SubmitAnswer(i64, AnswerSubmission),
    CompleteInterview(i64),
    Navigate(Route),
    Notify(Notice),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    AnswerEdited(String),
    SubmitRequested,
    SkipRequested,
    /// One second elapsed; carries the countdown generation it was armed for.
    Tick(u64),
    InterviewLoaded(Result<Interview, ApiError>),
    QuestionFetched(Result<NextQuestion, ApiError>),
    AnswerSubmitted(Result<(), ApiError>),
    InterviewCompleted(Result<Interview, ApiError>),
}

/// The backend round trip currently outstanding, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Interview,
    NextQuestion,
    Submission,
    Completion,
}

/// Snapshot for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewView {
    pub interview_id: i64,
    pub phase: Phase,
    pub job_role: Option<String>,
    pub domain: Option<String>,
    pub progress_label: String,
    pub question: Option<Question>,
    pub answer: String,
    pub timer: TimerState,
    pub urgent: bool,
    pub can_submit: bool,
    pub can_skip: bool,
    pub score: Option<f64>,
}

/// State machine for one interview.
///
/// `handle` is pure: it updates local state and returns effects. Backend
/// results come back in as events, so every transition runs to completion
/// before the next suspension point.
pub struct InterviewController {
    interview_id: i64,
    phase: Phase,
    pending: Option<Pending>,
    interview: Option<Interview>,
    question: Option<Question>,
    answer: String,
    progress: Progress,
    countdown: CountdownTimer,
    default_time_limit: u32,
    answers_submitted: u32,
    detached: bool,
}

impl InterviewController {
    pub fn new(interview_id: i64) -> Self {
        Self {
            interview_id,
            phase: Phase::Loading,
            pending: None,
            interview: None,
            question: None,
            answer: String::new(),
            progress: Progress::new(0, None),
            countdown: CountdownTimer::new(),
            default_time_limit: DEFAULT_TIME_LIMIT_SECS,
            answers_submitted: 0,
            detached: false,
        }
    }

    pub fn with_default_time_limit(mut self, seconds: u32) -> Self {
        if seconds > 0 {
            self.default_time_limit = seconds;
        }
        self
    }

    /// Starts (or restarts, for a resumed interview) from the backend's view.
    pub fn enter(&mut self) -> Vec<Effect> {
        info!("🎯 Entering interview {}", self.interview_id);
        self.countdown.stop();
        self.phase = Phase::Loading;
        self.pending = Some(Pending::Interview);
        self.interview = None;
        self.question = None;
        self.answer.clear();
        self.detached = false;
        vec![Effect::FetchInterview(self.interview_id)]
    }

    /// The view is going away. Stops the countdown and drops later results;
    /// requests already sent are not recalled.
    pub fn leave(&mut self) {
        debug!("👋 Leaving interview {}", self.interview_id);
        self.countdown.stop();
        self.detached = true;
    }

    pub fn handle(&mut self, event: ControllerEvent) -> Vec<Effect> {
        if self.detached {
            debug!("Dropping {:?} after leave", event);
            return Vec::new();
        }

        match event {
            ControllerEvent::AnswerEdited(text) => {
                if self.phase == Phase::QuestionReady {
                    self.answer = text;
                }
                Vec::new()
            }
            ControllerEvent::SubmitRequested => self.submit(),
            ControllerEvent::SkipRequested => self.skip(),
            ControllerEvent::Tick(generation) => self.tick(generation),
            ControllerEvent::InterviewLoaded(result) => {
                if !self.take_pending(Pending::Interview) {
                    return Vec::new();
                }
                self.on_interview_loaded(result)
            }
            ControllerEvent::QuestionFetched(result) => {
                if !self.take_pending(Pending::NextQuestion) {
                    return Vec::new();
                }
                self.on_question_fetched(result)
            }
            ControllerEvent::AnswerSubmitted(result) => {
                if !self.take_pending(Pending::Submission) {
                    return Vec::new();
                }
                self.on_answer_submitted(result)
            }
            ControllerEvent::InterviewCompleted(result) => {
                if !self.take_pending(Pending::Completion) {
                    return Vec::new();
                }
                self.on_interview_completed(result)
            }
        }
    }

    fn take_pending(&mut self, expected: Pending) -> bool {
        if self.pending == Some(expected) {
            self.pending = None;
            true
        } else {
            warn!(
                "⚠️ Unexpected {:?} result while waiting for {:?}",
                expected, self.pending
            );
            false
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::QuestionReady => {}
            Phase::Submitting => {
                debug!("Submit ignored, previous submission still pending");
                return Vec::new();
            }
            _ => return Vec::new(),
        }

        let question = match &self.question {
            Some(question) => question,
            None => return Vec::new(),
        };

        let limit = question.time_limit_or(self.default_time_limit);
        match AnswerSubmission::new(question.id, &self.answer, limit, self.countdown.remaining()) {
            Ok(submission) => {
                self.phase = Phase::Submitting;
                self.pending = Some(Pending::Submission);
                vec![Effect::SubmitAnswer(self.interview_id, submission)]
            }
            Err(e) => vec![Effect::Notify(Notice::warning(e.to_string()))],
        }
    }

    fn skip(&mut self) -> Vec<Effect> {
        if self.phase != Phase::QuestionReady {
            return Vec::new();
        }

        if let Some(question) = &self.question {
            info!("⏭️ Skipping question {} (no answer recorded)", question.id);
        }
        self.countdown.stop();
        self.progress.advance();
        self.question = None;
        self.answer.clear();
        self.phase = Phase::Loading;
        self.request_next()
    }

    fn tick(&mut self, generation: u64) -> Vec<Effect> {
        if !matches!(self.phase, Phase::QuestionReady | Phase::Submitting) {
            return Vec::new();
        }
        match self.countdown.on_tick(generation) {
            TickOutcome::Expired => vec![Effect::Notify(Notice::warning(
                "Time's up! Submit your answer or skip to the next question.",
            ))],
            TickOutcome::Running(_) | TickOutcome::Ignored => Vec::new(),
        }
    }

    fn on_interview_loaded(&mut self, result: Result<Interview, ApiError>) -> Vec<Effect> {
        let interview = match result {
            Ok(interview) => interview,
            Err(e) => return self.fail(&e, "Failed to load interview"),
        };

        self.progress = Progress::new(interview.answered(), interview.total_questions);
        let completed = interview.is_completed();
        self.interview = Some(interview);

        if completed {
            info!("📋 Interview {} already completed", self.interview_id);
            self.phase = Phase::Completed;
            return vec![Effect::Navigate(Route::Results(self.interview_id))];
        }

        self.request_next()
    }

    fn on_question_fetched(&mut self, result: Result<NextQuestion, ApiError>) -> Vec<Effect> {
        match result {
            Ok(NextQuestion::Question(question)) if !self.progress.is_exhausted() => {
                let limit = question.time_limit_or(self.default_time_limit);
                info!("❓ Question {} ready ({})", question.id, self.progress.label());
                self.countdown.start(limit);
                self.question = Some(question);
                self.answer.clear();
                self.phase = Phase::QuestionReady;
                Vec::new()
            }
            Ok(NextQuestion::Question(question)) => {
                info!(
                    "Ignoring question {}, all {} questions handled",
                    question.id,
                    self.progress.position
                );
                self.begin_completion()
            }
            Ok(NextQuestion::Exhausted) => self.begin_completion(),
            Err(e) => self.fail(&e, "Failed to load question"),
        }
    }

    fn on_answer_submitted(&mut self, result: Result<(), ApiError>) -> Vec<Effect> {
        match result {
            Ok(()) => {
                self.answers_submitted += 1;
                self.countdown.stop();
                self.progress.advance();
                self.answer.clear();
                self.request_next()
            }
            Err(e) if e.is_unauthorized() => self.fail(&e, "Failed to submit answer"),
            Err(e) => {
                // Keep the question and the typed answer so the user can retry.
                warn!("⚠️ Submission failed, answer kept: {}", e);
                self.phase = Phase::QuestionReady;
                vec![Effect::Notify(Notice::error(format!(
                    "Failed to submit answer: {}",
                    e
                )))]
            }
        }
    }

    fn on_interview_completed(&mut self, result: Result<Interview, ApiError>) -> Vec<Effect> {
        match result {
            Ok(interview) => {
                info!(
                    "🏁 Interview {} completed with score {}",
                    self.interview_id,
                    interview.score_label()
                );
                self.interview = Some(interview);
                self.phase = Phase::Completed;
                vec![
                    Effect::Notify(Notice::info("Interview completed!")),
                    Effect::Navigate(Route::Results(self.interview_id)),
                ]
            }
            Err(e) => self.fail(&e, "Failed to complete interview"),
        }
    }

    fn request_next(&mut self) -> Vec<Effect> {
        self.pending = Some(Pending::NextQuestion);
        vec![Effect::FetchNextQuestion(self.interview_id)]
    }

    fn begin_completion(&mut self) -> Vec<Effect> {
        self.countdown.stop();
        self.question = None;
        self.phase = Phase::Completing;
        self.pending = Some(Pending::Completion);
        vec![Effect::CompleteInterview(self.interview_id)]
    }

    fn fail(&mut self, err: &ApiError, what: &str) -> Vec<Effect> {
        self.countdown.stop();
        self.phase = Phase::Error;
        self.pending = None;

        if err.is_unauthorized() {
            warn!("🔒 {}: credential rejected", what);
            return vec![
                Effect::Notify(Notice::warning("Your session has expired. Please log in again.")),
                Effect::Navigate(Route::Login),
            ];
        }

        warn!("❌ {}: {}", what, err);
        vec![
            Effect::Notify(Notice::error(format!("{}: {}", what, err))),
            Effect::Navigate(Route::Dashboard),
        ]
    }

    pub fn interview_id(&self) -> i64 {
        self.interview_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn interview(&self) -> Option<&Interview> {
        self.interview.as_ref()
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn countdown(&self) -> &CountdownTimer {
        &self.countdown
    }

    /// Answers the backend accepted during this visit.
    pub fn answers_submitted(&self) -> u32 {
        self.answers_submitted
    }

    pub fn view(&self, urgency_threshold: u32) -> InterviewView {
        let ready = self.phase == Phase::QuestionReady;
        InterviewView {
            interview_id: self.interview_id,
            phase: self.phase,
            job_role: self.interview.as_ref().map(|i| i.job_role.clone()),
            domain: self.interview.as_ref().map(|i| i.domain.clone()),
            progress_label: self.progress.label(),
            question: self.question.clone(),
            answer: self.answer.clone(),
            timer: self.countdown.state(),
            urgent: self.question.is_some() && self.countdown.is_urgent(urgency_threshold),
            can_submit: ready && !self.answer.trim().is_empty(),
            can_skip: ready,
            score: self.interview.as_ref().and_then(|i| i.overall_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InterviewStatus;

    fn interview(status: InterviewStatus, answered: u32, total: u32) -> Interview {
        Interview {
            id: 1,
            job_role: "Backend Engineer".to_string(),
            domain: "DSA".to_string(),
            status,
            start_time: None,
            end_time: None,
            total_questions: Some(total),
            questions_answered: Some(answered),
            overall_score: None,
        }
    }

    fn question(id: i64, limit: Option<u32>) -> Question {
        Question {
            id,
            prompt: format!("Question #{}", id),
            question_type: None,
            domain: Some("DSA".to_string()),
            job_role: None,
            expected_answer: None,
            hints: None,
            difficulty: Some(2),
            time_limit_seconds: limit,
        }
    }

    /// Controller sitting on question `id` of a fresh 5-question interview.
    fn ready_on(id: i64) -> InterviewController {
        let mut controller = InterviewController::new(1);
        controller.enter();
        controller.handle(ControllerEvent::InterviewLoaded(Ok(interview(
            InterviewStatus::InProgress,
            0,
            5,
        ))));
        controller.handle(ControllerEvent::QuestionFetched(Ok(NextQuestion::Question(
            question(id, Some(60)),
        ))));
        assert_eq!(controller.phase(), Phase::QuestionReady);
        controller
    }

    #[test]
    fn test_enter_fetches_interview_then_question() {
        let mut controller = InterviewController::new(1);
        assert_eq!(controller.enter(), vec![Effect::FetchInterview(1)]);
        assert_eq!(controller.phase(), Phase::Loading);

        let effects = controller.handle(ControllerEvent::InterviewLoaded(Ok(interview(
            InterviewStatus::InProgress,
            2,
            5,
        ))));
        assert_eq!(effects, vec![Effect::FetchNextQuestion(1)]);
        assert_eq!(controller.progress().label(), "Question 3 of 5");

        controller.handle(ControllerEvent::QuestionFetched(Ok(NextQuestion::Question(
            question(9, Some(45)),
        ))));
        assert_eq!(controller.phase(), Phase::QuestionReady);
        assert_eq!(controller.countdown().remaining(), 45);
        assert!(controller.countdown().is_running());
    }

    #[test]
    fn test_missing_time_limit_uses_default() {
        let mut controller = InterviewController::new(1).with_default_time_limit(75);
        controller.enter();
        controller.handle(ControllerEvent::InterviewLoaded(Ok(interview(
            InterviewStatus::InProgress,
            0,
            5,
        ))));
        controller.handle(ControllerEvent::QuestionFetched(Ok(NextQuestion::Question(
            question(1, None),
        ))));
        assert_eq!(controller.countdown().remaining(), 75);
    }

    #[test]
    fn test_completed_interview_goes_straight_to_results() {
        let mut controller = InterviewController::new(1);
        controller.enter();
        let effects = controller.handle(ControllerEvent::InterviewLoaded(Ok(interview(
            InterviewStatus::Completed,
            5,
            5,
        ))));
        assert_eq!(effects, vec![Effect::Navigate(Route::Results(1))]);
        assert_eq!(controller.phase(), Phase::Completed);
    }

    #[test]
    fn test_load_failure_returns_to_dashboard() {
        let mut controller = InterviewController::new(1);
        controller.enter();
        let effects = controller.handle(ControllerEvent::InterviewLoaded(Err(ApiError::NotFound {
            message: "Not Found".to_string(),
        })));
        assert_eq!(controller.phase(), Phase::Error);
        assert_eq!(effects.last(), Some(&Effect::Navigate(Route::Dashboard)));
    }

    #[test]
    fn test_whitespace_answer_makes_no_request() {
        let mut controller = ready_on(1);
        controller.handle(ControllerEvent::AnswerEdited("   ".to_string()));
        let effects = controller.handle(ControllerEvent::SubmitRequested);

        assert!(matches!(
            effects.as_slice(),
            [Effect::Notify(Notice { level: NoticeLevel::Warning, .. })]
        ));
        assert_eq!(controller.phase(), Phase::QuestionReady);
    }

    #[test]
    fn test_double_submit_sends_once() {
        let mut controller = ready_on(1);
        controller.handle(ControllerEvent::AnswerEdited("Two pointers".to_string()));

        let first = controller.handle(ControllerEvent::SubmitRequested);
        let second = controller.handle(ControllerEvent::SubmitRequested);

        assert_eq!(first.len(), 1);
        assert!(matches!(first[0], Effect::SubmitAnswer(1, _)));
        assert!(second.is_empty());
        assert_eq!(controller.phase(), Phase::Submitting);
    }

    #[test]
    fn test_time_taken_follows_countdown() {
        let mut controller = ready_on(1);
        let generation = controller.countdown().generation();
        for _ in 0..12 {
            controller.handle(ControllerEvent::Tick(generation));
        }
        controller.handle(ControllerEvent::AnswerEdited("answer".to_string()));

        match controller.handle(ControllerEvent::SubmitRequested).as_slice() {
            [Effect::SubmitAnswer(_, submission)] => {
                assert_eq!(submission.time_taken_seconds(), 12)
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_submit_failure_keeps_answer() {
        let mut controller = ready_on(1);
        controller.handle(ControllerEvent::AnswerEdited("my answer".to_string()));
        controller.handle(ControllerEvent::SubmitRequested);

        let effects = controller.handle(ControllerEvent::AnswerSubmitted(Err(ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        })));

        assert_eq!(controller.phase(), Phase::QuestionReady);
        assert_eq!(controller.answer(), "my answer");
        assert_eq!(controller.question().map(|q| q.id), Some(1));
        assert!(matches!(
            effects.as_slice(),
            [Effect::Notify(Notice { level: NoticeLevel::Error, .. })]
        ));
        assert_eq!(controller.answers_submitted(), 0);
    }

    #[test]
    fn test_successful_submit_requests_next_question() {
        let mut controller = ready_on(1);
        controller.handle(ControllerEvent::AnswerEdited("answer".to_string()));
        controller.handle(ControllerEvent::SubmitRequested);

        let effects = controller.handle(ControllerEvent::AnswerSubmitted(Ok(())));
        assert_eq!(effects, vec![Effect::FetchNextQuestion(1)]);
        assert_eq!(controller.phase(), Phase::Submitting);
        assert!(!controller.countdown().is_running());
        assert_eq!(controller.answers_submitted(), 1);
        assert_eq!(controller.progress().label(), "Question 2 of 5");
    }

    #[test]
    fn test_skip_advances_without_submission() {
        let mut controller = ready_on(1);
        controller.handle(ControllerEvent::AnswerEdited("half an answer".to_string()));

        let effects = controller.handle(ControllerEvent::SkipRequested);
        assert_eq!(effects, vec![Effect::FetchNextQuestion(1)]);
        assert_eq!(controller.progress().label(), "Question 2 of 5");
        assert_eq!(controller.answers_submitted(), 0);
        assert_eq!(controller.answer(), "");
    }

    #[test]
    fn test_skip_while_submitting_is_ignored() {
        let mut controller = ready_on(1);
        controller.handle(ControllerEvent::AnswerEdited("answer".to_string()));
        controller.handle(ControllerEvent::SubmitRequested);
        assert!(controller.handle(ControllerEvent::SkipRequested).is_empty());
    }

    #[test]
    fn test_sentinel_completes_and_navigates_to_results() {
        let mut controller = ready_on(1);
        controller.handle(ControllerEvent::SkipRequested);

        let effects = controller.handle(ControllerEvent::QuestionFetched(Ok(NextQuestion::Exhausted)));
        assert_eq!(effects, vec![Effect::CompleteInterview(1)]);
        assert_eq!(controller.phase(), Phase::Completing);

        let mut finished = interview(InterviewStatus::Completed, 4, 5);
        finished.overall_score = Some(82.5);
        let effects = controller.handle(ControllerEvent::InterviewCompleted(Ok(finished)));
        assert_eq!(effects.last(), Some(&Effect::Navigate(Route::Results(1))));
        assert_eq!(controller.phase(), Phase::Completed);
        assert_eq!(controller.view(10).score, Some(82.5));

        // Nothing after completion asks for another question.
        assert!(controller.handle(ControllerEvent::SkipRequested).is_empty());
        assert!(controller.handle(ControllerEvent::SubmitRequested).is_empty());
    }

    #[test]
    fn test_extra_question_past_total_completes() {
        let mut controller = InterviewController::new(1);
        controller.enter();
        controller.handle(ControllerEvent::InterviewLoaded(Ok(interview(
            InterviewStatus::InProgress,
            5,
            5,
        ))));
        let effects = controller.handle(ControllerEvent::QuestionFetched(Ok(NextQuestion::Question(
            question(6, Some(60)),
        ))));
        assert_eq!(effects, vec![Effect::CompleteInterview(1)]);
        assert!(controller.question().is_none());
    }

    #[test]
    fn test_unauthorized_mid_session_goes_to_login() {
        let mut controller = ready_on(1);
        controller.handle(ControllerEvent::SkipRequested);

        let effects = controller.handle(ControllerEvent::QuestionFetched(Err(ApiError::Unauthorized {
            status: 401,
            message: "expired".to_string(),
        })));
        assert_eq!(controller.phase(), Phase::Error);
        assert_eq!(effects.last(), Some(&Effect::Navigate(Route::Login)));
    }

    #[test]
    fn test_expiry_notifies_without_submitting() {
        let mut controller = InterviewController::new(1);
        controller.enter();
        controller.handle(ControllerEvent::InterviewLoaded(Ok(interview(
            InterviewStatus::InProgress,
            0,
            5,
        ))));
        controller.handle(ControllerEvent::QuestionFetched(Ok(NextQuestion::Question(
            question(1, Some(2)),
        ))));
        let generation = controller.countdown().generation();

        assert!(controller.handle(ControllerEvent::Tick(generation)).is_empty());
        assert!(controller.view(10).urgent);
        let effects = controller.handle(ControllerEvent::Tick(generation));
        assert!(matches!(effects.as_slice(), [Effect::Notify(_)]));
        assert!(controller.handle(ControllerEvent::Tick(generation)).is_empty());

        assert_eq!(controller.phase(), Phase::QuestionReady);
        assert_eq!(controller.countdown().remaining(), 0);
    }

    #[test]
    fn test_stale_tick_does_not_touch_next_question() {
        let mut controller = ready_on(1);
        let stale = controller.countdown().generation();
        controller.handle(ControllerEvent::SkipRequested);
        controller.handle(ControllerEvent::QuestionFetched(Ok(NextQuestion::Question(
            question(2, Some(30)),
        ))));

        controller.handle(ControllerEvent::Tick(stale));
        assert_eq!(controller.countdown().remaining(), 30);
    }

    #[test]
    fn test_results_after_leave_are_dropped() {
        let mut controller = ready_on(1);
        controller.handle(ControllerEvent::AnswerEdited("answer".to_string()));
        controller.handle(ControllerEvent::SubmitRequested);
        controller.leave();

        assert!(controller.handle(ControllerEvent::AnswerSubmitted(Ok(()))).is_empty());
        assert!(!controller.countdown().is_running());
        assert_eq!(controller.phase(), Phase::Submitting);
    }

    #[test]
    fn test_out_of_order_result_is_ignored() {
        let mut controller = ready_on(1);
        let effects = controller.handle(ControllerEvent::AnswerSubmitted(Ok(())));
        assert!(effects.is_empty());
        assert_eq!(controller.phase(), Phase::QuestionReady);
    }
}
