use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::engine::{ControllerEvent, Effect, InterviewController, InterviewView, Notice};
use super::InterviewBackend;
use crate::router::Route;
use crate::session::SessionManager;

/// Input from whoever renders the interview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Edit(String),
    Submit,
    Skip,
    Leave,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunnerUpdate {
    View(InterviewView),
    Notice(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The interview asked to move elsewhere (results, login, dashboard).
    Navigate(Route),
    /// The user left, or the action channel closed.
    Left,
}

/// Drives an [`InterviewController`] on the tokio runtime.
///
/// Backend calls run as spawned tasks and report back through a channel,
/// so they keep going if the user leaves mid-request. The tick interval is
/// re-armed whenever the countdown restarts. With a session attached, each
/// tick also re-reads the stored credential and ends the run on sign-out.
pub struct InterviewRunner<B> {
    backend: Arc<B>,
    controller: InterviewController,
    session: Option<SessionManager>,
    tick_interval: Duration,
    urgency_threshold: u32,
    updates: mpsc::UnboundedSender<RunnerUpdate>,
}

impl<B: InterviewBackend> InterviewRunner<B> {
    pub fn new(
        backend: Arc<B>,
        controller: InterviewController,
        updates: mpsc::UnboundedSender<RunnerUpdate>,
    ) -> Self {
        Self {
            backend,
            controller,
            session: None,
            tick_interval: Duration::from_secs(1),
            urgency_threshold: 10,
            updates,
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_session(mut self, session: SessionManager) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_urgency_threshold(mut self, seconds: u32) -> Self {
        self.urgency_threshold = seconds;
        self
    }

    pub async fn run(mut self, mut actions: mpsc::UnboundedReceiver<UserAction>) -> RunOutcome {
        let (results_tx, mut results) = mpsc::unbounded_channel::<ControllerEvent>();
        let mut ticker = interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        let mut armed_generation = self.controller.countdown().generation();

        let effects = self.controller.enter();
        if let Some(route) = self.apply(effects, &results_tx) {
            return RunOutcome::Navigate(route);
        }
        self.publish_view();

        loop {
            let effects = tokio::select! {
                biased;

                Some(event) = results.recv() => self.controller.handle(event),
                action = actions.recv() => match action {
                    Some(UserAction::Edit(text)) => self.controller.handle(ControllerEvent::AnswerEdited(text)),
                    Some(UserAction::Submit) => self.controller.handle(ControllerEvent::SubmitRequested),
                    Some(UserAction::Skip) => self.controller.handle(ControllerEvent::SkipRequested),
                    Some(UserAction::Leave) | None => {
                        self.controller.leave();
                        info!("👋 Left interview {}", self.controller.interview_id());
                        return RunOutcome::Left;
                    }
                },
                _ = ticker.tick() => {
                    if self.signed_out() {
                        self.controller.leave();
                        info!("🔒 Signed out during interview {}", self.controller.interview_id());
                        let _ = self.updates.send(RunnerUpdate::Notice(Notice::warning(
                            "You have been signed out. Please log in again.",
                        )));
                        return RunOutcome::Navigate(Route::Login);
                    }
                    let generation = self.controller.countdown().generation();
                    self.controller.handle(ControllerEvent::Tick(generation))
                }
            };

            let generation = self.controller.countdown().generation();
            if generation != armed_generation {
                ticker.reset();
                armed_generation = generation;
            }

            if let Some(route) = self.apply(effects, &results_tx) {
                self.publish_view();
                return RunOutcome::Navigate(route);
            }
            self.publish_view();
        }
    }

    pub fn controller(&self) -> &InterviewController {
        &self.controller
    }

    fn apply(&self, effects: Vec<Effect>, results: &mpsc::UnboundedSender<ControllerEvent>) -> Option<Route> {
        let mut navigate = None;
        for effect in effects {
            match effect {
                Effect::FetchInterview(id) => {
                    let backend = Arc::clone(&self.backend);
                    spawn_call(results, async move {
                        ControllerEvent::InterviewLoaded(backend.get_interview(id).await)
                    });
                }
                Effect::FetchNextQuestion(id) => {
                    let backend = Arc::clone(&self.backend);
                    spawn_call(results, async move {
                        ControllerEvent::QuestionFetched(backend.next_question(id).await)
                    });
                }
                Effect::SubmitAnswer(id, submission) => {
                    let backend = Arc::clone(&self.backend);
                    spawn_call(results, async move {
                        ControllerEvent::AnswerSubmitted(backend.submit_answer(id, &submission).await)
                    });
                }
                Effect::CompleteInterview(id) => {
                    let backend = Arc::clone(&self.backend);
                    spawn_call(results, async move {
                        ControllerEvent::InterviewCompleted(backend.complete_interview(id).await)
                    });
                }
                Effect::Notify(notice) => {
                    let _ = self.updates.send(RunnerUpdate::Notice(notice));
                }
                Effect::Navigate(route) => {
                    debug!("🧭 Interview requests navigation to {}", route.path());
                    navigate = Some(route);
                }
            }
        }
        navigate
    }

    /// Picks up sign-outs from other processes before checking the session.
    fn signed_out(&self) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        if let Err(e) = session.hub().reload() {
            warn!("⚠️ Could not re-read stored credential: {}", e);
        }
        !session.is_authenticated()
    }

    fn publish_view(&self) {
        let _ = self
            .updates
            .send(RunnerUpdate::View(self.controller.view(self.urgency_threshold)));
    }
}

fn spawn_call<F>(results: &mpsc::UnboundedSender<ControllerEvent>, call: F)
where
    F: Future<Output = ControllerEvent> + Send + 'static,
{
    let results = results.clone();
    tokio::spawn(async move {
        let event = call.await;
        if results.send(event).is_err() {
            debug!("Result arrived after the interview view closed");
        }
    });
}
