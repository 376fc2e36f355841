use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::views;
use crate::app::App;
use crate::interview::{
    format_clock, InterviewView, NoticeLevel, Phase, RunOutcome, RunnerUpdate, UserAction,
};
use crate::router::Route;

const HELP: &str = "Type your answer (several lines are fine). Commands: :submit, :skip, :clear, :quit";

/// Runs the interactive interview and shows what comes after it.
pub(super) async fn run(app: &App, id: i64) -> Result<()> {
    let (actions_tx, actions_rx) = mpsc::unbounded_channel();
    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();

    let draft = Arc::new(Mutex::new(String::new()));
    spawn_stdin_reader(actions_tx, Arc::clone(&draft));

    let mut screen = Screen::new(draft);
    let run = app.run_interview(id, actions_rx, updates_tx);
    tokio::pin!(run);

    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome?,
            Some(update) = updates_rx.recv() => screen.render(update),
        }
    };
    while let Ok(update) = updates_rx.try_recv() {
        screen.render(update);
    }

    match outcome {
        RunOutcome::Navigate(Route::Results(id)) => {
            let interview = app.results(id).await?;
            println!("\n{}", views::results(&interview));
        }
        RunOutcome::Navigate(Route::Login) => {
            println!("🔒 Please log in again with `mockmate login`.");
        }
        RunOutcome::Navigate(route) => {
            println!("Returning to {}. Resume later with `mockmate resume {}`.", route, id);
        }
        RunOutcome::Left => {
            println!("⏸️ Interview left. Resume later with `mockmate resume {}`.", id);
        }
    }
    Ok(())
}

/// Reads stdin on a plain thread; a blocked read must not hold up runtime
/// shutdown.
fn spawn_stdin_reader(actions: mpsc::UnboundedSender<UserAction>, draft: Arc<Mutex<String>>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            let action = match line.trim() {
                ":submit" => UserAction::Submit,
                ":skip" => {
                    draft.lock().clear();
                    UserAction::Skip
                }
                ":clear" => {
                    draft.lock().clear();
                    UserAction::Edit(String::new())
                }
                ":quit" => UserAction::Leave,
                _ => {
                    let mut text = draft.lock();
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&line);
                    UserAction::Edit(text.clone())
                }
            };
            let leaving = action == UserAction::Leave;
            if actions.send(action).is_err() || leaving {
                break;
            }
        }
    });
}

/// Prints only what changed, so a ticking countdown does not flood the
/// terminal.
struct Screen {
    draft: Arc<Mutex<String>>,
    /// Question id and progress label of the last header printed. A skipped
    /// question may be served again, so the id alone is not enough.
    shown: Option<(i64, String)>,
    phase: Option<Phase>,
    urgent: bool,
}

impl Screen {
    fn new(draft: Arc<Mutex<String>>) -> Self {
        Self {
            draft,
            shown: None,
            phase: None,
            urgent: false,
        }
    }

    fn render(&mut self, update: RunnerUpdate) {
        match update {
            RunnerUpdate::Notice(notice) => {
                let icon = match notice.level {
                    NoticeLevel::Info => "ℹ️",
                    NoticeLevel::Warning => "⚠️",
                    NoticeLevel::Error => "❌",
                };
                println!("{} {}", icon, notice.message);
            }
            RunnerUpdate::View(view) => self.render_view(&view),
        }
    }

    /// Whether `view` shows a question the user has not been shown yet.
    fn needs_header(&mut self, view: &InterviewView) -> bool {
        let Some(question) = &view.question else {
            return false;
        };
        let key = (question.id, view.progress_label.clone());
        if self.shown.as_ref() == Some(&key) {
            return false;
        }
        self.shown = Some(key);
        true
    }

    fn render_view(&mut self, view: &InterviewView) {
        if self.needs_header(view) {
            self.draft.lock().clear();
            self.urgent = false;
            println!("\n{}", views::question_header(view));
            println!("{}", HELP);
        }

        if view.urgent && !self.urgent && view.timer.is_running {
            println!("⏳ {} left", format_clock(view.timer.remaining_seconds));
        }
        self.urgent = view.urgent;

        if self.phase != Some(view.phase) {
            match view.phase {
                Phase::Loading if self.phase.is_none() => println!("Loading interview..."),
                Phase::Submitting => println!("Submitting..."),
                Phase::Completing => println!("🏁 Finishing interview..."),
                _ => {}
            }
            self.phase = Some(view.phase);
        }
    }
}
