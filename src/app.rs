use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc;

use crate::api::{
    Analytics, ApiClient, DashboardSummary, Interview, Question, QuestionDraft, RegisterRequest,
    StartInterviewRequest,
};
use crate::api::questions::QuestionFilter;
use crate::config::ClientConfig;
use crate::interview::{InterviewController, InterviewRunner, RunOutcome, RunnerUpdate, UserAction};
use crate::router::{GuardDecision, Navigator, Route};
use crate::session::{CredentialHub, FileCredentialStorage, Profile, SessionManager};

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub profile: Profile,
    pub summary: DashboardSummary,
    pub interviews: Vec<Interview>,
}

/// One client context: credential, navigation and backend access wired
/// together.
pub struct App {
    config: ClientConfig,
    session: SessionManager,
    navigator: Navigator,
    api: Arc<ApiClient>,
}

impl App {
    /// Opens the persisted credential under the configured data directory.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let hub = CredentialHub::open(FileCredentialStorage::new(&data_dir))
            .with_context(|| format!("Failed to read credential from {}", data_dir.display()))?;
        Self::with_hub(config, &hub)
    }

    /// Attaches a new context to an existing hub.
    pub fn with_hub(config: ClientConfig, hub: &Arc<CredentialHub>) -> Result<Self> {
        let session = SessionManager::attach(hub);
        let api = ApiClient::from_config(&config, session.clone())
            .context("Failed to build HTTP client")?;
        Ok(Self {
            navigator: Navigator::new(session.clone()),
            config,
            session,
            api: Arc::new(api),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Navigates to `route`, failing with a readable message when the guard
    /// sends us elsewhere.
    pub fn open(&self, route: Route) -> Result<()> {
        let resolved = self.navigator.navigate(route.clone());
        if resolved == route {
            return Ok(());
        }
        match resolved {
            Route::Login => bail!("Not logged in. Run `mockmate login` first."),
            Route::Dashboard if route.is_auth_entry() => {
                bail!("Already logged in. Run `mockmate logout` to switch accounts.")
            }
            Route::Dashboard => bail!("Your account cannot open {}.", route),
            other => bail!("{} is not available, redirected to {}.", route, other),
        }
    }

    pub fn profile(&self) -> Option<Profile> {
        self.session.credential().map(|c| c.profile().clone())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Profile> {
        self.open(Route::Login)?;
        let credential = self.api.login(email, password).await.context("Login failed")?;
        let profile = credential.profile().clone();
        self.session
            .set_credential(credential)
            .context("Failed to store credential")?;
        Ok(profile)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Profile> {
        self.open(Route::Register)?;
        let credential = self
            .api
            .register(request)
            .await
            .context("Registration failed")?;
        let profile = credential.profile().clone();
        self.session
            .set_credential(credential)
            .context("Failed to store credential")?;
        Ok(profile)
    }

    pub fn logout(&self) -> Result<()> {
        self.session.clear().context("Failed to remove credential")?;
        info!("👋 Logged out");
        Ok(())
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        self.open(Route::Dashboard)?;
        let profile = self.profile().context("Not logged in")?;
        let interviews = self
            .api
            .my_interviews()
            .await
            .context("Failed to load interviews")?;
        Ok(Dashboard {
            profile,
            summary: DashboardSummary::from_interviews(&interviews),
            interviews,
        })
    }

    pub async fn start_interview(&self, request: &StartInterviewRequest) -> Result<Interview> {
        self.open(Route::Dashboard)?;
        self.api
            .start_interview(request)
            .await
            .context("Failed to start interview")
    }

    pub async fn results(&self, id: i64) -> Result<Interview> {
        self.open(Route::Results(id))?;
        self.api
            .get_interview(id)
            .await
            .with_context(|| format!("Failed to load results for interview {}", id))
    }

    pub async fn analytics(&self, recalculate: bool) -> Result<Analytics> {
        self.open(Route::Analytics)?;
        if recalculate {
            self.api
                .recalculate_analytics()
                .await
                .context("Failed to recalculate analytics")?;
        }
        self.api
            .my_analytics()
            .await
            .context("Failed to load analytics")
    }

    pub async fn questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        self.api
            .list_questions(filter)
            .await
            .context("Failed to load questions")
    }

    pub async fn create_question(&self, draft: &QuestionDraft) -> Result<Question> {
        self.open(Route::Admin)?;
        self.api
            .create_question(draft)
            .await
            .context("Failed to create question")
    }

    pub async fn update_question(&self, id: i64, draft: &QuestionDraft) -> Result<Question> {
        self.open(Route::Admin)?;
        self.api
            .update_question(id, draft)
            .await
            .with_context(|| format!("Failed to update question {}", id))
    }

    pub async fn delete_question(&self, id: i64) -> Result<String> {
        self.open(Route::Admin)?;
        self.api
            .delete_question(id)
            .await
            .with_context(|| format!("Failed to delete question {}", id))
    }

    /// Runs one interview until it navigates away or the user leaves.
    /// Starting and resuming are the same call.
    pub async fn run_interview(
        &self,
        id: i64,
        actions: mpsc::UnboundedReceiver<UserAction>,
        updates: mpsc::UnboundedSender<RunnerUpdate>,
    ) -> Result<RunOutcome> {
        let route = Route::Interview(id);
        if let GuardDecision::Redirect(to) =
            crate::router::guard(&route, self.session.credential().as_ref())
        {
            self.navigator.navigate(to.clone());
            return Ok(RunOutcome::Navigate(to));
        }
        self.navigator.navigate(route);

        let controller = InterviewController::new(id)
            .with_default_time_limit(self.config.default_time_limit_secs);
        let runner = InterviewRunner::new(Arc::clone(&self.api), controller, updates)
            .with_tick_interval(self.config.tick_interval())
            .with_urgency_threshold(self.config.urgency_threshold_secs)
            .with_session(self.session.clone());

        let outcome = runner.run(actions).await;
        if let RunOutcome::Navigate(to) = &outcome {
            self.navigator.navigate(to.clone());
        }
        Ok(outcome)
    }
}
