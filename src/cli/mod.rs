//! Command-line front-end.

mod interview;
pub mod views;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::api::questions::QuestionFilter;
use crate::api::{
    QuestionDraft, QuestionType, RegisterRequest, StartInterviewRequest,
    DEFAULT_QUESTIONS_PER_INTERVIEW, DEFAULT_TIME_LIMIT_SECS,
};
use crate::app::App;
use crate::config::{validate_base_url, ClientConfig};

#[derive(Parser, Debug)]
#[command(name = "mockmate", version, about = "Practice timed mock interviews from the terminal")]
pub struct Cli {
    /// Config file (defaults to mockmate.toml in the data directory)
    #[arg(long, global = true, env = "MOCKMATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and remember the credential
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "MOCKMATE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Forget the stored credential
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Quick stats and interview history
    Dashboard,
    /// Start a new interview and run it
    Start(StartArgs),
    /// Continue an interview that is still in progress
    Resume { id: i64 },
    /// Show the outcome of an interview
    Results { id: i64 },
    /// Aggregated performance
    Analytics {
        /// Rebuild the aggregates on the backend first
        #[arg(long)]
        recalculate: bool,
    },
    /// Browse the public question bank
    Questions(QuestionArgs),
    /// Manage the question bank (admins only)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "MOCKMATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub target_role: String,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    #[arg(long)]
    pub job_role: String,
    /// e.g. DSA, System Design, HR
    #[arg(long)]
    pub domain: String,
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_QUESTIONS_PER_INTERVIEW,
        value_parser = clap::value_parser!(u32).range(1..=10)
    )]
    pub questions: u32,
    /// Resume or CV text file to tailor questions
    #[arg(long)]
    pub resume: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct QuestionArgs {
    #[arg(long, conflicts_with_all = ["domain", "role", "question_type", "difficulty"])]
    pub id: Option<i64>,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long, requires = "domain")]
    pub role: Option<String>,
    #[arg(long = "type", requires = "domain", conflicts_with = "role")]
    pub question_type: Option<QuestionType>,
    #[arg(
        long,
        requires = "domain",
        conflicts_with_all = ["role", "question_type"],
        value_parser = clap::value_parser!(u8).range(1..=5)
    )]
    pub difficulty: Option<u8>,
}

impl QuestionArgs {
    fn filter(&self) -> Result<QuestionFilter> {
        if let Some(id) = self.id {
            return Ok(QuestionFilter::ById(id));
        }
        let domain = match &self.domain {
            Some(domain) => domain.clone(),
            None => return Ok(QuestionFilter::All),
        };
        if let Some(job_role) = &self.role {
            return Ok(QuestionFilter::DomainAndRole {
                domain,
                job_role: job_role.clone(),
            });
        }
        if let Some(question_type) = self.question_type {
            return Ok(QuestionFilter::TypeAndDomain {
                question_type,
                domain,
            });
        }
        if let Some(difficulty) = self.difficulty {
            return Ok(QuestionFilter::Difficulty { domain, difficulty });
        }
        anyhow::bail!("--domain needs one of --role, --type or --difficulty")
    }
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    Create(DraftArgs),
    Update {
        id: i64,
        #[command(flatten)]
        draft: DraftArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
pub struct DraftArgs {
    #[arg(long)]
    pub question: String,
    #[arg(long = "type", default_value = "technical")]
    pub question_type: QuestionType,
    #[arg(long)]
    pub domain: String,
    #[arg(long)]
    pub job_role: String,
    #[arg(long)]
    pub expected_answer: Option<String>,
    #[arg(long)]
    pub hints: Option<String>,
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub difficulty: u8,
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_SECS)]
    pub time_limit: u32,
}

impl From<&DraftArgs> for QuestionDraft {
    fn from(args: &DraftArgs) -> Self {
        let mut draft = QuestionDraft::new(
            args.question.clone(),
            args.question_type,
            args.domain.clone(),
            args.job_role.clone(),
        );
        draft.expected_answer = args.expected_answer.clone();
        draft.hints = args.hints.clone();
        draft.difficulty = args.difficulty;
        draft.time_limit_seconds = args.time_limit;
        draft
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(dispatch(cli))
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let _ = dotenvy::dotenv();
            ClientConfig::load_from(Some(path.as_path()))?
        }
        None => ClientConfig::load()?,
    };
    if let Some(url) = &cli.api_url {
        config.api_base_url = validate_base_url(url)?;
    }
    Ok(config)
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let app = App::new(config)?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let profile = app.login(&email, &password).await?;
            println!("✅ Logged in as {} <{}>", profile.display_name(), profile.email);
        }
        Commands::Register(args) => {
            let request = RegisterRequest {
                email: args.email,
                password: password_or_prompt(args.password)?,
                first_name: args.first_name,
                last_name: args.last_name,
                phone_number: args.phone,
                target_role: args.target_role,
            };
            let profile = app.register(&request).await?;
            println!("✅ Welcome, {}!", profile.display_name());
        }
        Commands::Logout => {
            app.logout()?;
            println!("👋 Logged out");
        }
        Commands::Whoami => match app.profile() {
            Some(profile) => println!("{}", views::profile(&profile, &app.navigator().menu())),
            None => println!("Not logged in"),
        },
        Commands::Dashboard => {
            let dashboard = app.dashboard().await?;
            println!("{}", views::dashboard(&dashboard));
        }
        Commands::Start(args) => {
            let mut request = StartInterviewRequest::new(args.job_role, args.domain)
                .with_questions(args.questions);
            if let Some(path) = args.resume {
                let resume = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                request = request.with_resume(resume);
            }
            let interview = app.start_interview(&request).await?;
            println!(
                "🎬 Interview {} started: {} questions on {}",
                interview.id,
                interview.total_questions.unwrap_or(args.questions),
                interview.domain
            );
            interview::run(&app, interview.id).await?;
        }
        Commands::Resume { id } => interview::run(&app, id).await?,
        Commands::Results { id } => {
            let interview = app.results(id).await?;
            println!("{}", views::results(&interview));
        }
        Commands::Analytics { recalculate } => {
            let analytics = app.analytics(recalculate).await?;
            println!("{}", views::analytics(&analytics));
        }
        Commands::Questions(args) => {
            let questions = app.questions(&args.filter()?).await?;
            println!("{}", views::questions(&questions));
        }
        Commands::Admin(command) => match command {
            AdminCommand::Create(draft) => {
                let question = app.create_question(&QuestionDraft::from(&draft)).await?;
                println!("➕ Created question {}", question.id);
            }
            AdminCommand::Update { id, draft } => {
                let question = app.update_question(id, &QuestionDraft::from(&draft)).await?;
                println!("✏️ Updated question {}", question.id);
            }
            AdminCommand::Delete { id } => {
                let ack = app.delete_question(id).await?;
                println!("🗑️ {}", ack);
            }
        },
    }

    Ok(())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_start() {
        let cli = Cli::try_parse_from([
            "mockmate",
            "start",
            "--job-role",
            "Backend Engineer",
            "--domain",
            "DSA",
            "-n",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Start(args) => {
                assert_eq!(args.questions, 3);
                assert_eq!(args.domain, "DSA");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_too_many_questions() {
        assert!(Cli::try_parse_from([
            "mockmate", "start", "--job-role", "SRE", "--domain", "DSA", "-n", "11"
        ])
        .is_err());
    }

    #[test]
    fn test_question_filters() {
        let cli = Cli::try_parse_from([
            "mockmate", "questions", "--domain", "System Design", "--role", "SRE",
        ])
        .unwrap();
        let Commands::Questions(args) = cli.command else {
            panic!("expected questions command");
        };
        assert_eq!(
            args.filter().unwrap(),
            QuestionFilter::DomainAndRole {
                domain: "System Design".to_string(),
                job_role: "SRE".to_string()
            }
        );

        let cli = Cli::try_parse_from(["mockmate", "questions", "--domain", "DSA"]).unwrap();
        let Commands::Questions(args) = cli.command else {
            panic!("expected questions command");
        };
        assert!(args.filter().is_err());
    }

    #[test]
    fn test_admin_draft_defaults() {
        let cli = Cli::try_parse_from([
            "mockmate", "admin", "create", "--question", "What is a mutex?", "--domain", "OS",
            "--job-role", "SRE",
        ])
        .unwrap();
        let Commands::Admin(AdminCommand::Create(args)) = cli.command else {
            panic!("expected admin create");
        };
        let draft = QuestionDraft::from(&args);
        assert_eq!(draft.question_type, QuestionType::Technical);
        assert_eq!(draft.difficulty, 1);
        assert_eq!(draft.time_limit_seconds, 60);
    }
}
