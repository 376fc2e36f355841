use urlencoding::encode;

use super::models::{Question, QuestionType};
use super::{ApiClient, ApiError, Result};

/// Filters offered by the public question bank endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionFilter {
    All,
    ById(i64),
    DomainAndRole { domain: String, job_role: String },
    TypeAndDomain { question_type: QuestionType, domain: String },
    Difficulty { domain: String, difficulty: u8 },
}

impl QuestionFilter {
    pub fn path(&self) -> String {
        match self {
            QuestionFilter::All => "/questions/public/all".to_string(),
            QuestionFilter::ById(id) => format!("/questions/public/{}", id),
            QuestionFilter::DomainAndRole { domain, job_role } => format!(
                "/questions/public/domain/{}/role/{}",
                encode(domain),
                encode(job_role)
            ),
            QuestionFilter::TypeAndDomain {
                question_type,
                domain,
            } => format!(
                "/questions/public/type/{}/domain/{}",
                question_type.as_str(),
                encode(domain)
            ),
            QuestionFilter::Difficulty { domain, difficulty } => format!(
                "/questions/public/difficulty/{}/{}",
                encode(domain),
                difficulty
            ),
        }
    }
}

impl ApiClient {
    pub async fn all_questions(&self) -> Result<Vec<Question>> {
        self.get(&QuestionFilter::All.path()).await
    }

    pub async fn question(&self, id: i64) -> Result<Question> {
        self.get(&QuestionFilter::ById(id).path()).await
    }

    pub async fn questions_by_domain_and_role(&self, domain: &str, job_role: &str) -> Result<Vec<Question>> {
        self.list_questions(&QuestionFilter::DomainAndRole {
            domain: domain.to_string(),
            job_role: job_role.to_string(),
        })
        .await
    }

    pub async fn questions_by_type_and_domain(
        &self,
        question_type: QuestionType,
        domain: &str,
    ) -> Result<Vec<Question>> {
        self.list_questions(&QuestionFilter::TypeAndDomain {
            question_type,
            domain: domain.to_string(),
        })
        .await
    }

    pub async fn questions_by_difficulty(&self, domain: &str, difficulty: u8) -> Result<Vec<Question>> {
        if !(1..=5).contains(&difficulty) {
            return Err(ApiError::Validation(
                "difficulty must be between 1 and 5".to_string(),
            ));
        }
        self.list_questions(&QuestionFilter::Difficulty {
            domain: domain.to_string(),
            difficulty,
        })
        .await
    }

    /// Runs any list filter. `ById` yields a single-element list.
    pub async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        match filter {
            QuestionFilter::ById(id) => Ok(vec![self.question(*id).await?]),
            other => self.get(&other.path()).await,
        }
    }
}
