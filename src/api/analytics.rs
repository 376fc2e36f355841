use log::info;
use reqwest::Method;

use super::models::Analytics;
use super::{ApiClient, Result};

impl ApiClient {
    pub async fn my_analytics(&self) -> Result<Analytics> {
        self.get("/analytics/my-analytics").await
    }

    /// Asks the backend to rebuild the aggregates from the interview history.
    pub async fn recalculate_analytics(&self) -> Result<()> {
        self.send(Method::GET, "/analytics/recalculate", None::<&()>)
            .await?;
        info!("📊 Analytics recalculated");
        Ok(())
    }
}
