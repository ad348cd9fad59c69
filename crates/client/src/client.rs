use std::time::Duration;

use homerent_core::config::CatalogConfig;
use homerent_core::domain::appliance::Appliance;
use homerent_core::recommend::Recommendation;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApplianceList {
    #[serde(rename = "Appliance", default)]
    appliances: Vec<Appliance>,
}

#[derive(Debug, Deserialize)]
struct RecommendationList {
    #[serde(default)]
    recommendations: Vec<Recommendation>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// Read-only HTTP access to the rental backend.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
    suggestion_limit: usize,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build().unwrap_or_default();
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            suggestion_limit: homerent_core::catalog::DEFAULT_SUGGESTION_LIMIT,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self { suggestion_limit: config.suggestion_limit, ..Self::new(&config.api_base_url) }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn fetch_catalog(&self) -> Result<Vec<Appliance>, ClientError> {
        let url = self.url("/getSpecificAppliance");
        let response =
            self.http.get(&url).send().await.map_err(|error| ClientError::from_reqwest(&url, error))?;
        let list: ApplianceList = decode(&url, response).await?;
        debug!(
            event_name = "client.catalog.fetched",
            correlation_id = "catalog",
            count = list.appliances.len(),
            "catalog fetched"
        );
        Ok(list.appliances)
    }

    /// Name suggestions for a typed prefix. A blank term never reaches the network.
    pub async fn suggestions(&self, term: &str) -> Result<Vec<String>, ClientError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.url("/api/suggestions");
        let response = self
            .http
            .get(&url)
            .query(&[("keyword", term)])
            .send()
            .await
            .map_err(|error| ClientError::from_reqwest(&url, error))?;
        let mut names: Vec<String> = decode(&url, response).await?;
        names.truncate(self.suggestion_limit);
        Ok(names)
    }

    pub async fn recommendations(&self, budget: &str) -> Result<Vec<Recommendation>, ClientError> {
        let url = self.url("/api/recommendations");
        let response = self
            .http
            .post(&url)
            .json(&json!({ "budget": budget }))
            .send()
            .await
            .map_err(|error| ClientError::from_reqwest(&url, error))?;
        let list: RecommendationList = decode(&url, response).await?;
        Ok(list.recommendations)
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.json::<MessageBody>().await.ok().map(|body| body.message);
        return Err(ClientError::Status { url: url.to_string(), status: status.as_u16(), message });
    }
    response.json::<T>().await.map_err(|error| ClientError::from_reqwest(url, error))
}
