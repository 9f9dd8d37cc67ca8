//! Remote probability backend — scores profiles against an external
//! prediction service over HTTP.
//!
//! The wire contract mirrors the local artifact: POST the sanitized
//! profile JSON to `{base}/predict`, receive role-aligned probabilities
//! and thresholds back. Any failure (connect, timeout, non-2xx, bad
//! body) maps to `EngineError::ModelUnavailable`, which the engine
//! treats as "use the fallback scorer", never as a caller-facing error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::errors::EngineError;
use crate::model::{ModelScores, ProbabilitySource};
use crate::profile::Profile;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

pub struct RemoteModel {
    client: Client,
    base_url: String,
}

impl RemoteModel {
    /// Builds the client; the short timeout bounds how long a scoring
    /// request can hold up a recommendation before degrading.
    pub fn new(base_url: impl Into<String>) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EngineError::ModelUnavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url)
    }
}

#[async_trait]
impl ProbabilitySource for RemoteModel {
    async fn score(&self, profile: &Profile) -> Result<ModelScores, EngineError> {
        let url = self.predict_url();
        debug!(%url, "scoring profile against remote model");

        let response = self
            .client
            .post(&url)
            .json(profile)
            .send()
            .await
            .map_err(|e| EngineError::ModelUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::ModelUnavailable(format!(
                "remote model returned {status}"
            )));
        }

        let scores: ModelScores = response
            .json()
            .await
            .map_err(|e| EngineError::ModelUnavailable(format!("invalid response body: {e}")))?;

        if scores.roles.len() != scores.probabilities.len()
            || scores.roles.len() != scores.thresholds.len()
        {
            return Err(EngineError::ModelUnavailable(
                "role-aligned vectors disagree in remote response".to_string(),
            ));
        }
        Ok(scores)
    }

    fn backend(&self) -> &'static str {
        "remote"
    }
}
