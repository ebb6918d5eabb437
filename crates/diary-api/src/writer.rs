use serde_json::Value;
use std::time::Duration;

use crate::error::DiaryError;
use crate::Data;

/// Client for the user service that owns author profiles. One instance is
/// built at startup and shared through `AppState`.
#[derive(Clone)]
pub(crate) struct WriterClient {
    base_url: String,
    client: reqwest::Client,
}

impl WriterClient {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn profile_url(&self, user_id: i64) -> String {
        format!("{}/api/user/specificuser/{}", self.base_url, user_id)
    }

    /// Resolves a user's public profile, forwarding the caller's own bearer
    /// token so the user service applies the caller's permissions.
    pub(crate) async fn fetch_writer(&self, user_id: i64, token: &str) -> Result<Value, DiaryError> {
        let response = self
            .client
            .get(self.profile_url(user_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| DiaryError::AuthorLookup(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiaryError::AuthorLookup(format!(
                "user service returned {status}"
            )));
        }

        let body: Data<Value> = response
            .json()
            .await
            .map_err(|err| DiaryError::AuthorLookup(err.to_string()))?;
        Ok(body.data)
    }
}
