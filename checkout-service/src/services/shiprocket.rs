//! Shiprocket courier tracking client.
//!
//! Shiprocket issues a bearer token from `/auth/login` that stays valid for
//! ten days. The token is held in a [`ShiprocketTokenCache`] shared by all
//! requests; refreshes happen under the cache lock so a burst of requests
//! after expiry performs a single login.

use std::future::Future;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::ShiprocketConfig;

const MAX_TOKEN_TTL_SECS: u64 = 10 * 24 * 60 * 60;

struct CachedToken {
    token: Secret<String>,
    expires_at: DateTime<Utc>,
}

/// Short-lived credential cache with single-flight refresh.
pub struct ShiprocketTokenCache {
    ttl: Duration,
    slot: Mutex<Option<CachedToken>>,
}

impl ShiprocketTokenCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached token, or run `refresh` to obtain a new one.
    ///
    /// The lock is held across `refresh`, so concurrent callers wait for the
    /// in-flight login instead of starting their own.
    pub async fn acquire<F, Fut>(&self, refresh: F) -> Result<Secret<String>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.expires_at > Utc::now() {
                return Ok(cached.token.clone());
            }
            tracing::debug!("Shiprocket token expired, refreshing");
        }

        let token = refresh().await?;
        *slot = Some(CachedToken {
            token: Secret::new(token.clone()),
            expires_at: Utc::now() + self.ttl,
        });

        Ok(Secret::new(token))
    }

    /// Drop the cached token so the next `acquire` logs in again.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Clone)]
pub struct ShiprocketClient {
    client: Client,
    config: ShiprocketConfig,
    token_cache: Arc<ShiprocketTokenCache>,
}

impl ShiprocketClient {
    pub fn new(config: ShiprocketConfig) -> Self {
        // Shiprocket tokens never outlive ten days.
        let ttl = Duration::seconds(config.token_ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64);
        Self {
            client: Client::new(),
            config,
            token_cache: Arc::new(ShiprocketTokenCache::new(ttl)),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.email.is_empty() && !self.config.password.expose_secret().is_empty()
    }

    async fn login(&self) -> Result<String> {
        let url = format!("{}/auth/login", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                email: &self.config.email,
                password: self.config.password.expose_secret(),
            })
            .send()
            .await
            .map_err(|e| anyhow!("Shiprocket login request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Shiprocket login failed");
            return Err(anyhow!(
                "Shiprocket login failed ({}): {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            ));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Unexpected Shiprocket login response: {}", e))?;

        tracing::info!("Shiprocket token refreshed");
        Ok(login.token)
    }

    async fn token(&self) -> Result<Secret<String>> {
        self.token_cache.acquire(|| self.login()).await
    }

    /// Fetch tracking data for an air waybill number.
    ///
    /// A 401 means the cached token was revoked early; it is dropped and the
    /// call repeated once with a fresh login.
    pub async fn track_awb(&self, awb: &str) -> Result<serde_json::Value> {
        if !self.is_configured() {
            return Err(anyhow!("Shiprocket credentials not configured"));
        }

        let token = self.token().await?;
        match self.fetch_tracking(awb, &token).await? {
            Some(tracking) => Ok(tracking),
            None => {
                tracing::warn!(awb = %awb, "Shiprocket rejected cached token, retrying");
                self.token_cache.invalidate().await;
                let token = self.token().await?;
                self.fetch_tracking(awb, &token)
                    .await?
                    .ok_or_else(|| anyhow!("Shiprocket rejected freshly issued token"))
            }
        }
    }

    /// `Ok(None)` on 401.
    async fn fetch_tracking(
        &self,
        awb: &str,
        token: &Secret<String>,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!("{}/courier/track/awb/{}", self.config.api_base_url, awb);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| anyhow!("Shiprocket tracking request failed: {}", e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(status = %status, awb = %awb, "Shiprocket tracking failed");
            return Err(anyhow!(
                "Shiprocket tracking failed ({}): {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            ));
        }

        let tracking = serde_json::from_str(&body)
            .map_err(|e| anyhow!("Unexpected Shiprocket tracking response: {}", e))?;
        Ok(Some(tracking))
    }
}

/// AWB numbers are alphanumeric courier references.
pub fn is_valid_awb(awb: &str) -> bool {
    !awb.is_empty() && awb.len() <= 64 && awb.chars().all(|c| c.is_ascii_alphanumeric())
}
