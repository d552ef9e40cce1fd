// Hand-crafted async HTTP client for the Fluidra Pool cloud API.
//
// Base: https://api.fluidra-emea.com
// Auth: Cognito bearer token + id-token api key (see auth.rs)
//
// Every request flows through the rate limiter first and revalidates
// the token set. A 401 from the gateway triggers exactly one forced
// re-authentication and retry; anything after that surfaces.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::Authenticator;
use crate::error::Error;
use crate::rate_limit::RateLimiter;
use crate::transport::TransportConfig;
use crate::types::{
    ComponentStateResponse, ConsumerResponse, DesiredValueRequest, DeviceResponse, ListEnvelope,
    UserPoolResponse, UserProfileResponse,
};

/// Production API base.
pub const DEFAULT_BASE_URL: &str = "https://api.fluidra-emea.com";

/// Query marker the component endpoints require.
const DEVICE_TYPE_QUERY: (&str, &str) = ("deviceType", "connected");

/// Async client for the Fluidra Pool cloud API.
pub struct FluidraClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Arc<Authenticator>,
    limiter: RateLimiter,
}

impl FluidraClient {
    /// Build a client against the production base URL.
    pub fn new(
        auth: Arc<Authenticator>,
        transport: &TransportConfig,
        rate_limit_per_minute: u32,
    ) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, auth, transport, rate_limit_per_minute)
    }

    /// Build a client against an explicit base URL (tests point this at
    /// a mock server).
    pub fn with_base_url(
        base_url: &str,
        auth: Arc<Authenticator>,
        transport: &TransportConfig,
        rate_limit_per_minute: u32,
    ) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        // Joining relative paths needs a trailing slash on the base.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            auth,
            limiter: RateLimiter::new(rate_limit_per_minute),
        })
    }

    /// The shared authenticator.
    pub fn auth(&self) -> &Arc<Authenticator> {
        &self.auth
    }

    /// Requests recorded in the limiter's current window.
    pub async fn calls_in_window(&self) -> usize {
        self.limiter.calls_in_window().await
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Enumerate the account's pool controllers.
    pub async fn list_devices(&self) -> Result<Vec<DeviceResponse>, Error> {
        let env: ListEnvelope<DeviceResponse> = self.get("generic/devices", &[]).await?;
        Ok(env.into_vec())
    }

    /// Fetch the reported component states of one device.
    pub async fn device_components(
        &self,
        device_id: &str,
    ) -> Result<Vec<ComponentStateResponse>, Error> {
        let path = format!("generic/devices/{device_id}/components");
        let env: ListEnvelope<ComponentStateResponse> =
            self.get(&path, &[DEVICE_TYPE_QUERY]).await?;
        Ok(env.into_vec())
    }

    /// Write a desired value to one component.
    ///
    /// The gateway acknowledges with 200; the new value only becomes
    /// observable on a subsequent component fetch.
    pub async fn set_desired_value(
        &self,
        device_id: &str,
        component_id: u32,
        value: Value,
    ) -> Result<(), Error> {
        let path = format!("generic/devices/{device_id}/components/{component_id}");
        let body = DesiredValueRequest {
            desired_value: value,
        };
        self.put_no_response(&path, &[DEVICE_TYPE_QUERY], &body)
            .await
    }

    /// Fetch the consumer record for the signed-in account.
    pub async fn consumer_profile(&self) -> Result<ConsumerResponse, Error> {
        self.get("mobile/consumers/me", &[]).await
    }

    /// Fetch the user profile for the signed-in account.
    pub async fn user_profile(&self) -> Result<UserProfileResponse, Error> {
        self.get("generic/users/me", &[]).await
    }

    /// Fetch the pools the signed-in account can access.
    pub async fn user_pools(&self) -> Result<Vec<UserPoolResponse>, Error> {
        let env: ListEnvelope<UserPoolResponse> = self.get("generic/users/me/pools", &[]).await?;
        Ok(env.into_vec())
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.send_with_reauth(|| self.http.get(url.clone()).query(query)).await?;
        handle_response(resp).await
    }

    async fn put_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self
            .send_with_reauth(|| self.http.put(url.clone()).query(query).json(body))
            .await?;
        handle_empty(resp).await
    }

    /// Send a request, retrying once through a forced re-authentication
    /// if the gateway rejects the token with 401.
    async fn send_with_reauth(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        self.limiter.acquire().await;
        self.auth.refresh_if_needed().await?;

        let headers = self.auth.auth_headers().await?;
        let resp = build().headers(headers).send().await?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        debug!("gateway rejected token (401), re-authenticating");
        self.auth.authenticate().await?;

        self.limiter.acquire().await;
        let headers = self.auth.auth_headers().await?;
        Ok(build().headers(headers).send().await?)
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(parse_error(status, resp).await);
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview = &body[..body.len().min(200)];
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
    if status == StatusCode::UNAUTHORIZED {
        return Error::SessionExpired;
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        return Error::RateLimited { retry_after_secs };
    }

    let body = resp.text().await.unwrap_or_default();
    Error::Api {
        status: status.as_u16(),
        message: body[..body.len().min(200)].to_owned(),
    }
}
