// Cognito authentication for the Fluidra Pool cloud.
//
// Fluidra fronts its API with an AWS Cognito user pool. We speak the
// Cognito JSON HTTP API directly (`X-Amz-Target` framing) rather than
// pulling in an AWS SDK: the integration only ever needs InitiateAuth
// with the USER_PASSWORD_AUTH and REFRESH_TOKEN_AUTH flows.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Cognito region for the Fluidra EMEA user pool.
pub const DEFAULT_REGION: &str = "eu-west-1";

/// App client id registered for the Fluidra mobile app.
pub const DEFAULT_CLIENT_ID: &str = "g3njunelkcbtefosqm9bdhhq1";

/// Tokens are refreshed once they are within this window of expiry.
const TOKEN_REFRESH_THRESHOLD_MINUTES: i64 = 10;

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_INITIATE_AUTH: &str = "AWSCognitoIdentityProviderService.InitiateAuth";

// ── Configuration ───────────────────────────────────────────────────

/// Identity-provider configuration.
///
/// `endpoint` overrides the derived regional URL; tests point it at a
/// mock server.
#[derive(Debug, Clone)]
pub struct CognitoConfig {
    pub region: String,
    pub client_id: String,
    pub endpoint: Option<Url>,
}

impl Default for CognitoConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_owned(),
            client_id: DEFAULT_CLIENT_ID.to_owned(),
            endpoint: None,
        }
    }
}

impl CognitoConfig {
    /// The InitiateAuth endpoint URL.
    fn endpoint_url(&self) -> Result<Url, Error> {
        match &self.endpoint {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::parse(&format!(
                "https://cognito-idp.{}.amazonaws.com/",
                self.region
            ))?),
        }
    }
}

// ── Token set ───────────────────────────────────────────────────────

/// The token triple returned by a successful sign-in.
///
/// The access token authenticates API calls; the id token doubles as
/// the gateway `x-api-key`; the refresh token renews both without a
/// full password round trip.
#[derive(Clone)]
pub struct TokenSet {
    pub access_token: SecretString,
    pub id_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// `true` once the token is inside the refresh threshold.
    fn needs_refresh(&self) -> bool {
        Utc::now() + ChronoDuration::minutes(TOKEN_REFRESH_THRESHOLD_MINUTES) >= self.expires_at
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("expires_at", &self.expires_at)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}

// ── Cognito wire types ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: std::collections::HashMap<&'a str, &'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: String,
    refresh_token: Option<String>,
    /// Lifetime in seconds. Cognito defaults to one hour.
    expires_in: Option<i64>,
}

/// Cognito error bodies carry `__type` plus an optional message.
#[derive(Deserialize)]
struct CognitoErrorResponse {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    message: Option<String>,
}

// ── Authenticator ───────────────────────────────────────────────────

/// Holds the account credentials and the current token set, and knows
/// how to (re-)establish a session with the identity provider.
///
/// One instance per account session; shared behind an `Arc` between the
/// poll loop and the command dispatcher.
pub struct Authenticator {
    http: reqwest::Client,
    config: CognitoConfig,
    username: String,
    password: SecretString,
    tokens: RwLock<Option<TokenSet>>,
}

impl Authenticator {
    pub fn new(
        username: String,
        password: SecretString,
        config: CognitoConfig,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            config,
            username,
            password,
            tokens: RwLock::new(None),
        })
    }

    /// `true` if a token set is held and outside the refresh window.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens
            .read()
            .await
            .as_ref()
            .is_some_and(|t| !t.needs_refresh())
    }

    /// Perform a full password sign-in, replacing any held tokens.
    pub async fn authenticate(&self) -> Result<(), Error> {
        debug!(username = %self.username, "starting password authentication");

        let params = std::collections::HashMap::from([
            ("USERNAME", self.username.as_str()),
            ("PASSWORD", self.password.expose_secret()),
        ]);
        let tokens = self.initiate_auth("USER_PASSWORD_AUTH", params).await?;

        *self.tokens.write().await = Some(tokens);
        debug!("authentication successful");
        Ok(())
    }

    /// Ensure the held tokens are valid, refreshing or re-authenticating
    /// as needed. Call before every API request.
    pub async fn refresh_if_needed(&self) -> Result<(), Error> {
        let (needs_refresh, refresh_token) = {
            let guard = self.tokens.read().await;
            match guard.as_ref() {
                Some(t) if !t.needs_refresh() => return Ok(()),
                Some(t) => (true, t.refresh_token.clone()),
                None => (false, None),
            }
        };

        if needs_refresh {
            if let Some(refresh) = refresh_token {
                debug!("token expires soon, refreshing");
                match self.refresh(&refresh).await {
                    Ok(()) => return Ok(()),
                    Err(e) => {
                        // A stale refresh token is recoverable with a
                        // full password sign-in.
                        warn!(error = %e, "token refresh failed, re-authenticating");
                    }
                }
            }
        }

        self.authenticate().await
    }

    /// Headers carrying the current token set.
    ///
    /// The gateway wants the id token as `x-api-key` and the access
    /// token both as bearer and as `x-access-token`.
    pub async fn auth_headers(&self) -> Result<HeaderMap, Error> {
        let guard = self.tokens.read().await;
        let tokens = guard.as_ref().ok_or(Error::SessionExpired)?;

        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", tokens.access_token.expose_secret());
        headers.insert("Authorization", sensitive_header(&bearer)?);
        headers.insert(
            "x-api-key",
            sensitive_header(tokens.id_token.expose_secret())?,
        );
        headers.insert(
            "x-access-token",
            sensitive_header(tokens.access_token.expose_secret())?,
        );
        Ok(headers)
    }

    // ── Cognito calls ────────────────────────────────────────────────

    async fn refresh(&self, refresh_token: &SecretString) -> Result<(), Error> {
        let params =
            std::collections::HashMap::from([("REFRESH_TOKEN", refresh_token.expose_secret())]);
        let mut tokens = self.initiate_auth("REFRESH_TOKEN_AUTH", params).await?;

        // Cognito omits the refresh token on refresh responses; keep
        // the one we already hold.
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token.clone());
        }

        *self.tokens.write().await = Some(tokens);
        Ok(())
    }

    async fn initiate_auth(
        &self,
        flow: &str,
        params: std::collections::HashMap<&str, &str>,
    ) -> Result<TokenSet, Error> {
        let url = self.config.endpoint_url()?;
        let request = InitiateAuthRequest {
            auth_flow: flow,
            client_id: &self.config.client_id,
            auth_parameters: params,
        };

        let resp = self
            .http
            .post(url)
            .header("Content-Type", AMZ_JSON)
            .header("X-Amz-Target", TARGET_INITIATE_AUTH)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(parse_cognito_error(&body, status));
        }

        let parsed: InitiateAuthResponse = serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })?;

        if let Some(challenge) = parsed.challenge_name {
            // SRP and password-change challenges need interactive flows
            // the integration does not support.
            return Err(Error::UnsupportedChallenge { challenge });
        }

        let result = parsed
            .authentication_result
            .ok_or_else(|| Error::Authentication {
                message: "no authentication result in response".into(),
            })?;

        let expires_in = result.expires_in.unwrap_or(3600);
        Ok(TokenSet {
            access_token: SecretString::from(result.access_token),
            id_token: SecretString::from(result.id_token),
            refresh_token: result.refresh_token.map(SecretString::from),
            expires_at: Utc::now() + ChronoDuration::seconds(expires_in),
        })
    }
}

fn sensitive_header(value: &str) -> Result<HeaderValue, Error> {
    let mut header = HeaderValue::from_str(value).map_err(|e| Error::Authentication {
        message: format!("token is not a valid header value: {e}"),
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// Translate Cognito's `__type` discriminator into our error taxonomy.
fn parse_cognito_error(body: &str, status: reqwest::StatusCode) -> Error {
    if let Ok(err) = serde_json::from_str::<CognitoErrorResponse>(body) {
        let error_type = err.error_type.unwrap_or_default();
        let message = err.message.unwrap_or_else(|| error_type.clone());
        return match error_type.as_str() {
            "NotAuthorizedException" | "UserNotFoundException" | "UserNotConfirmedException" => {
                Error::Authentication { message }
            }
            "PasswordResetRequiredException" => Error::UnsupportedChallenge {
                challenge: "PASSWORD_RESET_REQUIRED".into(),
            },
            "TooManyRequestsException" => Error::RateLimited {
                retry_after_secs: 0,
            },
            _ => Error::Authentication {
                message: format!("{error_type}: {message}"),
            },
        };
    }

    Error::Api {
        status: status.as_u16(),
        message: body[..body.len().min(200)].to_owned(),
    }
}
