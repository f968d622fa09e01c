//! HTTP client for the crossbar REST API: operator authentication and
//! quick-call placement.

use crate::error::crossbar::CrossbarError;
use crate::session::Session;

use common::{ErrorLocation, HttpStatusCode, RedactedSecret};

use std::panic::Location;
use std::time::Duration;

use log::{debug, info};
use md5::{Digest, Md5};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

const DEFAULT_TIMEOUT_DURATION: Duration = Duration::from_secs(30);
const AUTH_TOKEN_HEADER_KEY: &str = "X-Auth-Token";
const USER_AUTH_ENDPOINT: &str = "user_auth";

/// What the operator types in to sign in.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: RedactedSecret,
    pub account_name: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: RedactedSecret,
        account_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password,
            account_name: account_name.into(),
        }
    }

    /// Lowercase hex MD5 of `"username:password"`, the form crossbar expects.
    pub fn digest(&self) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.username.as_bytes());
        hasher.update(b":");
        hasher.update(self.password.expose().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[derive(Serialize)]
struct UserAuthRequest<'a> {
    data: UserAuthData<'a>,
}

#[derive(Serialize)]
struct UserAuthData<'a> {
    credentials: String,
    account_name: &'a str,
}

#[derive(Deserialize)]
struct UserAuthResponse {
    data: UserAuthAccount,
    auth_token: String,
}

#[derive(Deserialize)]
struct UserAuthAccount {
    account_id: String,
    owner_id: String,
}

#[derive(Clone)]
pub struct CrossbarClient {
    base_url: Url,
    client: Client,
}

impl CrossbarClient {
    /// `base_url_str` is the API root, e.g. `https://host:8443/v2/`. A missing
    /// trailing slash is added so relative joins keep the version segment.
    pub fn new(base_url_str: &str) -> Result<Self, CrossbarError> {
        let base_url = if base_url_str.ends_with('/') {
            Url::parse(base_url_str)?
        } else {
            Url::parse(&format!("{base_url_str}/"))?
        };
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT_DURATION)
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchange credentials for a [`Session`].
    ///
    /// # Errors
    ///
    /// - [`CrossbarError::Rejected`] for a non-2xx response, carrying the
    ///   response's `message` field verbatim
    /// - [`CrossbarError::Http`] / [`CrossbarError::Json`] for transport or body errors
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, CrossbarError> {
        let url = self.base_url.join(USER_AUTH_ENDPOINT)?;

        let body = UserAuthRequest {
            data: UserAuthData {
                credentials: credentials.digest(),
                account_name: &credentials.account_name,
            },
        };

        debug!(
            "Authenticating user '{}' on account '{}'",
            credentials.username, credentials.account_name
        );

        let response = self.client.put(url).json(&body).send().await?;
        let response = ensure_success(response).await?;

        let auth: UserAuthResponse = serde_json::from_str(&response.text().await?)?;
        info!("Authenticated on account {}", auth.data.account_id);

        Ok(Session::new(
            auth.data.account_id,
            auth.data.owner_id,
            RedactedSecret::new(auth.auth_token),
        ))
    }

    /// Ask crossbar to ring `extension` on behalf of the session's owner.
    ///
    /// Returns the call info document crossbar answers with.
    pub async fn quickcall(&self, session: &Session, extension: &str) -> Result<Value, CrossbarError> {
        let url = self.base_url.join(&format!(
            "accounts/{}/users/{}/quickcall/{}",
            session.account_id, session.owner_id, extension
        ))?;

        let response = self
            .client
            .get(url)
            .header(AUTH_TOKEN_HEADER_KEY, session.auth_token.expose())
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let call_info: Value = serde_json::from_str(&response.text().await?)?;
        Ok(call_info)
    }
}

/// The body's `message` field when present, otherwise status and raw body.
#[track_caller]
fn rejected(status: HttpStatusCode, body: &str) -> CrossbarError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| format!("HTTP {status} - {body}"));

    CrossbarError::Rejected {
        status,
        message,
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Pass 2xx through; turn anything else into [`CrossbarError::Rejected`].
async fn ensure_success(response: Response) -> Result<Response, CrossbarError> {
    let status = HttpStatusCode::from(response.status().as_u16());
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(rejected(status, &body))
}
