//! Firebase Authentication over its REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth_session::{AuthError, AuthSession, AuthUser, IdentityProvider};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Firebase error codes that mean the user typed something wrong.
const CREDENTIAL_ERRORS: &[&str] = &[
    "EMAIL_NOT_FOUND",
    "INVALID_PASSWORD",
    "INVALID_LOGIN_CREDENTIALS",
    "INVALID_EMAIL",
    "USER_DISABLED",
    "EMAIL_EXISTS",
    "WEAK_PASSWORD",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    id_token: String,
    refresh_token: String,
}

impl From<PasswordResponse> for AuthSession {
    fn from(body: PasswordResponse) -> Self {
        AuthSession {
            user: AuthUser {
                uid: body.local_id,
                email: body.email,
                display_name: body.display_name.filter(|name| !name.is_empty()),
                photo_url: body.photo_url,
            },
            id_token: body.id_token,
            refresh_token: body.refresh_token,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map a Firebase error body to an [`AuthError`].
///
/// Messages look like `"WEAK_PASSWORD : Password should be at least 6
/// characters"`; the code before the colon decides the variant.
fn map_error(status: u16, body: &str) -> AuthError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return AuthError::Provider(format!("HTTP {status}: {body}"));
    };
    let message = envelope.error.message;
    let code = message.split(':').next().unwrap_or_default().trim();
    if CREDENTIAL_ERRORS.contains(&code) {
        AuthError::InvalidCredentials(message)
    } else {
        AuthError::Provider(message)
    }
}

#[derive(Debug, Clone)]
pub struct FirebaseIdentity {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl FirebaseIdentity {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: IDENTITY_TOOLKIT_URL.to_string(),
        }
    }

    /// Point at another Identity Toolkit host, e.g. the local emulator.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.endpoint,
            method,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn password_call(&self, method: &str, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(self.url(method))
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(map_error(status.as_u16(), &body));
        }

        serde_json::from_str::<PasswordResponse>(&body)
            .map(AuthSession::from)
            .map_err(|e| AuthError::Provider(format!("Unexpected sign-in response: {e}")))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn register_with_email(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.password_call("signUp", email, password).await
    }

    /// ID tokens are short-lived bearer tokens; dropping them is enough.
    async fn sign_out(&self, _session: &AuthSession) -> Result<(), AuthError> {
        Ok(())
    }
}
