use chrono::{Duration, Utc};
use immersion_models::Identity;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::error::SourceError;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Shown when a password sign-in succeeds for an account whose email is unverified
pub const VERIFY_EMAIL_MESSAGE: &str = "Please verify your email before logging in.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Firebase Authentication over the Identity Toolkit REST API
#[derive(Clone)]
pub struct FirebaseAuthClient {
    client: Arc<Client>,
    api_key: String,
}

impl FirebaseAuthClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key,
        }
    }

    async fn post<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, SourceError> {
        let url = format!("{}/accounts:{}", IDENTITY_TOOLKIT_URL, method);
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Auth(auth_error_message(&body)));
        }
        Ok(response.json().await?)
    }

    /// Sign in with email and password; unverified accounts get a fresh verification email and are refused
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, SourceError> {
        let response: SignInResponse = self
            .post(
                "signInWithPassword",
                &json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        let identity = identity_from_sign_in(response)?;

        let account = self.lookup(&identity.id_token).await?;
        if !account.email_verified {
            self.send_verification_email(&identity.id_token).await?;
            return Err(SourceError::Auth(VERIFY_EMAIL_MESSAGE.to_string()));
        }

        info!(user_id = %identity.user_id, "Signed in");
        Ok(Identity {
            display_name: identity.display_name.or(account.display_name),
            ..identity
        })
    }

    /// Create an account, set its display name, and send the verification email
    ///
    /// The new account cannot sign in until the email is verified.
    pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<(), SourceError> {
        let response: SignInResponse = self
            .post(
                "signUp",
                &json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        let _: Value = self
            .post(
                "update",
                &json!({ "idToken": response.id_token, "displayName": display_name, "returnSecureToken": false }),
            )
            .await?;
        self.send_verification_email(&response.id_token).await?;
        info!(user_id = %response.local_id, "Account created, verification email sent");
        Ok(())
    }

    pub async fn lookup(&self, id_token: &str) -> Result<AccountInfo, SourceError> {
        let response: LookupResponse = self.post("lookup", &json!({ "idToken": id_token })).await?;
        response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::Auth("No account found with this email.".to_string()))
    }

    pub async fn send_verification_email(&self, id_token: &str) -> Result<(), SourceError> {
        let _: Value = self
            .post("sendOobCode", &json!({ "requestType": "VERIFY_EMAIL", "idToken": id_token }))
            .await?;
        debug!("Verification email sent");
        Ok(())
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), SourceError> {
        let _: Value = self
            .post("sendOobCode", &json!({ "requestType": "PASSWORD_RESET", "email": email }))
            .await?;
        debug!("Password reset email sent");
        Ok(())
    }

    /// Exchange the refresh token for a new id token
    pub async fn refresh(&self, identity: &Identity) -> Result<Identity, SourceError> {
        let response = self
            .client
            .post(SECURE_TOKEN_URL)
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", identity.refresh_token.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Token refresh failed: {}", body);
            return Err(SourceError::Auth(auth_error_message(&body)));
        }

        let refreshed: RefreshResponse = response.json().await?;
        Ok(Identity {
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: Utc::now() + Duration::seconds(parse_expires_in(&refreshed.expires_in)?),
            ..identity.clone()
        })
    }
}

fn identity_from_sign_in(response: SignInResponse) -> Result<Identity, SourceError> {
    let expires_in = parse_expires_in(&response.expires_in)?;
    Ok(Identity {
        user_id: response.local_id,
        email: response.email,
        display_name: response.display_name.filter(|name| !name.is_empty()),
        id_token: response.id_token,
        refresh_token: response.refresh_token,
        expires_at: Utc::now() + Duration::seconds(expires_in),
    })
}

fn parse_expires_in(value: &str) -> Result<i64, SourceError> {
    value
        .parse::<i64>()
        .map_err(|_| SourceError::new_decode(format!("bad expiresIn: {}", value)))
}

/// Turn an Identity Toolkit error body into a message for the user
///
/// Error messages look like `WEAK_PASSWORD : Password should be at least 6 characters`;
/// only the code before ` : ` is significant.
pub fn auth_error_message(body: &str) -> String {
    let raw = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    let code = raw.split(" : ").next().unwrap_or_default().trim();

    match code {
        "EMAIL_EXISTS" => "This email is already in use.".to_string(),
        "INVALID_EMAIL" => "Invalid email address.".to_string(),
        "WEAK_PASSWORD" => "Password should be at least 6 characters.".to_string(),
        "USER_DISABLED" => "This account has been disabled.".to_string(),
        "EMAIL_NOT_FOUND" => "No account found with this email.".to_string(),
        "INVALID_PASSWORD" => "Incorrect password.".to_string(),
        "INVALID_LOGIN_CREDENTIALS" => "Incorrect email or password.".to_string(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many requests. Please try again later.".to_string(),
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "INVALID_ID_TOKEN" => {
            "Your session has expired. Please log in again.".to_string()
        }
        _ => raw,
    }
}
