use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Config, Credentials};
use crate::error::ApiError;
use crate::oauth::OAuthKeys;

// ============================================================================
// Public Types
// ============================================================================

/// The account the credentials act for.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub username: String,
}

/// A post the API has just created.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPost {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// The two remote calls a thread needs.
#[async_trait]
pub trait PostingApi: Send + Sync {
    /// Look up the authenticated account.
    async fn me(&self) -> Result<Account, ApiError>;

    /// Create a post, optionally as a reply to `reply_to`.
    async fn create_post(
        &self,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<CreatedPost, ApiError>;
}

/// An authenticated handle plus the username used to build status links.
pub struct Session {
    pub api: Box<dyn PostingApi>,
    pub username: String,
}

/// Builds an authenticated [`Session`] for one request.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Session, ApiError>;
}

// ============================================================================
// Internal API Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct CreatePostRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplySettings<'a>>,
}

#[derive(Debug, Serialize)]
struct ReplySettings<'a> {
    in_reply_to_tweet_id: &'a str,
}

// ============================================================================
// X API v2 Client
// ============================================================================

/// X API v2 client signing every call with OAuth 1.0a user context.
pub struct XClient {
    http: reqwest::Client,
    base_url: String,
    keys: OAuthKeys,
}

impl XClient {
    pub fn new(http: reqwest::Client, base_url: &str, keys: OAuthKeys) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            keys,
        }
    }
}

#[async_trait]
impl PostingApi for XClient {
    async fn me(&self) -> Result<Account, ApiError> {
        let url = format!("{}/2/users/me", self.base_url);
        let authorization = self.keys.authorization_header("GET", &url, &[])?;

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;

        read_data(response).await
    }

    async fn create_post(
        &self,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<CreatedPost, ApiError> {
        let url = format!("{}/2/tweets", self.base_url);
        // JSON bodies are not part of the signature base string
        let authorization = self.keys.authorization_header("POST", &url, &[])?;

        let request = CreatePostRequest {
            text,
            reply: reply_to.map(|id| ReplySettings {
                in_reply_to_tweet_id: id,
            }),
        };

        debug!(reply_to = ?reply_to, "Creating post");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .json(&request)
            .send()
            .await?;

        read_data(response).await
    }
}

async fn read_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status,
            detail: error_detail(&body),
        });
    }

    let envelope: DataEnvelope<T> =
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

    envelope.data.ok_or_else(|| {
        let messages = error_messages(&envelope.errors);
        if messages.is_empty() {
            ApiError::Decode("response has no data".to_string())
        } else {
            ApiError::Decode(messages.join("\n"))
        }
    })
}

/// Human-readable message from an X API error body. Falls back to the raw
/// body when it is not the usual problem JSON.
fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let mut messages = value
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| error_messages(errors))
        .unwrap_or_default();

    if messages.is_empty() {
        if let Some(detail) = value
            .get("detail")
            .or_else(|| value.get("title"))
            .and_then(Value::as_str)
        {
            messages.push(detail.to_string());
        }
    }

    if messages.is_empty() {
        body.trim().to_string()
    } else {
        messages.join("\n")
    }
}

fn error_messages(errors: &[Value]) -> Vec<String> {
    errors
        .iter()
        .filter_map(|e| {
            e.get("message")
                .or_else(|| e.get("detail"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Connector
// ============================================================================

/// Connects to the X API with the credentials from [`Config`].
pub struct XConnector {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl XConnector {
    pub fn new(http: reqwest::Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            credentials,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            reqwest::Client::new(),
            &config.api_base_url,
            config.credentials.clone(),
        )
    }
}

#[async_trait]
impl Connector for XConnector {
    async fn connect(&self) -> Result<Session, ApiError> {
        let keys = self.credentials.require()?;
        let client = XClient::new(self.http.clone(), &self.base_url, keys);

        let account = client.me().await?;
        info!(username = %account.username, "Authenticated");

        Ok(Session {
            api: Box::new(client),
            username: account.username,
        })
    }
}
