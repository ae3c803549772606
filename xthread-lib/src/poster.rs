//! Publishing a parsed thread as a reply chain.
//!
//! Posts go out strictly in order: each one needs the id of the post before
//! it. The first failure stops the run and nothing already published is
//! rolled back, so a partially posted thread is a normal outcome.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::client::{Connector, PostingApi};
use crate::config::Config;
use crate::error::ApiError;
use crate::parser::parse_thread_input;

/// Characters of post text shown in progress lines.
pub const PREVIEW_CHARS: usize = 40;

/// Per-post limit on the platform. Not enforced here; longer posts are sent
/// as-is and the API decides.
pub const MAX_POST_CHARS: usize = 280;

pub const NO_TEXT_MESSAGE: &str = "Error: No thread text provided.";
pub const EMPTY_INPUT_MESSAGE: &str = "Error: Input is empty or invalid.";
pub const HALT_MESSAGE: &str = "🛑 Halting thread due to error.";
pub const COMPLETE_MESSAGE: &str = "\n🎉 Full thread posted successfully!";

#[derive(Debug, Clone)]
pub struct PostOptions {
    /// Root of the status links written to the log.
    pub status_url_base: String,
    /// Pause after each created post.
    pub delay: Duration,
}

impl Default for PostOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PostOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            status_url_base: config.status_url_base.clone(),
            delay: config.post_delay,
        }
    }
}

/// Outcome of one thread request: the progress log and whether every post
/// went out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadReport {
    pub success: bool,
    pub log: Vec<String>,
}

impl ThreadReport {
    /// A failed report with a single log line.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            log: vec![message.into()],
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `text`.
pub fn preview(text: &str) -> &str {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Public link to a created post.
pub fn status_url(base: &str, username: &str, id: &str) -> String {
    format!("{}/{}/status/{}", base.trim_end_matches('/'), username, id)
}

pub fn auth_error_message(err: &ApiError) -> String {
    format!(
        "❌ Authentication Error: {}. Check your API keys and permissions in your environment variables.",
        err
    )
}

/// Post `posts` in order, each one replying to the post created before it.
///
/// Stops at the first failed post. The report's log holds a progress line per
/// attempt, a success line with the status link per created post, and either
/// an error line plus a halting line or a final completion line.
pub async fn post_thread(
    api: &dyn PostingApi,
    username: &str,
    posts: &[String],
    options: &PostOptions,
) -> ThreadReport {
    let total = posts.len();
    let mut log = Vec::with_capacity(total * 2 + 1);
    let mut previous_id: Option<String> = None;

    for (i, text) in posts.iter().enumerate() {
        let number = i + 1;
        log.push(format!(
            "Posting tweet {}/{}: \"{}...\"",
            number,
            total,
            preview(text)
        ));

        let length = text.chars().count();
        if length > MAX_POST_CHARS {
            warn!(
                number,
                length,
                limit = MAX_POST_CHARS,
                "Post exceeds character limit; sending anyway"
            );
        }

        match api.create_post(text, previous_id.as_deref()).await {
            Ok(created) => {
                let url = status_url(&options.status_url_base, username, &created.id);
                info!(number, total, id = %created.id, "Posted {} of {}", number, total);

                log.push(format!("✅ Success! URL: {}", url));
                previous_id = Some(created.id);

                if !options.delay.is_zero() {
                    tokio::time::sleep(options.delay).await;
                }
            }
            Err(e) => {
                error!(number, total, error = %e, "Failed to create post");

                log.push(format!("❌ Error on tweet {}: {}", number, e));
                log.push(HALT_MESSAGE.to_string());
                return ThreadReport {
                    success: false,
                    log,
                };
            }
        }
    }

    log.push(COMPLETE_MESSAGE.to_string());
    ThreadReport { success: true, log }
}

/// Parse `thread_text`, authenticate, and post the thread.
///
/// No API call is made when the text holds no posts. An authentication
/// failure ends the request with a single log line.
pub async fn publish_thread(
    connector: &dyn Connector,
    thread_text: &str,
    options: &PostOptions,
) -> ThreadReport {
    let posts = parse_thread_input(thread_text);
    if posts.is_empty() {
        return ThreadReport::failure(EMPTY_INPUT_MESSAGE);
    }

    let session = match connector.connect().await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Authentication failed");
            return ThreadReport::failure(auth_error_message(&e));
        }
    };

    info!(
        posts = posts.len(),
        username = %session.username,
        "Publishing thread"
    );

    post_thread(session.api.as_ref(), &session.username, &posts, options).await
}
