//! Publish numbered lines of text as a reply-chained thread on X.
//!
//! This library handles:
//! - Reading credentials and settings from the environment
//! - Signing X API v2 calls with OAuth 1.0a user context
//! - Splitting `1/ ... 2/ ...` style text into post bodies
//! - Posting the bodies in order, each replying to the one before

pub mod client;
pub mod config;
pub mod error;
pub mod oauth;
pub mod parser;
pub mod poster;

pub use client::{Account, Connector, CreatedPost, PostingApi, Session, XClient, XConnector};
pub use config::{Config, Credentials};
pub use error::ApiError;
pub use parser::parse_thread_input;
pub use poster::{post_thread, publish_thread, PostOptions, ThreadReport};
