//! friday-ai: response generation for the Friday assistant
//!
//! This crate provides the conversation turn types, the canned rule-table
//! responder and the backend seam a real language model plugs into.

pub mod backend;
pub mod error;
pub mod rules;
pub mod types;

pub use backend::{Backend, ChatModel};
pub use error::{Error, Result};
pub use rules::{DEFAULT_ASSISTANT_NAME, DEFAULT_MAX_RESPONSE_LENGTH, ResponseRules, truncate_chars};
pub use types::{Role, Turn};
