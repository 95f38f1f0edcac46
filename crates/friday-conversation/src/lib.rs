//! friday-conversation: the rolling conversation log
//!
//! This crate owns the ordered log of turns, its JSON file persistence, and
//! the mutex-guarded store handle that HTTP handlers share.

pub mod error;
pub mod log;
pub mod persistence;
pub mod store;

pub use error::{Error, Result};
pub use log::ConversationLog;
pub use persistence::{ConversationFile, PERSISTED_TURNS};
pub use store::{ConversationStore, StoreSettings};
