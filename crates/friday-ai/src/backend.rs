//! Backend selection: canned rules, a real model, or nothing yet

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::rules::{ResponseRules, truncate_chars};
use crate::{Error, Result, Turn};

/// Trait for language model clients
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier shown in logs (e.g. "llama3")
    fn name(&self) -> &str;

    /// Produce a reply to `input` given the prior conversation
    async fn complete(&self, system_prompt: &str, history: &[Turn], input: &str) -> Result<String>;
}

/// What answers chat requests.
#[derive(Clone)]
pub enum Backend {
    /// Keyword rule table, always available
    Stub(ResponseRules),
    /// Nothing can answer yet
    Unavailable,
    /// A language model client; replies are cut to `max_response_length` characters
    Ready {
        model: Arc<dyn ChatModel>,
        max_response_length: usize,
    },
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Stub(rules) => f.debug_tuple("Stub").field(rules).finish(),
            Backend::Unavailable => f.write_str("Unavailable"),
            Backend::Ready {
                model,
                max_response_length,
            } => f
                .debug_struct("Ready")
                .field("model", &model.name())
                .field("max_response_length", max_response_length)
                .finish(),
        }
    }
}

impl Backend {
    /// Rule-table backend with the given persona settings
    pub fn stub(assistant_name: impl Into<String>, max_response_length: usize) -> Self {
        Backend::Stub(ResponseRules::new(assistant_name, max_response_length))
    }

    /// Model backend whose replies are cut to `max_response_length` characters
    pub fn ready(model: Arc<dyn ChatModel>, max_response_length: usize) -> Self {
        Backend::Ready {
            model,
            max_response_length,
        }
    }

    pub fn is_ready(&self) -> bool {
        !matches!(self, Backend::Unavailable)
    }

    /// Short label for health output and logs
    pub fn label(&self) -> &str {
        match self {
            Backend::Stub(_) => "stub",
            Backend::Unavailable => "unavailable",
            Backend::Ready { model, .. } => model.name(),
        }
    }

    /// Generate a reply, cut to the length limit the backend was built with.
    pub async fn respond(&self, input: &str, history: &[Turn], system_prompt: &str) -> Result<String> {
        match self {
            Backend::Stub(rules) => Ok(rules.generate(input, history)),
            Backend::Unavailable => Err(Error::Unavailable),
            Backend::Ready {
                model,
                max_response_length,
            } => {
                tracing::debug!(model = model.name(), turns = history.len(), "Querying model");
                let reply = model.complete(system_prompt, history, input).await?;
                Ok(truncate_chars(reply.trim(), *max_response_length))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, system_prompt: &str, history: &[Turn], input: &str) -> Result<String> {
            Ok(format!("  [{}|{}] {}  ", system_prompt, history.len(), input))
        }
    }

    struct BrokenModel;

    #[async_trait]
    impl ChatModel for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        async fn complete(&self, _: &str, _: &[Turn], _: &str) -> Result<String> {
            Err(Error::model("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_stub_uses_rules() {
        let backend = Backend::stub("Friday", 120);
        let reply = backend.respond("hello", &[], "").await.unwrap();
        assert!(reply.contains("Friday"));
        assert!(backend.is_ready());
        assert_eq!(backend.label(), "stub");
    }

    #[tokio::test]
    async fn test_unavailable_refuses() {
        let backend = Backend::Unavailable;
        assert!(!backend.is_ready());
        let err = backend.respond("hello", &[], "").await.unwrap_err();
        assert!(err.is_not_ready());
    }

    #[tokio::test]
    async fn test_ready_trims_and_truncates() {
        let history = vec![Turn::user("a"), Turn::assistant("b")];
        let backend = Backend::ready(Arc::new(EchoModel), 120);
        let reply = backend.respond("hi", &history, "sys").await.unwrap();
        assert_eq!(reply, "[sys|2] hi");
        assert_eq!(backend.label(), "echo");

        let short = Backend::ready(Arc::new(EchoModel), 4);
        assert_eq!(short.respond("hi", &history, "sys").await.unwrap(), "[sys");
    }

    #[tokio::test]
    async fn test_stub_limit_comes_from_its_rules() {
        let backend = Backend::stub("Friday", 10);
        let reply = backend.respond("weather", &[], "").await.unwrap();
        assert_eq!(reply, "I'm not co");
    }

    #[tokio::test]
    async fn test_ready_propagates_model_errors() {
        let backend = Backend::ready(Arc::new(BrokenModel), 120);
        let err = backend.respond("hi", &[], "").await.unwrap_err();
        assert!(matches!(err, Error::Model(_)));
    }

    #[test]
    fn test_debug_shows_model_name() {
        let backend = Backend::ready(Arc::new(EchoModel), 120);
        assert_eq!(
            format!("{:?}", backend),
            "Ready { model: \"echo\", max_response_length: 120 }"
        );
    }
}
