//! Canned responder driven by an ordered keyword table
//!
//! This is what answers when no language model is wired in. Rules are tried
//! top to bottom against the lower-cased input and the first hit wins.

use crate::types::Turn;

/// Default display name of the assistant
pub const DEFAULT_ASSISTANT_NAME: &str = "Friday";

/// Default reply length limit, in characters
pub const DEFAULT_MAX_RESPONSE_LENGTH: usize = 120;

/// Placeholder substituted with the assistant name
const NAME: &str = "{name}";

/// A keyword rule: any of `keywords` as a substring selects `reply`.
struct Rule {
    keywords: &'static [&'static str],
    reply: &'static str,
}

/// Order matters: "hello, tell me a joke" must hit the greeting.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["hello", "hi"],
        reply: "Hello there! I'm {name}, your AI assistant. How can I help you today?",
    },
    Rule {
        keywords: &["how are you"],
        reply: "I'm functioning at optimal capacity. Just a bit sarcastic today.",
    },
    Rule {
        keywords: &["your name"],
        reply: "I'm {name}, your AI assistant with a touch of dark humor.",
    },
    Rule {
        keywords: &["joke", "funny"],
        reply: "Why don't scientists trust atoms? Because they make up everything. Just like my responses.",
    },
    Rule {
        keywords: &["weather"],
        reply: "I'm not connected to weather services, but I'm pretty sure it's either raining, sunny, or something in between.",
    },
    Rule {
        keywords: &["time"],
        reply: "It's time to get a watch. Just kidding, I don't have access to the current time.",
    },
];

const FALLBACK: &str = "I'm {name}, running in demo mode without Ollama. I can't provide a meaningful response to that, but I would if I could!";

/// The stub response generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRules {
    assistant_name: String,
    max_response_length: usize,
}

impl Default for ResponseRules {
    fn default() -> Self {
        Self::new(DEFAULT_ASSISTANT_NAME, DEFAULT_MAX_RESPONSE_LENGTH)
    }
}

impl ResponseRules {
    pub fn new(assistant_name: impl Into<String>, max_response_length: usize) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            max_response_length,
        }
    }

    /// Pick a reply for `input`.
    ///
    /// Matching is plain substring search on the lower-cased input, so "this"
    /// counts as containing "hi". The history is accepted for parity with a
    /// model backend but the table ignores it. Never fails.
    pub fn generate(&self, input: &str, _history: &[Turn]) -> String {
        let lowered = input.to_lowercase();
        let template = RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
            .map(|rule| rule.reply)
            .unwrap_or(FALLBACK);

        let reply = template.replace(NAME, &self.assistant_name);
        truncate_chars(&reply, self.max_response_length)
    }
}

/// Cut `text` to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
