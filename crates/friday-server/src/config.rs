//! Configuration file support

use friday_ai::{Backend, DEFAULT_ASSISTANT_NAME, DEFAULT_MAX_RESPONSE_LENGTH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which backend answers chat requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Keyword rule table
    #[default]
    Stub,
    /// No backend; every chat gets the "still initializing" reply
    None,
}

/// Configuration for the Friday service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display name of the assistant
    pub assistant_name: String,
    /// Maximum reply length, in characters
    pub max_response_length: usize,
    /// Where the rolling conversation log is stored
    pub conversation_file: PathBuf,
    /// Model a real backend would load (unused by the stub)
    pub ollama_model: String,
    /// Backend selection
    pub backend: BackendKind,
    /// Address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Speech synthesis settings (not wired to anything)
    pub tts: TtsConfig,
    /// Cross-origin policy
    pub cors: CorsConfig,
}

/// Speech synthesis settings, kept so existing config files stay valid
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub model: String,
    pub speaker: String,
    pub speed: f32,
    pub temp_audio_dir: PathBuf,
}

/// Cross-origin policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            max_response_length: DEFAULT_MAX_RESPONSE_LENGTH,
            conversation_file: PathBuf::from("conversation_history.json"),
            ollama_model: "llama3".to_string(),
            backend: BackendKind::Stub,
            host: "0.0.0.0".to_string(),
            port: 8000,
            tts: TtsConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            model: "tts_models/en/vctk/vits".to_string(),
            speaker: "p360".to_string(),
            speed: 1.25,
            temp_audio_dir: PathBuf::from("audio_temp"),
        }
    }
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("friday")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for FRIDAY_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("FRIDAY_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file at `path` if it doesn't exist
    pub fn init(path: &Path) -> std::io::Result<PathBuf> {
        if !path.exists() {
            Self::default().save_to(path)?;
        }
        Ok(path.to_path_buf())
    }

    /// Persona prompt handed to model backends
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {name}, an advanced AI assistant with a dry, deadpan sense of humor.\n\
             Never use asterisks or special characters; speak everything directly.\n\
             Keep responses under {limit} characters. Be concise.\n\
             When interrupted with \"{name}\", respond immediately with a short answer.",
            name = self.assistant_name,
            limit = self.max_response_length,
        )
    }

    /// The backend this configuration asks for
    pub fn backend(&self) -> Backend {
        match self.backend {
            BackendKind::Stub => Backend::stub(&self.assistant_name, self.max_response_length),
            BackendKind::None => Backend::Unavailable,
        }
    }

    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# friday configuration file
# Place at ~/.config/friday/config.toml (Linux) or point FRIDAY_CONFIG_PATH at it

# Name the assistant introduces itself with
assistant_name = "Friday"

# Replies are cut to this many characters
max_response_length = 120

# Rolling conversation log (last 20 turns are kept on disk)
conversation_file = "conversation_history.json"

# Backend answering chats: "stub" (keyword rules) or "none"
backend = "stub"

# Model a language model backend would load
ollama_model = "llama3"

host = "0.0.0.0"
port = 8000

[cors]
# Leave empty to allow any origin
# allowed_origins = ["http://localhost:5173"]

# Speech settings are accepted but not used
[tts]
model = "tts_models/en/vctk/vits"
speaker = "p360"
speed = 1.25
temp_audio_dir = "audio_temp"
"#
}
