use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub assistant: AssistantConfig,
    pub chunk: ChunkSettings,
    pub poll: PollConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            upload: UploadConfig::from_env(),
            assistant: AssistantConfig::from_env(),
            chunk: ChunkSettings::from_env(),
            poll: PollConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:     {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  upload:     dir={}, max_bytes={}",
            self.upload.dir.display(),
            self.upload.max_upload_bytes
        );
        tracing::info!(
            "  assistant:  endpoint={}, deployment={}, configured={}",
            self.assistant.endpoint.as_deref().unwrap_or("(none)"),
            self.assistant.deployment,
            self.assistant.is_configured()
        );
        tracing::info!("  chunk:      max_chars={}", self.chunk.max_chars);
        tracing::info!(
            "  poll:       initial={}ms, floor={}ms, step={}ms, timeout={}s",
            self.poll.initial_ms,
            self.poll.floor_ms,
            self.poll.step_ms,
            self.poll.timeout_seconds
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 3002),
        }
    }
}

// ── Uploads ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory where uploads are staged before extraction.
    pub dir: PathBuf,
    /// Request body cap for the analyze route, in bytes.
    pub max_upload_bytes: usize,
}

impl UploadConfig {
    fn from_env() -> Self {
        Self {
            dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            max_upload_bytes: env_usize("MAX_UPLOAD_BYTES", 50 * 1024 * 1024),
        }
    }
}

// ── Assistant service (Azure OpenAI) ──────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: String,
    pub api_version: String,
}

impl AssistantConfig {
    fn from_env() -> Self {
        Self {
            endpoint: env_opt("AZURE_OPENAI_ENDPOINT"),
            api_key: env_opt("AZURE_OPENAI_KEY"),
            deployment: env_or("AZURE_OPENAI_DEPLOYMENT_NAME", "gpt-4o"),
            api_version: env_or("AZURE_OPENAI_API_VERSION", "2024-05-01-preview"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.api_key.is_some()
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSettings {
    /// Maximum characters per submitted chunk.
    pub max_chars: usize,
}

impl ChunkSettings {
    fn from_env() -> Self {
        Self {
            max_chars: env_usize("MAX_CHUNK_CHARS", 2000),
        }
    }
}

// ── Run polling ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// First wait between status polls, in milliseconds.
    pub initial_ms: u64,
    /// Smallest wait between status polls, in milliseconds.
    pub floor_ms: u64,
    /// Amount each wait shrinks by until it reaches the floor.
    pub step_ms: u64,
    /// Overall deadline for a run, in seconds.
    pub timeout_seconds: u64,
}

impl PollConfig {
    fn from_env() -> Self {
        Self {
            initial_ms: env_u64("POLL_INITIAL_MS", 10_000),
            floor_ms: env_u64("POLL_FLOOR_MS", 2_000),
            step_ms: env_u64("POLL_STEP_MS", 2_000),
            timeout_seconds: env_u64("RUN_TIMEOUT_SECONDS", 300),
        }
    }
}
