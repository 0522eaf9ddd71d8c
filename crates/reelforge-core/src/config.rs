//! Configuration module
//!
//! Configuration is read from the process environment exactly once, at
//! startup, into an explicit `Config` struct that is injected into each
//! component at construction. Components never read ambient environment
//! state themselves, which keeps them swappable for test doubles.

use std::env;

use crate::storage_types::StorageBackend;

// Defaults
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_RUNWAY_BASE_URL: &str = "https://api.dev.runwayml.com";
const DEFAULT_SCRIPT_MODEL: &str = "deepseek-chat";
const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";
const DEFAULT_RUNWAY_MODEL: &str = "gen4_turbo";
const DEFAULT_RUNWAY_RATIO: &str = "720:1280";
const DEFAULT_VIDEO_PROMPT: &str = "A cinematic video";
const DEFAULT_SCRIPT_MAX_TOKENS: u32 = 100;
const DEFAULT_IMAGE_COUNT: usize = 4;
const DEFAULT_IMAGE_SIZE: &str = "1024x1536";
const DEFAULT_IMAGE_URL_EXPIRY_SECS: u64 = 86_400;
const DEFAULT_VIDEO_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_VIDEO_POLL_MAX_ATTEMPTS: u32 = 60;
const DEFAULT_FEED_PRESIGN_EXPIRY_SECS: u64 = 3_600;
const DEFAULT_PRESIGN_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_PRESIGN_RETRY_DELAY_MS: u64 = 500;

/// Base server configuration.
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Storage gateway configuration.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

/// External content-provider configuration.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    // Script generation (OpenAI-compatible chat completions)
    pub deepseek_api_key: Option<String>,
    pub deepseek_base_url: String,
    pub script_model: String,
    pub script_max_tokens: u32,
    // Image generation
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub image_model: String,
    pub image_count: usize,
    pub image_size: String,
    pub image_url_expiry_secs: u64,
    // Image-to-video synthesis
    pub runway_api_key: Option<String>,
    pub runway_base_url: String,
    pub runway_model: String,
    pub runway_ratio: String,
    pub video_prompt_text: String,
    pub video_poll_interval_secs: u64,
    pub video_poll_max_attempts: u32,
    // Audio/video multiplexing
    pub ffmpeg_path: String,
}

/// Feed serving configuration.
#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub presign_expiry_secs: u64,
    pub presign_retry_attempts: u32,
    pub presign_retry_delay_ms: u64,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            deepseek_api_key: None,
            deepseek_base_url: DEFAULT_DEEPSEEK_BASE_URL.to_string(),
            script_model: DEFAULT_SCRIPT_MODEL.to_string(),
            script_max_tokens: DEFAULT_SCRIPT_MAX_TOKENS,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_count: DEFAULT_IMAGE_COUNT,
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            image_url_expiry_secs: DEFAULT_IMAGE_URL_EXPIRY_SECS,
            runway_api_key: None,
            runway_base_url: DEFAULT_RUNWAY_BASE_URL.to_string(),
            runway_model: DEFAULT_RUNWAY_MODEL.to_string(),
            runway_ratio: DEFAULT_RUNWAY_RATIO.to_string(),
            video_prompt_text: DEFAULT_VIDEO_PROMPT.to_string(),
            video_poll_interval_secs: DEFAULT_VIDEO_POLL_INTERVAL_SECS,
            video_poll_max_attempts: DEFAULT_VIDEO_POLL_MAX_ATTEMPTS,
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            presign_expiry_secs: DEFAULT_FEED_PRESIGN_EXPIRY_SECS,
            presign_retry_attempts: DEFAULT_PRESIGN_RETRY_ATTEMPTS,
            presign_retry_delay_ms: DEFAULT_PRESIGN_RETRY_DELAY_MS,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub providers: ProviderConfig,
    pub feed: FeedConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let base = BaseConfig {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            cors_origins: parse_origins(&env_or("CORS_ORIGINS", "*")),
            environment: env_or("ENVIRONMENT", "development"),
        };

        let backend = match env_opt("STORAGE_BACKEND") {
            Some(raw) => Some(
                raw.parse::<StorageBackend>()
                    .map_err(|e| anyhow::anyhow!(e))?,
            ),
            None => None,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: env_opt("S3_BUCKET").or_else(|| env_opt("AWS_S3_BUCKET")),
            s3_region: env_opt("S3_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            aws_region: env_opt("AWS_REGION"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
        };

        let providers = ProviderConfig {
            deepseek_api_key: env_opt("DEEPSEEK_API_KEY"),
            deepseek_base_url: env_or("DEEPSEEK_BASE_URL", DEFAULT_DEEPSEEK_BASE_URL),
            script_model: env_or("SCRIPT_MODEL", DEFAULT_SCRIPT_MODEL),
            script_max_tokens: env_parse("SCRIPT_MAX_TOKENS", DEFAULT_SCRIPT_MAX_TOKENS)?,
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            image_model: env_or("IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            image_count: env_parse("IMAGE_COUNT", DEFAULT_IMAGE_COUNT)?,
            image_size: env_or("IMAGE_SIZE", DEFAULT_IMAGE_SIZE),
            image_url_expiry_secs: env_parse(
                "IMAGE_URL_EXPIRY_SECS",
                DEFAULT_IMAGE_URL_EXPIRY_SECS,
            )?,
            runway_api_key: env_opt("RUNWAY_API_KEY"),
            runway_base_url: env_or("RUNWAY_BASE_URL", DEFAULT_RUNWAY_BASE_URL),
            runway_model: env_or("RUNWAY_MODEL", DEFAULT_RUNWAY_MODEL),
            runway_ratio: env_or("RUNWAY_RATIO", DEFAULT_RUNWAY_RATIO),
            video_prompt_text: env_or("VIDEO_PROMPT_TEXT", DEFAULT_VIDEO_PROMPT),
            video_poll_interval_secs: env_parse(
                "VIDEO_POLL_INTERVAL_SECS",
                DEFAULT_VIDEO_POLL_INTERVAL_SECS,
            )?,
            video_poll_max_attempts: env_parse(
                "VIDEO_POLL_MAX_ATTEMPTS",
                DEFAULT_VIDEO_POLL_MAX_ATTEMPTS,
            )?,
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
        };

        let feed = FeedConfig {
            presign_expiry_secs: env_parse(
                "FEED_PRESIGN_EXPIRY_SECS",
                DEFAULT_FEED_PRESIGN_EXPIRY_SECS,
            )?,
            presign_retry_attempts: env_parse(
                "FEED_PRESIGN_RETRY_ATTEMPTS",
                DEFAULT_PRESIGN_RETRY_ATTEMPTS,
            )?,
            presign_retry_delay_ms: env_parse(
                "FEED_PRESIGN_RETRY_DELAY_MS",
                DEFAULT_PRESIGN_RETRY_DELAY_MS,
            )?,
        };

        Ok(Config {
            base,
            storage,
            providers,
            feed,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        None => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
