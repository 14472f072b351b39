use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub limits: LimitSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            llm: LlmSettings::default(),
            upload: UploadSettings::default(),
            export: ExportSettings::default(),
            limits: LimitSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Settings for the chat-completions API used to synthesize questions.
///
/// The endpoint is OpenAI-compatible; `base_url` defaults to DeepSeek.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_llm_temperature")]
    pub temperature: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: String::new(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            temperature: default_llm_temperature(),
        }
    }
}

fn default_llm_base_url() -> String { "https://api.deepseek.com/v1".to_string() }
fn default_llm_model() -> String { "deepseek-chat".to_string() }
fn default_llm_timeout() -> u64 { 120 }
fn default_llm_temperature() -> f64 { 0.7 }

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_upload_dir")]
    pub dir: String,
    /// Keep uploaded reference files on disk after text extraction.
    #[serde(default)]
    pub persist: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            persist: false,
        }
    }
}

fn default_upload_dir() -> String { "uploads".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    #[serde(default = "default_export_dir")]
    pub dir: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self { dir: default_export_dir() }
    }
}

fn default_export_dir() -> String { "exports".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LimitSettings {
    /// Maximum request body size in bytes (uploads included).
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Reference text is truncated to this many characters before it is
    /// injected into the prompt.
    #[serde(default = "default_max_reference_chars")]
    pub max_reference_chars: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            max_reference_chars: default_max_reference_chars(),
        }
    }
}

fn default_max_body_bytes() -> usize { 32 * 1024 * 1024 }
fn default_max_reference_chars() -> usize { 6000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with EXAMGEN_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with EXAMGEN_)
            // e.g., EXAMGEN_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("EXAMGEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Pick up the LLM API key from the conventional environment variables
        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("EXAMGEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Override secrets from well-known environment variables.
///
/// We check DEEPSEEK_API_KEY first, then LLM_API_KEY, then the prefixed
/// EXAMGEN_LLM__API_KEY handled by the Environment source above.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let api_key = env::var("DEEPSEEK_API_KEY")
        .or_else(|_| env::var("LLM_API_KEY"))
        .ok();

    let base_url = env::var("LLM_API_BASE_URL").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(key) = api_key {
        builder = builder.set_override("llm.api_key", key)?;
    }
    if let Some(url) = base_url {
        builder = builder.set_override("llm.base_url", url)?;
    }

    builder.build()
}
