//! Configuration management for the Civic Assistant.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - The config file (`.civic/config.yaml` or `CIVIC_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Tenants are loaded once here and never reloaded while the process runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Default character budget for the assembled context block.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 6000;

/// Default environment variable holding the operator credential.
pub const DEFAULT_OPERATOR_CREDENTIAL_ENV: &str = "CIVIC_OPERATOR_KEY";

/// A secret string that never shows up in `Debug` output, logs or
/// serialized config dumps. It deserializes from a plain string.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(<empty>)")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            serializer.serialize_str("")
        } else {
            serializer.serialize_str(REDACTED)
        }
    }
}

const REDACTED: &str = "***";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .civic/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Default LLM provider ("ollama" or "openai")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// API key for the LLM provider
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Runtime access policy
    pub access: AccessConfig,

    /// Operator credential resolved from `access.operator_credential_env`
    #[serde(skip)]
    pub operator_credential: Option<Secret>,

    /// Corpus location and context budget
    pub corpus: CorpusConfig,

    /// Tenants keyed by their configured key
    pub tenants: BTreeMap<String, TenantConfig>,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::OpenAI { model, .. } | ProviderConfig::Ollama { model, .. } => model,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }

    /// Request timeout (`timeout`, in seconds). Only Ollama declares one.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            ProviderConfig::OpenAI { .. } => None,
            ProviderConfig::Ollama { timeout, .. } => timeout.map(Duration::from_secs),
        }
    }
}

/// Runtime access policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Initial value of the process-wide access switch
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Environment variable that holds the operator credential
    #[serde(rename = "operatorCredentialEnv", default = "default_operator_env")]
    pub operator_credential_env: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            operator_credential_env: default_operator_env(),
        }
    }
}

/// Corpus storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding one subdirectory per tenant; relative paths are
    /// resolved against the workspace
    #[serde(default = "default_corpus_root")]
    pub root: PathBuf,

    /// Character budget for the context block
    #[serde(rename = "maxContextChars", default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: default_corpus_root(),
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

/// One tenant ("city") as it appears in config.yaml.
///
/// This is the loose on-disk shape. Validation (non-empty token, ordered
/// window) happens when the access layer builds its tenant registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    #[serde(rename = "personaName")]
    pub persona_name: String,

    #[serde(default)]
    pub token: Secret,

    #[serde(rename = "windowStart", default)]
    pub window_start: Option<DateTime<Utc>>,

    #[serde(rename = "windowEnd", default)]
    pub window_end: Option<DateTime<Utc>>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    logging: Option<LoggingConfig>,
    access: Option<AccessConfig>,
    corpus: Option<CorpusConfig>,
    #[serde(default)]
    tenants: BTreeMap<String, TenantConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<LogFormat>,
}

fn default_true() -> bool {
    true
}

fn default_operator_env() -> String {
    DEFAULT_OPERATOR_CREDENTIAL_ENV.to_string()
}

fn default_corpus_root() -> PathBuf {
    PathBuf::from(".civic/corpus")
}

fn default_max_context_chars() -> usize {
    DEFAULT_MAX_CONTEXT_CHARS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            log_format: LogFormat::default(),
            verbose: false,
            no_color: false,
            llm: None,
            access: AccessConfig::default(),
            operator_credential: None,
            corpus: CorpusConfig::default(),
            tenants: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Environment variables:
    /// - `CIVIC_WORKSPACE`: Override workspace path
    /// - `CIVIC_CONFIG`: Path to config file
    /// - `CIVIC_PROVIDER`: LLM provider
    /// - `CIVIC_MODEL`: Model identifier
    /// - `CIVIC_API_KEY`: API key
    /// - `CIVIC_ACCESS_ENABLED`: Initial access switch state
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// The operator credential is read from the variable named by
    /// `access.operatorCredentialEnv` (default `CIVIC_OPERATOR_KEY`).
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], but an explicit workspace or config file
    /// (from the command line) wins over `CIVIC_WORKSPACE` / `CIVIC_CONFIG`.
    /// The config file is located after these are applied.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace = workspace.or_else(|| env_path("CIVIC_WORKSPACE"));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env_path("CIVIC_CONFIG"));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.civic_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        if let Ok(provider) = std::env::var("CIVIC_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("CIVIC_MODEL") {
            config.model = model;
        }

        if let Ok(enabled) = std::env::var("CIVIC_ACCESS_ENABLED") {
            config.access.enabled = parse_bool(&enabled).ok_or_else(|| {
                AppError::Config(format!(
                    "CIVIC_ACCESS_ENABLED must be true or false, got '{}'",
                    enabled
                ))
            })?;
        }

        config.api_key = std::env::var("CIVIC_API_KEY").ok();
        config.operator_credential = std::env::var(&config.access.operator_credential_env)
            .ok()
            .map(Secret::new);

        if config.log_level.is_none() {
            config.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }
            result.llm = Some(llm);
        }

        if let Some(access) = config_file.access {
            result.access = access;
        }

        if let Some(corpus) = config_file.corpus {
            result.corpus = corpus;
        }

        result.tenants.extend(config_file.tenants);

        tracing::debug!(
            "Merged config file {:?} ({} tenants)",
            path,
            result.tenants.len()
        );

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        log_format: Option<LogFormat>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if let Some(log_format) = log_format {
            self.log_format = log_format;
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .civic directory.
    pub fn civic_dir(&self) -> PathBuf {
        self.workspace.join(".civic")
    }

    /// Directory holding every tenant's corpus.
    pub fn corpus_root(&self) -> PathBuf {
        if self.corpus.root.is_absolute() {
            self.corpus.root.clone()
        } else {
            self.workspace.join(&self.corpus.root)
        }
    }

    /// Get the configuration for a provider, if the config file declares one.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint override for the active provider.
    pub fn provider_endpoint(&self) -> Option<&str> {
        self.get_provider_config(&self.provider)
            .and_then(ProviderConfig::endpoint)
    }

    /// Request timeout for the active provider.
    pub fn provider_timeout(&self) -> Option<Duration> {
        self.get_provider_config(&self.provider)
            .and_then(ProviderConfig::timeout)
    }

    /// Resolve the API key for a provider.
    ///
    /// `CIVIC_API_KEY` wins; otherwise the provider's `apiKeyEnv` is consulted.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => std::env::var(api_key_env).ok(),
            _ => None,
        }
    }

    /// Validate configuration for the active provider.
    ///
    /// Includes everything [`AppConfig::validate_retrieval`] checks.
    pub fn validate(&self) -> AppResult<()> {
        self.validate_retrieval()?;

        let known_providers = ["openai", "ollama"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.provider == "openai" && self.resolve_api_key("openai").is_none() {
            return Err(AppError::Config(
                "API key not found for provider openai".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate the settings that ranking and citation rewriting depend on.
    /// Provider settings are not looked at.
    pub fn validate_retrieval(&self) -> AppResult<()> {
        if self.corpus.max_context_chars == 0 {
            return Err(AppError::Config(
                "corpus.maxContextChars must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name).ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
logging:
  level: debug
  format: json
llm:
  activeProvider: openai
  providers:
    openai:
      apiKeyEnv: CIVIC_TEST_OPENAI_KEY
      model: gpt-4o-mini
    ollama:
      endpoint: http://localhost:11434
      model: llama3.2
access:
  enabled: false
corpus:
  root: data
  maxContextChars: 4000
tenants:
  Springfield:
    personaName: Sparky
    token: s3cret
    windowStart: 2026-01-01T00:00:00Z
    windowEnd: 2026-12-31T23:59:59Z
  shelbyville:
    personaName: Shelby
    token: other
"#;

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join("config.yaml");
        fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert!(config.access.enabled);
        assert_eq!(config.corpus.max_context_chars, DEFAULT_MAX_CONTEXT_CHARS);
        assert!(config.tenants.is_empty());
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path());

        let config = AppConfig::default().merge_yaml(&path).unwrap();

        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.access.enabled);
        assert_eq!(config.access.operator_credential_env, "CIVIC_OPERATOR_KEY");
        assert_eq!(config.corpus.max_context_chars, 4000);
        assert_eq!(config.tenants.len(), 2);

        let springfield = &config.tenants["Springfield"];
        assert_eq!(springfield.persona_name, "Sparky");
        assert_eq!(springfield.token.expose(), "s3cret");
        assert!(springfield.window_start.is_some());
        assert!(config.tenants["shelbyville"].window_end.is_none());
    }

    #[test]
    fn test_load_from_explicit_workspace() {
        let temp = TempDir::new().unwrap();
        let civic = temp.path().join(".civic");
        fs::create_dir_all(&civic).unwrap();
        let path = write_sample(&civic);

        let config = AppConfig::load_from(Some(temp.path().to_path_buf()), Some(path)).unwrap();
        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.corpus.max_context_chars, 4000);
        assert_eq!(config.tenants.len(), 2);
    }

    #[test]
    fn test_load_from_missing_workspace_fails() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_from(Some(temp.path().join("gone")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_corpus_root_relative_to_workspace() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path());
        let mut config = AppConfig::default().merge_yaml(&path).unwrap();
        config.workspace = temp.path().to_path_buf();

        assert_eq!(config.corpus_root(), temp.path().join("data"));
    }

    #[test]
    fn test_missing_token_defaults_to_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "tenants:\n  ogdenville:\n    personaName: Oggy\n").unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert!(config.tenants["ogdenville"].token.is_empty());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new("hunter2");
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_with_overrides() {
        let overridden = AppConfig::default().with_overrides(
            None,
            None,
            Some("openai".to_string()),
            Some("gpt-4o".to_string()),
            None,
            Some(LogFormat::Json),
            true,
            false,
        );

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.model, "gpt-4o");
        assert_eq!(overridden.log_format, LogFormat::Json);
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_context_budget_is_rejected() {
        let mut config = AppConfig::default();
        config.corpus.max_context_chars = 0;
        assert!(matches!(config.validate_retrieval(), Err(AppError::Config(_))));
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_retrieval_validation_ignores_provider() {
        let mut config = AppConfig::default();
        config.provider = "openai".to_string();
        config.api_key = None;
        assert!(config.validate_retrieval().is_ok());
    }

    #[test]
    fn test_ollama_timeout_is_resolved() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            "llm:\n  activeProvider: ollama\n  providers:\n    ollama:\n      endpoint: http://gpu-box:11434\n      model: llama3.2\n      timeout: 45\n",
        )
        .unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.provider_endpoint(), Some("http://gpu-box:11434"));
        assert_eq!(config.provider_timeout(), Some(Duration::from_secs(45)));
        assert_eq!(AppConfig::default().provider_timeout(), None);
    }

    #[test]
    fn test_serialized_config_hides_tokens() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path());
        let config = AppConfig::default().merge_yaml(&path).unwrap();

        let dumped = serde_yaml::to_string(&config).unwrap();
        assert!(!dumped.contains("s3cret"));
        assert!(dumped.contains("***"));
        assert_eq!(serde_json::to_string(&Secret::default()).unwrap(), "\"\"");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
