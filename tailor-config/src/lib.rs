//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later wins:
//!
//! 1. YAML files / inline snippets added with [`TailorConfigLoader::with_file`],
//!    [`TailorConfigLoader::with_optional_file`] or
//!    [`TailorConfigLoader::with_yaml_str`]
//! 2. `TAILOR_`-prefixed environment variables, `__` separating nesting levels
//!    (`TAILOR_LLM__MODEL=gpt-4o`, `TAILOR_EXTRACTION__FETCH_TIMEOUT_SECS=10`)
//!
//! After merging, `${VAR}` placeholders inside string values are expanded
//! recursively. Every section is optional; an empty configuration yields the
//! built-in defaults.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub use tailor_common::LlmConfig;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TAILOR";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TailorConfig {
    pub version: Option<String>,
    pub llm: LlmConfig,
    pub extraction: ExtractionSettings,
    pub store: StoreSettings,
    pub logging: LoggingSettings,
}

/// Optional overrides for the extraction thresholds; `None` keeps the default.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub fetch_timeout_secs: Option<u64>,
    pub fetch_max_bytes: Option<usize>,
    pub min_text_chars: Option<usize>,
    pub min_raw_html_chars: Option<usize>,
    pub html_snippet_chars: Option<usize>,
    pub model_text_threshold_chars: Option<usize>,
    pub max_output_chars: Option<usize>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// `sqlite://...` URL; absent means an in-memory store.
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
    pub dir: Option<String>,
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
            dir: None,
            stderr: false,
        }
    }
}

/// Per-user config location, e.g. `~/.config/tailor/tailor.yaml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tailor").join("tailor.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate wiring (YAML + env overrides).
pub struct TailorConfigLoader {
    files: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TailorConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TailorConfigLoader {
    /// Start with no files; environment overrides are applied at [`load`](Self::load).
    ///
    /// ```
    /// use tailor_config::{LlmConfig, TailorConfigLoader};
    ///
    /// let config = TailorConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.llm, LlmConfig::None);
    /// assert!(config.store.database_url.is_none());
    /// ```
    pub fn new() -> Self {
        Self {
            files: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files = self
            .files
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so deployments can rely purely on
    /// environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files = self
            .files
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet (tests, CLI overrides).
    ///
    /// ```
    /// use tailor_config::TailorConfigLoader;
    ///
    /// let cfg = TailorConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// extraction:
    ///   fetch_timeout_secs: 10
    ///   max_output_chars: 9000
    /// store:
    ///   database_url: "sqlite://jobs.db"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.extraction.fetch_timeout_secs, Some(10));
    /// assert_eq!(cfg.extraction.max_output_chars, Some(9000));
    /// assert_eq!(cfg.extraction.min_text_chars, None);
    /// assert_eq!(cfg.store.database_url.as_deref(), Some("sqlite://jobs.db"));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.files = self.files.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use tailor_config::{LlmConfig, TailorConfigLoader};
    ///
    /// unsafe { std::env::set_var("DOC_OPENAI_KEY", "injected-from-env"); }
    ///
    /// let config = TailorConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   provider: "openai"
    ///   model: "gpt-4o-mini"
    ///   auth_token: "${DOC_OPENAI_KEY}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match &config.llm {
    ///     LlmConfig::Openai { model, auth_token, endpoint } => {
    ///         assert_eq!(model, "gpt-4o-mini");
    ///         assert_eq!(auth_token, "injected-from-env");
    ///         assert_eq!(endpoint, "https://api.openai.com/v1");
    ///     }
    ///     other => panic!("expected OpenAI configuration, got {other:?}"),
    /// }
    ///
    /// unsafe { std::env::remove_var("DOC_OPENAI_KEY"); }
    /// ```
    pub fn load(self) -> Result<TailorConfig, ConfigError> {
        let cfg = self
            .files
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
