//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Precedence is file first, then `STOCKLINE_`-prefixed environment
//! variables; `${VAR}` placeholders inside any string value are expanded
//! after the merge, so secrets and host-specific paths can stay out of the
//! checked-in file.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level configuration for the inventory pipeline.
#[derive(Debug, Deserialize)]
pub struct StocklineConfig {
    /// HTML entry page carrying the embedded storage parameters.
    pub entry_url: String,
    /// Where the downloaded feed lands on disk.
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Default)]
pub struct HttpSettings {
    /// Per-request timeout in seconds; the client default applies when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Retry budget for 429/5xx responses.
    #[serde(default)]
    pub retries: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LogSettings {
    #[serde(default)]
    pub dir: Option<String>,
    /// Mirror log events to stderr.
    #[serde(default)]
    pub stderr: bool,
    /// "text" (default) or "json".
    #[serde(default)]
    pub format: Option<String>,
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_output_path() -> String {
    "inventory_export.csv".into()
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

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct StocklineConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for StocklineConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl StocklineConfigLoader {
    /// Start empty; `STOCKLINE_` env overrides are merged on top at `load`.
    ///
    /// ```
    /// use stockline_config::StocklineConfigLoader;
    ///
    /// let cfg = StocklineConfigLoader::new()
    ///     .with_yaml_str("entry_url: \"https://example.com/entry.html\"")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.entry_url, "https://example.com/entry.html");
    /// assert_eq!(cfg.output_path, "inventory_export.csv");
    /// ```
    pub fn new() -> Self {
        Self { builder: Config::builder() }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet (tests, CLI overrides).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// `${VAR}` placeholders are expanded recursively (depth-capped, so
    /// cyclic definitions terminate) before the typed deserialize.
    ///
    /// ```
    /// use stockline_config::StocklineConfigLoader;
    ///
    /// unsafe { std::env::set_var("ENTRY_HOST", "bitbucket.org"); }
    ///
    /// let cfg = StocklineConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// entry_url: "https://${ENTRY_HOST}/cityhive/jobs/raw/master/integration-eng/integration-entryfile.html"
    /// http:
    ///   retries: 1
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert!(cfg.entry_url.starts_with("https://bitbucket.org/"));
    /// assert_eq!(cfg.http.retries, Some(1));
    ///
    /// unsafe { std::env::remove_var("ENTRY_HOST"); }
    /// ```
    pub fn load(self) -> Result<StocklineConfig, ConfigError> {
        // Env source goes in last so STOCKLINE_* variables win over files.
        // try_parsing lets numeric/bool overrides land in typed fields.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("STOCKLINE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: StocklineConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
