// --- File: src/config.rs ---

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const PROD_HOST: &str = "paymentgateway.hu";
pub const TEST_HOST: &str = "test.paymentgateway.hu";
/// Public key of the gateway's `sdk_test` store.
pub const SDK_TEST_API_KEY: &str = "86af3-80e4f-f8228-9498f-910ad";
/// Prefix of the environment variables read by [`GatewayConfigBuilder::configure_from_env`].
pub const ENV_PREFIX: &str = "PAYMENT_GATEWAY_";

/// The allow-list of configuration keys. Anything else is dropped on merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    Provider,
    Store,
    Currency,
    Language,
    ResponseMode,
    Host,
    HeaderHost,
    Port,
    UseSsl,
    AutoCommitProviders,
    AutoCommitNotImplemented,
    AppHost,
    ApiKey,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 13] = [
        ConfigKey::Provider,
        ConfigKey::Store,
        ConfigKey::Currency,
        ConfigKey::Language,
        ConfigKey::ResponseMode,
        ConfigKey::Host,
        ConfigKey::HeaderHost,
        ConfigKey::Port,
        ConfigKey::UseSsl,
        ConfigKey::AutoCommitProviders,
        ConfigKey::AutoCommitNotImplemented,
        ConfigKey::AppHost,
        ConfigKey::ApiKey,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Provider => "provider",
            ConfigKey::Store => "store",
            ConfigKey::Currency => "currency",
            ConfigKey::Language => "language",
            ConfigKey::ResponseMode => "response_mode",
            ConfigKey::Host => "host",
            ConfigKey::HeaderHost => "header_host",
            ConfigKey::Port => "port",
            ConfigKey::UseSsl => "use_ssl",
            ConfigKey::AutoCommitProviders => "auto_commit_providers",
            ConfigKey::AutoCommitNotImplemented => "auto_commit_not_implemented",
            ConfigKey::AppHost => "app_host",
            ConfigKey::ApiKey => "api_key",
        }
    }

    /// Looks a key up by name. Symbol-style names (`:provider`) are accepted.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches(':');
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Name of the environment variable carrying this key, e.g. `PAYMENT_GATEWAY_HEADER_HOST`.
    pub fn env_var(self) -> String {
        format!("{}{}", ENV_PREFIX, self.as_str().to_ascii_uppercase())
    }

    fn is_list(self) -> bool {
        matches!(
            self,
            ConfigKey::AutoCommitProviders | ConfigKey::AutoCommitNotImplemented
        )
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configuration value as it appears in a map, file or environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Text(String),
    List(Vec<String>),
}

impl ConfigValue {
    fn from_yaml(value: serde_yaml::Value) -> Option<Self> {
        use serde_yaml::Value;
        match value {
            Value::String(s) => Some(ConfigValue::Text(s)),
            Value::Bool(b) => Some(ConfigValue::Text(b.to_string())),
            Value::Number(n) => Some(ConfigValue::Text(n.to_string())),
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Bool(b) => Some(b.to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(ConfigValue::List),
            _ => None,
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            ConfigValue::List(items) => items,
            ConfigValue::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<u16> for ConfigValue {
    fn from(value: u16) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        ConfigValue::List(value)
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(value: Vec<&str>) -> Self {
        ConfigValue::List(value.into_iter().map(str::to_owned).collect())
    }
}

/// Immutable gateway settings, built once and shared by every client.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub provider: String,
    pub store: String,
    pub currency: String,
    pub language: String,
    /// Sent as `ResponseMode` on Init when not empty.
    pub response_mode: String,
    /// Host the requests connect to. Empty means `header_host`.
    pub host: String,
    /// Public gateway host: `Host` header and redirect target.
    pub header_host: String,
    pub port: Option<u16>,
    pub use_ssl: bool,
    pub auto_commit_providers: Vec<String>,
    pub auto_commit_not_implemented: Vec<String>,
    /// Prefix of every response URL handed to the gateway.
    pub app_host: String,
    pub api_key: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: "OTP".to_string(),
            store: "sdk_test".to_string(),
            currency: "HUF".to_string(),
            language: "HU".to_string(),
            response_mode: String::new(),
            host: String::new(),
            header_host: PROD_HOST.to_string(),
            port: None,
            use_ssl: true,
            auto_commit_providers: vec!["MPP2".to_string()],
            auto_commit_not_implemented: vec!["OTPayMP".to_string()],
            app_host: String::new(),
            api_key: SDK_TEST_API_KEY.to_string(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("provider", &self.provider)
            .field("store", &self.store)
            .field("currency", &self.currency)
            .field("language", &self.language)
            .field("response_mode", &self.response_mode)
            .field("host", &self.host)
            .field("header_host", &self.header_host)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("auto_commit_providers", &self.auto_commit_providers)
            .field("auto_commit_not_implemented", &self.auto_commit_not_implemented)
            .field("app_host", &self.app_host)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GatewayConfig {
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Defaults overridden by `PAYMENT_GATEWAY_*` environment variables
    /// (after loading the dotenv file).
    pub fn load() -> Self {
        Self::builder().configure_from_env().build()
    }

    /// The effective configuration as a key/value map of exactly the recognized keys.
    ///
    /// # Returns
    ///
    /// One entry per [`ConfigKey`], in canonical form rather than as supplied:
    ///
    /// - list keys are always [`ConfigValue::List`], so `Text("MPP2")` or
    ///   `Text("MPP2,PayPal")` come back split into a list
    /// - `use_ssl` is `"true"` or `"false"`, whatever casing was configured
    /// - `port` is its decimal text, or `""` when unset
    ///
    /// Feeding the result back into [`GatewayConfigBuilder::configure`] yields
    /// an equal configuration.
    pub fn to_map(&self) -> BTreeMap<String, ConfigValue> {
        ConfigKey::ALL
            .into_iter()
            .map(|key| (key.as_str().to_string(), self.value(key)))
            .collect()
    }

    pub fn value(&self, key: ConfigKey) -> ConfigValue {
        match key {
            ConfigKey::Provider => self.provider.as_str().into(),
            ConfigKey::Store => self.store.as_str().into(),
            ConfigKey::Currency => self.currency.as_str().into(),
            ConfigKey::Language => self.language.as_str().into(),
            ConfigKey::ResponseMode => self.response_mode.as_str().into(),
            ConfigKey::Host => self.host.as_str().into(),
            ConfigKey::HeaderHost => self.header_host.as_str().into(),
            ConfigKey::Port => self.port.map(|p| p.to_string()).unwrap_or_default().into(),
            ConfigKey::UseSsl => self.use_ssl.into(),
            ConfigKey::AutoCommitProviders => self.auto_commit_providers.clone().into(),
            ConfigKey::AutoCommitNotImplemented => self.auto_commit_not_implemented.clone().into(),
            ConfigKey::AppHost => self.app_host.as_str().into(),
            ConfigKey::ApiKey => self.api_key.as_str().into(),
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_ssl {
            "https"
        } else {
            "http"
        }
    }

    /// `host[:port]` the requests connect to.
    pub fn authority(&self) -> String {
        let host = if self.host.is_empty() {
            &self.header_host
        } else {
            &self.host
        };
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host.clone(),
        }
    }

    /// `Host` header value when the connect host is not the public one.
    pub fn host_header(&self) -> Option<&str> {
        (!self.host.is_empty() && self.host != self.header_host).then_some(self.header_host.as_str())
    }
}

/// Collects configuration from maps, files and the environment, then
/// freezes it with [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    /// Merges recognized keys into the configuration.
    ///
    /// # Parameters
    ///
    /// - `options`: Key/value pairs. Keys are matched against [`ConfigKey`],
    ///   with or without a leading `:`. Unknown keys are dropped, and values
    ///   of the wrong shape (a list for a text key, a non-numeric port) are
    ///   skipped with a warning.
    ///
    /// # Returns
    ///
    /// The builder, for chaining.
    pub fn configure<I, K, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ConfigValue>,
    {
        for (name, value) in options {
            let name = name.as_ref();
            match ConfigKey::parse(name) {
                Some(key) => self.apply(key, value.into()),
                None => tracing::debug!(key = name, "ignoring unrecognized configuration key"),
            }
        }
        self
    }

    /// Loads a YAML configuration file.
    ///
    /// # Parameters
    ///
    /// - `path`: A YAML file holding one key/value mapping.
    ///
    /// # Returns
    ///
    /// The builder with the file's recognized keys merged in. On a missing or
    /// malformed file a warning is logged and the builder is returned unchanged.
    pub fn configure_from_file(self, path: impl AsRef<Path>) -> Self {
        match Self::read_file(path.as_ref()) {
            Ok(options) => self.configure(options),
            Err(e) => {
                tracing::warn!("{e}. Using defaults.");
                self
            }
        }
    }

    /// Same as [`configure_from_file`](Self::configure_from_file) but hands the failure back.
    ///
    /// # Returns
    ///
    /// The updated builder, or a [`ConfigError`] naming the file. The builder
    /// is consumed either way.
    pub fn try_configure_from_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let options = Self::read_file(path.as_ref())?;
        Ok(self.configure(options))
    }

    /// Reads `PAYMENT_GATEWAY_<KEY>` variables, loading the dotenv file first.
    /// List keys take comma separated values.
    pub fn configure_from_env(self) -> Self {
        crate::utils::ensure_dotenv_loaded(None);
        let options: Vec<(&str, String)> = ConfigKey::ALL
            .into_iter()
            .filter_map(|key| env::var(key.env_var()).ok().map(|v| (key.as_str(), v)))
            .collect();
        self.configure(options)
    }

    /// Talk to the gateway's test system instead of production.
    pub fn test_environment(mut self) -> Self {
        self.config.header_host = TEST_HOST.to_string();
        self
    }

    pub fn build(self) -> GatewayConfig {
        self.config
    }

    fn read_file(path: &Path) -> Result<Vec<(String, ConfigValue)>, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let serde_yaml::Value::Mapping(mapping) = document else {
            return Err(ConfigError::NotAMapping {
                path: path.to_path_buf(),
            });
        };

        let mut options = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let Some(name) = key.as_str().map(str::to_owned) else {
                tracing::warn!(key = ?key, "skipping non-string configuration key");
                continue;
            };
            match ConfigValue::from_yaml(value) {
                Some(value) => options.push((name, value)),
                None => tracing::warn!(key = %name, "skipping configuration value of unsupported shape"),
            }
        }
        Ok(options)
    }

    fn apply(&mut self, key: ConfigKey, value: ConfigValue) {
        let config = &mut self.config;
        if key.is_list() {
            let items = value.into_list();
            match key {
                ConfigKey::AutoCommitProviders => config.auto_commit_providers = items,
                _ => config.auto_commit_not_implemented = items,
            }
            return;
        }

        let ConfigValue::Text(text) = value else {
            tracing::warn!(key = %key, "expected a single value, got a list; skipping");
            return;
        };
        match key {
            ConfigKey::Provider => config.provider = text,
            ConfigKey::Store => config.store = text,
            ConfigKey::Currency => config.currency = text,
            ConfigKey::Language => config.language = text,
            ConfigKey::ResponseMode => config.response_mode = text,
            ConfigKey::Host => config.host = text,
            ConfigKey::HeaderHost => config.header_host = text,
            ConfigKey::Port if text.trim().is_empty() => config.port = None,
            ConfigKey::Port => match text.trim().parse::<u16>() {
                Ok(port) => config.port = Some(port),
                Err(_) => tracing::warn!(value = %text, "invalid port; skipping"),
            },
            ConfigKey::UseSsl => config.use_ssl = text.trim().eq_ignore_ascii_case("true"),
            ConfigKey::AppHost => config.app_host = text,
            ConfigKey::ApiKey => config.api_key = text,
            ConfigKey::AutoCommitProviders | ConfigKey::AutoCommitNotImplemented => {}
        }
    }
}
