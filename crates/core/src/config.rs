use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub checkout: CheckoutConfig,
    pub mail: MailConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

/// Where the catalog client reads from and how the catalog is presented.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub api_base_url: String,
    pub refresh_interval_secs: u64,
    pub suggestion_limit: usize,
    pub recommendation_limit: usize,
}

#[derive(Clone, Debug)]
pub struct CheckoutConfig {
    /// Simulated processing time before a delivery is confirmed.
    pub processing_delay_ms: u64,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub enabled: bool,
    pub sender: String,
    pub smtp_password: Option<SecretString>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub dark_mode: bool,
    pub currency: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
    pub catalog_api_base_url: Option<String>,
    pub processing_delay_ms: Option<u64>,
    pub dark_mode: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://homerent.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                graceful_shutdown_secs: 15,
            },
            catalog: CatalogConfig {
                api_base_url: "http://localhost:5000".to_string(),
                refresh_interval_secs: 10,
                suggestion_limit: 5,
                recommendation_limit: 12,
            },
            checkout: CheckoutConfig { processing_delay_ms: 2000 },
            mail: MailConfig {
                enabled: false,
                sender: "no-reply@homerent.local".to_string(),
                smtp_password: None,
            },
            display: DisplayConfig { dark_mode: false, currency: "OMR".to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("homerent.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Address the HTTP listener binds to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(api_base_url) = catalog.api_base_url {
                self.catalog.api_base_url = api_base_url;
            }
            if let Some(refresh_interval_secs) = catalog.refresh_interval_secs {
                self.catalog.refresh_interval_secs = refresh_interval_secs;
            }
            if let Some(suggestion_limit) = catalog.suggestion_limit {
                self.catalog.suggestion_limit = suggestion_limit;
            }
            if let Some(recommendation_limit) = catalog.recommendation_limit {
                self.catalog.recommendation_limit = recommendation_limit;
            }
        }

        if let Some(checkout) = patch.checkout {
            if let Some(processing_delay_ms) = checkout.processing_delay_ms {
                self.checkout.processing_delay_ms = processing_delay_ms;
            }
        }

        if let Some(mail) = patch.mail {
            if let Some(enabled) = mail.enabled {
                self.mail.enabled = enabled;
            }
            if let Some(sender) = mail.sender {
                self.mail.sender = sender;
            }
            if let Some(smtp_password) = mail.smtp_password {
                self.mail.smtp_password = Some(SecretString::from(smtp_password));
            }
        }

        if let Some(display) = patch.display {
            if let Some(dark_mode) = display.dark_mode {
                self.display.dark_mode = dark_mode;
            }
            if let Some(currency) = display.currency {
                self.display.currency = currency;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("HOMERENT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("HOMERENT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("HOMERENT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("HOMERENT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("HOMERENT_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("HOMERENT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("HOMERENT_SERVER_PORT") {
            self.server.port = parse_u16("HOMERENT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("HOMERENT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("HOMERENT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("HOMERENT_CATALOG_API_BASE_URL") {
            self.catalog.api_base_url = value;
        }
        if let Some(value) = read_env("HOMERENT_CATALOG_REFRESH_INTERVAL_SECS") {
            self.catalog.refresh_interval_secs =
                parse_u64("HOMERENT_CATALOG_REFRESH_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = read_env("HOMERENT_CATALOG_SUGGESTION_LIMIT") {
            self.catalog.suggestion_limit =
                parse_usize("HOMERENT_CATALOG_SUGGESTION_LIMIT", &value)?;
        }
        if let Some(value) = read_env("HOMERENT_CATALOG_RECOMMENDATION_LIMIT") {
            self.catalog.recommendation_limit =
                parse_usize("HOMERENT_CATALOG_RECOMMENDATION_LIMIT", &value)?;
        }

        if let Some(value) = read_env("HOMERENT_CHECKOUT_PROCESSING_DELAY_MS") {
            self.checkout.processing_delay_ms =
                parse_u64("HOMERENT_CHECKOUT_PROCESSING_DELAY_MS", &value)?;
        }

        if let Some(value) = read_env("HOMERENT_MAIL_ENABLED") {
            self.mail.enabled = parse_bool("HOMERENT_MAIL_ENABLED", &value)?;
        }
        if let Some(value) = read_env("HOMERENT_MAIL_SENDER") {
            self.mail.sender = value;
        }
        if let Some(value) = read_env("HOMERENT_MAIL_SMTP_PASSWORD") {
            self.mail.smtp_password = Some(SecretString::from(value));
        }

        if let Some(value) = read_env("HOMERENT_DISPLAY_DARK_MODE") {
            self.display.dark_mode = parse_bool("HOMERENT_DISPLAY_DARK_MODE", &value)?;
        }
        if let Some(value) = read_env("HOMERENT_DISPLAY_CURRENCY") {
            self.display.currency = value;
        }

        let log_level =
            read_env("HOMERENT_LOGGING_LEVEL").or_else(|| read_env("HOMERENT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("HOMERENT_LOGGING_FORMAT").or_else(|| read_env("HOMERENT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(api_base_url) = overrides.catalog_api_base_url {
            self.catalog.api_base_url = api_base_url;
        }
        if let Some(processing_delay_ms) = overrides.processing_delay_ms {
            self.checkout.processing_delay_ms = processing_delay_ms;
        }
        if let Some(dark_mode) = overrides.dark_mode {
            self.display.dark_mode = dark_mode;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_catalog(&self.catalog)?;
        validate_mail(&self.mail)?;
        validate_display(&self.display)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("homerent.toml"), PathBuf::from("config/homerent.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    let base_url = catalog.api_base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "catalog.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if catalog.refresh_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "catalog.refresh_interval_secs must be greater than zero".to_string(),
        ));
    }

    if catalog.suggestion_limit == 0 || catalog.recommendation_limit == 0 {
        return Err(ConfigError::Validation(
            "catalog.suggestion_limit and catalog.recommendation_limit must be greater than zero"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_mail(mail: &MailConfig) -> Result<(), ConfigError> {
    if !mail.enabled {
        return Ok(());
    }

    if !crate::validation::is_email(mail.sender.trim()) {
        return Err(ConfigError::Validation(
            "mail.sender must be an email address when mail is enabled".to_string(),
        ));
    }

    let missing = mail
        .smtp_password
        .as_ref()
        .map(|value| value.expose_secret().trim().is_empty())
        .unwrap_or(true);
    if missing {
        return Err(ConfigError::Validation(
            "mail.smtp_password is required when mail is enabled".to_string(),
        ));
    }

    Ok(())
}

fn validate_display(display: &DisplayConfig) -> Result<(), ConfigError> {
    if display.currency.trim().is_empty() {
        return Err(ConfigError::Validation("display.currency must not be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    catalog: Option<CatalogPatch>,
    checkout: Option<CheckoutPatch>,
    mail: Option<MailPatch>,
    display: Option<DisplayPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    api_base_url: Option<String>,
    refresh_interval_secs: Option<u64>,
    suggestion_limit: Option<usize>,
    recommendation_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct CheckoutPatch {
    processing_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct MailPatch {
    enabled: Option<bool>,
    sender: Option<String>,
    smtp_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DisplayPatch {
    dark_mode: Option<bool>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
