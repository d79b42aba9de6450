use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use url::Url;
use zeroize::Zeroizing;

use crate::{
    limiter::rate_limiter::RateLimitConfig,
    mail::{MailEnvelope, SmtpSettings},
};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Use the first `X-Forwarded-For` hop as the client identifier.
    /// Only enable behind a proxy that overwrites the header.
    #[serde(default)]
    pub trust_x_forwarded_for: bool,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_user: String,

    #[serde(default)]
    pub smtp_pass: String,

    #[serde(default)]
    pub from_email: Option<String>,

    #[serde(default = "default_from_name")]
    pub from_name: String,

    #[serde(default)]
    pub to_email: Option<String>,

    #[serde(default = "default_smtp_max_connections")]
    pub smtp_max_connections: u32,

    #[serde(default = "default_smtp_connect_timeout")]
    pub smtp_connect_timeout_secs: u64,

    #[serde(default = "default_smtp_send_timeout")]
    pub smtp_send_timeout_secs: u64,

    #[serde(default = "default_rate_window")]
    pub rate_window_secs: u64,

    #[serde(default = "default_rate_max_requests")]
    pub rate_max_requests: u32,

    #[serde(default = "default_slowdown_after")]
    pub slowdown_after: u32,

    #[serde(default = "default_slowdown_step")]
    pub slowdown_step_ms: u64,

    #[serde(default = "default_slowdown_max_delay")]
    pub slowdown_max_delay_ms: u64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-Relay".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}
fn default_smtp_port() -> u16 {
    465
}
fn default_from_name() -> String {
    "Portfolio".to_string()
}
fn default_smtp_max_connections() -> u32 {
    1
}
fn default_smtp_connect_timeout() -> u64 {
    10
}
fn default_smtp_send_timeout() -> u64 {
    20
}
fn default_rate_window() -> u64 {
    60
}
fn default_rate_max_requests() -> u32 {
    10
}
fn default_slowdown_after() -> u32 {
    3
}
fn default_slowdown_step() -> u64 {
    250
}
fn default_slowdown_max_delay() -> u64 {
    2_000
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            log_format: LogFormat::default(),
            cors_allowed_origins: default_cors_origins(),
            trust_x_forwarded_for: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_user: String::new(),
            smtp_pass: String::new(),
            from_email: None,
            from_name: default_from_name(),
            to_email: None,
            smtp_max_connections: default_smtp_max_connections(),
            smtp_connect_timeout_secs: default_smtp_connect_timeout(),
            smtp_send_timeout_secs: default_smtp_send_timeout(),
            rate_window_secs: default_rate_window(),
            rate_max_requests: default_rate_max_requests(),
            slowdown_after: default_slowdown_after(),
            slowdown_step_ms: default_slowdown_step(),
            slowdown_max_delay_ms: default_slowdown_max_delay(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Hosting platforms hand out the listening port as a bare PORT
        if env::var("APP_PORT").is_err() {
            if let Ok(raw) = env::var("PORT") {
                config.port = raw
                    .parse()
                    .map_err(|_| ConfigError::Message(format!("Invalid PORT value: {raw}")))?;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.env != AppEnvironment::Testing {
            if self.smtp_user.trim().is_empty() {
                errors.push("SMTP_USER must be set".to_string());
            }
            if self.smtp_pass.is_empty() {
                errors.push("SMTP_PASS must be set".to_string());
            }
        }
        if self.smtp_max_connections == 0 {
            errors.push("SMTP_MAX_CONNECTIONS must be at least 1".to_string());
        }
        if self.rate_window_secs == 0 {
            errors.push("RATE_WINDOW_SECS must be at least 1".to_string());
        }
        if self.rate_max_requests == 0 {
            errors.push("RATE_MAX_REQUESTS must be at least 1".to_string());
        }

        let origins = self.cors_origins();
        if self.is_production() && origins.iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }
        for origin in origins.iter().filter(|o| *o != "*") {
            match Url::parse(origin) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                _ => errors.push(format!("Invalid CORS origin: {origin}")),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            window: Duration::from_secs(self.rate_window_secs),
            max_requests: self.rate_max_requests,
            delay_after: self.slowdown_after,
            delay_step: Duration::from_millis(self.slowdown_step_ms),
            max_delay: Duration::from_millis(self.slowdown_max_delay_ms),
        }
    }

    pub fn smtp(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: self.smtp_user.clone(),
            password: Zeroizing::new(self.smtp_pass.clone()),
            max_connections: self.smtp_max_connections,
            connect_timeout: Duration::from_secs(self.smtp_connect_timeout_secs),
            send_timeout: Duration::from_secs(self.smtp_send_timeout_secs),
        }
    }

    /// Sender and recipient of every relayed message.
    pub fn envelope(&self) -> MailEnvelope {
        let from = match self.from_email.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => address.to_string(),
            _ => format!("\"{}\" <{}>", self.from_name, self.smtp_user),
        };
        let to = match self.to_email.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => address.to_string(),
            _ => self.smtp_user.clone(),
        };

        MailEnvelope { from, to }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("log_format", &self.log_format)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("trust_x_forwarded_for", &self.trust_x_forwarded_for)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &self.smtp_pass.redact())
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("to_email", &self.to_email)
            .field("smtp_max_connections", &self.smtp_max_connections)
            .field("smtp_connect_timeout_secs", &self.smtp_connect_timeout_secs)
            .field("smtp_send_timeout_secs", &self.smtp_send_timeout_secs)
            .field("rate_window_secs", &self.rate_window_secs)
            .field("rate_max_requests", &self.rate_max_requests)
            .field("slowdown_after", &self.slowdown_after)
            .field("slowdown_step_ms", &self.slowdown_step_ms)
            .field("slowdown_max_delay_ms", &self.slowdown_max_delay_ms)
            .finish()
    }
}
