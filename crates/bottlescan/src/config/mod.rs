use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the scanner service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub datasets: DatasetConfig,
    pub scan: ScanConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let data_dir = env::var("BOTTLESCAN_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let defaults = ScanConfig::default();
        let timeout_ms = numeric_var(
            "BOTTLESCAN_LOOKUP_TIMEOUT_MS",
            defaults.lookup_timeout.as_millis() as u64,
        )?;
        let max_substitutes =
            numeric_var("BOTTLESCAN_MAX_SUBSTITUTES", defaults.max_substitutes as u64)? as usize;
        let max_products =
            numeric_var("BOTTLESCAN_MAX_PRODUCTS", defaults.max_products as u64)? as usize;

        if timeout_ms == 0 {
            return Err(ConfigError::ZeroValue {
                key: "BOTTLESCAN_LOOKUP_TIMEOUT_MS",
            });
        }
        if max_substitutes == 0 {
            return Err(ConfigError::ZeroValue {
                key: "BOTTLESCAN_MAX_SUBSTITUTES",
            });
        }
        if max_products == 0 {
            return Err(ConfigError::ZeroValue {
                key: "BOTTLESCAN_MAX_PRODUCTS",
            });
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            datasets: DatasetConfig { data_dir },
            scan: ScanConfig {
                lookup_timeout: Duration::from_millis(timeout_ms),
                max_substitutes,
                max_products,
            },
        })
    }
}

fn numeric_var(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the pre-built reference datasets live. `None` selects the seed
/// datasets compiled into the crate.
#[derive(Debug, Clone, Default)]
pub struct DatasetConfig {
    pub data_dir: Option<PathBuf>,
}

/// Per-request limits for the scan pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Upper bound for every substitute-table and catalog sub-call.
    pub lookup_timeout: Duration,
    pub max_substitutes: usize,
    pub max_products: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_millis(2000),
            max_substitutes: 5,
            max_products: 5,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    ZeroValue { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer (got '{value}')")
            }
            ConfigError::ZeroValue { key } => write!(f, "{key} must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::ZeroValue { .. } => None,
        }
    }
}
