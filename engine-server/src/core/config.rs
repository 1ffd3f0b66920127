use crate::auth::JwtConfig;

/// Server configuration
///
/// Every field can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/entitlement-engine | Work directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP service port |
/// | ENVIRONMENT | development | Runtime environment |
/// | NOTIFY_ENDPOINT | (unset) | Mail relay endpoint, notifications disabled when unset |
/// | NOTIFY_TIMEOUT_MS | 5000 | Outbound notification timeout |
/// | OPERATOR_EMAIL | (unset) | Recipient for operator notifications |
/// | ACCESS_CODE_TTL_HOURS | 24 | Access code lifetime |
/// | SWEEP_INTERVAL_SECS | 3600 | Expiry sweep interval |
/// | EXPIRY_WARNING_DAYS | 3 | Expiry warning lookahead window |
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory for the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT validation configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Mail relay endpoint for outbound notifications
    pub notify_endpoint: Option<String>,
    /// Outbound notification timeout (milliseconds)
    pub notify_timeout_ms: u64,
    /// Operator notification recipient
    pub operator_email: Option<String>,
    /// Access code lifetime (hours)
    pub access_code_ttl_hours: i64,
    /// Expiry sweep interval (seconds)
    pub sweep_interval_secs: u64,
    /// Expiry warning lookahead (days)
    pub expiry_warning_days: i64,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/entitlement-engine".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            notify_endpoint: std::env::var("NOTIFY_ENDPOINT").ok(),
            notify_timeout_ms: std::env::var("NOTIFY_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            operator_email: std::env::var("OPERATOR_EMAIL").ok(),
            access_code_ttl_hours: std::env::var("ACCESS_CODE_TTL_HOURS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(24),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3600),
            expiry_warning_days: std::env::var("EXPIRY_WARNING_DAYS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3),
        }
    }

    /// Override work dir and port, typically for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::with_overrides("/tmp/engine-test", 0);
        assert_eq!(config.work_dir, "/tmp/engine-test");
        assert_eq!(config.access_code_ttl_hours, 24);
        assert_eq!(config.expiry_warning_days, 3);
        assert_eq!(config.notify_timeout_ms, 5000);
    }
}
