/// Top-level service configuration, loaded from `ENDPOINT_STATS_*`.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub debug: bool,
    pub collector: CollectorConfig,
    pub tracking: TrackingConfig,
}

/// Settings consumed by the accumulator itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    /// Upper bound on tracked endpoint keys before LRU eviction kicks in
    pub max_endpoints: usize,
}

/// Settings consumed only by the timing middleware when it builds keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingConfig {
    /// Keep `?query` as part of the endpoint key
    pub include_query_params: bool,
    /// Prefix the key with the method, e.g. `GET /users`
    pub group_by_method: bool,
    /// Collapse numeric and UUID path segments into `:id`
    pub normalize_paths: bool,
    /// Emit one `tracing` line per completed request
    pub enable_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            debug: false,
            collector: CollectorConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_endpoints: 1000,
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_endpoints == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_endpoints must be greater than zero")]
    ZeroCapacity,
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(|var| std::env::var(var).ok())
}

/// Build a `Config` from any variable source (the process environment in
/// production, a map in tests).
pub fn load_config_from<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let listen_addr = lookup("ENDPOINT_STATS_LISTEN_ADDR").unwrap_or(defaults.listen_addr);

    let debug = parse_bool(&lookup, "ENDPOINT_STATS_DEBUG")?.unwrap_or(false);

    let max_endpoints = match lookup("ENDPOINT_STATS_MAX_ENDPOINTS") {
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| ConfigError::InvalidValue {
            var: "ENDPOINT_STATS_MAX_ENDPOINTS",
            value: raw.clone(),
        })?,
        None => defaults.collector.max_endpoints,
    };
    let collector = CollectorConfig { max_endpoints };
    collector.validate()?;

    let tracking = TrackingConfig {
        include_query_params: parse_bool(&lookup, "ENDPOINT_STATS_INCLUDE_QUERY")?
            .unwrap_or(false),
        group_by_method: parse_bool(&lookup, "ENDPOINT_STATS_GROUP_BY_METHOD")?
            .unwrap_or(false),
        normalize_paths: parse_bool(&lookup, "ENDPOINT_STATS_NORMALIZE_PATHS")?
            .unwrap_or(false),
        enable_logging: parse_bool(&lookup, "ENDPOINT_STATS_LOGGING")?.unwrap_or(false),
    };

    Ok(Config {
        listen_addr,
        debug,
        collector,
        tracking,
    })
}

fn parse_bool<F>(lookup: &F, var: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue { var, value: raw }),
    }
}
