use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "dev" | "development" | "local" => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Per-category TTLs in seconds.
#[derive(Clone, Debug)]
pub struct TtlConfig {
    pub search_secs: u64,
    pub details_secs: u64,
    pub static_secs: u64,
    pub reviews_secs: u64,
    pub live_secs: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            search_secs: 300,
            details_secs: 1_800,
            static_secs: 86_400,
            reviews_secs: 3_600,
            live_secs: 60,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub environment: Environment,
    pub rapidapi_key: Option<String>,
    pub rapidapi_host: String,
    pub booking_api_base_url: String,
    pub booking_api_timeout_secs: u64,
    pub redis_url: Option<String>,
    pub redis_retries: usize,
    pub tier1_max_entries: u64,
    pub compression_level: u32,
    pub ttl: TtlConfig,
    pub events_capacity: usize,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_RAPIDAPI_HOST: &str = "booking-com15.p.rapidapi.com";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_REDIS_RETRIES: usize = 6;
    const DEFAULT_TIER1_MAX_ENTRIES: u64 = 10_000;
    const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
    const DEFAULT_EVENTS_CAPACITY: usize = 1000;

    pub fn from_env() -> Self {
        let rapidapi_host = std::env::var("RAPIDAPI_HOST")
            .unwrap_or_else(|_| Self::DEFAULT_RAPIDAPI_HOST.to_string());

        let defaults = TtlConfig::default();

        Self {
            host: std::env::var("COMPASS_HOST").unwrap_or_else(|_| Self::DEFAULT_HOST.to_string()),
            http_port: env_parse("COMPASS_HTTP_PORT", Self::DEFAULT_HTTP_PORT),
            environment: std::env::var("COMPASS_ENV")
                .map(|v| Environment::parse(&v))
                .unwrap_or(Environment::Production),
            rapidapi_key: match std::env::var("RAPIDAPI_KEY") {
                Ok(key) if !key.trim().is_empty() => Some(key),
                _ => {
                    warn!("RAPIDAPI_KEY not set, the booking client cannot be created");
                    None
                }
            },
            booking_api_base_url: std::env::var("BOOKING_API_BASE_URL")
                .unwrap_or_else(|_| format!("https://{}", rapidapi_host)),
            rapidapi_host,
            booking_api_timeout_secs: env_parse(
                "BOOKING_API_TIMEOUT_SECS",
                Self::DEFAULT_TIMEOUT_SECS,
            ),
            redis_url: std::env::var("REDIS_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            redis_retries: env_parse("REDIS_RETRIES", Self::DEFAULT_REDIS_RETRIES),
            tier1_max_entries: env_parse(
                "CACHE_TIER1_MAX_ENTRIES",
                Self::DEFAULT_TIER1_MAX_ENTRIES,
            ),
            compression_level: env_parse(
                "CACHE_COMPRESSION_LEVEL",
                Self::DEFAULT_COMPRESSION_LEVEL,
            ),
            ttl: TtlConfig {
                search_secs: env_parse("CACHE_TTL_SEARCH_SECS", defaults.search_secs),
                details_secs: env_parse("CACHE_TTL_DETAILS_SECS", defaults.details_secs),
                static_secs: env_parse("CACHE_TTL_STATIC_SECS", defaults.static_secs),
                reviews_secs: env_parse("CACHE_TTL_REVIEWS_SECS", defaults.reviews_secs),
                live_secs: env_parse("CACHE_TTL_LIVE_SECS", defaults.live_secs),
            },
            events_capacity: env_parse("CACHE_EVENTS_CAPACITY", Self::DEFAULT_EVENTS_CAPACITY),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("{} has an invalid value '{}', using default", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}
