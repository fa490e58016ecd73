use std::env;

pub const DEFAULT_REGION_BASE_URL: &str = "https://www.emsifa.com/api-wilayah-indonesia/api";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_exp_days: i64,
    pub regions: RegionConfig,
}

/// Upstream province/city directory.
#[derive(Debug, Clone)]
pub struct RegionConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub cache_ttl_secs: u64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REGION_BASE_URL.to_string(),
            timeout_ms: 5000,
            retries: 1,
            cache_ttl_secs: 3600,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must be set");
        }
        let jwt_exp_days = env::var("JWT_EXP_DAYS")
            .ok()
            .and_then(|d| d.trim().parse::<i64>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(7);
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_exp_days,
            regions: RegionConfig::from_env(),
        })
    }
}

impl RegionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = env::var("REGION_BASE_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);
        Self {
            base_url,
            timeout_ms: parse_env("REGION_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.timeout_ms),
            retries: parse_env("REGION_RETRIES").unwrap_or(defaults.retries),
            cache_ttl_secs: parse_env("REGION_CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl_secs),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
