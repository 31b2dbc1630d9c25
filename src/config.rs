use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub openweather_api_key: String,
    pub openweather_base_url: String,
    pub openweather_forecast_path: String,
    pub openweather_history_path: String,
    pub openweather_geocode_direct_path: String,
    pub openweather_forecast_url: Option<String>,
    pub openweather_history_url: Option<String>,
    pub openweather_geo_url: Option<String>,
    pub openweather_units: String,
    pub openweather_max_retries: u32,
    pub openweather_retry_delay_ms: u64,
    pub http_timeout_secs: u64,
    pub cache_uri: Option<String>,
    pub cache_expire_seconds: u64,
    pub cache_max_capacity: u64,
    pub cache_prefix: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            openweather_api_key: env::var("OPENWEATHER_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENWEATHER_API_KEY not set"))?,
            openweather_base_url: env::var("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org".to_string()),
            openweather_forecast_path: env::var("OPENWEATHER_FORECAST_PATH")
                .unwrap_or_else(|_| "/data/2.5/forecast".to_string()),
            openweather_history_path: env::var("OPENWEATHER_HISTORY_PATH")
                .unwrap_or_else(|_| "/data/2.5/onecall/timemachine".to_string()),
            openweather_geocode_direct_path: env::var("OPENWEATHER_GEOCODE_DIRECT_PATH")
                .unwrap_or_else(|_| "/geo/1.0/direct".to_string()),
            openweather_forecast_url: env::var("OPENWEATHER_FORECAST_URL").ok(),
            openweather_history_url: env::var("OPENWEATHER_HISTORY_URL").ok(),
            openweather_geo_url: env::var("OPENWEATHER_GEO_URL").ok(),
            openweather_units: env::var("OPENWEATHER_UNITS")
                .unwrap_or_else(|_| "metric".to_string()),
            openweather_max_retries: parse_var("OPENWEATHER_MAX_RETRIES", 2)?,
            openweather_retry_delay_ms: parse_var("OPENWEATHER_RETRY_DELAY_MS", 1000)?,
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", 10)?,
            cache_uri: env::var("CACHE_URI").ok().filter(|uri| !uri.trim().is_empty()),
            cache_expire_seconds: parse_var("CACHE_EXPIRE_SECONDS", 30 * 60)?,
            cache_max_capacity: parse_var("CACHE_MAX_CAPACITY", 10_000)?,
            cache_prefix: env::var("CACHE_PREFIX").unwrap_or_else(|_| "weather".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }

    /// Config pointing every endpoint at `base_url`, with defaults for everything else.
    #[cfg(test)]
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Config {
            openweather_api_key: api_key.to_string(),
            openweather_base_url: base_url.trim_end_matches('/').to_string(),
            openweather_forecast_path: "/data/2.5/forecast".to_string(),
            openweather_history_path: "/data/2.5/onecall/timemachine".to_string(),
            openweather_geocode_direct_path: "/geo/1.0/direct".to_string(),
            openweather_forecast_url: None,
            openweather_history_url: None,
            openweather_geo_url: None,
            openweather_units: "metric".to_string(),
            openweather_max_retries: 2,
            openweather_retry_delay_ms: 1000,
            http_timeout_secs: 10,
            cache_uri: None,
            cache_expire_seconds: 30 * 60,
            cache_max_capacity: 10_000,
            cache_prefix: "weather".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }

    pub fn forecast_url(&self) -> String {
        self.endpoint(&self.openweather_forecast_url, &self.openweather_forecast_path)
    }

    pub fn history_url(&self) -> String {
        self.endpoint(&self.openweather_history_url, &self.openweather_history_path)
    }

    pub fn geocode_url(&self) -> String {
        self.endpoint(&self.openweather_geo_url, &self.openweather_geocode_direct_path)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_expire_seconds)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.openweather_retry_delay_ms)
    }

    fn endpoint(&self, full_url: &Option<String>, path: &str) -> String {
        match full_url {
            Some(url) => url.clone(),
            None => format!("{}{}", self.openweather_base_url, path),
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_join_base_url_and_paths() {
        let config = Config::with_base_url("http://localhost:9000/", "KEY");

        assert_eq!(config.forecast_url(), "http://localhost:9000/data/2.5/forecast");
        assert_eq!(
            config.history_url(),
            "http://localhost:9000/data/2.5/onecall/timemachine"
        );
        assert_eq!(config.geocode_url(), "http://localhost:9000/geo/1.0/direct");
    }

    #[test]
    fn test_endpoint_override_wins() {
        let mut config = Config::with_base_url("http://localhost:9000", "KEY");
        config.openweather_history_url = Some("http://history.local/tm".to_string());

        assert_eq!(config.history_url(), "http://history.local/tm");
        assert_eq!(config.forecast_url(), "http://localhost:9000/data/2.5/forecast");
    }

    #[test]
    fn test_default_ttl_is_thirty_minutes() {
        let config = Config::with_base_url("http://localhost", "KEY");
        assert_eq!(config.cache_ttl(), Duration::from_secs(1800));
    }
}
