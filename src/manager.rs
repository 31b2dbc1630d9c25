use crate::cache::{derive_cache_key, CacheStore};
use crate::weather::types::NormalizedWeather;
use crate::weather::{WeatherError, WeatherFetcher};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Forecast,
    History,
}

impl Route {
    /// Present and future go to the forecast, the past to history.
    pub fn for_timestamp(date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if date >= now {
            Route::Forecast
        } else {
            Route::History
        }
    }
}

/// Per-request coordinator between the cache and the two upstream paths.
pub struct WeatherManager {
    cache: Arc<dyn CacheStore>,
    forecast: Arc<dyn WeatherFetcher>,
    history: Arc<dyn WeatherFetcher>,
    cache_ttl: Duration,
    cache_prefix: String,
}

impl WeatherManager {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        forecast: Arc<dyn WeatherFetcher>,
        history: Arc<dyn WeatherFetcher>,
        cache_ttl: Duration,
        cache_prefix: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            forecast,
            history,
            cache_ttl,
            cache_prefix: cache_prefix.into(),
        }
    }

    pub fn cache_key(&self, country_code: &str, city: &str, date: DateTime<Utc>) -> String {
        derive_cache_key(&self.cache_prefix, country_code, city, date)
    }

    pub async fn get_weather(
        &self,
        country_code: &str,
        city: &str,
        date: DateTime<Utc>,
    ) -> Result<NormalizedWeather, WeatherError> {
        self.get_weather_as_of(country_code, city, date, Utc::now()).await
    }

    /// Same as [`get_weather`](Self::get_weather) with the routing clock supplied by the caller,
    /// so a request resolved against one "now" is routed against the same instant.
    pub async fn get_weather_as_of(
        &self,
        country_code: &str,
        city: &str,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<NormalizedWeather, WeatherError> {
        let cache_key = self.cache_key(country_code, city, date);

        if let Some(cached) = self.cached(&cache_key).await {
            tracing::debug!("Cache hit for {}", cache_key);
            return Ok(cached);
        }

        let route = Route::for_timestamp(date, now);
        tracing::debug!("Cache miss for {}, routing to {:?}", cache_key, route);

        let fetcher = match route {
            Route::Forecast => &self.forecast,
            Route::History => &self.history,
        };
        let result = fetcher.fetch(country_code, city, date).await?;

        self.store(&cache_key, &result).await;

        Ok(result)
    }

    async fn cached(&self, cache_key: &str) -> Option<NormalizedWeather> {
        let raw = match self.cache.get(cache_key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Cache read failed for {}, fetching instead: {}", cache_key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(weather) => Some(weather),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", cache_key, e);
                None
            }
        }
    }

    async fn store(&self, cache_key: &str, weather: &NormalizedWeather) {
        let payload = match serde_json::to_string(weather) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Could not serialize weather for {}: {}", cache_key, e);
                return;
            }
        };

        if let Err(e) = self.cache.set(cache_key, payload, self.cache_ttl).await {
            tracing::warn!("Cache write failed for {}: {}", cache_key, e);
        }
    }
}
