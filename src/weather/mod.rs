pub mod forecast;
pub mod history;
#[cfg(test)]
pub mod mock;
pub mod openweather;
pub mod types;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use types::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    #[error("Invalid city/country_code")]
    LocationNotFound,
    #[error("{0}")]
    Unavailable(String),
    #[error("no data returned by provider")]
    NoData,
}

/// A source of weather for one point in time at one location.
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn fetch(
        &self,
        country_code: &str,
        city: &str,
        date: DateTime<Utc>,
    ) -> Result<NormalizedWeather, WeatherError>;
}

pub trait Timestamped {
    fn timestamp(&self) -> i64;
}

impl Timestamped for ForecastItem {
    fn timestamp(&self) -> i64 {
        self.dt
    }
}

impl Timestamped for NormalizedWeather {
    fn timestamp(&self) -> i64 {
        self.dt
    }
}

/// Sample closest in time to `target`. Ties go to the earliest sample in the list.
pub fn nearest_sample<T: Timestamped>(samples: &[T], target: DateTime<Utc>) -> Option<&T> {
    let target_ts = target.timestamp();
    samples
        .iter()
        .min_by_key(|sample| sample.timestamp().abs_diff(target_ts))
}

/// Query string value the provider expects for a city lookup.
pub fn location_query(country_code: &str, city: &str) -> String {
    format!("{},{}", city, country_code)
}
