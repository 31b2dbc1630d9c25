use super::types::*;
use super::{WeatherError, WeatherFetcher};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory fetcher that records its calls and answers with a canned result.
pub struct MockFetcher {
    result: Result<NormalizedWeather, WeatherError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, String, DateTime<Utc>)>>,
}

impl MockFetcher {
    pub fn returning(weather: NormalizedWeather) -> Self {
        Self::with_result(Ok(weather))
    }

    pub fn failing(err: WeatherError) -> Self {
        Self::with_result(Err(err))
    }

    fn with_result(result: Result<NormalizedWeather, WeatherError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, String, DateTime<Utc>)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherFetcher for MockFetcher {
    async fn fetch(
        &self,
        country_code: &str,
        city: &str,
        date: DateTime<Utc>,
    ) -> Result<NormalizedWeather, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() =
            Some((country_code.to_string(), city.to_string(), date));
        self.result.clone()
    }
}

/// A plausible sample stamped at `dt`.
pub fn sample_weather(dt: i64, description: &str) -> NormalizedWeather {
    NormalizedWeather {
        dt,
        temp: -2.4,
        feels_like: -6.9,
        pressure: 1018,
        humidity: 81,
        clouds: 90,
        wind_speed: 4.5,
        wind_deg: 250.0,
        wind_gust: Some(9.1),
        visibility: Some(10000),
        weather: vec![WeatherDescription {
            id: 804,
            main: "Clouds".to_string(),
            description: description.to_string(),
            icon: "04d".to_string(),
        }],
    }
}
