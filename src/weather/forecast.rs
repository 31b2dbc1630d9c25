use super::openweather::OpenWeatherClient;
use super::types::*;
use super::{location_query, nearest_sample, WeatherError, WeatherFetcher};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Serves present and future timestamps from the 5 day / 3 hour forecast.
pub struct ForecastClient {
    http: Arc<OpenWeatherClient>,
    url: String,
}

impl ForecastClient {
    pub fn new(http: Arc<OpenWeatherClient>, url: String) -> Self {
        Self { http, url }
    }
}

#[async_trait]
impl WeatherFetcher for ForecastClient {
    async fn fetch(
        &self,
        country_code: &str,
        city: &str,
        date: DateTime<Utc>,
    ) -> Result<NormalizedWeather, WeatherError> {
        let q = location_query(country_code, city);
        let params = [
            ("q", q.as_str()),
            ("appid", self.http.api_key()),
            ("units", self.http.units()),
        ];

        let forecast: ForecastResponse = match self.http.get_json(&self.url, &params).await {
            Ok(forecast) => forecast,
            Err(e) => {
                tracing::error!("Error while requesting {}: {}", self.url, e);
                return Err(e.into());
            }
        };

        let item = nearest_sample(&forecast.list, date).ok_or_else(|| {
            tracing::error!("Forecast for {} came back with an empty list", q);
            WeatherError::NoData
        })?;

        let resolved = forecast
            .city
            .as_ref()
            .map(|c| format!("{},{}", c.name, c.country))
            .unwrap_or_else(|| q.clone());
        tracing::info!(
            "Fetched openweather forecast for {} ({} samples, picked dt={})",
            resolved,
            forecast.list.len(),
            item.dt
        );

        Ok(NormalizedWeather::from(item))
    }
}
