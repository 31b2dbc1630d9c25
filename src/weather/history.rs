use super::openweather::OpenWeatherClient;
use super::types::*;
use super::{location_query, nearest_sample, WeatherError, WeatherFetcher};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Serves past timestamps: geocodes the city, then asks the time machine endpoint.
pub struct HistoryClient {
    http: Arc<OpenWeatherClient>,
    geo_url: String,
    history_url: String,
}

impl HistoryClient {
    pub fn new(http: Arc<OpenWeatherClient>, geo_url: String, history_url: String) -> Self {
        Self {
            http,
            geo_url,
            history_url,
        }
    }

    async fn lat_lon(&self, country_code: &str, city: &str) -> Result<(f64, f64), WeatherError> {
        let q = location_query(country_code, city);
        let params = [("q", q.as_str()), ("limit", "1"), ("appid", self.http.api_key())];

        let places: Vec<GeocodeResponse> = match self.http.get_json(&self.geo_url, &params).await {
            Ok(places) => places,
            Err(e) => {
                tracing::error!("Error while requesting {}: {}", self.geo_url, e);
                return Err(e.into());
            }
        };

        let place = places.first().ok_or_else(|| {
            tracing::info!("Geocoding found no location for {}", q);
            WeatherError::LocationNotFound
        })?;

        tracing::info!(
            "Fetched lat, lon: {}, {} for {}, {}",
            place.lat,
            place.lon,
            place.name,
            place.country
        );
        Ok((place.lat, place.lon))
    }
}

#[async_trait]
impl WeatherFetcher for HistoryClient {
    async fn fetch(
        &self,
        country_code: &str,
        city: &str,
        date: DateTime<Utc>,
    ) -> Result<NormalizedWeather, WeatherError> {
        let (lat, lon) = self.lat_lon(country_code, city).await?;

        let lat = lat.to_string();
        let lon = lon.to_string();
        let dt = date.timestamp().to_string();
        let params = [
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("dt", dt.as_str()),
            ("appid", self.http.api_key()),
            ("units", self.http.units()),
        ];

        let history: TimeMachineResponse =
            match self.http.get_json(&self.history_url, &params).await {
                Ok(history) => history,
                Err(e) => {
                    tracing::error!("Error while requesting {}: {}", self.history_url, e);
                    return Err(e.into());
                }
            };

        let sample = nearest_sample(&history.hourly, date).ok_or_else(|| {
            tracing::error!("Time machine for {},{} came back with no hourly data", lat, lon);
            WeatherError::NoData
        })?;

        tracing::info!(
            "Fetched openweather history for {} ({} samples, picked dt={})",
            location_query(country_code, city),
            history.hourly.len(),
            sample.dt
        );

        Ok(sample.clone())
    }
}
