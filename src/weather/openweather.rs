use super::WeatherError;
use crate::config::Config;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Error, Debug)]
pub enum OpenWeatherError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("Rate limited, retry after: {0}s")]
    RateLimited(u64),
    #[error("API error: {0}")]
    ApiError(String),
}

impl From<OpenWeatherError> for WeatherError {
    fn from(err: OpenWeatherError) -> Self {
        WeatherError::Unavailable(err.to_string())
    }
}

/// Shared transport for every OpenWeather endpoint.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    units: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("api_key", &"<redacted>")
            .field("units", &self.units)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherClient {
    pub fn new(config: &Config) -> Result<Self, OpenWeatherError> {
        let client = Client::builder()
            .user_agent("WeatherGateway/1.0")
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            api_key: config.openweather_api_key.clone(),
            units: config.openweather_units.clone(),
            max_retries: config.openweather_max_retries,
            retry_base_delay: config.retry_base_delay(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    /// GET `url` with `params` and decode the JSON body. Retries only on 429.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, OpenWeatherError> {
        let mut retry_count = 0;
        let mut delay = self.retry_base_delay;

        loop {
            // Query strings carry the API key, keep them out of error text
            let response = self
                .client
                .get(url)
                .query(params)
                .send()
                .await
                .map_err(reqwest::Error::without_url)?;

            match response.status() {
                status if status.is_success() => {
                    let body = response.text().await.map_err(reqwest::Error::without_url)?;
                    return Ok(serde_json::from_str(&body)?);
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if retry_count >= self.max_retries {
                        return Err(OpenWeatherError::RateLimited(delay.as_secs()));
                    }

                    tracing::warn!(
                        "Rate limited by OpenWeather API, retrying in {}ms",
                        delay.as_millis()
                    );

                    sleep(delay).await;
                    delay = delay.mul_f32(2.0 + fastrand::f32() * 0.5); // Exponential backoff with jitter
                    retry_count += 1;
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(OpenWeatherError::ApiError(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }
}
