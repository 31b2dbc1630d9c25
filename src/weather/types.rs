use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Flat weather record returned to clients and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NormalizedWeather {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: i64,
    pub humidity: i64,
    pub clouds: i64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub wind_gust: Option<f64>,
    pub visibility: Option<i64>,
    pub weather: Vec<WeatherDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherDescription {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

// Forecast endpoint (/data/2.5/forecast)

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastItem>,
    pub city: Option<ForecastCity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: ForecastMain,
    #[serde(default)]
    pub weather: Vec<WeatherDescription>,
    pub clouds: ForecastClouds,
    pub wind: ForecastWind,
    pub visibility: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: i64,
    pub humidity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastClouds {
    pub all: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastWind {
    pub speed: f64,
    pub deg: f64,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    pub country: String,
}

// Time machine endpoint (/data/2.5/onecall/timemachine)

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeMachineResponse {
    /// One Call 3.0 names the sample list `data`.
    #[serde(default, alias = "data")]
    pub hourly: Vec<NormalizedWeather>,
}

// Geocoding endpoint (/geo/1.0/direct)

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
}

impl From<&ForecastItem> for NormalizedWeather {
    fn from(item: &ForecastItem) -> Self {
        Self {
            dt: item.dt,
            temp: item.main.temp,
            feels_like: item.main.feels_like,
            pressure: item.main.pressure,
            humidity: item.main.humidity,
            clouds: item.clouds.all,
            wind_speed: item.wind.speed,
            wind_deg: item.wind.deg,
            wind_gust: item.wind.gust,
            visibility: item.visibility,
            weather: item.weather.clone(),
        }
    }
}
