use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::{ApiError, ErrorBody},
    manager::WeatherManager,
    utils::{check_date_window, parse_date, title_case, validate_city, validate_country_code},
    weather::types::{NormalizedWeather, WeatherDescription},
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<WeatherManager>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeatherQueryParams {
    /// Country code (ISO 3166-1 alpha-2 codes)
    #[param(required = true, example = "RU")]
    pub country_code: Option<String>,
    /// City name, 1 to 70 characters
    #[param(required = true, example = "Moscow")]
    pub city: Option<String>,
    /// Datetime ISO-8601 format. If no time zone is specified, then UTC is the default.
    /// Defaults to the current time.
    #[param(example = "2021-12-12T15:00:00+03:00")]
    pub date: Option<String>,
}

/// A validated request: UTC date, title-cased city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub country_code: String,
    pub city: String,
    pub date: DateTime<Utc>,
}

impl WeatherQuery {
    pub fn from_params(params: WeatherQueryParams, now: DateTime<Utc>) -> Result<Self, ApiError> {
        let country_code = params
            .country_code
            .ok_or_else(|| ApiError::Validation("country_code: field required".to_string()))?;
        validate_country_code(&country_code).map_err(ApiError::Validation)?;

        let city = params
            .city
            .ok_or_else(|| ApiError::Validation("city: field required".to_string()))?;
        validate_city(&city).map_err(ApiError::Validation)?;

        let date = match params.date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                let date = parse_date(raw).map_err(ApiError::Validation)?;
                check_date_window(date, now).map_err(ApiError::BadRequest)?;
                date
            }
            _ => now,
        };

        Ok(Self {
            country_code,
            city: title_case(&city),
            date,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "weather-api", description = "Service getting weather data"),
    paths(get_weather, health),
    components(schemas(NormalizedWeather, WeatherDescription, ErrorBody, HealthResponse)),
    tags((name = "weather", description = "Weather lookups by city and time"))
)]
pub struct ApiDoc;

// Route handlers
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/weather/",
    tag = "weather",
    params(WeatherQueryParams),
    responses(
        (status = 200, description = "Weather closest to the requested time", body = NormalizedWeather),
        (status = 400, description = "Bad request", body = ErrorBody),
        (status = 422, description = "Validation error", body = ErrorBody),
        (status = 503, description = "Service Unavailable", body = ErrorBody)
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    params: Result<Query<WeatherQueryParams>, QueryRejection>,
) -> Result<Json<NormalizedWeather>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;

    let now = Utc::now();
    let query = WeatherQuery::from_params(params, now)?;

    let weather = state
        .manager
        .get_weather_as_of(&query.country_code, &query.city, query.date, now)
        .await?;

    Ok(Json(weather))
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/weather/", get(get_weather))
        .route("/api/v1/weather", get(get_weather))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemoryStore};
    use crate::weather::mock::{sample_weather, MockFetcher};
    use crate::weather::WeatherError;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::Duration;
    use tower::ServiceExt;

    struct Harness {
        cache: Arc<MemoryStore>,
        forecast: Arc<MockFetcher>,
        history: Arc<MockFetcher>,
        app: Router,
    }

    fn harness_with(forecast: MockFetcher, history: MockFetcher) -> Harness {
        let cache = Arc::new(MemoryStore::new(100));
        let forecast = Arc::new(forecast);
        let history = Arc::new(history);
        let manager = WeatherManager::new(
            cache.clone(),
            forecast.clone(),
            history.clone(),
            std::time::Duration::from_secs(1800),
            "weather",
        );

        Harness {
            cache,
            forecast,
            history,
            app: create_router(AppState {
                manager: Arc::new(manager),
            }),
        }
    }

    fn harness() -> Harness {
        harness_with(
            MockFetcher::returning(sample_weather(100, "forecast")),
            MockFetcher::returning(sample_weather(50, "history")),
        )
    }

    fn params(country_code: &str, city: &str, date: Option<&str>) -> WeatherQueryParams {
        WeatherQueryParams {
            country_code: Some(country_code.to_string()),
            city: Some(city.to_string()),
            date: date.map(str::to_string),
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_query_params_current_date() {
        let now = Utc::now();
        let local = now.with_timezone(&chrono::FixedOffset::east_opt(3 * 3600).unwrap());

        let query = WeatherQuery::from_params(params("RU", "moScoW", Some(&local.to_rfc3339())), now)
            .unwrap();

        assert_eq!(query.date, now);
        assert_eq!(query.country_code, "RU");
        assert_eq!(query.city, "Moscow");
    }

    #[test]
    fn test_query_params_default_date_is_now() {
        let now = Utc::now();
        let query = WeatherQuery::from_params(params("RU", "Moscow", None), now).unwrap();
        assert_eq!(query.date, now);
    }

    #[test]
    fn test_query_params_past_5_days() {
        let now = Utc::now();
        let too_old = (now - Duration::days(5) - Duration::hours(1)).to_rfc3339();
        let ok = (now - Duration::days(4) - Duration::hours(23)).to_rfc3339();

        let err = WeatherQuery::from_params(params("RU", "Moscow", Some(&too_old)), now).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(WeatherQuery::from_params(params("RU", "Moscow", Some(&ok)), now).is_ok());
    }

    #[test]
    fn test_query_params_future_5_days() {
        let now = Utc::now();
        let too_far = (now + Duration::days(5) + Duration::hours(1)).to_rfc3339();

        let err = WeatherQuery::from_params(params("RU", "Moscow", Some(&too_far)), now).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_query_params_validation_is_422() {
        let now = Utc::now();
        let cases = [
            params("RUS", "Moscow", None),
            params("RU", "", None),
            params("RU", &"x".repeat(71), None),
            params("RU", "Moscow", Some("not-a-date")),
            WeatherQueryParams {
                country_code: None,
                city: Some("Moscow".to_string()),
                date: None,
            },
        ];

        for case in cases {
            let err = WeatherQuery::from_params(case, now).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn test_current_weather_end_to_end() {
        let h = harness();
        let before = Utc::now();

        let (status, body) = get(
            h.app,
            "/api/v1/weather/?country_code=RU&city=saint%20petersburg",
        )
        .await;
        let after = Utc::now();

        assert_eq!(status, StatusCode::OK);
        assert!(!body["weather"].as_array().unwrap().is_empty());
        assert_eq!(h.forecast.calls(), 1);
        assert_eq!(h.history.calls(), 0);

        let (_, city, _) = h.forecast.last_request().unwrap();
        assert_eq!(city, "Saint Petersburg");

        let hour = |t: DateTime<Utc>| t.timestamp() - t.timestamp().rem_euclid(3600);
        let mut populated = false;
        for ts in [hour(before), hour(after)] {
            let key = format!("weather:ru-saint petersburg-{}", ts);
            if let Some(cached) = h.cache.get(&key).await.unwrap() {
                let cached: serde_json::Value = serde_json::from_str(&cached).unwrap();
                assert_eq!(cached, body);
                populated = true;
            }
        }
        assert!(populated);
    }

    #[tokio::test]
    async fn test_past_date_goes_to_history() {
        let h = harness();
        let date = (Utc::now() - Duration::days(2)).format("%Y-%m-%dT%H:%M:%SZ");

        let (status, body) = get(
            h.app,
            &format!("/api/v1/weather/?country_code=RU&city=Moscow&date={}", date),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["weather"][0]["description"], "history");
        assert_eq!(h.history.calls(), 1);
        assert_eq!(h.forecast.calls(), 0);
    }

    #[tokio::test]
    async fn test_repeated_request_is_cached() {
        let h = harness();
        let date = (Utc::now() + Duration::days(1)).format("%Y-%m-%dT%H:%M:%SZ");
        let uri = format!("/api/v1/weather?country_code=RU&city=Moscow&date={}", date);

        let (_, first) = get(h.app.clone(), &uri).await;
        let (status, second) = get(h.app, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(h.forecast.calls(), 1);
    }

    #[tokio::test]
    async fn test_date_too_old_is_400() {
        let h = harness();
        let date = (Utc::now() - Duration::days(5) - Duration::hours(1)).format("%Y-%m-%dT%H:%M:%SZ");

        let (status, body) = get(
            h.app,
            &format!("/api/v1/weather/?country_code=RU&city=Moscow&date={}", date),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["detail"],
            "It is possible to request a weather history no older than 5 days"
        );
        assert_eq!(h.history.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_param_is_422() {
        let h = harness();
        let (status, body) = get(h.app, "/api/v1/weather/?city=Moscow").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("country_code"));
    }

    #[tokio::test]
    async fn test_unknown_location_is_400_and_outage_is_503() {
        let h = harness_with(
            MockFetcher::failing(WeatherError::Unavailable("HTTP 502 Bad Gateway: ".to_string())),
            MockFetcher::failing(WeatherError::LocationNotFound),
        );
        let past = (Utc::now() - Duration::hours(6)).format("%Y-%m-%dT%H:%M:%SZ");
        let future = (Utc::now() + Duration::hours(6)).format("%Y-%m-%dT%H:%M:%SZ");

        let (status, body) = get(
            h.app.clone(),
            &format!("/api/v1/weather/?country_code=ZZ&city=Nowhereville&date={}", past),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid city/country_code");

        let (status, body) = get(
            h.app,
            &format!("/api/v1/weather/?country_code=RU&city=Moscow&date={}", future),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["detail"].as_str().unwrap().contains("502"));
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness();
        let (status, body) = get(h.app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_openapi_document_lists_weather_path() {
        let h = harness();
        let (status, body) = get(h.app, "/api-docs/openapi.json").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/weather/"].is_object());
    }

    #[test]
    fn test_openapi_marks_location_params_required() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let params = doc["paths"]["/api/v1/weather/"]["get"]["parameters"]
            .as_array()
            .unwrap();

        let required = |name: &str| {
            params
                .iter()
                .find(|p| p["name"] == name)
                .map(|p| p["required"] == true)
                .unwrap()
        };

        assert!(required("country_code"));
        assert!(required("city"));
        assert!(!required("date"));
    }
}
