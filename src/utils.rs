use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

pub const MAX_CITY_LEN: usize = 70;
pub const MAX_DAYS_FROM_NOW: i64 = 5;

/// Validate an ISO 3166-1 alpha-2 country code (any case)
pub fn validate_country_code(code: &str) -> Result<(), String> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!(
            "country_code: expected a 2-letter ISO 3166-1 code, got {:?}",
            code
        ));
    }
    Ok(())
}

/// Validate a city name: 1 to 70 characters
pub fn validate_city(city: &str) -> Result<(), String> {
    let len = city.chars().count();
    if len == 0 {
        return Err("city: must not be empty".to_string());
    }
    if len > MAX_CITY_LEN {
        return Err(format!(
            "city: at most {} characters allowed, got {}",
            MAX_CITY_LEN, len
        ));
    }
    Ok(())
}

/// Title-case a string: the first letter of every word upper, the rest lower.
/// A word starts after any non-letter, so "o'neill" becomes "O'Neill".
pub fn title_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut in_word = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }

    result
}

/// Parse an ISO-8601 instant. Without an offset the value is taken as UTC.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    // An unescaped '+' in a query string arrives as a space
    if raw.contains('T') && raw.contains(' ') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw.replacen(' ', "+", 1)) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(format!("date: {:?} is not a valid ISO-8601 datetime", raw))
}

/// Reject dates more than five days away from `now` in either direction
pub fn check_date_window(date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), String> {
    let window = Duration::days(MAX_DAYS_FROM_NOW);

    if date < now - window {
        return Err(format!(
            "It is possible to request a weather history no older than {} days",
            MAX_DAYS_FROM_NOW
        ));
    }
    if date > now + window {
        return Err(format!(
            "It is possible to request a weather forecast no further than {} days",
            MAX_DAYS_FROM_NOW
        ));
    }
    Ok(())
}
