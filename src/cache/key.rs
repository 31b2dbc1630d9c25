use chrono::{DateTime, Utc};

const SECONDS_PER_HOUR: i64 = 3600;

/// Cache key for a location at the top of the hour containing `date`.
///
/// `"{prefix}:{country_code}-{city}-{hour_epoch}"`, with country code and city lowercased, so every
/// query inside the same UTC hour shares one entry regardless of casing.
pub fn derive_cache_key(prefix: &str, country_code: &str, city: &str, date: DateTime<Utc>) -> String {
    let ts = date.timestamp();
    let hour_ts = ts - ts.rem_euclid(SECONDS_PER_HOUR);
    format!(
        "{}:{}-{}-{}",
        prefix,
        country_code.to_lowercase(),
        city.to_lowercase(),
        hour_ts
    )
}
