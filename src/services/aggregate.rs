//! Daily forecast aggregation.
//!
//! The provider's forecast is a chronological list of 3-hourly samples. The
//! daily view keeps the first sample of each UTC calendar date, in the order
//! the dates first appear.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::errors::AppError;

/// One forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastEntry {
    /// Sample time, Unix seconds
    pub dt: i64,
    /// Temperature in the configured unit system (°C for metric)
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Provider condition text (e.g. "ciel dégagé")
    pub description: String,
}

/// The first forecast sample of a calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyBucket {
    /// UTC calendar date of the sample
    pub date: NaiveDate,
    #[serde(flatten)]
    pub entry: ForecastEntry,
}

// --- OpenWeatherMap forecast list item ---

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    description: String,
}

impl From<OwForecastItem> for ForecastEntry {
    fn from(item: OwForecastItem) -> Self {
        Self {
            dt: item.dt,
            temperature: item.main.temp,
            humidity: item.main.humidity,
            description: item
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .unwrap_or_default(),
        }
    }
}

/// UTC calendar date of a Unix timestamp, if representable.
pub fn utc_date(dt: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(dt, 0).map(|t| t.date_naive())
}

/// Keep the first entry of each calendar date, preserving first-appearance order.
///
/// Entries whose timestamp cannot be represented as a date are dropped.
pub fn group_by_day(entries: &[ForecastEntry]) -> Vec<DailyBucket> {
    let mut seen = HashSet::new();
    let mut buckets = Vec::new();

    for entry in entries {
        let Some(date) = utc_date(entry.dt) else {
            tracing::warn!("Forecast entry with out-of-range dt {} skipped", entry.dt);
            continue;
        };
        if seen.insert(date) {
            buckets.push(DailyBucket {
                date,
                entry: entry.clone(),
            });
        }
    }

    buckets
}

/// Decode a provider `list` value into entries.
///
/// A missing or non-array value yields no entries. Items that don't match the
/// sample shape are skipped.
pub fn entries_from_list(list: Option<&serde_json::Value>) -> Vec<ForecastEntry> {
    let Some(items) = list.and_then(|l| l.as_array()) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(
            |item| match serde_json::from_value::<OwForecastItem>(item.clone()) {
                Ok(parsed) => Some(ForecastEntry::from(parsed)),
                Err(e) => {
                    tracing::warn!("Skipping malformed forecast item: {}", e);
                    None
                }
            },
        )
        .collect()
}

/// Aggregate a full provider forecast body into daily buckets.
///
/// A body without a `list` field is a data error, reported separately from
/// transport failures.
pub fn daily_forecast(body: &serde_json::Value) -> Result<Vec<DailyBucket>, AppError> {
    let list = body.get("list").ok_or_else(|| {
        AppError::MissingForecastData(body.to_string().chars().take(200).collect())
    })?;
    Ok(group_by_day(&entries_from_list(Some(list))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(s: &str) -> i64 {
        format!("{}:00Z", s)
            .parse::<DateTime<chrono::Utc>>()
            .unwrap()
            .timestamp()
    }

    fn entry(at: &str, temp: f64) -> ForecastEntry {
        ForecastEntry {
            dt: ts(at),
            temperature: temp,
            humidity: 60.0,
            description: "nuageux".to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_groups_two_dates() {
        let entries = vec![
            entry("2025-04-08T00:00", 10.0),
            entry("2025-04-08T06:00", 14.0),
            entry("2025-04-09T00:00", 9.0),
        ];
        let buckets = group_by_day(&entries);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].date, date("2025-04-08"));
        assert_eq!(buckets[0].entry, entries[0]);
        assert_eq!(buckets[1].date, date("2025-04-09"));
        assert_eq!(buckets[1].entry, entries[2]);
    }

    #[test]
    fn test_first_appearance_order_kept_for_unsorted_input() {
        let entries = vec![
            entry("2025-04-09T03:00", 1.0),
            entry("2025-04-08T03:00", 2.0),
            entry("2025-04-09T06:00", 3.0),
        ];
        let buckets = group_by_day(&entries);
        let dates: Vec<_> = buckets.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date("2025-04-09"), date("2025-04-08")]);
        assert_eq!(buckets[0].entry.temperature, 1.0);
    }

    #[test]
    fn test_at_most_one_bucket_per_date() {
        // Five days of 3-hourly samples starting mid-day.
        let start = ts("2025-04-08T12:00");
        let entries: Vec<_> = (0..40)
            .map(|i| ForecastEntry {
                dt: start + i * 3 * 3600,
                temperature: i as f64,
                humidity: 50.0,
                description: String::new(),
            })
            .collect();

        let buckets = group_by_day(&entries);
        assert_eq!(buckets.len(), 6);

        let mut dates: Vec<_> = buckets.iter().map(|b| b.date).collect();
        dates.dedup();
        assert_eq!(dates.len(), buckets.len());

        for bucket in &buckets {
            let first = entries
                .iter()
                .find(|e| utc_date(e.dt) == Some(bucket.date))
                .unwrap();
            assert_eq!(&bucket.entry, first);
        }
    }

    #[test]
    fn test_grouping_is_a_fixed_point() {
        let entries = vec![
            entry("2025-04-08T00:00", 10.0),
            entry("2025-04-08T21:00", 11.0),
            entry("2025-04-09T00:00", 9.0),
            entry("2025-04-10T18:00", 8.0),
        ];
        let once = group_by_day(&entries);
        let again_input: Vec<_> = once.iter().map(|b| b.entry.clone()).collect();
        assert_eq!(group_by_day(&again_input), once);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_day(&[]).is_empty());
    }

    #[test]
    fn test_date_is_utc() {
        // 23:30 UTC stays on the 8th whatever the local timezone.
        let e = ForecastEntry {
            dt: ts("2025-04-08T23:30"),
            temperature: 0.0,
            humidity: 0.0,
            description: String::new(),
        };
        assert_eq!(group_by_day(&[e])[0].date, date("2025-04-08"));
    }

    #[test]
    fn test_out_of_range_dt_skipped() {
        let e = ForecastEntry {
            dt: i64::MAX,
            temperature: 0.0,
            humidity: 0.0,
            description: String::new(),
        };
        assert!(group_by_day(&[e]).is_empty());
    }

    #[test]
    fn test_entries_from_list_non_array() {
        assert!(entries_from_list(None).is_empty());
        assert!(entries_from_list(Some(&json!("nope"))).is_empty());
        assert!(entries_from_list(Some(&json!({ "dt": 1 }))).is_empty());
        assert!(entries_from_list(Some(&json!(null))).is_empty());
    }

    #[test]
    fn test_entries_from_list_parses_provider_items() {
        let list = json!([
            {
                "dt": 1744070400,
                "main": { "temp": 12.5, "feels_like": 11.0, "humidity": 71 },
                "weather": [{ "id": 800, "main": "Clear", "description": "ciel dégagé" }],
                "dt_txt": "2025-04-08 00:00:00"
            },
            { "dt_txt": "missing dt" },
            {
                "dt": 1744081200,
                "main": { "temp": 11.0, "humidity": 75 },
                "weather": []
            }
        ]);
        let entries = entries_from_list(Some(&list));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].temperature, 12.5);
        assert_eq!(entries[0].humidity, 71.0);
        assert_eq!(entries[0].description, "ciel dégagé");
        assert_eq!(entries[1].description, "");
    }

    #[test]
    fn test_daily_forecast_missing_list_is_data_error() {
        let err = daily_forecast(&json!({ "cod": "200" })).unwrap_err();
        assert!(matches!(err, AppError::MissingForecastData(_)));
    }

    #[test]
    fn test_daily_forecast_non_array_list_is_empty() {
        let days = daily_forecast(&json!({ "list": 42 })).unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn test_bucket_serializes_flat() {
        let bucket = DailyBucket {
            date: date("2025-04-08"),
            entry: entry("2025-04-08T00:00", 10.0),
        };
        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["date"], "2025-04-08");
        assert_eq!(json["temperature"], 10.0);
        assert_eq!(json["description"], "nuageux");
    }
}
