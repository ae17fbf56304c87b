//! Field readers for documents written by the browser version of the
//! tracker.
//!
//! Those exports carry `Date.now()` numbers as ids, store several numbers
//! as formatted strings (`"66.7"`) or `""`, and keep form timestamps
//! without an offset. Writing always uses the canonical shape.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

/// Stable id for a numeric legacy id. The same number always maps to the
/// same id, so references survive repeated imports.
pub fn legacy_id(n: u64) -> Uuid {
    Uuid::from_u128(n as u128)
}

fn id_from_raw<E: de::Error>(raw: RawId) -> Result<Uuid, E> {
    match raw {
        RawId::Number(n) => Ok(legacy_id(n)),
        RawId::Text(text) => {
            let text = text.trim();
            if let Ok(id) = Uuid::parse_str(text) {
                return Ok(id);
            }
            text.parse::<u64>()
                .map(legacy_id)
                .map_err(|_| E::custom(format!("invalid id {:?}", text)))
        }
    }
}

fn number_from_raw<E: de::Error>(raw: RawNumber) -> Result<Option<f64>, E> {
    match raw {
        RawNumber::Number(n) => Ok(Some(n)),
        RawNumber::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid number {:?}", text)))
        }
    }
}

/// A UUID string, or a legacy numeric id given as a number or a string
pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
    id_from_raw(RawId::deserialize(deserializer)?)
}

/// Like [`id`], with `null` read as absent
pub fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Uuid>, D::Error> {
    Option::<RawId>::deserialize(deserializer)?
        .map(id_from_raw)
        .transpose()
}

/// A number, or a number formatted as a string. `""` and `null` read as 0.
pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(optional_number(deserializer)?.unwrap_or(0.0))
}

/// A number, or a number formatted as a string. `""` and `null` read as
/// absent.
pub fn optional_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Ok(Option::<RawNumber>::deserialize(deserializer)?
        .map(number_from_raw)
        .transpose()?
        .flatten())
}

/// RFC 3339, or a form value such as `2024-05-01T09:30` read as UTC
pub fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp {:?}", raw)))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Fields {
        #[serde(deserialize_with = "id")]
        id: Uuid,
        #[serde(default, deserialize_with = "optional_id")]
        parent: Option<Uuid>,
        #[serde(default, deserialize_with = "number")]
        rate: f64,
        #[serde(default, deserialize_with = "optional_number")]
        pnl: Option<f64>,
        #[serde(deserialize_with = "timestamp")]
        at: DateTime<Utc>,
    }

    fn read(value: serde_json::Value) -> Fields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_numeric_ids_map_stably() {
        let a = read(json!({"id": 1712345678901u64, "at": "2024-05-01T09:30:00Z"}));
        let b = read(json!({"id": "1712345678901", "at": "2024-05-01T09:30:00Z"}));
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, legacy_id(1712345678901));
        assert_eq!(a.parent, None);

        let uuid = "6f1c1a52-3a57-4d3c-9f0e-2d8b8f6f3a10";
        let c = read(json!({"id": uuid, "parent": 42, "at": "2024-05-01T09:30:00Z"}));
        assert_eq!(c.id.to_string(), uuid);
        assert_eq!(c.parent, Some(legacy_id(42)));
    }

    #[test]
    fn test_numbers_as_strings() {
        let at = "2024-05-01T09:30:00Z";
        let p = read(json!({"id": 1, "rate": "66.7", "pnl": "-4.25", "at": at}));
        assert_eq!(p.rate, 66.7);
        assert_eq!(p.pnl, Some(-4.25));

        let p = read(json!({"id": 1, "rate": "", "pnl": "", "at": at}));
        assert_eq!(p.rate, 0.0);
        assert_eq!(p.pnl, None);

        let p = read(json!({"id": 1, "rate": 0, "pnl": null, "at": at}));
        assert_eq!(p.rate, 0.0);
        assert_eq!(p.pnl, None);
    }

    #[test]
    fn test_rejects_garbage() {
        let bad_number = json!({"id": 1, "rate": "abc", "at": "2024-05-01T09:30:00Z"});
        assert!(serde_json::from_value::<Fields>(bad_number).is_err());

        let bad_id = json!({"id": "not-an-id", "at": "2024-05-01T09:30:00Z"});
        assert!(serde_json::from_value::<Fields>(bad_id).is_err());

        let bad_time = json!({"id": 1, "at": "yesterday"});
        assert!(serde_json::from_value::<Fields>(bad_time).is_err());
    }

    #[test]
    fn test_form_timestamps_read_as_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(read(json!({"id": 1, "at": "2024-05-01T09:30"})).at, expected);
        assert_eq!(read(json!({"id": 1, "at": "2024-05-01T09:30:00.000Z"})).at, expected);
        assert_eq!(read(json!({"id": 1, "at": "2024-05-01T11:30:00+02:00"})).at, expected);
    }
}
