//! Data structures exchanged through the snapshot store.

use serde_json::{Map, Value};

use crate::error::FetchError;
use crate::quality::bands::{classify, Band, Metric};

/// The latest full set of sensor readings, as one overwritten unit.
///
/// Wire format is a flat JSON object with string-encoded decimals and the
/// pH key spelled `pH`, matching what the sensor uploader writes:
///
/// ```json
/// {"turbidity":"2.10","pH":"7.40","tds":"250.00","timestamp":"2024-01-01T00:00:00Z"}
/// ```
///
/// Decoding also accepts bare JSON numbers for the three numeric fields,
/// since the blob is occasionally hand-edited. A snapshot missing any field,
/// or carrying a non-numeric value where a number is required, is rejected
/// whole — readings are never silently defaulted to zero, which would
/// misclassify an absent sensor as "Good".
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Turbidity in NTU
    pub turbidity: f64,
    /// pH level
    pub ph: f64,
    /// Total dissolved solids in ppm
    pub tds: f64,
    /// ISO-8601 timestamp of the reading
    pub timestamp: String,
}

impl Snapshot {
    /// Decode a snapshot from a JSON body, validating every field.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| FetchError::malformed(format!("invalid JSON: {}", e)))?;

        let obj = value
            .as_object()
            .ok_or_else(|| FetchError::malformed("body is not a JSON object"))?;

        Ok(Self {
            turbidity: decimal_field(obj, "turbidity")?,
            ph: decimal_field(obj, "pH")?,
            tds: decimal_field(obj, "tds")?,
            timestamp: string_field(obj, "timestamp")?,
        })
    }

    /// Encode a snapshot in the wire format (two-decimal strings).
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "turbidity": format!("{:.2}", self.turbidity),
            "pH": format!("{:.2}", self.ph),
            "tds": format!("{:.2}", self.tds),
            "timestamp": self.timestamp,
        })
        .to_string()
    }
}

/// Extract a required decimal field that may be string-encoded or a bare number.
fn decimal_field(obj: &Map<String, Value>, key: &str) -> Result<f64, FetchError> {
    let value = obj
        .get(key)
        .ok_or_else(|| FetchError::malformed(format!("missing field '{}'", key)))?;

    let parsed = match value {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| FetchError::malformed(format!("field '{}' is not numeric: {:?}", key, s)))?,
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| FetchError::malformed(format!("field '{}' is out of range", key)))?,
        other => {
            return Err(FetchError::malformed(format!(
                "field '{}' has unexpected type: {}",
                key, other
            )))
        }
    };

    if !parsed.is_finite() {
        return Err(FetchError::malformed(format!(
            "field '{}' is not a finite number",
            key
        )));
    }

    Ok(parsed)
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Result<String, FetchError> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(_) => Err(FetchError::malformed(format!("field '{}' is not a string", key))),
        None => Err(FetchError::malformed(format!("missing field '{}'", key))),
    }
}

/// A single classified value derived from a snapshot field.
///
/// Derived, never persisted: recomputed on every fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub value: f64,
    pub band: Band,
}

impl Reading {
    fn new(metric: Metric, value: f64) -> Self {
        Self {
            value,
            band: classify(metric, value),
        }
    }
}

/// A snapshot with every reading classified against its thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterReport {
    pub turbidity: Reading,
    pub ph: Reading,
    pub tds: Reading,
    pub timestamp: String,
}

impl WaterReport {
    /// Classify every field of a validated snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            turbidity: Reading::new(Metric::Turbidity, snapshot.turbidity),
            ph: Reading::new(Metric::Ph, snapshot.ph),
            tds: Reading::new(Metric::Tds, snapshot.tds),
            timestamp: snapshot.timestamp.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wire_format() {
        let body = r#"{"turbidity":"2.10","pH":"7.40","tds":"250.00","timestamp":"2024-01-01T00:00:00Z"}"#;
        let snapshot = Snapshot::from_json(body).unwrap();
        assert_eq!(snapshot.turbidity, 2.10);
        assert_eq!(snapshot.ph, 7.40);
        assert_eq!(snapshot.tds, 250.00);
        assert_eq!(snapshot.timestamp, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_decode_bare_numbers() {
        let body = r#"{"turbidity":2.1,"pH":7.4,"tds":250,"timestamp":"T1"}"#;
        let snapshot = Snapshot::from_json(body).unwrap();
        assert_eq!(snapshot.tds, 250.0);
    }

    #[test]
    fn test_missing_field_rejects_whole_snapshot() {
        let body = r#"{"turbidity":"2.10","pH":"7.40","timestamp":"T1"}"#;
        let err = Snapshot::from_json(body).unwrap_err();
        assert!(matches!(err, FetchError::MalformedSnapshot(ref msg) if msg.contains("tds")));
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        let body = r#"{"turbidity":"abc","pH":"7.0","tds":"100","timestamp":"T"}"#;
        let err = Snapshot::from_json(body).unwrap_err();
        assert!(matches!(err, FetchError::MalformedSnapshot(_)));
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert!(Snapshot::from_json("[1,2,3]").is_err());
        assert!(Snapshot::from_json("not json at all").is_err());
    }

    #[test]
    fn test_encode_uses_two_decimal_strings() {
        let snapshot = Snapshot {
            turbidity: 2.1,
            ph: 7.4,
            tds: 250.0,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        };
        let json = snapshot.to_json();
        assert!(json.contains(r#""turbidity":"2.10""#));
        assert!(json.contains(r#""pH":"7.40""#));
        assert!(json.contains(r#""tds":"250.00""#));

        // Round-trips through the strict decoder
        let decoded = Snapshot::from_json(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_report_classification() {
        let snapshot = Snapshot {
            turbidity: 6.0,
            ph: 9.0,
            tds: 350.0,
            timestamp: "T1".to_string(),
        };
        let report = WaterReport::from_snapshot(&snapshot);
        assert_eq!(report.turbidity.band, Band::Critical);
        assert_eq!(report.ph.band, Band::Critical);
        assert_eq!(report.tds.band, Band::Warning);
        assert_eq!(report.timestamp, "T1");
    }
}
