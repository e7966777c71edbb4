use crate::core::geo::LatLng;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One waypoint of a journey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identifier
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,

    /// Human-readable place name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub lat: f64,
    pub lng: f64,

    /// Camera zoom forced when this step is reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

impl Step {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            label: None,
            lat,
            lng,
            zoom: None,
        }
    }

    #[cfg(test)]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[cfg(test)]
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Journey files in the wild carry both `"id": "3"` and `"id": 3`
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// A step as it appears in the journey document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    #[serde(flatten)]
    pub step: Step,

    /// When the step happened; only used to hide steps from the future
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl StepRecord {
    /// Parsed `date`, or `None` if it is missing or unreadable
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date)
    }

    /// Whether the step happened at or before `now`.
    ///
    /// Records without a readable date are never considered past.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.timestamp().is_some_and(|t| t <= now)
    }
}

/// Parse an ISO-8601 date.
///
/// Accepts full timestamps with an offset, local date-times without one,
/// and bare dates (taken as UTC midnight).
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The last non-empty label seen along the journey
pub fn current_location(steps: &[Step]) -> Option<&str> {
    steps
        .iter()
        .filter_map(|s| s.label.as_deref())
        .filter(|label| !label.is_empty())
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_record_json() {
        let json = r#"{"id":"7","label":"Lisbon","lat":38.72,"lng":-9.14,"zoom":6,"date":"2019-05-01"}"#;
        let record: StepRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.step.id, "7");
        assert_eq!(record.step.label.as_deref(), Some("Lisbon"));
        assert_eq!(record.step.zoom, Some(6.0));
        assert_eq!(record.date.as_deref(), Some("2019-05-01"));
    }

    #[test]
    fn test_step_record_optional_fields() {
        let json = r#"{"id":"1","lat":0,"lng":1}"#;
        let record: StepRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.step, Step::new("1", 0.0, 1.0));
        assert!(record.date.is_none());
    }

    #[test]
    fn test_step_record_numeric_id() {
        let record: StepRecord = serde_json::from_str(r#"{"id":42,"lat":1.5,"lng":2.5}"#).unwrap();
        assert_eq!(record.step.id, "42");
    }

    #[test]
    fn test_parse_date_formats() {
        let utc = parse_date("2020-03-04T05:06:07Z").unwrap();
        assert_eq!(utc.to_rfc3339(), "2020-03-04T05:06:07+00:00");

        let offset = parse_date("2020-03-04T05:06:07+02:00").unwrap();
        assert_eq!(offset.to_rfc3339(), "2020-03-04T03:06:07+00:00");

        let day = parse_date("2020-03-04").unwrap();
        assert_eq!(day.to_rfc3339(), "2020-03-04T00:00:00+00:00");

        assert!(parse_date("2020-03-04T05:06").is_some());
        assert!(parse_date("next tuesday").is_none());
    }

    #[test]
    fn test_is_past() {
        let now = parse_date("2021-01-01T00:00:00Z").unwrap();
        let mut record = StepRecord { step: Step::new("a", 0.0, 0.0), date: None };
        assert!(!record.is_past(now));

        record.date = Some("2020-12-31".to_string());
        assert!(record.is_past(now));

        record.date = Some("2021-01-01T00:00:00Z".to_string());
        assert!(record.is_past(now));

        record.date = Some("2021-01-01T00:00:01Z".to_string());
        assert!(!record.is_past(now));

        record.date = Some("garbage".to_string());
        assert!(!record.is_past(now));
    }

    #[test]
    fn test_current_location() {
        let steps = vec![
            Step::new("0", 0.0, 0.0).with_label("Porto"),
            Step::new("1", 0.0, 1.0),
            Step::new("2", 0.0, 2.0).with_label("Madrid"),
            Step::new("3", 0.0, 3.0).with_label(""),
        ];
        assert_eq!(current_location(&steps), Some("Madrid"));
        assert_eq!(current_location(&steps[1..2]), None);
        assert_eq!(current_location(&[]), None);
    }
}
