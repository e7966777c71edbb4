pub mod source;

pub use source::{source_for, JourneySource};

use crate::core::{Step, StepRecord};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Failure to obtain a journey
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {location} failed: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{location} answered with HTTP {status}")]
    Status { location: String, status: u16 },

    #[error("malformed journey document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a journey document (a JSON array of step records)
pub fn parse_records(data: &[u8]) -> Result<Vec<StepRecord>, LoadError> {
    Ok(serde_json::from_slice(data)?)
}

/// Drop records dated after `now`, keeping order
pub fn filter_past(records: Vec<StepRecord>, now: DateTime<Utc>) -> Vec<StepRecord> {
    records.into_iter().filter(|r| r.is_past(now)).collect()
}

/// Fetch, parse and filter a journey
pub async fn load_journey(
    source: &dyn JourneySource,
    now: DateTime<Utc>,
) -> Result<Arc<[Step]>, LoadError> {
    let data = source.fetch().await?;
    let records = parse_records(&data)?;
    let total = records.len();

    let steps: Arc<[Step]> = filter_past(records, now)
        .into_iter()
        .map(|r| r.step)
        .collect();

    tracing::info!(
        source = %source.describe(),
        total,
        kept = steps.len(),
        "journey loaded"
    );

    Ok(steps)
}

/// Resolve the requested start index against a journey of `len` steps.
///
/// Negative values count back from the end. The result is never below 1,
/// since step 0 is only ever the origin of the first leg. There is no
/// upper bound: journeys with fewer than two steps resolve to an index
/// with no step behind it.
pub fn resolve_start_index(len: usize, start: i64) -> usize {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let index = if start < 0 { len.saturating_add(start) } else { start };
    usize::try_from(index.max(1)).unwrap_or(usize::MAX)
}
