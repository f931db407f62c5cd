use chrono::{DateTime, Utc};

use crate::condition::ConditionFlags;
use crate::errors::Result;
use crate::model::{ConditionsPercentage, GraphDataPoint, GraphResponse, IsuCondition};

pub const SCORE_CONDITION_LEVEL_INFO: i64 = 2;
pub const SCORE_CONDITION_LEVEL_WARNING: i64 = 1;
pub const SCORE_CONDITION_LEVEL_CRITICAL: i64 = 3;

pub const HOUR_SECS: i64 = 3600;
pub const GRAPH_WINDOW_HOURS: i64 = 24;

/// Floors a Unix timestamp to the start of its clock hour.
///
/// Saturates at `i64::MIN` instead of overflowing; callers validate the range first.
pub fn truncate_to_hour(unix_secs: i64) -> i64 {
    unix_secs.saturating_sub(unix_secs.rem_euclid(HOUR_SECS))
}

/// Reports that share a truncated hour, scored once the run is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HourBucket {
    start_at: i64,
    data: GraphDataPoint,
    condition_timestamps: Vec<i64>,
}

/// Builds the 24 hourly graph slots starting at `window_start`.
///
/// `conditions` must be sorted by timestamp ascending. Reports are grouped
/// into runs of consecutive rows sharing a truncated hour; a later row that
/// falls into an hour whose run already closed opens a separate run.
/// Any malformed condition string fails the whole call.
pub fn generate_isu_graph(
    conditions: &[IsuCondition],
    window_start: DateTime<Utc>,
) -> Result<Vec<GraphResponse>> {
    let buckets = bucket_by_hour(conditions)?;

    let start = truncate_to_hour(window_start.timestamp());
    let end = start + GRAPH_WINDOW_HOURS * HOUR_SECS;

    let first = buckets
        .iter()
        .position(|b| b.start_at >= start)
        .unwrap_or(buckets.len());
    let last = buckets
        .iter()
        .position(|b| b.start_at >= end)
        .unwrap_or(buckets.len());
    let mut windowed = buckets[first..last.max(first)].iter().peekable();

    let mut graph = Vec::with_capacity(GRAPH_WINDOW_HOURS as usize);
    let mut this_hour = start;
    while this_hour < end {
        let entry = match windowed.next_if(|b| b.start_at == this_hour) {
            Some(bucket) => GraphResponse {
                start_at: this_hour,
                end_at: this_hour + HOUR_SECS,
                data: Some(bucket.data),
                condition_timestamps: bucket.condition_timestamps.clone(),
            },
            None => GraphResponse {
                start_at: this_hour,
                end_at: this_hour + HOUR_SECS,
                data: None,
                condition_timestamps: Vec::new(),
            },
        };
        graph.push(entry);
        this_hour += HOUR_SECS;
    }

    Ok(graph)
}

fn bucket_by_hour(conditions: &[IsuCondition]) -> Result<Vec<HourBucket>> {
    let mut buckets = Vec::new();
    for run in conditions.chunk_by(|a, b| {
        truncate_to_hour(a.timestamp.timestamp()) == truncate_to_hour(b.timestamp.timestamp())
    }) {
        let start_at = truncate_to_hour(run[0].timestamp.timestamp());
        buckets.push(HourBucket {
            start_at,
            data: calculate_graph_data_point(run)?,
            condition_timestamps: run.iter().map(|c| c.timestamp.timestamp()).collect(),
        });
    }
    Ok(buckets)
}

/// Scores one non-empty run of reports.
///
/// All percentages and the score use integer division truncating toward zero.
fn calculate_graph_data_point(conditions: &[IsuCondition]) -> Result<GraphDataPoint> {
    let mut raw_score = 0;
    let mut sitting = 0;
    let mut broken = 0;
    let mut dirty = 0;
    let mut overweight = 0;

    for condition in conditions {
        let flags = ConditionFlags::parse(&condition.condition)?;
        broken += i64::from(flags.is_broken);
        dirty += i64::from(flags.is_dirty);
        overweight += i64::from(flags.is_overweight);
        sitting += i64::from(condition.is_sitting);

        raw_score += match flags.bad_count() {
            n if n >= 3 => SCORE_CONDITION_LEVEL_CRITICAL,
            0 => SCORE_CONDITION_LEVEL_INFO,
            _ => SCORE_CONDITION_LEVEL_WARNING,
        };
    }

    let count = conditions.len() as i64;
    Ok(GraphDataPoint {
        score: raw_score * 100 / 3 / count,
        percentage: ConditionsPercentage {
            sitting: sitting * 100 / count,
            is_broken: broken * 100 / count,
            is_dirty: dirty * 100 / count,
            is_overweight: overweight * 100 / count,
        },
    })
}
