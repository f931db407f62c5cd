use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::condition::{calculate_condition_level, ConditionLevel};
use crate::errors::Result;
use crate::model::{
    GetIsuConditionResponse, GetIsuListResponse, IsuCondition, IsuWithLatestCondition,
    TrendCondition, TrendResponse, TrendRow,
};

/// Annotates condition rows for the list view.
///
/// Rows whose level cannot be computed are skipped rather than failing the
/// request. The result keeps input order and holds at most `limit` rows.
pub fn annotate_conditions(
    conditions: Vec<IsuCondition>,
    levels: &HashSet<ConditionLevel>,
    limit: usize,
    isu_name: &str,
) -> Vec<GetIsuConditionResponse> {
    conditions
        .into_iter()
        .filter_map(|c| match calculate_condition_level(&c.condition) {
            Ok(level) => Some((c, level)),
            Err(e) => {
                warn!("Skipping condition at {} for {}: {}", c.timestamp, c.jia_isu_uuid, e);
                None
            }
        })
        .filter(|(_, level)| levels.contains(level))
        .take(limit)
        .map(|(c, level)| GetIsuConditionResponse {
            jia_isu_uuid: c.jia_isu_uuid,
            isu_name: isu_name.to_string(),
            timestamp: c.timestamp.timestamp(),
            is_sitting: c.is_sitting,
            condition: c.condition,
            condition_level: level,
            message: c.message,
        })
        .collect()
}

/// Builds the Isu list; an unclassifiable latest condition fails the whole list.
pub fn build_isu_list(rows: Vec<IsuWithLatestCondition>) -> Result<Vec<GetIsuListResponse>> {
    rows.into_iter()
        .map(|row| -> Result<GetIsuListResponse> {
            let latest = match (row.timestamp, row.is_sitting, row.condition, row.message) {
                (Some(timestamp), Some(is_sitting), Some(condition), Some(message)) => {
                    let condition_level = calculate_condition_level(&condition)?;
                    Some(GetIsuConditionResponse {
                        jia_isu_uuid: row.jia_isu_uuid.clone(),
                        isu_name: row.name.clone(),
                        timestamp: timestamp.timestamp(),
                        is_sitting,
                        condition,
                        condition_level,
                        message,
                    })
                }
                _ => None,
            };
            Ok(GetIsuListResponse {
                id: row.id,
                jia_isu_uuid: row.jia_isu_uuid,
                name: row.name,
                character: row.character,
                latest_isu_condition: latest,
            })
        })
        .collect()
}

/// Groups each Isu's latest condition by character and level.
///
/// Characters appear in ascending order, and every level list is sorted by
/// timestamp descending. Any unclassifiable condition fails the whole trend.
pub fn build_trend(rows: Vec<TrendRow>) -> Result<Vec<TrendResponse>> {
    let mut by_character: BTreeMap<String, TrendResponse> = BTreeMap::new();

    for row in rows {
        let trend = by_character
            .entry(row.character.clone())
            .or_insert_with(|| TrendResponse {
                character: row.character.clone(),
                ..Default::default()
            });

        let (Some(timestamp), Some(condition)) = (row.timestamp, row.condition) else {
            continue;
        };
        let entry = TrendCondition {
            isu_id: row.isu_id,
            timestamp: timestamp.timestamp(),
        };
        match calculate_condition_level(&condition)? {
            ConditionLevel::Info => trend.info.push(entry),
            ConditionLevel::Warning => trend.warning.push(entry),
            ConditionLevel::Critical => trend.critical.push(entry),
        }
    }

    Ok(by_character
        .into_values()
        .map(|mut trend| {
            for list in [&mut trend.info, &mut trend.warning, &mut trend.critical] {
                list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            }
            trend
        })
        .collect())
}
