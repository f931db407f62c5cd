use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::ConditionLevel;

/// Registered Isu device
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Isu {
    pub id: i64,
    pub jia_isu_uuid: String,
    pub name: String,
    pub character: String,
    pub jia_user_id: String,
}

/// One condition report as stored, immutable once written
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct IsuCondition {
    pub jia_isu_uuid: String,
    pub timestamp: DateTime<Utc>,
    pub is_sitting: bool,
    pub condition: String,
    pub message: String,
}

/// Isu joined with its most recent condition, if any
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IsuWithLatestCondition {
    pub id: i64,
    pub jia_isu_uuid: String,
    pub name: String,
    pub character: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub is_sitting: Option<bool>,
    pub condition: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub isu_id: i64,
    pub character: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IsuResponse {
    pub id: i64,
    pub jia_isu_uuid: String,
    pub name: String,
    pub character: String,
}

impl From<Isu> for IsuResponse {
    fn from(isu: Isu) -> Self {
        Self {
            id: isu.id,
            jia_isu_uuid: isu.jia_isu_uuid,
            name: isu.name,
            character: isu.character,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostIsuRequest {
    pub jia_isu_uuid: String,
    pub isu_name: String,
    #[serde(default)]
    pub character: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostIsuConditionRequest {
    pub is_sitting: bool,
    pub condition: String,
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct GetMeResponse {
    pub jia_user_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GetIsuConditionResponse {
    pub jia_isu_uuid: String,
    pub isu_name: String,
    pub timestamp: i64,
    pub is_sitting: bool,
    pub condition: String,
    pub condition_level: ConditionLevel,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct GetIsuListResponse {
    pub id: i64,
    pub jia_isu_uuid: String,
    pub name: String,
    pub character: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_isu_condition: Option<GetIsuConditionResponse>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrendCondition {
    pub isu_id: i64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TrendResponse {
    pub character: String,
    pub info: Vec<TrendCondition>,
    pub warning: Vec<TrendCondition>,
    pub critical: Vec<TrendCondition>,
}

/// Per-hour share of reports, each an integer percentage 0..=100
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ConditionsPercentage {
    pub sitting: i64,
    pub is_broken: i64,
    pub is_dirty: i64,
    pub is_overweight: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GraphDataPoint {
    pub score: i64,
    pub percentage: ConditionsPercentage,
}

/// One hour slot of the condition graph
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GraphResponse {
    pub start_at: i64,
    pub end_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<GraphDataPoint>,
    pub condition_timestamps: Vec<i64>,
}
