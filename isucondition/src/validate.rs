use chrono::{DateTime, Utc};

use crate::condition::is_valid_condition_format;
use crate::errors::{Error, Result};
use crate::model::{IsuCondition, PostIsuConditionRequest};

/// Validates one posted condition and converts it into a storable row
pub fn validate(jia_isu_uuid: &str, request: PostIsuConditionRequest) -> Result<IsuCondition> {
    if !is_valid_condition_format(&request.condition) {
        return Err(Error::Validation(format!(
            "Condition {:?} is not in is_broken/is_dirty/is_overweight format",
            request.condition
        )));
    }

    let timestamp = DateTime::<Utc>::from_timestamp(request.timestamp, 0).ok_or_else(|| {
        Error::Validation(format!("Timestamp {} out of range", request.timestamp))
    })?;

    Ok(IsuCondition {
        jia_isu_uuid: jia_isu_uuid.to_string(),
        timestamp,
        is_sitting: request.is_sitting,
        condition: request.condition,
        message: request.message,
    })
}

/// Validates a whole posted batch, rejecting it if any row is invalid
pub fn validate_batch(
    jia_isu_uuid: &str,
    requests: Vec<PostIsuConditionRequest>,
) -> Result<Vec<IsuCondition>> {
    if requests.is_empty() {
        return Err(Error::Validation("Empty condition batch".to_string()));
    }

    requests
        .into_iter()
        .map(|request| validate(jia_isu_uuid, request))
        .collect()
}
