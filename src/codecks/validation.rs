//! Card field rules derived from server metadata.
//!
//! Each check takes the metadata snapshot current at call time, so the rules
//! follow whatever the session holds rather than what existed at startup.

use serde_json::Number;

use super::entities::Metadata;
use super::error::{CodecksError, CodecksResult};

pub const DEFAULT_LIST_LIMIT: u32 = 20;
pub const MAX_LIST_LIMIT: u32 = 100;

fn effort_scale(metadata: Option<&Metadata>) -> Option<&[Number]> {
    metadata
        .and_then(|m| m.effort_scale.as_deref())
        .filter(|scale| !scale.is_empty())
}

/// Effort must be on the account's scale when one exists, otherwise any
/// non-negative number.
///
/// Values are compared numerically (`2` matches a scale entry of `2.0`), but
/// the caller's number is returned untouched so it goes out on the wire
/// exactly as it came in.
pub fn validate_effort(metadata: Option<&Metadata>, effort: Number) -> CodecksResult<Number> {
    let Some(value) = effort.as_f64().filter(|v| v.is_finite()) else {
        return Err(CodecksError::validation("effort must be a finite number"));
    };

    match effort_scale(metadata) {
        Some(scale) if !scale.iter().any(|allowed| allowed.as_f64() == Some(value)) => {
            Err(CodecksError::validation(format!(
                "effort {effort} is not allowed; must be one of: {}",
                scale
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
        Some(_) => Ok(effort),
        None if value < 0.0 => Err(CodecksError::validation("effort must be non-negative")),
        None => Ok(effort),
    }
}

/// Priority must be one of the account's label codes when labels exist,
/// otherwise any string.
pub fn validate_priority<'a>(metadata: Option<&Metadata>, priority: &'a str) -> CodecksResult<&'a str> {
    let labels = metadata
        .and_then(|m| m.priority_labels.as_ref())
        .filter(|labels| !labels.is_empty());

    match labels {
        Some(labels) if !labels.contains_key(priority) => Err(CodecksError::validation(format!(
            "priority '{priority}' is not allowed; must be one of: {}",
            labels
                .iter()
                .map(|(code, label)| format!("{code}={label}"))
                .collect::<Vec<_>>()
                .join(", ")
        ))),
        _ => Ok(priority),
    }
}

/// Page size for card listings: 1..=100, default 20.
pub fn validate_limit(limit: Option<u32>) -> CodecksResult<u32> {
    match limit {
        None => Ok(DEFAULT_LIST_LIMIT),
        Some(n) if (1..=MAX_LIST_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(CodecksError::validation(format!(
            "limit must be between 1 and {MAX_LIST_LIMIT} (got {n})"
        ))),
    }
}
