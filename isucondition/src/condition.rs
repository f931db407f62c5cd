use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keys of the condition string, in the only order accepted on the wire.
pub const CONDITION_KEYS: [&str; 3] = ["is_broken", "is_dirty", "is_overweight"];

/// Severity tag attached to a single condition row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionLevel {
    Info,
    Warning,
    Critical,
}

impl ConditionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionLevel::Info => "info",
            ConditionLevel::Warning => "warning",
            ConditionLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for ConditionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "info" => Ok(ConditionLevel::Info),
            "warning" => Ok(ConditionLevel::Warning),
            "critical" => Ok(ConditionLevel::Critical),
            other => Err(Error::Validation(format!("unknown condition level: {}", other))),
        }
    }
}

/// Classifies a raw condition string by counting `=true` occurrences.
///
/// The count is taken over the raw text without parsing the keys, so a
/// string carrying more than three `=true` fragments is reported as
/// [`Error::UnexpectedCount`].
pub fn calculate_condition_level(condition: &str) -> Result<ConditionLevel> {
    match condition.matches("=true").count() {
        0 => Ok(ConditionLevel::Info),
        1 | 2 => Ok(ConditionLevel::Warning),
        3 => Ok(ConditionLevel::Critical),
        n => Err(Error::UnexpectedCount(n)),
    }
}

/// Parsed form of `is_broken=<bool>,is_dirty=<bool>,is_overweight=<bool>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionFlags {
    pub is_broken: bool,
    pub is_dirty: bool,
    pub is_overweight: bool,
}

impl ConditionFlags {
    /// Strict parse: exactly three pairs, fixed key order, literal `true`/`false`.
    pub fn parse(condition: &str) -> Result<Self> {
        let invalid = || Error::InvalidConditionFormat(condition.to_string());

        let mut values = [false; 3];
        let mut pairs = condition.split(',');
        for (slot, key) in values.iter_mut().zip(CONDITION_KEYS) {
            let pair = pairs.next().ok_or_else(invalid)?;
            let (name, value) = pair.split_once('=').ok_or_else(invalid)?;
            if name != key {
                return Err(invalid());
            }
            *slot = match value {
                "true" => true,
                "false" => false,
                _ => return Err(invalid()),
            };
        }
        if pairs.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            is_broken: values[0],
            is_dirty: values[1],
            is_overweight: values[2],
        })
    }

    pub fn bad_count(&self) -> usize {
        [self.is_broken, self.is_dirty, self.is_overweight]
            .iter()
            .filter(|flag| **flag)
            .count()
    }
}

pub fn is_valid_condition_format(condition: &str) -> bool {
    ConditionFlags::parse(condition).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        let cases = [
            ("is_broken=false,is_dirty=false,is_overweight=false", ConditionLevel::Info),
            ("is_broken=true,is_dirty=false,is_overweight=false", ConditionLevel::Warning),
            ("is_broken=false,is_dirty=true,is_overweight=true", ConditionLevel::Warning),
            ("is_broken=true,is_dirty=true,is_overweight=true", ConditionLevel::Critical),
        ];
        for (condition, expected) in cases {
            assert_eq!(calculate_condition_level(condition).unwrap(), expected, "{}", condition);
        }
    }

    #[test]
    fn test_level_counts_raw_substrings() {
        // Keys are not checked, only the `=true` fragments.
        assert_eq!(
            calculate_condition_level("a=true,b=true").unwrap(),
            ConditionLevel::Warning
        );
        assert_eq!(calculate_condition_level("").unwrap(), ConditionLevel::Info);
    }

    #[test]
    fn test_level_unexpected_count() {
        let err = calculate_condition_level("a=true,b=true,c=true,d=true").unwrap_err();
        assert!(matches!(err, Error::UnexpectedCount(4)));
    }

    #[test]
    fn test_level_round_trips_through_str() {
        for level in [ConditionLevel::Info, ConditionLevel::Warning, ConditionLevel::Critical] {
            assert_eq!(level.as_str().parse::<ConditionLevel>().unwrap(), level);
        }
        assert!("fatal".parse::<ConditionLevel>().is_err());
    }

    #[test]
    fn test_parse_flags() {
        let flags =
            ConditionFlags::parse("is_broken=true,is_dirty=false,is_overweight=true").unwrap();
        assert!(flags.is_broken);
        assert!(!flags.is_dirty);
        assert!(flags.is_overweight);
        assert_eq!(flags.bad_count(), 2);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let bad = [
            "",
            "is_dirty=false,is_broken=false,is_overweight=false",
            "is_broken=yes,is_dirty=false,is_overweight=false",
            "is_broken=false,is_dirty=false",
            "is_broken=false,is_dirty=false,is_overweight=false,",
            " is_broken=false,is_dirty=false,is_overweight=false",
            "is_broken=false,is_dirty=false,is_overweight=false,is_broken=true",
            "is_broken,is_dirty=false,is_overweight=false",
            "is_broken=True,is_dirty=false,is_overweight=false",
        ];
        for condition in bad {
            assert!(
                matches!(ConditionFlags::parse(condition), Err(Error::InvalidConditionFormat(_))),
                "accepted {:?}",
                condition
            );
            assert!(!is_valid_condition_format(condition));
        }
    }
}
