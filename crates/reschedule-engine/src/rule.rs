//! Modification rules: how a bulk edit changes each selected session.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::time::parse_time;

/// Direction of a time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Later,
    Earlier,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Later => 1,
            Direction::Earlier => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Later => Direction::Earlier,
            Direction::Earlier => Direction::Later,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModificationRule {
    /// Shift the time by a number of minutes; the date is kept.
    Offset { direction: Direction, minutes: u32 },
    /// Set an absolute time; the date is kept.
    Specific { time: String },
    /// Move sessions in the `from` slot to the next `to_weekday` at `to_time`.
    DayChange {
        from_weekday: Weekday,
        from_time: String,
        to_weekday: Weekday,
        to_time: String,
    },
}

impl ModificationRule {
    /// Offset expressed the way the edit dialog collects it. Totals beyond
    /// `u32::MAX` minutes saturate; use [`ModificationRule::try_offset`] to
    /// reject them instead.
    pub fn offset(direction: Direction, hours: u32, minutes: u32) -> Self {
        ModificationRule::Offset {
            direction,
            minutes: hours.saturating_mul(60).saturating_add(minutes),
        }
    }

    /// Like [`ModificationRule::offset`], but an overflowing total is an
    /// `EngineError::OffsetTooLarge` configuration error.
    pub fn try_offset(direction: Direction, hours: u32, minutes: u32) -> Result<Self> {
        let total = hours
            .checked_mul(60)
            .and_then(|h| h.checked_add(minutes))
            .ok_or(EngineError::OffsetTooLarge { hours, minutes })?;
        Ok(ModificationRule::Offset {
            direction,
            minutes: total,
        })
    }

    pub fn specific(time: impl Into<String>) -> Self {
        ModificationRule::Specific { time: time.into() }
    }

    pub fn day_change(
        from_weekday: Weekday,
        from_time: impl Into<String>,
        to_weekday: Weekday,
        to_time: impl Into<String>,
    ) -> Self {
        ModificationRule::DayChange {
            from_weekday,
            from_time: from_time.into(),
            to_weekday,
            to_time: to_time.into(),
        }
    }

    /// Whether applying this rule can move a session to another date.
    pub fn changes_date(&self) -> bool {
        matches!(self, ModificationRule::DayChange { .. })
    }

    /// Reject configurations that must not reach computation.
    ///
    /// # Errors
    /// - `EngineError::ZeroOffset` for an offset of zero minutes.
    /// - `EngineError::SameWeekday` for a day change onto the same weekday.
    /// - `EngineError::InvalidTime` for any time that is not `HH:MM`.
    pub fn validate(&self) -> Result<()> {
        match self {
            ModificationRule::Offset { minutes, .. } => {
                if *minutes == 0 {
                    return Err(EngineError::ZeroOffset);
                }
            }
            ModificationRule::Specific { time } => {
                parse_time(time)?;
            }
            ModificationRule::DayChange {
                from_weekday,
                from_time,
                to_weekday,
                to_time,
            } => {
                if from_weekday == to_weekday {
                    return Err(EngineError::SameWeekday(*from_weekday));
                }
                parse_time(from_time)?;
                parse_time(to_time)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_json_uses_mode_tag() {
        let rule: ModificationRule = serde_json::from_str(
            r#"{"mode":"day_change","from_weekday":"Mon","from_time":"16:00","to_weekday":"Fri","to_time":"13:00"}"#,
        )
        .unwrap();
        assert_eq!(
            rule,
            ModificationRule::day_change(Weekday::Mon, "16:00", Weekday::Fri, "13:00")
        );
        assert!(rule.changes_date());
    }

    #[test]
    fn offset_combines_hours_and_minutes() {
        assert_eq!(
            ModificationRule::offset(Direction::Earlier, 1, 30),
            ModificationRule::Offset {
                direction: Direction::Earlier,
                minutes: 90
            }
        );
    }

    #[test]
    fn offset_beyond_u32_saturates_or_is_rejected() {
        assert_eq!(
            ModificationRule::offset(Direction::Later, u32::MAX, 59),
            ModificationRule::Offset {
                direction: Direction::Later,
                minutes: u32::MAX
            }
        );

        let err = ModificationRule::try_offset(Direction::Later, u32::MAX / 60 + 1, 0).unwrap_err();
        assert!(matches!(err, EngineError::OffsetTooLarge { .. }));
        assert!(err.is_configuration());

        assert_eq!(
            ModificationRule::try_offset(Direction::Earlier, 2, 15).unwrap(),
            ModificationRule::offset(Direction::Earlier, 2, 15)
        );
    }

    #[test]
    fn validation_errors_are_configuration_errors() {
        let zero = ModificationRule::offset(Direction::Later, 0, 0).validate().unwrap_err();
        assert!(matches!(zero, EngineError::ZeroOffset));
        assert!(zero.is_configuration());

        let same = ModificationRule::day_change(Weekday::Tue, "10:00", Weekday::Tue, "11:00")
            .validate()
            .unwrap_err();
        assert!(matches!(same, EngineError::SameWeekday(Weekday::Tue)));

        let bad_time = ModificationRule::specific("25:00").validate().unwrap_err();
        assert!(matches!(bad_time, EngineError::InvalidTime(_)));
    }
}
