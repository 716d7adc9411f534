use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::ScheduleError;

/// How pressing an overdue watering is, used for color-coding.
#[derive(
    EnumString, Display, AsRefStr, Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    DueToday,
    Low,
    Medium,
    High,
}

/// Upper bounds (inclusive, in days overdue) of the low and medium bands.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UrgencyThresholds {
    #[serde(default = "default_low_max_days")]
    pub low_max_days: u32,
    #[serde(default = "default_medium_max_days")]
    pub medium_max_days: u32,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            low_max_days: default_low_max_days(),
            medium_max_days: default_medium_max_days(),
        }
    }
}

fn default_low_max_days() -> u32 {
    2
}

fn default_medium_max_days() -> u32 {
    5
}

impl UrgencyThresholds {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.low_max_days == 0 {
            return Err(ScheduleError::InvalidConfig(
                "urgency low_max_days must be at least 1".to_string(),
            ));
        }
        if self.medium_max_days <= self.low_max_days {
            return Err(ScheduleError::InvalidConfig(format!(
                "urgency medium_max_days ({}) must be greater than low_max_days ({})",
                self.medium_max_days, self.low_max_days
            )));
        }
        Ok(())
    }

    /// Classifies whole days overdue; `None` when the plant is not due yet.
    pub fn classify(&self, days_overdue: i64) -> Option<Urgency> {
        match days_overdue {
            days if days < 0 => None,
            0 => Some(Urgency::DueToday),
            days if days <= i64::from(self.low_max_days) => Some(Urgency::Low),
            days if days <= i64::from(self.medium_max_days) => Some(Urgency::Medium),
            _ => Some(Urgency::High),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_breakpoints() {
        let thresholds = UrgencyThresholds::default();
        let classified: Vec<Option<Urgency>> = [0, 1, 2, 3, 5, 6]
            .into_iter()
            .map(|days| thresholds.classify(days))
            .collect();

        assert_eq!(
            classified,
            [
                Some(Urgency::DueToday),
                Some(Urgency::Low),
                Some(Urgency::Low),
                Some(Urgency::Medium),
                Some(Urgency::Medium),
                Some(Urgency::High),
            ]
        );
    }

    #[test]
    fn test_not_due_yet() {
        assert_eq!(UrgencyThresholds::default().classify(-1), None);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = UrgencyThresholds {
            low_max_days: 1,
            medium_max_days: 10,
        };

        assert_eq!(thresholds.classify(2), Some(Urgency::Medium));
        assert_eq!(thresholds.classify(11), Some(Urgency::High));
    }

    #[test]
    fn test_validate() {
        assert!(UrgencyThresholds::default().validate().is_ok());
        assert!(
            UrgencyThresholds {
                low_max_days: 0,
                medium_max_days: 5
            }
            .validate()
            .is_err()
        );
        assert!(
            UrgencyThresholds {
                low_max_days: 3,
                medium_max_days: 3
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(Urgency::DueToday.to_string(), "due_today");
        assert_eq!(Urgency::High.as_ref(), "high");
        assert_eq!("medium".parse::<Urgency>().unwrap(), Urgency::Medium);
    }
}
