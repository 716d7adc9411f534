use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid month: {0}")]
    InvalidMonth(u8),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<time::error::ComponentRange> for ScheduleError {
    fn from(err: time::error::ComponentRange) -> Self {
        ScheduleError::DateOutOfRange(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month};

    #[test]
    fn test_component_range_becomes_date_out_of_range() {
        let err: ScheduleError = Date::from_calendar_date(2024, Month::February, 30)
            .unwrap_err()
            .into();

        assert!(matches!(err, ScheduleError::DateOutOfRange(_)));
    }
}
