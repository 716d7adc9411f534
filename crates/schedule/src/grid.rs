use plantcare_shared::date;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use time::{Date, Month};

use crate::ScheduleError;

#[derive(
    EnumString,
    Display,
    AsRefStr,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    fn offset(self, date: Date) -> usize {
        let offset = match self {
            WeekStart::Monday => date.weekday().number_days_from_monday(),
            WeekStart::Sunday => date.weekday().number_days_from_sunday(),
        };
        usize::from(offset)
    }
}

pub fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::February if time::util::is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

/// First and last day of a calendar month.
pub fn month_window(year: i32, month: Month) -> Result<(Date, Date), ScheduleError> {
    let first = Date::from_calendar_date(year, month, 1)?;
    let last = first.replace_day(days_in_month(year, month))?;

    Ok((first, last))
}

pub fn parse_month(month: u8) -> Result<Month, ScheduleError> {
    Month::try_from(month).map_err(|_| ScheduleError::InvalidMonth(month))
}

/// A month laid out as calendar rows of seven cells.
///
/// Cells outside the month are `None`.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    pub week_start: WeekStart,
    #[serde(serialize_with = "serialize_weeks")]
    pub weeks: Vec<[Option<Date>; 7]>,
    #[serde(skip)]
    window: (Date, Date),
}

impl MonthGrid {
    pub fn new(year: i32, month: Month, week_start: WeekStart) -> Result<Self, ScheduleError> {
        let (first, last) = month_window(year, month)?;

        let mut cells: Vec<Option<Date>> = vec![None; week_start.offset(first)];
        let mut day = Some(first);
        while let Some(current) = day.filter(|current| *current <= last) {
            cells.push(Some(current));
            day = current.next_day();
        }
        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        let weeks = cells
            .chunks(7)
            .map(|week| {
                let mut row = [None; 7];
                row.copy_from_slice(week);
                row
            })
            .collect();

        Ok(Self {
            year,
            month,
            week_start,
            weeks,
            window: (first, last),
        })
    }

    pub fn window(&self) -> (Date, Date) {
        self.window
    }

    pub fn days(&self) -> impl Iterator<Item = Date> + '_ {
        self.weeks.iter().flatten().flatten().copied()
    }
}

fn serialize_month<S: serde::Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*month))
}

fn serialize_weeks<S: serde::Serializer>(
    weeks: &[[Option<Date>; 7]],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let keys: Vec<Vec<Option<String>>> = weeks
        .iter()
        .map(|week| {
            week.iter()
                .map(|day| day.map(|day| date::DateKey::from(day).to_string()))
                .collect()
        })
        .collect();

    serde::Serialize::serialize(&keys, serializer)
}
