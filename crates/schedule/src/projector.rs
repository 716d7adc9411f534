use std::collections::BTreeMap;

use plantcare_shared::date::{self, add_days, days_between};
use plantcare_shared::{DateKey, Plant};
use serde::Serialize;
use time::{Date, Month};

use crate::grid::month_window;

/// Projected watering days keyed by canonical date key, in calendar order.
pub type WateringSchedule = BTreeMap<DateKey, WateringDay>;

/// One plant due on a projected day.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPlant {
    pub plant_id: String,
    pub nickname: String,
    /// The occurrence falls strictly before today.
    pub is_late: bool,
    /// The occurrence is the plant's current next watering.
    pub is_next_watering: bool,
}

/// A calendar day with at least one plant due.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct WateringDay {
    #[serde(with = "date::as_key")]
    pub date: Date,
    /// Plants in input order.
    pub plants: Vec<ScheduledPlant>,
}

impl WateringDay {
    fn new(date: Date) -> Self {
        Self {
            date,
            plants: Vec::new(),
        }
    }

    pub fn has_late(&self) -> bool {
        self.plants.iter().any(|plant| plant.is_late)
    }
}

/// Watering dates of a single plant within an inclusive window.
///
/// The walk keeps the phase of the plant's anchor: every yielded date is a
/// whole number of intervals away from it.
#[derive(Debug, Clone)]
pub struct Occurrences {
    next: Option<Date>,
    step: i64,
    end: Date,
}

impl Iterator for Occurrences {
    type Item = Date;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|date| *date <= self.end)?;
        self.next = add_days(current, self.step);

        Some(current)
    }
}

pub fn occurrences(plant: &Plant, start: Date, end: Date) -> Occurrences {
    let empty = Occurrences {
        next: None,
        step: 1,
        end,
    };

    let (Some(anchor), Some(frequency)) = (plant.anchor(), plant.frequency()) else {
        return empty;
    };

    if start > end {
        return empty;
    }

    let step = i64::from(frequency);
    let first = if anchor < start {
        // Jump to the first occurrence on or after `start` in whole steps.
        let behind = days_between(anchor, start);
        let steps = (behind + step - 1) / step;
        add_days(anchor, steps * step)
    } else {
        Some(anchor)
    };

    Occurrences {
        next: first,
        step,
        end,
    }
}

/// Projects the watering days of `plants` over the inclusive `[start, end]`
/// window.
///
/// Plants without a frequency or a last watering are skipped. An inverted
/// window yields an empty schedule. Plants due the same day keep their input
/// order.
pub fn project(plants: &[Plant], start: Date, end: Date, today: Date) -> WateringSchedule {
    let mut schedule = WateringSchedule::new();
    let start = start.max(date::FIRST_KEY_DATE);

    if start > end {
        tracing::debug!(
            start = %DateKey::from(start),
            end = %DateKey::from(end),
            "empty window, nothing to project"
        );
        return schedule;
    }

    let mut skipped = 0usize;

    for plant in plants {
        if !plant.has_schedule() {
            skipped += 1;
            continue;
        }

        let next_due = plant.next_due();

        for occurrence in occurrences(plant, start, end) {
            schedule
                .entry(DateKey::from(occurrence))
                .or_insert_with(|| WateringDay::new(occurrence))
                .plants
                .push(ScheduledPlant {
                    plant_id: plant.plant_id.clone(),
                    nickname: plant.nickname.clone(),
                    is_late: occurrence < today,
                    is_next_watering: next_due == Some(occurrence),
                });
        }
    }

    tracing::debug!(
        plants = plants.len(),
        skipped,
        days = schedule.len(),
        "projected watering schedule"
    );

    schedule
}

/// Same as [`project`] with the window given as date strings.
///
/// Anything that is not a date gives an empty schedule.
pub fn project_keys(plants: &[Plant], start: &str, end: &str, today: Date) -> WateringSchedule {
    match (date::parse_date(start), date::parse_date(end)) {
        (Some(start), Some(end)) => project(plants, start, end, today),
        _ => {
            tracing::debug!(start, end, "window is not a date range");
            WateringSchedule::new()
        }
    }
}

/// Projects every day of a calendar month.
pub fn project_month(plants: &[Plant], year: i32, month: Month, today: Date) -> WateringSchedule {
    match month_window(year, month) {
        Ok((start, end)) => project(plants, start, end, today),
        Err(err) => {
            tracing::debug!(year, month = %month, err = %err, "month outside supported range");
            WateringSchedule::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn plant(id: &str, frequency: u32, last_watered: Date) -> Plant {
        Plant {
            watering_frequency: Some(frequency),
            last_watered: Some(last_watered),
            ..Plant::new(id, format!("plant {id}"))
        }
    }

    fn keys(schedule: &WateringSchedule) -> Vec<&str> {
        schedule.keys().map(DateKey::as_str).collect()
    }

    #[test]
    fn test_projects_from_last_watered() {
        let plants = [plant("p1", 3, date!(2024 - 01 - 01))];
        let schedule = project(
            &plants,
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 10),
            date!(2024 - 01 - 01),
        );

        assert_eq!(
            keys(&schedule),
            ["2024-01-01", "2024-01-04", "2024-01-07", "2024-01-10"]
        );
        for day in schedule.values() {
            assert_eq!(day.plants.len(), 1);
            assert_eq!(day.plants[0].plant_id, "p1");
        }
    }

    #[test]
    fn test_anchor_before_window_keeps_phase() {
        let plants = [plant("p1", 7, date!(2023 - 12 - 28))];
        let schedule = project(
            &plants,
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 31),
            date!(2024 - 01 - 01),
        );

        assert_eq!(
            keys(&schedule),
            ["2024-01-04", "2024-01-11", "2024-01-18", "2024-01-25"]
        );
    }

    #[test]
    fn test_next_watering_date_is_the_anchor() {
        let mut p1 = plant("p1", 5, date!(2024 - 01 - 01));
        p1.next_watering_date = Some(date!(2024 - 01 - 08));

        let schedule = project(
            &[p1],
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 20),
            date!(2024 - 01 - 01),
        );

        assert_eq!(keys(&schedule), ["2024-01-08", "2024-01-13", "2024-01-18"]);
        assert!(schedule["2024-01-08"].plants[0].is_next_watering);
        assert!(!schedule["2024-01-13"].plants[0].is_next_watering);
    }

    #[test]
    fn test_next_watering_flag_uses_derived_date() {
        let plants = [plant("p1", 3, date!(2024 - 01 - 01))];
        let schedule = project(
            &plants,
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 07),
            date!(2024 - 01 - 01),
        );

        assert!(!schedule["2024-01-01"].plants[0].is_next_watering);
        assert!(schedule["2024-01-04"].plants[0].is_next_watering);
        assert!(!schedule["2024-01-07"].plants[0].is_next_watering);
    }

    #[test]
    fn test_same_day_keeps_input_order() {
        let plants = [
            plant("p1", 5, date!(2024 - 01 - 31)),
            plant("p2", 1, date!(2024 - 02 - 05)),
        ];
        let schedule = project(
            &plants,
            date!(2024 - 02 - 05),
            date!(2024 - 02 - 05),
            date!(2024 - 02 - 01),
        );

        let ids: Vec<&str> = schedule["2024-02-05"]
            .plants
            .iter()
            .map(|p| p.plant_id.as_str())
            .collect();
        assert_eq!(ids, ["p1", "p2"]);
    }

    #[test]
    fn test_no_schedule_plants_are_excluded() {
        let mut no_frequency = plant("zero", 0, date!(2024 - 01 - 01));
        no_frequency.next_watering_date = Some(date!(2024 - 01 - 02));
        let mut never_watered = plant("never", 2, date!(2024 - 01 - 01));
        never_watered.last_watered = None;
        never_watered.next_watering_date = Some(date!(2024 - 01 - 02));
        let unset = Plant::new("unset", "unset");

        let schedule = project(
            &[no_frequency, never_watered, unset],
            date!(2024 - 01 - 01),
            date!(2024 - 12 - 31),
            date!(2024 - 01 - 01),
        );

        assert!(schedule.is_empty());
    }

    #[test]
    fn test_late_flag_is_day_granular() {
        let plants = [plant("p1", 1, date!(2024 - 03 - 01))];
        let schedule = project(
            &plants,
            date!(2024 - 03 - 01),
            date!(2024 - 03 - 03),
            date!(2024 - 03 - 02),
        );

        assert!(schedule["2024-03-01"].plants[0].is_late);
        assert!(schedule["2024-03-01"].has_late());
        assert!(!schedule["2024-03-02"].plants[0].is_late);
        assert!(!schedule["2024-03-03"].plants[0].is_late);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let plants = [plant("p1", 1, date!(2024 - 01 - 01))];
        let schedule = project(
            &plants,
            date!(2024 - 01 - 10),
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 01),
        );

        assert!(schedule.is_empty());
    }

    #[test]
    fn test_days_before_year_zero_are_not_projected() {
        let last_watered = Date::from_calendar_date(-1, Month::December, 30).unwrap();
        let plants = [plant("p1", 1, last_watered)];
        let schedule = project(
            &plants,
            last_watered,
            date!(0000 - 01 - 02),
            date!(0000 - 01 - 01),
        );

        assert_eq!(keys(&schedule), ["0000-01-01", "0000-01-02"]);
    }

    #[test]
    fn test_future_last_watered_projects_forward() {
        let plants = [plant("p1", 10, date!(2030 - 01 - 01))];
        let schedule = project(
            &plants,
            date!(2029 - 12 - 01),
            date!(2030 - 01 - 31),
            date!(2024 - 01 - 01),
        );

        assert_eq!(
            keys(&schedule),
            ["2030-01-01", "2030-01-11", "2030-01-21", "2030-01-31"]
        );
    }

    #[test]
    fn test_leap_day_is_a_bucket() {
        let plants = [plant("p1", 2, date!(2024 - 02 - 27))];
        let schedule = project_month(&plants, 2024, Month::February, date!(2024 - 02 - 01));

        assert!(schedule.contains_key("2024-02-29"));
        assert_eq!(schedule.keys().last().map(DateKey::as_str), Some("2024-02-29"));
    }

    #[test]
    fn test_walk_stops_at_end_of_calendar() {
        let plants = [plant("p1", 3, Date::MAX.previous_day().unwrap())];
        let schedule = project(&plants, Date::MIN, Date::MAX, Date::MIN);

        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn test_project_keys_rejects_non_dates() {
        let plants = [plant("p1", 1, date!(2024 - 01 - 01))];
        let today = date!(2024 - 01 - 01);

        assert!(project_keys(&plants, "2024-01-01", "next week", today).is_empty());
        assert!(project_keys(&plants, "", "2024-01-03", today).is_empty());
        assert_eq!(
            project_keys(&plants, "2024-01-01", "2024-01-03", today).len(),
            3
        );
    }

    #[test]
    fn test_watering_day_serializes_date_key() {
        let plants = [plant("p1", 1, date!(2024 - 01 - 01))];
        let schedule = project(
            &plants,
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 02),
        );

        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["2024-01-01"]["date"], "2024-01-01");
        assert_eq!(json["2024-01-01"]["plants"][0]["isLate"], true);
    }
}
