use std::cmp::Reverse;

use plantcare_shared::date::{add_days, days_between};
use plantcare_shared::{DateKey, Plant};
use serde::Serialize;
use time::Date;

use crate::projector::{ScheduledPlant, WateringSchedule};
use crate::urgency::{Urgency, UrgencyThresholds};

/// A plant that needs attention, with how late it is.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Task<'a> {
    pub plant: &'a Plant,
    #[serde(with = "plantcare_shared::date::as_key")]
    pub due: Date,
    /// Negative when the watering is still ahead.
    pub days_overdue: i64,
    pub urgency: Option<Urgency>,
}

/// Home-screen view of what needs water.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskSummary<'a> {
    /// Most overdue first.
    pub overdue: Vec<Task<'a>>,
    pub due_today: Vec<Task<'a>>,
    pub due_soon: Vec<Task<'a>>,
}

impl TaskSummary<'_> {
    pub fn needs_attention(&self) -> bool {
        !self.overdue.is_empty() || !self.due_today.is_empty()
    }
}

/// Whole days `plant` is past its next due date; `None` without a schedule.
pub fn days_overdue(plant: &Plant, today: Date) -> Option<i64> {
    plant.next_due().map(|due| days_between(due, today))
}

fn task<'a>(plant: &'a Plant, today: Date, thresholds: &UrgencyThresholds) -> Option<Task<'a>> {
    let due = plant.next_due()?;
    let days_overdue = days_between(due, today);

    Some(Task {
        plant,
        due,
        days_overdue,
        urgency: thresholds.classify(days_overdue),
    })
}

fn tasks<'a>(plants: &'a [Plant], today: Date, thresholds: &UrgencyThresholds) -> Vec<Task<'a>> {
    plants
        .iter()
        .filter_map(|plant| task(plant, today, thresholds))
        .collect()
}

fn overdue_tasks<'a>(
    plants: &'a [Plant],
    today: Date,
    thresholds: &UrgencyThresholds,
) -> Vec<Task<'a>> {
    let mut overdue: Vec<Task<'a>> = tasks(plants, today, thresholds)
        .into_iter()
        .filter(|task| task.days_overdue > 0)
        .collect();

    // Stable: equally late plants keep input order.
    overdue.sort_by_key(|task| Reverse(task.days_overdue));
    overdue
}

/// Plants whose next watering is before today, most overdue first.
pub fn overdue(plants: &[Plant], today: Date) -> Vec<&Plant> {
    overdue_tasks(plants, today, &UrgencyThresholds::default())
        .into_iter()
        .map(|task| task.plant)
        .collect()
}

/// Plants whose next watering is today, in input order.
pub fn due_today(plants: &[Plant], today: Date) -> Vec<&Plant> {
    plants
        .iter()
        .filter(|plant| plant.next_due() == Some(today))
        .collect()
}

/// Plants due after today and at most `window_days` from now, in input order.
pub fn due_soon(plants: &[Plant], today: Date, window_days: u32) -> Vec<&Plant> {
    let Some(horizon) = add_days(today, i64::from(window_days)) else {
        return Vec::new();
    };

    plants
        .iter()
        .filter(|plant| {
            plant
                .next_due()
                .is_some_and(|due| due > today && due <= horizon)
        })
        .collect()
}

/// Overdue plants (most overdue first) followed by plants due today.
pub fn attention_list<'a>(
    plants: &'a [Plant],
    today: Date,
    thresholds: &UrgencyThresholds,
) -> Vec<Task<'a>> {
    let mut list = overdue_tasks(plants, today, thresholds);
    list.extend(
        tasks(plants, today, thresholds)
            .into_iter()
            .filter(|task| task.days_overdue == 0),
    );
    list
}

pub fn summarize<'a>(
    plants: &'a [Plant],
    today: Date,
    window_days: u32,
    thresholds: &UrgencyThresholds,
) -> TaskSummary<'a> {
    let all = tasks(plants, today, thresholds);
    let soon_limit = -i64::from(window_days);

    let summary = TaskSummary {
        overdue: overdue_tasks(plants, today, thresholds),
        due_today: all
            .iter()
            .filter(|task| task.days_overdue == 0)
            .cloned()
            .collect(),
        due_soon: all
            .into_iter()
            .filter(|task| task.days_overdue < 0 && task.days_overdue >= soon_limit)
            .collect(),
    };

    tracing::debug!(
        overdue = summary.overdue.len(),
        due_today = summary.due_today.len(),
        due_soon = summary.due_soon.len(),
        "summarized watering tasks"
    );

    summary
}

/// Plants scheduled on `day` in a projected schedule.
pub fn due_on(schedule: &WateringSchedule, day: Date) -> &[ScheduledPlant] {
    schedule
        .get(DateKey::from(day).as_str())
        .map(|watering_day| watering_day.plants.as_slice())
        .unwrap_or_default()
}
