//! Watering schedules for plant collections: projection of watering days over
//! a date window, today's task lists, and memoized month views.

pub mod aggregator;
pub mod cache;
pub mod calendar;
mod error;
pub mod grid;
pub mod projector;
pub mod urgency;

pub use aggregator::{
    Task, TaskSummary, attention_list, days_overdue, due_on, due_soon, due_today, overdue,
    summarize,
};
pub use cache::{CacheKey, CalendarCache, Fingerprint};
pub use calendar::{Calendar, CalendarMonth};
pub use error::ScheduleError;
pub use grid::{MonthGrid, WeekStart, month_window, parse_month};
pub use projector::{
    Occurrences, ScheduledPlant, WateringDay, WateringSchedule, occurrences, project,
    project_keys, project_month,
};
pub use urgency::{Urgency, UrgencyThresholds};
