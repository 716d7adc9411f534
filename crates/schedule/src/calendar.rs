use std::sync::{Arc, Mutex, PoisonError};

use plantcare_shared::{DateKey, Plant};
use serde::Serialize;
use time::{Date, Month};

use crate::cache::{CacheKey, CalendarCache};
use crate::grid::{MonthGrid, WeekStart};
use crate::projector::{WateringSchedule, project};
use crate::ScheduleError;

/// Everything a month view renders.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub grid: MonthGrid,
    pub watering_days: WateringSchedule,
}

#[derive(Default)]
struct Session {
    user_id: Option<String>,
    today: Option<Date>,
}

/// Month views for the signed-in user, memoized per plant set and day.
///
/// Owns its cache. Switching users or moving to a new day empties it; a month
/// still being computed for the previous day lands under that day's key and
/// is never served afterwards.
pub struct Calendar {
    cache: CalendarCache<CalendarMonth>,
    week_start: WeekStart,
    session: Mutex<Session>,
}

impl Calendar {
    pub fn new(capacity: usize, week_start: WeekStart) -> Self {
        Self {
            cache: CalendarCache::new(capacity),
            week_start,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn cache(&self) -> &CalendarCache<CalendarMonth> {
        &self.cache
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Makes `user_id` the active user. Returns `true` when that dropped
    /// another user's months.
    pub fn switch_user(&self, user_id: &str) -> bool {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.user_id.as_deref() == Some(user_id) {
            return false;
        }

        let had_user = session.user_id.replace(user_id.to_owned()).is_some();
        session.today = None;
        self.cache.clear();

        tracing::info!(user_id, "calendar switched user");
        had_user
    }

    /// Signs the active user out and forgets their months.
    pub fn sign_out(&self) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        *session = Session::default();
        self.cache.clear();
    }

    fn roll_day(&self, today: Date) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.today.is_some_and(|day| day != today) {
            tracing::debug!(today = %DateKey::from(today), "day changed, dropping late flags");
            self.cache.clear();
        }
        session.today = Some(today);
    }

    pub fn month(
        &self,
        plants: &[Plant],
        year: i32,
        month: Month,
        today: Date,
    ) -> Result<Arc<CalendarMonth>, ScheduleError> {
        self.roll_day(today);

        let key = CacheKey::new(year, month, today, plants);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let grid = MonthGrid::new(year, month, self.week_start)?;

        Ok(self.cache.get_or_compute(key, || {
            let (start, end) = grid.window();
            let watering_days = project(plants, start, end, today);

            CalendarMonth {
                grid,
                watering_days,
            }
        }))
    }

    /// Drops one month for every plant set.
    pub fn invalidate_month(&self, year: i32, month: Month) -> usize {
        self.cache
            .invalidate(|key| key.year == year && key.month == month)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(crate::cache::DEFAULT_CAPACITY, WeekStart::default())
    }
}
