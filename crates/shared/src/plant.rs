use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use time::Date;

use crate::date::{self, add_days};

/// A plant as handed over by the storage backend, reduced to what the app
/// reads and writes.
///
/// Only `plant_id`, `watering_frequency`, `last_watered` and
/// `next_watering_date` drive scheduling. The rest, including fields not
/// listed here, is carried through untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub plant_id: String,
    #[serde(default)]
    pub nickname: String,
    /// Days between waterings; `None` or `Some(0)` means no schedule.
    #[serde(default, deserialize_with = "lenient_frequency")]
    pub watering_frequency: Option<u32>,
    #[serde(default, with = "date::optional_date")]
    pub last_watered: Option<Date>,
    #[serde(default, with = "date::optional_date")]
    pub next_watering_date: Option<Date>,
    /// Past waterings, most recent last.
    #[serde(default, with = "date::date_list")]
    pub watering_history: Vec<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// Backend fields this crate does not model, written back as read.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFrequency {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_frequency<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let frequency = match Option::<RawFrequency>::deserialize(deserializer)? {
        None => None,
        Some(RawFrequency::Integer(days)) => u32::try_from(days).ok(),
        Some(RawFrequency::Float(days)) if days.fract() == 0.0 && days >= 0.0 => {
            u32::try_from(days as i64).ok()
        }
        Some(RawFrequency::Text(days)) => days.trim().parse::<u32>().ok(),
        Some(_) => None,
    };

    Ok(frequency)
}

impl Plant {
    pub fn new(plant_id: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            plant_id: plant_id.into(),
            nickname: nickname.into(),
            ..Default::default()
        }
    }

    /// Frequency in days, with zero normalized away.
    pub fn frequency(&self) -> Option<u32> {
        self.watering_frequency.filter(|days| *days > 0)
    }

    pub fn has_schedule(&self) -> bool {
        self.frequency().is_some() && self.last_watered.is_some()
    }

    /// Date the walk of future waterings starts from.
    pub fn anchor(&self) -> Option<Date> {
        if !self.has_schedule() {
            return None;
        }

        self.next_watering_date.or(self.last_watered)
    }

    /// Next date this plant needs water: the stored next watering date, or
    /// one interval after the last watering.
    pub fn next_due(&self) -> Option<Date> {
        let frequency = self.frequency()?;
        let last_watered = self.last_watered?;

        match self.next_watering_date {
            Some(next) => Some(next),
            None => add_days(last_watered, i64::from(frequency)),
        }
    }

    /// Marks the plant as watered on `date`.
    ///
    /// The date joins the history in order. The schedule only moves when
    /// `date` is not earlier than the last watering; a back-dated entry is
    /// history only. Returns whether the schedule moved.
    pub fn record_watering(&mut self, date: Date) -> bool {
        let position = self.watering_history.partition_point(|past| *past <= date);
        self.watering_history.insert(position, date);

        let advances = self.last_watered.is_none_or(|last| date >= last);
        if advances {
            self.last_watered = Some(date);
            self.next_watering_date = self
                .frequency()
                .and_then(|frequency| add_days(date, i64::from(frequency)));
        }

        tracing::debug!(
            plant_id = %self.plant_id,
            watered = %date::DateKey::from(date),
            advances,
            "recorded watering"
        );

        advances
    }

    /// Changes the interval and re-derives the next watering from the last
    /// one, so future projections restart from the new anchor.
    pub fn set_watering_frequency(&mut self, frequency: Option<u32>) {
        self.watering_frequency = frequency;
        self.next_watering_date = match (self.frequency(), self.last_watered) {
            (Some(frequency), Some(last_watered)) => add_days(last_watered, i64::from(frequency)),
            _ => None,
        };
    }
}
