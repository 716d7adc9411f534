use std::path::Path;

use anyhow::{Context, anyhow, bail};
use plantcare_shared::date::parse_date;
use plantcare_shared::{DateKey, Plant};
use serde_json::{Map, Value};
use time::Date;

use super::{load_records, resolve_today, save_plants};
use crate::config::Config;

/// Schedule fields whose stored value must parse before a watering may be
/// written over them.
const DATE_FIELDS: [&str; 2] = ["lastWatered", "nextWateringDate"];

fn is_set(record: &Map<String, Value>, field: &str) -> bool {
    match record.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(raw)) => !raw.trim().is_empty(),
        Some(_) => true,
    }
}

fn malformed_fields(record: &Map<String, Value>, plant: &Plant) -> Vec<&'static str> {
    let mut malformed = Vec::new();

    if is_set(record, "wateringFrequency") && plant.watering_frequency.is_none() {
        malformed.push("wateringFrequency");
    }
    for (field, parsed) in DATE_FIELDS
        .into_iter()
        .zip([plant.last_watered, plant.next_watering_date])
    {
        if is_set(record, field) && parsed.is_none() {
            malformed.push(field);
        }
    }
    match record.get("wateringHistory") {
        None | Some(Value::Null) => {}
        Some(Value::Array(entries)) if entries.len() == plant.watering_history.len() => {}
        Some(_) => malformed.push("wateringHistory"),
    }

    malformed
}

fn date_value(date: Date) -> Value {
    Value::String(DateKey::from(date).to_string())
}

fn insert_history(record: &mut Map<String, Value>, date: Date) {
    match record.get_mut("wateringHistory") {
        Some(Value::Array(history)) => {
            let position = history
                .iter()
                .position(|entry| {
                    entry
                        .as_str()
                        .and_then(parse_date)
                        .is_some_and(|past| past > date)
                })
                .unwrap_or(history.len());
            history.insert(position, date_value(date));
        }
        _ => {
            record.insert("wateringHistory".to_string(), Value::Array(vec![date_value(date)]));
        }
    }
}

fn set_date(record: &mut Map<String, Value>, field: &str, date: Option<Date>) {
    match date {
        Some(date) => {
            record.insert(field.to_string(), date_value(date));
        }
        None if record.contains_key(field) => {
            record.insert(field.to_string(), Value::Null);
        }
        None => {}
    }
}

/// Marks `plant_id` as watered on `date` in the stored records.
///
/// Only the values the watering changes are rewritten; everything else in the
/// record, timestamps included, stays as stored. A record whose schedule
/// fields do not parse is refused rather than rewritten.
pub fn record(records: &mut [Value], plant_id: &str, date: Date) -> anyhow::Result<Plant> {
    let stored = records
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .find(|stored| stored.get("plantId").and_then(Value::as_str) == Some(plant_id))
        .ok_or_else(|| anyhow!("plant {plant_id} not found"))?;

    let mut plant: Plant = serde_json::from_value(Value::Object(stored.clone()))
        .with_context(|| format!("plant {plant_id} is not a valid record"))?;

    let malformed = malformed_fields(stored, &plant);
    if !malformed.is_empty() {
        bail!(
            "plant {plant_id} has malformed {}, fix the record before recording a watering",
            malformed.join(", ")
        );
    }

    let (last_watered, next_watering_date) = (plant.last_watered, plant.next_watering_date);
    plant.record_watering(date);

    insert_history(stored, date);
    if plant.last_watered != last_watered {
        set_date(stored, "lastWatered", plant.last_watered);
    }
    if plant.next_watering_date != next_watering_date {
        set_date(stored, "nextWateringDate", plant.next_watering_date);
    }

    Ok(plant)
}

pub fn run(
    config: Config,
    plants_path: &Path,
    plant_id: &str,
    date: Option<String>,
) -> anyhow::Result<()> {
    let date = resolve_today(date.as_deref(), &config)?;
    let mut records = load_records(plants_path)?;

    let plant = record(&mut records, plant_id, date)?;
    let next = plant
        .next_watering_date
        .map(|next| DateKey::from(next).to_string())
        .unwrap_or_else(|| "not scheduled".to_string());
    tracing::info!(plant_id, watered = %DateKey::from(date), next = %next, "recorded watering");

    save_plants(plants_path, &records)?;
    println!("{plant_id} watered on {}, next watering {next}", DateKey::from(date));

    Ok(())
}
