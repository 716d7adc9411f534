use plantcare_schedule::{Calendar, Fingerprint, UrgencyThresholds, Urgency, project};
use plantcare_shared::date::{add_days, days_between};
use plantcare_shared::{DateKey, Plant};
use proptest::prelude::*;
use std::sync::Arc;
use time::{Date, Month};
use time::macros::date;

const EPOCH: Date = date!(2023 - 01 - 01);

fn day(offset: i64) -> Date {
    add_days(EPOCH, offset).unwrap()
}

prop_compose! {
    fn arbitrary_plant(index: usize)
        (frequency in prop::option::of(0u32..15),
         last in prop::option::of(0i64..730),
         next_offset in prop::option::of(0i64..30),
         nickname in "[a-z]{0,8}")
        -> Plant
    {
        Plant {
            watering_frequency: frequency,
            last_watered: last.map(day),
            next_watering_date: last.zip(next_offset).map(|(last, offset)| day(last + offset)),
            ..Plant::new(format!("p{index}"), nickname)
        }
    }
}

fn arbitrary_plants() -> impl Strategy<Value = Vec<Plant>> {
    (0usize..8).prop_flat_map(|len| {
        (0..len)
            .map(arbitrary_plant)
            .collect::<Vec<_>>()
    })
}

prop_compose! {
    fn arbitrary_window()
        (start in 0i64..730, len in 0i64..120, today in 0i64..800)
        -> (Date, Date, Date)
    {
        (day(start), day(start + len), day(today))
    }
}

proptest! {
    #[test]
    fn prop_projection_is_deterministic(
        plants in arbitrary_plants(),
        (start, end, today) in arbitrary_window()
    ) {
        let copy = plants.clone();
        prop_assert_eq!(
            project(&plants, start, end, today),
            project(&copy, start, end, today)
        );
    }

    #[test]
    fn prop_occurrences_stay_in_window(
        plants in arbitrary_plants(),
        (start, end, today) in arbitrary_window()
    ) {
        for (key, watering_day) in project(&plants, start, end, today) {
            prop_assert!(watering_day.date >= start && watering_day.date <= end);
            prop_assert_eq!(key, DateKey::from(watering_day.date));
            prop_assert!(!watering_day.plants.is_empty());
        }
    }

    #[test]
    fn prop_occurrences_keep_phase(
        frequency in 1u32..20,
        anchor in 0i64..400,
        (start, end, today) in arbitrary_window()
    ) {
        let plant = Plant {
            watering_frequency: Some(frequency),
            last_watered: Some(day(anchor)),
            ..Plant::new("p", "p")
        };

        let schedule = project(std::slice::from_ref(&plant), start, end, today);
        let mut previous: Option<Date> = None;
        for watering_day in schedule.values() {
            let since_anchor = days_between(day(anchor), watering_day.date);
            prop_assert!(since_anchor >= 0);
            prop_assert_eq!(since_anchor % i64::from(frequency), 0);
            if let Some(previous) = previous {
                prop_assert_eq!(days_between(previous, watering_day.date), i64::from(frequency));
            }
            previous = Some(watering_day.date);
        }

        // Nothing in phase inside the window is missed.
        let expected = (0..=days_between(start, end))
            .map(|offset| add_days(start, offset).unwrap())
            .filter(|date| {
                let since = days_between(day(anchor), *date);
                since >= 0 && since % i64::from(frequency) == 0
            })
            .count();
        prop_assert_eq!(schedule.len(), expected);
    }

    #[test]
    fn prop_unschedulable_plants_never_appear(
        plants in arbitrary_plants(),
        (start, end, today) in arbitrary_window()
    ) {
        let schedule = project(&plants, start, end, today);
        for plant in plants.iter().filter(|plant| !plant.has_schedule()) {
            prop_assert!(
                schedule
                    .values()
                    .flat_map(|watering_day| &watering_day.plants)
                    .all(|scheduled| scheduled.plant_id != plant.plant_id)
            );
        }
    }

    #[test]
    fn prop_late_means_before_today(
        plants in arbitrary_plants(),
        (start, end, today) in arbitrary_window()
    ) {
        for watering_day in project(&plants, start, end, today).values() {
            for scheduled in &watering_day.plants {
                prop_assert_eq!(scheduled.is_late, watering_day.date < today);
            }
        }
    }

    #[test]
    fn prop_nickname_does_not_change_fingerprint(
        plants in arbitrary_plants(),
        nickname in "[A-Z][a-z]{1,10}",
        year in 2023i32..2026,
        month in 1u8..=12,
        today in 0i64..800
    ) {
        let month = Month::try_from(month).unwrap();
        let mut renamed = plants.clone();
        for plant in &mut renamed {
            plant.nickname = nickname.clone();
            plant.notes = format!("repotted by {nickname}");
        }
        prop_assert_eq!(Fingerprint::of(&plants), Fingerprint::of(&renamed));

        let calendar = Calendar::default();
        let first = calendar.month(&plants, year, month, day(today)).unwrap();
        let second = calendar.month(&renamed, year, month, day(today)).unwrap();
        prop_assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn prop_urgency_is_monotonic(a in 0i64..60, b in 0i64..60) {
        let thresholds = UrgencyThresholds::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let classify = |days| thresholds.classify(days).unwrap_or(Urgency::DueToday);

        prop_assert!(classify(low) <= classify(high));
    }
}
