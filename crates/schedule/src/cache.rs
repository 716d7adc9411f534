use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use plantcare_shared::Plant;
use sha3::{Digest, Sha3_224};
use time::{Date, Month};

pub const DEFAULT_CAPACITY: usize = 12;

/// Stable digest of the schedule-relevant fields of a plant collection.
///
/// Covers `plant_id`, `watering_frequency`, `last_watered` and
/// `next_watering_date` of every plant, in order. Nicknames, history and the
/// other display fields do not contribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 28]);

impl Fingerprint {
    pub fn of(plants: &[Plant]) -> Self {
        let mut hasher = Sha3_224::default();
        hasher.update((plants.len() as u64).to_le_bytes());

        for plant in plants {
            hasher.update((plant.plant_id.len() as u64).to_le_bytes());
            hasher.update(&plant.plant_id);

            match plant.watering_frequency {
                Some(days) => {
                    hasher.update([1u8]);
                    hasher.update(days.to_le_bytes());
                }
                None => hasher.update([0u8]),
            }

            update_date(&mut hasher, plant.last_watered);
            update_date(&mut hasher, plant.next_watering_date);
        }

        let mut bytes = [0u8; 28];
        bytes.copy_from_slice(&hasher.finalize()[..]);
        Self(bytes)
    }
}

fn update_date(hasher: &mut Sha3_224, date: Option<Date>) {
    match date {
        Some(date) => {
            hasher.update([1u8]);
            hasher.update(date.to_julian_day().to_le_bytes());
        }
        None => hasher.update([0u8]),
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A month of a plant collection as seen on `today`.
///
/// Late flags depend on `today`, so a month computed on one day never answers
/// for another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub year: i32,
    pub month: Month,
    pub today: Date,
    pub fingerprint: Fingerprint,
}

impl CacheKey {
    pub fn new(year: i32, month: Month, today: Date, plants: &[Plant]) -> Self {
        Self {
            year,
            month,
            today,
            fingerprint: Fingerprint::of(plants),
        }
    }
}

struct Entries<T> {
    values: HashMap<CacheKey, Arc<T>>,
    /// Least recently used at the front.
    recency: VecDeque<CacheKey>,
}

impl<T> Entries<T> {
    fn touch(&mut self, key: &CacheKey) {
        if let Some(position) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(position);
        }
        self.recency.push_back(*key);
    }

    fn remove(&mut self, key: &CacheKey) {
        self.values.remove(key);
        self.recency.retain(|k| k != key);
    }
}

/// Bounded LRU of computed calendar months.
///
/// Computation runs outside the lock: two callers missing on the same key may
/// both compute, and the first stored value wins. Bookkeeping is always
/// serialized.
pub struct CalendarCache<T> {
    capacity: usize,
    entries: Mutex<Entries<T>>,
}

impl<T> Default for CalendarCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> CalendarCache<T> {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            capacity,
            entries: Mutex::new(Entries {
                values: HashMap::with_capacity(capacity),
                recency: VecDeque::with_capacity(capacity),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries<T>> {
        // Entries stay consistent between statements, so a panic elsewhere
        // leaves nothing half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<T>> {
        let mut entries = self.lock();
        let value = entries.values.get(key).cloned()?;
        entries.touch(key);

        tracing::trace!(year = key.year, month = %key.month, "calendar cache hit");
        Some(value)
    }

    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }

        tracing::trace!(year = key.year, month = %key.month, "calendar cache miss");
        let computed = Arc::new(compute());

        let mut entries = self.lock();
        if let Some(existing) = entries.values.get(&key).cloned() {
            entries.touch(&key);
            return existing;
        }

        while entries.values.len() >= self.capacity {
            let Some(oldest) = entries.recency.pop_front() else {
                break;
            };
            entries.values.remove(&oldest);
            tracing::debug!(
                year = oldest.year,
                month = %oldest.month,
                "evicted calendar month"
            );
        }

        entries.values.insert(key, Arc::clone(&computed));
        entries.touch(&key);

        computed
    }

    /// Drops every entry whose key matches; returns how many went.
    pub fn invalidate<P>(&self, predicate: P) -> usize
    where
        P: Fn(&CacheKey) -> bool,
    {
        let mut entries = self.lock();
        let doomed: Vec<CacheKey> = entries
            .values
            .keys()
            .filter(|key| predicate(key))
            .copied()
            .collect();

        for key in &doomed {
            entries.remove(key);
        }

        if !doomed.is_empty() {
            tracing::debug!(count = doomed.len(), "invalidated calendar months");
        }

        doomed.len()
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.values.clear();
        entries.recency.clear();

        tracing::debug!("cleared calendar cache");
    }
}
