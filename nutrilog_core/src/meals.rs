//! Meal logging against the journal.

use chrono::{Duration, Timelike, Utc};

use crate::validate::{is_positive_measure, normalize_food_name};
use crate::{Error, LogEntry, Result, Store};

/// Record that `email` ate `grams` of `food_raw` right now.
///
/// The food must already exist in the catalog; the quantity must be
/// positive. The timestamp is taken here, truncated to whole seconds, so
/// the store only ever assigns the id.
pub fn log_meal(store: &mut Store, email: &str, food_raw: &str, grams: f64) -> Result<LogEntry> {
    let food = normalize_food_name(food_raw);
    if !store.food_exists(&food)? {
        return Err(Error::UnknownFood(food));
    }
    if !is_positive_measure(grams) {
        return Err(Error::InvalidQuantity);
    }

    let now = Utc::now();
    let logged_at = now.with_nanosecond(0).unwrap_or(now);
    let entry = store.insert_meal(email, &food, grams, logged_at)?;

    tracing::info!(id = entry.id, email = %email, food = %food, grams, "meal logged");
    Ok(entry)
}

/// Meals for `email` logged within the last `days` days, newest first.
pub fn recent_meals(store: &Store, email: &str, days: i64) -> Result<Vec<LogEntry>> {
    let cutoff = Utc::now() - Duration::days(days);
    let mut entries: Vec<LogEntry> = store
        .meals_for(email)?
        .into_iter()
        .filter(|e| e.logged_at >= cutoff)
        .collect();
    entries.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
    Ok(entries)
}
