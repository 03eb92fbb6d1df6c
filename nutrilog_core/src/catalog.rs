//! Administrator-curated food catalog.
//!
//! The catalog is a flat set of lowercase food names. Meal logging only
//! accepts foods present here, so the administrator decides the vocabulary.

use crate::validate::normalize_food_name;
use crate::{Result, Store};

/// What adding a food did. A resubmitted name is not an error, the catalog
/// simply already covers it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddFoodOutcome {
    Created,
    AlreadyExists,
}

/// Add a food to the catalog, deduplicating on the normalized name.
pub fn add_food(store: &mut Store, raw: &str) -> Result<AddFoodOutcome> {
    let name = normalize_food_name(raw);
    if store.food_exists(&name)? {
        tracing::debug!(food = %name, "food already in catalog");
        return Ok(AddFoodOutcome::AlreadyExists);
    }
    store.insert_food(&name)?;
    tracing::info!(food = %name, "food added to catalog");
    Ok(AddFoodOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_food_created_then_already_exists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path()).unwrap();

        assert_eq!(add_food(&mut store, "Rice").unwrap(), AddFoodOutcome::Created);
        assert_eq!(
            add_food(&mut store, "rice").unwrap(),
            AddFoodOutcome::AlreadyExists
        );
        assert_eq!(
            add_food(&mut store, "  RICE  ").unwrap(),
            AddFoodOutcome::AlreadyExists
        );
    }

    #[test]
    fn test_add_food_stores_exactly_one_normalized_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path()).unwrap();

        add_food(&mut store, " Brown Rice ").unwrap();
        add_food(&mut store, "BROWN RICE").unwrap();

        assert!(store.food_exists("brown rice").unwrap());
        assert_eq!(store.list_foods().unwrap(), vec!["brown rice".to_string()]);
    }

    #[test]
    fn test_add_food_distinct_names_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path()).unwrap();

        add_food(&mut store, "Rice").unwrap();
        add_food(&mut store, "Beans").unwrap();
        add_food(&mut store, "Chicken").unwrap();

        assert_eq!(store.list_foods().unwrap().len(), 3);
    }
}
