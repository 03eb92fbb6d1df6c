//! Input validation and derived-measure helpers.
//!
//! Pure functions shared by the account, catalog, and meal-log services so
//! both sides of every lookup agree on syntax and normalization.

use once_cell::sync::Lazy;
use regex::Regex;

/// local@domain.tld; word characters, dot, and hyphen on either side, and at
/// least one dot-separated suffix on the domain
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("e-mail regex compiles"));

/// Check e-mail syntax only; no network or MX lookup.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// A usable measurement: finite and strictly positive.
///
/// NaN fails every ordering comparison, so a bare `> 0.0` cannot reject
/// it; JSON also has no encoding for non-finite floats.
pub fn is_positive_measure(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Body-mass index: weight (kg) over height (m) squared, two decimals.
///
/// Callers must have rejected non-finite and non-positive inputs first.
pub fn compute_bmi(weight_kg: f64, height_m: f64) -> f64 {
    ((weight_kg / (height_m * height_m)) * 100.0).round() / 100.0
}

/// Canonical catalog form of a food name: trimmed, lowercased.
///
/// Applied on both the catalog-insert and the meal-lookup path, so "Rice",
/// "rice" and " rice " all address the same catalog row.
pub fn normalize_food_name(name: &str) -> String {
    name.trim().to_lowercase()
}
