//! Account registration and authentication.

use crate::session::CredentialVerifier;
use crate::validate::{compute_bmi, is_positive_measure, is_valid_email};
use crate::{Account, DietPlan, Error, Result, Sex, Store};

/// Raw registration input as collected by the presentation layer.
///
/// Sex and diet arrive as the strings the operator provided; they are parsed
/// against their closed enumerations during validation, never by index.
#[derive(Clone, Debug)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub weight_kg: f64,
    pub height_m: f64,
    /// "m"/"M"/"f"/"F"; normalized to uppercase
    pub sex: String,
    /// Display name of one of the four diet plans
    pub diet: String,
}

/// Validate and persist a new account.
///
/// Checks run in a fixed order so callers see deterministic errors: e-mail
/// syntax, e-mail uniqueness, password, measurements, sex, diet. The BMI is
/// computed here once and frozen; no operation ever updates it.
pub fn register(store: &mut Store, reg: &Registration) -> Result<Account> {
    if !is_valid_email(&reg.email) {
        return Err(Error::InvalidEmail);
    }
    if store.find_account(&reg.email)?.is_some() {
        return Err(Error::EmailTaken);
    }
    if reg.password.is_empty() {
        return Err(Error::EmptyPassword);
    }
    if !is_positive_measure(reg.weight_kg) || !is_positive_measure(reg.height_m) {
        return Err(Error::InvalidMeasurement);
    }
    let sex = Sex::parse(&reg.sex).ok_or(Error::InvalidSex)?;
    let diet = DietPlan::parse(&reg.diet).ok_or_else(|| Error::InvalidDiet(reg.diet.clone()))?;

    // Extreme finite inputs can still overflow the division; JSON has no
    // encoding for a non-finite BMI.
    let bmi = compute_bmi(reg.weight_kg, reg.height_m);
    if !bmi.is_finite() {
        return Err(Error::InvalidMeasurement);
    }

    let account = Account {
        email: reg.email.clone(),
        password: reg.password.clone(),
        weight_kg: reg.weight_kg,
        height_m: reg.height_m,
        sex,
        diet,
        bmi,
    };
    store.insert_account(&account)?;

    tracing::info!(email = %account.email, bmi = account.bmi, "account registered");
    Ok(account)
}

/// Look up the account and verify the password.
///
/// The only operation that establishes a user identity for the session
/// layer; meal logging trusts the e-mail the session hands it.
pub fn authenticate(
    store: &Store,
    verifier: &impl CredentialVerifier,
    email: &str,
    password: &str,
) -> Result<Account> {
    let account = store.find_account(email)?.ok_or(Error::UnknownEmail)?;
    if !verifier.verify(password, &account.password) {
        tracing::debug!(email = %email, "authentication rejected");
        return Err(Error::WrongPassword);
    }
    Ok(account)
}
