//! `validator` adapters over the shared domain validators
//!
//! Used as `#[validate(custom(...))]` targets on the HTTP input structs.

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

fn adapt(code: &'static str, result: Result<(), &'static str>) -> Result<(), ValidationError> {
    result.map_err(|message| {
        let mut err = ValidationError::new(code);
        err.message = Some(Cow::Borrowed(message));
        err
    })
}

pub fn mobile(value: &str) -> Result<(), ValidationError> {
    adapt("mobile", shared::validate_mobile(value))
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    adapt("password", shared::validate_password(value))
}

/// Empty string is accepted and stored as no email
pub fn email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    adapt("email", shared::validate_email(value))
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    adapt("required", shared::validate_required(value, "Field is required"))
}

pub fn bag_weight(value: &Decimal) -> Result<(), ValidationError> {
    adapt("bag_weight", shared::validate_bag_weight(*value))
}

pub fn price(value: &Decimal) -> Result<(), ValidationError> {
    adapt("price", shared::validate_price(*value))
}

/// Run the derived validation and convert the first failure into an `AppError`
pub fn validated<T: Validate>(input: T) -> AppResult<T> {
    input.validate().map_err(AppError::from)?;
    Ok(input)
}

/// Trim a text field, mapping blank to `None`
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
