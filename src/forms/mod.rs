use std::io::{Read, Seek};

use actix_multipart::form::tempfile::TempFile;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

pub mod bulk_upload;
pub mod categories;
pub mod inventory;
pub mod products;
pub mod stores;
pub mod storefront;
pub mod subcategories;

/// Errors produced while reading a price or a quantity typed by a user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("value is missing")]
    Missing,
    #[error("`{0}` is not a number")]
    NotNumeric(String),
    #[error("`{0}` is not a whole number")]
    NotWhole(String),
    #[error("price must be greater than zero")]
    NonPositivePrice,
    #[error("quantity cannot be negative")]
    NegativeQuantity,
    #[error("`{0}` is too large")]
    OutOfRange(String),
}

/// Parse a decimal price into cents, keeping two fractional digits.
pub fn parse_price_cents(raw: &str) -> Result<i64, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Missing);
    }

    let value: Decimal = trimmed
        .parse()
        .map_err(|_| AmountError::NotNumeric(trimmed.to_string()))?;

    let cents = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        * Decimal::ONE_HUNDRED;
    if cents <= Decimal::ZERO {
        return Err(AmountError::NonPositivePrice);
    }

    cents
        .to_i64()
        .ok_or_else(|| AmountError::OutOfRange(trimmed.to_string()))
}

/// Parse a stock quantity. Spreadsheet cells such as `5.0` are accepted.
pub fn parse_quantity(raw: &str) -> Result<i32, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Missing);
    }

    let value: Decimal = trimmed
        .parse()
        .map_err(|_| AmountError::NotNumeric(trimmed.to_string()))?;

    if !value.fract().is_zero() {
        return Err(AmountError::NotWhole(trimmed.to_string()));
    }
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountError::NegativeQuantity);
    }

    value
        .to_i32()
        .ok_or_else(|| AmountError::OutOfRange(trimmed.to_string()))
}

/// Read an uploaded file into memory. Browsers submit an empty part when no
/// file was chosen, which yields `None`.
pub fn read_upload(upload: &mut TempFile) -> std::io::Result<Option<Vec<u8>>> {
    if upload.size == 0 {
        return Ok(None);
    }

    upload.file.rewind()?;
    let mut bytes = Vec::with_capacity(upload.size);
    upload.file.read_to_end(&mut bytes)?;

    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(bytes))
}

pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

pub(crate) fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        if line.is_empty() {
            if previous_empty {
                continue;
            }
            previous_empty = true;
            result.push(String::new());
        } else {
            previous_empty = false;
            result.push(line);
        }
    }

    result.join("\n")
}

/// Trim a SKU or barcode and drop control characters.
pub(crate) fn sanitize_code(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
}

/// Sanitize an optional inline value, mapping blanks to `None`.
pub(crate) fn non_empty_inline(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_inline_text)
        .filter(|value| !value.is_empty())
}
