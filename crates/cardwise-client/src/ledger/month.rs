use chrono::{Local, NaiveDate};

use crate::{ClientError, ClientResult};

/// `YYYY-MM` bucket that usage caps reset on.
pub fn month_key(date: &NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn current_month() -> String {
    month_key(&today())
}

pub fn parse_purchase_date(value: &str, command: &str) -> ClientResult<NaiveDate> {
    let trimmed = value.trim();
    if !looks_like_iso_date(trimmed) {
        return Err(ClientError::invalid_argument_for_command(
            "Invalid `date`: use YYYY-MM-DD format.",
            Some(command),
        ));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        ClientError::invalid_argument_for_command(
            "Invalid `date`: use valid calendar values.",
            Some(command),
        )
    })
}

/// Validates a `YYYY-MM` month and returns it normalized.
pub fn parse_month(value: &str, command: &str) -> ClientResult<String> {
    let trimmed = value.trim();
    let bytes = trimmed.as_bytes();
    let shaped = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| index == 4 || byte.is_ascii_digit());
    if !shaped {
        return Err(ClientError::invalid_argument_for_command(
            "Invalid `month`: use YYYY-MM format.",
            Some(command),
        ));
    }

    let first_day = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
        .map_err(|_| {
            ClientError::invalid_argument_for_command(
                "Invalid `month`: use a real calendar month (01-12).",
                Some(command),
            )
        })?;
    Ok(month_key(&first_day))
}

pub fn resolve_month(value: Option<&str>, command: &str) -> ClientResult<String> {
    match value {
        Some(month) => parse_month(month, command),
        None => Ok(current_month()),
    }
}

fn looks_like_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| index == 4 || index == 7 || byte.is_ascii_digit())
}
