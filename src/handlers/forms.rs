//! Form and query-string helpers shared by the handlers.
//!
//! HTML forms submit every field as a string: unchecked checkboxes are
//! absent, checked ones carry `on` (or `true`/`1` from scripts), and empty
//! inputs arrive as `""`. The deserializers here normalise those shapes.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer};

use crate::error::{ApiError, FieldErrors};

/// Checkbox semantics: `on`, `true` and `1` are checked, anything else is not
pub fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        value.as_deref().map(str::trim),
        Some("on") | Some("true") | Some("1")
    ))
}

/// Empty or whitespace-only values are treated as absent
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Trim a free-text field and drop it when empty
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Accepted graduation years run from 1900 to ten years ahead
pub fn valid_year_range() -> std::ops::RangeInclusive<i32> {
    1900..=Utc::now().year() + 10
}

/// Collects per-field messages and turns them into one validation error
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Returns the trimmed value, recording an error when it is missing
    pub fn required(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = clean(value);
        if value.is_none() {
            self.add(field, "This field is required");
        }
        value
    }

    pub fn email(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = self.required(field, value)?.to_lowercase();
        if !is_valid_email(&value) {
            self.add(field, "Invalid email address");
        }
        Some(value)
    }

    /// Parse an integer field, optionally required
    pub fn integer(&mut self, field: &str, value: Option<String>, required: bool) -> Option<i32> {
        let value = match clean(value) {
            Some(value) => value,
            None => {
                if required {
                    self.add(field, "This field is required");
                }
                return None;
            }
        };
        match value.parse::<i32>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.add(field, "Must be a number");
                None
            }
        }
    }

    pub fn year(&mut self, field: &str, value: Option<String>, required: bool) -> Option<i32> {
        let year = self.integer(field, value, required)?;
        let range = valid_year_range();
        if !range.contains(&year) {
            self.add(
                field,
                format!("Year must be between {} and {}", range.start(), range.end()),
            );
        }
        Some(year)
    }

    /// Optional http(s) URL
    pub fn url(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = clean(value)?;
        match url::Url::parse(&value) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => self.add(field, "Must be a valid http(s) URL"),
        }
        Some(value)
    }

    /// Optional `YYYY-MM-DD` date
    pub fn date(&mut self, field: &str, value: Option<String>) -> Option<NaiveDate> {
        let value = clean(value)?;
        match NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.add(field, "Invalid date (expected YYYY-MM-DD)");
                None
            }
        }
    }

    pub fn parsed<T: FromStr>(&mut self, field: &str, value: Option<String>, message: &str) -> Option<T> {
        let value = clean(value)?;
        match value.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Validation failed", Some(self.errors)))
        }
    }
}
