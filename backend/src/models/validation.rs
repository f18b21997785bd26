//! Field-level validation for incoming records.
//!
//! Errors are collected per field so a client gets every problem with a
//! payload in one response rather than the first one only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error set holding a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Check a mandatory text field and return its value when acceptable.
    pub fn require_text(
        &mut self,
        field: &str,
        value: Option<&str>,
        max_len: Option<usize>,
    ) -> Option<String> {
        match value {
            None => {
                self.add(field, REQUIRED);
                None
            }
            Some(v) => self.check_text(field, v, max_len),
        }
    }

    /// Check an optional text field; `None` is accepted as "leave unchanged".
    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<&str>,
        max_len: Option<usize>,
    ) -> Option<String> {
        value.and_then(|v| self.check_text(field, v, max_len))
    }

    fn check_text(&mut self, field: &str, value: &str, max_len: Option<usize>) -> Option<String> {
        if value.trim().is_empty() {
            self.add(field, BLANK);
            return None;
        }
        if let Some(max) = max_len {
            if value.chars().count() > max {
                self.add(
                    field,
                    format!("Ensure this field has no more than {} characters.", max),
                );
                return None;
            }
        }
        Some(value.to_string())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}
