use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use crate::domain::models::reference::{Skill, SkillId, UsState};
use crate::error::AppError;

/// Collects per-field messages so a form gets every problem in one response.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Records the error (if any) and yields the value on success.
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() { Ok(()) } else { Err(AppError::InvalidFields(self.0)) }
    }
}

pub fn required(value: Option<&str>, max_len: usize) -> Result<String, String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err("Required".to_string());
    }
    if value.chars().count() > max_len {
        return Err(format!("Max {} characters", max_len));
    }
    Ok(value.to_string())
}

pub fn optional(value: Option<&str>, max_len: usize) -> Result<Option<String>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.chars().count() > max_len => Err(format!("Max {} characters", max_len)),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Accepts `12345`, `123456789` or `12345-6789` and returns the digits only.
pub fn normalize_zip(value: Option<&str>) -> Result<String, String> {
    let value = value.map(str::trim).unwrap_or_default();
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();

    let well_formed = match value.len() {
        5 | 9 => digits.len() == value.len(),
        10 => value.as_bytes()[5] == b'-' && digits.len() == 9,
        _ => false,
    };

    if well_formed {
        Ok(digits)
    } else {
        Err("Invalid ZIP code. Use 5 or 9 digits.".to_string())
    }
}

pub fn state_code(value: Option<&str>, states: &[UsState]) -> Result<String, String> {
    let code = value.map(str::trim).unwrap_or_default().to_ascii_uppercase();
    if code.len() != 2 {
        return Err("State code required (2 characters).".to_string());
    }
    if !states.iter().any(|s| s.code == code) {
        return Err("Unknown state code.".to_string());
    }
    Ok(code)
}

pub fn skill_ids(ids: Option<&[SkillId]>, skills: &[Skill]) -> Result<BTreeSet<SkillId>, String> {
    let ids: BTreeSet<SkillId> = ids.unwrap_or_default().iter().copied().collect();
    if ids.is_empty() {
        return Err("At least one skill required.".to_string());
    }
    let missing: Vec<SkillId> = ids.iter().copied().filter(|id| !skills.iter().any(|s| s.id == *id)).collect();
    if !missing.is_empty() {
        return Err(format!("Invalid skill id(s): {:?}.", missing));
    }
    Ok(ids)
}

/// Parses `YYYY-MM-DD`. A trailing `THH:MM:SS` is tolerated and dropped.
pub fn calendar_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    let day = value.split_once('T').map_or(value, |(d, _)| d);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| format!("Invalid date: {}", value))
}
