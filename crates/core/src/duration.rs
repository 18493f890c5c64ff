use once_cell::sync::Lazy;
use regex::Regex;

use crate::attr::{resolve, AttrValue};

// The provider emits whole-hour or whole-minute tokens only; the wider
// ISO-8601 duration grammar (days, combined H+M, fractions) never occurs
// and is reported as indeterminate rather than guessed at.
static DURATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^PT(\d+)(H|M)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalized {
    Hours(f64),
    Absent,
    Indeterminate,
}

pub fn normalize_hours(raw: Option<&AttrValue>) -> Normalized {
    let value = match raw {
        Some(v) => resolve(v),
        None => return Normalized::Absent,
    };
    let token = match &value {
        AttrValue::Null => return Normalized::Absent,
        AttrValue::String(s) => s,
        _ => return Normalized::Indeterminate,
    };
    let Some(caps) = DURATION.captures(token) else {
        return Normalized::Indeterminate;
    };
    let count: u64 = match caps[1].parse() {
        Ok(n) => n,
        Err(_) => return Normalized::Indeterminate,
    };
    match &caps[2] {
        "H" => Normalized::Hours(count as f64),
        _ => Normalized::Hours(count as f64 / 60.0),
    }
}
