//! Built-in string conversions
//!
//! Applied only when no converter marker resolves. The rules are ordered
//! and first-match: a matched rule that fails to parse is a fatal format
//! error, never a fallthrough to a later rule. All parsing is invariant,
//! independent of the process locale.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::convert::registry::ConverterTable;
use crate::convert::AnyValue;
use crate::error::ConvertError;
use crate::metadata::{TypeDescriptor, TypeKind};

/// Invariant date-time formats accepted by the built-in parser
const DATE_TIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-only forms, completed with midnight
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// Most days a duration literal may carry, same ceiling as the wire format
const MAX_DURATION_DAYS: u32 = 10_675_199;

/// Convert `raw` using the built-in rules for `target`.
///
/// With `strict` off, a target no rule or implicit cast covers receives the
/// raw string back unchanged; with `strict` on it fails instead.
pub fn convert_builtin(
    raw: &str,
    target: &TypeDescriptor,
    table: &ConverterTable,
    strict: bool,
) -> Result<AnyValue, ConvertError> {
    // The input is known non-null, so an optional wrapper converts to its
    // underlying type rather than to a wrapped value.
    let mut target = target;
    while let TypeKind::Nullable(inner) = &target.kind {
        target = &**inner;
    }

    match &target.kind {
        TypeKind::Enum(variants) => variants.parse(raw, &target.name),
        TypeKind::Int32 => raw
            .trim()
            .parse::<i32>()
            .map(|value| Box::new(value) as AnyValue)
            .map_err(|_| ConvertError::InvalidInteger(raw.to_string())),
        TypeKind::Float32 => raw
            .trim()
            .parse::<f32>()
            .map(|value| Box::new(value) as AnyValue)
            .map_err(|_| ConvertError::InvalidNumber(raw.to_string())),
        TypeKind::Float64 => raw
            .trim()
            .parse::<f64>()
            .map(|value| Box::new(value) as AnyValue)
            .map_err(|_| ConvertError::InvalidNumber(raw.to_string())),
        TypeKind::Bool => parse_bool(raw).map(|value| Box::new(value) as AnyValue),
        TypeKind::Duration => parse_duration(raw).map(|value| Box::new(value) as AnyValue),
        TypeKind::DateTime => parse_date_time(raw).map(|value| Box::new(value) as AnyValue),
        TypeKind::Str => match raw.strip_prefix("{}") {
            // "{}" escapes a leading sequence the markup parser would
            // otherwise treat as an expression
            Some(rest) => Ok(Box::new(rest.to_string())),
            None => Ok(Box::new(raw.to_string())),
        },
        TypeKind::Other | TypeKind::Nullable(_) => {
            if let Some(cast) = table.implicit_cast(target.id) {
                return Ok(cast(raw));
            }
            if strict {
                Err(ConvertError::UnsupportedTarget(target.name.clone()))
            } else {
                // Permissive fallback: the caller gets the raw string back
                // and whatever consumes the value surfaces the mismatch
                Ok(Box::new(raw.to_string()))
            }
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool, ConvertError> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConvertError::InvalidBoolean(raw.to_string()))
    }
}

/// A bounded, all-digit field of a duration literal
fn parse_field(text: &str, max: u32) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = text.parse().ok()?;
    (value <= max).then_some(value)
}

/// Parse an invariant duration literal: `[-][d.]hh:mm[:ss[.fffffff]]`
fn parse_duration(raw: &str) -> Result<Duration, ConvertError> {
    let fail = || ConvertError::InvalidDuration(raw.to_string());

    let text = raw.trim();
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let mut fields = text.split(':');
    let first = fields.next().unwrap_or("");
    let (days, hours_text) = match first.split_once('.') {
        Some((days_text, hours_text)) => {
            (parse_field(days_text, MAX_DURATION_DAYS).ok_or_else(fail)?, hours_text)
        }
        None => (0, first),
    };
    let hours = parse_field(hours_text, 23).ok_or_else(fail)?;
    let minutes = fields
        .next()
        .and_then(|text| parse_field(text, 59))
        .ok_or_else(fail)?;

    let (seconds, nanos) = match fields.next() {
        None => (0, 0i64),
        Some(seconds_text) => {
            let (whole, fraction) = match seconds_text.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (seconds_text, None),
            };
            let seconds = parse_field(whole, 59).ok_or_else(fail)?;
            let nanos = match fraction {
                // Up to seven fractional digits, 100ns resolution
                Some(digits) if !digits.is_empty() && digits.len() <= 7 => {
                    let ticks = parse_field(digits, u32::MAX).ok_or_else(fail)?;
                    i64::from(ticks) * 10i64.pow(9 - digits.len() as u32)
                }
                Some(_) => return Err(fail()),
                None => 0,
            };
            (seconds, nanos)
        }
    };

    if fields.next().is_some() {
        return Err(fail());
    }

    let total_seconds = i64::from(days) * 86_400
        + i64::from(hours) * 3_600
        + i64::from(minutes) * 60
        + i64::from(seconds);
    let duration = Duration::seconds(total_seconds) + Duration::nanoseconds(nanos);
    Ok(if negative { -duration } else { duration })
}

/// Parse an invariant date-time literal, date-only forms meaning midnight
fn parse_date_time(raw: &str) -> Result<NaiveDateTime, ConvertError> {
    let text = raw.trim();
    for format in DATE_TIME_FORMATS {
        if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(value);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }
    Err(ConvertError::InvalidDateTime(raw.to_string()))
}
