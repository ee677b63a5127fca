//! Shape checks shared by the document and options validators.
//!
//! All helpers report at the collector's current path (or a named child of
//! it) and never coerce: a `"100"` where a number belongs is a type error.

use serde_json::{Map, Value};
use std::ops::RangeInclusive;

use crate::policy::is_reserved_key;
use crate::violation::{Collector, ViolationCode};

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Numbers without a fractional part, so `128.0` counts and `"1"` does
/// not. Magnitudes past `i64` saturate and fail any range check.
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0).map(|f| f as i64)),
        _ => None,
    }
}

pub(crate) fn expect_object<'v>(
    out: &mut Collector,
    value: &'v Value,
    what: &str,
) -> Option<&'v Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            out.report(
                ViolationCode::WrongType,
                format!("{what} must be an object, found {}", type_name(other)),
            );
            None
        }
    }
}

pub(crate) fn required<'v>(
    out: &mut Collector,
    map: &'v Map<String, Value>,
    key: &str,
    context: &str,
) -> Option<&'v Value> {
    let value = map.get(key);
    if value.is_none() {
        out.report_at(
            key,
            ViolationCode::MissingField,
            format!("{context} requires '{key}'"),
        );
    }
    value
}

/// Reports every key of `map` outside `allowed`. `special` may claim a key
/// and return a more precise code than `unknown_field`.
pub(crate) fn closed_with(
    out: &mut Collector,
    map: &Map<String, Value>,
    allowed: &[&str],
    context: &str,
    special: impl Fn(&str) -> Option<(ViolationCode, String)>,
) {
    for key in map.keys() {
        if allowed.contains(&key.as_str()) {
            continue;
        }
        let (code, message) = if is_reserved_key(key) {
            (ViolationCode::ReservedKey, format!("reserved key '{key}' is not allowed"))
        } else if let Some(found) = special(key) {
            found
        } else {
            (ViolationCode::UnknownField, format!("unknown field '{key}' in {context}"))
        };
        out.report_at(key, code, message);
    }
}

pub(crate) fn closed(out: &mut Collector, map: &Map<String, Value>, allowed: &[&str], context: &str) {
    closed_with(out, map, allowed, context, |_| None);
}

/// A string, or a type error. Over-long strings are a resource violation.
pub(crate) fn expect_string<'v>(
    out: &mut Collector,
    value: &'v Value,
    what: &str,
    max_len: usize,
) -> Option<&'v str> {
    match value {
        Value::String(s) if s.len() > max_len => {
            out.report(
                ViolationCode::ResourceLimitExceeded,
                format!("{what} is {} bytes, limit is {max_len}", s.len()),
            );
            None
        }
        Value::String(s) => Some(s),
        other => {
            out.report(
                ViolationCode::WrongType,
                format!("{what} must be a string, found {}", type_name(other)),
            );
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct NumberRule {
    pub integer: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberRule {
    pub fn real(min: f64, max: f64) -> Self {
        Self { integer: false, min: Some(min), max: Some(max) }
    }

    pub fn at_least(min: f64) -> Self {
        Self { integer: false, min: Some(min), max: None }
    }

    pub fn integer(min: i64, max: i64) -> Self {
        Self { integer: true, min: Some(min as f64), max: Some(max as f64) }
    }

    pub fn integer_at_least(min: i64) -> Self {
        Self { integer: true, min: Some(min as f64), max: None }
    }

    fn describe(&self) -> String {
        let kind = if self.integer { "an integer" } else { "a number" };
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => format!("{kind} in [{lo}, {hi}]"),
            (Some(lo), None) => format!("{kind} >= {lo}"),
            (None, Some(hi)) => format!("{kind} <= {hi}"),
            (None, None) => kind.to_string(),
        }
    }
}

pub(crate) fn check_number(out: &mut Collector, value: &Value, rule: NumberRule, what: &str) -> bool {
    let number = if rule.integer {
        as_integer(value).map(|n| n as f64)
    } else {
        value.as_f64()
    };
    let Some(number) = number else {
        out.report(
            ViolationCode::WrongType,
            format!("{what} must be {}, found {}", rule.describe(), describe_value(value)),
        );
        return false;
    };
    let below = rule.min.is_some_and(|lo| number < lo);
    let above = rule.max.is_some_and(|hi| number > hi);
    if below || above {
        out.report(
            ViolationCode::OutOfRange,
            format!("{what} must be {}, found {number}", rule.describe()),
        );
        return false;
    }
    true
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("non-integer {n}"),
        other => type_name(other).to_string(),
    }
}

/// A single number or a list of numbers whose length lies in `arity`.
pub(crate) fn check_number_or_list(
    out: &mut Collector,
    value: &Value,
    rule: NumberRule,
    arity: RangeInclusive<usize>,
    what: &str,
) {
    match value {
        Value::Array(items) => {
            if !arity.contains(&items.len()) {
                out.report(
                    ViolationCode::InvalidArity,
                    format!(
                        "{what} list must have {} to {} entries, found {}",
                        arity.start(),
                        arity.end(),
                        items.len()
                    ),
                );
            }
            for (i, item) in items.iter().enumerate() {
                out.at(i, |out| check_number(out, item, rule, what));
            }
        }
        Value::Number(_) => {
            check_number(out, value, rule, what);
        }
        other => out.report(
            ViolationCode::WrongType,
            format!("{what} must be {} or a list of them, found {}", rule.describe(), type_name(other)),
        ),
    }
}

/// A single string or a flat list of strings, each passed through `check`.
pub(crate) fn check_string_or_list(
    out: &mut Collector,
    value: &Value,
    what: &str,
    max_len: usize,
    check: impl Fn(&mut Collector, &str),
) {
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                out.at(i, |out| {
                    if let Some(s) = expect_string(out, item, what, max_len) {
                        check(out, s);
                    }
                });
            }
        }
        Value::String(_) => {
            if let Some(s) = expect_string(out, value, what, max_len) {
                check(out, s);
            }
        }
        other => out.report(
            ViolationCode::WrongType,
            format!("{what} must be a string or a list of strings, found {}", type_name(other)),
        ),
    }
}
