//! Built-in validators and generators
//!
//! Usable from code and referenced by name from schema files. Validators
//! that do not apply to a value's type pass; the intrinsic type check
//! reports shape mismatches.

use std::sync::LazyLock;

use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value;

use crate::model::Model;

use super::types::{Generator, Mode, Validator, Verdict};

/// Length of a string (in chars) or an array
fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

pub fn min_length(min: usize) -> Validator {
    Validator::eager("min_length", move |value: &Value, _: &Model| match length(value) {
        Some(len) if len < min => Verdict::Message(format!("length must be at least {}", min)),
        _ => Verdict::Pass,
    })
}

pub fn max_length(max: usize) -> Validator {
    Validator::eager("max_length", move |value: &Value, _: &Model| match length(value) {
        Some(len) if len > max => Verdict::Message(format!("length must be at most {}", max)),
        _ => Verdict::Pass,
    })
}

/// Strings must match `pattern`
pub fn pattern(pattern: &str) -> Result<Validator, regex::Error> {
    let regex = Regex::new(pattern)?;
    Ok(Validator::eager("pattern", move |value: &Value, _: &Model| match value.as_str() {
        Some(s) if !regex.is_match(s) => {
            Verdict::Message(format!("must match /{}/", regex.as_str()))
        }
        _ => Verdict::Pass,
    }))
}

// One '@', no whitespace, a dot in the domain
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

pub fn email() -> Validator {
    Validator::eager("email", |value: &Value, _: &Model| match value.as_str() {
        Some(s) if !EMAIL.is_match(s) => Verdict::from("must be an email address"),
        _ => Verdict::Pass,
    })
}

/// Value must equal one of `allowed`
pub fn one_of(allowed: Vec<Value>) -> Validator {
    Validator::eager("one_of", move |value: &Value, _: &Model| {
        if allowed.iter().any(|candidate| crate::field::values_equal(candidate, value)) {
            Verdict::Pass
        } else {
            let choices: Vec<String> = allowed.iter().map(Value::to_string).collect();
            Verdict::Message(format!("must be one of {}", choices.join(", ")))
        }
    })
}

pub fn min(min: f64) -> Validator {
    Validator::eager("min", move |value: &Value, _: &Model| match value.as_f64() {
        Some(n) if n < min => Verdict::Message(format!("must be at least {}", min)),
        _ => Verdict::Pass,
    })
}

pub fn max(max: f64) -> Validator {
    Validator::eager("max", move |value: &Value, _: &Model| match value.as_f64() {
        Some(n) if n > max => Verdict::Message(format!("must be at most {}", max)),
        _ => Verdict::Pass,
    })
}

/// Random v4 UUID string
pub fn uuid() -> Generator {
    Generator::eager(|| uuid::Uuid::new_v4().to_string())
}

/// Current time, RFC 3339 UTC
pub fn now() -> Generator {
    Generator::eager(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Builds a named validator from a schema file rule
pub fn validator(rule: &str, arg: Option<&Value>, mode: Mode) -> Result<Validator, String> {
    let usize_arg = || {
        arg.and_then(Value::as_u64)
            .map(|n| n as usize)
            .ok_or_else(|| format!("rule '{}' needs a non-negative integer value", rule))
    };
    let number_arg = || {
        arg.and_then(Value::as_f64)
            .ok_or_else(|| format!("rule '{}' needs a numeric value", rule))
    };

    let validator = match rule {
        "min_length" => min_length(usize_arg()?),
        "max_length" => max_length(usize_arg()?),
        "pattern" => {
            let source = arg
                .and_then(Value::as_str)
                .ok_or_else(|| "rule 'pattern' needs a string value".to_string())?;
            pattern(source).map_err(|e| format!("invalid pattern: {}", e))?
        }
        "email" => email(),
        "one_of" => match arg {
            Some(Value::Array(choices)) => one_of(choices.clone()),
            _ => return Err("rule 'one_of' needs an array value".to_string()),
        },
        "min" => min(number_arg()?),
        "max" => max(number_arg()?),
        other => return Err(format!("unknown validator rule '{}'", other)),
    };

    Ok(match mode {
        Mode::Eager => validator,
        Mode::Lazy => {
            let name = validator.name().to_string();
            Validator::lazy(name, move |value: &Value, model: &Model| validator.check(value, model))
        }
    })
}

/// Looks up a named generator
pub fn generator(name: &str, mode: Mode) -> Option<Generator> {
    let eager = match name {
        "uuid" => uuid(),
        "now" => now(),
        _ => return None,
    };
    Some(match mode {
        Mode::Eager => eager,
        Mode::Lazy => Generator::lazy(move || eager.produce()),
    })
}
