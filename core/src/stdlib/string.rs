//! String functions and conversions.
//!
//! Positions are counted in characters, not bytes.
//!
//! Functions: len, find, count, subString, str, bool, float

use super::{Table, float_arg, str_arg};
use crate::evaluator::{EvalError, TermEvaluator};
use crate::values::Value;

pub(super) fn register(table: &mut Table) {
    table.native("len", 1, Some(1), "a string or an array", string_len);
    table.native("find", 2, Some(3), "(string, substring[, occurrence])", string_find);
    table.native("count", 2, Some(2), "(string, substring)", string_count);
    table.native("subString", 3, Some(3), "(string, start, end)", string_substring);
    table.native("str", 1, Some(1), "one value", to_str);
    table.native("bool", 1, Some(1), "a bool, a number or a string", to_bool);
    table.native("float", 1, Some(1), "a float, a bool or a string", to_float);
}

fn string_len(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Str(s) => Ok(Value::Float(s.chars().count() as f64)),
        Value::Array(items) => Ok(Value::Float(items.len() as f64)),
        _ => Err(EvalError::arity_or_type("len", "a string or an array")),
    }
}

/// Character position of the `occurrence`-th (0-based) match of `needle`,
/// or -1.
fn string_find(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let expected = "(string, substring[, occurrence])";
    let haystack = str_arg(args, 0, "find", expected)?;
    let needle = str_arg(args, 1, "find", expected)?;
    let occurrence = match args.get(2) {
        Some(_) => float_arg(args, 2, "find", expected)?,
        None => 0.0,
    };
    if needle.is_empty() || occurrence < 0.0 {
        return Ok(Value::Float(-1.0));
    }
    let found = haystack
        .match_indices(needle)
        .nth(occurrence as usize)
        .map(|(byte, _)| haystack[..byte].chars().count() as f64);
    Ok(Value::Float(found.unwrap_or(-1.0)))
}

/// Non-overlapping occurrences of `needle`.
fn string_count(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let haystack = str_arg(args, 0, "count", "(string, substring)")?;
    let needle = str_arg(args, 1, "count", "(string, substring)")?;
    if needle.is_empty() {
        return Ok(Value::Float(0.0));
    }
    Ok(Value::Float(haystack.matches(needle).count() as f64))
}

/// Characters `start..end`, clamped to the string.
fn string_substring(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let expected = "(string, start, end)";
    let s = str_arg(args, 0, "subString", expected)?;
    let start = float_arg(args, 1, "subString", expected)?.max(0.0) as usize;
    let end = float_arg(args, 2, "subString", expected)?.max(0.0) as usize;
    if end <= start {
        return Ok(Value::Str("".into()));
    }
    Ok(Value::Str(s.chars().skip(start).take(end - start).collect()))
}

fn to_str(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    Ok(Value::Str(args[0].concat_text()))
}

fn to_bool(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Float(x) => Ok(Value::Bool(*x != 0.0)),
        Value::Str(s) => Ok(Value::Bool(parse_bool(s))),
        _ => Err(EvalError::arity_or_type("bool", "a bool, a number or a string")),
    }
}

fn to_float(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Float(x) => Ok(Value::Float(*x)),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Str(s) => Ok(Value::Float(parse_float(s))),
        _ => Err(EvalError::arity_or_type("float", "a float, a bool or a string")),
    }
}

// ============================================================================
// Permissive coercion
// ============================================================================

/// `"true"` and `"false"` in any case, otherwise a number compared to zero.
/// Anything unreadable is false.
pub(crate) fn parse_bool(s: &str) -> bool {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        true
    } else if s.eq_ignore_ascii_case("false") {
        false
    } else {
        parse_float(s) != 0.0
    }
}

/// The whole string as a number, else its longest numeric prefix, else 0.
pub(crate) fn parse_float(s: &str) -> f64 {
    let s = s.trim();
    match s.parse::<f64>() {
        Ok(x) if x.is_finite() => x,
        _ => numeric_prefix(s).parse::<f64>().unwrap_or(0.0),
    }
}

/// `[sign] digits [. digits] [e [sign] digits]` at the start of `s`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits(end);
    let mut mantissa_end = int_end;
    if bytes.get(int_end) == Some(&b'.') {
        mantissa_end = digits(int_end + 1);
    }
    // A lone sign or dot is not a number.
    let has_digits = bytes[end..mantissa_end].iter().any(u8::is_ascii_digit);
    if !has_digits {
        return "";
    }
    end = mantissa_end;
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    &s[..end]
}
