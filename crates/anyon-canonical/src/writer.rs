//! Compact JSON emission for canonical documents.
//!
//! Output has no insignificant whitespace, object members in key order,
//! non-ASCII characters emitted as-is, and floats in shortest round-trip form:
//! positional notation when the decimal point falls within 16 digits of the
//! first significant digit (`1.0`, `0.0001`, `1000000000000000.0`), exponent
//! notation with a signed two-digit-minimum exponent otherwise (`1e-05`, `1e+16`).

use crate::canonicalizer::CanonicalizationError;
use crate::path::JsonPath;
use crate::value::Value;

const POSITIONAL_MIN_EXP: i32 = -4;
const POSITIONAL_MAX_EXP: i32 = 16;

/// Renders a finite float in canonical form; `None` for NaN and infinities.
pub fn float_repr(x: f64) -> Option<String> {
    if !x.is_finite() {
        return None;
    }
    // `{:e}` yields the shortest digits that round-trip, e.g. `-1.2345e-7`.
    let sci = format!("{:e}", x.abs());
    let (mantissa, exp) = sci.split_once('e')?;
    let exp: i32 = exp.parse().ok()?;
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let point = exp + 1;

    let mut out = String::with_capacity(digits.len() + 8);
    if x.is_sign_negative() && x != 0.0 {
        out.push('-');
    }

    if point > POSITIONAL_MIN_EXP && point <= POSITIONAL_MAX_EXP {
        let n = digits.len() as i32;
        if point <= 0 {
            out.push_str("0.");
            out.push_str(&"0".repeat((-point) as usize));
            out.push_str(&digits);
        } else if point >= n {
            out.push_str(&digits);
            out.push_str(&"0".repeat((point - n) as usize));
            out.push_str(".0");
        } else {
            let (int_part, frac_part) = digits.split_at(point as usize);
            out.push_str(int_part);
            out.push('.');
            out.push_str(frac_part);
        }
    } else {
        let (lead, rest) = digits.split_at(1);
        out.push_str(lead);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        let sign = if exp < 0 { '-' } else { '+' };
        out.push_str(&format!("e{}{:02}", sign, exp.abs()));
    }
    Some(out)
}

/// Appends the compact encoding of `value` to `out`.
pub(crate) fn write_value(
    value: &Value,
    path: &JsonPath<'_>,
    out: &mut String,
) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(f) => {
            let repr = float_repr(*f).ok_or_else(|| CanonicalizationError::NonFiniteNumber {
                path: path.to_string(),
                value: *f,
            })?;
            out.push_str(&repr);
        }
        Value::String(s) => write_string(s, out)?,
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(item, &path.push_index(idx), out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (idx, (key, child)) in map.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(key, out)?;
                out.push(':');
                write_value(child, &path.push_field(key), out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_string(s: &str, out: &mut String) -> Result<(), CanonicalizationError> {
    let quoted =
        serde_json::to_string(s).map_err(|err| CanonicalizationError::Other(err.to_string()))?;
    out.push_str(&quoted);
    Ok(())
}
