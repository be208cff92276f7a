//! Deep numeric normalization of value trees.

use tracing::{debug, trace};

use crate::canonicalizer::canonical_json_dump;
use crate::errors::Error;
use crate::float::NumericFieldError;
use crate::path::JsonPath;
use crate::policy::NumericPolicy;
use crate::value::{cmp_numbers, Map, Value};

#[derive(Debug, Default)]
struct Stats {
    floats: usize,
    reordered: usize,
}

/// Rewrites every float leaf of `value` onto the decimal grid selected by `policy`.
///
/// Integers, strings, booleans and nulls pass through untouched. When the
/// policy enables reordering, an array whose own elements are all numbers is
/// sorted ascending, unless the array itself sits inside another array.
///
/// ```rust
/// use anyon_canonical::{quantize, FloatFormat, NumericPolicy, PolicySettings, Value};
///
/// let policy = NumericPolicy::new(PolicySettings {
///     fmt: FloatFormat::Fixed,
///     precision: 3,
///     ..Default::default()
/// })?;
/// let tree = Value::from_json_str(r#"{"x": 1.23456, "y": -0.0}"#)?;
/// let out = quantize(&tree, &policy)?;
/// assert_eq!(out.get("x"), Some(&Value::Float(1.235)));
/// assert_eq!(out.get("y"), Some(&Value::Float(0.0)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`NumericFieldError`] if a float is NaN or infinite, or if rounding
/// pushes it outside the binary64 range.
pub fn quantize(value: &Value, policy: &NumericPolicy) -> Result<Value, NumericFieldError> {
    let mut stats = Stats::default();
    let out = quantize_node(value, policy, &JsonPath::root(), false, &mut stats)?;
    debug!(
        floats = stats.floats,
        reordered_arrays = stats.reordered,
        fmt = %policy.fmt(),
        precision = policy.precision(),
        "quantized tree"
    );
    Ok(out)
}

/// Quantizes `payload` and returns its canonical string.
pub fn normalized_canonical_dump(payload: &Value, policy: &NumericPolicy) -> Result<String, Error> {
    let normalized = quantize(payload, policy)?;
    Ok(canonical_json_dump(&normalized)?)
}

fn quantize_node(
    value: &Value,
    policy: &NumericPolicy,
    path: &JsonPath<'_>,
    inside_array: bool,
    stats: &mut Stats,
) -> Result<Value, NumericFieldError> {
    match value {
        Value::Float(f) => {
            stats.floats += 1;
            let q = policy.quantize_float(*f, path)?;
            if q.to_bits() != f.to_bits() {
                trace!(path = %path, from = *f, to = q, "float rounded");
            }
            Ok(Value::Float(q))
        }
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::String(_) => Ok(value.clone()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                let q = quantize_node(child, policy, &path.push_field(key), false, stats)?;
                out.insert(key.clone(), q);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                out.push(quantize_node(item, policy, &path.push_index(idx), true, stats)?);
            }
            if policy.array_reorder() && !inside_array && out.iter().all(Value::is_number) {
                out.sort_by(cmp_numbers);
                stats.reordered += 1;
            }
            Ok(Value::Array(out))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{FloatFormat, PolicySettings};

    fn json(text: &str) -> Value {
        Value::from_json_str(text).unwrap()
    }

    fn policy(settings: PolicySettings) -> NumericPolicy {
        NumericPolicy::new(settings).unwrap()
    }

    #[test]
    fn fixed_rounding_and_negative_zero() {
        let p = policy(PolicySettings { fmt: FloatFormat::Fixed, precision: 3, ..Default::default() });
        let payload = json(
            r#"{"a": -0.0, "b": [1.23456, 1e-7, -0.0], "c": {"x": 1.9995, "y": 2.0004},
                "d": 0.0, "e": 42, "s": "txt", "n": null}"#,
        );
        let out = quantize(&payload, &p).unwrap();

        let a = out.get("a").and_then(Value::as_f64).unwrap();
        assert_eq!(a.to_bits(), 0.0f64.to_bits());
        assert_eq!(
            out.get("b").unwrap(),
            &Value::Array(vec![Value::Float(1.235), Value::Float(0.0), Value::Float(0.0)])
        );
        assert_eq!(out.get("c").unwrap().get("x"), Some(&Value::Float(2.0)));
        assert_eq!(out.get("c").unwrap().get("y"), Some(&Value::Float(2.0)));
        assert_eq!(out.get("e"), Some(&Value::Int(42)));
        assert_eq!(out.get("s"), Some(&Value::from("txt")));
        assert_eq!(out.get("n"), Some(&Value::Null));
    }

    #[test]
    fn reorder_only_flat_numeric_arrays() {
        let p = policy(PolicySettings {
            array_reorder: true,
            fmt: FloatFormat::Fixed,
            precision: 2,
            ..Default::default()
        });
        let payload = json(
            r#"{"nums": [0.0, -0.0, 3.1415, -2.5, 1.234], "mix": [1.0, true, 0.0],
                "nest": [[1.0, 0.0], 2.0], "str": [1.0, "x", 2.0, 0.0]}"#,
        );
        let out = quantize(&payload, &p).unwrap();
        let floats = |xs: &[f64]| Value::Array(xs.iter().copied().map(Value::Float).collect());

        assert_eq!(out.get("nums").unwrap(), &floats(&[-2.5, 0.0, 0.0, 1.23, 3.14]));
        assert_eq!(
            out.get("mix").unwrap(),
            &Value::Array(vec![Value::Float(1.0), Value::Bool(true), Value::Float(0.0)])
        );
        assert_eq!(
            out.get("nest").unwrap(),
            &Value::Array(vec![floats(&[1.0, 0.0]), Value::Float(2.0)])
        );
        assert_eq!(
            out.get("str").unwrap(),
            &Value::Array(vec![Value::Float(1.0), Value::from("x"), Value::Float(2.0), Value::Float(0.0)])
        );
    }

    #[test]
    fn nested_numeric_arrays_keep_order() {
        let p = policy(PolicySettings { array_reorder: true, ..Default::default() });
        let out = quantize(&json(r#"{"m": [[3.0, 1.0], [2.0, 0.0]]}"#), &p).unwrap();
        assert_eq!(canonical_json_dump(&out).unwrap(), r#"{"m":[[3.0,1.0],[2.0,0.0]]}"#);
    }

    #[test]
    fn mixed_ints_and_floats_sort_by_value() {
        let p = policy(PolicySettings { array_reorder: true, ..Default::default() });
        let out = quantize(&json(r#"{"v": [3, 1.5, -2, 0.25]}"#), &p).unwrap();
        assert_eq!(canonical_json_dump(&out).unwrap(), r#"{"v":[-2,0.25,1.5,3]}"#);
    }

    #[test]
    fn scientific_rounding() {
        let p = policy(PolicySettings {
            fmt: FloatFormat::Scientific,
            precision: 3,
            clip_small: false,
            ..Default::default()
        });
        let out = quantize(&json(r#"{"x": 1234567.0, "y": -0.000012345}"#), &p).unwrap();
        assert_eq!(out.get("x"), Some(&Value::Float(1.23e6)));
        assert_eq!(out.get("y"), Some(&Value::Float(-1.23e-5)));
    }

    #[test]
    fn non_finite_is_a_numeric_error() {
        let p = NumericPolicy::default();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let payload = Value::object([("x", Value::Float(bad))]);
            let err = quantize(&payload, &p).unwrap_err();
            assert!(matches!(err, NumericFieldError::NonFinite { ref at, .. } if at == "$.x"));
        }
    }

    #[test]
    fn overflow_after_rounding_is_reported() {
        let p = policy(PolicySettings { fmt: FloatFormat::Scientific, precision: 1, ..Default::default() });
        let payload = Value::object([("big", Value::Float(f64::MAX))]);
        assert!(matches!(
            quantize(&payload, &p),
            Err(NumericFieldError::Overflow { .. })
        ));
    }

    #[test]
    fn normalized_dump_is_stable_across_spellings() {
        let p = policy(PolicySettings { precision: 4, ..Default::default() });
        let a = json(r#"{"v": [0.000000000001, 1.23456789, -0.0]}"#);
        let b = json(r#"{"v": [1e-12, 1.23456789, -0.0]}"#);
        let dump = normalized_canonical_dump(&a, &p).unwrap();
        assert_eq!(dump, normalized_canonical_dump(&b, &p).unwrap());
        assert_eq!(dump, r#"{"v":[0.0,1.235,0.0]}"#);
    }
}
