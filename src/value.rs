//! Dynamic key values and the built-in comparers over them.
//!
//! `Value` is the closed sum of key kinds the default dispatch
//! understands: integers, floats, text, booleans, and two composite
//! shapes (records and sequences). `Opaque` stands in for identity-only
//! values (the source language's functions and symbols): it compares by
//! identity token and has no structural hash, so hashing it reports
//! `UnsupportedKeyKind` instead of silently coercing.
//!
//! Hashing rules:
//! - integers hash to themselves, truncated to unsigned 32 bits;
//! - a finite float with no fractional part hashes exactly like the
//!   equal integer (so `5` and `5.0` land in the same bucket); other
//!   floats fold their raw 64-bit representation into 32 bits via
//!   multiply-add over the two halves;
//! - text uses a polynomial rolling hash with multiplier 31 over code
//!   points;
//! - records fold their fields with XOR so field order does not matter
//!   (record equality is order-insensitive, and equal keys must hash
//!   equal); sequences fold positionally because sequence equality is
//!   positional.
//!
//! Structural equality recurses without a cycle guard. `Value` is an
//! owned tree, so cyclic input is unrepresentable here; the guard the
//! original system lacked is unnecessary rather than omitted.

use core::fmt;

use crate::comparer::{Comparer, KeyError};

/// A dynamically typed key value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// Named fields in declaration order.
    Record(Vec<(String, Value)>),
    /// An ordered sequence of values.
    Seq(Vec<Value>),
    /// Identity-only value; carries an identity token, has no
    /// structural hash.
    Opaque(u64),
}

/// The closed set of key kinds automatic dispatch classifies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Integer,
    Float,
    Text,
    Boolean,
    Composite,
    Unsupported,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KeyKind::Integer => "integer",
            KeyKind::Float => "float",
            KeyKind::Text => "text",
            KeyKind::Boolean => "boolean",
            KeyKind::Composite => "composite",
            KeyKind::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

impl Value {
    /// Classify this value into its key kind.
    pub fn kind(&self) -> KeyKind {
        match self {
            Value::Int(_) => KeyKind::Integer,
            Value::Float(_) => KeyKind::Float,
            Value::Text(_) => KeyKind::Text,
            Value::Bool(_) => KeyKind::Boolean,
            Value::Record(_) | Value::Seq(_) => KeyKind::Composite,
            Value::Opaque(_) => KeyKind::Unsupported,
        }
    }
}

const TEXT_MULTIPLIER: u32 = 31;
const BOOL_TRUE_HASH: u32 = 1231;
const BOOL_FALSE_HASH: u32 = 1237;

/// Integer hash: the value truncated to unsigned 32 bits.
pub fn hash_int(v: i64) -> u32 {
    v as u32
}

/// Float hash. Integral finite floats defer to [`hash_int`] so equal
/// numeric keys hash equal across `Int`/`Float`; everything else folds
/// the raw bit pattern's two 32-bit halves with multiply-add.
pub fn hash_float(v: f64) -> u32 {
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        return hash_int(v as i64);
    }
    let bits = v.to_bits();
    let lo = bits as u32;
    let hi = (bits >> 32) as u32;
    lo.wrapping_mul(TEXT_MULTIPLIER).wrapping_add(hi)
}

/// Polynomial rolling hash over code points, multiplier 31.
pub fn hash_text(s: &str) -> u32 {
    let mut h: u32 = 0;
    for c in s.chars() {
        h = h.wrapping_mul(TEXT_MULTIPLIER).wrapping_add(c as u32);
    }
    h
}

pub fn hash_bool(b: bool) -> u32 {
    if b {
        BOOL_TRUE_HASH
    } else {
        BOOL_FALSE_HASH
    }
}

/// Structural hash of any hashable value; recurses into composites.
pub fn structural_hash(v: &Value) -> Result<u32, KeyError> {
    match v {
        Value::Int(i) => Ok(hash_int(*i)),
        Value::Float(f) => Ok(hash_float(*f)),
        Value::Text(s) => Ok(hash_text(s)),
        Value::Bool(b) => Ok(hash_bool(*b)),
        Value::Record(fields) => {
            // XOR fold: field order must not affect the hash because
            // record equality looks fields up by name, not position.
            let mut h: u32 = 0x9747_b28c;
            for (name, value) in fields {
                let field = hash_text(name)
                    .wrapping_mul(TEXT_MULTIPLIER)
                    .wrapping_add(structural_hash(value)?);
                h ^= field;
            }
            Ok(h)
        }
        Value::Seq(items) => {
            let mut h: u32 = 1;
            for item in items {
                h = h
                    .wrapping_mul(TEXT_MULTIPLIER)
                    .wrapping_add(structural_hash(item)?);
            }
            Ok(h)
        }
        Value::Opaque(_) => Err(KeyError::UnsupportedKeyKind(KeyKind::Unsupported)),
    }
}

/// Structural equality. The first operand is the stored key.
///
/// Record comparison iterates only the first operand's fields: a field
/// present only on the second operand is never examined, so a record can
/// compare equal to a wider one. Deliberate; see DESIGN.md before
/// changing this.
pub fn structural_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        (Value::Text(x), Value::Text(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Opaque(x), Value::Opaque(y)) => x == y,
        (Value::Record(xs), Value::Record(ys)) => xs.iter().all(|(name, x)| {
            ys.iter()
                .find(|(other, _)| other == name)
                .map(|(_, y)| structural_eq(x, y))
                .unwrap_or(false)
        }),
        (Value::Seq(xs), Value::Seq(ys)) => {
            // Element-wise, and both sequences must end together.
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| structural_eq(x, y))
        }
        _ => false,
    }
}

/// Comparer for numeric keys (`Int` and `Float`). Hashing any other
/// kind is undefined and reports `InvalidHash`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumberComparer;

impl Comparer<Value> for NumberComparer {
    fn hash(&self, key: &Value) -> Result<u32, KeyError> {
        match key {
            Value::Int(i) => Ok(hash_int(*i)),
            Value::Float(f) => Ok(hash_float(*f)),
            _ => Err(KeyError::InvalidHash),
        }
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        structural_eq(a, b)
    }
}

/// Comparer for text keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextComparer;

impl Comparer<Value> for TextComparer {
    fn hash(&self, key: &Value) -> Result<u32, KeyError> {
        match key {
            Value::Text(s) => Ok(hash_text(s)),
            _ => Err(KeyError::InvalidHash),
        }
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        structural_eq(a, b)
    }
}

/// Comparer for boolean keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolComparer;

impl Comparer<Value> for BoolComparer {
    fn hash(&self, key: &Value) -> Result<u32, KeyError> {
        match key {
            Value::Bool(b) => Ok(hash_bool(*b)),
            _ => Err(KeyError::InvalidHash),
        }
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        structural_eq(a, b)
    }
}

/// Comparer for composite keys (records and sequences); recursively
/// hashes and compares contents instead of using identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralComparer;

impl Comparer<Value> for StructuralComparer {
    fn hash(&self, key: &Value) -> Result<u32, KeyError> {
        match key {
            Value::Record(_) | Value::Seq(_) => structural_hash(key),
            Value::Opaque(_) => Err(KeyError::UnsupportedKeyKind(KeyKind::Unsupported)),
            _ => Err(KeyError::InvalidHash),
        }
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        structural_eq(a, b)
    }
}

/// The default comparer for `Value` keys: a match over the closed
/// [`KeyKind`] set replaces the source's `typeof`-based dispatch, with
/// the unsupported kind reported explicitly instead of thrown from a
/// fallthrough.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueComparer;

impl Comparer<Value> for ValueComparer {
    fn hash(&self, key: &Value) -> Result<u32, KeyError> {
        structural_hash(key)
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        structural_eq(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: integer hashes are the value masked to 32 bits, so
    /// equal integers always collide with themselves and nothing is
    /// lost below 2^32.
    #[test]
    fn int_hash_truncates() {
        assert_eq!(hash_int(0), 0);
        assert_eq!(hash_int(42), 42);
        assert_eq!(hash_int(-1), u32::MAX);
        assert_eq!(hash_int(1 << 40), 0);
        assert_eq!(hash_int((1 << 32) + 7), 7);
    }

    /// Invariant: an integral float hashes exactly like the equal
    /// integer; fractional floats still hash deterministically.
    #[test]
    fn float_hash_matches_equal_int() {
        assert_eq!(hash_float(5.0), hash_int(5));
        assert_eq!(hash_float(-3.0), hash_int(-3));
        assert_eq!(hash_float(2.5), hash_float(2.5));
        assert_ne!(hash_float(2.5), hash_float(2.25));
    }

    /// Invariant: text hashing is the fixed 31-multiplier polynomial.
    #[test]
    fn text_hash_polynomial() {
        assert_eq!(hash_text(""), 0);
        assert_eq!(hash_text("a"), 'a' as u32);
        assert_eq!(hash_text("ab"), ('a' as u32) * 31 + 'b' as u32);
        assert_ne!(hash_text("ab"), hash_text("ba"));
    }

    /// Invariant: record hash ignores field order, matching record
    /// equality, which looks fields up by name.
    #[test]
    fn record_hash_is_order_insensitive() {
        let a = Value::Record(vec![
            ("x".into(), Value::Int(1)),
            ("y".into(), Value::Int(2)),
        ]);
        let b = Value::Record(vec![
            ("y".into(), Value::Int(2)),
            ("x".into(), Value::Int(1)),
        ]);
        assert_eq!(structural_hash(&a).unwrap(), structural_hash(&b).unwrap());
        assert!(structural_eq(&a, &b));
        assert!(structural_eq(&b, &a));
    }

    /// Invariant: sequence hash and equality are positional; a
    /// reordered sequence is a different key.
    #[test]
    fn seq_hash_is_positional() {
        let a = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::Seq(vec![Value::Int(2), Value::Int(1)]);
        assert_ne!(structural_hash(&a).unwrap(), structural_hash(&b).unwrap());
        assert!(!structural_eq(&a, &b));
    }

    /// Invariant: sequences of different lengths never compare equal,
    /// even when the shorter is a prefix of the longer.
    #[test]
    fn seq_prefix_is_not_equal() {
        let short = Value::Seq(vec![Value::Int(1)]);
        let long = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        assert!(!structural_eq(&short, &long));
        assert!(!structural_eq(&long, &short));
    }

    /// Invariant: typed comparers report `InvalidHash` outside their
    /// kind instead of hashing a coerced representation.
    #[test]
    fn typed_comparer_rejects_foreign_kind() {
        assert_eq!(
            NumberComparer.hash(&Value::Text("1".into())),
            Err(KeyError::InvalidHash)
        );
        assert_eq!(
            TextComparer.hash(&Value::Int(1)),
            Err(KeyError::InvalidHash)
        );
        assert_eq!(
            BoolComparer.hash(&Value::Int(0)),
            Err(KeyError::InvalidHash)
        );
        assert_eq!(
            StructuralComparer.hash(&Value::Int(0)),
            Err(KeyError::InvalidHash)
        );
    }

    /// Invariant: opaque values are unsupported everywhere hashing is
    /// attempted, including nested inside a composite.
    #[test]
    fn opaque_is_unsupported() {
        assert_eq!(
            ValueComparer.hash(&Value::Opaque(1)),
            Err(KeyError::UnsupportedKeyKind(KeyKind::Unsupported))
        );
        let nested = Value::Seq(vec![Value::Int(1), Value::Opaque(9)]);
        assert_eq!(
            ValueComparer.hash(&nested),
            Err(KeyError::UnsupportedKeyKind(KeyKind::Unsupported))
        );
        // Identity equality still works without a hash.
        assert!(structural_eq(&Value::Opaque(9), &Value::Opaque(9)));
        assert!(!structural_eq(&Value::Opaque(9), &Value::Opaque(10)));
    }

    /// Invariant: cross-kind numeric equality holds and the hashes
    /// agree, preserving the hash/equals contract.
    #[test]
    fn numeric_cross_kind_contract() {
        let i = Value::Int(7);
        let f = Value::Float(7.0);
        assert!(structural_eq(&i, &f));
        assert!(structural_eq(&f, &i));
        assert_eq!(
            ValueComparer.hash(&i).unwrap(),
            ValueComparer.hash(&f).unwrap()
        );
    }
}
