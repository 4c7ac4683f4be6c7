// Cell values and value IDs shared by records, filters and summaries

use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell of the dataset, or the ID of a selectable value on a chart.
///
/// Numbers and text never compare equal to each other, so IDs that arrive as
/// digit-only text must be coerced with [`Value::coerce_id`] before they are
/// used for set membership.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Apply the ID coercion rule: text made only of ASCII digits becomes a number.
    pub fn coerce_id(self) -> Value {
        match self {
            Value::Text(s) if is_digit_id(&s) => match s.parse::<f64>() {
                Ok(n) => Value::Number(n),
                Err(_) => Value::Text(s),
            },
            other => other,
        }
    }

    /// Borrowing variant of [`Value::coerce_id`]; only allocates for digit-only text.
    pub fn coerced(&self) -> Cow<'_, Value> {
        match self {
            Value::Text(s) if is_digit_id(s) => Cow::Owned(self.clone().coerce_id()),
            _ => Cow::Borrowed(self),
        }
    }

    /// Parse a raw ID as typed by a user or found in a query string.
    pub fn from_id_str(raw: &str) -> Value {
        Value::Text(raw.to_string()).coerce_id()
    }

    /// Parse a raw data cell: finite numbers become numbers, everything else text.
    pub fn from_cell(raw: &str) -> Value {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() && looks_numeric(trimmed) => Value::Number(n),
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Numeric reading of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    fn normalized_bits(n: f64) -> u64 {
        if n == 0.0 {
            0.0f64.to_bits()
        } else if n.is_nan() {
            f64::NAN.to_bits()
        } else {
            n.to_bits()
        }
    }
}

fn is_digit_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// Rust's f64 parser also accepts "inf" and "NaN"; data cells only count as
// numbers when they are written with digits.
fn looks_numeric(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                Value::normalized_bits(*a) == Value::normalized_bits(*b)
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Number(n) => {
                0u8.hash(state);
                Value::normalized_bits(*n).hash(state);
            }
            Value::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(_), Value::Number(_)) if self == other => Ordering::Equal,
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

// Whole numbers serialise as integers so IDs round-trip as `2020`, not `2020.0`.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_digit_text_coerces_to_number() {
        assert_eq!(Value::from("123").coerce_id(), Value::Number(123.0));
        assert_eq!(Value::from("12a").coerce_id(), Value::from("12a"));
        assert_eq!(Value::from("-5").coerce_id(), Value::from("-5"));
        assert_eq!(Value::from("").coerce_id(), Value::from(""));
    }

    #[test]
    fn test_numbers_and_text_never_equal() {
        assert_ne!(Value::from(5), Value::from("5"));
        assert_eq!(*Value::from("5").coerced(), Value::from(5));
    }

    #[test]
    fn test_set_membership() {
        let set: HashSet<Value> = [Value::from(0.0), Value::from("Other")].into_iter().collect();
        assert!(set.contains(&Value::from(-0.0)));
        assert!(set.contains(&Value::from("Other")));
        assert!(!set.contains(&Value::from("other")));
    }

    #[test]
    fn test_ordering_numbers_before_text() {
        let mut values = vec![Value::from("B"), Value::from(10), Value::from("A"), Value::from(2)];
        values.sort();
        assert_eq!(
            values,
            vec![Value::from(2), Value::from(10), Value::from("A"), Value::from("B")]
        );
    }

    #[test]
    fn test_from_cell() {
        assert_eq!(Value::from_cell("42"), Value::from(42));
        assert_eq!(Value::from_cell(" 1.5 "), Value::from(1.5));
        assert_eq!(Value::from_cell("inf"), Value::from("inf"));
        assert_eq!(Value::from_cell("Kenya"), Value::from("Kenya"));
    }

    #[test]
    fn test_display_and_serialize_whole_numbers() {
        assert_eq!(Value::from(2020).to_string(), "2020");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(serde_json::to_string(&Value::from(2020)).unwrap(), "2020");
        assert_eq!(serde_json::to_string(&Value::from("x")).unwrap(), "\"x\"");
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[2020, "Other", 1.5]"#).unwrap();
        assert_eq!(values, vec![Value::from(2020), Value::from("Other"), Value::from(1.5)]);
    }
}
