//! Sort-key values used to canonicalize row order before persistence.

use core::cmp::Ordering;

use chrono::NaiveDateTime;
use hn_core::NodeId;

/// One cell of a row's sort key. Totally ordered, with nulls last so that
/// rows missing an optional key column sink to the end of their group.
#[derive(Clone, Debug, PartialEq)]
pub enum SortValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Time(NaiveDateTime),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Int(_) | SortValue::Float(_) => 0,
            SortValue::Text(_) => 1,
            SortValue::Time(_) => 2,
            SortValue::Null => 3,
        }
    }

    pub fn order(&self, other: &Self) -> Ordering {
        use SortValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Text(a), Text(b)) => a.cmp(b),
            (Time(a), Time(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Lexicographic comparison of two sort keys of equal length.
pub fn compare_keys(a: &[SortValue], b: &[SortValue]) -> Ordering {
    for (left, right) in a.iter().zip(b) {
        match left.order(right) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }
    Ordering::Equal
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        SortValue::Int(value)
    }
}

impl From<i32> for SortValue {
    fn from(value: i32) -> Self {
        SortValue::Int(i64::from(value))
    }
}

impl From<NodeId> for SortValue {
    fn from(value: NodeId) -> Self {
        SortValue::Int(i64::from(value.get()))
    }
}

impl From<f64> for SortValue {
    fn from(value: f64) -> Self {
        SortValue::Float(value)
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        SortValue::Text(value)
    }
}

impl From<NaiveDateTime> for SortValue {
    fn from(value: NaiveDateTime) -> Self {
        SortValue::Time(value)
    }
}

impl<T: Into<SortValue>> From<Option<T>> for SortValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => SortValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_orders_after_everything() {
        for value in [
            SortValue::Int(9),
            SortValue::Float(-1.0),
            SortValue::Text("z".to_string()),
        ] {
            assert_eq!(value.order(&SortValue::Null), Ordering::Less);
            assert_eq!(SortValue::Null.order(&value), Ordering::Greater);
        }
    }

    #[test]
    fn keys_compare_lexicographically() {
        let a = [SortValue::Int(1), SortValue::Text("b".to_string())];
        let b = [SortValue::Int(1), SortValue::Text("c".to_string())];
        let c = [SortValue::Int(2), SortValue::Text("a".to_string())];
        assert_eq!(compare_keys(&a, &b), Ordering::Less);
        assert_eq!(compare_keys(&b, &c), Ordering::Less);
        assert_eq!(compare_keys(&a, &a), Ordering::Equal);
    }

    #[test]
    fn option_converts_to_null() {
        let none: Option<f64> = None;
        assert_eq!(SortValue::from(none), SortValue::Null);
        assert_eq!(SortValue::from(Some(2.0)), SortValue::Float(2.0));
    }
}
