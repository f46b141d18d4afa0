// src/utils/patch.rs

use serde::{Deserialize, Deserializer};

/// A field of a partial-update payload.
///
/// `Missing` when the key is absent, `Null` for an explicit `null`,
/// `Value` otherwise. Use with `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Missing
    }
}

impl<T> Field<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }

    /// `None` when missing, `Some(None)` when null.
    pub fn into_update(self) -> Option<Option<T>> {
        match self {
            Field::Missing => None,
            Field::Null => Some(None),
            Field::Value(v) => Some(Some(v)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Missing => Field::Missing,
            Field::Null => Field::Null,
            Field::Value(v) => Field::Value(f(v)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Field::Value(v),
            None => Field::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default)]
        max_students: Field<i64>,
    }

    #[test]
    fn distinguishes_missing_null_and_value() {
        let p: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(p.max_students, Field::Missing);

        let p: Patch = serde_json::from_str(r#"{"max_students": null}"#).unwrap();
        assert_eq!(p.max_students, Field::Null);

        let p: Patch = serde_json::from_str(r#"{"max_students": 0}"#).unwrap();
        assert_eq!(p.max_students.into_update(), Some(Some(0)));
    }

    #[test]
    fn map_only_touches_values() {
        assert_eq!(Field::Value(2).map(|n| n * 10), Field::Value(20));
        assert_eq!(Field::<i64>::Null.map(|n| n * 10), Field::Null);
        assert_eq!(Field::<i64>::Missing.map(|n| n * 10), Field::Missing);
    }
}
