//! # Partial Updates
//!
//! Update requests are sparse: callers send only the fields they want to
//! change. Each updatable record has a `…Patch` companion where every field
//! is wrapped in `Option`.
//!
//! ## Merge Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stored row (read inside the update transaction)                        │
//! │  ┌──────────────┬──────────────┬──────────────┐                         │
//! │  │ given_by     │ description  │ date         │                         │
//! │  │ "Ministry"   │ "old text"   │ 2019-05-01   │                         │
//! │  └──────────────┴──────────────┴──────────────┘                         │
//! │                                                                         │
//! │  patch         None           Some("new text")  None                    │
//! │                  │                 │              │                     │
//! │                  ▼                 ▼              ▼                     │
//! │  merged        "Ministry"     "new text"     2019-05-01                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `None` keeps the stored value. `Some(v)` overwrites it, including
//! `Some(String::new())`, which clears a text field. Nullable columns use
//! `Option<Option<T>>` so `Some(None)` can clear them.

use serde::{Deserialize, Deserializer};

use crate::validation::{validate_id, validate_language_code, ValidationResult};

/// A partial update for a stored record of type [`Patch::Target`].
pub trait Patch {
    /// The record this patch applies to.
    type Target;

    /// Identifier of the row to update.
    fn id(&self) -> i64;

    /// Replacement language code, if the patch moves the record to another
    /// language variant.
    fn language_code(&self) -> Option<&str> {
        None
    }

    /// Checks the patch before any store call: `id > 0` and, when present,
    /// a supported language code.
    fn validate(&self) -> ValidationResult<()> {
        validate_id("id", self.id())?;
        if let Some(code) = self.language_code() {
            validate_language_code(code)?;
        }
        Ok(())
    }

    /// Overwrites the provided fields of `stored`, leaving the rest untouched.
    fn merge_into(self, stored: &mut Self::Target);
}

/// Overwrites `slot` when a value was provided.
#[inline]
pub fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Deserializes a nullable patch field so that an absent key stays `None`
/// while an explicit `null` becomes `Some(None)`.
///
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_merge_keeps_stored_value_on_none() {
        let mut stored = "Ministry".to_string();
        merge(&mut stored, None);
        assert_eq!(stored, "Ministry");

        merge(&mut stored, Some(String::new()));
        assert_eq!(stored, "");
    }

    #[derive(Debug, Deserialize)]
    struct Nullable {
        #[serde(default, deserialize_with = "double_option")]
        date_end: Option<Option<u32>>,
    }

    #[test]
    fn test_double_option_distinguishes_absent_from_null() {
        let absent: Nullable = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.date_end, None);

        let null: Nullable = serde_json::from_str(r#"{"date_end": null}"#).unwrap();
        assert_eq!(null.date_end, Some(None));

        let set: Nullable = serde_json::from_str(r#"{"date_end": 3}"#).unwrap();
        assert_eq!(set.date_end, Some(Some(3)));
    }
}
