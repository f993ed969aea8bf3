//! Three-state field for partial updates.
//!
//! A field missing from the JSON body is `Absent` and leaves the column
//! untouched, an explicit `null` is `Null` and clears it, anything else is
//! `Value`. Structs using it must mark the field `#[serde(default)]`.

use sea_orm::ActiveValue::{self, Set};
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Value for a NOT NULL column. Clearing it is rejected.
    pub fn into_required(self, field: &str) -> Result<Option<T>, ApiError> {
        match self {
            Patch::Absent => Ok(None),
            Patch::Null => Err(ApiError::Validation(format!("{field} cannot be null"))),
            Patch::Value(v) => Ok(Some(v)),
        }
    }

    /// Value for a nullable column: `Some(None)` clears it.
    pub fn into_nullable(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }
}

impl<T> Patch<T>
where
    T: Into<sea_orm::Value>,
{
    /// Write a required field into an active model slot.
    pub fn apply_required(self, field: &str, slot: &mut ActiveValue<T>) -> Result<(), ApiError> {
        if let Some(v) = self.into_required(field)? {
            *slot = Set(v);
        }
        Ok(())
    }
}

impl<T> Patch<T>
where
    Option<T>: Into<sea_orm::Value>,
{
    /// Write a nullable field into an active model slot.
    pub fn apply_nullable(self, slot: &mut ActiveValue<Option<T>>) {
        if let Some(v) = self.into_nullable() {
            *slot = Set(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Body {
        #[serde(default)]
        title: Patch<String>,
        #[serde(default)]
        bio: Patch<String>,
        #[serde(default)]
        credit_score: Patch<i32>,
    }

    #[test]
    fn test_three_states() {
        let body: Body = serde_json::from_str(r#"{"title": "Loft", "bio": null}"#).unwrap();
        assert_eq!(body.title, Patch::Value("Loft".to_string()));
        assert_eq!(body.bio, Patch::Null);
        assert_eq!(body.credit_score, Patch::Absent);
    }

    #[test]
    fn test_required_field_cannot_be_cleared() {
        let err = Patch::<String>::Null.into_required("title").unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("title")));
        assert_eq!(Patch::<String>::Absent.into_required("title").unwrap(), None);
    }

    #[test]
    fn test_apply_leaves_absent_fields_untouched() {
        let mut slot: ActiveValue<Option<String>> = ActiveValue::Unchanged(Some("old".into()));
        Patch::Absent.apply_nullable(&mut slot);
        assert_eq!(slot, ActiveValue::Unchanged(Some("old".to_string())));

        Patch::Null.apply_nullable(&mut slot);
        assert_eq!(slot, Set(None));

        let mut score: ActiveValue<i32> = ActiveValue::Unchanged(600);
        Patch::Value(720).apply_required("creditScore", &mut score).unwrap();
        assert_eq!(score, Set(720));
    }
}
