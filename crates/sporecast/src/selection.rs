//! User selections.
//!
//! A [`Selections`] maps attribute names to the chosen category code. It is
//! built fresh for every prediction request. An empty or whitespace-only
//! value is the form placeholder and counts as "not selected"; so is a JSON
//! `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::schema::AttributeSchema;

/// Selection progress for a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    /// Some attributes still lack a selection (schema order).
    AwaitingSelections { missing: Vec<&'static str> },
    /// Every attribute has a selection; prediction may run.
    Complete,
}

impl SelectionState {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Attribute → code mapping entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selections {
    values: BTreeMap<String, String>,
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the code for an attribute. The value is trimmed; an empty value
    /// clears the selection.
    pub fn select(&mut self, attribute: impl Into<String>, code: impl AsRef<str>) -> &mut Self {
        let attribute = attribute.into();
        let code = code.as_ref().trim();
        if code.is_empty() {
            self.values.remove(&attribute);
        } else {
            self.values.insert(attribute, code.to_string());
        }
        self
    }

    /// Builder-style [`select`](Self::select).
    pub fn with(mut self, attribute: impl Into<String>, code: impl AsRef<str>) -> Self {
        self.select(attribute, code);
        self
    }

    /// Remove the selection for an attribute.
    pub fn clear(&mut self, attribute: &str) -> Option<String> {
        self.values.remove(attribute)
    }

    /// Selected code for an attribute, ignoring placeholder values.
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.values
            .get(attribute)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Number of non-placeholder selections.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-placeholder `(attribute, code)` pairs, sorted by attribute.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str(), v.trim()))
            .filter(|(_, v)| !v.is_empty())
    }

    /// Schema attributes without a selection, in schema order.
    pub fn missing(&self, schema: &AttributeSchema) -> Vec<&'static str> {
        schema.names().filter(|name| self.get(name).is_none()).collect()
    }

    /// Current state relative to `schema`.
    pub fn state(&self, schema: &AttributeSchema) -> SelectionState {
        let missing = self.missing(schema);
        if missing.is_empty() {
            SelectionState::Complete
        } else {
            SelectionState::AwaitingSelections { missing }
        }
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for Selections {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut selections = Self::new();
        for (k, v) in iter {
            selections.select(k, v);
        }
        selections
    }
}

impl<'de> Deserialize<'de> for Selections {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Option<String>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(attribute, code)| code.map(|code| (attribute, code)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> &'static AttributeSchema {
        AttributeSchema::mushroom()
    }

    #[test]
    fn empty_selection_is_awaiting_everything() {
        let state = Selections::new().state(schema());
        match state {
            SelectionState::AwaitingSelections { missing } => {
                assert_eq!(missing.len(), schema().len());
                assert_eq!(missing[0], "cap-shape");
            }
            SelectionState::Complete => panic!("expected awaiting"),
        }
    }

    #[test]
    fn placeholder_counts_as_missing() {
        let sel = Selections::from_iter([("odor", "  "), ("habitat", "d")]);
        assert_eq!(sel.get("odor"), None);
        assert_eq!(sel.get("habitat"), Some("d"));
        assert!(sel.missing(schema()).contains(&"odor"));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn filling_last_attribute_completes() {
        let mut sel: Selections = schema()
            .attributes()
            .iter()
            .map(|a| (a.name, a.categories[0].code))
            .collect();
        sel.clear("habitat");
        assert_eq!(
            sel.state(schema()),
            SelectionState::AwaitingSelections {
                missing: vec!["habitat"]
            }
        );
        sel.select("habitat", "d");
        assert!(sel.state(schema()).is_complete());
    }

    #[test]
    fn select_empty_clears() {
        let mut sel = Selections::new().with("odor", "f");
        sel.select("odor", "");
        assert!(sel.is_empty());
    }

    #[test]
    fn deserializes_from_plain_map() {
        let sel: Selections = serde_json::from_str(r#"{"odor":"f","habitat":""}"#).unwrap();
        assert_eq!(sel.get("odor"), Some("f"));
        assert_eq!(sel.get("habitat"), None);
    }

    #[test]
    fn null_counts_as_missing() {
        let sel: Selections = serde_json::from_str(r#"{"odor":" f ","habitat":null}"#).unwrap();
        assert_eq!(sel.get("odor"), Some("f"));
        assert_eq!(sel.len(), 1);
        assert!(sel.missing(schema()).contains(&"habitat"));
    }

    #[test]
    fn rejects_non_string_codes() {
        assert!(serde_json::from_str::<Selections>(r#"{"odor":1}"#).is_err());
    }
}
