//! Directory entries and their attribute bags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute type that names an entry's object classes.
pub const OBJECT_CLASS: &str = "objectclass";

/// A directory entry: a bag of multi-valued attributes.
///
/// Attribute types are normalized to lowercase on insertion. Values
/// keep their original case but compare case-insensitively, matching
/// the caseIgnore behavior of the common directory attribute types.
/// Attribute values are a set, not a sequence: they are kept in
/// case-insensitive sorted order so that two entries holding the same
/// values are equal no matter what order the values arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    attributes: BTreeMap<String, Vec<String>>,
}

impl Entry {
    /// Creates an empty entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the entry has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Adds a value to an attribute, creating the attribute if needed.
    ///
    /// Duplicate values (case-insensitive) are not added twice.
    pub fn add(&mut self, attribute: &str, value: &str) {
        let values = self
            .attributes
            .entry(attribute.trim().to_ascii_lowercase())
            .or_default();
        if values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            return;
        }
        let key = value.to_ascii_lowercase();
        let at = values.partition_point(|v| v.to_ascii_lowercase() < key);
        values.insert(at, value.to_string());
    }

    /// Adds several values to an attribute.
    pub fn add_all(&mut self, attribute: &str, values: &[&str]) {
        for value in values {
            self.add(attribute, value);
        }
    }

    /// Replaces an attribute's values wholesale.
    ///
    /// An empty value list removes the attribute.
    pub fn replace(&mut self, attribute: &str, mut values: Vec<String>) {
        let attribute = attribute.trim().to_ascii_lowercase();
        if values.is_empty() {
            self.attributes.remove(&attribute);
        } else {
            values.sort_by_key(|v| v.to_ascii_lowercase());
            values.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
            self.attributes.insert(attribute, values);
        }
    }

    /// Removes a single value from an attribute.
    ///
    /// The attribute itself is removed when its last value goes.
    /// Returns true if a value was removed.
    pub fn remove_value(&mut self, attribute: &str, value: &str) -> bool {
        let attribute = attribute.trim().to_ascii_lowercase();
        let Some(values) = self.attributes.get_mut(&attribute) else {
            return false;
        };
        let before = values.len();
        values.retain(|v| !v.eq_ignore_ascii_case(value));
        let removed = values.len() < before;
        if values.is_empty() {
            self.attributes.remove(&attribute);
        }
        removed
    }

    /// Removes an attribute and all its values.
    ///
    /// Returns the removed values, if the attribute existed.
    pub fn remove_attribute(&mut self, attribute: &str) -> Option<Vec<String>> {
        self.attributes.remove(&attribute.trim().to_ascii_lowercase())
    }

    /// Returns an attribute's values, if present.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&[String]> {
        self.attributes
            .get(&attribute.trim().to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// Returns true if the attribute is present with at least one value.
    #[must_use]
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.get(attribute).is_some()
    }

    /// Returns true if the attribute holds the value (case-insensitive).
    #[must_use]
    pub fn contains(&self, attribute: &str, value: &str) -> bool {
        self.get(attribute)
            .is_some_and(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
    }

    /// Returns the entry's objectClass values.
    #[must_use]
    pub fn object_classes(&self) -> &[String] {
        self.get(OBJECT_CLASS).unwrap_or(&[])
    }

    /// Iterates over `(attribute, values)` pairs in attribute order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_normalizes_attribute_type() {
        let mut entry = Entry::new();
        entry.add("ObjectClass", "person");
        assert!(entry.contains("objectclass", "person"));
        assert_eq!(entry.object_classes(), ["person"]);
    }

    #[test]
    fn duplicate_values_collapse() {
        let mut entry = Entry::new();
        entry.add("cn", "Alice");
        entry.add("cn", "ALICE");
        assert_eq!(entry.get("cn").unwrap().len(), 1);
    }

    #[test]
    fn contains_ignores_value_case() {
        let mut entry = Entry::new();
        entry.add("sn", "Smith");
        assert!(entry.contains("sn", "smith"));
        assert!(!entry.contains("sn", "jones"));
    }

    #[test]
    fn remove_last_value_drops_attribute() {
        let mut entry = Entry::new();
        entry.add("mail", "a@example.com");
        assert!(entry.remove_value("mail", "A@EXAMPLE.COM"));
        assert!(!entry.has_attribute("mail"));
        assert!(!entry.remove_value("mail", "a@example.com"));
    }

    #[test]
    fn replace_with_empty_removes() {
        let mut entry = Entry::new();
        entry.add("description", "first");
        entry.replace("description", vec![]);
        assert!(!entry.has_attribute("description"));
    }

    #[test]
    fn value_order_does_not_affect_equality() {
        let mut forward = Entry::new();
        forward.add("mail", "a@example.com");
        forward.add("mail", "alice@example.com");
        let mut backward = Entry::new();
        backward.add("mail", "alice@example.com");
        backward.add("mail", "a@example.com");
        assert_eq!(forward, backward);
        assert_eq!(
            forward.get("mail").unwrap(),
            ["a@example.com", "alice@example.com"]
        );
    }

    #[test]
    fn replace_canonicalizes_values() {
        let mut entry = Entry::new();
        entry.replace(
            "mail",
            vec![
                "b@example.com".into(),
                "A@example.com".into(),
                "a@example.com".into(),
            ],
        );
        assert_eq!(
            entry.get("mail").unwrap(),
            ["A@example.com", "b@example.com"]
        );
    }

    #[test]
    fn remove_attribute_returns_values() {
        let mut entry = Entry::new();
        entry.add_all("member", &["cn=a", "cn=b"]);
        let removed = entry.remove_attribute("member").unwrap();
        assert_eq!(removed.len(), 2);
        assert!(entry.is_empty());
    }
}
