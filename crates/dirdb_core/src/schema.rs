//! Object class name and OID aliasing.

use std::collections::HashMap;

/// Registry mapping object class names to their numeric OIDs.
///
/// Refinement evaluation must treat an object class name and its OID
/// as equivalent (`person` and `2.5.6.6` match the same entries). The
/// registry is an explicit value passed by reference to the evaluators;
/// there is no process-wide schema singleton.
///
/// Unknown identifiers canonicalize to their lowercased spelling, so
/// two unknown names still compare equal to themselves.
#[derive(Debug, Clone, Default)]
pub struct ObjectClassRegistry {
    /// Lowercased name -> OID.
    by_name: HashMap<String, String>,
}

impl ObjectClassRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the common X.500 object classes.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, oid) in [
            ("top", "2.5.6.0"),
            ("country", "2.5.6.2"),
            ("locality", "2.5.6.3"),
            ("organization", "2.5.6.4"),
            ("organizationalUnit", "2.5.6.5"),
            ("person", "2.5.6.6"),
            ("organizationalPerson", "2.5.6.7"),
            ("organizationalRole", "2.5.6.8"),
            ("groupOfNames", "2.5.6.9"),
            ("groupOfUniqueNames", "2.5.6.17"),
            ("subentry", "2.5.17.0"),
            ("inetOrgPerson", "2.16.840.1.113730.3.2.2"),
            ("domain", "0.9.2342.19200300.100.4.13"),
        ] {
            registry.register(name, oid);
        }
        registry
    }

    /// Registers an object class name under an OID.
    pub fn register(&mut self, name: &str, oid: &str) {
        self.by_name
            .insert(name.trim().to_ascii_lowercase(), oid.to_string());
    }

    /// Canonicalizes a name or OID for comparison.
    ///
    /// Known names map to their OID; OIDs and unknown names map to
    /// their lowercased spelling.
    #[must_use]
    pub fn canonical(&self, identifier: &str) -> String {
        let identifier = identifier.trim().to_ascii_lowercase();
        self.by_name
            .get(&identifier)
            .cloned()
            .unwrap_or(identifier)
    }

    /// Returns true if two identifiers name the same object class.
    #[must_use]
    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        self.canonical(a) == self.canonical(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_oid_are_equivalent() {
        let registry = ObjectClassRegistry::with_defaults();
        assert!(registry.equivalent("person", "2.5.6.6"));
        assert!(registry.equivalent("PERSON", "person"));
        assert!(!registry.equivalent("person", "organizationalUnit"));
    }

    #[test]
    fn unknown_names_compare_by_spelling() {
        let registry = ObjectClassRegistry::with_defaults();
        assert!(registry.equivalent("customClass", "CUSTOMCLASS"));
        assert!(!registry.equivalent("customClass", "otherClass"));
    }

    #[test]
    fn register_adds_alias() {
        let mut registry = ObjectClassRegistry::new();
        registry.register("widget", "1.2.3.4");
        assert!(registry.equivalent("widget", "1.2.3.4"));
    }
}
