//! LDIF change record model.

use crate::entry::Entry;
use crate::error::{DirError, DirResult};
use crate::name::{Dn, Rdn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A modification operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModOp {
    /// Add values to an attribute.
    Add,
    /// Delete values from an attribute, or the whole attribute.
    Delete,
    /// Replace an attribute's values wholesale.
    Replace,
}

/// One attribute-group modification within a modify change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    /// The operator.
    pub op: ModOp,
    /// Attribute being modified, normalized to lowercase.
    pub attribute: String,
    /// Values; empty for a whole-attribute delete.
    pub values: Vec<String>,
}

impl Modification {
    /// Creates a modification.
    #[must_use]
    pub fn new(op: ModOp, attribute: &str, values: Vec<String>) -> Self {
        Self {
            op,
            attribute: attribute.trim().to_ascii_lowercase(),
            values,
        }
    }

    /// Applies this modification to an entry in place.
    ///
    /// Deleting values or attributes that are absent is a no-op; the
    /// strictness of the protocol layer is not replicated here so that
    /// reverse changes replay robustly.
    pub fn apply_to(&self, entry: &mut Entry) {
        match self.op {
            ModOp::Add => {
                for value in &self.values {
                    entry.add(&self.attribute, value);
                }
            }
            ModOp::Delete => {
                if self.values.is_empty() {
                    entry.remove_attribute(&self.attribute);
                } else {
                    for value in &self.values {
                        entry.remove_value(&self.attribute, value);
                    }
                }
            }
            ModOp::Replace => {
                entry.replace(&self.attribute, self.values.clone());
            }
        }
    }
}

/// One LDIF change record: a single directory mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LdifChange {
    /// Add a new entry.
    Add {
        /// DN of the new entry.
        dn: Dn,
        /// The entry's attributes.
        entry: Entry,
    },
    /// Delete an entry.
    Delete {
        /// DN of the entry to delete.
        dn: Dn,
    },
    /// Modify an entry's attributes.
    Modify {
        /// DN of the entry to modify.
        dn: Dn,
        /// Modifications, applied in order.
        mods: Vec<Modification>,
    },
    /// Rename and/or move an entry.
    ModifyDn {
        /// DN of the entry before the rename.
        dn: Dn,
        /// The entry's new leaf RDN.
        new_rdn: Rdn,
        /// Whether the old RDN value is removed from the entry.
        delete_old_rdn: bool,
        /// New parent, or `None` to stay under the current parent.
        new_superior: Option<Dn>,
    },
}

impl LdifChange {
    /// Returns the DN the change targets (before any rename).
    #[must_use]
    pub fn dn(&self) -> &Dn {
        match self {
            Self::Add { dn, .. }
            | Self::Delete { dn }
            | Self::Modify { dn, .. }
            | Self::ModifyDn { dn, .. } => dn,
        }
    }

    /// For a rename, computes the DN the entry ends up at.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::InvalidArgument`] when called on a
    /// non-rename change or a rename of the root DSE.
    pub fn renamed_dn(&self) -> DirResult<Dn> {
        let Self::ModifyDn {
            dn,
            new_rdn,
            new_superior,
            ..
        } = self
        else {
            return Err(DirError::invalid_argument(
                "renamed_dn is only defined for modifyDn changes",
            ));
        };
        let parent = match new_superior {
            Some(superior) => superior.clone(),
            None => dn
                .parent()
                .ok_or_else(|| DirError::invalid_argument("cannot rename the root DSE"))?,
        };
        Ok(parent.child(new_rdn.clone()))
    }
}

impl fmt::Display for LdifChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { dn, entry } => {
                writeln!(f, "dn: {dn}")?;
                writeln!(f, "changetype: add")?;
                for (attribute, values) in entry.attributes() {
                    for value in values {
                        writeln!(f, "{attribute}: {value}")?;
                    }
                }
                Ok(())
            }
            Self::Delete { dn } => {
                writeln!(f, "dn: {dn}")?;
                writeln!(f, "changetype: delete")
            }
            Self::Modify { dn, mods } => {
                writeln!(f, "dn: {dn}")?;
                writeln!(f, "changetype: modify")?;
                for m in mods {
                    let op = match m.op {
                        ModOp::Add => "add",
                        ModOp::Delete => "delete",
                        ModOp::Replace => "replace",
                    };
                    writeln!(f, "{op}: {}", m.attribute)?;
                    for value in &m.values {
                        writeln!(f, "{}: {value}", m.attribute)?;
                    }
                    writeln!(f, "-")?;
                }
                Ok(())
            }
            Self::ModifyDn {
                dn,
                new_rdn,
                delete_old_rdn,
                new_superior,
            } => {
                writeln!(f, "dn: {dn}")?;
                writeln!(f, "changetype: modrdn")?;
                writeln!(f, "newrdn: {new_rdn}")?;
                writeln!(f, "deleteoldrdn: {}", u8::from(*delete_old_rdn))?;
                if let Some(superior) = new_superior {
                    writeln!(f, "newsuperior: {superior}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_add_modification() {
        let mut entry = Entry::new();
        Modification::new(ModOp::Add, "mail", vec!["a@example.com".into()]).apply_to(&mut entry);
        assert!(entry.contains("mail", "a@example.com"));
    }

    #[test]
    fn apply_delete_whole_attribute() {
        let mut entry = Entry::new();
        entry.add_all("mail", &["a@example.com", "b@example.com"]);
        Modification::new(ModOp::Delete, "mail", vec![]).apply_to(&mut entry);
        assert!(!entry.has_attribute("mail"));
    }

    #[test]
    fn apply_replace() {
        let mut entry = Entry::new();
        entry.add("cn", "old");
        Modification::new(ModOp::Replace, "cn", vec!["new".into()]).apply_to(&mut entry);
        assert_eq!(entry.get("cn").unwrap(), ["new"]);
    }

    #[test]
    fn renamed_dn_with_and_without_superior() {
        let rename = LdifChange::ModifyDn {
            dn: Dn::parse("cn=old,ou=people").unwrap(),
            new_rdn: Rdn::new("cn", "new"),
            delete_old_rdn: true,
            new_superior: None,
        };
        assert_eq!(
            rename.renamed_dn().unwrap(),
            Dn::parse("cn=new,ou=people").unwrap()
        );

        let relocate = LdifChange::ModifyDn {
            dn: Dn::parse("cn=old,ou=people").unwrap(),
            new_rdn: Rdn::new("cn", "old"),
            delete_old_rdn: false,
            new_superior: Some(Dn::parse("ou=archive").unwrap()),
        };
        assert_eq!(
            relocate.renamed_dn().unwrap(),
            Dn::parse("cn=old,ou=archive").unwrap()
        );
    }

    #[test]
    fn ldif_text_for_modify() {
        let change = LdifChange::Modify {
            dn: Dn::parse("cn=alice,dc=example").unwrap(),
            mods: vec![
                Modification::new(ModOp::Add, "mail", vec!["a@example.com".into()]),
                Modification::new(ModOp::Delete, "description", vec![]),
            ],
        };
        let text = change.to_string();
        assert!(text.starts_with("dn: cn=alice,dc=example\nchangetype: modify\n"));
        assert!(text.contains("add: mail\nmail: a@example.com\n-\n"));
        assert!(text.contains("delete: description\n-\n"));
    }

    #[test]
    fn ldif_text_for_delete() {
        let change = LdifChange::Delete {
            dn: Dn::parse("cn=alice,dc=example").unwrap(),
        };
        assert_eq!(
            change.to_string(),
            "dn: cn=alice,dc=example\nchangetype: delete\n"
        );
    }

    #[test]
    fn serde_round_trip() {
        let change = LdifChange::Modify {
            dn: Dn::parse("cn=alice,dc=example").unwrap(),
            mods: vec![Modification::new(ModOp::Replace, "cn", vec!["x".into()])],
        };
        let json = serde_json::to_string(&change).unwrap();
        let back: LdifChange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, change);
    }
}
