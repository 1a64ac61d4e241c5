//! Distinguished names.
//!
//! [`Dn`] stores its RDN components **root-first**, so ancestry checks,
//! suffix routing, and subtree chop exclusions are all plain prefix
//! comparisons over the component vector. Parsing and printing use the
//! conventional leaf-first LDAP string form (`cn=alice,ou=people,dc=x`).
//!
//! Names are normalized on construction: attribute types and values
//! are trimmed and lowercased. Full RFC 4514 escaping is owned by the
//! protocol codec; this module handles the backslash escapes needed to
//! round-trip commas and backslashes inside values.

use crate::error::{DirError, DirResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One relative distinguished name component, e.g. `cn=alice`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rdn {
    attribute: String,
    value: String,
}

impl Rdn {
    /// Creates a normalized RDN from an attribute type and value.
    #[must_use]
    pub fn new(attribute: &str, value: &str) -> Self {
        Self {
            attribute: attribute.trim().to_ascii_lowercase(),
            value: value.trim().to_ascii_lowercase(),
        }
    }

    /// Returns the attribute type.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Returns the attribute value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, escape(&self.value))
    }
}

/// A distinguished name: the hierarchical path of a directory entry.
///
/// The empty DN is the root DSE.
///
/// # Example
///
/// ```rust
/// use dirdb_core::Dn;
///
/// let dn = Dn::parse("cn=alice,ou=people,dc=example,dc=com").unwrap();
/// let base = Dn::parse("dc=example,dc=com").unwrap();
/// assert!(dn.is_descendant_or_self(&base));
/// assert_eq!(dn.relative_to(&base).unwrap().depth(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dn {
    /// Components in root-first order.
    rdns: Vec<Rdn>,
}

impl Dn {
    /// Returns the empty DN (the root DSE).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a DN from components in root-first order.
    #[must_use]
    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        Self { rdns }
    }

    /// Parses a DN from its leaf-first LDAP string form.
    ///
    /// An empty or all-whitespace string parses to the root DSE.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::InvalidDn`] when a component is missing an
    /// `=` separator, has an empty type or value, or the string ends
    /// in a dangling escape.
    pub fn parse(input: &str) -> DirResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::root());
        }

        let mut rdns = Vec::new();
        for component in split_components(input)? {
            let component = component.trim();
            let Some((attribute, value)) = component.split_once('=') else {
                return Err(DirError::invalid_dn(format!(
                    "component {component:?} has no '=' separator"
                )));
            };
            let rdn = Rdn::new(attribute, value);
            if rdn.attribute.is_empty() || rdn.value.is_empty() {
                return Err(DirError::invalid_dn(format!(
                    "component {component:?} has an empty type or value"
                )));
            }
            rdns.push(rdn);
        }

        // String form is leaf-first; storage is root-first.
        rdns.reverse();
        Ok(Self { rdns })
    }

    /// Returns true if this is the root DSE.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Returns the number of RDN components.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.rdns.len()
    }

    /// Returns the components in root-first order.
    #[must_use]
    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// Returns the leaf-most RDN, if any.
    #[must_use]
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.last()
    }

    /// Returns the parent DN, or `None` for the root DSE.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.rdns.is_empty() {
            return None;
        }
        Some(Self {
            rdns: self.rdns[..self.rdns.len() - 1].to_vec(),
        })
    }

    /// Returns true if `self` is `ancestor` or lies below it.
    #[must_use]
    pub fn is_descendant_or_self(&self, ancestor: &Self) -> bool {
        self.rdns.len() >= ancestor.rdns.len() && self.rdns[..ancestor.rdns.len()] == ancestor.rdns
    }

    /// Returns the path of `self` below `base`, or `None` when `self`
    /// is not a descendant-or-self of `base`.
    ///
    /// The result is empty when `self` equals `base`.
    #[must_use]
    pub fn relative_to(&self, base: &Self) -> Option<Self> {
        if !self.is_descendant_or_self(base) {
            return None;
        }
        Some(Self {
            rdns: self.rdns[base.rdns.len()..].to_vec(),
        })
    }

    /// Appends a relative path below `self`.
    #[must_use]
    pub fn descend(&self, relative: &Self) -> Self {
        let mut rdns = self.rdns.clone();
        rdns.extend(relative.rdns.iter().cloned());
        Self { rdns }
    }

    /// Returns the child of `self` named by `rdn`.
    #[must_use]
    pub fn child(&self, rdn: Rdn) -> Self {
        let mut rdns = self.rdns.clone();
        rdns.push(rdn);
        Self { rdns }
    }

    /// Returns the normalized string form, suitable as a table key.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().rev().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rdn}")?;
        }
        Ok(())
    }
}

impl Serialize for Dn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(D::Error::custom)
    }
}

impl Serialize for Rdn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rdn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let dn = Dn::parse(&text).map_err(D::Error::custom)?;
        match dn.rdns.as_slice() {
            [rdn] => Ok(rdn.clone()),
            _ => Err(D::Error::custom(format!("expected a single RDN: {text:?}"))),
        }
    }
}

/// Splits on unescaped commas, resolving `\,` and `\\` escapes.
fn split_components(input: &str) -> DirResult<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in input.chars() {
        if escaped {
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    if escaped {
        return Err(DirError::invalid_dn("dangling escape at end of DN"));
    }
    parts.push(current);
    Ok(parts)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == ',' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
