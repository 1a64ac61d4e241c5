//! Search filter expression trees.
//!
//! [`FilterNode`] is a closed enum over every node kind the optimizer
//! and evaluators understand, so adding a kind forces every `match`
//! over filters to be revisited.

use crate::name::Dn;

/// Search scope for a scope node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// The base entry only.
    Object,
    /// Immediate children of the base entry.
    OneLevel,
    /// The base entry and everything below it.
    Subtree,
}

/// The assertion kind of a leaf node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionKind {
    /// Exact value match.
    Equality,
    /// Attribute presence.
    Presence,
    /// Substring match.
    Substring,
    /// Value greater than or equal to the asserted value.
    GreaterEq,
    /// Value less than or equal to the asserted value.
    LessEq,
    /// Approximate match (evaluated as equality).
    Approximate,
    /// Extensible match rule.
    Extensible,
}

impl AssertionKind {
    /// Returns true if this kind asserts against a concrete value.
    ///
    /// Presence is the one kind that carries no value.
    #[must_use]
    pub fn requires_value(self) -> bool {
        !matches!(self, Self::Presence)
    }
}

/// One node of a search filter expression tree.
///
/// `Not` carries a child vector rather than a single box so that a
/// tree decoded from the wire can be validated explicitly: evaluators
/// reject zero or multiple children with an invalid-argument error
/// instead of indexing blindly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    /// A leaf assertion on one attribute.
    Leaf {
        /// Assertion kind.
        kind: AssertionKind,
        /// Attribute type, normalized to lowercase.
        attribute: String,
        /// Asserted value, absent for presence assertions.
        value: Option<String>,
    },
    /// Conjunction: all children must match.
    And(Vec<FilterNode>),
    /// Disjunction: any child may match.
    Or(Vec<FilterNode>),
    /// Negation: exactly one child, inverted.
    Not(Vec<FilterNode>),
    /// A search scope constraint against a base entry.
    Scope {
        /// Base entry of the search.
        base: Dn,
        /// Scope relative to the base.
        scope: SearchScope,
    },
    /// An opaque assertion supplied by the caller; never estimated.
    Assertion {
        /// Human-readable description, for diagnostics only.
        description: String,
    },
}

impl FilterNode {
    /// Creates an equality leaf.
    #[must_use]
    pub fn eq(attribute: &str, value: &str) -> Self {
        Self::leaf(AssertionKind::Equality, attribute, Some(value))
    }

    /// Creates a presence leaf.
    #[must_use]
    pub fn present(attribute: &str) -> Self {
        Self::leaf(AssertionKind::Presence, attribute, None)
    }

    /// Creates a greater-or-equal leaf.
    #[must_use]
    pub fn ge(attribute: &str, value: &str) -> Self {
        Self::leaf(AssertionKind::GreaterEq, attribute, Some(value))
    }

    /// Creates a less-or-equal leaf.
    #[must_use]
    pub fn le(attribute: &str, value: &str) -> Self {
        Self::leaf(AssertionKind::LessEq, attribute, Some(value))
    }

    /// Creates a substring leaf.
    #[must_use]
    pub fn substring(attribute: &str, pattern: &str) -> Self {
        Self::leaf(AssertionKind::Substring, attribute, Some(pattern))
    }

    /// Creates an approximate-match leaf.
    #[must_use]
    pub fn approx(attribute: &str, value: &str) -> Self {
        Self::leaf(AssertionKind::Approximate, attribute, Some(value))
    }

    /// Creates a leaf of an arbitrary kind.
    #[must_use]
    pub fn leaf(kind: AssertionKind, attribute: &str, value: Option<&str>) -> Self {
        Self::Leaf {
            kind,
            attribute: attribute.trim().to_ascii_lowercase(),
            value: value.map(|v| v.trim().to_string()),
        }
    }

    /// Creates a conjunction.
    #[must_use]
    pub fn and(children: Vec<FilterNode>) -> Self {
        Self::And(children)
    }

    /// Creates a disjunction.
    #[must_use]
    pub fn or(children: Vec<FilterNode>) -> Self {
        Self::Or(children)
    }

    /// Creates a well-formed negation of one child.
    #[must_use]
    pub fn not(child: FilterNode) -> Self {
        Self::Not(vec![child])
    }

    /// Creates a scope node.
    #[must_use]
    pub fn scope(base: Dn, scope: SearchScope) -> Self {
        Self::Scope { base, scope }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_constructors_normalize_attribute() {
        let node = FilterNode::eq(" ObjectClass ", "person");
        let FilterNode::Leaf {
            kind,
            attribute,
            value,
        } = node
        else {
            panic!("expected leaf");
        };
        assert_eq!(kind, AssertionKind::Equality);
        assert_eq!(attribute, "objectclass");
        assert_eq!(value.as_deref(), Some("person"));
    }

    #[test]
    fn presence_has_no_value() {
        let node = FilterNode::present("mail");
        let FilterNode::Leaf { kind, value, .. } = node else {
            panic!("expected leaf");
        };
        assert_eq!(kind, AssertionKind::Presence);
        assert!(value.is_none());
        assert!(!kind.requires_value());
    }

    #[test]
    fn not_constructor_wraps_single_child() {
        let node = FilterNode::not(FilterNode::present("cn"));
        let FilterNode::Not(children) = node else {
            panic!("expected not");
        };
        assert_eq!(children.len(), 1);
    }
}
