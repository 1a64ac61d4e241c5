//! Property-based test generators using proptest.
//!
//! Strategies produce filter trees whose leaves stay within the
//! attribute vocabulary of [`crate::fixtures::people_partition`], so
//! generated filters exercise both indexed and unindexed paths.

use dirdb_core::{AssertionKind, FilterNode};
use proptest::prelude::*;

/// Attributes carried by the people fixture; the first three are
/// indexed there, the rest are not.
pub const FIXTURE_ATTRIBUTES: &[&str] = &["sn", "cn", "uid", "mail", "description"];

/// Values that actually occur in the fixture, plus some that do not.
pub const FIXTURE_VALUES: &[&str] = &["smith", "jones", "alice", "bob", "user-0", "nobody"];

/// Strategy for an attribute name from the fixture vocabulary.
pub fn attribute_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(FIXTURE_ATTRIBUTES).prop_map(str::to_string)
}

/// Strategy for an assertion value.
pub fn value_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(FIXTURE_VALUES).prop_map(str::to_string)
}

/// Strategy for a leaf assertion of any estimable kind.
pub fn leaf_strategy() -> impl Strategy<Value = FilterNode> {
    let kinds = prop::sample::select(vec![
        AssertionKind::Equality,
        AssertionKind::Presence,
        AssertionKind::Substring,
        AssertionKind::GreaterEq,
        AssertionKind::LessEq,
        AssertionKind::Approximate,
    ]);
    (kinds, attribute_strategy(), value_strategy()).prop_map(|(kind, attribute, value)| {
        let value = kind.requires_value().then_some(value.as_str());
        FilterNode::leaf(kind, &attribute, value)
    })
}

/// Strategy for a well-formed filter tree up to three levels deep.
///
/// Negations always carry exactly one child, so every generated tree
/// is accepted by the optimizer and evaluators.
pub fn filter_tree_strategy() -> impl Strategy<Value = FilterNode> {
    leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(FilterNode::and),
            prop::collection::vec(inner.clone(), 1..4).prop_map(FilterNode::or),
            inner.prop_map(FilterNode::not),
        ]
    })
}
