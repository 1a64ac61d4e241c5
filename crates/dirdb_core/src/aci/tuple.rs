//! ACI tuple model.

use crate::name::Dn;
use crate::subtree::SubtreeSpecification;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Strength of a requester's authentication.
///
/// A total order: a more strongly authenticated requester satisfies
/// any weaker requirement, so `Strong` passes a `Simple` gate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum AuthenticationLevel {
    /// Anonymous or unauthenticated.
    #[default]
    None,
    /// Simple (password) authentication.
    Simple,
    /// Strong (certificate or SASL) authentication.
    Strong,
}

/// The class of users an ACI tuple applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum UserClass {
    /// Every user.
    AllUsers,
    /// The user identified by the entry being operated on.
    ThisEntry,
    /// Users named by exact DN.
    Name(BTreeSet<Dn>),
    /// Users belonging to any of the named groups.
    UserGroup(BTreeSet<Dn>),
    /// Users whose DN falls inside any of the subtree specifications.
    Subtree(Vec<SubtreeSpecification>),
}

impl UserClass {
    /// Specificity level of this class, 0 being most specific.
    ///
    /// `Name` and `ThisEntry` share the top level; then `UserGroup`,
    /// then `Subtree`, with `AllUsers` least specific.
    #[must_use]
    pub fn specificity(&self) -> u8 {
        match self {
            Self::Name(_) | Self::ThisEntry => 0,
            Self::UserGroup(_) => 1,
            Self::Subtree(_) => 2,
            Self::AllUsers => 3,
        }
    }
}

/// An item an ACI tuple protects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectedItem {
    /// The entry itself.
    Entry,
    /// All user attribute types.
    AllUserAttributeTypes,
    /// Specific attribute types.
    AttributeType(BTreeSet<String>),
    /// A cap on the number of immediate subordinates an entry may have.
    MaxImmSub(u64),
}

/// One access control rule: who may do what, and at which precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct AciTuple {
    /// User classes the rule applies to.
    pub user_classes: Vec<UserClass>,
    /// Minimum authentication level the requester must hold.
    pub auth_level: AuthenticationLevel,
    /// Items the rule protects.
    pub protected_items: Vec<ProtectedItem>,
    /// True grants, false denies.
    pub grant: bool,
    /// Precedence among competing tuples; higher wins downstream.
    pub precedence: i32,
}

impl AciTuple {
    /// Creates a grant tuple.
    #[must_use]
    pub fn grant(
        user_classes: Vec<UserClass>,
        auth_level: AuthenticationLevel,
        protected_items: Vec<ProtectedItem>,
        precedence: i32,
    ) -> Self {
        Self {
            user_classes,
            auth_level,
            protected_items,
            grant: true,
            precedence,
        }
    }

    /// Creates a deny tuple.
    #[must_use]
    pub fn deny(
        user_classes: Vec<UserClass>,
        auth_level: AuthenticationLevel,
        protected_items: Vec<ProtectedItem>,
        precedence: i32,
    ) -> Self {
        Self {
            user_classes,
            auth_level,
            protected_items,
            grant: false,
            precedence,
        }
    }

    /// Returns the most specific level among this tuple's user classes.
    #[must_use]
    pub fn specificity(&self) -> u8 {
        self.user_classes
            .iter()
            .map(UserClass::specificity)
            .min()
            .unwrap_or(u8::MAX)
    }

    /// Returns the `MaxImmSub` cap, if this tuple carries one.
    #[must_use]
    pub fn max_imm_sub(&self) -> Option<u64> {
        self.protected_items.iter().find_map(|item| match item {
            ProtectedItem::MaxImmSub(cap) => Some(*cap),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_levels_are_totally_ordered() {
        assert!(AuthenticationLevel::None < AuthenticationLevel::Simple);
        assert!(AuthenticationLevel::Simple < AuthenticationLevel::Strong);
        assert!(AuthenticationLevel::Strong >= AuthenticationLevel::None);
    }

    #[test]
    fn specificity_ranks_classes() {
        let name = UserClass::Name(BTreeSet::new());
        assert_eq!(name.specificity(), 0);
        assert_eq!(UserClass::ThisEntry.specificity(), 0);
        assert_eq!(UserClass::UserGroup(BTreeSet::new()).specificity(), 1);
        assert_eq!(UserClass::Subtree(vec![]).specificity(), 2);
        assert_eq!(UserClass::AllUsers.specificity(), 3);
    }

    #[test]
    fn tuple_specificity_takes_most_specific_class() {
        let tuple = AciTuple::grant(
            vec![UserClass::AllUsers, UserClass::ThisEntry],
            AuthenticationLevel::None,
            vec![ProtectedItem::Entry],
            0,
        );
        assert_eq!(tuple.specificity(), 0);
    }

    #[test]
    fn max_imm_sub_lookup() {
        let tuple = AciTuple::grant(
            vec![UserClass::AllUsers],
            AuthenticationLevel::None,
            vec![ProtectedItem::Entry, ProtectedItem::MaxImmSub(4)],
            0,
        );
        assert_eq!(tuple.max_imm_sub(), Some(4));
    }
}
