//! Evaluation context for the tuple filter chain.

use crate::aci::tuple::AuthenticationLevel;
use crate::entry::Entry;
use crate::name::Dn;
use std::collections::BTreeSet;

/// The granularity of the operation being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationScope {
    /// The operation acts on a whole entry.
    Entry,
    /// The operation acts on an attribute type.
    AttributeType,
    /// The operation acts on a single attribute value.
    AttributeTypeAndValue,
}

/// Everything the tuple filters need to know about one operation.
///
/// Borrowed from the decision point for the duration of one filter
/// chain run; the filters never mutate it.
#[derive(Debug)]
pub struct AciContext<'a> {
    /// Granularity of the operation.
    pub scope: OperationScope,
    /// DN of the requesting user.
    pub requester: &'a Dn,
    /// Groups the requester belongs to.
    pub requester_groups: &'a BTreeSet<Dn>,
    /// The requester's entry, when available, for refinement checks.
    pub requester_entry: Option<&'a Entry>,
    /// The requester's authentication level.
    pub auth_level: AuthenticationLevel,
    /// DN of the entry being operated on.
    pub target: &'a Dn,
    /// Administrative point the ACI tuples hang from.
    pub admin_point: &'a Dn,
    /// Immediate subordinate count of the target, when reported.
    pub immediate_subordinates: Option<u64>,
}

impl<'a> AciContext<'a> {
    /// Creates a context with no requester entry or subordinate count.
    #[must_use]
    pub fn new(
        scope: OperationScope,
        requester: &'a Dn,
        requester_groups: &'a BTreeSet<Dn>,
        auth_level: AuthenticationLevel,
        target: &'a Dn,
        admin_point: &'a Dn,
    ) -> Self {
        Self {
            scope,
            requester,
            requester_groups,
            requester_entry: None,
            auth_level,
            target,
            admin_point,
            immediate_subordinates: None,
        }
    }

    /// Attaches the requester's entry.
    #[must_use]
    pub fn with_requester_entry(mut self, entry: &'a Entry) -> Self {
        self.requester_entry = Some(entry);
        self
    }

    /// Attaches the target's reported immediate subordinate count.
    #[must_use]
    pub fn with_immediate_subordinates(mut self, count: u64) -> Self {
        self.immediate_subordinates = Some(count);
        self
    }

    /// Returns true if the target is the root DSE.
    #[must_use]
    pub fn target_is_root_dse(&self) -> bool {
        self.target.is_empty()
    }
}
