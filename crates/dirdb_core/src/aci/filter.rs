//! The tuple filter chain.
//!
//! Filters are independent and composable; each narrows a candidate
//! tuple set. The standard chain runs scope bypass, user-class
//! applicability, specificity selection, and the immediate-subordinate
//! cap, in that order. An empty input always yields an empty output.

use crate::aci::context::{AciContext, OperationScope};
use crate::aci::tuple::{AciTuple, ProtectedItem, UserClass};
use crate::entry::Entry;
use crate::error::DirResult;
use crate::schema::ObjectClassRegistry;
use crate::subtree::SubtreeEvaluator;

/// One stage of the tuple filter chain.
pub trait TupleFilter {
    /// Narrows `tuples` for the operation described by `ctx`.
    fn filter(&self, tuples: Vec<AciTuple>, ctx: &AciContext<'_>) -> DirResult<Vec<AciTuple>>;
}

/// Bypasses subordinate-count constraints for the root DSE.
///
/// The root DSE has no meaningful immediate-subordinate count, so for
/// entry-scoped operations against it this filter strips `MaxImmSub`
/// protected items; every other case passes through unchanged.
#[derive(Debug, Default)]
pub struct ScopeFilter;

impl TupleFilter for ScopeFilter {
    fn filter(&self, tuples: Vec<AciTuple>, ctx: &AciContext<'_>) -> DirResult<Vec<AciTuple>> {
        if ctx.scope != OperationScope::Entry || !ctx.target_is_root_dse() {
            return Ok(tuples);
        }
        Ok(tuples
            .into_iter()
            .map(|mut tuple| {
                tuple
                    .protected_items
                    .retain(|item| !matches!(item, ProtectedItem::MaxImmSub(_)));
                tuple
            })
            .collect())
    }
}

/// Enforces `MaxImmSub` caps on grant tuples at entry scope.
///
/// A tuple survives if it carries no cap, if it is a deny tuple, or if
/// the reported subordinate count does not exceed its cap. Non-entry
/// scopes pass through unchanged.
#[derive(Debug, Default)]
pub struct MaxImmSubFilter;

impl TupleFilter for MaxImmSubFilter {
    fn filter(&self, tuples: Vec<AciTuple>, ctx: &AciContext<'_>) -> DirResult<Vec<AciTuple>> {
        if ctx.scope != OperationScope::Entry {
            return Ok(tuples);
        }
        let subordinates = ctx.immediate_subordinates.unwrap_or(0);
        Ok(tuples
            .into_iter()
            .filter(|tuple| match tuple.max_imm_sub() {
                Some(cap) => !tuple.grant || subordinates <= cap,
                None => true,
            })
            .collect())
    }
}

/// Keeps only tuples at the most specific user-class level present.
///
/// Levels, most specific first: `Name`/`ThisEntry`, `UserGroup`,
/// `Subtree`, `AllUsers`. Ties at the winning level all survive; zero
/// or one input tuple passes through unfiltered.
#[derive(Debug, Default)]
pub struct MostSpecificUserClassFilter;

impl TupleFilter for MostSpecificUserClassFilter {
    fn filter(&self, tuples: Vec<AciTuple>, _ctx: &AciContext<'_>) -> DirResult<Vec<AciTuple>> {
        if tuples.len() <= 1 {
            return Ok(tuples);
        }
        let best = tuples
            .iter()
            .map(AciTuple::specificity)
            .min()
            .unwrap_or(u8::MAX);
        Ok(tuples
            .into_iter()
            .filter(|tuple| tuple.specificity() == best)
            .collect())
    }
}

/// Keeps tuples whose user classes actually include the requester.
///
/// A tuple survives when the requester belongs to at least one of its
/// user classes and holds an authentication level at or above the
/// tuple's requirement.
pub struct RelatedUserClassFilter<'r> {
    subtrees: SubtreeEvaluator<'r>,
}

impl<'r> RelatedUserClassFilter<'r> {
    /// Creates the filter, resolving subtree refinements via `registry`.
    #[must_use]
    pub fn new(registry: &'r ObjectClassRegistry) -> Self {
        Self {
            subtrees: SubtreeEvaluator::new(registry),
        }
    }

    fn class_matches(&self, class: &UserClass, ctx: &AciContext<'_>) -> DirResult<bool> {
        match class {
            UserClass::AllUsers => Ok(true),
            UserClass::ThisEntry => Ok(ctx.requester == ctx.target),
            UserClass::Name(names) => Ok(names.contains(ctx.requester)),
            UserClass::UserGroup(groups) => {
                Ok(groups.iter().any(|g| ctx.requester_groups.contains(g)))
            }
            UserClass::Subtree(specs) => {
                let empty = Entry::new();
                let entry = ctx.requester_entry.unwrap_or(&empty);
                for spec in specs {
                    if self
                        .subtrees
                        .evaluate(spec, ctx.admin_point, ctx.requester, entry)?
                    {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

impl TupleFilter for RelatedUserClassFilter<'_> {
    fn filter(&self, tuples: Vec<AciTuple>, ctx: &AciContext<'_>) -> DirResult<Vec<AciTuple>> {
        let mut kept = Vec::with_capacity(tuples.len());
        for tuple in tuples {
            if ctx.auth_level < tuple.auth_level {
                continue;
            }
            let mut related = false;
            for class in &tuple.user_classes {
                if self.class_matches(class, ctx)? {
                    related = true;
                    break;
                }
            }
            if related {
                kept.push(tuple);
            }
        }
        Ok(kept)
    }
}

/// An ordered pipeline of tuple filters.
pub struct TupleFilterChain<'r> {
    filters: Vec<Box<dyn TupleFilter + 'r>>,
}

impl<'r> TupleFilterChain<'r> {
    /// Creates the standard chain: scope bypass, related user class,
    /// most specific user class, then the immediate-subordinate cap.
    #[must_use]
    pub fn standard(registry: &'r ObjectClassRegistry) -> Self {
        Self {
            filters: vec![
                Box::new(ScopeFilter),
                Box::new(RelatedUserClassFilter::new(registry)),
                Box::new(MostSpecificUserClassFilter),
                Box::new(MaxImmSubFilter),
            ],
        }
    }

    /// Creates a chain from explicit stages.
    #[must_use]
    pub fn from_filters(filters: Vec<Box<dyn TupleFilter + 'r>>) -> Self {
        Self { filters }
    }

    /// Runs the chain left to right.
    pub fn apply(
        &self,
        mut tuples: Vec<AciTuple>,
        ctx: &AciContext<'_>,
    ) -> DirResult<Vec<AciTuple>> {
        for filter in &self.filters {
            if tuples.is_empty() {
                break;
            }
            tuples = filter.filter(tuples, ctx)?;
        }
        Ok(tuples)
    }
}
