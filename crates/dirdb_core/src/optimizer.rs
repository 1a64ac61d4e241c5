//! Cost-based filter optimizer.
//!
//! The optimizer walks a filter tree depth-first and attaches a scan
//! count to every node: an upper bound on how many candidate entries
//! evaluating that node would touch. The search executor uses the
//! counts to scan the cheapest branch of a conjunction first and to
//! decide whether a leaf can be satisfied from an index alone.
//!
//! Counts come from index count queries where indices exist and fall
//! back to [`MAX_SCAN`] where they don't; a missing index is a costing
//! pessimism, never an error.

use crate::error::{DirError, DirResult};
use crate::filter::{AssertionKind, FilterNode, SearchScope};
use crate::name::Dn;
use crate::partition::Partition;

/// Scan-count sentinel meaning "unknown, assume worst case".
///
/// Larger than any real cardinality; sums saturate at this value.
pub const MAX_SCAN: u64 = u64::MAX;

/// A filter node annotated with its scan-count estimate.
///
/// Produced as a parallel structure so the original filter tree is
/// never mutated and can be shared between concurrent searches.
#[derive(Debug)]
pub struct AnnotatedFilter<'f> {
    node: &'f FilterNode,
    scan_count: u64,
    children: Vec<AnnotatedFilter<'f>>,
}

impl<'f> AnnotatedFilter<'f> {
    /// Returns the filter node this annotation covers.
    #[must_use]
    pub fn node(&self) -> &'f FilterNode {
        self.node
    }

    /// Returns the estimated candidate scan count.
    #[must_use]
    pub fn scan_count(&self) -> u64 {
        self.scan_count
    }

    /// Returns the annotated children, in the original child order.
    #[must_use]
    pub fn children(&self) -> &[AnnotatedFilter<'f>] {
        &self.children
    }

    /// Returns the child with the smallest scan count, if any.
    ///
    /// This is the branch a search executor should evaluate first.
    #[must_use]
    pub fn cheapest_child(&self) -> Option<&AnnotatedFilter<'f>> {
        self.children.iter().min_by_key(|child| child.scan_count)
    }
}

/// Annotates filter trees with scan-count estimates from a partition.
///
/// Stateless and read-only over the partition; safe to use from any
/// number of concurrent reader threads.
pub struct Optimizer<'p, P: Partition + ?Sized> {
    partition: &'p P,
}

impl<'p, P: Partition + ?Sized> Optimizer<'p, P> {
    /// Creates an optimizer reading index statistics from `partition`.
    #[must_use]
    pub fn new(partition: &'p P) -> Self {
        Self { partition }
    }

    /// Annotates `node` and all nodes below it, children first.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::InvalidArgument`] for malformed trees
    /// (empty conjunction/disjunction, negation without exactly one
    /// child, value-less equality) and propagates table failures.
    /// Missing indices are not errors; they annotate as [`MAX_SCAN`].
    pub fn annotate<'f>(&self, node: &'f FilterNode) -> DirResult<AnnotatedFilter<'f>> {
        match node {
            FilterNode::Leaf {
                kind,
                attribute,
                value,
            } => Ok(AnnotatedFilter {
                node,
                scan_count: self.leaf_count(*kind, attribute, value.as_deref())?,
                children: Vec::new(),
            }),

            FilterNode::And(nodes) => {
                let children = self.annotate_children(nodes, "conjunction")?;
                // An AND never returns more than its most selective child.
                let scan_count = children
                    .iter()
                    .map(AnnotatedFilter::scan_count)
                    .min()
                    .unwrap_or(MAX_SCAN);
                Ok(AnnotatedFilter {
                    node,
                    scan_count,
                    children,
                })
            }

            FilterNode::Or(nodes) => {
                let children = self.annotate_children(nodes, "disjunction")?;
                // Conservative: duplicates across children are not deduplicated.
                let scan_count = children
                    .iter()
                    .map(AnnotatedFilter::scan_count)
                    .fold(0u64, u64::saturating_add);
                Ok(AnnotatedFilter {
                    node,
                    scan_count,
                    children,
                })
            }

            FilterNode::Not(nodes) => {
                if nodes.len() != 1 {
                    return Err(DirError::invalid_argument(format!(
                        "negation requires exactly one child, got {}",
                        nodes.len()
                    )));
                }
                let child = self.annotate(&nodes[0])?;
                let scan_count = self.negation_count(child.node)?;
                Ok(AnnotatedFilter {
                    node,
                    scan_count,
                    children: vec![child],
                })
            }

            FilterNode::Scope { base, scope } => Ok(AnnotatedFilter {
                node,
                scan_count: self.scope_count(base, *scope)?,
                children: Vec::new(),
            }),

            // Assertion nodes cost themselves; the optimizer does not descend.
            FilterNode::Assertion { .. } => Ok(AnnotatedFilter {
                node,
                scan_count: MAX_SCAN,
                children: Vec::new(),
            }),
        }
    }

    fn annotate_children<'f>(
        &self,
        nodes: &'f [FilterNode],
        operator: &str,
    ) -> DirResult<Vec<AnnotatedFilter<'f>>> {
        if nodes.is_empty() {
            return Err(DirError::invalid_argument(format!(
                "{operator} requires at least one child"
            )));
        }
        nodes.iter().map(|child| self.annotate(child)).collect()
    }

    fn leaf_count(
        &self,
        kind: AssertionKind,
        attribute: &str,
        value: Option<&str>,
    ) -> DirResult<u64> {
        match kind {
            // Approximate matching is unimplemented; cost it as equality.
            AssertionKind::Equality | AssertionKind::Approximate => {
                let value = require_value(kind, attribute, value)?;
                match self.partition.user_index(attribute) {
                    Some(index) => index.count_value(value),
                    None => Ok(MAX_SCAN),
                }
            }
            AssertionKind::GreaterEq | AssertionKind::LessEq => {
                let value = require_value(kind, attribute, value)?;
                match self.partition.user_index(attribute) {
                    Some(index) => index.count_range(value, kind == AssertionKind::GreaterEq),
                    None => Ok(MAX_SCAN),
                }
            }
            AssertionKind::Presence => match self.partition.existence_index() {
                Some(index) => index.count_value(attribute),
                None => Ok(MAX_SCAN),
            },
            // No cheap estimate exists; degrade to the whole index.
            AssertionKind::Substring | AssertionKind::Extensible => {
                match self.partition.user_index(attribute) {
                    Some(index) => index.count(),
                    None => Ok(MAX_SCAN),
                }
            }
        }
    }

    fn negation_count(&self, child: &FilterNode) -> DirResult<u64> {
        // A negated indexed leaf is approximated by the un-negated
        // index size; anything else degrades to a full scan.
        if let FilterNode::Leaf {
            kind, attribute, ..
        } = child
        {
            if *kind != AssertionKind::Presence {
                if let Some(index) = self.partition.user_index(attribute) {
                    return index.count();
                }
            }
        }
        self.partition.count()
    }

    fn scope_count(&self, base: &Dn, scope: SearchScope) -> DirResult<u64> {
        match scope {
            SearchScope::Object => Ok(1),
            SearchScope::OneLevel => match self.partition.entry_id(base)? {
                Some(id) => self.partition.child_count(id),
                None => Ok(0),
            },
            SearchScope::Subtree => self.partition.count(),
        }
    }
}

fn require_value<'v>(
    kind: AssertionKind,
    attribute: &str,
    value: Option<&'v str>,
) -> DirResult<&'v str> {
    value.ok_or_else(|| {
        DirError::invalid_argument(format!(
            "{kind:?} assertion on {attribute} requires a value"
        ))
    })
}
