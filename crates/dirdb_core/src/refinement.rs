//! Object class refinement evaluation.
//!
//! Refinements are the restricted filter grammar allowed inside a
//! subtree specification: objectClass equality (by name or OID),
//! conjunction, disjunction, and single-child negation. Nothing else.

use crate::entry::OBJECT_CLASS;
use crate::error::{DirError, DirResult};
use crate::filter::{AssertionKind, FilterNode};
use crate::schema::ObjectClassRegistry;

/// OID of the objectClass attribute type.
const OBJECT_CLASS_OID: &str = "2.5.4.0";

/// Evaluates refinement filters against an entry's objectClass values.
///
/// Stateless and re-entrant; the registry resolves name/OID aliases so
/// `(objectClass=person)` and `(objectClass=2.5.6.6)` are equivalent.
pub struct RefinementEvaluator<'r> {
    registry: &'r ObjectClassRegistry,
}

impl<'r> RefinementEvaluator<'r> {
    /// Creates an evaluator using `registry` for alias resolution.
    #[must_use]
    pub fn new(registry: &'r ObjectClassRegistry) -> Self {
        Self { registry }
    }

    /// Evaluates a refinement against objectClass attribute values.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::InvalidArgument`] when the node falls
    /// outside the refinement grammar: a non-equality leaf, a leaf on
    /// an attribute other than objectClass, a value-less leaf, an
    /// empty conjunction/disjunction, or a negation without exactly
    /// one child.
    pub fn evaluate(&self, node: &FilterNode, object_classes: &[String]) -> DirResult<bool> {
        match node {
            FilterNode::Leaf {
                kind: AssertionKind::Equality,
                attribute,
                value,
            } => {
                if attribute != OBJECT_CLASS && attribute != OBJECT_CLASS_OID {
                    return Err(DirError::invalid_argument(format!(
                        "refinement leaf must assert objectClass, got {attribute}"
                    )));
                }
                let value = value.as_deref().ok_or_else(|| {
                    DirError::invalid_argument("refinement leaf requires a value")
                })?;
                Ok(object_classes
                    .iter()
                    .any(|class| self.registry.equivalent(class, value)))
            }

            FilterNode::And(children) => {
                self.require_children(children, "refinement conjunction")?;
                for child in children {
                    if !self.evaluate(child, object_classes)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            FilterNode::Or(children) => {
                self.require_children(children, "refinement disjunction")?;
                for child in children {
                    if self.evaluate(child, object_classes)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }

            FilterNode::Not(children) => {
                if children.len() != 1 {
                    return Err(DirError::invalid_argument(format!(
                        "refinement negation requires exactly one child, got {}",
                        children.len()
                    )));
                }
                Ok(!self.evaluate(&children[0], object_classes)?)
            }

            other => Err(DirError::invalid_argument(format!(
                "node kind not allowed in a refinement: {other:?}"
            ))),
        }
    }

    fn require_children(&self, children: &[FilterNode], operator: &str) -> DirResult<()> {
        if children.is_empty() {
            return Err(DirError::invalid_argument(format!(
                "{operator} requires at least one child"
            )));
        }
        Ok(())
    }
}
