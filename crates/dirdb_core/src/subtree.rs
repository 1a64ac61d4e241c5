//! Subtree specifications and membership evaluation.
//!
//! A subtree specification scopes an administrative area: a base below
//! the administrative point, minimum and maximum depths, chop
//! exclusions, and an optional objectClass refinement. The evaluator
//! answers, per candidate entry, whether the entry falls inside the
//! specified subtree.

use crate::entry::Entry;
use crate::error::{DirError, DirResult};
use crate::filter::FilterNode;
use crate::name::Dn;
use crate::refinement::RefinementEvaluator;
use crate::schema::ObjectClassRegistry;

/// A subtree specification relative to an administrative point.
///
/// The default specification (empty base, no depth bounds, no
/// exclusions, no refinement) matches the administrative point itself
/// and everything below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtreeSpecification {
    /// Base of the subtree, relative to the administrative point.
    pub base: Dn,
    /// Minimum depth below the base (0 includes the base itself).
    pub min_base_distance: u32,
    /// Maximum depth below the base; `None` is unbounded.
    pub max_base_distance: Option<u32>,
    /// Relative paths excluded along with everything below them.
    pub chop_before: Vec<Dn>,
    /// Relative paths whose strict descendants are excluded.
    pub chop_after: Vec<Dn>,
    /// Optional objectClass refinement.
    pub refinement: Option<FilterNode>,
}

impl SubtreeSpecification {
    /// Creates a specification scoping everything at and below `base`.
    #[must_use]
    pub fn below(base: Dn) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// Sets the depth bounds, validating `min <= max` when bounded.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::InvalidArgument`] when a bounded maximum is
    /// smaller than the minimum.
    pub fn with_bounds(mut self, min: u32, max: Option<u32>) -> DirResult<Self> {
        if let Some(max) = max {
            if min > max {
                return Err(DirError::invalid_argument(format!(
                    "min base distance {min} exceeds max base distance {max}"
                )));
            }
        }
        self.min_base_distance = min;
        self.max_base_distance = max;
        Ok(self)
    }
}

/// Decides subtree membership for candidate entries.
///
/// Stateless and re-entrant over immutable inputs.
pub struct SubtreeEvaluator<'r> {
    refinements: RefinementEvaluator<'r>,
}

impl<'r> SubtreeEvaluator<'r> {
    /// Creates an evaluator resolving objectClass aliases via `registry`.
    #[must_use]
    pub fn new(registry: &'r ObjectClassRegistry) -> Self {
        Self {
            refinements: RefinementEvaluator::new(registry),
        }
    }

    /// Returns true if `entry_dn` falls inside the specified subtree.
    ///
    /// All conditions must hold: the entry lies at or below the
    /// base-qualified point, its depth is within the min/max bounds,
    /// no chop exclusion removes it, and the refinement (if any)
    /// matches the entry's objectClass values.
    ///
    /// # Errors
    ///
    /// Propagates [`DirError::InvalidArgument`] from a malformed
    /// refinement.
    pub fn evaluate(
        &self,
        spec: &SubtreeSpecification,
        admin_point: &Dn,
        entry_dn: &Dn,
        entry: &Entry,
    ) -> DirResult<bool> {
        let full_base = admin_point.descend(&spec.base);
        let Some(relative) = entry_dn.relative_to(&full_base) else {
            return Ok(false);
        };

        let depth = relative.depth() as u32;
        if depth < spec.min_base_distance {
            return Ok(false);
        }
        if let Some(max) = spec.max_base_distance {
            if depth > max {
                return Ok(false);
            }
        }

        // Chop exclusions are a union: either list may exclude the
        // entry, and chopAfter never re-admits what chopBefore removed.
        for exclusion in &spec.chop_before {
            // Excludes the named point and everything below it.
            if relative.is_descendant_or_self(exclusion) {
                return Ok(false);
            }
        }
        for exclusion in &spec.chop_after {
            // Excludes strictly below the named point; the point itself stays.
            if relative.depth() > exclusion.depth() && relative.is_descendant_or_self(exclusion) {
                return Ok(false);
            }
        }

        if let Some(refinement) = &spec.refinement {
            return self.refinements.evaluate(refinement, entry.object_classes());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Entry {
        let mut entry = Entry::new();
        entry.add("objectclass", "person");
        entry
    }

    fn eval(spec: &SubtreeSpecification, admin_point: &str, entry_dn: &str) -> bool {
        let registry = ObjectClassRegistry::with_defaults();
        SubtreeEvaluator::new(&registry)
            .evaluate(
                spec,
                &Dn::parse(admin_point).unwrap(),
                &Dn::parse(entry_dn).unwrap(),
                &person(),
            )
            .unwrap()
    }

    #[test]
    fn default_spec_matches_admin_point_and_below() {
        let spec = SubtreeSpecification::default();
        assert!(eval(&spec, "dc=example", "dc=example"));
        assert!(eval(&spec, "dc=example", "cn=deep,ou=a,ou=b,dc=example"));
        assert!(!eval(&spec, "dc=example", "dc=other"));
    }

    #[test]
    fn base_shifts_the_subtree() {
        let spec = SubtreeSpecification::below(Dn::parse("ou=people").unwrap());
        assert!(eval(&spec, "dc=example", "ou=people,dc=example"));
        assert!(eval(&spec, "dc=example", "cn=alice,ou=people,dc=example"));
        assert!(!eval(&spec, "dc=example", "dc=example"));
        assert!(!eval(&spec, "dc=example", "cn=alice,ou=groups,dc=example"));
    }

    #[test]
    fn min_max_depth_boundaries() {
        // min=1, max=3: base excluded, depths 1-3 included, depth 4 excluded.
        let spec = SubtreeSpecification::default()
            .with_bounds(1, Some(3))
            .unwrap();
        assert!(!eval(&spec, "dc=example", "dc=example"));
        assert!(eval(&spec, "dc=example", "ou=a,dc=example"));
        assert!(eval(&spec, "dc=example", "ou=b,ou=a,dc=example"));
        assert!(eval(&spec, "dc=example", "ou=c,ou=b,ou=a,dc=example"));
        assert!(!eval(&spec, "dc=example", "cn=d,ou=c,ou=b,ou=a,dc=example"));
    }

    #[test]
    fn invalid_bounds_rejected() {
        assert!(SubtreeSpecification::default().with_bounds(4, Some(2)).is_err());
        assert!(SubtreeSpecification::default().with_bounds(4, None).is_ok());
    }

    #[test]
    fn chop_before_removes_point_and_below() {
        let mut spec = SubtreeSpecification::default();
        spec.chop_before = vec![Dn::parse("ou=secret").unwrap()];

        assert!(eval(&spec, "dc=example", "ou=open,dc=example"));
        assert!(!eval(&spec, "dc=example", "ou=secret,dc=example"));
        assert!(!eval(&spec, "dc=example", "cn=x,ou=secret,dc=example"));
    }

    #[test]
    fn chop_after_keeps_point_removes_descendants() {
        let mut spec = SubtreeSpecification::default();
        spec.chop_after = vec![Dn::parse("ou=archive").unwrap()];

        assert!(eval(&spec, "dc=example", "ou=archive,dc=example"));
        assert!(!eval(&spec, "dc=example", "cn=x,ou=archive,dc=example"));
        assert!(!eval(&spec, "dc=example", "cn=y,cn=x,ou=archive,dc=example"));
        assert!(eval(&spec, "dc=example", "ou=current,dc=example"));
    }

    #[test]
    fn overlapping_chop_lists_union() {
        // chopBefore on the point wins even though chopAfter alone
        // would keep the point itself.
        let mut spec = SubtreeSpecification::default();
        spec.chop_before = vec![Dn::parse("ou=secret").unwrap()];
        spec.chop_after = vec![Dn::parse("ou=secret").unwrap()];

        assert!(!eval(&spec, "dc=example", "ou=secret,dc=example"));
        assert!(!eval(&spec, "dc=example", "cn=x,ou=secret,dc=example"));
    }

    #[test]
    fn refinement_constrains_matches() {
        let mut spec = SubtreeSpecification::default();
        spec.refinement = Some(FilterNode::eq("objectClass", "person"));
        assert!(eval(&spec, "dc=example", "cn=alice,dc=example"));

        spec.refinement = Some(FilterNode::eq("objectClass", "organizationalUnit"));
        assert!(!eval(&spec, "dc=example", "cn=alice,dc=example"));
    }

    #[test]
    fn root_dse_never_matches_constrained_specs() {
        let spec = SubtreeSpecification::below(Dn::parse("ou=people").unwrap());
        assert!(!eval(&spec, "dc=example", ""));

        let bounded = SubtreeSpecification::default()
            .with_bounds(1, None)
            .unwrap();
        assert!(!eval(&bounded, "", ""));
    }
}
