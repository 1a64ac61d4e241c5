//! Changelog events, committers, and tags.

use crate::aci::AuthenticationLevel;
use crate::ldif::LdifChange;
use crate::name::Dn;
use crate::types::Revision;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns the current UTC time as a GeneralizedTime string with
/// millisecond precision, e.g. `20260830135501.123Z`.
#[must_use]
pub fn generalized_time_now() -> String {
    Utc::now().format("%Y%m%d%H%M%S%.3fZ").to_string()
}

/// The authenticated principal a change is attributed to.
///
/// The credential is deliberately not serialized: a persisted changelog
/// must never contain secret material, so a principal read back from
/// disk always has an empty credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// DN the principal bound as.
    pub dn: Dn,
    /// How the principal authenticated.
    pub auth_level: AuthenticationLevel,
    #[serde(skip)]
    credential: Option<Vec<u8>>,
}

impl Principal {
    /// Creates a principal without credential material.
    #[must_use]
    pub fn new(dn: Dn, auth_level: AuthenticationLevel) -> Self {
        Self {
            dn,
            auth_level,
            credential: None,
        }
    }

    /// Attaches the credential the principal bound with.
    #[must_use]
    pub fn with_credential(mut self, credential: Vec<u8>) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Returns the in-memory credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<&[u8]> {
        self.credential.as_deref()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dn)
    }
}

/// A named bookmark on a changelog revision.
///
/// Two tags are equal when they mark the same revision with the same
/// description; the dates are bookkeeping only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// The revision the tag marks.
    pub revision: Revision,
    /// Optional free-form description.
    pub description: Option<String>,
    /// When the tag was created.
    pub tag_date: String,
    /// When the tagged revision was logged, if known.
    pub revision_date: Option<String>,
}

impl Tag {
    /// Creates a tag on a revision.
    #[must_use]
    pub fn new(revision: Revision, description: Option<String>) -> Self {
        Self {
            revision,
            description,
            tag_date: generalized_time_now(),
            revision_date: None,
        }
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.revision == other.revision && self.description == other.description
    }
}

impl Eq for Tag {}

/// One logged change: a forward LDIF change paired with the reverse
/// changes that undo it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEvent {
    /// The revision this event produced.
    pub revision: Revision,
    /// When the change was logged, as GeneralizedTime.
    pub event_date: String,
    /// Who committed the change.
    pub committer: Principal,
    /// The change as applied.
    pub forward: LdifChange,
    /// Changes that undo `forward`, in replay order.
    pub reverse: Vec<LdifChange>,
}

impl ChangeLogEvent {
    /// Creates an event at a revision.
    #[must_use]
    pub fn new(
        revision: Revision,
        committer: Principal,
        forward: LdifChange,
        reverse: Vec<LdifChange>,
    ) -> Self {
        Self {
            revision,
            event_date: generalized_time_now(),
            committer,
            forward,
            reverse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generalized_time_shape() {
        let now = generalized_time_now();
        assert!(now.ends_with('Z'));
        // yyyymmddHHMMSS.mmmZ
        assert_eq!(now.len(), 19);
        assert_eq!(&now[14..15], ".");
    }

    #[test]
    fn credential_survives_in_memory() {
        let principal = Principal::new(Dn::parse("uid=admin").unwrap(), AuthenticationLevel::Simple)
            .with_credential(b"secret".to_vec());
        assert_eq!(principal.credential(), Some(&b"secret"[..]));
    }

    #[test]
    fn credential_is_not_serialized() {
        let principal = Principal::new(Dn::parse("uid=admin").unwrap(), AuthenticationLevel::Simple)
            .with_credential(b"secret".to_vec());
        let json = serde_json::to_string(&principal).unwrap();
        assert!(!json.contains("secret"));
        let back: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(back.credential(), None);
        assert_eq!(back.dn, principal.dn);
    }

    #[test]
    fn tags_compare_by_revision_and_description() {
        let mut a = Tag::new(Revision::new(3), Some("before-import".into()));
        let b = Tag::new(Revision::new(3), Some("before-import".into()));
        a.tag_date = "20260101000000.000Z".into();
        assert_eq!(a, b);
        assert_ne!(a, Tag::new(Revision::new(3), None));
        assert_ne!(a, Tag::new(Revision::new(4), Some("before-import".into())));
    }
}
