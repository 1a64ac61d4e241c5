//! Seeded partition fixtures with known value distributions.

use dirdb_core::partition::MemoryPartition;
use dirdb_core::{Dn, Entry};

/// Parses a DN, panicking on failure.
///
/// Test-only convenience so fixtures read as the LDAP strings they
/// stand for.
#[must_use]
pub fn dn(input: &str) -> Dn {
    Dn::parse(input).expect("fixture DN must parse")
}

/// A partition seeded with a known population of person entries.
pub struct PeopleFixture {
    /// The seeded partition, indexed on `sn`, `cn`, and `uid`.
    pub partition: MemoryPartition,
    /// Suffix of the partition.
    pub suffix: Dn,
    /// DN of the organizational unit holding the people.
    pub people: Dn,
}

/// Seeds a partition under `dc=example,dc=com` with ten entries: the
/// suffix entry, `ou=people`, and eight people with this distribution:
///
/// | attribute | value  | count |
/// |-----------|--------|-------|
/// | `sn`      | smith  | 5     |
/// | `sn`      | jones  | 3     |
/// | `cn`      | alice  | 2     |
/// | `cn`      | bob    | 6     |
/// | `uid`     | user-N | 1each |
///
/// Every person carries `objectClass: person`, so the total for an
/// indexed attribute differs from the partition's entry count.
#[must_use]
pub fn people_partition() -> PeopleFixture {
    let suffix = dn("dc=example,dc=com");
    let partition = MemoryPartition::with_indexes(suffix.clone(), &["sn", "cn", "uid"]);

    let mut root = Entry::new();
    root.add("objectclass", "domain");
    root.add("dc", "example");
    partition
        .add_entry(&suffix, root)
        .expect("fixture suffix entry");

    let people = dn("ou=people,dc=example,dc=com");
    let mut unit = Entry::new();
    unit.add("objectclass", "organizationalUnit");
    unit.add("ou", "people");
    partition.add_entry(&people, unit).expect("fixture ou entry");

    let surnames = [
        "smith", "smith", "smith", "smith", "smith", "jones", "jones", "jones",
    ];
    for (i, sn) in surnames.iter().enumerate() {
        let cn = if i < 2 { "alice" } else { "bob" };
        let uid = format!("user-{i}");
        let mut entry = Entry::new();
        entry.add("objectclass", "person");
        entry.add("sn", sn);
        entry.add("cn", cn);
        entry.add("uid", &uid);
        let entry_dn = dn(&format!("uid={uid},ou=people,dc=example,dc=com"));
        partition.add_entry(&entry_dn, entry).expect("fixture person");
    }

    PeopleFixture {
        partition,
        suffix,
        people,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirdb_core::partition::Partition;

    #[test]
    fn fixture_population() {
        let fixture = people_partition();
        assert_eq!(fixture.partition.count().unwrap(), 10);
        let sn = fixture.partition.user_index("sn").unwrap();
        assert_eq!(sn.count_value("smith").unwrap(), 5);
        assert_eq!(sn.count_value("jones").unwrap(), 3);
        let cn = fixture.partition.user_index("cn").unwrap();
        assert_eq!(cn.count_value("alice").unwrap(), 2);
        assert_eq!(cn.count_value("bob").unwrap(), 6);
    }
}
