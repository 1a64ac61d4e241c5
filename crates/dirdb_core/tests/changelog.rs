//! End-to-end changelog tests: commit, tag, revert, and restart.

use dirdb_core::aci::AuthenticationLevel;
use dirdb_core::changelog::{
    ChangeApplier, ChangeLog, FileChangeLogStore, MemoryDirectory, Principal,
};
use dirdb_core::ldif::{LdifChange, ModOp, Modification};
use dirdb_core::{Dn, Entry, Revision};

fn admin() -> Principal {
    Principal::new(
        Dn::parse("uid=admin,ou=system").unwrap(),
        AuthenticationLevel::Simple,
    )
}

fn person(cn: &str, sn: &str) -> Entry {
    let mut entry = Entry::new();
    entry.add("objectclass", "person");
    entry.add("cn", cn);
    entry.add("sn", sn);
    entry
}

/// Applies a change to the directory and logs it with its reverse.
fn commit(
    log: &ChangeLog<FileChangeLogStore>,
    directory: &mut MemoryDirectory,
    change: LdifChange,
) -> Revision {
    let reverse = directory.apply(&change).expect("change applies");
    log.log(&admin(), change, reverse).expect("change logs").revision
}

#[test]
fn tag_then_revert_restores_tagged_content() {
    let log = ChangeLog::new(FileChangeLogStore::in_memory());
    log.init().unwrap();
    let mut directory = MemoryDirectory::new();

    let alice = Dn::parse("cn=alice,dc=example").unwrap();
    let bob = Dn::parse("cn=bob,dc=example").unwrap();
    commit(&log, &mut directory, LdifChange::Add {
        dn: alice.clone(),
        entry: person("alice", "smith"),
    });
    let tag = log.tag_with_description("two-entries-next").unwrap();
    assert_eq!(tag.revision, Revision::new(1));

    commit(&log, &mut directory, LdifChange::Add {
        dn: bob.clone(),
        entry: person("bob", "jones"),
    });
    commit(&log, &mut directory, LdifChange::Modify {
        dn: alice.clone(),
        mods: vec![Modification::new(
            ModOp::Replace,
            "sn",
            vec!["smythe".into()],
        )],
    });
    assert_eq!(log.current_revision(), Revision::new(3));

    let after = log.revert_to_latest_tag(&admin(), &mut directory).unwrap();

    // Two events undone, each re-logged as one new event.
    assert_eq!(after, Revision::new(5));
    assert!(!directory.contains(&bob));
    assert_eq!(*directory.entry(&alice).unwrap(), person("alice", "smith"));
}

#[test]
fn tagging_the_same_revision_twice_keeps_the_first_tag() {
    let log = ChangeLog::new(FileChangeLogStore::in_memory());
    log.init().unwrap();
    let mut directory = MemoryDirectory::new();
    commit(&log, &mut directory, LdifChange::Add {
        dn: Dn::parse("cn=alice,dc=example").unwrap(),
        entry: person("alice", "smith"),
    });

    let first = log.tag_with_description("checkpoint").unwrap();
    let second = log.tag_with_description("renamed-checkpoint").unwrap();
    assert_eq!(first, second);
    assert_eq!(second.description.as_deref(), Some("checkpoint"));
}

#[test]
fn revert_keeps_the_log_append_only() {
    let log = ChangeLog::new(FileChangeLogStore::in_memory());
    log.init().unwrap();
    let mut directory = MemoryDirectory::new();

    let dn = Dn::parse("cn=alice,dc=example").unwrap();
    commit(&log, &mut directory, LdifChange::Add {
        dn: dn.clone(),
        entry: person("alice", "smith"),
    });
    log.revert(Revision::new(0), &admin(), &mut directory).unwrap();

    // The original event is still there, and the revert's event holds
    // the reverse as its forward change.
    let original = log.event_at(Revision::new(1)).unwrap();
    assert!(matches!(original.forward, LdifChange::Add { .. }));
    let revert_event = log.event_at(Revision::new(2)).unwrap();
    assert_eq!(revert_event.forward, LdifChange::Delete { dn });

    // And the revert event is itself invertible.
    log.revert(Revision::new(1), &admin(), &mut directory).unwrap();
    assert_eq!(log.current_revision(), Revision::new(3));
    assert_eq!(
        *directory.entry(&Dn::parse("cn=alice,dc=example").unwrap()).unwrap(),
        person("alice", "smith")
    );
}

#[test]
fn state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("changelog.db");
    let alice = Dn::parse("cn=alice,dc=example").unwrap();

    {
        let log = ChangeLog::new(FileChangeLogStore::at_path(&path));
        log.init().unwrap();
        let mut directory = MemoryDirectory::new();
        commit(&log, &mut directory, LdifChange::Add {
            dn: alice.clone(),
            entry: person("alice", "smith"),
        });
        log.tag_with_description("before-shutdown").unwrap();
        log.sync().unwrap();
    }

    let log = ChangeLog::new(FileChangeLogStore::at_path(&path));
    log.init().unwrap();
    assert_eq!(log.current_revision(), Revision::new(1));
    assert_eq!(
        log.latest_tag().unwrap().description.as_deref(),
        Some("before-shutdown")
    );

    // The reloaded log carries enough to revert changes made before
    // the restart.
    let mut directory = MemoryDirectory::new();
    directory
        .apply(&LdifChange::Add {
            dn: alice.clone(),
            entry: person("alice", "smith"),
        })
        .unwrap();
    log.revert(Revision::new(0), &admin(), &mut directory).unwrap();
    assert!(!directory.contains(&alice));
}

#[test]
fn committer_credentials_never_reach_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("changelog.db");

    let committer = admin().with_credential(b"s3cret-material".to_vec());
    {
        let log = ChangeLog::new(FileChangeLogStore::at_path(&path));
        log.init().unwrap();
        let mut directory = MemoryDirectory::new();
        let change = LdifChange::Add {
            dn: Dn::parse("cn=alice,dc=example").unwrap(),
            entry: person("alice", "smith"),
        };
        let reverse = directory.apply(&change).unwrap();
        log.log(&committer, change, reverse).unwrap();
        log.sync().unwrap();
    }

    let raw = std::fs::read(&path).unwrap();
    assert!(!raw
        .windows(b"s3cret-material".len())
        .any(|window| window == b"s3cret-material"));

    let log = ChangeLog::new(FileChangeLogStore::at_path(&path));
    log.init().unwrap();
    let event = log.event_at(Revision::new(1)).unwrap();
    assert_eq!(event.committer.dn, committer.dn);
    assert_eq!(event.committer.credential(), None);
}
