// SPDX-License-Identifier: MIT OR Apache-2.0

use gavel_core::{AccessMode, ObjectRef, ObjectType};
use gavel_store::{AclStore, MemoryStore, RelationshipStore};
use serde_json::json;

use crate::access::Action;
use crate::cache::PermissionCache;
use crate::propagation::Propagator;
use crate::provider::{PermissionProvider, SystemRole};
use crate::rules::RuleSet;
use crate::test_utils::{grant, relate, seeded_store};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn obj(kind: ObjectType, id: u64) -> ObjectRef {
    ObjectRef::new(kind, id)
}

/// Program → audit → assessment tree with a comment, a piece of evidence
/// and a snapshot hanging off it.
fn audit_tree(store: &mut MemoryStore) {
    let program = obj(ObjectType::Program, 1);
    let audit = obj(ObjectType::Audit, 1);
    let assessment = obj(ObjectType::Assessment, 1);

    relate(store, 1, program, audit);
    relate(store, 2, audit, assessment);
    relate(store, 3, assessment, obj(ObjectType::Comment, 1));
    relate(store, 4, assessment, obj(ObjectType::Evidence, 1));
    relate(store, 5, audit, obj(ObjectType::Snapshot, 1));
}

#[test]
fn program_manager_reaches_the_whole_audit_tree() {
    init_logging();

    let mut store = seeded_store();
    audit_tree(&mut store);
    let alice = 100;
    let entry = grant(&mut store, obj(ObjectType::Program, 1), "Program Managers", alice);

    let rules = RuleSet::builtin();
    let outcome = Propagator::new(&rules)
        .propagate_entries(&mut store, &[entry])
        .unwrap();

    // Audit, assessment, comment, evidence and snapshot each gained a
    // derived grant.
    assert_eq!(outcome.created.len(), 5);
    assert_eq!(outcome.touched.iter().copied().collect::<Vec<_>>(), vec![alice]);

    let on_audit = store.acls_on(obj(ObjectType::Audit, 1)).unwrap();
    assert_eq!(on_audit.len(), 1);
    assert_eq!(on_audit[0].mode, AccessMode::RUD);
    assert_eq!(on_audit[0].parent, Some(entry));
    assert_eq!(on_audit[0].via, Some(1));

    let on_assessment = store.acls_on(obj(ObjectType::Assessment, 1)).unwrap();
    assert_eq!(on_assessment.len(), 1);
    assert_eq!(on_assessment[0].mode, AccessMode::RUD);
    assert_eq!(on_assessment[0].parent, Some(on_audit[0].id));

    // Comments are never writable, evidence and snapshots never deletable.
    assert_eq!(store.acls_on(obj(ObjectType::Comment, 1)).unwrap()[0].mode, AccessMode::R);
    assert_eq!(store.acls_on(obj(ObjectType::Evidence, 1)).unwrap()[0].mode, AccessMode::RU);
    assert_eq!(store.acls_on(obj(ObjectType::Snapshot, 1)).unwrap()[0].mode, AccessMode::RU);
}

#[test]
fn program_reader_gets_the_read_only_projection() {
    let mut store = seeded_store();
    audit_tree(&mut store);
    let bob = 101;
    let entry = grant(&mut store, obj(ObjectType::Program, 1), "Program Readers", bob);

    let rules = RuleSet::builtin();
    let outcome = Propagator::new(&rules)
        .propagate_entries(&mut store, &[entry])
        .unwrap();

    assert_eq!(outcome.created.len(), 5);
    for entry in store.acls_for_person(bob).unwrap() {
        if entry.is_derived() {
            assert_eq!(entry.mode, AccessMode::R);
        }
    }
}

#[test]
fn propagation_is_idempotent_under_repeated_delivery() {
    let mut store = seeded_store();
    audit_tree(&mut store);
    let alice = 100;
    let entry = grant(&mut store, obj(ObjectType::Program, 1), "Program Managers", alice);

    let rules = RuleSet::builtin();
    let propagator = Propagator::new(&rules);
    let first = propagator.propagate_entries(&mut store, &[entry]).unwrap();
    assert_eq!(first.created.len(), 5);

    let second = propagator.propagate_entries(&mut store, &[entry]).unwrap();
    assert!(second.is_empty());
    assert_eq!(store.acls_for_person(alice).unwrap().len(), 6);
}

#[test]
fn re_delivery_picks_up_edges_added_in_between() {
    let mut store = seeded_store();
    let program = obj(ObjectType::Program, 1);
    let audit = obj(ObjectType::Audit, 1);
    let assessment = obj(ObjectType::Assessment, 1);
    relate(&mut store, 1, program, audit);

    let alice = 100;
    let entry = grant(&mut store, program, "Program Managers", alice);
    let rules = RuleSet::builtin();
    let propagator = Propagator::new(&rules);
    assert_eq!(
        propagator.propagate_entries(&mut store, &[entry]).unwrap().created.len(),
        1
    );

    // An edge appears without its own propagation call — a replayed or
    // concurrently delivered grant still completes the closure.
    relate(&mut store, 2, audit, assessment);
    let outcome = propagator.propagate_entries(&mut store, &[entry]).unwrap();
    assert_eq!(outcome.created.len(), 1);
    assert_eq!(store.acls_on(assessment).unwrap().len(), 1);
}

#[test]
fn late_relationships_extend_existing_grants() {
    let mut store = seeded_store();
    let program = obj(ObjectType::Program, 1);
    let audit = obj(ObjectType::Audit, 1);
    let assessment = obj(ObjectType::Assessment, 1);
    let comment = obj(ObjectType::Comment, 1);

    // The grant lands before any of the object graph exists.
    let alice = 100;
    let entry = grant(&mut store, program, "Program Managers", alice);
    let rules = RuleSet::builtin();
    let propagator = Propagator::new(&rules);
    let outcome = propagator.propagate_entries(&mut store, &[entry]).unwrap();
    assert!(outcome.is_empty());

    // Mapping the audit carries the grant one hop.
    relate(&mut store, 1, program, audit);
    let outcome = propagator.propagate_relationship(&mut store, 1).unwrap();
    assert_eq!(outcome.created.len(), 1);
    assert_eq!(store.acls_on(audit).unwrap()[0].mode, AccessMode::RUD);

    // Each further mapping keeps extending the derivation chain.
    relate(&mut store, 2, audit, assessment);
    let outcome = propagator.propagate_relationship(&mut store, 2).unwrap();
    assert_eq!(outcome.created.len(), 1);

    relate(&mut store, 3, assessment, comment);
    let outcome = propagator.propagate_relationship(&mut store, 3).unwrap();
    assert_eq!(outcome.created.len(), 1);
    let on_comment = store.acls_on(comment).unwrap();
    assert_eq!(on_comment[0].mode, AccessMode::R);
    assert_eq!(on_comment[0].via, Some(3));
}

#[test]
fn a_new_edge_fans_out_through_everything_behind_it() {
    let mut store = seeded_store();
    let program = obj(ObjectType::Program, 1);
    let audit = obj(ObjectType::Audit, 1);
    let assessment = obj(ObjectType::Assessment, 1);
    let evidence = obj(ObjectType::Evidence, 1);

    // Audit and its assessment tree exist, but are not yet mapped to the
    // program.
    relate(&mut store, 2, audit, assessment);
    relate(&mut store, 4, assessment, evidence);

    let alice = 100;
    let entry = grant(&mut store, program, "Program Managers", alice);
    let rules = RuleSet::builtin();
    let propagator = Propagator::new(&rules);
    assert!(propagator.propagate_entries(&mut store, &[entry]).unwrap().is_empty());

    // One new edge pulls the whole tree into reach.
    relate(&mut store, 1, program, audit);
    let outcome = propagator.propagate_relationship(&mut store, 1).unwrap();
    assert_eq!(outcome.created.len(), 3);
    assert_eq!(store.acls_on(evidence).unwrap()[0].mode, AccessMode::RU);
}

#[test]
fn revoking_a_grant_cascades_through_its_subtree() {
    let mut store = seeded_store();
    audit_tree(&mut store);
    let alice = 100;
    let entry = grant(&mut store, obj(ObjectType::Program, 1), "Program Managers", alice);

    let rules = RuleSet::builtin();
    let propagator = Propagator::new(&rules);
    propagator.propagate_entries(&mut store, &[entry]).unwrap();
    assert_eq!(store.acls_for_person(alice).unwrap().len(), 6);

    let outcome = propagator.revoke_entry(&mut store, entry).unwrap();
    assert_eq!(outcome.deleted.len(), 6);
    assert!(store.acls_for_person(alice).unwrap().is_empty());
}

#[test]
fn revoking_a_relationship_removes_only_what_it_carried() {
    let mut store = seeded_store();
    audit_tree(&mut store);
    let alice = 100;
    let entry = grant(&mut store, obj(ObjectType::Program, 1), "Program Managers", alice);

    let rules = RuleSet::builtin();
    let propagator = Propagator::new(&rules);
    propagator.propagate_entries(&mut store, &[entry]).unwrap();

    // Unmapping the assessment drops its grant and the comment and
    // evidence grants below it.
    let outcome = propagator.revoke_relationship(&mut store, 2).unwrap();
    assert_eq!(outcome.deleted.len(), 3);
    assert!(store.relationship(2).unwrap().is_none());

    // The program, audit and snapshot grants survive.
    assert_eq!(store.acls_for_person(alice).unwrap().len(), 3);
    assert!(!store.acls_on(obj(ObjectType::Snapshot, 1)).unwrap().is_empty());
    assert!(store.acls_on(obj(ObjectType::Assessment, 1)).unwrap().is_empty());
}

#[test]
fn parallel_derivation_paths_are_independent() {
    let mut store = seeded_store();
    audit_tree(&mut store);
    let alice = 100;
    let carol = 102;
    let manager = grant(&mut store, obj(ObjectType::Program, 1), "Program Managers", alice);
    let captain = grant(&mut store, obj(ObjectType::Audit, 1), "Audit Captains", carol);

    let rules = RuleSet::builtin();
    let propagator = Propagator::new(&rules);
    propagator
        .propagate_entries(&mut store, &[manager, captain])
        .unwrap();

    // The assessment carries one grant per derivation path.
    let on_assessment = store.acls_on(obj(ObjectType::Assessment, 1)).unwrap();
    assert_eq!(on_assessment.len(), 2);

    // Revoking carol's captaincy leaves alice's chain intact.
    let outcome = propagator.revoke_entry(&mut store, captain).unwrap();
    assert!(outcome.touched.contains(&carol));
    assert!(!outcome.touched.contains(&alice));
    assert_eq!(store.acls_on(obj(ObjectType::Assessment, 1)).unwrap().len(), 1);
    assert_eq!(store.acls_for_person(alice).unwrap().len(), 6);
    assert!(store.acls_for_person(carol).unwrap().is_empty());
}

#[test]
fn permissions_flow_from_propagated_grants() {
    let mut store = seeded_store();
    audit_tree(&mut store);
    let alice = 100;
    let entry = grant(&mut store, obj(ObjectType::Program, 1), "Program Managers", alice);

    let rules = RuleSet::builtin();
    Propagator::new(&rules)
        .propagate_entries(&mut store, &[entry])
        .unwrap();

    let mut provider = PermissionProvider::new();
    provider.assign(alice, SystemRole::Creator);
    let permissions = provider.permissions_for(&store, alice).unwrap();

    let assessment = obj(ObjectType::Assessment, 1);
    assert!(permissions.is_allowed_for(Action::Update, assessment, &json!({})));
    assert!(permissions.is_allowed_for(Action::Delete, assessment, &json!({})));

    // The comment grant arrived read-only.
    let comment = obj(ObjectType::Comment, 1);
    assert!(permissions.is_allowed_for(Action::Read, comment, &json!({})));
    assert!(!permissions.is_allowed_for(Action::Update, comment, &json!({})));

    // Another assessment is out of reach entirely.
    assert!(!permissions.is_allowed_for(
        Action::Read,
        obj(ObjectType::Assessment, 2),
        &json!({}),
    ));

    // The archived-audit freeze rides along on audit-scoped grants.
    assert!(!permissions.is_allowed_for(
        Action::Update,
        assessment,
        &json!({ "archived": true }),
    ));
}

#[test]
fn cache_invalidation_follows_the_touched_set() {
    let mut store = seeded_store();
    audit_tree(&mut store);
    let alice = 100;
    let bob = 101;
    let entry = grant(&mut store, obj(ObjectType::Program, 1), "Program Managers", alice);

    let provider = PermissionProvider::new();
    let mut cache = PermissionCache::new();
    for person in [alice, bob] {
        cache
            .get_or_compute(person, || provider.permissions_for(&store, person))
            .unwrap();
    }
    assert_eq!(cache.misses(), 2);

    // Before propagation alice cannot see the assessment.
    let assessment = obj(ObjectType::Assessment, 1);
    let cached = cache
        .get_or_compute(alice, || provider.permissions_for(&store, alice))
        .unwrap();
    assert!(!cached.is_allowed_for(Action::Read, assessment, &json!({})));

    let rules = RuleSet::builtin();
    let outcome = Propagator::new(&rules)
        .propagate_entries(&mut store, &[entry])
        .unwrap();
    cache.invalidate_many(outcome.touched.iter().copied());

    // Only alice was touched; bob's dictionary stayed cached.
    assert_eq!(cache.len(), 1);

    let refreshed = cache
        .get_or_compute(alice, || provider.permissions_for(&store, alice))
        .unwrap();
    assert!(refreshed.is_allowed_for(Action::Read, assessment, &json!({})));
}
