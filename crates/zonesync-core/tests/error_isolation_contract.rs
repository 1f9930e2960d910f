//! Architectural Contract Test: Error Isolation and Non-Commit
//!
//! Within an iteration, one bad record must not block the others.
//! Across iterations, any failure prevents the baseline commit, so
//! every failed key is retried until it converges.
//!
//! Constraints verified:
//! - When one key's operation fails, the other keys are still
//!   attempted in the same iteration
//! - A failed iteration does not advance the baseline, and the next
//!   iteration retries every uncommitted key
//! - The committed snapshot version is non-decreasing across mixed
//!   success/failure histories

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::*;
use zonesync_core::{Record, RecordType, ReconcileOutcome};

#[tokio::test]
async fn failing_key_does_not_block_other_keys() {
    // One key per zone so the failure switch hits exactly one key
    let provider = Arc::new(MockZoneProvider::new(["one.example.", "two.example."]));
    let controller = controller_over(&provider);

    controller.mark_ready("ingress", true);
    controller.replace(
        "ingress",
        "svc-1",
        vec![Record::new("a.one.example", RecordType::A, "1.2.3.4")],
    );
    controller.replace(
        "ingress",
        "svc-2",
        vec![Record::new("b.two.example", RecordType::A, "5.6.7.8")],
    );

    provider.zone("one.example.").fail_adds.store(true, Ordering::SeqCst);

    assert!(controller.reconcile_once().await.is_err());

    // Both keys were attempted
    assert_eq!(provider.zone("one.example.").add_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.zone("two.example.").add_calls.load(Ordering::SeqCst), 1);
    // The healthy key actually landed
    assert_eq!(provider.zone("two.example.").record_sets().len(), 1);
    // No baseline was committed
    assert_eq!(controller.status().last_applied_version, None);
}

#[tokio::test]
async fn failed_iteration_retries_all_keys_next_cycle() {
    let provider = Arc::new(MockZoneProvider::new(["one.example.", "two.example."]));
    let controller = controller_over(&provider);

    controller.mark_ready("ingress", true);
    controller.replace(
        "ingress",
        "svc-1",
        vec![Record::new("a.one.example", RecordType::A, "1.2.3.4")],
    );
    controller.replace(
        "ingress",
        "svc-2",
        vec![Record::new("b.two.example", RecordType::A, "5.6.7.8")],
    );

    provider.zone("one.example.").fail_adds.store(true, Ordering::SeqCst);
    assert!(controller.reconcile_once().await.is_err());

    // Backend recovers; with no commit, old != new still holds for
    // both keys and both are reapplied
    provider.zone("one.example.").fail_adds.store(false, Ordering::SeqCst);
    let outcome = controller.reconcile_once().await.unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            updated: 2,
            deleted: 0
        }
    );

    assert_eq!(provider.zone("one.example.").add_calls.load(Ordering::SeqCst), 2);
    assert_eq!(provider.zone("two.example.").add_calls.load(Ordering::SeqCst), 2);
    assert!(controller.status().last_applied_version.is_some());
}

#[tokio::test]
async fn failed_remove_does_not_block_update_and_both_retry() {
    let provider = Arc::new(MockZoneProvider::new(["example.com."]));
    let controller = controller_over(&provider);

    controller.mark_ready("ingress", true);
    controller.replace(
        "ingress",
        "svc-1",
        vec![Record::new("a.example.com", RecordType::A, "1.2.3.4")],
    );
    controller.replace(
        "ingress",
        "svc-2",
        vec![Record::new("b.example.com", RecordType::A, "5.6.7.8")],
    );
    controller.reconcile_once().await.unwrap();
    let committed = controller.status().last_applied_version;

    // Retract one key, change the other, and make removal fail
    let zone = provider.zone("example.com.");
    zone.fail_removes.store(true, Ordering::SeqCst);
    controller.replace("ingress", "svc-1", vec![]);
    controller.replace(
        "ingress",
        "svc-2",
        vec![Record::new("b.example.com", RecordType::A, "9.9.9.9")],
    );

    assert!(controller.reconcile_once().await.is_err());
    // The update went through even though the delete failed
    assert!(
        zone.added_sets()
            .iter()
            .any(|rs| rs.rdata == vec!["9.9.9.9".to_string()])
    );
    // Baseline unchanged
    assert_eq!(controller.status().last_applied_version, committed);

    // Next cycle retries both the delete and the (unchanged-vs-
    // baseline) update
    zone.fail_removes.store(false, Ordering::SeqCst);
    let outcome = controller.reconcile_once().await.unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            updated: 1,
            deleted: 1
        }
    );
    let remaining = zone.record_sets();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "b.example.com.");
    assert_eq!(remaining[0].rdata, vec!["9.9.9.9".to_string()]);
}

#[tokio::test]
async fn committed_version_is_monotonic() {
    let provider = Arc::new(MockZoneProvider::new(["example.com."]));
    let controller = controller_over(&provider);

    controller.mark_ready("ingress", true);

    let mut last_seen = 0u64;
    for round in 0u8..6 {
        controller.replace(
            "ingress",
            "svc-1",
            vec![Record::new(
                "a.example.com",
                RecordType::A,
                format!("10.0.0.{round}"),
            )],
        );

        // Alternate failing and healthy iterations
        let fail = round % 2 == 0;
        provider
            .zone("example.com.")
            .fail_adds
            .store(fail, Ordering::SeqCst);
        let result = controller.reconcile_once().await;
        assert_eq!(result.is_err(), fail);

        if let Some(version) = controller.status().last_applied_version {
            assert!(version >= last_seen, "committed version went backwards");
            last_seen = version;
        }
    }
    assert!(last_seen > 0);
}
