//! Integration test: full feed lifecycle flow.
//!
//! Exercises the complete initialize -> submit -> query -> reconfigure ->
//! suspend pipeline on a single commodity feed:
//! 1. Initialize the feed with config, writer, and reference adapter
//! 2. Submit a series of observations and verify round assignment
//! 3. Query latest, point, and range views
//! 4. Replace the validation config and verify the new rules apply
//! 5. Suspend the feed, verify writes are blocked, resume
//! 6. Verify the event stream saw every successful mutation in order
//!
//! This test uses only the library crates (argus-feed, argus-types)
//! without requiring a running daemon process.

use std::sync::Arc;

use argus_feed::reference::FixedReferenceFeed;
use argus_feed::service::CommodityFeed;
use argus_feed::FeedError;
use argus_types::events::FeedEvent;
use argus_types::feed::OracleConfig;
use argus_types::AccountId;

/// Simulated start timestamp for deterministic testing.
const T0: u64 = 1_700_000_000;

/// One hour in seconds, the update interval used throughout.
const HOUR: u64 = 3600;

#[tokio::test]
async fn full_lifecycle_initialize_to_suspension() {
    // =========================================================
    // Step 1: Initialize the feed
    // =========================================================
    let writer: AccountId = rand::random();
    let intruder: AccountId = rand::random();

    let config = OracleConfig {
        min_answer: 10,
        max_answer: 100_000,
        update_interval: HOUR,
        heartbeat: 24 * HOUR,
        deviation_threshold: 50,
    };
    let reference = Arc::new(FixedReferenceFeed::new(52_000, T0));
    let feed = CommodityFeed::new();
    feed.initialize("XAU", reference.clone(), config, writer, T0)
        .await
        .expect("Feed initialization should succeed");

    assert_eq!(
        feed.category().await.expect("Category query should succeed"),
        "XAU",
        "Category must match the initialize argument"
    );
    let mut events = feed.subscribe();

    // =========================================================
    // Step 2: Submit observations, verify dense round ids
    // =========================================================
    let prices = [52_100_i64, 52_250, 52_180, 52_400];
    for (i, price) in prices.iter().enumerate() {
        let submitted_at = T0 + (i as u64 + 1) * HOUR;
        let round_id = feed
            .append(writer, *price, submitted_at)
            .await
            .expect("In-bounds, well-spaced submission should succeed");
        assert_eq!(
            round_id,
            i as u64 + 1,
            "Round ids must be dense and start at 1"
        );
    }
    assert_eq!(
        feed.current_round_id()
            .await
            .expect("Round query should succeed"),
        prices.len() as u64 + 1,
        "After N accepted observations the next round id must be N+1"
    );

    // An unauthorized caller must not get through, even with valid data.
    let err = feed
        .append(intruder, 52_500, T0 + 10 * HOUR)
        .await
        .expect_err("Non-writer submission must be rejected");
    assert!(matches!(err, FeedError::Unauthorized));

    // =========================================================
    // Step 3: Query latest, point, and range views
    // =========================================================
    let latest = feed.latest().await.expect("Latest query should succeed");
    assert_eq!(latest.round_id, 4);
    assert_eq!(latest.price, 52_400);
    assert!(latest.valid, "Accepted observations are stored valid");

    let second = feed.at(2).await.expect("Point query should succeed");
    assert_eq!(second.price, 52_250);

    let middle = feed.range(2, 3).await.expect("Range query should succeed");
    assert_eq!(middle.len(), 2, "Range is inclusive on both ends");
    assert_eq!(middle[0].round_id, 2);
    assert_eq!(middle[1].round_id, 3);

    // The latest round is not yet range-queryable (end must be < current).
    let err = feed
        .range(1, 5)
        .await
        .expect_err("Range past the recorded history must be rejected");
    assert!(matches!(err, FeedError::InvalidRange { start: 1, end: 5 }));

    // Observations serialize with their full field set for the wire.
    let wire = serde_json::to_value(latest).expect("Observation should serialize");
    assert_eq!(wire["round_id"], 4);
    assert_eq!(wire["price"], 52_400);
    assert_eq!(wire["valid"], true);

    // =========================================================
    // Step 4: Replace the config, verify the new rules apply
    // =========================================================
    let tightened = OracleConfig {
        min_answer: 52_000,
        max_answer: 53_000,
        update_interval: 2 * HOUR,
        heartbeat: 24 * HOUR,
        deviation_threshold: 50,
    };
    feed.replace_config(writer, tightened, T0 + 4 * HOUR + 1)
        .await
        .expect("Writer config replacement should succeed");
    assert_eq!(
        feed.get_config().await.expect("Config query should succeed"),
        tightened
    );

    // Old bounds no longer apply; new interval does.
    let err = feed
        .append(writer, 51_000, T0 + 6 * HOUR)
        .await
        .expect_err("Price below the new lower bound must be rejected");
    assert!(matches!(err, FeedError::OutOfBounds { min: 52_000, .. }));

    let err = feed
        .append(writer, 52_500, T0 + 5 * HOUR)
        .await
        .expect_err("Submission inside the widened interval must be rejected");
    assert!(matches!(err, FeedError::TooSoon { .. }));

    let round_id = feed
        .append(writer, 52_500, T0 + 6 * HOUR)
        .await
        .expect("Submission under the new rules should succeed");
    assert_eq!(round_id, 5);

    // =========================================================
    // Step 5: Suspend, verify writes blocked, resume
    // =========================================================
    feed.suspend().await.expect("Suspension should succeed");
    assert!(feed
        .is_suspended()
        .await
        .expect("Suspension query should succeed"));

    let err = feed
        .append(writer, 52_600, T0 + 9 * HOUR)
        .await
        .expect_err("Suspended feed must reject submissions");
    assert!(matches!(err, FeedError::Suspended));

    let err = feed
        .replace_config(writer, config, T0 + 9 * HOUR)
        .await
        .expect_err("Suspended feed must reject config replacement");
    assert!(matches!(err, FeedError::Suspended));

    // Reads keep working while suspended.
    assert_eq!(
        feed.latest()
            .await
            .expect("Reads must survive suspension")
            .round_id,
        5
    );

    feed.resume().await.expect("Resume should succeed");
    let round_id = feed
        .append(writer, 52_600, T0 + 9 * HOUR)
        .await
        .expect("Resumed feed should accept submissions again");
    assert_eq!(round_id, 6);

    // =========================================================
    // Step 6: Event stream saw every successful mutation, in order
    // =========================================================
    let expected_rounds = [1_u64, 2, 3, 4];
    for expected in expected_rounds {
        match events.try_recv().expect("Event should be buffered") {
            FeedEvent::PriceUpdated { round_id, .. } => assert_eq!(round_id, expected),
            other => panic!("Expected PriceUpdated, got {other:?}"),
        }
    }
    match events.try_recv().expect("Config event should be buffered") {
        FeedEvent::ConfigUpdated {
            update_interval, ..
        } => assert_eq!(update_interval, 2 * HOUR),
        other => panic!("Expected ConfigUpdated, got {other:?}"),
    }
    for expected in [5_u64, 6] {
        match events.try_recv().expect("Event should be buffered") {
            FeedEvent::PriceUpdated { round_id, .. } => assert_eq!(round_id, expected),
            other => panic!("Expected PriceUpdated, got {other:?}"),
        }
    }
    assert!(
        events.try_recv().is_err(),
        "Rejected calls must not produce events"
    );
}

#[tokio::test]
async fn reference_feed_cross_check_flow() {
    // =========================================================
    // Step 1: Initialize with a live reference quote
    // =========================================================
    let writer: AccountId = rand::random();
    let config = OracleConfig {
        min_answer: 10,
        max_answer: 100_000,
        update_interval: HOUR,
        heartbeat: 24 * HOUR,
        deviation_threshold: 50,
    };
    let reference = Arc::new(FixedReferenceFeed::new(52_000, T0));
    let feed = CommodityFeed::new();
    feed.initialize("XAU", reference.clone(), config, writer, T0)
        .await
        .expect("Feed initialization should succeed");

    // =========================================================
    // Step 2: Fresh quote passes validation
    // =========================================================
    let price = feed
        .fetch_reference_price(T0 + HOUR)
        .await
        .expect("Fresh reference quote should validate");
    assert_eq!(price, 52_000);

    // =========================================================
    // Step 3: An aged quote is rejected as stale
    // =========================================================
    let err = feed
        .fetch_reference_price(T0 + 24 * HOUR + 1)
        .await
        .expect_err("Quote older than the heartbeat must be rejected");
    assert!(matches!(err, FeedError::StaleReference { .. }));

    // =========================================================
    // Step 4: Reference outcomes never touch the ledger
    // =========================================================
    reference.set(-5, T0 + 24 * HOUR);
    let err = feed
        .fetch_reference_price(T0 + 24 * HOUR)
        .await
        .expect_err("Non-positive quote must be rejected");
    assert!(matches!(err, FeedError::InvalidReference(-5)));

    let err = feed
        .latest()
        .await
        .expect_err("Reference fetches must not create observations");
    assert!(matches!(err, FeedError::NotFound));
    assert_eq!(
        feed.current_round_id()
            .await
            .expect("Round query should succeed"),
        1,
        "Reference fetches must not advance the round counter"
    );
}
