//! Integration tests for long-press detection.
//!
//! All tests run on a paused tokio clock; `sleep` in the test body advances
//! virtual time, which lets the runtime's timer tasks fire deterministically.

mod common;

use std::time::Duration;

use common::{dial, key, will_appear, Harness, DIAL_ACTION, KEY_ACTION};
use serde_json::json;
use tokio::time::sleep;

const THRESHOLD: Duration = Duration::from_millis(1000);

#[tokio::test(start_paused = true)]
async fn test_held_key_fires_long_press_and_suppresses_key_up() {
    // Arrange
    let harness = Harness::with_threshold(THRESHOLD);
    harness.feed(&will_appear("c1", KEY_ACTION, None)).await;

    // Act
    harness.feed(&key("keyDown", "c1")).await;
    sleep(Duration::from_millis(1500)).await;
    let release = harness.runtime.accept_frame(&key("keyUp", "c1")).await;

    // Assert
    assert!(release.is_none(), "key_up must not run after a long press");
    assert_eq!(
        harness.action_calls(),
        vec!["will_appear:c1:Keypad", "key_down:c1(0, 1)", "long_key_press:c1"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_quick_release_is_a_short_press() {
    // Arrange
    let harness = Harness::with_threshold(THRESHOLD);
    harness.feed(&will_appear("c1", KEY_ACTION, None)).await;

    // Act
    harness.feed(&key("keyDown", "c1")).await;
    sleep(Duration::from_millis(200)).await;
    harness.feed(&key("keyUp", "c1")).await;
    sleep(Duration::from_secs(3)).await;

    // Assert: the stale timer wakes up but finds nothing to fire
    assert_eq!(harness.journal.count("key_up:c1"), 1);
    assert_eq!(harness.journal.count("long_key_press"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_long_press_fires_once_while_still_held() {
    let harness = Harness::with_threshold(THRESHOLD);
    harness.feed(&will_appear("c1", KEY_ACTION, None)).await;

    harness.feed(&key("keyDown", "c1")).await;
    sleep(Duration::from_secs(5)).await;

    assert_eq!(harness.journal.count("long_key_press:c1"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_old_timer_does_not_fire_for_a_newer_press() {
    // Arrange
    let harness = Harness::with_threshold(THRESHOLD);
    harness.feed(&will_appear("c1", KEY_ACTION, None)).await;

    // Act: short press, then a second press held across the first
    // press's deadline but released before its own
    harness.feed(&key("keyDown", "c1")).await;
    sleep(Duration::from_millis(600)).await;
    harness.feed(&key("keyUp", "c1")).await;
    harness.feed(&key("keyDown", "c1")).await;
    sleep(Duration::from_millis(600)).await;
    harness.feed(&key("keyUp", "c1")).await;
    sleep(Duration::from_secs(2)).await;

    // Assert
    assert_eq!(harness.journal.count("key_up:c1"), 2);
    assert_eq!(harness.journal.count("long_key_press"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_disappearing_while_held_cancels_long_press() {
    let harness = Harness::with_threshold(THRESHOLD);
    harness.feed(&will_appear("c1", KEY_ACTION, None)).await;

    harness.feed(&key("keyDown", "c1")).await;
    harness
        .feed(&common::envelope(
            "willDisappear",
            "c1",
            KEY_ACTION,
            json!({"settings": {}}),
        ))
        .await;
    sleep(Duration::from_secs(2)).await;

    assert_eq!(harness.journal.count("long_key_press"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_held_dial_fires_long_dial_press_and_suppresses_dial_up() {
    // Arrange
    let harness = Harness::with_threshold(THRESHOLD);
    harness.feed(&will_appear("d1", DIAL_ACTION, Some("Encoder"))).await;

    // Act
    harness.feed(&dial("dialDown", "d1", json!({}))).await;
    sleep(Duration::from_millis(1200)).await;
    harness.feed(&dial("dialUp", "d1", json!({}))).await;

    // Assert
    assert_eq!(
        harness.action_calls(),
        vec!["will_appear:d1:Encoder", "dial_down:d1", "long_dial_press:d1"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_threshold_follows_config() {
    let harness = Harness::with_threshold(Duration::from_millis(250));
    harness.feed(&will_appear("c1", KEY_ACTION, None)).await;

    harness.feed(&key("keyDown", "c1")).await;
    sleep(Duration::from_millis(300)).await;

    assert_eq!(harness.journal.count("long_key_press:c1"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_presses_on_different_contexts_are_independent() {
    let harness = Harness::with_threshold(THRESHOLD);
    harness.feed(&will_appear("c1", KEY_ACTION, None)).await;
    harness.feed(&will_appear("c2", KEY_ACTION, None)).await;

    harness.feed(&key("keyDown", "c1")).await;
    harness.feed(&key("keyDown", "c2")).await;
    sleep(Duration::from_millis(100)).await;
    harness.feed(&key("keyUp", "c2")).await;
    sleep(Duration::from_millis(1500)).await;

    assert_eq!(harness.journal.count("long_key_press:c1"), 1);
    assert_eq!(harness.journal.count("long_key_press:c2"), 0);
    assert_eq!(harness.journal.count("key_up:c2"), 1);
}
