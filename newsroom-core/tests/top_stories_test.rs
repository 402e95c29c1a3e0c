use chrono::Utc;
use newsroom_core::TopStoriesTracker;
use newsroom_core::top_stories::ClassificationResult;
use newsroom_interfaces::TopStoryStatus;

fn result(id: &str, title: &str, label: &str) -> ClassificationResult {
    ClassificationResult { item_id: id.to_string(), title: title.to_string(), label: label.to_string(), reason: String::new() }
}

#[tokio::test]
async fn a_story_hit_across_four_consecutive_passes_becomes_persistent() {
    let tracker = TopStoriesTracker::new(1, 10, 24);

    for _ in 0..4 {
        let pass = vec![result("a", "ongoing story", "TOP")];
        tracker.update(&pass).await;
    }

    let breathing = tracker.breathing_list(&[result("a", "ongoing story", "TOP")]).await;
    assert_eq!(breathing.len(), 1);
    assert_eq!(breathing[0].status(), TopStoryStatus::Persistent);
}

#[tokio::test]
async fn two_consecutive_misses_move_a_story_to_fading() {
    let tracker = TopStoriesTracker::new(1, 10, 24);

    tracker.update(&[result("a", "fading story", "TOP")]).await;
    tracker.update(&[]).await;
    tracker.update(&[]).await;

    let breathing = tracker.breathing_list(&[]).await;
    assert_eq!(breathing.len(), 1);
    assert_eq!(breathing[0].status(), TopStoryStatus::Fading);
}

#[tokio::test]
async fn a_fresh_story_with_a_single_hit_is_breaking() {
    let tracker = TopStoriesTracker::new(1, 10, 24);
    let pass = vec![result("a", "brand new story", "BREAKING")];
    tracker.update(&pass).await;

    let breathing = tracker.breathing_list(&pass).await;
    assert_eq!(breathing[0].status(), TopStoryStatus::Breaking);
}

#[tokio::test]
async fn breathing_list_respects_the_configured_maximum() {
    let tracker = TopStoriesTracker::new(1, 2, 24);

    let pass: Vec<ClassificationResult> =
        (0..5).map(|i| result(&format!("s{i}"), &format!("story number {i}"), "TOP")).collect();
    tracker.update(&pass).await;

    let breathing = tracker.breathing_list(&pass).await;
    assert_eq!(breathing.len(), 2);
}

#[tokio::test]
async fn pruning_removes_entries_past_their_ttl() {
    let tracker = TopStoriesTracker::new(1, 10, 24);
    tracker.update(&[result("a", "old story", "TOP")]).await;

    tracker.prune(Utc::now() + chrono::Duration::hours(48)).await;

    let breathing = tracker.breathing_list(&[]).await;
    assert!(breathing.is_empty());
}

#[tokio::test]
async fn export_then_import_round_trips_the_cache() {
    let tracker = TopStoriesTracker::new(1, 10, 24);
    tracker.update(&[result("a", "round trip story", "TOP")]).await;

    let exported = tracker.export().await;
    assert_eq!(exported.len(), 1);

    let restored = TopStoriesTracker::new(1, 10, 24);
    restored.import(exported).await;

    let breathing = restored.breathing_list(&[]).await;
    assert_eq!(breathing.len(), 1);
    assert_eq!(breathing[0].item_id, "a");
}

#[tokio::test]
async fn missing_zingers_lists_only_entries_without_one() {
    let tracker = TopStoriesTracker::new(1, 10, 24);
    tracker.update(&[result("a", "needs a zinger", "TOP")]).await;

    assert_eq!(tracker.missing_zingers().await.len(), 1);

    tracker.set_zinger("a", "short punchy line".to_string()).await;
    assert!(tracker.missing_zingers().await.is_empty());
}
