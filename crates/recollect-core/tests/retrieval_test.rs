//! End-to-end ingestion and retrieval through the memory manager.

use std::sync::Arc;

use recollect_core::config::RetrievalConfig;
use recollect_core::{
    FormatOptions, InMemoryStore, ManualClock, MemoryManager, RecollectConfig, SearchOptions,
};

const DAY_MS: i64 = 86_400_000;

fn manager(clock: Arc<ManualClock>, persist_access: bool) -> MemoryManager {
    let config = RecollectConfig::builder()
        .retrieval(RetrievalConfig {
            persist_access,
            ..RetrievalConfig::default()
        })
        .build();
    MemoryManager::with_clock(Arc::new(InMemoryStore::new()), clock, config)
}

#[tokio::test]
async fn test_newer_memory_outranks_older_one() {
    let clock = Arc::new(ManualClock::new(0));
    let manager = manager(clock.clone(), true);

    manager.store_from_text("I live in Boston.", "claude").await;
    clock.advance(15 * DAY_MS);
    manager.store_from_text("I moved to Boston.", "claude").await;

    let results = manager.search("boston", &SearchOptions::default()).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].memory.timestamp, 15 * DAY_MS);
    assert!(results[0].score > results[1].score);
}

#[tokio::test]
async fn test_platform_filter_and_limit() {
    let clock = Arc::new(ManualClock::new(0));
    let manager = manager(clock, true);

    manager.store_from_text("I like chess.", "claude").await;
    manager.store_from_text("I love chess.", "chatgpt").await;
    manager.store_from_text("I adore chess.", "gemini").await;

    let options = SearchOptions::default().with_platform("chatgpt");
    let results = manager.search("chess", &options).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].memory.metadata.platform, "chatgpt");

    let results = manager
        .search("chess", &SearchOptions::default().with_limit(2))
        .await;
    assert_eq!(results.len(), 2);
}

// Whether retrievals should feed the access boost is configurable; both
// settings are pinned here end to end.

#[tokio::test]
async fn test_access_ambiguity_enabled_counts_grow() {
    let clock = Arc::new(ManualClock::new(0));
    let manager = manager(clock, true);
    manager.store_from_text("I like chess.", "cli").await;

    for limit in 1..=3 {
        // Distinct options so every call misses the cache.
        manager
            .search("chess", &SearchOptions::default().with_limit(limit))
            .await;
    }
    manager.flush_access().await;

    assert_eq!(manager.list().await[0].access_count, 3);
}

#[tokio::test]
async fn test_access_ambiguity_disabled_counts_stay_zero() {
    let clock = Arc::new(ManualClock::new(0));
    let manager = manager(clock, false);
    manager.store_from_text("I like chess.", "cli").await;

    for limit in 1..=3 {
        manager
            .search("chess", &SearchOptions::default().with_limit(limit))
            .await;
    }
    manager.flush_access().await;

    assert_eq!(manager.list().await[0].access_count, 0);
}

#[tokio::test]
async fn test_cache_hit_records_no_access() {
    let clock = Arc::new(ManualClock::new(0));
    let manager = manager(clock, true);
    manager.store_from_text("I like chess.", "cli").await;

    for _ in 0..3 {
        manager.search("chess", &SearchOptions::default()).await;
    }
    manager.flush_access().await;

    assert_eq!(manager.list().await[0].access_count, 1);
    assert_eq!(manager.stats().await.counters.prompts_enhanced, 1);
}

#[tokio::test]
async fn test_grouped_context() {
    let clock = Arc::new(ManualClock::new(0));
    let manager = manager(clock, true);
    manager
        .store_from_text("My name is Alice and I live in Boston. I like hiking.", "cli")
        .await;

    let format = FormatOptions {
        group_by_category: true,
        ..FormatOptions::default()
    };
    let context = manager
        .get_context(
            "alice boston hiking",
            &SearchOptions::default(),
            &format,
        )
        .await;

    assert!(context.contains("IDENTITY:\n- alice"));
    assert!(context.contains("LOCATION:\n- boston"));
    assert!(context.contains("PREFERENCE:\n- hiking"));
    assert!(context.chars().count() <= format.max_length);
}
