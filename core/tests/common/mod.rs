// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use once_cell::sync::Lazy;
use park::{Payload, StageContext, StageDef, WorkItem};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

pub const DRAIN: Option<Duration> = Some(Duration::from_secs(10));

// --- Common Stage Creators ---
pub fn double() -> StageDef<i64> {
  StageDef::new("double", |_ctx: StageContext, p: Payload<i64>| async move {
    *p.write() *= 2;
    Ok::<_, anyhow::Error>(())
  })
}

pub fn add_one() -> StageDef<i64> {
  StageDef::new("add_one", |_ctx: StageContext, p: Payload<i64>| async move {
    *p.write() += 1;
    Ok::<_, anyhow::Error>(())
  })
}

pub fn fail_if_over(limit: i64) -> StageDef<i64> {
  StageDef::new("fail_if_over", move |_ctx: StageContext, p: Payload<i64>| async move {
    let value = *p.read();
    if value > limit {
      anyhow::bail!("{value} exceeds {limit}");
    }
    Ok(())
  })
}

/// Fails every payload for which `predicate` holds, leaving the payload untouched.
pub fn fail_when(name: &'static str, predicate: fn(i64) -> bool) -> StageDef<i64> {
  StageDef::new(name, move |_ctx: StageContext, p: Payload<i64>| async move {
    let value = *p.read();
    if predicate(value) {
      anyhow::bail!("rejected {value}");
    }
    Ok(())
  })
}

/// Records the payload it sees, then yields so lanes interleave.
pub fn record_into(name: &'static str, seen: Arc<Mutex<Vec<i64>>>) -> StageDef<i64> {
  StageDef::new(name, move |_ctx: StageContext, p: Payload<i64>| {
    let seen = Arc::clone(&seen);
    async move {
      let value = *p.read();
      seen.lock().push(value);
      tokio::task::yield_now().await;
      Ok::<_, anyhow::Error>(())
    }
  })
}

pub fn sleep_for(duration: Duration) -> StageDef<i64> {
  StageDef::new("sleep", move |_ctx: StageContext, _p: Payload<i64>| async move {
    tokio::time::sleep(duration).await;
    Ok::<_, anyhow::Error>(())
  })
}

// --- Output helpers ---
pub fn sorted_values(items: &[WorkItem<i64>]) -> Vec<i64> {
  let mut values: Vec<i64> = items.iter().map(|item| *item.payload().read()).collect();
  values.sort_unstable();
  values
}

pub fn sorted_ids(items: &[WorkItem<i64>]) -> Vec<u64> {
  let mut ids: Vec<u64> = items.iter().map(|item| item.id().get()).collect();
  ids.sort_unstable();
  ids
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
