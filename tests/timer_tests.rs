mod common;

use chrono::{DateTime, TimeZone, Utc};
use common::{Call, MockClient};
use futures::executor::block_on;
use rworklog::core::timer::{NewTimer, TimerManager, TimerUpdate};
use rworklog::core::timer_store::{FileTimerStore, MemoryTimerStore, TimerRegistry, TimerStore};
use rworklog::models::{Timer, TimerState};
use rworklog::schema::Collection;
use rworklog::errors::{AppError, AppResult};
use rworklog::utils::time::{MAX_DURATION_SECS, ManualClock};
use std::cell::Cell;
use std::rc::Rc;
use serde_json::json;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).single().expect("valid instant")
}

fn manager(store: &MemoryTimerStore, clock: &ManualClock) -> TimerManager {
    TimerManager::open(
        Box::new(store.clone()),
        Box::new(clock.clone()),
        Some("u1".to_string()),
    )
    .expect("open manager")
}

fn named(key: &str, project: Option<&str>) -> NewTimer {
    NewTimer {
        key: Some(key.to_string()),
        task: None,
        project: project.map(str::to_string),
        summary: format!("work on {key}"),
    }
}

fn running_count(m: &TimerManager) -> usize {
    m.timers().filter(|(_, t)| t.is_running()).count()
}

#[test]
fn test_new_timer_runs_and_gets_a_key() {
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    let key = m.new_timer(NewTimer::default()).expect("new");
    assert!(!key.is_empty());
    assert_eq!(m.get(&key).expect("get").state(), TimerState::Running);
    assert_eq!(m.running().map(|(k, _)| k.to_string()), Some(key));
}

#[test]
fn test_duplicate_key_is_rejected() {
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(named("a", None)).expect("new");
    assert!(matches!(
        m.new_timer(named("a", None)),
        Err(AppError::TimerExists(k)) if k == "a"
    ));
}

#[test]
fn test_at_most_one_timer_runs() {
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(named("a", None)).expect("a");
    clock.advance(10);
    m.new_timer(named("b", None)).expect("b");
    assert_eq!(running_count(&m), 1);
    assert_eq!(m.get("a").expect("a").state(), TimerState::Paused);

    clock.advance(5);
    m.toggle("a").expect("resume a");
    assert_eq!(running_count(&m), 1);
    assert!(m.get("a").expect("a").is_running());
    assert!(!m.get("b").expect("b").is_running());

    m.new_timer(named("c", None)).expect("c");
    m.toggle("b").expect("resume b");
    m.toggle("b").expect("pause b");
    assert!(running_count(&m) <= 1);

    // The intervals were banked when paused.
    assert_eq!(m.elapsed("a").expect("a"), 10);
    assert_eq!(m.elapsed("b").expect("b"), 5);
}

#[test]
fn test_elapsed_accumulates_across_pauses() {
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(named("a", None)).expect("new");
    clock.advance(100);
    assert_eq!(m.toggle("a").expect("pause"), TimerState::Paused);
    assert_eq!(m.elapsed("a").expect("elapsed"), 100);

    clock.advance(3600);
    assert_eq!(m.elapsed("a").expect("elapsed"), 100);

    assert_eq!(m.toggle("a").expect("resume"), TimerState::Running);
    clock.advance(30);
    assert_eq!(m.elapsed("a").expect("elapsed"), 130);

    m.toggle("a").expect("pause");
    clock.advance(500);
    assert_eq!(m.elapsed("a").expect("elapsed"), 130);
}

#[test]
fn test_clock_going_backwards_adds_nothing() {
    let timer = Timer {
        last_started: Some(t0()),
        accumulated_seconds: 42,
        ..Timer::default()
    };
    assert_eq!(timer.elapsed_at(t0() - chrono::Duration::seconds(60)), 42);
}

#[test]
fn test_update_merges_fields() {
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(named("a", Some("p1"))).expect("a");
    m.new_timer(named("b", None)).expect("b");

    m.update(
        "a",
        TimerUpdate {
            summary: Some("renamed".into()),
            project: Some(None),
            accumulated_seconds: Some(900),
            ..TimerUpdate::default()
        },
    )
    .expect("update");
    let a = m.get("a").expect("a");
    assert_eq!(a.summary, "renamed");
    assert_eq!(a.project, None);
    assert_eq!(a.accumulated_seconds, 900);

    // Starting `a` through an update pauses `b`.
    clock.advance(20);
    m.update(
        "a",
        TimerUpdate {
            last_started: Some(Some(clock_now(&clock))),
            ..TimerUpdate::default()
        },
    )
    .expect("start a");
    assert!(m.get("a").expect("a").is_running());
    assert!(!m.get("b").expect("b").is_running());
    assert_eq!(m.elapsed("b").expect("b"), 20);
    assert_eq!(running_count(&m), 1);

    // Clearing `last_started` stops without banking.
    clock.advance(60);
    m.update(
        "a",
        TimerUpdate {
            last_started: Some(None),
            ..TimerUpdate::default()
        },
    )
    .expect("stop a");
    assert_eq!(m.elapsed("a").expect("a"), 900);
}

fn clock_now(clock: &ManualClock) -> DateTime<Utc> {
    use rworklog::utils::time::Clock;
    clock.now()
}

#[test]
fn test_unknown_key_is_reported() {
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    assert!(matches!(m.toggle("nope"), Err(AppError::TimerNotFound(k)) if k == "nope"));
    assert!(matches!(m.remove("nope"), Err(AppError::TimerNotFound(_))));
    assert!(matches!(
        m.update("nope", TimerUpdate::default()),
        Err(AppError::TimerNotFound(_))
    ));
    assert!(matches!(m.elapsed("nope"), Err(AppError::TimerNotFound(_))));
}

#[test]
fn test_remove_drops_the_timer() {
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(named("a", None)).expect("a");
    let removed = m.remove("a").expect("remove");
    assert_eq!(removed.summary, "work on a");
    assert!(m.is_empty());
    assert!(manager(&store, &clock).is_empty());
}

#[test]
fn test_timer_for_task_finds_existing_timer() {
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    let key = m
        .new_timer(NewTimer {
            task: Some("t1".into()),
            ..NewTimer::default()
        })
        .expect("new");
    assert_eq!(m.timer_for_task("t1"), Some(key.as_str()));
    assert_eq!(m.timer_for_task("t2"), None);
}

#[test]
fn test_submit_without_project_makes_no_call() {
    let client = MockClient::new();
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(named("a", None)).expect("a");
    let err = block_on(m.submit("a", &client)).expect_err("must fail");

    assert!(matches!(err, AppError::MissingProject(k) if k == "a"));
    assert!(client.calls().is_empty());
    assert!(m.contains("a"));
}

#[test]
fn test_submit_creates_entry_and_removes_timer() {
    let client = MockClient::new();
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(NewTimer {
        key: Some("a".into()),
        task: Some("t1".into()),
        project: Some("p1".into()),
        summary: "landing page".into(),
    })
    .expect("a");
    clock.advance(5400);

    let entry = block_on(m.submit("a", &client)).expect("submit");

    assert!(!entry.id.is_empty());
    assert_eq!(entry.duration, 5400);
    assert_eq!(entry.project.as_deref(), Some("p1"));
    assert_eq!(entry.task.as_deref(), Some("t1"));
    assert_eq!(entry.user.as_deref(), Some("u1"));
    assert_eq!(entry.summary, "landing page");
    assert_eq!(client.calls(), vec![Call::Insert(Collection::TimeEntry)]);

    let stored = client.records(Collection::TimeEntry);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["duration"], json!(5400));

    assert!(!m.contains("a"));
    assert!(!manager(&store, &clock).contains("a"));
}

#[test]
fn test_failed_submit_keeps_timer_unchanged() {
    let client = MockClient::new();
    client.fail_on(Collection::TimeEntry);
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(named("a", Some("p1"))).expect("a");
    clock.advance(60);
    let before = m.get("a").expect("a").clone();

    assert!(block_on(m.submit("a", &client)).is_err());

    assert_eq!(m.get("a").expect("a"), &before);
    assert_eq!(manager(&store, &clock).get("a").expect("a"), &before);
}

/// Memory store whose saves fail from the `fail_from`-th call on.
#[derive(Clone)]
struct FailingStore {
    inner: MemoryTimerStore,
    saves: Rc<Cell<usize>>,
    fail_from: usize,
}

impl TimerStore for FailingStore {
    fn load(&self) -> AppResult<TimerRegistry> {
        self.inner.load()
    }

    fn save(&self, registry: &TimerRegistry) -> AppResult<()> {
        self.saves.set(self.saves.get() + 1);
        if self.saves.get() >= self.fail_from {
            return Err(AppError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save(registry)
    }
}

#[test]
fn test_submit_succeeds_once_entry_exists_even_if_save_fails() {
    let client = MockClient::new();
    let store = FailingStore {
        inner: MemoryTimerStore::new(),
        saves: Rc::new(Cell::new(0)),
        fail_from: 2,
    };
    let clock = ManualClock::new(t0());
    let mut m = TimerManager::open(
        Box::new(store.clone()),
        Box::new(clock.clone()),
        Some("u1".to_string()),
    )
    .expect("open manager");

    m.new_timer(named("a", Some("p1"))).expect("a");
    clock.advance(60);

    let entry = block_on(m.submit("a", &client)).expect("entry was created");
    assert_eq!(entry.duration, 60);
    assert!(!m.contains("a"));
    assert_eq!(client.calls(), vec![Call::Insert(Collection::TimeEntry)]);
    // First save after the insert plus one retry.
    assert_eq!(store.saves.get(), 3);
}

#[test]
fn test_out_of_range_elapsed_is_rejected() {
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(named("a", Some("p1"))).expect("a");
    let err = m
        .update(
            "a",
            TimerUpdate {
                accumulated_seconds: Some(u64::MAX),
                ..TimerUpdate::default()
            },
        )
        .expect_err("must fail");
    assert!(matches!(err, AppError::InvalidDuration(_)));
    assert_eq!(m.get("a").expect("a").accumulated_seconds, 0);
}

#[test]
fn test_elapsed_near_the_limit_does_not_overflow() {
    let client = MockClient::new();
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(named("a", Some("p1"))).expect("a");
    m.update(
        "a",
        TimerUpdate {
            accumulated_seconds: Some(MAX_DURATION_SECS),
            last_started: Some(Some(clock_now(&clock))),
            ..TimerUpdate::default()
        },
    )
    .expect("update");
    clock.advance(5);

    assert_eq!(m.elapsed("a").expect("elapsed"), MAX_DURATION_SECS + 5);
    assert_eq!(m.toggle("a").expect("pause"), TimerState::Paused);

    let err = block_on(m.submit("a", &client)).expect_err("does not fit an entry");
    assert!(matches!(err, AppError::InvalidDuration(_)));
    assert!(client.calls().is_empty());
    assert!(m.contains("a"));

    let saturated = Timer {
        last_started: Some(t0()),
        accumulated_seconds: u64::MAX,
        ..Timer::default()
    };
    assert_eq!(
        saturated.elapsed_at(t0() + chrono::Duration::seconds(5)),
        u64::MAX
    );
}

#[test]
fn test_reload_reproduces_state() {
    let store = MemoryTimerStore::new();
    let clock = ManualClock::new(t0());
    let mut m = manager(&store, &clock);

    m.new_timer(named("a", Some("p1"))).expect("a");
    clock.advance(100);
    m.toggle("a").expect("pause a");
    m.new_timer(named("b", None)).expect("b");
    clock.advance(40);

    let reloaded = manager(&store, &clock);
    let before: Vec<(String, Timer)> = m.timers().map(|(k, t)| (k.to_string(), t.clone())).collect();
    let after: Vec<(String, Timer)> = reloaded
        .timers()
        .map(|(k, t)| (k.to_string(), t.clone()))
        .collect();
    assert_eq!(before, after);

    assert_eq!(reloaded.elapsed("a").expect("a"), 100);
    assert_eq!(reloaded.elapsed("b").expect("b"), 40);
    clock.advance(20);
    assert_eq!(reloaded.elapsed("b").expect("b"), 60);
}

#[test]
fn test_stored_registry_with_two_running_timers_is_repaired() {
    let store = MemoryTimerStore::new();
    let mut registry = TimerRegistry::new();
    registry.insert(
        "old".into(),
        Timer {
            last_started: Some(t0()),
            ..Timer::default()
        },
    );
    registry.insert(
        "new".into(),
        Timer {
            last_started: Some(t0() + chrono::Duration::seconds(30)),
            ..Timer::default()
        },
    );
    store.save(&registry).expect("seed");

    let clock = ManualClock::new(t0() + chrono::Duration::seconds(60));
    let m = manager(&store, &clock);

    assert_eq!(running_count(&m), 1);
    assert!(m.get("new").expect("new").is_running());
    assert_eq!(m.elapsed("old").expect("old"), 60);

    // The repair was written back.
    let stored = store.load().expect("load");
    assert!(stored["old"].last_started.is_none());
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("timers.json");
    let clock = ManualClock::new(t0());

    {
        let mut m = TimerManager::open(
            Box::new(FileTimerStore::new(&path)),
            Box::new(clock.clone()),
            None,
        )
        .expect("open");
        m.new_timer(named("a", Some("p1"))).expect("a");
        clock.advance(75);
    }

    let content = std::fs::read_to_string(&path).expect("read");
    let raw: serde_json::Value = serde_json::from_str(&content).expect("json");
    assert_eq!(raw["a"]["accumulatedSeconds"], json!(0));
    assert_eq!(raw["a"]["project"], json!("p1"));
    assert!(raw["a"]["lastStarted"].is_string());
    assert!(!path.with_extension("json.tmp").exists());

    let m = TimerManager::open(Box::new(FileTimerStore::new(&path)), Box::new(clock.clone()), None)
        .expect("reopen");
    assert_eq!(m.elapsed("a").expect("a"), 75);
}

#[test]
fn test_file_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileTimerStore::new(dir.path().join("none.json"));
    assert!(store.load().expect("load").is_empty());
}
