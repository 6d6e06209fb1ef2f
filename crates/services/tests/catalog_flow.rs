//! End-to-end catalog flow over in-memory storage: load the catalog,
//! hydrate persisted progress, navigate and toggle steps, then verify a
//! fresh session reproduces the same state.

use std::sync::Arc;

use async_trait::async_trait;
use labs_core::model::Sender;
use labs_core::time::fixed_clock;
use services::{ChatService, LabLoader, Navigator, PreferencesService, ProgressTracker};
use storage::{ContentSource, InMemoryContentSource, InMemoryStore, StorageError};

const CATALOG: &str = "\
| Title | Link | Description |
| --- | --- | --- |
| Intro Lab | [Intro Lab](./labs/intro-lab/) | Level 100, 15 min, Maker |
| Agent Lab | [Agent Lab](./labs/agent-lab/) | Level 300, Developer |
";

const INTRO_DOCUMENT: &str = "\
# Intro Lab

| Level | Persona | Duration | Purpose |
| --- | --- | --- | --- |
| 100 | Maker | 15 minutes | Learn the studio basics |

## 🚀 Use Case #1: Create
1. Open the studio.
2. Create a project.

## 🧪 Use Case #2: Test
1. Run the checks.

   Watch the output panel.
2. Fix anything red.
";

fn content_source() -> InMemoryContentSource {
    let source = InMemoryContentSource::new();
    source.set_catalog(CATALOG);
    source.insert_document("intro-lab", INTRO_DOCUMENT);
    source.insert_document("agent-lab", "## 🤖 Use Case #1: Meet your agent\nNo steps yet.");
    source
}

#[tokio::test]
async fn progress_survives_across_sessions() {
    let source = Arc::new(content_source());
    let persistence = InMemoryStore::new();

    // First session: load, navigate, complete one of four steps.
    let mut store = LabLoader::new(source.clone()).initialize().await;
    let tracker = ProgressTracker::new(Arc::new(persistence.clone()));
    tracker.hydrate(store.labs_mut());

    let intro = store.find("intro-lab").unwrap();
    assert_eq!(intro.duration(), "15 minutes", "details table overrides the catalog");
    assert_eq!(intro.purpose(), "Learn the studio basics");
    assert_eq!(intro.total_steps(), 4);

    let mut navigator = Navigator::new(store, tracker);
    navigator.load_lab("intro-lab").await.unwrap();
    navigator.next_step();
    navigator.toggle_step_completion(0);

    let lab = navigator.store().find("intro-lab").unwrap();
    assert_eq!(lab.progress(), 25);

    // Second session over the same persistence: progress is hydrated back.
    let mut fresh = LabLoader::new(source).initialize().await;
    let tracker = ProgressTracker::new(Arc::new(persistence.clone()));
    tracker.hydrate(fresh.labs_mut());

    let intro = fresh.find("intro-lab").unwrap();
    assert_eq!(intro.progress(), 25);
    assert!(!intro.completed());

    let stats = tracker.stats(fresh.labs());
    assert_eq!(stats.total, 2);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.completed, 0);
}

#[tokio::test]
async fn a_stepless_use_case_counts_toward_nothing_toggleable() {
    let source = Arc::new(content_source());
    let persistence = InMemoryStore::new();

    let mut store = LabLoader::new(source).initialize().await;
    let tracker = ProgressTracker::new(Arc::new(persistence.clone()));
    tracker.hydrate(store.labs_mut());

    let mut navigator = Navigator::new(store, tracker);
    navigator.load_lab("agent-lab").await.unwrap();
    navigator.toggle_step_completion(0);

    let lab = navigator.store().find("agent-lab").unwrap();
    assert_eq!(lab.total_steps(), 1, "a stepless use case still occupies one slot");
    assert_eq!(lab.completed_steps(), 0);
    assert_eq!(lab.progress(), 0, "the slot cannot be completed");
}

struct FlakySource {
    inner: InMemoryContentSource,
}

#[async_trait]
impl ContentSource for FlakySource {
    async fn fetch_catalog(&self) -> Result<String, StorageError> {
        self.inner.fetch_catalog().await
    }

    async fn fetch_lab_document(&self, lab_id: &str) -> Result<String, StorageError> {
        if lab_id == "agent-lab" {
            return Err(StorageError::Connection("socket reset".into()));
        }
        self.inner.fetch_lab_document(lab_id).await
    }
}

#[tokio::test]
async fn a_failing_detail_fetch_degrades_only_that_lab() {
    let source = Arc::new(FlakySource {
        inner: content_source(),
    });
    let store = LabLoader::new(source).initialize().await;

    assert_eq!(store.len(), 2);
    assert_eq!(store.find("intro-lab").unwrap().total_steps(), 4);
    let degraded = store.find("agent-lab").unwrap();
    assert!(degraded.use_cases().is_empty());
    assert_eq!(degraded.level(), "300", "catalog metadata survives the failure");
}

#[tokio::test]
async fn chat_and_preferences_share_the_session_store() {
    let persistence = InMemoryStore::new();

    let mut chat = ChatService::new(Arc::new(persistence.clone()), fixed_clock());
    chat.push(Sender::User, "how do I publish an agent?");
    chat.push(Sender::Assistant, "open the Agents tab and pick Publish.");

    let mut preferences = PreferencesService::new(Arc::new(persistence.clone()), fixed_clock());
    preferences.toggle_theme();
    preferences.touch();

    let chat = ChatService::new(Arc::new(persistence.clone()), fixed_clock());
    assert_eq!(chat.messages().len(), 2);
    let preferences = PreferencesService::new(Arc::new(persistence), fixed_clock());
    assert_ne!(preferences.preferences().last_visited, 0);
}
