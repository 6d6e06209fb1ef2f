use labs_core::model::Lab;

use crate::error::NavigationError;
use crate::progress_tracker::ProgressTracker;
use crate::store::LabStore;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where the user currently is in the catalog.
///
/// `step_index` is a flattened cursor over the concatenation of all
/// use cases' steps in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    NoLabSelected,
    Viewing {
        lab_id: String,
        use_case_index: usize,
        step_index: usize,
    },
}

/// Notification emitted to registered observers on navigation changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    LabChanged {
        lab_id: String,
        lab_title: String,
    },
    StepChanged {
        lab_id: String,
        lab_title: String,
        step_index: usize,
        total_steps: usize,
    },
}

type Observer = Box<dyn Fn(&NavigationEvent) + Send>;

//
// ─── NAVIGATOR ─────────────────────────────────────────────────────────────────
//

/// Step-by-step navigation over the lab store.
///
/// Owns the store and the progress tracker; step completion writes back
/// through the tracker so persisted progress is always recomputed from live
/// step state.
pub struct Navigator {
    store: LabStore,
    tracker: ProgressTracker,
    state: NavState,
    observers: Vec<Observer>,
}

impl Navigator {
    #[must_use]
    pub fn new(store: LabStore, tracker: ProgressTracker) -> Self {
        Self {
            store,
            tracker,
            state: NavState::NoLabSelected,
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &NavState {
        &self.state
    }

    #[must_use]
    pub fn store(&self) -> &LabStore {
        &self.store
    }

    /// Register an observer for navigation notifications.
    pub fn subscribe(&mut self, observer: impl Fn(&NavigationEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The lab being viewed and the flattened cursor position.
    #[must_use]
    pub fn current(&self) -> Option<(&Lab, usize)> {
        let NavState::Viewing {
            lab_id, step_index, ..
        } = &self.state
        else {
            return None;
        };
        self.store.find(lab_id).map(|lab| (lab, *step_index))
    }

    /// Select a lab and reset the cursor to its first step.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::NotFound` when the id is unknown to the
    /// store; the current state is left unchanged.
    pub async fn load_lab(&mut self, lab_id: &str) -> Result<(), NavigationError> {
        let Some(lab) = self.store.get(lab_id).await else {
            return Err(NavigationError::NotFound(lab_id.to_owned()));
        };
        let event = NavigationEvent::LabChanged {
            lab_id: lab.id().to_owned(),
            lab_title: lab.title().to_owned(),
        };
        self.state = NavState::Viewing {
            lab_id: lab_id.to_owned(),
            use_case_index: 0,
            step_index: 0,
        };
        self.notify(&event);
        Ok(())
    }

    /// Advance the cursor; a no-op at the last step.
    pub fn next_step(&mut self) {
        self.move_cursor(true);
    }

    /// Move the cursor back; a no-op at step 0.
    pub fn previous_step(&mut self) {
        self.move_cursor(false);
    }

    fn move_cursor(&mut self, forward: bool) {
        let NavState::Viewing {
            lab_id, step_index, ..
        } = &self.state
        else {
            return;
        };
        let Some(lab) = self.store.find(lab_id) else {
            return;
        };

        let total = lab.total_steps();
        if total == 0 {
            return;
        }
        let next = if forward {
            (step_index + 1).min(total - 1)
        } else {
            step_index.saturating_sub(1)
        };
        if next == *step_index {
            return;
        }

        let event = NavigationEvent::StepChanged {
            lab_id: lab.id().to_owned(),
            lab_title: lab.title().to_owned(),
            step_index: next,
            total_steps: total,
        };
        self.state = NavState::Viewing {
            lab_id: lab.id().to_owned(),
            use_case_index: lab.use_case_for_slot(next),
            step_index: next,
        };
        self.notify(&event);
    }

    /// Flip the completion flag of the step at the given flattened index,
    /// then recompute and persist the lab's progress percentage.
    ///
    /// Fails silently when no lab is selected or the index is out of range.
    pub fn toggle_step_completion(&mut self, index: usize) {
        let NavState::Viewing { lab_id, .. } = &self.state else {
            return;
        };
        let lab_id = lab_id.clone();
        let Some(lab) = self.store.find_mut(&lab_id) else {
            return;
        };
        if !lab.toggle_step(index) {
            return;
        }
        let progress = lab.step_progress();
        self.tracker
            .update_progress(self.store.labs_mut(), &lab_id, progress);
    }

    fn notify(&self, event: &NavigationEvent) {
        for observer in &self.observers {
            observer(event);
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use storage::{InMemoryContentSource, InMemoryStore, ProgressRepository};

    const DOCUMENT: &str = "\
## 🚀 Use Case #1: Setup
1. Click **New**.
2. Save.
3. Reopen.

## 🧭 Use Case #2: Explore
1. Look around.
2. Close.
3. Done.
";

    fn navigator() -> (Navigator, InMemoryStore) {
        let source = InMemoryContentSource::new();
        source.set_catalog("| Intro Lab | [Intro Lab](./labs/intro-lab/) | Level 100, Maker |");
        source.insert_document("intro-lab", DOCUMENT);

        let labs = labs_core::parser::parse_catalog(
            "| Intro Lab | [Intro Lab](./labs/intro-lab/) | Level 100, Maker |",
        );
        let store = LabStore::new(labs, Arc::new(source));
        let persistence = InMemoryStore::new();
        let tracker = ProgressTracker::new(Arc::new(persistence.clone()));
        (Navigator::new(store, tracker), persistence)
    }

    #[tokio::test]
    async fn load_lab_resets_the_cursor_and_notifies() {
        let (mut navigator, _) = navigator();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        navigator.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        navigator.load_lab("intro-lab").await.unwrap();
        assert_eq!(
            navigator.state(),
            &NavState::Viewing {
                lab_id: "intro-lab".into(),
                use_case_index: 0,
                step_index: 0,
            }
        );
        let events = seen.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            [NavigationEvent::LabChanged {
                lab_id: "intro-lab".into(),
                lab_title: "Intro Lab".into(),
            }]
        );
    }

    #[tokio::test]
    async fn unknown_lab_is_surfaced_and_leaves_state_alone() {
        let (mut navigator, _) = navigator();
        navigator.load_lab("intro-lab").await.unwrap();
        navigator.next_step();

        let err = navigator.load_lab("missing").await.unwrap_err();
        assert_eq!(err, NavigationError::NotFound("missing".into()));
        assert!(matches!(
            navigator.state(),
            NavState::Viewing { step_index: 1, .. }
        ));
    }

    #[tokio::test]
    async fn cursor_stays_inside_bounds() {
        let (mut navigator, _) = navigator();
        navigator.load_lab("intro-lab").await.unwrap();

        for _ in 0..20 {
            navigator.next_step();
        }
        let (_, index) = navigator.current().unwrap();
        assert_eq!(index, 5, "no wraparound past the last step");

        for _ in 0..20 {
            navigator.previous_step();
        }
        let (_, index) = navigator.current().unwrap();
        assert_eq!(index, 0);
    }

    #[tokio::test]
    async fn cursor_recomputes_the_use_case_index() {
        let (mut navigator, _) = navigator();
        navigator.load_lab("intro-lab").await.unwrap();

        for _ in 0..3 {
            navigator.next_step();
        }
        assert!(matches!(
            navigator.state(),
            NavState::Viewing {
                use_case_index: 1,
                step_index: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn toggling_a_step_recomputes_and_persists_progress() {
        let (mut navigator, persistence) = navigator();
        navigator.load_lab("intro-lab").await.unwrap();

        navigator.toggle_step_completion(0);
        navigator.toggle_step_completion(3);

        let lab = navigator.store().find("intro-lab").unwrap();
        assert_eq!(lab.progress(), 33, "round(100 * 2 / 6)");
        assert!(!lab.completed());

        let persisted = persistence.load_progress().unwrap();
        assert_eq!(persisted["intro-lab"].progress, 33);
    }

    #[tokio::test]
    async fn toggle_is_idempotent_under_double_invocation() {
        let (mut navigator, persistence) = navigator();
        navigator.load_lab("intro-lab").await.unwrap();

        navigator.toggle_step_completion(2);
        navigator.toggle_step_completion(2);

        let lab = navigator.store().find("intro-lab").unwrap();
        assert_eq!(lab.progress(), 0);
        assert_eq!(persistence.load_progress().unwrap()["intro-lab"].progress, 0);
    }

    #[tokio::test]
    async fn out_of_range_toggle_is_a_silent_no_op() {
        let (mut navigator, persistence) = navigator();
        navigator.load_lab("intro-lab").await.unwrap();

        navigator.toggle_step_completion(99);
        assert!(persistence.load_progress().unwrap().is_empty());
    }

    #[tokio::test]
    async fn completing_every_step_completes_the_lab() {
        let (mut navigator, _) = navigator();
        navigator.load_lab("intro-lab").await.unwrap();

        for index in 0..6 {
            navigator.toggle_step_completion(index);
        }
        let lab = navigator.store().find("intro-lab").unwrap();
        assert_eq!(lab.progress(), 100);
        assert!(lab.completed());
    }

    #[test]
    fn navigation_without_a_lab_is_inert() {
        let (mut navigator, persistence) = navigator();
        navigator.next_step();
        navigator.previous_step();
        navigator.toggle_step_completion(0);
        assert_eq!(navigator.state(), &NavState::NoLabSelected);
        assert!(persistence.load_progress().unwrap().is_empty());
    }
}
