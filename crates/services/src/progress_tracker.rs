use std::sync::Arc;

use tracing::warn;

use labs_core::model::{Lab, ProgressStats};
use storage::{ProgressMap, ProgressRepository};

/// Owns the persistence round-trip for lab progress.
///
/// Storage failures are logged and treated as empty/no-op so a broken store
/// degrades the session to non-persistent instead of crashing it.
pub struct ProgressTracker {
    repo: Arc<dyn ProgressRepository>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(repo: Arc<dyn ProgressRepository>) -> Self {
        Self { repo }
    }

    /// Overlay persisted progress onto freshly parsed labs.
    ///
    /// Labs absent from the persisted map keep their parse-time defaults.
    pub fn hydrate(&self, labs: &mut [Lab]) {
        let persisted = match self.repo.load_progress() {
            Ok(map) => map,
            Err(err) => {
                warn!(%err, "progress store unreadable, starting fresh");
                return;
            }
        };
        for lab in labs.iter_mut() {
            if let Some(record) = persisted.get(lab.id()) {
                lab.apply_persisted(record);
            }
        }
    }

    /// Serialize every lab's progress record and replace the persisted map.
    pub fn commit(&self, labs: &[Lab]) {
        let map: ProgressMap = labs
            .iter()
            .map(|lab| (lab.id().to_owned(), lab.progress_record()))
            .collect();
        if let Err(err) = self.repo.save_progress(&map) {
            warn!(%err, "failed to persist progress");
        }
    }

    /// Set a lab's progress (clamped to 100) and commit.
    ///
    /// Unknown ids are ignored.
    pub fn update_progress(&self, labs: &mut [Lab], lab_id: &str, value: u8) {
        let Some(lab) = labs.iter_mut().find(|lab| lab.id() == lab_id) else {
            return;
        };
        lab.set_progress(value);
        self.commit(labs);
    }

    /// Flip a lab's bookmark flag and commit.
    ///
    /// Unknown ids are ignored.
    pub fn toggle_bookmark(&self, labs: &mut [Lab], lab_id: &str) {
        let Some(lab) = labs.iter_mut().find(|lab| lab.id() == lab_id) else {
            return;
        };
        lab.toggle_bookmark();
        self.commit(labs);
    }

    /// Aggregate statistics over the catalog.
    #[must_use]
    pub fn stats(&self, labs: &[Lab]) -> ProgressStats {
        let total = labs.len();
        let completed = labs.iter().filter(|lab| lab.completed()).count();
        let in_progress = labs
            .iter()
            .filter(|lab| lab.progress() > 0 && lab.progress() < 100)
            .count();
        let bookmarked = labs.iter().filter(|lab| lab.bookmarked()).count();
        let completion_percentage = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };

        ProgressStats {
            total,
            completed,
            in_progress,
            bookmarked,
            completion_percentage,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
