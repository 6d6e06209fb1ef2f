use thiserror::Error;

use crate::model::progress::LabProgress;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LabError {
    #[error("lab id cannot be empty")]
    EmptyId,

    #[error("lab title cannot be empty")]
    EmptyTitle,
}

//
// ─── STEP ──────────────────────────────────────────────────────────────────────
//

/// One numbered instruction within a use case.
///
/// `completed` is the only field that changes after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub number: u32,
    pub instruction: String,
    pub completed: bool,
    pub has_screenshot: bool,
    pub screenshot: Option<String>,
}

//
// ─── USE CASE ──────────────────────────────────────────────────────────────────
//

/// A titled, emoji-tagged scenario within a lab.
///
/// `number` is the author-assigned ordinal. Duplicates and gaps are kept as
/// authored and never validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseCase {
    pub number: u32,
    pub emoji: String,
    pub title: String,
    pub steps: Vec<Step>,
    pub completed: bool,
}

impl UseCase {
    /// Number of flattened navigation slots this use case occupies.
    ///
    /// A use case whose document yielded no steps still counts as one slot,
    /// so labs with degraded detail parses remain navigable.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.steps.len().max(1)
    }
}

//
// ─── IMAGE ─────────────────────────────────────────────────────────────────────
//

/// An inline image reference found anywhere in a lab document.
///
/// Not ownership-linked to steps; a step's screenshot is re-extracted from
/// its own instruction text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub alt: String,
    pub src: String,
    pub full_path: String,
}

//
// ─── LAB ───────────────────────────────────────────────────────────────────────
//

/// One complete tutorial unit composed of use cases.
///
/// Immutable once parsed except for the progress-related fields, which are
/// only touched through the mutators below so the
/// `completed == (progress >= 100)` invariant cannot drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lab {
    id: String,
    title: String,
    url: String,
    description: String,
    level: String,
    duration: String,
    persona: String,
    purpose: String,
    use_cases: Vec<UseCase>,
    images: Vec<Image>,
    content: Option<String>,
    progress: u8,
    completed: bool,
    bookmarked: bool,
}

impl Lab {
    /// Creates a lab from catalog-level data.
    ///
    /// # Errors
    ///
    /// Returns `LabError` if the id or title is empty after trimming.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
        level: impl Into<String>,
        duration: impl Into<String>,
        persona: impl Into<String>,
    ) -> Result<Self, LabError> {
        let id = id.into().trim().to_owned();
        if id.is_empty() {
            return Err(LabError::EmptyId);
        }
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(LabError::EmptyTitle);
        }

        Ok(Self {
            id,
            title,
            url: url.into().trim().to_owned(),
            description: description.into().trim().to_owned(),
            level: level.into(),
            duration: duration.into(),
            persona: persona.into(),
            purpose: String::new(),
            use_cases: Vec::new(),
            images: Vec::new(),
            content: None,
            progress: 0,
            completed: false,
            bookmarked: false,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    #[must_use]
    pub fn duration(&self) -> &str {
        &self.duration
    }

    #[must_use]
    pub fn persona(&self) -> &str {
        &self.persona
    }

    #[must_use]
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    #[must_use]
    pub fn use_cases(&self) -> &[UseCase] {
        &self.use_cases
    }

    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Raw document text, present once the detail document has been loaded.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn bookmarked(&self) -> bool {
        self.bookmarked
    }

    /// Overwrite the four detail fields from a parsed details row.
    pub fn set_details(
        &mut self,
        level: impl Into<String>,
        persona: impl Into<String>,
        duration: impl Into<String>,
        purpose: impl Into<String>,
    ) {
        self.level = level.into();
        self.persona = persona.into();
        self.duration = duration.into();
        self.purpose = purpose.into();
    }

    pub fn set_use_cases(&mut self, use_cases: Vec<UseCase>) {
        self.use_cases = use_cases;
    }

    pub fn set_images(&mut self, images: Vec<Image>) {
        self.images = images;
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    /// Set progress, clamping to 100 and deriving `completed`.
    pub fn set_progress(&mut self, value: u8) {
        self.progress = value.min(100);
        self.completed = self.progress >= 100;
    }

    pub fn toggle_bookmark(&mut self) {
        self.bookmarked = !self.bookmarked;
    }

    /// Overlay a persisted progress record onto this lab.
    ///
    /// `completed` is renormalized from `progress` rather than trusted, so a
    /// stale or hand-edited record cannot break the invariant.
    pub fn apply_persisted(&mut self, record: &LabProgress) {
        self.set_progress(record.progress);
        self.bookmarked = record.bookmarked;
    }

    /// The persisted shape of this lab's progress state.
    #[must_use]
    pub fn progress_record(&self) -> LabProgress {
        LabProgress {
            progress: self.progress,
            completed: self.completed,
            bookmarked: self.bookmarked,
        }
    }

    /// Total flattened navigation slots across all use cases.
    ///
    /// A use case without steps counts as exactly one slot.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.use_cases.iter().map(UseCase::slot_count).sum()
    }

    /// Number of steps currently marked completed.
    #[must_use]
    pub fn completed_steps(&self) -> usize {
        self.use_cases
            .iter()
            .map(|use_case| use_case.steps.iter().filter(|step| step.completed).count())
            .sum()
    }

    /// Progress percentage recomputed from live step state.
    ///
    /// `round(100 * completed / total)`, 0 when there are no steps.
    #[must_use]
    pub fn step_progress(&self) -> u8 {
        let total = self.total_steps();
        if total == 0 {
            return 0;
        }
        let percentage = (self.completed_steps() as f64 / total as f64) * 100.0;
        percentage.round() as u8
    }

    /// Index of the use case a flattened step slot falls into.
    #[must_use]
    pub fn use_case_for_slot(&self, slot: usize) -> usize {
        let mut offset = 0;
        for (index, use_case) in self.use_cases.iter().enumerate() {
            offset += use_case.slot_count();
            if slot < offset {
                return index;
            }
        }
        self.use_cases.len().saturating_sub(1)
    }

    /// Flip the completion flag of the step at the given flattened slot.
    ///
    /// Returns false (and changes nothing) when the slot is out of range or
    /// belongs to a use case without steps.
    pub fn toggle_step(&mut self, slot: usize) -> bool {
        let mut offset = 0;
        for use_case in &mut self.use_cases {
            let slots = use_case.slot_count();
            if slot < offset + slots {
                let Some(step) = use_case.steps.get_mut(slot - offset) else {
                    return false;
                };
                step.completed = !step.completed;
                use_case.completed =
                    !use_case.steps.is_empty() && use_case.steps.iter().all(|s| s.completed);
                return true;
            }
            offset += slots;
        }
        false
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
