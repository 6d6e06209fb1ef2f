use serde::{Deserialize, Serialize};

/// Persisted per-lab progress record.
///
/// The JSON shape is `{ "progress": n, "completed": bool, "bookmarked": bool }`,
/// stored in a map keyed by lab id. This is the only state that outlives a
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabProgress {
    pub progress: u8,
    pub completed: bool,
    pub bookmarked: bool,
}

/// Aggregate completion statistics over the whole catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub bookmarked: usize,
    pub completion_percentage: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_record_round_trips_through_json() {
        let record = LabProgress {
            progress: 67,
            completed: false,
            bookmarked: true,
        };
        let raw = serde_json::to_string(&record).unwrap();
        assert!(raw.contains("\"progress\":67"));
        let back: LabProgress = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, record);
    }
}
