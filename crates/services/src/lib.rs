#![forbid(unsafe_code)]

pub mod chat;
pub mod error;
pub mod loader;
pub mod navigation;
pub mod preferences;
pub mod progress_tracker;
pub mod store;

pub use labs_core::Clock;

pub use chat::ChatService;
pub use error::NavigationError;
pub use loader::LabLoader;
pub use navigation::{NavState, NavigationEvent, Navigator};
pub use preferences::PreferencesService;
pub use progress_tracker::ProgressTracker;
pub use store::LabStore;
