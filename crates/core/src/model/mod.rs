mod chat;
mod lab;
mod preferences;
mod progress;

pub use chat::{push_capped, ChatMessage, Sender, CHAT_HISTORY_LIMIT};
pub use lab::{Image, Lab, LabError, Step, UseCase};
pub use preferences::{Preferences, Theme};
pub use progress::{LabProgress, ProgressStats};
