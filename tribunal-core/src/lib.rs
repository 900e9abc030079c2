// Tribunal Core Library
// Session records, timeline reconstruction, suspicion heuristics, and playback

pub mod archive;
pub mod export;
pub mod playback;
pub mod suspicion;
pub mod timeline;
pub mod types;

pub use archive::ArchiveStore;
pub use export::TimelineWriter;
pub use playback::{
    drive_auto_advance, PlaybackController, Snapshot, TaskSlot, AUTO_ADVANCE_INTERVAL,
};
pub use suspicion::{SuspicionEngine, SuspicionLevel, SUSPICION_STEP};
pub use timeline::{build_timeline, select_source, ScriptSource};
pub use types::*;
