// Timeline export
// One directory per session: event JSONL plus metadata sidecar

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde_json::json;

use crate::types::{Event, SessionRecord};

/// Writes reviewed sessions to disk in a line-oriented format
pub struct TimelineWriter {
    base_dir: PathBuf,
}

impl TimelineWriter {
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        TimelineWriter { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write `timeline.jsonl` (one canonical event per line) and
    /// `session.json` metadata under `<base>/<session-id>/`. Returns
    /// the session directory.
    pub fn write_timeline(
        &self,
        session_id: &str,
        record: &SessionRecord,
        events: &[Event],
    ) -> Result<PathBuf> {
        let session_dir = self.base_dir.join(session_id);
        fs::create_dir_all(&session_dir)
            .with_context(|| format!("Failed to create export directory: {}", session_dir.display()))?;

        let metadata = json!({
            "id": session_id,
            "winner": record.winner,
            "participant_count": record.participants.len(),
            "event_count": events.len(),
            "exported_at": chrono::Utc::now().to_rfc3339(),
        });
        let metadata_path = session_dir.join("session.json");
        let metadata_file = File::create(&metadata_path)
            .with_context(|| format!("Failed to create {}", metadata_path.display()))?;
        serde_json::to_writer_pretty(metadata_file, &metadata)?;

        let timeline_path = session_dir.join("timeline.jsonl");
        let timeline_file = File::create(&timeline_path)
            .with_context(|| format!("Failed to create {}", timeline_path.display()))?;
        let mut writer = BufWriter::new(timeline_file);
        for event in events {
            serde_json::to_writer(&mut writer, event)?;
            writeln!(writer)?;
        }
        writer.flush()?;

        Ok(session_dir)
    }
}
