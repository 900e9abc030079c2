// Core type definitions for Tribunal

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of a canonical timeline event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    System,
    Speak,
    Action,
    Reveal,
}

/// Day/night phase attached to an event; presentation state only,
/// never used for ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Day,
    Night,
}

impl Phase {
    /// Parse a raw phase string, case-insensitively.
    /// Unrecognized values map to `None`.
    pub fn parse(raw: &str) -> Option<Phase> {
        match raw.to_ascii_lowercase().as_str() {
            "day" => Some(Phase::Day),
            "night" => Some(Phase::Night),
            _ => None,
        }
    }
}

/// Normalized timeline event produced by the timeline builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// Participant behind the event; absent for pure system narration
    pub actor: Option<String>,
    /// Human-readable narration, never empty
    pub text: String,
    /// Short contextual label: round/phase or lifecycle marker
    pub meta: String,
    pub phase: Option<Phase>,
    /// Target of the action, when the raw entry named one
    pub decision: Option<String>,
    /// True only for vote-based exiles from the phase-level log
    pub is_elimination: bool,
    /// Full role mapping; present only on the terminal reveal event
    pub roles: Option<BTreeMap<String, String>>,
}

impl Event {
    /// Actor name for display, with a placeholder for system narration
    pub fn actor_label(&self) -> &str {
        self.actor.as_deref().unwrap_or("system")
    }
}

// Raw session record formats
// Two recorder generations produced these: the per-turn action log
// (newer) and the coarser phase-level game log (older archives)

/// One entry of the phase-level game log, tagged by its `event` field.
/// Unknown tags fold into `Other` and are skipped during reconstruction.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event")]
#[serde(rename_all = "snake_case")]
pub enum ChronicleEntry {
    RoleAssignment {
        #[serde(default)]
        roles: BTreeMap<String, String>,
    },
    NightPhase {
        round: Option<u32>,
    },
    VoteExile {
        player: String,
        round: Option<u32>,
    },
    #[serde(other)]
    Other,
}

/// One entry of the per-turn action log
#[derive(Debug, Clone, Deserialize)]
pub struct TurnEntry {
    #[serde(default)]
    pub player: String,
    #[serde(default)]
    pub action: String,
    pub decision: Option<String>,
    pub reasoning: Option<String>,
    #[serde(default)]
    pub round: u32,
    #[serde(default)]
    pub phase: String,
}

/// A complete recorded session: log data plus participant and result
/// metadata. Every field defaults so thin archives still parse.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRecord {
    pub game_log: Vec<ChronicleEntry>,
    pub action_log: Vec<TurnEntry>,
    /// Participant metadata; opaque here beyond key enumeration
    pub participants: BTreeMap<String, serde_json::Value>,
    /// Winning faction, known only once the record is complete
    pub winner: Option<String>,
}
