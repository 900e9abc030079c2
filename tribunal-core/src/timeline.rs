// Timeline reconstruction from raw session records
// Prefers the per-turn action log and falls back to the phase-level game log

use std::collections::BTreeMap;

use crate::types::{ChronicleEntry, Event, EventKind, Phase, SessionRecord, TurnEntry};

/// Which raw log the timeline is rebuilt from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSource {
    /// Per-turn action log, one event per recorded turn
    TurnLog,
    /// Coarser phase-level game log, used when no turns were recorded
    PhaseLog,
}

/// Pick the reconstruction source for a record. The per-turn log wins
/// whenever it has any entries at all.
pub fn select_source(record: &SessionRecord) -> ScriptSource {
    if record.action_log.is_empty() {
        ScriptSource::PhaseLog
    } else {
        ScriptSource::TurnLog
    }
}

/// Action verbs that count as speech rather than a decision
const SPEECH_ACTS: [&str; 2] = ["debate", "speak"];

/// Rebuild the canonical event sequence from a raw session record.
/// Deterministic and total: any record yields at least the terminal
/// reveal event.
pub fn build_timeline(record: &SessionRecord) -> Vec<Event> {
    let mut events = Vec::new();

    let roles = find_role_assignment(&record.game_log);
    if roles.is_some() {
        events.push(intro_event());
    }

    match select_source(record) {
        ScriptSource::TurnLog => events.extend(events_from_turn_log(&record.action_log)),
        ScriptSource::PhaseLog => events.extend(events_from_phase_log(&record.game_log)),
    }

    events.push(reveal_event(
        record.winner.as_deref(),
        roles.unwrap_or_default(),
    ));

    events
}

fn find_role_assignment(game_log: &[ChronicleEntry]) -> Option<BTreeMap<String, String>> {
    game_log.iter().find_map(|entry| match entry {
        ChronicleEntry::RoleAssignment { roles } => Some(roles.clone()),
        _ => None,
    })
}

fn intro_event() -> Event {
    Event {
        kind: EventKind::System,
        actor: None,
        text: "Archive recovered. Surveillance feed active. Participant identities remain encrypted."
            .to_string(),
        meta: "archive".to_string(),
        phase: None,
        decision: None,
        is_elimination: false,
        roles: None,
    }
}

/// One event per turn entry, in recorded order
pub fn events_from_turn_log(action_log: &[TurnEntry]) -> Vec<Event> {
    action_log.iter().map(turn_event).collect()
}

fn turn_event(entry: &TurnEntry) -> Event {
    let kind = if SPEECH_ACTS
        .iter()
        .any(|act| entry.action.eq_ignore_ascii_case(act))
    {
        EventKind::Speak
    } else {
        EventKind::Action
    };

    let reasoning = entry
        .reasoning
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty());
    let text = match reasoning {
        Some(text) => text.to_string(),
        None => synthesize_narration(entry),
    };

    let phase_label = if entry.phase.is_empty() {
        "?"
    } else {
        entry.phase.as_str()
    };

    Event {
        kind,
        actor: Some(entry.player.clone()),
        text,
        meta: format!("round {} · {}", entry.round, phase_label),
        phase: Phase::parse(&entry.phase),
        decision: entry.decision.clone(),
        is_elimination: false,
        roles: None,
    }
}

/// Narration for a turn that carried no reasoning of its own
fn synthesize_narration(entry: &TurnEntry) -> String {
    match entry.decision.as_deref() {
        Some(target) => format!("{} uses {} on {}", entry.player, entry.action, target),
        None => format!("{} takes action: {}", entry.player, entry.action),
    }
}

/// Fallback reconstruction from the phase-level game log. Only night
/// phases and vote exiles carry enough detail to narrate.
pub fn events_from_phase_log(game_log: &[ChronicleEntry]) -> Vec<Event> {
    game_log
        .iter()
        .filter_map(|entry| match entry {
            ChronicleEntry::NightPhase { round } => Some(Event {
                kind: EventKind::System,
                actor: None,
                text: "Night falls. Unseen actors move through the settlement.".to_string(),
                meta: round_meta(*round, "night"),
                phase: Some(Phase::Night),
                decision: None,
                is_elimination: false,
                roles: None,
            }),
            ChronicleEntry::VoteExile { player, round } => Some(Event {
                kind: EventKind::Action,
                actor: Some(player.clone()),
                text: format!("The assembly has voted: {} is exiled.", player),
                meta: round_meta(*round, "day"),
                phase: Some(Phase::Day),
                decision: None,
                is_elimination: true,
                roles: None,
            }),
            _ => None,
        })
        .collect()
}

fn round_meta(round: Option<u32>, phase: &str) -> String {
    match round {
        Some(round) => format!("round {} · {}", round, phase),
        None => phase.to_string(),
    }
}

fn reveal_event(winner: Option<&str>, roles: BTreeMap<String, String>) -> Event {
    let faction = match winner {
        Some(winner) => winner.to_uppercase(),
        None => "UNKNOWN".to_string(),
    };

    Event {
        kind: EventKind::Reveal,
        actor: None,
        text: format!(
            "Session complete. The {} faction prevails. Identities decrypted.",
            faction
        ),
        meta: "reveal".to_string(),
        phase: None,
        decision: None,
        is_elimination: false,
        roles: Some(roles),
    }
}
