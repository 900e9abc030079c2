// Suspicion scoring over the reconstructed timeline
// Scores only ever rise; backward navigation recomputes from scratch

use std::collections::BTreeMap;

use regex::Regex;

use crate::types::{Event, EventKind};

/// Score increment for one implicating event
pub const SUSPICION_STEP: u8 = 15;

/// Presentation band for a suspicion score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspicionLevel {
    Calm,
    Elevated,
    Critical,
}

impl SuspicionLevel {
    pub fn from_score(score: u8) -> SuspicionLevel {
        if score > 75 {
            SuspicionLevel::Critical
        } else if score > 40 {
            SuspicionLevel::Elevated
        } else {
            SuspicionLevel::Calm
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SuspicionLevel::Calm => "calm",
            SuspicionLevel::Elevated => "elevated",
            SuspicionLevel::Critical => "critical",
        }
    }
}

/// Detects implicating events and accumulates per-participant scores
pub struct SuspicionEngine {
    markers: Vec<Regex>,
}

impl SuspicionEngine {
    pub fn new() -> Self {
        let patterns = [
            r"(?i)suspect",
            r"(?i)suspicious",
            r"(?i)accus",
            r"(?i)\blying\b",
            r"(?i)\bliar\b",
            r"(?i)wolf among",
        ];

        SuspicionEngine {
            markers: patterns.iter().map(|p| Regex::new(p).unwrap()).collect(),
        }
    }

    fn has_marker(&self, text: &str) -> bool {
        self.markers.iter().any(|marker| marker.is_match(text))
    }

    /// Fold one event into the score map. Events with no actor never
    /// score; decision actions and marker-bearing speech add one step,
    /// clamped to 100.
    pub fn apply(&self, scores: &mut BTreeMap<String, u8>, event: &Event) {
        if let Some(actor) = event.actor.as_ref() {
            if event.kind == EventKind::Action || self.has_marker(&event.text) {
                let entry = scores.entry(actor.clone()).or_insert(0);
                *entry = entry.saturating_add(SUSPICION_STEP).min(100);
            }
        }
    }

    /// Replay an event prefix over a zero-seeded map. Every named
    /// participant appears in the result even at score 0.
    pub fn recompute<'a, I>(&self, participants: I, events: &[Event]) -> BTreeMap<String, u8>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut scores: BTreeMap<String, u8> = participants
            .into_iter()
            .map(|name| (name.to_string(), 0))
            .collect();
        for event in events {
            self.apply(&mut scores, event);
        }
        scores
    }
}

impl Default for SuspicionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, actor: Option<&str>, text: &str) -> Event {
        Event {
            kind,
            actor: actor.map(str::to_string),
            text: text.to_string(),
            meta: String::new(),
            phase: None,
            decision: None,
            is_elimination: false,
            roles: None,
        }
    }

    #[test]
    fn test_action_adds_one_step() {
        let engine = SuspicionEngine::new();
        let mut scores = BTreeMap::new();
        engine.apply(
            &mut scores,
            &event(EventKind::Action, Some("P1"), "P1 uses vote on P2"),
        );
        assert_eq!(scores.get("P1"), Some(&15));
    }

    #[test]
    fn test_plain_speech_does_not_score() {
        let engine = SuspicionEngine::new();
        let mut scores = BTreeMap::from([("P1".to_string(), 0)]);
        engine.apply(
            &mut scores,
            &event(EventKind::Speak, Some("P1"), "I spent the night at home"),
        );
        assert_eq!(scores.get("P1"), Some(&0));
    }

    #[test]
    fn test_marker_speech_scores_case_insensitively() {
        let engine = SuspicionEngine::new();
        let mut scores = BTreeMap::new();
        engine.apply(
            &mut scores,
            &event(EventKind::Speak, Some("P1"), "P2 is SUSPICIOUS and I Accuse them"),
        );
        assert_eq!(scores.get("P1"), Some(&15));

        engine.apply(
            &mut scores,
            &event(EventKind::Speak, Some("P1"), "there is a wolf among us"),
        );
        assert_eq!(scores.get("P1"), Some(&30));
    }

    #[test]
    fn test_marker_requires_word_boundary() {
        let engine = SuspicionEngine::new();
        let mut scores = BTreeMap::new();
        // "flying" and "familiar" must not trip the lying/liar markers
        engine.apply(
            &mut scores,
            &event(EventKind::Speak, Some("P1"), "birds were flying over a familiar field"),
        );
        assert!(scores.get("P1").is_none());
    }

    #[test]
    fn test_score_clamps_at_hundred() {
        let engine = SuspicionEngine::new();
        let mut scores = BTreeMap::new();
        let implicating = event(EventKind::Action, Some("P1"), "P1 uses vote on P2");
        for _ in 0..10 {
            engine.apply(&mut scores, &implicating);
        }
        assert_eq!(scores.get("P1"), Some(&100));
    }

    #[test]
    fn test_events_without_actor_never_score() {
        let engine = SuspicionEngine::new();
        let mut scores = BTreeMap::new();
        engine.apply(
            &mut scores,
            &event(EventKind::System, None, "A suspicious silence settles"),
        );
        assert!(scores.is_empty());
    }

    #[test]
    fn test_recompute_seeds_all_participants() {
        let engine = SuspicionEngine::new();
        let events = [event(EventKind::Action, Some("P1"), "P1 uses vote on P2")];
        let scores = engine.recompute(["P1", "P2", "P3"], &events);
        assert_eq!(scores.get("P1"), Some(&15));
        assert_eq!(scores.get("P2"), Some(&0));
        assert_eq!(scores.get("P3"), Some(&0));
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let engine = SuspicionEngine::new();
        let events = [
            event(EventKind::Action, Some("P1"), "P1 uses vote on P2"),
            event(EventKind::Speak, Some("P2"), "I suspect P1"),
            event(EventKind::System, None, "Night falls."),
        ];
        let first = engine.recompute(["P1", "P2"], &events);
        let second = engine.recompute(["P1", "P2"], &events);
        assert_eq!(first, second);
        assert_eq!(first.get("P1"), Some(&15));
        assert_eq!(first.get("P2"), Some(&15));
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(SuspicionLevel::from_score(0), SuspicionLevel::Calm);
        assert_eq!(SuspicionLevel::from_score(40), SuspicionLevel::Calm);
        assert_eq!(SuspicionLevel::from_score(41), SuspicionLevel::Elevated);
        assert_eq!(SuspicionLevel::from_score(75), SuspicionLevel::Elevated);
        assert_eq!(SuspicionLevel::from_score(76), SuspicionLevel::Critical);
        assert_eq!(SuspicionLevel::from_score(100), SuspicionLevel::Critical);
    }
}
