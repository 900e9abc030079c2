// Cursor-based playback over a reconstructed timeline
// One controller owns the replay state; scheduled tasks live in
// single-owner slots and are aborted on replace

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use color_eyre::eyre::{eyre, Result};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::suspicion::SuspicionEngine;
use crate::types::Event;

/// Reference delay between auto-advance steps
pub const AUTO_ADVANCE_INTERVAL: Duration = Duration::from_millis(3000);

/// Single-owner handle for a scheduled task. Replacing or dropping the
/// slot aborts whatever was running in it.
#[derive(Debug, Default)]
pub struct TaskSlot(Option<JoinHandle<()>>);

impl TaskSlot {
    pub fn new() -> Self {
        TaskSlot(None)
    }

    /// Install a new task, aborting the previous occupant
    pub fn replace(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.0 = Some(handle);
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.0.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Mutable playback state for one loaded session. Never persisted;
/// dies with its controller.
#[derive(Debug)]
struct ReplayState {
    events: Vec<Event>,
    current_index: usize,
    auto_play: bool,
    suspicion_scores: BTreeMap<String, u8>,
    reveal_task: TaskSlot,
    advance_task: TaskSlot,
}

/// Render-ready projection of the current playback position
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub event: Event,
    pub index: usize,
    pub progress_percent: f64,
    pub suspicion_scores: BTreeMap<String, u8>,
}

/// Drives the cursor over a timeline and keeps the suspicion map
/// consistent with the events up to the cursor, inclusive.
pub struct PlaybackController {
    state: ReplayState,
    engine: SuspicionEngine,
    participants: Vec<String>,
}

impl PlaybackController {
    /// Refuses an empty timeline: there is no valid cursor position
    /// into zero events.
    pub fn new(events: Vec<Event>, participants: Vec<String>) -> Result<Self> {
        if events.is_empty() {
            return Err(eyre!("archive corrupted: timeline has no events"));
        }

        let engine = SuspicionEngine::new();
        let suspicion_scores =
            engine.recompute(participants.iter().map(String::as_str), &events[..1]);

        Ok(PlaybackController {
            state: ReplayState {
                events,
                current_index: 0,
                auto_play: false,
                suspicion_scores,
                reveal_task: TaskSlot::new(),
                advance_task: TaskSlot::new(),
            },
            engine,
            participants,
        })
    }

    /// Move the cursor by a signed delta, clamped to the timeline
    /// bounds. A boundary step is a no-op that still refreshes the
    /// snapshot.
    pub fn step(&mut self, delta: i64) -> Snapshot {
        let last = (self.state.events.len() - 1) as i64;
        let next = (self.state.current_index as i64 + delta).clamp(0, last);
        self.set_index(next as usize)
    }

    /// Jump to an absolute index, clamped to the last event
    pub fn seek(&mut self, index: usize) -> Snapshot {
        let last = self.state.events.len() - 1;
        self.set_index(index.min(last))
    }

    fn set_index(&mut self, index: usize) -> Snapshot {
        self.state.reveal_task.cancel();
        self.state.current_index = index;
        self.state.suspicion_scores = self.engine.recompute(
            self.participants.iter().map(String::as_str),
            &self.state.events[..=index],
        );
        self.snapshot()
    }

    /// Flip auto-play and return the new value. Turning it off takes
    /// effect at the advance loop's next scheduled check.
    pub fn toggle_auto_play(&mut self) -> bool {
        self.state.auto_play = !self.state.auto_play;
        self.state.auto_play
    }

    pub fn auto_play(&self) -> bool {
        self.state.auto_play
    }

    pub fn stop_auto_play(&mut self) {
        self.state.auto_play = false;
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn at_end(&self) -> bool {
        self.state.current_index == self.state.events.len() - 1
    }

    pub fn events(&self) -> &[Event] {
        &self.state.events
    }

    /// Install the character-reveal task, aborting any pending one
    pub fn set_reveal_task(&mut self, handle: JoinHandle<()>) {
        self.state.reveal_task.replace(handle);
    }

    /// Install the auto-advance loop, aborting any pending one
    pub fn set_advance_task(&mut self, handle: JoinHandle<()>) {
        self.state.advance_task.replace(handle);
    }

    pub fn snapshot(&self) -> Snapshot {
        let len = self.state.events.len();
        let progress_percent = if len == 1 {
            100.0
        } else {
            self.state.current_index as f64 / (len - 1) as f64 * 100.0
        };

        Snapshot {
            event: self.state.events[self.state.current_index].clone(),
            index: self.state.current_index,
            progress_percent,
            suspicion_scores: self.state.suspicion_scores.clone(),
        }
    }
}

/// Cooperative auto-advance loop. Sleeps the interval, re-checks the
/// auto-play flag as its cancellation gate, steps forward and hands
/// the snapshot to the caller. Terminates at the last event, clearing
/// the flag.
pub async fn drive_auto_advance<F>(
    controller: Arc<Mutex<PlaybackController>>,
    interval: Duration,
    mut on_step: F,
) where
    F: FnMut(Snapshot),
{
    loop {
        {
            let mut guard = controller.lock().expect("replay state lock poisoned");
            if !guard.auto_play() {
                return;
            }
            if guard.at_end() {
                guard.stop_auto_play();
                return;
            }
        }

        tokio::time::sleep(interval).await;

        let snapshot = {
            let mut guard = controller.lock().expect("replay state lock poisoned");
            if !guard.auto_play() {
                return;
            }
            guard.step(1)
        };
        on_step(snapshot);
    }
}
