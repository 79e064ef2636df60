//! Recorder of mixer state transitions.

use std::collections::VecDeque;

use crate::mixer::{PlaybackState, ZoneId};

const DEFAULT_CAPACITY: usize = 4096;

/// One applied state change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Mixer clock (seconds) when the change was applied.
    pub time: f32,
    /// Zone on top of the stack at that moment.
    pub zone: Option<ZoneId>,
    pub from: PlaybackState,
    pub to: PlaybackState,
}

/// Bounded history of state transitions.
///
/// Only real changes are kept; writing the current state again is not a
/// transition. The oldest entries are dropped once the capacity is reached.
#[derive(Debug, Clone)]
pub struct Timeline {
    entries: VecDeque<Transition>,
    capacity: usize,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Timeline {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Record a transition unless `from == to`.
    pub fn record(&mut self, transition: Transition) {
        if transition.from == transition.to {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(transition);
    }

    pub fn entries(&self) -> impl Iterator<Item = &Transition> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Transition> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// State sequence starting with the first recorded origin state.
    pub fn states(&self) -> Vec<PlaybackState> {
        let mut states = Vec::with_capacity(self.entries.len() + 1);
        if let Some(first) = self.entries.front() {
            states.push(first.from);
        }
        states.extend(self.entries.iter().map(|entry| entry.to));
        states
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(from: PlaybackState, to: PlaybackState) -> Transition {
        Transition {
            time: 0.0,
            zone: None,
            from,
            to,
        }
    }

    #[test]
    fn ignores_self_transitions() {
        let mut timeline = Timeline::default();
        timeline.record(transition(PlaybackState::Idle, PlaybackState::Idle));
        assert!(timeline.is_empty());
    }

    #[test]
    fn drops_oldest_entries_at_capacity() {
        let mut timeline = Timeline::with_capacity(2);
        timeline.record(transition(PlaybackState::Idle, PlaybackState::Playing));
        timeline.record(transition(PlaybackState::Playing, PlaybackState::TrackEnding));
        timeline.record(transition(PlaybackState::TrackEnding, PlaybackState::Paused));
        assert_eq!(
            timeline.states(),
            vec![
                PlaybackState::Playing,
                PlaybackState::TrackEnding,
                PlaybackState::Paused
            ]
        );
    }
}
