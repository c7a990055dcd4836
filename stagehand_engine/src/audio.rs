//! Sound requests. Playback belongs to the host; the engine only queues events.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundEvent {
    pub actor: String,
    pub sound: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoundQueue {
    events: VecDeque<SoundEvent>,
}

impl SoundQueue {
    pub fn push(&mut self, actor: &str, sound: &str) {
        self.events.push_back(SoundEvent {
            actor: actor.to_string(),
            sound: sound.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand all pending events to the host, oldest first.
    pub fn drain(&mut self) -> Vec<SoundEvent> {
        self.events.drain(..).collect()
    }
}
