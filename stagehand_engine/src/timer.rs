//! Countdown timers used by the `wait` action.

use serde::{Deserialize, Serialize};

use crate::callback::CallbackToken;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub remaining: f32,
    pub on_complete: CallbackToken,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timers {
    active: Vec<Timer>,
}

impl Timers {
    pub fn start(&mut self, duration: f32, on_complete: CallbackToken) {
        self.active.push(Timer {
            remaining: duration,
            on_complete,
        });
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Tick every timer; expired timers are removed and their tokens returned
    /// in start order.
    pub fn update(&mut self, dt: f32) -> Vec<CallbackToken> {
        let mut expired = Vec::new();
        self.active.retain_mut(|timer| {
            timer.remaining -= dt;
            if timer.remaining <= 0.0 {
                expired.push(timer.on_complete.clone());
                false
            } else {
                true
            }
        });
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_expire_in_start_order() {
        let mut timers = Timers::default();
        let long = CallbackToken::new();
        let short = CallbackToken::new();
        timers.start(2.0, long.clone());
        timers.start(1.0, short.clone());

        assert_eq!(timers.update(1.0), vec![short]);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.update(1.5), vec![long]);
        assert!(timers.is_empty());
    }
}
