//! Continuation tokens and the registry that maps them back to suspended runs.
//!
//! Subsystems (camera tweens, text display, timers) never hold a reference to
//! the action that is waiting on them. They carry an opaque [`CallbackToken`]
//! and hand it back when they finish. The registry turns the token into a
//! [`Continuation`] exactly once; stale or repeated tokens resolve to nothing.
//! Because both sides are plain keys, the whole registry is saved with the game.

use std::collections::BTreeMap;
use std::fmt::Display;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::verb::RunKey;
use crate::world::ActorHome;

/// Opaque, serializable handle for a pending continuation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackToken(String);

impl CallbackToken {
    pub fn new() -> Self {
        Self(format!("cb-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CallbackToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CallbackToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallbackToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Where to pick up a suspended verb run: the run's key and the index of the
/// action that suspended it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuation {
    pub run: RunKey,
    pub step: usize,
}

/// Token → continuation table. Each entry is consumed on first resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackRegistry {
    pending: BTreeMap<CallbackToken, Continuation>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a continuation and return a fresh token for it.
    pub fn register(&mut self, continuation: Continuation) -> CallbackToken {
        let token = CallbackToken::new();
        debug!(
            "registered {token} for {} step {}",
            continuation.run, continuation.step
        );
        self.pending.insert(token.clone(), continuation);
        token
    }

    /// Take the continuation for `token`. Unknown, already-resolved or
    /// invalidated tokens yield `None`.
    pub fn resolve(&mut self, token: &CallbackToken) -> Option<Continuation> {
        let continuation = self.pending.remove(token);
        if continuation.is_none() {
            debug!("ignoring unknown or spent callback token {token}");
        }
        continuation
    }

    pub fn contains(&self, token: &CallbackToken) -> bool {
        self.pending.contains_key(token)
    }

    /// Drop every pending continuation belonging to `run`.
    pub fn invalidate_run(&mut self, run: &RunKey) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, c| &c.run != run);
        let dropped = before - self.pending.len();
        if dropped > 0 {
            info!("invalidated {dropped} callback(s) for {run}");
        }
        dropped
    }

    /// Drop every pending continuation owned by runs on the given actor.
    pub fn invalidate_actor(&mut self, home: &ActorHome, actor: &str) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, c| !c.run.is_on(home, actor));
        let dropped = before - self.pending.len();
        if dropped > 0 {
            info!("invalidated {dropped} callback(s) for actor '{actor}' in {home}");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(actor: &str, verb: &str) -> RunKey {
        RunKey::new(ActorHome::Scene("hall".into()), actor, verb)
    }

    #[test]
    fn tokens_are_unique_and_prefixed() {
        let a = CallbackToken::new();
        let b = CallbackToken::new();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("cb-"));
    }

    #[test]
    fn resolve_consumes_the_entry() {
        let mut registry = CallbackRegistry::new();
        let token = registry.register(Continuation {
            run: key("door", "open"),
            step: 2,
        });
        let continuation = registry.resolve(&token).expect("pending");
        assert_eq!(continuation.step, 2);
        assert!(registry.resolve(&token).is_none());
        assert!(registry.resolve(&CallbackToken::from("cb-bogus")).is_none());
    }

    #[test]
    fn invalidation_is_scoped() {
        let mut registry = CallbackRegistry::new();
        let door = registry.register(Continuation {
            run: key("door", "open"),
            step: 0,
        });
        let lamp = registry.register(Continuation {
            run: key("lamp", "use"),
            step: 0,
        });

        assert_eq!(registry.invalidate_actor(&ActorHome::Scene("hall".into()), "door"), 1);
        assert!(!registry.contains(&door));
        assert!(registry.contains(&lamp));

        assert_eq!(registry.invalidate_run(&key("lamp", "use")), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_survives_ron_round_trip() {
        let mut registry = CallbackRegistry::new();
        let token = registry.register(Continuation {
            run: key("door", "open"),
            step: 1,
        });
        let text = ron::to_string(&registry).expect("serialize");
        let mut restored: CallbackRegistry = ron::from_str(&text).expect("deserialize");
        assert_eq!(restored.resolve(&token).map(|c| c.step), Some(1));
    }
}
