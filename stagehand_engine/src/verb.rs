//! Verbs and the executor that runs them.
//!
//! A verb is an ordered list of actions on an actor. Triggering it creates a
//! [`VerbRun`] keyed by `(home, actor, verb)` that owns a snapshot of those
//! actions. The run executes actions until one defers a continuation, then
//! sits in [`RunState::Waiting`] until the matching token is resumed. Only one
//! run per key is active at a time; what happens on a second trigger is
//! decided by the [`RetriggerPolicy`].

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Display;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use variantly::Variantly;

use crate::action::{Action, ActionContext};
use crate::callback::{CallbackRegistry, CallbackToken, Continuation};
use crate::world::{ActorHome, World};

/// A named list of actions on an actor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Verb {
    pub id: String,
    pub actions: Vec<Action>,
}

impl Verb {
    pub fn new(id: impl Into<String>, actions: Vec<Action>) -> Self {
        Self { id: id.into(), actions }
    }
}

/// Identity of a verb run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunKey {
    pub home: ActorHome,
    pub actor: String,
    pub verb: String,
}

impl RunKey {
    pub fn new(home: ActorHome, actor: &str, verb: &str) -> Self {
        Self {
            home,
            actor: actor.to_string(),
            verb: verb.to_string(),
        }
    }

    /// True if this run belongs to `actor` living in `home`.
    pub fn is_on(&self, home: &ActorHome, actor: &str) -> bool {
        &self.home == home && self.is_actor(actor)
    }

    pub fn is_actor(&self, actor: &str) -> bool {
        self.actor == actor
    }
}

impl Display for RunKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}.{}' in {}", self.actor, self.verb, self.home)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Variantly)]
pub enum RunState {
    /// Ready to execute the action at `ip`.
    Running,
    /// Suspended until the token is resumed.
    Waiting(CallbackToken),
}

/// An active verb sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbRun {
    pub key: RunKey,
    pub actions: Vec<Action>,
    /// Index of the next action to execute.
    pub ip: usize,
    pub state: RunState,
}

/// What to do when a verb is triggered while a run with the same key is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetriggerPolicy {
    /// Reject the new trigger.
    #[default]
    Ignore,
    /// Cancel the active run and start over.
    Restart,
    /// Start the new trigger once the active run ends.
    Queue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Ran to the end without waiting.
    Finished,
    /// Suspended on a continuation.
    Waiting,
    /// Rejected because a run with the same key is active.
    Ignored,
    /// Deferred until the active run ends.
    Queued,
}

/// Owns every active run and queued trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerbRunner {
    pub policy: RetriggerPolicy,
    runs: BTreeMap<RunKey, VerbRun>,
    queued: VecDeque<(RunKey, Vec<Action>)>,
}

impl VerbRunner {
    pub fn new(policy: RetriggerPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn get(&self, key: &RunKey) -> Option<&VerbRun> {
        self.runs.get(key)
    }

    pub fn runs(&self) -> impl Iterator<Item = &VerbRun> {
        self.runs.values()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_active(&self, key: &RunKey) -> bool {
        self.runs.contains_key(key)
    }

    pub fn is_idle(&self) -> bool {
        self.runs.is_empty() && self.queued.is_empty()
    }

    /// Start a run of `actions` under `key`, honouring the re-trigger policy.
    pub fn trigger(
        &mut self,
        key: RunKey,
        actions: Vec<Action>,
        world: &mut World,
        registry: &mut CallbackRegistry,
    ) -> TriggerOutcome {
        let busy = self.runs.contains_key(&key) || self.queued.iter().any(|(k, _)| k == &key);
        if busy {
            match self.policy {
                RetriggerPolicy::Ignore => {
                    info!("verb {key} is already running; ignoring trigger");
                    return TriggerOutcome::Ignored;
                },
                RetriggerPolicy::Queue => {
                    info!("verb {key} is already running; queueing trigger");
                    self.queued.push_back((key, actions));
                    return TriggerOutcome::Queued;
                },
                RetriggerPolicy::Restart => {
                    info!("verb {key} is already running; restarting");
                    self.cancel(&key, registry);
                },
            }
        }
        info!("verb {key} triggered ({} action(s))", actions.len());
        self.start(key.clone(), actions);
        self.drive(&key, world, registry)
    }

    fn start(&mut self, key: RunKey, actions: Vec<Action>) {
        self.runs.insert(
            key.clone(),
            VerbRun {
                key,
                actions,
                ip: 0,
                state: RunState::Running,
            },
        );
    }

    /// Continue the run that `continuation` points at, provided it is waiting
    /// on exactly `token` at that step. Returns whether the run was resumed.
    pub fn resume(
        &mut self,
        token: &CallbackToken,
        continuation: &Continuation,
        world: &mut World,
        registry: &mut CallbackRegistry,
    ) -> bool {
        let Some(run) = self.runs.get_mut(&continuation.run) else {
            debug!("resume {token}: run {} is no longer active", continuation.run);
            return false;
        };
        let matches = matches!(&run.state, RunState::Waiting(waiting) if waiting == token);
        if !matches || run.ip != continuation.step + 1 {
            warn!(
                "resume {token}: run {} is not waiting on this token at step {}",
                continuation.run, continuation.step
            );
            return false;
        }
        run.state = RunState::Running;
        self.drive(&continuation.run, world, registry);
        true
    }

    /// Start queued triggers whose key is free and step every running run.
    pub fn step_ready(&mut self, world: &mut World, registry: &mut CallbackRegistry) {
        let mut pending = std::mem::take(&mut self.queued);
        while let Some((key, actions)) = pending.pop_front() {
            if self.runs.contains_key(&key) {
                self.queued.push_back((key, actions));
            } else {
                info!("starting queued verb {key}");
                self.start(key, actions);
            }
        }

        let ready: Vec<RunKey> = self
            .runs
            .values()
            .filter(|r| r.state.is_running())
            .map(|r| r.key.clone())
            .collect();
        for key in ready {
            if self.runs.get(&key).is_some_and(|r| r.state.is_running()) {
                self.drive(&key, world, registry);
            }
        }
    }

    /// Cancel a run and invalidate its tokens.
    pub fn cancel(&mut self, key: &RunKey, registry: &mut CallbackRegistry) -> bool {
        let removed = self.runs.remove(key).is_some();
        if removed {
            info!("verb {key} cancelled");
        }
        registry.invalidate_run(key);
        removed
    }

    /// Cancel every run and queued trigger of a removed actor except `keep`.
    ///
    /// Runs keyed to an older home of the actor match as well: `pickup`,
    /// `drop` and `leave` move actors after their verbs have started.
    pub fn cancel_actor(
        &mut self,
        world: &World,
        home: &ActorHome,
        actor: &str,
        keep: &RunKey,
        registry: &mut CallbackRegistry,
    ) {
        let owned = |k: &RunKey| {
            k != keep && k.is_actor(actor) && (&k.home == home || !world.holds_actor(&k.home, actor))
        };
        let doomed: Vec<RunKey> = self.runs.keys().filter(|&k| owned(k)).cloned().collect();
        for key in &doomed {
            self.cancel(key, registry);
        }
        if !keep.is_on(home, actor) {
            registry.invalidate_actor(home, actor);
        }
        let before = self.queued.len();
        self.queued.retain(|(k, _)| !owned(k));
        if before != self.queued.len() {
            info!("dropped {} queued trigger(s) for removed actor '{actor}'", before - self.queued.len());
        }
    }

    /// Execute actions of a running run until it waits or ends.
    fn drive(&mut self, key: &RunKey, world: &mut World, registry: &mut CallbackRegistry) -> TriggerOutcome {
        loop {
            let Some(run) = self.runs.get_mut(key) else {
                return TriggerOutcome::Finished;
            };
            let step = run.ip;
            let Some(action) = run.actions.get(step) else {
                info!("verb {key} finished");
                self.runs.remove(key);
                return TriggerOutcome::Finished;
            };

            let mut ctx = ActionContext::new(
                world,
                registry,
                Continuation {
                    run: key.clone(),
                    step,
                },
            );
            let wants_wait = action.run(&mut ctx);
            let (deferred, removed) = ctx.finish();

            run.ip += 1;
            if wants_wait && deferred.is_none() {
                warn!("verb {key}: action #{step} asked to wait without a continuation; continuing");
            }
            let waiting = deferred.is_some();
            if let Some(token) = deferred {
                run.state = RunState::Waiting(token);
            }

            for (home, actor) in removed {
                self.cancel_actor(world, &home, &actor, key, registry);
            }
            if waiting {
                return TriggerOutcome::Waiting;
            }
        }
    }
}
