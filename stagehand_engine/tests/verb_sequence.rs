use stagehand_data::ActionDef;
use stagehand_engine as se;
use stagehand_engine::loader::worlddef::cook_action;
use stagehand_engine::verb::{RunKey, RunState};

use se::{Action, Actor, ActorHome, Engine, EngineConfig, RetriggerPolicy, Scene, SceneActorRef, TriggerOutcome, Verb, World};

fn action(id: &str, params: &[(&str, &str)]) -> Action {
    let def = params
        .iter()
        .fold(ActionDef::new(id), |def, (k, v)| def.with(*k, *v));
    cook_action(&def).expect("valid action")
}

fn engine_with(policy: RetriggerPolicy) -> Engine {
    let door = Actor::new("door")
        .with_verb(Verb::new(
            "knock",
            vec![
                action("wait", &[("time", "1.0")]),
                action("setactorattr", &[("actor", "door"), ("visible", "false")]),
            ],
        ))
        .with_verb(Verb::new(
            "vanish",
            vec![
                action("removeactor", &[("actor", "door")]),
                action("say", &[("text", "Gone."), ("wait", "false")]),
            ],
        ));
    let mut hero = Actor::new_character("hero")
        .with_verb(Verb::new("slam", vec![action("removeactor", &[("actor", "door")])]))
        .with_verb(Verb::new(
            "greet",
            vec![
                action("say", &[("actor", "hero"), ("text", "Hello there"), ("type", "TALK")]),
                action("setactorattr", &[("actor", "hero"), ("desc", "greeted")]),
            ],
        ));
    hero.desc = Some("a hero".into());

    let mut hall = Scene::new("hall").with_actor(door).with_actor(hero);
    hall.player = Some("hero".into());
    let world = World::new(vec![hall], "hall");
    let config = EngineConfig {
        retrigger: policy,
        ..EngineConfig::default()
    };
    Engine::new(world, &config)
}

fn door_visible(engine: &Engine) -> Option<bool> {
    engine
        .world
        .find_actor(&SceneActorRef::current("door"), false)
        .map(|d| d.visible)
}

fn key(actor: &str, verb: &str) -> RunKey {
    RunKey::new(ActorHome::Scene("hall".into()), actor, verb)
}

fn waiting_token(engine: &Engine, key: &RunKey) -> se::CallbackToken {
    match &engine.runner.get(key).expect("run active").state {
        RunState::Waiting(token) => token.clone(),
        RunState::Running => panic!("run {key} is not waiting"),
    }
}

#[test]
fn immediate_action_runs_only_after_the_wait_completes() {
    let mut engine = engine_with(RetriggerPolicy::Ignore);
    let door = SceneActorRef::current("door");

    assert_eq!(engine.trigger_verb(&door, "knock"), Ok(TriggerOutcome::Waiting));
    assert_eq!(door_visible(&engine), Some(true));

    engine.update(0.5);
    assert_eq!(door_visible(&engine), Some(true));
    assert!(engine.runner.is_active(&key("door", "knock")));

    engine.update(0.6);
    assert_eq!(door_visible(&engine), Some(false));
    assert!(engine.runner.is_idle());
    assert!(engine.registry.is_empty());
    assert!(engine.is_idle());
}

#[test]
fn second_resume_of_the_same_token_is_ignored() {
    let mut engine = engine_with(RetriggerPolicy::Ignore);
    engine
        .trigger_verb(&SceneActorRef::current("door"), "knock")
        .expect("triggers");
    let token = waiting_token(&engine, &key("door", "knock"));

    assert!(engine.resume(&token));
    assert_eq!(door_visible(&engine), Some(false));

    // put the door back; a stray resume must not hide it again
    engine
        .world
        .find_actor_mut(&SceneActorRef::current("door"), false)
        .expect("door")
        .visible = true;
    assert!(!engine.resume(&token));
    assert_eq!(door_visible(&engine), Some(true));

    // the timer still fires later; its token is already spent
    engine.update(2.0);
    assert_eq!(door_visible(&engine), Some(true));
}

#[test]
fn ignore_policy_rejects_a_second_trigger() {
    let mut engine = engine_with(RetriggerPolicy::Ignore);
    let door = SceneActorRef::current("door");
    engine.trigger_verb(&door, "knock").expect("triggers");
    assert_eq!(engine.trigger_verb(&door, "knock"), Ok(TriggerOutcome::Ignored));
    assert_eq!(engine.registry.len(), 1);
    assert_eq!(engine.world.timers.len(), 1);
}

#[test]
fn restart_policy_invalidates_the_old_run() {
    let mut engine = engine_with(RetriggerPolicy::Restart);
    let door = SceneActorRef::current("door");
    engine.trigger_verb(&door, "knock").expect("triggers");
    let first = waiting_token(&engine, &key("door", "knock"));

    engine.update(0.5);
    assert_eq!(engine.trigger_verb(&door, "knock"), Ok(TriggerOutcome::Waiting));
    let second = waiting_token(&engine, &key("door", "knock"));
    assert_ne!(first, second);
    assert!(!engine.registry.contains(&first));
    assert_eq!(engine.registry.len(), 1);

    // the first timer expires at 1.0 but only the restarted run's timer counts
    engine.update(0.6);
    assert_eq!(door_visible(&engine), Some(true));
    engine.update(0.5);
    assert_eq!(door_visible(&engine), Some(false));
}

#[test]
fn queue_policy_starts_the_next_run_when_the_first_ends() {
    let mut engine = engine_with(RetriggerPolicy::Queue);
    let door = SceneActorRef::current("door");
    engine.trigger_verb(&door, "knock").expect("triggers");
    assert_eq!(engine.trigger_verb(&door, "knock"), Ok(TriggerOutcome::Queued));
    assert_eq!(engine.runner.queued_len(), 1);

    engine.update(1.1);
    assert_eq!(door_visible(&engine), Some(false));
    assert_eq!(engine.runner.queued_len(), 0);
    assert!(engine.runner.is_active(&key("door", "knock")));
    assert_eq!(engine.world.timers.len(), 1);

    engine.update(1.1);
    assert!(engine.runner.is_idle());
}

#[test]
fn removing_an_actor_cancels_its_waiting_runs() {
    let mut engine = engine_with(RetriggerPolicy::Ignore);
    engine
        .trigger_verb(&SceneActorRef::current("door"), "knock")
        .expect("triggers");
    let token = waiting_token(&engine, &key("door", "knock"));

    assert_eq!(
        engine.trigger_verb(&SceneActorRef::current("hero"), "slam"),
        Ok(TriggerOutcome::Finished)
    );
    assert!(!engine.runner.is_active(&key("door", "knock")));
    assert!(!engine.registry.contains(&token));
    assert_eq!(engine.world.released, vec!["door".to_string()]);

    engine.update(2.0);
    assert!(engine.runner.is_idle());
    assert_eq!(door_visible(&engine), None);
}

#[test]
fn removing_a_carried_actor_cancels_runs_started_in_its_scene() {
    let hum = || {
        Verb::new(
            "hum",
            vec![
                action("wait", &[("time", "1.0")]),
                action("sound", &[("actor", "shell"), ("play", "hum")]),
            ],
        )
    };
    let hero = Actor::new_character("hero").with_verb(Verb::new(
        "take",
        vec![
            action("pickup", &[("actor", "shell")]),
            action("removeactor", &[("actor", "shell")]),
        ],
    ));
    let mut hall = Scene::new("hall")
        .with_actor(Actor::new("shell").with_verb(hum()))
        .with_actor(hero);
    hall.player = Some("hero".into());
    let beach = Scene::new("beach").with_actor(Actor::new("shell").with_verb(hum()));
    let mut engine = Engine::new(World::new(vec![hall, beach], "hall"), &EngineConfig::default());

    let beach_shell = SceneActorRef::new(Some("beach"), "shell");
    let beach_key = RunKey::new(ActorHome::Scene("beach".into()), "shell", "hum");
    engine.trigger_verb(&SceneActorRef::current("shell"), "hum").expect("triggers");
    engine.trigger_verb(&beach_shell, "hum").expect("triggers");
    let token = waiting_token(&engine, &key("shell", "hum"));

    assert_eq!(
        engine.trigger_verb(&SceneActorRef::current("hero"), "take"),
        Ok(TriggerOutcome::Finished)
    );
    assert_eq!(engine.world.released, vec!["shell".to_string()]);
    assert!(!engine.runner.is_active(&key("shell", "hum")));
    assert!(!engine.registry.contains(&token));
    assert!(!engine.resume(&token));

    // the other scene's shell keeps humming
    assert!(engine.runner.is_active(&beach_key));
    engine.update(1.5);
    let sounds = engine.drain_sounds();
    assert_eq!(sounds.len(), 1);
    assert!(engine.runner.is_idle());
}

#[test]
fn a_run_that_removes_its_own_actor_finishes() {
    let mut engine = engine_with(RetriggerPolicy::Ignore);
    assert_eq!(
        engine.trigger_verb(&SceneActorRef::current("door"), "vanish"),
        Ok(TriggerOutcome::Finished)
    );
    assert_eq!(door_visible(&engine), None);
    assert_eq!(engine.world.text.current().map(|t| t.text.as_str()), Some("Gone."));
}

#[test]
fn say_waits_for_its_text_and_skip_releases_it() {
    let mut engine = engine_with(RetriggerPolicy::Ignore);
    let hero = SceneActorRef::current("hero");
    let desc = |engine: &Engine| {
        engine
            .world
            .find_actor(&SceneActorRef::current("hero"), false)
            .and_then(|h| h.desc.clone())
    };

    assert_eq!(engine.trigger_verb(&hero, "greet"), Ok(TriggerOutcome::Waiting));
    engine.update(1.0);
    assert_eq!(desc(&engine).as_deref(), Some("a hero"));
    engine.update(0.6);
    assert_eq!(desc(&engine).as_deref(), Some("greeted"));

    engine
        .world
        .find_actor_mut(&hero, false)
        .expect("hero")
        .desc = None;
    engine.trigger_verb(&hero, "greet").expect("triggers");
    engine.skip_text();
    assert_eq!(desc(&engine).as_deref(), Some("greeted"));
    assert!(engine.world.text.is_empty());
}

#[test]
fn unknown_targets_are_reported() {
    let mut engine = engine_with(RetriggerPolicy::Ignore);
    assert_eq!(
        engine.trigger_verb(&SceneActorRef::current("ghost"), "knock"),
        Err(se::TriggerError::ActorNotFound(SceneActorRef::current("ghost")))
    );
    assert!(matches!(
        engine.trigger_verb(&SceneActorRef::current("door"), "dance"),
        Err(se::TriggerError::VerbNotFound { .. })
    ));
}
