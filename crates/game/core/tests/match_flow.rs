//! Turn flow, casting, items and interactions end to end.

use std::cell::RefCell;
use std::rc::Rc;

use game_core::env::{
    ContentSnapshot, FixedRoll, Interaction, InteractionAction, InteractionTrigger,
    ItemDefinition, SpellDefinition, SpellEffect, StatusEffectDefinition, TargetKind,
};
use game_core::event::{DamageRequest, EventKind, GameEvent};
use game_core::state::{
    ActionGauge, Component, Controller, DamageType, Energy, Health, HealthThresholdPassive,
    Inventory, Mana, Resistance, ResourceKind, Shield, Speed, SpellList, Team,
};
use game_core::status::{EffectLogic, StatusEffect, StatusEffects};
use game_core::{Engine, EntityId, GameConfig, SchedulerMode};

fn engine_with(config: GameConfig, content: ContentSnapshot) -> Engine {
    let mut engine = Engine::new(config)
        .with_content(content)
        .with_rng(FixedRoll(0.99));
    engine.install_default_systems();
    engine
}

fn record(engine: &mut Engine, kind: EventKind) -> Rc<RefCell<Vec<GameEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine.bus_mut().subscribe(kind, move |_, _, event| {
        sink.borrow_mut().push(event.clone());
        Ok(())
    });
    seen
}

fn actors(events: &RefCell<Vec<GameEvent>>) -> Vec<EntityId> {
    events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            GameEvent::ActionRequest { actor } | GameEvent::ActionTaken { actor } => Some(*actor),
            _ => None,
        })
        .collect()
}

fn hp(engine: &Engine, id: EntityId) -> f64 {
    engine
        .world()
        .entity(id)
        .and_then(|entity| entity.get_component::<Health>())
        .map(Health::hp)
        .unwrap()
}

fn strike(name: &str, amount: f64, damage_type: DamageType) -> SpellDefinition {
    SpellDefinition::new(
        name,
        vec![SpellEffect::Damage {
            amount,
            damage_type,
            lifesteal_ratio: 0.0,
        }],
    )
}

#[test]
fn faster_entity_opens_the_round_and_lands_a_mitigated_hit() {
    let content =
        ContentSnapshot::new().with_spell("fire_bolt", strike("Fire Bolt", 100.0, DamageType::Fire));
    let mut engine = engine_with(GameConfig::default(), content);
    let requests = record(&mut engine, EventKind::ActionRequest);
    let a = engine.spawn(
        "a",
        [
            Component::from(Health::new(100.0)),
            Component::from(Speed::new(60.0)),
            Component::from(Team::Heroes),
            Component::from(SpellList::new(["fire_bolt"])),
        ],
    );
    let b = engine.spawn(
        "b",
        [
            Component::from(Health::new(200.0)),
            Component::from(Speed::new(50.0)),
            Component::from(Team::Monsters),
            Component::from(Shield::new(30.0)),
            Component::from(Resistance::new(DamageType::Fire, 0.5)),
        ],
    );

    engine.world_mut().start();
    engine.tick();
    engine.tick();

    assert_eq!(actors(&requests), vec![a, b]);
    assert_eq!(hp(&engine, b), 165.0);
    assert_eq!(engine.world().turn.round, 1);
}

#[test]
fn fuller_gauge_acts_first_and_keeps_the_surplus() {
    let config = GameConfig::default().with_scheduler(SchedulerMode::ActionPoints);
    let mut engine = engine_with(config, ContentSnapshot::new());
    let requests = record(&mut engine, EventKind::ActionRequest);
    let spawn = |engine: &mut Engine, name: &str, gauge: f64, team: Team| {
        engine.spawn(
            name,
            [
                Component::from(Health::new(50.0)),
                Component::from(Speed::new(0.0)),
                Component::from(ActionGauge { value: gauge }),
                Component::from(team),
            ],
        )
    };
    let slow = spawn(&mut engine, "slow", 100.0, Team::Heroes);
    let quick = spawn(&mut engine, "quick", 110.0, Team::Monsters);

    engine.world_mut().start();
    engine.tick();

    assert_eq!(actors(&requests), vec![quick]);
    let gauge = |id: EntityId| {
        engine
            .world()
            .entity(id)
            .and_then(|entity| entity.get_component::<ActionGauge>())
            .map(|gauge| gauge.value)
            .unwrap()
    };
    assert_eq!(gauge(quick), 10.0);
    assert_eq!(gauge(slow), 100.0);
}

#[test]
fn unaffordable_cast_keeps_the_turn_until_a_valid_action() {
    let content = ContentSnapshot::new()
        .with_spell(
            "meteor",
            strike("Meteor", 80.0, DamageType::Fire).with_cost(ResourceKind::Mana, 50.0),
        )
        .with_spell(
            "spark",
            strike("Spark", 5.0, DamageType::Lightning).with_cost(ResourceKind::Mana, 5.0),
        );
    let mut engine = engine_with(GameConfig::default(), content);
    let requests = record(&mut engine, EventKind::ActionRequest);
    let rejections = record(&mut engine, EventKind::ActionRejected);
    let player = engine.spawn(
        "player",
        [
            Component::from(Health::new(50.0)),
            Component::from(Speed::new(20.0)),
            Component::from(Team::Heroes),
            Component::from(Mana::new(10.0)),
            Component::from(Controller::Player),
        ],
    );
    let dummy = engine.spawn(
        "dummy",
        [
            Component::from(Health::new(50.0)),
            Component::from(Speed::new(10.0)),
            Component::from(Team::Monsters),
        ],
    );

    engine.world_mut().start();
    engine.tick();
    assert_eq!(engine.world().turn.awaiting, Some(player));

    engine.dispatch(GameEvent::CastSpellRequest {
        caster: player,
        target: dummy,
        spell_id: "meteor".into(),
    });
    assert_eq!(rejections.borrow().len(), 1);
    assert_eq!(engine.world().turn.awaiting, Some(player));
    let mana = |engine: &Engine| {
        engine
            .world()
            .entity(player)
            .and_then(|entity| entity.get_component::<Mana>())
            .map(|mana| mana.current)
            .unwrap()
    };
    assert_eq!(mana(&engine), 10.0);

    engine.tick();
    assert_eq!(actors(&requests), vec![player, player]);

    engine.dispatch(GameEvent::CastSpellRequest {
        caster: player,
        target: dummy,
        spell_id: "spark".into(),
    });
    assert_eq!(mana(&engine), 5.0);
    assert_eq!(hp(&engine, dummy), 45.0);
    assert_eq!(engine.world().turn.awaiting, None);
}

#[test]
fn items_spend_a_charge_and_run_out() {
    let potion = ItemDefinition {
        name: "Healing Potion".into(),
        target: TargetKind::Myself,
        effects: vec![SpellEffect::Heal {
            amount: 30.0,
            overheal_to_shield: None,
        }],
    };
    let content = ContentSnapshot::new().with_item("potion", potion);
    let mut engine = engine_with(GameConfig::default(), content);
    let rejections = record(&mut engine, EventKind::ActionRejected);
    let knight = engine.spawn(
        "knight",
        [
            Component::from(Health::with_current(100.0, 50.0)),
            Component::from(Inventory::default().with_item("potion", 1)),
        ],
    );
    let use_potion = GameEvent::UseItemRequest {
        user: knight,
        target: knight,
        item_id: "potion".into(),
    };

    engine.dispatch(use_potion.clone());
    assert_eq!(hp(&engine, knight), 80.0);

    engine.dispatch(use_potion);
    assert_eq!(hp(&engine, knight), 80.0);
    assert_eq!(rejections.borrow().len(), 1);
    let left = engine
        .world()
        .entity(knight)
        .and_then(|entity| entity.get_component::<Inventory>())
        .map(|bag| bag.count("potion"))
        .unwrap();
    assert_eq!(left, 0);
}

fn burning() -> StatusEffect {
    StatusEffect::new(
        "burning",
        "Burning",
        EffectLogic::DamageOverTime {
            damage_per_round: 5.0,
            damage_type: DamageType::Fire,
        },
    )
    .with_duration(3)
}

fn effect_duration(engine: &Engine, id: EntityId, effect_id: &str) -> Option<Option<i32>> {
    engine
        .world()
        .entity(id)
        .and_then(|entity| entity.get_component::<StatusEffects>())
        .and_then(|effects| effects.find(effect_id))
        .map(|effect| effect.duration)
}

fn interaction(trigger: InteractionTrigger, action: InteractionAction) -> Interaction {
    Interaction {
        trigger,
        target_has_effect: "burning".into(),
        action,
        message: Some("{caster}'s {spell} reacts on {target} ({damage})".into()),
    }
}

fn burning_duel(spell_id: &str, spell: SpellDefinition) -> (Engine, EntityId, EntityId) {
    let chilled = StatusEffectDefinition::new("Chilled", EffectLogic::Generic);
    let content = ContentSnapshot::new()
        .with_spell(spell_id, spell)
        .with_status_effect("chilled", chilled);
    let mut engine = engine_with(GameConfig::default(), content);
    let mage = engine.spawn(
        "mage",
        [Component::from(Health::new(100.0)), Component::from(Team::Heroes)],
    );
    let ent = engine.spawn(
        "ent",
        [Component::from(Health::new(100.0)), Component::from(Team::Monsters)],
    );
    engine.dispatch(GameEvent::apply_status(ent, burning()));
    (engine, mage, ent)
}

#[test]
fn combust_consumes_the_remaining_burn() {
    let combust = strike("Combust", 10.0, DamageType::Fire).with_interaction(interaction(
        InteractionTrigger::OnCast,
        InteractionAction::ConsumeAndDamage {
            damage_type: DamageType::Fire,
        },
    ));
    let (mut engine, mage, ent) = burning_duel("combust", combust);
    let messages = record(&mut engine, EventKind::UiMessage);

    engine.dispatch(GameEvent::CastSpellRequest {
        caster: mage,
        target: ent,
        spell_id: "combust".into(),
    });

    assert_eq!(hp(&engine, ent), 100.0 - 5.0 * 3.0 - 10.0);
    assert_eq!(effect_duration(&engine, ent, "burning"), None);
    assert!(messages.borrow().iter().any(|event| matches!(
        event,
        GameEvent::UiMessage { message } if message == "mage's Combust reacts on ent (15)"
    )));
}

#[test]
fn wind_fans_the_flames() {
    let gust = strike("Gust", 10.0, DamageType::Wind).with_interaction(interaction(
        InteractionTrigger::OnDamageDeal,
        InteractionAction::ExtendDuration { rounds: 2 },
    ));
    let (mut engine, mage, ent) = burning_duel("gust", gust);

    engine.dispatch(GameEvent::CastSpellRequest {
        caster: mage,
        target: ent,
        spell_id: "gust".into(),
    });

    assert_eq!(effect_duration(&engine, ent, "burning"), Some(Some(5)));
    assert_eq!(hp(&engine, ent), 90.0);
}

#[test]
fn frost_extinguishes_and_chills() {
    let frost = strike("Frost Bolt", 20.0, DamageType::Ice).with_interaction(interaction(
        InteractionTrigger::OnDamageDeal,
        InteractionAction::Extinguish {
            damage_multiplier: 0.5,
            remove_effect: Some("burning".into()),
            apply_effect: Some("chilled".into()),
        },
    ));
    let (mut engine, mage, ent) = burning_duel("frost", frost);

    engine.dispatch(GameEvent::CastSpellRequest {
        caster: mage,
        target: ent,
        spell_id: "frost".into(),
    });

    assert_eq!(hp(&engine, ent), 90.0);
    assert_eq!(effect_duration(&engine, ent, "burning"), None);
    assert_eq!(effect_duration(&engine, ent, "chilled"), Some(None));
}

#[test]
fn passing_restores_energy() {
    let mut engine = engine_with(GameConfig::default(), ContentSnapshot::new());
    let mut tired = Energy::new(50.0, 10.0);
    tired.current = 20.0;
    let monk = engine.spawn(
        "monk",
        [
            Component::from(Health::new(50.0)),
            Component::from(Speed::new(20.0)),
            Component::from(Team::Heroes),
            Component::from(tired),
        ],
    );
    engine.spawn(
        "imp",
        [
            Component::from(Health::new(50.0)),
            Component::from(Speed::new(10.0)),
            Component::from(Team::Monsters),
        ],
    );

    engine.world_mut().start();
    engine.tick();

    let energy = engine
        .world()
        .entity(monk)
        .and_then(|entity| entity.get_component::<Energy>())
        .map(|energy| energy.current)
        .unwrap();
    assert_eq!(energy, 30.0);
}

#[test]
fn threshold_passive_fires_once() {
    let mut engine = engine_with(GameConfig::default(), ContentSnapshot::new());
    let paladin = engine.spawn(
        "paladin",
        [
            Component::from(Health::new(100.0)),
            Component::from(HealthThresholdPassive {
                name: "Last Stand".into(),
                threshold_ratio: 0.5,
                shield_amount: 20.0,
            }),
        ],
    );
    let shield = |engine: &Engine| {
        engine
            .world()
            .entity(paladin)
            .and_then(|entity| entity.get_component::<Shield>())
            .map_or(0.0, |shield| shield.value)
    };

    engine.dispatch(GameEvent::DamageRequest(DamageRequest::new(None, paladin, "Axe", 60.0)));
    assert_eq!(hp(&engine, paladin), 40.0);
    assert_eq!(shield(&engine), 20.0);

    engine.dispatch(GameEvent::DamageRequest(DamageRequest::new(None, paladin, "Axe", 30.0)));
    assert_eq!(shield(&engine), 0.0);
    assert_eq!(hp(&engine, paladin), 30.0);
}

#[test]
fn a_full_match_ends_with_the_surviving_team() {
    let content =
        ContentSnapshot::new().with_spell("fire_bolt", strike("Fire Bolt", 40.0, DamageType::Fire));
    let mut engine = engine_with(GameConfig::default(), content);
    let ended = record(&mut engine, EventKind::MatchEnded);
    let hero = engine.spawn(
        "hero",
        [
            Component::from(Health::new(100.0)),
            Component::from(Speed::new(30.0)),
            Component::from(Team::Heroes),
            Component::from(SpellList::new(["fire_bolt"])),
        ],
    );
    let slime = engine.spawn(
        "slime",
        [
            Component::from(Health::new(70.0)),
            Component::from(Speed::new(10.0)),
            Component::from(Team::Monsters),
        ],
    );

    let report = engine.run();

    assert_eq!(report.outcome.map(|outcome| outcome.winner), Some(Some(Team::Heroes)));
    assert_eq!(report.rounds, 2);
    assert!(engine.world().is_alive(hero));
    assert!(!engine.world().is_alive(slime));
    assert_eq!(ended.borrow().len(), 1);
}
