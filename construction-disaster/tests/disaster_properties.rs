use construction_disaster::{
    Command, Difficulty, DisasterConfig, DisasterEffect, DisasterRule, NotificationAction, Pref,
    Resolution, ResolutionError, ResolutionStage, SimWorld, StoryEvent, Tile, TileId,
};

const MAX_HEALTH: f32 = 1000.0;
const EPS: f32 = 1e-3;

fn active_world(seed: u64, difficulty: f32) -> SimWorld {
    let mut world = SimWorld::with_disaster(
        seed,
        Difficulty::new(difficulty).unwrap(),
        DisasterConfig::default(),
    );
    world.start_event(DisasterRule::ID).unwrap();
    world
}

fn resolve_one(world: &mut SimWorld, tile: Tile) -> Resolution {
    let id = tile.id;
    world.place(tile);
    let mut resolutions = world.complete_construction(id).unwrap();
    assert_eq!(resolutions.len(), 1, "exactly one listener should answer");
    resolutions.remove(0)
}

/// First seed whose resolution explodes at the given difficulty.
fn exploding_seed(difficulty: f32) -> u64 {
    (0..500)
        .find(|&seed| {
            let mut world = active_world(seed, difficulty);
            resolve_one(&mut world, Tile::powered(1, "tile.battery", MAX_HEALTH))
                .effect()
                .is_some_and(|effect| effect.is_explosion())
        })
        .expect("some seed explodes")
}

#[test]
fn structures_without_energy_node_are_ignored() {
    let mut world = active_world(11, 2.0);
    let resolution = resolve_one(&mut world, Tile::unpowered(7, "tile.wall", MAX_HEALTH));

    assert_eq!(resolution, Resolution::Skipped { tile: TileId(7) });
    assert!(world.log().is_empty());
    assert!(world.notifications().is_empty());
    assert!(world.commands().is_empty());
    let tile = world.tile(TileId(7)).unwrap();
    assert!((tile.total_damage() - 0.0).abs() < f32::EPSILON);
    assert!(!tile.is_on_fire());

    let event = world.event(DisasterRule::ID).unwrap();
    assert!(event.is_subscribed(), "skip keeps the subscription");
    assert!(!event.is_ended(), "skip does not end the event");
}

#[test]
fn qualifying_structure_logs_and_notifies_once() {
    for seed in 0..50 {
        let mut world = active_world(seed, 1.0);
        world.advance_tick();
        world.advance_tick();
        let resolution = resolve_one(&mut world, Tile::powered(3, "tile.battery", MAX_HEALTH));

        assert_eq!(world.log().len(), 1);
        assert_eq!(world.notifications().len(), 1);

        let handle = resolution.log_entry().unwrap();
        let entry = world.log().get(handle).unwrap();
        assert_eq!(entry.event_id, "ConstructionDisaster");
        assert_eq!(entry.title.key, "ev.construct.fail.title");
        assert_eq!(entry.description.key, "ev.construct.fail.desc");
        assert_eq!(entry.description.args, vec!["tile.battery".to_string()]);
        assert_eq!(entry.subject, TileId(3));
        assert_eq!(entry.ticks, 2);

        let notification = &world.notifications().posted()[0];
        assert_eq!(
            notification.on_icon_click,
            NotificationAction::ShowLogDetails(handle)
        );
        assert_eq!(notification.title, entry.title);
        assert_eq!(notification.created_at, 2);
        assert!(notification.sticky);

        assert_eq!(world.event(DisasterRule::ID).unwrap().log_entry(), Some(handle));
    }
}

#[test]
fn damage_stays_within_scaled_bounds() {
    for difficulty in [0.5_f32, 1.0, 2.0] {
        for seed in 0..100 {
            let mut world = active_world(seed, difficulty);
            let resolution = resolve_one(&mut world, Tile::powered(1, "tile.solar", MAX_HEALTH));
            let outcome = resolution.outcome().unwrap();

            assert!(outcome.damage_fraction >= 0.10 * difficulty - EPS);
            assert!(outcome.damage_fraction <= 0.30 * difficulty + EPS);
            assert!((outcome.damage - MAX_HEALTH * outcome.damage_fraction).abs() < EPS);

            let tile = world.tile(TileId(1)).unwrap();
            let hits = &tile.health.as_ref().unwrap().hits;
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].kind, construction_disaster::DamageType::Electricity);
            assert!((hits[0].amount - outcome.damage).abs() < EPS);
        }
    }
}

#[test]
fn exactly_one_of_fire_or_explosion() {
    let mut fires = 0;
    let mut explosions = 0;
    for seed in 0..200 {
        let mut world = active_world(seed, 2.0);
        let resolution = resolve_one(&mut world, Tile::powered(1, "tile.battery", MAX_HEALTH));
        let on_fire = world.tile(TileId(1)).unwrap().is_on_fire();
        let commands = world.drain_commands();

        match resolution.effect().unwrap() {
            DisasterEffect::Fire => {
                fires += 1;
                assert!(on_fire);
                assert!(commands.is_empty());
            }
            DisasterEffect::Explosion { radius, strength } => {
                explosions += 1;
                assert!(!on_fire);
                assert_eq!(commands.len(), 1);
                let Command::CreateExplosion(cmd) = &commands[0];
                assert_eq!(cmd.source, TileId(1));
                assert!((cmd.radius - radius).abs() < f32::EPSILON);
                assert!((cmd.strength - strength).abs() < f32::EPSILON);
            }
        }
    }
    assert!(fires > 0, "fire branch should occur");
    assert!(explosions > 0, "explosion branch should occur at max difficulty");
}

#[test]
fn explosion_parameters_scale_with_difficulty() {
    for difficulty in [1.0_f32, 2.0] {
        for seed in 0..200 {
            let mut world = active_world(seed, difficulty);
            let resolution = resolve_one(&mut world, Tile::powered(1, "tile.battery", MAX_HEALTH));
            if let Some(DisasterEffect::Explosion { radius, strength }) = resolution.effect() {
                assert!(radius >= 1.0 * difficulty - EPS && radius <= 3.0 * difficulty + EPS);
                assert!(strength >= 50.0 * difficulty - EPS && strength <= 100.0 * difficulty + EPS);
            }
        }
    }
}

#[test]
fn no_heavy_disasters_always_burns() {
    for seed in 0..200 {
        let mut world = active_world(seed, 2.0);
        world.set_pref(Pref::NoHeavyDisasters, true);
        let resolution = resolve_one(&mut world, Tile::powered(1, "tile.battery", MAX_HEALTH));
        assert_eq!(resolution.effect(), Some(DisasterEffect::Fire));
        assert!(world.commands().is_empty());
        assert!(world.tile(TileId(1)).unwrap().is_on_fire());
    }
}

#[test]
fn same_seed_reproduces_outcome() {
    for seed in [0_u64, 5, 42, 1337, 9999] {
        let mut first = active_world(seed, 1.5);
        let mut second = active_world(seed, 1.5);
        let a = resolve_one(&mut first, Tile::powered(4, "tile.generator", MAX_HEALTH));
        let b = resolve_one(&mut second, Tile::powered(4, "tile.generator", MAX_HEALTH));
        assert_eq!(a, b, "seed {seed} should be deterministic");
    }
}

#[test]
fn resolution_does_not_advance_parent_stream() {
    use rand::RngCore;

    let mut world = active_world(77, 1.0);
    let _ = resolve_one(&mut world, Tile::powered(1, "tile.battery", MAX_HEALTH));
    let after_resolution = world.rng().parent().next_u64();

    let untouched = construction_disaster::RngSource::from_user_seed(77);
    assert_eq!(after_resolution, untouched.parent().next_u64());
}

#[test]
fn explosion_command_carries_forked_stream() {
    let seed = exploding_seed(2.0);
    let mut world = active_world(seed, 2.0);
    world.place(Tile::powered(1, "tile.battery", MAX_HEALTH).at(construction_disaster::Position::new(5, 9)));
    world.complete_construction(TileId(1)).unwrap();

    let commands = world.drain_commands();
    let Command::CreateExplosion(cmd) = &commands[0];
    assert_eq!(cmd.position, construction_disaster::Position::new(5, 9));
    assert!(cmd.rng.draws() >= 4, "damage, chance, radius and strength draws");
}

#[test]
fn damage_failure_is_swallowed_and_event_ends() {
    let mut world = active_world(3, 1.0);
    let resolution = resolve_one(
        &mut world,
        Tile::powered(1, "tile.battery", MAX_HEALTH).refusing_damage(),
    );

    match &resolution {
        Resolution::Aborted { error, .. } => {
            assert!(matches!(
                error,
                ResolutionError::Host {
                    stage: ResolutionStage::Damage,
                    ..
                }
            ));
            assert_eq!(error.tile(), TileId(1));
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(world.log().len(), 1, "announcement survives the failure");
    assert_eq!(world.notifications().len(), 1);
    assert!(!world.tile(TileId(1)).unwrap().is_on_fire());

    let event = world.event(DisasterRule::ID).unwrap();
    assert!(event.is_ended());
    assert!(event.is_subscribed());

    let next = resolve_one(&mut world, Tile::powered(2, "tile.battery", MAX_HEALTH));
    assert!(next.outcome().is_some(), "later completions still resolve");
}

#[test]
fn missing_health_is_reported_as_missing_capability() {
    let mut world = active_world(8, 1.0);
    let resolution = resolve_one(
        &mut world,
        Tile::powered(1, "tile.battery", MAX_HEALTH).without_health(),
    );
    let Resolution::Aborted { error, .. } = resolution else {
        panic!("expected abort");
    };
    assert_eq!(
        error,
        ResolutionError::MissingCapability {
            tile: TileId(1),
            capability: construction_disaster::Capability::Damageable,
        }
    );
    assert_eq!(world.log().len(), 1);
}

#[test]
fn ignite_failure_keeps_damage_and_log() {
    let mut world = active_world(8, 1.0);
    world.set_pref(Pref::NoHeavyDisasters, true);
    let resolution = resolve_one(
        &mut world,
        Tile::powered(1, "tile.battery", MAX_HEALTH).refusing_ignition(),
    );
    let Resolution::Aborted {
        error,
        damage_fraction,
        ..
    } = resolution
    else {
        panic!("expected abort");
    };
    assert!(matches!(
        error,
        ResolutionError::Host {
            stage: ResolutionStage::Ignite,
            ..
        }
    ));
    let tile = world.tile(TileId(1)).unwrap();
    assert!((tile.total_damage() - MAX_HEALTH * damage_fraction).abs() < EPS);
    assert_eq!(world.notifications().len(), 1);
}

#[test]
fn rejected_explosion_does_not_fall_back_to_fire() {
    let seed = exploding_seed(2.0);
    let mut world = active_world(seed, 2.0);
    world.commands_mut().reject_with("queue frozen");
    let resolution = resolve_one(&mut world, Tile::powered(1, "tile.battery", MAX_HEALTH));

    let Resolution::Aborted { error, .. } = resolution else {
        panic!("expected abort");
    };
    assert!(matches!(
        error,
        ResolutionError::Host {
            stage: ResolutionStage::Explosion,
            ..
        }
    ));
    assert!(!world.tile(TileId(1)).unwrap().is_on_fire());
    assert!(world.commands().is_empty());
}
