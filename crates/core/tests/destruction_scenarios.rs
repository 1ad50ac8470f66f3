//! End-to-end destruction scenarios driven through the public API
//!
//! Each test builds a small ASCII map, runs it through `DestructionManager`
//! (or a single subsystem where the manager adds nothing) and checks the
//! observable outcome: tile state, events and entity health.

use destruction_sim_core::{
    BasicEntity, Color, DamageType, DestructionConfig, DestructionEvent, DestructionManager, DestructionStage,
    EntityDamageCause, ExplosionDescriptor, FireConfig, FireIntensity, FireSimulation, FixedRandom, GridPos, Material, Tile,
    TileGrid, TileLegend,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn manager(rows: &[&str]) -> DestructionManager {
    DestructionManager::from_ascii(rows, &TileLegend::standard(), DestructionConfig::default())
        .expect("valid map")
}

fn record_events(manager: &mut DestructionManager) -> Rc<RefCell<Vec<DestructionEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    manager.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn open_map(width: usize, height: usize) -> Vec<String> {
    vec![".".repeat(width); height]
}

#[test]
fn wood_tile_destroyed_by_single_hit() {
    let mut wood = Tile::wall(Arc::new(Material::wood()), 'T', Color::BROWN);
    assert_eq!(wood.max_hp(), 20);

    let outcome = wood.take_damage(25, DamageType::Physical, &mut FixedRandom::never());
    assert!(outcome.destroyed);
    assert_eq!(wood.stage(), DestructionStage::Destroyed);
    assert!(!wood.blocks_movement());
    assert!(!wood.blocks_sight());

    // Destroyed tiles ignore further damage
    let again = wood.take_damage(25, DamageType::Physical, &mut FixedRandom::never());
    assert_eq!(again.damage_dealt, 0);
    assert!(!again.destroyed);
}

#[test]
fn grenade_falloff_at_distance_two() {
    let rows = open_map(21, 21);
    let mut mgr = DestructionManager::from_ascii(&rows, &TileLegend::standard(), DestructionConfig::default())
        .expect("valid map");
    mgr.set_random_source(FixedRandom::never());
    let mut nobody: Vec<BasicEntity> = Vec::new();

    let hits = mgr.trigger_explosion(GridPos::new(10, 10), &ExplosionDescriptor::grenade(), &mut nobody);
    let hit = hits
        .iter()
        .find(|h| h.position == GridPos::new(12, 10))
        .expect("tile inside the radius");
    assert_eq!(hit.distance, 2.0);
    assert_eq!(hit.damage, 6);
    // Dirt takes 1.16x explosive damage: trunc(6 * 1.16) = 6
    assert_eq!(hit.damage_dealt, 6);
    assert!(!hit.blocked);

    assert!(hits.iter().all(|h| h.position.distance(GridPos::new(10, 10)) <= 3.0));
}

#[test]
fn fuel_tanks_chain_one_at_a_time() {
    let mut mgr = manager(&["..........", ".....FF...", ".........."]);
    mgr.set_random_source(FixedRandom::never());
    let events = record_events(&mut mgr);
    let mut nobody: Vec<BasicEntity> = Vec::new();

    let charge = ExplosionDescriptor::new("Charge", 30, 0.5, 1.0);
    let hits = mgr.trigger_explosion(GridPos::new(5, 1), &charge, &mut nobody);
    assert_eq!(hits.len(), 1);
    assert!(hits[0].destroyed);
    assert_eq!(mgr.pending_explosions(), 1);
    assert!(mgr.blocks_movement(GridPos::new(6, 1)));

    let mut drains = 0;
    while mgr.process_chain_reaction(&mut nobody) {
        drains += 1;
        assert!(drains <= 2, "chain reaction must terminate");
    }
    assert_eq!(drains, 2);
    assert!(mgr.tile(GridPos::new(6, 1)).is_some_and(Tile::is_destroyed));
    assert_eq!(mgr.pending_explosions(), 0);

    let triggered = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, DestructionEvent::ExplosionTriggered { .. }))
        .count();
    assert_eq!(triggered, 3);
}

#[test]
fn chain_reactions_drain_during_turn() {
    let mut mgr = manager(&["..........", "....FFF...", ".........."]);
    mgr.set_random_source(FixedRandom::never());
    let mut nobody: Vec<BasicEntity> = Vec::new();

    let charge = ExplosionDescriptor::new("Charge", 30, 0.5, 1.0);
    mgr.trigger_explosion(GridPos::new(4, 1), &charge, &mut nobody);
    assert_eq!(mgr.pending_explosions(), 1);

    let summary = mgr.process_turn(&mut nobody);
    assert_eq!(summary.chain_reactions, 3);
    assert_eq!(mgr.pending_explosions(), 0);
    for x in 4..7 {
        assert!(mgr.tile(GridPos::new(x, 1)).is_some_and(Tile::is_destroyed));
    }
}

#[test]
fn water_quenches_with_compound_probability() {
    const TRIALS: usize = 4000;
    let legend = TileLegend::standard();
    let mut rng = StdRng::seed_from_u64(0xF1E);
    let mut put_out = 0;

    for _ in 0..TRIALS {
        let mut grid = TileGrid::from_ascii(&["~\"~"], &legend).expect("valid map");
        let mut fire = FireSimulation::new(FireConfig::default());
        assert!(fire.ignite(&mut grid, GridPos::new(1, 0), FireIntensity::Flame));

        let report = fire.process_turn(&mut grid, &mut rng);
        if report.extinguished.contains(&GridPos::new(1, 0)) {
            put_out += 1;
        }
    }

    let expected = 1.0 - (1.0_f32 - 0.4).powi(2);
    assert!((expected - 0.64).abs() < 1e-6);
    let observed = put_out as f32 / TRIALS as f32;
    assert!(
        (observed - expected).abs() < 0.05,
        "observed extinguish rate {observed}, expected {expected}"
    );
}

#[test]
fn stone_block_needs_a_foundation() {
    let mut mgr = manager(&[".......", ".......", "..###..", "..###..", "..###.."]);
    let events = record_events(&mut mgr);
    let mut nobody: Vec<BasicEntity> = Vec::new();
    assert_eq!(mgr.collapse().structural_count(), 9);

    // Middle foundation gone: the block still rests on its corners
    assert!(mgr.damage_tile(GridPos::new(3, 4), 10_000, DamageType::Physical, &mut nobody));
    assert!(mgr.blocks_movement(GridPos::new(3, 3)));
    assert!(mgr.collapse().unsupported().is_empty());

    assert!(mgr.damage_tile(GridPos::new(2, 4), 10_000, DamageType::Physical, &mut nobody));
    assert!(mgr.blocks_movement(GridPos::new(2, 3)));

    assert!(mgr.damage_tile(GridPos::new(4, 4), 10_000, DamageType::Physical, &mut nobody));
    for y in 2..5 {
        for x in 2..5 {
            let tile = mgr.tile(GridPos::new(x, y)).expect("in bounds");
            assert!(tile.is_destroyed(), "({x}, {y}) should be down");
            assert!(!mgr.blocks_movement(GridPos::new(x, y)));
        }
    }
    assert_eq!(mgr.collapse().structural_count(), 0);

    let collapsed: Vec<i32> = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            DestructionEvent::TileCollapsed { debris_damage, .. } => Some(*debris_damage),
            _ => None,
        })
        .collect();
    assert_eq!(collapsed.len(), 6);
    assert!(collapsed.iter().all(|d| (15..25).contains(d)));
    assert_eq!(mgr.collapse_effects().len(), 6);
}

#[test]
fn floating_arch_collapses_through_several_hops() {
    // The arch only reaches the ground through the left pillar
    let mut mgr = manager(&["#####..", "#...#..", "#......", "#######"]);
    let mut nobody: Vec<BasicEntity> = Vec::new();
    assert!(mgr.collapse().unsupported().is_empty());

    assert!(mgr.damage_tile(GridPos::new(0, 2), 10_000, DamageType::Physical, &mut nobody));
    assert!(mgr.collapse().unsupported().is_empty());
    for pos in [GridPos::new(0, 0), GridPos::new(4, 0), GridPos::new(4, 1), GridPos::new(0, 1)] {
        assert!(mgr.tile(pos).is_some_and(Tile::is_destroyed), "{pos:?} should have fallen");
    }
    // The floor row is untouched
    assert!(mgr.blocks_movement(GridPos::new(0, 3)));
}

#[test]
fn debris_lands_on_entities_in_collapsed_tiles() {
    let mut mgr = manager(&["...", ".#.", ".#.", ".#."]);
    mgr.set_random_source(FixedRandom::never());
    let events = record_events(&mut mgr);
    let mut entities = vec![
        BasicEntity::new(4, "Climber", GridPos::new(1, 1), 100),
        BasicEntity::new(5, "Bystander", GridPos::new(0, 1), 100),
    ];

    assert!(mgr.damage_tile(GridPos::new(1, 3), 10_000, DamageType::Physical, &mut entities));
    assert!(mgr.tile(GridPos::new(1, 1)).is_some_and(Tile::is_destroyed));
    // Base 15 plus the top of the 0..10 variance roll
    assert_eq!(entities[0].health, 76);
    assert_eq!(entities[1].health, 100);
    assert!(events.borrow().iter().any(|e| matches!(
        e,
        DestructionEvent::EntityDamaged {
            entity_id: 4,
            damage: 24,
            cause: EntityDamageCause::Debris,
            ..
        }
    )));
}

#[test]
fn explosion_pushes_and_hurts_entities() {
    let mut mgr = manager(&["..........", "..........", ".........."]);
    mgr.set_random_source(FixedRandom::never());
    let events = record_events(&mut mgr);
    let mut entities = vec![
        BasicEntity::new(1, "Near", GridPos::new(6, 1), 50),
        BasicEntity::new(2, "Far", GridPos::new(9, 1), 50),
    ];

    mgr.trigger_explosion(GridPos::new(5, 1), &ExplosionDescriptor::grenade(), &mut entities);

    // Knockback round(2 * (1 - 1/3)) = 1 tile east, then 20 * (2/3) = 13 damage
    assert_eq!(entities[0].position, GridPos::new(7, 1));
    assert_eq!(entities[0].health, 37);
    // Outside the radius
    assert_eq!(entities[1].position, GridPos::new(9, 1));
    assert_eq!(entities[1].health, 50);

    let events = events.borrow();
    assert!(events
        .iter()
        .any(|e| matches!(e, DestructionEvent::EntityKnocked { entity_id: 1, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, DestructionEvent::EntityDamaged { entity_id: 1, damage: 13, .. })));
    assert!(!events.iter().any(|e| matches!(
        e,
        DestructionEvent::EntityDamaged { entity_id: 2, .. } | DestructionEvent::EntityKnocked { entity_id: 2, .. }
    )));
}

#[test]
fn walls_shelter_tiles_behind_them() {
    let mut mgr = manager(&[".......", ".......", "...=...", ".......", "......."]);
    mgr.set_random_source(FixedRandom::never());
    let mut nobody: Vec<BasicEntity> = Vec::new();

    let hits = mgr.trigger_explosion(GridPos::new(2, 2), &ExplosionDescriptor::dynamite(), &mut nobody);
    let find = |pos: GridPos| hits.iter().find(|h| h.position == pos);

    let open = find(GridPos::new(2, 4)).expect("clear line of sight");
    assert!(!open.blocked);
    assert_eq!(open.damage, 25);

    // 2 * 1.5 = 3 effective distance: 50 * (1 - 3/4) = 12
    let sheltered = find(GridPos::new(4, 2)).expect("still inside the radius");
    assert!(sheltered.blocked);
    assert_eq!(sheltered.damage, 12);

    // 3 * 1.5 = 4.5 is beyond the radius
    assert!(find(GridPos::new(5, 2)).is_none());
}

#[test]
fn incendiary_sets_the_field_alight() {
    let rows: Vec<String> = vec!["\"".repeat(9); 9];
    let mut mgr = DestructionManager::from_ascii(&rows, &TileLegend::standard(), DestructionConfig::default())
        .expect("valid map");
    mgr.set_random_source(FixedRandom::always());
    let events = record_events(&mut mgr);
    let mut nobody: Vec<BasicEntity> = Vec::new();

    mgr.trigger_explosion(GridPos::new(4, 4), &ExplosionDescriptor::incendiary(), &mut nobody);
    assert!(!mgr.fire_positions().is_empty());
    assert!(events
        .borrow()
        .iter()
        .any(|e| matches!(e, DestructionEvent::TileIgnited { .. })));
}

#[test]
fn extinguishing_twice_is_a_no_op() {
    let mut mgr = manager(&["\"\"\"\"\""]);
    let events = record_events(&mut mgr);

    assert!(mgr.ignite_tile_with(GridPos::new(1, 0), FireIntensity::Flame));
    assert!(mgr.ignite_tile_with(GridPos::new(3, 0), FireIntensity::Flame));
    let put_out = mgr.extinguish_radius(GridPos::new(2, 0), 2.0);
    assert_eq!(put_out, vec![GridPos::new(1, 0), GridPos::new(3, 0)]);
    assert!(mgr.extinguish_radius(GridPos::new(2, 0), 2.0).is_empty());
    assert!(!mgr.extinguish_fire(GridPos::new(1, 0)));

    let extinguished = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, DestructionEvent::FireExtinguished { .. }))
        .count();
    assert_eq!(extinguished, 2);
}

#[test]
fn extinguish_off_map_is_silent_and_infinite_reach_clears_all() {
    let mut mgr = manager(&["\"\"\"", "\"\"\""]);
    let mut nobody: Vec<BasicEntity> = Vec::new();
    assert!(mgr.ignite_tile_with(GridPos::new(0, 0), FireIntensity::Flame));
    assert!(mgr.ignite_tile_with(GridPos::new(2, 1), FireIntensity::Flame));

    assert!(mgr.extinguish_radius(GridPos::new(i32::MAX, 0), 2.0).is_empty());
    assert!(mgr.extinguish_radius(GridPos::new(i32::MIN, i32::MAX), 2.0).is_empty());
    assert!(mgr
        .trigger_explosion(GridPos::new(i32::MAX, i32::MAX), &ExplosionDescriptor::rocket(), &mut nobody)
        .is_empty());
    assert_eq!(mgr.fire_positions().len(), 2);

    let put_out = mgr.extinguish_radius(GridPos::new(1, 1), f32::INFINITY);
    assert_eq!(put_out, vec![GridPos::new(0, 0), GridPos::new(2, 1)]);
    assert!(mgr.fire_positions().is_empty());
}

#[test]
fn burning_fuel_tank_detonates_itself_once() {
    let mut mgr = manager(&[".....", "..F..", "....."]);
    mgr.set_random_source(FixedRandom::never());
    let events = record_events(&mut mgr);
    let mut nobody: Vec<BasicEntity> = Vec::new();
    let tank = GridPos::new(2, 1);

    assert!(mgr.ignite_tile(tank));
    let mut chain_reactions = 0;
    let mut destroyed_on = None;
    for _ in 0..20 {
        let summary = mgr.process_turn(&mut nobody);
        chain_reactions += summary.chain_reactions;
        if destroyed_on.is_none() && mgr.tile(tank).is_some_and(Tile::is_destroyed) {
            destroyed_on = Some(summary.turn);
        }
    }

    // 25 hp: Spark, 3 Smolder (1), 4 Flame (2), 3 Blaze (4), then Inferno (6)
    assert_eq!(destroyed_on, Some(11));
    assert_eq!(chain_reactions, 1);
    assert_eq!(mgr.pending_explosions(), 0);

    let events = events.borrow();
    let tank_destroyed = events
        .iter()
        .filter(|e| matches!(e, DestructionEvent::TileDestroyed { position } if *position == tank))
        .count();
    assert_eq!(tank_destroyed, 1);
    let triggered: Vec<GridPos> = events
        .iter()
        .filter_map(|e| match e {
            DestructionEvent::ExplosionTriggered { position, .. } => Some(*position),
            _ => None,
        })
        .collect();
    assert_eq!(triggered, vec![tank]);
}

#[test]
fn unsubscribed_listener_hears_nothing() {
    let mut mgr = manager(&["...", ".T.", "..."]);
    let heard = Rc::new(RefCell::new(0_usize));
    let sink = Rc::clone(&heard);
    let id = mgr.subscribe(move |_| *sink.borrow_mut() += 1);
    let mut nobody: Vec<BasicEntity> = Vec::new();

    mgr.damage_tile(GridPos::new(1, 1), 1, DamageType::Physical, &mut nobody);
    let before = *heard.borrow();
    assert!(before > 0);

    assert!(mgr.unsubscribe(id));
    assert!(!mgr.unsubscribe(id));
    mgr.damage_tile(GridPos::new(1, 1), 1, DamageType::Physical, &mut nobody);
    assert_eq!(*heard.borrow(), before);
}
