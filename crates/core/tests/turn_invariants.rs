//! Invariants that must hold after every turn of a busy, seeded simulation
//!
//! A compound with grass, timber, fuel and masonry is set alight and shelled,
//! then every tile is checked after each turn.

use destruction_sim_core::{
    fire::total_burn_turns, BasicEntity, DamageType, DestructionConfig, DestructionManager, DestructionStage,
    ExplosionDescriptor, FireIntensity, FireState, GridPos, Material, TileLegend, TrackedEntity, Vec2,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const COMPOUND: [&str; 8] = [
    r#""""""""""""..........."#,
    r#"""TT""""~~""..BBBB...."#,
    r#"""TT"""""~""..B..B...."#,
    r#"""""""FF"""...B..B...."#,
    r#""""C""FF"""...B..B.##."#,
    r#"..........."..B..B.##."#,
    r#"..........."..B..B.##."#,
    "######################",
];

fn build(seed: u64) -> DestructionManager {
    let config = DestructionConfig::default().with_seed(seed);
    let mut manager =
        DestructionManager::from_ascii(&COMPOUND, &TileLegend::standard(), config).expect("valid map");
    manager.set_wind(Vec2::new(1.0, 0.0), 0.6);
    manager
}

fn crew() -> Vec<BasicEntity> {
    vec![
        BasicEntity::new(1, "Scout", GridPos::new(1, 0), 60),
        BasicEntity::new(2, "Medic", GridPos::new(5, 5), 60),
        BasicEntity::new(3, "Sentry", GridPos::new(16, 4), 60),
    ]
}

fn assert_invariants(manager: &DestructionManager) {
    let grid = manager.grid();
    let mut structural = 0;
    for pos in grid.positions() {
        let tile = grid.get(pos).expect("position from the grid");
        assert!(tile.current_hp() <= tile.max_hp(), "{pos:?} over max hp");
        assert_eq!(
            tile.stage(),
            DestructionStage::from_hp(tile.current_hp(), tile.max_hp()),
            "{pos:?} stage out of sync with hp"
        );
        if tile.is_destroyed() {
            assert!(!tile.blocks_movement() && !tile.blocks_sight(), "{pos:?} destroyed but blocking");
        }
        if tile.fire().is_active() {
            assert!(tile.is_flammable(), "{pos:?} burning without fuel");
        }
        if tile.is_structural() {
            structural += 1;
            assert!(manager.collapse().support(pos).is_some(), "{pos:?} missing from support graph");
        }
    }
    assert_eq!(manager.collapse().structural_count(), structural);
    assert!(
        manager.collapse().unsupported().is_empty(),
        "unsupported structure left standing: {:?}",
        manager.collapse().unsupported()
    );
    for pos in manager.fire_positions() {
        assert!(manager.is_burning(pos), "{pos:?} tracked but not burning");
    }
}

fn run(seed: u64, turns: u32) -> (DestructionManager, Vec<BasicEntity>) {
    let mut manager = build(seed);
    let mut entities = crew();
    assert_invariants(&manager);

    manager.ignite_tile_with(GridPos::new(1, 1), FireIntensity::Flame);
    manager.trigger_explosion(GridPos::new(7, 3), &ExplosionDescriptor::rocket(), &mut entities);
    assert_invariants(&manager);

    for turn in 1..=turns {
        if turn == 4 {
            manager.damage_tile(GridPos::new(14, 6), 10_000, DamageType::Explosive, &mut entities);
            manager.damage_tile(GridPos::new(17, 6), 10_000, DamageType::Explosive, &mut entities);
        }
        if turn == 8 {
            manager.trigger_explosion(GridPos::new(20, 3), &ExplosionDescriptor::dynamite(), &mut entities);
        }
        let summary = manager.process_turn(&mut entities);
        manager.update(0.25);
        assert_eq!(summary.turn, u64::from(turn));
        assert_eq!(summary.active_fires, manager.fire_positions().len());
        assert_eq!(summary.smoke_cells, manager.smoke_positions().len());
        assert_invariants(&manager);
    }
    (manager, entities)
}

#[test]
fn invariants_hold_every_turn() {
    let (manager, entities) = run(0xB00_0B5, 30);
    assert_eq!(manager.turn(), 30);
    assert_eq!(manager.pending_explosions(), 0);
    // The tower lost both footings on turn 4
    assert!(manager.grid().get(GridPos::new(14, 1)).is_some_and(|t| t.is_destroyed()));
    for entity in &entities {
        assert!(entity.health() <= 60);
    }
}

#[test]
fn same_seed_same_outcome() {
    let (a, entities_a) = run(7, 20);
    let (b, entities_b) = run(7, 20);
    assert_eq!(a.render_ascii(), b.render_ascii());
    assert_eq!(a.fire_positions(), b.fire_positions());
    assert_eq!(a.smoke_positions(), b.smoke_positions());
    assert_eq!(entities_a, entities_b);
}

#[test]
fn unhindered_fire_walks_the_whole_ladder() {
    let mut fire = FireState::default();
    assert!(fire.ignite(FireIntensity::Spark));

    let mut turns = 0;
    let mut seen = vec![fire.intensity()];
    while fire.advance() {
        turns += 1;
        if seen.last() != Some(&fire.intensity()) {
            seen.push(fire.intensity());
        }
    }
    turns += 1;

    assert!(fire.is_ash());
    assert_eq!(turns, total_burn_turns());
    assert_eq!(
        seen,
        vec![
            FireIntensity::Spark,
            FireIntensity::Smolder,
            FireIntensity::Flame,
            FireIntensity::Blaze,
            FireIntensity::Inferno,
            FireIntensity::Dying,
        ]
    );
    // Ash never rekindles
    assert!(!fire.ignite(FireIntensity::Inferno));
}

#[test]
fn hardest_material_still_takes_one_point() {
    let adamant = Material::new("Adamant", 100, 10, 0.0, 0, 1.0);
    // 1 * 0.5 truncates to 0, floored back up to 1
    assert_eq!(adamant.calculate_damage(1, DamageType::Physical), 1);
    assert_eq!(adamant.calculate_damage(500, DamageType::Physical), 250);
    // Full fire resistance zeroes the multiplier
    assert_eq!(adamant.calculate_damage(1, DamageType::Fire), 1);
    assert!(adamant.calculate_damage(100, DamageType::Explosive) > 1);

    let types = [
        DamageType::Physical,
        DamageType::Explosive,
        DamageType::Fire,
        DamageType::Energy,
        DamageType::Corrosive,
    ];
    for material in [adamant, Material::stone(), Material::metal(), Material::grass(), Material::water()] {
        for damage_type in types {
            for amount in [0, 1, 2, 3, 7, 100] {
                assert!(
                    material.calculate_damage(amount, damage_type) >= 1,
                    "{} took no damage from {amount} {damage_type:?}",
                    material.name
                );
            }
        }
    }
}

#[test]
fn update_never_changes_simulation_state() {
    let mut manager = build(11);
    let mut entities = crew();
    manager.ignite_tile_with(GridPos::new(2, 2), FireIntensity::Blaze);
    manager.process_turn(&mut entities);

    let before = (manager.render_ascii(), manager.fire_positions(), manager.turn());
    for _ in 0..50 {
        manager.update(0.1);
    }
    let after = (manager.render_ascii(), manager.fire_positions(), manager.turn());
    assert_eq!(before.1, after.1);
    assert_eq!(before.2, after.2);
    assert_eq!(before.0.len(), after.0.len());
}
