use clap::{Parser, ValueEnum};
use destruction_sim_core::{
    BasicEntity, DamageType, DestructionConfig, DestructionEvent, DestructionManager, ExplosionDescriptor,
    FireIntensity, GridPos, TileLegend, TrackedEntity, Vec2,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

/// Grass field with a wooden shed, fuel depot, stone hut and brick tower.
/// The stone floor row carries every structure.
const COMPOUND: [&str; 10] = [
    "........................",
    r#"..""""""~~.............."#,
    r#"..""""""~~........BBBB.."#,
    r#"..""TT""..........B..B.."#,
    r#"..""TT""....C.....B..B.."#,
    r#"..""""""..FFF.....B..B.."#,
    ".............####.B..B..",
    ".............#..#.B..B..",
    ".............#..#.B..B..",
    "########################",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Grass fire driven by the wind
    Wildfire,
    /// Rocket into the fuel depot
    Chain,
    /// Knock out the tower's footing
    Collapse,
    /// All of the above, one after another
    All,
}

/// Destructible terrain demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "destruction-sim-demo")]
#[command(about = "Turn-based fire, explosion and collapse demo", long_about = None)]
struct Args {
    /// Scenario to run
    #[arg(short, long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,

    /// Number of turns to simulate
    #[arg(short, long, default_value_t = 20)]
    turns: u32,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Wind direction x component
    #[arg(long, default_value_t = 1.0)]
    wind_x: f32,

    /// Wind direction y component
    #[arg(long, default_value_t = 0.0)]
    wind_y: f32,

    /// Wind strength (0-1)
    #[arg(short, long, default_value_t = 0.5)]
    wind_strength: f32,

    /// Print the map every N turns (0 = only at the end)
    #[arg(short, long, default_value_t = 5)]
    report_interval: u32,
}

#[derive(Debug, Default)]
struct EventTally {
    damaged: usize,
    destroyed: usize,
    ignited: usize,
    extinguished: usize,
    collapsed: usize,
    explosions: usize,
    entity_hits: usize,
}

impl EventTally {
    fn record(&mut self, event: &DestructionEvent) {
        match event {
            DestructionEvent::TileDamaged { .. } => self.damaged += 1,
            DestructionEvent::TileDestroyed { .. } => self.destroyed += 1,
            DestructionEvent::TileIgnited { .. } => self.ignited += 1,
            DestructionEvent::FireExtinguished { .. } => self.extinguished += 1,
            DestructionEvent::TileCollapsed { .. } => self.collapsed += 1,
            DestructionEvent::ExplosionTriggered { .. } => self.explosions += 1,
            DestructionEvent::EntityBurned { .. }
            | DestructionEvent::EntityKnocked { .. }
            | DestructionEvent::EntityDamaged { .. } => self.entity_hits += 1,
        }
    }
}

fn print_frame(manager: &DestructionManager, entities: &[BasicEntity]) {
    let mut rows = manager.render_ascii();
    for entity in entities.iter().filter(|e| e.is_alive()) {
        let (Ok(x), Ok(y)) = (usize::try_from(entity.position.x), usize::try_from(entity.position.y)) else {
            continue;
        };
        if let Some(row) = rows.get_mut(y) {
            *row = row
                .chars()
                .enumerate()
                .map(|(i, c)| if i == x { '@' } else { c })
                .collect();
        }
    }
    for row in rows {
        println!("    {row}");
    }
    println!();
}

fn print_entities(entities: &[BasicEntity]) {
    for entity in entities {
        let status = if entity.is_alive() { "alive" } else { "dead" };
        println!(
            "  {:<10} at ({:>2},{:>2})  hp {:>3}  {}",
            entity.name, entity.position.x, entity.position.y, entity.health, status
        );
    }
}

fn run_turns(manager: &mut DestructionManager, entities: &mut [BasicEntity], args: &Args) {
    println!("Turn | Fires | Smoke | Chain | Collapsed | Burned");
    println!("-----|-------|-------|-------|-----------|-------");
    for _ in 0..args.turns {
        let summary = manager.process_turn(entities);
        manager.update(1.0);
        println!(
            "{:4} | {:5} | {:5} | {:5} | {:9} | {:6}",
            summary.turn,
            summary.active_fires,
            summary.smoke_cells,
            summary.chain_reactions,
            summary.collapsed,
            summary.entities_burned
        );
        if args.report_interval > 0 && summary.turn % u64::from(args.report_interval) == 0 {
            println!();
            print_frame(manager, entities);
        }
    }
    println!();
}

fn wildfire(manager: &mut DestructionManager, entities: &mut [BasicEntity], args: &Args) {
    println!("=== Wildfire ===\n");
    let origin = GridPos::new(3, 2);
    manager.ignite_tile_with(origin, FireIntensity::Flame);
    println!("Ignited grass at ({}, {})\n", origin.x, origin.y);
    run_turns(manager, entities, args);
}

fn chain(manager: &mut DestructionManager, entities: &mut [BasicEntity], args: &Args) {
    println!("=== Chain Reaction ===\n");
    let target = GridPos::new(11, 5);
    let hits = manager.trigger_explosion(target, &ExplosionDescriptor::rocket(), entities);
    println!(
        "Rocket at ({}, {}): {} tiles hit, {} destroyed, {} explosions queued\n",
        target.x,
        target.y,
        hits.len(),
        hits.iter().filter(|h| h.destroyed).count(),
        manager.pending_explosions()
    );
    print_frame(manager, entities);
    run_turns(manager, entities, args);
}

fn collapse(manager: &mut DestructionManager, entities: &mut [BasicEntity], args: &Args) {
    println!("=== Structural Collapse ===\n");
    for footing in [GridPos::new(18, 8), GridPos::new(21, 8)] {
        let destroyed = manager.damage_tile(footing, 10_000, DamageType::Physical, entities);
        println!("Demolished footing at ({}, {}): {destroyed}", footing.x, footing.y);
    }
    println!();
    print_frame(manager, entities);
    run_turns(manager, entities, args);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    println!("=== Destruction Simulation Demo ===\n");

    let config = DestructionConfig::default().with_seed(args.seed);
    let mut manager = match DestructionManager::from_ascii(&COMPOUND, &TileLegend::standard(), config) {
        Ok(manager) => manager,
        Err(err) => {
            eprintln!("failed to build the map: {err}");
            std::process::exit(1);
        }
    };
    manager.set_wind(Vec2::new(args.wind_x, args.wind_y), args.wind_strength);

    let tally = Rc::new(RefCell::new(EventTally::default()));
    let sink = Rc::clone(&tally);
    manager.subscribe(move |event| sink.borrow_mut().record(event));

    let mut entities = vec![
        BasicEntity::new(1, "Scout", GridPos::new(5, 0), 40),
        BasicEntity::new(2, "Engineer", GridPos::new(9, 6), 60),
        BasicEntity::new(3, "Sentry", GridPos::new(19, 5), 80),
    ];

    println!(
        "Map {}x{}, seed {}, wind ({:.1}, {:.1}) strength {:.2}\n",
        manager.grid().width(),
        manager.grid().height(),
        args.seed,
        args.wind_x,
        args.wind_y,
        args.wind_strength
    );
    print_frame(&manager, &entities);

    match args.scenario {
        Scenario::Wildfire => wildfire(&mut manager, &mut entities, &args),
        Scenario::Chain => chain(&mut manager, &mut entities, &args),
        Scenario::Collapse => collapse(&mut manager, &mut entities, &args),
        Scenario::All => {
            wildfire(&mut manager, &mut entities, &args);
            chain(&mut manager, &mut entities, &args);
            collapse(&mut manager, &mut entities, &args);
        }
    }

    println!("=== Simulation Complete ===");
    print_frame(&manager, &entities);
    print_entities(&entities);

    let tally = tally.borrow();
    println!("\nEvents: {} emitted", manager.events_emitted());
    println!(
        "  damaged {}, destroyed {}, ignited {}, extinguished {}, collapsed {}, explosions {}, entity hits {}",
        tally.damaged,
        tally.destroyed,
        tally.ignited,
        tally.extinguished,
        tally.collapsed,
        tally.explosions,
        tally.entity_hits
    );
}
