#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a headless aquarium session.
//!
//! The driver loops the tank through a deterministic scripted scenario:
//! periodic shop visits, food drops and sales of grown fish, with every
//! hatch routed through the hatchery system exactly as a graphical adapter
//! would route it. At the end it prints a session report and, on request,
//! a transferable snapshot string that a later run can restore.

mod snapshot_transfer;

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use aquarium_core::{tank::TankDimensions, Command, DecorKind, EggKind, Event, VisualMode};
use aquarium_rendering::{
    DecorPresentation, EggPresentation, FishPresentation, FlakePresentation, HudPresentation,
    Scene, SpriteVisual, TankPresentation,
};
use aquarium_system_economy::{Economy, ShopIntent};
use aquarium_system_hatchery::Hatchery;
use aquarium_world::{apply, query, Tank};
use glam::Vec2;

use crate::snapshot_transfer::TankTransfer;

/// Headless aquarium session driver.
#[derive(Debug, Parser)]
#[command(name = "aquarium", about = "Runs a scripted aquarium session")]
struct Args {
    /// Tank width in world units.
    #[arg(long, default_value_t = 16.0)]
    width: f32,

    /// Tank height in world units.
    #[arg(long, default_value_t = 9.0)]
    height: f32,

    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 1200)]
    ticks: u64,

    /// Simulated seconds per tick.
    #[arg(long, default_value_t = 0.05)]
    dt: f32,

    /// Seed for the scripted scenario.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Start in detailed visual mode instead of the prototype mode.
    #[arg(long, default_value_t = false)]
    detailed: bool,

    /// Restore a previous session from a transfer string.
    #[arg(long)]
    restore: Option<String>,

    /// Print a transfer string for the final state.
    #[arg(long, default_value_t = false)]
    emit_snapshot: bool,
}

#[derive(Debug, Default)]
struct SessionStats {
    eggs_bought: u64,
    decor_bought: u64,
    hatches: u64,
    maturities: u64,
    sales: u64,
    sale_rejections: u64,
    purchase_rejections: u64,
    flakes_dropped: u64,
    flakes_removed: u64,
}

impl SessionStats {
    fn tally(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EggPurchased { .. } => self.eggs_bought += 1,
                Event::DecorPurchased { .. } => self.decor_bought += 1,
                Event::EggHatched { .. } => self.hatches += 1,
                Event::FishMatured { .. } => self.maturities += 1,
                Event::FishSold { .. } => self.sales += 1,
                Event::SaleRejected { .. } => self.sale_rejections += 1,
                Event::PurchaseRejected { .. } => self.purchase_rejections += 1,
                Event::FlakeDropped { .. } => self.flakes_dropped += 1,
                Event::FlakeRemoved { .. } => self.flakes_removed += 1,
                _ => {}
            }
        }
    }
}

/// Entry point for the aquarium command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let dimensions = TankDimensions::new(args.width, args.height);
    if !dimensions.is_valid() {
        return Err(anyhow!(
            "tank dimensions must be positive (received {}x{})",
            args.width,
            args.height
        ));
    }
    if !args.dt.is_finite() || args.dt <= 0.0 {
        return Err(anyhow!("dt must be positive (received {})", args.dt));
    }

    let mut tank = match &args.restore {
        Some(text) => {
            let transfer = TankTransfer::decode(text)?;
            Tank::from_snapshot(transfer.snapshot, dimensions)
        }
        None => {
            let mut tank = Tank::new();
            let mut events = Vec::new();
            apply(&mut tank, Command::ConfigureTank { dimensions }, &mut events);
            tank
        }
    };
    if args.detailed {
        let mut events = Vec::new();
        apply(
            &mut tank,
            Command::SetVisualMode {
                mode: VisualMode::Detailed,
            },
            &mut events,
        );
    }

    let mut hatchery = Hatchery::new();
    let economy = Economy::new();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut stats = SessionStats::default();

    for frame in 1..=args.ticks {
        let mut events = Vec::new();

        if frame % 40 == 1 {
            let mut intents = vec![ShopIntent::BuyEgg(random_egg_kind(&mut rng))];
            if rng.gen_bool(0.25) {
                intents.push(ShopIntent::BuyDecor(random_decor_kind(&mut rng)));
            }
            let mut commands = Vec::new();
            economy.handle(&intents, query::coins(&tank), &mut commands);
            for command in commands {
                apply(&mut tank, command, &mut events);
            }
        }

        if frame % 90 == 0 {
            let env = query::environment(&tank);
            let x = rng.gen_range(env.inner_left()..env.inner_right());
            apply(&mut tank, Command::DropFood { x }, &mut events);
        }

        if frame % 150 == 0 {
            if let Some(listing) = query::sell_listings(&tank)
                .iter()
                .find(|listing| listing.adult)
            {
                apply(
                    &mut tank,
                    Command::SellFish { fish: listing.id },
                    &mut events,
                );
            }
        }

        apply(
            &mut tank,
            Command::Tick {
                dt: Duration::from_secs_f32(args.dt),
            },
            &mut events,
        );
        let mut follow_ups = Vec::new();
        hatchery.handle(&events, &mut follow_ups);
        for command in follow_ups {
            apply(&mut tank, command, &mut events);
        }

        stats.tally(&events);
    }

    print_report(&tank, &args, &stats);

    if args.emit_snapshot {
        let transfer = TankTransfer {
            snapshot: tank.snapshot(),
        };
        println!("{}", transfer.encode());
    }
    Ok(())
}

fn random_egg_kind(rng: &mut ChaCha8Rng) -> EggKind {
    EggKind::ALL[rng.gen_range(0..EggKind::ALL.len())]
}

fn random_decor_kind(rng: &mut ChaCha8Rng) -> DecorKind {
    DecorKind::ALL[rng.gen_range(0..DecorKind::ALL.len())]
}

/// Builds the frame scene a graphical backend would receive.
fn compose_scene(tank: &Tank) -> Scene {
    let env = query::environment(tank);
    let eggs = query::egg_view(tank)
        .into_iter()
        .map(|egg| EggPresentation {
            id: egg.id,
            kind: egg.kind,
            position: egg.position,
            wobble: egg.wobble,
            scale: egg.scale,
        })
        .collect();
    let decor = query::decor_view(tank)
        .into_iter()
        .map(|decoration| DecorPresentation {
            id: decoration.id,
            kind: decoration.kind,
            position: decoration.position,
            half_extents: decoration.half_extents,
            dragging: decoration.dragging,
        })
        .collect();
    let fish = query::fish_view(tank)
        .into_iter()
        .map(|fish| FishPresentation {
            id: fish.id,
            kind: fish.kind,
            position: fish.position,
            facing: fish.facing,
            scale: fish.scale,
            half_extents: fish.half_extents,
            wiggle: Vec2::new(fish.wiggle.pitch, fish.wiggle.yaw),
            roll: fish.wiggle.roll,
        })
        .collect();
    let flakes = query::flake_view(tank)
        .into_iter()
        .map(|flake| FlakePresentation {
            id: flake.id,
            position: flake.position,
            phase: flake.phase,
        })
        .collect();
    Scene::new(
        TankPresentation::from_environment(&env),
        eggs,
        decor,
        fish,
        flakes,
        SpriteVisual::for_mode(query::visual_mode(tank)),
        HudPresentation {
            coins: query::coins(tank),
        },
    )
}

fn print_report(tank: &Tank, args: &Args, stats: &SessionStats) {
    let scene = compose_scene(tank);
    println!(
        "aquarium session: {} ticks at {:.0} ms each",
        args.ticks,
        f64::from(args.dt) * 1000.0
    );
    println!("  elapsed    {:.1} s", query::elapsed(tank));
    println!("  coins      {}", query::coins(tank));
    println!(
        "  scene      {} fish, {} eggs, {} decor, {} flakes ({:?})",
        scene.fish.len(),
        scene.eggs.len(),
        scene.decor.len(),
        scene.flakes.len(),
        scene.visual,
    );
    for fish in query::fish_view(tank) {
        let status = if fish.adult { "adult" } else { "juvenile" };
        println!(
            "    {:<16} {:>8.1} s  scale {:.2}  {status}",
            fish.display_name, fish.age, fish.scale
        );
    }
    println!(
        "  shop       {} eggs, {} decorations bought, {} rejected",
        stats.eggs_bought, stats.decor_bought, stats.purchase_rejections
    );
    println!(
        "  lifecycle  {} hatched, {} matured, {} sold ({} rejected)",
        stats.hatches, stats.maturities, stats.sales, stats.sale_rejections
    );
    println!(
        "  feeding    {} flakes dropped, {} removed",
        stats.flakes_dropped, stats.flakes_removed
    );
}
