use anyhow::Result;
use bevy_ecs::entity::Entity;
use glam::Vec3;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use winit::event::MouseButton;
use winit::keyboard::NamedKey;
use zone_tools::cli::CliOverrides;
use zone_tools::config::{LoggingConfig, ZoneToolsConfig};
use zone_tools::ecs::{RoadSpec, ZoningMode};
use zone_tools::input::InputEvent;
use zone_tools::tool::{ToolId, UiTrigger};
use zone_tools::ZoneToolsWorld;

const DEFAULT_CONFIG_PATH: &str = "config/zone_tools.json";
const SCRIPT_FRAMES: u32 = 12;

fn main() {
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(cli) {
        eprintln!("Application error: {err:?}");
        std::process::exit(1);
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(logging.directive()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// `--frames` wins in both directions; frames past the script just step.
fn frame_count(cli: &CliOverrides) -> u32 {
    cli.frames().unwrap_or(SCRIPT_FRAMES)
}

fn run(cli: CliOverrides) -> Result<()> {
    let path = cli.config_path().cloned().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let frames = frame_count(&cli);
    let overrides = cli.into_config_overrides();

    let loaded = ZoneToolsConfig::load(&path);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => ZoneToolsConfig::default(),
    };
    config.apply_overrides(&overrides);
    init_tracing(&config.logging);
    if let Err(err) = loaded {
        warn!("Config load error: {err:?}. Falling back to defaults.");
    }
    if !overrides.is_empty() {
        info!(fields = ?overrides.applied_fields(), "CLI overrides applied");
    }

    let mut world = ZoneToolsWorld::new(&config);
    let roads = [
        world.spawn_road(RoadSpec::surface(Vec3::new(0.0, 0.0, 0.0), Vec3::new(8.0, 0.2, 2.0))),
        world.spawn_road(
            RoadSpec::surface(Vec3::new(10.0, 0.0, 0.0), Vec3::new(18.0, 0.2, 2.0)).with_zoning(ZoningMode::Right),
        ),
        world.spawn_road(RoadSpec::surface(Vec3::new(20.0, -4.0, 0.0), Vec3::new(28.0, -3.8, 2.0)).underground()),
    ];
    info!(roads = roads.len(), frames, "demo road network built");

    for frame in 0..frames {
        script_frame(&mut world, frame, &roads);
        world.step();
        for event in world.drain_events() {
            info!(frame, "{event}");
        }
    }

    for road in roads {
        info!(
            road = road.index(),
            mode = %world.zoning_mode(road).unwrap_or_default(),
            depths = ?world.block_depths(road),
            "final road zoning"
        );
    }
    world.shutdown();
    Ok(())
}

/// Scripted operator session: open the panel, select two roads, cycle the
/// mode, apply, preview another road, cancel, then switch tools.
fn script_frame(world: &mut ZoneToolsWorld, frame: u32, roads: &[Entity; 3]) {
    match frame {
        0 => {
            world.trigger(UiTrigger::TogglePanel);
            world.trigger(UiTrigger::SetToolEnabled(true));
        }
        1 => {
            world.hover_road(roads[0]);
        }
        2 => world.push_input(InputEvent::mouse(MouseButton::Left, true)),
        3 => {
            world.hover_road(roads[1]);
        }
        4 => world.push_input(InputEvent::mouse(MouseButton::Right, true)),
        5 => world.push_input(InputEvent::mouse(MouseButton::Right, false)),
        6 => world.push_input(InputEvent::mouse(MouseButton::Left, false)),
        7 => {
            world.hover_road(roads[2]);
        }
        8 => world.push_input(InputEvent::named(NamedKey::Escape, true)),
        9 => world.push_input(InputEvent::named(NamedKey::Escape, false)),
        10 => world.activate_tool(ToolId::Net),
        _ => {}
    }
}
