use std::path::{Path, PathBuf};
use std::time::Instant;

use bevy::app::AppExit;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowLevel, WindowMode, WindowPosition, WindowResolution};
use bevy::winit::WinitWindows;
use clap::Parser;

use perch::{config::PlacementMotion, Hosts, PerchConfig, PlacementOrchestrator, QueuedScheduler};

mod shell;

use shell::{monitor_displays, window_bounds, ShellDisplays, ShellWindow};

const DEFAULT_CONFIG: &str = "perch.toml";

// Velocity added per key press, pixels per frame.
const NUDGE: f32 = 6.0;
const LIFT: f32 = 10.0;

#[derive(Parser, Debug)]
#[command(name = "perch", about = "A desktop companion that sits on your windows")]
struct Cli {
    /// Config file; perch.toml in the working directory is used if present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use a made-up window list when real windows cannot be enumerated
    #[arg(long)]
    dev_windows: bool,

    /// Move straight to each seat instead of dropping onto it
    #[arg(long)]
    teleport: bool,

    /// Seed for jump randomness
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(cli: &Cli) -> perch::Result<PerchConfig> {
    let mut config = match &cli.config {
        Some(path) => PerchConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => PerchConfig::load(Path::new(DEFAULT_CONFIG))?,
        None => PerchConfig::default(),
    };
    if cli.dev_windows {
        config.tracker.dev_fallback = true;
    }
    if cli.teleport {
        config.placement.motion = PlacementMotion::Teleport;
    }
    Ok(config)
}

#[derive(Resource)]
struct Settings(PerchConfig);

/// The placement core plus the shell's ends of the shared host handles.
/// Everything in here is single-threaded, so it lives as a non-send resource.
struct Placement {
    orch: PlacementOrchestrator,
    sched: QueuedScheduler,
    window: ShellWindow,
    displays: ShellDisplays,
    started: bool,
}

impl Placement {
    fn new(config: &PerchConfig, seed: Option<u64>) -> Self {
        let sched = QueuedScheduler::new();
        let window = ShellWindow::default();
        let displays = ShellDisplays::default();
        let hosts = Hosts {
            window: Box::new(window.clone()),
            displays: Some(Box::new(displays.clone())),
            windows: None,
            scheduler: Box::new(sched.clone()),
        };
        let orch = match seed {
            Some(seed) => PlacementOrchestrator::seeded(config, hosts, seed),
            None => PlacementOrchestrator::new(config, hosts),
        };
        Self {
            orch,
            sched,
            window,
            displays,
            started: false,
        }
    }
}

#[derive(Component)]
struct Avatar;

fn main() -> perch::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let size = config.avatar.size();
    let motion = config.placement.motion;

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(AssetPlugin {
                file_path: ".".into(),
                ..default()
            })
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "perch".into(),
                    name: Some("perch".into()),
                    resolution: WindowResolution::new(size.x, size.y)
                        .with_scale_factor_override(1.0),
                    resizable: false,
                    decorations: false,
                    transparent: true,
                    window_level: WindowLevel::AlwaysOnTop,
                    position: WindowPosition::Centered(MonitorSelection::Primary),
                    mode: WindowMode::Windowed,
                    ..default()
                }),
                ..default()
            }),
    )
    .insert_resource(ClearColor(Color::srgba(0.0, 0.0, 0.0, 0.0)))
    .insert_non_send_resource(Placement::new(&config, cli.seed))
    .insert_resource(Settings(config))
    .add_systems(Startup, (setup_camera, spawn_avatar))
    .add_systems(
        Update,
        (sync_hosts, handle_input, pump_scheduler, apply_position).chain(),
    )
    .add_systems(Last, shutdown);

    info!("perch starting, placement motion {motion:?}");
    app.run();
    Ok(())
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

fn spawn_avatar(mut commands: Commands, asset_server: Res<AssetServer>, settings: Res<Settings>) {
    let avatar = &settings.0.avatar;
    commands.spawn((
        SpriteBundle {
            texture: asset_server.load(avatar.image.clone()),
            sprite: Sprite {
                custom_size: Some(avatar.size()),
                ..default()
            },
            ..default()
        },
        Avatar,
    ));
}

/// Mirror the window and monitors into the host handles, start placement
/// once the window exists, and re-seat on monitor changes.
fn sync_hosts(
    windows: Query<Entity, With<PrimaryWindow>>,
    winit_windows: NonSend<WinitWindows>,
    settings: Res<Settings>,
    mut placement: NonSendMut<Placement>,
) {
    let Ok(entity) = windows.get_single() else {
        placement.window.sync(None);
        return;
    };
    placement.window.sync(window_bounds(&winit_windows, entity));
    let insets = &settings.0.display.work_area_insets;
    let changed = placement
        .displays
        .replace(monitor_displays(&winit_windows, entity, insets));

    if !placement.started {
        if placement.window.is_known() {
            placement.started = true;
            placement.orch.initialize(Instant::now());
        }
    } else if changed {
        info!("monitor layout changed, finding a new seat");
        placement.orch.display_changed();
    }
}

fn handle_input(
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut placement: NonSendMut<Placement>,
) {
    if !placement.started {
        return;
    }
    let orch = &mut placement.orch;
    if mouse.just_pressed(MouseButton::Left) || keys.just_pressed(KeyCode::Space) {
        orch.jump(None);
    }
    if keys.just_pressed(KeyCode::ArrowLeft) {
        orch.push(-NUDGE, 0.0);
    }
    if keys.just_pressed(KeyCode::ArrowRight) {
        orch.push(NUDGE, 0.0);
    }
    if keys.just_pressed(KeyCode::ArrowUp) {
        orch.push(0.0, -LIFT);
    }
    if keys.just_pressed(KeyCode::ArrowDown) {
        orch.push(0.0, NUDGE);
    }
    if keys.just_pressed(KeyCode::KeyD) {
        orch.drop();
    }
    if keys.just_pressed(KeyCode::KeyS) {
        orch.find_seat();
    }
}

/// Deliver every frame and poll wake-up that is due.
fn pump_scheduler(mut placement: NonSendMut<Placement>) {
    let now = Instant::now();
    let placement = &mut *placement;
    for wake in placement.sched.drain(now) {
        placement.orch.dispatch(wake, now);
    }
}

fn apply_position(
    placement: NonSend<Placement>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Some(pos) = placement.window.take_pending() else {
        return;
    };
    if let Ok(mut win) = windows.get_single_mut() {
        win.position = WindowPosition::At(pos);
    }
}

fn shutdown(mut exits: EventReader<AppExit>, mut placement: NonSendMut<Placement>) {
    if exits.read().next().is_some() {
        placement.orch.dispose();
    }
}
