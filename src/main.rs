mod input;
mod sim;
mod ui;

use bevy::core_pipeline::bloom::BloomSettings;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use input::InputPlugin;
use shatter::{Engine, Scenario, SimConfig};
use sim::{Sandbox, SimPlugin, SimSettings};
use ui::UiPlugin;

fn main() -> shatter::Result<()> {
    let scenario = Scenario::default();
    let config = SimConfig::from_scenario(scenario);
    let domain = config.domain;
    let engine = Engine::new(config)?;

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.0)))
        .insert_resource(Msaa::Sample4)
        .insert_resource(Sandbox(engine))
        .insert_resource(SimSettings::for_scenario(scenario))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "shatter-rs — collisions and fragmentation".into(),
                resolution: (domain.x, domain.y).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((SimPlugin, UiPlugin, InputPlugin))
        .add_systems(Startup, setup_camera)
        .run();
    Ok(())
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2dBundle {
            camera: Camera {
                hdr: true,
                ..default()
            },
            tonemapping: Tonemapping::TonyMcMapface,
            transform: Transform::from_xyz(0.0, 0.0, 999.0),
            ..default()
        },
        BloomSettings::default(),
    ));
}
