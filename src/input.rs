use crate::sim::{AddParticle, RemoveParticle, ResetEvent, SimSettings, SpeedChange};
use bevy::prelude::*;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                speed_keys,
                population_keys,
                pause_toggle,
                reset_trigger,
                help_toggle,
                diagnostics_toggle,
            ),
        );
    }
}

fn speed_keys(mut ev_speed: EventWriter<SpeedChange>, keys: Res<ButtonInput<KeyCode>>) {
    if keys.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        ev_speed.send(SpeedChange { increase: true });
    }
    if keys.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        ev_speed.send(SpeedChange { increase: false });
    }
}

fn population_keys(
    mut ev_add: EventWriter<AddParticle>,
    mut ev_remove: EventWriter<RemoveParticle>,
    keys: Res<ButtonInput<KeyCode>>,
) {
    if keys.just_pressed(KeyCode::KeyA) {
        ev_add.send(AddParticle);
    }
    if keys.any_just_pressed([KeyCode::KeyD, KeyCode::Backspace]) {
        ev_remove.send(RemoveParticle);
    }
}

fn pause_toggle(mut settings: ResMut<SimSettings>, keys: Res<ButtonInput<KeyCode>>) {
    if keys.just_pressed(KeyCode::Space) {
        settings.running = !settings.running;
    }
}

fn reset_trigger(mut ev_reset: EventWriter<ResetEvent>, keys: Res<ButtonInput<KeyCode>>) {
    if keys.just_pressed(KeyCode::KeyR) {
        ev_reset.send(ResetEvent);
    }
}

fn help_toggle(mut settings: ResMut<SimSettings>, keys: Res<ButtonInput<KeyCode>>) {
    if keys.just_pressed(KeyCode::KeyH) {
        settings.show_help = !settings.show_help;
    }
}

fn diagnostics_toggle(mut settings: ResMut<SimSettings>, keys: Res<ButtonInput<KeyCode>>) {
    if keys.just_pressed(KeyCode::F3) {
        settings.show_diagnostics = !settings.show_diagnostics;
    }
}
