use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use shatter::Scenario;

use crate::sim::{ResetEvent, Sandbox, SimSettings, SimStats};

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .add_systems(Update, ui_system);
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    mut settings: ResMut<SimSettings>,
    sandbox: Res<Sandbox>,
    stats: Res<SimStats>,
    diagnostics: Res<DiagnosticsStore>,
    mut ev_reset: EventWriter<ResetEvent>,
) {
    let config = sandbox.config();

    egui::Window::new("Settings").show(contexts.ctx_mut(), |ui| {
        ui.label(format!(
            "Particles: {} / {}",
            sandbox.population().len(),
            config.max_particles
        ));
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                ui.label(format!("FPS: {:.1}", value));
            }
        }
        ui.label(format!(
            "Speed: {:.2}x (max {:.1}x)",
            settings.speed_multiplier,
            config.max_speed_multiplier()
        ));
        ui.label(format!("Frame: {}", sandbox.frame()));

        ui.separator();

        ui.checkbox(&mut settings.running, "Running");

        egui::ComboBox::from_label("Scenario")
            .selected_text(settings.scenario.label())
            .show_ui(ui, |ui| {
                for scenario in Scenario::ALL {
                    ui.selectable_value(&mut settings.scenario, scenario, scenario.label());
                }
            });
        if ui.button("Reset").clicked() {
            ev_reset.send(ResetEvent);
        }
    });

    if settings.show_help {
        egui::Window::new("Help").show(contexts.ctx_mut(), |ui| {
            ui.label("+/-: Adjust Speed");
            ui.label("A: Add Particle");
            ui.label("D/Backspace: Remove Particle");
            ui.label("Space: Pause Simulation");
            ui.label("R: Reset Simulation");
            ui.label("H: Toggle Help");
            ui.label("F3: Toggle Diagnostics");
        });
    }

    if settings.show_diagnostics {
        egui::Window::new("Diagnostics").show(contexts.ctx_mut(), |ui| {
            ui.label(format!("Collisions: {}", stats.collisions));
            ui.label(format!("Splits: {}", stats.splits));
            ui.label(format!("Suppressed splits: {}", stats.suppressed_splits));
            ui.label(format!(
                "Quadtree: {} nodes, depth {}",
                stats.tree_nodes, stats.tree_depth
            ));
            if stats.dropped > 0 {
                ui.label(format!("Dropped from index: {}", stats.dropped));
            }
        });
    }
}
