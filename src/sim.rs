use bevy::log::{error, info};
use bevy::prelude::*;
use shatter::engine::adjust_speed_multiplier;
use shatter::{Engine, FrameStats, Scenario, SimConfig};

/// The simulation core, owned by the app for the lifetime of the window.
#[derive(Resource, Deref, DerefMut)]
pub struct Sandbox(pub Engine);

#[derive(Resource, Clone)]
pub struct SimSettings {
    pub running: bool,
    pub speed_multiplier: f32,
    pub scenario: Scenario,
    pub show_help: bool,
    pub show_diagnostics: bool,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            running: true,
            speed_multiplier: 1.0,
            scenario: Scenario::default(),
            show_help: true,
            show_diagnostics: false,
        }
    }
}

impl SimSettings {
    pub fn for_scenario(scenario: Scenario) -> Self {
        Self {
            scenario,
            ..Self::default()
        }
    }
}

#[derive(Resource, Default, Deref, DerefMut)]
pub struct SimStats(pub FrameStats);

#[derive(Event)]
pub struct SpeedChange {
    pub increase: bool,
}

#[derive(Event, Default)]
pub struct AddParticle;

#[derive(Event, Default)]
pub struct RemoveParticle;

#[derive(Event, Default)]
pub struct ResetEvent;

#[derive(Component)]
struct ParticleSprite;

/// Sprite entities by population index.
#[derive(Resource, Default)]
struct SpritePool(Vec<Entity>);

pub struct SimPlugin;
impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimSettings>()
            .init_resource::<SimStats>()
            .init_resource::<SpritePool>()
            .add_event::<SpeedChange>()
            .add_event::<AddParticle>()
            .add_event::<RemoveParticle>()
            .add_event::<ResetEvent>()
            .add_systems(
                Update,
                (
                    handle_reset,
                    handle_speed_changes,
                    handle_population_requests,
                    step_simulation,
                    update_render,
                )
                    .chain(),
            );
    }
}

fn handle_reset(
    mut ev_reset: EventReader<ResetEvent>,
    mut sandbox: ResMut<Sandbox>,
    mut settings: ResMut<SimSettings>,
    mut stats: ResMut<SimStats>,
) {
    if ev_reset.is_empty() {
        return;
    }
    ev_reset.clear();

    let mut config = SimConfig::from_scenario(settings.scenario);
    config.seed = sandbox.config().seed;
    if config == *sandbox.config() {
        sandbox.reset();
    } else {
        match Engine::new(config) {
            Ok(engine) => sandbox.0 = engine,
            Err(e) => {
                error!("reset to {:?} failed: {e}", settings.scenario);
                return;
            }
        }
    }
    settings.speed_multiplier = 1.0;
    stats.0 = FrameStats::default();
}

fn handle_speed_changes(
    mut ev_speed: EventReader<SpeedChange>,
    sandbox: Res<Sandbox>,
    mut settings: ResMut<SimSettings>,
) {
    for ev in ev_speed.read() {
        let before = settings.speed_multiplier;
        settings.speed_multiplier =
            adjust_speed_multiplier(before, ev.increase, sandbox.config());
        info!("speed multiplier now {:.2}", settings.speed_multiplier);
    }
}

fn handle_population_requests(
    mut ev_add: EventReader<AddParticle>,
    mut ev_remove: EventReader<RemoveParticle>,
    mut sandbox: ResMut<Sandbox>,
) {
    for _ in ev_add.read() {
        if !sandbox.add_particle() {
            info!("population at capacity ({})", sandbox.config().max_particles);
        }
    }
    for _ in ev_remove.read() {
        sandbox.remove_particle();
    }
}

fn step_simulation(
    settings: Res<SimSettings>,
    mut sandbox: ResMut<Sandbox>,
    mut stats: ResMut<SimStats>,
) {
    if !settings.running {
        return;
    }
    stats.0 = sandbox.step_frame(settings.speed_multiplier);
}

/// Domain coordinates grow right and down from the top-left corner; the
/// camera sits at the window center with `y` up.
fn to_world(x: f32, y: f32, domain: Vec2) -> Vec3 {
    Vec3::new(x - domain.x * 0.5, domain.y * 0.5 - y, 0.0)
}

fn update_render(
    mut commands: Commands,
    sandbox: Res<Sandbox>,
    mut pool: ResMut<SpritePool>,
    mut q: Query<(&mut Transform, &mut Sprite), With<ParticleSprite>>,
) {
    let domain = sandbox.config().domain;
    let n = sandbox.population().len();

    while pool.0.len() > n {
        if let Some(e) = pool.0.pop() {
            commands.entity(e).despawn();
        }
    }

    for (i, (x, y, radius, color)) in sandbox.render_view().enumerate() {
        let translation = to_world(x, y, domain);
        let size = Vec2::splat(radius * 2.0);
        match pool.0.get(i) {
            Some(&e) => {
                if let Ok((mut t, mut s)) = q.get_mut(e) {
                    t.translation = translation;
                    s.custom_size = Some(size);
                    s.color = color;
                }
            }
            None => {
                let e = commands
                    .spawn((
                        SpriteBundle {
                            sprite: Sprite {
                                color,
                                custom_size: Some(size),
                                ..default()
                            },
                            transform: Transform::from_translation(translation),
                            ..default()
                        },
                        ParticleSprite,
                    ))
                    .id();
                pool.0.push(e);
            }
        }
    }
}
