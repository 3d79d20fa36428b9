use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};
use bevy::math::primitives::Circle;

use crate::simulation::runner::{Simulation, Snapshot};
use crate::simulation::states::NVec2;

#[derive(Component)]
struct BodyIndex(pub usize);

/// Window edge length in pixels the world is fitted into
const VIEW_SIZE: f32 = 600.0;
const BODY_RADIUS: f32 = 2.0;

/// Simulation plus the latest snapshot, shared between viewer systems
#[derive(Resource)]
struct Viewer {
    sim: Simulation,
    snapshot: Snapshot,
    overlay: bool, // draw node rectangles and centroids
    scale: f32, // world units -> pixels
    center: NVec2, // world point drawn at the window center
}

impl Viewer {
    fn to_screen(&self, p: &NVec2) -> Vec2 {
        Vec2::new(
            ((p.x - self.center.x) as f32) * self.scale,
            ((p.y - self.center.y) as f32) * self.scale,
        )
    }
}

pub fn run_2d(sim: Simulation, overlay: bool) {
    println!("run_2d: starting Bevy 2D viewer with {} bodies", sim.store.len());

    let scale = VIEW_SIZE / sim.world.size() as f32;
    let center = sim.world.center();
    let snapshot = sim.snapshot();

    App::new()
        .insert_resource(Viewer { sim, snapshot, overlay, scale, center })
        .insert_resource(ClearColor(Color::BLACK))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "quadsim".into(),
                resolution: (VIEW_SIZE, VIEW_SIZE).into(),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .add_systems(Startup, setup_bodies_system)
        .add_systems(Update, (quit_on_key_system, physics_step_system, sync_transforms_system, overlay_system).chain())
        .run();
}

fn setup_bodies_system(mut commands: Commands, viewer: Res<Viewer>, mut meshes: ResMut<Assets<Mesh>>, mut materials: ResMut<Assets<ColorMaterial>>) {
    // 2D camera
    commands.spawn(Camera2dBundle::default());

    let mesh = Mesh2dHandle(meshes.add(Circle::new(BODY_RADIUS)));
    let material = materials.add(ColorMaterial::from(Color::srgb(1.0, 0.0, 0.0)));

    for (i, p) in viewer.snapshot.positions.iter().enumerate() {
        let s = viewer.to_screen(p);

        commands.spawn((
            MaterialMesh2dBundle {
                mesh: mesh.clone(),
                material: material.clone(),
                transform: Transform::from_xyz(s.x, s.y, 0.0),
                ..Default::default()
            },
            BodyIndex(i),
        ));
    }
}

/// Any key press ends the run at the next tick boundary
fn quit_on_key_system(keys: Res<ButtonInput<KeyCode>>, mut viewer: ResMut<Viewer>, mut exit: EventWriter<AppExit>) {
    if keys.get_just_pressed().next().is_some() {
        viewer.sim.stop();
        exit.send(AppExit::Success);
    }
}

fn physics_step_system(mut viewer: ResMut<Viewer>, mut exit: EventWriter<AppExit>) {
    if let Some(max) = viewer.sim.engine.max_ticks {
        if viewer.sim.tick() >= max {
            exit.send(AppExit::Success);
            return;
        }
    }

    let result = viewer.sim.step();
    match result {
        Ok(snapshot) => viewer.snapshot = snapshot,
        Err(crate::error::SimError::Stopped) => {}
        Err(e) => {
            log::error!("simulation failed: {e}");
            exit.send(AppExit::error());
        }
    }
}

fn sync_transforms_system(viewer: Res<Viewer>, mut query: Query<(&BodyIndex, &mut Transform)>) {
    for (BodyIndex(i), mut transform) in &mut query {
        if let Some(p) = viewer.snapshot.positions.get(*i) {
            let s = viewer.to_screen(p);
            transform.translation.x = s.x;
            transform.translation.y = s.y;
        }
    }
}

fn overlay_system(viewer: Res<Viewer>, mut gizmos: Gizmos) {
    if !viewer.overlay {
        return;
    }

    for node in &viewer.snapshot.nodes {
        let Some(centroid) = node.centroid else {
            continue;
        };

        let a = viewer.to_screen(&node.min);
        let b = viewer.to_screen(&node.max);
        gizmos.linestrip_2d(
            [a, Vec2::new(b.x, a.y), b, Vec2::new(a.x, b.y), a],
            Color::srgb(0.0, 1.0, 0.0),
        );
        gizmos.circle_2d(viewer.to_screen(&centroid), 1.0, Color::WHITE);
    }
}
