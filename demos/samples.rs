use ::rand::thread_rng;
use macroquad::prelude::*;
use rigid2d::collision::CollisionGroup;
use rigid2d::dynamics::{BodyDef, BodyHandle, Material, PhysicsObject, World, WorldConfig};
use rigid2d::math::{Vec2, random_range, random_unit};
use rigid2d::shapes::{Circle, ConcavePolygon, Polygon, Shape};

const GRAVITY: Vec2 = Vec2::new(0.0, -600.0);

#[derive(Copy, Clone, Debug)]
enum Demo {
    CircleDrop,
    PolygonPile,
    ConcaveBowl,
    GroupFiltering,
}

impl Demo {
    fn name(self) -> &'static str {
        match self {
            Demo::CircleDrop => "Demo 1: Circle Drop",
            Demo::PolygonPile => "Demo 2: Polygon Pile",
            Demo::ConcaveBowl => "Demo 3: Concave Bowl",
            Demo::GroupFiltering => "Demo 4: Collision Groups",
        }
    }

    fn from_key(key: KeyCode) -> Option<Demo> {
        Some(match key {
            KeyCode::Key1 => Demo::CircleDrop,
            KeyCode::Key2 => Demo::PolygonPile,
            KeyCode::Key3 => Demo::ConcaveBowl,
            KeyCode::Key4 => Demo::GroupFiltering,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug)]
struct Camera2DView {
    zoom: f32,
    pan: Vec2,
}

impl Default for Camera2DView {
    fn default() -> Self {
        Self {
            zoom: 320.0,
            pan: Vec2::new(0.0, 200.0),
        }
    }
}

impl Camera2DView {
    fn half_extents(&self) -> (f32, f32) {
        let aspect = screen_width() / screen_height().max(1.0);
        if aspect >= 1.0 {
            (self.zoom * aspect, self.zoom)
        } else {
            (self.zoom, self.zoom / aspect)
        }
    }

    fn world_to_screen(&self, p: Vec2) -> Vec2 {
        let (half_w, half_h) = self.half_extents();
        let ndc_x = (p.x - self.pan.x) / half_w;
        let ndc_y = (p.y - self.pan.y) / half_h;
        // Screen Y grows downward.
        Vec2::new(
            (ndc_x * 0.5 + 0.5) * screen_width(),
            (1.0 - (ndc_y * 0.5 + 0.5)) * screen_height(),
        )
    }

    fn screen_to_world(&self, p: Vec2) -> Vec2 {
        let (half_w, half_h) = self.half_extents();
        let ndc_x = (p.x / screen_width()) * 2.0 - 1.0;
        let ndc_y = -((p.y / screen_height().max(1.0)) * 2.0 - 1.0);
        Vec2::new(self.pan.x + ndc_x * half_w, self.pan.y + ndc_y * half_h)
    }

    fn pixels_per_unit(&self) -> f32 {
        let (_, half_h) = self.half_extents();
        0.5 * screen_height() / half_h
    }
}

fn draw_outline(view: &Camera2DView, vertices: &[Vec2], color: Color) {
    for (i, &v) in vertices.iter().enumerate() {
        let a = view.world_to_screen(v);
        let b = view.world_to_screen(vertices[(i + 1) % vertices.len()]);
        draw_line(a.x, a.y, b.x, b.y, 1.5, color);
    }
}

fn draw_object(view: &Camera2DView, obj: &PhysicsObject, color: Color) {
    let body = &obj.body;
    match body.shape() {
        Shape::Circle(c) => {
            let center = view.world_to_screen(c.center());
            let r = c.radius() * view.pixels_per_unit();
            draw_circle_lines(center.x, center.y, r, 1.5, color);
            let spoke = view.world_to_screen(c.center() + Vec2::new(c.radius(), 0.0).rotate(body.orientation));
            draw_line(center.x, center.y, spoke.x, spoke.y, 1.0, color);
        }
        Shape::Polygon(p) => draw_outline(view, p.vertices(), color),
        Shape::Concave(c) => {
            let faded = Color::new(color.r, color.g, color.b, 0.35);
            for part in c.parts() {
                draw_outline(view, part.vertices(), faded);
            }
            let t = body.transform();
            let outline: Vec<Vec2> = c.outline().iter().map(|&v| t.apply(v)).collect();
            draw_outline(view, &outline, color);
        }
    }
}

fn group_color(group: CollisionGroup) -> Color {
    match group {
        CollisionGroup::Player => Color::new(0.4, 0.9, 0.4, 1.0),
        CollisionGroup::Platforms | CollisionGroup::SoftPlatforms | CollisionGroup::Wall => {
            Color::new(0.6, 0.6, 0.7, 1.0)
        }
        CollisionGroup::Sensors => Color::new(0.9, 0.8, 0.2, 1.0),
        CollisionGroup::EnemyProjectiles => Color::new(0.9, 0.3, 0.3, 1.0),
        CollisionGroup::FriendlyProjectiles => Color::new(0.3, 0.6, 0.9, 1.0),
        _ => Color::new(0.8, 0.8, 0.9, 1.0),
    }
}

fn ground(world: &mut World, width: f32, group: CollisionGroup) -> BodyHandle {
    world.create_body(
        BodyDef {
            material: Material::STATIC,
            ..BodyDef::fixed(Polygon::rectangle(width, 40.0), Vec2::new(0.0, -20.0))
        },
        group,
    )
}

fn ball(position: Vec2, radius: f32, material: Material) -> BodyDef {
    BodyDef {
        position,
        material,
        can_rotate: true,
        ..BodyDef::new(Circle::new(radius))
    }
}

fn init_demo(world: &mut World, demo: Demo) {
    world.clear();
    world.gravity = GRAVITY;
    let mut rng = thread_rng();

    match demo {
        Demo::CircleDrop => {
            ground(world, 900.0, CollisionGroup::Default);
            let materials = [
                Material::ROCK,
                Material::WOOD,
                Material::METAL,
                Material::BOUNCY_BALL,
                Material::PILLOW,
            ];
            for (i, m) in materials.into_iter().enumerate() {
                let x = -240.0 + 120.0 * i as f32;
                world.create_body(ball(Vec2::new(x, 300.0 + 40.0 * i as f32), 24.0, m), CollisionGroup::Default);
            }
        }

        Demo::PolygonPile => {
            ground(world, 900.0, CollisionGroup::Default);
            for i in 0..24 {
                let x = 200.0 * random_unit(&mut rng);
                let y = 80.0 + 45.0 * i as f32;
                let sides = random_range(&mut rng, 3.0, 7.99) as usize;
                let shape: Shape = if sides == 4 {
                    Polygon::rectangle(random_range(&mut rng, 20.0, 50.0), random_range(&mut rng, 20.0, 50.0)).into()
                } else {
                    match Polygon::regular(sides, random_range(&mut rng, 14.0, 28.0)) {
                        Ok(p) => p.into(),
                        Err(_) => continue,
                    }
                };
                world.create_body(
                    BodyDef {
                        position: Vec2::new(x, y),
                        material: Material::WOOD,
                        can_rotate: true,
                        ..BodyDef::new(shape)
                    },
                    CollisionGroup::Default,
                );
            }
        }

        Demo::ConcaveBowl => {
            ground(world, 900.0, CollisionGroup::Default);
            let bowl = ConcavePolygon::new(&[
                Vec2::new(-220.0, 0.0),
                Vec2::new(220.0, 0.0),
                Vec2::new(260.0, 200.0),
                Vec2::new(220.0, 200.0),
                Vec2::new(160.0, 40.0),
                Vec2::new(-160.0, 40.0),
                Vec2::new(-220.0, 200.0),
                Vec2::new(-260.0, 200.0),
            ]);
            match bowl {
                Ok(bowl) => {
                    world.create_body(BodyDef::fixed(bowl, Vec2::ZERO), CollisionGroup::Default);
                }
                Err(e) => log::warn!("bowl rejected: {e}"),
            }
            for i in 0..12 {
                let x = 150.0 * random_unit(&mut rng);
                let r = random_range(&mut rng, 10.0, 22.0);
                world.create_body(
                    ball(Vec2::new(x, 280.0 + 50.0 * i as f32), r, Material::ROCK),
                    CollisionGroup::Default,
                );
            }
        }

        Demo::GroupFiltering => {
            ground(world, 900.0, CollisionGroup::Platforms);
            // The player lands on platforms and is seen by the sensor, which
            // never pushes back.
            world.create_body(
                BodyDef {
                    position: Vec2::new(-150.0, 200.0),
                    ..BodyDef::new(Polygon::rectangle(40.0, 60.0))
                },
                CollisionGroup::Player,
            );
            world.create_body(
                BodyDef {
                    material: Material::STATIC,
                    ..BodyDef::fixed(Polygon::rectangle(120.0, 120.0), Vec2::new(-150.0, 60.0))
                },
                CollisionGroup::Sensors,
            );
            // Friendly projectiles fly through the player.
            for i in 0..4 {
                world.create_body(
                    BodyDef {
                        position: Vec2::new(150.0 + 30.0 * i as f32, 100.0),
                        velocity: Vec2::new(-300.0, 200.0),
                        ..BodyDef::new(Circle::new(8.0))
                    },
                    CollisionGroup::FriendlyProjectiles,
                );
            }
            // Npcs collide with walls and platforms but not with each other.
            world.create_body(
                BodyDef {
                    material: Material::STATIC,
                    ..BodyDef::fixed(Polygon::rectangle(20.0, 200.0), Vec2::new(350.0, 100.0))
                },
                CollisionGroup::Wall,
            );
            for i in 0..3 {
                world.create_body(
                    BodyDef {
                        position: Vec2::new(250.0, 200.0 + 50.0 * i as f32),
                        ..BodyDef::new(Polygon::rectangle(40.0, 40.0))
                    },
                    CollisionGroup::Npcs,
                );
            }
        }
    }
}

fn launch_ball(world: &mut World, view: &Camera2DView) {
    let mut rng = thread_rng();
    let (half_w, _) = view.half_extents();
    let from = Vec2::new(view.pan.x - half_w * 0.9, view.pan.y + random_range(&mut rng, 0.0, 150.0));
    world.create_body(
        BodyDef {
            velocity: Vec2::new(random_range(&mut rng, 400.0, 900.0), random_range(&mut rng, 0.0, 200.0)),
            ..ball(from, 18.0, Material::METAL)
        },
        CollisionGroup::Default,
    );
}

#[macroquad::main("rigid2d samples")]
async fn main() {
    env_logger::init();

    let mut world: World = World::with_config(GRAVITY, WorldConfig::default());
    let mut demo = Demo::CircleDrop;
    let mut view = Camera2DView::default();

    let mut paused = false;
    let dt = 1.0 / 60.0;
    let mut last_mouse: Option<Vec2> = None;
    let mut show_contacts = true;

    init_demo(&mut world, demo);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        for key in [KeyCode::Key1, KeyCode::Key2, KeyCode::Key3, KeyCode::Key4] {
            if let Some(d) = Demo::from_key(key).filter(|_| is_key_pressed(key)) {
                demo = d;
                init_demo(&mut world, demo);
            }
        }

        if is_key_pressed(KeyCode::Space) {
            launch_ball(&mut world, &view);
        }
        if is_key_pressed(KeyCode::B) {
            world.reset();
        }
        if is_key_pressed(KeyCode::P) {
            world.config.position_correction = !world.config.position_correction;
        }
        if is_key_pressed(KeyCode::T) {
            world.config.minimize_penetration = !world.config.minimize_penetration;
        }
        if is_key_pressed(KeyCode::C) {
            show_contacts = !show_contacts;
        }
        if is_key_pressed(KeyCode::K) {
            paused = !paused;
        }
        if is_key_pressed(KeyCode::R) {
            view = Camera2DView::default();
        }

        if is_key_down(KeyCode::Left) {
            view.pan.x -= 0.02 * view.zoom;
        }
        if is_key_down(KeyCode::Right) {
            view.pan.x += 0.02 * view.zoom;
        }
        if is_key_down(KeyCode::Down) {
            view.pan.y -= 0.02 * view.zoom;
        }
        if is_key_down(KeyCode::Up) {
            view.pan.y += 0.02 * view.zoom;
        }
        let wheel = mouse_wheel().1;
        if wheel.abs() > 0.0 {
            view.zoom = (view.zoom * (1.0 - wheel * 0.1)).clamp(40.0, 2000.0);
        }

        let mouse = mouse_position();
        let mouse_v = Vec2::new(mouse.0, mouse.1);
        if is_mouse_button_down(MouseButton::Right) {
            if let Some(prev) = last_mouse {
                view.pan += view.screen_to_world(prev) - view.screen_to_world(mouse_v);
            }
            last_mouse = Some(mouse_v);
        } else {
            last_mouse = None;
        }

        let stats = if !paused || is_key_pressed(KeyCode::N) {
            Some(world.step(dt))
        } else {
            None
        };

        clear_background(BLACK);

        for obj in world.participants() {
            let color = if obj.hits().is_empty() {
                group_color(obj.group)
            } else {
                WHITE
            };
            draw_object(&view, obj, color);
        }
        for h in world.handles() {
            world.get_mut(h).take_hits();
        }

        if show_contacts {
            for collision in world.collisions() {
                for m in collision.manifolds() {
                    for &c in &m.contacts {
                        let p = view.world_to_screen(c);
                        draw_circle(p.x, p.y, 3.0, RED);
                    }
                }
            }
        }

        let overlay = format!(
            "{}\nKeys: 1-4 demos | Space launch | B reset bodies | P posCorr | T toi | C contacts | K pause | N step | R reset view\nArrows pan | Wheel zoom | RMB drag pan\nzoom={:.1} pan=({:.1},{:.1})\nposCorr={} toi={} bodies={} {}",
            demo.name(),
            view.zoom,
            view.pan.x,
            view.pan.y,
            world.config.position_correction,
            world.config.minimize_penetration,
            world.len(),
            stats.map_or(String::from("paused"), |s| format!("pairs={} collisions={}", s.pairs, s.collisions)),
        );
        draw_text(&overlay, 12.0, 20.0, 18.0, WHITE);

        next_frame().await;
    }
}
