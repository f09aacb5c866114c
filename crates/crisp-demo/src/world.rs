use crisp_engine::coords::{PixelSize, Vec2};
use crisp_engine::scene::{SpriteBatch, SpriteDraw};
use crisp_engine::transform::Camera;

use crate::library::{SpriteHandle, SpriteLibrary};

/// A sprite with simple linear motion.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub sprite: SpriteHandle,
    pub position: Vec2,
    pub velocity: Vec2,
    pub z: f32,
}

/// Bodies moving inside a wrap-around world, seen through a panning camera.
///
/// The camera moves a fraction of a pixel per frame and bounces between the
/// world edges, which keeps the sampler busy with sub-pixel offsets.
pub struct World {
    size: Vec2,
    bodies: Vec<Body>,
    camera: Camera,
    pan_velocity: Vec2,
}

impl World {
    pub fn new(size: Vec2, canvas: PixelSize) -> Self {
        Self {
            size,
            bodies: Vec::new(),
            camera: Camera::for_canvas(canvas),
            pan_velocity: Vec2::new(3.7, 1.3),
        }
    }

    pub fn spawn(&mut self, body: Body) {
        self.bodies.push(body);
    }

    #[inline]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[inline]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Integrates `position += velocity * dt`, wrapping at the world edges.
    pub fn step(&mut self, dt: f32) {
        for body in &mut self.bodies {
            let p = body.position + body.velocity * dt;
            body.position = Vec2::new(p.x.rem_euclid(self.size.x), p.y.rem_euclid(self.size.y));
        }

        let limit = (self.size - self.camera.width_height).max(Vec2::ZERO);
        let mut top_left = self.camera.top_left + self.pan_velocity * dt;
        if top_left.x < 0.0 || top_left.x > limit.x {
            self.pan_velocity.x = -self.pan_velocity.x;
        }
        if top_left.y < 0.0 || top_left.y > limit.y {
            self.pan_velocity.y = -self.pan_velocity.y;
        }
        top_left = top_left.clamp(Vec2::ZERO, limit);
        self.camera = Camera::new(top_left, self.camera.width_height);
    }

    /// Appends every body to `batch` in spawn order.
    pub fn fill_batch(&self, library: &SpriteLibrary, batch: &mut SpriteBatch) {
        for body in &self.bodies {
            let Some(descriptor) = library.descriptor(body.sprite) else { continue };
            batch.push(SpriteDraw::native(body.position, descriptor, library.layout()).with_z(body.z));
        }
    }
}
