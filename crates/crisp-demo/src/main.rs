//! Crisp demo: trees and tanks on a 320x240 canvas, upscaled to the window.
//!
//! Usage: `crisp-demo [sprite.png ...]`. Without arguments the built-in tree
//! and tank sprites are used. `CRISP_CANVAS=WIDTHxHEIGHT` overrides the canvas.

mod library;
mod sprites;
mod world;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crisp_engine::coords::{PixelSize, Vec2};
use crisp_engine::core::{App, AppControl, FrameCtx};
use crisp_engine::device::GpuInit;
use crisp_engine::logging::{init_logging, LoggingConfig};
use crisp_engine::render::PixelInit;
use crisp_engine::scene::SpriteBatch;
use crisp_engine::time::FrameStats;
use crisp_engine::window::{Runtime, RuntimeConfig};

use library::{SpriteHandle, SpriteLibrary};
use world::{Body, World};

const CANVAS_ENV: &str = "CRISP_CANVAS";
const DEFAULT_CANVAS: PixelSize = PixelSize::new(320, 240);
const STATS_PERIOD: f32 = 1.0;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let canvas = parse_canvas(std::env::var(CANVAS_ENV).ok().as_deref())?;
    let pixel = PixelInit {
        canvas,
        ..PixelInit::default()
    };

    let mut library = SpriteLibrary::new(pixel.atlas);
    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let handles = if paths.is_empty() {
        vec![
            library.builtin("tree", sprites::TREE_SIZE, sprites::tree)?,
            library.builtin("tank", sprites::TANK_SIZE, sprites::tank)?,
        ]
    } else {
        paths
            .iter()
            .map(|p| library.load_file(p, None))
            .collect::<Result<Vec<_>>>()?
    };
    log::info!(
        "{} sprites registered on layers {:?}",
        library.len(),
        handles.iter().map(|h| h.layer()).collect::<Vec<_>>()
    );

    let world = populate(canvas, &handles);
    let app = DemoApp {
        library,
        world,
        batch: SpriteBatch::new(),
        stats: FrameStats::new(0.5),
        since_report: 0.0,
    };

    let config = RuntimeConfig {
        title: "crisp demo".to_string(),
        pixel,
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default(), app)
}

/// Canvas size from `CRISP_CANVAS`, or the default when unset.
fn parse_canvas(value: Option<&str>) -> Result<PixelSize> {
    match value {
        Some(v) => v
            .parse()
            .with_context(|| format!("invalid {CANVAS_ENV} value {v:?}")),
        None => Ok(DEFAULT_CANVAS),
    }
}

/// Static rows of the first sprite, and every other sprite drifting across.
fn populate(canvas: PixelSize, handles: &[SpriteHandle]) -> World {
    let size = canvas.as_vec2() * 2.0;
    let mut world = World::new(size, canvas);

    let Some((&scenery, movers)) = handles.split_first() else { return world };

    for row in 0..6 {
        for col in 0..12 {
            let jitter = ((row * 7 + col * 3) % 5) as f32 * 3.0;
            world.spawn(Body {
                sprite: scenery,
                position: Vec2::new(col as f32 * 53.0 + jitter, row as f32 * 79.0 + jitter),
                velocity: Vec2::ZERO,
                z: 0.5,
            });
        }
    }

    for (i, &sprite) in movers.iter().enumerate() {
        for lane in 0..4 {
            let k = (i * 4 + lane) as f32;
            world.spawn(Body {
                sprite,
                position: Vec2::new(k * 41.0, 30.0 + k * 57.0),
                velocity: Vec2::new(12.0 + k * 5.0, if lane % 2 == 0 { 0.0 } else { 7.5 }),
                z: 0.25,
            });
        }
    }

    world
}

struct DemoApp {
    library: SpriteLibrary,
    world: World,
    batch: SpriteBatch,
    stats: FrameStats,
    since_report: f32,
}

impl DemoApp {
    fn report(&mut self, dt: f32) {
        self.stats.update(dt);
        self.since_report += dt;
        if self.since_report < STATS_PERIOD {
            return;
        }
        self.since_report = 0.0;
        log::info!(
            "{:.1} fps | mean {:.2} ms | std {:.2} ms | p99 {:.2} ms",
            self.stats.fps(),
            self.stats.mean() * 1000.0,
            self.stats.std() * 1000.0,
            self.stats.percentile_99() * 1000.0,
        );
    }
}

impl App for DemoApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Err(e) = self.library.sync(ctx) {
            log::error!("sprite upload failed: {e:#}");
            return AppControl::Exit;
        }

        let dt = ctx.time.dt;
        self.report(dt);
        self.world.step(dt);

        self.batch.clear();
        self.world.fill_batch(&self.library, &mut self.batch);
        ctx.render(&self.batch, self.world.camera())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_defaults_and_parses_override() {
        assert_eq!(parse_canvas(None).unwrap(), DEFAULT_CANVAS);
        assert_eq!(parse_canvas(Some("256x144")).unwrap(), PixelSize::new(256, 144));
        assert!(parse_canvas(Some("wide")).is_err());
        assert!(parse_canvas(Some("0x240")).is_err());
    }

    #[test]
    fn populate_puts_scenery_before_movers() {
        let mut lib = SpriteLibrary::new(PixelInit::default().atlas);
        let tree = lib.builtin("tree", sprites::TREE_SIZE, sprites::tree).unwrap();
        let tank = lib.builtin("tank", sprites::TANK_SIZE, sprites::tank).unwrap();
        let world = populate(DEFAULT_CANVAS, &[tree, tank]);

        let bodies = world.bodies();
        assert_eq!(bodies.len(), 72 + 4);
        assert!(bodies[..72].iter().all(|b| b.sprite == tree));
        assert!(bodies[72..].iter().all(|b| b.sprite == tank && b.velocity.x > 0.0));
    }

    #[test]
    fn populate_without_sprites_is_empty() {
        assert!(populate(DEFAULT_CANVAS, &[]).bodies().is_empty());
    }
}
