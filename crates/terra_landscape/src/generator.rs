//! Background landscape generation
//!
//! The generator keeps a square of tiles around a focus point. Tiles that
//! come into range are generated as jobs; tiles that leave it are dropped.
//! Jobs never touch the entity manager. They write the finished
//! heightfield into the generator's own tile table and push a `Generated`
//! event into the queue; everything else happens on the simulation thread.

use crate::event::{GeneratorEvent, GeneratorEventQueue};
use noise::{NoiseFn, Perlin};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use terra_core::glam::Vec3;
use terra_core::jobs::{JobQueue, JobQueueError};
use terra_core::math::DeterministicRng;
use terra_services::settings::MAX_VIEW_RADIUS;
use terra_services::{LandscapeSettings, SettingsError};
use thiserror::Error;

/// Terrain features per tile edge.
const FEATURES_PER_TILE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Tile containing a world position (ignores height).
    pub fn containing(position: Vec3, tile_size: f32) -> Self {
        Self {
            x: (position.x / tile_size).floor() as i32,
            z: (position.z / tile_size).floor() as i32,
        }
    }

    pub fn origin(&self, tile_size: f32) -> Vec3 {
        Vec3::new(self.x as f32 * tile_size, 0.0, self.z as f32 * tile_size)
    }

    pub fn center(&self, tile_size: f32) -> Vec3 {
        self.origin(tile_size) + Vec3::new(tile_size * 0.5, 0.0, tile_size * 0.5)
    }
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("invalid landscape settings: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Jobs(#[from] JobQueueError),
}

/// Height samples of one tile on a regular grid, edges included, so
/// neighbouring tiles share their border samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightfield {
    tile: TileCoord,
    tile_size: f32,
    side: usize,
    heights: Vec<f32>,
    min: f32,
    max: f32,
}

impl Heightfield {
    /// Deterministic in (seed, tile): every thread builds the same field.
    pub fn generate(tile: TileCoord, settings: &LandscapeSettings) -> Self {
        let side = settings.samples_per_side.max(2) as usize;
        let tile_size = settings.tile_size;
        let origin = tile.origin(tile_size);
        let step = tile_size / (side - 1) as f32;
        let noise = Perlin::new(DeterministicRng::new(settings.seed).next_u32());

        let mut heights = Vec::with_capacity(side * side);
        for row in 0..side {
            for col in 0..side {
                let x = origin.x + col as f32 * step;
                let z = origin.z + row as f32 * step;
                heights.push(terrain_height(&noise, settings, x, z));
            }
        }

        let min = heights.iter().copied().fold(f32::INFINITY, f32::min);
        let max = heights.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        Self {
            tile,
            tile_size,
            side,
            heights,
            min,
            max,
        }
    }

    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Half-sizes of the tile's bounding box.
    pub fn extent(&self) -> Vec3 {
        let half = self.tile_size * 0.5;
        Vec3::new(half, (self.max - self.min) * 0.5, half)
    }

    /// Bilinear height at a world position inside this tile.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let origin = self.tile.origin(self.tile_size);
        let cells = (self.side - 1) as f32;
        let u = ((x - origin.x) / self.tile_size * cells).clamp(0.0, cells);
        let v = ((z - origin.z) / self.tile_size * cells).clamp(0.0, cells);

        let (c0, r0) = (u.floor() as usize, v.floor() as usize);
        let (c1, r1) = ((c0 + 1).min(self.side - 1), (r0 + 1).min(self.side - 1));
        let (fu, fv) = (u - c0 as f32, v - r0 as f32);

        let at = |c: usize, r: usize| self.heights[r * self.side + c];
        let top = at(c0, r0) + (at(c1, r0) - at(c0, r0)) * fu;
        let bottom = at(c0, r1) + (at(c1, r1) - at(c0, r1)) * fu;
        top + (bottom - top) * fv
    }
}

/// Perlin noise in world space, so neighbouring tiles agree on their
/// shared edge. Mapped into `[0, height_scale]`.
fn terrain_height(noise: &Perlin, settings: &LandscapeSettings, x: f32, z: f32) -> f32 {
    let frequency = FEATURES_PER_TILE / settings.tile_size as f64;
    let sample = noise.get([x as f64 * frequency, z as f64 * frequency]);
    ((sample * 0.5 + 0.5).clamp(0.0, 1.0) as f32) * settings.height_scale
}

/// Tiles within `radius` of `focus`, skipping any that would fall off
/// the `i32` grid.
fn tiles_around(focus: TileCoord, radius: i32) -> impl Iterator<Item = TileCoord> {
    (-radius..=radius).flat_map(move |dz| {
        (-radius..=radius).filter_map(move |dx| {
            Some(TileCoord::new(
                focus.x.checked_add(dx)?,
                focus.z.checked_add(dz)?,
            ))
        })
    })
}

/// Store a finished tile and announce it, unless it left range meanwhile.
/// The check, the store and the push share one critical section.
fn publish(table: &Mutex<TileTable>, queue: &GeneratorEventQueue, field: Heightfield) -> bool {
    let tile = field.tile();
    let event = GeneratorEvent::generated(tile.center(field.tile_size), field.extent());

    let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
    if !table.requested.contains(&tile) {
        return false;
    }
    table.ready.insert(tile, Arc::new(field));
    queue.push(event);
    true
}

/// State shared with generation jobs.
#[derive(Default)]
struct TileTable {
    requested: HashSet<TileCoord>,
    ready: HashMap<TileCoord, Arc<Heightfield>>,
}

pub struct LandscapeGenerator {
    settings: LandscapeSettings,
    jobs: JobQueue,
    queue: Arc<GeneratorEventQueue>,
    table: Arc<Mutex<TileTable>>,
    active: BTreeSet<TileCoord>,
    focus: Option<TileCoord>,
}

impl LandscapeGenerator {
    pub fn new(
        settings: LandscapeSettings,
        queue: Arc<GeneratorEventQueue>,
    ) -> Result<Self, GeneratorError> {
        settings.validate()?;
        let jobs = JobQueue::new(settings.worker_threads)?;
        tracing::info!(
            tile_size = settings.tile_size,
            view_radius = settings.view_radius,
            workers = jobs.threads(),
            "landscape generator ready"
        );
        Ok(Self {
            settings,
            jobs,
            queue,
            table: Arc::new(Mutex::new(TileTable::default())),
            active: BTreeSet::new(),
            focus: None,
        })
    }

    /// Move the focus point. Only crossing into another tile does work:
    /// out-of-range tiles are dropped with a `Deleted` event, new ones are
    /// scheduled after a single `Started` event for the pass.
    pub fn set_position(&mut self, position: Vec3) {
        let tile_size = self.settings.tile_size;
        let focus = TileCoord::containing(position, tile_size);
        if self.focus == Some(focus) {
            return;
        }
        self.focus = Some(focus);

        let radius = self.view_radius();
        let wanted: BTreeSet<TileCoord> = tiles_around(focus, radius).collect();

        let stale: Vec<TileCoord> = self.active.difference(&wanted).copied().collect();
        let fresh: Vec<TileCoord> = wanted.difference(&self.active).copied().collect();

        // Deleted goes out under the table lock so a job finishing the same
        // tile cannot slip its Generated in after it.
        if !stale.is_empty() {
            let tile_extent = Vec3::new(tile_size * 0.5, 0.0, tile_size * 0.5);
            let mut table = self.lock_table();
            for tile in &stale {
                table.requested.remove(tile);
                table.ready.remove(tile);
                self.queue.push(GeneratorEvent::deleted(tile.center(tile_size), tile_extent));
            }
        }
        for tile in &stale {
            self.active.remove(tile);
        }

        if fresh.is_empty() {
            return;
        }
        let half_region = (radius as f32 + 0.5) * tile_size;
        self.queue.push(GeneratorEvent::started(
            focus.center(tile_size),
            Vec3::new(half_region, 0.0, half_region),
        ));
        tracing::debug!(?focus, tiles = fresh.len(), "scheduling landscape tiles");

        self.lock_table().requested.extend(fresh.iter().copied());
        for tile in fresh {
            self.active.insert(tile);
            self.schedule(tile);
        }
    }

    fn view_radius(&self) -> i32 {
        i32::try_from(self.settings.view_radius.min(MAX_VIEW_RADIUS)).unwrap_or(0)
    }

    fn schedule(&self, tile: TileCoord) {
        let settings = self.settings.clone();
        let queue = Arc::clone(&self.queue);
        let table = Arc::clone(&self.table);

        self.jobs.add_async(move || {
            let field = Heightfield::generate(tile, &settings);
            if !publish(&table, &queue, field) {
                tracing::trace!(?tile, "tile left range before it finished");
            }
        });
    }

    /// Terrain height under a world position, once its tile is ready.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let tile = TileCoord::containing(Vec3::new(x, 0.0, z), self.settings.tile_size);
        let field = self.lock_table().ready.get(&tile).cloned()?;
        Some(field.height_at(x, z))
    }

    pub fn tile(&self, tile: TileCoord) -> Option<Arc<Heightfield>> {
        self.lock_table().ready.get(&tile).cloned()
    }

    /// Tiles currently in range, generated or not.
    pub fn active_tiles(&self) -> usize {
        self.active.len()
    }

    pub fn ready_tiles(&self) -> usize {
        self.lock_table().ready.len()
    }

    pub fn pending_jobs(&self) -> usize {
        self.jobs.pending()
    }

    /// Block until every scheduled tile job has finished.
    pub fn wait_idle(&self) {
        self.jobs.wait_idle();
    }

    pub fn queue(&self) -> Arc<GeneratorEventQueue> {
        Arc::clone(&self.queue)
    }

    fn lock_table(&self) -> MutexGuard<'_, TileTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
