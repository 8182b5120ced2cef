#![allow(clippy::cast_sign_loss)]

use std::{
    collections::BTreeMap,
    fmt::Display,
    ops::{Add, Sub},
};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::DungeonConfig,
    error::{DungeonError, Result},
};

/// Grid of room numbers. `0` is unclaimed, `k > 0` belongs to room `k`.
pub struct Stage {
    pub width: i32,
    pub height: i32,
    pub cells: Vec<u32>,
}

impl Stage {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![0; (width.max(0) * height.max(0)) as usize],
        }
    }

    pub fn from_config(config: &DungeonConfig) -> Result<Self> {
        config.validate()?;
        let too_large = || DungeonError::GridTooLarge {
            width: config.width,
            height: config.height,
        };
        let width = i32::try_from(config.width).map_err(|_| too_large())?;
        let height = i32::try_from(config.height).map_err(|_| too_large())?;
        Ok(Self::new(width, height))
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    const fn index(&self, pos: Vector) -> Option<usize> {
        if self.contains(pos) {
            Some((pos.1 * self.width + pos.0) as usize)
        } else {
            None
        }
    }

    pub fn set(&mut self, pos: Vector, room: u32) {
        if let Some(cell) = self.index(pos).and_then(|idx| self.cells.get_mut(idx)) {
            *cell = room;
        }
    }

    pub fn get(&self, pos: Vector) -> Option<u32> {
        self.index(pos).and_then(|idx| self.cells.get(idx).copied())
    }

    pub const fn contains(&self, pos: Vector) -> bool {
        pos.0 >= 0 && pos.0 < self.width && pos.1 >= 0 && pos.1 < self.height
    }

    /// Whether growth may write to `pos`. Row 0 and column 0 are excluded.
    pub const fn claimable(&self, pos: Vector) -> bool {
        pos.0 > 0 && pos.1 > 0 && pos.0 < self.width && pos.1 < self.height
    }

    /// Number of claimed cells per room number.
    pub fn room_sizes(&self) -> BTreeMap<u32, usize> {
        let mut sizes = BTreeMap::new();
        for &room in self.cells.iter().filter(|&&room| room != 0) {
            *sizes.entry(room).or_insert(0) += 1;
        }
        sizes
    }

    pub fn glyph(room: u32) -> char {
        match room {
            0 => ' ',
            room => char::from_digit(room, 36).unwrap_or('*'),
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for _ in 0..self.width + 2 {
            write!(f, "-")?;
        }
        writeln!(f)?;
        for y in 0..self.height {
            write!(f, "|")?;
            for x in 0..self.width {
                write!(f, "{}", Self::glyph(self.get(Vector(x, y)).unwrap_or(0)))?;
            }
            writeln!(f, "|")?;
        }
        for _ in 0..self.width + 2 {
            write!(f, "-")?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vector(i32, i32);
impl Add for Vector {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0, self.1 + other.1)
    }
}
impl Sub for Vector {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0, self.1 - other.1)
    }
}
impl Vector {
    pub const fn new(x: i32, y: i32) -> Self {
        Self(x, y)
    }

    /// Chebyshev length: the ring this offset lies on.
    pub const fn chebyshev(self) -> i32 {
        let (x, y) = (self.0.abs(), self.1.abs());
        if x > y {
            x
        } else {
            y
        }
    }
}

/// A room seed. Its room number lives in the stage, not here.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    pub pos: Vector,
    /// Taken after the attempt budget ran out, so it may violate separation.
    pub fallback: bool,
}

pub struct Dungeon<'a> {
    config: DungeonConfig,
    seed: u64,
    rng: StdRng,
    origins: Vec<Origin>,
    stage: &'a mut Stage,
}

impl<'a> Dungeon<'a> {
    /// Fails unless `config` is valid and describes exactly this stage.
    pub fn new(stage: &'a mut Stage, config: &DungeonConfig) -> Result<Self> {
        if stage.width < 1 || stage.height < 1 {
            return Err(DungeonError::EmptyGrid {
                width: u32::try_from(stage.width).unwrap_or(0),
                height: u32::try_from(stage.height).unwrap_or(0),
            });
        }
        config.validate()?;
        if i64::from(stage.width) != i64::from(config.width)
            || i64::from(stage.height) != i64::from(config.height)
            || stage.cells.len() != (stage.width * stage.height) as usize
        {
            return Err(DungeonError::StageMismatch {
                stage_width: stage.width,
                stage_height: stage.height,
                width: config.width,
                height: config.height,
            });
        }
        let seed = config
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen::<u64>());
        log::info!("Rng seed: {seed}");

        Ok(Self {
            config: config.clone(),
            seed,
            rng: StdRng::seed_from_u64(seed),
            origins: Vec::new(),
            stage,
        })
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }

    pub fn stage(&self) -> &Stage {
        self.stage
    }

    /// Runs both phases on a freshly cleared stage and returns the number of
    /// growth iterations.
    pub fn generate(&mut self) -> u32 {
        self.stage.clear();
        self.origins.clear();

        self.place_rooms();
        let fallbacks = self.origins.iter().filter(|o| o.fallback).count();
        log::info!(
            "Placed {} rooms ({fallbacks} by fallback)",
            self.origins.len()
        );
        log::debug!("stage: \n{}", self.stage);

        let iterations = self.grow_rooms();
        log::info!(
            "Grew rooms in {iterations} iterations, cells per room: {:?}",
            self.stage.room_sizes()
        );
        log::debug!("stage: \n{}", self.stage);
        iterations
    }

    /// Per-axis minimum distance between origins, capped so that the
    /// configured room count can always fit along each axis.
    pub fn separation_thresholds(&self) -> (i32, i32) {
        let rooms = i32::try_from(self.config.room_count).unwrap_or(i32::MAX);
        let min = i32::try_from(self.config.min_separation).unwrap_or(i32::MAX);
        (
            min.min(self.stage.width / rooms),
            min.min(self.stage.height / rooms),
        )
    }

    pub fn place_rooms(&mut self) {
        let (min_x, min_y) = self.separation_thresholds();

        for _ in 0..self.config.room_count {
            let mut candidate = self.random_point();
            let mut attempts = 1;
            let mut fallback = false;
            while !self.is_separated(candidate, min_x, min_y) {
                if attempts >= self.config.max_attempts {
                    fallback = true;
                    break;
                }
                candidate = self.random_point();
                attempts += 1;
            }

            let room = self.add_origin(candidate, fallback);
            if fallback {
                log::warn!(
                    "Room {room} placed at {candidate:?} after {attempts} attempts without meeting separation"
                );
            } else {
                log::debug!("Room {room} placed at {candidate:?}");
            }
        }
    }

    /// Records an origin and stamps the next room number into the stage.
    pub fn add_origin(&mut self, pos: Vector, fallback: bool) -> u32 {
        let room = u32::try_from(self.origins.len() + 1).unwrap_or(u32::MAX);
        self.stage.set(pos, room);
        self.origins.push(Origin { pos, fallback });
        room
    }

    fn random_point(&mut self) -> Vector {
        Vector(
            self.rng.gen_range(0..self.stage.width),
            self.rng.gen_range(0..self.stage.height),
        )
    }

    /// Rejects on either axis being too close; this is not a distance check.
    fn is_separated(&self, candidate: Vector, min_x: i32, min_y: i32) -> bool {
        self.origins.iter().all(|origin| {
            let delta = origin.pos - candidate;
            delta.0.abs() >= min_x && delta.1.abs() >= min_y
        })
    }

    /// Grows every origin ring by ring until none can grow. Returns the
    /// number of iterations, at most `max(width, height)`.
    pub fn grow_rooms(&mut self) -> u32 {
        let mut growing = (0..self.origins.len()).collect::<Vec<_>>();
        let mut step = 0;
        while !growing.is_empty() {
            step += 1;
            self.grow_ring(&mut growing, step);
        }
        step as u32
    }

    /// One iteration: every growing origin, in room order, tries ring `step`.
    /// Origins that halt are dropped and the rest keep their order.
    fn grow_ring(&mut self, growing: &mut Vec<usize>, step: i32) {
        growing.retain(|&i| {
            let origin = self.origins[i].pos;
            let grew = self.try_grow(origin, step);
            if !grew {
                log::debug!("Origin {origin:?} stopped growing at step {step}");
            }
            grew
        });
    }

    /// Claims the square of radius `step` around `origin` unless the ring
    /// at exactly `step` is off-grid or the square touches another room.
    fn try_grow(&mut self, origin: Vector, step: i32) -> bool {
        let stage = &*self.stage;
        let Some(room) = stage.get(origin).filter(|&room| room != 0) else {
            return false;
        };

        let square = (origin.1 - step..=origin.1 + step)
            .flat_map(|y| (origin.0 - step..=origin.0 + step).map(move |x| Vector(x, y)))
            .filter(|&pos| pos != origin && stage.claimable(pos))
            .collect::<Vec<_>>();

        let ring_is_empty = !square
            .iter()
            .any(|&pos| (pos - origin).chebyshev() == step);
        let blocked = square.iter().any(|&pos| {
            stage
                .get(pos)
                .is_some_and(|other| other != 0 && other != room)
        });
        if ring_is_empty || blocked {
            return false;
        }

        for pos in square {
            self.stage.set(pos, room);
        }
        true
    }
}
