use crate::geom::{Direction, Rect};
use crate::model::{Obstacle, ObstacleKind, FIRST_ROW_Y, MEDIAN_GAP, ROW_HEIGHT};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub(crate) const LOG_ROWS: usize = 7;
pub(crate) const TRUCK_ROWS: usize = 7;

// x offsets of the staggered 100-unit bands each truck starts in
const TRUCK_BANDS: [i32; 3] = [0, 75, 175];
const TRUCK_SIZE: i32 = 20;

const LONG_LOG_W: i32 = 40;
const SHORT_LOG_W: i32 = 20;
const SHORT_LOG_BAND: i32 = 175;
const LOG_H: i32 = 20;

const MAX_SPEED: i32 = 3;

pub(crate) struct Board {
    pub(crate) logs: Vec<Obstacle>,
    pub(crate) trucks: Vec<Obstacle>,
}

/// Lays out obstacle rows top to bottom, one row per call.
pub(crate) struct Spawner {
    rng: StdRng,
    row_y: i32,
}

impl Spawner {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            row_y: FIRST_ROW_Y,
        }
    }

    pub(crate) fn reset_rows(&mut self) {
        self.row_y = FIRST_ROW_Y;
    }

    pub(crate) fn random_direction(&mut self) -> Direction {
        if self.rng.gen_bool(0.5) {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    fn roll_speed(&mut self) -> i32 {
        self.rng.gen_range(1..=MAX_SPEED)
    }

    fn roll_x(&mut self, band: i32) -> i32 {
        self.rng.gen_range(0..100) + band
    }

    /// One row of obstacles at the current row offset, then moves the offset down a row.
    pub(crate) fn spawn_row(&mut self, kind: ObstacleKind, dir: Direction) -> Vec<Obstacle> {
        let y = self.row_y;
        let speed = self.roll_speed();
        let row = match kind {
            ObstacleKind::Truck => TRUCK_BANDS
                .iter()
                .map(|&band| {
                    let x = self.roll_x(band);
                    Obstacle::new(kind, Rect::new(x, y, TRUCK_SIZE, TRUCK_SIZE), speed, dir)
                })
                .collect(),
            ObstacleKind::Log => {
                let long_x = self.roll_x(0);
                let short_x = self.roll_x(SHORT_LOG_BAND);
                vec![
                    Obstacle::new(kind, Rect::new(long_x, y, LONG_LOG_W, LOG_H), speed, dir),
                    Obstacle::new(kind, Rect::new(short_x, y, SHORT_LOG_W, LOG_H), speed, dir),
                ]
            }
        };
        self.row_y += ROW_HEIGHT;
        row
    }

    /// The fixed recipe: river rows alternating direction, a safe median,
    /// then road rows with coin-flip directions.
    pub(crate) fn fill_board(&mut self) -> Board {
        self.reset_rows();

        let mut logs = Vec::with_capacity(LOG_ROWS * 2);
        let mut dir = Direction::Right;
        for _ in 0..LOG_ROWS {
            logs.extend(self.spawn_row(ObstacleKind::Log, dir));
            dir = dir.flipped();
        }

        self.row_y += MEDIAN_GAP;

        let mut trucks = Vec::with_capacity(TRUCK_ROWS * TRUCK_BANDS.len());
        for _ in 0..TRUCK_ROWS {
            let dir = self.random_direction();
            trucks.extend(self.spawn_row(ObstacleKind::Truck, dir));
        }

        Board { logs, trucks }
    }
}
