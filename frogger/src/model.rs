use crate::geom::{Direction, Rect};
use crate::spawner::Spawner;

pub(crate) const FIELD_W: i32 = 300;
pub(crate) const FIELD_H: i32 = 500;
pub(crate) const BAR_H: i32 = 20;

pub(crate) const MOVE_STEP: i32 = 25;
pub(crate) const ROW_HEIGHT: i32 = 25;
pub(crate) const FIRST_ROW_Y: i32 = 50;
pub(crate) const MEDIAN_GAP: i32 = 50; // grass between river and road

pub(crate) const PLAYER_W: i32 = 20;
pub(crate) const PLAYER_H: i32 = 15;

// river band, both ends exclusive
pub(crate) const RIVER_TOP: i32 = 45;
pub(crate) const RIVER_BOTTOM: i32 = 224;

// speed ramp per cleared level: x6/5, rounded up
pub(crate) const RAMP_NUM: i32 = 6;
pub(crate) const RAMP_DEN: i32 = 5;

pub(crate) fn backdrop() -> Rect {
    Rect::new(0, 0, FIELD_W, FIELD_H)
}

pub(crate) fn top_bar() -> Rect {
    Rect::new(0, 0, FIELD_W, BAR_H)
}

pub(crate) fn bottom_bar() -> Rect {
    Rect::new(0, FIELD_H - BAR_H, FIELD_W, BAR_H)
}

pub(crate) fn player_start() -> Rect {
    Rect::new(
        FIELD_W / 2 - PLAYER_W / 2,
        FIELD_H - bottom_bar().h,
        PLAYER_W,
        PLAYER_H,
    )
}

pub(crate) fn in_river(y: i32) -> bool {
    y > RIVER_TOP && y < RIVER_BOTTOM
}

// Rounded up so slow rows speed up too; truncating x1.2 would leave 1..=3 unchanged.
pub(crate) fn ramp_speed(speed: i32) -> i32 {
    (speed * RAMP_NUM + RAMP_DEN - 1) / RAMP_DEN
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ObstacleKind {
    Truck,
    Log,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Obstacle {
    pub(crate) kind: ObstacleKind,
    pub(crate) rect: Rect,
    pub(crate) speed: i32, // px per frame
    pub(crate) dir: Direction,
}

impl Obstacle {
    pub(crate) fn new(kind: ObstacleKind, rect: Rect, speed: i32, dir: Direction) -> Self {
        Self {
            kind,
            rect,
            speed,
            dir,
        }
    }

    /// Logs can be ridden, trucks kill.
    pub(crate) fn passable(&self) -> bool {
        self.kind == ObstacleKind::Log
    }

    pub(crate) fn velocity(&self) -> i32 {
        self.dir.sign() * self.speed
    }

    /// One frame of motion. An obstacle that has fully left the field
    /// re-enters from the opposite side, fully visible.
    pub(crate) fn advance(&mut self, field_w: i32) {
        self.rect.x += self.velocity();
        match self.dir {
            Direction::Right => {
                if self.rect.x >= field_w {
                    self.rect.x = 0;
                }
            }
            Direction::Left => {
                if self.rect.right() <= 0 {
                    self.rect.x = field_w - self.rect.w;
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Death {
    Hit,
    Drowned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Running,
    Paused,
    GameOver(Death),
}

/// How the off-field clamp treats several violated bounds in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClampMode {
    /// First violated bound only (y below field, then x < 0, then x too far right).
    Exclusive,
    /// Every violated bound.
    Independent,
}

/// Rule differences between the game's iterations.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Rules {
    pub(crate) pause_enabled: bool,
    pub(crate) clamp: ClampMode,
    pub(crate) player_under_obstacles: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            pause_enabled: true,
            clamp: ClampMode::Exclusive,
            player_under_obstacles: false,
        }
    }
}

pub(crate) struct GameSession {
    pub(crate) player: Rect,
    pub(crate) trucks: Vec<Obstacle>,
    pub(crate) logs: Vec<Obstacle>,
    /// Index into `logs` of the log carrying the player, recomputed every frame.
    pub(crate) carry: Option<usize>,
    pub(crate) phase: Phase,
    pub(crate) level: u32,
    pub(crate) spawner: Spawner,
    pub(crate) rules: Rules,
}

impl GameSession {
    pub(crate) fn new(seed: u64, rules: Rules) -> Self {
        let mut spawner = Spawner::new(seed);
        let board = spawner.fill_board();
        Self {
            player: player_start(),
            trucks: board.trucks,
            logs: board.logs,
            carry: None,
            phase: Phase::Running,
            level: 0,
            spawner,
            rules,
        }
    }

    pub(crate) fn reset_player(&mut self) {
        self.player = player_start();
    }

    pub(crate) fn carrying_log(&self) -> Option<&Obstacle> {
        self.carry.and_then(|i| self.logs.get(i))
    }
}
