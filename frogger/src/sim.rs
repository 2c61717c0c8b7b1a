use crate::model::{
    bottom_bar, in_river, ramp_speed, top_bar, ClampMode, Death, GameSession, Phase, FIELD_H,
    FIELD_W, MOVE_STEP,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Up,
    Down,
    Left,
    Right,
    Pause,
    Restart,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Signal {
    Continue,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GameEvent {
    Paused,
    Resumed,
    Died(Death),
    LevelCleared { level: u32 },
    Restarted,
}

#[derive(Debug)]
pub(crate) struct StepReport {
    pub(crate) signal: Signal,
    pub(crate) events: Vec<GameEvent>,
}

impl StepReport {
    fn new() -> Self {
        Self {
            signal: Signal::Continue,
            events: Vec::new(),
        }
    }
}

impl GameSession {
    /// Advances the game by one frame given the input drained for that frame.
    pub(crate) fn step(&mut self, actions: &[Action]) -> StepReport {
        let mut report = StepReport::new();

        // ride the log first so a key press can still move off it this frame
        if self.phase == Phase::Running {
            if let Some(v) = self.carrying_log().map(|log| log.velocity()) {
                self.player.x += v;
            }
        }

        for &action in actions {
            match (self.phase, action) {
                (_, Action::Quit) => {
                    report.signal = Signal::Stop;
                    return report;
                }
                (Phase::Running, Action::Up) => self.player.y -= MOVE_STEP,
                (Phase::Running, Action::Down) => self.player.y += MOVE_STEP,
                (Phase::Running, Action::Left) => self.player.x -= MOVE_STEP,
                (Phase::Running, Action::Right) => self.player.x += MOVE_STEP,
                (Phase::Running, Action::Pause) if self.rules.pause_enabled => {
                    self.phase = Phase::Paused;
                    report.events.push(GameEvent::Paused);
                }
                (Phase::Paused, Action::Pause) => {
                    self.phase = Phase::Running;
                    report.events.push(GameEvent::Resumed);
                }
                (Phase::GameOver(_), Action::Restart) => {
                    self.restart();
                    report.events.push(GameEvent::Restarted);
                }
                _ => {}
            }
        }

        if self.phase != Phase::Running {
            return report;
        }

        for o in self.trucks.iter_mut().chain(self.logs.iter_mut()) {
            o.advance(FIELD_W);
        }

        let player = self.player;
        let hit = self
            .trucks
            .iter()
            .chain(&self.logs)
            .any(|o| !o.passable() && o.rect.collides(&player));
        if hit {
            self.die(Death::Hit, &mut report);
            return report;
        }

        self.carry = self.logs.iter().position(|l| l.rect.collides(&player));

        if self.carry.is_none() && in_river(self.player.y) {
            self.die(Death::Drowned, &mut report);
            return report;
        }

        self.clamp_player();

        if self.player.y <= top_bar().bottom() {
            self.advance_level();
            report.events.push(GameEvent::LevelCleared { level: self.level });
        }

        report
    }

    fn die(&mut self, death: Death, report: &mut StepReport) {
        self.phase = Phase::GameOver(death);
        self.carry = None;
        report.events.push(GameEvent::Died(death));
    }

    /// Pulls the player back onto the field.
    pub(crate) fn clamp_player(&mut self) {
        let max_x = FIELD_W - self.player.w;
        let low = self.player.y > FIELD_H;
        let left = self.player.x < 0;
        let right = self.player.x > max_x;

        match self.rules.clamp {
            ClampMode::Exclusive => {
                if low {
                    self.player.y = FIELD_H - bottom_bar().h;
                } else if left {
                    self.player.x = 0;
                } else if right {
                    self.player.x = max_x;
                }
            }
            ClampMode::Independent => {
                if low {
                    self.player.y = FIELD_H - bottom_bar().h;
                }
                if left {
                    self.player.x = 0;
                }
                if right {
                    self.player.x = max_x;
                }
            }
        }
    }

    /// Respawns every row with each obstacle's predecessor speed ramped up.
    pub(crate) fn advance_level(&mut self) {
        let truck_speeds: Vec<i32> = self.trucks.iter().map(|o| o.speed).collect();
        let log_speeds: Vec<i32> = self.logs.iter().map(|o| o.speed).collect();

        let board = self.spawner.fill_board();
        self.trucks = board.trucks;
        self.logs = board.logs;

        for (o, old) in self.trucks.iter_mut().zip(truck_speeds) {
            o.speed = ramp_speed(old);
        }
        for (o, old) in self.logs.iter_mut().zip(log_speeds) {
            o.speed = ramp_speed(old);
        }

        self.carry = None;
        self.reset_player();
        self.level += 1;
    }

    /// Back to a fresh level-zero board with unramped speeds.
    pub(crate) fn restart(&mut self) {
        self.trucks.clear();
        self.logs.clear();
        self.spawner.reset_rows();

        let board = self.spawner.fill_board();
        self.trucks = board.trucks;
        self.logs = board.logs;

        self.carry = None;
        self.reset_player();
        self.level = 0;
        self.phase = Phase::Running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Direction, Rect};
    use crate::model::{player_start, Obstacle, ObstacleKind, Rules, FIRST_ROW_Y};
    use crate::spawner::{LOG_ROWS, TRUCK_ROWS};

    fn empty_session(rules: Rules) -> GameSession {
        let mut s = GameSession::new(1234, rules);
        s.trucks.clear();
        s.logs.clear();
        s
    }

    fn truck(x: i32, y: i32, speed: i32, dir: Direction) -> Obstacle {
        Obstacle::new(ObstacleKind::Truck, Rect::new(x, y, 20, 20), speed, dir)
    }

    fn log(x: i32, y: i32, w: i32, speed: i32, dir: Direction) -> Obstacle {
        Obstacle::new(ObstacleKind::Log, Rect::new(x, y, w, 20), speed, dir)
    }

    #[test]
    fn test_moves_step_by_25() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(40, 300, 20, 15);
        s.step(&[Action::Right, Action::Right, Action::Right]);
        assert_eq!(s.player.x, 40 + 3 * MOVE_STEP);
        s.step(&[Action::Up]);
        assert_eq!(s.player.y, 300 - MOVE_STEP);
        s.step(&[Action::Down, Action::Left]);
        assert_eq!((s.player.x, s.player.y), (40 + 2 * MOVE_STEP, 300));
        assert_eq!(s.phase, Phase::Running);
    }

    #[test]
    fn test_right_moves_clamp_at_field_edge() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(140, 300, 20, 15);
        for _ in 0..10 {
            s.step(&[Action::Right]);
        }
        assert_eq!(s.player.x, FIELD_W - s.player.w);
    }

    #[test]
    fn test_left_moves_clamp_at_zero() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(10, 300, 20, 15);
        s.step(&[Action::Left]);
        assert_eq!(s.player.x, 0);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let single_axis = [
            Rect::new(-40, 300, 20, 15),
            Rect::new(FIELD_W + 5, 300, 20, 15),
            Rect::new(140, FIELD_H + 10, 20, 15),
        ];
        for clamp in [ClampMode::Exclusive, ClampMode::Independent] {
            let rules = Rules {
                clamp,
                ..Rules::default()
            };
            for start in single_axis {
                let mut s = empty_session(rules);
                s.player = start;
                s.clamp_player();
                let once = s.player;
                s.clamp_player();
                assert_eq!(s.player, once, "{clamp:?} from {start:?}");
            }
        }

        let rules = Rules {
            clamp: ClampMode::Independent,
            ..Rules::default()
        };
        let mut s = empty_session(rules);
        s.player = Rect::new(-40, FIELD_H + 10, 20, 15);
        s.clamp_player();
        let once = s.player;
        s.clamp_player();
        assert_eq!(s.player, once);
    }

    #[test]
    fn test_exclusive_clamp_fixes_one_bound_per_call() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(-40, FIELD_H + 10, 20, 15);
        s.clamp_player();
        assert_eq!(s.player.y, FIELD_H - bottom_bar().h);
        assert_eq!(s.player.x, -40);
        s.clamp_player();
        assert_eq!(s.player.x, 0);
    }

    #[test]
    fn test_independent_clamp_fixes_all_bounds() {
        let rules = Rules {
            clamp: ClampMode::Independent,
            ..Rules::default()
        };
        let mut s = empty_session(rules);
        s.player = Rect::new(FIELD_W + 30, FIELD_H + 10, 20, 15);
        s.clamp_player();
        assert_eq!(
            (s.player.x, s.player.y),
            (FIELD_W - 20, FIELD_H - bottom_bar().h)
        );
    }

    #[test]
    fn test_safe_ground_does_not_drown() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(140, 300, 20, 15);
        let r = s.step(&[]);
        assert!(r.events.is_empty());
        assert_eq!(s.phase, Phase::Running);
    }

    #[test]
    fn test_river_without_log_drowns_once() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(140, 100, 20, 15);
        let r = s.step(&[]);
        assert_eq!(r.events, vec![GameEvent::Died(Death::Drowned)]);
        assert_eq!(s.phase, Phase::GameOver(Death::Drowned));

        let r = s.step(&[]);
        assert!(r.events.is_empty());
        let r = s.step(&[Action::Up, Action::Left]);
        assert!(r.events.is_empty());
        assert_eq!(s.player, Rect::new(140, 100, 20, 15));
    }

    #[test]
    fn test_touching_truck_is_fatal() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(100, 300, 20, 15);
        // stationary truck whose left edge meets the player's right edge
        s.trucks.push(truck(120, 300, 0, Direction::Left));
        let r = s.step(&[]);
        assert_eq!(r.events, vec![GameEvent::Died(Death::Hit)]);
    }

    #[test]
    fn test_only_impassable_obstacles_kill() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(100, 300, 20, 15);
        s.logs.push(log(100, 300, 40, 0, Direction::Right));
        let r = s.step(&[]);
        assert!(r.events.is_empty());
        assert_eq!(s.phase, Phase::Running);
        assert_eq!(s.carry, Some(0));

        s.trucks.push(truck(110, 300, 0, Direction::Right));
        s.step(&[]);
        assert_eq!(s.phase, Phase::GameOver(Death::Hit));
    }

    #[test]
    fn test_collision_is_checked_after_motion() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(100, 300, 20, 15);
        s.trucks.push(truck(123, 300, 3, Direction::Left));
        let r = s.step(&[]);
        assert_eq!(s.phase, Phase::GameOver(Death::Hit));
        assert_eq!(r.events.len(), 1);
    }

    #[test]
    fn test_log_in_river_saves_and_carries() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(100, 105, 20, 15);
        s.logs.push(log(40, 100, 40, 0, Direction::Right));
        s.logs.push(log(90, 100, 40, 2, Direction::Right));

        s.step(&[]);
        assert_eq!(s.phase, Phase::Running);
        assert_eq!(s.carry, Some(1));

        // next frame the player rides along before anything else
        let x = s.player.x;
        s.step(&[]);
        assert_eq!(s.player.x, x + 2);
        assert_eq!(s.carry, Some(1));
    }

    #[test]
    fn test_first_overlapping_log_wins() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(100, 105, 20, 15);
        s.logs.push(log(80, 100, 40, 0, Direction::Left));
        s.logs.push(log(110, 100, 40, 0, Direction::Right));
        s.step(&[]);
        assert_eq!(s.carry, Some(0));
    }

    #[test]
    fn test_carry_and_key_apply_same_frame() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(100, 105, 20, 15);
        s.logs.push(log(60, 100, 100, 3, Direction::Left));
        s.step(&[]);
        assert_eq!(s.carry, Some(0));

        s.step(&[Action::Right]);
        assert_eq!(s.player.x, 100 - 3 + MOVE_STEP);
    }

    #[test]
    fn test_jumping_onto_log_exempts_from_drowning() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(140, 230, 20, 15);
        s.logs.push(log(120, 200, 40, 1, Direction::Right));
        let r = s.step(&[Action::Up]);
        assert!(r.events.is_empty());
        assert_eq!(s.player.y, 205);
        assert_eq!(s.carry, Some(0));
    }

    #[test]
    fn test_leaving_log_into_river_drowns() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(100, 105, 20, 15);
        s.logs.push(log(90, 100, 40, 0, Direction::Right));
        s.step(&[]);
        assert_eq!(s.carry, Some(0));

        let r = s.step(&[Action::Right, Action::Right]);
        assert_eq!(r.events, vec![GameEvent::Died(Death::Drowned)]);
        assert_eq!(s.carry, None);
    }

    #[test]
    fn test_reaching_top_bar_clears_level() {
        let mut s = GameSession::new(77, Rules::default());
        let trucks_before: Vec<i32> = s.trucks.iter().map(|o| o.speed).collect();
        let logs_before: Vec<i32> = s.logs.iter().map(|o| o.speed).collect();
        s.player = Rect::new(140, 30, 20, 15);
        // keep the way clear so only the level clear matters
        s.trucks.iter_mut().for_each(|t| t.rect.y += 1000);
        s.logs.push(log(0, 0, FIELD_W, 0, Direction::Right));

        let r = s.step(&[Action::Up]);
        assert_eq!(r.events, vec![GameEvent::LevelCleared { level: 1 }]);
        assert_eq!(s.level, 1);
        assert_eq!(s.player, player_start());
        assert_eq!(s.carry, None);

        assert_eq!(s.logs.len(), LOG_ROWS * 2);
        assert_eq!(s.trucks.len(), TRUCK_ROWS * 3);
        assert_eq!(s.logs[0].rect.y, FIRST_ROW_Y);

        let trucks_after: Vec<i32> = s.trucks.iter().map(|o| o.speed).collect();
        let logs_after: Vec<i32> = s.logs.iter().map(|o| o.speed).collect();
        let ramped = |v: &[i32]| v.iter().map(|&x| ramp_speed(x)).collect::<Vec<_>>();
        assert_eq!(trucks_after, ramped(&trucks_before));
        assert_eq!(logs_after, ramped(&logs_before));
        assert!(trucks_after.iter().zip(&trucks_before).all(|(a, b)| a > b));
    }

    #[test]
    fn test_restart_only_from_game_over() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(40, 300, 20, 15);
        let r = s.step(&[Action::Restart]);
        assert!(r.events.is_empty());
        assert_eq!(s.player.x, 40);
        assert!(s.logs.is_empty());
    }

    #[test]
    fn test_restart_resets_speeds_and_level() {
        let mut s = GameSession::new(5, Rules::default());
        for _ in 0..4 {
            s.advance_level();
        }
        assert_eq!(s.level, 4);
        assert!(s.trucks.iter().all(|o| o.speed > 3));

        s.phase = Phase::GameOver(Death::Hit);
        let r = s.step(&[Action::Restart]);
        assert_eq!(r.events[0], GameEvent::Restarted);
        assert_eq!(s.level, 0);
        assert_eq!(s.player, player_start());
        assert!(s.trucks.iter().chain(&s.logs).all(|o| (1..=3).contains(&o.speed)));
        assert_eq!(s.trucks.len(), TRUCK_ROWS * 3);
        assert_eq!(s.logs.len(), LOG_ROWS * 2);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut s = empty_session(Rules::default());
        s.player = Rect::new(140, 300, 20, 15);
        s.trucks.push(truck(0, 400, 2, Direction::Right));

        let r = s.step(&[Action::Pause]);
        assert_eq!(r.events, vec![GameEvent::Paused]);
        assert_eq!(s.trucks[0].rect.x, 0);

        s.step(&[Action::Left, Action::Up]);
        assert_eq!(s.player, Rect::new(140, 300, 20, 15));
        assert_eq!(s.trucks[0].rect.x, 0);

        let r = s.step(&[Action::Pause]);
        assert_eq!(r.events, vec![GameEvent::Resumed]);
        assert_eq!(s.trucks[0].rect.x, 2);
    }

    #[test]
    fn test_pause_disabled_variant_ignores_key() {
        let rules = Rules {
            pause_enabled: false,
            ..Rules::default()
        };
        let mut s = empty_session(rules);
        s.trucks.push(truck(0, 400, 2, Direction::Right));
        let r = s.step(&[Action::Pause]);
        assert!(r.events.is_empty());
        assert_eq!(s.phase, Phase::Running);
        assert_eq!(s.trucks[0].rect.x, 2);
    }

    #[test]
    fn test_quit_stops_from_any_phase() {
        for phase in [Phase::Running, Phase::Paused, Phase::GameOver(Death::Hit)] {
            let mut s = empty_session(Rules::default());
            s.phase = phase;
            let r = s.step(&[Action::Quit, Action::Restart]);
            assert_eq!(r.signal, Signal::Stop);
            assert_eq!(s.phase, phase);
        }
    }
}
