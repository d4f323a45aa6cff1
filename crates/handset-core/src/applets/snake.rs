//! Snake on a 20x20 board.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::applets::{Applet, AppletContext, arg, unknown_command};
use crate::error::Result;
use crate::registry::AppId;

pub const BOARD_SIZE: i32 = 20;
const START: Cell = Cell { x: 10, y: 10 };
const FIRST_FOOD: Cell = Cell { x: 15, y: 15 };
const FOOD_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    fn on_board(self) -> bool {
        (0..BOARD_SIZE).contains(&self.x) && (0..BOARD_SIZE).contains(&self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeStatus {
    /// Board set up, waiting for start.
    Ready,
    Running,
    Paused,
    Over,
}

pub struct SnakeApplet {
    /// Head first.
    body: Vec<Cell>,
    food: Cell,
    direction: Direction,
    /// Direction of the last completed move; turns are checked against it.
    moved: Direction,
    status: SnakeStatus,
    score: u32,
    high_score: u32,
    rng: StdRng,
}

impl SnakeApplet {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            body: vec![START],
            food: FIRST_FOOD,
            direction: Direction::Right,
            moved: Direction::Right,
            status: SnakeStatus::Ready,
            score: 0,
            high_score: 0,
            rng,
        }
    }

    pub fn status(&self) -> SnakeStatus {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn body(&self) -> &[Cell] {
        &self.body
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    /// Put the board back to its initial layout without starting.
    pub fn reset(&mut self) {
        self.body = vec![START];
        self.food = FIRST_FOOD;
        self.direction = Direction::Right;
        self.moved = Direction::Right;
        self.score = 0;
        self.status = SnakeStatus::Ready;
    }

    /// Start a fresh game moving right.
    pub fn start(&mut self) {
        self.reset();
        self.status = SnakeStatus::Running;
    }

    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            SnakeStatus::Running => SnakeStatus::Paused,
            SnakeStatus::Paused => SnakeStatus::Running,
            other => other,
        };
    }

    /// Change heading. Reversing onto the body is ignored, as is any turn
    /// while the game is not running.
    pub fn turn(&mut self, dir: Direction) {
        if self.status != SnakeStatus::Running {
            return;
        }
        if dir != self.moved.opposite() {
            self.direction = dir;
        }
    }

    /// Advance one step.
    pub fn tick(&mut self) {
        if self.status != SnakeStatus::Running {
            return;
        }
        let head = self.head().step(self.direction);
        if !head.on_board() || self.body.contains(&head) {
            self.status = SnakeStatus::Over;
            log::debug!("Snake over with score {}", self.score);
            return;
        }
        self.body.insert(0, head);
        self.moved = self.direction;
        if head == self.food {
            self.score += FOOD_POINTS;
            self.high_score = self.high_score.max(self.score);
            match self.free_cell() {
                Some(cell) => self.food = cell,
                None => self.status = SnakeStatus::Over,
            }
        } else {
            self.body.pop();
        }
    }

    fn free_cell(&mut self) -> Option<Cell> {
        let free: Vec<Cell> = (0..BOARD_SIZE)
            .flat_map(|y| (0..BOARD_SIZE).map(move |x| Cell { x, y }))
            .filter(|c| !self.body.contains(c))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.gen_range(0..free.len())])
    }
}

impl Applet for SnakeApplet {
    fn id(&self) -> AppId {
        AppId::Snake
    }

    fn handle(&mut self, command: &str, args: &[&str], _cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "start" => self.start(),
            "reset" => self.reset(),
            "pause" | "resume" => self.toggle_pause(),
            "up" => self.turn(Direction::Up),
            "down" => self.turn(Direction::Down),
            "left" => self.turn(Direction::Left),
            "right" => self.turn(Direction::Right),
            "tick" => {
                let steps: u32 = if args.is_empty() {
                    1
                } else {
                    arg(args, 0, "step count")?
                };
                for _ in 0..steps {
                    self.tick();
                }
            },
            other => return Err(unknown_command(self.id(), other)),
        }
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Score {}  High {}  {:?}",
            self.score, self.high_score, self.status
        )];
        for y in 0..BOARD_SIZE {
            let row: String = (0..BOARD_SIZE)
                .map(|x| {
                    let cell = Cell { x, y };
                    if cell == self.head() {
                        '@'
                    } else if self.body.contains(&cell) {
                        'o'
                    } else if cell == self.food {
                        '*'
                    } else {
                        '.'
                    }
                })
                .collect();
            lines.push(row);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> SnakeApplet {
        let mut s = SnakeApplet::new(Some(7));
        s.start();
        s
    }

    #[test]
    fn initial_layout() {
        let s = SnakeApplet::new(Some(1));
        assert_eq!(s.head(), Cell { x: 10, y: 10 });
        assert_eq!(s.food(), Cell { x: 15, y: 15 });
        assert_eq!(s.status(), SnakeStatus::Ready);
    }

    #[test]
    fn ticks_ignored_until_start() {
        let mut s = SnakeApplet::new(Some(1));
        s.tick();
        assert_eq!(s.head(), START);
    }

    #[test]
    fn moves_right_after_start() {
        let mut s = running();
        s.tick();
        assert_eq!(s.head(), Cell { x: 11, y: 10 });
        assert_eq!(s.body().len(), 1);
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut s = running();
        for _ in 0..5 {
            s.tick();
        }
        s.turn(Direction::Down);
        for _ in 0..5 {
            s.tick();
        }
        assert_eq!(s.head(), FIRST_FOOD);
        assert_eq!(s.score(), 10);
        assert_eq!(s.high_score(), 10);
        assert_eq!(s.body().len(), 2);
        assert_ne!(s.food(), FIRST_FOOD);
        assert!(!s.body().contains(&s.food()));
    }

    #[test]
    fn reverse_turn_ignored() {
        let mut s = running();
        s.tick();
        s.turn(Direction::Left);
        s.tick();
        assert_eq!(s.head(), Cell { x: 12, y: 10 });
    }

    #[test]
    fn double_turn_cannot_reverse() {
        let mut s = running();
        s.tick();
        s.turn(Direction::Up);
        s.turn(Direction::Left);
        s.tick();
        assert_eq!(s.head(), Cell { x: 11, y: 9 });
    }

    #[test]
    fn wall_ends_game() {
        let mut s = running();
        for _ in 0..9 {
            s.tick();
        }
        assert_eq!(s.status(), SnakeStatus::Running);
        assert_eq!(s.head().x, 19);
        s.tick();
        assert_eq!(s.status(), SnakeStatus::Over);
        let head = s.head();
        s.tick();
        assert_eq!(s.head(), head);
    }

    #[test]
    fn pause_freezes_board() {
        let mut s = running();
        s.toggle_pause();
        s.tick();
        assert_eq!(s.head(), START);
        s.toggle_pause();
        s.tick();
        assert_eq!(s.head(), Cell { x: 11, y: 10 });
    }

    #[test]
    fn high_score_survives_restart() {
        let mut s = running();
        for _ in 0..5 {
            s.tick();
        }
        s.turn(Direction::Down);
        for _ in 0..5 {
            s.tick();
        }
        s.start();
        assert_eq!(s.score(), 0);
        assert_eq!(s.high_score(), 10);
    }

    #[test]
    fn view_draws_board() {
        let s = SnakeApplet::new(Some(3));
        let view = s.view();
        assert_eq!(view.len(), 1 + BOARD_SIZE as usize);
        assert_eq!(view[11].chars().nth(10), Some('@'));
        assert_eq!(view[16].chars().nth(15), Some('*'));
    }
}
