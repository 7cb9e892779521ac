//! Logical keys and movement directions.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;

/// A platform-independent key MouseKeys reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogicalKey {
    /// Switches MouseKeys on and off.
    Toggle,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    DiagUpLeft,
    DiagUpRight,
    DiagDownLeft,
    DiagDownRight,
    /// Held: left button stays down (drag).
    LeftClick,
    RightClick,
    MiddleClick,
    ScrollUp,
    ScrollDown,
    /// Any key without a MouseKeys meaning.
    #[default]
    Unknown,
}

impl LogicalKey {
    /// Every logical key except `Unknown`, in binding-table order.
    pub const ALL: [LogicalKey; 14] = [
        LogicalKey::Toggle,
        LogicalKey::MoveUp,
        LogicalKey::MoveDown,
        LogicalKey::MoveLeft,
        LogicalKey::MoveRight,
        LogicalKey::DiagUpLeft,
        LogicalKey::DiagUpRight,
        LogicalKey::DiagDownLeft,
        LogicalKey::DiagDownRight,
        LogicalKey::LeftClick,
        LogicalKey::RightClick,
        LogicalKey::MiddleClick,
        LogicalKey::ScrollUp,
        LogicalKey::ScrollDown,
    ];

    /// The movement direction for one of the eight directional keys.
    pub fn direction(self) -> Option<Direction> {
        match self {
            LogicalKey::MoveUp => Some(Direction::Up),
            LogicalKey::MoveDown => Some(Direction::Down),
            LogicalKey::MoveLeft => Some(Direction::Left),
            LogicalKey::MoveRight => Some(Direction::Right),
            LogicalKey::DiagUpLeft => Some(Direction::UpLeft),
            LogicalKey::DiagUpRight => Some(Direction::UpRight),
            LogicalKey::DiagDownLeft => Some(Direction::DownLeft),
            LogicalKey::DiagDownRight => Some(Direction::DownRight),
            _ => None,
        }
    }

    pub fn is_directional(self) -> bool {
        self.direction().is_some()
    }

    /// Keys that act once on press and ignore their release.
    pub fn is_one_shot(self) -> bool {
        matches!(
            self,
            LogicalKey::RightClick
                | LogicalKey::MiddleClick
                | LogicalKey::ScrollUp
                | LogicalKey::ScrollDown
        )
    }

    pub fn is_known(self) -> bool {
        self != LogicalKey::Unknown
    }
}

/// One of the eight movement directions. Screen coordinates: +y is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// Contribution of this key to the raw input vector. Cardinal keys are
    /// unit length on their axis; diagonal keys are unit length split evenly
    /// over both axes.
    pub fn vector(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::UpLeft => (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            Direction::UpRight => (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            Direction::DownLeft => (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            Direction::DownRight => (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
        }
    }

    pub fn key(self) -> LogicalKey {
        match self {
            Direction::Up => LogicalKey::MoveUp,
            Direction::Down => LogicalKey::MoveDown,
            Direction::Left => LogicalKey::MoveLeft,
            Direction::Right => LogicalKey::MoveRight,
            Direction::UpLeft => LogicalKey::DiagUpLeft,
            Direction::UpRight => LogicalKey::DiagUpRight,
            Direction::DownLeft => LogicalKey::DiagDownLeft,
            Direction::DownRight => LogicalKey::DiagDownRight,
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of currently held movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const EMPTY: DirectionSet = DirectionSet(0);

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !direction.bit();
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.contains(*d))
    }

    /// Sum of the held directions' vectors. Opposite keys cancel out.
    pub fn input_vector(&self) -> (f64, f64) {
        self.iter().fold((0.0, 0.0), |(x, y), d| {
            let (dx, dy) = d.vector();
            (x + dx, y + dy)
        })
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::EMPTY;
        for d in iter {
            set.insert(d);
        }
        set
    }
}
