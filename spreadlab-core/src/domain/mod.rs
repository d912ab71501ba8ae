//! Domain types for SpreadLab

pub mod bar;
pub mod direction;
pub mod intent;
pub mod position;

pub use bar::{leg_a, leg_b, PairBar};
pub use direction::Direction;
pub use intent::{OrderIntent, Sizing};
pub use position::LegPosition;
