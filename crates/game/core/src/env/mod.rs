//! Static environment: the level grid and paths across it.

mod map;
mod path;

pub use map::{BaseElement, Cell, Door, Level, MapDimensions, Shop};
