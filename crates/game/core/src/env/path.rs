//! Breadth-first shortest paths over passable cells.
//!
//! Actors are not obstacles here; brains check occupancy one step at a time
//! while walking a path.

use std::collections::{HashMap, VecDeque};

use super::Level;
use crate::state::Position;

impl Level {
    /// Returns the cells to walk from `from` to `to`, excluding `from` and
    /// including `to`, or `None` when `to` is unreachable.
    ///
    /// Movement is 8-connected. A path to the start position is empty.
    pub fn find_path(&self, from: Position, to: Position) -> Option<Vec<Position>> {
        if from == to {
            return Some(Vec::new());
        }
        if !self.is_passable(to) {
            return None;
        }

        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        came_from.insert(from, from);

        while let Some(current) = queue.pop_front() {
            if current == to {
                break;
            }
            for next in current.neighbours() {
                if came_from.contains_key(&next) || !self.is_passable(next) {
                    continue;
                }
                came_from.insert(next, current);
                queue.push_back(next);
            }
        }

        if !came_from.contains_key(&to) {
            return None;
        }

        let mut path = vec![to];
        let mut cursor = to;
        while let Some(&prev) = came_from.get(&cursor) {
            if prev == from {
                break;
            }
            path.push(prev);
            cursor = prev;
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_goes_around_walls() {
        let level = Level::from_ascii(&[
            ".....", //
            ".###.", //
            ".....",
        ])
        .unwrap();

        let path = level
            .find_path(Position::new(0, 1), Position::new(4, 1))
            .unwrap();

        assert_eq!(path.last(), Some(&Position::new(4, 1)));
        assert_eq!(path.len(), 4);
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
            assert!(level.is_passable(pair[1]));
        }
    }

    #[test]
    fn unreachable_goal_has_no_path() {
        let level = Level::from_ascii(&[".#.", ".#.", ".#."]).unwrap();
        assert!(level.find_path(Position::new(0, 0), Position::new(2, 2)).is_none());
    }

    #[test]
    fn path_to_self_is_empty() {
        let level = Level::from_ascii(&["..."]).unwrap();
        let here = Position::new(1, 0);
        assert_eq!(level.find_path(here, here), Some(Vec::new()));
    }
}
