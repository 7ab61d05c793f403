//! Level grid: dimensions, cells and the elements placed on them.

use crate::error::WorldError;
use crate::state::{EntityId, Item, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    /// Geometric center `(cols / 2, rows / 2)`.
    pub fn center(&self) -> Position {
        Position::new((self.width / 2) as i32, (self.height / 2) as i32)
    }
}

/// Base element of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaseElement {
    Floor,
    /// Floor inside a house.
    HouseFloor,
    /// Floor inside a shop.
    ShopFloor,
    Wall,
    Water,
}

impl BaseElement {
    pub fn is_passable(self) -> bool {
        matches!(
            self,
            BaseElement::Floor | BaseElement::HouseFloor | BaseElement::ShopFloor
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Door {
    pub closed: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shop {
    pub keeper: Option<EntityId>,
    /// Abandoned shops no longer trade.
    pub abandoned: bool,
}

impl Shop {
    pub fn is_active(&self) -> bool {
        !self.abandoned
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub base: BaseElement,
    pub door: Option<Door>,
    pub shop: Option<Shop>,
    pub items: Vec<Item>,
}

impl Cell {
    pub fn new(base: BaseElement) -> Self {
        Self {
            base,
            door: None,
            shop: None,
            items: Vec::new(),
        }
    }

    pub fn has_door(&self) -> bool {
        self.door.is_some()
    }

    pub fn has_shop(&self) -> bool {
        self.shop.is_some()
    }

    pub fn shop(&self) -> Option<&Shop> {
        self.shop.as_ref()
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_house_floor(&self) -> bool {
        self.base == BaseElement::HouseFloor
    }

    /// Doors open on contact, so a door never blocks movement.
    pub fn is_passable(&self) -> bool {
        self.base.is_passable() || self.has_door()
    }
}

/// Rectangular level of cells stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    dimensions: MapDimensions,
    cells: Vec<Cell>,
}

impl Level {
    /// Creates a level with every cell set to `fill`.
    pub fn new(dimensions: MapDimensions, fill: BaseElement) -> Self {
        let len = (dimensions.width * dimensions.height) as usize;
        Self {
            dimensions,
            cells: vec![Cell::new(fill); len],
        }
    }

    /// Parses a level from text rows.
    ///
    /// Legend: `#` wall, `.` floor, `,` house floor, `+` door, `$` shop floor,
    /// `~` water. Every row must have the same width.
    pub fn from_ascii<S: AsRef<str>>(rows: &[S]) -> Result<Self, WorldError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
        if width == 0 {
            return Err(WorldError::EmptyLevel);
        }

        let dimensions = MapDimensions::new(width as u32, height as u32);
        let mut level = Self::new(dimensions, BaseElement::Floor);

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(WorldError::RaggedRow { row: y, expected: width });
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell = match glyph {
                    '#' => Cell::new(BaseElement::Wall),
                    '.' => Cell::new(BaseElement::Floor),
                    ',' => Cell::new(BaseElement::HouseFloor),
                    '~' => Cell::new(BaseElement::Water),
                    '+' => Cell {
                        door: Some(Door::default()),
                        ..Cell::new(BaseElement::Floor)
                    },
                    '$' => Cell {
                        shop: Some(Shop::default()),
                        ..Cell::new(BaseElement::ShopFloor)
                    },
                    other => {
                        return Err(WorldError::UnknownGlyph { glyph: other, x, y });
                    }
                };
                let index = y * width + x;
                level.cells[index] = cell;
            }
        }

        Ok(level)
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    pub fn cols(&self) -> u32 {
        self.dimensions.width
    }

    pub fn rows(&self) -> u32 {
        self.dimensions.height
    }

    pub fn contains(&self, position: Position) -> bool {
        self.dimensions.contains(position)
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.dimensions.width as usize + position.x as usize)
    }

    pub fn cell(&self, position: Position) -> Option<&Cell> {
        self.index(position).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, position: Position) -> Option<&mut Cell> {
        self.index(position).map(move |i| &mut self.cells[i])
    }

    pub fn is_passable(&self, position: Position) -> bool {
        self.cell(position).is_some_and(Cell::is_passable)
    }

    pub fn add_item(&mut self, position: Position, item: Item) -> Result<(), WorldError> {
        let cell = self
            .cell_mut(position)
            .ok_or(WorldError::OutOfBounds(position))?;
        cell.items.push(item);
        Ok(())
    }

    /// Replaces the shop element at `position`.
    pub fn set_shop(&mut self, position: Position, shop: Shop) -> Result<(), WorldError> {
        let cell = self
            .cell_mut(position)
            .ok_or(WorldError::OutOfBounds(position))?;
        cell.shop = Some(shop);
        Ok(())
    }

    /// Iterates every position of the level, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.dimensions.width as i32;
        let height = self.dimensions.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }
}
