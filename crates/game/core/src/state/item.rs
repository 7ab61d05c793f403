//! Items lying on the map or carried by actors.

use bitflags::bitflags;

use super::EntityId;

/// Unique identifier for an item instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

bitflags! {
    /// Tags attached to an item instance.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ItemTags: u8 {
        /// Shop merchandise that has not been paid for.
        const UNPAID = 1 << 0;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Base price in gold.
    pub value: u32,
    pub owner: Option<EntityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: ItemTags,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, value: u32) -> Self {
        Self {
            id,
            name: name.into(),
            value,
            owner: None,
            tags: ItemTags::empty(),
        }
    }

    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn unpaid(mut self) -> Self {
        self.tags.insert(ItemTags::UNPAID);
        self
    }

    pub fn is_unpaid(&self) -> bool {
        self.tags.contains(ItemTags::UNPAID)
    }

    /// An item is claimed when someone owns it or it is shop merchandise.
    pub fn is_claimed(&self) -> bool {
        self.owner.is_some() || self.is_unpaid()
    }
}
