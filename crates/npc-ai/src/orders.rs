//! Order inbox shared by every brain.
//!
//! An order is a message from one actor to another. Issuing an order never
//! touches the target's brain: the order is queued here and the target drains
//! its own inbox at the start of its next turn, before arbitrating.

use std::collections::BTreeMap;

use game_core::{Directive, EntityId};

/// One queued order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub src: EntityId,
    pub directive: Directive,
}

impl Order {
    pub fn new(src: EntityId, directive: Directive) -> Self {
        Self { src, directive }
    }
}

/// Per-target order queues, keyed by the receiving actor.
#[derive(Clone, Debug, Default)]
pub struct OrderBoard {
    inboxes: BTreeMap<EntityId, Vec<Order>>,
}

impl OrderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `order` for `target`.
    pub fn post(&mut self, target: EntityId, order: Order) {
        self.inboxes.entry(target).or_default().push(order);
    }

    /// Orders waiting for `target`, oldest first.
    pub fn pending(&self, target: EntityId) -> &[Order] {
        self.inboxes.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removes and returns every order waiting for `target`, oldest first.
    pub fn drain(&mut self, target: EntityId) -> Vec<Order> {
        self.inboxes.remove(&target).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.inboxes.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_orders_in_post_order_and_empties_inbox() {
        let mut board = OrderBoard::new();
        let target = EntityId(3);
        board.post(target, Order::new(EntityId(1), Directive::MoveUntilEnemy { dx: 1, dy: 0 }));
        board.post(target, Order::new(EntityId(2), Directive::AttackActor { target: EntityId(9) }));

        assert_eq!(board.pending(target).len(), 2);
        let drained = board.drain(target);
        assert_eq!(drained[0].src, EntityId(1));
        assert_eq!(drained[1].src, EntityId(2));
        assert!(board.pending(target).is_empty());
        assert!(board.is_empty());
    }

    #[test]
    fn inboxes_are_per_target() {
        let mut board = OrderBoard::new();
        board.post(EntityId(1), Order::new(EntityId(5), Directive::MoveUntilEnemy { dx: 0, dy: 1 }));

        assert!(board.drain(EntityId(2)).is_empty());
        assert_eq!(board.pending(EntityId(1)).len(), 1);
    }
}
