//! Inventory module
//!
//! This module handles container storage and operations:
//! - Fixed-capacity slot storage
//! - Add and remove operations with stacking
//! - Slot management (set, swap, clear)
//! - Change notification through an injected [`SlotObserver`]
//!
//! Every mutation that changes a slot notifies the observer synchronously,
//! while the container lock is still held, so notifications for one
//! container are delivered in mutation order. Observers must not call back
//! into the same inventory.

use parking_lot::Mutex;
use thiserror::Error;

use crate::game::item::ItemStack;

/// Number of slots of the main player inventory
pub const MAIN_INVENTORY_SIZE: usize = 36;

/// Number of slots of the off-hand inventory
pub const OFF_HAND_SIZE: usize = 1;

/// Receives slot changes of an inventory
pub trait SlotObserver: Send + Sync {
    /// Called after `slot` changed to `stack`
    fn slot_changed(&self, slot: usize, stack: &ItemStack);
}

impl<F> SlotObserver for F
where
    F: Fn(usize, &ItemStack) + Send + Sync,
{
    fn slot_changed(&self, slot: usize, stack: &ItemStack) {
        self(slot, stack)
    }
}

/// Inventory operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Not everything fit; `remaining` items were not added
    #[error("Inventory is full, {remaining} items could not be added")]
    InventoryFull { remaining: u32 },
    /// Invalid slot index
    #[error("Invalid inventory slot {slot} (size {size})")]
    InvalidSlot { slot: usize, size: usize },
    /// Not enough of the item
    #[error("Not enough of that item")]
    InsufficientItems,
}

/// A fixed-capacity container of item stacks
pub struct Inventory {
    slots: Mutex<Vec<ItemStack>>,
    observer: Box<dyn SlotObserver>,
}

impl Inventory {
    /// Create a new empty inventory with the given capacity
    pub fn new(size: usize, observer: impl SlotObserver + 'static) -> Self {
        Self {
            slots: Mutex::new(vec![ItemStack::empty(); size]),
            observer: Box::new(observer),
        }
    }

    /// Create an inventory whose changes go nowhere
    pub fn detached(size: usize) -> Self {
        Self::new(size, |_: usize, _: &ItemStack| {})
    }

    /// Number of slots
    pub fn size(&self) -> usize {
        self.slots.lock().len()
    }

    fn check_slot(slot: usize, size: usize) -> Result<(), InventoryError> {
        if slot >= size {
            return Err(InventoryError::InvalidSlot { slot, size });
        }
        Ok(())
    }

    /// Get the stack at a slot (empty stacks included)
    pub fn item(&self, slot: usize) -> Result<ItemStack, InventoryError> {
        let slots = self.slots.lock();
        Self::check_slot(slot, slots.len())?;
        Ok(slots[slot].clone())
    }

    /// Overwrite a slot
    pub fn set_item(&self, slot: usize, stack: ItemStack) -> Result<(), InventoryError> {
        let mut slots = self.slots.lock();
        Self::check_slot(slot, slots.len())?;
        slots[slot] = stack;
        self.observer.slot_changed(slot, &slots[slot]);
        Ok(())
    }

    /// Add a stack, first topping up comparable stacks, then filling empty
    /// slots. On overflow the items that did fit stay added.
    pub fn add_item(&self, stack: ItemStack) -> Result<(), InventoryError> {
        if stack.is_empty() {
            return Ok(());
        }
        let mut slots = self.slots.lock();
        let mut remaining = stack.count();

        for slot in 0..slots.len() {
            if remaining == 0 {
                break;
            }
            let existing = &slots[slot];
            if existing.is_empty() || !existing.comparable(&stack) {
                continue;
            }
            let added = existing.room().min(remaining);
            if added == 0 {
                continue;
            }
            slots[slot] = existing.with_count(existing.count() + added);
            remaining -= added;
            self.observer.slot_changed(slot, &slots[slot]);
        }

        for slot in 0..slots.len() {
            if remaining == 0 {
                break;
            }
            if !slots[slot].is_empty() {
                continue;
            }
            let added = stack.item().max_count.min(remaining);
            slots[slot] = stack.with_count(added);
            remaining -= added;
            self.observer.slot_changed(slot, &slots[slot]);
        }

        if remaining > 0 {
            return Err(InventoryError::InventoryFull { remaining });
        }
        Ok(())
    }

    /// Remove `stack.count()` items comparable to `stack` from anywhere in
    /// the inventory. Nothing is removed if there are not enough.
    pub fn remove_item(&self, stack: &ItemStack) -> Result<(), InventoryError> {
        let mut slots = self.slots.lock();
        let available: u64 = slots
            .iter()
            .filter(|s| !s.is_empty() && s.comparable(stack))
            .map(|s| s.count() as u64)
            .sum();
        if available < stack.count() as u64 {
            return Err(InventoryError::InsufficientItems);
        }

        let mut remaining = stack.count();
        for slot in 0..slots.len() {
            if remaining == 0 {
                break;
            }
            let existing = &slots[slot];
            if existing.is_empty() || !existing.comparable(stack) {
                continue;
            }
            let removed = existing.count().min(remaining);
            slots[slot] = existing.with_count(existing.count() - removed);
            remaining -= removed;
            self.observer.slot_changed(slot, &slots[slot]);
        }
        Ok(())
    }

    /// Swap two slots
    pub fn swap(&self, a: usize, b: usize) -> Result<(), InventoryError> {
        let mut slots = self.slots.lock();
        Self::check_slot(a, slots.len())?;
        Self::check_slot(b, slots.len())?;
        if a == b {
            return Ok(());
        }
        slots.swap(a, b);
        self.observer.slot_changed(a, &slots[a]);
        self.observer.slot_changed(b, &slots[b]);
        Ok(())
    }

    /// Empty every non-empty slot
    pub fn clear(&self) {
        let mut slots = self.slots.lock();
        for slot in 0..slots.len() {
            if slots[slot].is_empty() {
                continue;
            }
            slots[slot] = ItemStack::empty();
            self.observer.slot_changed(slot, &slots[slot]);
        }
    }

    /// Find the first empty slot
    pub fn first_empty(&self) -> Option<usize> {
        self.slots.lock().iter().position(|s| s.is_empty())
    }

    /// Total count of items comparable to `stack`
    pub fn count_of(&self, stack: &ItemStack) -> u64 {
        self.slots
            .lock()
            .iter()
            .filter(|s| !s.is_empty() && s.comparable(stack))
            .map(|s| s.count() as u64)
            .sum()
    }

    /// Snapshot of all slots
    pub fn items(&self) -> Vec<ItemStack> {
        self.slots.lock().clone()
    }

    /// Check if every slot is empty
    pub fn is_empty(&self) -> bool {
        self.slots.lock().iter().all(|s| s.is_empty())
    }
}

impl std::fmt::Debug for Inventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inventory")
            .field("slots", &*self.slots.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::item::Item;
    use std::sync::Arc;

    fn dirt(count: u32) -> ItemStack {
        ItemStack::new(Item::new("minecraft:dirt", 3, 0), count)
    }

    fn recording(size: usize) -> (Inventory, Arc<Mutex<Vec<(usize, u32)>>>) {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        let inv = Inventory::new(size, move |slot: usize, stack: &ItemStack| {
            sink.lock().push((slot, stack.count()));
        });
        (inv, changes)
    }

    #[test]
    fn test_inventory_creation() {
        let inv = Inventory::detached(MAIN_INVENTORY_SIZE);
        assert_eq!(inv.size(), 36);
        assert!(inv.is_empty());
        assert_eq!(inv.first_empty(), Some(0));
    }

    #[test]
    fn test_set_item_notifies() {
        let (inv, changes) = recording(4);
        inv.set_item(2, dirt(5)).unwrap();

        assert_eq!(*changes.lock(), vec![(2, 5)]);
        assert_eq!(inv.item(2).unwrap(), dirt(5));
    }

    #[test]
    fn test_invalid_slot() {
        let (inv, changes) = recording(1);
        assert_eq!(
            inv.set_item(1, dirt(1)),
            Err(InventoryError::InvalidSlot { slot: 1, size: 1 })
        );
        assert!(changes.lock().is_empty());
    }

    #[test]
    fn test_add_item_stacks_first() {
        let (inv, changes) = recording(4);
        inv.set_item(3, dirt(60)).unwrap();
        inv.add_item(dirt(10)).unwrap();

        // 4 topped up slot 3, the rest went into slot 0
        assert_eq!(inv.item(3).unwrap().count(), 64);
        assert_eq!(inv.item(0).unwrap().count(), 6);
        assert_eq!(*changes.lock(), vec![(3, 60), (3, 64), (0, 6)]);
    }

    #[test]
    fn test_add_item_full() {
        let inv = Inventory::detached(1);
        let err = inv.add_item(dirt(70)).unwrap_err();

        assert_eq!(err, InventoryError::InventoryFull { remaining: 6 });
        assert_eq!(inv.item(0).unwrap().count(), 64);
    }

    #[test]
    fn test_remove_item() {
        let (inv, changes) = recording(3);
        inv.set_item(0, dirt(3)).unwrap();
        inv.set_item(2, dirt(5)).unwrap();
        changes.lock().clear();

        inv.remove_item(&dirt(4)).unwrap();
        assert!(inv.item(0).unwrap().is_empty());
        assert_eq!(inv.item(2).unwrap().count(), 4);
        assert_eq!(*changes.lock(), vec![(0, 0), (2, 4)]);

        assert_eq!(
            inv.remove_item(&dirt(10)),
            Err(InventoryError::InsufficientItems)
        );
        assert_eq!(inv.count_of(&dirt(1)), 4);
    }

    #[test]
    fn test_swap_notifies_both() {
        let (inv, changes) = recording(2);
        inv.set_item(0, dirt(1)).unwrap();
        changes.lock().clear();

        inv.swap(0, 1).unwrap();
        assert_eq!(*changes.lock(), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_clear_only_touches_filled_slots() {
        let (inv, changes) = recording(5);
        inv.set_item(1, dirt(1)).unwrap();
        inv.set_item(4, dirt(2)).unwrap();
        changes.lock().clear();

        inv.clear();
        assert!(inv.is_empty());
        assert_eq!(*changes.lock(), vec![(1, 0), (4, 0)]);
    }
}
