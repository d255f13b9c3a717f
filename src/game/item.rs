//! Item module
//!
//! Item types and stacks as held by containers, plus their network encoding.

use serde::{Deserialize, Serialize};

use crate::protocol::types::{NetworkItemStack, NetworkItemType};

/// Default maximum stack size
pub const DEFAULT_MAX_COUNT: u32 = 64;

/// An item type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Namespaced identifier, e.g. `minecraft:diamond`
    pub name: String,
    /// Network item ID (0 = air)
    pub network_id: i32,
    /// Metadata/damage value
    pub metadata: i16,
    /// Maximum count of a single stack
    pub max_count: u32,
}

impl Item {
    /// Create a new item type with the default stack size
    pub fn new(name: impl Into<String>, network_id: i32, metadata: i16) -> Self {
        Self {
            name: name.into(),
            network_id,
            metadata,
            max_count: DEFAULT_MAX_COUNT,
        }
    }

    /// Air, the content of an empty slot
    pub fn air() -> Self {
        Self {
            name: "minecraft:air".to_string(),
            network_id: 0,
            metadata: 0,
            max_count: 0,
        }
    }

    /// Set the maximum stack size
    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = max_count;
        self
    }

    /// Network ID and metadata for the wire
    pub fn encode_item(&self) -> (i32, i16) {
        (self.network_id, self.metadata)
    }

    /// Check if this is air
    pub fn is_air(&self) -> bool {
        self.network_id == 0
    }
}

/// A stack of items in a container slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    item: Item,
    count: u32,
}

impl ItemStack {
    /// Create a new stack. A zero count or air produces an empty stack.
    pub fn new(item: Item, count: u32) -> Self {
        if item.is_air() || count == 0 {
            return Self::empty();
        }
        Self { item, count }
    }

    /// Create an empty stack
    pub fn empty() -> Self {
        Self {
            item: Item::air(),
            count: 0,
        }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item.is_air()
    }

    /// Check if another stack holds the same item type
    pub fn comparable(&self, other: &ItemStack) -> bool {
        self.item == other.item
    }

    /// Copy of this stack with a different count
    pub fn with_count(&self, count: u32) -> Self {
        Self::new(self.item.clone(), count)
    }

    /// How many more items fit on this stack
    pub fn room(&self) -> u32 {
        self.item.max_count.saturating_sub(self.count)
    }

    /// Wire encoding of the stack. The count is truncated to 16 bits.
    pub fn to_network(&self) -> NetworkItemStack {
        if self.is_empty() {
            return NetworkItemStack::default();
        }
        let (network_id, metadata_value) = self.item.encode_item();
        NetworkItemStack {
            item_type: NetworkItemType {
                network_id,
                metadata_value,
            },
            count: self.count as i16,
        }
    }
}

impl Default for ItemStack {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Item {
        Item::new("minecraft:diamond", 264, 0)
    }

    #[test]
    fn test_empty_stack() {
        assert!(ItemStack::empty().is_empty());
        assert!(ItemStack::new(diamond(), 0).is_empty());
        assert!(ItemStack::new(Item::air(), 5).is_empty());
    }

    #[test]
    fn test_to_network() {
        let stack = ItemStack::new(Item::new("minecraft:wool", 35, 14), 12);
        let network = stack.to_network();

        assert_eq!(network.item_type.network_id, 35);
        assert_eq!(network.item_type.metadata_value, 14);
        assert_eq!(network.count, 12);
    }

    #[test]
    fn test_to_network_truncates_count() {
        let stack = ItemStack::new(diamond().with_max_count(u32::MAX), 70_000);
        assert_eq!(stack.to_network().count, 70_000u32 as i16);
    }

    #[test]
    fn test_empty_to_network_is_air() {
        assert_eq!(ItemStack::empty().to_network(), NetworkItemStack::default());
    }

    #[test]
    fn test_room() {
        let stack = ItemStack::new(diamond(), 60);
        assert_eq!(stack.room(), 4);
        assert!(stack.comparable(&ItemStack::new(diamond(), 1)));
    }
}
