//! Specialized collection types

pub use slotmap::SlotMap;
pub use indexmap::IndexSet;

slotmap::new_key_type! {
    /// Stable handle of a node stored in a [`NodeArena`](crate::scene::NodeArena)
    pub struct NodeId;

    /// Handle returned when an observer subscribes to midpoint updates
    pub struct SubscriptionId;
}

/// Insertion-ordered set; iteration order is stable between frames
pub type OrderedSet<T> = IndexSet<T>;

/// Handle-based map keyed by scene node handles
pub type NodeMap<T> = SlotMap<NodeId, T>;
