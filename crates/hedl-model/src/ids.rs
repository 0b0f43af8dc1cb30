//! Dense-index identifiers for document-owned storage.

use hedl_util::define_idx;

define_idx! {
    /// Ordinal of a schema within [`crate::Document::schemas`].
    pub struct SchemaId;
}

define_idx! {
    /// Ordinal of an alias within [`crate::Document::aliases`].
    pub struct AliasId;
}

define_idx! {
    /// Ordinal of a root item within [`crate::Document::root_items`].
    pub struct RootItemId;
}

define_idx! {
    /// Identifies a node for the out-of-band span side table.
    ///
    /// Assigned sequentially by the parser as nodes are built; the resolver
    /// never renumbers them, so a `NodeId` survives from parse through
    /// resolution unchanged.
    pub struct NodeId;
}

/// Hands out sequential [`NodeId`]s while parsing one document.
#[derive(Default)]
pub struct NodeIdGen(u32);

impl NodeIdGen {
    pub fn new() -> Self {
        Self(0)
    }

    /// Start handing out ids from `base` rather than zero, so a generator
    /// used to synthesize nodes after parsing (e.g. defaulted field values)
    /// cannot collide with ids the parser already assigned.
    pub fn starting_at(base: u32) -> Self {
        Self(base)
    }

    pub fn next(&mut self) -> NodeId {
        use hedl_util::Idx;
        let id = NodeId::from_usize(self.0 as usize);
        self.0 += 1;
        id
    }
}
