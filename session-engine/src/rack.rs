//! Plugin racks: named containers the edit keeps a list of

use serde::{Deserialize, Serialize};

/// Type tag of rack instances
pub const RACK_XML_TYPE: &str = "rack";

/// Prefix of identifiers that ask for a new rack rather than an existing one
pub const RACK_PRESET_PREFIX: &str = "RackPreset:";

/// Prefix of identifiers that refer to an existing rack by list index
pub const RACK_INDEX_PREFIX: &str = "RACK__";

/// Identifier of a rack type within an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RackId(pub u64);

/// A rack definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackType {
    /// Rack id
    pub id: RackId,
    /// Display name
    pub rack_name: String,
}

/// The racks defined in an edit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RackList {
    types: Vec<RackType>,
    next_id: u64,
}

impl RackList {
    /// Rack types, in creation order
    pub fn types(&self) -> &[RackType] {
        &self.types
    }

    /// Rack type at a list index
    pub fn type_at(&self, index: usize) -> Option<&RackType> {
        self.types.get(index)
    }

    /// Find a rack by id
    pub fn find(&self, id: RackId) -> Option<&RackType> {
        self.types.iter().find(|r| r.id == id)
    }

    /// Create a new, empty rack
    pub fn add_new_rack(&mut self) -> RackType {
        self.next_id += 1;
        let rack = RackType {
            id: RackId(self.next_id),
            rack_name: format!("Rack {}", self.next_id),
        };
        self.types.push(rack.clone());
        rack
    }

    /// Number of racks
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no racks exist
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Identifier a catalog uses for "create a new empty rack"
pub fn new_rack_identifier() -> String {
    format!("{}-1", RACK_PRESET_PREFIX)
}

/// Identifier a catalog uses for the rack at `index`
pub fn rack_identifier(index: usize) -> String {
    format!("{}{}", RACK_INDEX_PREFIX, index)
}

/// List index encoded in a [`rack_identifier`]
pub fn parse_rack_index(identifier: &str) -> Option<usize> {
    identifier.strip_prefix(RACK_INDEX_PREFIX)?.parse().ok()
}
