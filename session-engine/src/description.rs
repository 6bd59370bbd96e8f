//! Plugin type descriptions

use crate::hash::{string_hash, to_hex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Format name used for plugin types the engine implements itself
/// (built-in processors and racks)
pub const BUILT_IN_FORMAT_NAME: &str = "Internal";

/// Describes one plugin type: everything needed to show it in a list and to
/// create an instance of it later.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PluginDescription {
    /// Display name
    pub name: String,
    /// Vendor/manufacturer name
    pub manufacturer: String,
    /// Category tag (e.g. "Fx", "Instrument", or an xml type for built-ins)
    pub category: String,
    /// Version string reported by the plugin
    pub version: String,
    /// Bundle path for external plugins, synthetic identifier otherwise
    pub file_or_identifier: String,
    /// Name of the format that can instantiate this type
    pub plugin_format_name: String,
    /// Unique id within the file (class id for VST3)
    pub uid: String,
    /// Whether this is an instrument/synth
    pub is_instrument: bool,
    /// Number of audio input buses
    pub num_inputs: u32,
    /// Number of audio output buses
    pub num_outputs: u32,
    /// Whether the plugin advertises an editor
    pub has_editor: bool,
}

impl PluginDescription {
    /// String identifying this type across runs:
    /// `format-name-hash(file)-uid`
    pub fn create_identifier_string(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.plugin_format_name,
            self.name,
            to_hex(string_hash(&self.file_or_identifier)),
            to_hex(string_hash(&self.uid))
        )
    }

    /// Whether the type is implemented by the engine rather than loaded from disk
    pub fn is_built_in(&self) -> bool {
        self.plugin_format_name == BUILT_IN_FORMAT_NAME
    }

    /// Whether two descriptions refer to the same plugin type
    pub fn is_duplicate_of(&self, other: &PluginDescription) -> bool {
        self.plugin_format_name == other.plugin_format_name
            && self.file_or_identifier == other.file_or_identifier
            && self.uid == other.uid
    }

    /// Bundle path for descriptions that came from a file
    pub fn file(&self) -> Option<PathBuf> {
        if self.is_built_in() || self.file_or_identifier.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.file_or_identifier))
        }
    }
}
