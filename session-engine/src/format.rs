//! Plugin formats and live external instances

use crate::audio::AudioConfig;
use crate::description::PluginDescription;
use crate::error::{Error, Result};
use crate::parameters::Parameter;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A plugin format that can find plugin files on disk, describe the types
/// they contain and create instances of them.
///
/// Formats are shared with the scanner's worker thread.
pub trait PluginFormat: Send + Sync {
    /// Name stored in [`PluginDescription::plugin_format_name`]
    fn name(&self) -> &str;

    /// Directories searched when no explicit paths are configured
    fn default_search_paths(&self) -> Vec<PathBuf>;

    /// Plugin files below the given directories
    fn find_plugin_files(&self, paths: &[PathBuf]) -> Vec<PathBuf>;

    /// Describe every plugin type in a file. This may load the file.
    fn find_descriptions(&self, file: &Path) -> Result<Vec<PluginDescription>>;

    /// Create an instance of a described type
    fn create_instance(
        &self,
        desc: &PluginDescription,
        config: &AudioConfig,
    ) -> Result<Box<dyn PluginInstance>>;
}

/// A loaded external plugin
pub trait PluginInstance {
    /// Current parameter values
    fn parameters(&self) -> Vec<Parameter>;

    /// Set a parameter from its normalized value
    fn set_parameter(&mut self, id: u32, normalized: f64) -> Result<()>;

    /// Whether the plugin can provide a native editor
    fn has_editor(&self) -> bool;

    /// Create the plugin's native editor
    fn create_editor(&mut self) -> Result<Box<dyn NativeEditor>>;
}

/// A plugin-provided editor view that can be embedded in a native window
pub trait NativeEditor {
    /// Preferred size
    fn size(&self) -> (i32, i32);

    /// Whether the host may resize the view
    fn can_resize(&self) -> bool;

    /// Adjust a proposed size to one the editor accepts
    fn check_size_constraint(&mut self, width: i32, height: i32) -> (i32, i32);

    /// Tell the editor its new size
    fn set_size(&mut self, width: i32, height: i32);

    /// Attach to a platform parent view/window handle
    fn attach(&mut self, parent: *mut c_void) -> Result<()>;

    /// Detach from the parent. Safe to call when not attached.
    fn detach(&mut self);
}

/// The formats available to the session
#[derive(Clone, Default)]
pub struct PluginFormatManager {
    formats: Vec<Arc<dyn PluginFormat>>,
}

impl PluginFormatManager {
    /// No formats
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a format
    pub fn add_format(&mut self, format: Arc<dyn PluginFormat>) {
        log::debug!("Registered plugin format {}", format.name());
        self.formats.push(format);
    }

    /// Registered formats
    pub fn formats(&self) -> &[Arc<dyn PluginFormat>] {
        &self.formats
    }

    /// Format with the given name
    pub fn find_format(&self, name: &str) -> Option<Arc<dyn PluginFormat>> {
        self.formats.iter().find(|f| f.name() == name).cloned()
    }

    /// Create an instance using whichever format the description names
    pub fn create_instance(
        &self,
        desc: &PluginDescription,
        config: &AudioConfig,
    ) -> Result<Box<dyn PluginInstance>> {
        let format = self
            .find_format(&desc.plugin_format_name)
            .ok_or_else(|| Error::UnknownFormat(desc.plugin_format_name.clone()))?;
        format.create_instance(desc, config)
    }
}

impl std::fmt::Debug for PluginFormatManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.formats.iter().map(|format| format.name().to_string()))
            .finish()
    }
}
