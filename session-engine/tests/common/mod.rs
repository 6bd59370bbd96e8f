//! Mock plugin format shared by the integration tests
#![allow(dead_code)]

use session_engine::audio::AudioConfig;
use session_engine::prelude::*;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const MOCK_FORMAT_NAME: &str = "Mock";

pub fn mock_description(name: &str, manufacturer: &str) -> PluginDescription {
    PluginDescription {
        name: name.to_string(),
        manufacturer: manufacturer.to_string(),
        category: "Fx".to_string(),
        version: "1.0.0".to_string(),
        file_or_identifier: format!("/plugins/{}.vst3", name),
        plugin_format_name: MOCK_FORMAT_NAME.to_string(),
        uid: format!("uid-{}", name),
        num_inputs: 1,
        num_outputs: 1,
        has_editor: true,
        ..Default::default()
    }
}

/// A format whose "files" are the descriptions it was given
#[derive(Default)]
pub struct MockFormat {
    pub plugins: Vec<PluginDescription>,
    pub broken_files: Vec<PathBuf>,
    pub panicking_files: Vec<PathBuf>,
    pub fail_instances: AtomicBool,
}

impl MockFormat {
    pub fn with_plugins(plugins: Vec<PluginDescription>) -> Self {
        Self {
            plugins,
            ..Default::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_instances.store(failing, Ordering::SeqCst);
    }
}

impl PluginFormat for MockFormat {
    fn name(&self) -> &str {
        MOCK_FORMAT_NAME
    }

    fn default_search_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    fn find_plugin_files(&self, _paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .plugins
            .iter()
            .map(|p| PathBuf::from(&p.file_or_identifier))
            .collect();
        files.extend(self.broken_files.iter().cloned());
        files.extend(self.panicking_files.iter().cloned());
        files
    }

    fn find_descriptions(&self, file: &Path) -> Result<Vec<PluginDescription>> {
        if self.panicking_files.iter().any(|f| f == file) {
            panic!("plugin crashed while being probed");
        }
        if self.broken_files.iter().any(|f| f == file) {
            return Err(Error::PluginLoadFailed(format!("{} is broken", file.display())));
        }
        Ok(self
            .plugins
            .iter()
            .filter(|p| Path::new(&p.file_or_identifier) == file)
            .cloned()
            .collect())
    }

    fn create_instance(
        &self,
        desc: &PluginDescription,
        _config: &AudioConfig,
    ) -> Result<Box<dyn PluginInstance>> {
        if self.fail_instances.load(Ordering::SeqCst) {
            return Err(Error::PluginLoadFailed(desc.name.clone()));
        }
        if !self.plugins.iter().any(|p| p.is_duplicate_of(desc)) {
            return Err(Error::PluginNotFound(desc.name.clone()));
        }
        Ok(Box::new(MockInstance::new(desc.has_editor)))
    }
}

pub struct MockInstance {
    parameters: Vec<Parameter>,
    has_editor: bool,
}

impl MockInstance {
    pub fn new(has_editor: bool) -> Self {
        Self {
            parameters: vec![
                Parameter::continuous(0, "Gain", "dB", -60.0, 12.0, 0.0),
                Parameter::switch(1, "Bypass", false),
            ],
            has_editor,
        }
    }
}

impl PluginInstance for MockInstance {
    fn parameters(&self) -> Vec<Parameter> {
        self.parameters.clone()
    }

    fn set_parameter(&mut self, id: u32, normalized: f64) -> Result<()> {
        let param = self
            .parameters
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::InvalidParameter(format!("no parameter {}", id)))?;
        param.value = normalized;
        Ok(())
    }

    fn has_editor(&self) -> bool {
        self.has_editor
    }

    fn create_editor(&mut self) -> Result<Box<dyn NativeEditor>> {
        Ok(Box::new(MockEditor::default()))
    }
}

#[derive(Default)]
pub struct MockEditor {
    attached: bool,
}

impl NativeEditor for MockEditor {
    fn size(&self) -> (i32, i32) {
        (400, 300)
    }

    fn can_resize(&self) -> bool {
        false
    }

    fn check_size_constraint(&mut self, width: i32, height: i32) -> (i32, i32) {
        (width, height)
    }

    fn set_size(&mut self, _width: i32, _height: i32) {}

    fn attach(&mut self, _parent: *mut c_void) -> Result<()> {
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) {
        self.attached = false;
    }
}

pub fn formats_with(format: Arc<MockFormat>) -> PluginFormatManager {
    let mut formats = PluginFormatManager::new();
    formats.add_format(format);
    formats
}

pub fn edit_with(format: Arc<MockFormat>) -> Edit {
    Edit::new(formats_with(format), AudioConfig::default())
}

pub fn built_in_description(name: &str) -> PluginDescription {
    PluginDescription {
        name: name.to_string(),
        plugin_format_name: BUILT_IN_FORMAT_NAME.to_string(),
        ..Default::default()
    }
}
