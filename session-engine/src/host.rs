//! The engine: formats, the known plugin list, the UI message loop and the
//! audio output, plus factories for edits

use crate::{
    audio::{AudioConfig, AudioOutput, NullOutput},
    edit::Edit,
    error::{Error, Result},
    format::{PluginFormat, PluginFormatManager},
    known_plugins::KnownPluginList,
    message_loop::MessageLoop,
    scanner::PluginScanner,
    vst3_format::Vst3Format,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// File name of the scan crash marker, kept next to the known plugin list
const DEAD_MANS_PEDAL: &str = "scan-in-progress.txt";

/// Host engine instance
pub struct Engine {
    config: AudioConfig,
    formats: PluginFormatManager,
    custom_paths: Vec<PathBuf>,
    known_plugins: Rc<RefCell<KnownPluginList>>,
    known_plugins_file: Option<PathBuf>,
    message_loop: MessageLoop,
    output: Box<dyn AudioOutput>,
}

impl Engine {
    /// Create an engine with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a new engine builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Audio configuration
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Registered plugin formats
    pub fn formats(&self) -> &PluginFormatManager {
        &self.formats
    }

    /// The known plugin list, shared with scans in flight
    pub fn known_plugins(&self) -> Rc<RefCell<KnownPluginList>> {
        self.known_plugins.clone()
    }

    /// The UI thread's task queue
    pub fn message_loop(&self) -> MessageLoop {
        self.message_loop.clone()
    }

    /// Add a custom path to scan for plugins
    pub fn add_scan_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Other(format!("Path does not exist: {}", path.display())));
        }
        if !self.custom_paths.iter().any(|p| p == path) {
            self.custom_paths.push(path.to_path_buf());
        }
        Ok(())
    }

    /// Custom scan paths
    pub fn scan_paths(&self) -> &[PathBuf] {
        &self.custom_paths
    }

    /// A scanner over every format and the custom paths
    pub fn scanner(&self) -> PluginScanner {
        let scanner =
            PluginScanner::new(&self.formats).with_search_paths(self.custom_paths.iter().cloned());

        match self.known_plugins_file.as_ref().and_then(|f| f.parent()) {
            Some(dir) => scanner.with_dead_mans_pedal(dir.join(DEAD_MANS_PEDAL)),
            None => scanner,
        }
    }

    /// Write the known plugin list to its file, if one was configured
    pub fn save_known_plugins(&self) -> Result<()> {
        match &self.known_plugins_file {
            Some(file) => self.known_plugins.borrow().save(file),
            None => Ok(()),
        }
    }

    /// A new, empty edit
    pub fn create_edit(&self) -> Edit {
        Edit::new(self.formats.clone(), self.config)
    }

    /// Load an edit saved with [`Edit::save`]
    pub fn load_edit(&self, path: &Path) -> Result<Edit> {
        Edit::load(path, self.formats.clone(), self.config)
    }

    /// Play `edit` through the audio output
    pub fn start_output(&mut self, edit: &Edit) -> Result<()> {
        self.output.start(edit.playhead(), &self.config)
    }

    /// Stop the audio output
    pub fn stop_output(&mut self) {
        self.output.stop();
    }

    /// Name of the audio output
    pub fn output_name(&self) -> String {
        self.output.name()
    }
}

/// Builder for engine configuration
pub struct EngineBuilder {
    config: AudioConfig,
    custom_paths: Vec<PathBuf>,
    formats: Vec<Arc<dyn PluginFormat>>,
    default_formats: bool,
    known_plugins_file: Option<PathBuf>,
    output: Option<Box<dyn AudioOutput>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: AudioConfig::default(),
            custom_paths: Vec::new(),
            formats: Vec::new(),
            default_formats: true,
            known_plugins_file: None,
            output: None,
        }
    }
}

impl EngineBuilder {
    /// Set the sample rate
    pub fn sample_rate(mut self, rate: f64) -> Self {
        self.config.sample_rate = rate;
        self
    }

    /// Set the block size
    pub fn block_size(mut self, size: usize) -> Self {
        self.config.block_size = size;
        self
    }

    /// Set the whole audio configuration
    pub fn audio_config(mut self, config: AudioConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a custom plugin scan path
    pub fn add_scan_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.custom_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Register an additional plugin format
    pub fn with_format(mut self, format: Arc<dyn PluginFormat>) -> Self {
        self.formats.push(format);
        self
    }

    /// Do not register VST3
    pub fn without_default_formats(mut self) -> Self {
        self.default_formats = false;
        self
    }

    /// Load the known plugin list from, and save it to, this file
    pub fn known_plugins_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.known_plugins_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a specific audio output
    pub fn with_output(mut self, output: Box<dyn AudioOutput>) -> Self {
        self.output = Some(output);
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<Engine> {
        let mut formats = PluginFormatManager::new();
        if self.default_formats {
            formats.add_format(Arc::new(Vst3Format::new()));
        }
        for format in self.formats {
            formats.add_format(format);
        }

        let known_plugins = match &self.known_plugins_file {
            Some(file) if file.exists() => KnownPluginList::load(file).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable plugin list {}: {}", file.display(), e);
                KnownPluginList::new()
            }),
            _ => KnownPluginList::new(),
        };

        let output = self.output.unwrap_or_else(default_output);

        log::info!(
            "Engine ready: {:?}, {} known plugins, output {}",
            formats,
            known_plugins.len(),
            output.name()
        );

        Ok(Engine {
            config: self.config,
            formats,
            custom_paths: self.custom_paths,
            known_plugins: Rc::new(RefCell::new(known_plugins)),
            known_plugins_file: self.known_plugins_file,
            message_loop: MessageLoop::new(),
            output,
        })
    }
}

#[cfg(feature = "cpal-backend")]
fn default_output() -> Box<dyn AudioOutput> {
    let output = crate::backends::CpalOutput::new();
    if output.has_default_device() {
        Box::new(output)
    } else {
        log::warn!("No audio output device found");
        Box::new(NullOutput::new())
    }
}

#[cfg(not(feature = "cpal-backend"))]
fn default_output() -> Box<dyn AudioOutput> {
    Box::new(NullOutput::new())
}
