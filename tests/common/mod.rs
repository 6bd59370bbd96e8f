//! Mocks shared by the integration tests: a plugin format with a
//! controllable native editor and a fake desktop window provider
#![allow(dead_code)]

use plugin_host::catalog::CatalogItem;
use session_engine::audio::AudioConfig;
use session_engine::native_window::{NativeHostWindow, NativeWindowProvider};
use session_engine::prelude::*;
use std::cell::RefCell;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

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
        has_editor: true,
        ..Default::default()
    }
}

/// Counters and knobs shared between a format and the editors it creates
#[derive(Default)]
pub struct EditorControl {
    pub resizable: AtomicBool,
    pub size: Mutex<(i32, i32)>,
    pub created: AtomicUsize,
    pub attached: AtomicUsize,
    pub detached: AtomicUsize,
    pub fail_instances: AtomicBool,
}

impl EditorControl {
    pub fn set_size(&self, width: i32, height: i32) {
        if let Ok(mut size) = self.size.lock() {
            *size = (width, height);
        }
    }

    pub fn size(&self) -> (i32, i32) {
        self.size.lock().map(|s| *s).unwrap_or((0, 0))
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn attached(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }

    pub fn detached(&self) -> usize {
        self.detached.load(Ordering::SeqCst)
    }
}

pub struct MockFormat {
    pub plugins: Vec<PluginDescription>,
    pub control: Arc<EditorControl>,
}

impl MockFormat {
    pub fn new(plugins: Vec<PluginDescription>) -> Self {
        let control = EditorControl::default();
        control.set_size(400, 300);
        Self {
            plugins,
            control: Arc::new(control),
        }
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
        self.plugins
            .iter()
            .map(|p| PathBuf::from(&p.file_or_identifier))
            .collect()
    }

    fn find_descriptions(&self, file: &Path) -> Result<Vec<PluginDescription>> {
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
        if self.control.fail_instances.load(Ordering::SeqCst) {
            return Err(Error::PluginLoadFailed(desc.name.clone()));
        }
        if !self.plugins.iter().any(|p| p.is_duplicate_of(desc)) {
            return Err(Error::PluginNotFound(desc.name.clone()));
        }
        Ok(Box::new(MockInstance {
            parameters: vec![
                Parameter::continuous(0, "Gain", "dB", -60.0, 12.0, 0.0),
                Parameter::switch(1, "Bypass", false),
            ],
            has_editor: desc.has_editor,
            control: self.control.clone(),
        }))
    }
}

struct MockInstance {
    parameters: Vec<Parameter>,
    has_editor: bool,
    control: Arc<EditorControl>,
}

impl PluginInstance for MockInstance {
    fn parameters(&self) -> Vec<Parameter> {
        self.parameters.clone()
    }

    fn set_parameter(&mut self, id: u32, normalized: f64) -> Result<()> {
        match self.parameters.iter_mut().find(|p| p.id == id) {
            Some(param) => {
                param.value = normalized;
                Ok(())
            }
            None => Err(Error::InvalidParameter(format!("no parameter {}", id))),
        }
    }

    fn has_editor(&self) -> bool {
        self.has_editor
    }

    fn create_editor(&mut self) -> Result<Box<dyn NativeEditor>> {
        self.control.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockEditor {
            control: self.control.clone(),
        }))
    }
}

struct MockEditor {
    control: Arc<EditorControl>,
}

impl NativeEditor for MockEditor {
    fn size(&self) -> (i32, i32) {
        self.control.size()
    }

    fn can_resize(&self) -> bool {
        self.control.resizable.load(Ordering::SeqCst)
    }

    fn check_size_constraint(&mut self, width: i32, height: i32) -> (i32, i32) {
        (width, height)
    }

    fn set_size(&mut self, width: i32, height: i32) {
        self.control.set_size(width, height);
    }

    fn attach(&mut self, _parent: *mut c_void) -> Result<()> {
        self.control.attached.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn detach(&mut self) {
        self.control.detached.fetch_add(1, Ordering::SeqCst);
    }
}

/// What a fake desktop window looks like from the outside
#[derive(Debug, Clone, Default)]
pub struct WindowState {
    pub title: String,
    pub bounds: Bounds,
    pub content_size: (i32, i32),
    pub resizable: bool,
    pub close_requested: bool,
    pub brought_to_front: usize,
    pub closed: bool,
}

pub type SharedWindowState = Rc<RefCell<WindowState>>;

struct MockWindow {
    state: SharedWindowState,
}

impl NativeHostWindow for MockWindow {
    fn parent_handle(&self) -> *mut c_void {
        std::ptr::null_mut()
    }

    fn bounds(&self) -> Bounds {
        self.state.borrow().bounds
    }

    fn content_size(&self) -> (i32, i32) {
        self.state.borrow().content_size
    }

    fn set_bounds(&mut self, bounds: Bounds) {
        let mut state = self.state.borrow_mut();
        state.bounds = bounds;
        state.content_size = (bounds.width, bounds.height);
    }

    fn set_content_size(&mut self, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        state.content_size = (width, height);
        state.bounds = state.bounds.with_size(width, height);
    }

    fn set_resize_limits(&mut self, resizable: bool, _limits: ResizeLimits) {
        self.state.borrow_mut().resizable = resizable;
    }

    fn to_front(&mut self) {
        self.state.borrow_mut().brought_to_front += 1;
    }

    fn close_requested(&self) -> bool {
        self.state.borrow().close_requested
    }
}

impl Drop for MockWindow {
    fn drop(&mut self) {
        self.state.borrow_mut().closed = true;
    }
}

/// Hands out fake windows and keeps a handle on each one's state
#[derive(Clone, Default)]
pub struct MockWindows {
    pub created: Rc<RefCell<Vec<SharedWindowState>>>,
    pub fail: Rc<RefCell<bool>>,
}

impl MockWindows {
    pub fn count(&self) -> usize {
        self.created.borrow().len()
    }

    pub fn last(&self) -> SharedWindowState {
        self.created.borrow().last().cloned().expect("no window created")
    }
}

impl NativeWindowProvider for MockWindows {
    fn create_window(&self, title: &str, bounds: Bounds, resizable: bool) -> Result<Box<dyn NativeHostWindow>> {
        if *self.fail.borrow() {
            return Err(Error::WindowError("no display".to_string()));
        }
        let state = Rc::new(RefCell::new(WindowState {
            title: title.to_string(),
            bounds,
            content_size: (bounds.width, bounds.height),
            resizable,
            ..Default::default()
        }));
        self.created.borrow_mut().push(state.clone());
        Ok(Box::new(MockWindow { state }))
    }
}

/// An edit with one track whose external plugins come from `format`
pub fn edit_with(format: Arc<MockFormat>) -> EditHandle {
    let mut formats = PluginFormatManager::new();
    formats.add_format(format);
    let mut edit = Edit::new(formats, AudioConfig::default());
    edit.ensure_number_of_audio_tracks(1);
    edit.into_handle()
}

pub fn built_in_item(xml_type: &str, name: &str) -> CatalogItem {
    CatalogItem::internal("1_builtin".to_string(), name, xml_type, false)
}

/// Write a 16-bit PCM WAV file
pub fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
    let data_len = (samples.len() * 2) as u32;
    let block_align = channels * 2;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    std::fs::write(path, bytes).unwrap();
}
