//! Editor windows for the plugins of an edit
//!
//! A plugin has at most one window. External plugins that provide their own
//! view get a native window with the view attached; every other plugin with
//! parameters gets the generic editor in an egui viewport. Racks and external
//! plugins whose native instance failed to load get no window.

use crate::generic_editor::GenericEditor;
use eframe::egui;
use session_engine::{
    edit::EditEvent,
    format::NativeEditor,
    geometry::{Bounds, ResizeLimits},
    listeners::Subscription,
    message_loop::MessageLoop,
    native_window::{NativeHostWindow, NativeWindowProvider},
    Edit, EditHandle, PluginHandle, PluginId,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

/// How long a window must stay put before its new position is saved
pub const MOVE_SETTLE_INTERVAL: Duration = Duration::from_millis(150);

/// Delay between tearing an editor down and building it again
pub const RECREATE_DELAY: Duration = Duration::from_millis(50);

pub const RESIZE_LIMITS: ResizeLimits = ResizeLimits::new(100, 50, 4000, 4000);

/// Part of a window that must stay on screen
const MIN_ONSCREEN: i32 = 50;

const DEFAULT_POSITION: (i32, i32) = (120, 120);

type WindowRef = Rc<RefCell<PluginWindow>>;
type WindowMap = BTreeMap<PluginId, WindowRef>;

enum Surface {
    Native {
        window: Box<dyn NativeHostWindow>,
        editor: Option<Box<dyn NativeEditor>>,
        resizable: bool,
        content_size: (i32, i32),
    },
    Generic {
        editor: Option<GenericEditor>,
        /// Geometry the viewport was created with
        initial: Bounds,
        /// Outer bounds last reported by the viewport
        bounds: Option<Bounds>,
        close_requested: bool,
    },
}

/// An open editor window
struct PluginWindow {
    id: PluginId,
    title: String,
    plugin: PluginHandle,
    edit: Weak<RefCell<Edit>>,
    surface: Surface,
    /// Bounds seen on the last poll; `None` until the window first reports
    observed_bounds: Option<Bounds>,
    moved_at: Option<Instant>,
    recreate_pending: bool,
}

impl PluginWindow {
    fn open(plugin: &PluginHandle, edit: &EditHandle, provider: &dyn NativeWindowProvider) -> Option<Self> {
        let (id, title, saved_bounds, native) = {
            let p = plugin.try_borrow().ok()?;
            if p.is_rack() {
                log::debug!("{} is a rack; no editor window", p.name());
                return None;
            }
            if p.is_missing_instance() {
                log::debug!("{} is not loaded; no editor window", p.name());
                return None;
            }
            (
                p.id(),
                p.name().to_string(),
                p.window_state().last_window_bounds,
                p.has_native_editor(),
            )
        };

        let (x, y) = saved_bounds
            .map(|b| b.position())
            .unwrap_or(DEFAULT_POSITION);

        let surface = if native {
            match Self::open_native(plugin, &title, x, y, provider) {
                Ok(surface) => surface,
                Err(e) => {
                    log::warn!("Native editor of {} unavailable, using generic editor: {}", title, e);
                    Self::open_generic(plugin, x, y)?
                }
            }
        } else {
            Self::open_generic(plugin, x, y)?
        };

        let mut window = Self {
            id,
            title,
            plugin: plugin.clone(),
            edit: Rc::downgrade(edit),
            surface,
            observed_bounds: None,
            moved_at: None,
            recreate_pending: false,
        };
        window.observed_bounds = window.reported_bounds();

        log::info!("Opened editor window for {}", window.title);
        Some(window)
    }

    fn open_native(
        plugin: &PluginHandle,
        title: &str,
        x: i32,
        y: i32,
        provider: &dyn NativeWindowProvider,
    ) -> session_engine::Result<Surface> {
        let mut editor = plugin.borrow_mut().create_native_editor()?;
        let resizable = editor.can_resize();
        let (width, height) = fitted_size(editor.as_mut(), resizable);

        let bounds = Bounds::new(x, y, width, height).constrained_onscreen(MIN_ONSCREEN);
        let mut window = provider.create_window(title, bounds, resizable)?;
        window.set_resize_limits(resizable, RESIZE_LIMITS);
        editor.attach(window.parent_handle())?;

        Ok(Surface::Native {
            window,
            editor: Some(editor),
            resizable,
            content_size: (width, height),
        })
    }

    fn open_generic(plugin: &PluginHandle, x: i32, y: i32) -> Option<Surface> {
        let editor = GenericEditor::new(&*plugin.try_borrow().ok()?);
        if editor.parameters().is_empty() {
            log::debug!("Plugin has nothing to edit; no editor window");
            return None;
        }
        let (width, height) = editor.size();
        let bounds = Bounds::new(x, y, width, height).constrained_onscreen(MIN_ONSCREEN);
        Some(Surface::Generic {
            editor: Some(editor),
            initial: bounds,
            bounds: None,
            close_requested: false,
        })
    }

    fn bounds(&self) -> Bounds {
        match &self.surface {
            Surface::Native { window, .. } => window.bounds(),
            Surface::Generic { initial, bounds, .. } => bounds.unwrap_or(*initial),
        }
    }

    /// Bounds as reported by the window system; a viewport has none before
    /// its first frame
    fn reported_bounds(&self) -> Option<Bounds> {
        match &self.surface {
            Surface::Native { window, .. } => Some(window.bounds()),
            Surface::Generic { bounds, .. } => *bounds,
        }
    }

    fn has_editor(&self) -> bool {
        match &self.surface {
            Surface::Native { editor, .. } => editor.is_some(),
            Surface::Generic { editor, .. } => editor.is_some(),
        }
    }

    fn is_native(&self) -> bool {
        matches!(self.surface, Surface::Native { .. })
    }

    fn is_resizable(&self) -> bool {
        match &self.surface {
            Surface::Native { resizable, .. } => *resizable,
            Surface::Generic { .. } => true,
        }
    }

    fn close_requested(&self) -> bool {
        match &self.surface {
            Surface::Native { window, .. } => window.close_requested(),
            Surface::Generic { close_requested, .. } => *close_requested,
        }
    }

    fn to_front(&mut self) {
        if let Surface::Native { window, .. } = &mut self.surface {
            window.to_front();
        }
    }

    fn tear_down_editor(&mut self) {
        match &mut self.surface {
            Surface::Native { editor, .. } => {
                if let Some(mut editor) = editor.take() {
                    editor.detach();
                }
            }
            Surface::Generic { editor, .. } => *editor = None,
        }
    }

    fn recreate_editor(&mut self) {
        self.recreate_pending = false;
        self.tear_down_editor();

        match &mut self.surface {
            Surface::Native {
                window,
                editor,
                resizable,
                content_size,
            } => {
                let created = self
                    .plugin
                    .try_borrow_mut()
                    .map_err(|_| session_engine::Error::Other("plugin busy".to_string()))
                    .and_then(|mut plugin| plugin.create_native_editor());

                let mut new_editor = match created {
                    Ok(new_editor) => new_editor,
                    Err(e) => {
                        log::warn!("Could not recreate editor of {}: {}", self.title, e);
                        return;
                    }
                };

                *resizable = new_editor.can_resize();
                let size = fitted_size(new_editor.as_mut(), *resizable);
                window.set_resize_limits(*resizable, RESIZE_LIMITS);
                window.set_content_size(size.0, size.1);
                *content_size = size;

                if let Err(e) = new_editor.attach(window.parent_handle()) {
                    log::warn!("Could not attach editor of {}: {}", self.title, e);
                    return;
                }
                *editor = Some(new_editor);
            }
            Surface::Generic { editor, .. } => {
                if let Ok(plugin) = self.plugin.try_borrow() {
                    *editor = Some(GenericEditor::new(&plugin));
                }
            }
        }

        log::debug!("Recreated editor of {}", self.title);
    }

    /// Per-frame bookkeeping: editor size tracking and settling of moves
    fn poll(&mut self, now: Instant) {
        self.sync_editor_size();

        let Some(current) = self.reported_bounds() else {
            return;
        };
        match self.observed_bounds {
            // The first report is where the window system put it, not a move
            None => {
                self.observed_bounds = Some(current);
                return;
            }
            Some(observed) if observed != current => {
                self.observed_bounds = Some(current);
                self.moved_at = Some(now);
                return;
            }
            Some(_) => {}
        }

        if let Some(moved_at) = self.moved_at {
            if now.duration_since(moved_at) >= MOVE_SETTLE_INTERVAL {
                self.moved_at = None;
                self.save_bounds(current);
            }
        }
    }

    fn sync_editor_size(&mut self) {
        let Surface::Native {
            window,
            editor: Some(editor),
            resizable,
            content_size,
        } = &mut self.surface
        else {
            return;
        };

        if *resizable {
            let actual = window.content_size();
            if actual == *content_size {
                return;
            }
            let (width, height) = RESIZE_LIMITS.clamp(actual.0, actual.1);
            let accepted = editor.check_size_constraint(width, height);
            editor.set_size(accepted.0, accepted.1);
            if accepted != actual {
                window.set_content_size(accepted.0, accepted.1);
            }
            *content_size = accepted;
        } else {
            // The editor resized itself
            let wanted = editor.size();
            if wanted == *content_size {
                return;
            }
            window.set_content_size(wanted.0, wanted.1);
            *content_size = wanted;
            if let Some(edit) = self.edit.upgrade() {
                if let Ok(edit) = edit.try_borrow() {
                    edit.plugin_changed(self.id);
                }
            }
        }
    }

    fn save_bounds(&self, bounds: Bounds) {
        match self.plugin.try_borrow_mut() {
            Ok(mut plugin) => plugin.window_state_mut().last_window_bounds = Some(bounds),
            Err(_) => {
                log::debug!("Plugin busy, window position of {} not saved", self.title);
                return;
            }
        }

        if let Some(edit) = self.edit.upgrade() {
            if let Ok(edit) = edit.try_borrow() {
                edit.plugin_changed(self.id);
            }
        }
    }

    fn set_open(&self, open: bool, explicitly_closed: bool) {
        if let Ok(mut plugin) = self.plugin.try_borrow_mut() {
            let state = plugin.window_state_mut();
            state.window_open = open;
            if explicitly_closed {
                state.was_explicitly_closed = true;
            }
        }
    }

    fn generic_ui(&mut self, ctx: &egui::Context) {
        let Surface::Generic {
            editor: Some(editor),
            initial,
            bounds,
            close_requested,
        } = &mut self.surface
        else {
            return;
        };

        let builder = egui::ViewportBuilder::default()
            .with_title(self.title.as_str())
            .with_position([initial.x as f32, initial.y as f32])
            .with_inner_size([initial.width as f32, initial.height as f32])
            .with_min_inner_size([RESIZE_LIMITS.min_width as f32, RESIZE_LIMITS.min_height as f32])
            .with_max_inner_size([RESIZE_LIMITS.max_width as f32, RESIZE_LIMITS.max_height as f32]);

        let plugin = &self.plugin;
        let mut changed = false;

        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of(("plugin_window", self.id.0)),
            builder,
            |ctx, _class| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    changed = editor.ui(ui, plugin);
                });

                ctx.input(|input| {
                    let viewport = input.viewport();
                    if viewport.close_requested() {
                        *close_requested = true;
                    }
                    if let Some(rect) = viewport.outer_rect {
                        *bounds = Some(Bounds::new(
                            rect.min.x.round() as i32,
                            rect.min.y.round() as i32,
                            rect.width().round() as i32,
                            rect.height().round() as i32,
                        ));
                    }
                });
            },
        );

        if changed {
            if let Some(edit) = self.edit.upgrade() {
                if let Ok(edit) = edit.try_borrow() {
                    edit.plugin_changed(self.id);
                }
            }
        }
    }
}

/// Editor size after applying the resize limits and the editor's own constraint
fn fitted_size(editor: &mut dyn NativeEditor, resizable: bool) -> (i32, i32) {
    let (width, height) = editor.size();
    if !resizable {
        return (width.max(8), height.max(8));
    }
    let (width, height) = RESIZE_LIMITS.clamp(width, height);
    let accepted = editor.check_size_constraint(width, height);
    editor.set_size(accepted.0, accepted.1);
    accepted
}

impl Drop for PluginWindow {
    fn drop(&mut self) {
        if let Some(edit) = self.edit.upgrade() {
            match edit.try_borrow() {
                Ok(edit) => {
                    edit.flush_plugin_state_if_needed(&self.plugin);
                }
                Err(_) => log::debug!("Edit busy, state of {} not flushed", self.title),
            }
        }
        self.tear_down_editor();
        self.set_open(false, false);
        log::info!("Closed editor window for {}", self.title);
    }
}

/// Owns every open editor window of an edit
pub struct PluginWindowManager {
    edit: EditHandle,
    message_loop: MessageLoop,
    provider: Box<dyn NativeWindowProvider>,
    windows: Rc<RefCell<WindowMap>>,
    _edit_subscription: Subscription,
}

impl PluginWindowManager {
    pub fn new(edit: EditHandle, message_loop: MessageLoop, provider: Box<dyn NativeWindowProvider>) -> Self {
        let windows: Rc<RefCell<WindowMap>> = Rc::default();

        let subscription = {
            let windows = Rc::downgrade(&windows);
            let message_loop = message_loop.clone();
            edit.borrow().subscribe(move |event| {
                if let EditEvent::PluginDeleted(id) = *event {
                    let windows = windows.clone();
                    message_loop.post(move || {
                        if let Some(windows) = windows.upgrade() {
                            close(&windows, id, false);
                        }
                    });
                }
            })
        };

        Self {
            edit,
            message_loop,
            provider,
            windows,
            _edit_subscription: subscription,
        }
    }

    fn window(&self, id: PluginId) -> Option<WindowRef> {
        self.windows.borrow().get(&id).cloned()
    }

    /// Open the plugin's editor, or bring an open one to the front.
    /// Returns whether a window is open afterwards.
    pub fn show_window_explicitly(&self, plugin: &PluginHandle) -> bool {
        let Ok(id) = plugin.try_borrow().map(|p| p.id()) else {
            return false;
        };

        if let Some(window) = self.window(id) {
            window.borrow_mut().to_front();
            return true;
        }

        let Some(window) = PluginWindow::open(plugin, &self.edit, self.provider.as_ref()) else {
            return false;
        };
        window.set_open(true, false);
        if let Ok(mut plugin) = plugin.try_borrow_mut() {
            plugin.window_state_mut().was_explicitly_closed = false;
        }

        self.windows
            .borrow_mut()
            .insert(id, Rc::new(RefCell::new(window)));
        true
    }

    /// The user closed the window
    pub fn close_window_explicitly(&self, id: PluginId) {
        close(&self.windows, id, true);
    }

    pub fn close_all(&self) {
        let all = std::mem::take(&mut *self.windows.borrow_mut());
        drop(all);
    }

    pub fn is_window_open(&self, id: PluginId) -> bool {
        self.windows.borrow().contains_key(&id)
    }

    pub fn num_open_windows(&self) -> usize {
        self.windows.borrow().len()
    }

    /// Bounds of an open window
    pub fn window_bounds(&self, id: PluginId) -> Option<Bounds> {
        self.window(id).map(|w| w.borrow().bounds())
    }

    pub fn has_editor(&self, id: PluginId) -> bool {
        self.window(id).map(|w| w.borrow().has_editor()).unwrap_or(false)
    }

    /// Whether the window hosts the plugin's own view
    pub fn is_native(&self, id: PluginId) -> bool {
        self.window(id).map(|w| w.borrow().is_native()).unwrap_or(false)
    }

    pub fn is_resizable(&self, id: PluginId) -> bool {
        self.window(id).map(|w| w.borrow().is_resizable()).unwrap_or(false)
    }

    /// Tear the editor down now and build it again shortly. Requests made
    /// while a rebuild is pending are absorbed.
    pub fn recreate_editor_async(&self, id: PluginId) {
        let Some(window) = self.window(id) else {
            return;
        };

        {
            let mut w = window.borrow_mut();
            w.tear_down_editor();
            if w.recreate_pending {
                return;
            }
            w.recreate_pending = true;
        }

        let weak = Rc::downgrade(&window);
        self.message_loop.call_after_delay(RECREATE_DELAY, move || {
            if let Some(window) = weak.upgrade() {
                window.borrow_mut().recreate_editor();
            }
        });
    }

    /// Per-frame work: closes windows the user closed and saves settled moves
    pub fn update(&self, now: Instant) {
        let windows: Vec<(PluginId, WindowRef)> = self
            .windows
            .borrow()
            .iter()
            .map(|(id, w)| (*id, w.clone()))
            .collect();

        for (id, window) in windows {
            if window.borrow().close_requested() {
                self.close_window_explicitly(id);
                continue;
            }
            window.borrow_mut().poll(now);
        }
    }

    /// Draw the generic editor windows
    pub fn show_generic_editors(&self, ctx: &egui::Context) {
        let windows: Vec<WindowRef> = self.windows.borrow().values().cloned().collect();
        for window in windows {
            window.borrow_mut().generic_ui(ctx);
        }
    }
}

impl Drop for PluginWindowManager {
    fn drop(&mut self) {
        self.close_all();
    }
}

fn close(windows: &RefCell<WindowMap>, id: PluginId, explicitly: bool) {
    let removed = windows.borrow_mut().remove(&id);
    if let Some(window) = removed {
        if explicitly {
            window.borrow().set_open(false, true);
        }
        drop(window);
    }
}
