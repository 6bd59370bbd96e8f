//! The main window: transport and file buttons, the track's plugin panel,
//! the plugin menu, the plugin list dialog and the editor windows

use crate::catalog::{build_catalog, CatalogNode};
use crate::engine_helpers::{
    browse_for_audio_file, get_or_insert_audio_track_at, load_audio_file_as_clip_async, loop_around_clip,
    toggle_play,
};
use crate::errors::Result;
use crate::plugin_list_dialog::PluginListDialog;
use crate::plugin_menu::{MenuOutcome, PluginMenu};
use crate::plugin_window::PluginWindowManager;
use crate::settings::{AppPaths, AppSettings, ThemeFlavour, AUDIO_FILE_PURPOSE};
use crate::track_plugin_list::{PanelAction, TrackPluginList};
use eframe::egui;
use session_engine::{
    builtin::PluginTypes, listeners::Subscription, message_loop::MessageLoop,
    native_window::DesktopWindows, transport::TransportEvent, Edit, EditHandle, Engine,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Frame interval while windows or timers need polling
const POLL_INTERVAL: Duration = Duration::from_millis(30);

pub struct PluginHostApp {
    engine: Engine,
    edit: EditHandle,
    settings: Rc<RefCell<AppSettings>>,
    paths: AppPaths,
    message_loop: MessageLoop,
    panel: TrackPluginList,
    windows: PluginWindowManager,
    plugin_list: PluginListDialog,
    menu: Option<(CatalogNode, PluginMenu)>,
    is_playing: Rc<Cell<bool>>,
    applied_theme: Option<ThemeFlavour>,
    _transport_subscription: Subscription,
}

impl PluginHostApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings, paths: AppPaths) -> Result<Self> {
        let mut builder = Engine::builder()
            .audio_config(settings.audio)
            .known_plugins_file(&paths.known_plugins_file);
        for path in &settings.scan_paths {
            builder = builder.add_scan_path(path);
        }
        let mut engine = builder.build()?;
        let message_loop = engine.message_loop();

        let mut edit = if paths.session_file.exists() {
            engine.load_edit(&paths.session_file).unwrap_or_else(|e| {
                log::warn!("Starting a new session, {} unreadable: {}", paths.session_file.display(), e);
                engine.create_edit()
            })
        } else {
            engine.create_edit()
        };
        let track = get_or_insert_audio_track_at(&mut edit, 0);

        if let Err(e) = engine.start_output(&edit) {
            log::warn!("Audio output unavailable: {}", e);
        }

        let is_playing = Rc::new(Cell::new(edit.transport().is_playing()));
        let transport_subscription = {
            let is_playing = is_playing.clone();
            let ctx = cc.egui_ctx.clone();
            edit.transport().subscribe(move |event| {
                if let TransportEvent::PlayStateChanged(playing) = event {
                    is_playing.set(*playing);
                    ctx.request_repaint();
                }
            })
        };

        let edit = edit.into_handle();
        let panel = TrackPluginList::new(edit.clone(), track, message_loop.clone());
        let windows = PluginWindowManager::new(edit.clone(), message_loop.clone(), Box::new(DesktopWindows));
        let plugin_list = PluginListDialog::new(engine.known_plugins(), message_loop.clone());

        Ok(Self {
            engine,
            edit,
            settings: Rc::new(RefCell::new(settings)),
            paths,
            message_loop,
            panel,
            windows,
            plugin_list,
            menu: None,
            is_playing,
            applied_theme: None,
            _transport_subscription: transport_subscription,
        })
    }

    fn load_sound_file(&self) {
        let start_dir = self
            .settings
            .borrow()
            .default_load_directory(AUDIO_FILE_PURPOSE)
            .map(|dir| dir.to_path_buf());

        let edit = Rc::downgrade(&self.edit);
        let settings = Rc::downgrade(&self.settings);
        let message_loop = self.message_loop.clone();

        browse_for_audio_file(&self.message_loop, start_dir, move |file| {
            let Some(file) = file else {
                return;
            };
            if let (Some(settings), Some(dir)) = (settings.upgrade(), file.parent()) {
                settings
                    .borrow_mut()
                    .set_default_load_directory(AUDIO_FILE_PURPOSE, dir);
            }
            let Some(handle) = edit.upgrade() else {
                return;
            };

            let edit = Rc::downgrade(&handle);
            load_audio_file_as_clip_async(&message_loop, &handle, file, move |clip| {
                match (clip, edit.upgrade()) {
                    (Some(clip), Some(edit)) => {
                        loop_around_clip(&edit.borrow(), 0, clip);
                    }
                    _ => log::debug!("No clip created from the chosen file"),
                }
            });
        });
    }

    fn open_plugin_menu(&mut self) {
        let sort = self.settings.borrow().sort_method;
        let tree = self.engine.known_plugins().borrow().create_tree(sort);
        let root = build_catalog(&self.edit.borrow(), &tree, PluginTypes::AllPlugins);
        let menu = PluginMenu::new(&root);
        self.menu = Some((root, menu));
    }

    fn show_plugin_menu(&mut self, ctx: &egui::Context) {
        let Some((root, menu)) = &self.menu else {
            return;
        };

        let outcome = menu.show(ctx);
        if outcome == MenuOutcome::Pending {
            return;
        }

        if let Some(item) = PluginMenu::resolve(root, outcome) {
            if let Some(plugin) = self.panel.add_plugin(item) {
                if self.settings.borrow().show_editor_on_insert {
                    self.windows.show_window_explicitly(&plugin);
                }
            }
        }
        self.menu = None;
    }

    fn handle_panel_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::ShowEditor(plugin) => {
                self.windows.show_window_explicitly(&plugin);
            }
            PanelAction::Delete(id) => {
                self.panel.delete_plugin(id);
            }
            PanelAction::ReloadEditor(id) => self.windows.recreate_editor_async(id),
            PanelAction::AddPlugin => self.open_plugin_menu(),
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        let theme = self.settings.borrow().theme;
        if self.applied_theme != Some(theme) {
            catppuccin_egui::set_theme(ctx, theme.theme());
            self.applied_theme = Some(theme);
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let play_label = if self.is_playing.get() { "Pause" } else { "Play" };
            if ui.add_sized([50.0, 50.0], egui::Button::new(play_label)).clicked() {
                toggle_play(&self.edit.borrow());
            }

            if ui
                .add_sized([50.0, 50.0], egui::Button::new("Load SF"))
                .on_hover_text("Load a sound file onto the first track")
                .clicked()
            {
                self.load_sound_file();
            }

            if ui
                .add_sized([50.0, 50.0], egui::Button::new("Plugins"))
                .on_hover_text("Scan Plugins for KnownPluginList")
                .clicked()
            {
                self.plugin_list.open();
            }

            ui.menu_button("Settings", |ui| {
                let mut settings = self.settings.borrow_mut();
                ui.label("Theme");
                for flavour in ThemeFlavour::ALL {
                    ui.radio_value(&mut settings.theme, flavour, flavour.label());
                }
                ui.separator();
                ui.checkbox(&mut settings.show_editor_on_insert, "Open editor when adding a plugin");
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.weak(format!("Output: {}", self.engine.output_name()));
            });
        });
    }

    fn shutdown(&mut self) {
        self.windows.close_all();
        self.engine.stop_output();

        if let Err(e) = self.save_session(&self.edit.borrow()) {
            log::warn!("Could not save the session: {}", e);
        }
        if let Err(e) = self.engine.save_known_plugins() {
            log::warn!("Could not save the plugin list: {}", e);
        }
        if let Err(e) = self.settings.borrow().save(&self.paths.settings_file) {
            log::warn!("Could not save settings: {}", e);
        }
    }

    fn save_session(&self, edit: &Edit) -> Result<()> {
        edit.save(&self.paths.session_file)?;
        Ok(())
    }
}

impl eframe::App for PluginHostApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme(ctx);

        self.message_loop.dispatch();
        self.windows.update(Instant::now());

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(8.0);
            self.toolbar(ui);
            ui.add_space(4.0);
        });

        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(format!("Plugins on {}", self.panel.track().borrow().name()));
            ui.add_space(4.0);
            action = self.panel.ui(ui);
        });
        if let Some(action) = action {
            self.handle_panel_action(action);
        }

        self.show_plugin_menu(ctx);

        let scan_requested = {
            let mut settings = self.settings.borrow_mut();
            self.plugin_list.show(ctx, &mut settings.sort_method)
        };
        if scan_requested {
            self.plugin_list.start_scan(self.engine.scanner());
        }

        self.windows.show_generic_editors(ctx);

        if self.message_loop.has_pending_work() || self.windows.num_open_windows() > 0 {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}

impl Drop for PluginHostApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}
