//! A column of buttons, one per plugin on a track, plus a "+" button
//!
//! The buttons follow the track: plugin additions, removals and reorders mark
//! the list dirty and a single rebuild runs on the next dispatch, however many
//! changes arrived in between.

use crate::catalog::CatalogItem;
use crate::plugin_factory;
use eframe::egui;
use session_engine::{
    message_loop::{AsyncUpdater, MessageLoop, UpdateFlag},
    listeners::Subscription,
    track::ChildKind,
    EditHandle, PluginHandle, PluginId, TrackEvent, TrackHandle,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Characters of the plugin name shown on its button
pub const LABEL_LENGTH: usize = 5;

const BUTTON_SIZE: [f32; 2] = [40.0, 20.0];

#[derive(Clone)]
pub struct PluginButton {
    plugin: PluginHandle,
    id: PluginId,
    name: String,
    label: String,
}

impl PluginButton {
    fn new(plugin: &PluginHandle) -> Self {
        let (id, name) = {
            let p = plugin.borrow();
            (p.id(), p.name().to_string())
        };
        Self {
            plugin: plugin.clone(),
            id,
            label: name.chars().take(LABEL_LENGTH).collect(),
            name,
        }
    }

    pub fn plugin(&self) -> &PluginHandle {
        &self.plugin
    }

    pub fn plugin_id(&self) -> PluginId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Something the user asked for through the panel
#[derive(Clone)]
pub enum PanelAction {
    ShowEditor(PluginHandle),
    Delete(PluginId),
    ReloadEditor(PluginId),
    /// "+" was clicked
    AddPlugin,
}

pub struct TrackPluginList {
    edit: EditHandle,
    track: TrackHandle,
    buttons: Rc<RefCell<Vec<PluginButton>>>,
    updater: Rc<AsyncUpdater>,
    needs_update: Rc<UpdateFlag>,
    _subscription: Subscription,
}

impl TrackPluginList {
    /// A panel for `track` of `edit`
    pub fn new(edit: EditHandle, track: TrackHandle, message_loop: MessageLoop) -> Self {
        let buttons: Rc<RefCell<Vec<PluginButton>>> = Rc::default();
        let needs_update = Rc::new(UpdateFlag::new());

        let updater = {
            let buttons = Rc::downgrade(&buttons);
            let track = Rc::downgrade(&track);
            let needs_update = Rc::downgrade(&needs_update);
            Rc::new_cyclic(|updater: &Weak<AsyncUpdater>| {
                let updater = updater.clone();
                AsyncUpdater::new(message_loop, move || {
                    let (Some(buttons), Some(track), Some(needs_update)) =
                        (buttons.upgrade(), track.upgrade(), needs_update.upgrade())
                    else {
                        return;
                    };
                    if needs_update.compare_and_reset() && !rebuild_buttons(&buttons, &track) {
                        // Try again on the next dispatch
                        if let Some(updater) = updater.upgrade() {
                            updater.mark_and_update(&needs_update);
                        }
                    }
                })
            })
        };

        let subscription = {
            let updater = Rc::downgrade(&updater);
            let needs_update = needs_update.clone();
            track.borrow().subscribe(move |event| {
                let affects_buttons = matches!(
                    event,
                    TrackEvent::ChildAdded(ChildKind::Plugin(_))
                        | TrackEvent::ChildRemoved(ChildKind::Plugin(_))
                        | TrackEvent::ChildOrderChanged
                );
                if affects_buttons {
                    if let Some(updater) = updater.upgrade() {
                        updater.mark_and_update(&needs_update);
                    }
                }
            })
        };

        rebuild_buttons(&buttons, &track);

        Self {
            edit,
            track,
            buttons,
            updater,
            needs_update,
            _subscription: subscription,
        }
    }

    pub fn track(&self) -> &TrackHandle {
        &self.track
    }

    pub fn buttons(&self) -> Vec<PluginButton> {
        self.buttons.borrow().clone()
    }

    pub fn num_buttons(&self) -> usize {
        self.buttons.borrow().len()
    }

    /// Whether a rebuild is waiting for the next dispatch
    pub fn is_update_pending(&self) -> bool {
        self.needs_update.is_set() && self.updater.is_update_pending()
    }

    /// Create the picked plugin and append it to the end of the track
    pub fn add_plugin(&self, item: &CatalogItem) -> Option<PluginHandle> {
        let plugin = plugin_factory::create_plugin(item, &mut self.edit.borrow_mut())?;

        let track_index = self.track.borrow().index();
        if let Err(e) = self.edit.borrow().insert_plugin(track_index, plugin.clone(), None) {
            log::debug!("Could not insert {}: {}", item.name(), e);
            return None;
        }

        self.buttons.borrow_mut().push(PluginButton::new(&plugin));
        Some(plugin)
    }

    /// Remove a plugin from the track
    pub fn delete_plugin(&self, id: PluginId) -> bool {
        let removed = self.edit.borrow().delete_plugin(id).is_some();
        if removed {
            self.buttons.borrow_mut().retain(|b| b.id != id);
        }
        removed
    }

    pub fn ui(&self, ui: &mut egui::Ui) -> Option<PanelAction> {
        let mut action = None;

        ui.vertical(|ui| {
            ui.spacing_mut().item_spacing.y = 2.0;

            for button in self.buttons.borrow().iter() {
                let response = ui
                    .add_sized(BUTTON_SIZE, egui::Button::new(button.label.as_str()))
                    .on_hover_text(button.name.as_str());

                if response.clicked() {
                    action = Some(PanelAction::ShowEditor(button.plugin.clone()));
                }

                response.context_menu(|ui| {
                    if ui.button("Delete").clicked() {
                        action = Some(PanelAction::Delete(button.id));
                        ui.close_menu();
                    }
                    if ui.button("Reload Editor").clicked() {
                        action = Some(PanelAction::ReloadEditor(button.id));
                        ui.close_menu();
                    }
                });
            }

            if ui
                .add_sized(BUTTON_SIZE, egui::Button::new("+"))
                .on_hover_text("Add a plugin")
                .clicked()
            {
                action = Some(PanelAction::AddPlugin);
            }
        });

        action
    }
}

/// Returns `false` if the track was busy and nothing was rebuilt
fn rebuild_buttons(buttons: &RefCell<Vec<PluginButton>>, track: &TrackHandle) -> bool {
    let Ok(track) = track.try_borrow() else {
        log::debug!("Track busy, plugin buttons not rebuilt");
        return false;
    };
    let rebuilt: Vec<PluginButton> = track.plugin_list().iter().map(PluginButton::new).collect();
    log::debug!("Rebuilt {} plugin buttons for {}", rebuilt.len(), track.name());
    *buttons.borrow_mut() = rebuilt;
    true
}
