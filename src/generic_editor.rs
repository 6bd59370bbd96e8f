//! Slider-per-parameter editor for plugins without their own view

use eframe::egui;
use session_engine::{Parameter, Plugin, PluginHandle};

const WIDTH: i32 = 380;
const ROW_HEIGHT: i32 = 26;
const MIN_HEIGHT: i32 = 80;
const MAX_HEIGHT: i32 = 640;

pub struct GenericEditor {
    parameters: Vec<Parameter>,
}

impl GenericEditor {
    pub fn new(plugin: &Plugin) -> Self {
        Self {
            parameters: plugin.parameters(),
        }
    }

    /// Preferred window content size
    pub fn size(&self) -> (i32, i32) {
        let rows = self.parameters.len() as i32;
        let height = (40 + rows * ROW_HEIGHT).clamp(MIN_HEIGHT, MAX_HEIGHT);
        (WIDTH, height)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Draw the editor. Returns whether the user changed a parameter.
    pub fn ui(&mut self, ui: &mut egui::Ui, plugin: &PluginHandle) -> bool {
        if let Ok(plugin) = plugin.try_borrow() {
            self.parameters = plugin.parameters();
        }

        if self.parameters.is_empty() {
            ui.label("This plugin has no parameters.");
            return false;
        }

        let mut edits = Vec::new();

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("generic_editor_params")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for param in &self.parameters {
                        ui.label(&param.name);

                        let mut value = param.value;
                        let changed = ui
                            .add_enabled_ui(!param.is_read_only, |ui| {
                                if param.is_switch() {
                                    let mut on = value >= 0.5;
                                    let response = ui.checkbox(&mut on, "");
                                    value = if on { 1.0 } else { 0.0 };
                                    response.changed()
                                } else {
                                    let mut slider = egui::Slider::new(&mut value, 0.0..=1.0)
                                        .custom_formatter(|v, _| param.format_value(v));
                                    if param.is_discrete() {
                                        slider = slider.step_by(1.0 / param.step_count as f64);
                                    }
                                    ui.add(slider).changed()
                                }
                            })
                            .inner;

                        if changed {
                            edits.push((param.id, value));
                        }
                        ui.end_row();
                    }
                });
        });

        if edits.is_empty() {
            return false;
        }

        match plugin.try_borrow_mut() {
            Ok(mut plugin) => {
                for (id, value) in edits {
                    if let Err(e) = plugin.set_parameter(id, value) {
                        log::debug!("Could not set parameter {} of {}: {}", id, plugin.name(), e);
                    }
                }
                true
            }
            Err(_) => false,
        }
    }
}
