use eframe::egui;
use plugin_host::{AppPaths, AppSettings, PluginHostApp};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let paths = AppPaths::new()?;
    let settings = AppSettings::load_or_default(&paths.settings_file);
    log::info!("Settings from {}", paths.settings_file.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Plugin Host"),
        ..Default::default()
    };

    eframe::run_native(
        "Plugin Host",
        options,
        Box::new(move |cc| Ok(Box::new(PluginHostApp::new(cc, settings, paths)?))),
    )?;

    Ok(())
}
