//! Build a small session: a clip on the first track, two built-in plugins
//! and a rack, then save it

use session_engine::prelude::*;
use session_engine::rack::{new_rack_identifier, RACK_XML_TYPE};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Session Engine Basic Example");
    println!("============================\n");

    let mut engine = Engine::new()?;
    let mut edit = engine.create_edit();
    edit.ensure_number_of_audio_tracks(1);

    for xml_type in ["volume", "reverb"] {
        let plugin = edit.create_new_plugin(xml_type, &PluginDescription::default())?;
        edit.insert_plugin(0, plugin, None)?;
    }

    let rack_desc = PluginDescription {
        file_or_identifier: new_rack_identifier(),
        plugin_format_name: BUILT_IN_FORMAT_NAME.to_string(),
        ..Default::default()
    };
    let rack = edit.create_new_plugin(RACK_XML_TYPE, &rack_desc)?;
    edit.insert_plugin(0, rack, None)?;

    if let Some(track) = edit.audio_track(0) {
        let track = track.borrow();
        println!("{}:", track.name());
        for plugin in track.plugin_list().iter() {
            let plugin = plugin.borrow();
            println!("  {} ({} parameters)", plugin.name(), plugin.parameters().len());
            for param in plugin.parameters() {
                println!("    {}: {}", param.name, param.format_value(param.value));
            }
        }
    }

    if let Some(file) = std::env::args().nth(1).map(PathBuf::from) {
        let audio = session_engine::audio_file::AudioFile::open(&file)?;
        let length = audio.length();
        if let Some(track) = edit.audio_track(0) {
            track.borrow_mut().insert_wave_clip(
                audio.stem(),
                file.clone(),
                std::sync::Arc::new(audio),
                TimeRange::with_length(0.0, length),
            );
        }

        println!("\nPlaying {} for {:.1}s through {}", file.display(), length, engine.output_name());
        engine.start_output(&edit)?;
        edit.transport().play();
        std::thread::sleep(std::time::Duration::from_secs_f64(length.min(5.0)));
        edit.transport().stop();
        engine.stop_output();
    }

    let session = std::env::temp_dir().join("basic_host_session.json");
    edit.save(&session)?;
    println!("\nSaved session to {}", session.display());

    Ok(())
}
