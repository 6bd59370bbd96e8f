mod common;

use common::{built_in_item, edit_with, mock_description, MockFormat};
use plugin_host::catalog::CatalogItem;
use plugin_host::track_plugin_list::{TrackPluginList, LABEL_LENGTH};
use session_engine::prelude::*;
use std::sync::Arc;

fn panel() -> (EditHandle, TrackPluginList, MessageLoop) {
    let edit = edit_with(Arc::new(MockFormat::new(vec![mock_description("Squasher", "Acme")])));
    let track = edit.borrow().audio_track(0).unwrap();
    let message_loop = MessageLoop::new();
    let panel = TrackPluginList::new(edit.clone(), track, message_loop.clone());
    (edit, panel, message_loop)
}

fn button_ids(panel: &TrackPluginList) -> Vec<PluginId> {
    panel.buttons().iter().map(|b| b.plugin_id()).collect()
}

fn track_ids(panel: &TrackPluginList) -> Vec<PluginId> {
    panel
        .track()
        .borrow()
        .plugin_list()
        .iter()
        .map(|p| p.borrow().id())
        .collect()
}

#[test]
fn test_added_plugin_gets_last_button() {
    let (_edit, panel, message_loop) = panel();
    assert_eq!(panel.num_buttons(), 0);

    let delay = panel.add_plugin(&built_in_item("delay", "Delay")).unwrap();
    assert_eq!(panel.num_buttons(), 1);

    let squasher = panel
        .add_plugin(&CatalogItem::from_description(mock_description("Squasher", "Acme")))
        .unwrap();

    let ids = button_ids(&panel);
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], delay.borrow().id());
    assert_eq!(ids[1], squasher.borrow().id());
    assert_eq!(track_ids(&panel), ids);

    // The rebuild queued by the track changes agrees with the buttons
    message_loop.dispatch();
    assert_eq!(button_ids(&panel), ids);
}

#[test]
fn test_failed_creation_adds_nothing() {
    let (_edit, panel, _message_loop) = panel();

    assert!(panel.add_plugin(&built_in_item("noSuchType", "Nothing")).is_none());
    assert!(panel
        .add_plugin(&CatalogItem::from_description(mock_description("Ghost", "Acme")))
        .is_none());

    assert_eq!(panel.num_buttons(), 0);
    assert!(track_ids(&panel).is_empty());
}

#[test]
fn test_delete_removes_one_button() {
    let (_edit, panel, _message_loop) = panel();
    let a = panel.add_plugin(&built_in_item("delay", "Delay")).unwrap();
    let b = panel.add_plugin(&built_in_item("reverb", "Reverb")).unwrap();
    let (a_id, b_id) = (a.borrow().id(), b.borrow().id());

    assert!(panel.delete_plugin(a_id));
    assert_eq!(button_ids(&panel), vec![b_id]);
    assert_eq!(track_ids(&panel), vec![b_id]);

    assert!(!panel.delete_plugin(a_id));
    assert_eq!(panel.num_buttons(), 1);
}

#[test]
fn test_outside_changes_rebuild_once_on_dispatch() {
    let (edit, panel, message_loop) = panel();

    let ids: Vec<PluginId> = ["delay", "reverb", "chorus"]
        .iter()
        .map(|xml_type| {
            let plugin = edit
                .borrow_mut()
                .create_new_plugin(xml_type, &PluginDescription::default())
                .unwrap();
            let id = plugin.borrow().id();
            edit.borrow().insert_plugin(0, plugin, None).unwrap();
            id
        })
        .collect();

    // Nothing visible until the queued rebuild runs
    assert_eq!(panel.num_buttons(), 0);
    assert!(panel.is_update_pending());

    assert_eq!(message_loop.dispatch(), 1);
    assert!(!panel.is_update_pending());
    assert_eq!(button_ids(&panel), ids);
    assert!(!message_loop.has_pending_work());
}

#[test]
fn test_add_appends_while_buttons_are_stale() {
    let (edit, panel, _message_loop) = panel();

    let outside = edit
        .borrow_mut()
        .create_new_plugin("reverb", &PluginDescription::default())
        .unwrap();
    let outside_id = outside.borrow().id();
    edit.borrow().insert_plugin(0, outside, None).unwrap();
    assert_eq!(panel.num_buttons(), 0);

    let added = panel.add_plugin(&built_in_item("delay", "Delay")).unwrap();
    let added_id = added.borrow().id();

    assert_eq!(track_ids(&panel), vec![outside_id, added_id]);
}

#[test]
fn test_rebuild_retried_when_track_busy() {
    let (edit, panel, message_loop) = panel();
    let plugin = edit
        .borrow_mut()
        .create_new_plugin("chorus", &PluginDescription::default())
        .unwrap();
    let id = plugin.borrow().id();
    edit.borrow().insert_plugin(0, plugin, None).unwrap();

    {
        let _busy = panel.track().borrow_mut();
        assert_eq!(message_loop.dispatch(), 1);
    }
    assert_eq!(panel.num_buttons(), 0);
    assert!(panel.is_update_pending());

    assert_eq!(message_loop.dispatch(), 1);
    assert_eq!(button_ids(&panel), vec![id]);
    assert!(!panel.is_update_pending());
}

#[test]
fn test_reorder_is_followed() {
    let (_edit, panel, message_loop) = panel();
    let a = panel.add_plugin(&built_in_item("delay", "Delay")).unwrap();
    let b = panel.add_plugin(&built_in_item("reverb", "Reverb")).unwrap();
    let (a_id, b_id) = (a.borrow().id(), b.borrow().id());
    message_loop.dispatch();

    assert!(panel.track().borrow_mut().move_plugin(b_id, 0));
    message_loop.dispatch();

    assert_eq!(button_ids(&panel), vec![b_id, a_id]);
}

#[test]
fn test_clip_changes_do_not_rebuild() {
    let (_edit, panel, message_loop) = panel();
    let audio = Arc::new(session_engine::audio_file::AudioFile::from_samples(
        "/tmp/a.wav".into(),
        10,
        1,
        vec![0.0; 10],
    ));

    panel.track().borrow_mut().insert_wave_clip(
        "a",
        "/tmp/a.wav".into(),
        audio,
        TimeRange::with_length(0.0, 1.0),
    );

    assert!(!panel.is_update_pending());
    assert_eq!(message_loop.dispatch(), 0);
}

#[test]
fn test_button_labels_are_truncated_names() {
    let (_edit, panel, _message_loop) = panel();
    panel.add_plugin(&built_in_item("compressor", "")).unwrap();
    panel.add_plugin(&built_in_item("delay", "")).unwrap();

    let buttons = panel.buttons();
    assert_eq!(buttons[0].label(), "Compr");
    assert_eq!(buttons[0].label().chars().count(), LABEL_LENGTH);
    assert_eq!(buttons[1].label(), "Delay");
}

#[test]
fn test_dropped_panel_ignores_later_changes() {
    let (edit, panel, message_loop) = panel();
    drop(panel);

    let plugin = edit
        .borrow_mut()
        .create_new_plugin("delay", &PluginDescription::default())
        .unwrap();
    edit.borrow().insert_plugin(0, plugin, None).unwrap();

    assert_eq!(message_loop.dispatch(), 0);
}
