mod common;

use common::{edit_with, mock_description, MockFormat, MockWindows};
use plugin_host::plugin_window::{PluginWindowManager, MOVE_SETTLE_INTERVAL, RECREATE_DELAY, RESIZE_LIMITS};
use session_engine::audio::AudioConfig;
use session_engine::plugin::EXTERNAL_XML_TYPE;
use session_engine::prelude::*;
use session_engine::rack::{new_rack_identifier, RACK_XML_TYPE};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Fixture {
    format: Arc<MockFormat>,
    edit: EditHandle,
    message_loop: MessageLoop,
    windows: MockWindows,
    manager: PluginWindowManager,
}

impl Fixture {
    fn new() -> Self {
        let format = Arc::new(MockFormat::new(vec![mock_description("Squasher", "Acme")]));
        let edit = edit_with(format.clone());
        let message_loop = MessageLoop::new();
        let windows = MockWindows::default();
        let manager = PluginWindowManager::new(edit.clone(), message_loop.clone(), Box::new(windows.clone()));
        Self {
            format,
            edit,
            message_loop,
            windows,
            manager,
        }
    }

    fn add(&self, xml_type: &str, desc: &PluginDescription) -> PluginHandle {
        let plugin = self.edit.borrow_mut().create_new_plugin(xml_type, desc).unwrap();
        self.edit.borrow().insert_plugin(0, plugin.clone(), None).unwrap();
        plugin
    }

    fn add_squasher(&self) -> PluginHandle {
        self.add(EXTERNAL_XML_TYPE, &mock_description("Squasher", "Acme"))
    }

    fn changes(&self) -> (Rc<RefCell<Vec<PluginId>>>, Subscription) {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let subscription = {
            let changes = changes.clone();
            self.edit.borrow().subscribe(move |event| {
                if let EditEvent::PluginChanged(id) = event {
                    changes.borrow_mut().push(*id);
                }
            })
        };
        (changes, subscription)
    }
}

#[test]
fn test_showing_twice_keeps_one_window() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();

    assert!(f.manager.show_window_explicitly(&plugin));
    assert!(f.manager.show_window_explicitly(&plugin));

    assert_eq!(f.manager.num_open_windows(), 1);
    assert_eq!(f.windows.count(), 1);
    assert_eq!(f.windows.last().borrow().brought_to_front, 1);
    assert_eq!(f.windows.last().borrow().title, "Squasher");
    assert!(f.manager.is_native(id));
    assert!(f.manager.has_editor(id));
    assert_eq!(f.format.control.attached(), 1);
    assert!(plugin.borrow().window_state().window_open);
}

#[test]
fn test_native_window_fits_editor() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();

    f.manager.show_window_explicitly(&plugin);

    let bounds = f.manager.window_bounds(id).unwrap();
    assert_eq!((bounds.width, bounds.height), (400, 300));
    assert!(!f.manager.is_resizable(id));
    assert!(!f.windows.last().borrow().resizable);
}

#[test]
fn test_plugins_without_native_view_get_generic_editor() {
    let f = Fixture::new();
    let reverb = f.add("reverb", &PluginDescription::default());
    let id = reverb.borrow().id();

    assert!(f.manager.show_window_explicitly(&reverb));

    assert!(f.manager.is_window_open(id));
    assert!(!f.manager.is_native(id));
    assert!(f.manager.is_resizable(id));
    assert_eq!(f.windows.count(), 0);
}

#[test]
fn test_failed_native_window_falls_back_to_generic_editor() {
    let f = Fixture::new();
    *f.windows.fail.borrow_mut() = true;
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();

    assert!(f.manager.show_window_explicitly(&plugin));
    assert!(!f.manager.is_native(id));
    assert!(f.manager.has_editor(id));
}

#[test]
fn test_no_window_for_racks_or_plugins_without_parameters() {
    let f = Fixture::new();
    let rack = f.add(
        RACK_XML_TYPE,
        &PluginDescription {
            file_or_identifier: new_rack_identifier(),
            ..Default::default()
        },
    );
    let text = f.add("text", &PluginDescription::default());

    assert!(!f.manager.show_window_explicitly(&rack));
    assert!(!f.manager.show_window_explicitly(&text));
    assert_eq!(f.manager.num_open_windows(), 0);
}

#[test]
fn test_no_window_for_plugin_that_failed_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");

    let f = Fixture::new();
    f.add_squasher();
    f.edit.borrow().save(&file).unwrap();

    f.format.control.fail_instances.store(true, Ordering::SeqCst);
    let mut formats = PluginFormatManager::new();
    formats.add_format(f.format.clone());
    let edit = Edit::load(&file, formats, AudioConfig::default()).unwrap().into_handle();
    let placeholder = edit.borrow().audio_track(0).unwrap().borrow().plugin_list().get(0).cloned().unwrap();
    assert!(placeholder.borrow().is_missing_instance());

    let manager = PluginWindowManager::new(edit, MessageLoop::new(), Box::new(f.windows.clone()));
    assert!(!manager.show_window_explicitly(&placeholder));
}

#[test]
fn test_settled_move_is_saved_once() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();
    let (changes, _subscription) = f.changes();

    f.manager.show_window_explicitly(&plugin);
    let window = f.windows.last();
    let start = Instant::now();

    f.manager.update(start);
    let moved = window.borrow().bounds.with_position(300, 200);
    window.borrow_mut().bounds = moved;

    f.manager.update(start + Duration::from_millis(10));
    f.manager.update(start + Duration::from_millis(100));
    assert!(changes.borrow().is_empty());
    assert_ne!(plugin.borrow().window_state().last_window_bounds, Some(moved));

    f.manager.update(start + Duration::from_millis(10) + MOVE_SETTLE_INTERVAL);
    f.manager.update(start + Duration::from_secs(2));

    assert_eq!(plugin.borrow().window_state().last_window_bounds, Some(moved));
    assert_eq!(*changes.borrow(), vec![id]);
    assert!(f.edit.borrow().has_changed_since_saved());
}

#[test]
fn test_moves_in_progress_restart_the_settle_timer() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    let (changes, _subscription) = f.changes();

    f.manager.show_window_explicitly(&plugin);
    let window = f.windows.last();
    let start = Instant::now();

    for step in 0..5 {
        window.borrow_mut().bounds.x += 10;
        f.manager.update(start + Duration::from_millis(100 * step));
    }
    assert!(changes.borrow().is_empty());

    f.manager.update(start + Duration::from_millis(400) + MOVE_SETTLE_INTERVAL);
    assert_eq!(changes.borrow().len(), 1);
}

#[test]
fn test_reopened_window_uses_saved_position() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();
    plugin.borrow_mut().window_state_mut().last_window_bounds = Some(Bounds::new(321, 123, 10, 10));

    f.manager.show_window_explicitly(&plugin);
    assert_eq!(f.windows.last().borrow().bounds.position(), (321, 123));

    f.manager.close_window_explicitly(id);
    assert!(!f.manager.is_window_open(id));
    assert!(f.windows.last().borrow().closed);
    assert!(plugin.borrow().window_state().was_explicitly_closed);
    assert!(!plugin.borrow().window_state().window_open);

    f.manager.show_window_explicitly(&plugin);
    assert_eq!(f.windows.count(), 2);
    assert_eq!(f.windows.last().borrow().bounds.position(), (321, 123));
    assert!(!plugin.borrow().window_state().was_explicitly_closed);
}

#[test]
fn test_offscreen_position_is_pulled_back() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    plugin.borrow_mut().window_state_mut().last_window_bounds = Some(Bounds::new(-5000, -40, 400, 300));

    f.manager.show_window_explicitly(&plugin);

    let bounds = f.windows.last().borrow().bounds;
    assert!(bounds.x + bounds.width >= 50);
    assert_eq!(bounds.y, 0);
}

#[test]
fn test_user_close_request_closes_window() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();
    f.manager.show_window_explicitly(&plugin);

    f.windows.last().borrow_mut().close_requested = true;
    f.manager.update(Instant::now());

    assert!(!f.manager.is_window_open(id));
    assert!(plugin.borrow().window_state().was_explicitly_closed);
    assert_eq!(f.format.control.detached(), 1);
}

#[test]
fn test_deleting_plugin_closes_its_window_on_dispatch() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();
    f.manager.show_window_explicitly(&plugin);
    plugin.borrow_mut().set_parameter(0, 0.7).unwrap();

    assert!(f.edit.borrow().delete_plugin(id).is_some());
    assert!(f.manager.is_window_open(id));

    f.message_loop.dispatch();

    assert!(!f.manager.is_window_open(id));
    assert!(f.windows.last().borrow().closed);
    // Pending state is flushed as the window goes
    assert!(!plugin.borrow().is_state_dirty());
    assert!(!plugin.borrow().window_state().was_explicitly_closed);
}

#[test]
fn test_recreate_requests_are_debounced() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();
    f.manager.show_window_explicitly(&plugin);
    assert_eq!(f.format.control.created(), 1);

    f.manager.recreate_editor_async(id);
    f.manager.recreate_editor_async(id);
    f.manager.recreate_editor_async(id);

    // Torn down at once, rebuilt later
    assert!(!f.manager.has_editor(id));
    assert_eq!(f.format.control.detached(), 1);

    f.message_loop.dispatch();
    assert!(!f.manager.has_editor(id));

    f.message_loop
        .dispatch_at(Instant::now() + RECREATE_DELAY + Duration::from_millis(10));

    assert!(f.manager.has_editor(id));
    assert_eq!(f.format.control.created(), 2);
    assert_eq!(f.format.control.attached(), 2);
    assert_eq!(f.windows.count(), 1);
}

#[test]
fn test_recreate_after_close_does_nothing() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();
    f.manager.show_window_explicitly(&plugin);

    f.manager.recreate_editor_async(id);
    f.manager.close_window_explicitly(id);
    f.message_loop
        .dispatch_at(Instant::now() + RECREATE_DELAY + Duration::from_millis(10));

    assert_eq!(f.format.control.created(), 1);
    assert!(!f.manager.is_window_open(id));
}

#[test]
fn test_resizable_editor_follows_window_within_limits() {
    let f = Fixture::new();
    f.format.control.resizable.store(true, Ordering::SeqCst);
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();
    f.manager.show_window_explicitly(&plugin);
    assert!(f.manager.is_resizable(id));

    f.windows.last().borrow_mut().content_size = (5000, 20);
    f.manager.update(Instant::now());

    let expected = RESIZE_LIMITS.clamp(5000, 20);
    assert_eq!(f.format.control.size(), expected);
    assert_eq!(f.windows.last().borrow().content_size, expected);
}

#[test]
fn test_fixed_size_editor_resizing_itself_resizes_window() {
    let f = Fixture::new();
    let plugin = f.add_squasher();
    let id = plugin.borrow().id();
    let (changes, _subscription) = f.changes();
    f.manager.show_window_explicitly(&plugin);

    f.format.control.set_size(640, 480);
    f.manager.update(Instant::now());

    assert_eq!(f.windows.last().borrow().content_size, (640, 480));
    assert_eq!(changes.borrow().first(), Some(&id));
}

#[test]
fn test_close_all_on_drop() {
    let f = Fixture::new();
    let a = f.add_squasher();
    let b = f.add("reverb", &PluginDescription::default());
    f.manager.show_window_explicitly(&a);
    f.manager.show_window_explicitly(&b);
    assert_eq!(f.manager.num_open_windows(), 2);

    let Fixture { manager, windows, .. } = f;
    drop(manager);

    assert!(windows.last().borrow().closed);
    assert!(!a.borrow().window_state().window_open);
    assert!(!b.borrow().window_state().window_open);
    assert!(!a.borrow().window_state().was_explicitly_closed);
}
