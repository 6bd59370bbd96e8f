mod common;

use common::{edit_with, write_wav, MockFormat};
use plugin_host::engine_helpers::*;
use session_engine::audio::AudioConfig;
use session_engine::clip::ClipId;
use session_engine::prelude::*;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn empty_edit() -> Edit {
    Edit::new(PluginFormatManager::new(), AudioConfig::default())
}

fn one_second_wav(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    write_wav(&path, 8000, 1, &vec![1000i16; 8000]);
    path
}

/// Dispatch until every background job has delivered its result
fn dispatch_until_idle(message_loop: &MessageLoop) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while message_loop.pending_jobs() > 0 {
        assert!(Instant::now() < deadline, "background job did not finish");
        std::thread::sleep(Duration::from_millis(5));
        message_loop.dispatch();
    }
}

#[test]
fn test_get_or_insert_audio_track_at() {
    let mut edit = empty_edit();

    let track = get_or_insert_audio_track_at(&mut edit, 2);
    assert_eq!(track.borrow().index(), 2);
    assert_eq!(edit.audio_tracks().len(), 3);

    let again = get_or_insert_audio_track_at(&mut edit, 0);
    assert_eq!(again.borrow().index(), 0);
    assert_eq!(edit.audio_tracks().len(), 3);
}

#[test]
fn test_load_audio_file_replaces_clips() {
    let dir = tempfile::tempdir().unwrap();
    let first = one_second_wav(dir.path(), "first.wav");
    let second = one_second_wav(dir.path(), "second.wav");
    let mut edit = empty_edit();

    assert!(load_audio_file_as_clip(&mut edit, &first).is_some());
    let id = load_audio_file_as_clip(&mut edit, &second).unwrap();

    let track = edit.audio_track(0).unwrap();
    let track = track.borrow();
    assert_eq!(track.clips().len(), 1);

    let clip = &track.clips()[0];
    assert_eq!(clip.id, id);
    assert_eq!(clip.name, "second");
    assert_eq!(clip.source_file, second);
    assert_eq!(clip.position.start, 0.0);
    assert!((clip.position.length() - 1.0).abs() < 1e-9);
}

#[test]
fn test_unreadable_file_leaves_edit_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut edit = empty_edit();

    assert!(load_audio_file_as_clip(&mut edit, &dir.path().join("missing.wav")).is_none());
    assert!(edit.audio_tracks().is_empty());

    let good = one_second_wav(dir.path(), "good.wav");
    load_audio_file_as_clip(&mut edit, &good).unwrap();

    let junk = dir.path().join("junk.wav");
    std::fs::write(&junk, b"RIFF but not really").unwrap();
    assert!(load_audio_file_as_clip(&mut edit, &junk).is_none());

    let track = edit.audio_track(0).unwrap();
    assert_eq!(track.borrow().clips().len(), 1);
    assert_eq!(track.borrow().clips()[0].name, "good");
}

#[test]
fn test_loop_around_clip_starts_playback() {
    let dir = tempfile::tempdir().unwrap();
    let file = one_second_wav(dir.path(), "loop.wav");
    let mut edit = empty_edit();
    let clip = load_audio_file_as_clip(&mut edit, &file).unwrap();
    edit.transport().set_position(0.5);

    assert!(loop_around_clip(&edit, 0, clip));

    let transport = edit.transport();
    assert!(transport.is_playing());
    assert!(transport.is_looping());
    assert_eq!(transport.position(), 0.0);
    assert_eq!(transport.loop_range(), TimeRange::with_length(0.0, 1.0));
}

#[test]
fn test_loop_around_unknown_clip_does_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let file = one_second_wav(dir.path(), "loop.wav");
    let mut edit = empty_edit();
    let clip = load_audio_file_as_clip(&mut edit, &file).unwrap();

    assert!(!loop_around_clip(&edit, 1, clip));
    assert!(!edit.transport().is_playing());
}

#[test]
fn test_remove_all_clips() {
    let dir = tempfile::tempdir().unwrap();
    let file = one_second_wav(dir.path(), "a.wav");
    let mut edit = empty_edit();
    load_audio_file_as_clip(&mut edit, &file).unwrap();

    let track = get_or_insert_audio_track_at(&mut edit, 0);
    remove_all_clips(&track);

    assert!(track.borrow().clips().is_empty());
}

#[test]
fn test_toggle_play() {
    let edit = edit_with(Arc::new(MockFormat::new(Vec::new())));
    let edit = edit.borrow();

    toggle_play(&edit);
    assert!(edit.transport().is_playing());
    toggle_play(&edit);
    assert!(!edit.transport().is_playing());
}

#[test]
fn test_async_load_places_clip_on_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let file = one_second_wav(dir.path(), "async.wav");
    let edit = Rc::new(RefCell::new(empty_edit()));
    let message_loop = MessageLoop::new();
    let loaded: Rc<RefCell<Option<Option<ClipId>>>> = Rc::default();

    {
        let loaded = loaded.clone();
        load_audio_file_as_clip_async(&message_loop, &edit, file.clone(), move |clip| {
            *loaded.borrow_mut() = Some(clip);
        });
    }

    // Nothing is decoded or placed until the completion is dispatched
    assert!(loaded.borrow().is_none());
    assert!(edit.borrow().audio_tracks().is_empty());
    assert_eq!(message_loop.pending_jobs(), 1);

    dispatch_until_idle(&message_loop);

    let result = *loaded.borrow();
    let clip = result.expect("completion called").expect("clip created");
    let track = edit.borrow().audio_track(0).unwrap();
    let track = track.borrow();
    assert_eq!(track.clips().len(), 1);
    assert_eq!(track.clips()[0].id, clip);
    assert_eq!(track.clips()[0].source_file, file);
}

#[test]
fn test_async_load_of_missing_file_reports_none() {
    let dir = tempfile::tempdir().unwrap();
    let edit = Rc::new(RefCell::new(empty_edit()));
    let message_loop = MessageLoop::new();
    let loaded: Rc<RefCell<Option<Option<ClipId>>>> = Rc::default();

    {
        let loaded = loaded.clone();
        let missing = dir.path().join("missing.wav");
        load_audio_file_as_clip_async(&message_loop, &edit, missing, move |clip| {
            *loaded.borrow_mut() = Some(clip);
        });
    }
    dispatch_until_idle(&message_loop);

    assert_eq!(*loaded.borrow(), Some(None));
    assert!(edit.borrow().audio_tracks().is_empty());
}

#[test]
fn test_async_load_after_edit_dropped_does_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let file = one_second_wav(dir.path(), "late.wav");
    let edit = Rc::new(RefCell::new(empty_edit()));
    let message_loop = MessageLoop::new();
    let called = Rc::new(std::cell::Cell::new(false));

    {
        let called = called.clone();
        load_audio_file_as_clip_async(&message_loop, &edit, file, move |_| called.set(true));
    }
    drop(edit);
    dispatch_until_idle(&message_loop);

    assert!(!called.get());
}
