mod common;

use common::{formats_with, mock_description, MockFormat};
use session_engine::prelude::*;
use session_engine::scanner::PluginScanner;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn mixed_format() -> MockFormat {
    MockFormat {
        plugins: vec![
            mock_description("Squasher", "Acme"),
            mock_description("Widener", "Acme"),
        ],
        broken_files: vec![PathBuf::from("/plugins/Broken.vst3")],
        panicking_files: vec![PathBuf::from("/plugins/Crashy.vst3")],
        ..Default::default()
    }
}

#[test]
fn test_scan_reports_found_failed_and_blacklisted() {
    let scanner = PluginScanner::new(&formats_with(Arc::new(mixed_format())));

    let report = scanner.scan(&[]);

    let names: Vec<&str> = report.found.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Squasher", "Widener"]);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.blacklisted, vec![PathBuf::from("/plugins/Crashy.vst3")]);
    assert_eq!(report.skipped, 0);
}

#[test]
fn test_scan_skips_given_files() {
    let scanner = PluginScanner::new(&formats_with(Arc::new(mixed_format())));

    let report = scanner.scan(&[
        PathBuf::from("/plugins/Crashy.vst3"),
        PathBuf::from("/plugins/Broken.vst3"),
    ]);

    assert_eq!(report.found.len(), 2);
    assert!(report.failed.is_empty());
    assert!(report.blacklisted.is_empty());
    assert_eq!(report.skipped, 2);
}

#[test]
fn test_dead_mans_pedal_blacklists_crashed_file() {
    let dir = tempfile::tempdir().unwrap();
    let pedal = dir.path().join("scan-in-progress.txt");
    std::fs::write(&pedal, "/plugins/Squasher.vst3\n").unwrap();

    let format = MockFormat::with_plugins(vec![mock_description("Squasher", "Acme")]);
    let scanner = PluginScanner::new(&formats_with(Arc::new(format))).with_dead_mans_pedal(&pedal);

    assert_eq!(scanner.crashed_files(), vec![PathBuf::from("/plugins/Squasher.vst3")]);

    let report = scanner.scan(&[]);

    assert!(report.found.is_empty());
    assert_eq!(report.blacklisted, vec![PathBuf::from("/plugins/Squasher.vst3")]);
    assert_eq!(report.skipped, 1);

    // A finished scan leaves no pedal behind
    assert!(!pedal.exists());
    assert!(scanner.crashed_files().is_empty());
}

#[test]
fn test_pedal_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let pedal = dir.path().join("cache").join("scan-in-progress.txt");

    let format = MockFormat::with_plugins(vec![mock_description("Squasher", "Acme")]);
    let scanner = PluginScanner::new(&formats_with(Arc::new(format))).with_dead_mans_pedal(&pedal);

    let report = scanner.scan(&[]);

    assert_eq!(report.found.len(), 1);
    assert!(dir.path().join("cache").is_dir());
    assert!(!pedal.exists());
}

#[test]
fn test_unwritable_pedal_does_not_stop_scan() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let pedal = blocker.join("scan-in-progress.txt");

    let format = MockFormat::with_plugins(vec![
        mock_description("Squasher", "Acme"),
        mock_description("Widener", "Acme"),
    ]);
    let scanner = PluginScanner::new(&formats_with(Arc::new(format))).with_dead_mans_pedal(&pedal);

    let report = scanner.scan(&[]);

    assert_eq!(report.found.len(), 2);
    assert!(report.blacklisted.is_empty());
    assert!(!pedal.exists());
}

#[test]
fn test_scan_async_merges_into_known_list() {
    let message_loop = MessageLoop::new();
    let known = Rc::new(RefCell::new(KnownPluginList::new()));
    let scanner = PluginScanner::new(&formats_with(Arc::new(mixed_format())));

    let done = Rc::new(Cell::new(false));
    {
        let done = done.clone();
        scanner.scan_async(&message_loop, known.clone(), move |report| {
            assert_eq!(report.found.len(), 2);
            done.set(true);
        });
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    while !done.get() && Instant::now() < deadline {
        message_loop.dispatch();
        std::thread::sleep(Duration::from_millis(5));
    }

    assert!(done.get());
    let known = known.borrow();
    assert_eq!(known.len(), 2);
    assert!(known.is_blacklisted(&PathBuf::from("/plugins/Crashy.vst3")));
    assert!(!message_loop.has_pending_work());
}
