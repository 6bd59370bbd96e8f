mod common;

use common::{edit_with, MockFormat};
use session_engine::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

#[test]
fn test_play_and_stop_notify_listeners() {
    let edit = edit_with(Arc::new(MockFormat::default()));
    let events = Rc::new(RefCell::new(Vec::new()));

    let _subscription = {
        let events = events.clone();
        edit.transport().subscribe(move |event| events.borrow_mut().push(*event))
    };

    let transport = edit.transport();
    transport.play();
    transport.play();
    assert!(transport.is_playing());
    transport.stop();
    assert!(!transport.is_playing());

    // Repeated play does not notify twice
    assert_eq!(
        *events.borrow(),
        vec![
            TransportEvent::PlayStateChanged(true),
            TransportEvent::PlayStateChanged(false)
        ]
    );
}

#[test]
fn test_loop_range_and_position() {
    let edit = edit_with(Arc::new(MockFormat::default()));
    let transport = edit.transport();

    transport.set_loop_range(TimeRange::new(1.0, 3.0));
    transport.set_looping(true);
    transport.set_position(-5.0);

    assert!(transport.is_looping());
    assert_eq!(transport.loop_range(), TimeRange::new(1.0, 3.0));
    assert_eq!(transport.position(), 0.0);

    transport.set_position(2.5);
    assert_eq!(transport.position(), 2.5);

    // The audio side sees the same state
    let playhead = edit.playhead();
    let playhead = playhead.lock().unwrap();
    assert!(playhead.is_looping());
    assert_eq!(playhead.position(), 2.5);
}
