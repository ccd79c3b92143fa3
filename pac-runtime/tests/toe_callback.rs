use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pac_runtime::{toe_callback, Callback, LaunchMode, Toe};

#[test]
fn marshals_onto_the_toes_own_thread() {
    let toe = Toe::new();
    toe.launch(LaunchMode::Async);

    let (tx, rx) = mpsc::channel();
    let user_cb = Callback::new(move |(x,): (i32,)| {
        tx.send((thread::current().id(), x)).unwrap();
    });
    let marshalled = toe_callback(&toe, user_cb);

    let calling_thread = thread::current().id();
    marshalled.call((42,)); // returns promptly, before the user cb runs

    let (recorded_thread, recorded_value) = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(recorded_value, 42);
    assert_ne!(recorded_thread, calling_thread);

    toe.quit();
    toe.join();
}

#[test]
fn returns_default_immediately() {
    let toe = Toe::new();
    toe.launch(LaunchMode::Async);
    let marshalled: Callback<(i32,), i32> = toe_callback(&toe, Callback::new(|(x,): (i32,)| x * 2));
    assert_eq!(marshalled.call((5,)), 0);
    toe.quit();
    toe.join();
}
