use std::cell::{Cell, RefCell};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use pac::{Callback, Connection, ScopedBlock, Signal};

#[test]
fn s1_add_signal() {
    let sig: Signal<(i32,), i32> = Signal::new();
    let _c1 = sig.connect(Callback::new(|(x,): (i32,)| x * 2));
    assert_eq!(sig.emit((5,)), vec![10]);

    let c2 = sig.connect(Callback::new(|(x,): (i32,)| x + 7));
    assert_eq!(sig.emit((5,)), vec![10, 12]);

    let mut c2 = c2;
    c2.disconnect();
    assert_eq!(sig.emit((5,)), vec![10]);
}

#[test]
fn s2_reentrant_disconnect() {
    let sig: Signal<(i32,), ()> = Signal::new();
    let invoked_a = Rc::new(Cell::new(0));
    let invoked_b = Rc::new(Cell::new(0));

    let conn_b = Rc::new(RefCell::new(sig.connect(Callback::new({
        let invoked_b = Rc::clone(&invoked_b);
        move |(_,): (i32,)| invoked_b.set(invoked_b.get() + 1)
    }))));

    {
        let sig_for_a = sig.clone();
        let conn_b_for_a = Rc::clone(&conn_b);
        let invoked_a = Rc::clone(&invoked_a);
        let _conn_a = sig.connect(Callback::new(move |(x,): (i32,)| {
            invoked_a.set(invoked_a.get() + 1);
            conn_b_for_a.borrow_mut().disconnect();
            let _ = &sig_for_a;
            let _ = x;
        }));
    }

    sig.emit((1,));
    assert_eq!(invoked_a.get(), 1);
    assert!(invoked_b.get() <= 1);

    let snapshot = invoked_b.get();
    sig.emit((1,));
    assert_eq!(invoked_b.get(), snapshot, "B must never run again");
}

#[test]
fn s3_block_during_emission_nested() {
    let sig: Signal<(i32,), ()> = Signal::new();
    let invocations = Rc::new(Cell::new(0));
    let depth = Rc::new(Cell::new(0));

    let sig_clone = sig.clone();
    let invocations_clone = Rc::clone(&invocations);
    let depth_clone = Rc::clone(&depth);
    let conn = Rc::new(RefCell::new(Connection::null()));
    let conn_for_closure = Rc::clone(&conn);

    *conn.borrow_mut() = sig.connect(Callback::new(move |(x,): (i32,)| {
        invocations_clone.set(invocations_clone.get() + 1);
        let d = depth_clone.get();
        depth_clone.set(d + 1);
        if d == 0 {
            let guard = ScopedBlock::new(&conn_for_closure.borrow());
            sig_clone.emit((x,));
            sig_clone.emit((x,));
            drop(guard);
        }
        depth_clone.set(depth_clone.get() - 1);
    }));

    sig.emit((1,));
    assert_eq!(invocations.get(), 1, "outer call delivers once, inner calls skip it");
    let _ = conn;
}

#[test]
fn scoped_block_unblocks_on_drop() {
    let sig: Signal<(), i32> = Signal::new();
    let conn = sig.connect(Callback::new(|()| 1));
    {
        let _guard = ScopedBlock::new(&conn);
        assert_eq!(sig.emit(()), Vec::<i32>::new());
    }
    assert_eq!(sig.emit(()), vec![1]);
}

#[test]
fn disconnect_is_idempotent() {
    let sig: Signal<(), ()> = Signal::new();
    let mut conn = sig.connect(Callback::new(|()| {}));
    conn.disconnect();
    conn.disconnect();
    assert!(!conn.is_connected());
}

#[test]
fn drop_disconnects_unless_detached() {
    let sig: Signal<(), i32> = Signal::new();
    {
        let _conn = sig.connect(Callback::new(|()| 1));
    }
    assert_eq!(sig.emit(()), Vec::<i32>::new());

    let mut conn = sig.connect(Callback::new(|()| 2));
    conn.detach();
    drop(conn);
    assert_eq!(sig.emit(()), vec![2]);
}

#[test]
fn slot_count_tracks_live_slots() {
    let sig: Signal<(), ()> = Signal::new();
    assert_eq!(sig.slot_count(), 0);
    let c1 = sig.connect(Callback::new(|()| {}));
    let mut c2 = sig.connect(Callback::new(|()| {}));
    assert_eq!(sig.slot_count(), 2);
    c2.disconnect();
    assert_eq!(sig.slot_count(), 1);
    drop(c1);
    assert_eq!(sig.slot_count(), 0);
}

#[test]
fn connect_method_binds_to_owner() {
    struct Counter(Cell<i32>);
    let owner = Rc::new(Counter(Cell::new(100)));
    let sig: Signal<(i32,), i32> = Signal::new();
    let _conn = sig.connect_method(Rc::clone(&owner), |owner: &Counter, (x,): (i32,)| {
        owner.0.get() + x
    });
    assert_eq!(sig.emit((5,)), vec![105]);
}

#[test]
fn panicking_slot_still_decrements_dispatch_depth_and_cleans_up() {
    let sig: Signal<(), i32> = Signal::new();
    let mut panicking = sig.connect(Callback::new(|()| -> i32 { panic!("boom") }));
    let survivor_calls = Rc::new(Cell::new(0));
    let survivor_calls_clone = Rc::clone(&survivor_calls);
    let mut survivor = sig.connect(Callback::new(move |()| {
        survivor_calls_clone.set(survivor_calls_clone.get() + 1);
        0
    }));

    let result = catch_unwind(AssertUnwindSafe(|| sig.emit(())));
    assert!(result.is_err(), "the panic must still propagate to the caller");

    // Disconnect both slots now that control is back with the caller. If the
    // panic had left `dispatch_depth` stuck above zero, this would only ever
    // flip `delete_requested` (never physically remove the slot), and the
    // cleanup pass that would otherwise erase it can only run once
    // `dispatch_depth` returns to zero -- which, stuck, it never would.
    panicking.disconnect();
    survivor.disconnect();

    // A disconnected slot must never fire again. With `dispatch_depth` stuck,
    // it would still be sitting in the slot map (delete_requested but never
    // swept), and each `emit` rebuilds its id list straight from that map
    // without consulting `delete_requested` -- so it would keep firing on
    // every future emission instead of being skipped.
    assert_eq!(sig.emit(()), Vec::<i32>::new());
    assert_eq!(survivor_calls.get(), 0, "a disconnected slot must not have run");
}

#[test]
fn new_connections_during_emit_are_not_delivered_this_round() {
    let sig: Signal<(), i32> = Signal::new();
    let sig_for_slot = sig.clone();
    let connected_late = Rc::new(RefCell::new(None));
    let connected_late_for_slot = Rc::clone(&connected_late);
    let _conn = sig.connect(Callback::new(move |()| {
        *connected_late_for_slot.borrow_mut() =
            Some(sig_for_slot.connect(Callback::new(|()| 99)));
        1
    }));
    assert_eq!(sig.emit(()), vec![1], "the slot connected mid-emit must not run yet");
    assert_eq!(sig.emit(()), vec![1, 99], "but it runs on the next emission");
}
