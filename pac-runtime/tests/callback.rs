use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pac_runtime::Callback;

#[test]
fn empty_callback_returns_default() {
    let cb: Callback<(i32,), i32> = Callback::empty();
    assert_eq!(cb.call((5,)), 0);
    assert!(cb.is_empty());
}

#[test]
fn closure_is_invoked() {
    let cb = Callback::new(|(x,): (i32,)| x * 2);
    assert_eq!(cb.call((21,)), 42);
}

#[test]
fn clone_shares_state() {
    let counter = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&counter);
    let cb: Callback<(), ()> = Callback::new(move |()| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    let cb2 = cb.clone();
    cb.call(());
    cb2.call(());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn from_method_shared_dereferences_owner() {
    struct Counter(AtomicUsize);
    let owner = Arc::new(Counter(AtomicUsize::new(10)));
    let cb = Callback::from_method_shared(owner, |owner: &Counter, (x,): (usize,)| {
        owner.0.load(Ordering::SeqCst) + x
    });
    assert_eq!(cb.call((5,)), 15);
}

#[test]
fn from_method_raw_dereferences_owner() {
    struct Value(i32);
    let value = Value(7);
    let cb = unsafe {
        Callback::from_method_raw(&value as *const Value, |v: &Value, (x,): (i32,)| v.0 + x)
    };
    assert_eq!(cb.call((3,)), 10);
}

#[test]
fn from_method_owned_takes_ownership() {
    struct Value(i32);
    let cb = Callback::from_method_owned(Box::new(Value(4)), |v: &Value, (x,): (i32,)| v.0 + x);
    assert_eq!(cb.call((6,)), 10);
}
