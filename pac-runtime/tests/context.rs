use pac_runtime::{Callback, Context, Runnable};

#[test]
fn fifo_order() {
    let mut ctx = Context::new();
    assert_eq!(ctx.count(), 0);
    ctx.push(Box::new(Runnable::new(Callback::<(), ()>::new(|()| {}), ())));
    ctx.push(Box::new(Runnable::new(Callback::<(), ()>::new(|()| {}), ())));
    assert_eq!(ctx.count(), 2);
    assert!(ctx.pop_front().is_some());
    assert_eq!(ctx.count(), 1);
    ctx.clear();
    assert_eq!(ctx.count(), 0);
    assert!(ctx.pop_front().is_none());
}

#[test]
fn owning_thread_id_roundtrip() {
    let mut ctx = Context::new();
    assert!(ctx.owning_thread_id().is_none());
    let id = std::thread::current().id();
    ctx.set_owning_thread_id(id);
    assert_eq!(ctx.owning_thread_id(), Some(id));
}
