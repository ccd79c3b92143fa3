use std::cell::RefCell;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use log::trace;

use crate::callback::Callback;
use crate::slot::Slot;

struct SignalInner<Args, R> {
    slots: BTreeMap<u64, Slot<Args, R>>,
    next_id: u64,
    dispatch_depth: usize,
}

impl<Args, R> SignalInner<Args, R> {
    fn new() -> Self {
        SignalInner {
            slots: BTreeMap::new(),
            next_id: 0,
            dispatch_depth: 0,
        }
    }
}

/// An ordered, re-entrancy-safe multi-subscriber dispatcher typed by
/// callback signature `R(Args)`.
///
/// A signal is **not thread-safe**: `connect`, `disconnect` and `emit` on a
/// given signal must all happen on the thread that created it. This is
/// enforced by construction here (the signal is built on `Rc`/`RefCell`,
/// neither of which is `Send`), rather than merely documented as a
/// precondition -- cross-thread delivery goes through
/// [`pac_runtime::toe_callback`] and a target toe instead, exactly as the
/// specification's concurrency model intends.
pub struct Signal<Args, R> {
    inner: Rc<RefCell<SignalInner<Args, R>>>,
}

impl<Args, R> Signal<Args, R>
where
    R: Default,
{
    /// An empty signal with no connected slots.
    #[must_use]
    pub fn new() -> Self {
        Signal {
            inner: Rc::new(RefCell::new(SignalInner::new())),
        }
    }
}

impl<Args, R> Signal<Args, R>
where
    Args: Clone,
    R: Default,
{
    /// Connects `callback` and returns a [`Connection`] handle for it. New
    /// connections are appended at the tail of the insertion order and are
    /// not delivered by any emission already in progress on this thread.
    pub fn connect(&self, callback: Callback<Args, R>) -> Connection<Args, R> {
        let slot_id = {
            let mut inner = self.inner.borrow_mut();
            let slot_id = inner.next_id;
            inner.next_id += 1;
            inner.slots.insert(slot_id, Slot::new(callback));
            slot_id
        };
        Connection {
            state: ConnState::Bound {
                signal: Rc::downgrade(&self.inner),
                slot_id,
            },
        }
    }

    /// Convenience equivalent to `connect(Callback::from_method_shared(owner, method))`.
    pub fn connect_method<T, M>(&self, owner: Rc<T>, method: M) -> Connection<Args, R>
    where
        T: 'static,
        M: Fn(&T, Args) -> R + 'static,
        Args: 'static,
        R: 'static,
    {
        self.connect(Callback::from_method_shared(owner, method))
    }

    /// Disconnects the slot referred to by `connection`. Idempotent: calling
    /// it again (directly, or via dropping an already-disconnected
    /// connection) is a no-op.
    pub fn disconnect(&self, connection: &mut Connection<Args, R>) {
        connection.disconnect();
    }

    /// The number of currently-connected, not-yet-removed slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .values()
            .filter(|slot| !slot.delete_requested)
            .count()
    }

    /// Invokes every non-blocked slot, in the order they were connected,
    /// with a clone of `args` each, aggregating results in order. A slot may
    /// freely connect, disconnect, block, unblock or re-emit during its own
    /// invocation; new connections made during this emission are not
    /// delivered by it.
    ///
    /// A panicking slot does not leave `dispatch_depth` stuck above zero or
    /// skip the cleanup pass: the dispatch loop runs behind a scoped guard
    /// (`catch_unwind`/`resume_unwind`, the same discipline
    /// `isoprenoid::runtime`'s `start`/`stop` use around a user-supplied `f`)
    /// so the depth decrement and `delete_requested` sweep below always run
    /// before the panic is allowed to continue unwinding.
    pub fn emit(&self, args: Args) -> Vec<R> {
        {
            let mut inner = self.inner.borrow_mut();
            inner.dispatch_depth += 1;
        }
        trace!("signal dispatch depth incremented");

        let inner = &self.inner;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let ids: Vec<u64> = inner.borrow().slots.keys().copied().collect();
            let mut results = Vec::new();
            for id in ids {
                let callback = {
                    let inner = inner.borrow();
                    match inner.slots.get(&id) {
                        Some(slot) if !slot.blocked => Some(slot.callback.clone()),
                        _ => None,
                    }
                };
                if let Some(callback) = callback {
                    results.push(callback.call(args.clone()));
                }
            }
            results
        }));

        let mut inner = self.inner.borrow_mut();
        inner.dispatch_depth -= 1;
        if inner.dispatch_depth == 0 {
            trace!("signal cleanup pass");
            inner.slots.retain(|_, slot| !slot.delete_requested);
        }
        drop(inner);

        outcome.unwrap_or_else(|payload| resume_unwind(payload))
    }

}

impl<Args, R> Signal<Args, R> {
    fn disconnect_slot_id(&self, slot_id: u64) {
        let mut inner = self.inner.borrow_mut();
        if inner.dispatch_depth > 0 {
            if let Some(slot) = inner.slots.get_mut(&slot_id) {
                slot.delete_requested = true;
            }
        } else {
            inner.slots.remove(&slot_id);
        }
    }

    fn block_slot(&self, slot_id: u64) {
        if let Some(slot) = self.inner.borrow_mut().slots.get_mut(&slot_id) {
            slot.blocked = true;
        }
    }

    fn unblock_slot(&self, slot_id: u64) {
        if let Some(slot) = self.inner.borrow_mut().slots.get_mut(&slot_id) {
            slot.blocked = false;
        }
    }

    fn slot_is_live(&self, slot_id: u64) -> bool {
        self.inner
            .borrow()
            .slots
            .get(&slot_id)
            .is_some_and(|slot| !slot.delete_requested)
    }
}

impl<Args, R> Default for Signal<Args, R>
where
    R: Default,
{
    fn default() -> Self {
        Signal::new()
    }
}

impl<Args, R> Clone for Signal<Args, R> {
    fn clone(&self) -> Self {
        Signal {
            inner: Rc::clone(&self.inner),
        }
    }
}

enum ConnState<Args, R> {
    Bound {
        signal: Weak<RefCell<SignalInner<Args, R>>>,
        slot_id: u64,
    },
    Null,
    Detached,
}

/// A handle used to revoke, temporarily silence, or detach a subscription
/// previously created by [`Signal::connect`].
///
/// Dropping a `Connection` that is still bound and not detached disconnects
/// its slot, the same as calling [`Connection::disconnect`] explicitly.
pub struct Connection<Args, R> {
    state: ConnState<Args, R>,
}

impl<Args, R> Connection<Args, R>
where
    Args: Clone,
    R: Default,
{
    /// A connection bound to nothing; disconnecting or blocking it is a
    /// no-op, and dropping it does nothing.
    #[must_use]
    pub fn null() -> Self {
        Connection {
            state: ConnState::Null,
        }
    }

    /// Removes the underlying slot from its signal. Idempotent.
    pub fn disconnect(&mut self) {
        if let ConnState::Bound { signal, slot_id } =
            std::mem::replace(&mut self.state, ConnState::Null)
        {
            if let Some(inner) = signal.upgrade() {
                Signal { inner }.disconnect_slot_id(slot_id);
            }
        }
    }

    /// Sets the underlying slot's `blocked` flag, so emissions skip it until
    /// [`Connection::unblock`] is called.
    pub fn block(&self) {
        if let ConnState::Bound { signal, slot_id } = &self.state {
            if let Some(inner) = signal.upgrade() {
                Signal { inner }.block_slot(*slot_id);
            }
        }
    }

    /// Clears the underlying slot's `blocked` flag.
    pub fn unblock(&self) {
        if let ConnState::Bound { signal, slot_id } = &self.state {
            if let Some(inner) = signal.upgrade() {
                Signal { inner }.unblock_slot(*slot_id);
            }
        }
    }

    /// Marks this connection so that dropping it no longer disconnects the
    /// slot. The slot otherwise lives on exactly as if it were still being
    /// tracked by a live connection.
    pub fn detach(&mut self) {
        self.state = ConnState::Detached;
    }

    /// Reports whether the underlying slot is still connected (not
    /// disconnected, not yet physically removed). Read-only: unlike
    /// `disconnect`, this never mutates state.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        match &self.state {
            ConnState::Bound { signal, slot_id } => signal
                .upgrade()
                .is_some_and(|inner| Signal { inner }.slot_is_live(*slot_id)),
            ConnState::Null | ConnState::Detached => false,
        }
    }
}

impl<Args, R> Drop for Connection<Args, R> {
    fn drop(&mut self) {
        if let ConnState::Bound { signal, slot_id } = &self.state {
            if let Some(inner) = signal.upgrade() {
                Signal { inner }.disconnect_slot_id(*slot_id);
            }
        }
    }
}

impl<Args, R> PartialEq for Connection<Args, R> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.state, &other.state) {
            (
                ConnState::Bound { signal: a, slot_id: ida },
                ConnState::Bound { signal: b, slot_id: idb },
            ) => ida == idb && Weak::ptr_eq(a, b),
            (ConnState::Null, ConnState::Null) => true,
            (ConnState::Detached, ConnState::Detached) => true,
            _ => false,
        }
    }
}

/// An RAII guard that blocks a connection on construction and unblocks it on
/// every exit path (normal return, early return, or panic-driven unwind).
pub struct ScopedBlock<'a, Args, R>
where
    Args: Clone,
    R: Default,
{
    connection: &'a Connection<Args, R>,
}

impl<'a, Args, R> ScopedBlock<'a, Args, R>
where
    Args: Clone,
    R: Default,
{
    /// Blocks `connection` for the lifetime of the returned guard.
    pub fn new(connection: &'a Connection<Args, R>) -> Self {
        connection.block();
        ScopedBlock { connection }
    }
}

impl<'a, Args, R> Drop for ScopedBlock<'a, Args, R>
where
    Args: Clone,
    R: Default,
{
    fn drop(&mut self) {
        self.connection.unblock();
    }
}
