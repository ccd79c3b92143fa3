//! The bridge between a [`Signal`](crate::Signal)'s single-threaded slots and
//! [`pac_runtime`]'s cross-thread marshalling adapter.

use crate::callback::Callback;

/// Wraps `callback`, a `pac_runtime` callback meant to run on `toe`'s own
/// thread, into a single-threaded [`Callback`] suitable for connecting to a
/// [`crate::Signal`] that is emitted on some other thread.
///
/// Invoking the returned callback (i.e. emitting the signal it is connected
/// to) enqueues `callback`'s real invocation onto `toe`'s context and
/// returns immediately; the actual call happens later, on `toe`'s worker
/// thread. This is the mechanism described in the specification as
/// "wrapping the user callback in `toe_callback(T, user_cb)` before
/// connecting": `marshal` performs that wrap and also adapts the result back
/// into the non-`Send` [`Callback`] type a [`crate::Signal`] expects.
pub fn marshal<Args, R>(toe: &pac_runtime::Toe, callback: pac_runtime::Callback<Args, R>) -> Callback<Args, R>
where
    Args: Clone + Send + 'static,
    R: Default + Send + 'static,
{
    let marshalled = pac_runtime::toe_callback(toe, callback);
    Callback::new(move |args: Args| marshalled.call(args))
}
