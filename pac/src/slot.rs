use crate::callback::Callback;

/// The signal-owned wrapper around one connected callback.
///
/// A slot is created by [`crate::signal::Signal::connect`] and removed by
/// the signal's cleanup pass (or immediately, if no dispatch is currently in
/// progress). Its identity for the lifetime of its owning signal is the
/// `slot_id` the signal assigns it, not anything stored on the slot itself.
pub(crate) struct Slot<Args, R> {
    pub(crate) callback: Callback<Args, R>,
    pub(crate) blocked: bool,
    pub(crate) delete_requested: bool,
}

impl<Args, R> Slot<Args, R> {
    pub(crate) fn new(callback: Callback<Args, R>) -> Self {
        Slot {
            callback,
            blocked: false,
            delete_requested: false,
        }
    }
}
