#![warn(clippy::pedantic)]
#![warn(missing_docs)]

//! Signals, connections and forwarding adapters for Presentation-Abstraction-
//! Control style applications, built on the thread-affine execution
//! substrate in [`pac_runtime`].
//!
//! This crate adds the pieces `pac_runtime` deliberately knows nothing
//! about:
//!
//! - [`Signal`]: an ordered, re-entrancy-safe multi-subscriber dispatcher
//!   typed by callback signature.
//! - [`Connection`] and [`ScopedBlock`]: handles to revoke, silence, or
//!   detach a subscription.
//! - [`forward::SignalForward`]: an adapter presenting one signal under a
//!   different callback signature, by composing an input transform, a user
//!   slot, and an output transform around a synthetic slot on the source.
//! - [`Callback`]: a single-threaded counterpart to
//!   [`pac_runtime::Callback`] used for every slot a [`Signal`] holds, since
//!   a signal is itself confined to one thread and its slots routinely
//!   capture other `Rc`-based, single-threaded state.
//! - [`marshal`]: the glue that lets a slot connected on one thread actually
//!   run on another, by wrapping a [`pac_runtime::toe_callback`] behind this
//!   crate's local [`Callback`].
//!
//! A signal's `connect`/`disconnect`/`emit` must all happen on the thread
//! that created it -- this is enforced by construction (`Signal` is built on
//! `Rc`/`RefCell`, neither of which is `Send`), not merely documented as a
//! precondition. Cross-thread delivery goes through [`marshal::marshal`] and
//! a target [`pac_runtime::Toe`] instead.

mod callback;
mod forward;
mod marshal;
mod signal;
mod slot;

pub use callback::Callback;
pub use forward::{ForwardSource, SignalForward};
pub use marshal::marshal;
pub use signal::{Connection, ScopedBlock, Signal};
