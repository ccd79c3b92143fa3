#![warn(clippy::pedantic)]
#![warn(missing_docs)]

//! The thread-affine execution substrate behind `pac`.
//!
//! This crate has no notion of slots or signals; it provides the four
//! building blocks a GUI-style embedding calls directly:
//!
//! - [`Callback`]: a typed, nullable, cheaply-cloneable function handle.
//! - [`Runnable`]: a callback bound to its captured arguments.
//! - [`Context`]: a FIFO of runnables belonging to one thread.
//! - [`Toe`]: the driver that owns a context and runs it, either
//!   synchronously or on a dedicated worker thread, with pause / resume /
//!   quit and a thread-safe [`Toe::add_callback`] enqueue entry point.
//!
//! [`toe_callback`] ties threads together: given a target toe and a user
//! callback, it produces a new callback of the same signature that
//! marshals its invocation onto the target toe's own thread.

mod callback;
mod context;
mod runnable;
mod toe;
mod toe_callback;

pub use callback::Callback;
pub use context::Context;
pub use runnable::{AnyRunnable, Runnable, Status};
pub use toe::{LaunchMode, Toe, ToeConfig, ToeState};
pub use toe_callback::toe_callback;
