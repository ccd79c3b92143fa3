use crate::callback::Callback;

/// The outcome of running a [`Runnable`] once.
///
/// `Invalid` and the callback-driven statuses are produced by the core;
/// `Abort` and `Interrupted` are produced only after [`Runnable::abort`] or
/// [`Runnable::interrupt`] has been called out of band (for example by a
/// connection that wants to cancel a still-queued runnable without running
/// its callback).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The runnable has no callback to invoke.
    Invalid,
    /// The runnable ran and should be re-queued to run again.
    Continuing,
    /// The runnable ran for the last time (a `once` runnable).
    Finished,
    /// The runnable was aborted before it could run again.
    Abort,
    /// The runnable was interrupted before it could run again.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Active,
    Aborted,
    Interrupted,
}

/// A callback bound to its call-site arguments, ready to run without further
/// input.
///
/// Arguments are captured **by value** at construction time: mutating the
/// variable a caller passed in afterwards has no effect on what `run`
/// observes.
pub struct Runnable<Args, R> {
    callback: Callback<Args, R>,
    args: Args,
    once: bool,
    run_state: RunState,
}

impl<Args, R> Runnable<Args, R>
where
    Args: Clone,
    R: Default,
{
    /// Captures `callback` and `args` for later execution.
    pub fn new(callback: Callback<Args, R>, args: Args) -> Self {
        Runnable {
            callback,
            args,
            once: false,
            run_state: RunState::Active,
        }
    }

    /// Marks this runnable as single-shot: after its next run it reports
    /// [`Status::Finished`] instead of [`Status::Continuing`].
    pub fn set_once(&mut self) {
        self.once = true;
    }

    /// Requests that the next `run` (and all subsequent ones) report
    /// [`Status::Abort`] without invoking the callback.
    pub fn abort(&mut self) {
        self.run_state = RunState::Aborted;
    }

    /// Requests that the next `run` (and all subsequent ones) report
    /// [`Status::Interrupted`] without invoking the callback.
    pub fn interrupt(&mut self) {
        self.run_state = RunState::Interrupted;
    }

    /// Runs the stored callback with the captured arguments, if any, and
    /// reports the resulting status. The callback's return value is
    /// computed and discarded; `Runnable` exists to schedule side effects,
    /// not to hand back results.
    pub fn run(&mut self) -> Status {
        match self.run_state {
            RunState::Aborted => return Status::Abort,
            RunState::Interrupted => return Status::Interrupted,
            RunState::Active => {}
        }
        if self.callback.is_empty() {
            return Status::Invalid;
        }
        let _ = self.callback.call(self.args.clone());
        if self.once {
            Status::Finished
        } else {
            Status::Continuing
        }
    }
}

/// Object-safe handle to a [`Runnable`] of any signature, used so a
/// [`crate::context::Context`] can hold a single homogeneous queue.
pub trait AnyRunnable: Send {
    /// See [`Runnable::run`].
    fn run(&mut self) -> Status;
}

impl<Args, R> AnyRunnable for Runnable<Args, R>
where
    Args: Clone + Send,
    R: Default + Send,
{
    fn run(&mut self) -> Status {
        Runnable::run(self)
    }
}
