use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, trace, warn};

use crate::callback::Callback;
use crate::context::Context;
use crate::runnable::{Runnable, Status};

/// The default bound for [`ToeConfig::idle_poll`]: how long an idle toe
/// waits on its condition variable before re-checking for `quit`/`pause`.
const DEFAULT_IDLE_POLL: Duration = Duration::from_millis(10);

/// Construction-time tuning knobs for a [`Toe`].
///
/// The only recognized tunable is `idle_poll`: the bound on how long the
/// worker sleeps when its queue is empty before it wakes up to re-check for
/// quit or pause requests. There is nothing else to configure; the toe has
/// no other external inputs.
#[derive(Debug, Clone, Copy)]
pub struct ToeConfig {
    idle_poll: Duration,
}

impl ToeConfig {
    /// Default configuration: a 10 ms idle poll.
    #[must_use]
    pub fn new() -> Self {
        ToeConfig {
            idle_poll: DEFAULT_IDLE_POLL,
        }
    }

    /// Overrides the idle-poll bound.
    #[must_use]
    pub fn idle_poll(mut self, duration: Duration) -> Self {
        self.idle_poll = duration;
        self
    }
}

impl Default for ToeConfig {
    fn default() -> Self {
        ToeConfig::new()
    }
}

/// The lifecycle state of a [`Toe`], exposed for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToeState {
    /// Constructed but not yet launched.
    NotStarted,
    /// Draining its context.
    Running,
    /// Paused; its context is not being drained.
    Paused,
    /// `quit` has been requested; the worker is winding down.
    Quitting,
    /// The worker has returned.
    Stopped,
}

/// How a [`Toe`] should run its context when launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Drive the run loop on the calling thread, blocking until stopped.
    Sync,
    /// Spawn a dedicated worker thread and return immediately.
    Async,
}

/// Shared state behind a [`Toe`], kept alive independently of the `Toe`
/// handle so that a [`crate::toe_callback::toe_callback`] closure (or the
/// spawned worker thread itself) can keep marshalling work after the owning
/// `Toe` value has been dropped.
struct Inner {
    context: Mutex<Context>,
    cv: Condvar,
    pauseme: AtomicBool,
    quitme: AtomicBool,
    state: Mutex<ToeState>,
    config: ToeConfig,
}

impl Inner {
    fn is_on_toe_thread(&self) -> bool {
        self.context.lock().unwrap().owning_thread_id() == Some(thread::current().id())
    }

    fn set_state(&self, state: ToeState) {
        *self.state.lock().unwrap() = state;
    }

    /// Pushes a one-shot runnable binding `(callback, args)` and wakes the
    /// worker. This is the single thread-safe entry point through which any
    /// caller, on any thread, may enqueue work -- both [`Toe::add_callback`]
    /// and [`crate::toe_callback::toe_callback`] funnel through it.
    fn add_callback<Args, R>(&self, callback: Callback<Args, R>, args: Args)
    where
        Args: Clone + Send + 'static,
        R: Default + Send + 'static,
    {
        let mut runnable = Runnable::new(callback, args);
        runnable.set_once();
        {
            let mut ctx = self.context.lock().unwrap();
            ctx.push(Box::new(runnable));
        }
        self.cv.notify_all();
    }

    fn pause(&self) {
        self.pauseme.store(true, Ordering::SeqCst);
        self.cv.notify_all();
        if self.is_on_toe_thread() {
            self.wait_while_paused();
        }
    }

    fn resume(&self) {
        self.pauseme.store(false, Ordering::SeqCst);
        self.cv.notify_all();
    }

    fn quit(&self) {
        self.quitme.store(true, Ordering::SeqCst);
        self.resume();
    }

    fn wait_while_paused(&self) {
        debug!("toe pausing");
        self.set_state(ToeState::Paused);
        let mut guard = self.context.lock().unwrap();
        while self.pauseme.load(Ordering::SeqCst) && !self.quitme.load(Ordering::SeqCst) {
            guard = self.cv.wait(guard).unwrap();
        }
        drop(guard);
        if !self.quitme.load(Ordering::SeqCst) {
            debug!("toe resuming");
            self.set_state(ToeState::Running);
        }
    }

    fn idle(&self) {
        let guard = self.context.lock().unwrap();
        let _ = self.cv.wait_timeout(guard, self.config.idle_poll).unwrap();
    }

    fn sleep_for(&self, duration: Duration) {
        if self.is_on_toe_thread() {
            thread::sleep(duration);
        }
    }

    fn run_loop(self: &Arc<Self>) {
        {
            let mut ctx = self.context.lock().unwrap();
            ctx.set_owning_thread_id(thread::current().id());
        }
        self.set_state(ToeState::Running);
        // Ensures the toe is observably `Stopped` even if a runnable's panic
        // unwinds straight through this function, so `Toe::is_running()`
        // reflects a dead worker the same way a dead `JoinHandle` does.
        let _stop_on_exit = StopOnDrop(self);
        loop {
            if self.pauseme.load(Ordering::SeqCst) {
                self.wait_while_paused();
            }
            if self.quitme.load(Ordering::SeqCst) {
                break;
            }
            let popped = {
                let mut ctx = self.context.lock().unwrap();
                ctx.pop_front()
            };
            match popped {
                Some(mut runnable) => {
                    trace!("toe running queued runnable");
                    let outcome = catch_unwind(AssertUnwindSafe(|| runnable.run()));
                    match outcome {
                        Ok(Status::Continuing) => {
                            let mut ctx = self.context.lock().unwrap();
                            ctx.push(runnable);
                        }
                        Ok(Status::Finished | Status::Abort | Status::Interrupted | Status::Invalid) => {}
                        Err(payload) => {
                            warn!("runnable panicked; dropping it and re-raising");
                            resume_unwind(payload);
                        }
                    }
                }
                None => self.idle(),
            }
        }
    }
}

/// Sets a toe's state to `Stopped` on drop, whether `run_loop` returned
/// normally or a runnable's panic unwound straight through it.
struct StopOnDrop<'a>(&'a Inner);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set_state(ToeState::Stopped);
        debug!("toe stopped");
    }
}

/// The cooperative execution driver: owns a [`Context`], runs its runnables
/// either synchronously or on a dedicated thread, and offers pause / resume
/// / quit plus a thread-safe enqueue entry point ([`Toe::add_callback`]).
///
/// Dropping a `Toe` requests `quit` and joins its worker before releasing
/// its context, so an application never leaks a still-running thread by
/// simply letting a `Toe` go out of scope.
pub struct Toe {
    inner: Arc<Inner>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Toe {
    /// A toe with a freshly allocated context and default configuration.
    #[must_use]
    pub fn new() -> Self {
        Toe::with_config(ToeConfig::default())
    }

    /// A toe configured with `config`.
    #[must_use]
    pub fn with_config(config: ToeConfig) -> Self {
        Toe {
            inner: Arc::new(Inner {
                context: Mutex::new(Context::new()),
                cv: Condvar::new(),
                pauseme: AtomicBool::new(false),
                quitme: AtomicBool::new(false),
                state: Mutex::new(ToeState::NotStarted),
                config,
            }),
            worker: Mutex::new(None),
        }
    }

    /// The toe's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ToeState {
        *self.inner.state.lock().unwrap()
    }

    /// Shorthand for `state() == ToeState::Running || state() == ToeState::Paused`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state(), ToeState::Running | ToeState::Paused)
    }

    /// Starts draining the context, per `mode`. `Sync` blocks the calling
    /// thread until the toe is stopped; `Async` spawns a worker thread and
    /// returns immediately.
    pub fn launch(&self, mode: LaunchMode) {
        match mode {
            LaunchMode::Sync => self.inner.run_loop(),
            LaunchMode::Async => {
                let inner = Arc::clone(&self.inner);
                let handle = thread::Builder::new()
                    .name("pac-toe".into())
                    .spawn(move || inner.run_loop())
                    .expect("failed to spawn toe worker thread");
                *self.worker.lock().unwrap() = Some(handle);
            }
        }
    }

    /// Requests a pause. Off the toe's own thread this returns immediately
    /// once the flag is set; the worker suspends the next time it checks.
    /// Called from the toe's own thread (i.e. from inside a running
    /// runnable) it blocks the caller until [`Toe::resume`] is called.
    pub fn pause(&self) {
        self.inner.pause();
    }

    /// Clears the pause flag and wakes any waiter.
    pub fn resume(&self) {
        self.inner.resume();
    }

    /// Requests that the toe stop draining its context, and wakes a paused
    /// worker so it can observe the request and exit promptly.
    pub fn quit(&self) {
        self.inner.quit();
    }

    /// Blocks until the worker thread launched by `launch(Async)` has
    /// terminated. A no-op if the toe was launched synchronously or not at
    /// all.
    pub fn join(&self) {
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    /// Pushes a one-shot runnable binding `(callback, args)` onto the
    /// context and wakes the worker. Safe to call from any thread.
    pub fn add_callback<Args, R>(&self, callback: Callback<Args, R>, args: Args)
    where
        Args: Clone + Send + 'static,
        R: Default + Send + 'static,
    {
        self.inner.add_callback(callback, args);
    }

    /// Cooperatively sleeps the toe's own thread for `duration`. A no-op
    /// when called from any other thread.
    pub fn sleep_for(&self, duration: Duration) {
        self.inner.sleep_for(duration);
    }

    /// The number of runnables currently queued, for diagnostics and tests.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.inner.context.lock().unwrap().count()
    }

    pub(crate) fn inner_handle(&self) -> Arc<dyn ToeSink> {
        Arc::clone(&self.inner) as Arc<dyn ToeSink>
    }
}

impl Default for Toe {
    fn default() -> Self {
        Toe::new()
    }
}

impl Drop for Toe {
    fn drop(&mut self) {
        self.inner.quit();
        self.join();
    }
}

/// Object-safe marshalling target used by [`crate::toe_callback::toe_callback`]
/// so it does not need to know about `Toe`'s worker-thread bookkeeping --
/// only about the thread-safe enqueue entry point.
pub(crate) trait ToeSink: Send + Sync {
    fn enqueue(&self, runnable: Box<dyn crate::runnable::AnyRunnable>);
    fn notify(&self);
}

impl ToeSink for Inner {
    fn enqueue(&self, runnable: Box<dyn crate::runnable::AnyRunnable>) {
        let mut ctx = self.context.lock().unwrap();
        ctx.push(runnable);
    }

    fn notify(&self) {
        self.cv.notify_all();
    }
}
