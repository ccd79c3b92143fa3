use crate::callback::Callback;
use crate::runnable::Runnable;
use crate::toe::Toe;

/// Builds a marshalling adapter: given a target `toe` and a user `callback`
/// of signature `R(Args)`, returns a new callback of the *same* signature
/// that, when invoked from any thread, enqueues a one-shot runnable binding
/// `(callback, args)` into `toe`'s context and returns immediately.
///
/// This is the mechanism by which cross-thread signal delivery is achieved:
/// connect `toe_callback(target_toe, user_callback)` to a signal that is
/// emitted on a different thread than `target_toe` drains, and the user
/// callback ends up running on `target_toe`'s own thread instead of the
/// emitting one.
///
/// The returned callback always yields `R::default()` to its immediate
/// caller -- the user callback's actual return value is discarded, because
/// its real invocation is deferred.
pub fn toe_callback<Args, R>(toe: &Toe, callback: Callback<Args, R>) -> Callback<Args, R>
where
    Args: Clone + Send + 'static,
    R: Default + Send + 'static,
{
    let sink = toe.inner_handle();
    Callback::new(move |args: Args| {
        let mut runnable = Runnable::new(callback.clone(), args);
        runnable.set_once();
        sink.enqueue(Box::new(runnable));
        sink.notify();
        R::default()
    })
}
