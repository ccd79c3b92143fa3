//! Signal forwarding: presenting an existing signal under a different
//! callback signature by composing an input transform, a user slot, and an
//! output transform around a synthetic slot on the source signal.

use std::rc::Rc;

use crate::callback::Callback;
use crate::signal::{Connection, Signal};

/// Something a [`SignalForward`] can connect a synthetic slot onto.
///
/// Implemented by [`Signal`] itself (the base case) and by `SignalForward`
/// (so forwarders compose: a forwarder's target signature can itself be the
/// source signature for another forwarder). Whichever implementor sits at
/// the bottom of the chain determines `RootArgs`/`RootR`, the signature of
/// the [`Connection`] every `connect` call in the chain ultimately returns.
pub trait ForwardSource<Args, R> {
    /// The argument tuple of the signal at the root of the forwarding chain.
    type RootArgs: Clone;
    /// The return type of the signal at the root of the forwarding chain.
    type RootR: Default;

    /// Connects a synthetic slot of this source's own signature, returning
    /// a connection scoped to the root signal.
    fn connect_adapted(
        &self,
        callback: Callback<Args, R>,
    ) -> Connection<Self::RootArgs, Self::RootR>;
}

impl<Args, R> ForwardSource<Args, R> for Signal<Args, R>
where
    Args: Clone + 'static,
    R: Default + 'static,
{
    type RootArgs = Args;
    type RootR = R;

    fn connect_adapted(&self, callback: Callback<Args, R>) -> Connection<Args, R> {
        self.connect(callback)
    }
}

/// Adapts `Src`, a signal of signature `R(Args)`, into a signal of signature
/// `R2(Args2)` by composing an `in_transform: Args -> Args2`, a connected
/// user slot `R2(Args2)`, and an `out_transform: R2 -> R` into one synthetic
/// slot installed on `Src`.
///
/// `Src` is typically a [`Signal<Args, R>`], but may be another
/// `SignalForward` whose own target signature is `R(Args)`, letting
/// forwarders chain arbitrarily deep; every `connect` call anywhere in such
/// a chain returns a [`Connection`] scoped to the signal at the very root.
pub struct SignalForward<Src, Args, R, Args2, R2>
where
    Src: ForwardSource<Args, R>,
{
    source: Src,
    in_transform: Callback<Args, Args2>,
    out_transform: Callback<R2, R>,
}

impl<Src, Args, R, Args2, R2> SignalForward<Src, Args, R, Args2, R2>
where
    Src: ForwardSource<Args, R>,
    Args: Clone + 'static,
    R: Default + 'static,
    Args2: Clone + 'static,
    R2: Default + 'static,
{
    /// Builds a forwarder over `source` with explicit transforms.
    pub fn new(source: Src, in_transform: Callback<Args, Args2>, out_transform: Callback<R2, R>) -> Self {
        SignalForward {
            source,
            in_transform,
            out_transform,
        }
    }

    /// Connects `user_slot`, returning a connection on the root signal for
    /// the synthetic slot installed to adapt it.
    ///
    /// On each invocation of the synthetic slot: `in_transform` converts the
    /// source's arguments into `Args2`, `user_slot` is called with those,
    /// and `out_transform` converts its result back into `R` to satisfy the
    /// source's signature.
    pub fn connect(&self, user_slot: Callback<Args2, R2>) -> Connection<Src::RootArgs, Src::RootR> {
        let in_transform = self.in_transform.clone();
        let out_transform = self.out_transform.clone();
        let synthetic = Callback::new(move |args: Args| {
            let args2 = in_transform.call(args);
            let r2 = user_slot.call(args2);
            out_transform.call(r2)
        });
        self.source.connect_adapted(synthetic)
    }

    /// Convenience equivalent to `connect(Callback::from_method_shared(owner, method))`.
    pub fn connect_method<T, M>(&self, owner: Rc<T>, method: M) -> Connection<Src::RootArgs, Src::RootR>
    where
        T: 'static,
        M: Fn(&T, Args2) -> R2 + 'static,
    {
        self.connect(Callback::from_method_shared(owner, method))
    }
}

impl<Src, Args, R> SignalForward<Src, Args, R, Args, R>
where
    Src: ForwardSource<Args, R>,
    Args: Clone + 'static,
    R: Clone + Default + 'static,
{
    /// A forwarder whose in- and out-transforms are both identity: useful
    /// as a starting point when only one side of the signature actually
    /// changes, or simply to re-expose `source` through the `ForwardSource`
    /// trait for composition with another forwarder.
    pub fn passthrough(source: Src) -> Self {
        SignalForward::new(source, Callback::new(|args: Args| args), Callback::new(|r: R| r))
    }
}

impl<Src, Args, R, Args2, R2> ForwardSource<Args2, R2> for SignalForward<Src, Args, R, Args2, R2>
where
    Src: ForwardSource<Args, R>,
    Args: Clone + 'static,
    R: Default + 'static,
    Args2: Clone + 'static,
    R2: Default + 'static,
{
    type RootArgs = Src::RootArgs;
    type RootR = Src::RootR;

    fn connect_adapted(&self, callback: Callback<Args2, R2>) -> Connection<Src::RootArgs, Src::RootR> {
        self.connect(callback)
    }
}
