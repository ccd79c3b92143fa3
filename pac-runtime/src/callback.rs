use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// A typed, nullable, cheaply-cloneable handle to one callable of signature
/// `fn(Args) -> R`.
///
/// `Args` is the tuple of argument types (`()` for no arguments, `(i32,)` for
/// one, `(i32, i32)` for two, and so on); `R` is the return type. A
/// [`Callback`] may be empty, in which case calling it yields `R::default()`
/// without invoking anything -- this is what lets signals, forwarders and
/// marshalling adapters hold a placeholder slot before a real one is wired
/// up.
///
/// Cloning a callback shares the underlying callable through an [`Arc`]; the
/// callable itself is dropped once the last handle referencing it is
/// dropped.
pub struct Callback<Args, R> {
    inner: Option<Arc<dyn Fn(Args) -> R + Send + Sync>>,
}

impl<Args, R> Callback<Args, R>
where
    R: Default,
{
    /// The empty callback. Calling it returns `R::default()`.
    #[must_use]
    pub fn empty() -> Self {
        Callback { inner: None }
    }

    /// Wraps a free function, function object, or closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Args) -> R + Send + Sync + 'static,
    {
        Callback {
            inner: Some(Arc::new(f)),
        }
    }

    /// Binds a method to an owner held by shared reference (`Arc<T>`).
    ///
    /// The receiver's lifetime is governed by the returned callback: as long
    /// as a clone of it is alive, `owner` stays alive too.
    pub fn from_method_shared<T, M>(owner: Arc<T>, method: M) -> Self
    where
        T: Send + Sync + 'static,
        M: Fn(&T, Args) -> R + Send + Sync + 'static,
    {
        Callback::new(move |args| method(&owner, args))
    }

    /// Binds a method to an owner the callback takes ownership of.
    ///
    /// The owner is moved into shared storage so the callback stays
    /// cloneable; it is dropped along with the last surviving clone.
    pub fn from_method_owned<T, M>(owner: Box<T>, method: M) -> Self
    where
        T: Send + Sync + 'static,
        M: Fn(&T, Args) -> R + Send + Sync + 'static,
    {
        let owner: Arc<T> = Arc::from(owner);
        Callback::new(move |args| method(&owner, args))
    }

    /// Binds a method to an owner referenced by a raw, unowned pointer.
    ///
    /// # Safety
    ///
    /// `owner` must remain valid and not be mutably aliased for as long as
    /// any clone of the returned callback may still be invoked. No lifetime
    /// or ownership tracking is performed; this mirrors a plain C++ `this`
    /// pointer capture and carries the same obligations.
    pub unsafe fn from_method_raw<T, M>(owner: *const T, method: M) -> Self
    where
        T: Sync + 'static,
        M: Fn(&T, Args) -> R + Send + Sync + 'static,
    {
        // SAFETY: callers of this constructor uphold the pointer-validity
        // contract documented above; we only ever dereference `owner` from
        // inside `call`, never store or inspect the address otherwise.
        struct SendPtr<T>(*const T);
        unsafe impl<T: Sync> Send for SendPtr<T> {}
        unsafe impl<T: Sync> Sync for SendPtr<T> {}

        let ptr = SendPtr(owner);
        Callback::new(move |args| method(unsafe { &*ptr.0 }, args))
    }

    /// Invokes the stored callable with `args`, or returns `R::default()` if
    /// this callback is empty. Never panics on its own account; a panic
    /// raised by the underlying callable propagates to the caller.
    pub fn call(&self, args: Args) -> R {
        match &self.inner {
            Some(f) => f(args),
            None => R::default(),
        }
    }

    /// Returns `true` if this handle holds no callable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }
}

impl<Args, R> Clone for Callback<Args, R> {
    fn clone(&self) -> Self {
        Callback {
            inner: self.inner.clone(),
        }
    }
}

impl<Args, R> Default for Callback<Args, R>
where
    R: Default,
{
    fn default() -> Self {
        Callback::empty()
    }
}

impl<Args, R> Debug for Callback<Args, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("empty", &self.inner.is_none())
            .finish()
    }
}
