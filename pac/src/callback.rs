use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// A typed, nullable, cheaply-cloneable handle to one callable of signature
/// `fn(Args) -> R`, confined to a single thread.
///
/// This mirrors [`pac_runtime::Callback`] in every respect except ownership:
/// it shares its callable through an [`Rc`] rather than an [`Arc`], so it
/// carries no `Send`/`Sync` bound on the wrapped closure. That is
/// deliberate, not an oversight -- [`crate::signal::Signal`] is itself
/// confined to one thread (built on `Rc`/`RefCell`), and its slots routinely
/// capture other `Rc`-based, single-threaded application state. A slot that
/// must run on a different thread is not expressed by relaxing this type;
/// it is expressed by connecting a callback built from
/// [`pac_runtime::toe_callback`] (see [`crate::marshal::marshal`]), which
/// *is* `Send + Sync` because it only ever enqueues plain, captured
/// arguments onto another toe's context.
pub struct Callback<Args, R> {
    inner: Option<Rc<dyn Fn(Args) -> R>>,
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
        F: Fn(Args) -> R + 'static,
    {
        Callback {
            inner: Some(Rc::new(f)),
        }
    }

    /// Binds a method to an owner held by shared reference (`Rc<T>`).
    ///
    /// The receiver's lifetime is governed by the returned callback: as long
    /// as a clone of it is alive, `owner` stays alive too.
    pub fn from_method_shared<T, M>(owner: Rc<T>, method: M) -> Self
    where
        T: 'static,
        M: Fn(&T, Args) -> R + 'static,
        Args: 'static,
        R: 'static,
    {
        Callback::new(move |args| method(&owner, args))
    }

    /// Binds a method to an owner the callback takes ownership of.
    ///
    /// The owner is moved into shared storage so the callback stays
    /// cloneable; it is dropped along with the last surviving clone.
    pub fn from_method_owned<T, M>(owner: Box<T>, method: M) -> Self
    where
        T: 'static,
        M: Fn(&T, Args) -> R + 'static,
        Args: 'static,
        R: 'static,
    {
        let owner: Rc<T> = Rc::from(owner);
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
        T: 'static,
        M: Fn(&T, Args) -> R + 'static,
        Args: 'static,
        R: 'static,
    {
        // SAFETY: callers of this constructor uphold the pointer-validity
        // contract documented above; the pointer is only ever dereferenced
        // from inside `call`, never stored or inspected otherwise.
        Callback::new(move |args| method(unsafe { &*owner }, args))
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
