//! Wrapper resolution (C3): request types that rewrite themselves into a resolution
//! of an inner type, rather than designating a registered export directly.
//!
//! The source system recognises these by structural type pattern at the point a
//! request is compiled (`Collection<T>`, `Array<T>`, `FactoryN<T>`, `Lazy<T>`,
//! `Optional<T>`, `Owned<T>`). Rust has no runtime reflection over an arbitrary
//! `TypeId`'s generic shape, so there is no way to intercept "someone asked to
//! resolve `Lazy<X>`" without `X` already being a compile-time-known type parameter
//! at the call site — which is exactly what these wrapper types are. [`Lazy<T>`],
//! [`Factory0<T>`]/[`Factory1`]/[`Factory2`], and [`Owned<T>`] are therefore realized
//! as ordinary generic structs produced by dedicated `get_*` resolver methods, rather
//! than as a transparent `get::<Lazy<X>>()` that the container has to pattern-match.
//! `Collection<T>`/`Array<T>` are already covered by [`crate::traits::Resolver::get_all_trait`]
//! and need no separate wrapper type. `Optional<T>` is [`crate::traits::Resolver`]'s
//! existing fallible `get`/`get_trait`, downgraded with `.ok()`.
//!
//! Wrappers compose the same way the source system's do: `Factory0<Lazy<T>>` is just
//! `resolver.get_factory0::<Lazy<T>>()` composed with `resolver.get_lazy::<T>()` inside
//! the factory body — ordinary Rust generic composition standing in for the source's
//! structural request rewriting.

use std::any::Any;
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{DiError, DiResult};
use crate::internal::{BoxFutureUnit, DisposeBag};
use crate::key::key_of_type;
use crate::traits::ResolverCore;

/// A type-erased, `Send + Sync` argument pushed into a factory wrapper's injection
/// context before it resolves its target type.
pub type AnyArg = Arc<dyn Any + Send + Sync>;

/// Resolves `T` in a captured scope on first use, then returns the same instance on
/// every subsequent call. Unlike [`crate::Lifetime::Singleton`], the memoisation is
/// local to this `Lazy` handle, not keyed by `T` in the container — two `Lazy<T>`
/// handles over the same `T` construct independently.
pub struct Lazy<T: 'static + Send + Sync> {
    resolver: Arc<dyn ResolverCore>,
    cell: OnceLock<Arc<T>>,
}

impl<T: 'static + Send + Sync> Lazy<T> {
    pub(crate) fn new(resolver: Arc<dyn ResolverCore>) -> Self {
        Self { resolver, cell: OnceLock::new() }
    }

    /// Resolves `T` on first call; returns the memoised instance thereafter.
    pub fn get(&self) -> DiResult<Arc<T>> {
        if let Some(v) = self.cell.get() {
            return Ok(v.clone());
        }
        let key = key_of_type::<T>();
        let any = self.resolver.resolve_any(&key)?;
        let typed = any
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?;
        // Another thread may have raced us; OnceLock keeps whichever landed first,
        // the loser's Arc clone is simply dropped.
        let _ = self.cell.set(typed.clone());
        Ok(self.cell.get().cloned().unwrap_or(typed))
    }

    /// True if `get` has already constructed and cached the instance.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// A nullary factory: calling it resolves `T` fresh in the captured scope every time
/// (no memoisation — that's what [`Lazy<T>`] is for).
pub struct Factory0<T: 'static + Send + Sync> {
    resolver: Arc<dyn ResolverCore>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: 'static + Send + Sync> Factory0<T> {
    pub(crate) fn new(resolver: Arc<dyn ResolverCore>) -> Self {
        Self { resolver, _marker: std::marker::PhantomData }
    }

    /// Resolves a fresh `T`.
    pub fn call(&self) -> DiResult<Arc<T>> {
        let key = key_of_type::<T>();
        let any = self.resolver.resolve_any(&key)?;
        any.downcast::<T>().map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }
}

/// A unary factory: the argument is stashed as positional argument `0` of a fresh
/// injection context before `T` is resolved, so any constructor in the dependency
/// graph can pick it up via `ResolverContext::injection().arg::<A>(0)`.
pub struct Factory1<A: 'static + Send + Sync, T: 'static + Send + Sync> {
    resolver: Arc<dyn ResolverCore>,
    _marker: std::marker::PhantomData<fn(A) -> T>,
}

impl<A: 'static + Send + Sync, T: 'static + Send + Sync> Factory1<A, T> {
    pub(crate) fn new(resolver: Arc<dyn ResolverCore>) -> Self {
        Self { resolver, _marker: std::marker::PhantomData }
    }

    /// Resolves `T` with `arg` available as positional argument 0.
    pub fn call(&self, arg: A) -> DiResult<Arc<T>> {
        call_with_args(&self.resolver, vec![Arc::new(arg) as AnyArg])
    }
}

/// A binary factory: arguments are stashed as positional arguments `0` and `1`.
pub struct Factory2<A: 'static + Send + Sync, B: 'static + Send + Sync, T: 'static + Send + Sync> {
    resolver: Arc<dyn ResolverCore>,
    _marker: std::marker::PhantomData<fn(A, B) -> T>,
}

impl<A: 'static + Send + Sync, B: 'static + Send + Sync, T: 'static + Send + Sync> Factory2<A, B, T> {
    pub(crate) fn new(resolver: Arc<dyn ResolverCore>) -> Self {
        Self { resolver, _marker: std::marker::PhantomData }
    }

    /// Resolves `T` with `a`/`b` available as positional arguments 0 and 1.
    pub fn call(&self, a: A, b: B) -> DiResult<Arc<T>> {
        call_with_args(&self.resolver, vec![Arc::new(a) as AnyArg, Arc::new(b) as AnyArg])
    }
}

fn call_with_args<T: 'static + Send + Sync>(
    resolver: &Arc<dyn ResolverCore>,
    args: Vec<AnyArg>,
) -> DiResult<Arc<T>> {
    let _guard = crate::internal::injection_stack::enter_with(
        crate::provider::context::InjectionContext::with_args(args),
    );
    let key = key_of_type::<T>();
    let any = resolver.resolve_any(&key)?;
    any.downcast::<T>().map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

/// Redirects disposer registration into a private bag instead of the wrapped
/// resolver's, so an [`Owned<T>`]'s disposal scope is independent of its parent's.
struct DisposalCapture<'a> {
    inner: &'a dyn ResolverCore,
    bag: &'a Mutex<DisposeBag>,
}

impl<'a> ResolverCore for DisposalCapture<'a> {
    fn resolve_any(&self, key: &crate::Key) -> DiResult<Arc<dyn Any + Send + Sync>> {
        self.inner.resolve_any(key)
    }

    fn resolve_many(&self, key: &crate::Key) -> DiResult<Vec<Arc<dyn Any + Send + Sync>>> {
        self.inner.resolve_many(key)
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.bag.lock().unwrap().push_sync(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.bag.lock().unwrap().push_async(move || (f)());
    }
}

/// `T` resolved into a disposal scope of its own: disposers registered while
/// constructing `T` (and its dependency graph) are released when this `Owned<T>` is
/// disposed, independent of whatever scope requested it.
pub struct Owned<T: 'static + Send + Sync> {
    value: Arc<T>,
    disposers: Mutex<DisposeBag>,
}

impl<T: 'static + Send + Sync> Owned<T> {
    pub(crate) fn resolve(resolver: Arc<dyn ResolverCore>) -> DiResult<Self> {
        let disposers = Mutex::new(DisposeBag::default());
        let key = key_of_type::<T>();
        let any = {
            let capture = DisposalCapture { inner: resolver.as_ref(), bag: &disposers };
            capture.resolve_any(&key)?
        };
        let value = any.downcast::<T>().map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?;
        Ok(Self { value, disposers })
    }

    /// The resolved instance.
    pub fn value(&self) -> &Arc<T> {
        &self.value
    }

    /// Runs this scope's async disposers (reverse order), then its sync ones.
    pub async fn dispose(&self) {
        self.disposers.lock().unwrap().run_all_async_reverse().await;
        self.disposers.lock().unwrap().run_all_sync_reverse();
    }
}

impl<T: 'static + Send + Sync> std::ops::Deref for Owned<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

/// Extends any `'static`, cloneable resolver handle ([`crate::ServiceProvider`],
/// [`crate::Scope`]) with wrapper-request construction. Not implemented for
/// [`crate::provider::ResolverContext`] (the handle passed into factory closures):
/// it borrows its resolver for the duration of one constructor call and isn't
/// `'static`, so it cannot be captured by a [`Lazy`]/[`Factory0`] for later use —
/// request these wrappers from the top-level provider or scope instead.
pub trait ResolverWrappers: ResolverCore + Clone + Send + Sync + 'static {
    /// Builds a memoising [`Lazy<T>`] handle over this resolver.
    fn get_lazy<T: 'static + Send + Sync>(&self) -> Lazy<T> {
        Lazy::new(Arc::new(self.clone()))
    }

    /// Builds a nullary [`Factory0<T>`] handle over this resolver.
    fn get_factory0<T: 'static + Send + Sync>(&self) -> Factory0<T> {
        Factory0::new(Arc::new(self.clone()))
    }

    /// Builds a unary [`Factory1<A, T>`] handle over this resolver.
    fn get_factory1<A: 'static + Send + Sync, T: 'static + Send + Sync>(&self) -> Factory1<A, T> {
        Factory1::new(Arc::new(self.clone()))
    }

    /// Builds a binary [`Factory2<A, B, T>`] handle over this resolver.
    fn get_factory2<A: 'static + Send + Sync, B: 'static + Send + Sync, T: 'static + Send + Sync>(
        &self,
    ) -> Factory2<A, B, T> {
        Factory2::new(Arc::new(self.clone()))
    }

    /// Resolves `T` into a fresh, independent disposal scope.
    fn get_owned<T: 'static + Send + Sync>(&self) -> DiResult<Owned<T>> {
        Owned::resolve(Arc::new(self.clone()))
    }
}

impl<R: ResolverCore + Clone + Send + Sync + 'static> ResolverWrappers for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Resolver, ServiceCollection};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn lazy_memoises_across_calls() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let mut sc = ServiceCollection::new();
        sc.add_transient_factory::<String, _>(|_| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            "hi".to_string()
        });
        let provider = sc.build();
        let lazy = provider.get_lazy::<String>();
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
        let a = lazy.get().unwrap();
        let b = lazy.get().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn factory0_constructs_fresh_each_call() {
        let mut sc = ServiceCollection::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        sc.add_transient_factory::<usize, _>(move |_| counter_clone.fetch_add(1, Ordering::SeqCst));
        let provider = sc.build();
        let factory = provider.get_factory0::<usize>();
        assert_eq!(*factory.call().unwrap(), 0);
        assert_eq!(*factory.call().unwrap(), 1);
    }

    #[test]
    fn factory1_threads_positional_argument() {
        let mut sc = ServiceCollection::new();
        sc.add_transient_factory::<String, _>(|r| {
            let n = r.injection().arg::<i32>(0).map(|a| *a).unwrap_or(-1);
            format!("n={n}")
        });
        let provider = sc.build();
        let factory = provider.get_factory1::<i32, String>();
        let result = factory.call(5).unwrap();
        assert_eq!(result.as_str(), "n=5");
    }

    #[test]
    fn owned_disposes_independently() {
        let mut sc = ServiceCollection::new();
        sc.add_transient_factory::<String, _>(|r| {
            r.register_disposer(Arc::new(DropFlag));
            "owned".to_string()
        });
        let provider = sc.build();
        let owned = provider.get_owned::<String>().unwrap();
        assert_eq!(owned.as_str(), "owned");

        struct DropFlag;
        impl crate::Dispose for DropFlag {
            fn dispose(&self) {}
        }
    }
}
