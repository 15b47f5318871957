//! Resolver context for dependency injection.
//!
//! This module contains the `ResolverContext` type passed to factory functions, and
//! the `InjectionContext` it carries: positional constructor arguments, a keyed data
//! bag, and the per-call-graph cache backing `Lifetime::PerContext`.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::DiResult;
use crate::key::Key;
use crate::registration::AnyArc;
use crate::traits::{Resolver, ResolverCore};

/// A type-erased, thread-safe value carried in an [`InjectionContext`].
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// Per-call-graph state threaded through nested resolution.
///
/// An `InjectionContext` is established once per top-level `get`/`get_trait` call
/// (see [`crate::internal::injection_stack`]) and shared, by cheap `Arc` clone, with
/// every dependency resolved while building that call's object graph. Cloning an
/// `InjectionContext` is shallow: the clone still observes writes the original makes
/// to the per-context cache, since both point at the same backing map. This is what
/// lets `Lifetime::PerContext` registrations resolve to the same instance everywhere
/// in one call graph while still getting a fresh instance on the next top-level call.
#[derive(Clone)]
pub struct InjectionContext {
    args: Arc<Vec<AnyValue>>,
    data: Arc<HashMap<&'static str, AnyValue>>,
    per_context_cache: Arc<Mutex<HashMap<Key, AnyArc>>>,
}

impl InjectionContext {
    /// An empty context: no positional args, no keyed data, fresh per-context cache.
    pub(crate) fn empty() -> Self {
        Self {
            args: Arc::new(Vec::new()),
            data: Arc::new(HashMap::new()),
            per_context_cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Builds a context seeded with positional constructor arguments.
    pub(crate) fn with_args(args: Vec<AnyValue>) -> Self {
        Self {
            args: Arc::new(args),
            ..Self::empty()
        }
    }

    /// Builds a context seeded with a keyed data bag.
    pub(crate) fn with_data(data: HashMap<&'static str, AnyValue>) -> Self {
        Self {
            data: Arc::new(data),
            ..Self::empty()
        }
    }

    /// Returns the positional argument at `index`, downcast to `T`, or `None` if
    /// there is no argument at that index or it holds a different type.
    pub fn arg<T: 'static + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
        self.args.get(index)?.clone().downcast::<T>().ok()
    }

    /// Returns the keyed data value for `name`, downcast to `T`, or `None` if absent
    /// or of a different type.
    pub fn data<T: 'static + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.data.get(name)?.clone().downcast::<T>().ok()
    }

    /// Returns the cached `PerContext` instance for `key`, constructing and caching
    /// it via `init` on first access within this call graph. Uses the same
    /// double-checked-locking shape as the root provider's singleton cache.
    pub(crate) fn per_context_get_or_init(
        &self,
        key: &Key,
        init: impl FnOnce() -> DiResult<AnyArc>,
    ) -> DiResult<AnyArc> {
        {
            let cache = self.per_context_cache.lock().unwrap();
            if let Some(value) = cache.get(key) {
                return Ok(value.clone());
            }
        }

        let value = init()?;

        let mut cache = self.per_context_cache.lock().unwrap();
        Ok(cache.entry(key.clone()).or_insert(value).clone())
    }
}

/// Context passed to factory functions for resolving dependencies.
///
/// ResolverContext wraps a resolver (ServiceProvider or Scope) and provides
/// the interface that factory functions use to access other services. This
/// allows factory functions to be independent of the specific resolver type.
///
/// # Examples
///
/// ```
/// use resolvent::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database {
///     url: "postgres://localhost".to_string()
/// });
/// services.add_transient_factory::<UserService, _>(|resolver| {
///     // resolver is a ResolverContext that provides access to other services
///     UserService {
///         db: resolver.get_required::<Database>(),
///     }
/// });
/// ```
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
    injection: InjectionContext,
}

impl<'a> ResolverContext<'a> {
    /// Creates a new ResolverContext wrapping the given resolver, picking up
    /// whatever injection context is ambient for the current call graph.
    pub(crate) fn new<T>(resolver: &'a T) -> Self
    where
        T: ResolverCore,
    {
        Self {
            resolver,
            injection: crate::internal::injection_stack::current(),
        }
    }

    /// Returns the injection context carrying this call graph's positional
    /// arguments, keyed data, and `PerContext` cache.
    pub fn injection(&self) -> &InjectionContext {
        &self.injection
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn resolve_any(&self, key: &crate::Key) -> crate::DiResult<crate::registration::AnyArc> {
        self.resolver.resolve_any(key)
    }

    fn resolve_many(&self, key: &crate::Key) -> crate::DiResult<Vec<crate::registration::AnyArc>> {
        self.resolver.resolve_many(key)
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.resolver.push_sync_disposer(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> crate::internal::BoxFutureUnit + Send>) {
        self.resolver.push_async_disposer(f);
    }

    fn resolve_generic_key(&self, family: &'static str, args: &[std::any::TypeId]) -> crate::DiResult<Key> {
        self.resolver.resolve_generic_key(family, args)
    }

    fn has_strategy(&self, key: &Key) -> bool {
        self.resolver.has_strategy(key)
    }
}

impl<'a> Resolver for ResolverContext<'a> {
    fn register_disposer<T>(&self, service: std::sync::Arc<T>)
    where
        T: crate::traits::Dispose + 'static,
    {
        self.resolver.push_sync_disposer(Box::new(move || service.dispose()));
    }

    fn register_async_disposer<T>(&self, service: std::sync::Arc<T>)
    where
        T: crate::traits::AsyncDispose + 'static,
    {
        self.resolver.push_async_disposer(Box::new(move || {
            let service = service.clone();
            Box::pin(async move { service.dispose().await })
        }));
    }
}
