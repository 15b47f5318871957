//! Open-generic family registration and lookup (C1/C4.2's "open-generic" side).
//!
//! Rust monomorphizes generics at compile time, so there is no runtime codegen that
//! can synthesize a constructor for a type argument nobody registered against. What
//! this module gives the container instead: every concrete instantiation of a
//! conceptual "family" (`IRepository<T>`, `IHandler<TReq, TResp>`, ...) is registered
//! explicitly, under a shared family name, and tagged with the `TypeId`s of its type
//! arguments. The family can then (a) enumerate every instantiation anyone registered,
//! (b) validate a new instantiation's arguments against a family-wide constraint, and
//! (c) answer "does this family exist, but not for this argument" with
//! [`DiError::GenericConstraintUnsatisfied`] instead of a bare [`DiError::NotFound`].

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{DiError, DiResult};
use crate::key::Key;

/// Identifies one member of an open-generic family: the family name plus the
/// ordered `TypeId`s of its concrete type arguments (`IRepository<User>` is
/// `OpenGenericKey { family: "IRepository", args: [TypeId::of::<User>()] }`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpenGenericKey {
    family: &'static str,
    args: Vec<TypeId>,
}

impl OpenGenericKey {
    /// Builds a key identifying one instantiation of `family` for `args`.
    pub fn new(family: &'static str, args: Vec<TypeId>) -> Self {
        Self { family, args }
    }

    /// The family name, e.g. `"IRepository"`.
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// The ordered `TypeId`s substituted for the family's type parameters.
    pub fn args(&self) -> &[TypeId] {
        &self.args
    }
}

/// A predicate a family imposes on a candidate argument list, e.g. "the first
/// argument must implement `Clone`" expressed as a closure over `TypeId`s gathered
/// at the registration call site (Rust has no runtime trait-bound introspection, so
/// the predicate itself carries whatever compile-time knowledge the registrar baked
/// into it — typically an allow-list of `TypeId`s built from a `where T: Bound` call).
type Constraint = Arc<dyn Fn(&[TypeId]) -> bool + Send + Sync>;

/// One open-generic family: all instantiations registered under a shared name,
/// plus an optional constraint every instantiation's arguments must satisfy.
///
/// Mirrors the source system's `by_open_generic: TypeDefinition -> ordered list<Strategy>`
/// index, narrowed to one `TypeDefinition` (family) at a time.
pub struct GenericFamily {
    name: &'static str,
    arity: usize,
    constraint: Option<Constraint>,
    instantiations: Mutex<HashMap<Vec<TypeId>, Key>>,
}

impl std::fmt::Debug for GenericFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericFamily")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("instantiation_count", &self.instantiations.lock().unwrap().len())
            .finish()
    }
}

impl GenericFamily {
    /// Declares a new family with `arity` type parameters and no constraint.
    pub fn new(name: &'static str, arity: usize) -> Self {
        Self {
            name,
            arity,
            constraint: None,
            instantiations: Mutex::new(HashMap::new()),
        }
    }

    /// Attaches a constraint every future instantiation's arguments must satisfy.
    pub fn with_constraint(
        mut self,
        constraint: impl Fn(&[TypeId]) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.constraint = Some(Arc::new(constraint));
        self
    }

    /// The family's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The number of type parameters this family was declared with.
    pub fn arity(&self) -> usize {
        self.arity
    }

    fn check_constraint(&self, args: &[TypeId]) -> bool {
        match &self.constraint {
            Some(c) => c(args),
            None => true,
        }
    }

    /// Registers the concrete instantiation `args -> key`, enforcing arity and the
    /// family's constraint. Re-registering the same `args` replaces the key (a
    /// strategy is never mutated in place; replacement is by re-registering under
    /// higher priority, and the container treats "same args" as the same binding).
    pub(crate) fn register(&self, args: Vec<TypeId>, key: Key) -> DiResult<()> {
        if args.len() != self.arity {
            return Err(DiError::GenericConstraintUnsatisfied {
                family: self.name,
                argument: key.display_name(),
            });
        }
        if !self.check_constraint(&args) {
            return Err(DiError::GenericConstraintUnsatisfied {
                family: self.name,
                argument: key.display_name(),
            });
        }
        self.instantiations.lock().unwrap().insert(args, key);
        Ok(())
    }

    /// Looks up the registered key for `args`, or `None` if that exact instantiation
    /// was never registered (the family may still exist and serve other arguments).
    pub fn lookup(&self, args: &[TypeId]) -> Option<Key> {
        self.instantiations.lock().unwrap().get(args).cloned()
    }

    /// True if `args` has a registered instantiation.
    pub fn contains(&self, args: &[TypeId]) -> bool {
        self.instantiations.lock().unwrap().contains_key(args)
    }

    /// All instantiations registered so far, as `(args, key)` pairs. Used for
    /// `Collection<Family<_>>`-style enumeration and diagnostics.
    pub fn instantiations(&self) -> Vec<(Vec<TypeId>, Key)> {
        self.instantiations
            .lock()
            .unwrap()
            .iter()
            .map(|(a, k)| (a.clone(), k.clone()))
            .collect()
    }

    /// Number of registered instantiations.
    pub fn len(&self) -> usize {
        self.instantiations.lock().unwrap().len()
    }

    /// True if no instantiation has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The root-owned table of all open-generic families (analogue of C1's
/// `by_open_generic` index, but keyed by family name rather than a reflected
/// `TypeDefinition`).
#[derive(Default)]
pub struct GenericFamilyRegistry {
    families: Mutex<HashMap<&'static str, Arc<GenericFamily>>>,
}

impl GenericFamilyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` as a family with `arity` type parameters if it doesn't exist
    /// yet, returning the (possibly freshly created) family. Re-declaring with a
    /// different arity keeps the original — families are identified by name alone.
    pub fn get_or_create(&self, name: &'static str, arity: usize) -> Arc<GenericFamily> {
        let mut families = self.families.lock().unwrap();
        families
            .entry(name)
            .or_insert_with(|| Arc::new(GenericFamily::new(name, arity)))
            .clone()
    }

    /// Declares `name` with an arity-check constraint up front.
    pub fn get_or_create_constrained(
        &self,
        name: &'static str,
        arity: usize,
        constraint: impl Fn(&[TypeId]) -> bool + Send + Sync + 'static,
    ) -> Arc<GenericFamily> {
        let mut families = self.families.lock().unwrap();
        families
            .entry(name)
            .or_insert_with(|| Arc::new(GenericFamily::new(name, arity).with_constraint(constraint)))
            .clone()
    }

    /// Returns the family `name` if one has been declared.
    pub fn get(&self, name: &'static str) -> Option<Arc<GenericFamily>> {
        self.families.lock().unwrap().get(name).cloned()
    }

    /// Registers `args -> key` under `name`, auto-declaring the family (with no
    /// constraint, arity inferred from `args.len()`) if it doesn't exist yet.
    pub(crate) fn register_instantiation(
        &self,
        name: &'static str,
        args: Vec<TypeId>,
        key: Key,
    ) -> DiResult<()> {
        let family = self.get_or_create(name, args.len());
        family.register(args, key)
    }

    /// Resolves `(family, args)` to a registered `Key`.
    ///
    /// - No family declared under `name`: `NotFound` (the request isn't a generic
    ///   family request at all, as far as this registry knows).
    /// - Family exists but `args` was never registered against it:
    ///   `GenericConstraintUnsatisfied` — the whole point of families existing is to
    ///   turn this into a more actionable error than a bare not-found.
    /// - Found: `Ok(key)`.
    pub(crate) fn resolve(&self, name: &'static str, args: &[TypeId]) -> DiResult<Key> {
        let family = self
            .get(name)
            .ok_or(DiError::NotFound(name))?;
        family.lookup(args).ok_or(DiError::GenericConstraintUnsatisfied {
            family: name,
            argument: "<unregistered argument list>",
        })
    }
}
