//! Error types for the dependency injection container.

use thiserror::Error;

/// Dependency injection errors
///
/// Represents the various error conditions that can occur during service
/// registration, resolution, or container operations in resolvent.
///
/// # Examples
///
/// ```rust
/// use resolvent::{DiError, ServiceCollection, Resolver};
///
/// // Example of NotFound error
/// let provider = ServiceCollection::new().build();
/// match provider.get::<String>() {
///     Err(DiError::NotFound(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///         println!("Service not found: {}", type_name);
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use resolvent::DiError;
///
/// // Examples of error types
/// let not_found = DiError::NotFound("MyService");
/// let type_mismatch = DiError::TypeMismatch("std::string::String");
/// let circular = DiError::Circular(vec!["ServiceA", "ServiceB", "ServiceA"]);
/// let wrong_lifetime = DiError::WrongLifetime("Cannot resolve scoped from singleton");
/// let depth_exceeded = DiError::DepthExceeded(100);
///
/// // All errors implement Display
/// println!("Error: {}", not_found);
/// println!("Error: {}", circular);
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Service not registered
    #[error("Service not found: {0}")]
    NotFound(&'static str),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// Invalid lifetime resolution (e.g., scoped from root)
    #[error("Lifetime error: {0}")]
    WrongLifetime(&'static str),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A constructor parameter could not be supplied from the positional
    /// argument list of the current injection context.
    #[error("Missing constructor parameter #{index} ({type_name}) for {service}")]
    MissingConstructorParam {
        service: &'static str,
        index: usize,
        type_name: &'static str,
    },
    /// An open-generic family instantiation did not satisfy the family's
    /// declared constraint.
    #[error("Generic constraint unsatisfied for {family} with argument {argument}")]
    GenericConstraintUnsatisfied {
        family: &'static str,
        argument: &'static str,
    },
    /// A factory returned a null/empty instance where the wrapper's policy
    /// disallows it. Unreachable for `Arc`-returning factories, but retained
    /// as the variant a factory's `Err` maps through when a non-optional
    /// wrapper wraps a factory that failed.
    #[error("Factory for {0} returned no instance")]
    NullInstanceReturned(&'static str),
    /// Resolution was attempted against a scope that has already been disposed.
    #[error("Scope {0} has already been disposed")]
    ScopeDisposed(&'static str),
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout resolvent.
/// This follows the common Rust pattern of having a crate-specific Result type
/// to reduce boilerplate in function signatures.
///
/// # Examples
///
/// ```rust
/// use resolvent::{DiResult, DiError};
///
/// fn create_service() -> DiResult<String> {
///     Ok("service created".to_string())
/// }
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::NotFound("some_service"))
/// }
///
/// // Usage
/// match create_service() {
///     Ok(service) => println!("Success: {}", service),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub type DiResult<T> = Result<T, DiError>;
