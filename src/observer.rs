//! Diagnostic observers for dependency injection traceability.
//!
//! This module provides hooks for observing DI resolution events, enabling 
//! structured tracing, performance monitoring, and debugging of agent workflows.
//! Enhanced with run_id correlation for n8n-style workflow engines.

use std::sync::Arc;
use std::collections::HashMap;
use crate::Key;

/// Context information for correlated observation of workflow executions.
///
/// Provides run_id and workflow metadata for correlating DI events with
/// n8n-style workflow execution traces.
#[derive(Debug, Clone)]
pub struct ObservationContext {
    /// Unique identifier for the current workflow run
    pub run_id: Option<String>,
    /// Name of the workflow being executed
    pub workflow_name: Option<String>,
    /// Current node/step being executed
    pub node_id: Option<String>,
    /// Additional metadata for the execution context
    pub metadata: HashMap<String, String>,
}

impl ObservationContext {
    /// Creates a new empty observation context.
    pub fn new() -> Self {
        Self {
            run_id: None,
            workflow_name: None,
            node_id: None,
            metadata: HashMap::new(),
        }
    }

    /// Creates an observation context with a run ID.
    pub fn with_run_id(run_id: impl Into<String>) -> Self {
        Self {
            run_id: Some(run_id.into()),
            workflow_name: None,
            node_id: None,
            metadata: HashMap::new(),
        }
    }

    /// Creates a full workflow context.
    pub fn workflow(
        run_id: impl Into<String>,
        workflow_name: impl Into<String>,
        node_id: Option<impl Into<String>>,
    ) -> Self {
        Self {
            run_id: Some(run_id.into()),
            workflow_name: Some(workflow_name.into()),
            node_id: node_id.map(|n| n.into()),
            metadata: HashMap::new(),
        }
    }

    /// Adds metadata to the context.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Gets a correlation string for logging/tracing.
    pub fn correlation_id(&self) -> String {
        match (&self.run_id, &self.workflow_name, &self.node_id) {
            (Some(run_id), Some(workflow), Some(node)) => {
                format!("{}:{}:{}", run_id, workflow, node)
            }
            (Some(run_id), Some(workflow), None) => {
                format!("{}:{}", run_id, workflow)
            }
            (Some(run_id), None, _) => run_id.clone(),
            _ => "no-context".to_string(),
        }
    }
}

impl Default for ObservationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer trait for dependency injection resolution events.
///
/// This trait enables structured tracing and monitoring of the DI container's
/// behavior. Observers can track what services are being resolved, timing
/// information, and failure conditions.
///
/// Enhanced with run_id correlation support for n8n-style workflow engines.
/// This allows correlating DI events with specific workflow execution runs.
///
/// This is particularly valuable for agentic systems where you need to:
/// - Correlate DI events with agent execution steps
/// - Debug resolution chains and performance bottlenecks
/// - Monitor tool usage patterns and failures
/// - Generate post-mortem analysis data
/// - Track workflow execution across distributed systems
///
/// # Performance
///
/// Observer calls are made synchronously during resolution. Keep implementations
/// lightweight to avoid impacting agent performance. For expensive operations,
/// consider queuing events for async processing.
///
/// # Examples
///
/// ```
/// use resolvent::{DiObserver, ServiceCollection, Key, ObservationContext};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct TracingObserver {
///     trace_id: String,
/// }
///
/// impl TracingObserver {
///     fn new(trace_id: String) -> Self {
///         Self { trace_id }
///     }
/// }
///
/// impl DiObserver for TracingObserver {
///     fn resolving(&self, key: &Key) {
///         println!("[{}] Resolving: {}", self.trace_id, key.display_name());
///     }
///
///     fn resolved(&self, key: &Key, duration: Duration) {
///         println!("[{}] Resolved: {} in {:?}", 
///             self.trace_id, key.display_name(), duration);
///     }
///
///     fn factory_panic(&self, key: &Key, message: &str) {
///         println!("[{}] PANIC in {}: {}", 
///             self.trace_id, key.display_name(), message);
///     }
///
///     fn resolving_with_context(&self, key: &Key, context: &ObservationContext) {
///         println!("[{}] [{}] Resolving: {}", 
///             self.trace_id, context.correlation_id(), key.display_name());
///     }
///
///     fn resolved_with_context(&self, key: &Key, duration: Duration, context: &ObservationContext) {
///         println!("[{}] [{}] Resolved: {} in {:?}", 
///             self.trace_id, context.correlation_id(), key.display_name(), duration);
///     }
///
///     fn factory_panic_with_context(&self, key: &Key, message: &str, context: &ObservationContext) {
///         println!("[{}] [{}] PANIC in {}: {}", 
///             self.trace_id, context.correlation_id(), key.display_name(), message);
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(TracingObserver::new("agent-run-123".to_string())));
///
/// // All subsequent resolutions will be traced
/// let provider = services.build();
/// ```
pub trait DiObserver: Send + Sync {
    /// Called when starting to resolve a service.
    ///
    /// This is called before the factory function is invoked. Use this to
    /// start timing measurements and emit trace events.
    ///
    /// # Arguments
    ///
    /// * `key` - The service key being resolved
    fn resolving(&self, key: &Key);

    /// Called when a service is successfully resolved.
    ///
    /// This is called after the factory function completes successfully.
    /// Use this to record timing data and successful resolution events.
    ///
    /// # Arguments
    ///
    /// * `key` - The service key that was resolved
    /// * `duration` - Time elapsed from `resolving` to `resolved`
    fn resolved(&self, key: &Key, duration: std::time::Duration);

    /// Called when a factory function panics during resolution.
    ///
    /// This captures unhandled panics in factory functions, which is critical
    /// for diagnosing agent failures. The panic will still propagate after
    /// this call.
    ///
    /// # Arguments
    ///
    /// * `key` - The service key being resolved when the panic occurred
    /// * `message` - The panic message if available
    fn factory_panic(&self, key: &Key, message: &str);

    /// Called when starting to resolve a service with workflow context.
    ///
    /// Enhanced version that includes workflow execution context for correlation.
    /// Default implementation calls `resolving()` and logs basic context info.
    ///
    /// # Arguments
    ///
    /// * `key` - The service key being resolved
    /// * `context` - Workflow execution context for correlation
    fn resolving_with_context(&self, key: &Key, context: &ObservationContext) {
        // Call the basic method first
        self.resolving(key);
        
        // Provide basic context logging in default implementation
        if let Some(run_id) = &context.run_id {
            if let Some(workflow_name) = &context.workflow_name {
                println!("[{}] [{}] Starting resolution: {}", 
                    run_id, workflow_name, key.display_name());
            }
        }
    }

    /// Called when a service is successfully resolved with workflow context.
    ///
    /// Enhanced version that includes workflow execution context for correlation.
    /// Default implementation calls `resolved()` and logs basic context info.
    ///
    /// # Arguments
    ///
    /// * `key` - The service key that was resolved
    /// * `duration` - Time elapsed from `resolving` to `resolved`
    /// * `context` - Workflow execution context for correlation
    fn resolved_with_context(&self, key: &Key, duration: std::time::Duration, context: &ObservationContext) {
        // Call the basic method first
        self.resolved(key, duration);
        
        // Provide basic context logging in default implementation
        if let Some(run_id) = &context.run_id {
            if let Some(workflow_name) = &context.workflow_name {
                println!("[{}] [{}] Completed resolution: {} in {:?}", 
                    run_id, workflow_name, key.display_name(), duration);
            }
        }
    }

    /// Called when a factory function panics during resolution with workflow context.
    ///
    /// Enhanced version that includes workflow execution context for correlation.
    /// Default implementation calls `factory_panic()` and logs basic context info.
    ///
    /// # Arguments
    ///
    /// * `key` - The service key being resolved when the panic occurred
    /// * `message` - The panic message if available
    /// * `context` - Workflow execution context for correlation
    fn factory_panic_with_context(&self, key: &Key, message: &str, context: &ObservationContext) {
        // Call the basic method first
        self.factory_panic(key, message);
        
        // Provide basic context logging in default implementation
        if let Some(run_id) = &context.run_id {
            if let Some(workflow_name) = &context.workflow_name {
                eprintln!("[{}] [{}] FACTORY PANIC in {}: {}", 
                    run_id, workflow_name, key.display_name(), message);
            }
        }
    }
}

/// Container for registered observers.
///
/// This struct holds all registered observers and provides methods to notify
/// them of resolution events. It's designed to have minimal overhead when
/// no observers are registered.
#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    /// Creates a new empty observer collection.
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Adds an observer to the collection.
    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    /// Returns true if any observers are registered.
    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    /// Notifies all observers that resolution is starting.
    #[inline]
    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    /// Notifies all observers that resolution completed successfully.
    #[inline]
    pub(crate) fn resolved(&self, key: &Key, duration: std::time::Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    /// Notifies all observers that a factory function panicked.
    #[inline]
    #[allow(dead_code)]
    pub(crate) fn factory_panic(&self, key: &Key, message: &str) {
        for observer in &self.observers {
            observer.factory_panic(key, message);
        }
    }

    /// Notifies all observers that resolution is starting with workflow context.
    #[inline]
    pub(crate) fn resolving_with_context(&self, key: &Key, context: &ObservationContext) {
        for observer in &self.observers {
            observer.resolving_with_context(key, context);
        }
    }

    /// Notifies all observers that resolution completed successfully with workflow context.
    #[inline]
    pub(crate) fn resolved_with_context(&self, key: &Key, duration: std::time::Duration, context: &ObservationContext) {
        for observer in &self.observers {
            observer.resolved_with_context(key, duration, context);
        }
    }

    /// Notifies all observers that a factory function panicked with workflow context.
    #[inline]
    #[allow(dead_code)]
    pub(crate) fn factory_panic_with_context(&self, key: &Key, message: &str, context: &ObservationContext) {
        for observer in &self.observers {
            observer.factory_panic_with_context(key, message, context);
        }
    }
}

/// Built-in observer that logs events to stdout.
///
/// This is a simple implementation useful for development and debugging.
/// For production use, consider implementing a custom observer that integrates
/// with your logging/tracing infrastructure.
///
/// # Examples
///
/// ```
/// use resolvent::{ServiceCollection, LoggingObserver};
/// use std::sync::Arc;
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(LoggingObserver::new()));
///
/// // All resolutions will be logged to stdout
/// let provider = services.build();
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[resolvent]".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &Key) {
        tracing::trace!(target: "resolvent", prefix = %self.prefix, key = %key.display_name(), "resolving");
    }

    fn resolved(&self, key: &Key, duration: std::time::Duration) {
        tracing::debug!(target: "resolvent", prefix = %self.prefix, key = %key.display_name(), ?duration, "resolved");
    }

    fn factory_panic(&self, key: &Key, message: &str) {
        tracing::error!(target: "resolvent", prefix = %self.prefix, key = %key.display_name(), message, "factory panicked");
    }

    fn resolving_with_context(&self, key: &Key, context: &ObservationContext) {
        tracing::trace!(
            target: "resolvent",
            prefix = %self.prefix,
            key = %key.display_name(),
            correlation_id = %context.correlation_id(),
            "resolving"
        );
    }

    fn resolved_with_context(&self, key: &Key, duration: std::time::Duration, context: &ObservationContext) {
        tracing::debug!(
            target: "resolvent",
            prefix = %self.prefix,
            key = %key.display_name(),
            correlation_id = %context.correlation_id(),
            ?duration,
            "resolved"
        );
    }

    fn factory_panic_with_context(&self, key: &Key, message: &str, context: &ObservationContext) {
        tracing::error!(
            target: "resolvent",
            prefix = %self.prefix,
            key = %key.display_name(),
            correlation_id = %context.correlation_id(),
            message,
            "factory panicked"
        );
    }
}
