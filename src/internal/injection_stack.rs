//! Ambient injection-context propagation.
//!
//! Mirrors [`circular`](super::circular)'s thread-local stack: the first call into
//! `resolve_any`/`resolve_many` for a top-level `get`/`get_trait` establishes a fresh
//! [`InjectionContext`](crate::provider::context::InjectionContext) and every nested
//! resolution triggered while building that call graph reuses it instead of starting
//! over. This is what lets `Lifetime::PerContext` registrations see "one instance per
//! top-level resolve", and what lets positional constructor arguments supplied via
//! `get_with_args` reach constructors several levels deep.

use std::cell::RefCell;

use crate::provider::context::InjectionContext;

thread_local! {
    static INJECTION_TLS: RefCell<Vec<InjectionContext>> = RefCell::new(Vec::new());
}

/// RAII guard returned by [`enter`]/[`enter_with`].
///
/// Only the call that actually pushed a context pops it on drop; nested calls that
/// found an ambient context already in place leave it for the outer guard to pop.
pub(crate) struct InjectionGuard {
    owns: bool,
}

impl Drop for InjectionGuard {
    fn drop(&mut self) {
        if self.owns {
            INJECTION_TLS.with(|tls| {
                tls.borrow_mut().pop();
            });
        }
    }
}

/// Enters the ambient injection context, establishing a fresh empty one if none is
/// active yet. Call this at every `ResolverCore::resolve_any`/`resolve_many` entry
/// point, the same way `with_circular_catch` wraps those calls for cycle detection.
pub(crate) fn enter() -> InjectionGuard {
    INJECTION_TLS.with(|tls| {
        let mut stack = tls.borrow_mut();
        if stack.is_empty() {
            stack.push(InjectionContext::empty());
            InjectionGuard { owns: true }
        } else {
            InjectionGuard { owns: false }
        }
    })
}

/// Enters a caller-supplied context unconditionally, pushing over whatever is
/// currently active. Used by `get_with_args`/`get_with_data` to seed positional
/// arguments or a keyed bag for the call graph they kick off.
pub(crate) fn enter_with(context: InjectionContext) -> InjectionGuard {
    INJECTION_TLS.with(|tls| {
        tls.borrow_mut().push(context);
    });
    InjectionGuard { owns: true }
}

/// Returns the currently active injection context, or an empty one if resolution
/// is happening outside of any `resolve_any`/`resolve_many` call (should not happen
/// in practice since those are the only callers of constructors).
pub(crate) fn current() -> InjectionContext {
    INJECTION_TLS.with(|tls| {
        tls.borrow()
            .last()
            .cloned()
            .unwrap_or_else(InjectionContext::empty)
    })
}
