//! Scoped context adapter
//!
//! Per-task storage backed by a tokio task-local. Each `run`/`scope` call
//! opens a new binding visible only to the code it wraps, so concurrent
//! flows sharing the process never observe each other's actor.

use std::cell::RefCell;
use std::future::Future;

use super::adapter::ContextAdapter;
use super::errors::{ContextError, ContextResult};
use super::Context;

tokio::task_local! {
    static SCOPED: RefCell<Option<Context>>;
}

/// Per-logical-task storage
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopedAdapter;

impl ScopedAdapter {
    /// Runs `future` with `ctx` bound for the whole task
    pub fn scope<F: Future>(self, ctx: Context, future: F) -> impl Future<Output = F::Output> {
        SCOPED.scope(RefCell::new(Some(ctx)), future)
    }

    /// Returns true when called inside a `run` or `scope` binding
    pub fn in_scope(&self) -> bool {
        SCOPED.try_with(|_| ()).is_ok()
    }
}

impl ContextAdapter for ScopedAdapter {
    fn name(&self) -> &'static str {
        "scoped"
    }

    fn get(&self) -> Option<Context> {
        SCOPED.try_with(|cell| cell.borrow().clone()).ok().flatten()
    }

    fn set(&self, ctx: Context) -> ContextResult<()> {
        SCOPED
            .try_with(|cell| {
                *cell.borrow_mut() = Some(ctx);
            })
            .map_err(|_| {
                ContextError::misconfigured(self.name(), "set called outside of a task scope")
            })
    }

    fn reset(&self) {
        // Outside a scope there is nothing to clear
        let _ = SCOPED.try_with(|cell| cell.borrow_mut().take());
    }

    fn run<T>(&self, ctx: Context, f: impl FnOnce() -> T) -> T {
        SCOPED.sync_scope(RefCell::new(Some(ctx)), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_outside_scope_is_none() {
        assert!(ScopedAdapter.get().is_none());
        assert!(!ScopedAdapter.in_scope());
    }

    #[test]
    fn test_set_outside_scope_is_misconfigured() {
        let err = ScopedAdapter.set(Context::actor("alice")).unwrap_err();
        assert!(matches!(err, ContextError::StorageMisconfigured { adapter: "scoped", .. }));
    }

    #[test]
    fn test_nested_run_restores_outer() {
        let adapter = ScopedAdapter;
        adapter.run(Context::actor("outer"), || {
            let inner = adapter.run(Context::actor("inner"), || adapter.get().unwrap().actor);
            assert_eq!(inner.as_deref(), Some("inner"));
            assert_eq!(adapter.get().unwrap().actor.as_deref(), Some("outer"));

            adapter.set(Context::actor("replaced")).unwrap();
            assert_eq!(adapter.get().unwrap().actor.as_deref(), Some("replaced"));
            adapter.reset();
            assert!(adapter.get().is_none());
        });
        assert!(adapter.get().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_scopes_are_isolated() {
        let a = tokio::spawn(ScopedAdapter.scope(Context::actor("a"), async {
            tokio::task::yield_now().await;
            ScopedAdapter.get().unwrap().actor
        }));
        let b = tokio::spawn(ScopedAdapter.scope(Context::actor("b"), async {
            tokio::task::yield_now().await;
            ScopedAdapter.get().unwrap().actor
        }));

        assert_eq!(a.await.unwrap().as_deref(), Some("a"));
        assert_eq!(b.await.unwrap().as_deref(), Some("b"));
    }
}
