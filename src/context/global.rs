//! Global context adapter
//!
//! One shared slot for the whole process. Only suitable when no two logical
//! flows overlap; concurrent flows must use the scoped adapter.

use std::sync::{LazyLock, RwLock};

use super::adapter::ContextAdapter;
use super::errors::ContextResult;
use super::Context;

static SLOT: LazyLock<RwLock<Option<Context>>> = LazyLock::new(|| RwLock::new(None));

/// Single shared mutable slot
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalAdapter;

impl GlobalAdapter {
    fn replace(value: Option<Context>) -> Option<Context> {
        let mut slot = SLOT.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *slot, value)
    }
}

/// Restores the previous slot value on drop, including during unwinding
struct RestoreGuard {
    previous: Option<Option<Context>>,
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            GlobalAdapter::replace(previous);
        }
    }
}

impl ContextAdapter for GlobalAdapter {
    fn name(&self) -> &'static str {
        "global"
    }

    fn get(&self) -> Option<Context> {
        SLOT.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set(&self, ctx: Context) -> ContextResult<()> {
        Self::replace(Some(ctx));
        Ok(())
    }

    fn reset(&self) {
        Self::replace(None);
    }

    fn run<T>(&self, ctx: Context, f: impl FnOnce() -> T) -> T {
        let _guard = RestoreGuard {
            previous: Some(Self::replace(Some(ctx))),
        };
        f()
    }
}
