//! Ambient context adapter contract

use super::errors::ContextResult;
use super::Context;

/// Storage strategy for the ambient "current actor".
///
/// `run` binds a context for the dynamic extent of `f` and restores the
/// previous one when `f` returns or unwinds.
pub trait ContextAdapter {
    /// Adapter name used in diagnostics
    fn name(&self) -> &'static str;

    /// Returns the current ambient context, if any
    fn get(&self) -> Option<Context>;

    /// Replaces the current ambient context
    fn set(&self, ctx: Context) -> ContextResult<()>;

    /// Clears the current ambient context
    fn reset(&self);

    /// Runs `f` with `ctx` bound as the ambient context
    fn run<T>(&self, ctx: Context, f: impl FnOnce() -> T) -> T;
}
