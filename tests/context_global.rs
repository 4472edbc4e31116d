//! Global Context Tests
//!
//! The global adapter shares one slot per process: `run` restores the
//! previous value, and async scopes are refused.

use aeromodel::context::{self, ContextError};
use aeromodel::{Context, ContextMode};

#[test]
fn test_global_run_restores_previous() {
    context::configure(ContextMode::Global);
    context::set(Context::actor("outer")).unwrap();

    let inner = context::run(Context::actor("inner"), || {
        context::current().and_then(|ctx| ctx.actor)
    });
    assert_eq!(inner.as_deref(), Some("inner"));
    assert_eq!(
        context::current().and_then(|ctx| ctx.actor).as_deref(),
        Some("outer")
    );

    context::reset();
    assert!(context::current().is_none());
}

#[tokio::test]
async fn test_global_mode_refuses_async_scope() {
    context::configure(ContextMode::Global);
    let err = context::scope(Context::actor("a"), async {}).await.unwrap_err();
    assert!(matches!(err, ContextError::StorageMisconfigured { .. }));
}
