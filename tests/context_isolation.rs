//! Context Isolation Tests
//!
//! With the scoped adapter, concurrent flows never observe each other's
//! actor, and access rules see the context of their own flow.

use std::sync::Arc;
use std::time::Duration;

use aeromodel::context::{self, ContextError};
use aeromodel::schema::{id, string, ModelSchema};
use aeromodel::{Context, ContextMode, ErrorCode};
use serde_json::json;

fn scoped() {
    context::configure(ContextMode::Scoped);
}

fn note() -> Arc<ModelSchema> {
    ModelSchema::builder("ContextNote")
        .field("id", id())
        .field(
            "body",
            string().writable_when(|ctx, _, _| ctx.has_role("author")),
        )
        .authorize("publish", |ctx, _| ctx.actor.as_deref() == Some("editor"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_concurrent_scopes_are_isolated() {
    scoped();

    let mut handles = Vec::new();
    for i in 0..8 {
        handles.push(tokio::spawn(async move {
            let actor = format!("user-{}", i);
            context::scope(Context::actor(actor.clone()), async move {
                tokio::time::sleep(Duration::from_millis(5 * (8 - i))).await;
                tokio::task::yield_now().await;
                let seen = context::current().and_then(|ctx| ctx.actor);
                assert_eq!(seen.as_deref(), Some(actor.as_str()));
            })
            .await
            .unwrap();
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_access_rules_follow_scope() {
    scoped();
    let schema = note();

    let author = {
        let schema = Arc::clone(&schema);
        tokio::spawn(context::scope(
            Context::actor("a").with_role("author"),
            async move {
                tokio::task::yield_now().await;
                let mut model = schema.make(json!({"id": 1})).unwrap();
                model.assign("body", "hello").is_ok()
            },
        ))
    };
    let reader = {
        let schema = Arc::clone(&schema);
        tokio::spawn(context::scope(Context::actor("r"), async move {
            tokio::task::yield_now().await;
            let mut model = schema.make(json!({"id": 2})).unwrap();
            model.assign("body", "hello").map_err(|e| e.code())
        }))
    };

    assert!(author.await.unwrap().unwrap());
    assert_eq!(
        reader.await.unwrap().unwrap().unwrap_err(),
        ErrorCode::NotWritable
    );
}

#[tokio::test]
async fn test_authorization_reads_ambient_context() {
    scoped();
    let schema = note();

    let allowed = context::scope(Context::actor("editor"), async {
        let model = schema.make(json!({"id": 1})).unwrap();
        model.authorize("publish").is_ok()
    })
    .await
    .unwrap();
    assert!(allowed);

    let denied = context::scope(Context::actor("guest"), async {
        let model = schema.make(json!({"id": 1})).unwrap();
        model.authorize("publish").unwrap_err().code()
    })
    .await
    .unwrap();
    assert_eq!(denied, ErrorCode::UnauthorizedMethodCall);
}

#[test]
fn test_instance_context_overrides_ambient() {
    scoped();
    let schema = note();

    context::run(Context::actor("guest"), || {
        let model = schema
            .make(json!({"id": 1}))
            .unwrap()
            .with_context(Context::actor("editor"));
        assert!(model.authorize("publish").is_ok());
        assert_eq!(model.context().actor.as_deref(), Some("editor"));
    });
}

#[test]
fn test_set_outside_scope_fails() {
    scoped();
    let err = context::set(Context::actor("nobody")).unwrap_err();
    assert!(matches!(err, ContextError::StorageMisconfigured { .. }));
    assert!(context::current().is_none());
}

#[test]
fn test_run_binds_only_inside_closure() {
    scoped();
    let inner = context::run(Context::actor("alice"), || {
        context::set(Context::actor("bob")).unwrap();
        context::current().and_then(|ctx| ctx.actor)
    });
    assert_eq!(inner.as_deref(), Some("bob"));
    assert!(context::current().is_none());
}
