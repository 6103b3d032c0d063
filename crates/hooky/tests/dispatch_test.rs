//! Integration tests for chain dispatch through hookable services.

mod helpers;

use std::sync::{Arc, Mutex};

use hooky::prelude::*;

use helpers::{count, counter, counting_hook, service};

#[tokio::test]
async fn test_once_before_all_fires_once() {
    service!(OnceAllService);
    let svc = OnceAllService::new();
    let calls = counter();

    svc.hooks()
        .once_before_all(counting_hook("warmup", &calls))
        .await
        .unwrap();

    for _ in 0..3 {
        svc.fetch("a.txt").await.unwrap();
    }

    assert_eq!(count(&calls), 1);
}

#[tokio::test]
async fn test_always_hooks_fire_every_call() {
    service!(AlwaysService);
    let svc = AlwaysService::new();
    let calls = counter();

    svc.hooks()
        .on_before("fetch", counting_hook("audit", &calls))
        .await
        .unwrap();

    svc.fetch("a.txt").await.unwrap();
    svc.fetch("b.txt").await.unwrap();
    svc.process(1).await.unwrap();

    assert_eq!(count(&calls), 2);
}

#[tokio::test]
async fn test_global_once_after_registered_from_two_instances_fires_once() {
    service!(SharedFetchService);
    let first = SharedFetchService::new();
    let second = SharedFetchService::new();
    let first_calls = counter();
    let second_calls = counter();

    let reg = first
        .hooks()
        .global()
        .once_after("fetch", counting_hook("first-fetch", &first_calls))
        .await
        .unwrap();
    second
        .hooks()
        .global()
        .once_after("fetch", counting_hook("second-fetch", &second_calls))
        .await
        .unwrap();

    // Both registrations append to the one process-wide bucket.
    assert_eq!(second.hooks().hook_count(Scope::Global, &reg.key).await, 2);

    first.fetch("a.txt").await.unwrap();
    second.fetch("b.txt").await.unwrap();
    first.fetch("c.txt").await.unwrap();
    second.fetch("d.txt").await.unwrap();

    assert_eq!(count(&first_calls), 1);
    assert_eq!(count(&second_calls), 1);
}

#[tokio::test]
async fn test_instance_once_state_is_per_instance() {
    service!(PerInstanceService);
    let first = PerInstanceService::new();
    let second = PerInstanceService::new();
    let calls = counter();

    first
        .hooks()
        .once_before("fetch", counting_hook("first", &calls))
        .await
        .unwrap();
    second
        .hooks()
        .once_before("fetch", counting_hook("second", &calls))
        .await
        .unwrap();

    first.fetch("a.txt").await.unwrap();
    first.fetch("a.txt").await.unwrap();
    second.fetch("b.txt").await.unwrap();

    assert_eq!(count(&calls), 2);
}

#[tokio::test]
async fn test_instance_and_global_once_state_are_independent() {
    service!(IndependentOnceService);
    let svc = IndependentOnceService::new();
    let local_calls = counter();
    let global_calls = counter();

    svc.hooks()
        .once_before_all(counting_hook("local", &local_calls))
        .await
        .unwrap();
    svc.hooks()
        .global()
        .once_before_all(counting_hook("global", &global_calls))
        .await
        .unwrap();

    svc.fetch("a.txt").await.unwrap();
    assert_eq!((count(&local_calls), count(&global_calls)), (1, 1));

    // Resetting instance state leaves the global bucket consumed.
    svc.hooks().reset_once_state().await;
    svc.fetch("a.txt").await.unwrap();
    assert_eq!((count(&local_calls), count(&global_calls)), (2, 1));

    // And the other way round.
    svc.hooks().global().reset_once_state().await;
    svc.fetch("a.txt").await.unwrap();
    assert_eq!((count(&local_calls), count(&global_calls)), (2, 2));
}

#[tokio::test]
async fn test_before_short_circuit_skips_body_and_later_hooks() {
    service!(CachedService);
    let svc = CachedService::new();
    let later = counter();

    svc.hooks()
        .on_before(
            "fetch",
            ClosureHook::sync("cache", |ctx| {
                let uri = ctx.argument_str(0).unwrap_or_default();
                Ok(HookOutcome::value(format!("cached {uri}")))
            }),
        )
        .await
        .unwrap();
    svc.hooks()
        .on_before("fetch", counting_hook("later", &later))
        .await
        .unwrap();
    svc.hooks()
        .on_after("fetch", counting_hook("after", &later))
        .await
        .unwrap();

    let value = svc.fetch("a.txt").await.unwrap();

    assert_eq!(value, json!("cached a.txt"));
    assert_eq!(count(&later), 0);
}

#[tokio::test]
async fn test_explicit_null_is_a_result() {
    service!(NullService);
    let svc = NullService::new();

    svc.hooks()
        .on_before("fetch", ClosureHook::sync("deny", |_ctx| Ok(HookOutcome::null())))
        .await
        .unwrap();

    assert_eq!(svc.fetch("a.txt").await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_after_hook_replaces_result() {
    service!(ReplaceService);
    let svc = ReplaceService::new();

    svc.hooks()
        .global()
        .on_after(
            "process",
            ClosureHook::sync("plus-one", |ctx| {
                let n = ctx.result.and_then(Value::as_i64).unwrap_or_default();
                Ok(HookOutcome::value(n + 1))
            }),
        )
        .await
        .unwrap();

    assert_eq!(svc.process(4).await.unwrap(), json!(41));
}

#[tokio::test]
async fn test_cancel_keeps_body_result() {
    service!(CancelService);
    let svc = CancelService::new();
    let skipped = counter();

    svc.hooks()
        .on_before_all(ClosureHook::sync("stop", |_ctx| {
            Ok(HookOutcome::cancel_with("maintenance"))
        }))
        .await
        .unwrap();
    svc.hooks()
        .on_before("fetch", counting_hook("skipped", &skipped))
        .await
        .unwrap();

    let value = svc.fetch("a.txt").await.unwrap();

    assert_eq!(value, json!("content of a.txt"));
    assert_eq!(count(&skipped), 0);
}

#[tokio::test]
async fn test_hook_error_aborts_call() {
    service!(FailingService);
    let svc = FailingService::new();

    svc.hooks()
        .on_before(
            "fetch",
            ClosureHook::sync("guard", |_ctx| {
                Err(HookyError::hook_failed("quota exceeded"))
            }),
        )
        .await
        .unwrap();

    let err = svc.fetch("a.txt").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::HookFailed);
    assert_eq!(err.message, "quota exceeded");
}

#[tokio::test]
async fn test_stage_order_across_scopes() {
    service!(OrderedService);
    let svc = OrderedService::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let record = |label: &'static str| {
        let log = log.clone();
        ClosureHook::<OrderedService>::sync(label, move |_ctx| {
            log.lock().unwrap().push(label);
            Ok(HookOutcome::Continue)
        })
    };

    let hooks = svc.hooks();
    let global = hooks.global();
    hooks.once_before("fetch", record("local-once-fetch")).await.unwrap();
    global.once_before("fetch", record("global-once-fetch")).await.unwrap();
    hooks.once_before_all(record("local-once-all")).await.unwrap();
    global.once_before_all(record("global-once-all")).await.unwrap();
    hooks.on_before("fetch", record("local-fetch")).await.unwrap();
    global.on_before("fetch", record("global-fetch")).await.unwrap();
    hooks.on_before_all(record("local-all")).await.unwrap();
    global.on_before_all(record("global-all")).await.unwrap();

    svc.fetch("a.txt").await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "local-all",
            "global-all",
            "local-fetch",
            "global-fetch",
            "local-once-all",
            "global-once-all",
            "local-once-fetch",
            "global-once-fetch",
        ]
    );
}

#[tokio::test]
async fn test_concurrent_calls_fire_global_once_hook_once() {
    service!(ConcurrentService);
    let svc = Arc::new(ConcurrentService::new());
    let calls = counter();

    svc.hooks()
        .global()
        .once_before("fetch", counting_hook("first", &calls))
        .await
        .unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let svc = svc.clone();
            tokio::spawn(async move { svc.fetch(&format!("{i}.txt")).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(count(&calls), 1);
}
