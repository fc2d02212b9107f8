use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::oneshot;

use crate::paging::{PageRequest, PageResult};

#[tokio::test]
async fn duplicate_key_is_rejected_while_in_flight() {
    let dispatcher = ActionDispatcher::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let (started_tx, started_rx) = oneshot::channel::<()>();

    let first = tokio::spawn({
        let dispatcher = dispatcher.clone();
        let calls = Arc::clone(&calls);
        async move {
            dispatcher
                .run(ActionKey::status("a-1"), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let _ = started_tx.send(());
                    let _ = release_rx.await;
                    Ok::<_, ClientError>("done")
                })
                .await
        }
    });
    started_rx.await.expect("first action started");
    assert!(dispatcher.state().is_in_flight(&ActionKey::status("a-1")));

    let second_calls = Arc::clone(&calls);
    let err = dispatcher
        .run(ActionKey::status("a-1"), || async move {
            second_calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ClientError>("again")
        })
        .await
        .expect_err("duplicate must be rejected");
    assert!(matches!(err, ClientError::ActionInProgress { ref key } if key == "status-a-1"));

    release_tx.send(()).expect("release");
    assert_eq!(first.await.expect("join").expect("first action"), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(dispatcher.state().is_empty());
}

#[tokio::test]
async fn unrelated_keys_run_in_parallel() {
    let dispatcher = ActionDispatcher::new();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let (started_tx, started_rx) = oneshot::channel::<()>();

    let blocked = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move {
            dispatcher
                .run(ActionKey::visibility("a-1"), || async move {
                    let _ = started_tx.send(());
                    let _ = release_rx.await;
                    Ok::<_, ClientError>(())
                })
                .await
        }
    });
    started_rx.await.expect("started");

    let value = dispatcher
        .run(ActionKey::status("a-1"), || async { Ok::<_, ClientError>(7) })
        .await
        .expect("independent key");
    assert_eq!(value, 7);

    release_tx.send(()).expect("release");
    blocked.await.expect("join").expect("blocked action");
}

#[tokio::test]
async fn failure_clears_key_and_skips_success_callback() {
    let dispatcher = ActionDispatcher::new();
    let mut notified = false;

    let err = dispatcher
        .run_with(
            ActionKey::close("p-1"),
            || async {
                Err::<(), _>(ClientError::rejected(
                    reqwest::StatusCode::CONFLICT,
                    Some("already closed"),
                ))
            },
            |_| notified = true,
        )
        .await
        .expect_err("must fail");

    assert_eq!(err.user_message(), "already closed");
    assert!(!notified);
    assert!(dispatcher.state().is_empty());

    dispatcher
        .run_with(
            ActionKey::close("p-1"),
            || async { Ok::<_, ClientError>(()) },
            |_| notified = true,
        )
        .await
        .expect("retry after failure");
    assert!(notified);
}

#[tokio::test]
async fn success_refreshes_owning_controller_only() {
    let dispatcher = ActionDispatcher::new();
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetches);
    let controller = ResourceListController::from_fn(
        "users",
        move |request: PageRequest| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(PageResult::<u32>::empty(&request)) }
        },
        PageRequest::default(),
    );

    dispatcher
        .run_then_refresh(
            ActionKey::status("u-1"),
            || async { Ok::<_, ClientError>(()) },
            &controller,
        )
        .await
        .expect("action");
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    let _ = dispatcher
        .run_then_refresh(
            ActionKey::status("u-1"),
            || async {
                Err::<(), _>(ClientError::Transport {
                    message: "offline".to_string(),
                })
            },
            &controller,
        )
        .await;
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn keys_are_namespaced_by_action() {
    assert_eq!(ActionKey::status("a-1").to_string(), "status-a-1");
    assert_eq!(ActionKey::visibility("a-1").as_str(), "visibility-a-1");
    assert_ne!(ActionKey::status("a-1"), ActionKey::visibility("a-1"));
    assert_eq!(ActionKey::decision("o-1").as_str(), "decision-o-1");
}
