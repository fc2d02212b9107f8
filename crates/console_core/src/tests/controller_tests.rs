use super::*;
use std::sync::{atomic::AtomicBool, Mutex};

use shared::protocol::{ListEnvelope, Pagination};
use tokio::sync::{mpsc, oneshot};

type Gate = oneshot::Sender<ClientResult<PageResult<u32>>>;

fn page_of(request: &PageRequest, items: Vec<u32>) -> PageResult<u32> {
    PageResult::from_envelope(
        ListEnvelope {
            data: items,
            pagination: None,
        },
        request,
    )
}

fn gated_controller() -> (
    ResourceListController<u32>,
    mpsc::UnboundedReceiver<(PageRequest, Gate)>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = ResourceListController::from_fn(
        "numbers",
        move |request: PageRequest| {
            let tx = tx.clone();
            async move {
                let (gate_tx, gate_rx) = oneshot::channel();
                if tx.send((request, gate_tx)).is_err() {
                    return Err(ClientError::Transport {
                        message: "test harness closed".to_string(),
                    });
                }
                gate_rx.await.unwrap_or_else(|_| {
                    Err(ClientError::Transport {
                        message: "gate dropped".to_string(),
                    })
                })
            }
        },
        PageRequest::default(),
    );
    (controller, rx)
}

fn recording_controller(
    items: Vec<u32>,
) -> (
    ResourceListController<u32>,
    Arc<Mutex<Vec<PageRequest>>>,
    Arc<AtomicBool>,
) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let failing = Arc::new(AtomicBool::new(false));
    let log = Arc::clone(&requests);
    let fail = Arc::clone(&failing);
    let controller = ResourceListController::from_fn(
        "numbers",
        move |request: PageRequest| {
            log.lock().expect("request log").push(request.clone());
            let result = if fail.load(Ordering::SeqCst) {
                Err(ClientError::rejected(
                    reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    Some("database unavailable"),
                ))
            } else {
                Ok(page_of(&request, items.clone()))
            };
            async move { result }
        },
        PageRequest::default(),
    );
    (controller, requests, failing)
}

#[tokio::test]
async fn out_of_order_responses_keep_latest_request() {
    let (controller, mut requests) = gated_controller();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.set_page(2).await }
    });
    let (first_request, first_gate) = requests.recv().await.expect("first fetch");
    assert_eq!(first_request.page(), 2);

    let second = tokio::spawn({
        let controller = controller.clone();
        async move {
            controller
                .set_filters(FilterPatch::new().set("name", "x"))
                .await
        }
    });
    let (second_request, second_gate) = requests.recv().await.expect("second fetch");
    assert_eq!(second_request.page(), 1);
    assert_eq!(second_request.filter("name"), Some("x"));

    second_gate
        .send(Ok(page_of(&second_request, vec![20, 21])))
        .expect("second gate");
    assert!(matches!(
        second.await.expect("join"),
        FetchOutcome::Applied
    ));

    first_gate
        .send(Ok(page_of(&first_request, vec![10])))
        .expect("first gate");
    assert!(matches!(
        first.await.expect("join").expect("valid page"),
        FetchOutcome::Superseded
    ));

    let snapshot = controller.current();
    assert_eq!(snapshot.items(), &[20, 21]);
    assert_eq!(snapshot.request.filter("name"), Some("x"));
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn stale_failure_does_not_mark_error() {
    let (controller, mut requests) = gated_controller();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh().await }
    });
    let (_, first_gate) = requests.recv().await.expect("first fetch");
    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh().await }
    });
    let (second_request, second_gate) = requests.recv().await.expect("second fetch");

    first_gate
        .send(Err(ClientError::Transport {
            message: "timed out".to_string(),
        }))
        .expect("first gate");
    assert!(matches!(first.await.expect("join"), FetchOutcome::Superseded));
    assert!(controller.current().loading);

    second_gate
        .send(Ok(page_of(&second_request, vec![1])))
        .expect("second gate");
    second.await.expect("join");
    assert!(controller.current().error.is_none());
}

#[tokio::test]
async fn filters_and_limit_reset_page() {
    let (controller, requests, _) = recording_controller(vec![1]);

    controller.set_page(3).await.expect("page");
    controller
        .set_filters(FilterPatch::new().set("name", "x"))
        .await;
    controller.set_page(2).await.expect("page");
    controller.set_limit(25).await.expect("limit");

    let pages: Vec<(u32, u32)> = requests
        .lock()
        .expect("request log")
        .iter()
        .map(|request| (request.page(), request.limit()))
        .collect();
    assert_eq!(pages, vec![(3, 10), (1, 10), (2, 10), (1, 25)]);
}

#[tokio::test]
async fn refresh_repeats_last_request() {
    let (controller, requests, _) = recording_controller(vec![1]);
    controller.set_sort(Some("asc".to_string())).await;
    controller.set_page(2).await.expect("page");
    controller.refresh().await;

    let log = requests.lock().expect("request log");
    assert_eq!(log.len(), 3);
    assert_eq!(log[1], log[2]);
    assert_eq!(log[2].sort(), Some("asc"));
}

#[tokio::test]
async fn invalid_paging_is_rejected_without_fetching() {
    let (controller, requests, _) = recording_controller(vec![1]);

    assert_eq!(
        controller.set_page(0).await.expect_err("page 0"),
        ValidationError::InvalidPage
    );
    assert_eq!(
        controller.set_limit(0).await.expect_err("limit 0"),
        ValidationError::InvalidLimit
    );
    assert!(requests.lock().expect("request log").is_empty());
    assert_eq!(controller.request().page(), 1);
}

#[tokio::test]
async fn failed_fetch_keeps_previous_data() {
    let (controller, _, failing) = recording_controller(vec![1, 2, 3, 4, 5]);
    assert!(matches!(controller.refresh().await, FetchOutcome::Applied));
    assert_eq!(controller.current().items().len(), 5);

    failing.store(true, Ordering::SeqCst);
    let outcome = controller.set_page(2).await.expect("page");

    match outcome {
        FetchOutcome::Failed(err) => assert_eq!(err.user_message(), "database unavailable"),
        other => panic!("expected failure, got {other:?}"),
    }
    let snapshot = controller.current();
    assert_eq!(snapshot.items().len(), 5);
    assert!(snapshot.error.is_some());
    assert!(!snapshot.loading);

    failing.store(false, Ordering::SeqCst);
    controller.refresh().await;
    assert!(controller.current().error.is_none());
}

#[tokio::test]
async fn page_beyond_range_renders_empty_state() {
    let controller = ResourceListController::from_fn(
        "numbers",
        |request: PageRequest| async move {
            Ok(PageResult::<u32>::from_envelope(
                ListEnvelope {
                    data: Vec::new(),
                    pagination: Some(Pagination {
                        page: request.page(),
                        limit: request.limit(),
                        total: 25,
                        total_pages: 3,
                    }),
                },
                &request,
            ))
        },
        PageRequest::default(),
    );

    let outcome = controller.set_page(4).await.expect("page");
    assert!(matches!(outcome, FetchOutcome::Applied));

    let snapshot = controller.current();
    assert!(snapshot.is_empty_state());
    assert!(snapshot.error.is_none());
    let page = snapshot.data.expect("page");
    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn subscribers_observe_applied_pages() {
    let (controller, _, _) = recording_controller(vec![7]);
    let mut updates = controller.subscribe();

    controller.refresh().await;

    assert!(updates.has_changed().expect("controller alive"));
    assert_eq!(updates.borrow_and_update().items(), &[7]);
    assert!(controller.next_page().await.is_none());
    assert!(controller.previous_page().await.is_none());
}

#[tokio::test]
async fn rejected_paging_leaves_snapshot_untouched() {
    let (controller, requests, _) = recording_controller(vec![1]);
    controller.set_page(3).await.expect("page");
    let mut updates = controller.subscribe();
    updates.borrow_and_update();

    assert!(controller.set_limit(0).await.is_err());
    assert!(controller.set_page(0).await.is_err());

    assert!(!updates.has_changed().expect("controller alive"));
    let snapshot = controller.current();
    assert_eq!(snapshot.request.page(), 3);
    assert_eq!(snapshot.request.limit(), 10);
    assert!(!snapshot.loading);
    assert_eq!(requests.lock().expect("request log").len(), 1);
}
