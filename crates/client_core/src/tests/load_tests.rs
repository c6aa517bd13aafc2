use super::*;

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use shared::error::ErrorKind;
use tokio::sync::oneshot;

type Outcome = Result<String, String>;

#[derive(Default)]
struct Gates {
    pending: Mutex<HashMap<u32, oneshot::Receiver<Outcome>>>,
    calls: AtomicUsize,
}

impl Gates {
    /// Registers the gate the next fetch for `key` will wait on.
    fn open(&self, key: u32) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().expect("gates").insert(key, rx);
        tx
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn gated_controller() -> (LoadController<u32, String>, Arc<Gates>) {
    let gates = Arc::new(Gates::default());
    let fetch_gates = Arc::clone(&gates);
    let controller = LoadController::new(move |key: u32| {
        fetch_gates.calls.fetch_add(1, Ordering::SeqCst);
        let gate = fetch_gates.pending.lock().expect("gates").remove(&key);
        async move {
            let outcome = match gate {
                Some(rx) => rx.await.unwrap_or_else(|_| Err("gate dropped".to_string())),
                None => Err(format!("no gate registered for key {key}")),
            };
            outcome.map_err(ErrorInfo::network_or_decode)
        }
    });
    (controller, gates)
}

async fn let_tasks_run() {
    tokio::time::sleep(Duration::from_millis(25)).await;
}

#[tokio::test]
async fn starts_idle_and_settles_immediately_when_never_activated() {
    let (controller, gates) = gated_controller();

    assert!(controller.state().is_idle());
    assert_eq!(controller.active_key(), None);
    assert!(controller.settled().await.is_idle());
    assert!(!controller.refresh());
    assert_eq!(gates.calls(), 0);
}

#[tokio::test]
async fn activation_is_loading_before_fetch_resolves() {
    let (controller, gates) = gated_controller();
    let _tx = gates.open(1);

    controller.activate(1);

    assert_eq!(controller.state(), LoadState::Loading);
    assert_eq!(controller.active_key(), Some(1));
    assert_eq!(gates.calls(), 1);
}

#[tokio::test]
async fn successful_fetch_commits_payload_unchanged() {
    let (controller, gates) = gated_controller();
    let tx = gates.open(1);

    controller.activate(1);
    tx.send(Ok("Rick Sanchez".to_string())).expect("send");

    assert_eq!(
        controller.settled().await,
        LoadState::Loaded("Rick Sanchez".to_string())
    );
}

#[tokio::test]
async fn failing_fetch_commits_failed_state() {
    let (controller, gates) = gated_controller();
    let tx = gates.open(1);

    controller.activate(1);
    tx.send(Err("connection refused".to_string())).expect("send");

    let state = controller.settled().await;
    let error = state.error().expect("failed state");
    assert_eq!(error.kind, ErrorKind::NetworkOrDecodeFailure);
    assert!(error.message.contains("connection refused"));
    assert!(state.value().is_none());
}

#[tokio::test]
async fn late_result_for_superseded_key_is_discarded() {
    let (controller, gates) = gated_controller();
    let first = gates.open(1);
    let second = gates.open(2);

    controller.activate(1);
    controller.activate(2);
    assert_eq!(controller.active_key(), Some(2));

    second.send(Ok("two".to_string())).expect("send second");
    assert_eq!(controller.settled().await, LoadState::Loaded("two".to_string()));

    first.send(Ok("one".to_string())).expect("send first");
    let_tasks_run().await;

    assert_eq!(controller.state(), LoadState::Loaded("two".to_string()));
}

#[tokio::test]
async fn early_result_for_superseded_key_does_not_settle_newer_load() {
    let (controller, gates) = gated_controller();
    let first = gates.open(1);
    let second = gates.open(2);

    controller.activate(1);
    controller.activate(2);

    first.send(Err("stale failure".to_string())).expect("send first");
    let_tasks_run().await;
    assert_eq!(controller.state(), LoadState::Loading);

    second.send(Ok("two".to_string())).expect("send second");
    assert_eq!(controller.settled().await, LoadState::Loaded("two".to_string()));
}

#[tokio::test]
async fn reactivating_same_key_refetches_without_caching() {
    let (controller, gates) = gated_controller();
    let tx = gates.open(7);
    controller.activate(7);
    tx.send(Ok("first".to_string())).expect("send");
    assert_eq!(controller.settled().await, LoadState::Loaded("first".to_string()));

    let tx = gates.open(7);
    controller.activate(7);
    assert_eq!(controller.state(), LoadState::Loading);
    assert_eq!(gates.calls(), 2);

    tx.send(Ok("fresh".to_string())).expect("send");
    assert_eq!(controller.settled().await, LoadState::Loaded("fresh".to_string()));
}

#[tokio::test]
async fn reactivating_same_key_in_flight_keeps_only_latest_outcome() {
    let (controller, gates) = gated_controller();
    let older = gates.open(3);
    controller.activate(3);
    let newer = gates.open(3);
    controller.activate(3);

    newer.send(Ok("newer".to_string())).expect("send newer");
    assert_eq!(controller.settled().await, LoadState::Loaded("newer".to_string()));

    older.send(Ok("older".to_string())).expect("send older");
    let_tasks_run().await;
    assert_eq!(controller.state(), LoadState::Loaded("newer".to_string()));
}

#[tokio::test]
async fn refresh_reactivates_current_key() {
    let (controller, gates) = gated_controller();
    let tx = gates.open(5);
    controller.activate(5);
    tx.send(Err("timed out".to_string())).expect("send");
    assert!(controller.settled().await.error().is_some());

    let tx = gates.open(5);
    assert!(controller.refresh());
    assert!(controller.state().is_loading());
    tx.send(Ok("recovered".to_string())).expect("send");

    assert_eq!(
        controller.settled().await,
        LoadState::Loaded("recovered".to_string())
    );
    assert_eq!(gates.calls(), 2);
}

#[tokio::test]
async fn subscribers_observe_each_transition() {
    let (controller, gates) = gated_controller();
    let mut rx = controller.subscribe();
    let tx = gates.open(1);

    controller.activate(1);
    rx.changed().await.expect("loading");
    assert!(rx.borrow_and_update().is_loading());

    tx.send(Ok("done".to_string())).expect("send");
    rx.changed().await.expect("loaded");
    assert_eq!(*rx.borrow_and_update(), LoadState::Loaded("done".to_string()));
}

#[tokio::test]
async fn dropping_controller_aborts_in_flight_fetch() {
    let (controller, gates) = gated_controller();
    let tx = gates.open(1);
    controller.activate(1);

    drop(controller);
    let_tasks_run().await;

    assert!(tx.is_closed());
}

#[tokio::test]
async fn panicking_fetch_settles_as_failed() {
    let controller: LoadController<u32, String> = LoadController::new(|key: u32| async move {
        if key == 1 {
            panic!("fetch blew up");
        }
        Ok::<_, ErrorInfo>(format!("value {key}"))
    });

    controller.activate(1);
    let state = tokio::time::timeout(Duration::from_secs(2), controller.settled())
        .await
        .expect("a panicking fetch must still settle");

    let error = state.error().expect("failed state");
    assert_eq!(error.kind, ErrorKind::NetworkOrDecodeFailure);
    assert!(error.message.contains("panicked"));

    controller.activate(2);
    assert_eq!(controller.settled().await, LoadState::Loaded("value 2".to_string()));
}
