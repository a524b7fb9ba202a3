use quotebook_core::{
    CycleOutcome, HttpQuoteRemote, NoticeKind, Quote, QuotePersistence, QuoteStore,
    SharedQuoteStore, SqliteKvRepository, SyncAgent, SyncError, SyncState, SERVER_CATEGORY,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn shared_store() -> SharedQuoteStore {
    QuoteStore::open(QuotePersistence::new(
        Box::new(SqliteKvRepository::open_session().unwrap()),
        Box::new(SqliteKvRepository::open_session().unwrap()),
    ))
    .unwrap()
    .into_shared()
}

fn agent(server: &MockServer, store: SharedQuoteStore, period: Duration) -> SyncAgent {
    let remote = HttpQuoteRemote::new(
        format!("{}/posts/1", server.uri()),
        format!("{}/posts", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    SyncAgent::new(store, remote, period).with_notice_ttl(Duration::from_secs(60))
}

async fn mount_fetch(server: &MockServer, title: &str) {
    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": 1, "userId": 1, "title": title })),
        )
        .mount(server)
        .await;
}

fn first_quote(store: &SharedQuoteStore) -> Quote {
    store.lock().unwrap().quotes()[0].clone()
}

#[tokio::test]
async fn cycle_prepends_remote_quote_and_mirrors_it() {
    let server = MockServer::start().await;
    mount_fetch(&server, "sunt aut facere").await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(body_json(serde_json::json!({
            "text": "sunt aut facere",
            "category": SERVER_CATEGORY,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": 101 })))
        .expect(1)
        .mount(&server)
        .await;

    let store = shared_store();
    let before = store.lock().unwrap().len();
    let agent = agent(&server, Arc::clone(&store), Duration::from_secs(15));

    let report = match agent.run_cycle().await {
        CycleOutcome::Synced(report) => report,
        other => panic!("expected synced outcome, got {other:?}"),
    };
    assert!(report.mirrored);
    assert_eq!(report.merged, Quote::unchecked("sunt aut facere", "Server"));

    assert_eq!(store.lock().unwrap().len(), before + 1);
    assert_eq!(first_quote(&store), report.merged);
    assert_eq!(agent.state(), SyncState::Idle);

    let notice = agent.notices().current().unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
}

#[tokio::test]
async fn failed_mirror_keeps_local_merge() {
    let server = MockServer::start().await;
    mount_fetch(&server, "kept locally").await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = shared_store();
    let agent = agent(&server, Arc::clone(&store), Duration::from_secs(15));

    match agent.run_cycle().await {
        CycleOutcome::Synced(report) => assert!(!report.mirrored),
        other => panic!("expected synced outcome, got {other:?}"),
    }
    assert_eq!(first_quote(&store).text, "kept locally");
}

#[tokio::test]
async fn fetch_error_status_reports_failure_without_mutation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = shared_store();
    let before = store.lock().unwrap().quotes().to_vec();
    let agent = agent(&server, Arc::clone(&store), Duration::from_secs(15));

    match agent.run_cycle().await {
        CycleOutcome::Failed(SyncError::Status { stage, status }) => {
            assert_eq!(stage, "fetch");
            assert_eq!(status, 503);
        }
        other => panic!("expected fetch status failure, got {other:?}"),
    }
    assert_eq!(store.lock().unwrap().quotes(), before.as_slice());
    assert_eq!(
        agent.notices().current().map(|n| n.kind),
        Some(NoticeKind::Failed)
    );
    assert_eq!(agent.state(), SyncState::Idle);
}

#[tokio::test]
async fn body_without_title_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 1 })))
        .mount(&server)
        .await;

    let store = shared_store();
    let before = store.lock().unwrap().len();
    let agent = agent(&server, Arc::clone(&store), Duration::from_secs(15));

    assert!(matches!(
        agent.run_cycle().await,
        CycleOutcome::Failed(SyncError::MalformedResponse(_))
    ));
    assert_eq!(store.lock().unwrap().len(), before);
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    let server = MockServer::start().await;
    let store = shared_store();
    let agent = agent(&server, Arc::clone(&store), Duration::from_secs(15));
    drop(server);

    assert!(matches!(
        agent.run_cycle().await,
        CycleOutcome::Failed(SyncError::Network(_))
    ));
}

#[tokio::test]
async fn overlapping_cycle_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "title": "slow" }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let store = shared_store();
    let before = store.lock().unwrap().len();
    let agent = agent(&server, Arc::clone(&store), Duration::from_secs(15));

    let (first, second) = tokio::join!(agent.run_cycle(), agent.run_cycle());
    assert!(matches!(first, CycleOutcome::Synced(_)));
    assert!(matches!(second, CycleOutcome::Skipped));
    assert_eq!(store.lock().unwrap().len(), before + 1);
    assert_eq!(agent.state(), SyncState::Idle);
}

#[tokio::test]
async fn spawned_agent_runs_on_timer_and_stops() {
    let server = MockServer::start().await;
    mount_fetch(&server, "tick").await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let store = shared_store();
    let agent = Arc::new(agent(&server, Arc::clone(&store), Duration::from_millis(50)));
    let mut notices = agent.notices().subscribe();
    let handle = Arc::clone(&agent).spawn();

    tokio::time::timeout(Duration::from_secs(5), notices.changed())
        .await
        .expect("a cycle should run within the timeout")
        .unwrap();
    handle.stop().await;

    assert_eq!(first_quote(&store).text, "tick");
}

#[tokio::test]
async fn sync_now_triggers_cycle_before_first_tick() {
    let server = MockServer::start().await;
    mount_fetch(&server, "on demand").await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let store = shared_store();
    let agent = Arc::new(agent(&server, Arc::clone(&store), Duration::from_secs(3600)));
    let mut notices = agent.notices().subscribe();
    let handle = Arc::clone(&agent).spawn();

    handle.sync_now().await;
    tokio::time::timeout(Duration::from_secs(5), notices.changed())
        .await
        .expect("sync_now should run a cycle")
        .unwrap();
    handle.stop().await;

    assert_eq!(first_quote(&store).text, "on demand");
}
