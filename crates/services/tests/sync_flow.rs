use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use prep_core::model::{Credentials, Dataset, PremiumCheck};
use services::{
    AppServices, ListFilter, PageRequest, QuestionListSource, QuestionPage, RemoteQuestion,
    SharedCatalog, SyncError, UserProfile,
};
use storage::repository::Storage;

/// Serves fixed lists page by page and can inject failures or pauses.
#[derive(Default)]
struct FakeSource {
    solved: Vec<RemoteQuestion>,
    all: Vec<RemoteQuestion>,
    fail_after: Option<usize>,
    profile: Option<UserProfile>,
    calls: AtomicUsize,
    requests: Mutex<Vec<PageRequest>>,
    logout_on_fetch: Mutex<Option<SharedCatalog>>,
    pause: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl FakeSource {
    fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionListSource for FakeSource {
    async fn fetch_page(
        &self,
        _credentials: &Credentials,
        request: PageRequest,
    ) -> Result<QuestionPage, SyncError> {
        self.requests.lock().unwrap().push(request);
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        let pause = self.pause.lock().unwrap().take();
        if let Some((entered, gate)) = pause {
            entered.notify_one();
            gate.notified().await;
        }
        let logout = self.logout_on_fetch.lock().unwrap().take();
        if let Some(catalog) = logout {
            catalog.lock().await.logout().await;
        }

        if self.fail_after.is_some_and(|n| call >= n) {
            return Err(SyncError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY));
        }

        let list = match request.filter {
            ListFilter::Solved => &self.solved,
            ListFilter::All => &self.all,
        };
        let start = request.skip.min(list.len());
        let end = (request.skip + request.limit).min(list.len());
        Ok(QuestionPage {
            total: Some(list.len()),
            items: list[start..end].to_vec(),
        })
    }

    async fn fetch_user_profile(
        &self,
        _credentials: &Credentials,
    ) -> Result<UserProfile, SyncError> {
        self.profile
            .clone()
            .ok_or_else(|| SyncError::Remote("unauthenticated".into()))
    }
}

fn dataset() -> Arc<Dataset> {
    let json = r#"[
        {"title": "A", "difficulty": "EASY", "companies": [{"name": "Google", "frequency": 10}]},
        {"title": "B", "difficulty": "MEDIUM"},
        {"title": "C", "difficulty": "HARD"}
    ]"#;
    Arc::new(Dataset::from_json_str(json).unwrap())
}

fn credentials() -> Credentials {
    Credentials::new("session", "csrf").unwrap()
}

async fn services_with(storage: &Storage, source: Arc<FakeSource>) -> AppServices {
    AppServices::assemble(storage, dataset(), source).await
}

#[tokio::test]
async fn solved_sync_pages_and_replaces_map() {
    let source = Arc::new(FakeSource {
        solved: vec![RemoteQuestion::new("A"), RemoteQuestion::new("B")],
        ..FakeSource::default()
    });
    let storage = Storage::in_memory();
    let services = services_with(&storage, Arc::clone(&source)).await;
    {
        let catalog = services.catalog();
        let mut catalog = catalog.lock().await;
        catalog.login(credentials(), None).await;
        let ticket = catalog.begin_sync(services::SyncKind::Solved).unwrap();
        catalog
            .apply_solved_sync(&ticket, vec!["Old".into()])
            .await
            .unwrap();
    }

    let sync = services.sync();
    let sync = sync.as_ref().clone().with_batch_size(1);
    let count = sync.sync_solved().await.unwrap();
    assert_eq!(count, 2);

    let requests = source.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!((requests[0].skip, requests[0].limit), (0, 1));
    assert_eq!((requests[1].skip, requests[1].limit), (1, 1));
    assert!(requests.iter().all(|r| r.filter == ListFilter::Solved));

    let catalog = services.catalog();
    let catalog = catalog.lock().await;
    let solved = &catalog.state().solved;
    assert!(solved.is_set("A"));
    assert!(solved.is_set("B"));
    assert!(!solved.contains("Old"));
    assert_eq!(solved.len(), 2);
}

#[tokio::test]
async fn premium_sync_merges_batches_and_completes_once() {
    let source = Arc::new(FakeSource {
        all: vec![
            RemoteQuestion::new("A"),
            RemoteQuestion::new("B").paid_only(true),
            RemoteQuestion::new("C"),
        ],
        ..FakeSource::default()
    });
    let storage = Storage::in_memory();
    let services = services_with(&storage, Arc::clone(&source)).await;
    services
        .catalog()
        .lock()
        .await
        .login(credentials(), None)
        .await;

    let sync = services.sync().as_ref().clone().with_batch_size(2);
    assert_eq!(sync.sync_premium().await.unwrap(), 3);
    assert_eq!(source.requests().len(), 2);

    {
        let catalog = services.catalog();
        let catalog = catalog.lock().await;
        let summary = catalog.premium_summary();
        assert_eq!((summary.checked, summary.premium), (3, 1));
        assert!(catalog.premium_check_complete());
        assert!(matches!(
            catalog.state().premium_check,
            PremiumCheck::Complete { fingerprint: Some(_) }
        ));
    }

    assert!(matches!(
        sync.sync_premium().await,
        Err(SyncError::AlreadyComplete)
    ));
    assert_eq!(source.requests().len(), 2);
}

#[tokio::test]
async fn premium_failure_keeps_merged_batches() {
    let source = Arc::new(FakeSource {
        all: vec![
            RemoteQuestion::new("A").paid_only(true),
            RemoteQuestion::new("B"),
            RemoteQuestion::new("C"),
        ],
        fail_after: Some(2),
        ..FakeSource::default()
    });
    let storage = Storage::in_memory();
    let services = services_with(&storage, Arc::clone(&source)).await;
    let catalog = services.catalog();
    catalog.lock().await.login(credentials(), None).await;

    let sync = services.sync().as_ref().clone().with_batch_size(1);
    let err = sync.sync_premium().await.unwrap_err();
    assert!(matches!(err, SyncError::HttpStatus(status) if status.as_u16() == 502));

    let guard = catalog.lock().await;
    assert_eq!(guard.state().premium.len(), 2);
    assert!(guard.state().premium.is_set("A"));
    assert!(!guard.premium_check_complete());
    drop(guard);

    // The failed run released its ticket.
    assert!(matches!(
        sync.sync_premium().await,
        Err(SyncError::HttpStatus(_))
    ));
}

#[tokio::test]
async fn solved_failure_keeps_previous_map() {
    let source = Arc::new(FakeSource {
        solved: vec![RemoteQuestion::new("A"), RemoteQuestion::new("B")],
        fail_after: Some(1),
        ..FakeSource::default()
    });
    let storage = Storage::in_memory();
    let services = services_with(&storage, Arc::clone(&source)).await;
    let catalog = services.catalog();
    {
        let mut guard = catalog.lock().await;
        guard.login(credentials(), None).await;
        let ticket = guard.begin_sync(services::SyncKind::Solved).unwrap();
        guard
            .apply_solved_sync(&ticket, vec!["Old".into()])
            .await
            .unwrap();
    }

    let sync = services.sync().as_ref().clone().with_batch_size(1);
    let err = sync.sync_solved().await.unwrap_err();
    assert!(matches!(err, SyncError::HttpStatus(status) if status.as_u16() == 502));
    assert_eq!(source.requests().len(), 2);

    {
        let guard = catalog.lock().await;
        let solved = &guard.state().solved;
        assert_eq!(solved.len(), 1);
        assert!(solved.is_set("Old"));
        assert!(!solved.contains("A"));
    }

    // The ticket was released, so a retry reaches the remote again.
    assert!(matches!(
        sync.sync_solved().await,
        Err(SyncError::HttpStatus(_))
    ));
    assert_eq!(source.requests().len(), 3);
}

#[tokio::test]
async fn logout_mid_sync_discards_results() {
    let source = Arc::new(FakeSource {
        solved: vec![RemoteQuestion::new("A")],
        ..FakeSource::default()
    });
    let storage = Storage::in_memory();
    let services = services_with(&storage, Arc::clone(&source)).await;
    let catalog = services.catalog();
    catalog.lock().await.login(credentials(), None).await;
    *source.logout_on_fetch.lock().unwrap() = Some(Arc::clone(&catalog));

    let err = services.sync().sync_solved().await.unwrap_err();
    assert!(matches!(err, SyncError::StaleSession));

    let guard = catalog.lock().await;
    assert!(!guard.is_logged_in());
    assert!(guard.state().solved.is_empty());
}

#[tokio::test]
async fn concurrent_sync_of_same_kind_is_rejected() {
    let source = Arc::new(FakeSource {
        solved: vec![RemoteQuestion::new("A"), RemoteQuestion::new("C")],
        ..FakeSource::default()
    });
    let entered = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());
    *source.pause.lock().unwrap() = Some((Arc::clone(&entered), Arc::clone(&gate)));

    let storage = Storage::in_memory();
    let services = services_with(&storage, Arc::clone(&source)).await;
    services
        .catalog()
        .lock()
        .await
        .login(credentials(), None)
        .await;

    let sync = services.sync();
    let first = tokio::spawn({
        let sync = Arc::clone(&sync);
        async move { sync.sync_solved().await }
    });

    entered.notified().await;
    assert!(matches!(
        sync.sync_solved().await,
        Err(SyncError::AlreadyRunning)
    ));
    gate.notify_one();

    assert_eq!(first.await.unwrap().unwrap(), 2);
}

#[tokio::test]
async fn empty_solved_result_keeps_previous_map() {
    let source = Arc::new(FakeSource::default());
    let storage = Storage::in_memory();
    let services = services_with(&storage, Arc::clone(&source)).await;
    let catalog = services.catalog();
    {
        let mut guard = catalog.lock().await;
        guard.login(credentials(), None).await;
        let ticket = guard.begin_sync(services::SyncKind::Solved).unwrap();
        guard
            .apply_solved_sync(&ticket, vec!["B".into()])
            .await
            .unwrap();
    }

    let err = services.sync().sync_solved().await.unwrap_err();
    assert!(matches!(err, SyncError::NoSolvedQuestions));
    assert!(catalog.lock().await.state().solved.is_set("B"));
}

#[tokio::test]
async fn login_resolves_username_when_signed_in() {
    let source = Arc::new(FakeSource {
        profile: Some(UserProfile {
            username: Some("alice".into()),
            is_signed_in: true,
            is_premium: false,
        }),
        ..FakeSource::default()
    });
    let storage = Storage::in_memory();
    let services = services_with(&storage, source).await;

    let username = services.sync().login(credentials()).await;
    assert_eq!(username.as_deref(), Some("alice"));
    assert_eq!(services.catalog().lock().await.username(), Some("alice"));
}

#[tokio::test]
async fn failed_profile_lookup_still_logs_in() {
    let storage = Storage::in_memory();
    let services = services_with(&storage, Arc::new(FakeSource::default())).await;

    assert_eq!(services.sync().login(credentials()).await, None);
    let catalog = services.catalog();
    let guard = catalog.lock().await;
    assert!(guard.is_logged_in());
    assert_eq!(guard.username(), None);
}

#[tokio::test]
async fn synced_state_survives_restart() {
    let storage = Storage::sqlite("sqlite:file:memdb_sync_restart?mode=memory&cache=shared")
        .await
        .expect("open sqlite");
    let source = Arc::new(FakeSource {
        solved: vec![RemoteQuestion::new("C")],
        ..FakeSource::default()
    });

    let services = services_with(&storage, Arc::clone(&source)).await;
    services
        .catalog()
        .lock()
        .await
        .login(credentials(), Some("bob".into()))
        .await;
    services.sync().sync_solved().await.unwrap();
    services.catalog().lock().await.set_page(1).await;
    drop(services);

    let restarted = services_with(&storage, source).await;
    let catalog = restarted.catalog();
    let guard = catalog.lock().await;
    assert!(guard.is_logged_in());
    assert_eq!(guard.username(), Some("bob"));
    assert!(guard.state().solved.is_set("C"));
    assert_eq!(guard.stats().solved_count, 1);
}
