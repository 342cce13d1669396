//! Integration tests: intake facade against a live record store
//!
//! Each test serves the fhi-store router on an ephemeral local port and talks
//! to it through `HttpRecordStore`, exactly as a deployed device would.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use fhi_common::config::TomlConfig;
use fhi_common::model::{GeneralDataPatch, MemberPatch};
use fhi_common::{FamilyRecord, MatrixSection, MemberRole};
use fhi_intake::{
    DashboardStats, DraftChoice, HttpRecordStore, LocalCache, RecordBuilder, RemoteStore,
    SyncFacade, Tier,
};
use fhi_store::{build_router, AppState};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Serve `app` on 127.0.0.1 and return the API base URL
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

async fn spawn_store() -> String {
    let pool = fhi_common::db::open_in_memory().await.unwrap();
    fhi_common::db::create_records_table(&pool).await.unwrap();
    serve(build_router(AppState::new(pool))).await
}

fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

async fn facade_for(base: &str, cache: LocalCache) -> SyncFacade {
    let remote = HttpRecordStore::new(base, TIMEOUT).unwrap();
    SyncFacade::new(cache, Some(Arc::new(remote)))
}

#[tokio::test]
async fn test_save_and_list_through_store() {
    let base = spawn_store().await;
    let cache = LocalCache::in_memory().await.unwrap();
    let facade = facade_for(&base, cache.clone()).await;

    let mut older = FamilyRecord::blank();
    older.created_at = older.created_at - chrono::Duration::days(1);
    let newer = FamilyRecord::blank();

    assert!(facade.save(&older).await.unwrap());
    assert!(facade.save(&newer).await.unwrap());

    // Store orders newest first and the mirror follows the store
    let listed = facade.list().await.unwrap();
    let ids: Vec<_> = listed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
    assert_eq!(cache.records().await.unwrap(), listed);
}

#[tokio::test]
async fn test_second_device_sees_first_devices_records() {
    let base = spawn_store().await;
    let device_a = facade_for(&base, LocalCache::in_memory().await.unwrap()).await;
    let cache_b = LocalCache::in_memory().await.unwrap();
    let device_b = facade_for(&base, cache_b.clone()).await;

    let record = FamilyRecord::blank();
    assert!(device_a.save(&record).await.unwrap());

    assert_eq!(device_b.list().await.unwrap(), vec![record.clone()]);
    assert_eq!(cache_b.records().await.unwrap(), vec![record]);
}

#[tokio::test]
async fn test_delete_reaches_store() {
    let base = spawn_store().await;
    let facade = facade_for(&base, LocalCache::in_memory().await.unwrap()).await;
    let record = FamilyRecord::blank();
    facade.save(&record).await.unwrap();

    facade.delete(record.id).await.unwrap();

    let remote = HttpRecordStore::new(&base, TIMEOUT).unwrap();
    assert_eq!(remote.fetch_records().await, Tier::Ok(Vec::new()));
}

#[tokio::test]
async fn test_offline_save_then_store_wins_on_next_list() {
    let cache = LocalCache::in_memory().await.unwrap();
    let offline = facade_for(&unreachable_base(), cache.clone()).await;
    let local = FamilyRecord::blank();

    assert!(!offline.save(&local).await.unwrap());
    assert_eq!(offline.list().await.unwrap(), vec![local]);

    // No reconciliation: once the store is reachable its set replaces the mirror
    let base = spawn_store().await;
    let online = facade_for(&base, cache.clone()).await;
    assert!(online.list().await.unwrap().is_empty());
    assert!(cache.records().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_is_unavailable() {
    let app = Router::new().route(
        "/api/records",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR })
            .post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base = serve(app).await;
    let cache = LocalCache::in_memory().await.unwrap();
    let facade = facade_for(&base, cache.clone()).await;

    let record = FamilyRecord::blank();
    assert!(!facade.save(&record).await.unwrap());
    assert_eq!(facade.list().await.unwrap(), vec![record]);

    // Unknown route: 404 from the fallback, still not an error to the caller
    facade.delete(uuid::Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn test_server_location_read_on_connect() {
    let base = spawn_store().await;
    let cache = LocalCache::in_memory().await.unwrap();
    let config = TomlConfig {
        default_server_url: String::new(),
        ..TomlConfig::default()
    };

    let facade = SyncFacade::connect(cache.clone(), &config).await.unwrap();
    assert!(facade.is_local_only());

    facade.set_server_location(&base).await.unwrap();
    // The running facade keeps its mode until reconnected
    assert!(facade.is_local_only());

    let facade = SyncFacade::connect(cache, &config).await.unwrap();
    assert_eq!(facade.endpoint(), Some(base.as_str()));
    assert!(facade.save(&FamilyRecord::blank()).await.unwrap());
}

#[tokio::test]
async fn test_export_import_between_devices() {
    let dir = tempfile::TempDir::new().unwrap();
    let source = SyncFacade::new(LocalCache::in_memory().await.unwrap(), None);
    source.save(&FamilyRecord::blank()).await.unwrap();
    source.save(&FamilyRecord::blank()).await.unwrap();

    let path = source.export_to_dir(dir.path()).await.unwrap();
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("health_assess_backup_"));

    let payload = std::fs::read_to_string(&path).unwrap();
    assert_eq!(payload, source.export().await.unwrap());

    let target = SyncFacade::new(LocalCache::in_memory().await.unwrap(), None);
    assert_eq!(
        target.import(&payload).await.unwrap(),
        fhi_intake::ImportOutcome::Imported(2)
    );
    assert_eq!(target.list().await.unwrap(), source.list().await.unwrap());
}

#[tokio::test]
async fn test_wizard_session_to_dashboard() {
    let base = spawn_store().await;
    let cache = LocalCache::in_memory().await.unwrap();
    let facade = Arc::new(facade_for(&base, cache.clone()).await);

    let mut builder = RecordBuilder::open_new(facade.clone(), Duration::from_millis(20), |_| {
        DraftChoice::Discard
    })
    .await
    .unwrap();

    builder.update_general(&GeneralDataPatch {
        sisben: Some("B4".to_string()),
        municipality: Some("Arjona".to_string()),
        ..Default::default()
    });
    let child = builder.add_member().unwrap();
    builder
        .update_member(child, &MemberPatch {
            first_name: Some("Ana".to_string()),
            age: Some(7),
            ..Default::default()
        })
        .unwrap();
    builder
        .set_matrix_cell(MatrixSection::MedicalHistory, "Dengue", child, true.into())
        .unwrap();
    builder
        .set_matrix_cell(
            MatrixSection::MedicalHistory,
            "Dengue",
            MemberRole::HeadOfFamily,
            true.into(),
        )
        .unwrap();

    while !builder.step().is_last() {
        builder.next();
    }
    assert!(builder.finalize().await.unwrap());
    assert!(cache.draft().await.unwrap().is_none());

    let stats = DashboardStats::compute(&facade.list().await.unwrap());
    assert_eq!(stats.total_families, 1);
    assert_eq!(stats.total_members, 2);
    assert_eq!(stats.sisben[0].name, "B4");
    assert_eq!(stats.conditions.len(), 1);
    assert_eq!(stats.conditions[0].name, "Dengue");
    assert_eq!(stats.conditions[0].value, 1);
}
