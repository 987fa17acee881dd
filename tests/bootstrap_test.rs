//! Integration tests for the bootstrap protocol against the in-memory store

use helios_bootstrap::{
    BootstrapError, Bootstrapper, FailureKind, NamespaceGenerator, NamespaceId, NamespaceLayout,
    bootstrap,
};
use helios_store::{Interference, MemoryClient, MemoryStore, StoreError, Trigger};
use std::sync::Arc;

fn setup() -> (Arc<MemoryStore>, MemoryClient) {
    let store = Arc::new(MemoryStore::new());
    let client = MemoryClient::new("bootstrap", store.clone());
    (store, client)
}

fn skeleton(id: &NamespaceId) -> Vec<String> {
    NamespaceLayout::new(id).paths().to_vec()
}

fn none_exist(store: &MemoryStore, paths: &[String]) -> bool {
    paths.iter().all(|p| !store.exists(p))
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_bootstrap_empty_store() {
    let (store, client) = setup();
    let id = NamespaceGenerator::generate();

    let report = bootstrap(&client, &id).await.unwrap();

    assert_eq!(report.namespace, id);
    assert!(report.root_created);
    assert_eq!(report.paths, skeleton(&id));

    assert_eq!(store.data("/helios"), Some(Vec::new()));
    for path in skeleton(&id) {
        assert_eq!(store.data(&path), Some(Vec::new()), "{} missing", path);
    }
    assert_eq!(store.len(), 7);
    assert_eq!(store.transactions(), 2);
}

#[tokio::test]
async fn test_exact_node_layout() {
    let (store, client) = setup();
    let id = NamespaceId::parse("abc").unwrap();

    Bootstrapper::new(&client).bootstrap(&id).await.unwrap();

    assert_eq!(
        store.paths(),
        vec![
            "/helios",
            "/helios/abc",
            "/helios/abc/config",
            "/helios/abc/config/hosts",
            "/helios/abc/config/id",
            "/helios/abc/status",
            "/helios/abc/status/hosts",
        ]
    );
}

#[tokio::test]
async fn test_two_namespaces_share_root() {
    let (store, client) = setup();
    let first = NamespaceGenerator::generate();
    let second = NamespaceGenerator::generate();

    let report = bootstrap(&client, &first).await.unwrap();
    assert!(report.root_created);

    let report = bootstrap(&client, &second).await.unwrap();
    assert!(!report.root_created);

    let mut expected = vec![first.to_string(), second.to_string()];
    expected.sort();
    assert_eq!(store.children("/helios"), expected);
    assert_eq!(store.children("/"), vec!["helios".to_string()]);
    assert_eq!(store.len(), 13);
}

#[tokio::test]
async fn test_root_created_concurrently() {
    let (store, client) = setup();
    let id = NamespaceGenerator::generate();

    // Calls: 0 = check batch, 1 = exists(/helios), 2 = create(/helios)
    store.interfere(
        Trigger::BeforeCall(2),
        Interference::CreateNode("/helios".to_string()),
    );

    let report = bootstrap(&client, &id).await.unwrap();

    assert!(!report.root_created);
    assert_eq!(store.calls(), 4);
    assert_eq!(store.len(), 7);
}

// ============================================================================
// Collisions
// ============================================================================

#[tokio::test]
async fn test_existing_namespace_node_is_collision() {
    let (store, client) = setup();
    let id = NamespaceGenerator::generate();
    store.create_all(&format!("/helios/{}", id)).unwrap();

    let err = bootstrap(&client, &id).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::NamespaceCollision);
    assert_eq!(err.affected_paths(), [format!("/helios/{}", id)]);
    assert_eq!(store.len(), 2);
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn test_collision_lists_every_existing_node() {
    let (store, client) = setup();
    let id = NamespaceId::parse("taken").unwrap();
    store.create_all("/helios/taken/status/hosts").unwrap();
    let before = store.paths();

    let err = bootstrap(&client, &id).await.unwrap_err();

    assert_eq!(
        err,
        BootstrapError::NamespaceCollision {
            namespace: id,
            paths: vec![
                "/helios/taken".to_string(),
                "/helios/taken/status".to_string(),
                "/helios/taken/status/hosts".to_string(),
            ],
        }
    );
    assert_eq!(store.paths(), before);
}

#[tokio::test]
async fn test_rerun_of_same_namespace_collides() {
    let (store, client) = setup();
    let id = NamespaceGenerator::generate();

    bootstrap(&client, &id).await.unwrap();
    let err = bootstrap(&client, &id).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::NamespaceCollision);
    assert_eq!(err.affected_paths(), skeleton(&id).as_slice());
    assert_eq!(store.len(), 7);
}

// ============================================================================
// Races between the check and the create batch
// ============================================================================

#[tokio::test]
async fn test_race_on_config_node() {
    let (store, client) = setup();
    let id = NamespaceGenerator::generate();
    let config = format!("/helios/{}/config", id);

    store.interfere(
        Trigger::BeforeTransaction(1),
        Interference::InsertNode(config.clone()),
    );

    let err = bootstrap(&client, &id).await.unwrap_err();

    assert_eq!(
        err,
        BootstrapError::CreationRace {
            namespace: id.clone(),
            paths: vec![config.clone()],
        }
    );

    let others: Vec<String> = skeleton(&id).into_iter().filter(|p| *p != config).collect();
    assert!(none_exist(&store, &others));
    assert!(store.exists(&config));
}

#[tokio::test]
async fn test_race_on_last_node_rolls_back_earlier_creates() {
    let (store, client) = setup();
    let id = NamespaceGenerator::generate();
    let last = format!("/helios/{}/status/hosts", id);

    store.interfere(
        Trigger::BeforeTransaction(1),
        Interference::InsertNode(last.clone()),
    );

    let err = bootstrap(&client, &id).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::CreationRace);
    assert_eq!(err.affected_paths(), [last.clone()]);
    assert!(none_exist(&store, &skeleton(&id)[..5]));
}

#[tokio::test]
async fn test_race_with_whole_subtree() {
    let (store, client) = setup();
    let id = NamespaceGenerator::generate();
    let base = format!("/helios/{}", id);

    // Another bootstrap of the same id wins between our two batches
    store.interfere(
        Trigger::BeforeTransaction(1),
        Interference::CreateNode(format!("{}/config", base)),
    );

    let err = bootstrap(&client, &id).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::CreationRace);
    assert_eq!(err.affected_paths(), [base.clone()]);
    assert_eq!(
        store.paths(),
        vec!["/helios".to_string(), base.clone(), format!("{}/config", base)]
    );
}

#[tokio::test]
async fn test_missing_root_fails_whole_batch() {
    let (store, client) = setup();
    let id = NamespaceGenerator::generate();

    // The root disappears after it was ensured
    store.interfere(
        Trigger::BeforeTransaction(1),
        Interference::DeleteNode("/helios".to_string()),
    );

    let err = bootstrap(&client, &id).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::CreationRejected);
    assert_eq!(err.affected_paths(), [format!("/helios/{}", id)]);
    assert!(store.is_empty());
}

// ============================================================================
// Store failures
// ============================================================================

#[tokio::test]
async fn test_store_failure_at_any_call() {
    // Calls on an empty store: check batch, exists, create root, create batch
    for call in 0..4 {
        let (store, client) = setup();
        let id = NamespaceGenerator::generate();
        store.interfere(
            Trigger::BeforeCall(call),
            Interference::Fail(StoreError::ConnectionLoss("connection reset".to_string())),
        );

        let err = bootstrap(&client, &id).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::StoreUnavailable, "call {}", call);
        assert!(err.affected_paths().is_empty());
        assert!(none_exist(&store, &skeleton(&id)), "call {}", call);
        assert_eq!(store.calls(), call + 1);
    }
}

#[tokio::test]
async fn test_session_expiry_during_check() {
    let (store, client) = setup();
    store.interfere(
        Trigger::BeforeTransaction(0),
        Interference::Fail(StoreError::SessionExpired),
    );

    let err = bootstrap(&client, &NamespaceGenerator::generate())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BootstrapError::StoreUnavailable("Session expired".to_string())
    );
    assert!(store.is_empty());
}

// ============================================================================
// Concurrent bootstraps
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bootstraps_of_same_namespace() {
    let store = Arc::new(MemoryStore::new());
    let id = NamespaceGenerator::generate();

    let mut handles = Vec::new();
    for n in 0..8 {
        let client = MemoryClient::new(format!("client-{}", n), store.clone());
        let id = id.clone();
        handles.push(tokio::spawn(async move { bootstrap(&client, &id).await }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert!(
                matches!(
                    err.kind(),
                    FailureKind::NamespaceCollision | FailureKind::CreationRace
                ),
                "unexpected failure: {}",
                err
            ),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(store.len(), 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bootstraps_of_different_namespaces() {
    let store = Arc::new(MemoryStore::new());

    let mut handles = Vec::new();
    for n in 0..8 {
        let client = MemoryClient::new(format!("client-{}", n), store.clone());
        handles.push(tokio::spawn(async move {
            bootstrap(&client, &NamespaceGenerator::generate()).await
        }));
    }

    let mut roots_created = 0;
    for handle in handles {
        let report = handle.await.unwrap().unwrap();
        if report.root_created {
            roots_created += 1;
        }
    }

    assert_eq!(roots_created, 1);
    assert_eq!(store.children("/helios").len(), 8);
    assert_eq!(store.len(), 1 + 8 * 6);
}
