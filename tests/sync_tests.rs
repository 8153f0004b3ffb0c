//! End-to-end tests of the sync and withdraw engines against a wiremock
//! Kong admin server, using the in-memory reference store.

mod helpers;

use helpers::memory_store::MemoryStore;
use helpers::{api_reference, consumer_reference, plugin_reference};

use kongbridge::errors::AppError;
use kongbridge::kong::{KongClient, KongError};
use kongbridge::sync::{ApiSyncEngine, ConsumerSyncEngine, PluginSyncEngine, Synchronizer};

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn kong_client(server: &MockServer) -> KongClient {
    KongClient::with_http_client(&server.uri(), reqwest::Client::new())
}

// ── API references ───────────────────────────────────────────

#[tokio::test]
async fn incomplete_api_fails_validation_without_remote_call() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = ApiSyncEngine::new(store.clone());

    let mut reference = api_reference("https://upstream.example.com/v1", None);
    store.put_api(reference.clone()).await;

    let err = engine
        .synchronize(&kong_client(&server), &mut reference)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::IncompleteReference(_)));
    assert!(!reference.synchronized());
    assert!(server.received_requests().await.unwrap().is_empty());
    // Nothing was persisted either.
    assert!(store.api(reference.id).await.unwrap().kong_id.is_none());
}

#[tokio::test]
async fn fixing_an_incomplete_api_lets_it_synchronize() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = ApiSyncEngine::new(store.clone());
    let client = kong_client(&server);

    let mut reference = api_reference("https://upstream.example.com/v1", None);
    store.put_api(reference.clone()).await;

    let err = engine.synchronize(&client, &mut reference).await.unwrap_err();
    assert!(matches!(err, AppError::IncompleteReference(_)));

    // Fix the reference and try again.
    reference.public_dns = Some("api.example.com".into());
    let kong_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/apis"))
        .and(body_json(json!({
            "name": "api.example.com",
            "public_dns": "api.example.com",
            "target_url": "https://upstream.example.com/v1",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": kong_id,
            "name": "api.example.com",
            "public_dns": "api.example.com",
            "target_url": "https://upstream.example.com/v1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    engine.synchronize(&client, &mut reference).await.unwrap();

    assert_eq!(reference.kong_id, Some(kong_id));
    assert!(reference.synchronized());
    assert!(reference.synchronized_at.is_some());

    let stored = store.api(reference.id).await.unwrap();
    assert_eq!(stored.kong_id, Some(kong_id));
    assert_eq!(stored.public_dns.as_deref(), Some("api.example.com"));
}

#[tokio::test]
async fn initial_sync_sends_the_full_field_set() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = ApiSyncEngine::new(store.clone());

    let mut reference = api_reference("https://billing.internal:8080", Some("billing.example.com"));
    reference.name = Some("billing".into());
    store.put_api(reference.clone()).await;

    let kong_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/apis"))
        .and(body_json(json!({
            "name": "billing",
            "public_dns": "billing.example.com",
            "target_url": "https://billing.internal:8080",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": kong_id,
            "name": "billing",
            "public_dns": "billing.example.com",
            "target_url": "https://billing.internal:8080",
        })))
        .expect(1)
        .mount(&server)
        .await;

    engine
        .synchronize(&kong_client(&server), &mut reference)
        .await
        .unwrap();
    assert_eq!(reference.kong_id, Some(kong_id));
}

#[tokio::test]
async fn resync_updates_in_place_and_keeps_kong_id() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = ApiSyncEngine::new(store.clone());

    let kong_id = Uuid::new_v4();
    let mut reference = api_reference("https://upstream.example.com/v1", Some("api.example.com"));
    reference.kong_id = Some(kong_id);
    reference.synchronized_at = Some(chrono::Utc::now());
    store.put_api(reference.clone()).await;

    // A second synchronize must be exactly one PATCH, never a POST.
    Mock::given(method("POST"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/apis/{kong_id}")))
        .and(body_json(json!({
            "name": "api.example.com",
            "public_dns": "api.example.com",
            "target_url": "https://upstream.example.com/v1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": kong_id,
            "name": "api.example.com",
            "public_dns": "api.example.com",
            "target_url": "https://upstream.example.com/v1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    engine
        .synchronize(&kong_client(&server), &mut reference)
        .await
        .unwrap();
    assert_eq!(reference.kong_id, Some(kong_id));
}

#[tokio::test]
async fn withdraw_deletes_remotely_and_clears_sync_state() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = ApiSyncEngine::new(store.clone());

    let kong_id = Uuid::new_v4();
    let mut reference = api_reference("https://upstream.example.com/v1", Some("api.example.com"));
    reference.kong_id = Some(kong_id);
    reference.synchronized_at = Some(chrono::Utc::now());
    store.put_api(reference.clone()).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/apis/{kong_id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/apis/{kong_id}")))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = kong_client(&server);
    engine.withdraw(&client, &mut reference).await.unwrap();

    assert!(!reference.synchronized());
    assert!(reference.synchronized_at.is_none());
    assert!(store.api(reference.id).await.unwrap().kong_id.is_none());

    // Retrieving by the old identifier now fails as not-found.
    let err = client.retrieve_api(kong_id).await.unwrap_err();
    assert!(matches!(err, KongError::NotFound(_)));
}

#[tokio::test]
async fn withdraw_of_unsynchronized_reference_is_a_noop() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = ApiSyncEngine::new(store.clone());

    let mut reference = api_reference("https://upstream.example.com/v1", Some("api.example.com"));

    engine
        .withdraw(&kong_client(&server), &mut reference)
        .await
        .unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_failure_surfaces_and_leaves_reference_untouched() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = ApiSyncEngine::new(store.clone());

    let mut reference = api_reference("https://upstream.example.com/v1", Some("api.example.com"));
    store.put_api(reference.clone()).await;

    Mock::given(method("POST"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream database down"))
        .expect(1)
        .mount(&server)
        .await;

    let err = engine
        .synchronize(&kong_client(&server), &mut reference)
        .await
        .unwrap_err();

    match err {
        AppError::Kong(KongError::Remote { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("upstream database down"));
        }
        other => panic!("expected remote kong error, got {other:?}"),
    }
    assert!(reference.kong_id.is_none());
    assert!(reference.synchronized_at.is_none());
}

#[tokio::test]
async fn withdraw_failure_keeps_local_state() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = ApiSyncEngine::new(store.clone());

    let kong_id = Uuid::new_v4();
    let mut reference = api_reference("https://upstream.example.com/v1", Some("api.example.com"));
    reference.kong_id = Some(kong_id);
    store.put_api(reference.clone()).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/apis/{kong_id}")))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = engine
        .withdraw(&kong_client(&server), &mut reference)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Kong(KongError::NotFound(_))));
    assert_eq!(reference.kong_id, Some(kong_id));
    assert_eq!(store.api(reference.id).await.unwrap().kong_id, Some(kong_id));
}

// ── Consumer references ──────────────────────────────────────

#[tokio::test]
async fn empty_consumer_fails_validation_then_syncs_once_fixed() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = ConsumerSyncEngine::new(store.clone());
    let client = kong_client(&server);

    let mut reference = consumer_reference(None);
    store.put_consumer(reference.clone()).await;

    let err = engine.synchronize(&client, &mut reference).await.unwrap_err();
    assert!(matches!(err, AppError::IncompleteReference(_)));
    assert!(!reference.synchronized());

    reference.username = Some("alice".into());
    let kong_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/consumers"))
        .and(body_json(json!({ "username": "alice" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": kong_id,
            "username": "alice",
            "custom_id": null,
        })))
        .expect(1)
        .mount(&server)
        .await;

    engine.synchronize(&client, &mut reference).await.unwrap();
    assert_eq!(reference.kong_id, Some(kong_id));
    assert_eq!(
        store.consumer(reference.id).await.unwrap().kong_id,
        Some(kong_id)
    );
}

#[tokio::test]
async fn renaming_a_consumer_updates_under_the_same_kong_id() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = ConsumerSyncEngine::new(store.clone());
    let client = kong_client(&server);

    let kong_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/consumers"))
        .and(body_json(json!({ "username": "alice" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": kong_id,
            "username": "alice",
            "custom_id": null,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/consumers/{kong_id}")))
        .and(body_json(json!({ "username": "bob" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": kong_id,
            "username": "bob",
            "custom_id": null,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut reference = consumer_reference(Some("alice"));
    store.put_consumer(reference.clone()).await;

    engine.synchronize(&client, &mut reference).await.unwrap();
    assert_eq!(reference.kong_id, Some(kong_id));

    reference.username = Some("bob".into());
    engine.synchronize(&client, &mut reference).await.unwrap();
    assert_eq!(reference.kong_id, Some(kong_id));
    assert_eq!(
        store.consumer(reference.id).await.unwrap().username.as_deref(),
        Some("bob")
    );
}

// ── Plugin configuration references ──────────────────────────

#[tokio::test]
async fn plugin_sync_requires_a_synchronized_parent_api() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = PluginSyncEngine::new(store.clone());

    let api = api_reference("https://upstream.example.com/v1", Some("api.example.com"));
    let api_id = api.id;
    store.put_api(api).await;

    let mut reference = plugin_reference(api_id, "rate-limiting");
    store.put_plugin(reference.clone()).await;

    let err = engine
        .synchronize(&kong_client(&server), &mut reference)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ApiNotSynchronized(id) if id == api_id));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn plugin_sync_and_withdraw_nest_under_the_parent_api() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = PluginSyncEngine::new(store.clone());
    let client = kong_client(&server);

    let api_kong_id = Uuid::new_v4();
    let mut api = api_reference("https://upstream.example.com/v1", Some("api.example.com"));
    api.kong_id = Some(api_kong_id);
    api.synchronized_at = Some(chrono::Utc::now());
    let api_id = api.id;
    store.put_api(api).await;

    let mut reference = plugin_reference(api_id, "rate-limiting");
    reference.config = json!({ "minute": 60 });
    store.put_plugin(reference.clone()).await;

    let plugin_kong_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/apis/{api_kong_id}/plugins")))
        .and(body_json(json!({
            "name": "rate-limiting",
            "config": { "minute": 60 },
            "enabled": true,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": plugin_kong_id,
            "name": "rate-limiting",
            "config": { "minute": 60 },
            "enabled": true,
            "consumer_id": null,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/apis/{api_kong_id}/plugins/{plugin_kong_id}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    engine.synchronize(&client, &mut reference).await.unwrap();
    assert_eq!(reference.kong_id, Some(plugin_kong_id));

    engine.withdraw(&client, &mut reference).await.unwrap();
    assert!(!reference.synchronized());
    assert!(store.plugin(reference.id).await.unwrap().kong_id.is_none());
}

#[tokio::test]
async fn plugin_scoped_to_an_unsynchronized_consumer_fails() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = PluginSyncEngine::new(store.clone());

    let mut api = api_reference("https://upstream.example.com/v1", Some("api.example.com"));
    api.kong_id = Some(Uuid::new_v4());
    let api_id = api.id;
    store.put_api(api).await;

    let consumer = consumer_reference(Some("alice"));
    let consumer_id = consumer.id;
    store.put_consumer(consumer).await;

    let mut reference = plugin_reference(api_id, "key-auth");
    reference.consumer_id = Some(consumer_id);

    let err = engine
        .synchronize(&kong_client(&server), &mut reference)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ConsumerNotSynchronized(id) if id == consumer_id));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn plugin_withdraw_after_parent_withdrawal_only_clears_local_state() {
    let server = MockServer::start().await;
    let store = MemoryStore::new();
    let engine = PluginSyncEngine::new(store.clone());

    // Parent api was withdrawn already; kong removed the plugin with it.
    let api = api_reference("https://upstream.example.com/v1", Some("api.example.com"));
    let api_id = api.id;
    store.put_api(api).await;

    let mut reference = plugin_reference(api_id, "rate-limiting");
    reference.kong_id = Some(Uuid::new_v4());
    store.put_plugin(reference.clone()).await;

    engine
        .withdraw(&kong_client(&server), &mut reference)
        .await
        .unwrap();

    assert!(!reference.synchronized());
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(store.plugin(reference.id).await.unwrap().kong_id.is_none());
}
