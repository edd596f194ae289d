use crate::{config::Config, server, tests::support::harness};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use dream_recorder_core::{ClientId, DeviceEvent, DreamStore, NewDream, OutboundEvent, SessionSnapshot, SessionStatus};
use tower::ServiceExt;

#[allow(clippy::unwrap_used)]
async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[allow(clippy::unwrap_used)]
async fn send_json(
    router: &Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn new_dream(name: &str) -> NewDream {
    NewDream {
        transcription: format!("{} transcription", name),
        video_prompt: format!("{} prompt", name),
        audio_filename: format!("recording_{}.webm", name),
        video_filename: format!("dream_{}.mp4", name),
        thumb_filename: None,
    }
}

/// WHAT: The state endpoint returns the current session snapshot
/// WHY: Polling clients rely on it instead of the socket
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_recorder_when_getting_state_then_ready_snapshot() {
    // Given: A running app and router
    let h = harness().await;
    let router = server::router(h.server_state(), &h.config.storage);
    tokio::spawn(h.app.run());

    // When: Requesting state
    let (status, body) = send(&router, Method::GET, "/api/state").await;

    // Then: Ready snapshot
    assert_eq!(status, StatusCode::OK);
    let snapshot: SessionSnapshot = serde_json::from_slice(&body).unwrap();
    assert_eq!(snapshot.status, SessionStatus::Ready);
    assert!(!snapshot.is_recording);
}

/// WHAT: Dreams are listed newest first with their video URL
/// WHY: The gallery plays dreams straight from the listed URL
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stored_dreams_when_listing_then_urls_included() {
    // Given: Two stored dreams
    let h = harness().await;
    h.store.save_dream(new_dream("old")).await.unwrap();
    h.store.save_dream(new_dream("new")).await.unwrap();
    let router = server::router(h.server_state(), &h.config.storage);
    tokio::spawn(h.app.run());

    // When: Listing
    let (status, body) = send(&router, Method::GET, "/api/dreams").await;

    // Then: Newest first, with URLs
    assert_eq!(status, StatusCode::OK);
    let dreams: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(dreams.len(), 2);
    assert_eq!(dreams[0]["video_url"], "/media/video/dream_new.mp4");
    assert_eq!(dreams[1]["video_filename"], "dream_old.mp4");
}

/// WHAT: Deleting removes the record and its video file; unknown ids are 404
/// WHY: Deleted dreams must disappear from disk as well as the list
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stored_dream_when_deleted_then_gone_and_repeat_is_not_found() {
    // Given: A stored dream with its video on disk
    let h = harness().await;
    let dream = h.store.save_dream(new_dream("gone")).await.unwrap();
    h.media
        .write_video(&dream.video_filename, b"mp4")
        .await
        .unwrap();
    let video_path = h.media.videos_dir().join(&dream.video_filename);
    let router = server::router(h.server_state(), &h.config.storage);
    let store = h.store.clone();
    tokio::spawn(h.app.run());
    let uri = format!("/api/dreams/{}", dream.id);

    // When: Deleting twice
    let (first, _) = send(&router, Method::DELETE, &uri).await;
    let (second, body) = send(&router, Method::DELETE, &uri).await;

    // Then: Deleted, then not found
    assert_eq!(first, StatusCode::OK);
    assert!(!video_path.exists());
    assert!(store.list_dreams().await.unwrap().is_empty());
    assert_eq!(second, StatusCode::NOT_FOUND);
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], format!("Dream {} not found", dream.id));
}

/// WHAT: Device triggers are relayed to subscribed clients
/// WHY: Hardware gestures drive the browser UI
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_subscribed_client_when_device_event_posted_then_relayed() {
    // Given: A subscribed client
    let h = harness().await;
    let mut events = h.broadcaster.subscribe(ClientId::new());
    let router = server::router(h.server_state(), &h.config.storage);
    tokio::spawn(h.app.run());

    // When: Posting a double tap
    let (status, _) = send(&router, Method::POST, "/api/device/double_tap").await;

    // Then: Accepted and relayed
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        events.recv().await,
        Some(OutboundEvent::Device {
            event_type: DeviceEvent::DoubleTap
        })
    );
}

/// WHAT: Unknown device triggers are rejected
/// WHY: Typos in the GPIO service should surface, not vanish
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_unknown_trigger_when_posted_then_bad_request() {
    // Given: A running app
    let h = harness().await;
    let router = server::router(h.server_state(), &h.config.storage);
    tokio::spawn(h.app.run());

    // When: Posting an unknown trigger
    let (status, _) = send(&router, Method::POST, "/api/device/quadruple_tap").await;

    // Then: 400
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// WHAT: The alarm toggle endpoint returns the new state
/// WHY: The settings page reflects the change immediately
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_enabled_alarm_when_toggle_posted_then_disabled() {
    // Given: Default config
    let h = harness().await;
    let router = server::router(h.server_state(), &h.config.storage);
    tokio::spawn(h.app.run());

    // When: Toggling
    let (status, body) = send(&router, Method::POST, "/api/alarm/toggle").await;

    // Then: Disabled
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["enabled"], false);
}

/// WHAT: Generated videos are served under /media/video
/// WHY: play_video URLs must resolve to the stored file
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stored_video_when_fetched_then_bytes_served() {
    // Given: A video in the media library
    let h = harness().await;
    h.media.write_video("dream_1.mp4", b"mp4-bytes").await.unwrap();
    let router = server::router(h.server_state(), &h.config.storage);

    // When: Fetching it
    let (status, body) = send(&router, Method::GET, "/media/video/dream_1.mp4").await;

    // Then: Served verbatim
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"mp4-bytes");
}

/// WHAT: API calls fail cleanly once the app has stopped
/// WHY: Requests during shutdown must not hang
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stopped_app_when_requesting_state_then_service_unavailable() {
    // Given: The app loop is gone
    let h = harness().await;
    let router = server::router(h.server_state(), &h.config.storage);
    drop(h.app);

    // When: Requesting state
    let (status, _) = send(&router, Method::GET, "/api/state").await;

    // Then: 503
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

/// WHAT: The alarm endpoint reports the stored settings
/// WHY: The settings page loads the alarm from here
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_default_config_when_getting_alarm_then_seven_oclock_enabled() {
    // Given: Default config
    let h = harness().await;
    let router = server::router(h.server_state(), &h.config.storage);
    tokio::spawn(h.app.run());

    // When: Reading the alarm
    let (status, body) = send(&router, Method::GET, "/api/alarm").await;

    // Then: 07:00, enabled
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "hour": 7, "minute": 0, "enabled": true })
    );
}

/// WHAT: Out-of-range or missing alarm fields are rejected
/// WHY: A bad time must never reach the config file
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_invalid_alarm_bodies_when_posted_then_bad_request() {
    // Given: A running app
    let h = harness().await;
    let router = server::router(h.server_state(), &h.config.storage);
    let config_path = h.config_path.clone();
    let data_dir = h.dir.path().to_path_buf();
    tokio::spawn(h.app.run());

    // When: Posting hour 24, then a body without minute
    let (hour_status, _) = send_json(
        &router,
        Method::POST,
        "/api/alarm",
        serde_json::json!({ "hour": 24, "minute": 0 }),
    )
    .await;
    let (missing_status, _) = send_json(
        &router,
        Method::POST,
        "/api/alarm",
        serde_json::json!({ "hour": 6 }),
    )
    .await;

    // Then: Both 400, file unchanged
    assert_eq!(hour_status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_status, StatusCode::BAD_REQUEST);
    let reloaded = Config::load_or_create(&config_path, &data_dir).unwrap();
    assert_eq!(reloaded.alarm.hour, 7);
}

/// WHAT: A valid alarm time is saved and echoed back
/// WHY: The alarm must ring at the new time after a restart
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_valid_alarm_when_posted_then_saved() {
    // Given: A running app
    let h = harness().await;
    let router = server::router(h.server_state(), &h.config.storage);
    let config_path = h.config_path.clone();
    let data_dir = h.dir.path().to_path_buf();
    tokio::spawn(h.app.run());

    // When: Posting 06:45
    let (status, body) = send_json(
        &router,
        Method::POST,
        "/api/alarm",
        serde_json::json!({ "hour": 6, "minute": 45 }),
    )
    .await;

    // Then: Success body and persisted
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["data"],
        serde_json::json!({ "hour": 6, "minute": 45, "enabled": true })
    );
    let reloaded = Config::load_or_create(&config_path, &data_dir).unwrap();
    assert_eq!((reloaded.alarm.hour, reloaded.alarm.minute), (6, 45));
}

/// WHAT: Checking a switched-off alarm reports it disabled
/// WHY: External schedulers poll this endpoint and log the outcome
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_disabled_alarm_when_check_posted_then_disabled_status() {
    // Given: The alarm toggled off
    let h = harness().await;
    let router = server::router(h.server_state(), &h.config.storage);
    tokio::spawn(h.app.run());
    let (toggled, _) = send(&router, Method::POST, "/api/alarm/toggle").await;
    assert_eq!(toggled, StatusCode::OK);

    // When: Checking
    let (status, body) = send(&router, Method::POST, "/api/alarm/check").await;

    // Then: Disabled
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, serde_json::json!({ "status": "disabled" }));
}
