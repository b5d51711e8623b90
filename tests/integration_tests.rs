use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use frontdesk::config::AppConfig;
use frontdesk::db;
use frontdesk::services::notify::{CheckinNotice, CheckinNotifier};
use frontdesk::state::AppState;

// ── Mock Notifier ──

#[derive(Default)]
struct MockNotifier {
    sent: Mutex<Vec<CheckinNotice>>,
    fail: AtomicBool,
}

impl MockNotifier {
    fn failing() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            fail: AtomicBool::new(true),
        }
    }

    fn sent(&self) -> Vec<CheckinNotice> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckinNotifier for MockNotifier {
    async fn send_checkin_link(&self, notice: &CheckinNotice) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("smtp relay refused connection");
        }
        self.sent.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

// ── Helpers ──

const ADMIN: &str = "test-token";

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        admin_token: ADMIN.to_string(),
        frontend_url: "https://hotel.example".to_string(),
        checkin_token_ttl_hours: 24,
        checkin_code_ttl_days: 7,
        checkin_code_never_expire: false,
        checkin_resend_extension_minutes: 15,
        session_sweep_interval_secs: 0,
        smtp_host: String::new(),
        smtp_port: 587,
        smtp_username: String::new(),
        smtp_password: String::new(),
        smtp_from_email: String::new(),
        smtp_from_name: "Front Desk".to_string(),
    }
}

fn test_state(notifier: Arc<MockNotifier>) -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState::new(conn, test_config(), notifier))
}

fn test_app() -> (Router, Arc<AppState>, Arc<MockNotifier>) {
    let notifier = Arc::new(MockNotifier::default());
    let state = test_state(Arc::clone(&notifier));
    (frontdesk::app(Arc::clone(&state)), state, notifier)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    auth: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = auth {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Creates a customer, `rooms` rooms and a 2025-06-01..04 booking through the API.
async fn create_booking(app: &Router, name: &str, email: &str, rooms: usize) -> i64 {
    let (status, customer) = send(
        app,
        "POST",
        "/customers",
        Some(json!({"fullName": name, "email": email})),
        Some(ADMIN),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut room_ids = vec![];
    for _ in 0..rooms {
        let number = format!("R{}", rand_suffix());
        let (status, room) = send(
            app,
            "POST",
            "/rooms",
            Some(json!({"roomNumber": number, "roomType": "Deluxe King"})),
            Some(ADMIN),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        room_ids.push(room["id"].as_i64().unwrap());
    }

    let (status, body) = send(
        app,
        "POST",
        "/bookings",
        Some(json!({
            "customerId": customer["id"],
            "roomIds": room_ids,
            "checkInDate": "2025-06-01",
            "checkOutDate": "2025-06-04",
            "adults": 2,
            "accompanyingGuests": [{"name": "John Doe"}],
        })),
        Some(ADMIN),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["booking"]["id"].as_i64().unwrap()
}

fn rand_suffix() -> String {
    use std::sync::atomic::AtomicUsize;
    static NEXT: AtomicUsize = AtomicUsize::new(100);
    NEXT.fetch_add(1, Ordering::SeqCst).to_string()
}

async fn initiate(app: &Router, booking_id: i64) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/checkin/initiate",
        Some(json!({"bookingId": booking_id})),
        Some(ADMIN),
    )
    .await
}

fn guests_payload(token: &str, consent_id: Option<i64>) -> Value {
    json!({
        "token": token,
        "guests": [
            {"fullName": "Jane Doe", "isMainGuest": true, "nationality": "NZ", "idType": "passport", "idNumber": "P1234567"},
            {"fullName": "John Doe", "dateOfBirth": "1990-02-03", "nationality": "NZ"},
        ],
        "consents": consent_id.map(|id| vec![id]).unwrap_or_default(),
    })
}

async fn create_consent(app: &Router, slug: &str) -> i64 {
    let (status, consent) = send(
        app,
        "POST",
        "/consents",
        Some(json!({"slug": slug, "title": "Privacy policy", "description": "We keep your data safe"})),
        Some(ADMIN),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    consent["id"].as_i64().unwrap()
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let (app, _, _) = test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ── Access Control ──

#[tokio::test]
async fn test_front_desk_requires_auth() {
    let (app, _, _) = test_app();

    let (status, body) = send(&app, "POST", "/checkin/initiate", Some(json!({"bookingId": 1})), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _) = send(&app, "GET", "/bookings/1", None, Some("wrong-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "POST", "/bookings/1/checkout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Full Lifecycle ──

#[tokio::test]
async fn test_checkin_lifecycle_end_to_end() {
    let (app, _, notifier) = test_app();
    let booking_id = create_booking(&app, "Jane Doe", "jane.doe@example.com", 2).await;

    // Initiate
    let (status, initiated) = initiate(&app, booking_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(initiated["status"], "success");
    assert_eq!(initiated["email"], "j******e@e******.com");
    let token = initiated["token"].as_str().unwrap().to_string();
    let code = initiated["checkin_code"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 64);
    assert_eq!(code.len(), 9);
    assert_eq!(&code[4..5], "-");

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "jane.doe@example.com");
    assert_eq!(sent[0].code, code);
    assert_eq!(sent[0].rooms.len(), 2);
    assert_eq!(sent[0].link, format!("https://hotel.example/checkin?token={token}"));

    // Validate by code + last name, typed without the hyphen
    let typed = code.replace('-', "").to_lowercase();
    let (status, validated) = send(
        &app,
        "POST",
        "/checkin/validate",
        Some(json!({"checkinCode": typed, "query": "doe"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(validated["token"], token.as_str());

    // Verify via bearer header
    let (status, verified) = send(&app, "GET", "/checkin/verify", None, Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["status"], "success");
    assert_eq!(verified["nights"], 3);
    assert_eq!(verified["rooms"].as_array().unwrap().len(), 2);
    assert_eq!(verified["accompanyingGuests"][0]["fullName"], "John Doe");
    assert_eq!(verified["accompanyingGuests"][0]["type"], "Adult");

    // Finalize
    let consent_id = create_consent(&app, "privacy").await;
    let (status, finalized) = send(&app, "POST", "/checkin", Some(guests_payload(&token, Some(consent_id))), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finalized["alreadyCompleted"], false);
    assert_eq!(finalized["guestIds"].as_array().unwrap().len(), 2);

    let (_, booking) = send(&app, "GET", &format!("/bookings/{booking_id}"), None, Some(ADMIN)).await;
    assert_eq!(booking["status"], "Checked-In");
    assert_eq!(booking["numberOfGuests"], 2);
    assert_eq!(booking["customer"]["fullName"], "Jane Doe");
    assert!(booking["rooms"][0]["room"]["roomNumber"].is_string());

    let (_, guests) = send(&app, "GET", &format!("/bookings/{booking_id}/guests"), None, Some(ADMIN)).await;
    let guests = guests.as_array().unwrap();
    assert_eq!(guests.len(), 2);
    assert_eq!(guests[0]["fullName"], "Jane Doe");
    assert_eq!(guests[0]["isMainGuest"], true);

    let (_, logs) = send(&app, "GET", &format!("/consent-logs?bookingId={booking_id}"), None, Some(ADMIN)).await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l["status"] == "accepted" && l["consentId"] == consent_id));

    let (_, verified) = send(&app, "GET", &format!("/checkin/verify?token={token}"), None, None).await;
    assert_eq!(verified["status"], "already_checked_in");

    // Checkout
    let (status, checkout) = send(&app, "POST", &format!("/bookings/{booking_id}/checkout"), None, Some(ADMIN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checkout["roomsReleased"], 2);

    let (_, booking) = send(&app, "GET", &format!("/bookings/{booking_id}"), None, Some(ADMIN)).await;
    assert_eq!(booking["status"], "Checked-Out");
    for assignment in booking["rooms"].as_array().unwrap() {
        assert_eq!(assignment["status"], "Available");
        assert_eq!(assignment["room"]["status"], "Available");
    }

    // The old link is dead
    let (status, body) = send(&app, "GET", &format!("/checkin/verify?token={token}"), None, None).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"]["code"], "bookingCheckedOut");

    let (status, _) = send(
        &app,
        "POST",
        "/checkin/validate",
        Some(json!({"checkinCode": code, "query": "Doe"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
}

// ── Session Manager ──

#[tokio::test]
async fn test_second_initiate_conflicts() {
    let (app, _, _) = test_app();
    let booking_id = create_booking(&app, "Jane Doe", "jane@example.com", 1).await;

    let (status, _) = initiate(&app, booking_id).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = initiate(&app, booking_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "checkinAlreadyInitiated");
}

#[tokio::test]
async fn test_initiate_after_checkin_conflicts() {
    let (app, _, _) = test_app();
    let booking_id = create_booking(&app, "Jane Doe", "jane@example.com", 1).await;
    let (_, initiated) = initiate(&app, booking_id).await;
    let token = initiated["token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "POST", "/checkin", Some(guests_payload(&token, None)), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = initiate(&app, booking_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "alreadyCheckedIn");
}

#[tokio::test]
async fn test_initiate_unknown_booking() {
    let (app, _, _) = test_app();
    let (status, body) = initiate(&app, 4242).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "bookingNotFound");
}

#[tokio::test]
async fn test_email_failure_returns_partial_content() {
    let notifier = Arc::new(MockNotifier::failing());
    let state = test_state(Arc::clone(&notifier));
    let app = frontdesk::app(Arc::clone(&state));
    let booking_id = create_booking(&app, "Jane Doe", "jane@example.com", 1).await;

    let (status, body) = initiate(&app, booking_id).await;
    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(body["status"], "warning");
    assert_eq!(body["emailStatus"], "FAILED");
    assert!(body["token"].as_str().is_some());
    assert!(body["emailError"].as_str().unwrap().contains("refused"));

    let stored: (String, String) = {
        let conn = state.db.lock().unwrap();
        conn.query_row(
            "SELECT email_status, email_error FROM booking_infos WHERE booking_id = ?1",
            [booking_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap()
    };
    assert_eq!(stored.0, "FAILED");
    assert!(stored.1.contains("refused"));
}

#[tokio::test]
async fn test_booking_creation_can_send_link() {
    let (app, _, notifier) = test_app();
    let (_, customer) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({"fullName": "Ann Lee", "email": "ann@example.com"})),
        Some(ADMIN),
    )
    .await;
    let (_, room) = send(&app, "POST", "/rooms", Some(json!({"roomNumber": "501"})), Some(ADMIN)).await;

    let (status, body) = send(
        &app,
        "POST",
        "/bookings",
        Some(json!({
            "customerId": customer["id"],
            "roomIds": [room["id"]],
            "sendCheckinLink": true,
        })),
        Some(ADMIN),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["checkin"]["status"], "success");
    assert!(body["booking"]["referenceCode"].as_str().unwrap().starts_with("BK-"));
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_validate_rejects_bad_input_without_leaking() {
    let (app, state, _) = test_app();
    let booking_id = create_booking(&app, "Jane Doe", "jane@example.com", 1).await;
    let (_, initiated) = initiate(&app, booking_id).await;
    let code = initiated["checkin_code"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "POST", "/checkin/validate", Some(json!({"checkinCode": "AB1", "query": "Doe"})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalidFormat");

    let (status, unknown) = send(&app, "POST", "/checkin/validate", Some(json!({"checkinCode": "ZZZZ-ZZZZ", "query": "Doe"})), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    {
        let conn = state.db.lock().unwrap();
        conn.execute(
            "UPDATE booking_infos SET code_expires_at = '2000-01-01 00:00:00' WHERE booking_id = ?1",
            [booking_id],
        )
        .unwrap();
    }
    let (status, expired) = send(&app, "POST", "/checkin/validate", Some(json!({"checkinCode": code, "query": "Doe"})), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired["error"]["code"], "invalidOrExpiredCode");
    assert_eq!(expired, unknown);
}

#[tokio::test]
async fn test_resend_extends_code_expiry() {
    let (app, _, _) = test_app();
    let booking_id = create_booking(&app, "Jane Doe", "jane@example.com", 1).await;
    let (_, initiated) = initiate(&app, booking_id).await;

    let (status, body) = send(
        &app,
        "POST",
        "/checkin/resend",
        Some(json!({"bookingInfoId": initiated["bookingInfoId"]})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookingInfoId"], initiated["bookingInfoId"]);
    assert_ne!(body["codeExpiresAt"], initiated["codeExpiresAt"]);

    let (status, _) = send(&app, "POST", "/checkin/resend", Some(json!({"bookingInfoId": 999})), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/checkin/resend", Some(json!({})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Finalizer ──

#[tokio::test]
async fn test_finalize_twice_is_idempotent() {
    let (app, _, _) = test_app();
    let booking_id = create_booking(&app, "Jane Doe", "jane@example.com", 1).await;
    let (_, initiated) = initiate(&app, booking_id).await;
    let token = initiated["token"].as_str().unwrap().to_string();

    let (status, first) = send(&app, "POST", "/checkin", Some(guests_payload(&token, None)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["alreadyCompleted"], false);

    let (status, second) = send(&app, "POST", "/checkin", Some(guests_payload(&token, None)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["alreadyCompleted"], true);

    let (_, guests) = send(&app, "GET", &format!("/bookings/{booking_id}/guests"), None, Some(ADMIN)).await;
    assert_eq!(guests.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_finalize_with_unknown_token() {
    let (app, _, _) = test_app();
    let (status, body) = send(&app, "POST", "/checkin", Some(guests_payload("deadbeef", None)), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "invalidOrExpiredToken");

    let (status, body) = send(
        &app,
        "POST",
        "/checkin",
        Some(json!({"token": "deadbeef", "guests": []})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "invalidOrExpiredToken");
}

// ── Checkout ──

#[tokio::test]
async fn test_checkout_requires_checked_in_booking() {
    let (app, _, _) = test_app();
    let booking_id = create_booking(&app, "Jane Doe", "jane@example.com", 1).await;

    let (status, body) = send(&app, "POST", &format!("/bookings/{booking_id}/checkout"), None, Some(ADMIN)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "notCheckedIn");

    let (status, _) = send(&app, "POST", "/bookings/9999/checkout", None, Some(ADMIN)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Consent Pre-association ──

#[tokio::test]
async fn test_pending_consents_attach_to_booking() {
    let (app, _, _) = test_app();
    let booking_id = create_booking(&app, "Jane Doe", "jane@example.com", 1).await;
    let (_, initiated) = initiate(&app, booking_id).await;
    let token = initiated["token"].as_str().unwrap().to_string();
    let consent_id = create_consent(&app, "house-rules").await;

    let (status, _) = send(
        &app,
        "POST",
        "/consent-logs",
        Some(json!({"consentId": consent_id, "bookingToken": token, "acceptedBy": "Jane Doe"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        "POST",
        "/consent-logs",
        Some(json!({"consentId": consent_id, "guestId": 77, "acceptedBy": "John Doe"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, logs) = send(&app, "GET", "/consent-logs", None, Some(ADMIN)).await;
    assert!(logs.as_array().unwrap().iter().all(|l| l["status"] == "pending"));

    let (status, body) = send(
        &app,
        "PATCH",
        "/consent-logs/attach-booking",
        Some(json!({"token": token, "guestIds": [77]})),
        Some(ADMIN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookingId"], booking_id);
    assert_eq!(body["linked"], 2);

    let (_, logs) = send(&app, "GET", &format!("/consent-logs?bookingId={booking_id}"), None, Some(ADMIN)).await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l["status"] == "sent"));
}

#[tokio::test]
async fn test_consent_templates_are_versioned() {
    let (app, _, _) = test_app();
    let post = |version: &'static str| {
        let app = app.clone();
        async move {
            send(
                &app,
                "POST",
                "/consents",
                Some(json!({"slug": "privacy", "title": "Privacy policy", "version": version})),
                Some(ADMIN),
            )
            .await
        }
    };

    let (status, v1) = post("1.0").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, again) = post("1.0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"], v1["id"]);
    let (status, v2) = post("2.0").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(v2["id"], v1["id"]);

    let (_, listed) = send(&app, "GET", "/consents", None, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

// ── Concurrency ──

#[test]
fn test_concurrent_finalize_writes_guests_once() {
    use frontdesk::config::CheckinSettings;
    use frontdesk::db::queries;
    use frontdesk::models::NewGuest;
    use frontdesk::services::finalize::{finalize_checkin, FinalizeOutcome};
    use frontdesk::services::sessions::create_session;

    let path = std::env::temp_dir().join(format!(
        "frontdesk-race-{}-{}.db",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    let path_str = path.to_str().unwrap().to_string();
    let now = chrono::Utc::now().naive_utc();

    let (booking_id, token, consent_id) = {
        let mut conn = db::init_db(&path_str).unwrap();
        let customer_id = queries::create_customer(&conn, "Jane Doe", "jane@example.com").unwrap();
        let room_id = queries::create_room(&conn, "101", "Twin").unwrap();
        let booking_id = queries::insert_booking(
            &conn,
            &queries::NewBookingRecord {
                customer_id,
                reference_code: "BK-RACE01",
                check_in_date: None,
                check_out_date: None,
                adults: 2,
                children: 0,
                accompanying_guests: &[],
            },
        )
        .unwrap();
        queries::insert_booking_room(&conn, booking_id, room_id, 1).unwrap();
        let (session, _) =
            create_session(&mut conn, booking_id, &CheckinSettings::default(), now).unwrap();
        let consent_id = queries::create_consent(&conn, "privacy", "Privacy", "", "1").unwrap();
        (booking_id, session.token, consent_id)
    };

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let path = path_str.clone();
            let token = token.clone();
            std::thread::spawn(move || {
                let mut conn = db::init_db(&path).unwrap();
                let guests = vec![
                    NewGuest {
                        full_name: "Jane Doe".to_string(),
                        is_main_guest: true,
                        ..Default::default()
                    },
                    NewGuest {
                        full_name: "John Doe".to_string(),
                        ..Default::default()
                    },
                ];
                barrier.wait();
                finalize_checkin(&mut conn, &token, &guests, &[consent_id], now).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<FinalizeOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let completed = outcomes
        .iter()
        .filter(|o| matches!(o, FinalizeOutcome::Completed { .. }))
        .count();
    assert_eq!(completed, 1);

    let conn = db::init_db(&path_str).unwrap();
    assert_eq!(queries::get_guests_for_booking(&conn, booking_id).unwrap().len(), 2);
    assert_eq!(queries::get_consent_logs(&conn, Some(booking_id)).unwrap().len(), 2);
    drop(conn);

    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path_str}{suffix}"));
    }
}
