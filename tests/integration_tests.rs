use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use resort_booking::errors::ErrorKind;
use resort_booking::models::{Field, Format, RecordId, ReservationRecord};
use resort_booking::services::client::{DeleteOutcome, ReservationClient, SubmitAction};
use resort_booking::services::confirm::Confirm;
use resort_booking::services::encoding::encode_xml;
use resort_booking::services::transport::http::HttpTransport;
use resort_booking::services::transport::Endpoints;
use resort_booking::services::xml;
use resort_booking::state::NoticeLevel;

// ── Mock backend ──

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: Method,
    uri: String,
    content_type: Option<String>,
    body: String,
}

#[derive(Default)]
struct MockBackend {
    records: Mutex<Vec<ReservationRecord>>,
    next_id: Mutex<i64>,
    requests: Mutex<Vec<RecordedRequest>>,
    fail_list: AtomicBool,
}

impl MockBackend {
    fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: &str) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            uri: uri.to_string(),
            content_type: headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: body.to_string(),
        });
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn find(&self, id: &str) -> Option<ReservationRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id.as_ref().map(RecordId::as_str) == Some(id))
            .cloned()
    }
}

#[derive(Deserialize)]
struct FormatParams {
    format: Option<String>,
    q: Option<String>,
}

impl FormatParams {
    fn is_xml(&self) -> bool {
        self.format.as_deref() == Some("xml")
    }
}

fn record_xml(record: &ReservationRecord) -> String {
    let id = record.id.as_ref().map(RecordId::to_string).unwrap_or_default();
    encode_xml(record)
        .replace("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n", "")
        .replace("<reservation>", &format!("<reservation>\n  <id>{id}</id>"))
}

fn respond_one(xml: bool, status: StatusCode, record: &ReservationRecord) -> Response {
    if xml {
        let body = format!("<?xml version=\"1.0\" ?>\n{}", record_xml(record));
        (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
    } else {
        (status, Json(record.clone())).into_response()
    }
}

fn respond_error(xml: bool, status: StatusCode, message: &str) -> Response {
    if xml {
        let body = format!("<?xml version=\"1.0\" ?>\n<error>\n  <error>{message}</error>\n</error>\n");
        (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
    } else {
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn parse_body(headers: &HeaderMap, body: &str) -> Option<ReservationRecord> {
    let is_xml = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("xml"));
    if is_xml {
        xml::parse_reservation(body).ok()
    } else {
        serde_json::from_str(body).ok()
    }
}

async fn list_reservations(
    State(backend): State<Arc<MockBackend>>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<FormatParams>,
) -> Response {
    backend.record(Method::GET, &uri, &headers, "");
    if backend.fail_list.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database on fire").into_response();
    }

    let query = params.q.clone().unwrap_or_default().to_lowercase();
    let records: Vec<ReservationRecord> = backend
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|r| {
            query.is_empty()
                || r.guest_name.to_lowercase().contains(&query)
                || r.email.to_lowercase().contains(&query)
                || r.resort_name.to_lowercase().contains(&query)
        })
        .cloned()
        .collect();

    if params.is_xml() {
        let inner: String = records.iter().map(record_xml).collect();
        let body = format!("<?xml version=\"1.0\" ?>\n<reservations>\n{inner}</reservations>\n");
        ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
    } else {
        Json(records).into_response()
    }
}

async fn create_reservation(
    State(backend): State<Arc<MockBackend>>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<FormatParams>,
    body: String,
) -> Response {
    backend.record(Method::POST, &uri, &headers, &body);
    let Some(mut record) = parse_body(&headers, &body) else {
        return respond_error(params.is_xml(), StatusCode::BAD_REQUEST, "Invalid request body");
    };

    let id = {
        let mut next = backend.next_id.lock().unwrap();
        *next += 1;
        *next
    };
    record.id = Some(RecordId::from(id));
    record.created_at = Some("2030-01-01T00:00:00".to_string());
    record.updated_at = record.created_at.clone();
    backend.records.lock().unwrap().push(record.clone());

    respond_one(params.is_xml(), StatusCode::CREATED, &record)
}

async fn get_reservation(
    State(backend): State<Arc<MockBackend>>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<FormatParams>,
) -> Response {
    backend.record(Method::GET, &uri, &headers, "");
    match backend.find(&id) {
        Some(record) => respond_one(params.is_xml(), StatusCode::OK, &record),
        None => respond_error(params.is_xml(), StatusCode::NOT_FOUND, &format!("Reservation {id} not found")),
    }
}

async fn update_reservation(
    State(backend): State<Arc<MockBackend>>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<FormatParams>,
    body: String,
) -> Response {
    backend.record(Method::PUT, &uri, &headers, &body);
    let Some(existing) = backend.find(&id) else {
        return respond_error(params.is_xml(), StatusCode::NOT_FOUND, &format!("Reservation {id} not found"));
    };
    let Some(mut record) = parse_body(&headers, &body) else {
        return respond_error(params.is_xml(), StatusCode::BAD_REQUEST, "Invalid request body");
    };

    record.id = existing.id.clone();
    record.created_at = existing.created_at.clone();
    record.updated_at = Some("2030-01-02T00:00:00".to_string());
    {
        let mut records = backend.records.lock().unwrap();
        if let Some(slot) = records.iter_mut().find(|r| r.id == existing.id) {
            *slot = record.clone();
        }
    }
    respond_one(params.is_xml(), StatusCode::OK, &record)
}

async fn delete_reservation(
    State(backend): State<Arc<MockBackend>>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    backend.record(Method::DELETE, &uri, &headers, "");
    let mut records = backend.records.lock().unwrap();
    let before = records.len();
    records.retain(|r| r.id.as_ref().map(RecordId::as_str) != Some(id.as_str()));
    if records.len() == before {
        return respond_error(false, StatusCode::NOT_FOUND, &format!("Reservation {id} not found"));
    }
    Json(serde_json::json!({
        "message": format!("Reservation {id} deleted successfully"),
        "status": "success",
        "deleted_id": id.parse::<i64>().unwrap_or_default(),
    }))
    .into_response()
}

async fn health(State(backend): State<Arc<MockBackend>>) -> Response {
    let count = backend.records.lock().unwrap().len();
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": "2030-01-01T00:00:00",
        "data_count": count,
        "next_id": count + 1,
        "supported_formats": ["json", "xml"],
        "approved_resorts": ["Arcadia Beach Resort"],
        "approved_payment_gateways": ["GCash"],
    }))
    .into_response()
}

fn mock_app(backend: Arc<MockBackend>) -> Router {
    let mut router = Router::new().route("/health", get(health));
    for base in ["/reservations", "/api/reservations"] {
        router = router
            .route(base, get(list_reservations).post(create_reservation))
            .route(
                &format!("{base}/:id"),
                get(get_reservation)
                    .put(update_reservation)
                    .delete(delete_reservation),
            );
    }
    router.with_state(backend)
}

async fn spawn_backend() -> (String, Arc<MockBackend>) {
    let backend = Arc::new(MockBackend::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = mock_app(Arc::clone(&backend));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}

// ── Client helpers ──

struct CountingConfirm {
    answer: bool,
    asked: Arc<AtomicUsize>,
}

impl Confirm for CountingConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

fn client_for(base_url: &str, base_path: &str, confirm: bool) -> (ReservationClient, Arc<AtomicUsize>) {
    let asked = Arc::new(AtomicUsize::new(0));
    let transport = HttpTransport::new(base_url, Duration::from_secs(5)).unwrap();
    let client = ReservationClient::new(
        Box::new(transport),
        Box::new(CountingConfirm {
            answer: confirm,
            asked: Arc::clone(&asked),
        }),
        Endpoints::new(base_path),
    );
    (client, asked)
}

async fn test_client() -> (ReservationClient, Arc<MockBackend>) {
    let (url, backend) = spawn_backend().await;
    let (client, _) = client_for(&url, "/reservations", true);
    (client, backend)
}

fn fill_form(client: &ReservationClient, guest_name: &str) {
    client.set_field(Field::GuestName, guest_name);
    client.set_field(Field::Email, "guest@example.com");
    client.set_field(Field::Phone, "09171234567");
    client.set_field(Field::ResortName, "Blue Horizon Resort");
    client.set_field(Field::CheckinDate, "2099-07-01");
    client.set_field(Field::CheckoutDate, "2099-07-05");
    client.set_field(Field::Guests, "2");
    client.set_field(Field::PaymentGateway, "GCash");
}

async fn create(client: &ReservationClient, guest_name: &str) {
    fill_form(client, guest_name);
    client.submit(Format::Json).await.unwrap();
}

// ── Submission ──

#[tokio::test]
async fn test_create_json_then_list() {
    let (client, backend) = test_client().await;
    fill_form(&client, "Juan Dela Cruz");

    let outcome = client.submit(Format::Json).await.unwrap();

    assert_eq!(outcome.action, SubmitAction::Created);
    assert_eq!(outcome.id, Some(RecordId::from(1)));
    assert!(outcome.warnings.is_empty());

    let requests = backend.requests();
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].uri, "/reservations");
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(requests[1].method, Method::GET);
    assert_eq!(requests[1].uri, "/reservations?format=json");

    let view = client.view();
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].guest_name, "Juan Dela Cruz");
    assert_eq!(view.notice.unwrap().level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_create_xml_escapes_and_round_trips() {
    let (client, backend) = test_client().await;
    fill_form(&client, r#"Ana "Bee" O'Neil & <Co>"#);

    let outcome = client.submit(Format::Xml).await.unwrap();

    assert_eq!(outcome.action, SubmitAction::Created);
    assert!(outcome.message().contains("created"));
    let post = &backend.requests()[0];
    assert_eq!(post.uri, "/reservations?format=xml");
    assert_eq!(post.content_type.as_deref(), Some("application/xml"));
    assert!(post
        .body
        .contains("<guest_name>Ana &quot;Bee&quot; O&apos;Neil &amp; &lt;Co&gt;</guest_name>"));

    let stored = backend.find("1").unwrap();
    assert_eq!(stored.guest_name, r#"Ana "Bee" O'Neil & <Co>"#);
    assert_eq!(stored.guests, 2);
}

#[tokio::test]
async fn test_invalid_form_never_reaches_server() {
    let (client, backend) = test_client().await;
    fill_form(&client, "");

    let err = client.submit(Format::Xml).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().to_lowercase().contains("guest name"));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_phone_warning_does_not_block() {
    let (client, backend) = test_client().await;
    fill_form(&client, "Juan");
    client.set_field(Field::Phone, "12345");

    let outcome = client.submit(Format::Json).await.unwrap();

    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].field, Field::Phone);
    assert_eq!(backend.find("1").unwrap().phone, "12345");
}

#[tokio::test]
async fn test_edit_flow_updates_record() {
    let (client, backend) = test_client().await;
    create(&client, "Maria").await;
    client.set_display_format(Format::Xml);

    let loaded = client.begin_edit(&RecordId::from(1)).await.unwrap();
    assert_eq!(loaded.guest_name, "Maria");
    assert!(client.session().is_edit_mode());
    client.set_field(Field::Guests, "6");

    let outcome = client.submit(Format::Xml).await.unwrap();

    assert_eq!(outcome.action, SubmitAction::Updated);
    assert_eq!(outcome.message(), "Reservation #1 updated successfully");
    let requests = backend.requests();
    let edit_fetch = &requests[2];
    assert_eq!(edit_fetch.uri, "/reservations/1?format=json");
    let put = &requests[3];
    assert_eq!(put.method, Method::PUT);
    assert_eq!(put.uri, "/reservations/1?format=xml");
    assert_eq!(requests[4].uri, "/reservations?format=xml");

    let stored = backend.find("1").unwrap();
    assert_eq!(stored.guests, 6);
    assert_eq!(stored.created_at.as_deref(), Some("2030-01-01T00:00:00"));
    assert!(!client.session().is_edit_mode());
    assert_eq!(client.view().rows[0].guests, 6);
}

#[tokio::test]
async fn test_update_of_missing_record_reports_status_and_body() {
    let (client, backend) = test_client().await;
    create(&client, "Maria").await;
    client.begin_edit(&RecordId::from(1)).await.unwrap();
    backend.records.lock().unwrap().clear();

    let err = client.submit(Format::Json).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().starts_with("HTTP 404: "));
    assert!(err.to_string().contains("Reservation 1 not found"));
    assert!(client.session().is_edit_mode());
}

// ── Listing ──

#[tokio::test]
async fn test_list_xml_sorted_newest_first() {
    let (client, _) = test_client().await;
    for name in ["A", "B", "C"] {
        create(&client, name).await;
    }

    let fetched = client.load_reservations(None, Format::Xml).await.unwrap();

    let ids: Vec<i64> = fetched.value.iter().map(|r| r.sort_key()).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert_eq!(fetched.value[0].guest_name, "C");
}

#[tokio::test]
async fn test_search_is_sent_as_query() {
    let (client, backend) = test_client().await;
    create(&client, "Alice Reyes").await;
    create(&client, "Bob Santos").await;

    let fetched = client
        .load_reservations(Some("  alice reyes "), Format::Json)
        .await
        .unwrap();

    assert_eq!(fetched.value.len(), 1);
    assert_eq!(fetched.value[0].guest_name, "Alice Reyes");
    let last = backend.requests().pop().unwrap();
    assert_eq!(last.uri, "/reservations?format=json&q=alice+reyes");
}

#[tokio::test]
async fn test_list_failure_keeps_table() {
    let (client, backend) = test_client().await;
    create(&client, "Ann").await;
    assert_eq!(client.view().rows.len(), 1);
    backend.fail_list.store(true, Ordering::SeqCst);

    let err = client.load_reservations(None, Format::Json).await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP 500: database on fire");
    let view = client.view();
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].guest_name, "Ann");
    let notice = view.notice.unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("HTTP 500"));
}

// ── Detail ──

#[tokio::test]
async fn test_view_xml_detail() {
    let (client, _) = test_client().await;
    create(&client, "Ann").await;

    let detail = client
        .view_reservation(&RecordId::from(1), Format::Xml)
        .await
        .unwrap()
        .value;

    let text = detail.body.plain();
    assert!(text.starts_with("<?xml version=\"1.0\" ?>\n<reservation>\n  <id>1</id>\n"));
    assert!(text.contains("\n  <guest_name>Ann</guest_name>\n"));
    assert!(text.ends_with("</reservation>\n"));
}

#[tokio::test]
async fn test_view_missing_record() {
    let (client, _) = test_client().await;

    let err = client
        .view_reservation(&RecordId::from(77), Format::Json)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(client.view().notice.unwrap().text.contains("#77"));
}

// ── Delete ──

#[tokio::test]
async fn test_delete_declined_issues_no_request() {
    let (url, backend) = spawn_backend().await;
    let (client, asked) = client_for(&url, "/reservations", false);

    let outcome = client.delete_reservation(&RecordId::from(42)).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(asked.load(Ordering::SeqCst), 1);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_delete_confirmed_removes_and_refreshes() {
    let (client, backend) = test_client().await;
    create(&client, "Ann").await;
    create(&client, "Ben").await;

    let outcome = client.delete_reservation(&RecordId::from(1)).await.unwrap();

    assert_eq!(
        outcome,
        DeleteOutcome::Deleted {
            message: "Reservation 1 deleted successfully".to_string()
        }
    );
    assert!(backend.find("1").is_none());
    let rows = client.view().rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].guest_name, "Ben");
}

#[tokio::test]
async fn test_delete_missing_uses_server_error() {
    let (client, _) = test_client().await;

    let err = client.delete_reservation(&RecordId::from(99)).await.unwrap_err();

    assert_eq!(err.to_string(), "Reservation 99 not found");
    assert_eq!(err.kind(), ErrorKind::Transport);
}

// ── Misc ──

#[tokio::test]
async fn test_api_prefixed_base_path() {
    let (url, backend) = spawn_backend().await;
    let (client, _) = client_for(&url, "/api/reservations", true);
    fill_form(&client, "Prefixed");

    client.submit(Format::Json).await.unwrap();

    assert_eq!(backend.requests()[0].uri, "/api/reservations");
    assert_eq!(client.view().rows[0].guest_name, "Prefixed");
}

#[tokio::test]
async fn test_health_report() {
    let (client, _) = test_client().await;
    create(&client, "Ann").await;

    let report = client.health().await.unwrap();

    assert!(report.is_healthy());
    assert_eq!(report.data_count, 1);
    assert_eq!(report.next_id, Some(2));
    assert_eq!(report.supported_formats, vec!["json", "xml"]);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let (client, _) = client_for(&format!("http://{addr}"), "/reservations", true);

    let err = client.load_reservations(None, Format::Json).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(client.view().rows.is_empty());
}
