// tests/common/mod.rs
#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::http::header::{self, HeaderName};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde::Deserialize;

use payment_gateway::logger::render;
use payment_gateway::{Exchange, GatewayConfig, GatewayConfigBuilder};

/// `Basic base64("PhantomStore:some_api_key")`
pub const VALID_AUTHORIZATION: &str = "Basic UGhhbnRvbVN0b3JlOnNvbWVfYXBpX2tleQ==";
pub const TRANSACTION_ID: &str = "6ef7bc3755ac699c3d56db49711f6d1f";

const INIT: &str = include_str!("../fixtures/init.json");
const INIT_SHORT_ID: &str = include_str!("../fixtures/init_short_id.json");
const RESULT: &str = include_str!("../fixtures/result.json");
const CLOSE: &str = include_str!("../fixtures/close.json");
const WRONG_API_KEY: &str = include_str!("../fixtures/wrong_api_key.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Answer from the fixtures, like the real gateway would.
    Normal,
    /// 503 for everything.
    ServerError,
    /// 200 with a body that is not JSON.
    Garbage,
    /// Like `Normal`, but Init succeeds with an id that is not 32 characters long.
    ShortId,
}

/// What the fake gateway saw of one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub json: serde_json::Value,
    pub host: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Deserialize)]
struct RestForm {
    method: String,
    json: String,
}

struct GatewayState {
    behavior: Behavior,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Stand-in for the PaymentGateway REST API, listening on an ephemeral port.
pub struct FakeGateway {
    pub port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeGateway {
    /// Must be called from within an actix runtime (`#[actix_web::test]`).
    pub fn start() -> Self {
        Self::start_with(Behavior::Normal)
    }

    pub fn start_with(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fake gateway");
        let port = listener.local_addr().expect("No local address").port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = web::Data::new(GatewayState {
            behavior,
            requests: requests.clone(),
        });

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .route("/api/rest", web::post().to(rest_api))
        })
        .workers(1)
        .disable_signals()
        .listen(listener)
        .expect("Failed to start fake gateway")
        .run();
        actix_web::rt::spawn(server);

        Self { port, requests }
    }

    /// Configuration pointing at this fake, with the store and key it accepts.
    pub fn config(&self) -> GatewayConfigBuilder {
        GatewayConfig::builder()
            .configure([
                ("provider", "PayPal"),
                ("store", "PhantomStore"),
                ("api_key", "some_api_key"),
                ("currency", "USD"),
                ("language", "EN"),
                ("host", "127.0.0.1"),
                ("header_host", "paymentgateway.hu"),
                ("use_ssl", "false"),
                ("app_host", "localhost/"),
            ])
            .configure([("port", self.port)])
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("Fake gateway received no request")
    }
}

fn header_value(req: &HttpRequest, name: HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn json_response(body: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(body)
}

async fn rest_api(
    req: HttpRequest,
    form: web::Form<RestForm>,
    state: web::Data<GatewayState>,
) -> HttpResponse {
    let authorization = header_value(&req, header::AUTHORIZATION);
    state.requests.lock().unwrap().push(RecordedRequest {
        method: form.method.clone(),
        json: serde_json::from_str(&form.json).unwrap_or(serde_json::Value::Null),
        host: header_value(&req, header::HOST),
        authorization: authorization.clone(),
    });

    match state.behavior {
        Behavior::ServerError => return HttpResponse::ServiceUnavailable().body("maintenance"),
        Behavior::Garbage => {
            return HttpResponse::Ok()
                .content_type("application/json")
                .body("<html>not json</html>")
        }
        Behavior::Normal | Behavior::ShortId => {}
    }

    // only PhantomStore with api_key = "some_api_key" gets real answers
    if authorization.as_deref() != Some(VALID_AUTHORIZATION) {
        return json_response(WRONG_API_KEY);
    }

    match form.method.as_str() {
        "Init" if state.behavior == Behavior::ShortId => json_response(INIT_SHORT_ID),
        "Init" => json_response(INIT),
        "Result" => json_response(RESULT),
        "Close" => json_response(CLOSE),
        _ => HttpResponse::InternalServerError().finish(),
    }
}

/// Logger collecting rendered exchanges.
pub fn recording_logger() -> (
    Arc<Mutex<Vec<String>>>,
    impl Fn(&Exchange<'_>) + Send + Sync + 'static,
) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    (lines, move |e: &Exchange<'_>| {
        sink.lock().unwrap().push(render(e))
    })
}

/// A port nothing listens on.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().expect("No local address").port()
}
