//! End-to-end tests of the REST surface against a scripted gateway

use async_trait::async_trait;
use flaregate::{AppState, router};
use flaregate_cloud::{
    AccountSummary, CredentialVerifier, Credentials, GatewayError, Reply, Result, Session,
};
use flaregate_cloudflare::{DnsRecordType, Gateway, Operation, PurgeInput};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

type Responder = fn(&Operation) -> Result<Reply>;

/// Records every dispatched operation with the identity it ran under
struct FakeGateway {
    calls: Mutex<Vec<(String, Operation)>>,
    respond: Responder,
}

impl FakeGateway {
    fn new() -> Self {
        Self::with_responder(|op| Ok(Reply::Result(json!({ "operation": op.name() }))))
    }

    fn with_responder(respond: Responder) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            respond,
        }
    }

    fn calls(&self) -> Vec<(String, Operation)> {
        self.calls.lock().unwrap().clone()
    }

    fn last_operation(&self) -> Operation {
        self.calls().pop().expect("no operation dispatched").1
    }
}

#[async_trait]
impl CredentialVerifier for FakeGateway {
    async fn verify(&self, credentials: &Credentials) -> Result<AccountSummary> {
        if credentials.secret() == "good-key" {
            Ok(AccountSummary(json!({ "id": "acc-1", "name": "Main" })))
        } else {
            Err(GatewayError::upstream(403, "Unknown X-Auth-Key or X-Auth-Email"))
        }
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    fn backend(&self) -> &'static str {
        "fake"
    }

    async fn dispatch(&self, credentials: &Credentials, operation: Operation) -> Result<Reply> {
        let reply = (self.respond)(&operation);
        self.calls
            .lock()
            .unwrap()
            .push((credentials.identity().to_string(), operation));
        reply
    }
}

struct TestServer {
    base: String,
    gateway: Arc<FakeGateway>,
    session: Arc<Session>,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(gateway: FakeGateway, session: Session) -> Self {
        let gateway = Arc::new(gateway);
        let session = Arc::new(session);
        let app = router(AppState::new(gateway.clone(), session.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            gateway,
            session,
            client: reqwest::Client::new(),
        }
    }

    async fn authenticated() -> Self {
        let creds = Credentials::new("ops@example.com", "good-key").unwrap();
        Self::start(FakeGateway::new(), Session::with_credentials(creds)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        read(response).await
    }

    async fn send_json(&self, method: reqwest::Method, path: &str, body: Value) -> (u16, Value) {
        let response = self
            .client
            .request(method, self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        read(response).await
    }
}

async fn read(response: reqwest::Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_service_descriptor_and_health() {
    let server = TestServer::start(FakeGateway::new(), Session::new()).await;

    let (status, body) = server.get("/").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "running");
    assert_eq!(body["backend"], "fake");
    assert!(body["timestamp"].as_str().is_some());

    let (status, body) = server.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_unauthenticated_fails_before_dispatch() {
    let server = TestServer::start(FakeGateway::new(), Session::new()).await;

    let (status, body) = server.get("/api/zones").await;
    assert_eq!(status, 401);
    assert_eq!(
        body,
        json!({ "detail": "Not authenticated. Please set credentials first" })
    );
    assert!(server.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_set_credentials_then_call() {
    let server = TestServer::start(FakeGateway::new(), Session::new()).await;

    let (status, body) = server
        .send_json(
            reqwest::Method::POST,
            "/api/auth",
            json!({ "identity": "ops@example.com", "secret": "good-key" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "success": true, "account": { "id": "acc-1", "name": "Main" } })
    );

    let (status, body) = server.get("/api/zones").await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "success": true, "result": { "operation": "zones.list" } })
    );
    assert_eq!(server.gateway.calls()[0].0, "ops@example.com");
}

#[tokio::test]
async fn test_failed_verification_clears_session() {
    let server = TestServer::authenticated().await;

    let (status, body) = server
        .send_json(
            reqwest::Method::POST,
            "/api/auth",
            json!({ "email": "ops@example.com", "api_key": "wrong" }),
        )
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["detail"], "Unknown X-Auth-Key or X-Auth-Email");
    assert!(server.session.get().is_none());

    let (status, _) = server.get("/api/accounts").await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_auth_status_and_logout() {
    let server = TestServer::authenticated().await;

    let (_, body) = server.get("/api/auth").await;
    assert_eq!(
        body,
        json!({ "authenticated": true, "identity": "ops@example.com" })
    );

    let response = server
        .client
        .delete(server.url("/api/auth"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let (_, body) = server.get("/api/auth").await;
    assert_eq!(body, json!({ "authenticated": false, "identity": null }));
}

#[tokio::test]
async fn test_header_credentials_leave_session_untouched() {
    let server = TestServer::start(FakeGateway::new(), Session::new()).await;

    let response = server
        .client
        .get(server.url("/api/r2/buckets"))
        .header("X-Auth-Email", "other@example.com")
        .header("X-Auth-Key", "other-key")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let calls = server.gateway.calls();
    assert_eq!(calls[0].0, "other@example.com");
    assert_eq!(calls[0].1, Operation::ListR2Buckets);
    assert!(server.session.get().is_none());
}

#[tokio::test]
async fn test_half_header_pair_rejected() {
    let server = TestServer::authenticated().await;

    let response = server
        .client
        .get(server.url("/api/zones"))
        .header("X-Auth-Email", "other@example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    assert!(server.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_dns_body_validation() {
    let server = TestServer::authenticated().await;

    let (status, body) = server
        .send_json(
            reqwest::Method::POST,
            "/api/zones/z1/dns",
            json!({ "type": "BOGUS", "name": "www", "content": "1.2.3.4" }),
        )
        .await;
    assert_eq!(status, 422);
    assert!(body["detail"].as_str().is_some());

    let (status, _) = server
        .send_json(
            reqwest::Method::POST,
            "/api/zones/z1/dns",
            json!({ "type": "MX", "name": "@", "content": "mail.example.com" }),
        )
        .await;
    assert_eq!(status, 200);
    match server.gateway.last_operation() {
        Operation::CreateDnsRecord { zone_id, record } => {
            assert_eq!(zone_id, "z1");
            assert_eq!(record.effective_priority(), Some(10));
        }
        other => panic!("unexpected operation {other:?}"),
    }
}

#[tokio::test]
async fn test_dns_list_type_filter() {
    let server = TestServer::authenticated().await;

    let (status, _) = server.get("/api/zones/z1/dns?type=MX").await;
    assert_eq!(status, 200);
    assert_eq!(
        server.gateway.last_operation(),
        Operation::ListDnsRecords {
            zone_id: "z1".to_string(),
            record_type: Some(DnsRecordType::Mx),
        }
    );

    let (status, _) = server.get("/api/zones/z1/dns?type=BOGUS").await;
    assert_eq!(status, 422);
}

#[tokio::test]
async fn test_dns_export_route_wins_over_record_id() {
    let server = TestServer::authenticated().await;

    let (status, _) = server.get("/api/zones/z1/dns/export").await;
    assert_eq!(status, 200);
    assert_eq!(
        server.gateway.last_operation(),
        Operation::ExportDnsRecords {
            zone_id: "z1".to_string()
        }
    );
}

#[tokio::test]
async fn test_purge_body_optional() {
    let server = TestServer::authenticated().await;

    let response = server
        .client
        .post(server.url("/api/zones/z1/purge"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        server.gateway.last_operation(),
        Operation::PurgeCache {
            zone_id: "z1".to_string(),
            purge: PurgeInput::everything(),
        }
    );

    let (status, _) = server
        .send_json(
            reqwest::Method::POST,
            "/api/zones/z1/purge",
            json!({ "files": ["https://example.com/app.css"] }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(
        server.gateway.last_operation(),
        Operation::PurgeCache {
            zone_id: "z1".to_string(),
            purge: PurgeInput {
                files: vec!["https://example.com/app.css".to_string()],
            },
        }
    );
}

#[tokio::test]
async fn test_pages_deployment_multipart() {
    let server = TestServer::authenticated().await;

    let form = reqwest::multipart::Form::new()
        .text("branch", "preview")
        .part(
            "worker_file",
            reqwest::multipart::Part::bytes(b"export default {}".to_vec()).file_name("site.mjs"),
        );
    let response = server
        .client
        .post(server.url("/api/pages/my-site/deployments"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    match server.gateway.last_operation() {
        Operation::CreatePagesDeployment { project, upload } => {
            assert_eq!(project, "my-site");
            assert_eq!(upload.branch, "preview");
            assert_eq!(upload.file_name.as_deref(), Some("site.mjs"));
            assert_eq!(&upload.content[..], b"export default {}");

            let parts = upload.form_parts();
            assert_eq!(parts.len(), 3);
            assert_eq!(parts[2].file_name.as_deref(), Some("_worker.js"));
        }
        other => panic!("unexpected operation {other:?}"),
    }
}

#[tokio::test]
async fn test_pages_deployment_requires_file() {
    let server = TestServer::authenticated().await;

    let form = reqwest::multipart::Form::new().text("branch", "main");
    let response = server
        .client
        .post(server.url("/api/pages/my-site/deployments"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let (status, body) = read(response).await;
    assert_eq!(status, 422);
    assert_eq!(body["detail"], "Missing form field `worker_file`");
    assert!(server.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_kv_value_text_and_not_found() {
    let creds = Credentials::new("ops@example.com", "good-key").unwrap();
    let gateway = FakeGateway::with_responder(|op| match op {
        Operation::GetKvValue { key, .. } if key == "greeting" => Ok(Reply::Text("hello".into())),
        _ => Err(GatewayError::upstream(404, "Key not found")),
    });
    let server = TestServer::start(gateway, Session::with_credentials(creds)).await;

    let (status, body) = server.get("/api/kv/namespaces/ns/keys/greeting").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "success": true, "result": "hello" }));

    let (status, body) = server.get("/api/kv/namespaces/ns/keys/missing").await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "detail": "Key not found" }));
}

#[tokio::test]
async fn test_cli_output_envelope() {
    let creds = Credentials::new("ops@example.com", "good-key").unwrap();
    let gateway = FakeGateway::with_responder(|_| {
        Ok(Reply::Output {
            output: "example.com\n".into(),
            stderr: String::new(),
        })
    });
    let server = TestServer::start(gateway, Session::with_credentials(creds)).await;

    let (status, body) = server.get("/api/zones").await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "success": true, "output": "example.com\n", "stderr": "" })
    );
}

#[tokio::test]
async fn test_gateway_errors_render_detail() {
    let creds = Credentials::new("ops@example.com", "good-key").unwrap();
    let gateway = FakeGateway::with_responder(|op| match op {
        Operation::ListWorkers => Err(GatewayError::Timeout("Command timeout".into())),
        _ => Err(GatewayError::CommandFailed("unknown zone".into())),
    });
    let server = TestServer::start(gateway, Session::with_credentials(creds)).await;

    let (status, body) = server.get("/api/workers").await;
    assert_eq!(status, 408);
    assert_eq!(body, json!({ "detail": "Command timeout" }));

    let (status, body) = server.get("/api/zones/z1").await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "detail": "Command failed: unknown zone" }));
}

#[tokio::test]
async fn test_r2_bucket_location_default() {
    let server = TestServer::authenticated().await;

    let (status, _) = server
        .send_json(
            reqwest::Method::POST,
            "/api/r2/buckets",
            json!({ "name": "assets" }),
        )
        .await;
    assert_eq!(status, 200);
    match server.gateway.last_operation() {
        Operation::CreateR2Bucket(bucket) => assert_eq!(bucket.location(), "auto"),
        other => panic!("unexpected operation {other:?}"),
    }
}

#[tokio::test]
async fn test_cors_preflight() {
    let server = TestServer::start(FakeGateway::new(), Session::new()).await;

    let response = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/api/zones"))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 204);
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(headers["access-control-allow-headers"], "content-type");
    assert!(server.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_every_route_reaches_gateway() {
    let server = TestServer::authenticated().await;
    use reqwest::Method;

    let cases: Vec<(Method, &str, Option<Value>, &str)> = vec![
        (Method::GET, "/api/accounts", None, "accounts.list"),
        (Method::GET, "/api/accounts/current", None, "accounts.current"),
        (Method::POST, "/api/zones", Some(json!({"name": "example.com"})), "zones.create"),
        (Method::DELETE, "/api/zones/z1", None, "zones.delete"),
        (
            Method::PUT,
            "/api/zones/z1/dns/r1",
            Some(json!({"type": "A", "name": "www", "content": "192.0.2.1"})),
            "dns.update",
        ),
        (Method::DELETE, "/api/zones/z1/dns/r1", None, "dns.delete"),
        (Method::GET, "/api/workers/edge", None, "workers.get"),
        (
            Method::POST,
            "/api/workers",
            Some(json!({"name": "edge", "script": "export default {}"})),
            "workers.deploy",
        ),
        (Method::DELETE, "/api/workers/edge", None, "workers.delete"),
        (Method::GET, "/api/zones/z1/routes", None, "routes.list"),
        (
            Method::POST,
            "/api/zones/z1/routes",
            Some(json!({"pattern": "example.com/*", "worker_name": "edge"})),
            "routes.create",
        ),
        (Method::DELETE, "/api/zones/z1/routes/rt1", None, "routes.delete"),
        (Method::GET, "/api/pages", None, "pages.list"),
        (Method::POST, "/api/pages", Some(json!({"name": "site"})), "pages.create"),
        (Method::GET, "/api/pages/site", None, "pages.get"),
        (Method::DELETE, "/api/pages/site", None, "pages.delete"),
        (Method::GET, "/api/pages/site/deployments", None, "pages.deployments.list"),
        (Method::GET, "/api/pages/site/deployments/d1", None, "pages.deployments.get"),
        (Method::GET, "/api/kv/namespaces", None, "kv.namespaces.list"),
        (Method::POST, "/api/kv/namespaces", Some(json!({"title": "cache"})), "kv.namespaces.create"),
        (Method::PUT, "/api/kv/namespaces/ns", Some(json!({"title": "cache2"})), "kv.namespaces.rename"),
        (Method::DELETE, "/api/kv/namespaces/ns", None, "kv.namespaces.delete"),
        (Method::GET, "/api/kv/namespaces/ns/keys?prefix=cfg", None, "kv.keys.list"),
        (
            Method::PUT,
            "/api/kv/namespaces/ns/keys",
            Some(json!({"key": "greeting", "value": "hello"})),
            "kv.keys.put",
        ),
        (Method::DELETE, "/api/kv/namespaces/ns/keys/greeting", None, "kv.keys.delete"),
        (Method::GET, "/api/r2/buckets/assets", None, "r2.get"),
        (Method::DELETE, "/api/r2/buckets/assets", None, "r2.delete"),
    ];

    for (method, path, body, expected) in cases {
        let mut request = server.client.request(method.clone(), server.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let (status, body) = read(request.send().await.unwrap()).await;
        assert_eq!(status, 200, "{method} {path}: {body}");
        assert_eq!(body["result"]["operation"], expected, "{method} {path}");
    }
}
