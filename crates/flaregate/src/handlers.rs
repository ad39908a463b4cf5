//! Inbound handlers
//!
//! Each handler only gathers its inputs into an [`Operation`]; the configured
//! gateway does the rest.

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, RequestCredentials};
use crate::state::AppState;
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use bytes::Bytes;
use flaregate_cloudflare::{
    BucketInput, DnsRecordInput, DnsRecordType, KvNamespaceInput, KvPair, Operation,
    PagesDeploymentUpload, PagesProjectInput, PurgeInput, WorkerRouteInput, WorkerScript,
    ZoneInput,
};
use serde::Deserialize;
use serde_json::{Value, json};

type ApiResult = Result<Json<Value>, ApiError>;

/// Inbound form field carrying the deployment's branch name
pub const BRANCH_FIELD: &str = "branch";

/// Inbound form field carrying the script file
pub const WORKER_FILE_FIELD: &str = "worker_file";

async fn run(state: &AppState, credentials: RequestCredentials, operation: Operation) -> ApiResult {
    let RequestCredentials(credentials) = credentials;
    tracing::debug!(operation = operation.name(), backend = state.backend(), "Dispatching");

    let reply = state.gateway.dispatch(&credentials, operation).await?;
    Ok(Json(reply.to_envelope()))
}

// ========== Service ==========

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "Flaregate",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "backend": state.backend(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

// ========== Auth ==========

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    #[serde(alias = "email")]
    pub identity: String,
    #[serde(alias = "api_key")]
    pub secret: String,
}

pub async fn set_auth(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AuthRequest>,
) -> ApiResult {
    let account = state
        .session
        .set_credentials(&*state.gateway, body.identity, body.secret)
        .await?;
    Ok(Json(json!({ "success": true, "account": account })))
}

pub async fn auth_status(State(state): State<AppState>) -> Json<Value> {
    let credentials = state.session.get();
    Json(json!({
        "authenticated": credentials.is_some(),
        "identity": credentials.as_ref().map(|c| c.identity()),
    }))
}

pub async fn clear_auth(State(state): State<AppState>) -> Json<Value> {
    state.session.clear();
    tracing::info!("Credentials cleared");
    Json(json!({ "success": true }))
}

// ========== Accounts ==========

pub async fn list_accounts(State(state): State<AppState>, creds: RequestCredentials) -> ApiResult {
    run(&state, creds, Operation::ListAccounts).await
}

pub async fn current_account(State(state): State<AppState>, creds: RequestCredentials) -> ApiResult {
    run(&state, creds, Operation::CurrentAccount).await
}

// ========== Zones ==========

pub async fn list_zones(State(state): State<AppState>, creds: RequestCredentials) -> ApiResult {
    run(&state, creds, Operation::ListZones).await
}

pub async fn create_zone(
    State(state): State<AppState>,
    creds: RequestCredentials,
    ApiJson(zone): ApiJson<ZoneInput>,
) -> ApiResult {
    run(&state, creds, Operation::CreateZone(zone)).await
}

pub async fn get_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::GetZone { zone_id }).await
}

pub async fn delete_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::DeleteZone { zone_id }).await
}

/// Body is optional; without files the whole zone cache is purged
pub async fn purge_cache(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    creds: RequestCredentials,
    body: Bytes,
) -> ApiResult {
    let purge = if body.iter().all(u8::is_ascii_whitespace) {
        PurgeInput::everything()
    } else {
        serde_json::from_slice::<PurgeInput>(&body)?
    };
    run(&state, creds, Operation::PurgeCache { zone_id, purge }).await
}

// ========== DNS ==========

#[derive(Debug, Deserialize)]
pub struct DnsListQuery {
    #[serde(rename = "type")]
    pub record_type: Option<DnsRecordType>,
}

pub async fn list_dns_records(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    creds: RequestCredentials,
    ApiQuery(query): ApiQuery<DnsListQuery>,
) -> ApiResult {
    let operation = Operation::ListDnsRecords {
        zone_id,
        record_type: query.record_type,
    };
    run(&state, creds, operation).await
}

pub async fn create_dns_record(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    creds: RequestCredentials,
    ApiJson(record): ApiJson<DnsRecordInput>,
) -> ApiResult {
    run(&state, creds, Operation::CreateDnsRecord { zone_id, record }).await
}

pub async fn update_dns_record(
    State(state): State<AppState>,
    Path((zone_id, record_id)): Path<(String, String)>,
    creds: RequestCredentials,
    ApiJson(record): ApiJson<DnsRecordInput>,
) -> ApiResult {
    let operation = Operation::UpdateDnsRecord {
        zone_id,
        record_id,
        record,
    };
    run(&state, creds, operation).await
}

pub async fn delete_dns_record(
    State(state): State<AppState>,
    Path((zone_id, record_id)): Path<(String, String)>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::DeleteDnsRecord { zone_id, record_id }).await
}

pub async fn export_dns_records(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::ExportDnsRecords { zone_id }).await
}

// ========== Workers ==========

pub async fn list_workers(State(state): State<AppState>, creds: RequestCredentials) -> ApiResult {
    run(&state, creds, Operation::ListWorkers).await
}

pub async fn get_worker(
    State(state): State<AppState>,
    Path(name): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::GetWorker { name }).await
}

pub async fn deploy_worker(
    State(state): State<AppState>,
    creds: RequestCredentials,
    ApiJson(worker): ApiJson<WorkerScript>,
) -> ApiResult {
    run(&state, creds, Operation::DeployWorker(worker)).await
}

pub async fn delete_worker(
    State(state): State<AppState>,
    Path(name): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::DeleteWorker { name }).await
}

pub async fn list_worker_routes(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::ListWorkerRoutes { zone_id }).await
}

pub async fn create_worker_route(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    creds: RequestCredentials,
    ApiJson(route): ApiJson<WorkerRouteInput>,
) -> ApiResult {
    run(&state, creds, Operation::CreateWorkerRoute { zone_id, route }).await
}

pub async fn delete_worker_route(
    State(state): State<AppState>,
    Path((zone_id, route_id)): Path<(String, String)>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::DeleteWorkerRoute { zone_id, route_id }).await
}

// ========== Pages ==========

pub async fn list_pages_projects(
    State(state): State<AppState>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::ListPagesProjects).await
}

pub async fn create_pages_project(
    State(state): State<AppState>,
    creds: RequestCredentials,
    ApiJson(project): ApiJson<PagesProjectInput>,
) -> ApiResult {
    run(&state, creds, Operation::CreatePagesProject(project)).await
}

pub async fn get_pages_project(
    State(state): State<AppState>,
    Path(project): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::GetPagesProject { project }).await
}

pub async fn delete_pages_project(
    State(state): State<AppState>,
    Path(project): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::DeletePagesProject { project }).await
}

pub async fn list_pages_deployments(
    State(state): State<AppState>,
    Path(project): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::ListPagesDeployments { project }).await
}

pub async fn get_pages_deployment(
    State(state): State<AppState>,
    Path((project, deployment_id)): Path<(String, String)>,
    creds: RequestCredentials,
) -> ApiResult {
    let operation = Operation::GetPagesDeployment {
        project,
        deployment_id,
    };
    run(&state, creds, operation).await
}

/// Multipart upload with an optional `branch` field and a `worker_file` file
pub async fn create_pages_deployment(
    State(state): State<AppState>,
    Path(project): Path<String>,
    creds: RequestCredentials,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let upload = read_deployment_upload(multipart?).await?;
    run(&state, creds, Operation::CreatePagesDeployment { project, upload }).await
}

async fn read_deployment_upload(mut multipart: Multipart) -> Result<PagesDeploymentUpload, ApiError> {
    let mut branch = None;
    let mut script = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(BRANCH_FIELD) => branch = Some(field.text().await?),
            Some(WORKER_FILE_FIELD) => {
                let file_name = field.file_name().map(str::to_string);
                let content = field.bytes().await?;
                script = Some((file_name, content));
            }
            _ => {}
        }
    }

    let (file_name, content) = script
        .ok_or_else(|| ApiError::unprocessable(format!("Missing form field `{WORKER_FILE_FIELD}`")))?;
    Ok(PagesDeploymentUpload::new(branch, file_name, content))
}

// ========== KV ==========

#[derive(Debug, Deserialize)]
pub struct RenameNamespace {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct KeysQuery {
    pub prefix: Option<String>,
}

pub async fn list_kv_namespaces(
    State(state): State<AppState>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::ListKvNamespaces).await
}

pub async fn create_kv_namespace(
    State(state): State<AppState>,
    creds: RequestCredentials,
    ApiJson(namespace): ApiJson<KvNamespaceInput>,
) -> ApiResult {
    run(&state, creds, Operation::CreateKvNamespace(namespace)).await
}

pub async fn rename_kv_namespace(
    State(state): State<AppState>,
    Path(namespace_id): Path<String>,
    creds: RequestCredentials,
    ApiJson(body): ApiJson<RenameNamespace>,
) -> ApiResult {
    let operation = Operation::RenameKvNamespace {
        namespace_id,
        title: body.title,
    };
    run(&state, creds, operation).await
}

pub async fn delete_kv_namespace(
    State(state): State<AppState>,
    Path(namespace_id): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::DeleteKvNamespace { namespace_id }).await
}

pub async fn list_kv_keys(
    State(state): State<AppState>,
    Path(namespace_id): Path<String>,
    creds: RequestCredentials,
    ApiQuery(query): ApiQuery<KeysQuery>,
) -> ApiResult {
    let operation = Operation::ListKvKeys {
        namespace_id,
        prefix: query.prefix,
    };
    run(&state, creds, operation).await
}

pub async fn get_kv_value(
    State(state): State<AppState>,
    Path((namespace_id, key)): Path<(String, String)>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::GetKvValue { namespace_id, key }).await
}

pub async fn put_kv_value(
    State(state): State<AppState>,
    Path(namespace_id): Path<String>,
    creds: RequestCredentials,
    ApiJson(pair): ApiJson<KvPair>,
) -> ApiResult {
    run(&state, creds, Operation::PutKvValue { namespace_id, pair }).await
}

pub async fn delete_kv_key(
    State(state): State<AppState>,
    Path((namespace_id, key)): Path<(String, String)>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::DeleteKvKey { namespace_id, key }).await
}

// ========== R2 ==========

pub async fn list_r2_buckets(State(state): State<AppState>, creds: RequestCredentials) -> ApiResult {
    run(&state, creds, Operation::ListR2Buckets).await
}

pub async fn create_r2_bucket(
    State(state): State<AppState>,
    creds: RequestCredentials,
    ApiJson(bucket): ApiJson<BucketInput>,
) -> ApiResult {
    run(&state, creds, Operation::CreateR2Bucket(bucket)).await
}

pub async fn get_r2_bucket(
    State(state): State<AppState>,
    Path(name): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::GetR2Bucket { name }).await
}

pub async fn delete_r2_bucket(
    State(state): State<AppState>,
    Path(name): Path<String>,
    creds: RequestCredentials,
) -> ApiResult {
    run(&state, creds, Operation::DeleteR2Bucket { name }).await
}
