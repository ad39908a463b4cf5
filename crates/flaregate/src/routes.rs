//! Router construction

use crate::handlers::*;
use crate::state::AppState;
use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api_routes())
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", post(set_auth).get(auth_status).delete(clear_auth))
        // Accounts
        .route("/accounts", get(list_accounts))
        .route("/accounts/current", get(current_account))
        // Zones
        .route("/zones", get(list_zones).post(create_zone))
        .route("/zones/{zone_id}", get(get_zone).delete(delete_zone))
        .route("/zones/{zone_id}/purge", post(purge_cache))
        // DNS
        .route(
            "/zones/{zone_id}/dns",
            get(list_dns_records).post(create_dns_record),
        )
        .route("/zones/{zone_id}/dns/export", get(export_dns_records))
        .route(
            "/zones/{zone_id}/dns/{record_id}",
            put(update_dns_record).delete(delete_dns_record),
        )
        // Worker routes
        .route(
            "/zones/{zone_id}/routes",
            get(list_worker_routes).post(create_worker_route),
        )
        .route(
            "/zones/{zone_id}/routes/{route_id}",
            axum::routing::delete(delete_worker_route),
        )
        // Workers
        .route("/workers", get(list_workers).post(deploy_worker))
        .route("/workers/{name}", get(get_worker).delete(delete_worker))
        // Pages
        .route(
            "/pages",
            get(list_pages_projects).post(create_pages_project),
        )
        .route(
            "/pages/{project}",
            get(get_pages_project).delete(delete_pages_project),
        )
        .route(
            "/pages/{project}/deployments",
            get(list_pages_deployments).post(create_pages_deployment),
        )
        .route(
            "/pages/{project}/deployments/{deployment_id}",
            get(get_pages_deployment),
        )
        // KV
        .route(
            "/kv/namespaces",
            get(list_kv_namespaces).post(create_kv_namespace),
        )
        .route(
            "/kv/namespaces/{namespace_id}",
            put(rename_kv_namespace).delete(delete_kv_namespace),
        )
        .route(
            "/kv/namespaces/{namespace_id}/keys",
            get(list_kv_keys).put(put_kv_value),
        )
        .route(
            "/kv/namespaces/{namespace_id}/keys/{key}",
            get(get_kv_value).delete(delete_kv_key),
        )
        // R2
        .route("/r2/buckets", get(list_r2_buckets).post(create_r2_bucket))
        .route(
            "/r2/buckets/{name}",
            get(get_r2_bucket).delete(delete_r2_bucket),
        )
}

/// Permissive CORS for the browser front-end; pre-flights never reach a handler
async fn cors(req: Request, next: Next) -> Response {
    let origin = req.headers().get(header::ORIGIN).cloned();
    let requested_headers = req
        .headers()
        .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
        .cloned();

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    apply_cors_headers(response.headers_mut(), origin, requested_headers);
    response
}

fn apply_cors_headers(
    headers: &mut HeaderMap,
    origin: Option<HeaderValue>,
    requested_headers: Option<HeaderValue>,
) {
    match origin {
        Some(origin) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
            headers.append(header::VARY, HeaderValue::from_static("Origin"));
        }
        None => {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
        }
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        requested_headers.unwrap_or_else(|| HeaderValue::from_static("*")),
    );
}
