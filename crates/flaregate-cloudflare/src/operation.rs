//! Operation table
//!
//! One variant per internal route. Each variant knows the single upstream call
//! it maps to (method, path, encoding), whether it needs the account id, how
//! its response is read, and its command-line equivalent. Nothing here talks
//! to the network.

use crate::model::{
    BucketInput, DnsRecordInput, DnsRecordType, KV_VALUE_CONTENT_TYPE, KvNamespaceInput, KvPair,
    PagesDeploymentUpload, PagesProjectInput, PurgeInput, SCRIPT_CONTENT_TYPE, WorkerRouteInput,
    WorkerScript, ZoneInput,
};
use flaregate_cloud::{GatewayError, ResponseMode, Result, UpstreamCall};
use serde_json::json;
use std::path::Path;

pub const ACCOUNTS_PATH: &str = "/accounts";

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    // Accounts
    ListAccounts,
    CurrentAccount,

    // Zones
    ListZones,
    CreateZone(ZoneInput),
    GetZone { zone_id: String },
    DeleteZone { zone_id: String },
    PurgeCache { zone_id: String, purge: PurgeInput },

    // DNS
    ListDnsRecords { zone_id: String, record_type: Option<DnsRecordType> },
    CreateDnsRecord { zone_id: String, record: DnsRecordInput },
    UpdateDnsRecord { zone_id: String, record_id: String, record: DnsRecordInput },
    DeleteDnsRecord { zone_id: String, record_id: String },
    ExportDnsRecords { zone_id: String },

    // Workers
    ListWorkers,
    GetWorker { name: String },
    DeployWorker(WorkerScript),
    DeleteWorker { name: String },
    ListWorkerRoutes { zone_id: String },
    CreateWorkerRoute { zone_id: String, route: WorkerRouteInput },
    DeleteWorkerRoute { zone_id: String, route_id: String },

    // Pages
    ListPagesProjects,
    CreatePagesProject(PagesProjectInput),
    GetPagesProject { project: String },
    DeletePagesProject { project: String },
    ListPagesDeployments { project: String },
    GetPagesDeployment { project: String, deployment_id: String },
    CreatePagesDeployment { project: String, upload: PagesDeploymentUpload },

    // KV
    ListKvNamespaces,
    CreateKvNamespace(KvNamespaceInput),
    RenameKvNamespace { namespace_id: String, title: String },
    DeleteKvNamespace { namespace_id: String },
    ListKvKeys { namespace_id: String, prefix: Option<String> },
    GetKvValue { namespace_id: String, key: String },
    PutKvValue { namespace_id: String, pair: KvPair },
    DeleteKvKey { namespace_id: String, key: String },

    // R2
    ListR2Buckets,
    CreateR2Bucket(BucketInput),
    GetR2Bucket { name: String },
    DeleteR2Bucket { name: String },
}

fn require(account_id: Option<&str>) -> Result<&str> {
    account_id.ok_or_else(|| GatewayError::NotFound("No accounts found".to_string()))
}

/// Percent-encode a caller-supplied path segment
fn seg(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

impl Operation {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListAccounts => "accounts.list",
            Operation::CurrentAccount => "accounts.current",
            Operation::ListZones => "zones.list",
            Operation::CreateZone(_) => "zones.create",
            Operation::GetZone { .. } => "zones.get",
            Operation::DeleteZone { .. } => "zones.delete",
            Operation::PurgeCache { .. } => "zones.purge",
            Operation::ListDnsRecords { .. } => "dns.list",
            Operation::CreateDnsRecord { .. } => "dns.create",
            Operation::UpdateDnsRecord { .. } => "dns.update",
            Operation::DeleteDnsRecord { .. } => "dns.delete",
            Operation::ExportDnsRecords { .. } => "dns.export",
            Operation::ListWorkers => "workers.list",
            Operation::GetWorker { .. } => "workers.get",
            Operation::DeployWorker(_) => "workers.deploy",
            Operation::DeleteWorker { .. } => "workers.delete",
            Operation::ListWorkerRoutes { .. } => "routes.list",
            Operation::CreateWorkerRoute { .. } => "routes.create",
            Operation::DeleteWorkerRoute { .. } => "routes.delete",
            Operation::ListPagesProjects => "pages.list",
            Operation::CreatePagesProject(_) => "pages.create",
            Operation::GetPagesProject { .. } => "pages.get",
            Operation::DeletePagesProject { .. } => "pages.delete",
            Operation::ListPagesDeployments { .. } => "pages.deployments.list",
            Operation::GetPagesDeployment { .. } => "pages.deployments.get",
            Operation::CreatePagesDeployment { .. } => "pages.deployments.create",
            Operation::ListKvNamespaces => "kv.namespaces.list",
            Operation::CreateKvNamespace(_) => "kv.namespaces.create",
            Operation::RenameKvNamespace { .. } => "kv.namespaces.rename",
            Operation::DeleteKvNamespace { .. } => "kv.namespaces.delete",
            Operation::ListKvKeys { .. } => "kv.keys.list",
            Operation::GetKvValue { .. } => "kv.keys.get",
            Operation::PutKvValue { .. } => "kv.keys.put",
            Operation::DeleteKvKey { .. } => "kv.keys.delete",
            Operation::ListR2Buckets => "r2.list",
            Operation::CreateR2Bucket(_) => "r2.create",
            Operation::GetR2Bucket { .. } => "r2.get",
            Operation::DeleteR2Bucket { .. } => "r2.delete",
        }
    }

    /// Whether the upstream path is nested under `/accounts/{id}`
    pub fn needs_account_id(&self) -> bool {
        !matches!(
            self,
            Operation::ListAccounts
                | Operation::ListZones
                | Operation::GetZone { .. }
                | Operation::DeleteZone { .. }
                | Operation::PurgeCache { .. }
                | Operation::ListDnsRecords { .. }
                | Operation::CreateDnsRecord { .. }
                | Operation::UpdateDnsRecord { .. }
                | Operation::DeleteDnsRecord { .. }
                | Operation::ExportDnsRecords { .. }
                | Operation::ListWorkerRoutes { .. }
                | Operation::CreateWorkerRoute { .. }
                | Operation::DeleteWorkerRoute { .. }
        )
    }

    pub fn response_mode(&self) -> ResponseMode {
        match self {
            Operation::GetKvValue { .. } => ResponseMode::RawText,
            _ => ResponseMode::Structured,
        }
    }

    /// The single upstream call for this operation.
    ///
    /// `account_id` must be present when [`Operation::needs_account_id`] is true.
    pub fn http_call(&self, account_id: Option<&str>) -> Result<UpstreamCall> {
        let account =
            || -> Result<String> { Ok(format!("{ACCOUNTS_PATH}/{}", seg(require(account_id)?))) };

        let call = match self {
            Operation::ListAccounts => UpstreamCall::get(ACCOUNTS_PATH),
            Operation::CurrentAccount => UpstreamCall::get(account()?),

            Operation::ListZones => UpstreamCall::get("/zones"),
            Operation::CreateZone(zone) => UpstreamCall::post("/zones").with_json(json!({
                "name": zone.name,
                "account": { "id": require(account_id)? },
                "jump_start": zone.jump_start,
                "type": "full",
            })),
            Operation::GetZone { zone_id } => UpstreamCall::get(format!("/zones/{}", seg(zone_id))),
            Operation::DeleteZone { zone_id } => {
                UpstreamCall::delete(format!("/zones/{}", seg(zone_id)))
            }
            Operation::PurgeCache { zone_id, purge } => {
                UpstreamCall::post(format!("/zones/{}/purge_cache", seg(zone_id)))
                    .with_json(purge.to_payload())
            }

            Operation::ListDnsRecords { zone_id, record_type } => {
                UpstreamCall::get(format!("/zones/{}/dns_records", seg(zone_id)))
                    .with_query("type", record_type.map(DnsRecordType::as_str))
            }
            Operation::CreateDnsRecord { zone_id, record } => {
                UpstreamCall::post(format!("/zones/{}/dns_records", seg(zone_id)))
                    .with_json(record.to_payload())
            }
            Operation::UpdateDnsRecord { zone_id, record_id, record } => UpstreamCall::put(format!(
                "/zones/{}/dns_records/{}",
                seg(zone_id),
                seg(record_id)
            ))
            .with_json(record.to_payload()),
            Operation::DeleteDnsRecord { zone_id, record_id } => UpstreamCall::delete(format!(
                "/zones/{}/dns_records/{}",
                seg(zone_id),
                seg(record_id)
            )),
            Operation::ExportDnsRecords { zone_id } => {
                UpstreamCall::get(format!("/zones/{}/dns_records/export", seg(zone_id)))
            }

            Operation::ListWorkers => {
                UpstreamCall::get(format!("{}/workers/scripts", account()?))
            }
            Operation::GetWorker { name } => {
                UpstreamCall::get(format!("{}/workers/scripts/{}", account()?, seg(name)))
            }
            Operation::DeployWorker(worker) => UpstreamCall::put(format!(
                "{}/workers/scripts/{}",
                account()?,
                seg(&worker.name)
            ))
            .with_raw(worker.script.clone(), SCRIPT_CONTENT_TYPE),
            Operation::DeleteWorker { name } => {
                UpstreamCall::delete(format!("{}/workers/scripts/{}", account()?, seg(name)))
            }
            Operation::ListWorkerRoutes { zone_id } => {
                UpstreamCall::get(format!("/zones/{}/workers/routes", seg(zone_id)))
            }
            Operation::CreateWorkerRoute { zone_id, route } => {
                UpstreamCall::post(format!("/zones/{}/workers/routes", seg(zone_id)))
                    .with_json(route.to_payload())
            }
            Operation::DeleteWorkerRoute { zone_id, route_id } => UpstreamCall::delete(format!(
                "/zones/{}/workers/routes/{}",
                seg(zone_id),
                seg(route_id)
            )),

            Operation::ListPagesProjects => {
                UpstreamCall::get(format!("{}/pages/projects", account()?))
            }
            Operation::CreatePagesProject(project) => {
                UpstreamCall::post(format!("{}/pages/projects", account()?))
                    .with_json(project.to_payload())
            }
            Operation::GetPagesProject { project } => {
                UpstreamCall::get(format!("{}/pages/projects/{}", account()?, seg(project)))
            }
            Operation::DeletePagesProject { project } => {
                UpstreamCall::delete(format!("{}/pages/projects/{}", account()?, seg(project)))
            }
            Operation::ListPagesDeployments { project } => UpstreamCall::get(format!(
                "{}/pages/projects/{}/deployments",
                account()?,
                seg(project)
            )),
            Operation::GetPagesDeployment { project, deployment_id } => UpstreamCall::get(format!(
                "{}/pages/projects/{}/deployments/{}",
                account()?,
                seg(project),
                seg(deployment_id)
            )),
            Operation::CreatePagesDeployment { project, upload } => UpstreamCall::post(format!(
                "{}/pages/projects/{}/deployments",
                account()?,
                seg(project)
            ))
            .with_multipart(upload.form_parts()),

            Operation::ListKvNamespaces => {
                UpstreamCall::get(format!("{}/storage/kv/namespaces", account()?))
            }
            Operation::CreateKvNamespace(namespace) => {
                UpstreamCall::post(format!("{}/storage/kv/namespaces", account()?))
                    .with_json(json!({ "title": namespace.title }))
            }
            Operation::RenameKvNamespace { namespace_id, title } => UpstreamCall::put(format!(
                "{}/storage/kv/namespaces/{}",
                account()?,
                seg(namespace_id)
            ))
            .with_json(json!({ "title": title })),
            Operation::DeleteKvNamespace { namespace_id } => UpstreamCall::delete(format!(
                "{}/storage/kv/namespaces/{}",
                account()?,
                seg(namespace_id)
            )),
            Operation::ListKvKeys { namespace_id, prefix } => UpstreamCall::get(format!(
                "{}/storage/kv/namespaces/{}/keys",
                account()?,
                seg(namespace_id)
            ))
            .with_query("prefix", prefix.clone()),
            Operation::GetKvValue { namespace_id, key } => UpstreamCall::get(format!(
                "{}/storage/kv/namespaces/{}/values/{}",
                account()?,
                seg(namespace_id),
                seg(key)
            )),
            Operation::PutKvValue { namespace_id, pair } => UpstreamCall::put(format!(
                "{}/storage/kv/namespaces/{}/values/{}",
                account()?,
                seg(namespace_id),
                seg(&pair.key)
            ))
            .with_raw(pair.value.clone(), KV_VALUE_CONTENT_TYPE),
            Operation::DeleteKvKey { namespace_id, key } => UpstreamCall::delete(format!(
                "{}/storage/kv/namespaces/{}/values/{}",
                account()?,
                seg(namespace_id),
                seg(key)
            )),

            Operation::ListR2Buckets => UpstreamCall::get(format!("{}/r2/buckets", account()?)),
            Operation::CreateR2Bucket(bucket) => {
                UpstreamCall::post(format!("{}/r2/buckets", account()?))
                    .with_json(bucket.to_payload())
            }
            Operation::GetR2Bucket { name } => {
                UpstreamCall::get(format!("{}/r2/buckets/{}", account()?, seg(name)))
            }
            Operation::DeleteR2Bucket { name } => {
                UpstreamCall::delete(format!("{}/r2/buckets/{}", account()?, seg(name)))
            }
        };

        Ok(call)
    }

    /// Argument vector for the command-line backend.
    ///
    /// `staged_script` is the path of the staged script for
    /// [`Operation::DeployWorker`]; other operations ignore it.
    pub fn cli_args(&self, staged_script: Option<&Path>) -> Result<Vec<String>> {
        let args: Vec<String> = match self {
            Operation::ListAccounts => argv(&["account", "list"]),
            Operation::CurrentAccount => argv(&["account", "info"]),

            Operation::ListZones => argv(&["zone", "list"]),
            Operation::CreateZone(zone) => argv(&["zone", "create", &zone.name]),
            Operation::GetZone { zone_id } => argv(&["zone", "info", zone_id]),
            Operation::DeleteZone { zone_id } => argv(&["zone", "delete", zone_id]),
            Operation::PurgeCache { zone_id, purge } => {
                let mut args = argv(&["zone", "purge", zone_id]);
                if purge.purges_everything() {
                    args.push("--everything".to_string());
                } else {
                    args.push("--files".to_string());
                    args.push(purge.files.join(","));
                }
                args
            }

            Operation::ListDnsRecords { zone_id, record_type } => {
                let mut args = argv(&["dns", "list", zone_id]);
                if let Some(record_type) = record_type {
                    args.extend(argv(&["--type", record_type.as_str()]));
                }
                args
            }
            Operation::CreateDnsRecord { zone_id, record } => {
                let ttl = record.ttl.to_string();
                let mut args = argv(&[
                    "dns",
                    "create",
                    zone_id,
                    record.record_type.as_str(),
                    &record.name,
                    &record.content,
                    "--ttl",
                    &ttl,
                ]);
                if record.proxied {
                    args.push("--proxied".to_string());
                }
                if let Some(priority) = record.effective_priority() {
                    args.extend(argv(&["--priority", &priority.to_string()]));
                }
                args
            }
            Operation::UpdateDnsRecord { zone_id, record_id, record } => {
                let ttl = record.ttl.to_string();
                let mut args = argv(&[
                    "dns",
                    "update",
                    zone_id,
                    record_id,
                    &record.content,
                    "--ttl",
                    &ttl,
                ]);
                if record.proxied {
                    args.push("--proxied".to_string());
                }
                args
            }
            Operation::DeleteDnsRecord { zone_id, record_id } => {
                argv(&["dns", "delete", zone_id, record_id])
            }
            Operation::ExportDnsRecords { zone_id } => argv(&["dns", "export", zone_id]),

            Operation::DeployWorker(worker) => {
                let path = staged_script.ok_or_else(|| {
                    GatewayError::InvalidInput("script must be staged before deploy".to_string())
                })?;
                let mut args = argv(&["worker", "deploy", &worker.name]);
                args.push(path.to_string_lossy().into_owned());
                args
            }
            Operation::DeleteWorker { name } => argv(&["worker", "delete", name]),
            Operation::ListWorkerRoutes { zone_id } => argv(&["worker", "route", "list", zone_id]),
            Operation::CreateWorkerRoute { zone_id, route } => argv(&[
                "worker",
                "route",
                "create",
                zone_id,
                &route.pattern,
                &route.worker_name,
            ]),
            Operation::DeleteWorkerRoute { zone_id, route_id } => {
                argv(&["worker", "route", "delete", zone_id, route_id])
            }

            Operation::ListPagesProjects => argv(&["pages", "list"]),
            Operation::GetPagesProject { project } => argv(&["pages", "info", project]),
            Operation::DeletePagesProject { project } => argv(&["pages", "delete", project]),
            Operation::ListPagesDeployments { project } => {
                argv(&["pages", "deployment", "list", project])
            }
            Operation::GetPagesDeployment { project, deployment_id } => {
                argv(&["pages", "deployment", "info", project, deployment_id])
            }

            Operation::ListKvNamespaces => argv(&["kv", "namespace", "list"]),
            Operation::CreateKvNamespace(namespace) => {
                argv(&["kv", "namespace", "create", &namespace.title])
            }
            Operation::RenameKvNamespace { namespace_id, title } => {
                argv(&["kv", "namespace", "rename", namespace_id, title])
            }
            Operation::DeleteKvNamespace { namespace_id } => {
                argv(&["kv", "namespace", "delete", namespace_id])
            }
            Operation::ListKvKeys { namespace_id, prefix } => {
                let mut args = argv(&["kv", "key", "list", namespace_id]);
                if let Some(prefix) = prefix {
                    args.extend(argv(&["--prefix", prefix]));
                }
                args
            }
            Operation::GetKvValue { namespace_id, key } => {
                argv(&["kv", "key", "get", namespace_id, key])
            }
            Operation::PutKvValue { namespace_id, pair } => {
                argv(&["kv", "key", "put", namespace_id, &pair.key, &pair.value])
            }
            Operation::DeleteKvKey { namespace_id, key } => {
                argv(&["kv", "key", "delete", namespace_id, key])
            }

            Operation::ListR2Buckets => argv(&["r2", "list"]),
            Operation::CreateR2Bucket(bucket) => {
                argv(&["r2", "create", &bucket.name, "--location", bucket.location()])
            }
            Operation::GetR2Bucket { name } => argv(&["r2", "info", name]),
            Operation::DeleteR2Bucket { name } => argv(&["r2", "delete", name]),

            Operation::ListWorkers
            | Operation::GetWorker { .. }
            | Operation::CreatePagesProject(_)
            | Operation::CreatePagesDeployment { .. } => {
                return Err(GatewayError::Unsupported(format!(
                    "{} is not available with the command-line backend",
                    self.name()
                )));
            }
        };

        Ok(args)
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}
