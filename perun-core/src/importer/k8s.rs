use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use k8s_openapi::api::core::v1::{ConfigMap, Secret, Service as K8sService};
use kube::api::ListParams;
use kube::{Api, Client, Config};
use tracing::{instrument, warn};

use crate::manifest::{
    Config as MountConfig, EnVar, Environment, EnvironmentStatus, Mount, Port, RunConfig, Service,
    ServiceStatus, Target,
};

use super::pod_select::select_pod;
use super::ImportError;

/// Parameters for `import --type k8s` (spec §4.3). Empty `server`/`token`/
/// `ca_base64` means "load default kubeconfig from user home".
#[derive(Debug, Clone, Default)]
pub struct K8sImportRequest {
    pub workspace: String,
    pub cluster: String,
    pub namespace: String,
    pub server: Option<String>,
    pub token: Option<String>,
    pub ca_base64: Option<String>,
    pub exclude: Vec<String>,
}

#[instrument(skip(request))]
pub async fn import_k8s_environment(request: &K8sImportRequest) -> Result<Environment, ImportError> {
    let client = build_client(request).await?;

    // Reachability probe (spec §4.3 step 1): fail fast with ClusterUnreachable.
    client
        .apiserver_version()
        .await
        .map_err(|e| ImportError::ClusterUnreachable(e.to_string()))?;

    let configmaps: Api<ConfigMap> = Api::namespaced(client.clone(), &request.namespace);
    let cm_index = index_configmaps(&configmaps).await?;

    let services_api: Api<K8sService> = Api::namespaced(client.clone(), &request.namespace);
    let pods_api: Api<k8s_openapi::api::core::v1::Pod> = Api::namespaced(client.clone(), &request.namespace);
    let secrets_api: Api<Secret> = Api::namespaced(client.clone(), &request.namespace);

    let k8s_services = services_api.list(&ListParams::default()).await?;

    let mut services = HashMap::new();
    for svc in k8s_services.items {
        let Some(name) = svc.metadata.name.clone() else {
            continue;
        };
        if request.exclude.contains(&name) {
            continue;
        }

        match import_one_service(&svc, &pods_api, &secrets_api, &cm_index).await {
            Ok(Some(service)) => {
                services.insert(service.name.clone(), service);
            }
            Ok(None) => {
                warn!(service = %name, "no pods matched selector, skipping");
            }
            Err(e) => {
                warn!(service = %name, error = %e, "skipping service due to import error");
            }
        }
    }

    Ok(Environment {
        name: request.cluster.clone(),
        description: String::new(),
        workspace: request.workspace.clone(),
        target: Target::kubernetes(request.cluster.clone(), request.namespace.clone()),
        services,
        status: EnvironmentStatus::Inactive,
        registry: None,
    })
}

async fn build_client(request: &K8sImportRequest) -> Result<Client, ImportError> {
    if let (Some(server), Some(token)) = (&request.server, &request.token) {
        let mut config = Config::new(server.parse().map_err(|e| {
            ImportError::ClusterUnreachable(format!("invalid server url: {e}"))
        })?);
        config.default_namespace = request.namespace.clone();
        config.auth_info.token = Some(token.clone().into());
        if let Some(ca) = &request.ca_base64 {
            let decoded = STANDARD
                .decode(ca)
                .map_err(|e| ImportError::ClusterUnreachable(format!("invalid ca: {e}")))?;
            config.root_cert = Some(vec![decoded]);
        }
        Client::try_from(config).map_err(ImportError::from)
    } else {
        Client::try_default().await.map_err(ImportError::from)
    }
}

async fn index_configmaps(api: &Api<ConfigMap>) -> Result<HashMap<String, HashMap<String, String>>, ImportError> {
    let list = api.list(&ListParams::default()).await?;
    let mut index = HashMap::new();
    for cm in list.items {
        let Some(name) = cm.metadata.name else { continue };
        index.insert(name, cm.data.unwrap_or_default().into_iter().collect());
    }
    Ok(index)
}

async fn import_one_service(
    svc: &K8sService,
    pods_api: &Api<k8s_openapi::api::core::v1::Pod>,
    secrets_api: &Api<Secret>,
    cm_index: &HashMap<String, HashMap<String, String>>,
) -> Result<Option<Service>, ImportError> {
    let name = svc.metadata.name.clone().unwrap_or_default();
    let selector = svc
        .spec
        .as_ref()
        .and_then(|s| s.selector.as_ref())
        .cloned()
        .unwrap_or_default();

    if selector.is_empty() {
        return Ok(None);
    }

    let label_selector = selector
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",");
    let pods = pods_api
        .list(&ListParams::default().labels(&label_selector))
        .await?;

    let Some(pod) = select_pod(&pods.items) else {
        return Ok(None);
    };

    let Some(container) = pod
        .spec
        .as_ref()
        .and_then(|s| s.containers.first())
    else {
        return Ok(None);
    };

    let mut service = Service::new(name);
    service.service_type = "docker".to_string();
    service.status = ServiceStatus::Inactive;
    service
        .params
        .insert("image".to_string(), container.image.clone().unwrap_or_default());

    if let Some(ports) = svc.spec.as_ref().and_then(|s| s.ports.as_ref()) {
        for p in ports {
            service.run.ports.push(Port {
                port: p.target_port.as_ref().map(target_port_str).unwrap_or_else(|| p.port.to_string()),
                host_port: String::new(),
                exposed: true,
            });
        }
    }

    service.run.cmd = container
        .command
        .clone()
        .map(|c| c.join(" "))
        .unwrap_or_default();
    service.run.args = container.args.clone().unwrap_or_default();

    import_volumes(pod, container, cm_index, &mut service)?;
    import_env(container, cm_index, secrets_api, &mut service).await?;

    Ok(Some(service))
}

fn target_port_str(tp: &k8s_openapi::apimachinery::pkg::util::intstr::IntOrString) -> String {
    match tp {
        k8s_openapi::apimachinery::pkg::util::intstr::IntOrString::Int(i) => i.to_string(),
        k8s_openapi::apimachinery::pkg::util::intstr::IntOrString::String(s) => s.clone(),
    }
}

fn import_volumes(
    pod: &k8s_openapi::api::core::v1::Pod,
    container: &k8s_openapi::api::core::v1::Container,
    cm_index: &HashMap<String, HashMap<String, String>>,
    service: &mut Service,
) -> Result<(), ImportError> {
    let volumes = pod.spec.as_ref().map(|s| s.volumes.clone().unwrap_or_default()).unwrap_or_default();
    let cm_by_volume: HashMap<String, String> = volumes
        .into_iter()
        .filter_map(|v| {
            v.config_map
                .and_then(|cm| cm.name)
                .map(|cm_name| (v.name, cm_name))
        })
        .collect();

    for vm in container.volume_mounts.clone().unwrap_or_default() {
        let Some(cm_name) = cm_by_volume.get(&vm.name) else {
            continue;
        };
        let Some(data) = cm_index.get(cm_name) else {
            continue;
        };
        let configs = data
            .iter()
            .map(|(k, v)| MountConfig {
                config_name: k.clone(),
                content: v.clone(),
            })
            .collect();
        service.run.mounts.insert(
            vm.name.clone(),
            Mount {
                name: vm.name.clone(),
                source_path: String::new(),
                path: vm.mount_path.clone(),
                configs,
            },
        );
    }
    Ok(())
}

async fn import_env(
    container: &k8s_openapi::api::core::v1::Container,
    cm_index: &HashMap<String, HashMap<String, String>>,
    secrets_api: &Api<Secret>,
    service: &mut Service,
) -> Result<(), ImportError> {
    for env_from in container.env_from.clone().unwrap_or_default() {
        if let Some(cm_ref) = env_from.config_map_ref {
            if let Some(data) = cm_ref.name.as_ref().and_then(|n| cm_index.get(n)) {
                for (k, v) in data {
                    service.run.en_vars.push(EnVar {
                        key: k.clone(),
                        value: v.clone(),
                    });
                }
            }
        }
    }

    for env_var in container.env.clone().unwrap_or_default() {
        if let Some(value) = env_var.value {
            service.run.en_vars.push(EnVar {
                key: env_var.name,
                value,
            });
            continue;
        }
        let Some(value_from) = env_var.value_from else {
            continue;
        };
        if let Some(cm_ref) = value_from.config_map_key_ref {
            let resolved = cm_ref
                .name
                .as_ref()
                .and_then(|n| cm_index.get(n))
                .and_then(|data| data.get(&cm_ref.key));
            match resolved {
                Some(value) => service.run.en_vars.push(EnVar {
                    key: env_var.name,
                    value: value.clone(),
                }),
                None => warn!(key = %env_var.name, "unresolvable configMapKeyRef, skipping"),
            }
        } else if let Some(secret_ref) = value_from.secret_key_ref {
            let Some(secret_name) = secret_ref.name.as_ref() else {
                continue;
            };
            match secrets_api.get_opt(secret_name).await? {
                Some(secret) => {
                    let decoded = secret
                        .data
                        .as_ref()
                        .and_then(|d| d.get(&secret_ref.key))
                        .map(|b| String::from_utf8_lossy(&b.0).to_string());
                    match decoded {
                        Some(value) => service.run.en_vars.push(EnVar {
                            key: env_var.name,
                            value,
                        }),
                        None => warn!(key = %env_var.name, "unresolvable secretKeyRef, skipping"),
                    }
                }
                None => warn!(key = %env_var.name, secret = %secret_name, "secret not found, skipping"),
            }
        }
    }
    Ok(())
}
