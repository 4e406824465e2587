//! Live cluster source backed by the Kubernetes API and metrics-server

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use k8s_openapi::api::core::v1::{Node, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::{
    api::{Api, ListParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use serde::Deserialize;

use super::{async_trait, SnapshotSource, SourceError};
use crate::models::{
    ClusterSnapshot, ContainerResources, NodeInventoryItem, PodInventoryItem, PodUsage,
    UsageSample,
};
use crate::observability::StructuredLogger;
use crate::quantity::{parse_cpu, parse_memory};

const NODE_METRICS_PATH: &str = "/apis/metrics.k8s.io/v1beta1/nodes";
const POD_METRICS_PATH: &str = "/apis/metrics.k8s.io/v1beta1/pods";

/// List envelope returned by the metrics API
#[derive(Debug, Deserialize)]
pub struct MetricsList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetricsMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

/// `metrics.k8s.io/v1beta1` NodeMetrics item
#[derive(Debug, Deserialize)]
pub struct NodeMetrics {
    pub metadata: MetricsMetadata,
    #[serde(default)]
    pub usage: UsageSample,
}

#[derive(Debug, Deserialize)]
pub struct ContainerMetrics {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub usage: UsageSample,
}

/// `metrics.k8s.io/v1beta1` PodMetrics item
#[derive(Debug, Deserialize)]
pub struct PodMetrics {
    pub metadata: MetricsMetadata,
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

/// Reads nodes, pods and current usage from a live cluster
#[derive(Clone)]
pub struct KubeSnapshotSource {
    client: Client,
    timeout: Duration,
    context: Option<String>,
    logger: StructuredLogger,
}

impl KubeSnapshotSource {
    /// Connect using an explicit kubeconfig and/or context, falling back to
    /// the usual inference (KUBECONFIG, ~/.kube/config, in-cluster).
    pub async fn connect(
        kubeconfig: Option<&Path>,
        context: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..Default::default()
        };

        let config = match (kubeconfig, context) {
            (Some(path), _) => {
                let kubeconfig = Kubeconfig::read_from(path)
                    .map_err(|e| SourceError::KubeConfig(e.to_string()))?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| SourceError::KubeConfig(e.to_string()))?
            }
            (None, Some(_)) => Config::from_kubeconfig(&options)
                .await
                .map_err(|e| SourceError::KubeConfig(e.to_string()))?,
            (None, None) => Config::infer()
                .await
                .map_err(|e| SourceError::KubeConfig(e.to_string()))?,
        };

        let client = Client::try_from(config)?;
        Ok(Self::with_client(client, timeout, context.map(str::to_string)))
    }

    pub fn with_client(client: Client, timeout: Duration, context: Option<String>) -> Self {
        let label = context.as_deref().unwrap_or("current-context");
        Self {
            logger: StructuredLogger::new(format!("cluster:{}", label)),
            client,
            timeout,
            context,
        }
    }

    async fn bounded<T, F>(&self, what: &'static str, fut: F) -> Result<T, SourceError>
    where
        F: Future<Output = Result<T, SourceError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| SourceError::Timeout {
                what,
                secs: self.timeout.as_secs(),
            })?
    }

    async fn list_nodes(&self) -> Result<Vec<NodeInventoryItem>, SourceError> {
        let api: Api<Node> = Api::all(self.client.clone());
        let nodes = self
            .bounded("listing nodes", async {
                api.list(&ListParams::default()).await.map_err(SourceError::from)
            })
            .await?;
        Ok(nodes.items.into_iter().map(node_to_inventory).collect())
    }

    async fn list_pods(&self) -> Result<Vec<PodInventoryItem>, SourceError> {
        let api: Api<Pod> = Api::all(self.client.clone());
        let pods = self
            .bounded("listing pods", async {
                api.list(&ListParams::default()).await.map_err(SourceError::from)
            })
            .await?;
        Ok(pods.items.into_iter().map(pod_to_inventory).collect())
    }

    /// Raw GET against the metrics API, which has no typed client
    async fn get_metrics<T>(&self, path: &str) -> Result<Vec<T>, SourceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = http::Request::builder()
            .method("GET")
            .uri(path)
            .body(Vec::new())
            .map_err(|e| SourceError::Request(format!("Failed to build request: {}", e)))?;

        let list = self
            .bounded("querying metrics-server", async {
                self.client
                    .request::<MetricsList<T>>(request)
                    .await
                    .map_err(SourceError::from)
            })
            .await?;
        Ok(list.items)
    }

    async fn node_usage(&self) -> BTreeMap<String, UsageSample> {
        let items = self.get_metrics::<NodeMetrics>(NODE_METRICS_PATH).await;
        or_empty(&self.logger, "node usage", items)
            .into_iter()
            .filter(|m| !m.metadata.name.is_empty())
            .map(|m| (m.metadata.name, m.usage))
            .collect()
    }

    async fn pod_usage(&self) -> Vec<PodUsage> {
        let items = self.get_metrics::<PodMetrics>(POD_METRICS_PATH).await;
        or_empty(&self.logger, "pod usage", items)
            .into_iter()
            .map(pod_usage_from_metrics)
            .collect()
    }
}

/// Pods and usage are optional inputs: a failed call is logged and the
/// analysis continues with nothing for `kind`
pub fn or_empty<T: Default>(
    logger: &StructuredLogger,
    kind: &str,
    result: Result<T, SourceError>,
) -> T {
    result.unwrap_or_else(|e| {
        logger.log_source_unavailable(kind, &e.to_string());
        T::default()
    })
}

#[async_trait]
impl SnapshotSource for KubeSnapshotSource {
    async fn fetch(&self) -> Result<ClusterSnapshot, SourceError> {
        let nodes = self.list_nodes().await?;
        let pods = or_empty(&self.logger, "pods", self.list_pods().await);
        let node_usage = self.node_usage().await;
        let pod_usage = self.pod_usage().await;

        self.logger.log_snapshot_loaded(nodes.len(), pods.len(), pod_usage.len());

        Ok(ClusterSnapshot {
            captured_at: Some(Utc::now()),
            nodes,
            node_usage,
            pods,
            pod_usage,
        })
    }

    fn describe(&self) -> String {
        match &self.context {
            Some(context) => format!("cluster:{}", context),
            None => "cluster:current-context".to_string(),
        }
    }
}

pub fn node_to_inventory(node: Node) -> NodeInventoryItem {
    let allocatable = node
        .status
        .and_then(|s| s.allocatable)
        .unwrap_or_default()
        .into_iter()
        .map(|(resource, quantity)| (resource, quantity.0))
        .collect();

    NodeInventoryItem {
        name: node.metadata.name,
        labels: node.metadata.labels.unwrap_or_default(),
        allocatable,
    }
}

pub fn pod_to_inventory(pod: Pod) -> PodInventoryItem {
    let containers = pod
        .spec
        .map(|spec| spec.containers)
        .unwrap_or_default()
        .into_iter()
        .map(|container| {
            let resources = container.resources.unwrap_or_default();
            let memory = |quantities: Option<&BTreeMap<String, Quantity>>| {
                quantities.and_then(|q| q.get("memory")).map(|q| q.0.clone())
            };
            ContainerResources {
                name: Some(container.name),
                requests_memory: memory(resources.requests.as_ref()),
                limits_memory: memory(resources.limits.as_ref()),
            }
        })
        .collect();

    PodInventoryItem {
        namespace: pod.metadata.namespace.unwrap_or_default(),
        name: pod.metadata.name,
        phase: pod.status.and_then(|s| s.phase),
        containers,
    }
}

/// Collapse per-container usage into one pod sample (`"<n>m"`, `"<n>Mi"`)
pub fn pod_usage_from_metrics(metrics: PodMetrics) -> PodUsage {
    let cpu_cores: f64 = metrics
        .containers
        .iter()
        .map(|c| parse_cpu(&c.usage.cpu))
        .sum();
    let memory_mi: f64 = metrics
        .containers
        .iter()
        .map(|c| parse_memory(&c.usage.memory))
        .sum();

    PodUsage {
        namespace: metrics.metadata.namespace,
        name: metrics.metadata.name,
        usage: UsageSample::new(
            format!("{}m", (cpu_cores * 1000.0).round()),
            format!("{}Mi", memory_mi),
        ),
    }
}
