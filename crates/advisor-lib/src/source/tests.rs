//! Tests for snapshot sources
//!
//! File round trips use a temporary directory; the cluster conversions are
//! exercised with hand-built API objects so no cluster is needed.

#[cfg(test)]
mod file_source_tests {
    use crate::models::{ClusterSnapshot, NodeInventoryItem, PodUsage, UsageSample};
    use crate::source::{write_snapshot, FileSnapshotSource, SnapshotSource, SourceError};
    use tempfile::TempDir;
    use tokio::fs;

    #[tokio::test]
    async fn test_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snapshot.json");

        let mut node = NodeInventoryItem {
            name: Some("gke-apps-1".to_string()),
            ..Default::default()
        };
        node.allocatable.insert("cpu".to_string(), "3920m".to_string());
        node.allocatable.insert("memory".to_string(), "13Gi".to_string());

        let mut snapshot = ClusterSnapshot {
            captured_at: Some(chrono::Utc::now()),
            nodes: vec![node],
            ..Default::default()
        };
        snapshot
            .node_usage
            .insert("gke-apps-1".to_string(), UsageSample::new("1200m", "8Gi"));
        snapshot.pod_usage.push(PodUsage {
            namespace: "app".to_string(),
            name: "api-1".to_string(),
            usage: UsageSample::new("15m", "300Mi"),
        });

        write_snapshot(&path, &snapshot).await.unwrap();
        let loaded = FileSnapshotSource::new(&path).fetch().await.unwrap();

        assert_eq!(loaded.captured_at, snapshot.captured_at);
        assert_eq!(loaded.nodes.len(), 1);
        assert_eq!(loaded.nodes[0].allocatable["memory"], "13Gi");
        assert_eq!(loaded.node_usage["gke-apps-1"].cpu, "1200m");
        assert_eq!(loaded.pod_usage, snapshot.pod_usage);
    }

    #[tokio::test]
    async fn test_pod_usage_is_flat_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snapshot.json");
        fs::write(
            &path,
            r#"{"pod_usage": [{"namespace": "app", "name": "api-1", "cpu": "15m", "memory": "300Mi"}]}"#,
        )
        .await
        .unwrap();

        let loaded = FileSnapshotSource::new(&path).fetch().await.unwrap();
        assert!(loaded.captured_at.is_none());
        assert!(loaded.nodes.is_empty());
        assert_eq!(loaded.pod_usage[0].usage, UsageSample::new("15m", "300Mi"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileSnapshotSource::new(temp_dir.path().join("absent.json"));

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").await.unwrap();

        let err = FileSnapshotSource::new(&path).fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
    }

    #[test]
    fn test_describe() {
        let source = FileSnapshotSource::new("/tmp/snap.json");
        assert_eq!(source.describe(), "file:/tmp/snap.json");
    }
}

#[cfg(test)]
mod cluster_conversion_tests {
    use std::collections::BTreeMap;

    use k8s_openapi::api::core::v1::{
        Container, Node, NodeStatus, Pod, PodSpec, PodStatus, ResourceRequirements,
    };
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use crate::models::PodInventoryItem;
    use crate::observability::StructuredLogger;
    use crate::source::{
        node_to_inventory, or_empty, pod_to_inventory, pod_usage_from_metrics, MetricsList,
        NodeMetrics, PodMetrics, SourceError,
    };

    fn quantities(entries: &[(&str, &str)]) -> BTreeMap<String, Quantity> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
            .collect()
    }

    #[test]
    fn test_node_to_inventory() {
        let mut labels = BTreeMap::new();
        labels.insert(
            "cloud.google.com/gke-nodepool".to_string(),
            "apps".to_string(),
        );
        let node = Node {
            metadata: ObjectMeta {
                name: Some("gke-apps-1".to_string()),
                labels: Some(labels),
                ..Default::default()
            },
            status: Some(NodeStatus {
                allocatable: Some(quantities(&[("cpu", "3920m"), ("memory", "13Gi")])),
                ..Default::default()
            }),
            ..Default::default()
        };

        let item = node_to_inventory(node);
        assert_eq!(item.name.as_deref(), Some("gke-apps-1"));
        assert_eq!(item.labels["cloud.google.com/gke-nodepool"], "apps");
        assert_eq!(item.allocatable["cpu"], "3920m");
        assert_eq!(item.allocatable["memory"], "13Gi");
    }

    #[test]
    fn test_node_without_status() {
        let item = node_to_inventory(Node::default());
        assert!(item.name.is_none());
        assert!(item.labels.is_empty());
        assert!(item.allocatable.is_empty());
    }

    #[test]
    fn test_pod_to_inventory() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("api-1".to_string()),
                namespace: Some("app".to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![
                    Container {
                        name: "api".to_string(),
                        resources: Some(ResourceRequirements {
                            requests: Some(quantities(&[("cpu", "100m"), ("memory", "256Mi")])),
                            limits: Some(quantities(&[("memory", "512Mi")])),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                    Container {
                        name: "sidecar".to_string(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                ..Default::default()
            }),
        };

        let item = pod_to_inventory(pod);
        assert_eq!(item.namespace, "app");
        assert_eq!(item.name.as_deref(), Some("api-1"));
        assert_eq!(item.phase.as_deref(), Some("Running"));
        assert_eq!(item.containers.len(), 2);
        assert_eq!(item.containers[0].requests_memory.as_deref(), Some("256Mi"));
        assert_eq!(item.containers[0].limits_memory.as_deref(), Some("512Mi"));
        assert!(item.containers[1].requests_memory.is_none());
        assert!(item.containers[1].limits_memory.is_none());
    }

    #[test]
    fn test_pod_usage_sums_containers() {
        let metrics: PodMetrics = serde_json::from_str(
            r#"{
                "metadata": {"name": "api-1", "namespace": "app"},
                "timestamp": "2026-01-01T00:00:00Z",
                "window": "30s",
                "containers": [
                    {"name": "api", "usage": {"cpu": "12000000n", "memory": "262144Ki"}},
                    {"name": "sidecar", "usage": {"cpu": "3m", "memory": "44Mi"}}
                ]
            }"#,
        )
        .unwrap();

        let usage = pod_usage_from_metrics(metrics);
        assert_eq!(usage.namespace, "app");
        assert_eq!(usage.name, "api-1");
        // 12m plus 3m, rounded to whole millicores
        assert_eq!(usage.usage.cpu, "15m");
        assert_eq!(usage.usage.memory, "300Mi");
    }

    #[test]
    fn test_metrics_list_without_items() {
        let list: MetricsList<NodeMetrics> = serde_json::from_str(
            r#"{"kind": "NodeMetricsList", "apiVersion": "metrics.k8s.io/v1beta1"}"#,
        )
        .unwrap();
        assert!(list.items.is_empty());

        let list: MetricsList<NodeMetrics> = serde_json::from_str(
            r#"{"items": [{"metadata": {"name": "gke-apps-1"}, "usage": {"cpu": "250m", "memory": "2Gi"}}]}"#,
        )
        .unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].metadata.name, "gke-apps-1");
        assert_eq!(list.items[0].usage.memory, "2Gi");
    }

    #[test]
    fn test_failed_pod_listing_continues_empty() {
        let logger = StructuredLogger::new("cluster:test");
        let failed: Result<Vec<PodInventoryItem>, SourceError> = Err(SourceError::Timeout {
            what: "listing pods",
            secs: 30,
        });
        assert!(or_empty(&logger, "pods", failed).is_empty());

        let listed: Result<Vec<PodInventoryItem>, SourceError> =
            Ok(vec![PodInventoryItem::default()]);
        assert_eq!(or_empty(&logger, "pods", listed).len(), 1);
    }
}
