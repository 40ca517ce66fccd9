mod common;

use common::{start_mock_backend, unreachable_url};
use scorelb_core::{BalancerConfig, NodeConfig, Options};
use scorelb_loadbalance::{Balancer, LbError, UpdateOp};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

fn node_config(uri: String) -> NodeConfig {
    let mut metrics = BTreeMap::new();
    metrics.insert("memory".to_string(), 5);
    NodeConfig { uri, metrics }
}

#[tokio::test]
async fn test_balancer_selects_least_loaded_backend() {
    let a = start_mock_backend(200, r#"{"memory": 2}"#).await;
    let b = start_mock_backend(200, r#"{"memory": 1}"#).await;
    let config = BalancerConfig {
        options: Options {
            cache_optimal_node: true,
            route: "/metrics".to_string(),
            ..Options::default()
        },
        nodes: vec![node_config(a.url()), node_config(b.url())],
        ..BalancerConfig::default()
    };

    let balancer = Balancer::from_config(&config).unwrap();
    balancer.refresh_once().await;

    let optimal = balancer.select_optimal(true).unwrap();
    assert_eq!(optimal.endpoint(), b.url());
    assert_eq!(optimal.score(), 5.0);
    assert_eq!(a.requests()[0].path, "/metrics");
}

#[tokio::test]
async fn test_cached_node_survives_backend_failure() {
    let a = start_mock_backend(200, r#"{"memory": 2}"#).await;
    let b = start_mock_backend(200, r#"{"memory": 1}"#).await;
    let config = BalancerConfig {
        options: Options {
            cache_optimal_node: true,
            ..Options::default()
        },
        nodes: vec![node_config(a.url()), node_config(b.url())],
        ..BalancerConfig::default()
    };
    let balancer = Balancer::from_config(&config).unwrap();
    balancer.refresh_once().await;

    b.respond(503, "unavailable");
    balancer.refresh_once().await;

    let cached = balancer.select_optimal(true).unwrap();
    assert_eq!(cached.endpoint(), b.url());
    assert_eq!(cached.last_status(), 503);
}

#[tokio::test]
async fn test_unreachable_backend_does_not_block_others() {
    let dead = unreachable_url().await;
    let live = start_mock_backend(200, r#"{"memory": 4}"#).await;
    let config = BalancerConfig {
        nodes: vec![node_config(dead.clone()), node_config(live.url())],
        ..BalancerConfig::default()
    };
    let balancer = Balancer::from_config(&config).unwrap();
    let mut updates = balancer.subscribe();

    balancer.refresh_once().await;

    let first = updates.recv().await.unwrap();
    assert_eq!(first.endpoint(), dead);
    assert_eq!(first.op, UpdateOp::Unavailable);
    let second = updates.recv().await.unwrap();
    assert_eq!(second.endpoint(), live.url());
    assert_eq!(second.op, UpdateOp::Available);

    assert_eq!(balancer.select_optimal(true).unwrap().endpoint(), live.url());

    let snapshots = balancer.snapshots();
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots[0].error);
    assert_eq!(snapshots[1].score, 20.0);
}

#[tokio::test]
async fn test_probe_node_by_endpoint() {
    let backend = start_mock_backend(200, r#"{"memory": 1}"#).await;
    let balancer =
        Balancer::new(vec![node_config(backend.url()).to_node()], Options::default()).unwrap();

    balancer.probe_node(&backend.url()).await.unwrap();
    assert_eq!(balancer.nodes()[0].last_status(), 200);

    let err = balancer.probe_node("http://127.0.0.1:1").await.unwrap_err();
    assert!(matches!(err, LbError::NilNode(_)));
}

#[tokio::test]
async fn test_empty_balancer_selects_nothing() {
    let balancer = Balancer::empty(Options::default()).unwrap();
    balancer.refresh_once().await;

    assert!(balancer.nodes().is_empty());
    assert!(balancer.select_optimal(false).is_none());
}

#[tokio::test]
async fn test_background_watch_tracks_backend_changes() {
    let a = start_mock_backend(200, r#"{"memory": 1}"#).await;
    let b = start_mock_backend(200, r#"{"memory": 3}"#).await;
    let config = BalancerConfig {
        nodes: vec![node_config(a.url()), node_config(b.url())],
        ..BalancerConfig::default()
    };
    let balancer = Arc::new(Balancer::from_config(&config).unwrap());
    let handle = balancer.spawn_watch(Duration::from_millis(20));

    tokio::time::timeout(Duration::from_secs(5), async {
        while balancer.select_optimal(true).map(|n| n.endpoint().to_string()) != Some(a.url()) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    a.respond(200, r#"{"memory": 10}"#);

    tokio::time::timeout(Duration::from_secs(5), async {
        while balancer.select_optimal(true).map(|n| n.endpoint().to_string()) != Some(b.url()) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    handle.shutdown().await;
}
