use std::time::Duration;

use chord_ring::Stabilizer;

mod common;
use common::{build_network, expected_successor};

#[tokio::test]
async fn fix_fingers_is_idempotent() {
    let ids = [2, 9, 17, 30, 44, 58];
    let network = build_network(6, &ids).await;

    network.stabilize_all().await;
    let first = network.export().await;
    network.stabilize_all().await;
    let second = network.export().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn stabilization_repairs_stale_fingers() {
    // joins only rebuild the joining member's table, so earlier members go
    // stale; one full walk makes every entry exact again
    let ids = [0, 5, 11, 23, 34, 47, 59];
    let network = build_network(6, &ids).await;

    network.stabilize_all().await;

    let live = network.member_ids().await;
    for export in network.export().await {
        for finger in &export.fingers {
            assert_eq!(
                finger.node,
                expected_successor(&live, finger.start),
                "node {} finger at {}",
                export.id,
                finger.start
            );
        }
    }
}

#[tokio::test]
async fn deletes_trigger_a_full_repair() {
    let ids = [4, 12, 20, 33, 47, 55];
    let network = build_network(6, &ids).await;

    network.delete_node(20).await.expect("delete failed");
    network.delete_node(47).await.expect("delete failed");

    let live = network.member_ids().await;
    assert_eq!(live, vec![4, 12, 33, 55]);
    for export in network.export().await {
        for finger in &export.fingers {
            assert_eq!(finger.node, expected_successor(&live, finger.start));
        }
    }
}

#[tokio::test]
async fn periodic_stabilizer_repairs_and_stops_cleanly() {
    let ids = [1, 14, 27, 39, 52, 61];
    let network = build_network(6, &ids).await;

    let stabilizer = Stabilizer::spawn(network.clone(), Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(120)).await;
    stabilizer.shutdown().await;

    let live = network.member_ids().await;
    for export in network.export().await {
        for finger in &export.fingers {
            assert_eq!(
                finger.node,
                expected_successor(&live, finger.start),
                "node {} finger at {}",
                export.id,
                finger.start
            );
        }
    }
}
