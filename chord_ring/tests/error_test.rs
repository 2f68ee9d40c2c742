use chord_ring::{IdentifierSpace, Network, NetworkError};

mod common;
use common::build_network;

#[tokio::test]
async fn out_of_range_ids_are_rejected() {
    let network = build_network(3, &[0, 3, 5]).await;
    let error = network
        .insert_node(8)
        .await
        .expect_err("id 8 exceeds the ring");
    assert_eq!(error, NetworkError::InvalidNodeId { id: 8, capacity: 8 });
    assert_eq!(network.member_ids().await, vec![0, 3, 5]);
}

#[tokio::test]
async fn duplicate_ids_are_rejected() {
    let network = build_network(3, &[0, 3]).await;
    let error = network.insert_node(3).await.expect_err("id 3 is taken");
    assert!(matches!(error, NetworkError::InvalidNodeId { id: 3, .. }));
    assert_eq!(network.member_ids().await, vec![0, 3]);
}

#[tokio::test]
async fn deleting_an_unknown_node_reports_not_found() {
    let network = build_network(3, &[0, 3]).await;
    let error = network
        .delete_node(6)
        .await
        .expect_err("id 6 is not a member");
    assert_eq!(error, NetworkError::NodeNotFound(6));
    assert_eq!(network.member_ids().await, vec![0, 3]);
}

#[tokio::test]
async fn missing_data_reports_not_found() {
    let network = build_network(3, &[0, 3, 5]).await;
    let error = network
        .find_data("chord")
        .await
        .expect_err("nothing stored yet");
    assert_eq!(
        error,
        NetworkError::DataNotFound {
            key: "chord".to_string(),
            id: 2,
        }
    );
}

#[tokio::test]
async fn an_emptied_ring_fails_fast_and_can_reseed() {
    let network = Network::new(3, 2).await.expect("bootstrap failed");
    network.delete_node(2).await.expect("delete failed");

    assert_eq!(network.summary().await.live, 0);
    assert_eq!(network.anchor_id().await, None);
    assert_eq!(
        network.find_data("chord").await.expect_err("ring is empty"),
        NetworkError::EmptyRing
    );
    assert_eq!(
        network
            .insert_data("chord")
            .await
            .expect_err("ring is empty"),
        NetworkError::EmptyRing
    );

    network.insert_node(4).await.expect("re-seed failed");
    let stored = network.insert_data("chord").await.expect("insert failed");
    assert_eq!(stored.node, 4);
    assert_eq!(
        network.find_data("chord").await.expect("lookup failed").node,
        4
    );
}

#[test]
fn ring_order_bounds_are_enforced() {
    assert_eq!(
        IdentifierSpace::new(0).expect_err("m=0 is invalid"),
        NetworkError::InvalidRingOrder(0)
    );
    assert_eq!(
        IdentifierSpace::new(64).expect_err("m=64 is invalid"),
        NetworkError::InvalidRingOrder(64)
    );
    assert!(IdentifierSpace::new(63).is_ok());
}
