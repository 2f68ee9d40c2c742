use chord_ring::{IdentifierSpace, Network};

mod common;
use common::build_network;

#[tokio::test]
async fn lookup_routes_to_the_clockwise_owner() {
    let network = build_network(3, &[0, 3, 5]).await;
    let anchor = network.anchor_node().await.expect("ring is not empty");
    let cases = [
        (0, 0),
        (1, 3),
        (2, 3),
        (3, 3),
        (4, 5),
        (5, 5),
        (6, 0),
        (7, 0),
    ];
    for (key, owner) in cases {
        let node = anchor
            .find_successor(network.directory(), key)
            .await
            .expect("lookup failed");
        assert_eq!(node.id, owner, "key {key}");
    }
}

#[tokio::test]
async fn single_member_owns_every_key() {
    let network = Network::new(4, 7).await.expect("bootstrap failed");
    let anchor = network.anchor_node().await.expect("ring is not empty");
    for key in [0, 6, 7, 8, 15] {
        let node = anchor
            .find_successor(network.directory(), key)
            .await
            .expect("lookup failed");
        assert_eq!(node.id, 7, "key {key}");
    }
}

#[tokio::test]
async fn lookup_path_records_the_hops() {
    let network = build_network(3, &[0, 3, 5]).await;
    network.stabilize_all().await;
    let anchor = network.anchor_node().await.expect("ring is not empty");

    let (node, path) = anchor
        .find_successor_with_path(network.directory(), 2)
        .await
        .expect("lookup failed");
    assert_eq!(node.id, 3);
    assert_eq!(path, vec![0, 3]);

    let (node, path) = anchor
        .find_successor_with_path(network.directory(), 6)
        .await
        .expect("lookup failed");
    assert_eq!(node.id, 0);
    assert_eq!(path, vec![0, 5, 0]);

    let (node, path) = anchor
        .find_successor_with_path(network.directory(), 0)
        .await
        .expect("lookup failed");
    assert_eq!(node.id, 0);
    assert_eq!(path, vec![0]);
}

#[test]
fn hash_is_bit_exact() {
    let cases = [
        (3, "x", 0),
        (8, "x", 17),
        (16, "x", 4598),
        (3, "chord", 2),
        (8, "chord", 75),
        (10, "gamma", 1021),
        (6, "banana", 9),
        (8, "carrot", 216),
    ];
    for (m, key, expected) in cases {
        let space = IdentifierSpace::new(m).expect("valid ring order");
        assert_eq!(space.hash(key), expected, "m={m} key={key}");
    }
}

#[test]
fn distance_wraps_clockwise() {
    let space = IdentifierSpace::new(4).expect("valid ring order");
    assert_eq!(space.distance(3, 9), 6);
    assert_eq!(space.distance(9, 3), 10);
    assert_eq!(space.distance(5, 5), 0);
    assert_eq!(space.distance(15, 0), 1);
    assert_eq!(space.finger_start(9, 3), 1);
}
