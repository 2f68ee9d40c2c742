use chord_ring::Network;

/// Bootstrap a ring from the first id and join the rest through it.
pub async fn build_network(m: u32, ids: &[u64]) -> Network {
    let network = Network::new(m, ids[0])
        .await
        .expect("failed to bootstrap the network");
    for &id in &ids[1..] {
        network.insert_node(id).await.expect("node failed to join");
    }
    network
}

/// Follow successor links from the anchor until the walk closes.
pub async fn successor_cycle(network: &Network) -> Vec<u64> {
    let anchor = network.anchor_node().await.expect("ring is empty");
    let mut cycle = vec![anchor.id];
    let mut current = anchor;
    loop {
        let next = current.successor().await;
        if next == cycle[0] {
            break;
        }
        assert!(cycle.len() <= 4096, "successor walk does not close");
        cycle.push(next);
        current = network
            .member(next)
            .await
            .expect("dangling successor link");
    }
    cycle
}

/// First live id clockwise from `key`, inclusive.
pub fn expected_successor(sorted_ids: &[u64], key: u64) -> u64 {
    for &id in sorted_ids {
        if id >= key {
            return id;
        }
    }
    sorted_ids[0]
}
