use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use tokio::sync::RwLock;

use crate::constants::{HOP_CAP_FACTOR, JOIN_MAX_RETRIES};
use crate::directory::Directory;
use crate::error::NetworkError;
use crate::export::{FingerEntry, KeyEntry, NodeExport};
use crate::space::IdentifierSpace;

/// Handle to one ring member. Clones share the same state, so a handle can
/// be passed into tasks and resolved out of the directory freely.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: u64,
    space: IdentifierSpace,
    pub state: Arc<RwLock<NodeState>>,
}

/// Links and local store of a member. All links are member ids; a member
/// with no peers links to itself everywhere.
#[derive(Debug)]
pub struct NodeState {
    pub predecessor: u64,
    pub successor: u64,
    pub fingers: Vec<u64>,
    pub store: HashMap<u64, String>,
}

impl Node {
    pub fn new(id: u64, space: IdentifierSpace) -> Self {
        let fingers = vec![id; space.m() as usize];
        Node {
            id,
            space,
            state: Arc::new(RwLock::new(NodeState {
                predecessor: id,
                successor: id,
                fingers,
                store: HashMap::new(),
            })),
        }
    }

    pub async fn successor(&self) -> u64 {
        self.state.read().await.successor
    }

    pub async fn predecessor(&self) -> u64 {
        self.state.read().await.predecessor
    }

    pub async fn fingers(&self) -> Vec<u64> {
        self.state.read().await.fingers.clone()
    }

    pub async fn put(&self, key: u64, value: String) {
        self.state.write().await.store.insert(key, value);
    }

    pub async fn get(&self, key: u64) -> Option<String> {
        self.state.read().await.store.get(&key).cloned()
    }

    /// Member responsible for `key`: the first member whose id is reached
    /// going clockwise from `key`, inclusive.
    pub async fn find_successor(
        &self,
        directory: &Directory,
        key: u64,
    ) -> Result<Node, NetworkError> {
        let (node, _path) = self.find_successor_with_path(directory, key).await?;
        Ok(node)
    }

    /// Same routing as [`find_successor`](Self::find_successor), also
    /// recording every member id visited, in visitation order. The hop
    /// count is capped; links mutated underneath a walk can at worst cost
    /// extra hops or return a stale-but-live member, never loop forever.
    pub async fn find_successor_with_path(
        &self,
        directory: &Directory,
        key: u64,
    ) -> Result<(Node, Vec<u64>), NetworkError> {
        let hop_cap = self.space.m() as usize * HOP_CAP_FACTOR;
        let mut path = Vec::new();
        let mut current = self.clone();

        for _ in 0..hop_cap {
            path.push(current.id);
            if current.id == key {
                return Ok((current, path));
            }

            let successor_id = current.successor().await;
            if self.space.distance(current.id, key) <= self.space.distance(successor_id, key) {
                path.push(successor_id);
                let successor = directory.resolve(successor_id).await.ok_or(
                    NetworkError::RoutingInconsistency {
                        key,
                        hops: path.len(),
                    },
                )?;
                return Ok((successor, path));
            }

            let next = current.closest_preceding_finger(directory, key).await;
            if next.id == current.id {
                // no finger makes progress; the successor is the closest
                // candidate still known
                path.push(successor_id);
                let successor = directory.resolve(successor_id).await.ok_or(
                    NetworkError::RoutingInconsistency {
                        key,
                        hops: path.len(),
                    },
                )?;
                return Ok((successor, path));
            }
            current = next;
        }

        Err(NetworkError::RoutingInconsistency { key, hops: hop_cap })
    }

    /// Scan the finger table from the top down and return the first entry
    /// strictly closer to `key` than this member, by clockwise distance;
    /// the member itself if none qualifies. The distance test can pick a
    /// finger that overshoots `key`, which costs hops but never
    /// correctness: the walk still converges on the responsible member.
    /// Entries that no longer resolve are skipped until repair.
    pub async fn closest_preceding_finger(&self, directory: &Directory, key: u64) -> Node {
        let fingers = {
            let state = self.state.read().await;
            state.fingers.clone()
        };
        let own_distance = self.space.distance(self.id, key);
        for finger_id in fingers.iter().rev() {
            if self.space.distance(*finger_id, key) < own_distance {
                if let Some(node) = directory.resolve(*finger_id).await {
                    return node;
                }
            }
        }
        self.clone()
    }

    /// Enter the ring through `bootstrap`: route to the successor of this
    /// member's id, splice in between it and its predecessor, rebuild the
    /// finger table, then pull the keys this member now owns from the
    /// successor. The splice holds the write locks of every affected
    /// member, ascending by id, and revalidates the insertion point under
    /// those locks; a join that lost the race to a neighbouring mutation
    /// re-routes and tries again.
    pub async fn join(&self, directory: &Directory, bootstrap: &Node) -> Result<(), NetworkError> {
        for _ in 0..JOIN_MAX_RETRIES {
            let succ = bootstrap.find_successor(directory, self.id).await?;
            let pred_id = succ.predecessor().await;
            let Some(pred) = directory.resolve(pred_id).await else {
                continue;
            };

            let mut members = vec![pred.clone(), self.clone(), succ.clone()];
            members.sort_by_key(|member| member.id);
            members.dedup_by_key(|member| member.id);

            let mut guards = Vec::with_capacity(members.len());
            for member in &members {
                guards.push((member.id, member.state.write().await));
            }

            let splice_intact = guards
                .iter()
                .find(|(id, _)| *id == succ.id)
                .map(|(_, state)| state.predecessor == pred_id)
                .unwrap_or(false)
                && guards
                    .iter()
                    .find(|(id, _)| *id == pred_id)
                    .map(|(_, state)| state.successor == succ.id)
                    .unwrap_or(false);
            let in_interval = pred_id == succ.id
                || self.space.distance(pred_id, self.id) < self.space.distance(pred_id, succ.id);
            if !splice_intact || !in_interval {
                drop(guards);
                debug!("node {} lost a join race, re-routing", self.id);
                continue;
            }

            for (id, state) in guards.iter_mut() {
                if *id == pred_id {
                    state.successor = self.id;
                    state.fingers[0] = self.id;
                }
                if *id == succ.id {
                    state.predecessor = self.id;
                }
                if *id == self.id {
                    state.predecessor = pred_id;
                    state.successor = succ.id;
                    state.fingers[0] = succ.id;
                }
            }
            drop(guards);

            self.fix_fingers(directory).await?;
            self.take_successor_keys(&succ).await;
            return Ok(());
        }

        Err(NetworkError::RoutingInconsistency {
            key: self.id,
            hops: JOIN_MAX_RETRIES,
        })
    }

    /// Splice this member out of the ring and hand its whole store to its
    /// successor. Returns the `(predecessor, successor)` pair the ring was
    /// rerouted through. The member must be discarded afterwards; nothing
    /// relinks it.
    pub async fn leave(&self, directory: &Directory) -> Result<(u64, u64), NetworkError> {
        for _ in 0..JOIN_MAX_RETRIES {
            let (pred_id, succ_id) = {
                let state = self.state.read().await;
                (state.predecessor, state.successor)
            };
            if pred_id == self.id && succ_id == self.id {
                // no peers to reroute
                return Ok((self.id, self.id));
            }
            let (Some(pred), Some(succ)) = (
                directory.resolve(pred_id).await,
                directory.resolve(succ_id).await,
            ) else {
                continue;
            };

            let mut members = vec![pred.clone(), self.clone(), succ.clone()];
            members.sort_by_key(|member| member.id);
            members.dedup_by_key(|member| member.id);

            let mut guards = Vec::with_capacity(members.len());
            for member in &members {
                guards.push((member.id, member.state.write().await));
            }

            let links_intact = guards
                .iter()
                .find(|(id, _)| *id == self.id)
                .map(|(_, state)| state.predecessor == pred_id && state.successor == succ_id)
                .unwrap_or(false);
            if !links_intact {
                drop(guards);
                debug!("node {} saw its links change mid-leave, retrying", self.id);
                continue;
            }

            for (id, state) in guards.iter_mut() {
                if *id == pred_id {
                    state.successor = succ_id;
                    state.fingers[0] = succ_id;
                }
                if *id == succ_id {
                    state.predecessor = pred_id;
                }
            }

            let mut moved: Vec<(u64, String)> = Vec::new();
            for (id, state) in guards.iter_mut() {
                if *id == self.id {
                    moved = state.store.drain().collect();
                }
            }
            // transferred values win over whatever the successor held
            for (id, state) in guards.iter_mut() {
                if *id == succ_id {
                    for (key, value) in moved.drain(..) {
                        state.store.insert(key, value);
                    }
                }
            }
            return Ok((pred_id, succ_id));
        }

        Err(NetworkError::RoutingInconsistency {
            key: self.id,
            hops: JOIN_MAX_RETRIES,
        })
    }

    /// Recompute the full finger table: entry `i` is the member responsible
    /// for `(id + 2^i) mod ring_size`. Idempotent; the table is swapped in
    /// under one write guard after all targets are routed.
    pub async fn fix_fingers(&self, directory: &Directory) -> Result<(), NetworkError> {
        let mut fingers = Vec::with_capacity(self.space.m() as usize);
        for i in 0..self.space.m() {
            let start = self.space.finger_start(self.id, i);
            let target = self.find_successor(directory, start).await?;
            fingers.push(target.id);
        }
        let mut state = self.state.write().await;
        state.fingers = fingers;
        Ok(())
    }

    /// Pull from the successor's store every key `k <= id`, by raw
    /// comparison. Keys that wrapped past zero deliberately stay with the
    /// successor.
    async fn take_successor_keys(&self, succ: &Node) {
        if succ.id == self.id {
            return;
        }
        let (low, high) = if self.id < succ.id {
            (self, succ)
        } else {
            (succ, self)
        };
        let mut low_guard = low.state.write().await;
        let mut high_guard = high.state.write().await;
        let (own, other) = if self.id < succ.id {
            (&mut *low_guard, &mut *high_guard)
        } else {
            (&mut *high_guard, &mut *low_guard)
        };

        let moved: Vec<u64> = other
            .store
            .keys()
            .copied()
            .filter(|key| *key <= self.id)
            .collect();
        for key in moved {
            if let Some(value) = other.store.remove(&key) {
                own.store.insert(key, value);
            }
        }
    }

    /// Snapshot this member for the diagnostic export.
    pub async fn snapshot(&self) -> NodeExport {
        let state = self.state.read().await;
        let mut keys: Vec<KeyEntry> = state
            .store
            .iter()
            .map(|(key, value)| KeyEntry {
                key: *key,
                value: value.clone(),
            })
            .collect();
        keys.sort_unstable_by_key(|entry| entry.key);
        let fingers = state
            .fingers
            .iter()
            .enumerate()
            .map(|(i, node)| FingerEntry {
                start: self.space.finger_start(self.id, i as u32),
                node: *node,
            })
            .collect();
        NodeExport {
            id: self.id,
            predecessor: state.predecessor,
            successor: state.successor,
            keys,
            fingers,
        }
    }
}
