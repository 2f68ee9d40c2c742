use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::node::Node;

/// Registry of live members, keyed by id. Every cross-member link on the
/// ring is an id resolved through this directory; routing correctness
/// depends only on the linked structure, the directory is the
/// administrative view used for registration, iteration and export.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    members: Arc<RwLock<HashMap<u64, Node>>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member unless its id is already taken.
    pub async fn try_register(&self, node: Node) -> bool {
        let mut members = self.members.write().await;
        if members.contains_key(&node.id) {
            return false;
        }
        members.insert(node.id, node);
        true
    }

    pub async fn remove(&self, id: u64) -> Option<Node> {
        self.members.write().await.remove(&id)
    }

    pub async fn resolve(&self, id: u64) -> Option<Node> {
        self.members.read().await.get(&id).cloned()
    }

    pub async fn contains(&self, id: u64) -> bool {
        self.members.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }

    /// Ids of all live members, ascending.
    pub async fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.members.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
