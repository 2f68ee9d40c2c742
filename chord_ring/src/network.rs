use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use rand::Rng;
use tokio::sync::RwLock;

use crate::constants::JOIN_WORKERS;
use crate::directory::Directory;
use crate::error::NetworkError;
use crate::export::NodeExport;
use crate::node::Node;
use crate::space::IdentifierSpace;

/// The ring as a whole: the identifier space, the member directory and the
/// anchor member that every external operation enters through. Cloning the
/// handle shares the ring, so operations can run from concurrent tasks.
#[derive(Debug, Clone)]
pub struct Network {
    space: IdentifierSpace,
    directory: Directory,
    anchor: Arc<RwLock<Option<u64>>>,
}

/// Where a piece of data lives after hashing onto the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLocation {
    pub key: u64,
    pub node: u64,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSummary {
    pub live: usize,
    pub capacity: u64,
    pub m: u32,
    pub anchor: Option<u64>,
}

impl fmt::Display for NetworkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "chord network:")?;
        writeln!(f, " | live nodes: {}", self.live)?;
        writeln!(f, " | capacity: {} ids", self.capacity)?;
        writeln!(f, " | m: {}", self.m)?;
        match self.anchor {
            Some(id) => write!(f, " | anchor node: {id}"),
            None => write!(f, " | anchor node: -"),
        }
    }
}

impl Network {
    /// Create the ring and bootstrap its first member, which becomes the
    /// anchor with self-referential links.
    pub async fn new(m: u32, first_id: u64) -> Result<Self, NetworkError> {
        let space = IdentifierSpace::new(m)?;
        if !space.contains(first_id) {
            return Err(NetworkError::InvalidNodeId {
                id: first_id,
                capacity: space.ring_size(),
            });
        }
        let directory = Directory::new();
        directory.try_register(Node::new(first_id, space)).await;
        info!(
            "network of capacity {} bootstrapped with node {first_id}",
            space.ring_size()
        );
        Ok(Network {
            space,
            directory,
            anchor: Arc::new(RwLock::new(Some(first_id))),
        })
    }

    pub fn space(&self) -> IdentifierSpace {
        self.space
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn hash_key(&self, raw_key: &str) -> u64 {
        self.space.hash(raw_key)
    }

    pub async fn anchor_id(&self) -> Option<u64> {
        *self.anchor.read().await
    }

    /// The member all lookups and inserts enter through.
    pub async fn anchor_node(&self) -> Result<Node, NetworkError> {
        let anchor_id = self.anchor.read().await.ok_or(NetworkError::EmptyRing)?;
        self.directory
            .resolve(anchor_id)
            .await
            .ok_or(NetworkError::EmptyRing)
    }

    pub async fn member(&self, id: u64) -> Option<Node> {
        self.directory.resolve(id).await
    }

    pub async fn member_ids(&self) -> Vec<u64> {
        self.directory.ids().await
    }

    /// Add one member to the ring, joining through the anchor. If every
    /// member has left since bootstrap, the new member re-seeds the ring
    /// instead.
    pub async fn insert_node(&self, id: u64) -> Result<(), NetworkError> {
        if !self.space.contains(id) {
            return Err(NetworkError::InvalidNodeId {
                id,
                capacity: self.space.ring_size(),
            });
        }
        let node = Node::new(id, self.space);
        if !self.directory.try_register(node.clone()).await {
            return Err(NetworkError::InvalidNodeId {
                id,
                capacity: self.space.ring_size(),
            });
        }

        let anchor = match self.anchor_node().await {
            Ok(anchor) => anchor,
            Err(_) => {
                *self.anchor.write().await = Some(id);
                info!("node {id} re-seeded an empty ring");
                return Ok(());
            }
        };

        info!("node {} joining via node {}", id, anchor.id);
        if let Err(error) = node.join(&self.directory, &anchor).await {
            self.directory.remove(id).await;
            return Err(error);
        }
        Ok(())
    }

    /// Bulk-join a batch of members. Construction is independent per
    /// member; the joins fan out over a small fixed pool of workers and
    /// serialize where they touch the same neighbours, through the
    /// per-member locks. Failed ids are logged and skipped. Returns how
    /// many members joined.
    pub async fn insert_nodes(&self, ids: Vec<u64>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let workers = JOIN_WORKERS.min(ids.len());
        let mut chunks: Vec<Vec<u64>> = vec![Vec::new(); workers];
        for (index, id) in ids.into_iter().enumerate() {
            chunks[index % workers].push(id);
        }

        let mut handles = Vec::with_capacity(workers);
        for chunk in chunks {
            let network = self.clone();
            handles.push(tokio::spawn(async move {
                let mut joined = 0usize;
                for id in chunk {
                    match network.insert_node(id).await {
                        Ok(()) => joined += 1,
                        Err(error) => warn!("node {id} could not join: {error}"),
                    }
                }
                joined
            }));
        }

        let mut joined = 0;
        for handle in handles {
            joined += handle.await.unwrap_or(0);
        }
        joined
    }

    /// Remove a member: splice it out, hand its keys to its successor,
    /// re-anchor if it was the anchor, then repair every finger table.
    pub async fn delete_node(&self, id: u64) -> Result<(), NetworkError> {
        let node = self
            .directory
            .resolve(id)
            .await
            .ok_or(NetworkError::NodeNotFound(id))?;

        let (_pred_id, succ_id) = node.leave(&self.directory).await?;
        {
            let mut anchor = self.anchor.write().await;
            if *anchor == Some(id) {
                *anchor = if succ_id == id { None } else { Some(succ_id) };
            }
        }
        self.directory.remove(id).await;
        info!("node {id} left the ring");

        self.stabilize_all().await;
        Ok(())
    }

    /// Store `raw_key` under its hashed id on the responsible member.
    /// Collisions overwrite.
    pub async fn insert_data(&self, raw_key: &str) -> Result<DataLocation, NetworkError> {
        let key = self.space.hash(raw_key);
        let anchor = self.anchor_node().await?;
        let node = anchor.find_successor(&self.directory, key).await?;
        node.put(key, raw_key.to_string()).await;
        info!("stored '{raw_key}' under id {key} at node {}", node.id);
        Ok(DataLocation {
            key,
            node: node.id,
            value: raw_key.to_string(),
        })
    }

    /// Look a raw key up. A missing key is a reported outcome, not a
    /// routing failure.
    pub async fn find_data(&self, raw_key: &str) -> Result<DataLocation, NetworkError> {
        let key = self.space.hash(raw_key);
        let anchor = self.anchor_node().await?;
        let node = anchor.find_successor(&self.directory, key).await?;
        match node.get(key).await {
            Some(value) => Ok(DataLocation {
                key,
                node: node.id,
                value,
            }),
            None => Err(NetworkError::DataNotFound {
                key: raw_key.to_string(),
                id: key,
            }),
        }
    }

    /// Like [`find_data`](Self::find_data), also returning the lookup path
    /// as the ordered ids of the members visited.
    pub async fn find_data_with_path(
        &self,
        raw_key: &str,
    ) -> Result<(DataLocation, Vec<u64>), NetworkError> {
        let key = self.space.hash(raw_key);
        let anchor = self.anchor_node().await?;
        let (node, path) = anchor
            .find_successor_with_path(&self.directory, key)
            .await?;
        match node.get(key).await {
            Some(value) => Ok((
                DataLocation {
                    key,
                    node: node.id,
                    value,
                },
                path,
            )),
            None => Err(NetworkError::DataNotFound {
                key: raw_key.to_string(),
                id: key,
            }),
        }
    }

    /// Insert `num` generated keys named like `file_7.txt`, for seeding a
    /// demo ring with data.
    pub async fn generate_fake_data(&self, num: usize) -> Result<usize, NetworkError> {
        const EXTENSIONS: [&str; 6] = [".txt", ".png", ".doc", ".mov", ".jpg", ".py"];
        let names: Vec<String> = {
            let mut rng = rand::thread_rng();
            (0..num)
                .map(|index| {
                    format!(
                        "file_{}{}",
                        index,
                        EXTENSIONS[rng.gen_range(0..EXTENSIONS.len())]
                    )
                })
                .collect()
        };
        for name in &names {
            self.insert_data(name).await?;
        }
        info!("inserted {num} generated keys");
        Ok(num)
    }

    /// Repair every finger table by walking the ring from the anchor along
    /// `fingers[0]` until the walk closes. The hop cap keeps a ring
    /// mutated mid-walk from looping; hitting it is logged, never fatal.
    pub async fn stabilize_all(&self) {
        let Some(anchor_id) = self.anchor_id().await else {
            return;
        };
        let Some(anchor) = self.directory.resolve(anchor_id).await else {
            return;
        };

        let hop_cap = self.directory.len().await + 1;
        let mut current = anchor.clone();
        for _ in 0..hop_cap {
            if let Err(error) = current.fix_fingers(&self.directory).await {
                warn!("stabilization stopped at node {}: {error}", current.id);
                return;
            }
            let next_id = {
                let state = current.state.read().await;
                state.fingers[0]
            };
            if next_id == anchor.id {
                return;
            }
            match self.directory.resolve(next_id).await {
                Some(next) => current = next,
                None => {
                    warn!("stabilization hit a dangling link {} -> {next_id}", current.id);
                    return;
                }
            }
        }
        warn!("stabilization walk did not close within {hop_cap} hops");
    }

    pub async fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            live: self.directory.len().await,
            capacity: self.space.ring_size(),
            m: self.space.m(),
            anchor: self.anchor_id().await,
        }
    }

    /// Snapshot every live member, ascending by id.
    pub async fn export(&self) -> Vec<NodeExport> {
        let ids = self.directory.ids().await;
        let mut exports = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(node) = self.directory.resolve(id).await {
                exports.push(node.snapshot().await);
            }
        }
        exports
    }
}
