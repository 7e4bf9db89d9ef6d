//! Suffrage snapshot: the node weight table captured once per pass.

use serde::{Deserialize, Serialize};

use coinage_operations::SignerWeights;
use coinage_types::PublicKey;

use crate::error::PassFault;
use crate::state::{StateAccessor, StateValue, SUFFRAGE_KEY};

/// One authorized consensus node and its voting weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffrageNode {
    pub key: PublicKey,
    pub weight: u64,
}

/// The suffrage membership and required threshold, frozen for one pass.
///
/// The default value is the zeroed form node-operation processors reset to
/// on close: no members, threshold 0. It never verifies anything, since any
/// signer lookup against it fails as unknown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuffrageSnapshot {
    nodes: Vec<SuffrageNode>,
    threshold: u64,
}

impl SuffrageSnapshot {
    pub fn new(nodes: Vec<SuffrageNode>, threshold: u64) -> Self {
        Self { nodes, threshold }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }
}

impl SignerWeights for SuffrageSnapshot {
    fn signer_weight(&self, signer: &PublicKey) -> Option<u64> {
        self.nodes.iter().find(|n| &n.key == signer).map(|n| n.weight)
    }

    fn required_threshold(&self) -> u64 {
        self.threshold
    }
}

/// Read the suffrage membership for a pass.
///
/// An absent or empty suffrage slot is an infrastructure fault, not an
/// operation rejection: the returned [`PassFault::EmptySuffrage`] asks the
/// host to retry the whole pass.
pub fn read_suffrage(
    state: &dyn StateAccessor,
    threshold: u64,
) -> Result<SuffrageSnapshot, PassFault> {
    match state.get(SUFFRAGE_KEY)? {
        None => Err(PassFault::EmptySuffrage),
        Some(StateValue::SuffrageNodes(nodes)) => {
            if nodes.is_empty() {
                return Err(PassFault::EmptySuffrage);
            }
            Ok(SuffrageSnapshot::new(nodes, threshold))
        }
        Some(other) => Err(PassFault::corrupt(SUFFRAGE_KEY.to_string(), "suffrage nodes", &other)),
    }
}
