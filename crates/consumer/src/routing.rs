//! Ack routing - resolving the acknowledging channel for a delivery
//!
//! All routing goes through [`ChannelPair::route`]. The channel is chosen by
//! the cluster-origin tag carried on the delivery, not by which channel
//! invoked the handler; a mislabeled delivery is therefore acknowledged on
//! the channel its tag names. A corrected design would bind the
//! acknowledger at consume time and bypass this lookup entirely.

use std::sync::{Arc, OnceLock};

use contracts::{ClusterChannel, ClusterTag};

/// The two channels owned by one consumer
///
/// Slots are set once during `start` and read-only from the delivery path,
/// so the two delivery streams share them without locking.
pub struct ChannelPair {
    master: OnceLock<Arc<dyn ClusterChannel>>,
    slave: OnceLock<Arc<dyn ClusterChannel>>,
}

impl ChannelPair {
    /// Create an empty pair
    pub fn new() -> Self {
        Self {
            master: OnceLock::new(),
            slave: OnceLock::new(),
        }
    }

    fn slot(&self, cluster: ClusterTag) -> &OnceLock<Arc<dyn ClusterChannel>> {
        match cluster {
            ClusterTag::Master => &self.master,
            ClusterTag::Slave => &self.slave,
        }
    }

    /// Fill a slot; a second set for the same cluster is ignored
    pub fn set(&self, cluster: ClusterTag, channel: Arc<dyn ClusterChannel>) {
        let _ = self.slot(cluster).set(channel);
    }

    /// The channel bound to a cluster, if that side started
    pub fn get(&self, cluster: ClusterTag) -> Option<Arc<dyn ClusterChannel>> {
        self.slot(cluster).get().map(Arc::clone)
    }

    /// Resolve the acknowledging channel for a delivery's origin tag
    pub fn route(&self, origin: ClusterTag) -> Option<Arc<dyn ClusterChannel>> {
        self.get(origin)
    }
}

impl Default for ChannelPair {
    fn default() -> Self {
        Self::new()
    }
}
