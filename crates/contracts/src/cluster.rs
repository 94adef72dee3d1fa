//! ClusterTag - identity of a broker cluster
//!
//! "master" and "slave" are two peer clusters hosting the same logical
//! queues, not a primary/replica pair with failover.

use serde::{Deserialize, Serialize};

/// Broker cluster identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterTag {
    Master,
    Slave,
}

impl ClusterTag {
    /// Wire form carried on delivery metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterTag::Master => "master",
            ClusterTag::Slave => "slave",
        }
    }

    /// Parse the cluster-origin property from delivery metadata.
    ///
    /// Anything that is not the master constant routes to the slave side.
    pub fn from_wire(value: &str) -> Self {
        if value == ClusterTag::Master.as_str() {
            ClusterTag::Master
        } else {
            ClusterTag::Slave
        }
    }

    /// The peer cluster
    pub fn peer(&self) -> Self {
        match self {
            ClusterTag::Master => ClusterTag::Slave,
            ClusterTag::Slave => ClusterTag::Master,
        }
    }
}

impl std::fmt::Display for ClusterTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        assert_eq!(ClusterTag::from_wire("master"), ClusterTag::Master);
        assert_eq!(ClusterTag::from_wire("slave"), ClusterTag::Slave);
    }

    #[test]
    fn unknown_tag_routes_slave() {
        assert_eq!(ClusterTag::from_wire("backup"), ClusterTag::Slave);
        assert_eq!(ClusterTag::from_wire(""), ClusterTag::Slave);
    }

    #[test]
    fn peer_is_symmetric() {
        assert_eq!(ClusterTag::Master.peer(), ClusterTag::Slave);
        assert_eq!(ClusterTag::Slave.peer().peer(), ClusterTag::Slave);
    }
}
