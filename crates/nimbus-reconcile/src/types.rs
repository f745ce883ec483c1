use nimbus_api::VolumeAttachment;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Caller-supplied target configuration for a server.
///
/// Every field except `desired_state` is fixed at creation time. Changing
/// any other field means destroying and recreating the server; the
/// lifecycle refuses such changes in place (see [`crate::schema`]).
#[derive(Debug, Clone, Default)]
pub struct ServerSpec {
    pub name: String,
    pub flavor: String,
    pub image: String,
    pub volume_size_gb: u64,
    pub bulk_volume_size_gb: Option<u64>,
    pub ssh_keys: Vec<String>,
    pub use_public_network: Option<bool>,
    pub use_private_network: Option<bool>,
    pub use_ipv6: Option<bool>,
    pub anti_affinity_with: Vec<String>,
    pub user_data: Option<String>,
    /// Requested run state (`"running"`, `"stopped"`). The provider owns
    /// the vocabulary, so this stays an open string.
    pub desired_state: Option<String>,
}

impl ServerSpec {
    /// Check the spec before any remote call is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidSpec("name must not be empty".into()));
        }
        if self.flavor.trim().is_empty() {
            return Err(Error::InvalidSpec("flavor must not be empty".into()));
        }
        if self.image.trim().is_empty() {
            return Err(Error::InvalidSpec("image must not be empty".into()));
        }
        if self.volume_size_gb == 0 {
            return Err(Error::InvalidSpec("volume_size_gb must be at least 1".into()));
        }
        if self.ssh_keys.is_empty() {
            return Err(Error::InvalidSpec("at least one ssh key is required".into()));
        }
        Ok(())
    }
}

/// The reconciler's externally visible view of one server: the desired
/// configuration plus everything observed from the provider. The
/// surrounding manager persists this record between reconciliations.
///
/// `id` is assigned once at create and only cleared when a read discovers
/// the remote server no longer exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerRecord {
    pub id: Option<String>,
    pub href: Option<String>,

    // Desired configuration, copied in at create.
    pub name: String,
    pub flavor: String,
    pub image: String,
    pub volume_size_gb: u64,
    pub bulk_volume_size_gb: Option<u64>,
    pub ssh_keys: Vec<String>,
    pub use_public_network: Option<bool>,
    pub use_private_network: Option<bool>,
    pub use_ipv6: Option<bool>,
    pub anti_affinity_with: Vec<String>,
    pub user_data: Option<String>,
    pub desired_state: Option<String>,

    // Observed state, populated by reads.
    pub status: Option<String>,
    pub volumes: Vec<VolumeAttachment>,
    pub ipv4_address: Option<String>,
    pub ipv6_address: Option<String>,
    pub ipv4_private_address: Option<String>,
    pub ipv6_private_address: Option<String>,
    pub ssh_fingerprints: Vec<String>,
    pub ssh_host_keys: Vec<String>,
    pub connection: Option<ConnectionInfo>,
}

impl ServerRecord {
    /// True when the record is not bound to a remote server.
    pub fn is_absent(&self) -> bool {
        self.id.is_none()
    }

    /// Connection descriptor for downstream provisioners, available once
    /// a read has observed a public IPv4 address.
    pub fn connection_info(&self) -> Option<&ConnectionInfo> {
        self.connection.as_ref()
    }
}

/// How downstream provisioners reach the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub protocol: String,
    pub host: String,
}

/// Interface locality tag as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Public,
    Private,
}

impl InterfaceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// The version number used on the wire.
    pub fn number(self) -> u8 {
        match self {
            Self::V4 => 4,
            Self::V6 => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_spec() -> ServerSpec {
        ServerSpec {
            name: "db-1".into(),
            flavor: "flex-4".into(),
            image: "debian-12".into(),
            volume_size_gb: 50,
            ssh_keys: vec!["ssh-ed25519 AAAA".into()],
            ..Default::default()
        }
    }

    #[test]
    fn validate_accepts_minimal_spec() {
        assert!(valid_spec().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_ssh_keys() {
        let spec = ServerSpec {
            ssh_keys: vec![],
            ..valid_spec()
        };
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("ssh key"));
    }

    #[test]
    fn validate_rejects_blank_required_fields() {
        for field in ["name", "flavor", "image"] {
            let mut spec = valid_spec();
            match field {
                "name" => spec.name = "  ".into(),
                "flavor" => spec.flavor = String::new(),
                _ => spec.image = String::new(),
            }
            let err = spec.validate().unwrap_err();
            assert!(err.to_string().contains(field), "{field}: {err}");
        }
    }

    #[test]
    fn validate_rejects_zero_root_volume() {
        let spec = ServerSpec {
            volume_size_gb: 0,
            ..valid_spec()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn empty_record_is_absent() {
        let record = ServerRecord::default();
        assert!(record.is_absent());
        assert!(record.connection_info().is_none());
    }
}
