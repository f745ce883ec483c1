use serde::{Deserialize, Serialize};

// ── Request types ────────────────────────────────────────────────────

/// Body for `POST /servers`.
///
/// Optional fields are omitted from the JSON entirely when unset — the API
/// distinguishes "not specified" from an explicit empty value.
#[derive(Debug, Clone, Serialize)]
pub struct CreateServerRequest {
    pub name: String,
    pub flavor: String,
    pub image: String,
    pub volume_size_gb: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_volume_size_gb: Option<u64>,
    pub ssh_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_public_network: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_private_network: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ipv6: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anti_affinity_with: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

/// Body for `PATCH /servers/{uuid}` — the only mutable attribute is the
/// desired run state.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateServerRequest {
    pub status: String,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub uuid: String,
    #[serde(default)]
    pub href: String,
    pub name: String,
    pub flavor: Flavor,
    pub image: Image,
    pub status: String,
    #[serde(default)]
    pub volumes: Vec<VolumeAttachment>,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub ssh_fingerprints: Vec<String>,
    #[serde(default)]
    pub ssh_host_keys: Vec<String>,
    #[serde(default)]
    pub anti_affinity_with: Vec<ServerRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flavor {
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub slug: String,
}

/// A volume attached to a server. Shared with the reconciler's record,
/// which exposes attachments verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeAttachment {
    #[serde(rename = "type")]
    pub volume_type: String,
    pub device_path: String,
    pub size_gb: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interface {
    #[serde(rename = "type")]
    pub interface_type: String,
    #[serde(default)]
    pub addresses: Vec<InterfaceAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceAddress {
    pub version: u8,
    pub address: String,
}

/// Reference to another server, as returned in `anti_affinity_with`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerRef {
    pub uuid: String,
    #[serde(default)]
    pub href: String,
}
