//! Mapping between the desired spec, the wire representation, and the
//! local record.

use nimbus_api::{CreateServerRequest, Server};

use crate::addr::find_address;
use crate::types::{ConnectionInfo, InterfaceKind, IpVersion, ServerRecord, ServerSpec};

/// Build the provider create request from a desired spec.
///
/// Required fields are copied verbatim; optional fields stay `None` so
/// they are omitted from the wire body, letting the provider apply its
/// own defaults. List order is preserved.
pub fn create_request(spec: &ServerSpec) -> CreateServerRequest {
    CreateServerRequest {
        name: spec.name.clone(),
        flavor: spec.flavor.clone(),
        image: spec.image.clone(),
        volume_size_gb: spec.volume_size_gb,
        bulk_volume_size_gb: spec.bulk_volume_size_gb,
        ssh_keys: spec.ssh_keys.clone(),
        use_public_network: spec.use_public_network,
        use_private_network: spec.use_private_network,
        use_ipv6: spec.use_ipv6,
        anti_affinity_with: if spec.anti_affinity_with.is_empty() {
            None
        } else {
            Some(spec.anti_affinity_with.clone())
        },
        user_data: spec.user_data.clone(),
    }
}

/// Copy the desired configuration into the record. Done once at create;
/// the record's copy is what later in-place updates are checked against.
pub fn apply_spec(record: &mut ServerRecord, spec: &ServerSpec) {
    record.name = spec.name.clone();
    record.flavor = spec.flavor.clone();
    record.image = spec.image.clone();
    record.volume_size_gb = spec.volume_size_gb;
    record.bulk_volume_size_gb = spec.bulk_volume_size_gb;
    record.ssh_keys = spec.ssh_keys.clone();
    record.use_public_network = spec.use_public_network;
    record.use_private_network = spec.use_private_network;
    record.use_ipv6 = spec.use_ipv6;
    record.anti_affinity_with = spec.anti_affinity_with.clone();
    record.user_data = spec.user_data.clone();
    record.desired_state = spec.desired_state.clone();
}

/// Project a provider snapshot into the record.
///
/// Empty volume and anti-affinity lists leave the record's previous
/// value in place — the provider omits them while a server is still
/// assembling. Address fields are recomputed on every projection and
/// cleared when no longer present.
pub fn apply_snapshot(record: &mut ServerRecord, server: &Server) {
    if !server.href.is_empty() {
        record.href = Some(server.href.clone());
    }
    record.name = server.name.clone();
    record.flavor = server.flavor.slug.clone();
    record.image = server.image.slug.clone();
    record.status = Some(server.status.clone());

    if !server.volumes.is_empty() {
        record.volumes = server.volumes.clone();
    }

    record.ipv4_address =
        find_address(&server.interfaces, InterfaceKind::Public, IpVersion::V4).map(str::to_owned);
    record.ipv6_address =
        find_address(&server.interfaces, InterfaceKind::Public, IpVersion::V6).map(str::to_owned);
    record.ipv4_private_address =
        find_address(&server.interfaces, InterfaceKind::Private, IpVersion::V4).map(str::to_owned);
    record.ipv6_private_address =
        find_address(&server.interfaces, InterfaceKind::Private, IpVersion::V6).map(str::to_owned);

    record.ssh_fingerprints = server.ssh_fingerprints.clone();
    record.ssh_host_keys = server.ssh_host_keys.clone();

    if !server.anti_affinity_with.is_empty() {
        record.anti_affinity_with = server
            .anti_affinity_with
            .iter()
            .map(|peer| peer.uuid.clone())
            .collect();
    }

    record.connection = record.ipv4_address.as_ref().map(|host| ConnectionInfo {
        protocol: "ssh".into(),
        host: host.clone(),
    });
}
