//! Address projection from a server's network interfaces.

use nimbus_api::Interface;

use crate::types::{InterfaceKind, IpVersion};

/// First address of the requested IP version on interfaces of the given
/// kind, scanning interfaces and their addresses in provider order.
///
/// The scan continues into later interfaces of the same kind when an
/// earlier one carries no address of the requested version. No match is
/// `None`, never an error.
pub fn find_address(
    interfaces: &[Interface],
    kind: InterfaceKind,
    version: IpVersion,
) -> Option<&str> {
    interfaces
        .iter()
        .filter(|interface| interface.interface_type == kind.as_str())
        .flat_map(|interface| interface.addresses.iter())
        .find(|addr| addr.version == version.number())
        .map(|addr| addr.address.as_str())
}
