//! Field mutability for the server resource.
//!
//! The surrounding manager's diff engine routes create-vs-update-vs-
//! recreate decisions from this table. The lifecycle only consults it
//! defensively, to refuse in-place changes to create-time fields.

use crate::types::{ServerRecord, ServerSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// Fixed at creation; a change forces recreation of the server.
    Immutable,
    /// May change between reconciliations of the same server.
    Mutable,
}

pub struct FieldSpec {
    pub name: &'static str,
    pub mutability: Mutability,
}

pub const SERVER_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "flavor",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "image",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "volume_size_gb",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "bulk_volume_size_gb",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "ssh_keys",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "use_public_network",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "use_private_network",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "use_ipv6",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "anti_affinity_with",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "user_data",
        mutability: Mutability::Immutable,
    },
    FieldSpec {
        name: "desired_state",
        mutability: Mutability::Mutable,
    },
];

fn changed(field: &str, current: &ServerRecord, desired: &ServerSpec) -> bool {
    match field {
        "name" => current.name != desired.name,
        "flavor" => current.flavor != desired.flavor,
        "image" => current.image != desired.image,
        "volume_size_gb" => current.volume_size_gb != desired.volume_size_gb,
        "bulk_volume_size_gb" => current.bulk_volume_size_gb != desired.bulk_volume_size_gb,
        "ssh_keys" => current.ssh_keys != desired.ssh_keys,
        "use_public_network" => current.use_public_network != desired.use_public_network,
        "use_private_network" => current.use_private_network != desired.use_private_network,
        "use_ipv6" => current.use_ipv6 != desired.use_ipv6,
        "anti_affinity_with" => current.anti_affinity_with != desired.anti_affinity_with,
        "user_data" => current.user_data != desired.user_data,
        "desired_state" => current.desired_state != desired.desired_state,
        _ => false,
    }
}

/// Names of immutable fields whose desired value differs from what the
/// record was created with.
pub fn immutable_changes(current: &ServerRecord, desired: &ServerSpec) -> Vec<&'static str> {
    SERVER_FIELDS
        .iter()
        .filter(|field| field.mutability == Mutability::Immutable)
        .filter(|field| changed(field.name, current, desired))
        .map(|field| field.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project;

    fn spec() -> ServerSpec {
        ServerSpec {
            name: "db-1".into(),
            flavor: "flex-4".into(),
            image: "debian-12".into(),
            volume_size_gb: 50,
            ssh_keys: vec!["key-a".into()],
            desired_state: Some("running".into()),
            ..Default::default()
        }
    }

    fn record() -> ServerRecord {
        let mut record = ServerRecord::default();
        project::apply_spec(&mut record, &spec());
        record
    }

    #[test]
    fn unchanged_spec_reports_nothing() {
        assert!(immutable_changes(&record(), &spec()).is_empty());
    }

    #[test]
    fn desired_state_change_is_allowed() {
        let desired = ServerSpec {
            desired_state: Some("stopped".into()),
            ..spec()
        };
        assert!(immutable_changes(&record(), &desired).is_empty());
    }

    #[test]
    fn flavor_change_is_flagged() {
        let desired = ServerSpec {
            flavor: "flex-8".into(),
            ..spec()
        };
        assert_eq!(immutable_changes(&record(), &desired), vec!["flavor"]);
    }

    #[test]
    fn several_changes_are_all_named() {
        let desired = ServerSpec {
            image: "ubuntu-24.04".into(),
            ssh_keys: vec!["key-b".into()],
            ..spec()
        };
        let frozen = immutable_changes(&record(), &desired);
        assert!(frozen.contains(&"image"));
        assert!(frozen.contains(&"ssh_keys"));
    }

    #[test]
    fn every_spec_field_appears_in_the_table() {
        // Exactly one mutable field; everything else forces recreation.
        let mutable: Vec<_> = SERVER_FIELDS
            .iter()
            .filter(|f| f.mutability == Mutability::Mutable)
            .map(|f| f.name)
            .collect();
        assert_eq!(mutable, vec!["desired_state"]);
        assert_eq!(SERVER_FIELDS.len(), 12);
    }
}
