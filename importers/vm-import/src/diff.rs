//! Desired-state comparison
//!
//! Decides whether an existing remote VM already matches the desired payload
//! built from a row. Nested references compare by id (by name when the
//! desired side only carries a name). Reference fields absent from the
//! desired payload are not compared, matching PATCH semantics: the
//! serialized body omits them, so the remote value stays untouched either
//! way. A desired record without a primary IP never forces an update.

use netbox_client::{ClusterRef, VirtualMachine, VirtualMachineRequest};

/// True when a PATCH with the desired payload would change the remote record
pub fn update_needed(desired: &VirtualMachineRequest, existing: &VirtualMachine) -> bool {
    if desired.name != existing.name {
        return true;
    }
    if existing.role.as_ref().map(|r| r.id) != Some(desired.role_id) {
        return true;
    }
    if desired.description != existing.description || desired.serial != existing.serial {
        return true;
    }
    if existing.vcpus.map(|v| v.round() as u64) != desired.vcpus {
        return true;
    }
    if existing.memory != desired.memory || existing.disk != desired.disk {
        return true;
    }
    match &desired.cluster {
        Some(ClusterRef::Id(id)) => {
            if existing.cluster.as_ref().map(|c| c.id) != Some(*id) {
                return true;
            }
        }
        Some(ClusterRef::Name(name)) => {
            if existing.cluster.as_ref().map(|c| c.name.as_str()) != Some(name.as_str()) {
                return true;
            }
        }
        None => {}
    }
    if let Some(tenant) = &desired.tenant_name {
        if existing.tenant.as_ref().map(|t| t.name.as_str()) != Some(tenant.as_str()) {
            return true;
        }
    }
    if let Some(vrf_id) = desired.vrf_id {
        if existing.vrf.as_ref().map(|v| v.id) != Some(vrf_id) {
            return true;
        }
    }
    if let Some(ip_id) = desired.primary_ip4_id {
        if existing.primary_ip4.as_ref().map(|ip| ip.id) != Some(ip_id) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn matching_pair() -> (VirtualMachineRequest, VirtualMachine) {
        let desired = VirtualMachineRequest {
            name: "srv01".to_string(),
            role_id: 3,
            description: "frontend".to_string(),
            serial: "SN-1".to_string(),
            vcpus: Some(4),
            memory: Some(8192),
            disk: Some(100),
            ..VirtualMachineRequest::default()
        };
        let mut existing = test_vm(10, "srv01");
        existing.role = Some(test_nested_role(3, "Web"));
        existing.description = "frontend".to_string();
        existing.serial = "SN-1".to_string();
        existing.vcpus = Some(4.0);
        existing.memory = Some(8192);
        existing.disk = Some(100);
        (desired, existing)
    }

    #[test]
    fn identical_records_need_no_update() {
        let (desired, existing) = matching_pair();
        assert!(!update_needed(&desired, &existing));
    }

    #[test]
    fn description_drift_needs_update() {
        let (mut desired, existing) = matching_pair();
        desired.description = "frontend (decommissioning)".to_string();
        assert!(update_needed(&desired, &existing));
    }

    #[test]
    fn role_compares_by_id() {
        let (mut desired, existing) = matching_pair();
        desired.role_id = 4;
        assert!(update_needed(&desired, &existing));
    }

    #[test]
    fn cleared_numeric_field_needs_update() {
        let (mut desired, existing) = matching_pair();
        desired.memory = None;
        assert!(update_needed(&desired, &existing));
    }

    #[test]
    fn cluster_compares_by_id_then_name() {
        let (mut desired, mut existing) = matching_pair();
        existing.cluster = Some(test_nested_cluster(4, "kln-esx"));

        desired.cluster = Some(ClusterRef::Id(4));
        assert!(!update_needed(&desired, &existing));

        desired.cluster = Some(ClusterRef::Id(5));
        assert!(update_needed(&desired, &existing));

        desired.cluster = Some(ClusterRef::Name("kln-esx".to_string()));
        assert!(!update_needed(&desired, &existing));

        desired.cluster = Some(ClusterRef::Name("other".to_string()));
        assert!(update_needed(&desired, &existing));
    }

    #[test]
    fn absent_desired_cluster_ignores_remote_cluster() {
        let (desired, mut existing) = matching_pair();
        existing.cluster = Some(test_nested_cluster(4, "kln-esx"));
        assert!(!update_needed(&desired, &existing));
    }

    #[test]
    fn absent_desired_primary_ip_is_a_noop() {
        let (desired, mut existing) = matching_pair();
        existing.primary_ip4 = Some(test_nested_ip(9, "10.0.0.5/24"));
        assert!(!update_needed(&desired, &existing));
    }

    #[test]
    fn differing_primary_ip_needs_update() {
        let (mut desired, mut existing) = matching_pair();
        existing.primary_ip4 = Some(test_nested_ip(9, "10.0.0.5/24"));

        desired.primary_ip4_id = Some(9);
        assert!(!update_needed(&desired, &existing));

        desired.primary_ip4_id = Some(12);
        assert!(update_needed(&desired, &existing));
    }

    #[test]
    fn missing_remote_primary_ip_needs_update_when_desired() {
        let (mut desired, existing) = matching_pair();
        desired.primary_ip4_id = Some(9);
        assert!(update_needed(&desired, &existing));
    }

    #[test]
    fn tenant_compares_by_name() {
        let (mut desired, mut existing) = matching_pair();
        existing.tenant = Some(test_nested_tenant(1, "Acme"));

        desired.tenant_name = Some("Acme".to_string());
        assert!(!update_needed(&desired, &existing));

        desired.tenant_name = Some("Globex".to_string());
        assert!(update_needed(&desired, &existing));
    }
}
