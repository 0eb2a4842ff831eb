//! Shared builders for unit tests

use crate::sheet::VmRow;
use netbox_client::{
    ClusterType, DeviceRole, IpAddress, NestedCluster, NestedDeviceRole, NestedIpAddress,
    NestedTenant, NestedVirtualMachine, Subnet, VirtualMachine, VmInterface, Vrf,
};

const BASE_URL: &str = "http://test-netbox";

pub fn test_vm(id: u64, name: &str) -> VirtualMachine {
    VirtualMachine {
        id,
        url: format!("{}/api/virtualization/virtual-machines/{}/", BASE_URL, id),
        display: name.to_string(),
        name: name.to_string(),
        role: None,
        cluster: None,
        tenant: None,
        vrf: None,
        primary_ip4: None,
        description: String::new(),
        serial: String::new(),
        vcpus: None,
        memory: None,
        disk: None,
    }
}

pub fn test_vm_interface(id: u64, vm_id: u64, vm_name: &str, name: &str) -> VmInterface {
    VmInterface {
        id,
        url: format!("{}/api/virtualization/interfaces/{}/", BASE_URL, id),
        display: name.to_string(),
        name: name.to_string(),
        virtual_machine: NestedVirtualMachine {
            id: vm_id,
            url: format!("{}/api/virtualization/virtual-machines/{}/", BASE_URL, vm_id),
            display: vm_name.to_string(),
            name: vm_name.to_string(),
        },
    }
}

pub fn test_ip(id: u64, address: &str) -> IpAddress {
    IpAddress {
        id,
        url: format!("{}/api/ipam/ip-addresses/{}/", BASE_URL, id),
        display: address.to_string(),
        address: address.to_string(),
        assigned_object_type: None,
        assigned_object_id: None,
        assigned_object: None,
        description: String::new(),
    }
}

pub fn test_assigned_ip(id: u64, address: &str, interface_id: u64) -> IpAddress {
    let mut ip = test_ip(id, address);
    ip.assigned_object_type = Some("virtualization.vminterface".to_string());
    ip.assigned_object_id = Some(interface_id);
    ip
}

pub fn test_device_role(id: u64, name: &str) -> DeviceRole {
    DeviceRole {
        id,
        url: format!("{}/api/dcim/device-roles/{}/", BASE_URL, id),
        display: name.to_string(),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        color: "9e9e9e".to_string(),
        description: String::new(),
    }
}

pub fn test_cluster_type(id: u64, name: &str) -> ClusterType {
    ClusterType {
        id,
        url: format!("{}/api/virtualization/cluster-types/{}/", BASE_URL, id),
        display: name.to_string(),
        name: name.to_string(),
        slug: name.to_lowercase(),
    }
}

pub fn test_vrf(id: u64, name: &str) -> Vrf {
    Vrf {
        id,
        url: format!("{}/api/ipam/vrfs/{}/", BASE_URL, id),
        display: name.to_string(),
        name: name.to_string(),
        rd: None,
    }
}

pub fn test_subnet(id: u64, prefix: &str) -> Subnet {
    Subnet {
        id,
        url: format!("{}/api/ipam/subnets/{}/", BASE_URL, id),
        display: prefix.to_string(),
        prefix: prefix.to_string(),
        description: String::new(),
    }
}

pub fn test_nested_role(id: u64, name: &str) -> NestedDeviceRole {
    NestedDeviceRole {
        id,
        url: format!("{}/api/dcim/device-roles/{}/", BASE_URL, id),
        display: name.to_string(),
        name: name.to_string(),
    }
}

pub fn test_nested_cluster(id: u64, name: &str) -> NestedCluster {
    NestedCluster {
        id,
        url: format!("{}/api/virtualization/clusters/{}/", BASE_URL, id),
        display: name.to_string(),
        name: name.to_string(),
    }
}

pub fn test_nested_tenant(id: u64, name: &str) -> NestedTenant {
    NestedTenant {
        id,
        url: format!("{}/api/tenancy/tenants/{}/", BASE_URL, id),
        display: name.to_string(),
        name: name.to_string(),
    }
}

pub fn test_nested_ip(id: u64, address: &str) -> NestedIpAddress {
    NestedIpAddress {
        id,
        url: format!("{}/api/ipam/ip-addresses/{}/", BASE_URL, id),
        display: address.to_string(),
        address: address.to_string(),
    }
}

pub fn test_row(row: usize, name: Option<&str>, role: Option<&str>) -> VmRow {
    VmRow {
        row,
        name: name.map(str::to_string),
        role: role.map(str::to_string),
        ..VmRow::default()
    }
}
