//! NetBox API models
//!
//! These models match the NetBox REST API serializers for the resources the
//! VM importer touches, trimmed to the fields the importer reads.

use serde::{Deserialize, Serialize};

/// Virtual machine model matching NetBox VirtualMachineSerializer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VirtualMachine {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
    pub role: Option<NestedDeviceRole>,
    pub cluster: Option<NestedCluster>,
    pub tenant: Option<NestedTenant>,
    pub vrf: Option<NestedVrf>,
    pub primary_ip4: Option<NestedIpAddress>,
    pub description: String,
    pub serial: String,
    // NetBox serializes vcpus as a decimal (e.g. 4.0)
    pub vcpus: Option<f64>,
    pub memory: Option<u64>,
    pub disk: Option<u64>,
}

/// IP address model matching NetBox IPAddressSerializer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IpAddress {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub address: String, // e.g., "192.168.1.1/24"
    pub assigned_object_type: Option<String>,
    pub assigned_object_id: Option<u64>,
    pub assigned_object: Option<serde_json::Value>,
    pub description: String,
}

impl IpAddress {
    /// Whether this address is assigned to a VM interface
    pub fn is_assigned_to_vm_interface(&self) -> bool {
        self.assigned_object_type.as_deref() == Some("virtualization.vminterface")
            && self.assigned_object_id.is_some()
    }
}

/// VM interface model matching NetBox VMInterfaceSerializer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VmInterface {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
    pub virtual_machine: NestedVirtualMachine,
}

/// Device role model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeviceRole {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
    pub slug: String,
    pub color: String,
    pub description: String,
}

/// Cluster model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Cluster {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
    #[serde(rename = "type")]
    pub cluster_type: NestedClusterType,
    pub site: Option<NestedSite>,
    pub description: String,
}

/// Cluster type model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClusterType {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
    pub slug: String,
}

/// VRF model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Vrf {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
    pub rd: Option<String>,
}

/// Subnet model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Subnet {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub prefix: String, // e.g., "192.168.1.0/24"
    pub description: String,
}

impl Subnet {
    /// The prefix length, e.g. 24 for "192.168.1.0/24"
    pub fn prefix_length(&self) -> Option<u8> {
        self.prefix.split('/').nth(1).and_then(|p| p.parse().ok())
    }
}

// Nested serializers (simplified versions for references)

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedDeviceRole {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedCluster {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedClusterType {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedTenant {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedVrf {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedSite {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedIpAddress {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NestedVirtualMachine {
    pub id: u64,
    pub url: String,
    pub display: String,
    pub name: String,
}

/// Cluster reference in a desired-state record: by id once resolved, by raw
/// name when the remote system is left to resolve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterRef {
    Id(u64),
    Name(String),
}

/// Desired state for a virtual machine, built from one spreadsheet row.
///
/// This is the typed record the reconciler diffs against the remote
/// [`VirtualMachine`]; [`to_body`](Self::to_body) is the explicit
/// serialization step to the wire format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualMachineRequest {
    pub name: String,
    pub role_id: u64,
    pub description: String,
    pub serial: String,
    pub vcpus: Option<u64>,
    pub memory: Option<u64>,
    pub disk: Option<u64>,
    pub cluster: Option<ClusterRef>,
    pub tenant_name: Option<String>,
    pub vrf_id: Option<u64>,
    pub primary_ip4_id: Option<u64>,
}

impl VirtualMachineRequest {
    /// Serialize to a NetBox request body.
    ///
    /// Scalar fields are always present (`null` clears the remote value);
    /// reference fields are included only when the row named them, matching
    /// PATCH semantics.
    pub fn to_body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "name": self.name,
            "role": {"id": self.role_id},
            "description": self.description,
            "serial": self.serial,
            "vcpus": self.vcpus,
            "memory": self.memory,
            "disk": self.disk,
        });

        match &self.cluster {
            Some(ClusterRef::Id(id)) => {
                body["cluster"] = serde_json::json!({"id": id});
            }
            Some(ClusterRef::Name(name)) => {
                body["cluster"] = serde_json::json!({"name": name});
            }
            None => {}
        }

        if let Some(tenant) = &self.tenant_name {
            body["tenant"] = serde_json::json!({"name": tenant});
        }

        if let Some(vrf_id) = self.vrf_id {
            body["vrf"] = serde_json::json!({"id": vrf_id});
        }

        if let Some(ip_id) = self.primary_ip4_id {
            body["primary_ip4"] = serde_json::json!({"id": ip_id});
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_always_carries_scalars() {
        let request = VirtualMachineRequest {
            name: "srv01".to_string(),
            role_id: 7,
            ..VirtualMachineRequest::default()
        };
        let body = request.to_body();

        assert_eq!(body["name"], "srv01");
        assert_eq!(body["role"]["id"], 7);
        assert_eq!(body["description"], "");
        assert!(body["vcpus"].is_null());
        assert!(body["memory"].is_null());
        // Reference fields stay out of the body entirely when unset
        assert!(body.get("cluster").is_none());
        assert!(body.get("tenant").is_none());
        assert!(body.get("primary_ip4").is_none());
    }

    #[test]
    fn request_body_cluster_by_id_or_name() {
        let mut request = VirtualMachineRequest {
            name: "srv01".to_string(),
            role_id: 7,
            cluster: Some(ClusterRef::Id(4)),
            ..VirtualMachineRequest::default()
        };
        assert_eq!(request.to_body()["cluster"]["id"], 4);

        request.cluster = Some(ClusterRef::Name("kln-esx".to_string()));
        assert_eq!(request.to_body()["cluster"]["name"], "kln-esx");
    }

    #[test]
    fn subnet_prefix_length() {
        let subnet = Subnet {
            id: 1,
            url: String::new(),
            display: "10.0.0.0/22".to_string(),
            prefix: "10.0.0.0/22".to_string(),
            description: String::new(),
        };
        assert_eq!(subnet.prefix_length(), Some(22));
    }
}
