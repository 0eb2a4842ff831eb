//! NetBoxClient trait for mocking
//!
//! This trait abstracts the NetBoxClient to enable mocking in unit tests.
//! The concrete NetBoxClient implements this trait, and tests can use mock
//! implementations.

use crate::error::NetBoxError;
use crate::models::*;

/// Trait for NetBox API client operations
///
/// This trait enables mocking of NetBox API calls for unit testing.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait NetBoxClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Validate the API token
    async fn validate_token(&self) -> Result<(), NetBoxError>;

    // Virtualization operations
    async fn get_virtual_machine_by_name(&self, name: &str) -> Result<Option<VirtualMachine>, NetBoxError>;
    async fn create_virtual_machine(&self, request: &VirtualMachineRequest) -> Result<VirtualMachine, NetBoxError>;
    async fn update_virtual_machine(&self, id: u64, request: &VirtualMachineRequest) -> Result<VirtualMachine, NetBoxError>;
    async fn set_primary_ip4(&self, vm_id: u64, ip_id: u64) -> Result<VirtualMachine, NetBoxError>;
    async fn query_vm_interfaces(&self, vm_id: u64) -> Result<Vec<VmInterface>, NetBoxError>;
    async fn create_vm_interface(&self, vm_id: u64, name: &str) -> Result<VmInterface, NetBoxError>;
    async fn get_cluster_by_name(&self, name: &str) -> Result<Option<Cluster>, NetBoxError>;
    async fn create_cluster(&self, name: &str, type_id: u64, site_id: u64, description: &str) -> Result<Cluster, NetBoxError>;
    async fn get_cluster_type_by_name(&self, name: &str) -> Result<Option<ClusterType>, NetBoxError>;

    // IPAM operations
    async fn get_ip_address_by_address(&self, address: &str) -> Result<Option<IpAddress>, NetBoxError>;
    async fn create_ip_address(&self, address: &str, description: &str) -> Result<IpAddress, NetBoxError>;
    async fn assign_ip_to_interface(&self, ip_id: u64, interface_id: u64) -> Result<IpAddress, NetBoxError>;
    async fn find_containing_subnet(&self, ip: &str) -> Result<Option<Subnet>, NetBoxError>;
    async fn get_vrf_by_name(&self, name: &str) -> Result<Option<Vrf>, NetBoxError>;

    // DCIM operations
    async fn get_device_role_by_name(&self, name: &str) -> Result<Option<DeviceRole>, NetBoxError>;
    async fn create_device_role(&self, name: &str, slug: &str, color: &str, description: &str) -> Result<DeviceRole, NetBoxError>;
}
