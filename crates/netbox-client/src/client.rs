//! NetBox API client
//!
//! Implements the NetBox REST API client for the VM inventory importer.
//! Resource paths covered: /virtualization/virtual-machines/,
//! /virtualization/interfaces/, /virtualization/clusters/,
//! /virtualization/cluster-types/, /ipam/ip-addresses/, /ipam/subnets/,
//! /ipam/vrfs/ and /dcim/device-roles/.

use crate::common::{query::query_resources, HttpClient};
use crate::error::NetBoxError;
use crate::models::*;
use crate::netbox_trait::NetBoxClientTrait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// NetBox API client
#[derive(Debug)]
pub struct NetBoxClient {
    http: HttpClient,
}

impl NetBoxClient {
    /// Create a new NetBox client
    ///
    /// # Arguments
    /// * `base_url` - NetBox base URL (e.g., "http://netbox:80")
    /// * `token` - API token for authentication
    pub fn new(base_url: String, token: String) -> Result<Self, NetBoxError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(NetBoxError::Http)?;

        Ok(Self {
            http: HttpClient::new(client, base_url, token),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Validate the API token by making a lightweight authenticated request
    /// to the NetBox status endpoint.
    pub async fn validate_token(&self) -> Result<(), NetBoxError> {
        debug!("Validating NetBox token and connectivity");
        let _status: serde_json::Value = self.http.get("/api/status/").await?;
        Ok(())
    }

    /// Query a collection with exact-match filters and return the first
    /// result, if any.
    async fn first_match<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        filters: &[(&str, &str)],
    ) -> Result<Option<T>, NetBoxError> {
        let mut results: Vec<T> = query_resources(&self.http, endpoint, filters, false).await?;
        if results.is_empty() {
            Ok(None)
        } else {
            Ok(Some(results.remove(0)))
        }
    }

    // ====================
    // Virtual machines
    // ====================

    /// Get a virtual machine by its exact name (first match)
    pub async fn get_virtual_machine_by_name(
        &self,
        name: &str,
    ) -> Result<Option<VirtualMachine>, NetBoxError> {
        debug!("Looking up virtual machine {:?}", name);
        self.first_match("virtualization/virtual-machines", &[("name", name)])
            .await
    }

    /// Create a virtual machine from a desired-state record
    pub async fn create_virtual_machine(
        &self,
        request: &VirtualMachineRequest,
    ) -> Result<VirtualMachine, NetBoxError> {
        debug!("Creating virtual machine {:?}", request.name);
        self.http
            .post("/api/virtualization/virtual-machines/", &request.to_body())
            .await
    }

    /// Update an existing virtual machine with the full desired payload
    pub async fn update_virtual_machine(
        &self,
        id: u64,
        request: &VirtualMachineRequest,
    ) -> Result<VirtualMachine, NetBoxError> {
        debug!("Updating virtual machine {} ({:?})", id, request.name);
        self.http
            .patch(
                &format!("/api/virtualization/virtual-machines/{}/", id),
                &request.to_body(),
            )
            .await
    }

    /// Patch only the primary IPv4 reference of a virtual machine
    ///
    /// Used as the follow-up step when the address could not ride the
    /// creation payload (it must be assigned to one of the VM's interfaces
    /// first).
    pub async fn set_primary_ip4(
        &self,
        vm_id: u64,
        ip_id: u64,
    ) -> Result<VirtualMachine, NetBoxError> {
        debug!("Setting primary_ip4 of virtual machine {} to IP {}", vm_id, ip_id);
        let body = serde_json::json!({"primary_ip4": {"id": ip_id}});
        self.http
            .patch(&format!("/api/virtualization/virtual-machines/{}/", vm_id), &body)
            .await
    }

    // ====================
    // VM interfaces
    // ====================

    /// List the interfaces attached to a virtual machine
    pub async fn query_vm_interfaces(&self, vm_id: u64) -> Result<Vec<VmInterface>, NetBoxError> {
        debug!("Querying interfaces of virtual machine {}", vm_id);
        let vm_id = vm_id.to_string();
        query_resources(
            &self.http,
            "virtualization/interfaces",
            &[("virtual_machine_id", vm_id.as_str())],
            true,
        )
        .await
    }

    /// Create an interface on a virtual machine
    pub async fn create_vm_interface(
        &self,
        vm_id: u64,
        name: &str,
    ) -> Result<VmInterface, NetBoxError> {
        debug!("Creating interface {:?} on virtual machine {}", name, vm_id);
        let body = serde_json::json!({
            "virtual_machine": {"id": vm_id},
            "name": name,
            "type": {"value": "virtual"},
        });
        self.http.post("/api/virtualization/interfaces/", &body).await
    }

    // ====================
    // IP addresses and subnets
    // ====================

    /// Get an IP address by its value (first match)
    pub async fn get_ip_address_by_address(
        &self,
        address: &str,
    ) -> Result<Option<IpAddress>, NetBoxError> {
        debug!("Looking up IP address {:?}", address);
        self.first_match("ipam/ip-addresses", &[("address", address)])
            .await
    }

    /// Create a new IP address
    pub async fn create_ip_address(
        &self,
        address: &str,
        description: &str,
    ) -> Result<IpAddress, NetBoxError> {
        debug!("Creating IP address {:?}", address);
        let body = serde_json::json!({
            "address": address,
            "description": description,
        });
        self.http.post("/api/ipam/ip-addresses/", &body).await
    }

    /// Assign an IP address to a VM interface
    pub async fn assign_ip_to_interface(
        &self,
        ip_id: u64,
        interface_id: u64,
    ) -> Result<IpAddress, NetBoxError> {
        debug!("Assigning IP {} to interface {}", ip_id, interface_id);
        let body = serde_json::json!({
            "assigned_object_type": "virtualization.vminterface",
            "assigned_object_id": interface_id,
        });
        self.http
            .patch(&format!("/api/ipam/ip-addresses/{}/", ip_id), &body)
            .await
    }

    /// Find the most specific subnet containing the given address
    pub async fn find_containing_subnet(&self, ip: &str) -> Result<Option<Subnet>, NetBoxError> {
        debug!("Looking up subnet containing {:?}", ip);
        let subnets: Vec<Subnet> =
            query_resources(&self.http, "ipam/subnets", &[("contains", ip)], true).await?;
        Ok(subnets
            .into_iter()
            .max_by_key(|s| s.prefix_length().unwrap_or(0)))
    }

    // ====================
    // Device roles
    // ====================

    /// Get a device role by its exact name (first match)
    pub async fn get_device_role_by_name(
        &self,
        name: &str,
    ) -> Result<Option<DeviceRole>, NetBoxError> {
        debug!("Looking up device role {:?}", name);
        self.first_match("dcim/device-roles", &[("name", name)]).await
    }

    /// Create a device role
    pub async fn create_device_role(
        &self,
        name: &str,
        slug: &str,
        color: &str,
        description: &str,
    ) -> Result<DeviceRole, NetBoxError> {
        debug!("Creating device role {:?}", name);
        let body = serde_json::json!({
            "name": name,
            "slug": slug,
            "color": color,
            "description": description,
        });
        self.http.post("/api/dcim/device-roles/", &body).await
    }

    // ====================
    // Clusters and cluster types
    // ====================

    /// Get a cluster by its exact name (first match)
    pub async fn get_cluster_by_name(&self, name: &str) -> Result<Option<Cluster>, NetBoxError> {
        debug!("Looking up cluster {:?}", name);
        self.first_match("virtualization/clusters", &[("name", name)])
            .await
    }

    /// Create a cluster
    pub async fn create_cluster(
        &self,
        name: &str,
        type_id: u64,
        site_id: u64,
        description: &str,
    ) -> Result<Cluster, NetBoxError> {
        debug!("Creating cluster {:?}", name);
        let body = serde_json::json!({
            "name": name,
            "type": {"id": type_id},
            "site": {"id": site_id},
            "description": description,
        });
        self.http.post("/api/virtualization/clusters/", &body).await
    }

    /// Get a cluster type by its exact name (first match)
    pub async fn get_cluster_type_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ClusterType>, NetBoxError> {
        debug!("Looking up cluster type {:?}", name);
        self.first_match("virtualization/cluster-types", &[("name", name)])
            .await
    }

    // ====================
    // VRFs
    // ====================

    /// Get a VRF by its exact name (first match)
    pub async fn get_vrf_by_name(&self, name: &str) -> Result<Option<Vrf>, NetBoxError> {
        debug!("Looking up VRF {:?}", name);
        self.first_match("ipam/vrfs", &[("name", name)]).await
    }
}

#[async_trait::async_trait]
impl NetBoxClientTrait for NetBoxClient {
    fn base_url(&self) -> &str {
        self.base_url()
    }

    async fn validate_token(&self) -> Result<(), NetBoxError> {
        self.validate_token().await
    }

    async fn get_virtual_machine_by_name(
        &self,
        name: &str,
    ) -> Result<Option<VirtualMachine>, NetBoxError> {
        self.get_virtual_machine_by_name(name).await
    }

    async fn create_virtual_machine(
        &self,
        request: &VirtualMachineRequest,
    ) -> Result<VirtualMachine, NetBoxError> {
        self.create_virtual_machine(request).await
    }

    async fn update_virtual_machine(
        &self,
        id: u64,
        request: &VirtualMachineRequest,
    ) -> Result<VirtualMachine, NetBoxError> {
        self.update_virtual_machine(id, request).await
    }

    async fn set_primary_ip4(&self, vm_id: u64, ip_id: u64) -> Result<VirtualMachine, NetBoxError> {
        self.set_primary_ip4(vm_id, ip_id).await
    }

    async fn query_vm_interfaces(&self, vm_id: u64) -> Result<Vec<VmInterface>, NetBoxError> {
        self.query_vm_interfaces(vm_id).await
    }

    async fn create_vm_interface(
        &self,
        vm_id: u64,
        name: &str,
    ) -> Result<VmInterface, NetBoxError> {
        self.create_vm_interface(vm_id, name).await
    }

    async fn get_ip_address_by_address(
        &self,
        address: &str,
    ) -> Result<Option<IpAddress>, NetBoxError> {
        self.get_ip_address_by_address(address).await
    }

    async fn create_ip_address(
        &self,
        address: &str,
        description: &str,
    ) -> Result<IpAddress, NetBoxError> {
        self.create_ip_address(address, description).await
    }

    async fn assign_ip_to_interface(
        &self,
        ip_id: u64,
        interface_id: u64,
    ) -> Result<IpAddress, NetBoxError> {
        self.assign_ip_to_interface(ip_id, interface_id).await
    }

    async fn find_containing_subnet(&self, ip: &str) -> Result<Option<Subnet>, NetBoxError> {
        self.find_containing_subnet(ip).await
    }

    async fn get_device_role_by_name(
        &self,
        name: &str,
    ) -> Result<Option<DeviceRole>, NetBoxError> {
        self.get_device_role_by_name(name).await
    }

    async fn create_device_role(
        &self,
        name: &str,
        slug: &str,
        color: &str,
        description: &str,
    ) -> Result<DeviceRole, NetBoxError> {
        self.create_device_role(name, slug, color, description).await
    }

    async fn get_cluster_by_name(&self, name: &str) -> Result<Option<Cluster>, NetBoxError> {
        self.get_cluster_by_name(name).await
    }

    async fn create_cluster(
        &self,
        name: &str,
        type_id: u64,
        site_id: u64,
        description: &str,
    ) -> Result<Cluster, NetBoxError> {
        self.create_cluster(name, type_id, site_id, description).await
    }

    async fn get_cluster_type_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ClusterType>, NetBoxError> {
        self.get_cluster_type_by_name(name).await
    }

    async fn get_vrf_by_name(&self, name: &str) -> Result<Option<Vrf>, NetBoxError> {
        self.get_vrf_by_name(name).await
    }
}
