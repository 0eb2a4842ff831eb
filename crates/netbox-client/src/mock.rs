//! Mock NetBoxClient for unit testing
//!
//! This module provides a mock implementation of NetBoxClientTrait that can
//! be used in unit tests without requiring a running NetBox instance.
//!
//! The mock stores resources in memory, mirrors the API's validation of
//! primary-IP assignment (a primary IPv4 must already be assigned to one of
//! the virtual machine's own interfaces), and counts mutating calls so tests
//! can assert that a reconciliation run issued no unnecessary writes.

use crate::error::NetBoxError;
use crate::models::*;
use crate::netbox_trait::NetBoxClientTrait;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

/// Counters for mutating API calls issued against the mock
#[derive(Debug, Clone, Default)]
pub struct MockCallCounts {
    pub vm_creates: u64,
    pub vm_updates: u64,
    pub primary_ip4_patches: u64,
    pub interface_creates: u64,
    pub ip_creates: u64,
    pub ip_assignments: u64,
    pub role_creates: u64,
    pub cluster_creates: u64,
}

impl MockCallCounts {
    /// Total number of mutating calls of any kind
    pub fn total_mutations(&self) -> u64 {
        self.vm_creates
            + self.vm_updates
            + self.primary_ip4_patches
            + self.interface_creates
            + self.ip_creates
            + self.ip_assignments
            + self.role_creates
            + self.cluster_creates
    }
}

/// Mock NetBoxClient for testing
///
/// This mock stores resources in memory and can be seeded with objects via
/// the `add_*` helpers to simulate pre-existing remote state.
#[derive(Debug, Clone)]
pub struct MockNetBoxClient {
    base_url: String,
    // In-memory storage for resources
    vms: Arc<Mutex<HashMap<u64, VirtualMachine>>>,
    interfaces: Arc<Mutex<HashMap<u64, VmInterface>>>,
    ips: Arc<Mutex<HashMap<u64, IpAddress>>>,
    subnets: Arc<Mutex<HashMap<u64, Subnet>>>,
    vrfs: Arc<Mutex<HashMap<u64, Vrf>>>,
    device_roles: Arc<Mutex<HashMap<u64, DeviceRole>>>,
    clusters: Arc<Mutex<HashMap<u64, Cluster>>>,
    cluster_types: Arc<Mutex<HashMap<u64, ClusterType>>>,
    // Counter for generating IDs
    next_id: Arc<Mutex<u64>>,
    counts: Arc<Mutex<MockCallCounts>>,
}

impl MockNetBoxClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            vms: Arc::new(Mutex::new(HashMap::new())),
            interfaces: Arc::new(Mutex::new(HashMap::new())),
            ips: Arc::new(Mutex::new(HashMap::new())),
            subnets: Arc::new(Mutex::new(HashMap::new())),
            vrfs: Arc::new(Mutex::new(HashMap::new())),
            device_roles: Arc::new(Mutex::new(HashMap::new())),
            clusters: Arc::new(Mutex::new(HashMap::new())),
            cluster_types: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
            counts: Arc::new(Mutex::new(MockCallCounts::default())),
        }
    }

    /// Snapshot of the mutating-call counters
    pub fn counts(&self) -> MockCallCounts {
        self.counts.lock().unwrap().clone()
    }

    /// Reset the mutating-call counters (e.g. between two reconciliation runs)
    pub fn reset_counts(&self) {
        *self.counts.lock().unwrap() = MockCallCounts::default();
    }

    /// Add a virtual machine to the mock store (for test setup)
    pub fn add_virtual_machine(&self, vm: VirtualMachine) {
        self.bump_next_id(vm.id);
        self.vms.lock().unwrap().insert(vm.id, vm);
    }

    /// Add a VM interface to the mock store (for test setup)
    pub fn add_vm_interface(&self, interface: VmInterface) {
        self.bump_next_id(interface.id);
        self.interfaces.lock().unwrap().insert(interface.id, interface);
    }

    /// Add an IP address to the mock store (for test setup)
    pub fn add_ip_address(&self, ip: IpAddress) {
        self.bump_next_id(ip.id);
        self.ips.lock().unwrap().insert(ip.id, ip);
    }

    /// Add a subnet to the mock store (for test setup)
    pub fn add_subnet(&self, subnet: Subnet) {
        self.bump_next_id(subnet.id);
        self.subnets.lock().unwrap().insert(subnet.id, subnet);
    }

    /// Add a VRF to the mock store (for test setup)
    pub fn add_vrf(&self, vrf: Vrf) {
        self.bump_next_id(vrf.id);
        self.vrfs.lock().unwrap().insert(vrf.id, vrf);
    }

    /// Add a device role to the mock store (for test setup)
    pub fn add_device_role(&self, role: DeviceRole) {
        self.bump_next_id(role.id);
        self.device_roles.lock().unwrap().insert(role.id, role);
    }

    /// Add a cluster to the mock store (for test setup)
    pub fn add_cluster(&self, cluster: Cluster) {
        self.bump_next_id(cluster.id);
        self.clusters.lock().unwrap().insert(cluster.id, cluster);
    }

    /// Add a cluster type to the mock store (for test setup)
    pub fn add_cluster_type(&self, cluster_type: ClusterType) {
        self.bump_next_id(cluster_type.id);
        self.cluster_types.lock().unwrap().insert(cluster_type.id, cluster_type);
    }

    /// Fetch a stored virtual machine by id (for test assertions)
    pub fn virtual_machine(&self, id: u64) -> Option<VirtualMachine> {
        self.vms.lock().unwrap().get(&id).cloned()
    }

    /// Fetch a stored IP address by id (for test assertions)
    pub fn ip_address(&self, id: u64) -> Option<IpAddress> {
        self.ips.lock().unwrap().get(&id).cloned()
    }

    /// Generate next ID
    fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }

    /// Keep generated IDs clear of seeded ones
    fn bump_next_id(&self, seen: u64) {
        let mut id = self.next_id.lock().unwrap();
        if seen >= *id {
            *id = seen + 1;
        }
    }

    fn nested_role(&self, id: u64) -> NestedDeviceRole {
        let name = self
            .device_roles
            .lock()
            .unwrap()
            .get(&id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("Role {}", id));
        NestedDeviceRole {
            id,
            url: format!("{}/api/dcim/device-roles/{}/", self.base_url, id),
            display: name.clone(),
            name,
        }
    }

    fn nested_cluster_by_id(&self, id: u64) -> NestedCluster {
        let name = self
            .clusters
            .lock()
            .unwrap()
            .get(&id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("Cluster {}", id));
        NestedCluster {
            id,
            url: format!("{}/api/virtualization/clusters/{}/", self.base_url, id),
            display: name.clone(),
            name,
        }
    }

    fn nested_cluster_by_name(&self, name: &str) -> NestedCluster {
        let id = self
            .clusters
            .lock()
            .unwrap()
            .values()
            .find(|c| c.name == name)
            .map(|c| c.id)
            .unwrap_or(0);
        NestedCluster {
            id,
            url: format!("{}/api/virtualization/clusters/{}/", self.base_url, id),
            display: name.to_string(),
            name: name.to_string(),
        }
    }

    fn nested_vrf(&self, id: u64) -> NestedVrf {
        let name = self
            .vrfs
            .lock()
            .unwrap()
            .get(&id)
            .map(|v| v.name.clone())
            .unwrap_or_else(|| format!("VRF {}", id));
        NestedVrf {
            id,
            url: format!("{}/api/ipam/vrfs/{}/", self.base_url, id),
            display: name.clone(),
            name,
        }
    }

    fn nested_ip(&self, id: u64) -> NestedIpAddress {
        let address = self
            .ips
            .lock()
            .unwrap()
            .get(&id)
            .map(|ip| ip.address.clone())
            .unwrap_or_default();
        NestedIpAddress {
            id,
            url: format!("{}/api/ipam/ip-addresses/{}/", self.base_url, id),
            display: address.clone(),
            address,
        }
    }

    /// Whether the IP is assigned to an interface belonging to the given VM
    fn ip_assigned_to_vm(&self, ip_id: u64, vm_id: u64) -> bool {
        let assigned = self
            .ips
            .lock()
            .unwrap()
            .get(&ip_id)
            .filter(|ip| ip.is_assigned_to_vm_interface())
            .and_then(|ip| ip.assigned_object_id);
        match assigned {
            Some(interface_id) => self
                .interfaces
                .lock()
                .unwrap()
                .get(&interface_id)
                .map(|i| i.virtual_machine.id == vm_id)
                .unwrap_or(false),
            None => false,
        }
    }

    /// Apply a desired-state record onto a stored VM, mirroring a NetBox
    /// write. `primary_ip4` changes only when the request carries it (the
    /// serialized body omits the key otherwise).
    fn apply_request(&self, vm: &mut VirtualMachine, request: &VirtualMachineRequest) {
        vm.name = request.name.clone();
        vm.display = request.name.clone();
        vm.role = Some(self.nested_role(request.role_id));
        vm.description = request.description.clone();
        vm.serial = request.serial.clone();
        vm.vcpus = request.vcpus.map(|v| v as f64);
        vm.memory = request.memory;
        vm.disk = request.disk;
        match &request.cluster {
            Some(ClusterRef::Id(id)) => vm.cluster = Some(self.nested_cluster_by_id(*id)),
            Some(ClusterRef::Name(name)) => vm.cluster = Some(self.nested_cluster_by_name(name)),
            None => {}
        }
        if let Some(tenant) = &request.tenant_name {
            vm.tenant = Some(NestedTenant {
                id: 0,
                url: format!("{}/api/tenancy/tenants/0/", self.base_url),
                display: tenant.clone(),
                name: tenant.clone(),
            });
        }
        if let Some(vrf_id) = request.vrf_id {
            vm.vrf = Some(self.nested_vrf(vrf_id));
        }
        if let Some(ip_id) = request.primary_ip4_id {
            vm.primary_ip4 = Some(self.nested_ip(ip_id));
        }
    }

    fn address_matches(stored: &str, query: &str) -> bool {
        if stored == query {
            return true;
        }
        // A query without a mask matches any stored mask, as the API filter does
        if !query.contains('/') {
            return stored.split('/').next() == Some(query);
        }
        false
    }
}

#[async_trait::async_trait]
impl NetBoxClientTrait for MockNetBoxClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), NetBoxError> {
        Ok(())
    }

    async fn get_virtual_machine_by_name(
        &self,
        name: &str,
    ) -> Result<Option<VirtualMachine>, NetBoxError> {
        let vms = self.vms.lock().unwrap();
        let mut matches: Vec<&VirtualMachine> = vms.values().filter(|vm| vm.name == name).collect();
        matches.sort_by_key(|vm| vm.id);
        Ok(matches.first().map(|vm| (*vm).clone()))
    }

    async fn create_virtual_machine(
        &self,
        request: &VirtualMachineRequest,
    ) -> Result<VirtualMachine, NetBoxError> {
        if request.primary_ip4_id.is_some() {
            // NetBox rejects a primary IP that is not assigned to one of the
            // (not yet existing) VM's interfaces
            return Err(NetBoxError::Api(
                "primary_ip4: the specified IP address must be assigned to one of the virtual machine's interfaces".to_string(),
            ));
        }
        let id = self.next_id();
        let mut vm = VirtualMachine {
            id,
            url: format!("{}/api/virtualization/virtual-machines/{}/", self.base_url, id),
            display: request.name.clone(),
            name: request.name.clone(),
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
        };
        self.apply_request(&mut vm, request);
        self.vms.lock().unwrap().insert(id, vm.clone());
        self.counts.lock().unwrap().vm_creates += 1;
        Ok(vm)
    }

    async fn update_virtual_machine(
        &self,
        id: u64,
        request: &VirtualMachineRequest,
    ) -> Result<VirtualMachine, NetBoxError> {
        if let Some(ip_id) = request.primary_ip4_id {
            if !self.ip_assigned_to_vm(ip_id, id) {
                return Err(NetBoxError::Api(
                    "primary_ip4: the specified IP address must be assigned to one of the virtual machine's interfaces".to_string(),
                ));
            }
        }
        let mut vms = self.vms.lock().unwrap();
        let vm = vms
            .get_mut(&id)
            .ok_or_else(|| NetBoxError::NotFound(format!("Virtual machine {} not found", id)))?;
        let mut updated = vm.clone();
        drop(vms);
        self.apply_request(&mut updated, request);
        self.vms.lock().unwrap().insert(id, updated.clone());
        self.counts.lock().unwrap().vm_updates += 1;
        Ok(updated)
    }

    async fn set_primary_ip4(&self, vm_id: u64, ip_id: u64) -> Result<VirtualMachine, NetBoxError> {
        if !self.ip_assigned_to_vm(ip_id, vm_id) {
            return Err(NetBoxError::Api(
                "primary_ip4: the specified IP address must be assigned to one of the virtual machine's interfaces".to_string(),
            ));
        }
        let nested = self.nested_ip(ip_id);
        let mut vms = self.vms.lock().unwrap();
        let vm = vms
            .get_mut(&vm_id)
            .ok_or_else(|| NetBoxError::NotFound(format!("Virtual machine {} not found", vm_id)))?;
        vm.primary_ip4 = Some(nested);
        let updated = vm.clone();
        drop(vms);
        self.counts.lock().unwrap().primary_ip4_patches += 1;
        Ok(updated)
    }

    async fn query_vm_interfaces(&self, vm_id: u64) -> Result<Vec<VmInterface>, NetBoxError> {
        let interfaces = self.interfaces.lock().unwrap();
        let mut result: Vec<VmInterface> = interfaces
            .values()
            .filter(|i| i.virtual_machine.id == vm_id)
            .cloned()
            .collect();
        result.sort_by_key(|i| i.id);
        Ok(result)
    }

    async fn create_vm_interface(
        &self,
        vm_id: u64,
        name: &str,
    ) -> Result<VmInterface, NetBoxError> {
        let vm_name = self
            .vms
            .lock()
            .unwrap()
            .get(&vm_id)
            .map(|vm| vm.name.clone())
            .ok_or_else(|| NetBoxError::NotFound(format!("Virtual machine {} not found", vm_id)))?;
        let id = self.next_id();
        let interface = VmInterface {
            id,
            url: format!("{}/api/virtualization/interfaces/{}/", self.base_url, id),
            display: name.to_string(),
            name: name.to_string(),
            virtual_machine: NestedVirtualMachine {
                id: vm_id,
                url: format!("{}/api/virtualization/virtual-machines/{}/", self.base_url, vm_id),
                display: vm_name.clone(),
                name: vm_name,
            },
        };
        self.interfaces.lock().unwrap().insert(id, interface.clone());
        self.counts.lock().unwrap().interface_creates += 1;
        Ok(interface)
    }

    async fn get_cluster_by_name(&self, name: &str) -> Result<Option<Cluster>, NetBoxError> {
        let clusters = self.clusters.lock().unwrap();
        let mut matches: Vec<&Cluster> = clusters.values().filter(|c| c.name == name).collect();
        matches.sort_by_key(|c| c.id);
        Ok(matches.first().map(|c| (*c).clone()))
    }

    async fn create_cluster(
        &self,
        name: &str,
        type_id: u64,
        site_id: u64,
        description: &str,
    ) -> Result<Cluster, NetBoxError> {
        let cluster_type = self
            .cluster_types
            .lock()
            .unwrap()
            .get(&type_id)
            .map(|t| NestedClusterType {
                id: t.id,
                url: t.url.clone(),
                display: t.name.clone(),
                name: t.name.clone(),
            })
            .ok_or_else(|| NetBoxError::Api(format!("Cluster type {} does not exist", type_id)))?;
        let id = self.next_id();
        let cluster = Cluster {
            id,
            url: format!("{}/api/virtualization/clusters/{}/", self.base_url, id),
            display: name.to_string(),
            name: name.to_string(),
            cluster_type,
            site: Some(NestedSite {
                id: site_id,
                url: format!("{}/api/dcim/sites/{}/", self.base_url, site_id),
                display: format!("Site {}", site_id),
                name: format!("Site {}", site_id),
            }),
            description: description.to_string(),
        };
        self.clusters.lock().unwrap().insert(id, cluster.clone());
        self.counts.lock().unwrap().cluster_creates += 1;
        Ok(cluster)
    }

    async fn get_cluster_type_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ClusterType>, NetBoxError> {
        let cluster_types = self.cluster_types.lock().unwrap();
        let mut matches: Vec<&ClusterType> =
            cluster_types.values().filter(|t| t.name == name).collect();
        matches.sort_by_key(|t| t.id);
        Ok(matches.first().map(|t| (*t).clone()))
    }

    async fn get_ip_address_by_address(
        &self,
        address: &str,
    ) -> Result<Option<IpAddress>, NetBoxError> {
        let ips = self.ips.lock().unwrap();
        let mut matches: Vec<&IpAddress> = ips
            .values()
            .filter(|ip| Self::address_matches(&ip.address, address))
            .collect();
        matches.sort_by_key(|ip| ip.id);
        Ok(matches.first().map(|ip| (*ip).clone()))
    }

    async fn create_ip_address(
        &self,
        address: &str,
        description: &str,
    ) -> Result<IpAddress, NetBoxError> {
        let id = self.next_id();
        let ip = IpAddress {
            id,
            url: format!("{}/api/ipam/ip-addresses/{}/", self.base_url, id),
            display: address.to_string(),
            address: address.to_string(),
            assigned_object_type: None,
            assigned_object_id: None,
            assigned_object: None,
            description: description.to_string(),
        };
        self.ips.lock().unwrap().insert(id, ip.clone());
        self.counts.lock().unwrap().ip_creates += 1;
        Ok(ip)
    }

    async fn assign_ip_to_interface(
        &self,
        ip_id: u64,
        interface_id: u64,
    ) -> Result<IpAddress, NetBoxError> {
        let interface = self
            .interfaces
            .lock()
            .unwrap()
            .get(&interface_id)
            .cloned()
            .ok_or_else(|| NetBoxError::NotFound(format!("Interface {} not found", interface_id)))?;
        let mut ips = self.ips.lock().unwrap();
        let ip = ips
            .get_mut(&ip_id)
            .ok_or_else(|| NetBoxError::NotFound(format!("IP address {} not found", ip_id)))?;
        ip.assigned_object_type = Some("virtualization.vminterface".to_string());
        ip.assigned_object_id = Some(interface_id);
        ip.assigned_object = Some(serde_json::json!({
            "id": interface.id,
            "name": interface.name,
            "virtual_machine": {"id": interface.virtual_machine.id},
        }));
        let updated = ip.clone();
        drop(ips);
        self.counts.lock().unwrap().ip_assignments += 1;
        Ok(updated)
    }

    async fn find_containing_subnet(&self, ip: &str) -> Result<Option<Subnet>, NetBoxError> {
        let host = ip.split('/').next().unwrap_or(ip);
        let Ok(addr) = host.parse::<Ipv4Addr>() else {
            return Ok(None);
        };
        let addr = u32::from(addr);
        let subnets = self.subnets.lock().unwrap();
        let mut best: Option<Subnet> = None;
        for subnet in subnets.values() {
            let Some((net, len)) = subnet.prefix.split_once('/') else {
                continue;
            };
            let Ok(net) = net.parse::<Ipv4Addr>() else {
                continue;
            };
            let Ok(len) = len.parse::<u32>() else {
                continue;
            };
            if len > 32 {
                continue;
            }
            let mask = if len == 0 { 0 } else { u32::MAX << (32 - len) };
            if addr & mask == u32::from(net) & mask {
                let better = best
                    .as_ref()
                    .and_then(|b| b.prefix_length())
                    .map(|b| len as u8 > b)
                    .unwrap_or(true);
                if better {
                    best = Some(subnet.clone());
                }
            }
        }
        Ok(best)
    }

    async fn get_vrf_by_name(&self, name: &str) -> Result<Option<Vrf>, NetBoxError> {
        let vrfs = self.vrfs.lock().unwrap();
        let mut matches: Vec<&Vrf> = vrfs.values().filter(|v| v.name == name).collect();
        matches.sort_by_key(|v| v.id);
        Ok(matches.first().map(|v| (*v).clone()))
    }

    async fn get_device_role_by_name(
        &self,
        name: &str,
    ) -> Result<Option<DeviceRole>, NetBoxError> {
        let roles = self.device_roles.lock().unwrap();
        let mut matches: Vec<&DeviceRole> = roles.values().filter(|r| r.name == name).collect();
        matches.sort_by_key(|r| r.id);
        Ok(matches.first().map(|r| (*r).clone()))
    }

    async fn create_device_role(
        &self,
        name: &str,
        slug: &str,
        color: &str,
        description: &str,
    ) -> Result<DeviceRole, NetBoxError> {
        let id = self.next_id();
        let role = DeviceRole {
            id,
            url: format!("{}/api/dcim/device-roles/{}/", self.base_url, id),
            display: name.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            color: color.to_string(),
            description: description.to_string(),
        };
        self.device_roles.lock().unwrap().insert(id, role.clone());
        self.counts.lock().unwrap().role_creates += 1;
        Ok(role)
    }
}
