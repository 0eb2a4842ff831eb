//! Dependency resolution
//!
//! Resolves the objects a VM row references by name, creating them with
//! defaults when absent. Lookup-before-create is mandatory, and resolved
//! identifiers are cached for the rest of the run so a dependency is created
//! at most once per distinct name.

use netbox_client::{IpAddress, NetBoxClientTrait, NetBoxError};
use std::collections::HashMap;
use tracing::{info, warn};

/// Color given to roles created on first reference
const DEFAULT_ROLE_COLOR: &str = "9e9e9e";

/// Prefix length assumed for a bare IP with no known containing subnet
const FALLBACK_PREFIX_LENGTH: u8 = 24;

/// Resolves named dependencies to NetBox identifiers, creating missing ones
#[derive(Debug)]
pub struct DependencyResolver<'a, C: NetBoxClientTrait> {
    client: &'a C,
    cluster_type_name: String,
    roles: HashMap<String, u64>,
    clusters: HashMap<String, u64>,
    vrfs: HashMap<String, Option<u64>>,
    cluster_type_id: Option<u64>,
}

/// Generated slug for objects created on first reference
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

impl<'a, C: NetBoxClientTrait> DependencyResolver<'a, C> {
    pub fn new(client: &'a C, cluster_type_name: impl Into<String>) -> Self {
        Self {
            client,
            cluster_type_name: cluster_type_name.into(),
            roles: HashMap::new(),
            clusters: HashMap::new(),
            vrfs: HashMap::new(),
            cluster_type_id: None,
        }
    }

    /// Resolve a device role id by name, creating the role if absent
    pub async fn ensure_role(&mut self, name: &str) -> Result<u64, NetBoxError> {
        if let Some(id) = self.roles.get(name) {
            return Ok(*id);
        }
        let role = match self.client.get_device_role_by_name(name).await? {
            Some(role) => role,
            None => {
                info!("Role '{}' not found, creating", name);
                self.client
                    .create_device_role(
                        name,
                        &slugify(name),
                        DEFAULT_ROLE_COLOR,
                        &format!("Automatically created role {}", name),
                    )
                    .await?
            }
        };
        self.roles.insert(name.to_string(), role.id);
        Ok(role.id)
    }

    /// Resolve a cluster id by name, creating the cluster if absent
    ///
    /// Cluster creation needs the cluster type, resolved once by the
    /// configured name. A missing cluster type fails the resolution; there is
    /// no fallback identifier.
    pub async fn ensure_cluster(&mut self, name: &str, site_id: u64) -> Result<u64, NetBoxError> {
        if let Some(id) = self.clusters.get(name) {
            return Ok(*id);
        }
        let cluster = match self.client.get_cluster_by_name(name).await? {
            Some(cluster) => cluster,
            None => {
                let type_id = self.cluster_type_id().await?;
                info!("Cluster '{}' not found, creating", name);
                self.client
                    .create_cluster(
                        name,
                        type_id,
                        site_id,
                        &format!("Automatically created cluster {}", name),
                    )
                    .await?
            }
        };
        self.clusters.insert(name.to_string(), cluster.id);
        Ok(cluster.id)
    }

    async fn cluster_type_id(&mut self) -> Result<u64, NetBoxError> {
        if let Some(id) = self.cluster_type_id {
            return Ok(id);
        }
        let cluster_type = self
            .client
            .get_cluster_type_by_name(&self.cluster_type_name)
            .await?
            .ok_or_else(|| {
                NetBoxError::InvalidRequest(format!(
                    "cluster type '{}' does not exist in NetBox",
                    self.cluster_type_name
                ))
            })?;
        self.cluster_type_id = Some(cluster_type.id);
        Ok(cluster_type.id)
    }

    /// Look up a VRF id by name; a miss is cached and reported as `None`
    pub async fn lookup_vrf(&mut self, name: &str) -> Result<Option<u64>, NetBoxError> {
        if let Some(cached) = self.vrfs.get(name) {
            return Ok(*cached);
        }
        let id = self.client.get_vrf_by_name(name).await?.map(|v| v.id);
        self.vrfs.insert(name.to_string(), id);
        Ok(id)
    }

    /// Resolve an IP address record, creating it if absent
    ///
    /// Lookups use the address exactly as the row gives it; a created address
    /// gets its prefix length completed from the containing subnet when the
    /// row carried a bare IP.
    pub async fn ensure_ip(
        &self,
        address: &str,
        description: &str,
    ) -> Result<IpAddress, NetBoxError> {
        if let Some(ip) = self.client.get_ip_address_by_address(address).await? {
            return Ok(ip);
        }
        let full_address = self.complete_prefix(address).await;
        info!("IP address '{}' not found, creating as '{}'", address, full_address);
        self.client.create_ip_address(&full_address, description).await
    }

    async fn complete_prefix(&self, address: &str) -> String {
        if address.contains('/') {
            return address.to_string();
        }
        let length = match self.client.find_containing_subnet(address).await {
            Ok(Some(subnet)) => subnet.prefix_length().unwrap_or(FALLBACK_PREFIX_LENGTH),
            Ok(None) => FALLBACK_PREFIX_LENGTH,
            Err(e) => {
                warn!(
                    "Subnet lookup for '{}' failed ({}); assuming /{}",
                    address, e, FALLBACK_PREFIX_LENGTH
                );
                FALLBACK_PREFIX_LENGTH
            }
        };
        format!("{}/{}", address, length)
    }
}
