//! Record reconciliation
//!
//! Converges one spreadsheet row with the remote state: resolves the row's
//! dependencies, builds the typed desired payload, fetches the existing VM
//! and decides between create, update and no-op.
//!
//! Primary-IP handling is two-phase. Phase 1 resolves or creates the IP
//! record while the VM may not exist yet. Phase 2 runs once the VM
//! identifier is known: it ensures the VM has an interface, assigns the IP
//! to it, and only then lets `primary_ip4` reach the VM record (the remote
//! API rejects a primary IP that is not assigned to one of the VM's own
//! interfaces, so a freshly created VM gets a follow-up patch instead).

use crate::diff::update_needed;
use crate::resolver::DependencyResolver;
use crate::sheet::VmRow;
use netbox_client::{
    ClusterRef, NetBoxClientTrait, NetBoxError, VirtualMachine, VirtualMachineRequest,
};
use tracing::{error, info, warn};

/// Terminal outcome of reconciling one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
    Skipped(String),
    Failed(String),
}

/// Primary-IP work left over for phase 2, after the VM id is known
#[derive(Debug, Clone, Copy)]
struct PendingPrimaryIp {
    ip_id: u64,
    needs_assignment: bool,
}

/// Reconciles rows against the remote system
#[derive(Debug)]
pub struct VmReconciler<'a, C: NetBoxClientTrait> {
    client: &'a C,
    resolver: DependencyResolver<'a, C>,
    default_site_id: u64,
    interface_name: String,
}

impl<'a, C: NetBoxClientTrait> VmReconciler<'a, C> {
    pub fn new(
        client: &'a C,
        cluster_type_name: &str,
        default_site_id: u64,
        interface_name: &str,
    ) -> Self {
        Self {
            client,
            resolver: DependencyResolver::new(client, cluster_type_name),
            default_site_id,
            interface_name: interface_name.to_string(),
        }
    }

    /// Converge one row; never returns an error, every failure maps to a
    /// terminal [`Outcome`]
    pub async fn reconcile(&mut self, row: &VmRow) -> Outcome {
        let (Some(name), Some(role_name)) = (row.name.as_deref(), row.role.as_deref()) else {
            return Outcome::Skipped("missing required fields name or role".to_string());
        };

        info!("Reconciling VM '{}' (row {})", name, row.row);

        let existing = match self.client.get_virtual_machine_by_name(name).await {
            Ok(existing) => existing,
            Err(e) => return Outcome::Failed(format!("VM lookup failed: {}", e)),
        };

        let role_id = match self.resolver.ensure_role(role_name).await {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to resolve role '{}': {}", role_name, e);
                return Outcome::Skipped(format!("failed to create role '{}': {}", role_name, e));
            }
        };

        let cluster = match row.cluster.as_deref() {
            Some(cluster_name) => {
                let site_id = row.site_id.unwrap_or(self.default_site_id);
                match self.resolver.ensure_cluster(cluster_name, site_id).await {
                    Ok(id) => Some(ClusterRef::Id(id)),
                    Err(e) => {
                        error!("Failed to resolve cluster '{}': {}", cluster_name, e);
                        return Outcome::Skipped(format!(
                            "failed to create cluster '{}': {}",
                            cluster_name, e
                        ));
                    }
                }
            }
            None => None,
        };

        let vrf_id = match row.vrf_name.as_deref() {
            Some(vrf_name) => match self.resolver.lookup_vrf(vrf_name).await {
                Ok(Some(id)) => Some(id),
                Ok(None) => {
                    warn!(
                        "Row {}: VRF '{}' not found in NetBox; VM will not be linked to a VRF",
                        row.row, vrf_name
                    );
                    None
                }
                Err(e) => {
                    warn!(
                        "Row {}: VRF lookup for '{}' failed ({}); VM will not be linked to a VRF",
                        row.row, vrf_name, e
                    );
                    None
                }
            },
            None => None,
        };

        let desired = VirtualMachineRequest {
            name: name.to_string(),
            role_id,
            description: row.description.clone().unwrap_or_default(),
            serial: row.serial.clone().unwrap_or_default(),
            vcpus: row.vcpus,
            memory: row.memory,
            disk: row.disk,
            cluster,
            tenant_name: row.tenant_name.clone(),
            vrf_id,
            primary_ip4_id: None,
        };

        // Phase 1: resolve or create the primary IP record
        let pending_ip = match self.plan_primary_ip(row, existing.as_ref()).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!(
                    "Row {}: primary IP handling failed ({}); continuing without it",
                    row.row, e
                );
                None
            }
        };

        match existing {
            Some(existing) => self.converge_existing(row, &existing, desired, pending_ip).await,
            None => self.create_new(row, desired, pending_ip).await,
        }
    }

    /// Classify the row's primary IP: `None` means there is nothing left to
    /// do (no IP column, already the VM's primary, or owned by another
    /// object and therefore off limits).
    async fn plan_primary_ip(
        &mut self,
        row: &VmRow,
        existing: Option<&VirtualMachine>,
    ) -> Result<Option<PendingPrimaryIp>, NetBoxError> {
        let Some(address) = row.ip_primary.as_deref() else {
            return Ok(None);
        };
        let description = row.ip_primary_description.as_deref().unwrap_or("");
        let ip = self.resolver.ensure_ip(address, description).await?;

        if !ip.is_assigned_to_vm_interface() {
            return Ok(Some(PendingPrimaryIp {
                ip_id: ip.id,
                needs_assignment: true,
            }));
        }

        let owned_by_this_vm = match existing {
            Some(vm) => {
                let interfaces = self.client.query_vm_interfaces(vm.id).await?;
                interfaces.iter().any(|i| Some(i.id) == ip.assigned_object_id)
            }
            None => false,
        };

        if !owned_by_this_vm {
            warn!(
                "Row {}: IP '{}' is already assigned to another object; leaving it untouched",
                row.row, address
            );
            return Ok(None);
        }

        if let Some(vm) = existing {
            if vm.primary_ip4.as_ref().map(|p| p.id) == Some(ip.id) {
                info!("IP '{}' is already the primary address of VM '{}'", address, vm.name);
                return Ok(None);
            }
        }

        Ok(Some(PendingPrimaryIp {
            ip_id: ip.id,
            needs_assignment: false,
        }))
    }

    /// Phase 2: make sure the IP is attached to an interface of the VM,
    /// creating the default interface when the VM has none. The first
    /// existing interface is reused.
    async fn ensure_assignment(&self, vm_id: u64, ip_id: u64) -> Result<(), NetBoxError> {
        let interfaces = self.client.query_vm_interfaces(vm_id).await?;
        let interface_id = match interfaces.first() {
            Some(interface) => interface.id,
            None => {
                info!("VM {} has no interfaces, creating '{}'", vm_id, self.interface_name);
                self.client
                    .create_vm_interface(vm_id, &self.interface_name)
                    .await?
                    .id
            }
        };
        self.client.assign_ip_to_interface(ip_id, interface_id).await?;
        Ok(())
    }

    async fn finish_primary_ip(
        &self,
        vm_id: u64,
        pending: PendingPrimaryIp,
    ) -> Result<(), NetBoxError> {
        if pending.needs_assignment {
            self.ensure_assignment(vm_id, pending.ip_id).await?;
        }
        self.client.set_primary_ip4(vm_id, pending.ip_id).await?;
        Ok(())
    }

    async fn create_new(
        &self,
        row: &VmRow,
        desired: VirtualMachineRequest,
        pending_ip: Option<PendingPrimaryIp>,
    ) -> Outcome {
        // primary_ip4 never rides the creation payload; see module docs
        let vm = match self.client.create_virtual_machine(&desired).await {
            Ok(vm) => vm,
            Err(e) => {
                error!("Failed to create VM '{}': {}", desired.name, e);
                return Outcome::Failed(format!("create failed: {}", e));
            }
        };
        info!("Created VM '{}' (ID: {})", vm.name, vm.id);

        if let Some(pending) = pending_ip {
            if let Err(e) = self.finish_primary_ip(vm.id, pending).await {
                warn!(
                    "Row {}: failed to set primary IP on new VM '{}' ({}); continuing",
                    row.row, vm.name, e
                );
            }
        }
        Outcome::Created
    }

    async fn converge_existing(
        &self,
        row: &VmRow,
        existing: &VirtualMachine,
        mut desired: VirtualMachineRequest,
        pending_ip: Option<PendingPrimaryIp>,
    ) -> Outcome {
        if let Some(pending) = pending_ip {
            if pending.needs_assignment {
                // The VM id is known, so the assignment can happen before the
                // diff and the primary can ride the update payload
                match self.ensure_assignment(existing.id, pending.ip_id).await {
                    Ok(()) => desired.primary_ip4_id = Some(pending.ip_id),
                    Err(e) => warn!(
                        "Row {}: failed to assign IP to VM '{}' ({}); continuing without primary IP",
                        row.row, existing.name, e
                    ),
                }
            } else {
                desired.primary_ip4_id = Some(pending.ip_id);
            }
        }

        if update_needed(&desired, existing) {
            match self.client.update_virtual_machine(existing.id, &desired).await {
                Ok(updated) => {
                    info!("Updated VM '{}' (ID: {})", updated.name, updated.id);
                    Outcome::Updated
                }
                Err(e) => {
                    error!("Failed to update VM '{}': {}", existing.name, e);
                    Outcome::Failed(format!("update failed: {}", e))
                }
            }
        } else {
            info!("VM '{}' is already up to date", existing.name);
            Outcome::Unchanged
        }
    }
}
