//! NetBox REST API Client
//!
//! A Rust client library for the slice of the NetBox REST API the VM
//! inventory importer touches: virtual machines, VM interfaces, clusters,
//! cluster types, IP addresses, subnets, VRFs, and device roles.
//!
//! # Example
//!
//! ```no_run
//! use netbox_client::{NetBoxClient, VirtualMachineRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a client
//! let client = NetBoxClient::new(
//!     "http://netbox:80".to_string(),
//!     "your-api-token".to_string(),
//! )?;
//!
//! // Look up a VM by name
//! let vm = client.get_virtual_machine_by_name("srv01").await?;
//!
//! // Create one if it does not exist
//! if vm.is_none() {
//!     let request = VirtualMachineRequest {
//!         name: "srv01".to_string(),
//!         role_id: 3,
//!         vcpus: Some(4),
//!         memory: Some(8192),
//!         ..VirtualMachineRequest::default()
//!     };
//!     client.create_virtual_machine(&request).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Virtualization operations**: query, create, and patch virtual
//!   machines and their interfaces
//! - **IPAM operations**: look up and create IP addresses, assign them to
//!   interfaces, find containing subnets
//! - **Dependency lookups**: device roles, clusters, cluster types, VRFs
//! - **Pagination**: support for fetching all pages of large result sets
//! - **`test-util` feature**: in-memory [`MockNetBoxClient`] for unit tests

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod netbox_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::NetBoxClient;
pub use common::{HttpClient, PaginatedResponse};
pub use error::NetBoxError;
pub use models::*;
pub use netbox_trait::NetBoxClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockNetBoxClient;
