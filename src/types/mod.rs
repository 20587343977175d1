//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep raw CLI strings out of the search logic: a value that
//! exists is a value that validated.

mod device;
mod mac;
mod vlan;

pub use device::DeviceHandle;
pub use mac::{MacAddress, MacError};
pub use vlan::{VlanError, VlanId};
