pub mod availability;
pub mod leases;
pub mod owners;
pub mod properties;

pub use leases::LeaseService;
pub use owners::OwnerService;
pub use properties::PropertyService;
