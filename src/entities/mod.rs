pub mod lease;
pub mod owner;
pub mod property;

pub use lease::{Entity as Lease, Model as LeaseModel};
pub use owner::{Entity as Owner, Model as OwnerModel};
pub use property::{City, Entity as Property, Model as PropertyModel, PropertyType};
