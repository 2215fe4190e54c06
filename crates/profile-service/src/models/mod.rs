//! 领域模型

mod address;
mod profile;

pub use address::{Address, AddressFields};
pub use profile::{ContactInfo, FiscalData, Profile};
