//! 数据访问层

mod address_repo;
mod memory;
mod profile_repo;
mod traits;

pub use address_repo::AddressRepository;
pub use memory::MemoryStore;
pub use profile_repo::ProfileRepository;
pub use traits::{AddressRepositoryTrait, ProfileRepositoryTrait};

#[cfg(test)]
pub use traits::{MockAddressRepositoryTrait, MockProfileRepositoryTrait};
