//! 服务层

mod address_service;
mod points_service;
mod profile_service;
pub mod validation;

pub use address_service::AddressService;
pub use points_service::PointsService;
pub use profile_service::ProfileService;
