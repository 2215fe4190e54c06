//! 请求与响应 DTO

mod request;
mod response;

pub use request::{
    AddressRequest, CreateProfileRequest, DeleteAddressRequest, PointsValue, UpdateFiscalDataRequest,
    UpdateImageRequest, UpdateLevelRequest, UpdatePointsRequest, UpdateProfileRequest,
};
pub use response::ApiResponse;
