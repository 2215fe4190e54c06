//! 应用状态

use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::service::{AddressService, PointsService, ProfileService};

/// Axum 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileService>,
    pub points: Arc<PointsService>,
    pub addresses: Arc<AddressService>,
    /// Token 校验
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        profiles: ProfileService,
        points: PointsService,
        addresses: AddressService,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            profiles: Arc::new(profiles),
            points: Arc::new(points),
            addresses: Arc::new(addresses),
            identity,
        }
    }
}
