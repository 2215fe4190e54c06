//! 仓储 Trait 定义
//!
//! 服务层和 Worker 只依赖这里的接口，PostgreSQL 与内存实现可以互换，也便于 mock 测试

use async_trait::async_trait;
use profile_shared::error::Result;
use uuid::Uuid;

use crate::models::{Address, AddressFields, ContactInfo, FiscalData, Profile};

/// 用户档案仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepositoryTrait: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>>;

    /// 插入新档案；user_id 已存在时返回 AlreadyExists
    async fn create(&self, profile: &Profile) -> Result<Profile>;

    async fn update_contact(&self, user_id: &str, contact: &ContactInfo)
    -> Result<Option<Profile>>;
    async fn update_fiscal_data(&self, user_id: &str, data: &FiscalData)
    -> Result<Option<Profile>>;
    async fn update_image(&self, user_id: &str, image: &str) -> Result<Option<Profile>>;

    /// 原子地把 delta 加到当前积分上，返回累加后的档案；档案不存在返回 None
    async fn increment_points(&self, user_id: &str, delta: i32) -> Result<Option<Profile>>;

    /// 条件升级：仅当当前等级仍为 `expected_level` 时写入 `new_level`，
    /// 升级标记写为 `marker`（判定时读到的积分），且不超过当前积分。
    /// 返回是否有行被更新。
    async fn set_level_if_unchanged(
        &self,
        user_id: &str,
        expected_level: i32,
        new_level: i32,
        marker: i32,
    ) -> Result<bool>;

    /// 直接写入等级与积分，升级标记不会超过新积分
    async fn set_level_and_points(
        &self,
        user_id: &str,
        level: i32,
        points: i32,
    ) -> Result<Option<Profile>>;

    async fn delete(&self, user_id: &str) -> Result<bool>;
}

/// 地址仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressRepositoryTrait: Send + Sync {
    async fn create(&self, address: &Address) -> Result<Address>;

    async fn find_active_by_profile(&self, profile_id: Uuid) -> Result<Option<Address>>;

    /// 更新档案当前激活的地址，没有激活地址时返回 None
    async fn update_active(
        &self,
        profile_id: Uuid,
        fields: &AddressFields,
    ) -> Result<Option<Address>>;

    /// 切换地址的激活状态，地址不属于该档案时返回 false
    async fn set_active(&self, profile_id: Uuid, address_id: Uuid, active: bool) -> Result<bool>;

    async fn list_by_profile(&self, profile_id: Uuid) -> Result<Vec<Address>>;
}
