//! 地址服务
//!
//! 地址挂在档案下，按 user_id 先解析出档案再操作。删除只切换激活标记。

use std::sync::Arc;

use profile_shared::error::{ProfileError, Result};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::{Address, AddressFields, Profile};
use crate::repository::{AddressRepositoryTrait, ProfileRepositoryTrait};
use crate::service::validation;

/// 地址服务
pub struct AddressService {
    addresses: Arc<dyn AddressRepositoryTrait>,
    profiles: Arc<dyn ProfileRepositoryTrait>,
}

impl AddressService {
    pub fn new(
        addresses: Arc<dyn AddressRepositoryTrait>,
        profiles: Arc<dyn ProfileRepositoryTrait>,
    ) -> Self {
        Self {
            addresses,
            profiles,
        }
    }

    async fn profile_of(&self, user_id: &str) -> Result<Profile> {
        self.profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| ProfileError::not_found("Profile", user_id))
    }

    pub async fn create_address(
        &self,
        caller: &AuthUser,
        user_id: &str,
        fields: AddressFields,
    ) -> Result<Address> {
        caller.ensure_owner(user_id, "create_address")?;
        validation::validate_address(&fields)?;

        let profile = self.profile_of(user_id).await?;
        let created = self
            .addresses
            .create(&Address::new(profile.profile_id, fields))
            .await?;

        info!(user_id, address_id = %created.address_id, "地址已创建");
        Ok(created)
    }

    /// 获取用户当前激活的地址
    pub async fn get_active_address(&self, user_id: &str) -> Result<Address> {
        let profile = self.profile_of(user_id).await?;
        self.addresses
            .find_active_by_profile(profile.profile_id)
            .await?
            .ok_or_else(|| ProfileError::not_found("Address", format!("active of {user_id}")))
    }

    pub async fn update_address(
        &self,
        caller: &AuthUser,
        user_id: &str,
        fields: AddressFields,
    ) -> Result<Address> {
        caller.ensure_owner(user_id, "update_address")?;
        validation::validate_address(&fields)?;

        let profile = self.profile_of(user_id).await?;
        let updated = self
            .addresses
            .update_active(profile.profile_id, &fields)
            .await?
            .ok_or_else(|| ProfileError::not_found("Address", format!("active of {user_id}")))?;

        info!(user_id, address_id = %updated.address_id, "地址已更新");
        Ok(updated)
    }

    /// 逻辑删除：`active = false` 停用，`true` 则恢复
    pub async fn delete_address(
        &self,
        caller: &AuthUser,
        user_id: &str,
        address_id: Uuid,
        active: bool,
    ) -> Result<()> {
        caller.ensure_owner(user_id, "delete_address")?;

        let profile = self.profile_of(user_id).await?;
        if !self
            .addresses
            .set_active(profile.profile_id, address_id, active)
            .await?
        {
            return Err(ProfileError::not_found("Address", address_id.to_string()));
        }

        info!(user_id, %address_id, active, "地址激活状态已修改");
        Ok(())
    }

    pub async fn list_addresses(&self, profile_id: Uuid) -> Result<Vec<Address>> {
        self.addresses.list_by_profile(profile_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactInfo;
    use crate::repository::MemoryStore;

    fn fields(street: &str) -> AddressFields {
        AddressFields {
            postal_code: "1425".to_string(),
            street: street.to_string(),
            number: 1234,
            floor: Some("2A".to_string()),
            main_address: true,
        }
    }

    fn setup() -> (MemoryStore, AddressService, Profile) {
        let store = MemoryStore::new();
        let profile = Profile::new(
            "u-1",
            ContactInfo {
                profile_name: "Ana".to_string(),
                profile_mail: "ana@example.com".to_string(),
                phone: "1155667788".to_string(),
            },
            None,
        );
        store.insert_profile(profile.clone());
        let service = AddressService::new(Arc::new(store.clone()), Arc::new(store.clone()));
        (store, service, profile)
    }

    #[tokio::test]
    async fn test_create_then_get_active() {
        let (_, service, profile) = setup();
        let caller = AuthUser::new("u-1");

        let created = service
            .create_address(&caller, "u-1", fields("Av. Santa Fe"))
            .await
            .unwrap();
        assert_eq!(created.profile_id, profile.profile_id);
        assert!(created.active_address);

        let active = service.get_active_address("u-1").await.unwrap();
        assert_eq!(active.address_id, created.address_id);
    }

    #[tokio::test]
    async fn test_create_without_profile_is_not_found() {
        let (_, service, _) = setup();
        let err = service
            .create_address(&AuthUser::new("u-9"), "u-9", fields("Av. Santa Fe"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_active_address() {
        let (_, service, _) = setup();
        let caller = AuthUser::new("u-1");
        service
            .create_address(&caller, "u-1", fields("Av. Santa Fe"))
            .await
            .unwrap();

        let updated = service
            .update_address(&caller, "u-1", fields("Av. Córdoba"))
            .await
            .unwrap();
        assert_eq!(updated.street, "Av. Córdoba");
    }

    #[tokio::test]
    async fn test_delete_hides_active_but_keeps_in_list() {
        let (_, service, profile) = setup();
        let caller = AuthUser::new("u-1");
        let created = service
            .create_address(&caller, "u-1", fields("Av. Santa Fe"))
            .await
            .unwrap();

        service
            .delete_address(&caller, "u-1", created.address_id, false)
            .await
            .unwrap();

        let err = service.get_active_address("u-1").await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");

        let all = service.list_addresses(profile.profile_id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].active_address);
    }

    #[tokio::test]
    async fn test_delete_unknown_address() {
        let (_, service, _) = setup();
        let err = service
            .delete_address(&AuthUser::new("u-1"), "u-1", Uuid::new_v4(), false)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_for_someone_else_is_forbidden() {
        let (_, service, _) = setup();
        let err = service
            .update_address(&AuthUser::new("u-2"), "u-1", fields("Av. Córdoba"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }
}
