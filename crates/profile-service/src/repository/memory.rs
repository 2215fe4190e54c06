//! 内存仓储
//!
//! 使用 DashMap 实现的档案与地址存储，适用于测试和本地开发。
//! 条件更新在单个 key 的写锁内完成，语义与 SQL 版本一致。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use profile_shared::error::{ProfileError, Result};
use uuid::Uuid;

use super::traits::{AddressRepositoryTrait, ProfileRepositoryTrait};
use crate::models::{Address, AddressFields, ContactInfo, FiscalData, Profile};

/// 内存存储
///
/// Clone 后共享同一份数据。
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    profiles: Arc<DashMap<String, Profile>>,
    addresses: Arc<DashMap<Uuid, Address>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入档案（覆盖已有数据）
    pub fn insert_profile(&self, profile: Profile) {
        self.profiles.insert(profile.user_id.clone(), profile);
    }

    /// 读取档案快照，不持有锁
    pub fn profile(&self, user_id: &str) -> Option<Profile> {
        self.profiles.get(user_id).map(|p| p.clone())
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// 在写锁内修改档案并返回修改后的快照
    fn modify<F>(&self, user_id: &str, f: F) -> Option<Profile>
    where
        F: FnOnce(&mut Profile),
    {
        self.profiles.get_mut(user_id).map(|mut entry| {
            f(entry.value_mut());
            entry.updated_at = Utc::now();
            entry.clone()
        })
    }
}

#[async_trait]
impl ProfileRepositoryTrait for MemoryStore {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.profile(user_id))
    }

    async fn create(&self, profile: &Profile) -> Result<Profile> {
        match self.profiles.entry(profile.user_id.clone()) {
            Entry::Occupied(_) => Err(ProfileError::AlreadyExists {
                entity: "Profile".to_string(),
                field: "user_id".to_string(),
                value: profile.user_id.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(profile.clone());
                Ok(profile.clone())
            }
        }
    }

    async fn update_contact(
        &self,
        user_id: &str,
        contact: &ContactInfo,
    ) -> Result<Option<Profile>> {
        Ok(self.modify(user_id, |p| {
            p.profile_name = contact.profile_name.clone();
            p.profile_mail = contact.profile_mail.clone();
            p.phone = contact.phone.clone();
        }))
    }

    async fn update_fiscal_data(
        &self,
        user_id: &str,
        data: &FiscalData,
    ) -> Result<Option<Profile>> {
        Ok(self.modify(user_id, |p| {
            p.cuil = Some(data.cuil.clone());
            p.fiscal_address = Some(data.fiscal_address.clone());
            p.fiscal_condition = Some(data.fiscal_condition.clone());
            p.iibb = Some(data.iibb.clone());
        }))
    }

    async fn update_image(&self, user_id: &str, image: &str) -> Result<Option<Profile>> {
        Ok(self.modify(user_id, |p| p.profile_image = Some(image.to_string())))
    }

    async fn increment_points(&self, user_id: &str, delta: i32) -> Result<Option<Profile>> {
        let Some(mut entry) = self.profiles.get_mut(user_id) else {
            return Ok(None);
        };
        entry.points = entry
            .points
            .checked_add(delta)
            .ok_or_else(|| ProfileError::points_overflow(user_id, delta))?;
        entry.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn set_level_if_unchanged(
        &self,
        user_id: &str,
        expected_level: i32,
        new_level: i32,
        marker: i32,
    ) -> Result<bool> {
        let Some(mut entry) = self.profiles.get_mut(user_id) else {
            return Ok(false);
        };
        if entry.level != expected_level {
            return Ok(false);
        }
        entry.level = new_level;
        entry.points_at_last_level_up = entry.points.min(marker);
        entry.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_level_and_points(
        &self,
        user_id: &str,
        level: i32,
        points: i32,
    ) -> Result<Option<Profile>> {
        Ok(self.modify(user_id, |p| {
            p.level = level;
            p.points = points;
            p.points_at_last_level_up = p.points_at_last_level_up.min(points);
        }))
    }

    async fn delete(&self, user_id: &str) -> Result<bool> {
        let Some((_, profile)) = self.profiles.remove(user_id) else {
            return Ok(false);
        };
        self.addresses
            .retain(|_, address| address.profile_id != profile.profile_id);
        Ok(true)
    }
}

#[async_trait]
impl AddressRepositoryTrait for MemoryStore {
    async fn create(&self, address: &Address) -> Result<Address> {
        self.addresses.insert(address.address_id, address.clone());
        Ok(address.clone())
    }

    async fn find_active_by_profile(&self, profile_id: Uuid) -> Result<Option<Address>> {
        Ok(self
            .addresses
            .iter()
            .filter(|a| a.profile_id == profile_id && a.active_address)
            .max_by_key(|a| a.updated_at)
            .map(|a| a.clone()))
    }

    async fn update_active(
        &self,
        profile_id: Uuid,
        fields: &AddressFields,
    ) -> Result<Option<Address>> {
        let mut updated = None;
        for mut address in self.addresses.iter_mut() {
            if address.profile_id == profile_id && address.active_address {
                address.apply(fields);
                updated = Some(address.clone());
            }
        }
        Ok(updated)
    }

    async fn set_active(&self, profile_id: Uuid, address_id: Uuid, active: bool) -> Result<bool> {
        match self.addresses.get_mut(&address_id) {
            Some(mut address) if address.profile_id == profile_id => {
                address.active_address = active;
                address.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_by_profile(&self, profile_id: Uuid) -> Result<Vec<Address>> {
        let mut addresses: Vec<Address> = self
            .addresses
            .iter()
            .filter(|a| a.profile_id == profile_id)
            .map(|a| a.clone())
            .collect();
        addresses.sort_by_key(|a| a.created_at);
        Ok(addresses)
    }
}
