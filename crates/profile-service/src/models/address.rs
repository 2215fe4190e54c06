//! 地址实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户地址
///
/// 删除是逻辑删除：只切换 `active_address`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address_id: Uuid,
    #[serde(rename = "idProfile")]
    pub profile_id: Uuid,
    #[serde(rename = "CP")]
    pub postal_code: String,
    pub street: String,
    pub number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    pub main_address: bool,
    pub active_address: bool,
    #[serde(rename = "creationDate")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedDate")]
    pub updated_at: DateTime<Utc>,
}

/// 地址的可编辑字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFields {
    pub postal_code: String,
    pub street: String,
    pub number: i32,
    pub floor: Option<String>,
    pub main_address: bool,
}

impl Address {
    /// 为档案新建一个处于激活状态的地址
    pub fn new(profile_id: Uuid, fields: AddressFields) -> Self {
        let now = Utc::now();
        Self {
            address_id: Uuid::new_v4(),
            profile_id,
            postal_code: fields.postal_code,
            street: fields.street,
            number: fields.number,
            floor: fields.floor,
            main_address: fields.main_address,
            active_address: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// 用新字段覆盖可编辑部分
    pub fn apply(&mut self, fields: &AddressFields) {
        self.postal_code = fields.postal_code.clone();
        self.street = fields.street.clone();
        self.number = fields.number;
        self.floor = fields.floor.clone();
        self.main_address = fields.main_address;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> AddressFields {
        AddressFields {
            postal_code: "1425".to_string(),
            street: "Av. Santa Fe".to_string(),
            number: 1234,
            floor: None,
            main_address: true,
        }
    }

    #[test]
    fn test_new_address_is_active() {
        let address = Address::new(Uuid::new_v4(), fields());
        assert!(address.active_address);
        assert!(address.main_address);
    }

    #[test]
    fn test_wire_field_names() {
        let profile_id = Uuid::new_v4();
        let json = serde_json::to_value(Address::new(profile_id, fields())).unwrap();
        assert_eq!(json["CP"], "1425");
        assert_eq!(json["idProfile"], profile_id.to_string());
        assert_eq!(json["activeAddress"], true);
        // floor 为空时不输出
        assert!(json.get("floor").is_none());
    }

    #[test]
    fn test_apply_overwrites_editable_fields() {
        let mut address = Address::new(Uuid::new_v4(), fields());
        let id = address.address_id;
        address.apply(&AddressFields {
            postal_code: "5000".to_string(),
            street: "San Martín".to_string(),
            number: 10,
            floor: Some("3B".to_string()),
            main_address: false,
        });

        assert_eq!(address.address_id, id);
        assert_eq!(address.postal_code, "5000");
        assert_eq!(address.floor.as_deref(), Some("3B"));
        assert!(address.active_address);
    }
}
