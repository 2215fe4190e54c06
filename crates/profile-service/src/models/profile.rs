//! 用户档案实体
//!
//! JSON 字段名沿用客户端已有的约定（`CUIL`、`IIBB`、`fiscalAdress` 等）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户档案
///
/// 每个用户至多一条。积分只会被累加，等级由异步 Worker 逐级提升。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub profile_id: Uuid,
    pub user_id: String,
    pub profile_image: Option<String>,
    pub profile_name: String,
    #[serde(rename = "profileLevel")]
    pub level: i32,
    #[serde(rename = "profilePoints")]
    pub points: i32,
    /// 最近一次异步升级时计入的积分总数
    pub points_at_last_level_up: i32,
    pub profile_mail: String,
    pub phone: String,
    #[serde(rename = "CUIL")]
    pub cuil: Option<String>,
    #[serde(rename = "fiscalAdress")]
    pub fiscal_address: Option<String>,
    pub fiscal_condition: Option<String>,
    #[serde(rename = "IIBB")]
    pub iibb: Option<String>,
    #[serde(rename = "creationDate")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedDate")]
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// 创建一个积分与等级均为 0 的新档案
    pub fn new(user_id: impl Into<String>, contact: ContactInfo, image: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            profile_id: Uuid::now_v7(),
            user_id: user_id.into(),
            profile_image: image,
            profile_name: contact.profile_name,
            level: 0,
            points: 0,
            points_at_last_level_up: 0,
            profile_mail: contact.profile_mail,
            phone: contact.phone,
            cuil: None,
            fiscal_address: None,
            fiscal_condition: None,
            iibb: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 上次升级之后新增的积分
    pub fn points_since_last_level_up(&self) -> i32 {
        self.points.saturating_sub(self.points_at_last_level_up)
    }
}

/// 联系信息（创建与更新档案时使用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub profile_name: String,
    pub profile_mail: String,
    pub phone: String,
}

/// 税务信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalData {
    pub cuil: String,
    pub fiscal_address: String,
    pub fiscal_condition: String,
    pub iibb: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactInfo {
        ContactInfo {
            profile_name: "Ana".to_string(),
            profile_mail: "ana@example.com".to_string(),
            phone: "1155667788".to_string(),
        }
    }

    #[test]
    fn test_new_profile_starts_at_zero() {
        let profile = Profile::new("user-1", contact(), None);
        assert_eq!(profile.level, 0);
        assert_eq!(profile.points, 0);
        assert_eq!(profile.points_at_last_level_up, 0);
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[test]
    fn test_profile_ids_are_unique() {
        let a = Profile::new("user-1", contact(), None);
        let b = Profile::new("user-2", contact(), None);
        assert_ne!(a.profile_id, b.profile_id);
    }

    #[test]
    fn test_wire_field_names() {
        let mut profile = Profile::new("user-1", contact(), Some("img.png".to_string()));
        profile.cuil = Some("20123456789".to_string());
        profile.points = 42;

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["profilePoints"], 42);
        assert_eq!(json["profileLevel"], 0);
        assert_eq!(json["profileImage"], "img.png");
        assert_eq!(json["CUIL"], "20123456789");
        assert!(json.get("fiscalAdress").is_some());
        assert!(json.get("IIBB").is_some());
        assert!(json.get("creationDate").is_some());
    }

    #[test]
    fn test_points_since_last_level_up() {
        let mut profile = Profile::new("user-1", contact(), None);
        profile.points = 2100;
        profile.points_at_last_level_up = 1050;
        assert_eq!(profile.points_since_last_level_up(), 1050);
    }
}
