//! 请求体定义
//!
//! 字段名沿用客户端已有的约定，大小写不统一的几个字段单独 rename。

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::{AddressFields, ContactInfo, FiscalData};

/// 创建档案请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "profileName 长度必须在1-100个字符之间"))]
    pub profile_name: String,
    #[validate(email(message = "profileMail 格式不正确"))]
    pub profile_mail: String,
    pub phone: String,
    pub profile_image: Option<String>,
}

impl CreateProfileRequest {
    pub fn into_parts(self) -> (ContactInfo, Option<String>) {
        (
            ContactInfo {
                profile_name: self.profile_name,
                profile_mail: self.profile_mail,
                phone: self.phone,
            },
            self.profile_image,
        )
    }
}

/// 更新联系信息请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "profileName 长度必须在1-100个字符之间"))]
    pub profile_name: String,
    #[validate(email(message = "profileMail 格式不正确"))]
    pub profile_mail: String,
    pub phone: String,
}

impl From<UpdateProfileRequest> for ContactInfo {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            profile_name: req.profile_name,
            profile_mail: req.profile_mail,
            phone: req.phone,
        }
    }
}

/// 更新税务信息请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFiscalDataRequest {
    #[serde(rename = "CUIL")]
    pub cuil: String,
    #[serde(rename = "fiscalAdress")]
    #[validate(length(max = 255, message = "fiscalAdress 不能超过255个字符"))]
    pub fiscal_address: String,
    pub fiscal_condition: String,
    #[serde(rename = "IIBB")]
    pub iibb: String,
}

impl From<UpdateFiscalDataRequest> for FiscalData {
    fn from(req: UpdateFiscalDataRequest) -> Self {
        Self {
            cuil: req.cuil,
            fiscal_address: req.fiscal_address,
            fiscal_condition: req.fiscal_condition,
            iibb: req.iibb,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageRequest {
    #[validate(length(min = 1, max = 2048, message = "profileImage 长度必须在1-2048个字符之间"))]
    pub profile_image: String,
}

/// 积分值，客户端既可能传字符串也可能传数字
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PointsValue {
    Number(i64),
    Text(String),
}

impl PointsValue {
    /// 解析为积分增量；非数字或超出范围时返回错误描述
    pub fn parse(&self) -> Result<i32, String> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("profilePoints 不是有效的整数: {s:?}"))?,
        };
        i32::try_from(value).map_err(|_| format!("profilePoints 超出范围: {value}"))
    }
}

/// 累加积分请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePointsRequest {
    /// 仅作记录，以路径中的 userId 为准
    pub profile_id: Option<String>,
    pub profile_points: PointsValue,
}

/// 直接设置等级请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLevelRequest {
    #[validate(range(min = 0, message = "profileLevel 不能为负数"))]
    pub profile_level: i32,
    #[validate(range(min = 0, message = "profilePoints 不能为负数"))]
    pub profile_points: i32,
}

/// 创建或更新地址请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[serde(rename = "CP")]
    #[validate(length(min = 1, max = 16, message = "CP 长度必须在1-16个字符之间"))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 255, message = "street 长度必须在1-255个字符之间"))]
    pub street: String,
    pub number: i32,
    pub floor: Option<String>,
    #[serde(default)]
    pub main_address: bool,
}

impl From<AddressRequest> for AddressFields {
    fn from(req: AddressRequest) -> Self {
        Self {
            postal_code: req.postal_code,
            street: req.street,
            number: req.number,
            floor: req.floor,
            main_address: req.main_address,
        }
    }
}

/// 停用或恢复地址请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAddressRequest {
    pub address_id: Uuid,
    pub active_address: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_value_accepts_string_and_number() {
        let req: UpdatePointsRequest =
            serde_json::from_str(r#"{"profileId":"p-1","profilePoints":"100"}"#).unwrap();
        assert_eq!(req.profile_points.parse(), Ok(100));
        assert_eq!(req.profile_id.as_deref(), Some("p-1"));

        let req: UpdatePointsRequest = serde_json::from_str(r#"{"profilePoints":42}"#).unwrap();
        assert_eq!(req.profile_points.parse(), Ok(42));
    }

    #[test]
    fn test_points_value_rejects_garbage() {
        assert!(PointsValue::Text("abc".to_string()).parse().is_err());
        assert!(PointsValue::Text("1.5".to_string()).parse().is_err());
        assert!(PointsValue::Number(i64::from(i32::MAX) + 1).parse().is_err());
    }

    #[test]
    fn test_fiscal_request_field_names() {
        let raw = r#"{"CUIL":"20123456789","fiscalAdress":"Av. 1","fiscalCondition":"RI","IIBB":"1"}"#;
        let data: FiscalData = serde_json::from_str::<UpdateFiscalDataRequest>(raw)
            .unwrap()
            .into();
        assert_eq!(data.cuil, "20123456789");
        assert_eq!(data.fiscal_address, "Av. 1");
    }

    #[test]
    fn test_create_profile_request_validation() {
        let req = CreateProfileRequest {
            profile_name: "Ana".to_string(),
            profile_mail: "not-an-email".to_string(),
            phone: "1155667788".to_string(),
            profile_image: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_address_request_defaults() {
        let req: AddressRequest =
            serde_json::from_str(r#"{"CP":"1425","street":"Av. Santa Fe","number":10}"#).unwrap();
        assert!(req.validate().is_ok());
        let fields: AddressFields = req.into();
        assert!(!fields.main_address);
        assert!(fields.floor.is_none());
    }
}
