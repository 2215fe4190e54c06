//! 业务校验规则
//!
//! 请求 DTO 上的 validator 注解只负责格式，这里是服务层必须保证的业务约束。

use profile_shared::error::{ProfileError, Result};

use crate::models::{AddressFields, ContactInfo, FiscalData};

const MIN_PHONE_LEN: usize = 10;
const MIN_CUIL_LEN: usize = 11;

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProfileError::Validation(format!("{field} 不能为空")));
    }
    Ok(())
}

pub fn validate_contact(contact: &ContactInfo) -> Result<()> {
    require(&contact.profile_name, "profileName")?;
    require(&contact.profile_mail, "profileMail")?;
    require(&contact.phone, "phone")?;

    if contact.phone.len() < MIN_PHONE_LEN {
        return Err(ProfileError::Validation(format!(
            "phone 至少 {MIN_PHONE_LEN} 位"
        )));
    }
    if !is_numeric(&contact.phone) {
        return Err(ProfileError::Validation("phone 只能包含数字".to_string()));
    }
    Ok(())
}

pub fn validate_fiscal_data(data: &FiscalData) -> Result<()> {
    require(&data.cuil, "CUIL")?;
    require(&data.fiscal_address, "fiscalAdress")?;
    require(&data.fiscal_condition, "fiscalCondition")?;
    require(&data.iibb, "IIBB")?;

    if data.cuil.len() < MIN_CUIL_LEN {
        return Err(ProfileError::Validation(format!(
            "CUIL 至少 {MIN_CUIL_LEN} 位"
        )));
    }
    if !is_numeric(&data.cuil) {
        return Err(ProfileError::Validation("CUIL 只能包含数字".to_string()));
    }
    if !is_numeric(&data.iibb) {
        return Err(ProfileError::Validation("IIBB 只能包含数字".to_string()));
    }
    Ok(())
}

pub fn validate_image(image: &str) -> Result<()> {
    require(image, "profileImage")
}

pub fn validate_address(fields: &AddressFields) -> Result<()> {
    require(&fields.postal_code, "CP")?;
    require(&fields.street, "street")?;
    if fields.number <= 0 {
        return Err(ProfileError::Validation("number 必须大于 0".to_string()));
    }
    Ok(())
}

/// 积分增量必须为正数
pub fn validate_points_delta(delta: i32) -> Result<()> {
    if delta <= 0 {
        return Err(ProfileError::Validation(format!(
            "profilePoints 必须大于 0，实际为 {delta}"
        )));
    }
    Ok(())
}
