//! 用户档案仓储
//!
//! 积分累加与条件升级都是单条 UPDATE，依赖数据库行锁保证原子性，不做应用层加锁

use async_trait::async_trait;
use profile_shared::error::{ProfileError, Result};
use sqlx::PgPool;

use super::traits::ProfileRepositoryTrait;
use crate::models::{ContactInfo, FiscalData, Profile};

const PROFILE_COLUMNS: &str = r#"
    profile_id, user_id, profile_image, profile_name, level, points,
    points_at_last_level_up, profile_mail, phone, cuil, fiscal_address,
    fiscal_condition, iibb, created_at, updated_at
"#;

/// 用户档案仓储
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 唯一约束冲突的 SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

#[async_trait]
impl ProfileRepositoryTrait for ProfileRepository {
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1");
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn create(&self, profile: &Profile) -> Result<Profile> {
        let sql = format!(
            r#"
            INSERT INTO profiles (
                profile_id, user_id, profile_image, profile_name, level, points,
                points_at_last_level_up, profile_mail, phone, cuil, fiscal_address,
                fiscal_condition, iibb, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Profile>(&sql)
            .bind(profile.profile_id)
            .bind(&profile.user_id)
            .bind(&profile.profile_image)
            .bind(&profile.profile_name)
            .bind(profile.level)
            .bind(profile.points)
            .bind(profile.points_at_last_level_up)
            .bind(&profile.profile_mail)
            .bind(&profile.phone)
            .bind(&profile.cuil)
            .bind(&profile.fiscal_address)
            .bind(&profile.fiscal_condition)
            .bind(&profile.iibb)
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let duplicate = matches!(
                    &e,
                    sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
                );
                if duplicate {
                    ProfileError::AlreadyExists {
                        entity: "Profile".to_string(),
                        field: "user_id".to_string(),
                        value: profile.user_id.clone(),
                    }
                } else {
                    ProfileError::Database(e)
                }
            })
    }

    async fn update_contact(
        &self,
        user_id: &str,
        contact: &ContactInfo,
    ) -> Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET profile_name = $2, profile_mail = $3, phone = $4, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .bind(&contact.profile_name)
            .bind(&contact.profile_mail)
            .bind(&contact.phone)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn update_fiscal_data(
        &self,
        user_id: &str,
        data: &FiscalData,
    ) -> Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET cuil = $2, fiscal_address = $3, fiscal_condition = $4, iibb = $5,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .bind(&data.cuil)
            .bind(&data.fiscal_address)
            .bind(&data.fiscal_condition)
            .bind(&data.iibb)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn update_image(&self, user_id: &str, image: &str) -> Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET profile_image = $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .bind(image)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn increment_points(&self, user_id: &str, delta: i32) -> Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET points = points + $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .bind(delta)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let overflow = matches!(
                    &e,
                    sqlx::Error::Database(db)
                        if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE)
                );
                if overflow {
                    ProfileError::points_overflow(user_id, delta)
                } else {
                    ProfileError::Database(e)
                }
            })?;

        Ok(profile)
    }

    async fn set_level_if_unchanged(
        &self,
        user_id: &str,
        expected_level: i32,
        new_level: i32,
        marker: i32,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET level = $3, points_at_last_level_up = LEAST(points, $4), updated_at = NOW()
            WHERE user_id = $1 AND level = $2
            "#,
        )
        .bind(user_id)
        .bind(expected_level)
        .bind(new_level)
        .bind(marker)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_level_and_points(
        &self,
        user_id: &str,
        level: i32,
        points: i32,
    ) -> Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles
            SET level = $2, points = $3,
                points_at_last_level_up = LEAST(points_at_last_level_up, $3),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(user_id)
            .bind(level)
            .bind(points)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn delete(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
