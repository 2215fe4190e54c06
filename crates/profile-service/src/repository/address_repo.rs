//! 地址仓储

use async_trait::async_trait;
use profile_shared::error::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::traits::AddressRepositoryTrait;
use crate::models::{Address, AddressFields};

/// 地址仓储
pub struct AddressRepository {
    pool: PgPool,
}

impl AddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressRepositoryTrait for AddressRepository {
    async fn create(&self, address: &Address) -> Result<Address> {
        let created = sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses (
                address_id, profile_id, postal_code, street, number, floor,
                main_address, active_address, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING address_id, profile_id, postal_code, street, number, floor,
                      main_address, active_address, created_at, updated_at
            "#,
        )
        .bind(address.address_id)
        .bind(address.profile_id)
        .bind(&address.postal_code)
        .bind(&address.street)
        .bind(address.number)
        .bind(&address.floor)
        .bind(address.main_address)
        .bind(address.active_address)
        .bind(address.created_at)
        .bind(address.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_active_by_profile(&self, profile_id: Uuid) -> Result<Option<Address>> {
        // 可能存在多个激活地址，取最近更新的一条
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT address_id, profile_id, postal_code, street, number, floor,
                   main_address, active_address, created_at, updated_at
            FROM addresses
            WHERE profile_id = $1 AND active_address = TRUE
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    async fn update_active(
        &self,
        profile_id: Uuid,
        fields: &AddressFields,
    ) -> Result<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            UPDATE addresses
            SET postal_code = $2, street = $3, number = $4, floor = $5,
                main_address = $6, updated_at = NOW()
            WHERE profile_id = $1 AND active_address = TRUE
            RETURNING address_id, profile_id, postal_code, street, number, floor,
                      main_address, active_address, created_at, updated_at
            "#,
        )
        .bind(profile_id)
        .bind(&fields.postal_code)
        .bind(&fields.street)
        .bind(fields.number)
        .bind(&fields.floor)
        .bind(fields.main_address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    async fn set_active(&self, profile_id: Uuid, address_id: Uuid, active: bool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE addresses
            SET active_address = $3, updated_at = NOW()
            WHERE address_id = $1 AND profile_id = $2
            "#,
        )
        .bind(address_id)
        .bind(profile_id)
        .bind(active)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_profile(&self, profile_id: Uuid) -> Result<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT address_id, profile_id, postal_code, street, number, floor,
                   main_address, active_address, created_at, updated_at
            FROM addresses
            WHERE profile_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses)
    }
}
