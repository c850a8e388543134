// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::settings::{ShopSettings, UpdateSettingsRequest},
};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_settings<'e, E>(&self, executor: E) -> Result<ShopSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, ShopSettings>(
            r#"
            SELECT company_name, document_number, address, phone, pix_key, updated_at
            FROM shop_settings
            WHERE id = TRUE
            "#,
        )
        .fetch_optional(executor)
        .await?;

        // Nunca configurada: tudo vazio
        Ok(settings.unwrap_or_default())
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        input: UpdateSettingsRequest,
    ) -> Result<ShopSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT da linha única
        let settings = sqlx::query_as::<_, ShopSettings>(
            r#"
            INSERT INTO shop_settings (id, company_name, document_number, address, phone, pix_key)
            VALUES (TRUE, $1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                company_name = EXCLUDED.company_name,
                document_number = EXCLUDED.document_number,
                address = EXCLUDED.address,
                phone = EXCLUDED.phone,
                pix_key = EXCLUDED.pix_key,
                updated_at = NOW()
            RETURNING company_name, document_number, address, phone, pix_key, updated_at
            "#,
        )
        .bind(input.company_name)
        .bind(input.document_number)
        .bind(input.address)
        .bind(input.phone)
        .bind(input.pix_key)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
