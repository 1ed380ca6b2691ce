//! Repository for the `site_settings` key/value table.

use sqlx::PgPool;

use crate::models::setting::SettingRow;

pub struct SettingsRepo;

impl SettingsRepo {
    pub async fn find_many(pool: &PgPool, keys: &[&str]) -> Result<Vec<SettingRow>, sqlx::Error> {
        sqlx::query_as::<_, SettingRow>("SELECT key, value FROM site_settings WHERE key = ANY($1)")
            .bind(keys)
            .fetch_all(pool)
            .await
    }

    /// Insert or overwrite every pair in one statement.
    pub async fn upsert_many(
        pool: &PgPool,
        entries: &[(&str, Option<&str>)],
    ) -> Result<(), sqlx::Error> {
        let keys: Vec<&str> = entries.iter().map(|(k, _)| *k).collect();
        let values: Vec<Option<&str>> = entries.iter().map(|(_, v)| *v).collect();
        sqlx::query(
            "INSERT INTO site_settings (key, value)
             SELECT * FROM UNNEST($1::text[], $2::text[])
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(&keys)
        .bind(&values)
        .execute(pool)
        .await?;
        Ok(())
    }
}
