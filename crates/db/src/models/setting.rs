use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct SettingRow {
    pub key: String,
    pub value: Option<String>,
}
