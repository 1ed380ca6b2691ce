use a4l_core::dealership::Dealership;
use a4l_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct DealershipRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<DealershipRow> for Dealership {
    fn from(row: DealershipRow) -> Self {
        Dealership {
            id: row.id,
            name: row.name,
            description: row.description,
            logo: row.logo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A dealership joined with its owner (if any) and member count.
#[derive(Debug, Clone, FromRow)]
pub struct DealershipSummaryRow {
    #[sqlx(flatten)]
    pub dealership: DealershipRow,
    pub owner_id: Option<DbId>,
    pub owner_username: Option<String>,
    pub owner_joined_at: Option<Timestamp>,
    pub member_count: i64,
}

/// A `dealership_members` row joined with the account's username.
///
/// `role` stays text here; the store parses it into a `MembershipRole`.
#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub account_id: DbId,
    pub dealership_id: DbId,
    pub username: String,
    pub role: String,
    pub joined_at: Timestamp,
}
