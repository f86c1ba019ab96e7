//! Default product category.

use sea_orm::{ConnectionTrait, DbErr, Statement};
use uuid::Uuid;

const GET_OR_CREATE_CATEGORY: &str = r"
WITH inserted AS (
    INSERT INTO product_categories (name, description, display_order)
    VALUES ($1, $2, 0)
    ON CONFLICT (name) DO NOTHING
    RETURNING id
)
SELECT id FROM inserted
UNION ALL
SELECT id FROM product_categories WHERE name = $1
LIMIT 1
";

/// Category lookups against a connection or an open transaction.
#[derive(Debug)]
pub struct CategoryRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> CategoryRepository<'c, C> {
    /// Creates a repository over a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Returns the id of the named category, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn get_or_create(&self, name: &str) -> Result<Option<Uuid>, DbErr> {
        let description = format!("{name} products");
        let statement = Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            GET_OR_CREATE_CATEGORY,
            [name.into(), description.into()],
        );

        match self.conn.query_one(statement).await? {
            Some(row) => row.try_get::<Uuid>("", "id").map(Some),
            None => Ok(None),
        }
    }
}
