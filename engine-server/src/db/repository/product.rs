//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, strip_table_prefix};
use shared::models::{Product, ProductCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all products, optionally only active ones
    pub async fn find_all(&self, active_only: bool) -> RepoResult<Vec<Product>> {
        let query = if active_only {
            "SELECT *, type::string(id) AS id FROM product WHERE is_active = true ORDER BY name"
        } else {
            "SELECT *, type::string(id) AS id FROM product ORDER BY name"
        };
        let products: Vec<Product> = self.base.db().query(query).await?.take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT *, type::string(id) AS id FROM type::thing($table, $id)")
            .bind(("table", TABLE))
            .bind(("id", pure_id))
            .await?
            .take(0)?;
        Ok(products.into_iter().next())
    }

    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let now = chrono::Utc::now();
        let product = Product {
            id: None,
            name: data.name,
            description: data.description,
            platform_type: data.platform_type,
            profile_tiers: data.profile_tiers,
            is_active: data.is_active.unwrap_or(true),
            created_at: Some(now),
            updated_at: Some(now),
        };

        let mut result = self
            .base
            .db()
            .query(
                "LET $created = CREATE ONLY product CONTENT $data;
                 SELECT *, type::string(id) AS id FROM $created.id;",
            )
            .bind(("data", product))
            .await?;
        let created: Vec<Product> = result.take(1)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }
}
