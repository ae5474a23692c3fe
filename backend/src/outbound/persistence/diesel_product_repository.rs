//! PostgreSQL-backed `ProductRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{ProductRepository, ProductRepositoryError};
use crate::domain::{Product, ProductDetails, ProductFilter, ProductId, Sku};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error, map_row_error,
};
use super::models::{NewProductRow, ProductRow};
use super::pool::{DbPool, PoolError};
use super::schema::products;

/// Unique constraint on `products.sku`.
pub(crate) const SKU_CONSTRAINT: &str = "products_sku_key";

/// Diesel-backed catalogue store.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert products that are not already stored, matching on SKU.
    ///
    /// # Errors
    ///
    /// Returns a connection or query error when the insert fails.
    pub async fn seed(&self, catalogue: &[Product]) -> Result<usize, ProductRepositoryError> {
        let rows = catalogue
            .iter()
            .map(NewProductRow::from_product)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| map_row_error(err, ProductRepositoryError::query))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(products::table)
            .values(&rows)
            .on_conflict(products::sku)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}

fn map_pool_error(error: PoolError) -> ProductRepositoryError {
    map_basic_pool_error(error, ProductRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProductRepositoryError {
    map_basic_diesel_error(
        error,
        ProductRepositoryError::query,
        ProductRepositoryError::connection,
    )
}

/// Map a write that may collide on the SKU.
fn map_write_error(error: diesel::result::Error, sku: &Sku) -> ProductRepositoryError {
    if is_unique_violation(&error, SKU_CONSTRAINT) {
        ProductRepositoryError::duplicate_sku(sku.as_str())
    } else {
        map_diesel_error(error)
    }
}

fn to_product(row: ProductRow) -> Result<Product, ProductRepositoryError> {
    Product::try_from(row).map_err(|err| map_row_error(err, ProductRepositoryError::query))
}

/// Escape `LIKE` metacharacters so user text matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table
        .filter(products::is_active.eq(true))
        .into_boxed();
    if let Some(brand) = &filter.brand {
        query = query.filter(products::brand.ilike(escape_like(brand.trim())));
    }
    if let Some(condition) = filter.condition {
        query = query.filter(products::condition.eq(condition.as_str()));
    }
    if let Some(min_price) = filter.min_price {
        query = query.filter(products::price_minor.ge(min_price.minor_units()));
    }
    if let Some(max_price) = filter.max_price {
        query = query.filter(products::price_minor.le(max_price.minor_units()));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        query = query.filter(
            products::name
                .ilike(pattern.clone())
                .or(products::brand.ilike(pattern.clone()))
                .or(products::sku.ilike(pattern)),
        );
    }
    query
}

fn offset(page: &PageRequest) -> i64 {
    i64::try_from(page.offset()).unwrap_or(i64::MAX)
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = products::table
            .find(id.as_uuid())
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_product).transpose()
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError> {
        let uuids: Vec<_> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        products::table
            .filter(products::id.eq_any(uuids))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_product)
            .collect()
    }

    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = products::table
            .filter(products::sku.eq(sku.as_str()))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_product).transpose()
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ProductRow> = filtered(filter)
            .order((products::created_at.desc(), products::id.desc()))
            .offset(offset(page))
            .limit(i64::from(page.limit()))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = rows
            .into_iter()
            .map(to_product)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, u64::try_from(total).unwrap_or_default(), *page))
    }

    async fn list_brands(&self) -> Result<Vec<String>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        products::table
            .filter(products::is_active.eq(true))
            .select(products::brand)
            .distinct()
            .order(products::brand.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        let row = NewProductRow::from_product(product)
            .map_err(|err| map_row_error(err, ProductRepositoryError::query))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(products::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, &product.sku))?;
        Ok(())
    }

    async fn update_details(
        &self,
        id: &ProductId,
        details: &ProductDetails,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(products::table.find(id.as_uuid()))
            .set((
                products::sku.eq(details.sku.as_str()),
                products::name.eq(details.name.as_str()),
                products::brand.eq(details.brand.as_str()),
                products::condition.eq(details.condition.as_str()),
                products::price_minor.eq(details.price.minor_units()),
                products::updated_at.eq(now),
            ))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, &details.sku))?;
        row.map(to_product).transpose()
    }

    async fn adjust_stock(
        &self,
        id: &ProductId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let current = products::table
            .find(id.as_uuid())
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(current) = current.map(to_product).transpose()? else {
            return Ok(None);
        };
        let insufficient = || ProductRepositoryError::insufficient_stock(*id, current.quantity_on_hand);
        let delta = i32::try_from(delta).map_err(|_| insufficient())?;

        // Conditional update: concurrent adjustments never take stock below zero.
        let updated = diesel::update(products::table.find(id.as_uuid()))
            .filter((products::quantity_on_hand + delta).ge(0))
            .set((
                products::quantity_on_hand.eq(products::quantity_on_hand + delta),
                products::updated_at.eq(now),
            ))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match updated {
            Some(row) => to_product(row).map(Some),
            None => Err(insufficient()),
        }
    }

    async fn set_active(
        &self,
        id: &ProductId,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(products::table.find(id.as_uuid()))
            .set((products::is_active.eq(active), products::updated_at.eq(now)))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_product).transpose()
    }
}
