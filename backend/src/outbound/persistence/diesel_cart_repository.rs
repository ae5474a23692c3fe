//! PostgreSQL-backed `CartRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CartRepository, CartRepositoryError};
use crate::domain::{CartLine, ProductId, UserId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_row_error,
};
use super::models::CartLineRow;
use super::pool::{DbPool, PoolError};
use super::schema::cart_lines;

/// Diesel-backed cart store.
#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CartRepositoryError {
    map_basic_pool_error(error, CartRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CartRepositoryError {
    map_basic_diesel_error(error, CartRepositoryError::query, CartRepositoryError::connection)
}

fn to_line(row: CartLineRow) -> Result<CartLine, CartRepositoryError> {
    CartLine::try_from(row).map_err(|err| map_row_error(err, CartRepositoryError::query))
}

#[async_trait]
impl CartRepository for DieselCartRepository {
    async fn lines_for_user(&self, user_id: &UserId) -> Result<Vec<CartLine>, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        cart_lines::table
            .filter(cart_lines::user_id.eq(user_id.as_uuid()))
            .order((cart_lines::created_at.asc(), cart_lines::product_id.asc()))
            .select(CartLineRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_line)
            .collect()
    }

    async fn find_line(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<CartLine>, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = cart_lines::table
            .find((user_id.as_uuid(), product_id.as_uuid()))
            .select(CartLineRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_line).transpose()
    }

    async fn upsert_line(&self, line: &CartLine) -> Result<(), CartRepositoryError> {
        let row = CartLineRow::try_from(line)
            .map_err(|err| map_row_error(err, CartRepositoryError::query))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(cart_lines::table)
            .values(&row)
            .on_conflict((cart_lines::user_id, cart_lines::product_id))
            .do_update()
            .set((
                cart_lines::quantity.eq(excluded(cart_lines::quantity)),
                cart_lines::updated_at.eq(excluded(cart_lines::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn remove_line(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<bool, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(cart_lines::table.find((user_id.as_uuid(), product_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn clear(&self, user_id: &UserId) -> Result<(), CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(cart_lines::table.filter(cart_lines::user_id.eq(user_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
