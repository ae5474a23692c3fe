//! PostgreSQL-backed `OrderRepository`.
//!
//! Placement and updates each run in one transaction. Stock is reserved with
//! a conditional decrement and orders are updated with a compare-and-set on
//! `revision`; either failing rolls back every write. Product rows are always
//! locked in ascending id order so concurrent placements cannot deadlock.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{
    OrderListFilter, OrderPlacement, OrderRepository, OrderRepositoryError, OrderUpdate,
};
use crate::domain::{Order, OrderId, OrderLine};

use super::diesel_basic_error_mapping::{
    is_lock_conflict, is_unique_violation, map_basic_diesel_error, map_basic_pool_error, map_row_error,
};
use super::diesel_payment_repository::{EXTERNAL_REFERENCE_CONSTRAINT, upsert_payment_row};
use super::models::{
    OrderLineRow, OrderRow, PaymentRow, ProductRow, RowError, order_from_rows, to_db_int,
};
use super::pool::{DbPool, PoolError};
use super::schema::{cart_lines, order_lines, orders, products};

/// Diesel-backed order store.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a transaction: either Diesel's or a rule the adapter
/// enforces. Both roll the transaction back.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Rejected(OrderRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<OrderRepositoryError> for TxError {
    fn from(error: OrderRepositoryError) -> Self {
        Self::Rejected(error)
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, OrderRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

fn map_rows(error: RowError) -> OrderRepositoryError {
    map_row_error(error, OrderRepositoryError::query)
}

fn map_tx_error(error: TxError, payment_refs: &[Option<String>]) -> OrderRepositoryError {
    match error {
        TxError::Rejected(error) => error,
        TxError::Diesel(error) if is_unique_violation(&error, EXTERNAL_REFERENCE_CONSTRAINT) => {
            let reference = payment_refs.iter().flatten().next().cloned().unwrap_or_default();
            OrderRepositoryError::duplicate_payment(reference)
        }
        TxError::Diesel(error) if is_lock_conflict(&error) => {
            OrderRepositoryError::lock_conflict(error.to_string())
        }
        TxError::Diesel(error) => map_diesel_error(error),
    }
}

/// Lines sorted by product id, the order in which product rows are locked.
fn in_lock_order(lines: &[OrderLine]) -> Vec<&OrderLine> {
    let mut sorted: Vec<&OrderLine> = lines.iter().collect();
    sorted.sort_by_key(|line| line.product_id);
    sorted
}

/// Explain why a conditional stock decrement matched no row.
async fn classify_reservation_failure(
    conn: &mut AsyncPgConnection,
    line: &OrderLine,
) -> Result<OrderRepositoryError, TxError> {
    let product = products::table
        .find(line.product_id.as_uuid())
        .select(ProductRow::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(match product {
        None => OrderRepositoryError::product_not_found(line.product_id),
        Some(row) if !row.is_active => OrderRepositoryError::product_unavailable(line.product_id),
        Some(row) => OrderRepositoryError::insufficient_stock(
            line.product_id,
            line.quantity.get(),
            u32::try_from(row.quantity_on_hand).unwrap_or_default(),
        ),
    })
}

async fn reserve_stock(conn: &mut AsyncPgConnection, line: &OrderLine) -> Result<(), TxError> {
    let quantity = to_db_int("quantity", line.quantity.get()).map_err(map_rows)?;
    let reserved = diesel::update(products::table.find(line.product_id.as_uuid()))
        .filter(products::is_active.eq(true))
        .filter(products::quantity_on_hand.ge(quantity))
        .set(products::quantity_on_hand.eq(products::quantity_on_hand - quantity))
        .execute(conn)
        .await?;
    if reserved == 0 {
        let reason = classify_reservation_failure(conn, line).await?;
        return Err(TxError::Rejected(reason));
    }
    Ok(())
}

async fn restock(conn: &mut AsyncPgConnection, line: &OrderLine) -> Result<(), TxError> {
    let quantity = to_db_int("quantity", line.quantity.get()).map_err(map_rows)?;
    diesel::update(products::table.find(line.product_id.as_uuid()))
        .set(products::quantity_on_hand.eq(products::quantity_on_hand + quantity))
        .execute(conn)
        .await?;
    Ok(())
}

fn filtered(filter: &OrderListFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(user_id) = filter.user_id {
        query = query.filter(orders::user_id.eq(*user_id.as_uuid()));
    }
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    if let Some(payment_status) = filter.payment_status {
        query = query.filter(orders::payment_status.eq(payment_status.as_str()));
    }
    query
}

async fn load_lines(
    conn: &mut AsyncPgConnection,
    order_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<OrderLineRow>>, diesel::result::Error> {
    let rows: Vec<OrderLineRow> = order_lines::table
        .filter(order_lines::order_id.eq_any(order_ids))
        .order((order_lines::order_id.asc(), order_lines::position.asc()))
        .select(OrderLineRow::as_select())
        .load(conn)
        .await?;
    let mut grouped: HashMap<Uuid, Vec<OrderLineRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row);
    }
    Ok(grouped)
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn place(&self, placement: &OrderPlacement) -> Result<(), OrderRepositoryError> {
        let order_row = OrderRow::try_from(&placement.order).map_err(map_rows)?;
        let line_rows = OrderLineRow::for_order(&placement.order).map_err(map_rows)?;
        let payment_row = placement.payment.as_ref().map(PaymentRow::from);
        let payment_refs: Vec<Option<String>> = placement
            .payment
            .iter()
            .map(|payment| payment.external_reference.clone())
            .collect();
        let order = &placement.order;
        let cart_products: Vec<Uuid> = placement
            .cart_products
            .iter()
            .map(|id| *id.as_uuid())
            .collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                for line in in_lock_order(&order.lines) {
                    reserve_stock(conn, line).await?;
                }
                diesel::insert_into(orders::table)
                    .values(&order_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(order_lines::table)
                    .values(&line_rows)
                    .execute(conn)
                    .await?;
                if let Some(payment_row) = &payment_row {
                    upsert_payment_row(conn, payment_row).await?;
                }
                if !cart_products.is_empty() {
                    diesel::delete(
                        cart_lines::table
                            .filter(cart_lines::user_id.eq(order.user_id.as_uuid()))
                            .filter(cart_lines::product_id.eq_any(cart_products)),
                    )
                    .execute(conn)
                    .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_tx_error(err, &payment_refs))
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = orders::table
            .find(id.as_uuid())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut lines = load_lines(&mut conn, vec![row.id])
            .await
            .map_err(map_diesel_error)?;
        let order_lines = lines.remove(&row.id).unwrap_or_default();
        order_from_rows(row, order_lines).map(Some).map_err(map_rows)
    }

    async fn list(
        &self,
        filter: &OrderListFilter,
        page: &PageRequest,
    ) -> Result<Page<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<OrderRow> = filtered(filter)
            .order((orders::created_at.desc(), orders::id.desc()))
            .offset(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .limit(i64::from(page.limit()))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut lines = load_lines(&mut conn, rows.iter().map(|row| row.id).collect())
            .await
            .map_err(map_diesel_error)?;
        let items = rows
            .into_iter()
            .map(|row| {
                let order_lines = lines.remove(&row.id).unwrap_or_default();
                order_from_rows(row, order_lines)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_rows)?;
        Ok(Page::new(items, u64::try_from(total).unwrap_or_default(), *page))
    }

    async fn update(&self, update: &OrderUpdate) -> Result<(), OrderRepositoryError> {
        let order_row = OrderRow::try_from(&update.order).map_err(map_rows)?;
        let expected = to_db_int("revision", update.expected_revision).map_err(map_rows)?;
        let payment_rows: Vec<PaymentRow> = update.payments.iter().map(PaymentRow::from).collect();
        let payment_refs: Vec<Option<String>> = update
            .payments
            .iter()
            .map(|payment| payment.external_reference.clone())
            .collect();
        let order = &update.order;
        let order_id = order.id;
        let expected_revision = update.expected_revision;
        let restock_lines = update.restock;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let updated = diesel::update(orders::table.find(order_id.as_uuid()))
                    .filter(orders::revision.eq(expected))
                    .set(&order_row)
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Err(TxError::Rejected(OrderRepositoryError::revision_mismatch(
                        order_id,
                        expected_revision,
                    )));
                }
                if restock_lines {
                    for line in in_lock_order(&order.lines) {
                        restock(conn, line).await?;
                    }
                }
                for payment_row in &payment_rows {
                    upsert_payment_row(conn, payment_row).await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_tx_error(err, &payment_refs))
    }
}
