//! PostgreSQL-backed payment ledger.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{PaymentRepository, PaymentRepositoryError};
use crate::domain::{OrderId, PaymentRecord};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error, map_row_error,
};
use super::models::PaymentRow;
use super::pool::{DbPool, PoolError};
use super::schema::payments;

/// Unique constraint guarding gateway references.
pub(super) const EXTERNAL_REFERENCE_CONSTRAINT: &str = "payments_external_reference_key";

/// Insert the record or update the mutable columns of the one with its id.
pub(super) async fn upsert_payment_row(
    conn: &mut AsyncPgConnection,
    row: &PaymentRow,
) -> QueryResult<usize> {
    diesel::insert_into(payments::table)
        .values(row)
        .on_conflict(payments::id)
        .do_update()
        .set((
            payments::status.eq(excluded(payments::status)),
            payments::external_reference.eq(excluded(payments::external_reference)),
            payments::paid_at.eq(excluded(payments::paid_at)),
            payments::metadata.eq(excluded(payments::metadata)),
            payments::updated_at.eq(excluded(payments::updated_at)),
        ))
        .execute(conn)
        .await
}

/// Diesel-backed payment ledger.
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PaymentRepositoryError {
    map_basic_pool_error(error, PaymentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PaymentRepositoryError {
    map_basic_diesel_error(
        error,
        PaymentRepositoryError::query,
        PaymentRepositoryError::connection,
    )
}

fn to_record(row: PaymentRow) -> Result<PaymentRecord, PaymentRepositoryError> {
    PaymentRecord::try_from(row).map_err(|err| map_row_error(err, PaymentRepositoryError::query))
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn find_by_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Vec<PaymentRecord>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        payments::table
            .filter(payments::order_id.eq(order_id.as_uuid()))
            .order((payments::created_at.asc(), payments::id.asc()))
            .select(PaymentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_record)
            .collect()
    }

    async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<PaymentRecord>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = payments::table
            .filter(payments::external_reference.eq(external_reference))
            .select(PaymentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_record).transpose()
    }

    async fn upsert(&self, record: &PaymentRecord) -> Result<(), PaymentRepositoryError> {
        let row = PaymentRow::from(record);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        match upsert_payment_row(&mut conn, &row).await {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err, EXTERNAL_REFERENCE_CONSTRAINT) => {
                Err(PaymentRepositoryError::duplicate_reference(
                    record.external_reference.clone().unwrap_or_default(),
                ))
            }
            Err(err) => Err(map_diesel_error(err)),
        }
    }
}
