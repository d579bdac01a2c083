//! The query-execution capability that scopes wrap.

use crate::error::PrintSqlResult;
use crate::query::CompiledQuery;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Something that can run a [`CompiledQuery`] against a data store.
///
/// Plain clients and transactions implement this directly. An [`SqlScope`](crate::SqlScope)
/// implements it too, by decorating the executor it was opened on, so code written against
/// `&impl Executor` runs unchanged inside and outside a scope.
pub trait Executor: Send + Sync {
    /// What a successful execution returns.
    type Output: Send;

    /// Execute the query and return its result.
    fn execute_sql(
        &self,
        query: &CompiledQuery,
    ) -> impl std::future::Future<Output = PrintSqlResult<Self::Output>> + Send;
}

impl<E: Executor + ?Sized> Executor for &E {
    type Output = E::Output;

    fn execute_sql(
        &self,
        query: &CompiledQuery,
    ) -> impl std::future::Future<Output = PrintSqlResult<Self::Output>> + Send {
        (**self).execute_sql(query)
    }
}

impl Executor for tokio_postgres::Client {
    type Output = Vec<Row>;

    async fn execute_sql(&self, query: &CompiledQuery) -> PrintSqlResult<Vec<Row>> {
        let (sql, values) = query.to_postgres()?;
        let params: Vec<&(dyn ToSql + Sync)> = values.into_iter().map(|v| v as _).collect();
        Ok(tokio_postgres::Client::query(self, &sql, &params).await?)
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    type Output = Vec<Row>;

    async fn execute_sql(&self, query: &CompiledQuery) -> PrintSqlResult<Vec<Row>> {
        let (sql, values) = query.to_postgres()?;
        let params: Vec<&(dyn ToSql + Sync)> = values.into_iter().map(|v| v as _).collect();
        Ok(tokio_postgres::Transaction::query(self, &sql, &params).await?)
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Client {
    type Output = Vec<Row>;

    async fn execute_sql(&self, query: &CompiledQuery) -> PrintSqlResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper -> tokio_postgres::Client).
        let client: &tokio_postgres::Client = self;
        Executor::execute_sql(client, query).await
    }
}

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Transaction<'_> {
    type Output = Vec<Row>;

    async fn execute_sql(&self, query: &CompiledQuery) -> PrintSqlResult<Vec<Row>> {
        let tx: &tokio_postgres::Transaction<'_> = self;
        Executor::execute_sql(tx, query).await
    }
}
