//! Database transaction utilities
//!
//! Every multi-step mutation in the PostgreSQL repositories runs inside a
//! [`TransactionGuard`]; returning early with `?` drops the guard and the
//! transaction is rolled back by sqlx when the connection returns to the pool.

use anyhow::{Context, Result};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::ops::{Deref, DerefMut};

pub struct TransactionGuard<'a> {
    transaction: Option<Transaction<'a, Postgres>>,
}

impl<'a> TransactionGuard<'a> {
    /// Begin a new database transaction
    pub async fn begin(pool: &'a PgPool) -> Result<Self> {
        let transaction = pool
            .begin()
            .await
            .context("Failed to begin database transaction")?;

        Ok(Self {
            transaction: Some(transaction),
        })
    }

    /// Commit the transaction
    pub async fn commit(mut self) -> Result<()> {
        if let Some(tx) = self.transaction.take() {
            tx.commit()
                .await
                .context("Failed to commit database transaction")?;
        }
        Ok(())
    }

    /// Roll back the transaction
    pub async fn rollback(mut self) -> Result<()> {
        if let Some(tx) = self.transaction.take() {
            tx.rollback()
                .await
                .context("Failed to rollback database transaction")?;
        }
        Ok(())
    }

    /// Connection to run statements on inside this transaction
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut **self.inner_mut()
    }

    fn inner(&self) -> &Transaction<'a, Postgres> {
        match self.transaction.as_ref() {
            Some(tx) => tx,
            None => unreachable!("transaction is only taken by commit or rollback, which consume the guard"),
        }
    }

    fn inner_mut(&mut self) -> &mut Transaction<'a, Postgres> {
        match self.transaction.as_mut() {
            Some(tx) => tx,
            None => unreachable!("transaction is only taken by commit or rollback, which consume the guard"),
        }
    }
}

impl<'a> Deref for TransactionGuard<'a> {
    type Target = Transaction<'a, Postgres>;

    fn deref(&self) -> &Self::Target {
        self.inner()
    }
}

impl<'a> DerefMut for TransactionGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner_mut()
    }
}

impl<'a> Drop for TransactionGuard<'a> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            tracing::debug!("Transaction dropped without commit - rolling back");
        }
    }
}
