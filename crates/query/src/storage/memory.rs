//! In-memory storage backend.
//!
//! Tables are kept sorted by primary key so reads come back in the same order
//! a `PostgreSQL` `ORDER BY id` would produce. The backend counts every query
//! it serves and can be told to fail reads from a table, which lets tests
//! check the loader's batching and all-or-nothing behavior without a database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

use super::{Column, Row, StorageAccessor, StorageError, Table};

#[derive(Debug, Clone)]
struct StoredRow {
    row: Row,
    deleted: bool,
}

/// Storage backed by in-process vectors.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: HashMap<Table, Vec<StoredRow>>,
    unavailable: HashSet<Table>,
    queries: AtomicUsize,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, row: impl Into<Row>) -> Self {
        self.insert(row);
        self
    }

    /// Insert a row, replacing any row of the same table with the same ID.
    pub fn insert(&mut self, row: impl Into<Row>) {
        let row = row.into();
        let id = row.column(Column::Id).unwrap_or_default();
        let rows = self.tables.entry(row.table()).or_default();
        let position = rows.binary_search_by_key(&id, |stored| {
            stored.row.column(Column::Id).unwrap_or_default()
        });
        let stored = StoredRow {
            row,
            deleted: false,
        };
        match position {
            Ok(existing) => {
                if let Some(slot) = rows.get_mut(existing) {
                    *slot = stored;
                }
            }
            Err(insert_at) => rows.insert(insert_at, stored),
        }
    }

    /// Mark a row as soft-deleted.
    ///
    /// Returns `false` if no such row exists.
    pub fn soft_delete(&mut self, table: Table, id: i32) -> bool {
        let Some(rows) = self.tables.get_mut(&table) else {
            return false;
        };
        match rows
            .iter_mut()
            .find(|stored| stored.row.column(Column::Id) == Some(id))
        {
            Some(stored) => {
                stored.deleted = true;
                true
            }
            None => false,
        }
    }

    /// Make reads from `table` fail with [`StorageError::Unavailable`].
    pub fn set_unavailable(&mut self, table: Table, unavailable: bool) {
        if unavailable {
            self.unavailable.insert(table);
        } else {
            self.unavailable.remove(&table);
        }
    }

    /// Number of queries served (including failed ones) since creation or
    /// the last [`reset_query_count`](Self::reset_query_count).
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    /// Reset the query counter to zero.
    pub fn reset_query_count(&self) {
        self.queries.store(0, Ordering::Relaxed);
    }

    fn live_rows(&self, table: Table) -> Result<impl Iterator<Item = &Row>, StorageError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if self.unavailable.contains(&table) {
            return Err(StorageError::Unavailable(table));
        }
        Ok(self
            .tables
            .get(&table)
            .into_iter()
            .flatten()
            .filter(|stored| !stored.deleted)
            .map(|stored| &stored.row))
    }
}

impl StorageAccessor for MemoryStorage {
    async fn fetch_by_id(&self, table: Table, id: i32) -> Result<Option<Row>, StorageError> {
        trace!(%table, id, "memory fetch_by_id");
        Ok(self
            .live_rows(table)?
            .find(|row| row.column(Column::Id) == Some(id))
            .cloned())
    }

    async fn fetch_by_parent_ids(
        &self,
        table: Table,
        column: Column,
        ids: &[i32],
    ) -> Result<Vec<Row>, StorageError> {
        trace!(%table, %column, count = ids.len(), "memory fetch_by_parent_ids");
        let wanted: HashSet<i32> = ids.iter().copied().collect();
        Ok(self
            .live_rows(table)?
            .filter(|row| row.column(column).is_some_and(|value| wanted.contains(&value)))
            .cloned()
            .collect())
    }

    async fn fetch_all(&self, table: Table) -> Result<Vec<Row>, StorageError> {
        trace!(%table, "memory fetch_all");
        Ok(self.live_rows(table)?.cloned().collect())
    }

    /// Fails with the first table marked unavailable. Not counted as a query.
    async fn ping(&self) -> Result<(), StorageError> {
        Table::ALL
            .into_iter()
            .find(|table| self.unavailable.contains(table))
            .map_or(Ok(()), |table| Err(StorageError::Unavailable(table)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use storegraph_core::{Address, AddressId, UserId};

    use super::*;

    fn address(id: i32, user_id: i32) -> Address {
        let now = Utc::now();
        Address {
            id: AddressId::new(id),
            user_id: UserId::new(user_id),
            receiver_name: format!("receiver {id}"),
            receiver_phone: "555-0100".to_owned(),
            province: "State".to_owned(),
            city: "City".to_owned(),
            district: "District".to_owned(),
            detail: "1 Main St".to_owned(),
            postal_code: None,
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn ids(rows: &[Row]) -> Vec<i32> {
        rows.iter().filter_map(|r| r.column(Column::Id)).collect()
    }

    #[tokio::test]
    async fn test_rows_come_back_in_key_order() {
        let storage = MemoryStorage::new()
            .with(address(3, 1))
            .with(address(1, 1))
            .with(address(2, 2));

        let rows = storage.fetch_all(Table::Address).await.unwrap();
        assert_eq!(ids(&rows), [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_by_parent_ids_filters_on_column() {
        let storage = MemoryStorage::new()
            .with(address(1, 1))
            .with(address(2, 2))
            .with(address(3, 1));

        let rows = storage
            .fetch_by_parent_ids(Table::Address, Column::UserId, &[1, 99])
            .await
            .unwrap();
        assert_eq!(ids(&rows), [1, 3]);
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_are_hidden() {
        let mut storage = MemoryStorage::new().with(address(1, 1)).with(address(2, 1));
        assert!(storage.soft_delete(Table::Address, 1));
        assert!(!storage.soft_delete(Table::Address, 42));

        assert!(storage.fetch_by_id(Table::Address, 1).await.unwrap().is_none());
        let rows = storage
            .fetch_by_parent_ids(Table::Address, Column::UserId, &[1])
            .await
            .unwrap();
        assert_eq!(ids(&rows), [2]);
    }

    #[tokio::test]
    async fn test_missing_table_reads_as_empty() {
        let storage = MemoryStorage::new();
        assert!(storage.fetch_by_id(Table::Product, 1).await.unwrap().is_none());
        assert!(storage.fetch_all(Table::Product).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_table_fails_and_counts_queries() {
        let mut storage = MemoryStorage::new().with(address(1, 1));
        storage.set_unavailable(Table::Address, true);

        let err = storage.fetch_all(Table::Address).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(Table::Address)));
        assert_eq!(storage.query_count(), 1);

        storage.set_unavailable(Table::Address, false);
        assert_eq!(storage.fetch_all(Table::Address).await.unwrap().len(), 1);
        assert_eq!(storage.query_count(), 2);

        storage.reset_query_count();
        assert_eq!(storage.query_count(), 0);
    }

    #[tokio::test]
    async fn test_ping_reports_unavailable_tables() {
        let mut storage = MemoryStorage::new();
        storage.ping().await.unwrap();

        storage.set_unavailable(Table::Order, true);
        assert!(matches!(
            storage.ping().await,
            Err(StorageError::Unavailable(Table::Order))
        ));
        assert_eq!(storage.query_count(), 0);

        storage.set_unavailable(Table::Order, false);
        storage.ping().await.unwrap();
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut storage = MemoryStorage::new().with(address(1, 1));
        let mut updated = address(1, 1);
        updated.city = "Elsewhere".to_owned();
        storage.insert(updated);

        let rows: Vec<&Row> = storage.live_rows(Table::Address).unwrap().collect();
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows.first(), Some(Row::Address(a)) if a.city == "Elsewhere"));
    }
}
