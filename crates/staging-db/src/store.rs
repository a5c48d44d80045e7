//! Staging database access: reflection, table lifecycle, row IO.

use crate::error::StagingError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Suffix shared by every ID-mapping table.
pub const ID_TABLE_SUFFIX: &str = "sf_ids";

/// Whether `table` is an ID-mapping table.
pub fn is_id_table(table: &str) -> bool {
    table.ends_with(ID_TABLE_SUFFIX)
}

/// Name of the ID-mapping table belonging to object table `table`.
pub fn id_table_name(table: &str) -> String {
    format!("{table}_{ID_TABLE_SUFFIX}")
}

/// Locator for a SQLite file at `path`.
///
/// The locator is percent-decoded and cut at `?` when opened, so `%`, `?`
/// and `#` in the path are escaped.
pub fn sqlite_url(path: &Path) -> String {
    let mut url = String::from("sqlite://");
    for c in path.display().to_string().chars() {
        match c {
            '%' => url.push_str("%25"),
            '?' => url.push_str("%3F"),
            '#' => url.push_str("%23"),
            _ => url.push(c),
        }
    }
    url
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A row of an object table. `values` follows the column order of the call
/// that wrote or read it; `None` is SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedRow {
    pub id: i64,
    pub values: Vec<Option<String>>,
}

impl StagedRow {
    pub fn new(id: i64, values: Vec<Option<String>>) -> Self {
        Self { id, values }
    }
}

/// Connection to a staging database.
pub struct StagingDatabase {
    pool: SqlitePool,
    url: String,
}

impl StagingDatabase {
    /// Connect to the database at `url`, creating the file if missing.
    pub async fn connect(url: &str) -> Result<Self, StagingError> {
        if !url.starts_with("sqlite:") {
            return Err(StagingError::UnsupportedUrl(url.to_string()));
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // One connection: the store is only ever used by one step at a time.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self {
            pool,
            url: url.to_string(),
        })
    }

    /// Locator this connection was opened with.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Close the connection pool.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Reflect the names of all user tables.
    pub async fn table_names(&self) -> Result<Vec<String>, StagingError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND substr(name, 1, 7) != 'sqlite_' \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Reflect the names of all object tables (everything but ID-mapping tables).
    pub async fn object_tables(&self) -> Result<Vec<String>, StagingError> {
        let mut names = self.table_names().await?;
        names.retain(|name| !is_id_table(name));
        Ok(names)
    }

    /// Whether `table` exists.
    pub async fn table_exists(&self, table: &str) -> Result<bool, StagingError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Reflect the column names of `table`, in declaration order.
    pub async fn column_names(&self, table: &str) -> Result<Vec<String>, StagingError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM pragma_table_info(?1) ORDER BY cid",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Drop `table` if it exists.
    pub async fn drop_table(&self, table: &str) -> Result<(), StagingError> {
        let sql = format!("DROP TABLE IF EXISTS {}", quote_ident(table));
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop every object table, leaving ID-mapping tables in place.
    ///
    /// Returns the names of the dropped tables.
    pub async fn drop_object_tables(&self) -> Result<Vec<String>, StagingError> {
        let tables = self.object_tables().await?;
        for table in &tables {
            debug!("Dropping staging table '{}'", table);
            self.drop_table(table).await?;
        }
        Ok(tables)
    }

    /// Create an object table with an integer `id` and one TEXT column per entry
    /// of `columns`. An existing table of the same name is replaced.
    pub async fn create_object_table(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<(), StagingError> {
        self.drop_table(table).await?;

        let mut definitions = vec![format!("{} INTEGER PRIMARY KEY", quote_ident("id"))];
        definitions.extend(columns.iter().map(|c| format!("{} TEXT", quote_ident(c))));

        let sql = format!(
            "CREATE TABLE {} ({})",
            quote_ident(table),
            definitions.join(", ")
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert rows into an object table in a single transaction.
    pub async fn insert_rows(
        &self,
        table: &str,
        columns: &[String],
        rows: &[StagedRow],
    ) -> Result<u64, StagingError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut column_list = vec![quote_ident("id")];
        column_list.extend(columns.iter().map(|c| quote_ident(c)));
        let placeholders = vec!["?"; column_list.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            column_list.join(", "),
            placeholders
        );

        let mut tx = self.pool.begin().await?;
        for row in rows {
            if row.values.len() != columns.len() {
                return Err(StagingError::ColumnCountMismatch {
                    table: table.to_string(),
                    id: row.id,
                    expected: columns.len(),
                    actual: row.values.len(),
                });
            }

            let mut query = sqlx::query(&sql).bind(row.id);
            for value in &row.values {
                query = query.bind(value.as_deref());
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(rows.len() as u64)
    }

    /// Read `columns` of every row of `table`, ordered by id. Values come back
    /// as text regardless of how they were stored.
    pub async fn fetch_rows(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<Vec<StagedRow>, StagingError> {
        let existing = self.column_names(table).await?;
        if existing.is_empty() {
            return Err(StagingError::TableNotFound(table.to_string()));
        }
        if let Some(missing) = columns.iter().find(|c| !existing.contains(c)) {
            return Err(StagingError::ColumnNotFound {
                table: table.to_string(),
                column: missing.clone(),
            });
        }

        let mut select = vec![quote_ident("id")];
        select.extend(
            columns
                .iter()
                .map(|c| format!("CAST({} AS TEXT)", quote_ident(c))),
        );
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            select.join(", "),
            quote_ident(table),
            quote_ident("id")
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| -> Result<StagedRow, StagingError> {
                let id: i64 = row.try_get(0)?;
                let values = (1..=columns.len())
                    .map(|i| row.try_get::<Option<String>, _>(i))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(StagedRow { id, values })
            })
            .collect()
    }

    /// Count the rows of `table`.
    pub async fn count_rows(&self, table: &str) -> Result<u64, StagingError> {
        if !self.table_exists(table).await? {
            return Err(StagingError::TableNotFound(table.to_string()));
        }
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Create the ID-mapping table for object table `table` if missing.
    pub async fn ensure_id_table(&self, table: &str) -> Result<(), StagingError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\"id\" TEXT NOT NULL, \"sf_id\" TEXT NOT NULL)",
            quote_ident(&id_table_name(table))
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Append `(local id, external id)` pairs to the ID-mapping table of `table`.
    pub async fn append_id_mappings(
        &self,
        table: &str,
        mappings: &[(String, String)],
    ) -> Result<u64, StagingError> {
        self.ensure_id_table(table).await?;
        if mappings.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "INSERT INTO {} (\"id\", \"sf_id\") VALUES (?1, ?2)",
            quote_ident(&id_table_name(table))
        );
        let mut tx = self.pool.begin().await?;
        for (local_id, sf_id) in mappings {
            sqlx::query(&sql)
                .bind(local_id.as_str())
                .bind(sf_id.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(mappings.len() as u64)
    }

    /// Local id -> external id for every row loaded from `table` so far.
    pub async fn id_mappings(&self, table: &str) -> Result<HashMap<String, String>, StagingError> {
        let id_table = id_table_name(table);
        if !self.table_exists(&id_table).await? {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT \"id\", \"sf_id\" FROM {}",
            quote_ident(&id_table)
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| -> Result<(String, String), StagingError> {
                Ok((row.try_get(0)?, row.try_get(1)?))
            })
            .collect()
    }

    /// Largest local id recorded in the ID-mapping table of `table`, or 0.
    pub async fn max_local_id(&self, table: &str) -> Result<i64, StagingError> {
        let id_table = id_table_name(table);
        if !self.table_exists(&id_table).await? {
            return Ok(0);
        }

        let sql = format!(
            "SELECT COALESCE(MAX(CAST(\"id\" AS INTEGER)), 0) FROM {}",
            quote_ident(&id_table)
        );
        let max = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(max)
    }
}
