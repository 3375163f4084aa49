//! Data-only SQL dumps: export the store's rows as SQL text and replay such
//! text into a store.

use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::{
  Error, Result, SqliteStore,
  encode::{quote_ident, sql_literal},
  schema::TABLE_ORDER,
};

// ─── Export ──────────────────────────────────────────────────────────────────

/// User tables in dump order: the known tables first, then anything else in
/// name order.
fn dump_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(
    "SELECT name FROM sqlite_master
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
     ORDER BY name",
  )?;
  let present = stmt.query_map([], |r| r.get::<_, String>(0))?.collect::<rusqlite::Result<Vec<_>>>()?;

  let mut tables: Vec<String> = TABLE_ORDER
    .iter()
    .filter(|t| present.iter().any(|p| p == *t))
    .map(|t| (*t).to_owned())
    .collect();
  tables.extend(present.into_iter().filter(|p| !TABLE_ORDER.contains(&p.as_str())));
  Ok(tables)
}

/// Stored (non-hidden) columns of `table`. Generated columns are hidden, so
/// they never reach a dump.
fn stored_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(&format!("PRAGMA table_xinfo({})", quote_ident(table)))?;
  let columns = stmt
    .query_map([], |r| Ok((r.get::<_, String>(1)?, r.get::<_, i64>(6)?)))?
    .filter_map(|row| match row {
      Ok((name, 0)) => Some(Ok(name)),
      Ok(_) => None,
      Err(e) => Some(Err(e)),
    })
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(columns)
}

fn write_table(conn: &Connection, table: &str, out: &mut String) -> rusqlite::Result<usize> {
  let columns = stored_columns(conn, table)?;
  if columns.is_empty() {
    return Ok(0);
  }
  let column_list = columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");

  let mut stmt =
    conn.prepare(&format!("SELECT {column_list} FROM {} ORDER BY rowid", quote_ident(table)))?;
  let mut rows = stmt.query([])?;
  let mut written = 0;
  while let Some(row) = rows.next()? {
    let values = (0..columns.len())
      .map(|i| row.get_ref(i).map(sql_literal))
      .collect::<rusqlite::Result<Vec<_>>>()?
      .join(", ");
    out.push_str(&format!(
      "INSERT OR REPLACE INTO {} ({column_list}) VALUES ({values});\n",
      quote_ident(table)
    ));
    written += 1;
  }
  Ok(written)
}

fn export(conn: &Connection) -> rusqlite::Result<String> {
  let mut out = format!(
    "-- Case brief data dump\n-- Generated {}\n",
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
  );
  out.push_str("PRAGMA foreign_keys=OFF;\nBEGIN TRANSACTION;\n");
  for table in dump_tables(conn)? {
    let rows = write_table(conn, &table, &mut out)?;
    debug!(table = %table, rows, "table exported");
  }
  out.push_str("COMMIT;\nPRAGMA foreign_keys=ON;\n");
  Ok(out)
}

// ─── Restore ─────────────────────────────────────────────────────────────────

/// Replay `dump`, then count foreign-key violations left behind.
fn restore(conn: &mut Connection, dump: &str) -> rusqlite::Result<usize> {
  if let Err(e) = conn.execute_batch(dump) {
    // The dump may have failed mid-transaction; there may be nothing to roll
    // back, so that error is ignored.
    let _ = conn.execute_batch("ROLLBACK;");
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    return Err(e);
  }
  conn.execute_batch("PRAGMA foreign_keys = ON;")?;

  let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
  let mut rows = stmt.query([])?;
  let mut violations = 0;
  while rows.next()?.is_some() {
    violations += 1;
  }
  Ok(violations)
}

// ─── Public API ──────────────────────────────────────────────────────────────

impl SqliteStore {
  /// Render every stored row as a data-only SQL dump.
  pub async fn export_sql(&self) -> Result<String> {
    let dump = self.conn.call(|conn| Ok(export(conn)?)).await?;
    Ok(dump)
  }

  /// Write [`export_sql`](Self::export_sql) output to `path`, creating
  /// parent directories. Returns the number of bytes written.
  pub async fn export_to_file(&self, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let dump = self.export_sql().await?;
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &dump).await?;
    info!(path = %path.display(), bytes = dump.len(), "dump exported");
    Ok(dump.len())
  }

  /// Execute a dump produced by [`export_sql`](Self::export_sql).
  ///
  /// On failure any open transaction is rolled back and foreign keys are
  /// re-enabled before the error is returned.
  pub async fn restore_sql(&self, dump: impl Into<String>) -> Result<()> {
    let dump = dump.into();
    let violations = self.conn.call(move |conn| Ok(restore(conn, &dump)?)).await?;
    if violations > 0 {
      warn!(violations, "restore left dangling references");
      return Err(Error::IntegrityViolations(violations));
    }
    info!("dump restored");
    Ok(())
  }

  pub async fn restore_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading dump");
    let dump = tokio::fs::read_to_string(path).await?;
    self.restore_sql(dump).await
  }
}
