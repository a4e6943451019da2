//! LanceDB connection and housekeeping helpers.
//!
//! Provides the database open function, an ensure-table helper and a simple
//! key/value metadata table used to store pointers such as the latest index id.

use anyhow::{anyhow, Result};
use arrow_array::{RecordBatch, RecordBatchIterator, StringArray, TimestampMillisecondArray};
use chrono::Utc;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use std::sync::Arc;

use crate::schema::build_meta_schema;

pub const META_TABLE: &str = "meta";

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await?;
    Ok(names.iter().any(|n| n == name))
}

pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<()> {
    if table_exists(conn, name).await? {
        return Ok(());
    }
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema.clone());
    conn.create_table(name, Box::new(iter)).execute().await?;
    Ok(())
}

pub async fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    ensure_table(conn, META_TABLE, build_meta_schema()).await?;
    let t = conn.open_table(META_TABLE).execute().await?;
    let rb = RecordBatch::try_new(
        build_meta_schema(),
        vec![
            Arc::new(StringArray::from(vec![key.to_string()])),
            Arc::new(StringArray::from(vec![value.to_string()])),
            Arc::new(TimestampMillisecondArray::from(vec![Utc::now().timestamp_millis()])),
        ],
    )?;
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(rb)].into_iter(), build_meta_schema()));
    // Upsert behavior via merge_insert: key is unique
    let mut mi = t.merge_insert(&["key"]);
    mi.when_matched_update_all(None).when_not_matched_insert_all();
    let _ = mi.execute(reader).await?;
    Ok(())
}

pub async fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    if !table_exists(conn, META_TABLE).await? { return Ok(None); }
    let t = conn.open_table(META_TABLE).execute().await?;
    let mut stream = t.query().only_if(format!("key = '{}'", key.replace('\'', "''"))).execute().await?;
    while let Some(batch) = futures::TryStreamExt::try_next(&mut stream).await? {
        if batch.num_rows() == 0 { continue; }
        let val = batch
            .column_by_name("value")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| anyhow!("meta.value column missing"))?;
        return Ok(Some(val.value(0).to_string()));
    }
    Ok(None)
}
