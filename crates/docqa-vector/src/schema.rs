use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// One row per chunk; `page` is null for unpaginated sources.
pub fn build_chunk_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("chunk_index", DataType::Int32, false),
		Field::new("source", DataType::Utf8, false),
		Field::new("page", DataType::Int32, true),
		Field::new("text", DataType::Utf8, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}

pub fn build_meta_schema() -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("key", DataType::Utf8, false),
		Field::new("value", DataType::Utf8, false),
		Field::new("updated_at", DataType::Timestamp(arrow_schema::TimeUnit::Millisecond, None), false),
	]))
}
