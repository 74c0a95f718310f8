//! Schema kernel: field id bookkeeping for evolving nested table schemas.
//!
//! Data files are read back by field id rather than by name or position, so when a table's
//! schema evolves every column that already existed must keep its id and every new column must
//! get an id that was never used before. The entry points are:
//!
//! - [`reconcile_field_ids`] / [`FieldIdReconciler`]: carry ids from the current schema over to
//!   a proposed schema, minting fresh ids for new fields.
//! - [`assign_fresh_ids`]: identify a brand-new schema from scratch.
//! - [`schema::index_by_id`] and [`schema::max_field_id`]: inspect the ids of a schema.
//!
//! ```rust
//! # use schema_kernel::schema::{DataType, Schema, StructField, StructType};
//! # use schema_kernel::reconcile_field_ids;
//! # fn main() -> schema_kernel::KernelResult<()> {
//! let current = Schema::new(StructType::try_new([
//!     StructField::not_null("id", DataType::LONG).with_id(1),
//! ])?);
//! let proposed = Schema::new(StructType::try_new([
//!     StructField::not_null("id", DataType::LONG),
//!     StructField::nullable("name", DataType::STRING),
//! ])?);
//!
//! let evolved = reconcile_field_ids(&proposed, &current)?;
//! assert_eq!(evolved.field("id").and_then(|f| f.id()), Some(1));
//! assert_eq!(evolved.field("name").and_then(|f| f.id()), Some(2));
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod error;
pub mod reconcile;
pub mod schema;

pub(crate) mod utils;

pub use error::{Error, KernelResult};
pub use reconcile::{
    assign_fresh_ids, assign_fresh_ids_from, reconcile_field_ids, FieldIdReconciler,
    ReconciledSchema,
};
