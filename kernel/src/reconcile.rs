//! Carries field ids over from a table's current schema to a proposed new schema.
//!
//! Readers resolve columns in data files by field id, so when a schema evolves every field that
//! already existed must keep its id, and every new field must get an id that was never handed
//! out before. [`FieldIdReconciler`] walks the proposed (candidate) schema in lock-step with the
//! current (source) schema:
//!
//! - a struct field whose name matches a field of the source struct at the same path reuses that
//!   field's id, and its type is compared against the source field's type;
//! - a struct field with no match is new: it gets a fresh id, and so does every edge anywhere
//!   beneath it, even if a nested name happens to coincide with some other source field;
//! - list elements and map keys/values reuse the source ids unless they are inside a new field.
//!
//! Fresh ids start one above the largest id in the source schema (or above the table's recorded
//! last assigned id, if that is higher) and are handed out in candidate field order, pre-order,
//! depth first, map keys before values.
//!
//! Matching is by name only, so a renamed field is a new field.

use std::cmp::max;
use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use crate::schema::{
    ColumnName, DataType, FieldId, ListType, MapType, Schema, StructField, StructType,
};
use crate::{Error, KernelResult};

/// Carries field ids from `source` over to `candidate`, assigning fresh ids to new fields.
///
/// Any ids already present on `candidate` are ignored. See [`FieldIdReconciler`] for the rules.
pub fn reconcile_field_ids(candidate: &Schema, source: &Schema) -> KernelResult<Schema> {
    FieldIdReconciler::try_new(source)?.reconcile(candidate)
}

/// Assigns field ids `1, 2, ...` to every edge of a new table's schema.
pub fn assign_fresh_ids(candidate: &Schema) -> KernelResult<Schema> {
    assign_fresh_ids_from(candidate, 0)
}

/// Assigns field ids to every edge of `candidate`, starting after `last_assigned_id`.
pub fn assign_fresh_ids_from(
    candidate: &Schema,
    last_assigned_id: FieldId,
) -> KernelResult<Schema> {
    let empty = Schema::default();
    FieldIdReconciler::try_new(&empty)?
        .with_last_assigned_id(last_assigned_id)
        .reconcile(candidate)
}

/// The result of [`FieldIdReconciler::reconcile_with_stats`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledSchema {
    /// The candidate schema with every edge identified
    pub schema: Schema,
    /// The largest id handed out so far: the seed's high-water mark if no id was allocated.
    /// Callers persist this as the table's last assigned id.
    pub last_assigned_id: FieldId,
    /// Number of edges that kept their id from the source schema
    pub reused_ids: usize,
    /// Number of edges that received a fresh id
    pub assigned_ids: usize,
}

/// Hands out fresh field ids. Owned by exactly one reconciliation.
#[derive(Debug)]
struct IdAllocator {
    last_assigned: FieldId,
    allocated: usize,
}

impl IdAllocator {
    fn new(last_assigned: FieldId) -> Self {
        Self {
            last_assigned,
            allocated: 0,
        }
    }

    fn allocate(&mut self) -> KernelResult<FieldId> {
        let id = self
            .last_assigned
            .checked_add(1)
            .ok_or(Error::FieldIdOverflow {
                last_assigned: self.last_assigned,
            })?;
        self.last_assigned = id;
        self.allocated += 1;
        Ok(id)
    }
}

/// Where a candidate node stands relative to the source schema.
///
/// Once a subtree is [`SourceContext::New`], everything beneath it is new as well: there is no
/// way back to [`SourceContext::Existing`] further down.
#[derive(Debug, Clone, Copy)]
enum SourceContext<'s> {
    /// The node was reached through an unbroken chain of matches; this is the source node at the
    /// same path.
    Existing(&'s DataType),
    /// The node lies in a subtree that has no counterpart in the source schema.
    New,
}

/// Reconciles the field ids of one candidate schema against one source schema.
///
/// A reconciler is built from the source schema, optionally configured, and then consumed by a
/// single call to [`reconcile`](Self::reconcile), so its id allocator can never be shared between
/// two reconciliations.
///
/// # Example
///
/// ```rust
/// # use schema_kernel::schema::{DataType, MapType, Schema, StructField, StructType};
/// # use schema_kernel::FieldIdReconciler;
/// # fn main() -> schema_kernel::KernelResult<()> {
/// let source = Schema::new(StructType::try_new([
///     StructField::not_null("a", DataType::INTEGER).with_id(1),
/// ])?);
/// let candidate = Schema::new(StructType::try_new([
///     StructField::not_null("a", DataType::INTEGER),
///     StructField::nullable("m", MapType::new(DataType::STRING, DataType::INTEGER, true)),
/// ])?);
///
/// let result = FieldIdReconciler::try_new(&source)?
///     .with_last_assigned_id(10)
///     .reconcile_with_stats(&candidate)?;
/// assert_eq!(result.schema.field("m").and_then(|f| f.id()), Some(11));
/// assert_eq!((result.reused_ids, result.assigned_ids), (1, 3));
/// assert_eq!(result.last_assigned_id, 13);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FieldIdReconciler<'s> {
    source: &'s Schema,
    allocator: IdAllocator,
    case_sensitive: bool,
    reused: usize,
}

impl<'s> FieldIdReconciler<'s> {
    /// Creates a reconciler whose fresh ids start one above the largest id in `source`.
    ///
    /// Fails if `source` has an edge without an id or uses an id twice.
    pub fn try_new(source: &'s Schema) -> KernelResult<Self> {
        let max_id = source.highest_field_id()?;
        Ok(Self {
            source,
            allocator: IdAllocator::new(max_id),
            case_sensitive: true,
            reused: 0,
        })
    }

    /// Sets the table's last assigned field id. Fresh ids start above the larger of this and the
    /// largest id in the source schema, so ids of dropped columns are never handed out again.
    pub fn with_last_assigned_id(mut self, last_assigned_id: FieldId) -> Self {
        self.allocator.last_assigned = max(self.allocator.last_assigned, last_assigned_id);
        self
    }

    /// Whether field names must match exactly (the default) or only up to ASCII case.
    ///
    /// Ignoring case, a candidate struct may not hold two fields whose names differ only by case:
    /// both would match the same source field, so reconciling fails with [`Error::Schema`].
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Returns `candidate` with every edge identified.
    pub fn reconcile(self, candidate: &Schema) -> KernelResult<Schema> {
        Ok(self.reconcile_with_stats(candidate)?.schema)
    }

    /// Like [`reconcile`](Self::reconcile), but also reports how many ids were reused and
    /// assigned, and the new last assigned id.
    #[instrument(
        name = "schema.reconcile_ids",
        skip_all,
        fields(last_assigned_id = self.allocator.last_assigned, case_sensitive = self.case_sensitive),
        err
    )]
    pub fn reconcile_with_stats(mut self, candidate: &Schema) -> KernelResult<ReconciledSchema> {
        let source_root = self.source.as_struct();
        let root = ColumnName::root();
        let fields = self.reconcile_struct(candidate.as_struct(), Some(source_root), &root)?;
        debug!(
            reused = self.reused,
            assigned = self.allocator.allocated,
            last_assigned_id = self.allocator.last_assigned,
            "reconciled field ids"
        );
        Ok(ReconciledSchema {
            schema: Schema::new(fields).with_schema_id(candidate.schema_id()),
            last_assigned_id: self.allocator.last_assigned,
            reused_ids: self.reused,
            assigned_ids: self.allocator.allocated,
        })
    }

    /// `source` is `None` when the struct is inside a new subtree.
    fn reconcile_struct(
        &mut self,
        candidate: &StructType,
        source: Option<&'s StructType>,
        path: &ColumnName,
    ) -> KernelResult<StructType> {
        if !self.case_sensitive {
            require_distinct_ignoring_case(candidate, path)?;
        }
        let mut fields = Vec::with_capacity(candidate.len());
        for field in candidate.fields() {
            let field_path = path.child(field.name());
            let source_field = source.and_then(|s| self.find_field(s, field.name()));
            let (id, context) = match source_field {
                Some(source_field) => (
                    self.reuse(source_field.id(), &field_path)?,
                    SourceContext::Existing(source_field.data_type()),
                ),
                None => {
                    let id = self.allocator.allocate()?;
                    if source.is_some() {
                        debug!(path = %field_path, field_id = id, "new field");
                    }
                    (id, SourceContext::New)
                }
            };
            let data_type = self.reconcile_type(field.data_type(), context, &field_path)?;
            fields.push(StructField {
                id: Some(id),
                name: field.name.clone(),
                data_type,
                nullable: field.nullable,
                doc: field.doc.clone(),
            });
        }
        // names were unique in the candidate, so they still are
        Ok(StructType::new_unchecked(fields))
    }

    fn reconcile_type(
        &mut self,
        candidate: &DataType,
        context: SourceContext<'s>,
        path: &ColumnName,
    ) -> KernelResult<DataType> {
        let data_type = match candidate {
            DataType::Primitive(_) => candidate.clone(),
            DataType::Struct(candidate) => {
                let source = match context {
                    SourceContext::Existing(DataType::Struct(source)) => Some(source.as_ref()),
                    SourceContext::Existing(other) => {
                        return Err(counterpart_mismatch("struct", other, path))
                    }
                    SourceContext::New => None,
                };
                self.reconcile_struct(candidate, source, path)?.into()
            }
            DataType::List(candidate) => self.reconcile_list(candidate, context, path)?.into(),
            DataType::Map(candidate) => self.reconcile_map(candidate, context, path)?.into(),
        };
        Ok(data_type)
    }

    fn reconcile_list(
        &mut self,
        candidate: &ListType,
        context: SourceContext<'s>,
        path: &ColumnName,
    ) -> KernelResult<ListType> {
        let element_path = path.child("element");
        let (element_id, element_context) = match context {
            SourceContext::Existing(DataType::List(source)) => (
                self.reuse(source.element_id(), &element_path)?,
                SourceContext::Existing(source.element_type()),
            ),
            SourceContext::Existing(other) => {
                return Err(counterpart_mismatch("list", other, path))
            }
            SourceContext::New => (self.allocator.allocate()?, SourceContext::New),
        };
        let element_type =
            self.reconcile_type(candidate.element_type(), element_context, &element_path)?;
        Ok(ListType {
            element_id: Some(element_id),
            element_type,
            element_nullable: candidate.element_nullable(),
        })
    }

    fn reconcile_map(
        &mut self,
        candidate: &MapType,
        context: SourceContext<'s>,
        path: &ColumnName,
    ) -> KernelResult<MapType> {
        let key_path = path.child("key");
        let value_path = path.child("value");
        let (key_id, key_context, value_id, value_context) = match context {
            SourceContext::Existing(DataType::Map(source)) => (
                self.reuse(source.key_id(), &key_path)?,
                SourceContext::Existing(source.key_type()),
                self.reuse(source.value_id(), &value_path)?,
                SourceContext::Existing(source.value_type()),
            ),
            SourceContext::Existing(other) => return Err(counterpart_mismatch("map", other, path)),
            SourceContext::New => (
                self.allocator.allocate()?,
                SourceContext::New,
                self.allocator.allocate()?,
                SourceContext::New,
            ),
        };
        let key_type = self.reconcile_type(candidate.key_type(), key_context, &key_path)?;
        let value_type = self.reconcile_type(candidate.value_type(), value_context, &value_path)?;
        Ok(MapType {
            key_id: Some(key_id),
            key_type,
            value_id: Some(value_id),
            value_type,
            value_nullable: candidate.value_nullable(),
        })
    }

    fn find_field(&self, source: &'s StructType, name: &str) -> Option<&'s StructField> {
        if self.case_sensitive {
            source.field(name)
        } else {
            source.field_case_insensitive(name)
        }
    }

    fn reuse(&mut self, id: Option<FieldId>, path: &ColumnName) -> KernelResult<FieldId> {
        // the source was fully indexed when the reconciler was built
        let id = id.ok_or_else(|| {
            Error::internal_error(format!("source schema has no field id at '{path}'"))
        })?;
        trace!(path = %path, field_id = id, "reusing field id");
        self.reused += 1;
        Ok(id)
    }
}

/// Two candidate fields that differ only by case would both match the same source field.
fn require_distinct_ignoring_case(candidate: &StructType, path: &ColumnName) -> KernelResult<()> {
    let mut seen: HashMap<String, &String> = HashMap::with_capacity(candidate.len());
    for name in candidate.field_names() {
        if let Some(previous) = seen.insert(name.to_ascii_lowercase(), name) {
            return Err(Error::schema(format!(
                "Fields '{}' and '{}' differ only by case and cannot be told apart",
                path.child(previous),
                path.child(name)
            )));
        }
    }
    Ok(())
}

fn counterpart_mismatch(expected: &str, found: &DataType, path: &ColumnName) -> Error {
    Error::internal_error(format!(
        "Cannot reconcile field ids at '{path}': the candidate has a {expected} but the source \
         schema has a {} ({found})",
        found.kind()
    ))
}
