//! Indexes over the field ids of a schema.

use std::collections::HashMap;

use super::visitor::{visit_struct, SchemaVisitor};
use super::{ColumnName, FieldId, ListType, MapType, PrimitiveType, StructField, StructType};
use crate::{Error, KernelResult};

/// Returns every field id in `schema` mapped to the path of the edge it identifies.
///
/// Struct fields, list elements, map keys and map values all carry ids; list elements are
/// reported as `<list>.element` and map entries as `<map>.key` / `<map>.value`.
///
/// # Errors
/// - [`Error::MissingFieldId`] if any edge has no id.
/// - [`Error::DuplicateFieldId`] if an id is used more than once.
pub fn index_by_id(schema: &StructType) -> KernelResult<HashMap<FieldId, ColumnName>> {
    let mut indexer = IndexById::default();
    visit_struct(schema, &mut indexer)?;
    Ok(indexer.ids)
}

/// The largest field id used in `schema`, or `0` if it has no fields.
///
/// This validates the schema the same way as [`index_by_id`].
pub fn max_field_id(schema: &StructType) -> KernelResult<FieldId> {
    let ids = index_by_id(schema)?;
    Ok(ids.into_keys().max().unwrap_or(0))
}

#[derive(Default)]
struct IndexById {
    path: Vec<String>,
    ids: HashMap<FieldId, ColumnName>,
}

impl IndexById {
    fn enter(&mut self, name: &str, id: Option<FieldId>) -> KernelResult<()> {
        self.path.push(name.to_string());
        let path = ColumnName::new(&self.path);
        let id = id.ok_or_else(|| Error::missing_field_id(path.clone()))?;
        match self.ids.insert(id, path.clone()) {
            Some(existing) => Err(Error::duplicate_field_id(id, existing, path)),
            None => Ok(()),
        }
    }

    fn exit(&mut self) -> KernelResult<()> {
        self.path.pop();
        Ok(())
    }
}

impl SchemaVisitor for IndexById {
    type T = ();

    fn before_struct_field(&mut self, field: &StructField) -> KernelResult<()> {
        self.enter(field.name(), field.id())
    }

    fn after_struct_field(&mut self, _field: &StructField) -> KernelResult<()> {
        self.exit()
    }

    fn before_list_element(&mut self, list: &ListType) -> KernelResult<()> {
        self.enter("element", list.element_id())
    }

    fn after_list_element(&mut self, _list: &ListType) -> KernelResult<()> {
        self.exit()
    }

    fn before_map_key(&mut self, map: &MapType) -> KernelResult<()> {
        self.enter("key", map.key_id())
    }

    fn after_map_key(&mut self, _map: &MapType) -> KernelResult<()> {
        self.exit()
    }

    fn before_map_value(&mut self, map: &MapType) -> KernelResult<()> {
        self.enter("value", map.value_id())
    }

    fn after_map_value(&mut self, _map: &MapType) -> KernelResult<()> {
        self.exit()
    }

    fn field(&mut self, _field: &StructField, _value: ()) -> KernelResult<()> {
        Ok(())
    }

    fn r#struct(&mut self, _struct: &StructType, _results: Vec<()>) -> KernelResult<()> {
        Ok(())
    }

    fn list(&mut self, _list: &ListType, _element: ()) -> KernelResult<()> {
        Ok(())
    }

    fn map(&mut self, _map: &MapType, _key: (), _value: ()) -> KernelResult<()> {
        Ok(())
    }

    fn primitive(&mut self, _p: &PrimitiveType) -> KernelResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataType;

    fn nested() -> StructType {
        StructType::try_new([
            StructField::not_null("id", DataType::LONG).with_id(1),
            StructField::nullable(
                "location",
                ListType::new(
                    StructType::try_new([
                        StructField::not_null("lat", DataType::DOUBLE).with_id(5),
                        StructField::not_null("long", DataType::DOUBLE).with_id(6),
                    ])
                    .unwrap(),
                    true,
                )
                .with_element_id(4),
            )
            .with_id(2),
            StructField::nullable(
                "props",
                MapType::new(DataType::STRING, DataType::STRING, true)
                    .with_key_id(7)
                    .with_value_id(8),
            )
            .with_id(3),
        ])
        .unwrap()
    }

    #[test]
    fn test_index_by_id() {
        let index = index_by_id(&nested()).unwrap();
        let expected: HashMap<FieldId, ColumnName> = [
            (1, ColumnName::new(["id"])),
            (2, ColumnName::new(["location"])),
            (3, ColumnName::new(["props"])),
            (4, ColumnName::new(["location", "element"])),
            (5, ColumnName::new(["location", "element", "lat"])),
            (6, ColumnName::new(["location", "element", "long"])),
            (7, ColumnName::new(["props", "key"])),
            (8, ColumnName::new(["props", "value"])),
        ]
        .into_iter()
        .collect();
        assert_eq!(index, expected);
        assert_eq!(max_field_id(&nested()).unwrap(), 8);
    }

    #[test]
    fn test_max_field_id_of_empty_struct() {
        assert_eq!(max_field_id(&StructType::empty()).unwrap(), 0);
    }

    #[test]
    fn test_missing_field_id() {
        let tags = ListType::new(DataType::STRING, true);
        let field = StructField::nullable("tags", tags).with_id(1);
        let schema = StructType::try_new([field]).unwrap();
        let err = index_by_id(&schema).unwrap_err();
        let expected = ColumnName::new(["tags", "element"]);
        assert!(
            matches!(&err, Error::MissingFieldId { path } if *path == expected),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_duplicate_field_id() {
        let schema = StructType::try_new([
            StructField::nullable("a", DataType::INTEGER).with_id(1),
            StructField::nullable(
                "b",
                StructType::try_new([StructField::nullable("c", DataType::INTEGER).with_id(1)])
                    .unwrap(),
            )
            .with_id(2),
        ])
        .unwrap();
        let err = index_by_id(&schema).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Duplicate field id 1 found at paths 'a' and 'b.c'"
        );
    }
}
