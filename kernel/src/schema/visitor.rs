//! A post-order schema visitor for traversing schema types.

use crate::schema::{DataType, ListType, MapType, PrimitiveType, StructField, StructType};
use crate::KernelResult;

/// A post-order schema visitor.
///
/// Struct fields, list elements and map keys/values are visited before their container. The
/// `before_*`/`after_*` hooks bracket the visit of each containment edge, which lets a visitor
/// keep track of the path it is at.
pub(crate) trait SchemaVisitor {
    /// Return type of this visitor.
    type T;

    fn before_struct_field(&mut self, _field: &StructField) -> KernelResult<()> {
        Ok(())
    }

    fn after_struct_field(&mut self, _field: &StructField) -> KernelResult<()> {
        Ok(())
    }

    fn before_list_element(&mut self, _list: &ListType) -> KernelResult<()> {
        Ok(())
    }

    fn after_list_element(&mut self, _list: &ListType) -> KernelResult<()> {
        Ok(())
    }

    fn before_map_key(&mut self, _map: &MapType) -> KernelResult<()> {
        Ok(())
    }

    fn after_map_key(&mut self, _map: &MapType) -> KernelResult<()> {
        Ok(())
    }

    fn before_map_value(&mut self, _map: &MapType) -> KernelResult<()> {
        Ok(())
    }

    fn after_map_value(&mut self, _map: &MapType) -> KernelResult<()> {
        Ok(())
    }

    /// Called after a struct field's data type is visited.
    fn field(&mut self, field: &StructField, value: Self::T) -> KernelResult<Self::T>;

    /// Called after all of a struct's fields have been visited.
    fn r#struct(&mut self, r#struct: &StructType, results: Vec<Self::T>) -> KernelResult<Self::T>;

    /// Called after a list's element type is visited.
    fn list(&mut self, list: &ListType, element: Self::T) -> KernelResult<Self::T>;

    /// Called after a map's key and value types are visited.
    fn map(&mut self, map: &MapType, key: Self::T, value: Self::T) -> KernelResult<Self::T>;

    /// Called when encountering a primitive type.
    fn primitive(&mut self, p: &PrimitiveType) -> KernelResult<Self::T>;
}

/// Visit a data type in post order.
pub(crate) fn visit_type<V: SchemaVisitor>(
    r#type: &DataType,
    visitor: &mut V,
) -> KernelResult<V::T> {
    match r#type {
        DataType::Primitive(p) => visitor.primitive(p),
        DataType::Struct(s) => visit_struct(s, visitor),
        DataType::List(list) => {
            visitor.before_list_element(list)?;
            let element = visit_type(list.element_type(), visitor);
            visitor.after_list_element(list)?;
            visitor.list(list, element?)
        }
        DataType::Map(map) => {
            visitor.before_map_key(map)?;
            let key = visit_type(map.key_type(), visitor);
            visitor.after_map_key(map)?;
            let key = key?;

            visitor.before_map_value(map)?;
            let value = visit_type(map.value_type(), visitor);
            visitor.after_map_value(map)?;
            visitor.map(map, key, value?)
        }
    }
}

/// Visit a struct type in post order.
///
/// Each field's data type is visited first, then the field callback is invoked,
/// and finally the struct callback is invoked with all field results.
pub(crate) fn visit_struct<V: SchemaVisitor>(
    s: &StructType,
    visitor: &mut V,
) -> KernelResult<V::T> {
    let mut results = Vec::with_capacity(s.len());
    for field in s.fields() {
        visitor.before_struct_field(field)?;
        let result = visit_type(field.data_type(), visitor);
        visitor.after_struct_field(field)?;
        let result = visitor.field(field, result?)?;
        results.push(result);
    }

    visitor.r#struct(s, results)
}
