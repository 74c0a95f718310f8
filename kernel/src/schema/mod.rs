//! Definitions and functions to create and manipulate table schemas.
//!
//! A [`Schema`] is a root [`StructType`] plus a schema id. Field ids live on the containment
//! edges of the tree: a [`StructField`], the element of a [`ListType`], and the key and value of
//! a [`MapType`]. An id may be absent on a schema that has not been identified yet.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utils::require;
use crate::{Error, KernelResult};

mod column_name;
mod index;
pub(crate) mod visitor;

pub use column_name::ColumnName;
pub use index::{index_by_id, max_field_id};

/// The identifier of a column or sub-column.
pub type FieldId = i32;

/// The largest precision a decimal type may have.
pub const MAX_DECIMAL_PRECISION: u8 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    Float,
    Double,
    Date,
    /// Time of day, microsecond precision, no time zone
    Time,
    /// Timestamp, microsecond precision, no time zone
    Timestamp,
    /// Timestamp, microsecond precision, adjusted to UTC
    TimestampTz,
    String,
    Uuid,
    Binary,
    Decimal {
        precision: u8,
        scale: u8,
    },
    /// Fixed-length byte array of the given length
    Fixed(u64),
}

impl PrimitiveType {
    pub fn decimal(precision: u8, scale: u8) -> KernelResult<Self> {
        require!(
            (1..=MAX_DECIMAL_PRECISION).contains(&precision),
            Error::schema(format!(
                "Decimal precision must be between 1 and {MAX_DECIMAL_PRECISION}, got {precision}"
            ))
        );
        require!(
            scale <= precision,
            Error::schema(format!(
                "Decimal scale {scale} must not exceed its precision {precision}"
            ))
        );
        Ok(Self::Decimal { precision, scale })
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::TimestampTz => write!(f, "timestamptz"),
            Self::String => write!(f, "string"),
            Self::Uuid => write!(f, "uuid"),
            Self::Binary => write!(f, "binary"),
            Self::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
            Self::Fixed(len) => write!(f, "fixed[{len}]"),
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let primitive = match s {
            "boolean" => Self::Boolean,
            "int" => Self::Integer,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" => Self::Timestamp,
            "timestamptz" => Self::TimestampTz,
            "string" => Self::String,
            "uuid" => Self::Uuid,
            "binary" => Self::Binary,
            _ => return parse_parameterized_primitive(s),
        };
        Ok(primitive)
    }
}

fn parse_parameterized_primitive(s: &str) -> KernelResult<PrimitiveType> {
    let invalid = || Error::schema(format!("Unknown primitive type '{s}'"));
    if let Some(params) = s
        .strip_prefix("decimal(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let (precision, scale) = params.split_once(',').ok_or_else(invalid)?;
        let precision = precision.trim().parse().map_err(|_| invalid())?;
        let scale = scale.trim().parse().map_err(|_| invalid())?;
        PrimitiveType::decimal(precision, scale)
    } else if let Some(len) = s
        .strip_prefix("fixed[")
        .and_then(|rest| rest.strip_suffix(']'))
    {
        let len = len.trim().parse().map_err(|_| invalid())?;
        Ok(PrimitiveType::Fixed(len))
    } else {
        Err(invalid())
    }
}

impl Serialize for PrimitiveType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PrimitiveType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The type of a column: either a primitive or one of the nested containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr)]
#[serde(from = "SerdeDataType", into = "SerdeDataType")]
#[strum(serialize_all = "lowercase")]
pub enum DataType {
    Primitive(PrimitiveType),
    Struct(Box<StructType>),
    List(Box<ListType>),
    Map(Box<MapType>),
}

impl DataType {
    pub const BOOLEAN: Self = Self::Primitive(PrimitiveType::Boolean);
    pub const INTEGER: Self = Self::Primitive(PrimitiveType::Integer);
    pub const LONG: Self = Self::Primitive(PrimitiveType::Long);
    pub const FLOAT: Self = Self::Primitive(PrimitiveType::Float);
    pub const DOUBLE: Self = Self::Primitive(PrimitiveType::Double);
    pub const DATE: Self = Self::Primitive(PrimitiveType::Date);
    pub const TIME: Self = Self::Primitive(PrimitiveType::Time);
    pub const TIMESTAMP: Self = Self::Primitive(PrimitiveType::Timestamp);
    pub const TIMESTAMPTZ: Self = Self::Primitive(PrimitiveType::TimestampTz);
    pub const STRING: Self = Self::Primitive(PrimitiveType::String);
    pub const UUID: Self = Self::Primitive(PrimitiveType::Uuid);
    pub const BINARY: Self = Self::Primitive(PrimitiveType::Binary);

    /// The kind of this type (`primitive`, `struct`, `list` or `map`), for messages.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<PrimitiveType> for DataType {
    fn from(ptype: PrimitiveType) -> Self {
        Self::Primitive(ptype)
    }
}
impl From<StructType> for DataType {
    fn from(struct_type: StructType) -> Self {
        Self::Struct(Box::new(struct_type))
    }
}
impl From<ListType> for DataType {
    fn from(list_type: ListType) -> Self {
        Self::List(Box::new(list_type))
    }
}
impl From<MapType> for DataType {
    fn from(map_type: MapType) -> Self {
        Self::Map(Box::new(map_type))
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Struct(s) => write!(f, "{s}"),
            Self::List(l) => write!(f, "{l}"),
            Self::Map(m) => write!(f, "{m}"),
        }
    }
}

/// A named field of a struct. The field id identifies the edge from the struct to this field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SerdeStructField", into = "SerdeStructField")]
pub struct StructField {
    pub id: Option<FieldId>,
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub doc: Option<String>,
}

impl StructField {
    /// Creates a new field without a field id or doc string
    pub fn new(name: impl Into<String>, data_type: impl Into<DataType>, nullable: bool) -> Self {
        Self {
            id: None,
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            doc: None,
        }
    }

    /// Creates a new nullable field
    pub fn nullable(name: impl Into<String>, data_type: impl Into<DataType>) -> Self {
        Self::new(name, data_type, true)
    }

    /// Creates a new non-nullable (required) field
    pub fn not_null(name: impl Into<String>, data_type: impl Into<DataType>) -> Self {
        Self::new(name, data_type, false)
    }

    pub fn with_id(mut self, id: FieldId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    #[inline]
    pub fn id(&self) -> Option<FieldId> {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &String {
        &self.name
    }

    #[inline]
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[inline]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

impl Display for StructField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(id) = self.id {
            write!(f, "{id}: ")?;
        }
        let requirement = if self.nullable {
            "optional"
        } else {
            "required"
        };
        write!(f, "{}: {requirement} {}", self.name, self.data_type)?;
        if let Some(doc) = &self.doc {
            write!(f, " ({doc})")?;
        }
        Ok(())
    }
}

/// An ordered collection of uniquely named fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "SerdeStructType", into = "SerdeStructType")]
pub struct StructType {
    fields: IndexMap<String, StructField>,
}

impl StructType {
    /// Creates a new struct type from the given fields.
    ///
    /// Returns an error if two fields share a name.
    pub fn try_new(fields: impl IntoIterator<Item = StructField>) -> KernelResult<Self> {
        let mut field_map = IndexMap::new();
        for field in fields {
            if let Some(dup) = field_map.insert(field.name.clone(), field) {
                return Err(Error::schema(format!(
                    "Struct has duplicate field name '{}'",
                    dup.name
                )));
            }
        }
        Ok(Self { fields: field_map })
    }

    /// Creates a new struct type without checking for duplicate field names. A later field
    /// replaces an earlier field of the same name.
    pub fn new_unchecked(fields: impl IntoIterator<Item = StructField>) -> Self {
        let fields = fields.into_iter().map(|f| (f.name.clone(), f)).collect();
        Self { fields }
    }

    /// A struct with no fields.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Looks up a field by its exact name.
    pub fn field(&self, name: impl AsRef<str>) -> Option<&StructField> {
        self.fields.get(name.as_ref())
    }

    /// Looks up a field by name ignoring ASCII case. An exact match wins; otherwise the first
    /// field in struct order whose name matches ignoring case is returned.
    pub fn field_case_insensitive(&self, name: impl AsRef<str>) -> Option<&StructField> {
        let name = name.as_ref();
        self.field(name).or_else(|| {
            self.fields
                .values()
                .find(|field| field.name.eq_ignore_ascii_case(name))
        })
    }

    pub fn fields(&self) -> impl ExactSizeIterator<Item = &StructField> {
        self.fields.values()
    }

    pub fn field_names(&self) -> impl ExactSizeIterator<Item = &String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Field order is part of a struct's identity, which `IndexMap` equality ignores.
impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.fields().eq(other.fields())
    }
}

impl Eq for StructType {}

impl Display for StructType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "struct<{}>", self.fields().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SerdeListType", into = "SerdeListType")]
pub struct ListType {
    pub element_id: Option<FieldId>,
    pub element_type: DataType,
    /// Denoting whether this list can contain null elements
    pub element_nullable: bool,
}

impl ListType {
    pub fn new(element_type: impl Into<DataType>, element_nullable: bool) -> Self {
        Self {
            element_id: None,
            element_type: element_type.into(),
            element_nullable,
        }
    }

    pub fn with_element_id(mut self, id: FieldId) -> Self {
        self.element_id = Some(id);
        self
    }

    pub const fn element_id(&self) -> Option<FieldId> {
        self.element_id
    }

    pub const fn element_type(&self) -> &DataType {
        &self.element_type
    }

    pub const fn element_nullable(&self) -> bool {
        self.element_nullable
    }
}

impl Display for ListType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "list<")?;
        write_edge(
            f,
            self.element_id,
            self.element_nullable,
            &self.element_type,
        )?;
        write!(f, ">")
    }
}

/// A map type. Keys are never null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SerdeMapType", into = "SerdeMapType")]
pub struct MapType {
    pub key_id: Option<FieldId>,
    pub key_type: DataType,
    pub value_id: Option<FieldId>,
    pub value_type: DataType,
    /// Denoting whether this map can contain null values
    pub value_nullable: bool,
}

impl MapType {
    pub fn new(
        key_type: impl Into<DataType>,
        value_type: impl Into<DataType>,
        value_nullable: bool,
    ) -> Self {
        Self {
            key_id: None,
            key_type: key_type.into(),
            value_id: None,
            value_type: value_type.into(),
            value_nullable,
        }
    }

    pub fn with_key_id(mut self, id: FieldId) -> Self {
        self.key_id = Some(id);
        self
    }

    pub fn with_value_id(mut self, id: FieldId) -> Self {
        self.value_id = Some(id);
        self
    }

    pub const fn key_id(&self) -> Option<FieldId> {
        self.key_id
    }

    pub const fn key_type(&self) -> &DataType {
        &self.key_type
    }

    pub const fn value_id(&self) -> Option<FieldId> {
        self.value_id
    }

    pub const fn value_type(&self) -> &DataType {
        &self.value_type
    }

    pub const fn value_nullable(&self) -> bool {
        self.value_nullable
    }
}

impl Display for MapType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "map<")?;
        write_edge(f, self.key_id, false, &self.key_type)?;
        write!(f, ", ")?;
        write_edge(f, self.value_id, self.value_nullable, &self.value_type)?;
        write!(f, ">")
    }
}

fn write_edge(
    f: &mut Formatter<'_>,
    id: Option<FieldId>,
    nullable: bool,
    data_type: &DataType,
) -> std::fmt::Result {
    if let Some(id) = id {
        write!(f, "{id}: ")?;
    }
    if nullable {
        write!(f, "optional ")?;
    }
    write!(f, "{data_type}")
}

/// A table schema: the root struct of the column tree and the id of this schema version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SerdeSchema", into = "SerdeSchema")]
pub struct Schema {
    schema_id: i32,
    fields: StructType,
}

impl Schema {
    pub fn new(fields: StructType) -> Self {
        Self {
            schema_id: 0,
            fields,
        }
    }

    pub fn with_schema_id(mut self, schema_id: i32) -> Self {
        self.schema_id = schema_id;
        self
    }

    pub fn schema_id(&self) -> i32 {
        self.schema_id
    }

    /// The root struct of this schema.
    pub fn as_struct(&self) -> &StructType {
        &self.fields
    }

    /// Looks up a top-level field by name.
    pub fn field(&self, name: impl AsRef<str>) -> Option<&StructField> {
        self.fields.field(name)
    }

    pub fn fields(&self) -> impl ExactSizeIterator<Item = &StructField> {
        self.fields.fields()
    }

    /// The largest field id used anywhere in this schema, or `0` if it has no fields.
    ///
    /// Fails if any field id is missing or used twice.
    pub fn highest_field_id(&self) -> KernelResult<FieldId> {
        max_field_id(&self.fields)
    }

    pub fn from_json(json: &str) -> KernelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> KernelResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "table {{")?;
        for field in self.fields() {
            write!(f, "\n  {field}")?;
        }
        write!(f, "\n}}")
    }
}

// ============================================================================
// JSON representation
// ============================================================================

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SerdeDataType {
    Primitive(PrimitiveType),
    Nested(SerdeNestedType),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum SerdeNestedType {
    Struct(StructType),
    List(ListType),
    Map(MapType),
}

impl From<SerdeDataType> for DataType {
    fn from(value: SerdeDataType) -> Self {
        match value {
            SerdeDataType::Primitive(p) => p.into(),
            SerdeDataType::Nested(SerdeNestedType::Struct(s)) => s.into(),
            SerdeDataType::Nested(SerdeNestedType::List(l)) => l.into(),
            SerdeDataType::Nested(SerdeNestedType::Map(m)) => m.into(),
        }
    }
}

impl From<DataType> for SerdeDataType {
    fn from(value: DataType) -> Self {
        match value {
            DataType::Primitive(p) => Self::Primitive(p),
            DataType::Struct(s) => Self::Nested(SerdeNestedType::Struct(*s)),
            DataType::List(l) => Self::Nested(SerdeNestedType::List(*l)),
            DataType::Map(m) => Self::Nested(SerdeNestedType::Map(*m)),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SerdeStructField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<FieldId>,
    name: String,
    required: bool,
    #[serde(rename = "type")]
    data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    doc: Option<String>,
}

impl From<SerdeStructField> for StructField {
    fn from(value: SerdeStructField) -> Self {
        Self {
            id: value.id,
            name: value.name,
            data_type: value.data_type,
            nullable: !value.required,
            doc: value.doc,
        }
    }
}

impl From<StructField> for SerdeStructField {
    fn from(value: StructField) -> Self {
        Self {
            id: value.id,
            name: value.name,
            required: !value.nullable,
            data_type: value.data_type,
            doc: value.doc,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SerdeStructType {
    fields: Vec<StructField>,
}

impl TryFrom<SerdeStructType> for StructType {
    type Error = Error;

    fn try_from(value: SerdeStructType) -> Result<Self, Self::Error> {
        StructType::try_new(value.fields)
    }
}

impl From<StructType> for SerdeStructType {
    fn from(value: StructType) -> Self {
        Self {
            fields: value.fields.into_values().collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SerdeListType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    element_id: Option<FieldId>,
    element: DataType,
    element_required: bool,
}

impl From<SerdeListType> for ListType {
    fn from(value: SerdeListType) -> Self {
        Self {
            element_id: value.element_id,
            element_type: value.element,
            element_nullable: !value.element_required,
        }
    }
}

impl From<ListType> for SerdeListType {
    fn from(value: ListType) -> Self {
        Self {
            element_id: value.element_id,
            element: value.element_type,
            element_required: !value.element_nullable,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SerdeMapType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_id: Option<FieldId>,
    key: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_id: Option<FieldId>,
    value: DataType,
    value_required: bool,
}

impl From<SerdeMapType> for MapType {
    fn from(value: SerdeMapType) -> Self {
        Self {
            key_id: value.key_id,
            key_type: value.key,
            value_id: value.value_id,
            value_type: value.value,
            value_nullable: !value.value_required,
        }
    }
}

impl From<MapType> for SerdeMapType {
    fn from(value: MapType) -> Self {
        Self {
            key_id: value.key_id,
            key: value.key_type,
            value_id: value.value_id,
            value: value.value_type,
            value_required: !value.value_nullable,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SchemaTypeTag {
    Struct,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SerdeSchema {
    #[serde(default)]
    schema_id: i32,
    #[serde(rename = "type")]
    type_tag: SchemaTypeTag,
    fields: Vec<StructField>,
}

impl TryFrom<SerdeSchema> for Schema {
    type Error = Error;

    fn try_from(value: SerdeSchema) -> Result<Self, Self::Error> {
        let SerdeSchema {
            schema_id, fields, ..
        } = value;
        Ok(Schema::new(StructType::try_new(fields)?).with_schema_id(schema_id))
    }
}

impl From<Schema> for SerdeSchema {
    fn from(value: Schema) -> Self {
        Self {
            schema_id: value.schema_id,
            type_tag: SchemaTypeTag::Struct,
            fields: SerdeStructType::from(value.fields).fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("boolean", PrimitiveType::Boolean)]
    #[case("int", PrimitiveType::Integer)]
    #[case("long", PrimitiveType::Long)]
    #[case("timestamptz", PrimitiveType::TimestampTz)]
    #[case("decimal(10,2)", PrimitiveType::Decimal { precision: 10, scale: 2 })]
    #[case(" decimal( 38 , 0 ) ", PrimitiveType::Decimal { precision: 38, scale: 0 })]
    #[case("fixed[16]", PrimitiveType::Fixed(16))]
    fn test_parse_primitive(#[case] input: &str, #[case] expected: PrimitiveType) {
        assert_eq!(input.parse::<PrimitiveType>().unwrap(), expected);
    }

    #[rstest]
    #[case("integer")]
    #[case("decimal(0,0)")]
    #[case("decimal(39,1)")]
    #[case("decimal(5,6)")]
    #[case("decimal(5)")]
    #[case("fixed[x]")]
    fn test_parse_invalid_primitive(#[case] input: &str) {
        assert!(matches!(
            input.parse::<PrimitiveType>(),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_struct_rejects_duplicate_names() {
        let result = StructType::try_new([
            StructField::nullable("a", DataType::INTEGER),
            StructField::nullable("a", DataType::STRING),
        ]);
        assert!(matches!(result, Err(Error::Schema(msg)) if msg.contains("'a'")));
    }

    #[test]
    fn test_field_lookup_preserves_order() {
        let s = StructType::try_new([
            StructField::nullable("b", DataType::INTEGER),
            StructField::nullable("a", DataType::STRING),
            StructField::nullable("C", DataType::LONG),
        ])
        .unwrap();
        let names: Vec<_> = s.field_names().collect();
        assert_eq!(names, ["b", "a", "C"]);
        assert_eq!(s.field("a").unwrap().data_type(), &DataType::STRING);
        assert!(s.field("c").is_none());
        assert_eq!(s.field_case_insensitive("c").unwrap().name(), "C");
    }

    #[test]
    fn test_case_insensitive_prefers_exact_match() {
        let s = StructType::new_unchecked([
            StructField::nullable("Id", DataType::INTEGER),
            StructField::nullable("id", DataType::LONG),
        ]);
        assert_eq!(
            s.field_case_insensitive("id").unwrap().data_type(),
            &DataType::LONG
        );
        assert_eq!(
            s.field_case_insensitive("ID").unwrap().data_type(),
            &DataType::INTEGER
        );
    }

    #[test]
    fn test_struct_equality_is_order_sensitive() {
        let a = StructField::nullable("a", DataType::INTEGER);
        let b = StructField::nullable("b", DataType::INTEGER);
        let ab = StructType::try_new([a.clone(), b.clone()]).unwrap();
        let ba = StructType::try_new([b.clone(), a.clone()]).unwrap();
        assert_ne!(ab, ba);
        assert_eq!(ab, StructType::try_new([a, b]).unwrap());
    }

    #[test]
    fn test_display() {
        let schema = Schema::new(
            StructType::try_new([
                StructField::not_null("id", DataType::LONG).with_id(1),
                StructField::nullable(
                    "tags",
                    ListType::new(DataType::STRING, true).with_element_id(3),
                )
                .with_id(2)
                .with_doc("free-form tags"),
                StructField::nullable(
                    "props",
                    MapType::new(DataType::STRING, DataType::INTEGER, false),
                ),
            ])
            .unwrap(),
        );
        assert_eq!(
            schema.to_string(),
            "table {\n  1: id: required long\n  2: tags: optional list<3: optional string> \
             (free-form tags)\n  props: optional map<string, int>\n}"
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(DataType::INTEGER.kind(), "primitive");
        assert_eq!(DataType::from(StructType::empty()).kind(), "struct");
        assert_eq!(
            DataType::from(ListType::new(DataType::LONG, false)).kind(),
            "list"
        );
        assert_eq!(
            DataType::from(MapType::new(DataType::LONG, DataType::LONG, false)).kind(),
            "map"
        );
    }

    #[test]
    fn test_schema_json() {
        let value = json!({
            "schema-id": 3,
            "type": "struct",
            "fields": [
                {"id": 1, "name": "id", "required": true, "type": "long"},
                {"id": 2, "name": "price", "required": false, "type": "decimal(9,2)", "doc": "in cents"},
                {"id": 3, "name": "tags", "required": false, "type": {
                    "type": "list", "element-id": 4, "element": "string", "element-required": false
                }},
                {"id": 5, "name": "props", "required": true, "type": {
                    "type": "map",
                    "key-id": 6, "key": "string",
                    "value-id": 7, "value": {
                        "type": "struct",
                        "fields": [{"id": 8, "name": "x", "required": true, "type": "int"}]
                    },
                    "value-required": true
                }}
            ]
        });
        let schema: Schema = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(schema.schema_id(), 3);
        assert_eq!(schema.highest_field_id().unwrap(), 8);

        let price = schema.field("price").unwrap();
        assert!(price.is_nullable());
        assert_eq!(price.doc(), Some("in cents"));

        let DataType::Map(props) = schema.field("props").unwrap().data_type() else {
            panic!("expected a map");
        };
        assert_eq!((props.key_id(), props.value_id()), (Some(6), Some(7)));
        assert!(!props.value_nullable());

        assert_eq!(serde_json::to_value(&schema).unwrap(), value);
    }

    #[test]
    fn test_schema_json_without_ids() {
        let schema = Schema::from_json(
            r#"{"type": "struct", "fields": [
                {"name": "a", "required": false, "type": {
                    "type": "list", "element": "int", "element-required": true
                }}
            ]}"#,
        )
        .unwrap();
        let field = schema.field("a").unwrap();
        assert_eq!(field.id(), None);
        let DataType::List(list) = field.data_type() else {
            panic!("expected a list");
        };
        assert_eq!(list.element_id(), None);
        assert!(!list.element_nullable());
        assert_eq!(
            schema.to_json().unwrap(),
            r#"{"schema-id":0,"type":"struct","fields":[{"name":"a","required":false,"type":{"type":"list","element":"int","element-required":true}}]}"#
        );
    }

    #[test]
    fn test_schema_json_rejects_duplicate_names() {
        let result = Schema::from_json(
            r#"{"type": "struct", "fields": [
                {"name": "a", "required": true, "type": "int"},
                {"name": "a", "required": true, "type": "long"}
            ]}"#,
        );
        assert!(matches!(result, Err(Error::MalformedJson(_))));
    }
}
