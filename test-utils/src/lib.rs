//! A number of utilities useful for testing that we want to use in multiple crates

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use schema_kernel::schema::{
    index_by_id, DataType, FieldId, ListType, MapType, Schema, StructField, StructType,
};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;

/// A schema exercising every kind of nesting, with no field ids assigned:
///
/// ```text
/// table {
///   id: required long
///   data: optional string
///   location: optional list<struct<lat: required double, long: required double>>
///   properties: optional map<string, string>
///   person: optional struct<name: optional string, age: optional int>
/// }
/// ```
pub fn nested_schema() -> Schema {
    let fields = [
        StructField::not_null("id", DataType::LONG),
        StructField::nullable("data", DataType::STRING),
        StructField::nullable(
            "location",
            ListType::new(
                StructType::new_unchecked([
                    StructField::not_null("lat", DataType::DOUBLE),
                    StructField::not_null("long", DataType::DOUBLE),
                ]),
                true,
            ),
        ),
        StructField::nullable(
            "properties",
            MapType::new(DataType::STRING, DataType::STRING, true),
        ),
        StructField::nullable(
            "person",
            StructType::new_unchecked([
                StructField::nullable("name", DataType::STRING),
                StructField::nullable("age", DataType::INTEGER),
            ]),
        ),
    ];
    Schema::new(StructType::new_unchecked(fields))
}

/// [`nested_schema`] with ids 1 through 12 assigned in the order a fresh assignment would use.
pub fn identified_nested_schema() -> Schema {
    let fields = [
        StructField::not_null("id", DataType::LONG).with_id(1),
        StructField::nullable("data", DataType::STRING).with_id(2),
        StructField::nullable(
            "location",
            ListType::new(
                StructType::new_unchecked([
                    StructField::not_null("lat", DataType::DOUBLE).with_id(5),
                    StructField::not_null("long", DataType::DOUBLE).with_id(6),
                ]),
                true,
            )
            .with_element_id(4),
        )
        .with_id(3),
        StructField::nullable(
            "properties",
            MapType::new(DataType::STRING, DataType::STRING, true)
                .with_key_id(8)
                .with_value_id(9),
        )
        .with_id(7),
        StructField::nullable(
            "person",
            StructType::new_unchecked([
                StructField::nullable("name", DataType::STRING).with_id(11),
                StructField::nullable("age", DataType::INTEGER).with_id(12),
            ]),
        )
        .with_id(10),
    ];
    Schema::new(StructType::new_unchecked(fields))
}

/// Every field id of `schema` keyed by its dotted path (e.g. `location.element.lat`).
///
/// Panics if the schema is missing an id or uses one twice.
pub fn collect_field_ids(schema: &Schema) -> BTreeMap<String, FieldId> {
    index_by_id(schema.as_struct())
        .unwrap_or_else(|err| panic!("schema is not fully identified: {err}"))
        .into_iter()
        .map(|(id, path)| (path.to_string(), id))
        .collect()
}

pub fn assert_result_error_with_message<T, E: ToString>(res: Result<T, E>, message: &str) {
    match res {
        Ok(_) => panic!("Expected error, but got Ok result"),
        Err(error) => {
            let error_str = error.to_string();
            assert!(
                error_str.contains(message),
                "Error message does not contain the expected message.\nExpected message:\t{message}\nActual message:\t\t{error_str}"
            );
        }
    }
}

#[derive(Clone)]
pub struct LogWriter(pub Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

// Test helper that sets up tracing to capture log output
// The guard keeps the tracing subscriber active for the lifetime of the struct
pub struct LoggingTest {
    logs: Arc<Mutex<Vec<u8>>>,
    _guard: DefaultGuard,
}

impl Default for LoggingTest {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingTest {
    pub fn new() -> Self {
        let logs = Arc::new(Mutex::new(Vec::new()));
        let logs_clone = logs.clone();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(
                tracing_subscriber::fmt::layer()
                    .with_writer(move || LogWriter(logs_clone.clone()))
                    .with_ansi(false),
            ),
        );
        Self { logs, _guard }
    }

    pub fn logs(&self) -> String {
        String::from_utf8(self.logs.lock().unwrap().clone()).unwrap()
    }
}
