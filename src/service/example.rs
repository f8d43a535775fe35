//! Query by example: partial records to predicates and columns, rows back to records.

use crate::error::StoreError;
use crate::model::{FieldValue, Resource, ResourceSchema};
use crate::sql::{Column, Constraint, Predicate};
use crate::store::Row;

/// One equality constraint per set field. An all-unset example matches everything.
pub fn build_predicate(schema: &ResourceSchema, values: Vec<Option<FieldValue>>) -> Predicate {
    let constraints = schema
        .fields
        .iter()
        .zip(values)
        .filter_map(|(f, v)| {
            v.map(|value| Constraint {
                column: f.name.clone(),
                value,
            })
        })
        .collect();
    Predicate { constraints }
}

/// Every column for INSERT; unset fields carry the store's NULL.
pub fn record_to_columns(schema: &ResourceSchema, values: Vec<Option<FieldValue>>) -> Vec<Column> {
    schema
        .fields
        .iter()
        .zip(values)
        .map(|(f, value)| Column {
            name: f.name.clone(),
            kind: f.kind,
            value,
        })
        .collect()
}

/// Only the set fields, for UPDATE ... SET. Unset fields leave the stored column alone.
pub fn patch_columns(schema: &ResourceSchema, values: Vec<Option<FieldValue>>) -> Vec<Column> {
    record_to_columns(schema, values)
        .into_iter()
        .filter(|c| c.value.is_some())
        .collect()
}

/// A store NULL becomes an unset field, never a zero value.
pub fn row_to_record<R: Resource>(row: Row) -> Result<R, StoreError> {
    R::from_values(row)
}
