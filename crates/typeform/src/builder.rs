// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for record types.

use std::sync::Arc;

use crate::error::Result;
use crate::type_descriptor::{FieldDescriptor, RecordType, TypeRef};
use crate::value::Value;

/// Builder for creating [`RecordType`] instances.
///
/// ```
/// use typeform::{RecordTypeBuilder, TypeDescriptor};
///
/// let point = RecordTypeBuilder::new("Point")
///     .field("x", TypeDescriptor::int())
///     .field_with_default("y", TypeDescriptor::int(), 0i64)
///     .build()
///     .unwrap();
/// assert_eq!(point.fields().len(), 2);
/// ```
#[derive(Debug)]
pub struct RecordTypeBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordTypeBuilder {
    /// Create a new builder for a record type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a required field.
    pub fn field(mut self, name: impl Into<String>, type_desc: TypeRef) -> Self {
        self.fields.push(FieldDescriptor::new(name, type_desc));
        self
    }

    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        type_desc: TypeRef,
        default: impl Into<Value>,
    ) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, type_desc).with_default(default));
        self
    }

    /// Add a field whose default is produced fresh for every instance.
    pub fn field_with_factory<F>(mut self, name: impl Into<String>, type_desc: TypeRef, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.fields
            .push(FieldDescriptor::new(name, type_desc).with_factory(factory));
        self
    }

    /// Add a field excluded from construction input; it always takes `default`.
    pub fn derived_field(
        mut self,
        name: impl Into<String>,
        type_desc: TypeRef,
        default: impl Into<Value>,
    ) -> Self {
        self.fields.push(
            FieldDescriptor::new(name, type_desc)
                .with_default(default)
                .derived(),
        );
        self
    }

    /// Add a prepared field descriptor.
    pub fn add_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Build the record type.
    pub fn build(self) -> Result<Arc<RecordType>> {
        RecordType::new(self.name, self.fields)
    }
}
