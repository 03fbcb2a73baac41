// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record instances.

use std::fmt;
use std::sync::Arc;

use crate::error::{ConvertError, Result};
use crate::type_descriptor::RecordType;
use crate::value::{FromValue, Value};

/// An instance of a [`RecordType`]: one value per field, in declaration order.
#[derive(Debug, Clone)]
pub struct Record {
    record_type: Arc<RecordType>,
    values: Vec<Value>,
    frozen: bool,
}

impl Record {
    /// Create a record from field values in declaration order.
    pub fn new(record_type: Arc<RecordType>, values: Vec<Value>) -> Result<Self> {
        let expected = record_type.fields().len();
        if values.len() != expected {
            return Err(ConvertError::ArityMismatch {
                type_name: record_type.name().to_string(),
                expected,
                got: values.len(),
            });
        }
        Ok(Self {
            record_type,
            values,
            frozen: false,
        })
    }

    pub(crate) fn freeze(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    /// Get the record type.
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn type_name(&self) -> &str {
        self.record_type.name()
    }

    /// Whether field assignment is rejected.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Get a field value by name.
    pub fn value(&self, name: &str) -> Result<&Value> {
        let index = self.index_of(name)?;
        Ok(&self.values[index])
    }

    /// Get a field as a Rust type.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        T::from_value(self.value(name)?).map_err(|e| e.in_field(name))
    }

    /// Set a field value by name.
    ///
    /// The value is stored as given; it is not checked against the field type.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let index = self.index_of(name)?;
        if self.frozen {
            return Err(ConvertError::FrozenInstance(name.to_string()));
        }
        self.values[index] = value.into();
        Ok(())
    }

    /// Iterate `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record_type
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    /// Field values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.record_type
            .field_index(name)
            .ok_or_else(|| ConvertError::FieldNotFound(format!("{}.{name}", self.type_name())))
    }
}

/// Equal when the type names and every field value match. Frozenness is ignored.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.record_type.name() == other.record_type.name() && self.values == other.values
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name())?;
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value:?}")?;
        }
        write!(f, ")")
    }
}
