// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registered record types.
//!
//! A [`Model`] pairs a record type with the converter compiled for it at
//! registration. Hooks registered after that point are not seen by the model;
//! register hooks first, then models.

use std::collections::HashMap;
use std::sync::Arc;

use crate::compiler::CompiledConverter;
use crate::error::{ConvertError, Result};
use crate::hooks::HookRegistry;
use crate::options::{apply_extensions, ModelOptions};
use crate::record::Record;
use crate::type_descriptor::{RecordType, TypeRef};
use crate::value::{Loose, Value};

/// A record type registered for conversion.
#[derive(Debug)]
pub struct Model {
    record_type: Arc<RecordType>,
    converter: CompiledConverter,
    options: ModelOptions,
}

impl Model {
    /// Register against the global hook registry with default options.
    pub fn register(record_type: Arc<RecordType>) -> Result<Arc<Self>> {
        Self::register_with(record_type, HookRegistry::global(), ModelOptions::default())
    }

    /// Register against `registry`, applying installed options extensions.
    ///
    /// Compiles the converter from the registry's current hooks. Fails if a
    /// type reachable from any field has no rule.
    pub fn register_with(
        record_type: Arc<RecordType>,
        registry: &HookRegistry,
        options: ModelOptions,
    ) -> Result<Arc<Self>> {
        let options = apply_extensions(options);
        let converter = CompiledConverter::compile(&record_type, registry.snapshot())?;
        log::debug!(
            "[model] registered {} (frozen={})",
            record_type.name(),
            options.is_frozen()
        );
        Ok(Arc::new(Self {
            record_type,
            converter,
            options,
        }))
    }

    pub fn name(&self) -> &str {
        self.record_type.name()
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Descriptor for using this record as a field type.
    pub fn descriptor(&self) -> TypeRef {
        self.record_type.descriptor()
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn converter(&self) -> &CompiledConverter {
        &self.converter
    }

    /// Construct an instance from field values.
    ///
    /// Unset fields take their defaults. Values are stored as given. Naming
    /// an unknown or non-init field is an error.
    pub fn instance<'a>(&self, fields: impl IntoIterator<Item = (&'a str, Value)>) -> Result<Record> {
        let mut given: HashMap<&str, Value> = HashMap::new();
        for (name, value) in fields {
            match self.record_type.field(name) {
                Some(field) if field.init => {
                    given.insert(name, value);
                }
                _ => {
                    return Err(ConvertError::FieldNotFound(format!("{}.{name}", self.name())));
                }
            }
        }

        let values = self
            .record_type
            .fields()
            .iter()
            .map(|field| match given.remove(field.name.as_str()) {
                Some(value) => Ok(value),
                None => field
                    .default
                    .produce()
                    .ok_or_else(|| ConvertError::MissingField {
                        field: field.name.clone(),
                    }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.finish(Record::new(self.record_type.clone(), values)?))
    }

    /// Convert an instance to a loose mapping in field declaration order.
    pub fn to_loose_value(&self, record: &Record) -> Result<Loose> {
        self.converter.unstructure(record)
    }

    /// Build an instance from a loose mapping.
    pub fn from_loose_value(&self, loose: &Loose) -> Result<Record> {
        self.converter.structure(loose).map(|r| self.finish(r))
    }

    /// Encode an instance as text with the model's codec.
    pub fn to_text(&self, record: &Record) -> Result<String> {
        self.options.codec.encode(&self.to_loose_value(record)?)
    }

    /// Decode text with the model's codec and build an instance.
    pub fn from_text(&self, text: &str) -> Result<Record> {
        self.from_loose_value(&self.options.codec.decode(text)?)
    }

    fn finish(&self, record: Record) -> Record {
        record.freeze(self.options.is_frozen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RecordTypeBuilder;
    use crate::type_descriptor::TypeDescriptor;
    use serde_json::json;

    fn model(options: ModelOptions) -> Arc<Model> {
        let rt = RecordTypeBuilder::new("Account")
            .field("owner", TypeDescriptor::str())
            .field_with_factory("tags", TypeDescriptor::list(TypeDescriptor::str()), || {
                Value::List(Vec::new())
            })
            .derived_field("version", TypeDescriptor::int(), 1i64)
            .build()
            .expect("record");
        Model::register_with(rt, &HookRegistry::new(), options).expect("register")
    }

    #[test]
    fn test_instance() {
        let model = model(ModelOptions::default());
        let record = model.instance([("owner", Value::from("ann"))]).expect("instance");
        assert_eq!(record.get::<String>("owner").expect("owner"), "ann");
        assert_eq!(record.value("tags").expect("tags"), &Value::List(vec![]));
        assert_eq!(record.get::<i64>("version").expect("version"), 1);

        assert!(matches!(
            model.instance(Vec::<(&str, Value)>::new()),
            Err(ConvertError::MissingField { .. })
        ));
        assert!(matches!(
            model.instance([("owner", Value::from("a")), ("version", Value::Int(2))]),
            Err(ConvertError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_text_round_trip() {
        let model = model(ModelOptions::default());
        let record = model
            .instance([
                ("owner", Value::from("ann")),
                ("tags", Value::List(vec!["a".into(), "b".into()])),
            ])
            .expect("instance");
        let text = model.to_text(&record).expect("to_text");
        assert_eq!(text, r#"{"owner":"ann","tags":["a","b"],"version":1}"#);
        assert_eq!(model.from_text(&text).expect("from_text"), record);
        assert!(matches!(model.from_text("[1"), Err(ConvertError::Codec(_))));
    }

    #[test]
    fn test_frozen_option() {
        let model = model(ModelOptions::new().frozen(true));
        let mut record = model
            .from_loose_value(&json!({"owner": "bob"}))
            .expect("structure");
        assert!(record.is_frozen());
        assert!(matches!(
            record.set("owner", "eve"),
            Err(ConvertError::FrozenInstance(_))
        ));
    }
}
