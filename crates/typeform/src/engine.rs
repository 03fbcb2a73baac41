// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic recursive conversion.
//!
//! Structuring is driven by the declared [`TypeDescriptor`]; unstructuring is
//! driven by the runtime shape of the [`Value`]. Both consult the hook table
//! first, by canonical type name.

use std::sync::Arc;

use serde_json::Map;

use crate::error::{describe, ConvertError, Direction, Result};
use crate::hooks::HookTable;
use crate::record::Record;
use crate::type_descriptor::{FieldDescriptor, RecordType, TypeDescriptor, TypeKind, TypeRef};
use crate::value::{map_insert, Loose, Value};

/// Structure `loose` as the type described by `desc`.
pub fn structure(hooks: &HookTable, desc: &TypeDescriptor, loose: &Loose) -> Result<Value> {
    if let Some(hook) = hooks.structure_hook(desc.name()) {
        return hook(loose);
    }

    match desc.kind() {
        TypeKind::Record(rt) => structure_record(hooks, rt, loose).map(Value::Record),
        TypeKind::List(element) => structure_elements(hooks, desc, element, loose).map(Value::List),
        TypeKind::Set(element) => {
            structure_elements(hooks, desc, element, loose).map(Value::set_of)
        }
        TypeKind::FrozenSet(element) => {
            structure_elements(hooks, desc, element, loose).map(Value::frozen_set_of)
        }
        TypeKind::VarTuple(element) => {
            structure_elements(hooks, desc, element, loose).map(Value::Tuple)
        }
        TypeKind::Tuple(elements) => {
            let items = expect_array(desc.name(), loose)?;
            check_arity(desc.name(), elements.len(), items.len())?;
            elements
                .iter()
                .zip(items)
                .enumerate()
                .map(|(i, (element, item))| {
                    structure(hooks, element, item).map_err(|e| e.in_index(i))
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Tuple)
        }
        TypeKind::Map(key, value) => {
            let object = expect_object(desc.name(), loose)?;
            let mut pairs = Vec::with_capacity(object.len());
            for (k, v) in object {
                let typed_key = structure(hooks, key, &Loose::String(k.clone()))
                    .map_err(|e| e.in_field(k))?;
                let typed_value = structure(hooks, value, v).map_err(|e| e.in_field(k))?;
                map_insert(&mut pairs, typed_key, typed_value);
            }
            Ok(Value::Map(pairs))
        }
        TypeKind::Optional(inner) => {
            if loose.is_null() {
                Ok(Value::None)
            } else {
                structure(hooks, inner, loose)
            }
        }
        TypeKind::Union(alternatives) => {
            for alternative in alternatives {
                match structure(hooks, alternative, loose) {
                    Ok(value) => return Ok(value),
                    Err(e) => log::trace!(
                        "[engine] {} alternative {} rejected: {}",
                        desc.name(),
                        alternative.name(),
                        e
                    ),
                }
            }
            Err(union_exhausted(desc, loose))
        }
        _ => Err(ConvertError::unsupported(desc.name(), Direction::Structure)),
    }
}

/// Structure a record from a mapping, without looking up a hook under the
/// record's own name.
///
/// Init fields are read from the key of the same name, falling back to the
/// field default. Non-init fields always take their default. Unknown keys are
/// ignored.
pub fn structure_record(hooks: &HookTable, rt: &Arc<RecordType>, loose: &Loose) -> Result<Record> {
    let object = expect_object(rt.name(), loose)?;
    let mut values = Vec::with_capacity(rt.fields().len());
    for field in rt.fields() {
        let value = match object.get(&field.name) {
            Some(raw) if field.init => {
                structure(hooks, &field.type_desc, raw).map_err(|e| e.in_field(&field.name))?
            }
            _ => field_default(field)?,
        };
        values.push(value);
    }
    Record::new(rt.clone(), values)
}

fn structure_elements(
    hooks: &HookTable,
    desc: &TypeDescriptor,
    element: &TypeRef,
    loose: &Loose,
) -> Result<Vec<Value>> {
    expect_array(desc.name(), loose)?
        .iter()
        .enumerate()
        .map(|(i, item)| structure(hooks, element, item).map_err(|e| e.in_index(i)))
        .collect()
}

/// Unstructure `value` by its runtime type.
pub fn unstructure(hooks: &HookTable, value: &Value) -> Result<Loose> {
    if let Some(hook) = hooks.unstructure_hook(value.type_name()) {
        return hook(value);
    }

    match value {
        Value::Record(record) => unstructure_record(hooks, record),
        Value::List(items) | Value::Set(items) | Value::FrozenSet(items) | Value::Tuple(items) => {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| unstructure(hooks, item).map_err(|e| e.in_index(i)))
                .collect::<Result<Vec<_>>>()
                .map(Loose::Array)
        }
        Value::Map(pairs) => {
            let mut object = Map::with_capacity(pairs.len());
            for (k, v) in pairs {
                let key = map_key_text(unstructure(hooks, k)?)?;
                let loose = unstructure(hooks, v).map_err(|e| e.in_field(&key))?;
                object.insert(key, loose);
            }
            Ok(Loose::Object(object))
        }
        other => Err(ConvertError::unsupported(
            other.type_name(),
            Direction::Unstructure,
        )),
    }
}

/// Unstructure a record into a mapping in field declaration order.
pub fn unstructure_record(hooks: &HookTable, record: &Record) -> Result<Loose> {
    let mut object = Map::with_capacity(record.values().len());
    for (name, value) in record.fields() {
        let loose = unstructure(hooks, value).map_err(|e| e.in_field(name))?;
        object.insert(name.to_string(), loose);
    }
    Ok(Loose::Object(object))
}

// ---------------------------------------------------------------------------
// Shared with the compiled pipeline
// ---------------------------------------------------------------------------

pub(crate) fn expect_array<'a>(target: &str, loose: &'a Loose) -> Result<&'a Vec<Loose>> {
    loose
        .as_array()
        .ok_or_else(|| ConvertError::conversion(target, loose, "expected a sequence"))
}

pub(crate) fn expect_object<'a>(target: &str, loose: &'a Loose) -> Result<&'a Map<String, Loose>> {
    loose
        .as_object()
        .ok_or_else(|| ConvertError::conversion(target, loose, "expected a mapping"))
}

pub(crate) fn check_arity(type_name: &str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(ConvertError::ArityMismatch {
            type_name: type_name.to_string(),
            expected,
            got,
        })
    }
}

pub(crate) fn union_exhausted(desc: &TypeDescriptor, loose: &Loose) -> ConvertError {
    ConvertError::UnionExhausted {
        type_name: desc.name().to_string(),
        value: describe(loose),
    }
}

pub(crate) fn field_default(field: &FieldDescriptor) -> Result<Value> {
    field.default.produce().ok_or_else(|| ConvertError::MissingField {
        field: field.name.clone(),
    })
}

/// Mapping keys become text; numbers, booleans and null are rendered.
pub(crate) fn map_key_text(key: Loose) -> Result<String> {
    match key {
        Loose::String(s) => Ok(s),
        Loose::Number(n) => Ok(n.to_string()),
        Loose::Bool(b) => Ok(b.to_string()),
        Loose::Null => Ok("null".to_string()),
        other => Err(ConvertError::conversion(
            "str",
            &other,
            "mapping keys must be scalar",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RecordTypeBuilder;
    use serde_json::json;

    fn table() -> HookTable {
        HookTable::with_defaults()
    }

    #[test]
    fn test_optional_and_union() {
        let hooks = table();
        let opt = TypeDescriptor::optional(TypeDescriptor::int());
        assert_eq!(structure(&hooks, &opt, &json!(null)), Ok(Value::None));
        assert_eq!(structure(&hooks, &opt, &json!(5)), Ok(Value::Int(5)));

        let union = TypeDescriptor::union(vec![TypeDescriptor::int(), TypeDescriptor::str()])
            .expect("union");
        assert_eq!(structure(&hooks, &union, &json!("5")), Ok(Value::Int(5)));
        assert_eq!(structure(&hooks, &union, &json!("x")), Ok(Value::from("x")));

        let strict = TypeDescriptor::union(vec![TypeDescriptor::int(), TypeDescriptor::date()])
            .expect("union");
        let err = structure(&hooks, &strict, &json!("x")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not structure type: Union[int, date] from value: x"
        );
    }

    #[test]
    fn test_tuple_arity() {
        let hooks = table();
        let desc = TypeDescriptor::tuple(vec![
            TypeDescriptor::int(),
            TypeDescriptor::str(),
            TypeDescriptor::str(),
        ])
        .expect("tuple");
        let err = structure(&hooks, &desc, &json!([1, 2])).unwrap_err();
        assert_eq!(
            err,
            ConvertError::ArityMismatch {
                type_name: "Tuple[int, str, str]".into(),
                expected: 3,
                got: 2,
            }
        );
        assert_eq!(
            structure(&hooks, &desc, &json!([1, 2, "3"])),
            Ok(Value::Tuple(vec![Value::Int(1), Value::from("2"), Value::from("3")]))
        );
    }

    #[test]
    fn test_map_keys_structured() {
        let hooks = table();
        let desc = TypeDescriptor::map(TypeDescriptor::int(), TypeDescriptor::str());
        let value = structure(&hooks, &desc, &json!({"1": "a", "01": "b"})).expect("map");
        // "1" and "01" collide as integers: last wins.
        assert_eq!(value, Value::map_of(vec![(Value::Int(1), Value::from("b"))]));
        assert_eq!(unstructure(&hooks, &value), Ok(json!({"1": "b"})));
    }

    #[test]
    fn test_record_defaults_and_unknown_keys() {
        let hooks = table();
        let rt = RecordTypeBuilder::new("Item")
            .field("name", TypeDescriptor::str())
            .field_with_default("count", TypeDescriptor::int(), 1i64)
            .derived_field("kind", TypeDescriptor::str(), "item")
            .build()
            .expect("record");

        let record =
            structure_record(&hooks, &rt, &json!({"name": "a", "kind": "other", "zzz": 1}))
                .expect("structure");
        assert_eq!(record.get::<i64>("count").expect("count"), 1);
        assert_eq!(record.get::<String>("kind").expect("kind"), "item");

        let err = structure_record(&hooks, &rt, &json!({"count": 2})).unwrap_err();
        assert_eq!(err, ConvertError::MissingField { field: "name".into() });

        let err = structure_record(&hooks, &rt, &json!([1])).unwrap_err();
        assert!(matches!(err, ConvertError::ConversionFailure { .. }));

        assert_eq!(
            unstructure_record(&hooks, &record),
            Ok(json!({"name": "a", "count": 1, "kind": "item"}))
        );
    }

    #[test]
    fn test_error_path() {
        let hooks = table();
        let desc = TypeDescriptor::map(
            TypeDescriptor::str(),
            TypeDescriptor::list(TypeDescriptor::int()),
        );
        let err = structure(&hooks, &desc, &json!({"xs": [1, 2, "c"]})).unwrap_err();
        assert_eq!(err.path(), Some("xs[2]"));
    }

    #[test]
    fn test_plain_containers_idempotent() {
        let hooks = table();
        let value = Value::List(vec![
            Value::Int(1),
            Value::from("a"),
            Value::map_of(vec![(Value::from("k"), Value::Bool(true))]),
            Value::None,
        ]);
        assert_eq!(unstructure(&hooks, &value), Ok(json!([1, "a", {"k": true}, null])));
    }

    #[test]
    fn test_map_key_rendering() {
        let hooks = table();
        let value = Value::map_of(vec![
            (Value::Int(1), Value::Int(2)),
            (Value::Bool(true), Value::Int(3)),
        ]);
        assert_eq!(unstructure(&hooks, &value), Ok(json!({"1": 2, "true": 3})));

        let bad = Value::map_of(vec![(Value::List(vec![]), Value::Int(1))]);
        assert!(unstructure(&hooks, &bad).is_err());
    }

    #[test]
    fn test_custom_without_hook_is_unsupported() {
        let hooks = table();
        let value = Value::custom("Meters", 3.5);
        let err = unstructure(&hooks, &value).unwrap_err();
        assert_eq!(
            err,
            ConvertError::UnsupportedType {
                type_name: "Meters".into(),
                direction: Direction::Unstructure,
            }
        );
        assert_eq!(err.to_string(), "no unstructuring rule for type: Meters");

        // Nested values report the path.
        let list = Value::List(vec![Value::Int(1), value]);
        let err = unstructure(&hooks, &list).unwrap_err();
        assert_eq!(err.to_string(), "[1]: no unstructuring rule for type: Meters");

        let named = TypeDescriptor::named("Meters").expect("named");
        let err = structure(&hooks, &named, &json!(3.5)).unwrap_err();
        assert_eq!(err.to_string(), "no structuring rule for type: Meters");
    }
}
