// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converter compiler.
//!
//! Resolves, once per record type, which rule handles every field in each
//! direction, producing a fixed pipeline of steps. Hooks are captured from a
//! snapshot of the registry taken at compile time.
//!
//! The compiled pipeline produces the same output and the same errors as the
//! generic engine run against that snapshot. Unstructure steps are keyed on
//! the declared type; when a runtime value does not have the declared shape
//! they hand over to the generic value-driven rules.

use std::fmt;
use std::sync::Arc;

use serde_json::Map;

use crate::engine::{self, check_arity, expect_array, expect_object, map_key_text, union_exhausted};
use crate::error::{ConvertError, Direction, Result};
use crate::hooks::{HookTable, StructureHook, UnstructureHook};
use crate::record::Record;
use crate::type_descriptor::{FieldDefault, RecordType, TypeDescriptor, TypeKind, TypeRef};
use crate::value::{map_insert, Loose, Value};

/// Sequence flavour produced by a structure step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceKind {
    List,
    Set,
    FrozenSet,
    VarTuple,
}

impl SequenceKind {
    fn build(self, items: Vec<Value>) -> Value {
        match self {
            Self::List => Value::List(items),
            Self::Set => Value::set_of(items),
            Self::FrozenSet => Value::frozen_set_of(items),
            Self::VarTuple => Value::Tuple(items),
        }
    }
}

/// Pre-resolved structuring rule for one declared type.
#[derive(Clone)]
enum StructureStep {
    Hook(StructureHook),
    Record(Arc<StructurePlan>),
    Optional(Box<StructureStep>),
    Sequence {
        type_name: String,
        kind: SequenceKind,
        element: Box<StructureStep>,
    },
    Tuple {
        type_name: String,
        elements: Vec<StructureStep>,
    },
    Map {
        type_name: String,
        key: Box<StructureStep>,
        value: Box<StructureStep>,
    },
    Union {
        desc: TypeRef,
        alternatives: Vec<StructureStep>,
    },
}

/// How a field obtains its value during structuring.
#[derive(Clone)]
enum FieldInput {
    /// Read from input; absent is an error.
    Required(StructureStep),
    /// Read from input; absent takes the default.
    Defaulted(StructureStep, FieldDefault),
    /// Never read; always the default.
    Derived(FieldDefault),
}

#[derive(Clone)]
struct StructureField {
    name: String,
    input: FieldInput,
}

struct StructurePlan {
    record_type: Arc<RecordType>,
    fields: Vec<StructureField>,
}

/// Pre-resolved unstructuring rule for one declared type.
#[derive(Clone)]
enum UnstructureStep {
    /// Applies when the value's runtime type name matches.
    Hook {
        type_name: String,
        hook: UnstructureHook,
    },
    Record(Arc<UnstructurePlan>),
    Optional(Box<UnstructureStep>),
    Sequence(Box<UnstructureStep>),
    Tuple(Vec<UnstructureStep>),
    Map {
        key: Box<UnstructureStep>,
        value: Box<UnstructureStep>,
    },
    /// Value-driven rules with the snapshot.
    Generic,
}

struct UnstructurePlan {
    record_type: Arc<RecordType>,
    fields: Vec<(String, UnstructureStep)>,
}

/// Compiled structure and unstructure pipelines for one record type.
///
/// Immutable once built. Holds the hook snapshot it was compiled against, so
/// hooks registered afterwards do not change its behaviour.
#[derive(Clone)]
pub struct CompiledConverter {
    structure: Arc<StructurePlan>,
    unstructure: Arc<UnstructurePlan>,
    hooks: Arc<HookTable>,
}

impl CompiledConverter {
    /// Compile both directions for `record_type` against `hooks`.
    ///
    /// Fails with [`ConvertError::UnsupportedType`] naming the first
    /// reachable type that has no rule in either direction.
    pub fn compile(record_type: &Arc<RecordType>, hooks: Arc<HookTable>) -> Result<Self> {
        let structure = compile_structure_plan(&hooks, record_type)?;
        let unstructure = compile_unstructure_plan(&hooks, record_type)?;
        log::debug!(
            "[compiler] compiled {} ({} fields)",
            record_type.name(),
            record_type.fields().len()
        );
        Ok(Self {
            structure,
            unstructure,
            hooks,
        })
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.structure.record_type
    }

    /// Hook snapshot captured at compile time.
    pub fn hooks(&self) -> &Arc<HookTable> {
        &self.hooks
    }

    /// Structure a record from a loose mapping.
    pub fn structure(&self, loose: &Loose) -> Result<Record> {
        self.structure.run(loose)
    }

    /// Unstructure a record into a loose mapping in declaration order.
    ///
    /// Records of another type go through the generic rules.
    pub fn unstructure(&self, record: &Record) -> Result<Loose> {
        if Arc::ptr_eq(record.record_type(), &self.unstructure.record_type) {
            self.unstructure.run(&self.hooks, record)
        } else {
            engine::unstructure_record(&self.hooks, record)
        }
    }
}

impl fmt::Debug for CompiledConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledConverter")
            .field("record_type", &self.record_type().name())
            .field("fields", &self.structure.fields.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

fn compile_structure_plan(
    hooks: &HookTable,
    record_type: &Arc<RecordType>,
) -> Result<Arc<StructurePlan>> {
    let mut fields = Vec::with_capacity(record_type.fields().len());
    for field in record_type.fields() {
        let input = if !field.init {
            FieldInput::Derived(field.default.clone())
        } else {
            let step = compile_structure(hooks, &field.type_desc)?;
            if field.default.is_required() {
                FieldInput::Required(step)
            } else {
                FieldInput::Defaulted(step, field.default.clone())
            }
        };
        fields.push(StructureField {
            name: field.name.clone(),
            input,
        });
    }
    Ok(Arc::new(StructurePlan {
        record_type: record_type.clone(),
        fields,
    }))
}

fn compile_structure(hooks: &HookTable, desc: &TypeRef) -> Result<StructureStep> {
    if let Some(hook) = hooks.structure_hook(desc.name()) {
        return Ok(StructureStep::Hook(hook.clone()));
    }

    let sequence = |kind: SequenceKind, element: &TypeRef| -> Result<StructureStep> {
        Ok(StructureStep::Sequence {
            type_name: desc.name().to_string(),
            kind,
            element: Box::new(compile_structure(hooks, element)?),
        })
    };

    match desc.kind() {
        TypeKind::Record(rt) => Ok(StructureStep::Record(compile_structure_plan(hooks, rt)?)),
        TypeKind::Optional(inner) => Ok(StructureStep::Optional(Box::new(compile_structure(
            hooks, inner,
        )?))),
        TypeKind::List(element) => sequence(SequenceKind::List, element),
        TypeKind::Set(element) => sequence(SequenceKind::Set, element),
        TypeKind::FrozenSet(element) => sequence(SequenceKind::FrozenSet, element),
        TypeKind::VarTuple(element) => sequence(SequenceKind::VarTuple, element),
        TypeKind::Tuple(elements) => Ok(StructureStep::Tuple {
            type_name: desc.name().to_string(),
            elements: elements
                .iter()
                .map(|e| compile_structure(hooks, e))
                .collect::<Result<_>>()?,
        }),
        TypeKind::Map(key, value) => Ok(StructureStep::Map {
            type_name: desc.name().to_string(),
            key: Box::new(compile_structure(hooks, key)?),
            value: Box::new(compile_structure(hooks, value)?),
        }),
        TypeKind::Union(alternatives) => Ok(StructureStep::Union {
            desc: desc.clone(),
            alternatives: alternatives
                .iter()
                .map(|a| compile_structure(hooks, a))
                .collect::<Result<_>>()?,
        }),
        _ => Err(ConvertError::unsupported(desc.name(), Direction::Structure)),
    }
}

fn compile_unstructure_plan(
    hooks: &HookTable,
    record_type: &Arc<RecordType>,
) -> Result<Arc<UnstructurePlan>> {
    let fields = record_type
        .fields()
        .iter()
        .map(|field| Ok((field.name.clone(), compile_unstructure(hooks, &field.type_desc)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Arc::new(UnstructurePlan {
        record_type: record_type.clone(),
        fields,
    }))
}

fn compile_unstructure(hooks: &HookTable, desc: &TypeDescriptor) -> Result<UnstructureStep> {
    if let Some(hook) = hooks.unstructure_hook(desc.name()) {
        return Ok(UnstructureStep::Hook {
            type_name: desc.name().to_string(),
            hook: hook.clone(),
        });
    }

    match desc.kind() {
        TypeKind::Record(rt) => Ok(UnstructureStep::Record(compile_unstructure_plan(hooks, rt)?)),
        TypeKind::Optional(inner) => Ok(UnstructureStep::Optional(Box::new(
            compile_unstructure(hooks, inner)?,
        ))),
        TypeKind::List(element)
        | TypeKind::Set(element)
        | TypeKind::FrozenSet(element)
        | TypeKind::VarTuple(element) => Ok(UnstructureStep::Sequence(Box::new(
            compile_unstructure(hooks, element)?,
        ))),
        TypeKind::Tuple(elements) => Ok(UnstructureStep::Tuple(
            elements
                .iter()
                .map(|e| compile_unstructure(hooks, e))
                .collect::<Result<_>>()?,
        )),
        TypeKind::Map(key, value) => Ok(UnstructureStep::Map {
            key: Box::new(compile_unstructure(hooks, key)?),
            value: Box::new(compile_unstructure(hooks, value)?),
        }),
        TypeKind::Union(alternatives) => {
            // Validated for reachability only; the value picks the rule.
            for alternative in alternatives {
                compile_unstructure(hooks, alternative)?;
            }
            Ok(UnstructureStep::Generic)
        }
        _ => Err(ConvertError::unsupported(desc.name(), Direction::Unstructure)),
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

impl StructurePlan {
    fn run(&self, loose: &Loose) -> Result<Record> {
        let object = expect_object(self.record_type.name(), loose)?;
        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = match &field.input {
                FieldInput::Required(step) => match object.get(&field.name) {
                    Some(raw) => step.run(raw).map_err(|e| e.in_field(&field.name))?,
                    None => {
                        return Err(ConvertError::MissingField {
                            field: field.name.clone(),
                        })
                    }
                },
                FieldInput::Defaulted(step, default) => match object.get(&field.name) {
                    Some(raw) => step.run(raw).map_err(|e| e.in_field(&field.name))?,
                    None => produce(&field.name, default)?,
                },
                FieldInput::Derived(default) => produce(&field.name, default)?,
            };
            values.push(value);
        }
        Record::new(self.record_type.clone(), values)
    }
}

fn produce(name: &str, default: &FieldDefault) -> Result<Value> {
    default.produce().ok_or_else(|| ConvertError::MissingField {
        field: name.to_string(),
    })
}

impl StructureStep {
    fn run(&self, loose: &Loose) -> Result<Value> {
        match self {
            Self::Hook(hook) => hook(loose),
            Self::Record(plan) => plan.run(loose).map(Value::Record),
            Self::Optional(inner) => {
                if loose.is_null() {
                    Ok(Value::None)
                } else {
                    inner.run(loose)
                }
            }
            Self::Sequence {
                type_name,
                kind,
                element,
            } => expect_array(type_name, loose)?
                .iter()
                .enumerate()
                .map(|(i, item)| element.run(item).map_err(|e| e.in_index(i)))
                .collect::<Result<Vec<_>>>()
                .map(|items| kind.build(items)),
            Self::Tuple {
                type_name,
                elements,
            } => {
                let items = expect_array(type_name, loose)?;
                check_arity(type_name, elements.len(), items.len())?;
                elements
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (step, item))| step.run(item).map_err(|e| e.in_index(i)))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Tuple)
            }
            Self::Map {
                type_name,
                key,
                value,
            } => {
                let object = expect_object(type_name, loose)?;
                let mut pairs = Vec::with_capacity(object.len());
                for (k, v) in object {
                    let typed_key = key
                        .run(&Loose::String(k.clone()))
                        .map_err(|e| e.in_field(k))?;
                    let typed_value = value.run(v).map_err(|e| e.in_field(k))?;
                    map_insert(&mut pairs, typed_key, typed_value);
                }
                Ok(Value::Map(pairs))
            }
            Self::Union { desc, alternatives } => alternatives
                .iter()
                .find_map(|step| step.run(loose).ok())
                .ok_or_else(|| union_exhausted(desc, loose)),
        }
    }
}

impl UnstructurePlan {
    fn run(&self, hooks: &HookTable, record: &Record) -> Result<Loose> {
        let mut object = Map::with_capacity(self.fields.len());
        for ((name, step), value) in self.fields.iter().zip(record.values()) {
            let loose = step.run(hooks, value).map_err(|e| e.in_field(name))?;
            object.insert(name.clone(), loose);
        }
        Ok(Loose::Object(object))
    }
}

impl UnstructureStep {
    fn run(&self, hooks: &HookTable, value: &Value) -> Result<Loose> {
        match (self, value) {
            (Self::Hook { type_name, hook }, v) if v.type_name() == type_name => hook(v),
            (Self::Record(plan), Value::Record(record))
                if Arc::ptr_eq(record.record_type(), &plan.record_type) =>
            {
                plan.run(hooks, record)
            }
            (Self::Optional(inner), v) if !v.is_none() => inner.run(hooks, v),
            (
                Self::Sequence(element),
                Value::List(items) | Value::Set(items) | Value::FrozenSet(items) | Value::Tuple(items),
            ) if !hooks.has_unstructure_hook(value.type_name()) => items
                .iter()
                .enumerate()
                .map(|(i, item)| element.run(hooks, item).map_err(|e| e.in_index(i)))
                .collect::<Result<Vec<_>>>()
                .map(Loose::Array),
            (Self::Tuple(elements), Value::Tuple(items))
                if elements.len() == items.len() && !hooks.has_unstructure_hook("tuple") =>
            {
                elements
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (step, item))| step.run(hooks, item).map_err(|e| e.in_index(i)))
                    .collect::<Result<Vec<_>>>()
                    .map(Loose::Array)
            }
            (Self::Map { key, value: step }, Value::Map(pairs))
                if !hooks.has_unstructure_hook("dict") =>
            {
                let mut object = Map::with_capacity(pairs.len());
                for (k, v) in pairs {
                    let text = map_key_text(key.run(hooks, k)?)?;
                    let loose = step.run(hooks, v).map_err(|e| e.in_field(&text))?;
                    object.insert(text, loose);
                }
                Ok(Loose::Object(object))
            }
            (_, v) => engine::unstructure(hooks, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RecordTypeBuilder;
    use crate::hooks::HookRegistry;
    use serde_json::json;

    fn inner() -> Arc<RecordType> {
        RecordTypeBuilder::new("Inner")
            .field("x", TypeDescriptor::int())
            .build()
            .expect("inner")
    }

    fn outer() -> Arc<RecordType> {
        RecordTypeBuilder::new("Outer")
            .field("items", TypeDescriptor::list(inner().descriptor()))
            .field_with_default(
                "label",
                TypeDescriptor::optional(TypeDescriptor::str()),
                Value::None,
            )
            .field(
                "pair",
                TypeDescriptor::tuple(vec![TypeDescriptor::int(), TypeDescriptor::date()])
                    .expect("tuple"),
            )
            .build()
            .expect("outer")
    }

    #[test]
    fn test_compiled_matches_generic() {
        let hooks = Arc::new(HookTable::with_defaults());
        let rt = outer();
        let converter = CompiledConverter::compile(&rt, hooks.clone()).expect("compile");
        let input = json!({
            "items": [{"x": 1}, {"x": "2"}],
            "pair": [7, "2024-01-02"],
        });

        let compiled = converter.structure(&input).expect("compiled");
        let generic = engine::structure_record(&hooks, &rt, &input).expect("generic");
        assert_eq!(compiled, generic);

        let out = converter.unstructure(&compiled).expect("unstructure");
        assert_eq!(out, engine::unstructure_record(&hooks, &generic).expect("generic out"));
        assert_eq!(
            out,
            json!({"items": [{"x": 1}, {"x": 2}], "label": null, "pair": [7, "2024-01-02"]})
        );
    }

    #[test]
    fn test_compiled_errors_match_generic() {
        let hooks = Arc::new(HookTable::with_defaults());
        let rt = outer();
        let converter = CompiledConverter::compile(&rt, hooks.clone()).expect("compile");
        for input in [
            json!({"items": [{"x": 1}, {}], "pair": [1, "2024-01-01"]}),
            json!({"items": [], "pair": [1]}),
            json!({"items": "nope", "pair": [1, "2024-01-01"]}),
            json!({"pair": [1, "2024-01-01"]}),
            json!(3),
        ] {
            let compiled = converter.structure(&input).unwrap_err();
            let generic = engine::structure_record(&hooks, &rt, &input).unwrap_err();
            assert_eq!(compiled, generic, "{input}");
        }
    }

    #[test]
    fn test_missing_hook_fails_at_compile() {
        let rt = RecordTypeBuilder::new("Person")
            .field(
                "nick",
                TypeDescriptor::optional(TypeDescriptor::named("CapitalStr").expect("named")),
            )
            .build()
            .expect("person");
        let registry = HookRegistry::new();
        let err = CompiledConverter::compile(&rt, registry.snapshot()).unwrap_err();
        assert_eq!(err.to_string(), "no structuring rule for type: CapitalStr");

        registry.register_structure_hook("CapitalStr", |v| {
            Ok(Value::custom("CapitalStr", Value::Any(v.clone())))
        });
        let err = CompiledConverter::compile(&rt, registry.snapshot()).unwrap_err();
        assert_eq!(err.to_string(), "no unstructuring rule for type: CapitalStr");
    }

    #[test]
    fn test_unexpected_runtime_shape_falls_back() {
        let hooks = Arc::new(HookTable::with_defaults());
        let rt = RecordTypeBuilder::new("Loose")
            .field("v", TypeDescriptor::int())
            .build()
            .expect("record");
        let converter = CompiledConverter::compile(&rt, hooks).expect("compile");
        let mut record = converter.structure(&json!({"v": 1})).expect("structure");
        record.set("v", "text").expect("set");
        assert_eq!(converter.unstructure(&record), Ok(json!({"v": "text"})));
    }

    #[test]
    fn test_hookless_custom_value_rejected_on_fallback() {
        let hooks = Arc::new(HookTable::with_defaults());
        let converter = CompiledConverter::compile(&inner(), hooks.clone()).expect("compile");
        let mut record = converter.structure(&json!({"x": 4})).expect("structure");
        record.set("x", Value::custom("Meters", 3.5)).expect("set");

        let compiled = converter.unstructure(&record).unwrap_err();
        assert_eq!(compiled.to_string(), "x: no unstructuring rule for type: Meters");
        assert_eq!(
            Err(compiled),
            engine::unstructure(&hooks, &Value::Record(record.clone()))
        );
    }
}
