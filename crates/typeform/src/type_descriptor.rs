// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for declared field types.
//!
//! A [`TypeDescriptor`] is an immutable tree identified by its canonical name
//! (`List[str]`, `Optional[int]`, `Dict[str, Simple]`). The name is computed
//! once, from structure only, when the descriptor is constructed. Hook lookup
//! and compiled pipelines key off that string, so two descriptors with equal
//! names compare equal.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{ConvertError, Direction, Result};
use crate::value::Value;

/// Shared handle to a descriptor.
pub type TypeRef = Arc<TypeDescriptor>;

/// Scalar kinds with built-in hook names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Str,
    Int,
    Float,
    Bool,
    Complex,
    /// The null type; only ever holds `Value::None`.
    NoneType,
    /// Untyped value, passed through unchanged.
    Any,
}

impl PrimitiveKind {
    /// Canonical type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Complex => "complex",
            Self::NoneType => "None",
            Self::Any => "Any",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "str" => Some(Self::Str),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "complex" => Some(Self::Complex),
            "None" => Some(Self::NoneType),
            "Any" => Some(Self::Any),
            _ => None,
        }
    }
}

/// Type kind enumeration.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// Byte string.
    Bytes,
    /// Calendar date.
    Date,
    /// Date and time, naive or with a fixed offset.
    DateTime,
    /// User-defined type with no built-in rule; needs registered hooks.
    Named(String),
    /// Value or the absent marker.
    Optional(TypeRef),
    List(TypeRef),
    Set(TypeRef),
    FrozenSet(TypeRef),
    /// Mapping with key and value types.
    Map(TypeRef, TypeRef),
    /// Fixed-length tuple, one type per position.
    Tuple(Vec<TypeRef>),
    /// Variable-length tuple of one element type.
    VarTuple(TypeRef),
    /// Alternatives tried left to right.
    Union(Vec<TypeRef>),
    /// Nested record.
    Record(Arc<RecordType>),
}

/// A complete type descriptor.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
}

impl TypeDescriptor {
    fn new(kind: TypeKind) -> TypeRef {
        let name = canonical_name(&kind);
        Arc::new(Self { name, kind })
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn primitive(kind: PrimitiveKind) -> TypeRef {
        Self::new(TypeKind::Primitive(kind))
    }

    pub fn str() -> TypeRef {
        Self::primitive(PrimitiveKind::Str)
    }

    pub fn int() -> TypeRef {
        Self::primitive(PrimitiveKind::Int)
    }

    pub fn float() -> TypeRef {
        Self::primitive(PrimitiveKind::Float)
    }

    pub fn bool() -> TypeRef {
        Self::primitive(PrimitiveKind::Bool)
    }

    pub fn complex() -> TypeRef {
        Self::primitive(PrimitiveKind::Complex)
    }

    pub fn none() -> TypeRef {
        Self::primitive(PrimitiveKind::NoneType)
    }

    pub fn any() -> TypeRef {
        Self::primitive(PrimitiveKind::Any)
    }

    pub fn bytes() -> TypeRef {
        Self::new(TypeKind::Bytes)
    }

    pub fn date() -> TypeRef {
        Self::new(TypeKind::Date)
    }

    pub fn datetime() -> TypeRef {
        Self::new(TypeKind::DateTime)
    }

    /// User-defined named type.
    ///
    /// Built-in names resolve to their built-in descriptor. Names must be
    /// non-empty identifiers (letters, digits, `_`, `.`, `:`).
    pub fn named(name: &str) -> Result<TypeRef> {
        if let Some(kind) = PrimitiveKind::from_name(name) {
            return Ok(Self::primitive(kind));
        }
        match name {
            "bytes" => return Ok(Self::bytes()),
            "date" => return Ok(Self::date()),
            "datetime" => return Ok(Self::datetime()),
            _ => {}
        }
        if !is_identifier(name) {
            return Err(ConvertError::unsupported(
                format!("{name:?} (invalid type name)"),
                Direction::Structure,
            ));
        }
        Ok(Self::new(TypeKind::Named(name.to_string())))
    }

    /// Optional type. `Optional[Optional[T]]` collapses to `Optional[T]`.
    ///
    /// An optional union is the union with `None` appended, so it shares the
    /// name `union` gives for the same alternatives.
    pub fn optional(inner: TypeRef) -> TypeRef {
        match &inner.kind {
            TypeKind::Optional(_) | TypeKind::Primitive(PrimitiveKind::NoneType) => inner,
            TypeKind::Union(alternatives) => {
                if alternatives.iter().any(|t| t.is_none_type()) {
                    return inner;
                }
                let mut alternatives = alternatives.clone();
                alternatives.push(Self::none());
                Self::new(TypeKind::Union(alternatives))
            }
            _ => Self::new(TypeKind::Optional(inner)),
        }
    }

    pub fn list(element: TypeRef) -> TypeRef {
        Self::new(TypeKind::List(element))
    }

    pub fn set(element: TypeRef) -> TypeRef {
        Self::new(TypeKind::Set(element))
    }

    pub fn frozen_set(element: TypeRef) -> TypeRef {
        Self::new(TypeKind::FrozenSet(element))
    }

    pub fn map(key: TypeRef, value: TypeRef) -> TypeRef {
        Self::new(TypeKind::Map(key, value))
    }

    /// Fixed-length tuple. Fails on an empty element list.
    pub fn tuple(elements: Vec<TypeRef>) -> Result<TypeRef> {
        if elements.is_empty() {
            return Err(ConvertError::unsupported("Tuple[]", Direction::Structure));
        }
        Ok(Self::new(TypeKind::Tuple(elements)))
    }

    /// Variable-length tuple (`Tuple[T, ...]`).
    pub fn var_tuple(element: TypeRef) -> TypeRef {
        Self::new(TypeKind::VarTuple(element))
    }

    /// Union of alternatives.
    ///
    /// Nested unions are flattened and duplicates dropped. A single
    /// alternative is returned as is, and `[T, None]` becomes `Optional[T]`.
    pub fn union(alternatives: Vec<TypeRef>) -> Result<TypeRef> {
        let mut flat: Vec<TypeRef> = Vec::with_capacity(alternatives.len());
        for alt in alternatives {
            let parts = match &alt.kind {
                TypeKind::Union(inner) => inner.clone(),
                TypeKind::Optional(inner) => vec![inner.clone(), Self::none()],
                _ => vec![alt],
            };
            for part in parts {
                if !flat.iter().any(|t| t.name == part.name) {
                    flat.push(part);
                }
            }
        }

        match flat.len() {
            0 => Err(ConvertError::unsupported("Union[]", Direction::Structure)),
            1 => Ok(flat.remove(0)),
            2 if flat[1].is_none_type() => Ok(Self::optional(flat.remove(0))),
            _ => Ok(Self::new(TypeKind::Union(flat))),
        }
    }

    pub fn record(record_type: Arc<RecordType>) -> TypeRef {
        Self::new(TypeKind::Record(record_type))
    }

    pub fn is_none_type(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(PrimitiveKind::NoneType))
    }

    pub fn is_record(&self) -> bool {
        matches!(self.kind, TypeKind::Record(_))
    }

    /// Get record type if this describes a record.
    pub fn record_type(&self) -> Option<&Arc<RecordType>> {
        match &self.kind {
            TypeKind::Record(rt) => Some(rt),
            _ => None,
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn canonical_name(kind: &TypeKind) -> String {
    fn join(types: &[TypeRef]) -> String {
        types
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    match kind {
        TypeKind::Primitive(p) => p.name().to_string(),
        TypeKind::Bytes => "bytes".to_string(),
        TypeKind::Date => "date".to_string(),
        TypeKind::DateTime => "datetime".to_string(),
        TypeKind::Named(name) => name.clone(),
        TypeKind::Optional(inner) => format!("Optional[{}]", inner.name),
        TypeKind::List(e) => format!("List[{}]", e.name),
        TypeKind::Set(e) => format!("Set[{}]", e.name),
        TypeKind::FrozenSet(e) => format!("FrozenSet[{}]", e.name),
        TypeKind::Map(k, v) => format!("Dict[{}, {}]", k.name, v.name),
        TypeKind::Tuple(elements) => format!("Tuple[{}]", join(elements)),
        TypeKind::VarTuple(e) => format!("Tuple[{}, ...]", e.name),
        TypeKind::Union(alts) => format!("Union[{}]", join(alts)),
        TypeKind::Record(rt) => rt.name.clone(),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | ':'))
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Zero-argument producer of a field default, invoked fresh each time.
pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Default policy of a field.
#[derive(Clone)]
pub enum FieldDefault {
    /// No default: the field is required.
    Required,
    /// Cloned for every instance that needs it.
    Value(Value),
    Factory(DefaultFactory),
}

impl FieldDefault {
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    /// Produce the default value, if any.
    pub fn produce(&self) -> Option<Value> {
        match self {
            Self::Required => None,
            Self::Value(v) => Some(v.clone()),
            Self::Factory(f) => Some(f()),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Factory(_) => write!(f, "Factory(..)"),
        }
    }
}

/// Field descriptor for record members.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name, also the key in the loose mapping.
    pub name: String,
    /// Declared type.
    pub type_desc: TypeRef,
    pub default: FieldDefault,
    /// Whether the field is read from input. Non-init fields always take
    /// their default.
    pub init: bool,
}

impl FieldDescriptor {
    /// Create a required field.
    pub fn new(name: impl Into<String>, type_desc: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_desc,
            default: FieldDefault::Required,
            init: true,
        }
    }

    /// Set default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = FieldDefault::Value(default.into());
        self
    }

    /// Set default factory.
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = FieldDefault::Factory(Arc::new(factory));
        self
    }

    /// Exclude from construction input.
    pub fn derived(mut self) -> Self {
        self.init = false;
        self
    }
}

/// A record type: a name and its ordered field descriptors.
#[derive(Debug)]
pub struct RecordType {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordType {
    /// Validate and create a record type.
    ///
    /// Field names must be unique and non-init fields must carry a default.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Result<Arc<Self>> {
        let name = name.into();
        if !is_identifier(&name) || PrimitiveKind::from_name(&name).is_some() {
            return Err(ConvertError::InvalidDefinition(format!(
                "invalid record name {name:?}"
            )));
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(ConvertError::InvalidDefinition(format!(
                    "{name}: duplicate field {}",
                    field.name
                )));
            }
            if !field.init && field.default.is_required() {
                return Err(ConvertError::InvalidDefinition(format!(
                    "{name}: non-init field {} needs a default",
                    field.name
                )));
            }
        }
        Ok(Arc::new(Self { name, fields }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Descriptor referring to this record type.
    pub fn descriptor(self: &Arc<Self>) -> TypeRef {
        TypeDescriptor::record(self.clone())
    }
}
