// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed record conversion
//!
//! Converts typed records to and from a loose, JSON-compatible value tree
//! (`serde_json::Value`) while keeping dates, byte strings, nested records,
//! collections and optional/union fields intact.
//!
//! # Features
//!
//! - **TypeDescriptor**: declared field types with canonical names
//! - **HookRegistry**: per-type structure/unstructure overrides with built-in defaults
//! - **Engine**: generic recursive `structure` / `unstructure`
//! - **Compiler**: per-record pipelines built once at registration
//! - **Model**: `to_loose_value`, `from_loose_value`, `to_text`, `from_text`
//!
//! # Example
//!
//! ```rust
//! use typeform::{HookRegistry, Model, ModelOptions, RecordTypeBuilder, TypeDescriptor, Value};
//! use serde_json::json;
//!
//! let point = RecordTypeBuilder::new("Point")
//!     .field("x", TypeDescriptor::int())
//!     .field_with_default("label", TypeDescriptor::optional(TypeDescriptor::str()), Value::None)
//!     .build()
//!     .unwrap();
//!
//! let registry = HookRegistry::new();
//! let model = Model::register_with(point, &registry, ModelOptions::default()).unwrap();
//!
//! let record = model.from_loose_value(&json!({"x": "3"})).unwrap();
//! assert_eq!(record.get::<i64>("x").unwrap(), 3);
//! assert_eq!(model.to_text(&record).unwrap(), r#"{"x":3,"label":null}"#);
//! ```

mod builder;
mod codec;
mod compiler;
mod engine;
mod error;
pub mod hooks;
pub mod logging;
mod model;
mod options;
mod record;
mod type_descriptor;
mod value;

pub use builder::RecordTypeBuilder;
pub use codec::{JsonCodec, TextCodec};
pub use compiler::CompiledConverter;
pub use engine::{structure, structure_record, unstructure, unstructure_record};
pub use error::{ConvertError, Direction, Result};
pub use hooks::{HookRegistry, HookTable, StructureHook, UnstructureHook};
pub use model::Model;
pub use options::{
    clear_options_extensions, extensions, register_options_extension, ModelOptions,
    OptionsExtension,
};
pub use record::Record;
pub use type_descriptor::{
    DefaultFactory, FieldDefault, FieldDescriptor, PrimitiveKind, RecordType, TypeDescriptor,
    TypeKind, TypeRef,
};
pub use value::{Complex, DateTimeValue, FromValue, Loose, Value};
