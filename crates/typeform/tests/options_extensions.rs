// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide options extensions and the global registry.
//!
//! Kept in its own test binary: extensions are global state.

use serde_json::json;
use typeform::{
    clear_options_extensions, extensions, register_options_extension, ConvertError, HookRegistry,
    Model, ModelOptions, RecordTypeBuilder, TypeDescriptor, Value,
};

#[test]
fn test_frozen_by_default_extension() {
    let _ = env_logger::builder().is_test(true).try_init();

    let point = || {
        RecordTypeBuilder::new("Point")
            .field("x", TypeDescriptor::int())
            .field("y", TypeDescriptor::int())
            .build()
            .expect("point")
    };

    // Without extensions, instances are mutable.
    let plain = Model::register(point()).expect("plain");
    let mut p = plain.from_loose_value(&json!({"x": 1, "y": 2})).expect("p");
    p.set("x", 5i64).expect("set");
    assert_eq!(p.get::<i64>("x").expect("x"), 5);

    register_options_extension(extensions::frozen_by_default);

    // Registered after the extension: frozen.
    let frozen = Model::register(point()).expect("frozen");
    assert!(frozen.options().is_frozen());
    let mut q = frozen.from_loose_value(&json!({"x": 1, "y": 2})).expect("q");
    assert_eq!(q.set("x", 5i64), Err(ConvertError::FrozenInstance("x".into())));
    let r = frozen
        .instance([("x", Value::Int(1)), ("y", Value::Int(2))])
        .expect("instance");
    assert!(r.is_frozen());

    // Explicit options win over the extension.
    let explicit = Model::register_with(point(), HookRegistry::global(), ModelOptions::new().frozen(false))
        .expect("explicit");
    let mut s = explicit.from_loose_value(&json!({"x": 1, "y": 2})).expect("s");
    assert!(s.set("y", 9i64).is_ok());

    // Models registered earlier keep their options.
    assert!(!plain.options().is_frozen());

    clear_options_extensions();
    let after = Model::register(point()).expect("after");
    assert!(!after.options().is_frozen());
}
