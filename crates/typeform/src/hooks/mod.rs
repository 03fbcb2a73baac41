// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hook registry.
//!
//! Maps canonical type names to structure and unstructure functions. The
//! table sits behind an `ArcSwap`: readers load a snapshot without locking,
//! writers publish a modified copy. Compiled converters hold the snapshot
//! that was current when they were built, so later registrations only affect
//! the generic path and converters compiled afterwards.
//!
//! Registration is meant to happen during initialization, before the
//! conversions that depend on it.

mod defaults;

pub use defaults::{default_structure_hook, default_unstructure_hook, DEFAULT_TYPE_NAMES};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use crate::engine;
use crate::error::Result;
use crate::type_descriptor::TypeDescriptor;
use crate::value::{Loose, Value};

/// Loose value to typed value.
pub type StructureHook = Arc<dyn Fn(&Loose) -> Result<Value> + Send + Sync>;

/// Typed value to loose value.
pub type UnstructureHook = Arc<dyn Fn(&Value) -> Result<Loose> + Send + Sync>;

/// Immutable snapshot of registered hooks.
#[derive(Clone, Default)]
pub struct HookTable {
    structure: HashMap<String, StructureHook>,
    unstructure: HashMap<String, UnstructureHook>,
}

impl HookTable {
    /// Table holding the built-in primitive hooks.
    pub fn with_defaults() -> Self {
        let mut table = Self::default();
        defaults::install(&mut table);
        table
    }

    pub fn structure_hook(&self, type_name: &str) -> Option<&StructureHook> {
        self.structure.get(type_name)
    }

    pub fn unstructure_hook(&self, type_name: &str) -> Option<&UnstructureHook> {
        self.unstructure.get(type_name)
    }

    pub fn has_unstructure_hook(&self, type_name: &str) -> bool {
        self.unstructure.contains_key(type_name)
    }

    pub(crate) fn insert_structure(&mut self, type_name: &str, hook: StructureHook) {
        self.structure.insert(type_name.to_string(), hook);
    }

    pub(crate) fn insert_unstructure(&mut self, type_name: &str, hook: UnstructureHook) {
        self.unstructure.insert(type_name.to_string(), hook);
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut structure: Vec<&str> = self.structure.keys().map(String::as_str).collect();
        let mut unstructure: Vec<&str> = self.unstructure.keys().map(String::as_str).collect();
        structure.sort_unstable();
        unstructure.sort_unstable();
        f.debug_struct("HookTable")
            .field("structure", &structure)
            .field("unstructure", &unstructure)
            .finish()
    }
}

/// Registry of conversion hooks keyed by canonical type name.
pub struct HookRegistry {
    table: ArcSwap<HookTable>,
}

impl HookRegistry {
    /// Registry pre-populated with the built-in primitive hooks.
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(HookTable::with_defaults()),
        }
    }

    /// Registry with no hooks at all.
    pub fn empty() -> Self {
        Self {
            table: ArcSwap::from_pointee(HookTable::default()),
        }
    }

    /// Process-wide registry used by [`Model::register`](crate::Model::register).
    pub fn global() -> &'static HookRegistry {
        static REGISTRY: OnceLock<HookRegistry> = OnceLock::new();
        REGISTRY.get_or_init(HookRegistry::new)
    }

    /// Register or replace the structure hook for `type_name`.
    pub fn register_structure_hook<F>(&self, type_name: &str, hook: F)
    where
        F: Fn(&Loose) -> Result<Value> + Send + Sync + 'static,
    {
        let hook: StructureHook = Arc::new(hook);
        self.table.rcu(|current| {
            let mut next = HookTable::clone(current);
            next.insert_structure(type_name, hook.clone());
            next
        });
        log::debug!("[registry] structure hook registered for {}", type_name);
    }

    /// Register or replace the unstructure hook for `type_name`.
    pub fn register_unstructure_hook<F>(&self, type_name: &str, hook: F)
    where
        F: Fn(&Value) -> Result<Loose> + Send + Sync + 'static,
    {
        let hook: UnstructureHook = Arc::new(hook);
        self.table.rcu(|current| {
            let mut next = HookTable::clone(current);
            next.insert_unstructure(type_name, hook.clone());
            next
        });
        log::debug!("[registry] unstructure hook registered for {}", type_name);
    }

    /// Remove the structure hook for `type_name`. Returns whether one existed.
    ///
    /// Removing a built-in hook makes the type unsupported; restore it with
    /// [`default_structure_hook`].
    pub fn remove_structure_hook(&self, type_name: &str) -> bool {
        if self.table.load().structure_hook(type_name).is_none() {
            return false;
        }
        self.table.rcu(|current| {
            let mut next = HookTable::clone(current);
            next.structure.remove(type_name);
            next
        });
        if DEFAULT_TYPE_NAMES.contains(&type_name) {
            log::warn!("[registry] built-in structure hook removed for {}", type_name);
        } else {
            log::debug!("[registry] structure hook removed for {}", type_name);
        }
        true
    }

    pub fn remove_unstructure_hook(&self, type_name: &str) -> bool {
        if !self.table.load().has_unstructure_hook(type_name) {
            return false;
        }
        self.table.rcu(|current| {
            let mut next = HookTable::clone(current);
            next.unstructure.remove(type_name);
            next
        });
        if DEFAULT_TYPE_NAMES.contains(&type_name) {
            log::warn!("[registry] built-in unstructure hook removed for {}", type_name);
        } else {
            log::debug!("[registry] unstructure hook removed for {}", type_name);
        }
        true
    }

    /// Current hook table.
    pub fn snapshot(&self) -> Arc<HookTable> {
        self.table.load_full()
    }

    /// Structure `loose` as `desc` using the hooks registered right now.
    pub fn structure(&self, desc: &TypeDescriptor, loose: &Loose) -> Result<Value> {
        engine::structure(&self.table.load(), desc, loose)
    }

    /// Unstructure `value` using the hooks registered right now.
    pub fn unstructure(&self, value: &Value) -> Result<Loose> {
        engine::unstructure(&self.table.load(), value)
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HookRegistry").field(&*self.table.load()).finish()
    }
}
