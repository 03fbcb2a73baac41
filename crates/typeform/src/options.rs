// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Model registration options.
//!
//! Options extensions are process-wide functions applied to the options of
//! every model registered after they are installed. Extensions only fill in
//! what the caller left unset, so explicit options always win.

use std::sync::Arc;

use parking_lot::{const_rwlock, RwLock};

use crate::codec::{JsonCodec, TextCodec};

/// Options applied when registering a [`Model`](crate::Model).
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Reject field assignment on instances. `None` means unset (not frozen
    /// unless an extension says otherwise).
    pub frozen: Option<bool>,
    /// Codec used by `to_text` / `from_text`.
    pub codec: Arc<dyn TextCodec>,
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set frozen.
    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = Some(frozen);
        self
    }

    /// Set text codec.
    pub fn codec(mut self, codec: impl TextCodec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Whether instances are frozen once extensions have been applied.
    pub fn is_frozen(&self) -> bool {
        self.frozen.unwrap_or(false)
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            frozen: None,
            codec: Arc::new(JsonCodec::compact()),
        }
    }
}

/// Transforms options before a model is registered.
pub type OptionsExtension = Arc<dyn Fn(ModelOptions) -> ModelOptions + Send + Sync>;

static EXTENSIONS: RwLock<Vec<OptionsExtension>> = const_rwlock(Vec::new());

/// Install an options extension for all subsequent registrations.
pub fn register_options_extension<F>(extension: F)
where
    F: Fn(ModelOptions) -> ModelOptions + Send + Sync + 'static,
{
    let mut extensions = EXTENSIONS.write();
    extensions.push(Arc::new(extension));
    log::debug!("[options] extension installed ({} active)", extensions.len());
}

/// Remove all installed options extensions.
pub fn clear_options_extensions() {
    EXTENSIONS.write().clear();
}

/// Apply installed extensions in installation order.
pub(crate) fn apply_extensions(options: ModelOptions) -> ModelOptions {
    let extensions: Vec<OptionsExtension> = EXTENSIONS.read().clone();
    extensions.iter().fold(options, |opts, ext| ext(opts))
}

/// Ready-made extensions.
pub mod extensions {
    use super::ModelOptions;

    /// Models are frozen unless registered with an explicit `frozen` option.
    pub fn frozen_by_default(mut options: ModelOptions) -> ModelOptions {
        options.frozen.get_or_insert(true);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_by_default_respects_explicit() {
        let unset = extensions::frozen_by_default(ModelOptions::new());
        assert!(unset.is_frozen());

        let explicit = extensions::frozen_by_default(ModelOptions::new().frozen(false));
        assert!(!explicit.is_frozen());
    }

    #[test]
    fn test_defaults() {
        let options = ModelOptions::default();
        assert_eq!(options.frozen, None);
        assert!(!options.is_frozen());
    }
}
