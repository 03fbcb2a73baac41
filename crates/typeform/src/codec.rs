// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Text encoding of loose values.

use std::fmt;

use crate::error::Result;
use crate::value::Loose;

/// Encodes loose value trees to text and back.
pub trait TextCodec: Send + Sync + fmt::Debug {
    fn encode(&self, value: &Loose) -> Result<String>;
    fn decode(&self, text: &str) -> Result<Loose>;
}

/// JSON text codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Single-line output.
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl TextCodec for JsonCodec {
    fn encode(&self, value: &Loose) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    fn decode(&self, text: &str) -> Result<Loose> {
        Ok(serde_json::from_str(text)?)
    }
}
