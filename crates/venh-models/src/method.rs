//! Enhancement methods and backend method resolution.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Method identifiers accepted by the processing backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum BackendMethod {
    /// Contrast Limited Adaptive Histogram Equalization
    #[default]
    Clahe,
    /// UNet deep learning enhancement
    Unet,
    /// UNet applied only to frames that need it
    UnetSelective,
}

impl BackendMethod {
    /// All backend methods.
    pub const ALL: [BackendMethod; 3] = [
        BackendMethod::Clahe,
        BackendMethod::Unet,
        BackendMethod::UnetSelective,
    ];

    /// Get the identifier sent in the `method` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendMethod::Clahe => "clahe",
            BackendMethod::Unet => "unet",
            BackendMethod::UnetSelective => "unet_selective",
        }
    }

    /// Look up a backend method by its exact identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == id)
    }
}

impl fmt::Display for BackendMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown method: {0}")]
pub struct ParseMethodError(pub String);

impl FromStr for BackendMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| ParseMethodError(s.to_string()))
    }
}

/// User-facing selections that have no backend equivalent of their own.
const METHOD_MAPPING: [(&str, BackendMethod); 5] = [
    ("glare", BackendMethod::Unet),
    ("deraining", BackendMethod::Unet),
    ("tilt", BackendMethod::Unet),
    ("dehazing", BackendMethod::Unet),
    ("automatic", BackendMethod::UnetSelective),
];

/// Resolve a user-facing method selection to the backend identifier.
///
/// Backend identifiers pass through verbatim, the remaining known selections
/// go through a fixed table and anything else falls back to CLAHE.
pub fn resolve_method(method: &str) -> BackendMethod {
    if let Some(backend) = BackendMethod::from_id(method) {
        return backend;
    }

    METHOD_MAPPING
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, backend)| *backend)
        .unwrap_or_default()
}

/// A selectable variant of an enhancement method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubMethod {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Top-level enhancement methods offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EnhancementMethod {
    LowLight,
    Glare,
    Deraining,
    Tilt,
    Dehazing,
    Automatic,
}

const LOW_LIGHT_SUB_METHODS: &[SubMethod] = &[
    SubMethod {
        id: "clahe",
        name: "CLAHE",
        description: "Contrast Limited Adaptive Histogram Equalization",
    },
    SubMethod {
        id: "unet",
        name: "UNet",
        description: "Deep learning enhancement",
    },
];

impl EnhancementMethod {
    /// All methods in menu order.
    pub const ALL: [EnhancementMethod; 6] = [
        EnhancementMethod::LowLight,
        EnhancementMethod::Glare,
        EnhancementMethod::Deraining,
        EnhancementMethod::Tilt,
        EnhancementMethod::Dehazing,
        EnhancementMethod::Automatic,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            EnhancementMethod::LowLight => "low-light",
            EnhancementMethod::Glare => "glare",
            EnhancementMethod::Deraining => "deraining",
            EnhancementMethod::Tilt => "tilt",
            EnhancementMethod::Dehazing => "dehazing",
            EnhancementMethod::Automatic => "automatic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EnhancementMethod::LowLight => "LOW LIGHT",
            EnhancementMethod::Glare => "GLARE",
            EnhancementMethod::Deraining => "DERAINING",
            EnhancementMethod::Tilt => "TILT",
            EnhancementMethod::Dehazing => "DEHAZING",
            EnhancementMethod::Automatic => "AUTOMATIC",
        }
    }

    /// Variants the user picks between; empty when the method has none.
    pub fn sub_methods(&self) -> &'static [SubMethod] {
        match self {
            EnhancementMethod::LowLight => LOW_LIGHT_SUB_METHODS,
            _ => &[],
        }
    }

    /// Backend method used when no sub-method is selected.
    pub fn backend_method(&self) -> BackendMethod {
        match self.sub_methods().first() {
            Some(sub) => resolve_method(sub.id),
            None => resolve_method(self.id()),
        }
    }
}

impl fmt::Display for EnhancementMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
