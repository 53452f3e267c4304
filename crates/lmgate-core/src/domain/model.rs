//! Model identity and selection criteria.

use serde::{Deserialize, Serialize};

/// Identity of a chat model as reported by the capability provider.
///
/// This is a point-in-time snapshot taken when the model is selected or
/// listed. It is never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub vendor: String,
    pub family: String,
}

impl ModelInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        vendor: impl Into<String>,
        family: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            vendor: vendor.into(),
            family: family.into(),
        }
    }
}

/// Filter for choosing a chat model.
///
/// Absent fields mean "no constraint". Blank strings are treated as absent,
/// so `{"vendor": ""}` selects from every vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelectRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

impl ModelSelectRequest {
    /// Criteria that match every model.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Build criteria from optional request fields, dropping blank values.
    pub fn from_parts(vendor: Option<String>, family: Option<String>) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            vendor: keep(vendor),
            family: keep(family),
        }
    }

    /// Vendor constraint, if any.
    pub fn vendor(&self) -> Option<&str> {
        self.vendor.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Family constraint, if any.
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Returns true when no field constrains the selection.
    pub fn is_unconstrained(&self) -> bool {
        self.vendor().is_none() && self.family().is_none()
    }

    /// Check a model against these criteria (exact match per field).
    pub fn matches(&self, info: &ModelInfo) -> bool {
        self.vendor().is_none_or(|v| v == info.vendor)
            && self.family().is_none_or(|f| f == info.family)
    }
}
