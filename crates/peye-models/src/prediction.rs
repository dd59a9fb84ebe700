//! Classification results returned by the prediction service.
//!
//! The service has shipped two response shapes. The nested shape
//! (`{"main": {...}, "others": [...]}`) is canonical; the flat shape
//! (`{"species": ..., "venom_status": ..., "confidence": ...}`) is accepted
//! as a result with no alternatives and no scientific name.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ModelResult;

/// A single species candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Prediction {
    /// Common species name
    pub species: String,
    /// Venom classification as reported by the service (e.g. "Highly Venomous")
    pub venom_status: String,
    /// Confidence as a display string (e.g. "98.12%")
    pub confidence: String,
    /// Binomial name, absent in the flat response shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    /// Free-text description, only provided for the primary candidate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Prediction {
    /// Parse the confidence string into a percentage.
    ///
    /// Accepts `"98%"`, `"98.12 %"`, and bare numbers.
    pub fn confidence_percent(&self) -> Option<f64> {
        self.confidence
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    /// Lowercase slug of the venom status, used to style the result card.
    pub fn venom_class(&self) -> String {
        self.venom_status
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Parsed response from the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PredictionResult {
    /// Highest-confidence candidate
    pub main: Prediction,
    /// Remaining candidates in descending confidence
    #[serde(default)]
    pub others: Vec<Prediction>,
}

/// Both response shapes the service is known to produce.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Nested {
        main: Prediction,
        #[serde(default)]
        others: Vec<Prediction>,
    },
    Flat(Prediction),
}

impl From<WireResponse> for PredictionResult {
    fn from(wire: WireResponse) -> Self {
        match wire {
            WireResponse::Nested { main, others } => Self { main, others },
            WireResponse::Flat(main) => Self {
                main,
                others: Vec::new(),
            },
        }
    }
}

impl PredictionResult {
    /// Parse a response body in either supported shape.
    pub fn from_json(body: &[u8]) -> ModelResult<Self> {
        let wire: WireResponse = serde_json::from_slice(body)?;
        Ok(wire.into())
    }

    /// Primary candidate followed by the alternatives.
    pub fn candidates(&self) -> impl Iterator<Item = &Prediction> {
        std::iter::once(&self.main).chain(self.others.iter())
    }
}
