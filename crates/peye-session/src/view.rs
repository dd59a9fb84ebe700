//! Render-ready projection of a [`Session`].

use serde::Serialize;

use peye_models::{Generation, Prediction, PredictionResult, SessionPhase};

use crate::state::Session;

pub const IDENTIFY_LABEL: &str = "Identify Snake";
pub const ANALYZING_LABEL: &str = "Analyzing...";

/// Everything a UI needs to draw the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub generation: Generation,
    /// Data URI of the uploaded image, when one is loaded
    pub image_src: Option<String>,
    pub show_cropper: bool,
    pub identify_enabled: bool,
    pub identify_label: &'static str,
    pub result: Option<ResultCard>,
    pub show_identify_another: bool,
}

/// The primary classification, formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultCard {
    pub title: String,
    pub scientific_name: Option<String>,
    /// e.g. "Highly Venomous Venom"
    pub badge: String,
    /// e.g. "Confidence: 98.12%"
    pub confidence_line: String,
    /// Style class derived from the venom status
    pub venom_class: String,
    pub description: Option<String>,
    pub alternatives: Vec<AlternativeLine>,
}

/// A runner-up candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeLine {
    pub species: String,
    pub confidence: String,
    pub venom_status: String,
}

impl SessionView {
    pub fn from_session(session: &Session) -> Self {
        let phase = session.phase();
        let image_src = session
            .image()
            .map(|image| image.data_uri())
            .filter(|uri| !uri.is_empty())
            .map(str::to_string);

        Self {
            phase,
            generation: session.generation(),
            image_src,
            show_cropper: session.image().is_some(),
            identify_enabled: session.can_submit(),
            identify_label: if phase == SessionPhase::Submitting {
                ANALYZING_LABEL
            } else {
                IDENTIFY_LABEL
            },
            result: session.result().map(ResultCard::from_result),
            show_identify_another: phase == SessionPhase::ResultReady,
        }
    }
}

impl ResultCard {
    pub fn from_result(result: &PredictionResult) -> Self {
        let main = &result.main;
        Self {
            title: main.species.clone(),
            scientific_name: main.scientific_name.clone(),
            badge: format!("{} Venom", main.venom_status),
            confidence_line: format!("Confidence: {}", main.confidence),
            venom_class: main.venom_class(),
            description: main.description.clone(),
            alternatives: result.others.iter().map(AlternativeLine::from).collect(),
        }
    }
}

impl From<&Prediction> for AlternativeLine {
    fn from(p: &Prediction) -> Self {
        Self {
            species: p.species.clone(),
            confidence: p.confidence.clone(),
            venom_status: p.venom_status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(species: &str, venom: &str, confidence: &str) -> Prediction {
        Prediction {
            species: species.into(),
            venom_status: venom.into(),
            confidence: confidence.into(),
            scientific_name: None,
            description: None,
        }
    }

    #[test]
    fn test_idle_view() {
        let view = SessionView::from_session(&Session::default());
        assert_eq!(view.phase, SessionPhase::Idle);
        assert!(view.image_src.is_none());
        assert!(!view.show_cropper);
        assert!(!view.identify_enabled);
        assert_eq!(view.identify_label, IDENTIFY_LABEL);
        assert!(view.result.is_none());
        assert!(!view.show_identify_another);
    }

    #[test]
    fn test_result_card() {
        let result = PredictionResult {
            main: Prediction {
                scientific_name: Some("Naja naja".into()),
                ..prediction("Cobra", "Highly Venomous", "98.12%")
            },
            others: vec![
                prediction("Krait", "Highly Venomous", "1.20%"),
                prediction("Rat Snake", "Non Venomous", "0.40%"),
            ],
        };

        let card = ResultCard::from_result(&result);
        assert_eq!(card.title, "Cobra");
        assert_eq!(card.badge, "Highly Venomous Venom");
        assert_eq!(card.confidence_line, "Confidence: 98.12%");
        assert_eq!(card.venom_class, "highly-venomous");
        assert_eq!(card.scientific_name.as_deref(), Some("Naja naja"));
        assert_eq!(card.alternatives.len(), 2);
        assert_eq!(card.alternatives[1].species, "Rat Snake");
    }

    #[test]
    fn test_view_serializes() {
        let json = serde_json::to_value(SessionView::from_session(&Session::default())).unwrap();
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["identify_label"], "Identify Snake");
    }
}
