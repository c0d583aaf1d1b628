//! Advisory enrichment for classification results
//!
//! Maps a predicted [`Label`] and the patient's optional age to the static
//! description, guidelines, urgency hint and age note shown on the result
//! page. The mapping is total and has no side effects.

use serde::Serialize;

use crate::types::Label;

/// Human-readable advisory for one prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub description: &'static str,
    pub guidelines: &'static [&'static str],
    pub severity_hint: &'static str,
    pub age_note: &'static str,
}

/// Age bracket driving the age note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    /// No age supplied
    Unknown,
    /// Younger than 20
    Under20,
    /// 20 through 60 inclusive
    Adult,
    /// Older than 60
    Over60,
}

impl AgeBand {
    pub fn from_age(age: Option<i64>) -> Self {
        match age {
            None => AgeBand::Unknown,
            Some(age) if age < 20 => AgeBand::Under20,
            Some(age) if age <= 60 => AgeBand::Adult,
            Some(_) => AgeBand::Over60,
        }
    }

    pub fn note(self) -> &'static str {
        match self {
            AgeBand::Unknown => "",
            AgeBand::Under20 => {
                "Under 20: lower baseline risk. Emphasize sun safety. Seek review for symptomatic or rapidly changing lesions."
            }
            AgeBand::Adult => {
                "Age 20–60: maintain regular self-checks; consider annual professional exam if risk factors exist."
            }
            AgeBand::Over60 => {
                "Age 60+: increased risk. Recommend annual full-body skin exam and prompt evaluation for any suspicious lesion."
            }
        }
    }
}

const MELANOMA_GUIDELINES: &[&str] = &[
    "Consult a dermatologist for dermoscopy & possible biopsy.",
    "Follow the ABCDE rule: Asymmetry, Border, Color, Diameter, Evolution.",
    "Use SPF 50+, avoid tanning beds and prolonged sun exposure.",
    "Self-check monthly and seek professional checks annually or per clinician.",
];

const NEVUS_GUIDELINES: &[&str] = &[
    "Monitor with photos and report rapid changes.",
    "Protect from sun and avoid intentional tanning.",
    "If many atypical moles or family history, schedule dermatology review.",
];

const BASAL_CELL_GUIDELINES: &[&str] = &[
    "See dermatologist for removal options (excision, curettage, topical therapy).",
    "Avoid repetitive sun damage and use protective clothing.",
    "Annual skin exams are recommended for those with sun damage.",
];

const KERATOSIS_GUIDELINES: &[&str] = &[
    "Benign in most cases; remove if symptomatic or for cosmetic reasons.",
    "Keep skin moisturized and protected from UV.",
    "Seek review if rapid growth, bleeding or irritation occurs.",
];

/// Build the advisory for a label and optional age
pub fn enrich(label: Label, age: Option<i64>) -> Advisory {
    let (description, guidelines, severity_hint) = match label {
        Label::Melanoma => (
            "Melanoma is a serious skin cancer arising from pigment-producing cells (melanocytes). \
             Early detection and biopsy when suspicious improves outcomes significantly.",
            MELANOMA_GUIDELINES,
            "Higher urgency — seek immediate specialist evaluation.",
        ),
        Label::MelanocyticNevus => (
            "Melanocytic nevus (mole) — usually benign. Monitor for changes in color, shape, size or symptoms.",
            NEVUS_GUIDELINES,
            "Usually low urgency; monitor closely.",
        ),
        Label::BasalCellCarcinoma => (
            "Basal cell carcinoma (BCC) — the most common skin cancer, slow-growing but locally invasive.",
            BASAL_CELL_GUIDELINES,
            "Moderate urgency — early treatment recommended.",
        ),
        Label::BenignKeratosis => (
            "Benign keratosis-like lesion — common non-cancerous growth related to sun or age.",
            KERATOSIS_GUIDELINES,
            "Low urgency.",
        ),
    };

    Advisory {
        description,
        guidelines,
        severity_hint,
        age_note: AgeBand::from_age(age).note(),
    }
}
