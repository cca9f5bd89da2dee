use std::collections::HashMap;

use serde::Serialize;

use crate::crop::Crop;

/// Severity tier attached to a diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Healthy,
    Mild,
    Moderate,
    Severe,
}

/// Static knowledge-base entry for one disease label.
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseRecord {
    pub severity: Severity,
    pub description: String,
    pub recommendations: Vec<String>,
}

impl DiseaseRecord {
    fn new(severity: Severity, description: &str, recommendations: &[&str]) -> Self {
        Self {
            severity,
            description: description.to_string(),
            recommendations: recommendations.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}

/// Compiled-in disease tables, one per crop. Built once at startup and
/// shared read-only; requests never mutate it.
pub struct KnowledgeBase {
    mango: HashMap<String, DiseaseRecord>,
    cashew: HashMap<String, DiseaseRecord>,
}

impl KnowledgeBase {
    pub fn builtin() -> Self {
        Self {
            mango: mango_table(),
            cashew: cashew_table(),
        }
    }

    pub fn for_crop(&self, crop: Crop) -> &HashMap<String, DiseaseRecord> {
        match crop {
            Crop::Mango => &self.mango,
            Crop::Cashew => &self.cashew,
        }
    }
}

fn mango_table() -> HashMap<String, DiseaseRecord> {
    let mut table = HashMap::new();
    table.insert(
        "Anthracnose".to_string(),
        DiseaseRecord::new(
            Severity::Moderate,
            "Anthracnose is a fungal disease that causes dark lesions on leaves and fruit. \
             It typically appears during warm, humid weather conditions.",
            &[
                "Remove and destroy infected leaves immediately",
                "Apply copper-based fungicide every 10-14 days",
                "Improve air circulation around trees",
                "Avoid overhead watering to reduce leaf wetness",
                "Consider using resistant mango varieties for future planting",
            ],
        ),
    );
    table.insert(
        "Bacterial Canker".to_string(),
        DiseaseRecord::new(
            Severity::Severe,
            "Bacterial canker produces raised, water-soaked lesions that crack and exude gum \
             on leaves, twigs and fruit, and spreads quickly in wet weather.",
            &[
                "Prune out cankered twigs during dry weather and burn them",
                "Spray copper oxychloride at the first sign of spread",
                "Disinfect pruning tools between trees",
                "Avoid wounding bark during orchard operations",
            ],
        ),
    );
    table.insert(
        "Cutting Weevil".to_string(),
        DiseaseRecord::new(
            Severity::Moderate,
            "Cutting weevil larvae sever young leaves, leaving clean cuts across the lamina \
             of new flushes and stunting canopy growth.",
            &[
                "Collect and destroy fallen leaf cuttings to break the life cycle",
                "Shake young trees in the morning and remove dislodged weevils",
                "Apply a contact insecticide to new flushes if infestation persists",
            ],
        ),
    );
    table.insert(
        "Die Back".to_string(),
        DiseaseRecord::new(
            Severity::Severe,
            "Die back dries twigs from the tip downwards, with internal browning of the \
             vascular tissue; untreated it can kill whole branches.",
            &[
                "Prune affected twigs well below the dried region",
                "Paint cut surfaces with a copper-based wound dressing",
                "Apply a systemic fungicide after pruning",
                "Burn pruned material away from the orchard",
            ],
        ),
    );
    table.insert(
        "Gall Midge".to_string(),
        DiseaseRecord::new(
            Severity::Moderate,
            "Gall midge larvae feed inside leaf tissue, raising small wart-like galls that \
             deform young leaves and open entry points for fungal infection.",
            &[
                "Remove and destroy galled leaves before adults emerge",
                "Plough lightly under the canopy to expose pupae",
                "Apply a systemic insecticide at the early flush stage if pressure is high",
            ],
        ),
    );
    table.insert(
        "Healthy".to_string(),
        DiseaseRecord::new(
            Severity::Healthy,
            "The leaf shows no visible symptoms of disease. Color and texture are within \
             the normal range for a healthy mango leaf.",
            &[
                "Continue regular monitoring for early signs of disease",
                "Maintain the current watering and fertilization schedule",
            ],
        ),
    );
    table.insert(
        "Powdery Mildew".to_string(),
        DiseaseRecord::new(
            Severity::Mild,
            "Powdery mildew coats young leaves and panicles with a white, powdery fungal \
             growth that thrives in cool, dry weather with humid nights.",
            &[
                "Dust with wettable sulphur at the first white patches",
                "Repeat treatment at 15-day intervals during flowering",
                "Prune dense growth to reduce shaded, humid pockets",
            ],
        ),
    );
    table.insert(
        "Sooty Mould".to_string(),
        DiseaseRecord::new(
            Severity::Mild,
            "Sooty mould grows as a black film on honeydew excreted by sap-sucking insects; \
             it blocks light but does not infect the leaf itself.",
            &[
                "Control the hoppers, scales or mealybugs producing honeydew",
                "Spray a starch solution to flake off the mould layer",
                "Encourage natural predators of sap-sucking insects",
            ],
        ),
    );
    table
}

fn cashew_table() -> HashMap<String, DiseaseRecord> {
    let mut table = HashMap::new();
    table.insert(
        "Anthracnose".to_string(),
        DiseaseRecord::new(
            Severity::Moderate,
            "Anthracnose causes dark, sunken lesions on cashew leaves, shoots and young \
             nuts, spreading rapidly during prolonged wet spells.",
            &[
                "Remove and burn infected plant parts",
                "Apply copper-based fungicide at flushing and flowering",
                "Avoid dense canopies that hold moisture after rain",
            ],
        ),
    );
    table.insert(
        "Gumosis".to_string(),
        DiseaseRecord::new(
            Severity::Severe,
            "Gumosis shows as gum exuding from cracks in the bark and branch dieback; the \
             infection girdles stems and can kill young trees.",
            &[
                "Scrape off affected bark and apply a copper paste to the wound",
                "Cut and burn severely infected branches",
                "Avoid mechanical injuries to the trunk during weeding",
                "Improve drainage around the root zone",
            ],
        ),
    );
    table.insert(
        "Healthy".to_string(),
        DiseaseRecord::new(
            Severity::Healthy,
            "The leaf shows no visible symptoms of disease. Color and texture are within \
             the normal range for a healthy cashew leaf.",
            &[
                "Continue regular monitoring for early signs of disease",
                "Maintain the current orchard sanitation routine",
            ],
        ),
    );
    table.insert(
        "Leaf Miner".to_string(),
        DiseaseRecord::new(
            Severity::Mild,
            "Leaf miner larvae tunnel between the leaf surfaces, leaving silvery, winding \
             mines that dry out and curl the leaf blade.",
            &[
                "Pick and destroy mined leaves on young plants",
                "Release or protect parasitoid wasps where available",
                "Spray neem-based formulations on new flushes",
            ],
        ),
    );
    table.insert(
        "Red Rust".to_string(),
        DiseaseRecord::new(
            Severity::Moderate,
            "Red rust appears as rusty, circular algal patches on the upper leaf surface, \
             reducing the photosynthetic area of mature leaves.",
            &[
                "Spray copper oxychloride before and after the monsoon",
                "Prune overlapping branches to improve light penetration",
                "Keep the orchard floor free of infected fallen leaves",
            ],
        ),
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mango_table_covers_the_label_set() {
        let table = mango_table();
        for label in [
            "Anthracnose",
            "Bacterial Canker",
            "Cutting Weevil",
            "Die Back",
            "Gall Midge",
            "Healthy",
            "Powdery Mildew",
            "Sooty Mould",
        ] {
            assert!(table.contains_key(label), "missing mango label {label}");
        }
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_cashew_table_covers_the_label_set() {
        let table = cashew_table();
        for label in ["Anthracnose", "Gumosis", "Healthy", "Leaf Miner", "Red Rust"] {
            assert!(table.contains_key(label), "missing cashew label {label}");
        }
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_mango_healthy_entry() {
        let table = mango_table();
        let healthy = &table["Healthy"];
        assert_eq!(healthy.severity, Severity::Healthy);
        assert_eq!(healthy.recommendations.len(), 2);
    }

    #[test]
    fn test_every_record_is_fully_populated() {
        let kb = KnowledgeBase::builtin();
        for crop in Crop::ALL {
            for (label, record) in kb.for_crop(crop) {
                assert!(!record.description.is_empty(), "{crop}/{label} description");
                assert!(
                    !record.recommendations.is_empty(),
                    "{crop}/{label} recommendations"
                );
            }
        }
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Severity::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&Severity::Moderate).unwrap(),
            "\"moderate\""
        );
    }
}
