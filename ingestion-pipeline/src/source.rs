use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use common::storage::types::section::{Section, SECTION_SOURCE_FIELDS};

/// A source dump maps each searchable alias to the label records published
/// under it. `BTreeMap` keeps batch processing order deterministic.
pub type LabelBatch = BTreeMap<String, Vec<DrugLabelRecord>>;

/// One raw label record from the public e-drug dataset. The identifying
/// fields are typed; the section texts and anything else the API publishes
/// stay in `fields` so the verbatim payload can be persisted for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugLabelRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_seq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entp_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bizrno: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_de: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_de: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl DrugLabelRecord {
    /// The mapped, non-empty label sections of this record, in the fixed
    /// source order. Fields outside the section mapping are ignored.
    pub fn sections(&self) -> Vec<(Section, &str)> {
        SECTION_SOURCE_FIELDS
            .iter()
            .filter_map(|(field, section)| {
                self.fields
                    .get(*field)
                    .and_then(serde_json::Value::as_str)
                    .filter(|text| !text.trim().is_empty())
                    .map(|text| (*section, text))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> DrugLabelRecord {
        serde_json::from_value(value).expect("record deserializes")
    }

    #[test]
    fn camel_case_fields_deserialize_into_typed_slots() {
        let record = record(json!({
            "itemSeq": "195900043",
            "itemName": "타이레놀정500밀리그람(아세트아미노펜)",
            "entpName": "한국존슨앤드존슨판매(유)",
            "efcyQesitm": "해열 및 진통"
        }));

        assert_eq!(record.item_seq.as_deref(), Some("195900043"));
        assert_eq!(record.entp_name.as_deref(), Some("한국존슨앤드존슨판매(유)"));
        assert!(record.fields.contains_key("efcyQesitm"));
    }

    #[test]
    fn sections_follow_the_mapping_and_skip_empties() {
        let record = record(json!({
            "itemSeq": "1",
            "efcyQesitm": "해열 및 진통",
            "useMethodQesitm": "  ",
            "seQesitm": "발진",
            "notALabelField": "무시됨"
        }));

        let sections = record.sections();
        assert_eq!(
            sections,
            vec![
                (Section::Efficacy, "해열 및 진통"),
                (Section::SideEffects, "발진")
            ]
        );
    }

    #[test]
    fn serializing_reconstructs_the_source_shape() {
        let source = json!({
            "itemSeq": "1",
            "itemName": "타이레놀정(아세트아미노펜)",
            "efcyQesitm": "해열 및 진통"
        });
        let record = record(source.clone());
        let back = serde_json::to_value(&record).expect("serialize");
        assert_eq!(back, source);
    }
}
