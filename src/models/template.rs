use super::MediaReference;
use serde::{Deserialize, Serialize};

/// Pre-approved message template
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Template {
    pub name: String,
    pub language: TemplateLanguage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<TemplateComponent>,
}

impl Template {
    pub fn new(name: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: TemplateLanguage {
                code: language_code.into(),
                policy: None,
            },
            components: Vec::new(),
        }
    }

    /// Adds a `body` component filled with text parameters, in order
    pub fn with_body_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components.push(TemplateComponent {
            kind: "body".into(),
            sub_type: None,
            index: None,
            parameters: parameters
                .into_iter()
                .map(|text| TemplateParameter::Text { text: text.into() })
                .collect(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemplateLanguage {
    pub code: String,
    /// Always "deterministic" when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemplateComponent {
    /// header, body or button
    #[serde(rename = "type")]
    pub kind: String,
    /// quick_reply or url, buttons only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    /// Position of the button, buttons only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<TemplateParameter>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateParameter {
    Text { text: String },
    Currency { currency: TemplateCurrency },
    DateTime { date_time: TemplateDateTime },
    Image { image: MediaReference },
    Document { document: MediaReference },
    Video { video: MediaReference },
    Payload { payload: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemplateCurrency {
    pub fallback_value: String,
    pub code: String,
    /// Amount multiplied by 1000
    pub amount_1000: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TemplateDateTime {
    pub fallback_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_with_body_parameters() {
        let template =
            Template::new("custom_reminder", "es_mx").with_body_parameters(["vacuna de Luna"]);

        assert_eq!(
            serde_json::to_value(&template).unwrap(),
            serde_json::json!({
                "name": "custom_reminder",
                "language": {"code": "es_mx"},
                "components": [{
                    "type": "body",
                    "parameters": [{"type": "text", "text": "vacuna de Luna"}]
                }]
            })
        );
    }
}
