use serde::{Deserialize, Serialize};

/// ========================================
/// Wizard data model and provider payloads
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Description,
    Theme,
    Responsiveness,
    ExtraDetails,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Description => "App Description",
            FormField::Theme => "Color Theme",
            FormField::Responsiveness => "Responsiveness",
            FormField::ExtraDetails => "Extra Details",
        }
    }
}

/// Free-text requirements collected by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub description: String,
    pub theme: String,
    pub responsiveness: String,
    #[serde(default)]
    pub extra_details: String,
}

impl FormData {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Description => &self.description,
            FormField::Theme => &self.theme,
            FormField::Responsiveness => &self.responsiveness,
            FormField::ExtraDetails => &self.extra_details,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        let slot = match field {
            FormField::Description => &mut self.description,
            FormField::Theme => &mut self.theme,
            FormField::Responsiveness => &mut self.responsiveness,
            FormField::ExtraDetails => &mut self.extra_details,
        };
        *slot = value;
    }

    pub fn has_extra_details(&self) -> bool {
        !self.extra_details.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    pub id: u8,
    pub title: &'static str,
    pub field: FormField,
    pub placeholder: &'static str,
}

/// Fixed order of the Form phase.
pub const STEPS: [StepInfo; 3] = [
    StepInfo {
        id: 1,
        title: "First, what are you building?",
        field: FormField::Description,
        placeholder: "e.g., A dashboard for an e-commerce store to track sales, inventory, and customer data.",
    },
    StepInfo {
        id: 2,
        title: "What's the desired color theme?",
        field: FormField::Theme,
        placeholder: "e.g., A clean and modern dark mode with vibrant blue accents for charts and buttons.",
    },
    StepInfo {
        id: 3,
        title: "How should it be responsive?",
        field: FormField::Responsiveness,
        placeholder: "e.g., Fully responsive. A collapsible sidebar on mobile, and cards that stack vertically.",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStep {
    Form,
    Summary,
    Preview,
    Result,
}

/// Transition hint for whoever renders the form steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

/// Output of the layout-derivation capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPlan {
    pub layout_description: String,
    pub image_prompt: String,
}

/// Fixed parameters of a mockup image request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    pub count: usize,
    pub aspect_ratio: String,
    pub mime_type: String,
}

pub const PREVIEW_IMAGE_COUNT: usize = 2;

impl Default for ImageRequest {
    fn default() -> Self {
        Self {
            count: PREVIEW_IMAGE_COUNT,
            aspect_ratio: "16:9".into(),
            mime_type: "image/png".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewData {
    pub layout_description: String,
    /// Client-displayable `data:` URLs, one per payload.
    pub image_urls: Vec<String>,
    /// Raw base64 payloads, fed back into code generation.
    pub image_payloads: Vec<String>,
}

impl PreviewData {
    pub fn new(layout_description: String, payloads: Vec<String>, mime_type: &str) -> Self {
        let image_urls = payloads
            .iter()
            .map(|b64| format!("data:{mime_type};base64,{b64}"))
            .collect();
        Self {
            layout_description,
            image_urls,
            image_payloads: payloads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_cover_required_fields_in_order() {
        let fields: Vec<_> = STEPS.iter().map(|s| s.field).collect();
        assert_eq!(
            fields,
            vec![FormField::Description, FormField::Theme, FormField::Responsiveness]
        );
        assert!(STEPS.iter().enumerate().all(|(i, s)| s.id as usize == i + 1));
    }

    #[test]
    fn layout_plan_parses_camel_case_keys() {
        let plan: LayoutPlan = serde_json::from_str(
            r#"{"layoutDescription":"sidebar + cards","imagePrompt":"a dark dashboard"}"#,
        )
        .unwrap();
        assert_eq!(plan.layout_description, "sidebar + cards");
        assert_eq!(plan.image_prompt, "a dark dashboard");
    }

    #[test]
    fn layout_plan_rejects_missing_prompt() {
        let parsed = serde_json::from_str::<LayoutPlan>(r#"{"layoutDescription":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn preview_urls_wrap_payloads() {
        let p = PreviewData::new("l".into(), vec!["AAA".into(), "BBB".into()], "image/png");
        assert_eq!(p.image_urls[1], "data:image/png;base64,BBB");
        assert_eq!(p.image_payloads, vec!["AAA".to_string(), "BBB".to_string()]);
    }

    #[test]
    fn extra_details_default_when_absent() {
        let f: FormData = serde_json::from_str(
            r#"{"description":"d","theme":"t","responsiveness":"r"}"#,
        )
        .unwrap();
        assert!(!f.has_extra_details());
    }
}
