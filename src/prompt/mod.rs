use crate::wire::{FormData, FormField};

fn requirements(form: &FormData, layout: Option<&str>) -> String {
    let mut out = String::new();
    for field in [FormField::Description, FormField::Theme, FormField::Responsiveness] {
        out.push_str(&format!("- {}: {}\n", field.label(), form.get(field)));
    }
    if let Some(l) = layout {
        out.push_str(&format!("- Layout Concept: {}\n", l));
    }
    if form.has_extra_details() {
        out.push_str(&format!("- {}: {}\n", FormField::ExtraDetails.label(), form.extra_details));
    }
    out
}

pub fn layout_prompt(form: &FormData) -> String {
    format!(
r#"Based on the following user requirements for a web application UI, generate a concise layout description and a detailed prompt for an image generation model to create a visual mockup.

User Requirements:
{}
Return a JSON object with two keys: "layoutDescription" and "imagePrompt".
- "layoutDescription": A brief, clear description of the proposed UI layout.
- "imagePrompt": A highly detailed prompt for a text-to-image model. Describe the components (charts, tables, cards), color scheme, layout structure (header, sidebar, main content) and overall aesthetic, styled like a professional UI mockup."#,
        requirements(form, None)
    )
}

fn html_rules() -> &'static str {
r#"Output Rules:
- A single, self-contained HTML file styled with the Tailwind CSS CDN only.
- Semantic, well-structured markup.
- Functional JavaScript in a <script> tag at the end of the body: buttons, dropdowns and tabs must work; charts use Chart.js from a CDN with realistic sample data; tables are sortable or filterable where it makes sense.
- Reply with ONLY the HTML, enclosed in ```html ... ```. No explanation before or after."#
}

pub fn code_prompt(form: &FormData, layout: &str) -> String {
    format!(
r#"You are a senior frontend engineer. Generate one complete, fully functional HTML file from the requirements and the attached visual reference.

{}

Project Requirements:
{}
Use the attached image as a strong visual reference for layout, components and aesthetic."#,
        html_rules(),
        requirements(form, Some(layout))
    )
}

pub fn refine_prompt(code: &str, instruction: &str) -> String {
    format!(
r#"You are a senior frontend engineer. Modify the existing HTML file according to the user's instruction. Keep all existing JavaScript behaviour working; update the script if the change needs it.

{}

User's Refinement Instruction:
"{}"

Existing HTML Code to Modify:
```html
{}
```"#,
        html_rules(),
        instruction,
        code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormData {
        FormData {
            description: "dashboard".into(),
            theme: "dark blue".into(),
            responsiveness: "mobile-first".into(),
            extra_details: String::new(),
        }
    }

    #[test]
    fn extra_details_line_only_when_present() {
        let mut f = form();
        assert!(!layout_prompt(&f).contains("Extra Details"));
        f.extra_details = "add a map".into();
        assert!(layout_prompt(&f).contains("- Extra Details: add a map"));
    }

    #[test]
    fn code_prompt_carries_layout() {
        let p = code_prompt(&form(), "two columns");
        assert!(p.contains("- Layout Concept: two columns"));
        assert!(p.contains("- Color Theme: dark blue"));
    }

    #[test]
    fn refine_prompt_embeds_code_and_instruction() {
        let p = refine_prompt("<p>x</p>", "make it red");
        assert!(p.contains("\"make it red\""));
        assert!(p.contains("```html\n<p>x</p>\n```"));
    }
}
