//! Radiology prompts for vision-model scan analysis.
//!
//! The wording steers the model toward the vocabulary the keyword extractor
//! recognizes (modality, body part, severity words, "Impression:").

/// System prompt for scan analysis.
pub const SYSTEM_PROMPT: &str = r#"You are a radiology assistant that describes medical images for a clinician.

Describe the image in plain prose:
- Modality: state whether it is an X-ray, CT scan, MRI or ultrasound
- Body part: name the anatomical region shown
- Findings: describe each abnormality (lesion, mass, fracture, inflammation, etc.)
- Severity: qualify findings as mild, moderate, significant or severe
- Impression: end with a one-sentence summary starting with "Impression:"
- Recommendation: suggest follow-up starting with "Recommendation:"

If the image looks normal, say so plainly. Do not invent findings."#;

/// User prompt for analyzing one image.
pub fn make_analysis_prompt(hint: Option<&str>) -> String {
    let mut prompt = String::from("Analyze this medical image and describe your findings.");
    if let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) {
        prompt.push_str(&format!("\n\nClinical context from the requesting clinician: \"{}\"", hint));
    }
    prompt
}

/// User prompt for a follow-up question about a previous analysis.
pub fn make_question_prompt(analysis: &str, question: &str) -> String {
    format!(
        r#"Here is an earlier analysis of a medical image:

"{}"

Answer the following question using only that analysis. If the analysis does not
contain the answer, say so.

Question: {}"#,
        analysis, question
    )
}

/// Example analysis showing the expected register.
pub const FEW_SHOT_EXAMPLE: &str = "Chest X-ray, frontal view. There is a moderate area of \
consolidation in the right lower lung consistent with pneumonia. Heart size is normal. \
Impression: moderate right lower lobe pneumonia. Recommendation: follow-up X-ray in 2 weeks.";

/// Build a complete prompt with system context and an optional example.
pub fn build_full_prompt(hint: Option<&str>, include_example: bool) -> String {
    let mut prompt = String::new();

    // System context
    prompt.push_str("<|system|>\n");
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n<|end|>\n");

    if include_example {
        prompt.push_str("<|user|>\n");
        prompt.push_str(&make_analysis_prompt(None));
        prompt.push_str("\n<|end|>\n");
        prompt.push_str("<|assistant|>\n");
        prompt.push_str(FEW_SHOT_EXAMPLE);
        prompt.push_str("\n<|end|>\n");
    }

    // Actual request
    prompt.push_str("<|user|>\n");
    prompt.push_str(&make_analysis_prompt(hint));
    prompt.push_str("\n<|end|>\n");
    prompt.push_str("<|assistant|>\n");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_with_hint() {
        let prompt = make_analysis_prompt(Some("  persistent cough  "));
        assert!(prompt.contains("\"persistent cough\""));
    }

    #[test]
    fn test_analysis_prompt_blank_hint_ignored() {
        assert_eq!(make_analysis_prompt(Some("   ")), make_analysis_prompt(None));
    }

    #[test]
    fn test_question_prompt() {
        let prompt = make_question_prompt("Knee X-ray shows a fracture.", "Is surgery needed?");
        assert!(prompt.contains("Knee X-ray shows a fracture."));
        assert!(prompt.ends_with("Question: Is surgery needed?"));
    }

    #[test]
    fn test_full_prompt_with_example() {
        let prompt = build_full_prompt(Some("fall from ladder"), true);
        assert!(prompt.starts_with("<|system|>"));
        assert!(prompt.contains("radiology assistant"));
        assert!(prompt.contains("pneumonia")); // From example
        assert!(prompt.contains("fall from ladder"));
        assert!(prompt.ends_with("<|assistant|>\n"));
    }

    #[test]
    fn test_full_prompt_without_example() {
        let prompt = build_full_prompt(None, false);
        assert!(!prompt.contains(FEW_SHOT_EXAMPLE));
        assert_eq!(prompt.matches("<|user|>").count(), 1);
    }
}
