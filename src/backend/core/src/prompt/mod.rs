//! Prompt generation and refinement.
//!
//! Generation wraps the user's text in a per-category template. Refinement
//! appends instruction sentences chosen by tone and complexity, each recorded
//! as an improvement. Both operations are pure.

use tracing::debug;

use crate::types::{estimate_tokens, Complexity, IntentCategory, ModelName, PromptGeneration, Tone};

/// Separator placed before every appended instruction.
const SECTION_BREAK: &str = "\n\n";

const DETAILED_EXTRA: &str = "Please include specific examples and step-by-step explanations.";
const TECHNICAL_EXTRA: &str = "Please use technical terminology and provide technical context.";
const QUESTION_EXTRA: &str =
    "Please structure your response clearly and address all aspects of the question.";

/// Template prefix for a category; the user's text follows directly.
pub const fn template_prefix(category: IntentCategory) -> &'static str {
    match category {
        IntentCategory::CreativeWriting => "You are a creative writer. Please help me with: ",
        IntentCategory::CodeGeneration => "You are a software developer. Please write code for: ",
        IntentCategory::DataAnalysis => "You are a data analyst. Please analyze: ",
        IntentCategory::ContentSummarization => "Please provide a concise summary of: ",
        IntentCategory::Translation => "Please translate the following text: ",
        IntentCategory::QuestionAnswering => "Please answer this question: ",
        IntentCategory::Brainstorming => "Please help me brainstorm ideas for: ",
        IntentCategory::ProblemSolving => "Please help me solve this problem: ",
        IntentCategory::Other => "Please help me with: ",
    }
}

/// Tone instruction; casual adds nothing.
const fn tone_instruction(tone: Tone) -> Option<&'static str> {
    match tone {
        Tone::Professional => Some("Please provide a professional, formal response."),
        Tone::Creative => Some("Please provide a creative, imaginative response."),
        Tone::Technical => Some("Please provide a detailed, technical response."),
        Tone::Casual => None,
    }
}

const fn complexity_instruction(complexity: Complexity) -> &'static str {
    match complexity {
        Complexity::Simple => "Please keep the response simple and easy to understand.",
        Complexity::Detailed => "Please provide a comprehensive, detailed response.",
    }
}

/// Builds and refines prompts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptEngineer;

impl PromptEngineer {
    pub fn new() -> Self {
        Self
    }

    /// Build the initial prompt for `user_input`.
    ///
    /// The target model does not change the template today; it is accepted so
    /// callers pass the full pipeline context.
    pub fn generate(
        &self,
        model: ModelName,
        category: IntentCategory,
        user_input: &str,
    ) -> PromptGeneration {
        let raw_prompt = format!("{}{}", template_prefix(category), user_input);
        let estimated_tokens = estimate_tokens(&raw_prompt);

        debug!(model = %model, category = %category, estimated_tokens, "Generated prompt");

        PromptGeneration {
            optimized_prompt: raw_prompt.clone(),
            raw_prompt,
            improvements: vec!["Initial prompt generated".to_string()],
            estimated_tokens,
        }
    }

    /// Append tone and complexity instructions to `prompt`.
    ///
    /// `raw_prompt` of the result is exactly `prompt`, so refinements compose.
    pub fn refine(&self, prompt: &str, tone: Tone, complexity: Complexity) -> PromptGeneration {
        let mut refined = Refinement::new(prompt);

        if let Some(instruction) = tone_instruction(tone) {
            refined.append(instruction, format!("Applied {} tone", tone));
        }

        refined.append(
            complexity_instruction(complexity),
            format!("Applied {} complexity level", complexity),
        );

        if complexity == Complexity::Detailed {
            refined.append(DETAILED_EXTRA, "Added detailed instruction");
        }

        if tone == Tone::Technical {
            refined.append(TECHNICAL_EXTRA, "Added technical context instruction");
        }

        if prompt.contains('?') {
            refined.append(QUESTION_EXTRA, "Enhanced question structure");
        }

        let result = refined.finish(prompt);
        debug!(
            tone = %tone,
            complexity = %complexity,
            improvements = result.improvements.len(),
            "Refined prompt"
        );
        result
    }
}

/// Accumulates appended instructions.
struct Refinement {
    text: String,
    improvements: Vec<String>,
}

impl Refinement {
    fn new(prompt: &str) -> Self {
        Self {
            text: prompt.to_string(),
            improvements: Vec::new(),
        }
    }

    fn append(&mut self, sentence: &str, improvement: impl Into<String>) {
        self.text.push_str(SECTION_BREAK);
        self.text.push_str(sentence);
        self.improvements.push(improvement.into());
    }

    fn finish(self, raw: &str) -> PromptGeneration {
        PromptGeneration {
            raw_prompt: raw.to_string(),
            estimated_tokens: estimate_tokens(&self.text),
            optimized_prompt: self.text,
            improvements: self.improvements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uses_category_template() {
        let engineer = PromptEngineer::new();
        let result = engineer.generate(
            ModelName::Gpt4o,
            IntentCategory::CodeGeneration,
            "a fibonacci function",
        );
        assert_eq!(
            result.raw_prompt,
            "You are a software developer. Please write code for: a fibonacci function"
        );
        assert_eq!(result.optimized_prompt, result.raw_prompt);
        assert_eq!(result.improvements, vec!["Initial prompt generated"]);
        assert_eq!(result.estimated_tokens, estimate_tokens(&result.raw_prompt));
    }

    #[test]
    fn test_translation_prompt_estimate() {
        let result = PromptEngineer::new().generate(
            ModelName::Gpt4oMini,
            IntentCategory::Translation,
            "Hello",
        );
        assert_eq!(result.raw_prompt, "Please translate the following text: Hello");
        // 42 chars
        assert_eq!(result.estimated_tokens, 11);
        assert_eq!(result.estimated_tokens, result.raw_prompt.chars().count().div_ceil(4));
    }

    #[test]
    fn test_every_category_has_template() {
        let engineer = PromptEngineer::new();
        for category in IntentCategory::ALL {
            let result = engineer.generate(ModelName::Gpt35Turbo, category, "x");
            assert!(result.raw_prompt.ends_with(": x"), "{}", category);
        }
    }

    #[test]
    fn test_refine_full_sequence_order() {
        let result = PromptEngineer::new().refine(
            "How do I sort a list?",
            Tone::Technical,
            Complexity::Detailed,
        );
        assert_eq!(
            result.improvements,
            vec![
                "Applied technical tone",
                "Applied detailed complexity level",
                "Added detailed instruction",
                "Added technical context instruction",
                "Enhanced question structure",
            ]
        );
        assert_eq!(result.raw_prompt, "How do I sort a list?");
        assert_eq!(
            result.optimized_prompt,
            "How do I sort a list?\
             \n\nPlease provide a detailed, technical response.\
             \n\nPlease provide a comprehensive, detailed response.\
             \n\nPlease include specific examples and step-by-step explanations.\
             \n\nPlease use technical terminology and provide technical context.\
             \n\nPlease structure your response clearly and address all aspects of the question."
        );
        assert_eq!(result.estimated_tokens, estimate_tokens(&result.optimized_prompt));
    }

    #[test]
    fn test_casual_simple_adds_one_instruction() {
        let result = PromptEngineer::new().refine("Tell me a joke", Tone::Casual, Complexity::Simple);
        assert_eq!(result.improvements, vec!["Applied simple complexity level"]);
        assert_eq!(
            result.optimized_prompt,
            "Tell me a joke\n\nPlease keep the response simple and easy to understand."
        );
    }

    #[test]
    fn test_refine_composes() {
        let engineer = PromptEngineer::new();
        let first = engineer.refine("Explain DNS", Tone::Professional, Complexity::Simple);
        let second = engineer.refine(&first.optimized_prompt, Tone::Creative, Complexity::Simple);
        assert_eq!(second.raw_prompt, first.optimized_prompt);
        assert!(second.optimized_prompt.starts_with(&first.optimized_prompt));
    }
}
