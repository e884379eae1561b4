pub const CORRECTED_MARKER: &str = "Corrected text:";
pub const EXPLANATIONS_MARKER: &str = "Explanations:";

/// Low temperature keeps the model from rewriting the diary creatively.
pub const TEMPERATURE: f32 = 0.3;

pub fn build_prompt(text: &str) -> String {
    format!(
        "Please check the following English text for grammar and spelling errors. \n\
         Provide corrections and explanations in the following format:\n\
         {CORRECTED_MARKER} [The corrected version of the entire text]\n\
         {EXPLANATIONS_MARKER}\n\
         - [First correction explanation]\n\
         - [Second correction explanation]\n\
         etc.\n\
         \n\
         Text to check:\n\
         {text}"
    )
}
