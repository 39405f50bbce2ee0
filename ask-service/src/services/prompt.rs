/// Build the single prompt sent to the model.
///
/// Layout is fixed: a `Portfolio content:` label, the page text, a blank
/// line, then `Question: ` and the question. Inputs are inserted verbatim.
pub fn compose_prompt(page_content: &str, question: &str) -> String {
    format!("Portfolio content:\n{}\n\nQuestion: {}", page_content, question)
}
