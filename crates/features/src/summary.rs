use crate::config::SummaryBudget;
use context_corpus::CodeElement;

/// Concatenate member summaries under a character budget.
///
/// Each member contributes at most `max_chars_per_member` characters; the
/// digest stops before the member that would push the total over
/// `max_chars_total`.
pub fn cluster_digest(elements: &[CodeElement], members: &[usize], budget: &SummaryBudget) -> String {
    let limit = budget.max_members.unwrap_or(usize::MAX);
    let mut out = Vec::new();
    let mut total = 0usize;
    for element in members
        .iter()
        .take(limit)
        .filter_map(|&index| elements.get(index))
    {
        let snippet = truncate_chars(&element.summary, budget.max_chars_per_member);
        let len = snippet.chars().count();
        if total + len > budget.max_chars_total {
            break;
        }
        out.push(snippet);
        total += len;
    }
    out.join("\n")
}

/// Rough token estimate: four characters per token
pub fn approx_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Prefix of at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Split texts into consecutive groups of at most `max_tokens` each; a single
/// oversized text still forms its own group
pub fn group_by_tokens(texts: &[String], max_tokens: usize) -> Vec<Vec<&str>> {
    let mut groups = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_tokens = 0usize;
    for text in texts {
        let tokens = approx_tokens(text);
        if current_tokens + tokens > max_tokens && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
        current.push(text);
        current_tokens += tokens;
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}
