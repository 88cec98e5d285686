//! Prompt text for [`LlmOracle`](super::LlmOracle). Each builder fixes the
//! reply format the matching parser in `parse` expects.

use super::ClusterDigest;

pub fn summarize(text: &str) -> String {
    format!(
        "Below are summaries of methods and classes from one software project:\n\
         {text}\n\n\
         Combine them into a single cohesive summary of what this code does. \
         Describe major components and high-level behavior instead of repeating \
         individual details."
    )
}

pub fn propose_feature_names(summary: &str) -> String {
    format!(
        "Here is a high-level summary of a codebase:\n\n\
         {summary}\n\n\
         List the major features of this application.\n\
         - Only top-level, conceptual features: user-visible elements, major \
         system modules, building blocks of the application\n\
         - A short human-readable name for each, no implementation details\n\
         - No camel case or snake case identifiers\n\
         - One feature name per line and nothing else\n\n\
         Features:"
    )
}

pub fn refine_feature_name(raw: &str) -> String {
    format!(
        "A list of features contained this entry: {raw}\n\n\
         Rewrite it as one concise, conceptual feature name. Reply with the name only."
    )
}

pub fn decide_merge(a: &ClusterDigest, b: &ClusterDigest) -> String {
    format!(
        "Two groups of code were extracted from the same project.\n\n\
         Group A: \"{}\"\n\
         Summaries:\n{}\n\n\
         Group B: \"{}\"\n\
         Summaries:\n{}\n\n\
         Do both groups implement one and the same conceptual feature?\n\
         Reply with \"Yes\" or \"No\" only.",
        a.name, a.summary, b.name, b.summary
    )
}

pub fn decide_split(name: &str, summary: &str) -> String {
    format!(
        "Group: \"{name}\"\n\
         Summaries:\n{summary}\n\n\
         Does this group mix several distinct conceptual features? If it does, \
         say how many sub-groups it should become.\n\n\
         Reply in exactly one of these forms:\n\
         \"Split into X\"\n\
         \"No split needed\""
    )
}

pub fn name_cluster(summary: &str, known_features: &[String]) -> String {
    let known = if known_features.is_empty() {
        "None".to_string()
    } else {
        known_features
            .iter()
            .map(|f| format!("- {f}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "The summaries below belong to one high-level feature of an application.\n\n\
         Features already known for this application:\n{known}\n\n\
         Use them as anchors for the level of abstraction: user-visible elements, \
         major modules, conceptual building blocks. If the group clearly matches a \
         known feature you may reuse that name; otherwise pick a new name at the \
         same level.\n\
         - Exactly one short, human-readable name\n\
         - No lists or alternatives\n\
         - No code identifiers, camel case or underscores\n\n\
         Summaries:\n{summary}\n\n\
         Feature name:"
    )
}
