use super::{MergeDecision, SplitDecision};
use regex::Regex;
use std::sync::OnceLock;

fn split_directive() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)^["'`*\s]*split\s+into\s+(\d+)"#).ok())
        .as_ref()
}

fn list_marker() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-*•#>]+|\d+[.)])\s*").ok())
        .as_ref()
}

const NAME_TRIM: &[char] = &[' ', '\t', '-', '*', '#', ':', '"', '\'', '`', '•', '.'];

/// Anything not starting with "yes" keeps the clusters apart
pub fn parse_merge(answer: &str) -> MergeDecision {
    let normalized = answer
        .trim()
        .trim_start_matches(['"', '\'', '`', '*'])
        .to_lowercase();
    if normalized.starts_with("yes") {
        MergeDecision::Merge
    } else {
        MergeDecision::Keep
    }
}

/// `split into N` with `N > 1` splits; everything else keeps the cluster
pub fn parse_split(answer: &str) -> SplitDecision {
    let Some(re) = split_directive() else {
        return SplitDecision::Keep;
    };
    re.captures(answer.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|n| n.as_str().parse::<usize>().ok())
        .filter(|&n| n > 1)
        .map_or(SplitDecision::Keep, SplitDecision::Into)
}

/// First non-empty line with list markers and decoration removed
pub fn clean_name(answer: &str) -> Option<String> {
    answer.lines().find_map(clean_line)
}

/// One cleaned feature name per non-empty line
pub fn parse_proposals(answer: &str) -> Vec<String> {
    answer.lines().filter_map(clean_line).collect()
}

fn clean_line(line: &str) -> Option<String> {
    let stripped = match list_marker() {
        Some(re) => re.replace(line, "").into_owned(),
        None => line.to_string(),
    };
    let name = stripped.trim_matches(NAME_TRIM).trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_accepts_only_yes() {
        assert_eq!(parse_merge("Yes"), MergeDecision::Merge);
        assert_eq!(parse_merge("  yes, they overlap"), MergeDecision::Merge);
        assert_eq!(parse_merge("\"Yes\""), MergeDecision::Merge);
        assert_eq!(parse_merge("No"), MergeDecision::Keep);
        assert_eq!(parse_merge("Maybe yes"), MergeDecision::Keep);
        assert_eq!(parse_merge(""), MergeDecision::Keep);
    }

    #[test]
    fn split_parses_directive() {
        assert_eq!(parse_split("Split into 3"), SplitDecision::Into(3));
        assert_eq!(parse_split("split into 2 clusters"), SplitDecision::Into(2));
        assert_eq!(parse_split("\"Split into 4\""), SplitDecision::Into(4));
    }

    #[test]
    fn malformed_split_answers_keep_cluster() {
        assert_eq!(parse_split("No split needed"), SplitDecision::Keep);
        assert_eq!(parse_split("Split into 1"), SplitDecision::Keep);
        assert_eq!(parse_split("Split into many"), SplitDecision::Keep);
        assert_eq!(parse_split("I would split into 3"), SplitDecision::Keep);
        assert_eq!(parse_split("split into 99999999999999999999999"), SplitDecision::Keep);
    }

    #[test]
    fn clean_name_takes_first_meaningful_line() {
        assert_eq!(clean_name("\n\n- **Game Board**\nextra"), Some("Game Board".to_string()));
        assert_eq!(clean_name("1. Move Validation"), Some("Move Validation".to_string()));
        assert_eq!(clean_name("\"Player Profiles\""), Some("Player Profiles".to_string()));
        assert_eq!(clean_name("  \n --- \n"), None);
    }

    #[test]
    fn proposals_strip_bullets() {
        let proposals = parse_proposals("- Game Board\n* Scoring\n\n2) Save Files\n");
        assert_eq!(proposals, vec!["Game Board", "Scoring", "Save Files"]);
    }
}
