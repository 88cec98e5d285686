#![allow(dead_code)]

use async_trait::async_trait;
use context_corpus::{CodeElement, CorpusError, CorpusSnapshot, Embedder};
use context_features::{ClusterDigest, FeatureError, Oracle, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

type MergeRule = Box<dyn Fn(&ClusterDigest, &ClusterDigest) -> bool + Send + Sync>;
type SplitRule = Box<dyn Fn(&str) -> Option<usize> + Send + Sync>;
type NameRule = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Oracle answering from closures; a rule returning `None` fails the call
pub struct ScriptedOracle {
    merge: MergeRule,
    split: SplitRule,
    name: NameRule,
    proposals: String,
    calls: AtomicUsize,
    names_asked: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    /// "No" to every merge and split; names a cluster after the first word
    /// of its first member summary
    pub fn declining() -> Self {
        Self {
            merge: Box::new(|_, _| false),
            split: Box::new(|_| None),
            name: Box::new(|summary| summary.split_whitespace().next().map(capitalize)),
            proposals: String::new(),
            calls: AtomicUsize::new(0),
            names_asked: Mutex::new(Vec::new()),
        }
    }

    pub fn merge_when(
        mut self,
        rule: impl Fn(&ClusterDigest, &ClusterDigest) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.merge = Box::new(rule);
        self
    }

    pub fn split_when(mut self, rule: impl Fn(&str) -> Option<usize> + Send + Sync + 'static) -> Self {
        self.split = Box::new(rule);
        self
    }

    pub fn name_with(mut self, rule: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.name = Box::new(rule);
        self
    }

    pub fn proposals(mut self, answer: &str) -> Self {
        self.proposals = answer.to_string();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn names_asked(&self) -> Vec<String> {
        self.names_asked.lock().unwrap().clone()
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn summarize(&self, text: &str) -> Result<String> {
        self.tick();
        Ok(format!("A codebase with {} lines of summaries", text.lines().count()))
    }

    async fn propose_feature_names(&self, _summary: &str) -> Result<String> {
        self.tick();
        Ok(self.proposals.clone())
    }

    async fn refine_feature_name(&self, raw: &str) -> Result<String> {
        self.tick();
        Ok(raw.to_string())
    }

    async fn decide_merge(&self, a: &ClusterDigest, b: &ClusterDigest) -> Result<String> {
        self.tick();
        Ok(if (self.merge)(a, b) { "Yes" } else { "No" }.to_string())
    }

    async fn decide_split(&self, name: &str, _summary: &str) -> Result<String> {
        self.tick();
        Ok(match (self.split)(name) {
            Some(n) => format!("Split into {n}"),
            None => "No split needed".to_string(),
        })
    }

    async fn name_cluster(&self, summary: &str, _known: &[String]) -> Result<String> {
        self.tick();
        self.names_asked.lock().unwrap().push(summary.to_string());
        (self.name)(summary).ok_or_else(|| FeatureError::oracle("naming backend down"))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Embedder with a fixed vocabulary
pub struct TableEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub fn new<const N: usize>(entries: [(&str, Vec<f32>); N]) -> Self {
        Self {
            vectors: entries
                .into_iter()
                .map(|(name, vector)| (name.to_string(), vector))
                .collect(),
        }
    }
}

#[async_trait]
impl Embedder for TableEmbedder {
    async fn embed(&self, text: &str) -> context_corpus::Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| CorpusError::EmbeddingError(format!("unknown text: {text}")))
    }
}

/// `per_group` "alpha" elements near the x axis followed by `per_group`
/// "beta" elements near the y axis
pub fn two_groups(per_group: usize) -> CorpusSnapshot {
    let mut elements = Vec::new();
    let mut rows = Vec::new();
    for i in 0..per_group {
        let jitter = 0.05 * i as f32;
        elements.push(CodeElement::method(format!("alpha_{i}"), format!("alpha handler {i}")));
        rows.push(vec![1.0, jitter, 0.02]);
    }
    for i in 0..per_group {
        let jitter = 0.05 * i as f32;
        elements.push(CodeElement::method(format!("beta_{i}"), format!("beta handler {i}")));
        rows.push(vec![jitter, 1.0, 0.02]);
    }
    CorpusSnapshot::from_rows(elements, rows).unwrap()
}

/// `groups` tight groups of `per_group` elements, one per axis
pub fn axis_groups(groups: usize, per_group: usize) -> CorpusSnapshot {
    let mut elements = Vec::new();
    let mut rows = Vec::new();
    for g in 0..groups {
        for i in 0..per_group {
            let mut row = vec![0.0; groups];
            row[g] = 1.0;
            row[(g + 1) % groups] = 0.03 * i as f32;
            elements.push(CodeElement::method(format!("g{g}_m{i}"), format!("group{g} item {i}")));
            rows.push(row);
        }
    }
    CorpusSnapshot::from_rows(elements, rows).unwrap()
}
