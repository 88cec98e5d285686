use super::{prompts, ClusterDigest, Oracle};
use crate::error::Result;
use async_trait::async_trait;

/// Single-turn text completion backend
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// [`Oracle`] that turns every question into one chat completion
pub struct LlmOracle<M> {
    model: M,
}

impl<M: ChatModel> LlmOracle<M> {
    pub const fn new(model: M) -> Self {
        Self { model }
    }

    async fn ask(&self, prompt: String) -> Result<String> {
        log::trace!("Oracle prompt ({} chars)", prompt.len());
        let answer = self.model.complete(&prompt).await?;
        Ok(answer.trim().to_string())
    }
}

#[async_trait]
impl<M: ChatModel> Oracle for LlmOracle<M> {
    async fn summarize(&self, text: &str) -> Result<String> {
        self.ask(prompts::summarize(text)).await
    }

    async fn propose_feature_names(&self, summary: &str) -> Result<String> {
        self.ask(prompts::propose_feature_names(summary)).await
    }

    async fn refine_feature_name(&self, raw: &str) -> Result<String> {
        self.ask(prompts::refine_feature_name(raw)).await
    }

    async fn decide_merge(&self, a: &ClusterDigest, b: &ClusterDigest) -> Result<String> {
        self.ask(prompts::decide_merge(a, b)).await
    }

    async fn decide_split(&self, name: &str, summary: &str) -> Result<String> {
        self.ask(prompts::decide_split(name, summary)).await
    }

    async fn name_cluster(&self, summary: &str, known_features: &[String]) -> Result<String> {
        self.ask(prompts::name_cluster(summary, known_features)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatureError;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        prompts: Mutex<Vec<String>>,
        reply: String,
    }

    #[async_trait]
    impl ChatModel for Recording {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl ChatModel for Broken {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(FeatureError::oracle("503 Service Unavailable"))
        }
    }

    #[tokio::test]
    async fn forwards_prompt_and_trims_reply() {
        let oracle = LlmOracle::new(Recording {
            reply: "  Split into 2 \n".into(),
            ..Default::default()
        });
        let answer = oracle.decide_split("Cluster_3", "parses input").await.unwrap();
        assert_eq!(answer, "Split into 2");

        let prompts = oracle.model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Cluster_3"));
        assert!(prompts[0].contains("parses input"));
    }

    #[tokio::test]
    async fn naming_prompt_includes_known_features() {
        let oracle = LlmOracle::new(Recording {
            reply: "Scoring".into(),
            ..Default::default()
        });
        let known = vec!["Leaderboard".to_string()];
        oracle.name_cluster("keeps score", &known).await.unwrap();
        assert!(oracle.model.prompts.lock().unwrap()[0].contains("- Leaderboard"));
    }

    #[tokio::test]
    async fn backend_errors_propagate() {
        let oracle = LlmOracle::new(Broken);
        let err = oracle.summarize("x").await.unwrap_err();
        assert!(matches!(err, FeatureError::OracleUnavailable(_)));
    }
}
