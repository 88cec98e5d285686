use crate::cluster::{Cluster, ClusteringState};
use crate::config::SummaryBudget;
use crate::oracle::{ClusterDigest, MergeDecision, OracleGateway};
use crate::summary::cluster_digest;
use context_corpus::CodeElement;

/// Oracle-guided merge pass.
///
/// Pairs are visited in state order (`i < j`). When the oracle accepts a
/// merge, `j` is folded into `i` and the scan restarts from `i` against the
/// remaining clusters. Full passes repeat until one produces no merge.
/// Absorbed clusters are tombstoned, so positions never shift mid-scan.
pub async fn merge_pass(
    state: ClusteringState,
    elements: &[CodeElement],
    gateway: &OracleGateway,
    budget: &SummaryBudget,
) -> ClusteringState {
    let mut slots: Vec<Option<Cluster>> = state.into_clusters().into_iter().map(Some).collect();

    loop {
        let mut merges = 0usize;
        let mut i = 0;
        while i < slots.len() {
            match merge_partner(&slots, i, elements, gateway, budget).await {
                Some(j) => {
                    if let Some(absorbed) = slots[j].take() {
                        if let Some(keep) = slots[i].as_mut() {
                            log::debug!("Merging {} into {}", absorbed.id, keep.id);
                            keep.absorb(absorbed);
                        }
                    }
                    merges += 1;
                }
                None => i += 1,
            }
        }
        if merges == 0 {
            break;
        }
        log::debug!("Merge pass folded {merges} clusters");
    }

    slots.into_iter().flatten().collect()
}

/// First live cluster after `i` the oracle wants merged into `i`
async fn merge_partner(
    slots: &[Option<Cluster>],
    i: usize,
    elements: &[CodeElement],
    gateway: &OracleGateway,
    budget: &SummaryBudget,
) -> Option<usize> {
    let current = slots.get(i)?.as_ref()?;
    let digest_a = digest(current, elements, budget);
    for (j, slot) in slots.iter().enumerate().skip(i + 1) {
        let Some(candidate) = slot else { continue };
        let digest_b = digest(candidate, elements, budget);
        if gateway.decide_merge(&digest_a, &digest_b).await == MergeDecision::Merge {
            return Some(j);
        }
    }
    None
}

pub(crate) fn digest(cluster: &Cluster, elements: &[CodeElement], budget: &SummaryBudget) -> ClusterDigest {
    ClusterDigest {
        name: cluster.id.clone(),
        summary: cluster_digest(elements, cluster.members(), budget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OracleRetryConfig;
    use crate::test_support::ScriptedOracle;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn elements(n: usize) -> Vec<CodeElement> {
        (0..n)
            .map(|i| CodeElement::method(format!("m{i}"), format!("summary {i}")))
            .collect()
    }

    fn state() -> ClusteringState {
        [
            Cluster::new("A", [0, 1]),
            Cluster::new("B", [2]),
            Cluster::new("C", [3, 4]),
            Cluster::new("D", [5]),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn declining_oracle_leaves_state_untouched() {
        let oracle = Arc::new(ScriptedOracle::declining());
        let gateway = OracleGateway::new(oracle.clone(), OracleRetryConfig::default());
        let before = state();
        let after = merge_pass(before.clone(), &elements(6), &gateway, &SummaryBudget::default()).await;
        assert_eq!(after.signature(), before.signature());
        // every unordered pair asked exactly once
        assert_eq!(oracle.merge_questions().len(), 6);
    }

    #[tokio::test]
    async fn accepted_merge_restarts_scan_from_current_cluster() {
        let oracle = Arc::new(ScriptedOracle::declining().merge_when(|a, b| {
            (a == "A" && b == "C") || (a == "A" && b == "D")
        }));
        let gateway = OracleGateway::new(oracle.clone(), OracleRetryConfig::default());
        let after = merge_pass(state(), &elements(6), &gateway, &SummaryBudget::default()).await;

        let ids: Vec<_> = after.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(after.get("A").unwrap().members(), &[0, 1, 3, 4, 5]);
        assert!(after.is_partition_of(6));

        let asked = oracle.merge_questions();
        assert_eq!(
            &asked[..4],
            &[
                ("A".to_string(), "B".to_string()),
                ("A".to_string(), "C".to_string()),
                ("A".to_string(), "B".to_string()),
                ("A".to_string(), "D".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn always_yes_collapses_to_one_cluster() {
        let oracle = Arc::new(ScriptedOracle::declining().merge_when(|_, _| true));
        let gateway = OracleGateway::new(oracle, OracleRetryConfig::default());
        let after = merge_pass(state(), &elements(6), &gateway, &SummaryBudget::default()).await;
        assert_eq!(after.len(), 1);
        assert!(after.is_partition_of(6));
    }
}
