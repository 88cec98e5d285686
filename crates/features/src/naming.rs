use crate::cluster::ClusteringState;
use crate::config::SummaryBudget;
use crate::feature_map::FeatureMap;
use crate::merge::digest;
use crate::oracle::OracleGateway;
use context_corpus::CodeElement;

/// Placeholder for a cluster the oracle could not name
pub fn placeholder_name(position: usize) -> String {
    format!("Feature_{position}")
}

/// Ask the oracle for a name for every cluster, in state order.
///
/// A failed or empty answer leaves a positional placeholder.
pub async fn name_clusters(
    state: &mut ClusteringState,
    elements: &[CodeElement],
    gateway: &OracleGateway,
    budget: &SummaryBudget,
    known_features: &[String],
) {
    for (position, cluster) in state.iter_mut().enumerate() {
        let d = digest(cluster, elements, budget);
        let name = match gateway.name_cluster(&d.summary, known_features).await {
            Some(name) => name,
            None => {
                let placeholder = placeholder_name(position);
                log::warn!("Could not name {}; using {placeholder}", cluster.id);
                placeholder
            }
        };
        log::debug!("{} -> {name} ({} members)", cluster.id, cluster.len());
        cluster.name = Some(name);
    }
}

/// Keep each cluster's id as its feature name
pub fn adopt_ids_as_names(state: &mut ClusteringState) {
    for cluster in state.iter_mut() {
        cluster.name = Some(cluster.id.clone());
    }
}

/// Render named clusters to public identifiers.
///
/// Clusters sharing a name share one entry; an unnamed cluster is keyed by
/// its id.
pub fn render_feature_map(state: &ClusteringState, elements: &[CodeElement]) -> FeatureMap {
    let mut features = FeatureMap::new();
    for cluster in state.iter() {
        let name = cluster.name.as_deref().unwrap_or(&cluster.id);
        let members = cluster
            .members()
            .iter()
            .filter_map(|&index| elements.get(index).map(|e| e.public_id(index)));
        features.insert_members(name, members);
    }
    features
}

/// Name every cluster through the oracle, then render the map
pub async fn assemble_feature_map(
    state: &mut ClusteringState,
    elements: &[CodeElement],
    gateway: &OracleGateway,
    budget: &SummaryBudget,
    known_features: &[String],
) -> FeatureMap {
    name_clusters(state, elements, gateway, budget, known_features).await;
    render_feature_map(state, elements)
}
