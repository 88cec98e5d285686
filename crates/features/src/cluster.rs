use context_corpus::centroid;
use ndarray::{Array1, Array2};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Group of element indices under refinement
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Identifier; also the cluster's name while refinement runs
    pub id: String,

    /// Feature name, set by the naming phase
    pub name: Option<String>,

    members: Vec<usize>,
    centroid: Option<Array1<f32>>,
}

impl Cluster {
    /// Create a cluster; duplicate indices are dropped, first occurrence wins
    pub fn new(id: impl Into<String>, members: impl IntoIterator<Item = usize>) -> Self {
        let mut seen = HashSet::new();
        Self {
            id: id.into(),
            name: None,
            members: members.into_iter().filter(|m| seen.insert(*m)).collect(),
            centroid: None,
        }
    }

    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Append another cluster's members (skipping ones already present)
    pub fn absorb(&mut self, other: Cluster) {
        let present: HashSet<usize> = self.members.iter().copied().collect();
        self.members
            .extend(other.members.into_iter().filter(|m| !present.contains(m)));
        self.centroid = None;
    }

    /// Mean embedding of the members, computed on first use
    pub fn centroid(&mut self, embeddings: &Array2<f32>) -> Option<&Array1<f32>> {
        if self.centroid.is_none() {
            self.centroid = centroid(embeddings, &self.members);
        }
        self.centroid.as_ref()
    }
}

/// Ordered set of clusters; order drives every oracle enumeration
#[derive(Debug, Clone, Default)]
pub struct ClusteringState {
    clusters: Vec<Cluster>,
}

/// Cluster id -> member set, used to detect a stable state
pub type StateSignature = BTreeMap<String, BTreeSet<usize>>;

impl ClusteringState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One cluster per distinct label, named `<prefix>_<label>`, in label order
    pub fn from_labels(prefix: &str, labels: &[usize]) -> Self {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (element, &label) in labels.iter().enumerate() {
            groups.entry(label).or_default().push(element);
        }
        let mut state = Self::new();
        for (label, members) in groups {
            state.push(Cluster::new(format!("{prefix}_{label}"), members));
        }
        state
    }

    /// Append a cluster, suffixing its id if it is already taken
    pub fn push(&mut self, mut cluster: Cluster) {
        if self.get(&cluster.id).is_some() {
            let base = cluster.id.clone();
            let mut n = 2;
            while self.get(&format!("{base}_{n}")).is_some() {
                n += 1;
            }
            cluster.id = format!("{base}_{n}");
        }
        self.clusters.push(cluster);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cluster> {
        self.clusters.iter_mut()
    }

    #[must_use]
    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }

    /// Total number of member slots across clusters
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }

    /// True when every index in `0..n` appears in exactly one cluster
    #[must_use]
    pub fn is_partition_of(&self, n: usize) -> bool {
        let mut seen = vec![false; n];
        for member in self.clusters.iter().flat_map(|c| c.members.iter()) {
            match seen.get_mut(*member) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|s| s)
    }

    #[must_use]
    pub fn signature(&self) -> StateSignature {
        self.clusters
            .iter()
            .map(|c| (c.id.clone(), c.members.iter().copied().collect()))
            .collect()
    }
}

impl FromIterator<Cluster> for ClusteringState {
    fn from_iter<T: IntoIterator<Item = Cluster>>(iter: T) -> Self {
        let mut state = Self::new();
        for cluster in iter {
            state.push(cluster);
        }
        state
    }
}
