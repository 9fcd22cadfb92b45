//! Dense modularity matrix with a mutable community assignment

use crate::error::{GraphError, Result};
use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView2};

/// Graph model owned by the optimization engine during a run
///
/// The modularity matrix is built once and never mutated afterwards. Only the
/// community assignment changes, through [`perform_split`] and
/// [`delete_community_if_empty`].
///
/// [`perform_split`]: ModularityGraph::perform_split
/// [`delete_community_if_empty`]: ModularityGraph::delete_community_if_empty
#[derive(Debug, Clone)]
pub struct ModularityGraph {
    /// Symmetric N x N kernel, entry (i, j) is the gain of co-placing i and j
    modularity_matrix: Array2<f64>,

    /// Weight of the null-model term used at construction
    modularity_resolution: f64,

    /// Whether the source graph was directed
    is_directed: bool,

    /// Community label per vertex
    communities: Vec<usize>,

    /// Number of distinct labels in `communities`
    number_of_communities: usize,
}

impl ModularityGraph {
    /// Graph without vertices, returned for rejected input
    pub fn empty() -> Self {
        Self::from_parts(Array2::zeros((0, 0)), 1.0, false)
    }

    /// Wrap an already symmetric modularity matrix
    pub(crate) fn from_parts(
        modularity_matrix: Array2<f64>,
        modularity_resolution: f64,
        is_directed: bool,
    ) -> Self {
        Self {
            modularity_matrix,
            modularity_resolution,
            is_directed,
            communities: Vec::new(),
            number_of_communities: 0,
        }
    }

    /// Number of vertices
    pub fn size(&self) -> usize {
        self.modularity_matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_directed(&self) -> bool {
        self.is_directed
    }

    pub fn modularity_resolution(&self) -> f64 {
        self.modularity_resolution
    }

    pub fn number_of_communities(&self) -> usize {
        self.number_of_communities
    }

    pub fn communities(&self) -> &[usize] {
        &self.communities
    }

    pub fn modularity_matrix(&self) -> ArrayView2<'_, f64> {
        self.modularity_matrix.view()
    }

    /// Install a community assignment, counting labels when `number` is `None`
    pub fn set_communities(&mut self, labels: Vec<usize>, number: Option<usize>) -> Result<()> {
        if labels.len() != self.size() {
            return Err(GraphError::LengthMismatch {
                expected: self.size(),
                found: labels.len(),
            });
        }
        self.number_of_communities =
            number.unwrap_or_else(|| labels.iter().max().map_or(0, |&max| max + 1));
        self.communities = labels;
        Ok(())
    }

    /// Put every vertex into community 0
    pub fn assign_single_community(&mut self) {
        self.communities = vec![0; self.size()];
        self.number_of_communities = usize::from(!self.is_empty());
    }

    /// Sum of modularity entries over all same-community pairs
    pub fn modularity(&self) -> f64 {
        let mut modularity = 0.0;
        for (i, &ci) in self.communities.iter().enumerate() {
            for (j, &cj) in self.communities.iter().enumerate() {
                if ci == cj {
                    modularity += self.modularity_matrix[[i, j]];
                }
            }
        }
        modularity
    }

    /// Vertices labeled `community`, in index order
    pub fn community_indices(&self, community: usize) -> Vec<usize> {
        self.communities
            .iter()
            .positions(|&label| label == community)
            .collect()
    }

    pub fn is_community_empty(&self, community: usize) -> bool {
        !self.communities.contains(&community)
    }

    /// Principal submatrix over `indices`, as an owned scratch copy
    pub fn modularity_submatrix(&self, indices: &[usize]) -> Array2<f64> {
        let n = indices.len();
        Array2::from_shape_fn((n, n), |(i, j)| {
            self.modularity_matrix[[indices[i], indices[j]]]
        })
    }

    /// Pull exerted by the destination vertices on each origin vertex
    pub fn correction_vector(&self, origin: &[usize], destination: &[usize]) -> Array1<f64> {
        origin
            .iter()
            .map(|&i| {
                destination
                    .iter()
                    .map(|&d| self.modularity_matrix[[d, i]])
                    .sum::<f64>()
            })
            .collect()
    }

    /// Move every origin vertex flagged in `to_be_moved` into `destination`
    ///
    /// `to_be_moved` is indexed by vertex. A destination equal to the current
    /// community count opens a new community; anything beyond is clamped to it.
    pub fn perform_split(&mut self, origin: usize, destination: usize, to_be_moved: &[bool]) {
        let destination = destination.min(self.number_of_communities);
        if destination == self.number_of_communities {
            self.number_of_communities += 1;
        }
        for (label, &moved) in self.communities.iter_mut().zip(to_be_moved) {
            if *label == origin && moved {
                *label = destination;
            }
        }
    }

    /// Remove `community` if it has no members, shifting higher labels down
    pub fn delete_community_if_empty(&mut self, community: usize) -> bool {
        if !self.is_community_empty(community) {
            return false;
        }
        for label in self.communities.iter_mut() {
            if *label > community {
                *label -= 1;
            }
        }
        self.number_of_communities = self.communities.iter().unique().count();
        true
    }

    /// Labels cover exactly `0..number_of_communities`
    pub fn has_dense_labels(&self) -> bool {
        let mut seen = vec![false; self.number_of_communities];
        for &label in &self.communities {
            match seen.get_mut(label) {
                Some(flag) => *flag = true,
                None => return false,
            }
        }
        seen.into_iter().all(|flag| flag)
    }
}
