//! Groups similar records into clusters using transitive relationships.
//!
//! If A matches B and B matches C, then {A, B, C} forms a single cluster
//! even if A doesn't directly match C.

use super::{MatchType, SimilarPair, SimilarityCluster};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Disjoint-set forest over dense indices
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    /// Root of `x`, compressing the path on the way
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
    }
}

/// Groups similar pairs into clusters
#[derive(Debug, Default)]
pub struct TransitiveGrouper;

impl TransitiveGrouper {
    /// Create a new transitive grouper
    pub fn new() -> Self {
        Self
    }

    /// Group pairs into clusters of two or more members.
    ///
    /// Members are sorted by path and clusters by their first member, so
    /// the result does not depend on pair order.
    pub fn group(&self, pairs: &[SimilarPair]) -> Vec<SimilarityCluster> {
        if pairs.is_empty() {
            return Vec::new();
        }

        let mut index: HashMap<&Path, usize> = HashMap::new();
        let mut paths: Vec<&Path> = Vec::new();

        let mut edges = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let a = intern(&pair.a, &mut index, &mut paths);
            let b = intern(&pair.b, &mut index, &mut paths);
            edges.push((a, b, pair));
        }

        let mut sets = DisjointSet::new(paths.len());
        for &(a, b, _) in &edges {
            sets.union(a, b);
        }

        let mut members: HashMap<usize, Vec<PathBuf>> = HashMap::new();
        for (id, path) in paths.iter().enumerate() {
            members
                .entry(sets.find(id))
                .or_default()
                .push(path.to_path_buf());
        }

        // Distance total, edge count and best match per root
        let mut stats: HashMap<usize, (u64, usize, MatchType)> = HashMap::new();
        for &(a, _, pair) in &edges {
            let entry = stats
                .entry(sets.find(a))
                .or_insert((0, 0, MatchType::MaybeSimilar));
            entry.0 += pair.distance as u64;
            entry.1 += 1;
            if pair.match_type < entry.2 {
                entry.2 = pair.match_type;
            }
        }

        let mut clusters: Vec<SimilarityCluster> = members
            .into_iter()
            .filter(|(_, group)| group.len() > 1)
            .map(|(root, mut group)| {
                group.sort();
                let (total, count, match_type) = stats
                    .get(&root)
                    .copied()
                    .unwrap_or((0, 0, MatchType::Similar));

                SimilarityCluster {
                    members: group,
                    average_distance: if count > 0 {
                        total as f64 / count as f64
                    } else {
                        0.0
                    },
                    match_type,
                }
            })
            .collect();

        clusters.sort_by(|a, b| a.members.cmp(&b.members));
        clusters
    }
}

/// Dense id for `path`, assigning the next free one on first sight
fn intern<'p>(
    path: &'p Path,
    index: &mut HashMap<&'p Path, usize>,
    paths: &mut Vec<&'p Path>,
) -> usize {
    if let Some(&id) = index.get(path) {
        return id;
    }
    paths.push(path);
    index.insert(path, paths.len() - 1);
    paths.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_pair(a: &str, b: &str, distance: u32) -> SimilarPair {
        SimilarPair {
            a: PathBuf::from(a),
            b: PathBuf::from(b),
            distance,
            match_type: MatchType::from_distance(distance),
        }
    }

    #[test]
    fn empty_pairs_returns_empty() {
        assert!(TransitiveGrouper::new().group(&[]).is_empty());
    }

    #[test]
    fn single_pair_creates_single_cluster() {
        let clusters = TransitiveGrouper::new().group(&[create_pair("/a.jpg", "/b.jpg", 0)]);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 2);
        assert_eq!(clusters[0].match_type, MatchType::Exact);
    }

    #[test]
    fn transitive_grouping() {
        let pairs = vec![
            create_pair("/a.jpg", "/b.jpg", 2),
            create_pair("/b.jpg", "/c.jpg", 4),
        ];

        let clusters = TransitiveGrouper::new().group(&pairs);

        assert_eq!(clusters.len(), 1);
        assert_eq!(
            clusters[0].members,
            vec![
                PathBuf::from("/a.jpg"),
                PathBuf::from("/b.jpg"),
                PathBuf::from("/c.jpg")
            ]
        );
        assert_eq!(clusters[0].average_distance, 3.0);
    }

    #[test]
    fn disjoint_pairs_create_separate_clusters() {
        let pairs = vec![
            create_pair("/c.jpg", "/d.jpg", 0),
            create_pair("/a.jpg", "/b.jpg", 0),
        ];

        let clusters = TransitiveGrouper::new().group(&pairs);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members[0], PathBuf::from("/a.jpg"));
    }

    #[test]
    fn membership_is_order_independent() {
        let forward = vec![
            create_pair("/a", "/b", 1),
            create_pair("/c", "/d", 1),
            create_pair("/b", "/c", 1),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let grouper = TransitiveGrouper::new();
        let left: Vec<_> = grouper.group(&forward).into_iter().map(|c| c.members).collect();
        let right: Vec<_> = grouper.group(&backward).into_iter().map(|c| c.members).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn disjoint_set_unions() {
        let mut sets = DisjointSet::new(4);
        sets.union(0, 1);
        sets.union(2, 3);
        assert_eq!(sets.find(0), sets.find(1));
        assert_ne!(sets.find(1), sets.find(2));

        sets.union(1, 3);
        assert_eq!(sets.find(0), sets.find(2));
    }
}
