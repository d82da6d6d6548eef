use crate::adjacency::AdjacencyIndex;
use crate::interaction::EntityId;
use std::collections::BTreeSet;
use tracing::debug;

/// Outcome of a graph search. `non_interactants` is present only for
/// operations that split their result (clique, supported n-hop).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphResult {
    pub interactants: Vec<EntityId>,
    pub non_interactants: Option<Vec<EntityId>>,
}

/// Pre-store graph search over the adjacency index. Stateless: every call
/// carries its own scratch state, so searches are independently testable
/// and freely repeatable.
pub struct GraphSearch<'a> {
    adjacency: &'a AdjacencyIndex,
}

impl<'a> GraphSearch<'a> {
    pub fn new(adjacency: &'a AdjacencyIndex) -> Self {
        Self { adjacency }
    }

    /// Entities on pathways between `origin` and `destination` of at most
    /// `max_hops` edges.
    ///
    /// The result is the set of intermediaries appearing on ANY qualifying
    /// path, not a single shortest path. Within one path no node repeats;
    /// the same node may recur across different explored paths. With
    /// `require_support`, intermediaries are split into those having a
    /// qualifying edge to at least one other intermediary versus not.
    pub fn n_hop(
        &self,
        origin: &str,
        destination: &str,
        max_hops: usize,
        min_probability: u32,
        require_support: bool,
    ) -> GraphResult {
        let mut found: BTreeSet<EntityId> = BTreeSet::new();
        let mut chain: Vec<EntityId> = vec![origin.to_string()];
        self.dfs(&mut chain, destination, max_hops, min_probability, &mut found);

        found.remove(origin);
        found.remove(destination);
        let intermediaries: Vec<EntityId> = found.into_iter().collect();
        debug!(
            origin,
            destination,
            max_hops,
            found = intermediaries.len(),
            "n-hop search done"
        );

        if require_support {
            let (supported, unsupported) = self.split_by_support(&intermediaries, min_probability);
            GraphResult {
                interactants: supported,
                non_interactants: Some(unsupported),
            }
        } else {
            GraphResult {
                interactants: intermediaries,
                non_interactants: None,
            }
        }
    }

    fn dfs(
        &self,
        chain: &mut Vec<EntityId>,
        destination: &str,
        budget: usize,
        min_probability: u32,
        found: &mut BTreeSet<EntityId>,
    ) {
        let Some(current) = chain.last().cloned() else {
            return;
        };
        if current == destination {
            for id in chain.iter() {
                found.insert(id.clone());
            }
            return;
        }
        if budget == 0 {
            return;
        }

        for neighbor in self.adjacency.neighbors(&current, min_probability) {
            // Pruning revisits within the current path keeps cyclic graphs
            // from looping; other paths may still pass through the node.
            if chain.contains(&neighbor) {
                continue;
            }
            chain.push(neighbor);
            self.dfs(chain, destination, budget - 1, min_probability, found);
            chain.pop();
        }
    }

    /// All thresholded neighbors of `gene` that also interact with another
    /// of its neighbors, versus those that do not. The two groups are
    /// disjoint and together cover the full neighbor set.
    pub fn clique(&self, gene: &str, min_probability: u32) -> GraphResult {
        let mut neighbors = self.adjacency.neighbors(gene, min_probability);
        neighbors.remove(gene);
        let interactants: Vec<EntityId> = neighbors.into_iter().collect();

        let (members, outsiders) = self.split_by_support(&interactants, min_probability);
        debug!(
            gene,
            members = members.len(),
            outsiders = outsiders.len(),
            "clique search done"
        );
        GraphResult {
            interactants: members,
            non_interactants: Some(outsiders),
        }
    }

    fn split_by_support(
        &self,
        group: &[EntityId],
        min_probability: u32,
    ) -> (Vec<EntityId>, Vec<EntityId>) {
        group.iter().cloned().partition(|id| {
            let others: Vec<EntityId> = group.iter().filter(|c| *c != id).cloned().collect();
            self.adjacency
                .has_edge_above_threshold(id, &others, min_probability)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::RawAdjacency;

    fn index(entries: &[(&str, &[(&str, u32)])]) -> AdjacencyIndex {
        let raw: RawAdjacency = entries
            .iter()
            .map(|(id, neighbors)| {
                let neighbors = neighbors
                    .iter()
                    .map(|(n, p)| (n.to_string(), vec![*p]))
                    .collect();
                (id.to_string(), neighbors)
            })
            .collect();
        AdjacencyIndex::from_raw(raw)
    }

    fn ids(values: &[&str]) -> Vec<EntityId> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// 1 - 3 - 2 chain plus a 1 - 4 spur, all well above threshold.
    fn chain_index() -> AdjacencyIndex {
        index(&[
            ("1", &[("3", 900), ("4", 900)]),
            ("3", &[("1", 900), ("2", 900)]),
            ("2", &[("3", 900)]),
            ("4", &[("1", 900)]),
        ])
    }

    #[test]
    fn test_n_hop_finds_intermediary() {
        let adjacency = chain_index();
        let search = GraphSearch::new(&adjacency);
        let result = search.n_hop("1", "2", 2, 500, false);
        assert_eq!(result.interactants, ids(&["3"]));
        assert_eq!(result.non_interactants, None);
    }

    #[test]
    fn test_n_hop_respects_hop_budget() {
        let adjacency = chain_index();
        let search = GraphSearch::new(&adjacency);
        assert!(search.n_hop("1", "2", 1, 500, false).interactants.is_empty());
        assert!(search.n_hop("4", "2", 2, 500, false).interactants.is_empty());
        assert_eq!(search.n_hop("4", "2", 3, 500, false).interactants, ids(&["1", "3"]));
    }

    #[test]
    fn test_n_hop_same_origin_and_destination_is_empty() {
        let adjacency = chain_index();
        let search = GraphSearch::new(&adjacency);
        for hops in 0..=3 {
            assert!(search.n_hop("1", "1", hops, 500, false).interactants.is_empty());
        }
    }

    #[test]
    fn test_n_hop_is_symmetric() {
        let adjacency = index(&[
            ("a", &[("x", 900), ("y", 900)]),
            ("x", &[("a", 900), ("b", 900)]),
            ("y", &[("a", 900), ("b", 900)]),
            ("b", &[("x", 900), ("y", 900)]),
        ]);
        let search = GraphSearch::new(&adjacency);
        let forward = search.n_hop("a", "b", 3, 500, false);
        let backward = search.n_hop("b", "a", 3, 500, false);
        assert_eq!(forward.interactants, backward.interactants);
        assert_eq!(forward.interactants, ids(&["x", "y"]));
    }

    #[test]
    fn test_n_hop_threshold_prunes_edges() {
        let adjacency = index(&[
            ("1", &[("3", 400)]),
            ("3", &[("1", 400), ("2", 900)]),
            ("2", &[("3", 900)]),
        ]);
        let search = GraphSearch::new(&adjacency);
        assert!(search.n_hop("1", "2", 2, 500, false).interactants.is_empty());
        assert_eq!(search.n_hop("1", "2", 2, 300, false).interactants, ids(&["3"]));
    }

    #[test]
    fn test_n_hop_terminates_on_cycles() {
        let adjacency = index(&[
            ("1", &[("2", 900), ("3", 900)]),
            ("2", &[("1", 900), ("3", 900)]),
            ("3", &[("1", 900), ("2", 900), ("4", 900)]),
            ("4", &[("3", 900)]),
        ]);
        let search = GraphSearch::new(&adjacency);
        let result = search.n_hop("1", "4", 3, 500, false);
        assert_eq!(result.interactants, ids(&["2", "3"]));
    }

    #[test]
    fn test_n_hop_support_split() {
        // Three 2-hop routes from s to t; intermediaries m1 and m2 also
        // interact with each other, m3 interacts with no intermediary.
        let adjacency = index(&[
            ("s", &[("m1", 900), ("m2", 900), ("m3", 900)]),
            ("m1", &[("s", 900), ("t", 900), ("m2", 900)]),
            ("m2", &[("s", 900), ("t", 900), ("m1", 900)]),
            ("m3", &[("s", 900), ("t", 900)]),
            ("t", &[("m1", 900), ("m2", 900), ("m3", 900)]),
        ]);
        let search = GraphSearch::new(&adjacency);
        let result = search.n_hop("s", "t", 2, 500, true);
        assert_eq!(result.interactants, ids(&["m1", "m2"]));
        assert_eq!(result.non_interactants, Some(ids(&["m3"])));
    }

    #[test]
    fn test_clique_partitions_neighbors() {
        // g's neighbors: a, b, c. a-b interact; c interacts with neither.
        let adjacency = index(&[
            ("g", &[("a", 900), ("b", 900), ("c", 900)]),
            ("a", &[("g", 900), ("b", 900)]),
            ("b", &[("g", 900), ("a", 900)]),
            ("c", &[("g", 900)]),
        ]);
        let search = GraphSearch::new(&adjacency);
        let result = search.clique("g", 500);
        let members = result.interactants.clone();
        let outsiders = result.non_interactants.clone().unwrap();
        assert_eq!(members, ids(&["a", "b"]));
        assert_eq!(outsiders, ids(&["c"]));

        // Disjoint, and together the full neighbor set.
        let mut union: Vec<EntityId> = members.iter().chain(outsiders.iter()).cloned().collect();
        union.sort_unstable();
        let full: Vec<EntityId> = adjacency.neighbors("g", 500).into_iter().collect();
        assert_eq!(union, full);
        assert!(members.iter().all(|m| !outsiders.contains(m)));
    }

    #[test]
    fn test_clique_excludes_self_loop() {
        let adjacency = index(&[
            ("g", &[("g", 900), ("a", 900)]),
            ("a", &[("g", 900)]),
        ]);
        let search = GraphSearch::new(&adjacency);
        let result = search.clique("g", 500);
        assert!(!result.interactants.contains(&"g".to_string()));
        assert_eq!(result.non_interactants, Some(ids(&["a"])));
    }

    #[test]
    fn test_unknown_origin_yields_empty_result() {
        let adjacency = chain_index();
        let search = GraphSearch::new(&adjacency);
        assert!(search.n_hop("nope", "2", 3, 0, false).interactants.is_empty());
        assert!(search.clique("nope", 0).interactants.is_empty());
    }
}
