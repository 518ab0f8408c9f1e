use std::collections::VecDeque;

use common::{
    error::{Error, Result},
    types::{Edge, VertexId, WeightedCycle},
};
use tracing::{debug, error, info};

use super::cycle::{CycleFinder, validate_cycle};
use super::graph::Graph;
use super::traits::GraphSolver;

/// Relative margin a new distance must clear to count as an improvement.
/// Anything closer is rounding from weights that cancel, such as `0.01` and
/// `-0.01` around a zero-weight cycle.
pub const RELAXATION_TOLERANCE: f64 = 1e-12;

/// True if `candidate` beats `current` by more than [`RELAXATION_TOLERANCE`],
/// scaled by `|current|` once it exceeds one.
fn improves(candidate: f64, current: f64) -> bool {
    if current.is_infinite() {
        return candidate < current;
    }
    candidate < current - RELAXATION_TOLERANCE * current.abs().max(1.0)
}

/// Single-source shortest paths with negative-cycle detection for one
/// `(graph, source)` run.
///
/// Construction runs the queue-based Bellman-Ford algorithm (SPFA) to
/// completion. Every `V` examined edges the relaxation pauses and the current
/// predecessor edges are searched for a cycle; such a cycle can only appear
/// when a negative cycle is reachable from the source. Once one is found the
/// run stops immediately, even in the middle of a vertex's adjacency list,
/// and distance/path queries return `Error::NegativeCycleExists`.
#[derive(Debug, Clone)]
pub struct ShortestPathEngine {
    source: VertexId,
    dist_to: Vec<f64>,
    /// Last edge that improved `dist_to[v]`; `None` for the source and unreached vertices.
    edge_to: Vec<Option<Edge>>,
    on_queue: Vec<bool>,
    queue: VecDeque<VertexId>,
    /// Edges examined so far; paces the negative-cycle checks.
    relaxation_count: usize,
    cycle_checks: usize,
    negative_cycle: Option<WeightedCycle>,
}

impl ShortestPathEngine {
    /// Computes shortest paths from `source`, or finds a negative cycle reachable from it.
    ///
    /// The self-check in [`ShortestPathEngine::check`] runs before returning.
    ///
    /// # Errors
    /// - `Error::VertexOutOfRange` if `source` is not a vertex of `graph`.
    /// - `Error::MalformedCycle` / `Error::InconsistentState` if the result
    ///   fails its self-check.
    pub fn new(graph: &Graph, source: VertexId) -> Result<Self> {
        graph.validate_vertex(source)?;

        let num_vertices = graph.vertex_count();
        let mut engine = Self {
            source,
            dist_to: vec![f64::INFINITY; num_vertices],
            edge_to: vec![None; num_vertices],
            on_queue: vec![false; num_vertices],
            queue: VecDeque::with_capacity(num_vertices),
            relaxation_count: 0,
            cycle_checks: 0,
            negative_cycle: None,
        };

        engine.dist_to[source] = 0.0;
        engine.queue.push_back(source);
        engine.on_queue[source] = true;

        while !engine.has_negative_cycle() {
            let Some(v) = engine.queue.pop_front() else {
                break;
            };
            engine.on_queue[v] = false;
            engine.relax(graph, v)?;
        }

        match &engine.negative_cycle {
            Some(cycle) => info!(
                source,
                relaxations = engine.relaxation_count,
                cycle_checks = engine.cycle_checks,
                cycle_len = cycle.len(),
                cycle_weight = cycle.weight_sum,
                "negative cycle confirmed"
            ),
            None => info!(
                source,
                relaxations = engine.relaxation_count,
                cycle_checks = engine.cycle_checks,
                "shortest paths converged"
            ),
        }

        engine.check(graph)?;
        Ok(engine)
    }

    /// Relaxes every edge leaving `v`, enqueueing targets whose distance improved.
    ///
    /// Returns early, leaving the remaining edges of `v` unexamined, as soon as
    /// a pacing check confirms a negative cycle.
    fn relax(&mut self, graph: &Graph, v: VertexId) -> Result<()> {
        let num_vertices = graph.vertex_count();

        for &edge in graph.adjacent(v)? {
            let w = edge.to();
            let candidate = self.dist_to[v] + edge.weight();
            if improves(candidate, self.dist_to[w]) {
                self.dist_to[w] = candidate;
                self.edge_to[w] = Some(edge);
                if !self.on_queue[w] {
                    self.queue.push_back(w);
                    self.on_queue[w] = true;
                }
            }

            self.relaxation_count += 1;
            if self.relaxation_count % num_vertices == 0 {
                self.find_negative_cycle()?;
                if self.has_negative_cycle() {
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    /// Builds the predecessor graph (one incoming edge per reached vertex) and
    /// records its cycle, if any, as the negative cycle.
    fn find_negative_cycle(&mut self) -> Result<()> {
        let mut predecessors = Graph::new(self.edge_to.len());
        for &edge in self.edge_to.iter().flatten() {
            predecessors.add_edge(edge)?;
        }

        self.cycle_checks += 1;
        let finder = CycleFinder::new(&predecessors)?;
        debug!(
            relaxations = self.relaxation_count,
            predecessor_edges = predecessors.edge_count(),
            found = finder.has_cycle(),
            "negative cycle check"
        );

        if let Some(path) = finder.into_cycle() {
            self.negative_cycle = Some(WeightedCycle::from_path(path));
        }
        Ok(())
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn vertex_count(&self) -> usize {
        self.dist_to.len()
    }

    /// Number of edges examined during the run.
    pub fn relaxation_count(&self) -> usize {
        self.relaxation_count
    }

    /// Number of predecessor-graph cycle searches performed during the run.
    pub fn cycle_checks(&self) -> usize {
        self.cycle_checks
    }

    fn validate_vertex(&self, v: VertexId) -> Result<()> {
        if v < self.dist_to.len() {
            Ok(())
        } else {
            Err(Error::vertex_out_of_range(v, self.dist_to.len()))
        }
    }

    /// Length of the shortest path from the source to `v`; `f64::INFINITY` if
    /// `v` is unreachable.
    ///
    /// # Errors
    /// `Error::NegativeCycleExists` once a negative cycle was confirmed,
    /// `Error::VertexOutOfRange` for an invalid `v`.
    pub fn distance_to(&self, v: VertexId) -> Result<f64> {
        if self.has_negative_cycle() {
            return Err(Error::NegativeCycleExists);
        }
        self.validate_vertex(v)?;
        Ok(self.dist_to[v])
    }

    /// True iff the best-known distance to `v` is finite.
    pub fn has_path_to(&self, v: VertexId) -> Result<bool> {
        self.validate_vertex(v)?;
        Ok(self.dist_to[v] < f64::INFINITY)
    }

    /// Edges of a shortest path from the source to `v`, in source-to-`v`
    /// order, or `None` if `v` is unreachable. The path to the source itself
    /// is empty.
    ///
    /// # Errors
    /// `Error::NegativeCycleExists` once a negative cycle was confirmed,
    /// `Error::VertexOutOfRange` for an invalid `v`.
    pub fn path_to(&self, v: VertexId) -> Result<Option<Vec<Edge>>> {
        if self.has_negative_cycle() {
            return Err(Error::NegativeCycleExists);
        }
        if !self.has_path_to(v)? {
            return Ok(None);
        }

        let mut path = Vec::new();
        let mut current = self.edge_to[v];
        while let Some(edge) = current {
            path.push(edge);
            current = self.edge_to[edge.from()];
        }
        path.reverse();
        Ok(Some(path))
    }

    pub fn has_negative_cycle(&self) -> bool {
        self.negative_cycle.is_some()
    }

    /// The confirmed negative cycle, if any.
    pub fn negative_cycle(&self) -> Option<&WeightedCycle> {
        self.negative_cycle.as_ref()
    }

    pub fn into_negative_cycle(self) -> Option<WeightedCycle> {
        self.negative_cycle
    }

    /// Verifies the optimality conditions of the finished run against `graph`.
    ///
    /// With a negative cycle: the cycle is closed and its weight is negative.
    /// Otherwise:
    /// - `dist_to[source] == 0` and the source has no predecessor edge,
    /// - every other vertex without a predecessor edge is unreachable,
    /// - every edge `v->w` satisfies `dist_to[w] <= dist_to[v] + weight`,
    /// - every predecessor edge `v->w` satisfies `dist_to[w] == dist_to[v] + weight`.
    ///
    /// Both edge conditions hold up to [`RELAXATION_TOLERANCE`].
    ///
    /// # Errors
    /// `Error::MalformedCycle` or `Error::InconsistentState` naming the first violation.
    pub fn check(&self, graph: &Graph) -> Result<()> {
        self.check_conditions(graph).inspect_err(|e| {
            error!(source = self.source, error = %e, "shortest-path self-check failed");
        })
    }

    fn check_conditions(&self, graph: &Graph) -> Result<()> {
        if graph.vertex_count() != self.vertex_count() {
            return Err(Error::InconsistentState(format!(
                "graph has {} vertices but the run has {}",
                graph.vertex_count(),
                self.vertex_count()
            )));
        }

        if let Some(cycle) = &self.negative_cycle {
            validate_cycle(&cycle.path)?;
            if !cycle.is_negative() {
                return Err(Error::InconsistentState(format!(
                    "weight of negative cycle = {}",
                    cycle.weight_sum
                )));
            }
            return Ok(());
        }

        let s = self.source;
        if self.dist_to[s] != 0.0 || self.edge_to[s].is_some() {
            return Err(Error::InconsistentState(
                format!("source {} has nonzero distance or a predecessor edge", s),
            ));
        }

        for v in 0..self.vertex_count() {
            if v != s && self.edge_to[v].is_none() && self.dist_to[v] != f64::INFINITY {
                return Err(Error::InconsistentState(format!(
                    "vertex {} has distance {} but no predecessor edge",
                    v, self.dist_to[v]
                )));
            }
        }

        for edge in graph.edges() {
            let candidate = self.dist_to[edge.from()] + edge.weight();
            if improves(candidate, self.dist_to[edge.to()]) {
                return Err(Error::InconsistentState(format!("edge {} not relaxed", edge)));
            }
        }

        for (w, edge) in self.edge_to.iter().enumerate() {
            let Some(edge) = edge else {
                continue;
            };
            if edge.to() != w {
                return Err(Error::InconsistentState(format!(
                    "predecessor edge {} does not end at vertex {}",
                    edge, w
                )));
            }
            let candidate = self.dist_to[edge.from()] + edge.weight();
            if improves(candidate, self.dist_to[w]) || improves(self.dist_to[w], candidate) {
                return Err(Error::InconsistentState(format!(
                    "edge {} on shortest path not tight",
                    edge
                )));
            }
        }

        Ok(())
    }
}

/// Solver implementing the Shortest Path Faster Algorithm (SPFA) for single-source shortest paths
/// and negative cycle detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SPFASolver;

impl GraphSolver for SPFASolver {
    /// Runs [`ShortestPathEngine`] from `source`.
    ///
    /// # Returns
    /// - `Ok(engine)` → Converged or negative cycle confirmed; query the engine.
    /// - `Err(e)` → Invalid source or a failed self-check.
    fn solve(&self, graph: &Graph, source: VertexId) -> Result<ShortestPathEngine> {
        ShortestPathEngine::new(graph, source)
    }
}

#[cfg(test)]
mod spfa_tests {
    use super::*;

    fn build_graph(num_vertices: usize, edges: &[(usize, usize, f64)]) -> Graph {
        Graph::from_edges(num_vertices, edges.iter().copied()).unwrap()
    }

    fn run(
        num_vertices: usize,
        edges: &[(usize, usize, f64)],
        source: usize,
    ) -> ShortestPathEngine {
        ShortestPathEngine::new(&build_graph(num_vertices, edges), source).unwrap()
    }

    #[test]
    fn single_vertex_without_edges() {
        let engine = run(1, &[], 0);

        assert_eq!(engine.distance_to(0).unwrap(), 0.0);
        assert_eq!(engine.path_to(0).unwrap(), Some(vec![]));
        assert!(engine.has_path_to(0).unwrap());
        assert!(!engine.has_negative_cycle());
        assert!(engine.negative_cycle().is_none());
        assert_eq!(engine.relaxation_count(), 0);
    }

    #[test]
    fn shorter_two_hop_path_wins() {
        let engine = run(3, &[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 5.0)], 0);

        assert_eq!(engine.distance_to(2).unwrap(), 2.0);
        assert_eq!(
            engine.path_to(2).unwrap().unwrap(),
            vec![Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0)]
        );
        assert_eq!(engine.relaxation_count(), 3);
        assert_eq!(engine.cycle_checks(), 1);
    }

    #[test]
    fn two_edge_negative_cycle_is_reported() {
        let engine = run(3, &[(0, 1, 1.0), (1, 2, -1.0), (2, 1, -1.0)], 0);

        assert!(engine.has_negative_cycle());
        let cycle = engine.negative_cycle().unwrap();
        assert_eq!(cycle.path, vec![Edge::new(1, 2, -1.0), Edge::new(2, 1, -1.0)]);
        assert_eq!(cycle.weight_sum, -2.0);

        assert_eq!(engine.distance_to(1), Err(Error::NegativeCycleExists));
        assert_eq!(engine.path_to(2), Err(Error::NegativeCycleExists));
    }

    #[test]
    fn detection_stops_at_first_paced_check() {
        let engine = run(3, &[(0, 1, 1.0), (1, 2, -1.0), (2, 1, -1.0)], 0);

        // Third examined edge closes the cycle and is also the first check.
        assert_eq!(engine.relaxation_count(), 3);
        assert_eq!(engine.cycle_checks(), 1);
    }

    #[test]
    fn cycle_is_only_seen_at_multiples_of_vertex_count() {
        // With 4 vertices the cycle closed by 2->1 waits until 2->3 is examined.
        let engine = run(
            4,
            &[(0, 1, 1.0), (1, 2, -1.0), (2, 1, -1.0), (2, 3, 1.0)],
            0,
        );

        assert!(engine.has_negative_cycle());
        assert_eq!(engine.relaxation_count(), 4);
        assert!(engine.has_path_to(3).unwrap());
    }

    #[test]
    fn abort_skips_rest_of_adjacency_list() {
        // The check after 2->1 fires with 2->0 still unexamined.
        let engine = run(
            3,
            &[(0, 1, 1.0), (1, 2, -1.0), (2, 1, -1.0), (2, 0, 1.0)],
            0,
        );

        assert!(engine.has_negative_cycle());
        assert_eq!(engine.relaxation_count(), 3);
        assert_eq!(engine.cycle_checks(), 1);
    }

    #[test]
    fn unreachable_vertex_has_infinite_distance() {
        let engine = run(
            6,
            &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (5, 0, 1.0)],
            0,
        );

        assert!(!engine.has_path_to(5).unwrap());
        assert_eq!(engine.distance_to(5).unwrap(), f64::INFINITY);
        assert_eq!(engine.path_to(5).unwrap(), None);
        assert_eq!(engine.distance_to(4).unwrap(), 4.0);
    }

    #[test]
    fn negative_edges_without_cycle() {
        let engine = run(4, &[(0, 1, 4.0), (0, 2, 1.0), (2, 1, -2.0), (1, 3, 1.0)], 0);

        assert!(!engine.has_negative_cycle());
        assert_eq!(engine.distance_to(1).unwrap(), -1.0);
        assert_eq!(engine.distance_to(3).unwrap(), 0.0);
        assert_eq!(
            engine.path_to(3).unwrap().unwrap(),
            vec![Edge::new(0, 2, 1.0), Edge::new(2, 1, -2.0), Edge::new(1, 3, 1.0)]
        );
    }

    #[test]
    fn unreachable_negative_cycle_is_ignored() {
        let engine = run(4, &[(0, 1, 1.0), (2, 3, -1.0), (3, 2, -1.0)], 0);

        assert!(!engine.has_negative_cycle());
        assert_eq!(engine.distance_to(1).unwrap(), 1.0);
        assert!(!engine.has_path_to(2).unwrap());
    }

    #[test]
    fn same_graph_from_other_source_sees_cycle() {
        let graph = build_graph(4, &[(0, 1, 1.0), (2, 3, -1.0), (3, 2, -1.0)]);

        let from_zero = ShortestPathEngine::new(&graph, 0).unwrap();
        let from_two = ShortestPathEngine::new(&graph, 2).unwrap();

        assert!(!from_zero.has_negative_cycle());
        assert!(from_two.has_negative_cycle());
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn negative_self_loop_is_a_cycle() {
        let engine = run(1, &[(0, 0, -1.0)], 0);

        let cycle = engine.negative_cycle().unwrap();
        assert_eq!(cycle.path, vec![Edge::new(0, 0, -1.0)]);
        assert!(engine.distance_to(0).is_err());
    }

    #[test]
    fn zero_weight_cycle_converges() {
        let engine = run(3, &[(0, 1, 1.0), (1, 2, 2.0), (2, 1, -2.0)], 0);

        assert!(!engine.has_negative_cycle());
        assert_eq!(engine.distance_to(2).unwrap(), 3.0);
        assert_eq!(engine.distance_to(1).unwrap(), 1.0);
    }

    #[test]
    fn cancelling_fractional_weights_converge() {
        // 0.02 + 0.01 - 0.01 rounds just below 0.02.
        let engine = run(3, &[(0, 1, 0.02), (1, 2, 0.01), (2, 1, -0.01)], 0);

        assert!(!engine.has_negative_cycle());
        assert_eq!(engine.distance_to(1).unwrap(), 0.02);
        assert_eq!(engine.distance_to(2).unwrap(), 0.02 + 0.01);
        assert_eq!(
            engine.path_to(2).unwrap().unwrap(),
            vec![Edge::new(0, 1, 0.02), Edge::new(1, 2, 0.01)]
        );
    }

    #[test]
    fn zero_weight_cycles_never_fail_the_self_check() {
        for d in 1..100_i32 {
            for a in 1..100_i32 {
                let (d, a) = (f64::from(d) / 100.0, f64::from(a) / 100.0);
                let graph = build_graph(3, &[(0, 1, d), (1, 2, a), (2, 1, -a)]);

                let engine = ShortestPathEngine::new(&graph, 0)
                    .unwrap_or_else(|e| panic!("d={} a={}: {}", d, a, e));
                assert!(!engine.has_negative_cycle(), "d={} a={}", d, a);
                assert_eq!(engine.distance_to(1).unwrap(), d);
            }
        }
    }

    #[test]
    fn sub_tolerance_improvement_is_ignored() {
        let engine = run(3, &[(0, 1, 1.0), (0, 2, 2.0), (2, 1, -1.0 - 1e-14)], 0);

        assert_eq!(engine.distance_to(1).unwrap(), 1.0);
        assert_eq!(
            engine.path_to(1).unwrap().unwrap(),
            vec![Edge::new(0, 1, 1.0)]
        );
        assert!(engine.check(&build_graph(3, &[(0, 1, 1.0), (0, 2, 2.0), (2, 1, -1.0)])).is_ok());
    }

    #[test]
    fn large_negative_ring_is_detected() {
        let n = 1000;
        let edges: Vec<_> = (0..n).map(|i| (i, (i + 1) % n, -0.001)).collect();

        let engine = run(n, &edges, 0);

        let cycle = engine.negative_cycle().unwrap();
        assert_eq!(cycle.len(), n);
        assert!(cycle.is_negative());
        assert_eq!(engine.relaxation_count() % n, 0);
    }

    #[test]
    fn cycle_behind_long_tail_is_detected() {
        let n = 50;
        let mut edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1, 0.0)).collect();
        edges.push((n - 1, n - 2, -0.5));

        let engine = run(n, &edges, 0);

        let cycle = engine.negative_cycle().unwrap();
        assert_eq!(cycle.len(), 2);
        let vertices: Vec<_> = cycle.vertices().collect();
        assert!(vertices.contains(&(n - 1)) && vertices.contains(&(n - 2)));
    }

    #[test]
    fn queries_are_idempotent() {
        let engine = run(3, &[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 5.0)], 0);
        assert_eq!(engine.distance_to(2), engine.distance_to(2));
        assert_eq!(engine.path_to(2), engine.path_to(2));

        let engine = run(3, &[(0, 1, 1.0), (1, 2, -1.0), (2, 1, -1.0)], 0);
        assert_eq!(engine.negative_cycle(), engine.negative_cycle());
    }

    #[test]
    fn invalid_source_is_rejected() {
        let graph = build_graph(2, &[(0, 1, 1.0)]);

        assert_eq!(
            ShortestPathEngine::new(&graph, 2).unwrap_err(),
            Error::VertexOutOfRange {
                vertex: 2,
                vertex_count: 2
            }
        );
        assert!(ShortestPathEngine::new(&Graph::new(0), 0).is_err());
    }

    #[test]
    fn invalid_query_vertex_is_rejected() {
        let engine = run(2, &[(0, 1, 1.0)], 0);

        assert!(engine.distance_to(2).is_err());
        assert!(engine.has_path_to(7).is_err());
        assert!(engine.path_to(2).is_err());
    }

    #[test]
    fn check_rejects_a_different_graph() {
        let graph = build_graph(3, &[(0, 1, 1.0), (1, 2, 1.0)]);
        let engine = ShortestPathEngine::new(&graph, 0).unwrap();

        // A shortcut the run never saw leaves 0->2 unrelaxed.
        let other = build_graph(3, &[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 0.5)]);
        let err = engine.check(&other).unwrap_err();
        assert!(err.is_internal());

        assert!(engine.check(&build_graph(4, &[])).is_err());
        assert!(engine.check(&graph).is_ok());
    }

    #[test]
    fn solver_trait_reports_cycle() {
        let graph = build_graph(3, &[(0, 1, 1.0), (1, 2, -1.0), (2, 1, -1.0)]);

        let cycle = SPFASolver.find_negative_cycle(&graph, 0).unwrap();
        assert!(cycle.is_some_and(|c| c.is_negative()));

        let acyclic = build_graph(3, &[(0, 1, 1.0), (1, 2, 1.0)]);
        assert!(SPFASolver.find_negative_cycle(&acyclic, 0).unwrap().is_none());
    }
}
