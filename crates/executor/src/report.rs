use std::fmt;

use spfa_core::ShortestPathEngine;

/// Console view of a finished run.
///
/// A negative cycle is listed edge by edge with its total weight. Otherwise
/// every vertex gets one line: `s to v (distance)` followed by the path edges,
/// or `s to v  no path`.
pub struct Report<'a> {
    engine: &'a ShortestPathEngine,
}

impl<'a> Report<'a> {
    pub fn new(engine: &'a ShortestPathEngine) -> Self {
        Report { engine }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let engine = self.engine;
        let s = engine.source();

        if let Some(cycle) = engine.negative_cycle() {
            writeln!(f, "negative cycle from {} (weight {:.2}):", s, cycle.weight_sum)?;
            for edge in &cycle.path {
                writeln!(f, "{}", edge)?;
            }
            return Ok(());
        }

        for v in 0..engine.vertex_count() {
            match (engine.distance_to(v), engine.path_to(v)) {
                (Ok(distance), Ok(Some(path))) => {
                    write!(f, "{} to {} ({:.2})  ", s, v, distance)?;
                    for edge in path {
                        write!(f, "{}   ", edge)?;
                    }
                    writeln!(f)?;
                }
                _ => writeln!(f, "{} to {}         no path", s, v)?,
            }
        }
        Ok(())
    }
}
