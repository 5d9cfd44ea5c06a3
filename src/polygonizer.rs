use crate::edge_ring::{EdgeRing, EnvelopeComparator};
use crate::error::Result;
use crate::graph::{PlanarGraph, RingId};
use crate::hole_assigner::HoleAssigner;
use geo_types::{Geometry, LineString, Polygon};
use log::{debug, warn};

/// Everything one polygonization run produces.
#[derive(Clone, Debug, Default)]
pub struct PolygonizeOutput {
    pub polygons: Vec<Polygon<f64>>,
    /// Input lines removed because an end point had degree 1.
    pub dangles: Vec<LineString<f64>>,
    /// Input lines removed because they bound no area on either side.
    pub cut_edges: Vec<LineString<f64>>,
    /// Rings that could not form a valid polygon boundary.
    pub invalid_ring_lines: Vec<LineString<f64>>,
}

/// Builds polygons from a set of correctly noded lines.
pub struct Polygonizer {
    // Configuration
    /// Drop rings that are not valid linear rings and report them as
    /// `invalid_ring_lines`.
    pub check_rings_valid: bool,
    /// Only return polygons that form a valid polygonal geometry, resolving
    /// nested and adjacent faces by alternating inclusion.
    pub extract_only_polygonal: bool,

    inputs: Vec<Geometry<f64>>,
    /// Last result, keyed by the options it was computed with.
    output: Option<(RunOptions, PolygonizeOutput)>,
    dirty: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RunOptions {
    check_rings_valid: bool,
    extract_only_polygonal: bool,
}

impl Default for Polygonizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Polygonizer {
    pub fn new() -> Self {
        Self {
            check_rings_valid: true,
            extract_only_polygonal: false,
            inputs: Vec::new(),
            output: None,
            dirty: false,
        }
    }

    pub fn with_check_rings_valid(mut self, check: bool) -> Self {
        self.check_rings_valid = check;
        self
    }

    pub fn with_extract_only_polygonal(mut self, only_polygonal: bool) -> Self {
        self.extract_only_polygonal = only_polygonal;
        self
    }

    /// Adds a geometry; only its lineal components are used.
    pub fn add_geometry(&mut self, geom: Geometry<f64>) {
        self.inputs.push(geom);
        self.dirty = true;
    }

    pub fn add_geometries<I>(&mut self, geoms: I)
    where
        I: IntoIterator<Item = Geometry<f64>>,
    {
        for geom in geoms {
            self.add_geometry(geom);
        }
    }

    /// Computes the polygons.
    /// This is the main entry point.
    pub fn polygonize(&mut self) -> Result<Vec<Polygon<f64>>> {
        Ok(self.output()?.polygons.clone())
    }

    pub fn dangles(&mut self) -> Result<&[LineString<f64>]> {
        Ok(self.output()?.dangles.as_slice())
    }

    pub fn cut_edges(&mut self) -> Result<&[LineString<f64>]> {
        Ok(self.output()?.cut_edges.as_slice())
    }

    pub fn invalid_ring_lines(&mut self) -> Result<&[LineString<f64>]> {
        Ok(self.output()?.invalid_ring_lines.as_slice())
    }

    /// Runs (if needed) and hands over the full result.
    pub fn into_output(mut self) -> Result<PolygonizeOutput> {
        self.output()?;
        Ok(self.output.take().map(|(_, output)| output).unwrap_or_default())
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            check_rings_valid: self.check_rings_valid,
            extract_only_polygonal: self.extract_only_polygonal,
        }
    }

    // Reruns when input was added or an option changed since the last run.
    fn output(&mut self) -> Result<&PolygonizeOutput> {
        let options = self.options();
        let output = match self.output.take() {
            Some((cached, output)) if !self.dirty && cached == options => output,
            _ => self.run()?,
        };
        self.dirty = false;
        Ok(&self.output.insert((options, output)).1)
    }

    fn build_graph(&self) -> PlanarGraph {
        // Flatten inputs to lineal components
        let mut lines = Vec::new();
        for geom in &self.inputs {
            extract_lines(geom, &mut lines);
        }

        let mut graph = PlanarGraph::new();
        for line in lines {
            graph.add_edge(line);
        }
        graph
    }

    fn run(&self) -> Result<PolygonizeOutput> {
        let mut graph = self.build_graph();
        debug!(
            "polygonizing {} edges over {} nodes",
            graph.edges.len(),
            graph.nodes.len()
        );

        // 1. Clean the graph
        let dangles = graph.delete_dangles();
        let cut_edges = graph.delete_cut_edges()?;

        // 2. Find minimal rings
        let mut rings = graph.get_edge_rings()?;

        // 3. Split off rings that cannot bound a polygon
        let mut valid = Vec::with_capacity(rings.len());
        let mut invalid = Vec::new();
        for er in &mut rings {
            er.compute_valid(&graph);
            if self.check_rings_valid {
                if er.is_valid() {
                    valid.push(er.id());
                } else {
                    invalid.push(er.id());
                }
            } else if er.ring(&graph).is_some() {
                valid.push(er.id());
            } else {
                debug!("skipping edge ring {} with no ring geometry", er.id());
            }
        }
        let invalid_ring_lines = if self.check_rings_valid {
            extract_invalid_lines(&graph, &mut rings, invalid)
        } else {
            Vec::new()
        };

        // 4. Classify and nest
        let mut shells = Vec::new();
        let mut holes = Vec::new();
        for id in valid {
            rings[id].compute_hole(&graph);
            if rings[id].is_hole() {
                holes.push(id);
            } else {
                shells.push(id);
            }
        }
        HoleAssigner::assign_holes_to_shells(&graph, &mut rings, &holes, &shells);
        EnvelopeComparator::new(&graph, &rings).sort(&mut shells);

        // 5. Resolve which shells are kept
        if self.extract_only_polygonal {
            find_disjoint_shells(&graph, &mut rings, &shells);
        }

        let polygons: Vec<Polygon<f64>> = shells
            .iter()
            .filter(|&&id| !self.extract_only_polygonal || rings[id].is_included())
            .filter_map(|&id| rings[id].polygon(&graph, &rings))
            .collect();

        debug!(
            "{} polygons from {} shells and {} holes ({} invalid rings)",
            polygons.len(),
            shells.len(),
            holes.len(),
            invalid_ring_lines.len()
        );

        Ok(PolygonizeOutput {
            polygons,
            dangles,
            cut_edges,
            invalid_ring_lines,
        })
    }
}

/// Reports invalid rings as lines, skipping a ring when every ring across
/// its edges is valid or already reported.
fn extract_invalid_lines(
    graph: &PlanarGraph,
    rings: &mut [EdgeRing],
    mut invalid: Vec<RingId>,
) -> Vec<LineString<f64>> {
    EnvelopeComparator::new(graph, rings).sort(&mut invalid);

    let mut lines = Vec::new();
    for id in invalid {
        let has_unreported_neighbour = rings[id].edges().iter().any(|&de| {
            let sym = graph.directed_edges[de].sym_idx;
            graph.directed_edges[sym]
                .ring
                .map_or(true, |adj| !(rings[adj].is_valid() || rings[adj].is_processed()))
        });
        if has_unreported_neighbour {
            lines.push(rings[id].line_string(graph));
            rings[id].set_processed(true);
        }
    }
    lines
}

/// Decides inclusion for every shell by alternating across ring adjacency,
/// seeded from shells that touch the unbounded exterior.
fn find_disjoint_shells(graph: &PlanarGraph, rings: &mut [EdgeRing], shells: &[RingId]) {
    find_outer_shells(graph, rings, shells);

    loop {
        let mut changed = false;
        let mut pending = 0;
        for &id in shells {
            if rings[id].is_included_set() {
                continue;
            }
            EdgeRing::update_included(rings, graph, id);
            if rings[id].is_included_set() {
                changed = true;
            } else {
                pending += 1;
            }
        }
        if pending == 0 {
            break;
        }
        if !changed {
            warn!("{} shells have no decidable inclusion and are excluded", pending);
            break;
        }
    }
}

fn find_outer_shells(graph: &PlanarGraph, rings: &mut [EdgeRing], shells: &[RingId]) {
    for &id in shells {
        let Some(outer_hole) = rings[id].outer_hole(graph, rings) else {
            continue;
        };
        if !rings[outer_hole].is_processed() {
            rings[id].set_included(true);
            rings[outer_hole].set_processed(true);
        }
    }
}

fn extract_lines(geom: &Geometry<f64>, out: &mut Vec<LineString<f64>>) {
    match geom {
        Geometry::Line(line) => out.push(LineString::from(vec![line.start, line.end])),
        Geometry::LineString(ls) => out.push(ls.clone()),
        Geometry::MultiLineString(mls) => {
            out.extend(mls.0.iter().cloned());
        }
        Geometry::Polygon(poly) => {
            out.push(poly.exterior().clone());
            out.extend(poly.interiors().iter().cloned());
        }
        Geometry::MultiPolygon(mpoly) => {
            for poly in mpoly {
                out.push(poly.exterior().clone());
                out.extend(poly.interiors().iter().cloned());
            }
        }
        Geometry::Rect(rect) => out.push(rect.to_polygon().exterior().clone()),
        Geometry::Triangle(tri) => out.push(tri.to_polygon().exterior().clone()),
        Geometry::GeometryCollection(gc) => {
            for g in gc {
                extract_lines(g, out);
            }
        }
        _ => {}
    }
}
