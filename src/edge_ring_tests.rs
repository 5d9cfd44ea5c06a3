#[cfg(test)]
mod tests {
    use crate::edge_ring::{EdgeRing, EnvelopeComparator};
    use crate::graph::{PlanarGraph, RingId};
    use crate::hole_assigner::HoleAssigner;
    use geo::Area;
    use geo_types::{Coord, LineString, Polygon};
    use rstar::Envelope;
    use std::cmp::Ordering;

    fn square(x0: f64, y0: f64, size: f64) -> LineString<f64> {
        LineString::from(vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ])
    }

    fn diamond(r: f64) -> LineString<f64> {
        LineString::from(vec![(r, 0.0), (0.0, r), (-r, 0.0), (0.0, -r), (r, 0.0)])
    }

    fn build(lines: Vec<LineString<f64>>) -> (PlanarGraph, Vec<EdgeRing>) {
        let mut graph = PlanarGraph::new();
        for line in lines {
            graph.add_edge(line);
        }
        let mut rings = graph.get_edge_rings().unwrap();
        for er in &mut rings {
            er.compute_hole(&graph);
        }
        (graph, rings)
    }

    fn width(graph: &PlanarGraph, er: &EdgeRing) -> f64 {
        let env = er.envelope(graph).unwrap();
        env.upper()[0] - env.lower()[0]
    }

    /// The ring with the given role and envelope width.
    fn ring_with(graph: &PlanarGraph, rings: &[EdgeRing], hole: bool, w: f64) -> RingId {
        rings
            .iter()
            .find(|er| er.is_hole() == hole && width(graph, er) == w)
            .map(|er| er.id())
            .expect("ring exists")
    }

    fn split(rings: &[EdgeRing]) -> (Vec<RingId>, Vec<RingId>) {
        let shells = rings.iter().filter(|r| !r.is_hole()).map(|r| r.id()).collect();
        let holes = rings.iter().filter(|r| r.is_hole()).map(|r| r.id()).collect();
        (shells, holes)
    }

    #[test]
    fn test_coordinates_follow_edge_direction() {
        // Two lines meeting at (0,0) and (10,10); one of them is always walked
        // backwards.
        let (graph, rings) = build(vec![
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
            LineString::from(vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0)]),
        ]);
        assert_eq!(rings.len(), 2);

        for er in &rings {
            let coords = er.coordinates(&graph);
            assert_eq!(coords.len(), 5);
            assert_eq!(coords.first(), coords.last());
            // Every step runs along a side of the square.
            for w in coords.windows(2) {
                let (dx, dy) = (w[1].x - w[0].x, w[1].y - w[0].y);
                assert!((dx == 0.0) != (dy == 0.0), "diagonal step {:?}", w);
            }
            for corner in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
                assert!(coords.contains(&Coord::from(corner)));
            }
            let backwards = er
                .edges()
                .iter()
                .filter(|&&de| !graph.directed_edges[de].edge_direction)
                .count();
            assert_eq!(backwards, 1);
        }
    }

    #[test]
    fn test_hole_flag_matches_signed_area() {
        let mut lines = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                lines.push(square(i as f64 * 2.0, j as f64 * 2.0, 1.0));
            }
        }
        lines.push(diamond(50.0));
        let (graph, rings) = build(lines);

        for er in &rings {
            let ring = er.ring(&graph).unwrap().clone();
            let signed = Polygon::new(ring, vec![]).signed_area();
            assert_ne!(signed, 0.0);
            assert_eq!(er.is_hole(), signed > 0.0);
        }
    }

    #[test]
    fn test_compute_valid() {
        let (graph, mut rings) = build(vec![square(0.0, 0.0, 10.0)]);
        for er in &mut rings {
            er.compute_valid(&graph);
            assert!(er.is_valid());
        }

        // Two edges between the same nodes: each ring is a -> b -> a.
        let (graph, mut rings) = build(vec![
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]),
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]),
        ]);
        assert_eq!(rings.len(), 2);
        for er in &mut rings {
            assert_eq!(er.coordinates(&graph).len(), 3);
            assert!(er.ring(&graph).is_none());
            er.compute_valid(&graph);
            assert!(!er.is_valid());
        }

        let bowtie = LineString::from(vec![
            (0.0, 0.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        let (graph, mut rings) = build(vec![bowtie]);
        for er in &mut rings {
            assert!(er.ring(&graph).is_some());
            er.compute_valid(&graph);
            assert!(!er.is_valid());
        }
    }

    #[test]
    fn test_assigned_shell_strictly_contains_hole() {
        let (graph, mut rings) = build(vec![
            square(0.0, 0.0, 100.0),
            square(20.0, 20.0, 60.0),
            square(40.0, 40.0, 20.0),
            square(5.0, 5.0, 10.0),
        ]);
        let (shells, holes) = split(&rings);
        HoleAssigner::assign_holes_to_shells(&graph, &mut rings, &holes, &shells);

        let mut assigned = 0;
        for &hole in &holes {
            let Some(shell) = rings[hole].shell() else {
                assert!(rings[hole].is_outer_hole());
                continue;
            };
            assigned += 1;
            let shell_env = rings[shell].envelope(&graph).unwrap();
            let hole_env = rings[hole].envelope(&graph).unwrap();
            assert!(shell_env.contains_envelope(&hole_env));
            assert_ne!(shell_env, hole_env);
            assert!(!rings[shell].is_hole());
        }
        // The outermost square bounds the exterior; the other three are holes.
        assert_eq!(assigned, 3);

        let outer = ring_with(&graph, &rings, false, 100.0);
        let polygon = rings[outer].polygon(&graph, &rings).unwrap();
        assert_eq!(polygon.interiors().len(), 2);
        assert!(rings[outer].is_outer_shell(&graph, &rings));
        assert!(!rings[ring_with(&graph, &rings, false, 60.0)].is_outer_shell(&graph, &rings));
    }

    #[test]
    fn test_equal_envelope_is_not_a_container() {
        // The diagonal splits the square into two triangles; one of them has
        // the same envelope as the square's outer boundary.
        let (graph, rings) = build(vec![
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
            LineString::from(vec![(10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            LineString::from(vec![(0.0, 0.0), (10.0, 10.0)]),
        ]);
        let (shells, holes) = split(&rings);
        assert_eq!(shells.len(), 2);
        assert_eq!(holes.len(), 1);

        assert_eq!(
            EdgeRing::find_edge_ring_containing(&graph, &rings, holes[0], &shells),
            None
        );
    }

    #[test]
    fn test_nested_diamonds_resolve_to_innermost() {
        let (graph, rings) = build(vec![diamond(30.0), diamond(20.0), diamond(10.0)]);
        let inner_hole = ring_with(&graph, &rings, true, 20.0);
        let middle = ring_with(&graph, &rings, false, 40.0);
        let outer = ring_with(&graph, &rings, false, 60.0);
        let inner = ring_with(&graph, &rings, false, 20.0);

        for order in [[outer, middle, inner], [inner, middle, outer], [middle, inner, outer]] {
            assert_eq!(
                EdgeRing::find_edge_ring_containing(&graph, &rings, inner_hole, &order),
                Some(middle)
            );
        }

        let outer_hole = ring_with(&graph, &rings, true, 60.0);
        assert_eq!(
            EdgeRing::find_edge_ring_containing(&graph, &rings, outer_hole, &[outer, middle, inner]),
            None
        );
    }

    #[test]
    fn test_incomparable_envelopes_keep_first_found() {
        // Two overlapping squares that were never noded against each other;
        // both contain the small square and neither envelope contains the other.
        let (graph, rings) = build(vec![
            square(0.0, 0.0, 10.0),
            square(1.0, -1.0, 10.0),
            square(4.0, 4.0, 2.0),
        ]);
        let shell_at = |x: f64| {
            rings
                .iter()
                .find(|er| !er.is_hole() && er.envelope(&graph).unwrap().lower()[0] == x)
                .map(|er| er.id())
                .unwrap()
        };
        let (a, b) = (shell_at(0.0), shell_at(1.0));
        let hole = ring_with(&graph, &rings, true, 2.0);

        assert_eq!(
            EdgeRing::find_edge_ring_containing(&graph, &rings, hole, &[a, b]),
            Some(a)
        );
        assert_eq!(
            EdgeRing::find_edge_ring_containing(&graph, &rings, hole, &[b, a]),
            Some(b)
        );
    }

    #[test]
    fn test_add_hole_keeps_first_shell() {
        let (graph, mut rings) = build(vec![square(0.0, 0.0, 100.0), square(10.0, 10.0, 10.0)]);
        let big = ring_with(&graph, &rings, false, 100.0);
        let small = ring_with(&graph, &rings, false, 10.0);
        let hole = ring_with(&graph, &rings, true, 10.0);

        EdgeRing::add_hole(&mut rings, big, hole);
        EdgeRing::add_hole(&mut rings, small, hole);
        assert_eq!(rings[hole].shell(), Some(big));
        assert_eq!(rings[big].holes(), &[hole]);
        assert!(rings[small].holes().is_empty());
        assert_eq!(rings[hole].enclosing_shell(), Some(big));
        assert_eq!(rings[big].enclosing_shell(), Some(big));

        rings[small].add_hole_ring(square(12.0, 12.0, 2.0));
        let polygon = rings[small].polygon(&graph, &rings).unwrap();
        assert_eq!(polygon.interiors().len(), 1);
    }

    #[test]
    fn test_update_included_alternates_inward() {
        let (graph, mut rings) = build(vec![
            square(0.0, 0.0, 100.0),
            square(20.0, 20.0, 60.0),
            square(40.0, 40.0, 20.0),
        ]);
        let (shells, holes) = split(&rings);
        HoleAssigner::assign_holes_to_shells(&graph, &mut rings, &holes, &shells);

        let outer = ring_with(&graph, &rings, false, 100.0);
        let middle = ring_with(&graph, &rings, false, 60.0);
        let inner = ring_with(&graph, &rings, false, 20.0);

        // Nothing decided around the middle shell yet.
        EdgeRing::update_included(&mut rings, &graph, middle);
        assert!(!rings[middle].is_included_set());

        rings[outer].set_included(true);
        EdgeRing::update_included(&mut rings, &graph, middle);
        EdgeRing::update_included(&mut rings, &graph, inner);
        assert!(rings[outer].is_included());
        assert!(rings[middle].is_included_set());
        assert!(!rings[middle].is_included());
        assert!(rings[inner].is_included());

        // First value wins.
        rings[inner].set_included(false);
        assert!(rings[inner].is_included());

        // Holes are never decided.
        let hole = ring_with(&graph, &rings, true, 60.0);
        EdgeRing::update_included(&mut rings, &graph, hole);
        assert!(!rings[hole].is_included_set());
    }

    #[test]
    fn test_is_in_ring_counts_boundary() {
        let (graph, rings) = build(vec![square(0.0, 0.0, 10.0)]);
        let er = &rings[0];
        assert!(er.is_in_ring(&graph, Coord { x: 5.0, y: 5.0 }));
        assert!(er.is_in_ring(&graph, Coord { x: 10.0, y: 5.0 }));
        assert!(!er.is_in_ring(&graph, Coord { x: 11.0, y: 5.0 }));
    }

    #[test]
    fn test_envelope_comparator_order() {
        let (graph, rings) = build(vec![
            square(5.0, 0.0, 1.0),
            square(0.0, 3.0, 1.0),
            square(0.0, 0.0, 2.0),
            // Same envelope corner as the square above, from a different node.
            LineString::from(vec![(1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0), (1.0, 0.0)]),
        ]);
        let cmp = EnvelopeComparator::new(&graph, &rings);
        let (mut shells, _) = split(&rings);
        let mut reversed: Vec<RingId> = shells.iter().rev().copied().collect();
        cmp.sort(&mut shells);
        cmp.sort(&mut reversed);
        assert_eq!(shells, reversed);

        let corners: Vec<(f64, f64, f64)> = shells
            .iter()
            .map(|&id| {
                let env = rings[id].envelope(&graph).unwrap();
                (env.lower()[0], env.lower()[1], env.upper()[0])
            })
            .collect();
        assert_eq!(
            corners,
            vec![(0.0, 0.0, 1.0), (0.0, 0.0, 2.0), (0.0, 3.0, 1.0), (5.0, 0.0, 6.0)]
        );

        // Shell and hole of one square share an envelope: equal, order kept.
        let pair = [
            ring_with(&graph, &rings, true, 2.0),
            ring_with(&graph, &rings, false, 2.0),
        ];
        assert_eq!(cmp.compare(pair[0], pair[1]), Ordering::Equal);
        let mut kept = pair;
        cmp.sort(&mut kept);
        assert_eq!(kept, pair);
    }

    #[test]
    fn test_find_dir_edges_in_ring_matches_build() {
        let (graph, rings) = build(vec![
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (-1.0, 1.0), (0.0, 0.0)]),
            LineString::from(vec![(0.0, 0.0), (-1.0, -1.0), (1.0, -1.0), (0.0, 0.0)]),
        ]);
        for er in &rings {
            let walked = EdgeRing::find_dir_edges_in_ring(&graph, er.edges()[0]).unwrap();
            assert_eq!(walked, er.edges());
        }
    }
}
