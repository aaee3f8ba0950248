use super::*;
use crate::geometry::approx_eq;
use float_cmp::assert_approx_eq;

fn sites(locs: &[(f64, f64)]) -> Vec<Site> {
    locs.iter()
        .enumerate()
        .map(|(id, &(x, y))| Site::new(id, DVec2::new(x, y)))
        .collect()
}

fn unit_box() -> BoundingBox {
    BoundingBox::new(DVec2::ZERO, DVec2::splat(10.))
}

fn has_vertex(cell: &VoronoiCell, vertex: DVec2) -> bool {
    cell.vertices().any(|v| approx_eq(v, vertex))
}

#[test]
fn test_single_cell() {
    let voronoi = VoronoiDiagram::build(&sites(&[(5., 5.)]), unit_box()).unwrap();
    assert_eq!(voronoi.cells().len(), 1);
    let cell = &voronoi.cells()[0];
    assert_eq!(cell.half_edges().len(), 4);
    for corner in unit_box().corners() {
        assert!(has_vertex(cell, corner));
    }
    assert_approx_eq!(f64, cell.area(), 100.);
    assert!(voronoi.edges().iter().all(|e| e.is_border()));
}

#[test]
fn test_two_cells() {
    let voronoi = VoronoiDiagram::build(&sites(&[(2., 5.), (8., 5.)]), unit_box()).unwrap();
    let interior: Vec<_> = voronoi.edges().iter().filter(|e| !e.is_border()).collect();
    assert_eq!(interior.len(), 1);
    let edge = interior[0];
    assert_approx_eq!(f64, edge.start().x, 5.);
    assert_approx_eq!(f64, edge.end().x, 5.);
    assert_approx_eq!(f64, edge.start().y.min(edge.end().y), 0.);
    assert_approx_eq!(f64, edge.start().y.max(edge.end().y), 10.);

    assert_eq!(voronoi.cells().len(), 2);
    for cell in voronoi.cells() {
        assert_approx_eq!(f64, cell.area(), 50.);
    }
}

#[test]
fn test_four_cells() {
    let voronoi = VoronoiDiagram::build(
        &sites(&[(3., 3.), (7., 3.), (3., 7.), (7., 7.)]),
        unit_box(),
    )
    .unwrap();
    assert_eq!(voronoi.cells().len(), 4);
    for cell in voronoi.cells() {
        assert!(has_vertex(cell, DVec2::splat(5.)));
        assert_approx_eq!(f64, cell.area(), 25., epsilon = 1e-9);
        assert_eq!(cell.neighbour_ids().count(), 2);
    }
    let interior = voronoi.edges().iter().filter(|e| !e.is_border()).count();
    assert_eq!(interior, 4);
}

#[test]
fn test_coincident_sites() {
    let voronoi = VoronoiDiagram::build(&sites(&[(5., 5.), (5., 5.)]), unit_box()).unwrap();
    assert_eq!(voronoi.cells().len(), 2);
    let full = voronoi.cells().iter().filter(|c| !c.is_empty()).count();
    assert_eq!(full, 1);
    let areas: Vec<f64> = voronoi.cells().iter().map(|c| c.area()).collect();
    assert_approx_eq!(f64, areas[0] + areas[1], 100.);
    assert!(areas.contains(&0.));
}

#[test]
fn test_co_circular_sites() {
    // Four sites on a circle around (5, 5) collapse to a single vertex.
    let voronoi = VoronoiDiagram::build(
        &sites(&[(5., 2.), (2., 5.), (8., 5.), (5., 8.)]),
        unit_box(),
    )
    .unwrap();
    for cell in voronoi.cells() {
        assert!(has_vertex(cell, DVec2::splat(5.)));
    }
    let total: f64 = voronoi.cells().iter().map(|c| c.area()).sum();
    assert_approx_eq!(f64, total, 100., epsilon = 1e-9);
}

#[test]
fn test_thin_box_nearly_collinear_sites() {
    // The bisectors of these sites are nearly horizontal and meet far
    // outside of the box, so every interior edge is clipped on both sides.
    let bbox = BoundingBox::from_sides(0., 0.01, 0., 1000.);
    let input = sites(&[
        (0.008615931564509212, 694.8260454610268),
        (0.0048540084441806765, 386.96524983336155),
        (0.007649609854130072, 272.8507054983124),
        (0.00844214675305849, 227.73273128129114),
        (0.007802981925562923, 576.1504182332285),
    ]);
    let voronoi = VoronoiDiagram::build(&input, bbox).unwrap();
    for edge in voronoi.edges().iter().filter(|e| !e.is_border()) {
        assert!(edge.start().x == 0. || edge.start().x == 0.01);
        assert!(edge.end().x == 0. || edge.end().x == 0.01);
    }
    let total: f64 = voronoi.cells().iter().map(|c| c.area()).sum();
    assert_approx_eq!(f64, total, 10., epsilon = 1e-8);
    for cell in voronoi.cells() {
        assert!(cell.contains(cell.loc()));
    }
}

#[test]
fn test_closely_spaced_sites() {
    // Four sites on a small square around (5, 5), well above the resolution
    // of the construction.
    let d = 1e-6;
    let voronoi = VoronoiDiagram::build(
        &sites(&[(5. - d, 5. - d), (5. + d, 5. - d), (5. - d, 5. + d), (5. + d, 5. + d)]),
        unit_box(),
    )
    .unwrap();
    for cell in voronoi.cells() {
        assert!(has_vertex(cell, DVec2::splat(5.)));
        assert_approx_eq!(f64, cell.area(), 25., epsilon = 1e-6);
    }
    let total: f64 = voronoi.cells().iter().map(|c| c.area()).sum();
    assert_approx_eq!(f64, total, 100., epsilon = 1e-6);
}

#[test]
fn test_invalid_input() {
    assert_eq!(
        VoronoiDiagram::build(&[], unit_box()).unwrap_err(),
        VoronoiError::NoSites
    );
    let flat = BoundingBox::new(DVec2::ZERO, DVec2::new(10., 0.));
    assert_eq!(
        VoronoiDiagram::build(&sites(&[(1., 1.)]), flat).unwrap_err(),
        VoronoiError::InvalidBoundingBox {
            width: 10.,
            height: 0.
        }
    );
    let inverted = BoundingBox::from_sides(10., 0., 0., 10.);
    assert!(matches!(
        VoronoiDiagram::build(&sites(&[(1., 1.)]), inverted),
        Err(VoronoiError::InvalidBoundingBox { .. })
    ));
    let triangle = sites(&[(2., 5.), (8., 6.), (4., 9.)]);
    for unbounded in [
        BoundingBox::from_sides(0., f64::INFINITY, 0., 10.),
        BoundingBox::from_sides(f64::NEG_INFINITY, 10., 0., 10.),
        BoundingBox::from_sides(0., 10., f64::NAN, 10.),
    ] {
        assert!(matches!(
            VoronoiDiagram::build(&triangle, unbounded),
            Err(VoronoiError::InvalidBoundingBox { .. })
        ));
    }
    assert!(matches!(
        VoronoiDiagram::build(&sites(&[(1., 1.), (f64::NAN, 2.)]), unit_box()),
        Err(VoronoiError::NonFiniteSite { id: 1, .. })
    ));
}

#[test]
fn test_site_outside_box() {
    // The bisector misses the box entirely, so the inner site gets all of it.
    let voronoi = VoronoiDiagram::build(&sites(&[(5., 5.), (50., 50.)]), unit_box()).unwrap();
    assert_approx_eq!(f64, voronoi.cells()[0].area(), 100.);
    assert!(voronoi.cells()[1].is_empty());

    // Both sites outside of the box, on opposite sides.
    let voronoi = VoronoiDiagram::build(&sites(&[(-5., 5.), (15., 5.)]), unit_box()).unwrap();
    for cell in voronoi.cells() {
        assert_approx_eq!(f64, cell.area(), 50.);
    }
}

#[test]
fn test_cells_keep_input_order() {
    let input = vec![
        Site::new(42, DVec2::new(8., 8.)),
        Site::new(7, DVec2::new(1., 2.)),
        Site::new(13, DVec2::new(6., 1.)),
    ];
    let voronoi = build_voronoi(&input, unit_box()).unwrap();
    let ids: Vec<usize> = voronoi.cells().iter().map(|c| c.site_id()).collect();
    assert_eq!(ids, vec![42, 7, 13]);
    assert_eq!(voronoi.sites(), &input[..]);
    assert_eq!(
        voronoi.cell_by_id(13).map(|c| c.loc()),
        Some(DVec2::new(6., 1.))
    );
    assert!(voronoi.cell_by_id(0).is_none());
}

#[test]
fn test_locate() {
    let voronoi = VoronoiDiagram::build(
        &sites(&[(3., 3.), (7., 3.), (3., 7.), (7., 7.)]),
        unit_box(),
    )
    .unwrap();
    let cell = voronoi.locate(DVec2::new(9., 1.)).unwrap();
    assert_eq!(cell.site_id(), 1);
    assert_eq!(cell.classify(DVec2::new(9., 1.)), PointLocation::Inside);
    assert!(voronoi.locate(DVec2::new(11., 1.)).is_none());
}

#[test]
fn test_locate_skips_empty_cells() {
    let voronoi = VoronoiDiagram::build(&sites(&[(5., 5.), (5., 5.)]), unit_box()).unwrap();
    let cell = voronoi.locate(DVec2::new(5., 5.)).unwrap();
    assert!(!cell.is_empty());
}

#[test]
fn test_relax() {
    let voronoi = VoronoiDiagram::build(&sites(&[(1., 5.), (2., 5.)]), unit_box()).unwrap();
    let relaxed = voronoi.relaxed_sites();
    assert_eq!(relaxed[0].id(), 0);
    // The cell of the first site is the strip [0, 1.5] x [0, 10].
    assert_approx_eq!(f64, relaxed[0].loc().x, 0.75, epsilon = 1e-12);
    assert_approx_eq!(f64, relaxed[0].loc().y, 5., epsilon = 1e-12);

    // Two sites converge to the centers of both halves of the box.
    let voronoi = voronoi.relax(50).unwrap();
    assert_approx_eq!(f64, voronoi.sites()[0].loc().x, 2.5, epsilon = 1e-6);
    assert_approx_eq!(f64, voronoi.sites()[1].loc().x, 7.5, epsilon = 1e-6);
}

#[test]
fn test_write() {
    let voronoi = VoronoiDiagram::build(&sites(&[(2., 5.), (8., 5.)]), unit_box()).unwrap();
    let mut buffer = vec![];
    voronoi.write_edges(&mut buffer).unwrap();
    let edges = String::from_utf8(buffer).unwrap();
    assert_eq!(edges.lines().count(), voronoi.edges().len());
    assert_eq!(edges.lines().filter(|l| !l.contains('-')).count(), 1);

    let mut buffer = vec![];
    voronoi.write_cells(&mut buffer).unwrap();
    let cells = String::from_utf8(buffer).unwrap();
    assert_eq!(cells.lines().count(), 2);
    let first = cells.lines().next().unwrap();
    assert!(first.starts_with("0\t"));
    assert!(first.contains("(2, 5)"));
}
