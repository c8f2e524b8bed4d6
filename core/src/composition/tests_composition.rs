use super::*;
use crate::error::StageError;

fn square(cx: f64, cy: f64, size: f64) -> Figure {
    let h = size / 2.0;
    Figure::from_points(&[[cx - h, cy - h], [cx + h, cy - h], [cx + h, cy + h], [cx - h, cy + h]])
}

fn triangle() -> Figure {
    Figure::from_points(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0]])
}

#[test]
fn test_defaults() {
    let comp = Composition::default();
    assert_eq!(comp.bounds(), [[0.0, 0.0], [100.0, 100.0]]);
    assert!(comp.snap());
    assert_eq!(comp.snap_tolerance(), 0.001);
    assert!(!comp.process_gaps());
    assert!(!comp.debug());
    assert!(comp.is_empty());
}

#[test]
fn test_ids_are_sequential_and_never_reused() {
    let mut comp = Composition::default();
    let a = comp.add(square(0.0, 0.0, 1.0)).unwrap();
    let b = comp.add(square(10.0, 0.0, 1.0)).unwrap();
    assert_eq!(a.to_string(), "fig-0");
    assert_eq!(b.to_string(), "fig-1");

    assert!(comp.remove(b).unwrap());
    let c = comp.add(square(20.0, 0.0, 1.0)).unwrap();
    assert_eq!(c.to_string(), "fig-2");
    assert_eq!(comp.ids(), vec![a, c]);
}

#[test]
fn test_remove_unknown_changes_nothing() {
    let mut comp = Composition::default();
    comp.add(square(0.0, 0.0, 1.0)).unwrap();
    comp.add(square(0.5, 0.5, 1.0)).unwrap();
    let before = comp.normalize();
    let (raw, subs, pairs) = (comp.raw.len(), comp.subsections.len(), comp.intersecting());

    assert!(!comp.remove(FigureId::new(42)).unwrap());
    assert_eq!(comp.normalize(), before);
    assert_eq!(comp.raw.len(), raw);
    assert_eq!(comp.subsections.len(), subs);
    assert_eq!(comp.intersecting(), pairs);
    assert_eq!(comp.history().len(), 3);
}

#[test]
fn test_get_unknown_is_none() {
    let comp = Composition::default();
    assert!(comp.get(FigureId::new(0)).is_none());
}

#[test]
fn test_raw_index_follows_figures() {
    let mut comp = Composition::default();
    let a = comp.add(square(0.0, 0.0, 1.0)).unwrap();
    let b = comp.add(square(1.0, 0.0, 1.0)).unwrap();

    for v in comp.get(a).unwrap().vertices() {
        assert!(comp.raw.at(&v).unwrap().has_tag(a));
    }
    let shared = Vertex::new(0.5, 0.5);
    assert_eq!(comp.raw.at(&shared).unwrap().tags(), vec![a, b]);

    comp.remove(a).unwrap();
    assert_eq!(comp.raw.at(&shared).unwrap().tags(), vec![b]);
    assert!(comp.raw.at(&Vertex::new(-0.5, -0.5)).is_none());
    assert_eq!(comp.raw.len(), 4);
}

#[test]
fn test_subsections_are_tagged_with_both_owners() {
    let mut comp = Composition::default();
    let a = comp.add(square(0.0, 0.0, 2.0)).unwrap();
    let b = comp.add(Figure::from_points(&[[1.0, -0.5], [2.0, -0.5], [2.0, 0.5], [1.0, 0.5]])).unwrap();

    // The shared wall x = 1 splits into three pieces over four points
    assert_eq!(comp.subsections.len(), 4);
    let entry = comp.subsections.at(&Vertex::new(1.0, 0.5)).unwrap();
    assert_eq!(entry.tags(), vec![a, b]);

    comp.remove(b).unwrap();
    assert!(comp.subsections.is_empty());
}

#[test]
fn test_transform_moves_subsections() {
    let mut comp = Composition::default();
    comp.add(square(0.0, 0.0, 1.0)).unwrap();
    let b = comp.add(square(1.0, 0.0, 1.0)).unwrap();
    assert!(!comp.subsections.is_empty());

    comp.move_to(b, [10.0, 0.0]).unwrap();
    assert!(comp.subsections.is_empty());
    comp.move_to(b, [0.0, 0.0]).unwrap();
    assert!(!comp.subsections.is_empty());
}

#[test]
fn test_intersecting_pairs_track_mutations() {
    let mut comp = Composition::default();
    let a = comp.add(square(0.0, 0.0, 1.0)).unwrap();
    let b = comp.add(square(0.5, 0.5, 1.0)).unwrap();
    assert_eq!(comp.intersecting(), vec![FigurePair::new(a, b)]);

    comp.move_to(b, [20.0, 20.0]).unwrap();
    assert!(comp.intersecting().is_empty());

    comp.move_to(b, [0.25, 0.25]).unwrap();
    assert_eq!(comp.intersecting(), vec![FigurePair::new(b, a)]);

    comp.remove(a).unwrap();
    assert!(comp.intersecting().is_empty());
}

#[test]
fn test_overlapping_pairs() {
    let mut comp = Composition::default();
    let a = comp.add(square(0.0, 0.0, 1.0)).unwrap();
    let b = comp.add(square(0.5, 0.0, 1.0)).unwrap();
    let c = comp.add(square(5.0, 0.0, 1.0)).unwrap();

    let pairs = comp.overlapping();
    assert_eq!(pairs, vec![FigurePair::new(a, b)]);
    assert!(!pairs.iter().any(|p| p.contains(c)));
}

#[test]
fn test_floats_and_neighbours() {
    let mut comp = Composition::default();
    let a = comp.add(square(0.0, 0.0, 1.0)).unwrap();
    assert_eq!(comp.floats(), vec![a]);

    let b = comp.add(square(1.0, 0.0, 1.0)).unwrap();
    assert!(comp.floats().is_empty());

    // Each square keeps two corners to itself and three free edges
    assert_eq!(comp.non_integrated(), vec![a, b]);
    assert_eq!(comp.non_coincident(), vec![a, b]);
}

#[test]
fn test_edges_carry_owner() {
    let mut comp = Composition::default();
    let a = comp.add(square(0.0, 0.0, 1.0)).unwrap();
    let b = comp.add(triangle()).unwrap();

    let edges = comp.edges();
    assert_eq!(edges.len(), 7);
    assert_eq!(edges.iter().filter(|e| e.id == a).count(), 4);
    assert_eq!(edges.iter().filter(|e| e.id == b).count(), 3);
}

#[test]
fn test_snap_on_move() {
    let mut comp = Composition::default();
    comp.add(triangle()).unwrap();
    let b = comp.add_with(triangle(), MutationOptions::snap(false)).unwrap();
    comp.move_to(b, [10.0, 10.0]).unwrap();

    // Bounds diagonal ~141.42, so the snap radius is ~0.1414
    let outcome = comp.move_to(b, [1.05, 0.0]).unwrap();
    assert!(outcome.snapped);
    assert_eq!(outcome.start, Vertex::new(10.0, 10.0));
    assert_eq!(outcome.target, Some(Vertex::new(1.05, 0.0)));
    assert!(vertex::same(&outcome.final_position, &Vertex::new(1.0, 0.0)));
    assert!(vertex::same(&comp.get(b).unwrap().position(), &Vertex::new(1.0, 0.0)));

    let outcome = comp.move_to(b, [1.2, 0.0]).unwrap();
    assert!(!outcome.snapped);
    assert_eq!(outcome.final_position, Vertex::new(1.2, 0.0));
}

#[test]
fn test_snap_can_be_suppressed() {
    let mut comp = Composition::default();
    comp.add(triangle()).unwrap();
    let b = comp.add_with(triangle(), MutationOptions::snap(false)).unwrap();

    let outcome = comp
        .transform_with(b, Transform::position([1.05, 0.0]), MutationOptions::snap(false))
        .unwrap();
    assert!(!outcome.snapped);
    assert_eq!(outcome.final_position, Vertex::new(1.05, 0.0));

    comp.set_snap(false);
    let outcome = comp.move_to(b, [1.04, 0.0]).unwrap();
    assert!(!outcome.snapped);
}

#[test]
fn test_snap_on_add() {
    let mut comp = Composition::default();
    comp.add(square(0.0, 0.0, 1.0)).unwrap();
    let b = comp.add(square(1.02, 0.01, 1.0)).unwrap();

    let snapped = comp.get(b).unwrap();
    assert!(figure::same(snapped, &square(1.0, 0.0, 1.0)));
}

#[test]
fn test_huge_snap_tolerance_reaches_any_vertex() {
    let mut comp = Composition::default();
    comp.set_snap_tolerance(1e30);
    comp.add(square(5.5, 5.5, 1.0)).unwrap();
    let b = comp.add(square(10.5, 10.5, 1.0)).unwrap();

    assert_eq!(comp.len(), 2);
    assert!(comp.diagnostics().is_empty());
    assert!(figure::same(comp.get(b).unwrap(), &square(6.5, 6.5, 1.0)));
}

#[test]
fn test_rotation_and_reflection() {
    let mut comp = Composition::default();
    let id = comp.add(triangle()).unwrap();

    let outcome = comp.rotate_to(id, std::f64::consts::PI).unwrap();
    assert_eq!(outcome.target, None);
    assert!(!outcome.snapped);
    assert!(figure::same(
        comp.get(id).unwrap(),
        &Figure::from_points(&[[0.0, 0.0], [0.0, -1.0], [-1.0, 0.0]])
    ));

    comp.reflect_own_x(id).unwrap();
    assert!(comp.get(id).unwrap().reflection().x);
    comp.reflect_own_x(id).unwrap();
    assert!(!comp.get(id).unwrap().reflection().x);
    comp.reflect_own_y(id).unwrap();
    assert!(comp.get(id).unwrap().reflection().y);
}

#[test]
fn test_transform_unknown_figure() {
    let mut comp = Composition::default();
    let err = comp.move_to(FigureId::new(3), [0.0, 0.0]).unwrap_err();
    assert_eq!(err, CompositionError::UnknownFigure(FigureId::new(3)));
}

#[test]
fn test_bounds_are_ordered() {
    let mut comp = Composition::default();
    comp.set_bounds([100.0, 100.0], [-100.0, -100.0]);
    assert_eq!(comp.bounds(), [[-100.0, -100.0], [100.0, 100.0]]);

    comp.set_bounds([-5.0, 0.0], [5.0, 10.0]);
    assert_eq!(comp.bounds(), [[-5.0, 0.0], [5.0, 10.0]]);
}

#[test]
fn test_stage_failures_are_collected() {
    let mut comp = Composition::default();
    let bad = Figure::from_points(&[[0.0, 0.0], [f64::NAN, 1.0], [1.0, 0.0]]);

    let id = comp.add(bad).unwrap();
    assert!(comp.get(id).is_some());
    let failure = &comp.diagnostics()[0];
    assert_eq!(failure.stage, "snap");
    assert_eq!(failure.action, Action::Insert);
    assert_eq!(failure.figure, id);

    comp.clear_diagnostics();
    assert!(comp.diagnostics().is_empty());
}

#[test]
fn test_debug_mode_propagates_failures() {
    let mut comp = Composition::new(CompositionOptions { debug: true, ..CompositionOptions::default() });
    let bad = Figure::from_points(&[[0.0, 0.0], [f64::NAN, 1.0], [1.0, 0.0]]);

    match comp.add(bad) {
        Err(CompositionError::Stage { stage, action, source }) => {
            assert_eq!(stage, "snap");
            assert_eq!(action, Action::Insert);
            assert!(matches!(source, StageError::Degenerate(_)));
        }
        other => panic!("Expected a stage failure, got {:?}", other),
    }
    assert!(comp.diagnostics().is_empty());

    // The failed call still consumed its id
    let next = comp.add(square(10.0, 10.0, 1.0)).unwrap();
    assert_eq!(next, FigureId::new(1));
}

#[test]
fn test_same_compositions() {
    let mut a = Composition::default();
    let mut b = Composition::default();
    a.add(square(0.0, 0.0, 1.0)).unwrap();
    a.add(triangle()).unwrap();
    b.add(triangle()).unwrap();
    b.add(square(0.0, 0.0, 1.0)).unwrap();
    assert!(same(&a, &b));

    let id = b.ids()[0];
    b.move_to(id, [30.0, 30.0]).unwrap();
    assert!(!same(&a, &b));
}

#[test]
fn test_figure_id_parsing() {
    assert_eq!("fig-12".parse::<FigureId>().unwrap(), FigureId::new(12));
    assert!("fig-".parse::<FigureId>().is_err());
    assert!("figure-1".parse::<FigureId>().is_err());
    assert_eq!(serde_json::to_value(FigureId::new(4)).unwrap(), "fig-4");
}
