use super::*;
use crate::error::ValidationError;
use serde_json::json;

fn square(cx: f64, cy: f64, size: f64) -> Figure {
    let h = size / 2.0;
    Figure::from_points(&[[cx - h, cy - h], [cx + h, cy - h], [cx + h, cy + h], [cx - h, cy + h]])
}

#[test]
fn test_history_appending() {
    let mut comp = Composition::default();
    assert_eq!(comp.history().len(), 1);
    assert_eq!(comp.history()[0].method, "init");

    let id = comp.add(square(0.0, 0.0, 1.0)).unwrap();
    comp.move_to(id, [5.0, 5.0]).unwrap();
    comp.reflect_own_y(id).unwrap();
    comp.remove(id).unwrap();

    let methods: Vec<&str> = comp.history().iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, vec!["init", "add", "transform", "transform", "remove"]);

    let add = &comp.history()[1];
    assert_eq!(add.args, vec![square(0.0, 0.0, 1.0).normalize()]);

    let moved = &comp.history()[2];
    assert_eq!(moved.args, vec![json!("fig-0"), json!({"position": [5.0, 5.0]})]);
}

#[test]
fn test_settings_are_recorded() {
    let mut comp = Composition::default();
    comp.set_bounds([0.0, 0.0], [10.0, 10.0]);
    comp.set_snap(false);
    comp.set_snap_tolerance(0.01);
    comp.set_process_gaps(true);

    let last: Vec<&str> = comp.history()[1..].iter().map(|r| r.method.as_str()).collect();
    assert_eq!(last, vec!["bounds", "snap", "snapTolerance", "processGaps"]);
    assert_eq!(comp.history()[1].args, vec![json!([0.0, 0.0]), json!([10.0, 10.0])]);
}

#[test]
fn test_failed_calls_are_not_recorded() {
    let mut comp = Composition::default();
    comp.remove(FigureId::new(7)).unwrap();
    assert!(comp.move_to(FigureId::new(7), [1.0, 1.0]).is_err());
    assert_eq!(comp.history().len(), 1);
}

#[test]
fn test_replay_rebuilds_composition() {
    let mut comp = Composition::new(CompositionOptions { process_gaps: true, ..CompositionOptions::default() });
    let a = comp.add(square(0.0, 0.0, 1.0)).unwrap();
    let b = comp.add_with(square(3.0, 0.0, 1.0), MutationOptions::snap(false)).unwrap();
    comp.add(square(6.0, 0.0, 1.0)).unwrap();
    comp.move_to(b, [-2.0, 0.0]).unwrap();
    comp.rotate_to(a, 0.5).unwrap();
    comp.remove(a).unwrap();
    comp.set_snap_tolerance(0.002);

    let rebuilt = from_history(comp.history()).unwrap();
    assert!(same(&comp, &rebuilt));
    assert_eq!(rebuilt.ids(), comp.ids());
    assert_eq!(rebuilt.options(), comp.options());
    assert_eq!(rebuilt.history(), comp.history());
}

#[test]
fn test_replay_onto_existing_composition() {
    let mut source = Composition::default();
    source.add(square(0.0, 0.0, 1.0)).unwrap();

    let mut target = Composition::default();
    target.add(square(50.0, 50.0, 1.0)).unwrap();
    // The leading init record resets the target first
    replay(source.history(), &mut target).unwrap();
    assert_eq!(target.normalize(), source.normalize());
}

#[test]
fn test_history_wire_format() {
    let mut comp = Composition::default();
    comp.add(square(0.0, 0.0, 1.0)).unwrap();

    let text = serde_json::to_string(comp.history()).unwrap();
    let parsed: Vec<HistoryRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, comp.history());
    assert!(same(&from_history(&parsed).unwrap(), &comp));
}

#[test]
fn test_replay_rejects_bad_records() {
    let unknown = vec![HistoryRecord { method: "explode".into(), args: vec![] }];
    assert_eq!(
        from_history(&unknown).unwrap_err(),
        CompositionError::Validation(ValidationError::UnknownMethod("explode".into()))
    );

    let missing = vec![HistoryRecord { method: "remove".into(), args: vec![] }];
    assert!(matches!(
        from_history(&missing),
        Err(CompositionError::Validation(ValidationError::Malformed(_)))
    ));

    let shape_not_figure = vec![HistoryRecord {
        method: "add".into(),
        args: vec![json!({"type": "shape", "data": {"vertices": [[0, 0], [1, 0], [0, 1]]}})],
    }];
    assert!(matches!(
        from_history(&shape_not_figure),
        Err(CompositionError::Validation(ValidationError::UnexpectedType { .. }))
    ));
}
