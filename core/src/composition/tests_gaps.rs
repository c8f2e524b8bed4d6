use super::*;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Figure {
    Figure::from_points(&[[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
}

fn with_gaps() -> Composition {
    Composition::new(CompositionOptions { process_gaps: true, ..CompositionOptions::default() })
}

/// Four rectangles framing a unit hole at (1,1)-(2,2).
fn pinwheel(comp: &mut Composition) -> Vec<FigureId> {
    [
        rect(0.0, 0.0, 2.0, 1.0),
        rect(2.0, 0.0, 3.0, 2.0),
        rect(1.0, 2.0, 3.0, 3.0),
        rect(0.0, 1.0, 1.0, 3.0),
    ]
    .into_iter()
    .map(|f| comp.add(f).unwrap())
    .collect()
}

fn hole() -> Figure {
    rect(1.0, 1.0, 2.0, 2.0)
}

#[test]
fn test_closing_the_frame_creates_one_gap() {
    let mut comp = with_gaps();
    let ids = pinwheel(&mut comp);
    assert_eq!(ids.len(), 4);

    assert_eq!(comp.gaps().len(), 1);
    assert!(figure::same(&comp.gaps()[0], &hole()));
    assert!(comp.diagnostics().is_empty());
}

#[test]
fn test_no_gaps_without_processing() {
    let mut comp = Composition::default();
    pinwheel(&mut comp);
    assert!(comp.gaps().is_empty());
}

#[test]
fn test_filling_and_emptying_the_hole() {
    let mut comp = with_gaps();
    pinwheel(&mut comp);

    let center = comp.add(hole()).unwrap();
    assert!(comp.gaps().is_empty());

    comp.remove(center).unwrap();
    assert_eq!(comp.gaps().len(), 1);
    assert!(figure::same(&comp.gaps()[0], &hole()));
}

#[test]
fn test_opening_the_frame_removes_the_gap() {
    let mut comp = with_gaps();
    let ids = pinwheel(&mut comp);

    comp.remove(ids[3]).unwrap();
    assert!(comp.gaps().is_empty());
}

#[test]
fn test_moving_a_frame_piece() {
    let mut comp = with_gaps();
    let ids = pinwheel(&mut comp);

    comp.move_to(ids[3], [10.0, 10.0]).unwrap();
    assert!(comp.gaps().is_empty());

    comp.move_to(ids[3], [0.0, 0.0]).unwrap();
    assert_eq!(comp.gaps().len(), 1);
    assert!(figure::same(&comp.gaps()[0], &hole()));
}

#[test]
fn test_partly_filled_hole_leaves_the_rest() {
    let mut comp = with_gaps();
    pinwheel(&mut comp);
    comp.add(rect(1.0, 1.0, 1.5, 2.0)).unwrap();

    assert_eq!(comp.gaps().len(), 1);
    assert!(figure::same(&comp.gaps()[0], &rect(1.5, 1.0, 2.0, 2.0)));
    for gap in comp.gaps() {
        for (_, f) in comp.figures() {
            assert!(!figure::overlap(gap, f));
        }
    }
}

#[test]
fn test_one_mutation_splits_a_gap_in_two() {
    let mut comp = with_gaps();
    for piece in [
        rect(0.0, 0.0, 5.0, 1.0),
        rect(0.0, 2.0, 5.0, 3.0),
        rect(0.0, 1.0, 1.0, 2.0),
        rect(4.0, 1.0, 5.0, 2.0),
    ] {
        comp.add(piece).unwrap();
    }
    assert_eq!(comp.gaps().len(), 1);
    assert!(figure::same(&comp.gaps()[0], &rect(1.0, 1.0, 4.0, 2.0)));

    comp.add(rect(2.0, 1.0, 3.0, 2.0)).unwrap();
    assert_eq!(comp.gaps().len(), 2);
    assert!(comp.gaps().iter().any(|g| figure::same(g, &rect(1.0, 1.0, 2.0, 2.0))));
    assert!(comp.gaps().iter().any(|g| figure::same(g, &rect(3.0, 1.0, 4.0, 2.0))));
    assert!(comp.diagnostics().is_empty());
}
