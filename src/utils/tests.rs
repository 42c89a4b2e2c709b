use super::*;

#[test]
fn cell_range_iterates_row_major() {
    let range = CellRange::new(Cell::new(1, 1), Cell::new(3, 2));
    let cells: Vec<Cell> = range.iter().collect();

    assert_eq!(cells, vec![
        Cell::new(1, 1), Cell::new(2, 1), Cell::new(3, 1),
        Cell::new(1, 2), Cell::new(2, 2), Cell::new(3, 2),
    ]);
}

#[test]
fn cell_range_single_cell() {
    let cell = Cell::new(5, 9);
    let cells: Vec<Cell> = CellRange::new(cell, cell).iter().collect();
    assert_eq!(cells, vec![cell]);
}

#[test]
fn cell_range_invalid_is_empty() {
    // end before start
    let range = CellRange::new(Cell::new(3, 3), Cell::new(1, 1));
    assert!(!range.is_valid());
    assert_eq!(range.iter().count(), 0);

    let range = CellRange::new(Cell::invalid(), Cell::zero());
    assert_eq!(range.iter().count(), 0);
}

#[test]
fn rect_geometry() {
    let mut rect = Rect::new(Point::new(10, 20), Size::new(30, 40));

    assert_eq!(rect.x(), 10);
    assert_eq!(rect.y(), 20);
    assert_eq!(rect.width(), 30);
    assert_eq!(rect.height(), 40);
    assert!(rect.is_valid());

    assert!(rect.contains_point(Point::new(10, 20)));
    assert!(rect.contains_point(Point::new(39, 59)));
    assert!(!rect.contains_point(Point::new(40, 59))); // maxs is exclusive
    assert!(!rect.contains_point(Point::new(9, 20)));

    rect.set_position(Point::new(0, 0));
    assert_eq!(rect.size(), Size::new(30, 40));
    assert_eq!(rect.position(), Point::zero());

    rect.set_size(Size::new(5, 5));
    assert_eq!(rect.maxs, Point::new(5, 5));
}

#[test]
fn size_and_cell_validity() {
    assert!(Size::new(1, 1).is_valid());
    assert!(!Size::zero().is_valid());
    assert!(!Size::new(-1, 5).is_valid());

    assert!(Cell::zero().is_valid());
    assert!(!Cell::invalid().is_valid());
    assert_eq!(Cell::new(3, 4).to_string(), "[3,4]");
    assert_eq!(Size::new(32, 32).to_string(), "32x32");
}
