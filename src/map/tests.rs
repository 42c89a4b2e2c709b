use super::*;
use strum::IntoEnumIterator;

#[test]
fn cell_state_default_is_empty() {
    let cell = CellState::default();

    assert_eq!(cell, CellState::empty());
    assert_eq!(cell.tile(), 0);
    assert_eq!(cell.alter(), 0);

    for layer in CellLayer::iter() {
        assert!(!cell.has_unit(layer));
        assert_eq!(cell.unit(layer), Unit::None);
        assert_eq!(cell.player(layer), Player::Neutral);
        assert_eq!(cell.spread(layer), 0);
        assert!(!cell.anchor(layer));
    }
}

#[test]
fn cell_state_fields_roundtrip_both_layers() {
    let mut cell = CellState::empty();

    cell.set_tile(TILE_ID_MAX);
    cell.set_alter(0xBEEF);

    cell.set_unit(CellLayer::Below, Unit::GoldMine);
    cell.set_orient(CellLayer::Below, SpriteDir::NorthWest);
    cell.set_player(CellLayer::Below, Player::Yellow);
    cell.set_spread(CellLayer::Below, SPREAD_MAX);
    cell.set_anchor(CellLayer::Below, true);

    cell.set_unit(CellLayer::Above, Unit::GnomishFlyingMachine);
    cell.set_orient(CellLayer::Above, SpriteDir::South);
    cell.set_player(CellLayer::Above, Player::Red);
    cell.set_spread(CellLayer::Above, 1);
    cell.set_anchor(CellLayer::Above, false);

    assert_eq!(cell.tile(), TILE_ID_MAX);
    assert_eq!(cell.alter(), 0xBEEF);

    assert_eq!(cell.unit(CellLayer::Below), Unit::GoldMine);
    assert_eq!(cell.orient(CellLayer::Below), SpriteDir::NorthWest);
    assert_eq!(cell.player(CellLayer::Below), Player::Yellow);
    assert_eq!(cell.spread(CellLayer::Below), SPREAD_MAX);
    assert!(cell.anchor(CellLayer::Below));

    assert_eq!(cell.unit(CellLayer::Above), Unit::GnomishFlyingMachine);
    assert_eq!(cell.orient(CellLayer::Above), SpriteDir::South);
    assert_eq!(cell.player(CellLayer::Above), Player::Red);
    assert_eq!(cell.spread(CellLayer::Above), 1);
    assert!(!cell.anchor(CellLayer::Above));
}

#[test]
fn cell_state_layers_are_independent() {
    let mut cell = CellState::empty();

    cell.set_unit(CellLayer::Below, Unit::Peasant);
    cell.set_player(CellLayer::Below, Player::Blue);

    assert!(cell.has_unit(CellLayer::Below));
    assert!(!cell.has_unit(CellLayer::Above));
    assert_eq!(cell.unit(CellLayer::Above), Unit::None);
    assert_eq!(cell.player(CellLayer::Above), Player::Neutral);

    // Clearing the occupied layer must not disturb terrain state.
    cell.set_tile(0x123);
    cell.clear_unit(CellLayer::Below);

    assert!(!cell.has_unit(CellLayer::Below));
    assert_eq!(cell.player(CellLayer::Below), Player::Neutral);
    assert!(!cell.anchor(CellLayer::Below));
    assert_eq!(cell.tile(), 0x123);
}

#[test]
#[should_panic]
fn cell_state_tile_out_of_range_panics() {
    let mut cell = CellState::empty();
    cell.set_tile(TILE_ID_MAX + 1);
}

#[test]
#[should_panic]
fn cell_state_spread_out_of_range_panics() {
    let mut cell = CellState::empty();
    cell.set_spread(CellLayer::Below, SPREAD_MAX + 1);
}

#[test]
fn grid_allocation_and_clear() {
    let mut grid = CellGrid::with_dims(MapDimensions::Cells32x32).unwrap();
    assert_eq!(grid.size(), Size::new(32, 32));

    let cell = Cell::new(5, 7);
    grid.cell_state_mut(cell).set_unit(CellLayer::Below, Unit::Footman);
    assert!(grid.cell_state(cell).has_unit(CellLayer::Below));

    grid.clear();
    assert!(!grid.cell_state(cell).has_unit(CellLayer::Below));
    assert_eq!(*grid.cell_state(cell), CellState::empty());
}

#[test]
fn grid_bounds_checks() {
    let grid = CellGrid::new(Size::new(64, 32)).unwrap();

    assert!(grid.is_cell_within_bounds(Cell::zero()));
    assert!(grid.is_cell_within_bounds(Cell::new(63, 31)));
    assert!(!grid.is_cell_within_bounds(Cell::new(64, 0)));
    assert!(!grid.is_cell_within_bounds(Cell::new(0, 32)));
    assert!(!grid.is_cell_within_bounds(Cell::invalid()));

    assert!(grid.try_cell_state(Cell::new(63, 31)).is_some());
    assert!(grid.try_cell_state(Cell::new(64, 31)).is_none());
}

#[test]
#[should_panic]
fn grid_out_of_bounds_access_panics() {
    let grid = CellGrid::with_dims(MapDimensions::Cells32x32).unwrap();
    let _ = grid.cell_state(Cell::new(32, 0));
}

#[test]
fn map_dimensions_from_raw() {
    assert_eq!(MapDimensions::from_raw(0).unwrap(), MapDimensions::Cells32x32);
    assert_eq!(MapDimensions::from_raw(3).unwrap(), MapDimensions::Cells128x128);
    assert!(MapDimensions::from_raw(4).is_err());

    let err = MapDimensions::from_raw(99).unwrap_err();
    assert!(matches!(err, EditorError::Configuration { .. }));
}

#[test]
fn map_dimensions_ratio_table() {
    assert_eq!(MapDimensions::Cells32x32.minimap_ratio(), 6.0);
    assert_eq!(MapDimensions::Cells64x64.minimap_ratio(), 3.0);
    assert_eq!(MapDimensions::Cells96x96.minimap_ratio(), 2.0);
    assert_eq!(MapDimensions::Cells128x128.minimap_ratio(), 1.5);
}
