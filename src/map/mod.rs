use num_enum::TryFromPrimitive;
use strum::{Display, EnumCount, EnumIter};

use crate::log;
use crate::error::EditorError;
use crate::utils::{Cell, Size};
use crate::sprite::{SpriteDir, Unit};

#[cfg(test)]
mod tests;

const MAP_LOG_CHANNEL: log::Channel = log::channel!("map");

// ----------------------------------------------
// MapDimensions
// ----------------------------------------------

// The four map sizes supported by the scenario format. Raw size tier
// values read from a scenario file must go through `from_raw()`; every
// table indexed by map size is total once past that boundary.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumCount, EnumIter, TryFromPrimitive)]
pub enum MapDimensions {
    Cells32x32,
    Cells64x64,
    Cells96x96,
    Cells128x128,
}

impl MapDimensions {
    pub fn from_raw(raw: u32) -> Result<Self, EditorError> {
        Self::try_from(raw).map_err(|_| {
            EditorError::Configuration {
                detail: format!("unsupported map size tier [{raw}]"),
            }
        })
    }

    #[inline]
    pub const fn size(self) -> Size {
        match self {
            Self::Cells32x32   => Size::new(32, 32),
            Self::Cells64x64   => Size::new(64, 64),
            Self::Cells96x96   => Size::new(96, 96),
            Self::Cells128x128 => Size::new(128, 128),
        }
    }

    // Scale applied when displaying the minimap, in screen pixels per map
    // cell. Larger maps use a smaller ratio so the on-screen footprint of
    // the minimap widget stays bounded.
    #[inline]
    pub const fn minimap_ratio(self) -> f32 {
        match self {
            Self::Cells32x32   => 6.0,
            Self::Cells64x64   => 3.0,
            Self::Cells96x96   => 2.0,
            Self::Cells128x128 => 1.5,
        }
    }
}

// ----------------------------------------------
// Player
// ----------------------------------------------

// Owning player of a unit. 3 bits in the packed cell state:
// 7 player slots plus the neutral (no owner) sentinel.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, EnumCount, EnumIter, TryFromPrimitive)]
#[strum(serialize_all = "lowercase")]
pub enum Player {
    #[default]
    Neutral,
    Red,
    Blue,
    Green,
    Violet,
    Orange,
    White,
    Yellow,
}

// ----------------------------------------------
// CellLayer
// ----------------------------------------------

// Each cell tracks two independent occupant slots: `Below` for ground
// units, resource nodes and decorations, `Above` for whatever is logically
// rendered over them (air units, buildings over decoration). These are
// independent slots, not a stack.
#[repr(usize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumCount, EnumIter)]
pub enum CellLayer {
    Below,
    Above,
}

// ----------------------------------------------
// CellState
// ----------------------------------------------

// Bit layout of `CellState::bits`, LSB first:
//
//   tile         : 12  [ 0..12]  terrain tile id (0-4095)
//   unit_below   :  7  [12..19]  unit id, 0 = none
//   unit_above   :  7  [19..26]
//   orient_below :  3  [26..29]  8 facings
//   orient_above :  3  [29..32]
//   player_below :  3  [32..35]  owning player, incl. neutral sentinel
//   player_above :  3  [35..38]
//   spread_below :  2  [38..40]  auxiliary visual variant
//   spread_above :  2  [40..42]
//   anchor_below :  1  [42]      cell is the occupant's origin tile
//   anchor_above :  1  [43]
//
// When a layer's unit is none, the remaining sub-fields of that layer are
// don't-care and must not be read as meaningful.
const TILE_SHIFT: u32 = 0;
const TILE_BITS: u32 = 12;

const UNIT_SHIFT: [u32; CellLayer::COUNT] = [12, 19];
const UNIT_BITS: u32 = 7;

const ORIENT_SHIFT: [u32; CellLayer::COUNT] = [26, 29];
const ORIENT_BITS: u32 = 3;

const PLAYER_SHIFT: [u32; CellLayer::COUNT] = [32, 35];
const PLAYER_BITS: u32 = 3;

const SPREAD_SHIFT: [u32; CellLayer::COUNT] = [38, 40];
const SPREAD_BITS: u32 = 2;

const ANCHOR_SHIFT: [u32; CellLayer::COUNT] = [42, 43];
const ANCHOR_BITS: u32 = 1;

pub const TILE_ID_MAX: u16 = (1 << TILE_BITS) - 1;
pub const SPREAD_MAX: u8 = (1 << SPREAD_BITS) - 1;

// Per-tile map state. The all-zeroes value is the empty cell: default
// terrain, no units in either layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CellState {
    // Opaque terrain modifier/version tag owned by the terrain subsystem.
    alter: u16,
    bits: u64,
}

impl CellState {
    #[inline]
    pub const fn empty() -> Self {
        Self { alter: 0, bits: 0 }
    }

    #[inline]
    fn field(&self, shift: u32, bits: u32) -> u64 {
        (self.bits >> shift) & ((1 << bits) - 1)
    }

    #[inline]
    fn set_field(&mut self, shift: u32, bits: u32, value: u64) {
        assert!(value < (1 << bits), "Cell field value {value} exceeds {bits} bits");
        let mask = ((1u64 << bits) - 1) << shift;
        self.bits = (self.bits & !mask) | (value << shift);
    }

    #[inline]
    pub fn alter(&self) -> u16 {
        self.alter
    }

    #[inline]
    pub fn set_alter(&mut self, alter: u16) {
        self.alter = alter;
    }

    #[inline]
    pub fn tile(&self) -> u16 {
        self.field(TILE_SHIFT, TILE_BITS) as u16
    }

    #[inline]
    pub fn set_tile(&mut self, tile: u16) {
        self.set_field(TILE_SHIFT, TILE_BITS, tile as u64);
    }

    #[inline]
    pub fn unit(&self, layer: CellLayer) -> Unit {
        let raw = self.field(UNIT_SHIFT[layer as usize], UNIT_BITS) as u8;
        Unit::try_from(raw).unwrap_or_else(|_| panic!("Cell holds an invalid unit id [{raw}]"))
    }

    #[inline]
    pub fn has_unit(&self, layer: CellLayer) -> bool {
        self.field(UNIT_SHIFT[layer as usize], UNIT_BITS) != Unit::None as u64
    }

    #[inline]
    pub fn set_unit(&mut self, layer: CellLayer, unit: Unit) {
        self.set_field(UNIT_SHIFT[layer as usize], UNIT_BITS, unit as u64);
    }

    // Resets the unit slot of `layer` and every dependent sub-field,
    // so the don't-care fields never hold stale garbage.
    pub fn clear_unit(&mut self, layer: CellLayer) {
        self.set_unit(layer, Unit::None);
        self.set_field(ORIENT_SHIFT[layer as usize], ORIENT_BITS, 0);
        self.set_field(PLAYER_SHIFT[layer as usize], PLAYER_BITS, 0);
        self.set_field(SPREAD_SHIFT[layer as usize], SPREAD_BITS, 0);
        self.set_field(ANCHOR_SHIFT[layer as usize], ANCHOR_BITS, 0);
    }

    #[inline]
    pub fn orient(&self, layer: CellLayer) -> SpriteDir {
        let raw = self.field(ORIENT_SHIFT[layer as usize], ORIENT_BITS) as u8;
        SpriteDir::try_from(raw).unwrap_or_else(|_| panic!("Cell holds an invalid facing [{raw}]"))
    }

    #[inline]
    pub fn set_orient(&mut self, layer: CellLayer, dir: SpriteDir) {
        self.set_field(ORIENT_SHIFT[layer as usize], ORIENT_BITS, dir as u64);
    }

    #[inline]
    pub fn player(&self, layer: CellLayer) -> Player {
        let raw = self.field(PLAYER_SHIFT[layer as usize], PLAYER_BITS) as u8;
        Player::try_from(raw).unwrap_or_else(|_| panic!("Cell holds an invalid player id [{raw}]"))
    }

    #[inline]
    pub fn set_player(&mut self, layer: CellLayer, player: Player) {
        self.set_field(PLAYER_SHIFT[layer as usize], PLAYER_BITS, player as u64);
    }

    #[inline]
    pub fn spread(&self, layer: CellLayer) -> u8 {
        self.field(SPREAD_SHIFT[layer as usize], SPREAD_BITS) as u8
    }

    #[inline]
    pub fn set_spread(&mut self, layer: CellLayer, spread: u8) {
        self.set_field(SPREAD_SHIFT[layer as usize], SPREAD_BITS, spread as u64);
    }

    #[inline]
    pub fn anchor(&self, layer: CellLayer) -> bool {
        self.field(ANCHOR_SHIFT[layer as usize], ANCHOR_BITS) != 0
    }

    #[inline]
    pub fn set_anchor(&mut self, layer: CellLayer, anchor: bool) {
        self.set_field(ANCHOR_SHIFT[layer as usize], ANCHOR_BITS, anchor as u64);
    }
}

// ----------------------------------------------
// CellGrid
// ----------------------------------------------

// The authoritative per-tile state for the whole map: `height` rows by
// `width` columns of `CellState`, owned by the active editor session.
//
// Addressing is by (column, row). Out-of-range indexing through
// `cell_state()`/`cell_state_mut()` is a contract violation and panics;
// callers bounds-check with `is_cell_within_bounds()` or use the `try_`
// variants.
pub struct CellGrid {
    size: Size,
    cells: Vec<CellState>,
}

impl CellGrid {
    pub fn new(size: Size) -> Result<Self, EditorError> {
        assert!(size.is_valid(), "Invalid cell grid dimensions: {size}");

        let cell_count = (size.width * size.height) as usize;

        let mut cells = Vec::new();
        cells.try_reserve_exact(cell_count)
            .map_err(|_| EditorError::Allocation { what: "cell grid" })?;
        cells.resize(cell_count, CellState::empty());

        log::verbose!(MAP_LOG_CHANNEL, "Allocated {size} cell grid");

        Ok(Self {
            size: size,
            cells: cells,
        })
    }

    #[inline]
    pub fn with_dims(dims: MapDimensions) -> Result<Self, EditorError> {
        Self::new(dims.size())
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    // Resets every cell to the empty state without reallocating.
    pub fn clear(&mut self) {
        self.cells.fill(CellState::empty());
    }

    #[inline]
    pub fn is_cell_within_bounds(&self, cell: Cell) -> bool {
        if (cell.x < 0 || cell.x >= self.size.width) ||
           (cell.y < 0 || cell.y >= self.size.height) {
            return false;
        }
        true
    }

    #[inline]
    pub fn cell_state(&self, cell: Cell) -> &CellState {
        debug_assert!(self.is_cell_within_bounds(cell));
        &self.cells[self.cell_to_index(cell)]
    }

    #[inline]
    pub fn cell_state_mut(&mut self, cell: Cell) -> &mut CellState {
        debug_assert!(self.is_cell_within_bounds(cell));
        let index = self.cell_to_index(cell);
        &mut self.cells[index]
    }

    // Fails with None if the cell indices are not within bounds.
    #[inline]
    pub fn try_cell_state(&self, cell: Cell) -> Option<&CellState> {
        if !self.is_cell_within_bounds(cell) {
            return None;
        }
        Some(self.cell_state(cell))
    }

    #[inline]
    pub fn try_cell_state_mut(&mut self, cell: Cell) -> Option<&mut CellState> {
        if !self.is_cell_within_bounds(cell) {
            return None;
        }
        Some(self.cell_state_mut(cell))
    }

    #[inline]
    fn cell_to_index(&self, cell: Cell) -> usize {
        let cell_index = cell.x + (cell.y * self.size.width);
        cell_index as usize
    }
}
