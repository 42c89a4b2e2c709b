use crate::log;
use crate::error::EditorError;
use crate::map::{CellGrid, CellLayer, MapDimensions, Player};
use crate::sprite::{Era, Unit};
use crate::utils::{Cell, Point, Rect, Size};


const MINIMAP_LOG_CHANNEL: log::Channel = log::channel!("minimap");

// ----------------------------------------------
// MinimapColor
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MinimapColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl MinimapColor {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r: r, g: g, b: b, a: 255 }
    }

    pub const RED: Self = Self::new(164, 0, 0);
    pub const BLUE: Self = Self::new(0, 60, 192);
    pub const GREEN: Self = Self::new(44, 180, 148);
    pub const VIOLET: Self = Self::new(152, 72, 176);
    pub const ORANGE: Self = Self::new(248, 140, 20);
    pub const WHITE: Self = Self::new(224, 224, 224);
    pub const YELLOW: Self = Self::new(252, 252, 72);
    pub const LIGHT_GRAY: Self = Self::new(184, 184, 184);
    pub const LIGHT_YELLOW: Self = Self::new(252, 252, 176);
}

// ----------------------------------------------
// Color Lookups
// ----------------------------------------------

pub const fn player_color(player: Player) -> MinimapColor {
    match player {
        Player::Neutral => MinimapColor::LIGHT_GRAY,
        Player::Red     => MinimapColor::RED,
        Player::Blue    => MinimapColor::BLUE,
        Player::Green   => MinimapColor::GREEN,
        Player::Violet  => MinimapColor::VIOLET,
        Player::Orange  => MinimapColor::ORANGE,
        Player::White   => MinimapColor::WHITE,
        Player::Yellow  => MinimapColor::YELLOW,
    }
}

// Resource nodes and critters always use their own colors so they stay
// readable regardless of the owning player slot.
pub const fn unit_color(unit: Unit, player: Player) -> MinimapColor {
    match unit {
        Unit::GoldMine | Unit::OilPatch => MinimapColor::LIGHT_YELLOW,
        Unit::Critter => MinimapColor::WHITE,
        _ => player_color(player),
    }
}

// Coarse terrain family of a tile id, taken from its high byte. Tile ids
// within one family only differ in borders/variations, which the minimap
// does not resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TerrainClass {
    Water,
    Shore,
    Ground,
    Forest,
    Rocks,
    Wall,
}

impl TerrainClass {
    fn of_tile(tile: u16) -> Self {
        match tile >> 8 {
            0x1 => Self::Water,
            0x2 => Self::Shore,
            0x3..=0x6 => Self::Ground,
            0x7 => Self::Forest,
            0x8 => Self::Rocks,
            0x9 => Self::Wall,
            _ => Self::Ground,
        }
    }
}

pub fn terrain_color(era: Era, tile: u16) -> MinimapColor {
    // Rows per era, columns per terrain class.
    const TABLE: [[MinimapColor; 6]; 4] = [
        // Forest
        [MinimapColor::new(0, 0, 164),   MinimapColor::new(204, 176, 140),
         MinimapColor::new(88, 124, 24), MinimapColor::new(0, 60, 0),
         MinimapColor::new(104, 104, 104), MinimapColor::new(160, 160, 160)],
        // Winter
        [MinimapColor::new(20, 40, 180), MinimapColor::new(184, 184, 184),
         MinimapColor::new(252, 252, 252), MinimapColor::new(16, 88, 16),
         MinimapColor::new(120, 120, 120), MinimapColor::new(160, 160, 160)],
        // Wasteland
        [MinimapColor::new(0, 0, 164),   MinimapColor::new(160, 116, 68),
         MinimapColor::new(120, 92, 52), MinimapColor::new(60, 72, 24),
         MinimapColor::new(100, 80, 60), MinimapColor::new(160, 160, 160)],
        // Swamp
        [MinimapColor::new(0, 0, 164),   MinimapColor::new(136, 132, 84),
         MinimapColor::new(84, 100, 60), MinimapColor::new(32, 60, 28),
         MinimapColor::new(96, 96, 88),  MinimapColor::new(160, 160, 160)],
    ];

    TABLE[era as usize][TerrainClass::of_tile(tile) as usize]
}

// ----------------------------------------------
// MinimapSink
// ----------------------------------------------

// Presentation-side counterpart of the minimap. The compositor owns the
// pixel buffer; the sink owns the widget showing it and the scrollable
// main map view.
pub trait MinimapSink {
    // Marks a region of the minimap image as needing a redraw.
    // Coordinates are in minimap pixels (map cells).
    fn dirty_rect(&mut self, rect: Rect);

    // On-screen geometry of the minimap widget.
    fn widget_geometry(&self) -> Rect;

    // Size of one map cell in the main map view, in pixels.
    fn main_view_cell_size(&self) -> Size;

    // Scrolls the main map view so its top-left lands on the given
    // pixel position.
    fn scroll_main_view(&mut self, x: i32, y: i32);
}

// ----------------------------------------------
// Minimap
// ----------------------------------------------

const BYTES_PER_PIXEL: i32 = 4;

// Downscaled live overview of the map: one BGRA pixel per map cell, plus
// the screen-space rectangle marking the currently visible portion of the
// main view.
//
// Cell recoloring (`update_cell`/`update_all`) only touches the buffer;
// presenting the result is a separate `flush` so a burst of edits costs a
// single widget update.
pub struct Minimap {
    size: Size,
    ratio: f32,
    pixels: Vec<u8>,
    view_rect: Rect,
    suppressed: bool,
}

impl Minimap {
    pub fn new() -> Self {
        Self {
            size: Size::zero(),
            ratio: 1.0,
            pixels: Vec::new(),
            view_rect: Rect::zero(),
            suppressed: false,
        }
    }

    // Reallocates the pixel buffer for a new map size and resets it to
    // fully transparent black. Contents must be rebuilt with `update_all`.
    pub fn resize(&mut self, dims: MapDimensions) -> Result<(), EditorError> {
        let size = dims.size();
        let byte_count = (size.width * size.height * BYTES_PER_PIXEL) as usize;

        log::info!(MINIMAP_LOG_CHANNEL, "Resizing minimap to {size}");

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(byte_count)
            .map_err(|_| EditorError::Allocation { what: "minimap pixel buffer" })?;
        pixels.resize(byte_count, 0);

        self.size = size;
        self.ratio = dims.minimap_ratio();
        self.pixels = pixels;

        Ok(())
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    // The raw BGRA buffer, row-major, stride = width * 4.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn view_rect(&self) -> Rect {
        self.view_rect
    }

    // While suppressed, cell updates and flushes are dropped. Used during
    // bulk operations (map generation, file loading) that repaint
    // everything once at the end.
    #[inline]
    pub fn set_render_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    #[inline]
    pub fn is_render_suppressed(&self) -> bool {
        self.suppressed
    }

    // Recolors the block of minimap pixels owned by `cell`: the occupant's
    // full footprint when a unit anchors there, otherwise the single
    // terrain pixel. Returns whether the buffer was touched.
    pub fn update_cell(&mut self, grid: &CellGrid, era: Era, cell: Cell) -> bool {
        if self.suppressed {
            return false;
        }
        if !grid.is_cell_within_bounds(cell) || !self.is_cell_within_bounds(cell) {
            return false;
        }

        let state = grid.cell_state(cell);

        // The above layer wins when both are occupied.
        let (unit, player) = if state.has_unit(CellLayer::Above) {
            (state.unit(CellLayer::Above), state.player(CellLayer::Above))
        } else if state.has_unit(CellLayer::Below) {
            (state.unit(CellLayer::Below), state.player(CellLayer::Below))
        } else {
            (Unit::None, Player::Neutral)
        };

        let (color, block) = if unit == Unit::None {
            (terrain_color(era, state.tile()), Size::new(1, 1))
        } else {
            (unit_color(unit, player), unit.footprint())
        };

        // Clamp the block to the buffer; footprints may hang off the
        // map edge.
        let x_end = (cell.x + block.width).min(self.size.width);
        let y_end = (cell.y + block.height).min(self.size.height);
        let stride = self.size.width * BYTES_PER_PIXEL;

        for y in cell.y..y_end {
            for x in cell.x..x_end {
                let at = ((y * stride) + (x * BYTES_PER_PIXEL)) as usize;
                self.pixels[at + 0] = color.b;
                self.pixels[at + 1] = color.g;
                self.pixels[at + 2] = color.r;
                self.pixels[at + 3] = color.a;
            }
        }

        true
    }

    // Recolors every cell. Returns true only if all cells were updated.
    pub fn update_all(&mut self, grid: &CellGrid, era: Era) -> bool {
        if self.suppressed {
            return false;
        }

        let mut ret = true;
        for y in 0..grid.size().height {
            for x in 0..grid.size().width {
                ret &= self.update_cell(grid, era, Cell::new(x, y));
            }
        }
        ret
    }

    // Forwards a dirty region to the sink. Buffer updates deliberately do
    // not flush; callers batch and flush once.
    pub fn flush(&self, sink: &mut dyn MinimapSink, rect: Rect) {
        if self.suppressed {
            return;
        }
        sink.dirty_rect(rect);
    }

    // Flushes the region covered by `unit` anchored at `cell`.
    pub fn flush_unit(&self, sink: &mut dyn MinimapSink, cell: Cell, unit: Unit) {
        let rect = Rect::new(Point::new(cell.x, cell.y), unit.footprint());
        self.flush(sink, rect);
    }

    // Maps a screen-space point over the minimap widget to map cell
    // coordinates. The result is not bounds-clamped.
    pub fn cell_at(&self, sink: &dyn MinimapSink, point: Point) -> Cell {
        let origin = sink.widget_geometry().position();

        let cx = ((point.x - origin.x) as f32 / self.ratio).round() as i32;
        let cy = ((point.y - origin.y) as f32 / self.ratio).round() as i32;

        Cell::new(cx, cy)
    }

    // Moves the view indicator so its top-left sits at cell (x, y),
    // clamped to keep the whole indicator over the minimap widget. When
    // `clicked`, (x, y) is treated as the desired center instead and the
    // main view is scrolled to match.
    pub fn view_move(&mut self, sink: &mut dyn MinimapSink, x: i32, y: i32, clicked: bool) {
        let widget = sink.widget_geometry();
        let (ox, oy) = (widget.x(), widget.y());
        let (ow, oh) = (widget.width(), widget.height());
        let (rw, rh) = (self.view_rect.width(), self.view_rect.height());

        let mut x = x;
        let mut y = y;

        if clicked {
            x -= (rw as f32 / (2.0 * self.ratio)).round() as i32;
            y -= (rh as f32 / (2.0 * self.ratio)).round() as i32;
        }

        x = x.max(0);
        y = y.max(0);

        let mut tx = ((x as f32 * self.ratio) + ox as f32).round() as i32;
        let mut ty = ((y as f32 * self.ratio) + oy as f32).round() as i32;

        if tx - ox + rw > ow { tx = ox + ow - rw; }
        if ty - oy + rh > oh { ty = oy + oh - rh; }

        self.view_rect.set_position(Point::new(tx, ty));

        if clicked {
            let cell_size = sink.main_view_cell_size();
            sink.scroll_main_view(x * cell_size.width, y * cell_size.height);
        }
    }

    // Resizes the view indicator to cover (w, h) main-view cells, capped
    // at the full scaled map size.
    pub fn view_resize(&mut self, w: u32, h: u32) {
        let map_w = (self.size.width as f32 * self.ratio).round() as i32;
        let map_h = (self.size.height as f32 * self.ratio).round() as i32;

        let w = ((w as f32 * self.ratio).round() as i32).min(map_w);
        let h = ((h as f32 * self.ratio).round() as i32).min(map_h);

        self.view_rect.set_size(Size::new(w, h));
    }

    #[inline]
    fn is_cell_within_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.size.width &&
        cell.y >= 0 && cell.y < self.size.height
    }
}

impl Default for Minimap {
    fn default() -> Self {
        Self::new()
    }
}
