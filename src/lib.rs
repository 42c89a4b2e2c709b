// Core state and render-cache subsystems of the scenario editor:
//  - `map`: the packed per-tile cell model and the grid of cells.
//  - `sprite`: the sprite cache resolving (unit, era, facing) to pixel data
//    backed by lazily opened sprite archives.
//  - `minimap`: the minimap compositor keeping a one-pixel-per-tile BGRA
//    buffer in sync with the cell grid.
//
// The windowing/event layer, scenario file parsing and UI layout live in the
// editor application and talk to this crate through the seams exposed here
// (`minimap::MinimapSink` in particular).

pub mod log;
pub mod utils;
pub mod error;
pub mod config;
pub mod map;
pub mod sprite;
pub mod minimap;
