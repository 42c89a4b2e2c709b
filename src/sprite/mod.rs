use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use num_enum::TryFromPrimitive;
use rand::Rng;
use slab::Slab;
use smallvec::SmallVec;
use strum::{Display, EnumCount, EnumIter, VariantArray};

use crate::log;
use crate::error::EditorError;
use crate::utils::{Cell, CellRange, Size};

pub mod archive;
use archive::SpriteArchive;


const SPRITE_LOG_CHANNEL: log::Channel = log::channel!("sprite");

// ----------------------------------------------
// Era
// ----------------------------------------------

// Terrain/graphics set of the scenario. Building sprites and a handful of
// units look different per era, so it participates in sprite key names.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, EnumCount, EnumIter, TryFromPrimitive)]
#[strum(serialize_all = "lowercase")]
pub enum Era {
    #[default]
    Forest,
    Winter,
    Wasteland,
    Swamp,
}

// ----------------------------------------------
// SpriteDir
// ----------------------------------------------

// Facing of a unit sprite. Clockwise from north; fits the 3-bit orient
// fields of the cell grid.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, EnumCount, EnumIter, VariantArray, TryFromPrimitive)]
pub enum SpriteDir {
    #[default]
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl SpriteDir {
    // Sprite packs only store the eastern facings; the western ones are
    // served by mirroring their eastern counterpart at draw time.
    #[inline]
    pub const fn mirrored(self) -> (Self, bool) {
        match self {
            Self::SouthWest => (Self::SouthEast, true),
            Self::West      => (Self::East,      true),
            Self::NorthWest => (Self::NorthEast, true),
            dir => (dir, false),
        }
    }
}

// Picks a facing for newly placed units. NorthWest is excluded so the
// distribution covers one representative of every stored sprite row.
pub fn random_direction<R: Rng>(rng: &mut R) -> SpriteDir {
    let dirs = SpriteDir::VARIANTS;
    dirs[rng.random_range(0..dirs.len() - 1)]
}

// ----------------------------------------------
// SpriteView
// ----------------------------------------------

// What rendition of a unit is being requested from the cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpriteView {
    // Map sprite with the given facing.
    Facing(SpriteDir),

    // Portrait icon. Not present in the current sprite packs.
    Icon,
}

// ----------------------------------------------
// Unit
// ----------------------------------------------

// Everything placeable on the map: units proper, buildings, resource
// nodes and the start location markers. `None` is the empty sentinel
// stored in unoccupied cell layers. Display names double as sprite pack
// key stems.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, TryFromPrimitive)]
#[strum(serialize_all = "snake_case")]
pub enum Unit {
    #[default]
    None,

    // Land and air units.
    Footman,
    Grunt,
    Peasant,
    Peon,
    Ballista,
    Catapult,
    Knight,
    Ogre,
    Archer,
    Axethrower,
    Mage,
    DeathKnight,
    Paladin,
    OgreMage,
    Dwarves,
    GoblinSappers,
    AttackPeasant,
    AttackPeon,
    Ranger,
    Berserker,
    Alleria,
    TeronGorefiend,
    KurdanAndSkyRee,
    Dentarg,
    Khadgar,
    GromHellscream,
    Turalyon,
    EyeOfKilrogg,
    Danath,
    KorgathBladefist,
    ChoGall,
    Lothar,
    GulDan,
    UtherLightbringer,
    Zuljin,
    Skeleton,
    Daemon,
    Critter,
    GnomishFlyingMachine,
    GoblinZepplin,
    GryphonRider,
    Dragon,
    Deathwing,

    // Ships.
    HumanTanker,
    OrcTanker,
    HumanTransport,
    OrcTransport,
    ElvenDestroyer,
    TrollDestroyer,
    Battleship,
    Juggernaught,
    GnomishSubmarine,
    GiantTurtle,

    // Buildings. Keep this block contiguous: `is_building()` relies on
    // the discriminant range [Farm..=OilPatch].
    Farm,
    PigFarm,
    HumanBarracks,
    OrcBarracks,
    Church,
    AltarOfStorms,
    HumanScoutTower,
    OrcScoutTower,
    Stables,
    OgreMound,
    GnomishInventor,
    GoblinAlchemist,
    GryphonAviary,
    DragonRoost,
    HumanShipyard,
    OrcShipyard,
    TownHall,
    GreatHall,
    ElvenLumberMill,
    TrollLumberMill,
    HumanFoundry,
    OrcFoundry,
    MageTower,
    TempleOfTheDamned,
    HumanBlacksmith,
    OrcBlacksmith,
    HumanRefinery,
    OrcRefinery,
    HumanOilWell,
    OrcOilWell,
    Keep,
    Stronghold,
    Castle,
    Fortress,
    HumanGuardTower,
    OrcGuardTower,
    HumanCannonTower,
    OrcCannonTower,
    CircleOfPower,
    DarkPortal,
    Runestone,
    GoldMine,
    OilPatch,

    // Start location markers.
    HumanStart,
    OrcStart,
}

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct UnitAttr: u8 {
        // Sprite comes from the per-era buildings pack.
        const BUILDING = 1 << 0;

        // Map sprite differs per era even though this is not a building.
        const ERA_VARIANT = 1 << 1;

        // Editor-only marker with a single fixed frame.
        const START_LOCATION = 1 << 2;
    }
}

impl Unit {
    pub fn attrs(self) -> UnitAttr {
        match self {
            Self::GnomishSubmarine |
            Self::GiantTurtle |
            Self::Critter => UnitAttr::ERA_VARIANT,

            Self::HumanStart |
            Self::OrcStart => UnitAttr::START_LOCATION,

            unit if unit.is_building() => UnitAttr::BUILDING,

            _ => UnitAttr::empty(),
        }
    }

    #[inline]
    pub fn is_building(self) -> bool {
        (self as u8) >= (Self::Farm as u8) && (self as u8) <= (Self::OilPatch as u8)
    }

    // Footprint of the unit on the cell grid, in cells. Zero for `None`,
    // 1x1 for anything not in the larger groups.
    pub fn footprint(self) -> Size {
        match self {
            Self::None => Size::zero(),

            Self::PigFarm |
            Self::Farm |
            Self::OrcScoutTower |
            Self::HumanScoutTower |
            Self::HumanGuardTower |
            Self::HumanCannonTower |
            Self::OrcGuardTower |
            Self::OrcCannonTower |
            Self::GoblinZepplin |
            Self::GnomishFlyingMachine |
            Self::OrcTanker |
            Self::HumanTanker |
            Self::GryphonRider |
            Self::ElvenDestroyer |
            Self::TrollDestroyer |
            Self::GnomishSubmarine |
            Self::GiantTurtle |
            Self::OrcTransport |
            Self::HumanTransport |
            Self::CircleOfPower |
            Self::Runestone => Size::new(2, 2),

            Self::Deathwing |
            Self::HumanBarracks |
            Self::OrcBarracks |
            Self::Church |
            Self::AltarOfStorms |
            Self::Stables |
            Self::OgreMound |
            Self::GnomishInventor |
            Self::GoblinAlchemist |
            Self::GryphonAviary |
            Self::DragonRoost |
            Self::HumanShipyard |
            Self::OrcShipyard |
            Self::ElvenLumberMill |
            Self::TrollLumberMill |
            Self::HumanFoundry |
            Self::OrcFoundry |
            Self::MageTower |
            Self::TempleOfTheDamned |
            Self::HumanBlacksmith |
            Self::OrcBlacksmith |
            Self::HumanRefinery |
            Self::OrcRefinery |
            Self::HumanOilWell |
            Self::OrcOilWell |
            Self::GoldMine |
            Self::OilPatch |
            Self::Dragon |
            Self::Juggernaught |
            Self::Battleship => Size::new(3, 3),

            Self::GreatHall |
            Self::TownHall |
            Self::Stronghold |
            Self::Keep |
            Self::Castle |
            Self::Fortress |
            Self::DarkPortal => Size::new(4, 4),

            _ => Size::new(1, 1),
        }
    }

    // Cells covered by this unit when anchored at `anchor` (top-left).
    // Cells outside the grid are NOT filtered here.
    pub fn footprint_cells(self, anchor: Cell) -> SmallVec<[Cell; 16]> {
        let footprint = self.footprint();
        if !footprint.is_valid() {
            return SmallVec::new();
        }

        let range = CellRange::new(
            anchor,
            Cell::new(anchor.x + footprint.width - 1,
                      anchor.y + footprint.height - 1));

        range.iter().collect()
    }
}

// ----------------------------------------------
// SpriteEntry
// ----------------------------------------------

// A decoded sprite pack entry. Pack payload layout:
//
//   offset_x : u16 LE   draw offset from the anchor cell, in pixels
//   offset_y : u16 LE
//   width    : u16 LE
//   height   : u16 LE
//   pixels   : width * height * 4 bytes, one frame
//
// An entry whose payload size disagrees with its header is corrupt and is
// rejected as a whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpriteEntry {
    pub offset_x: i32,
    pub offset_y: i32,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

const SPRITE_HEADER_SIZE: usize = 8;
const SPRITE_BYTES_PER_PIXEL: usize = 4;

impl SpriteEntry {
    pub fn from_payload(key: &str, payload: Vec<u8>) -> Result<Self, EditorError> {
        if payload.len() < SPRITE_HEADER_SIZE {
            return Err(EditorError::CorruptAsset {
                key: key.to_string(),
                size: payload.len(),
                expected: SPRITE_HEADER_SIZE,
            });
        }

        let read_u16 = |at: usize| {
            u16::from_le_bytes([payload[at], payload[at + 1]])
        };

        let offset_x = read_u16(0);
        let offset_y = read_u16(2);
        let width = read_u16(4);
        let height = read_u16(6);

        let expected = SPRITE_HEADER_SIZE +
            (width as usize * height as usize * SPRITE_BYTES_PER_PIXEL);

        if payload.len() != expected {
            return Err(EditorError::CorruptAsset {
                key: key.to_string(),
                size: payload.len(),
                expected: expected,
            });
        }

        let mut pixels = payload;
        pixels.drain(0..SPRITE_HEADER_SIZE);

        Ok(Self {
            offset_x: offset_x as i32,
            offset_y: offset_y as i32,
            width: width as u32,
            height: height as u32,
            pixels: pixels,
        })
    }
}

// ----------------------------------------------
// SpriteFrame
// ----------------------------------------------

// Borrowed view of a cached sprite, handed out by `SpriteCache::get()`.
// `mirror` tells the renderer to flip the frame horizontally; the cache
// never stores flipped pixel data.
#[derive(Copy, Clone, Debug)]
pub struct SpriteFrame<'a> {
    pub pixels: &'a [u8],
    pub offset_x: i32,
    pub offset_y: i32,
    pub width: u32,
    pub height: u32,
    pub mirror: bool,
}

// ----------------------------------------------
// SpriteCache
// ----------------------------------------------

const SELECTION_KEYS: [&str; 4] = ["sel/1x1", "sel/2x2", "sel/3x3", "sel/4x4"];

// Lazy sprite loader and owner of all decoded sprite pixels.
//
// The units pack is opened at construction and the selection overlays are
// preloaded from the misc pack. Per-era building packs are opened on first
// request for a building of that era. Decoded entries are memoized by key;
// a failed load leaves the cache untouched so a later retry can succeed
// (e.g. after assets were reinstalled).
pub struct SpriteCache {
    sprites_dir: PathBuf,
    units: SpriteArchive,
    buildings: [Option<SpriteArchive>; Era::COUNT],
    entries: Slab<SpriteEntry>,
    lookup: HashMap<String, usize>,
}

impl SpriteCache {
    pub fn new(data_dir: &Path) -> Result<Self, EditorError> {
        let sprites_dir = data_dir.join("sprites");

        let units = SpriteArchive::open(&sprites_dir.join("units").join("units.pak"))?;

        let mut cache = Self {
            sprites_dir: sprites_dir,
            units: units,
            buildings: [const { None }; Era::COUNT],
            entries: Slab::new(),
            lookup: HashMap::new(),
        };

        // Selection overlays are cosmetic: losing one (or the whole misc
        // pack) degrades `selection_overlay()` to `None` but must not take
        // the cache down with it. Only the units pack is mandatory.
        match SpriteArchive::open(&cache.sprites_dir.join("misc").join("sel.pak")) {
            Ok(mut misc) => {
                for key in SELECTION_KEYS {
                    let result = misc.read(key)
                        .and_then(|payload| SpriteEntry::from_payload(key, payload));

                    match result {
                        Ok(entry) => {
                            cache.memoize(key, entry);
                        },
                        Err(err) => {
                            log::error!(SPRITE_LOG_CHANNEL,
                                        "Failed to preload selection overlay [{key}]: {err}");
                        },
                    }
                }
            },
            Err(err) => {
                log::error!(SPRITE_LOG_CHANNEL,
                            "Failed to open selection overlay pack: {err}");
            },
        }

        log::info!(SPRITE_LOG_CHANNEL,
                   "Sprite cache ready, {} unit sprites indexed", cache.units.len());

        Ok(cache)
    }

    fn memoize(&mut self, key: &str, entry: SpriteEntry) -> usize {
        let index = self.entries.insert(entry);
        self.lookup.insert(key.to_string(), index);
        index
    }

    fn building_archive(&mut self, era: Era) -> Result<&mut SpriteArchive, EditorError> {
        let slot = &mut self.buildings[era as usize];

        if slot.is_none() {
            let path = self.sprites_dir.join("buildings").join(format!("{era}.pak"));
            *slot = Some(SpriteArchive::open(&path)?);
        }

        // Just placed above.
        match slot {
            Some(archive) => Ok(archive),
            None => panic!("Building archive slot for {era} is empty. This MUST NEVER happen"),
        }
    }

    // Resolves the cache and pack keys for a unit sprite request, plus
    // whether the renderer must mirror the frame. The two keys only differ
    // for buildings: their pack entry name is the bare unit name (each era
    // lives in its own pack), but cached pixels are era-specific, so the
    // cache key carries the era to keep the identities apart.
    fn sprite_key(unit: Unit, era: Era, view: SpriteView) -> Result<(String, String, bool), EditorError> {
        let attrs = unit.attrs();

        if attrs.contains(UnitAttr::BUILDING) {
            return Ok((format!("{unit}/{era}"), unit.to_string(), false));
        }

        let dir = match view {
            SpriteView::Facing(dir) => dir,
            SpriteView::Icon => {
                return Err(EditorError::Unsupported { what: "Icon sprites" });
            },
        };

        let (served, mirror) = dir.mirrored();

        let key = if attrs.contains(UnitAttr::ERA_VARIANT) {
            format!("{unit}/{era}/{}", served as u8)
        } else if attrs.contains(UnitAttr::START_LOCATION) {
            format!("{unit}/0")
        } else {
            format!("{unit}/{}", served as u8)
        };

        Ok((key.clone(), key, mirror))
    }

    // Fetches the sprite for `unit`, loading and memoizing it on first
    // access. Failed loads are reported and never memoized.
    pub fn get(&mut self, unit: Unit, era: Era, view: SpriteView) -> Result<SpriteFrame, EditorError> {
        debug_assert!(unit != Unit::None);

        let (cache_key, pack_key, mirror) = Self::sprite_key(unit, era, view)?;

        let index = match self.lookup.get(&cache_key) {
            Some(index) => *index,
            None => {
                let result = self.load_entry(unit, era, &cache_key, &pack_key);
                match result {
                    Ok(index) => index,
                    Err(err) => {
                        log::error!(SPRITE_LOG_CHANNEL,
                                    "Failed to load sprite for key [{cache_key}]: {err}");
                        return Err(err);
                    },
                }
            },
        };

        let entry = &self.entries[index];

        Ok(SpriteFrame {
            pixels: &entry.pixels,
            offset_x: entry.offset_x,
            offset_y: entry.offset_y,
            width: entry.width,
            height: entry.height,
            mirror: mirror,
        })
    }

    fn load_entry(&mut self, unit: Unit, era: Era, cache_key: &str, pack_key: &str) -> Result<usize, EditorError> {
        let payload = if unit.is_building() {
            self.building_archive(era)?.read(pack_key)?
        } else {
            self.units.read(pack_key)?
        };

        let entry = SpriteEntry::from_payload(cache_key, payload)?;
        Ok(self.memoize(cache_key, entry))
    }

    // Selection overlay for a square unit footprint of `edge` cells.
    // These are preloaded, so lookup cannot fail for a valid edge.
    pub fn selection_overlay(&self, edge: u32) -> Option<&SpriteEntry> {
        if edge < 1 || edge > SELECTION_KEYS.len() as u32 {
            log::error!(SPRITE_LOG_CHANNEL, "Invalid selection edge [{edge}]");
            return None;
        }

        let key = SELECTION_KEYS[(edge - 1) as usize];
        self.lookup.get(key).map(|index| &self.entries[*index])
    }

    #[inline]
    pub fn cached_count(&self) -> usize {
        self.entries.len()
    }
}
