//! Arena template selection and compilation.
//!
//! A template is a text layout keyed by theme and size bucket. Compiling turns
//! its markers into floor tiles and returns the concrete grid plus spawn and
//! reinforcement-entry coordinate lists. Selection and spawn shuffling draw
//! from a generator seeded with the battle seed, so a seed always yields the
//! same arena.

mod templates;

use std::collections::BTreeMap;

use crate::config::BattleConfig;
use crate::dice::BattleRng;
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{Direction, HazardKind, Position, TileGrid, TileKind};

pub use templates::BUILTIN;

/// Visual/material family of an arena.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ArenaTheme {
    #[default]
    Crypt,
    Cavern,
    Volcano,
    Glacier,
}

/// Errors raised while compiling or selecting templates.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("no {bucket} templates registered for theme {theme}")]
    EmptyPool {
        theme: ArenaTheme,
        bucket: &'static str,
    },

    #[error("template {name}: expected {expected_width}x{expected_height}, got {width}x{height}")]
    WrongSize {
        name: String,
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    #[error("template {name}: row {row} has {len} columns, expected {width}")]
    RaggedRow {
        name: String,
        row: usize,
        len: usize,
        width: usize,
    },

    #[error("template {name}: unknown glyph {glyph:?} at {position}")]
    UnknownGlyph {
        name: String,
        glyph: char,
        position: Position,
    },

    #[error("template {name}: border tile {position} is not a wall")]
    OpenBorder { name: String, position: Position },

    #[error("template {name}: no {marker} marker")]
    MissingMarker { name: String, marker: &'static str },

    #[error("arena {name} has no free tile for combatant {placed}")]
    Overcrowded { name: String, placed: usize },
}

impl BattleError for ArenaError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPool { .. } => "ARENA_EMPTY_POOL",
            Self::WrongSize { .. } => "ARENA_WRONG_SIZE",
            Self::RaggedRow { .. } => "ARENA_RAGGED_ROW",
            Self::UnknownGlyph { .. } => "ARENA_UNKNOWN_GLYPH",
            Self::OpenBorder { .. } => "ARENA_OPEN_BORDER",
            Self::MissingMarker { .. } => "ARENA_MISSING_MARKER",
            Self::Overcrowded { .. } => "ARENA_OVERCROWDED",
        }
    }
}

/// Static template compiled into the binary.
#[derive(Clone, Copy, Debug)]
pub struct TemplateSource {
    pub name: &'static str,
    pub theme: ArenaTheme,
    pub is_boss: bool,
    pub layout: &'static str,
}

/// Owned template; the form content files deserialize into.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaTemplate {
    pub name: String,
    pub theme: ArenaTheme,
    pub is_boss: bool,
    /// One string per row.
    pub rows: Vec<String>,
}

impl From<&TemplateSource> for ArenaTemplate {
    fn from(source: &TemplateSource) -> Self {
        Self {
            name: source.name.to_owned(),
            theme: source.theme,
            is_boss: source.is_boss,
            rows: source.layout.lines().map(str::to_owned).collect(),
        }
    }
}

/// A compiled arena instance.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arena {
    pub template: String,
    pub theme: ArenaTheme,
    pub grid: TileGrid,
    /// Shuffled; the player takes the first free entry.
    pub player_spawns: Vec<Position>,
    /// Shuffled; enemies take entries in order.
    pub enemy_spawns: Vec<Position>,
    /// Raster order.
    pub entry_edges: Vec<Position>,
}

impl Arena {
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Distance from `position` to the border on side `edge`.
    pub fn border_distance(&self, position: Position, edge: Direction) -> u32 {
        let value = match edge {
            Direction::North => position.y,
            Direction::South => self.height() as i32 - 1 - position.y,
            Direction::West => position.x,
            Direction::East => self.width() as i32 - 1 - position.x,
        };
        value.max(0) as u32
    }

    /// The border side closest to `position`; ties follow direction priority.
    pub fn edge_of(&self, position: Position) -> Direction {
        Direction::ALL
            .into_iter()
            .min_by_key(|&edge| self.border_distance(position, edge))
            .unwrap_or(Direction::North)
    }

    pub fn is_entry_edge(&self, position: Position) -> bool {
        self.entry_edges.contains(&position)
    }

    /// Entry tiles on one border side, in raster order.
    pub fn entries_on(&self, edge: Direction) -> impl Iterator<Item = Position> + '_ {
        self.entry_edges
            .iter()
            .copied()
            .filter(move |&p| self.edge_of(p) == edge)
    }
}

impl ArenaTemplate {
    /// Validates the layout and turns markers into concrete tiles.
    pub fn compile(&self) -> Result<Arena, ArenaError> {
        let (width, height) = BattleConfig::arena_size(self.is_boss);
        let actual_width = self.rows.first().map_or(0, |r| r.chars().count());
        if self.rows.len() != height as usize || actual_width != width as usize {
            return Err(ArenaError::WrongSize {
                name: self.name.clone(),
                expected_width: width,
                expected_height: height,
                width: actual_width as u32,
                height: self.rows.len() as u32,
            });
        }

        let mut tiles = Vec::with_capacity((width * height) as usize);
        let mut player_spawns = Vec::new();
        let mut enemy_spawns = Vec::new();
        let mut entry_edges = Vec::new();

        for (y, row) in self.rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width as usize {
                return Err(ArenaError::RaggedRow {
                    name: self.name.clone(),
                    row: y,
                    len,
                    width: width as usize,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let position = Position::new(x as i32, y as i32);
                let on_border =
                    x == 0 || y == 0 || x == width as usize - 1 || y == height as usize - 1;
                let tile = match glyph {
                    '#' => TileKind::Wall,
                    '.' => TileKind::Floor,
                    'P' => {
                        player_spawns.push(position);
                        TileKind::Floor
                    }
                    'E' => {
                        enemy_spawns.push(position);
                        TileKind::Floor
                    }
                    'R' => {
                        entry_edges.push(position);
                        TileKind::Floor
                    }
                    other => match HazardKind::from_glyph(other) {
                        Some(hazard) => TileKind::Hazard(hazard),
                        None => {
                            return Err(ArenaError::UnknownGlyph {
                                name: self.name.clone(),
                                glyph: other,
                                position,
                            });
                        }
                    },
                };
                if on_border && tile != TileKind::Wall {
                    return Err(ArenaError::OpenBorder {
                        name: self.name.clone(),
                        position,
                    });
                }
                tiles.push(tile);
            }
        }

        for (list, marker) in [
            (&player_spawns, "player spawn"),
            (&enemy_spawns, "enemy spawn"),
            (&entry_edges, "reinforcement entry"),
        ] {
            if list.is_empty() {
                return Err(ArenaError::MissingMarker {
                    name: self.name.clone(),
                    marker,
                });
            }
        }

        let grid = TileGrid::from_tiles(width, height, tiles).ok_or_else(|| {
            ArenaError::WrongSize {
                name: self.name.clone(),
                expected_width: width,
                expected_height: height,
                width: actual_width as u32,
                height: self.rows.len() as u32,
            }
        })?;

        Ok(Arena {
            template: self.name.clone(),
            theme: self.theme,
            grid,
            player_spawns,
            enemy_spawns,
            entry_edges,
        })
    }
}

/// Templates keyed by theme and size bucket.
#[derive(Clone, Debug, Default)]
pub struct TemplatePool {
    buckets: BTreeMap<(ArenaTheme, bool), Vec<ArenaTemplate>>,
}

impl TemplatePool {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pool holding every built-in layout.
    pub fn builtin() -> Self {
        let mut pool = Self::empty();
        for source in BUILTIN {
            pool.insert(ArenaTemplate::from(source));
        }
        pool
    }

    /// Adds a template after its bucket; insertion order is the selection order.
    pub fn insert(&mut self, template: ArenaTemplate) {
        self.buckets
            .entry((template.theme, template.is_boss))
            .or_default()
            .push(template);
    }

    /// Validates every template, returning the first failure.
    pub fn validate(&self) -> Result<(), ArenaError> {
        self.buckets
            .values()
            .flatten()
            .try_for_each(|t| t.compile().map(|_| ()))
    }

    pub fn templates(&self, theme: ArenaTheme, is_boss: bool) -> &[ArenaTemplate] {
        self.buckets
            .get(&(theme, is_boss))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selects and compiles a template for `(theme, is_boss)` from `seed`.
    pub fn compile(&self, theme: ArenaTheme, is_boss: bool, seed: u64) -> Result<Arena, ArenaError> {
        let candidates = self.templates(theme, is_boss);
        if candidates.is_empty() {
            return Err(ArenaError::EmptyPool {
                theme,
                bucket: if is_boss { "boss" } else { "regular" },
            });
        }

        let mut rng = BattleRng::new(seed);
        let template = &candidates[rng.below(candidates.len())];
        let mut arena = template.compile()?;
        rng.shuffle(&mut arena.player_spawns);
        rng.shuffle(&mut arena.enemy_spawns);
        Ok(arena)
    }
}

/// Compiles an arena from the built-in pool.
pub fn compile_arena(theme: ArenaTheme, is_boss: bool, seed: u64) -> Result<Arena, ArenaError> {
    TemplatePool::builtin().compile(theme, is_boss, seed)
}
