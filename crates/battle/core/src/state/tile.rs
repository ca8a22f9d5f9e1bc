//! Arena tiles and hazard definitions.

use super::Position;
use super::status::StatusKind;

/// Canonical tile classes for a compiled arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileKind {
    Floor,
    Wall,
    Hazard(HazardKind),
}

impl TileKind {
    /// Walls are the only tiles that can never be entered.
    pub const fn is_walkable(self) -> bool {
        !matches!(self, TileKind::Wall)
    }

    pub const fn hazard(self) -> Option<HazardKind> {
        match self {
            TileKind::Hazard(kind) => Some(kind),
            _ => None,
        }
    }

    /// Template character for this tile (inverse of marker compilation).
    pub const fn glyph(self) -> char {
        match self {
            TileKind::Floor => '.',
            TileKind::Wall => '#',
            TileKind::Hazard(kind) => kind.glyph(),
        }
    }
}

/// Named hazard tile types.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HazardKind {
    /// Instant-death-adjacent; crossed only when no other path exists.
    Lava,
    Fire,
    Miasma,
    Ice,
    Spikes,
}

/// What happens to an entity the moment it steps onto a hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HazardEffect {
    pub damage: i32,
    pub status: Option<(StatusKind, u32)>,
}

impl HazardKind {
    /// Movement cost relative to a floor step (which costs 1).
    pub const fn movement_cost(self) -> u32 {
        match self {
            HazardKind::Lava => 150,
            HazardKind::Fire => 12,
            HazardKind::Miasma => 8,
            HazardKind::Spikes => 6,
            HazardKind::Ice => 3,
        }
    }

    pub const fn on_step(self) -> HazardEffect {
        match self {
            HazardKind::Lava => HazardEffect {
                damage: 10,
                status: Some((StatusKind::Burning, 2)),
            },
            HazardKind::Fire => HazardEffect {
                damage: 3,
                status: Some((StatusKind::Burning, 2)),
            },
            HazardKind::Miasma => HazardEffect {
                damage: 0,
                status: Some((StatusKind::Poisoned, 3)),
            },
            HazardKind::Ice => HazardEffect {
                damage: 0,
                status: Some((StatusKind::Frozen, 2)),
            },
            HazardKind::Spikes => HazardEffect {
                damage: 4,
                status: None,
            },
        }
    }

    pub const fn glyph(self) -> char {
        match self {
            HazardKind::Lava => 'L',
            HazardKind::Fire => 'F',
            HazardKind::Miasma => 'M',
            HazardKind::Ice => 'I',
            HazardKind::Spikes => '^',
        }
    }

    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            'L' => Some(HazardKind::Lava),
            'F' => Some(HazardKind::Fire),
            'M' => Some(HazardKind::Miasma),
            'I' => Some(HazardKind::Ice),
            '^' => Some(HazardKind::Spikes),
            _ => None,
        }
    }
}

/// Row-major tile grid for one arena.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// Creates a grid bordered by walls with floor inside.
    pub fn walled(width: u32, height: u32) -> Self {
        let mut grid = Self {
            width,
            height,
            tiles: vec![TileKind::Floor; (width * height) as usize],
        };
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                if x == 0 || y == 0 || x == width as i32 - 1 || y == height as i32 - 1 {
                    grid.set(Position::new(x, y), TileKind::Wall);
                }
            }
        }
        grid
    }

    /// Builds a grid from raw tiles. Returns `None` if the length mismatches.
    pub fn from_tiles(width: u32, height: u32, tiles: Vec<TileKind>) -> Option<Self> {
        if tiles.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            tiles,
        })
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| (position.y as usize) * (self.width as usize) + position.x as usize)
    }

    pub fn get(&self, position: Position) -> Option<TileKind> {
        self.index(position).map(|idx| self.tiles[idx])
    }

    pub fn set(&mut self, position: Position, tile: TileKind) {
        if let Some(idx) = self.index(position) {
            self.tiles[idx] = tile;
        }
    }

    pub fn is_walkable(&self, position: Position) -> bool {
        self.get(position).is_some_and(TileKind::is_walkable)
    }

    /// True for the four grid corners and any walkable tile touching two
    /// perpendicular walls.
    pub fn is_corner(&self, position: Position) -> bool {
        let wall = |dx: i32, dy: i32| !self.is_walkable(position.offset(dx, dy));
        (wall(0, -1) || wall(0, 1)) && (wall(-1, 0) || wall(1, 0))
    }

    /// All positions in raster order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y)))
    }

    /// Renders the grid using template glyphs, one line per row.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.tiles.len() + self.height as usize);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                out.push(self.get(Position::new(x, y)).map_or(' ', TileKind::glyph));
            }
            out.push('\n');
        }
        out
    }
}
