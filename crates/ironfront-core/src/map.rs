//! Map loading from symbol grids.
//!
//! A map is a list of rows, one character per cell:
//!
//! | Symbol | Meaning |
//! |---|---|
//! | `B` `S` `W` `T` `I` | brick, steel, water, trees, ice |
//! | `E` | enemy spawn point |
//! | `1` `2` | player spawn |
//! | `X` | base |
//! | anything else | open ground |
//!
//! Loading never rejects a map. Ragged rows are padded, an empty grid falls
//! back to [`DEFAULT_MAP`], and missing spawn points or base are filled in.
//!
//! ```
//! use ironfront_core::config::GameConfig;
//! use ironfront_core::map;
//!
//! let arena = map::load_from_grid(&["E.E", "...", ".X."], &GameConfig::default()).unwrap();
//! assert_eq!(arena.grid().cols(), 3);
//! // Two enemy spawns in the map, corners fill up to four.
//! assert!(arena.enemy_spawns().len() >= 4);
//! ```

use glam::IVec2;
use rubble::{Tile, TileCoord, TileGrid, TileKind};
use tracing::debug;

use crate::arena::Arena;
use crate::config::GameConfig;
use crate::entity::{PlayerSlot, Tank};
use crate::error::ConfigError;

/// Built-in 16×16 level.
pub const DEFAULT_MAP: [&str; 16] = [
    "E....E....E....E",
    "................",
    ".BB.BB.SS.BB.BB.",
    ".BB.BB....BB.BB.",
    ".BB.BB.TT.BB.BB.",
    "......TTTT......",
    "S.WWW..BB..WWW.S",
    "..WWW..BB..WWW..",
    "....II....II....",
    ".BB.II.SS.II.BB.",
    ".BB....BB....BB.",
    ".BB.BB....BB.BB.",
    "TT..BB.BB.BB..TT",
    "....IIIIIIII....",
    "....1.BBB.2.....",
    "......BXB.......",
];

/// Loads the built-in level.
///
/// # Errors
///
/// Returns [`ConfigError`] if the configured cell size cannot build a grid.
pub fn load_default_map(config: &GameConfig) -> Result<Arena, ConfigError> {
    load_from_grid(&DEFAULT_MAP, config)
}

/// Builds an arena from map rows and spawns the players.
///
/// # Errors
///
/// Returns [`ConfigError`] if the configured cell size cannot build a grid.
/// Map content itself never causes an error.
pub fn load_from_grid<S: AsRef<str>>(rows: &[S], config: &GameConfig) -> Result<Arena, ConfigError> {
    let cells: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
    let width = cells.iter().map(Vec::len).max().unwrap_or(0);
    if cells.is_empty() || width == 0 {
        debug!("empty map, falling back to the default layout");
        return load_default_map(config);
    }

    let cols = i32::try_from(width).unwrap_or(i32::MAX);
    let row_count = i32::try_from(cells.len()).unwrap_or(i32::MAX);
    let mut grid =
        TileGrid::new(cols, row_count, config.cell_size)?.with_border_bleed(config.border_bleed);

    let mut enemy_spawns = Vec::new();
    let mut player_spawns: [Option<TileCoord>; 2] = [None; 2];
    let mut base: Option<TileCoord> = None;

    for (r, line) in (0..).zip(&cells) {
        for (c, symbol) in (0..).zip(line) {
            let coord = TileCoord::new(c, r);
            match *symbol {
                'E' => enemy_spawns.push(grid.cell_origin(coord)),
                '1' => player_spawns[0] = Some(coord),
                '2' => player_spawns[1] = Some(coord),
                'X' if base.is_none() => base = Some(coord),
                'X' => debug!(%coord, "ignoring extra base marker"),
                other => {
                    if let Some(kind) = TileKind::from_symbol(other) {
                        grid.set(coord, Tile::new(kind));
                    }
                }
            }
        }
    }

    let base = base.unwrap_or_else(|| TileCoord::new(cols / 2, row_count - 1));
    grid.set(base, Tile::new(TileKind::Base));

    let mut arena = Arena::new(grid, base);
    for cell in arena.fortify_cells() {
        arena.grid_mut().set(cell, Tile::new(TileKind::Brick));
    }

    supplement_enemy_spawns(&mut enemy_spawns, arena.grid(), config);
    arena.set_enemy_spawns(enemy_spawns);

    let defaults = [base.offset(-2, -1), base.offset(2, -1)];
    for slot in PlayerSlot::ALL {
        if slot == PlayerSlot::Two && !config.two_player {
            continue;
        }
        let cell = player_spawns[slot.index()].unwrap_or(defaults[slot.index()]);
        let cell = clamp_cell(cell, arena.grid());
        if cell != base {
            arena.grid_mut().set(cell, Tile::EMPTY);
        }
        let spawn = arena.grid().cell_origin(cell);
        arena.set_player_spawn(slot, spawn);
        arena.spawn_tank(Tank::player(
            slot,
            spawn,
            config.tank_size,
            config.player_lives,
            config.player_fire_cooldown,
        ));
    }

    arena.wave_mut().total = config.enemies_per_wave;
    debug!(
        cols,
        rows = row_count,
        spawns = arena.enemy_spawns().len(),
        base = %base,
        "map loaded"
    );
    Ok(arena)
}

fn clamp_cell(cell: TileCoord, grid: &TileGrid) -> TileCoord {
    TileCoord::new(
        cell.col.clamp(0, grid.cols() - 1),
        cell.row.clamp(0, grid.rows() - 1),
    )
}

/// Appends the corner spawn points when a map offers too few.
fn supplement_enemy_spawns(spawns: &mut Vec<IVec2>, grid: &TileGrid, config: &GameConfig) {
    if spawns.len() >= config.min_enemy_spawn_points {
        return;
    }
    let size = grid.pixel_size();
    let cell = grid.cell_size();
    let right = (size.x - cell).max(0);
    let middle = (size.y / 2 - cell).max(0);
    let corners = [
        IVec2::new(0, 0),
        IVec2::new(right, 0),
        IVec2::new(0, middle),
        IVec2::new(right, middle),
    ];
    for corner in corners {
        if !spawns.contains(&corner) {
            spawns.push(corner);
        }
    }
}
