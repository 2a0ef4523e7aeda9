/// Level grid decoder.
///
/// Turns an ordered sequence of text rows into one placement per non-blank
/// cell, tagged with its tile coordinate (column, row from the top).
///
/// ## Tile legend:
///   '#' = Wall        '*' = Coin
///   'X' = Enemy       'N' = Player spawn
///   space / tab = blank
///
/// Blank rows are kept: they advance the row index and produce no
/// placements. Short rows are padded implicitly — missing trailing cells
/// are blank, never an error. Exactly one player spawn is required; any
/// character outside the legend is a load-time error.

use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Symbol {
    Wall,
    Coin,
    Enemy,
    Player,
}

impl Symbol {
    fn from_char(ch: char) -> Option<Symbol> {
        match ch {
            '#' => Some(Symbol::Wall),
            '*' => Some(Symbol::Coin),
            'X' => Some(Symbol::Enemy),
            'N' => Some(Symbol::Player),
            _ => None,
        }
    }
}

/// One spawn instruction: a symbol at a tile coordinate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Placement {
    pub symbol: Symbol,
    pub x: usize,
    pub y: usize,
}

#[derive(Clone, Debug)]
pub struct DecodedGrid {
    pub width: usize,
    pub height: usize,
    pub placements: Vec<Placement>,
    pub player_spawn: (usize, usize),
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("level has no player spawn ('N')")]
    NoPlayerSpawn,

    #[error(
        "level has more than one player spawn: column {first_x}, row {first_y} \
         and again column {x}, row {y}"
    )]
    DuplicatePlayerSpawn {
        first_x: usize,
        first_y: usize,
        x: usize,
        y: usize,
    },

    #[error("unknown tile symbol {symbol:?} at column {x}, row {y}")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
}

/// Decode rows into placements. Consumes the grid once; the result is the
/// only thing the rest of the game ever sees.
pub fn decode(rows: &[String]) -> Result<DecodedGrid, GridError> {
    let height = rows.len();
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);

    let mut placements = Vec::new();
    let mut player_spawn: Option<(usize, usize)> = None;

    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            if ch == ' ' || ch == '\t' {
                continue;
            }
            let symbol = Symbol::from_char(ch)
                .ok_or(GridError::UnknownSymbol { symbol: ch, x, y })?;
            if symbol == Symbol::Player {
                if let Some((fx, fy)) = player_spawn {
                    return Err(GridError::DuplicatePlayerSpawn {
                        first_x: fx,
                        first_y: fy,
                        x,
                        y,
                    });
                }
                player_spawn = Some((x, y));
            }
            placements.push(Placement { symbol, x, y });
        }
    }

    let player_spawn = player_spawn.ok_or(GridError::NoPlayerSpawn)?;

    Ok(DecodedGrid {
        width,
        height,
        placements,
        player_spawn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_placement_per_non_blank_cell() {
        let grid = decode(&rows(&[
            "  *  X",
            "N *",
            "######",
        ]))
        .unwrap();
        // 2 coins + 1 enemy + 1 player + 6 walls
        assert_eq!(grid.placements.len(), 10);
        let players = grid
            .placements
            .iter()
            .filter(|p| p.symbol == Symbol::Player)
            .count();
        assert_eq!(players, 1);
    }

    #[test]
    fn decodes_example_grid() {
        let grid = decode(&rows(&["N *", "####"])).unwrap();
        assert_eq!(grid.width, 4);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.player_spawn, (0, 0));
        assert!(grid.placements.contains(&Placement { symbol: Symbol::Coin, x: 2, y: 0 }));
        let walls: Vec<_> = grid
            .placements
            .iter()
            .filter(|p| p.symbol == Symbol::Wall)
            .collect();
        assert_eq!(walls.len(), 4);
        assert!(walls.iter().all(|p| p.y == 1));
    }

    #[test]
    fn blank_rows_advance_the_row_index() {
        let grid = decode(&rows(&[
            "N",
            "",
            "*",
        ]))
        .unwrap();
        assert_eq!(grid.height, 3);
        assert!(grid.placements.contains(&Placement { symbol: Symbol::Coin, x: 0, y: 2 }));
    }

    #[test]
    fn short_rows_are_padded_with_blanks() {
        let grid = decode(&rows(&[
            "N",
            "####",
        ]))
        .unwrap();
        assert_eq!(grid.width, 4);
        assert_eq!(grid.placements.len(), 5);
    }

    #[test]
    fn tabs_are_blank() {
        let grid = decode(&rows(&["N\t*"])).unwrap();
        assert_eq!(grid.placements.len(), 2);
    }

    #[test]
    fn missing_player_spawn_is_an_error() {
        let err = decode(&rows(&["* *", "###"])).unwrap_err();
        assert!(matches!(err, GridError::NoPlayerSpawn));
    }

    #[test]
    fn duplicate_player_spawn_is_an_error() {
        let err = decode(&rows(&["N N"])).unwrap_err();
        assert!(matches!(
            err,
            GridError::DuplicatePlayerSpawn { first_x: 0, first_y: 0, x: 2, y: 0 }
        ));
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let err = decode(&rows(&["N ?"])).unwrap_err();
        assert!(matches!(err, GridError::UnknownSymbol { symbol: '?', x: 2, y: 0 }));
    }
}
