//! The board-only compact encoding: `<board>/<turn>/<phase>/<actions>/<turn_number>/<retreats>`.

use crate::battlefield::board::{AttackSlot, Board, Phase};
use crate::battlefield::consts::{COLS, ROWS};
use crate::battlefield::coords::Coord;
use crate::battlefield::piece::{Kind, Piece, Player};
use crate::battlefield::terrain::Terrain;
use crate::errors::{EngineError, EngineResult};

/// Encodes the full board-only representation: board, turn, phase, actions,
/// turn number, and pending retreats.
pub fn encode(board: &Board) -> String {
    let rows: Vec<String> = (0..board.rows()).map(|r| encode_row(board, r)).collect();
    let board_tok = rows.join(",");
    let turn_tok = board.current_player().notate().to_string();
    let phase_tok = board.phase().notate().to_string();
    let actions_tok = encode_actions(board);
    let turn_number_tok = board.turn_number().to_string();
    let retreats_tok = encode_coord_list(board.must_retreat().iter().copied());

    [board_tok, turn_tok, phase_tok, actions_tok, turn_number_tok, retreats_tok].join("/")
}

/// Encodes only the 20 board rows, with no metadata tail.
pub fn encode_board_only(board: &Board) -> String {
    (0..board.rows()).map(|r| encode_row(board, r)).collect::<Vec<_>>().join(",")
}

fn encode_row(board: &Board, row: usize) -> String {
    let mut out = String::new();
    for col in 0..board.cols() {
        let sq = board.get(&Coord::new(row, col)).expect("row/col within bounds");
        out.push_str(&encode_square(sq.terrain, sq.occupant));
    }
    out
}

fn encode_square(terrain: Terrain, occupant: Option<Piece>) -> String {
    match terrain {
        Terrain::Flat => match occupant {
            Some(p) => p.notate().to_string(),
            None => "_".to_string(),
        },
        Terrain::Mountain => "m".to_string(),
        Terrain::MountainPass => match occupant {
            Some(p) => format!("({})", p.notate()),
            None => "p".to_string(),
        },
        Terrain::Fortress => match occupant {
            Some(p) => format!("[{}]", p.notate()),
            None => "f".to_string(),
        },
        Terrain::Arsenal(owner) => {
            let tag = if owner.is_upper() { 'A' } else { 'a' };
            match occupant {
                Some(p) => format!("{}{{{}}}", tag, p.notate()),
                None => tag.to_string(),
            }
        }
    }
}

fn encode_actions(board: &Board) -> String {
    match board.phase() {
        Phase::Movement => {
            let entries: Vec<String> = board
                .moves_this_turn()
                .iter()
                .map(|(from, to)| format!("({},{})", from.label(), to.label()))
                .collect();
            format!("[{}]", entries.join(","))
        }
        Phase::Battle => match board.attack_slot() {
            Some(AttackSlot { target: Some(c) }) => c.label(),
            Some(AttackSlot { target: None }) => "pass".to_string(),
            None => "[]".to_string(),
        },
    }
}

fn encode_coord_list(coords: impl Iterator<Item = Coord>) -> String {
    let flat: Vec<String> = coords.flat_map(|c| [c.row.to_string(), c.col.to_string()]).collect();
    format!("[{}]", flat.join(","))
}

/// Parses a full board-only document (board + the five metadata tokens) into
/// a fresh `Board`. Whitespace is stripped before parsing.
pub fn parse(input: &str) -> EngineResult<Board> {
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let fields: Vec<&str> = stripped.splitn(6, '/').collect();
    if fields.len() != 6 {
        return Err(EngineError::MalformedEncoding("expected 6 top-level fields".into()));
    }
    let [board_tok, turn_tok, phase_tok, actions_tok, turn_number_tok, retreats_tok] =
        [fields[0], fields[1], fields[2], fields[3], fields[4], fields[5]];

    let mut board = parse_board_only(board_tok)?;

    board.set_current_player(match turn_tok {
        "N" => Player::North,
        "S" => Player::South,
        other => return Err(EngineError::MalformedEncoding(format!("bad turn token {other}"))),
    });

    board.set_phase(match phase_tok {
        "M" => Phase::Movement,
        "B" => Phase::Battle,
        other => return Err(EngineError::MalformedEncoding(format!("bad phase token {other}"))),
    });

    let turn_number: u32 = turn_number_tok
        .parse()
        .map_err(|_| EngineError::MalformedEncoding(format!("bad turn number {turn_number_tok}")))?;
    board.set_turn_number(turn_number);

    board.set_must_retreat(parse_coord_list(retreats_tok)?);

    parse_actions(&mut board, actions_tok)?;

    Ok(board)
}

/// Parses the 20-row board-only variant with no metadata tail, producing a
/// fresh `Board` at turn 1, NORTH to move, Movement phase.
pub fn parse_board_only(board_tok: &str) -> EngineResult<Board> {
    let mut board = Board::empty();
    let row_toks: Vec<&str> = board_tok.split(',').collect();
    if row_toks.len() != ROWS {
        return Err(EngineError::MalformedEncoding(format!("expected {ROWS} rows, found {}", row_toks.len())));
    }
    for (r, row_tok) in row_toks.into_iter().enumerate() {
        let squares = tokenize_row(row_tok)?;
        if squares.len() != COLS {
            return Err(EngineError::MalformedEncoding(format!("row {r} has {} squares, expected {COLS}", squares.len())));
        }
        for (c, (terrain, occupant)) in squares.into_iter().enumerate() {
            let coord = Coord::new(r, c);
            board.set_terrain(coord, terrain)?;
            if let Some((kind, owner)) = occupant {
                board.place_piece(coord, kind, owner)?;
            }
        }
    }
    Ok(board)
}

fn tokenize_row(row: &str) -> EngineResult<Vec<(Terrain, Option<(Kind, Player)>)>> {
    let mut squares = vec![];
    let mut chars = row.chars().peekable();
    while let Some(c) = chars.next() {
        let square = match c {
            '_' => (Terrain::Flat, None),
            'm' => (Terrain::Mountain, None),
            'p' => (Terrain::MountainPass, None),
            'f' => (Terrain::Fortress, None),
            '(' => {
                let piece = read_until(&mut chars, ')')?;
                (Terrain::MountainPass, Some(parse_piece_letter(piece)?))
            }
            '[' => {
                let piece = read_until(&mut chars, ']')?;
                (Terrain::Fortress, Some(parse_piece_letter(piece)?))
            }
            'A' | 'a' => {
                let owner = Player::from_case(c == 'A');
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let piece = read_until(&mut chars, '}')?;
                    (Terrain::Arsenal(owner), Some(parse_piece_letter(piece)?))
                } else {
                    (Terrain::Arsenal(owner), None)
                }
            }
            letter => {
                let piece = parse_piece_letter(letter)?;
                (Terrain::Flat, Some(piece))
            }
        };
        squares.push(square);
    }
    Ok(squares)
}

fn read_until(chars: &mut std::iter::Peekable<std::str::Chars>, closing: char) -> EngineResult<char> {
    let c = chars.next().ok_or_else(|| EngineError::MalformedEncoding("unterminated bracket".into()))?;
    match chars.next() {
        Some(actual) if actual == closing => Ok(c),
        _ => Err(EngineError::MalformedEncoding(format!("expected closing '{closing}'"))),
    }
}

fn parse_piece_letter(c: char) -> EngineResult<(Kind, Player)> {
    let kind = Kind::from_letter(c).ok_or_else(|| EngineError::MalformedEncoding(format!("bad piece letter {c}")))?;
    Ok((kind, Player::from_case(c.is_ascii_uppercase())))
}

fn parse_coord_list(tok: &str) -> EngineResult<std::collections::BTreeSet<Coord>> {
    let inner = tok
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| EngineError::MalformedEncoding(format!("bad coordinate list {tok}")))?;
    if inner.is_empty() {
        return Ok(Default::default());
    }
    let nums: Vec<usize> = inner
        .split(',')
        .map(|s| s.parse().map_err(|_| EngineError::MalformedEncoding(format!("bad coordinate number {s}"))))
        .collect::<EngineResult<_>>()?;
    if !nums.len().is_multiple_of(2) {
        return Err(EngineError::MalformedEncoding("coordinate list has odd length".into()));
    }
    Ok(nums.chunks(2).map(|pair| Coord::new(pair[0], pair[1])).collect())
}

fn parse_actions(board: &mut Board, tok: &str) -> EngineResult<()> {
    match board.phase() {
        Phase::Movement => {
            let inner = tok
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .ok_or_else(|| EngineError::MalformedEncoding(format!("bad actions token {tok}")))?;
            if inner.is_empty() {
                return Ok(());
            }
            let mut moves = vec![];
            for entry in inner.split("),(") {
                let cleaned = entry.trim_start_matches('(').trim_end_matches(')');
                let (from, to) = cleaned
                    .split_once(',')
                    .ok_or_else(|| EngineError::MalformedEncoding(format!("bad move entry {entry}")))?;
                moves.push((from.parse::<Coord>()?, to.parse::<Coord>()?));
            }
            board.set_moves_this_turn(moves);
            Ok(())
        }
        Phase::Battle => {
            let slot = match tok {
                "[]" => None,
                "pass" => Some(AttackSlot { target: None }),
                label => Some(AttackSlot { target: Some(label.parse()?) }),
            };
            board.set_attack_slot(slot);
            Ok(())
        }
    }
}

impl std::str::FromStr for Board {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Board, EngineError> {
        parse(s)
    }
}

impl From<std::num::ParseIntError> for EngineError {
    fn from(_: std::num::ParseIntError) -> EngineError {
        EngineError::MalformedEncoding("bad integer".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battlefield::piece::{Kind, Player};

    #[test]
    fn empty_board_round_trips() {
        let board = Board::empty();
        let encoded = encode(&board);
        let decoded = parse(&encoded).unwrap();
        assert_eq!(encode(&decoded), encoded);
    }

    #[test]
    fn pieces_and_terrain_round_trip() {
        let mut board = Board::empty();
        board.set_terrain(Coord::new(2, 2), Terrain::Mountain).unwrap();
        board.set_terrain(Coord::new(3, 3), Terrain::Fortress).unwrap();
        board.place_piece(Coord::new(3, 3), Kind::Infantry, Player::South).unwrap();
        board.set_terrain(Coord::new(4, 4), Terrain::Arsenal(Player::North)).unwrap();
        board.place_piece(Coord::new(5, 5), Kind::Cavalry, Player::North).unwrap();

        let encoded = encode_board_only(&board);
        let decoded = parse_board_only(&encoded).unwrap();
        assert_eq!(encode_board_only(&decoded), encoded);
        assert_eq!(decoded.get(&Coord::new(3, 3)).unwrap().occupant.unwrap().kind, Kind::Infantry);
    }

    #[test]
    fn rejects_wrong_row_count() {
        assert!(parse_board_only("___").is_err());
    }
}
