//! Interactive command parsing
//!
//! One line of input becomes one [`Command`]. Coordinates are four integers
//! separated by commas, optionally wrapped in parentheses: `1,1,1,1` or
//! `(1, 1, 1, 1)`.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use tesseract_core::{Coord, LayoutOp, DIMS};

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Help,
    Board,
    Status,
    Winner,
    Moves(Coord),
    Move { start: Coord, end: Coord },
    Layout(LayoutOp),
    Save(PathBuf),
    Load(PathBuf),
    Quit,
}

pub const HELP: &str = "\
Commands:
  board                         list every piece and its cell
  status                        turn, active players, captures
  winner                        the last player standing, if any
  moves <a,b,c,d>               legal moves of the piece at a cell
  move <a,b,c,d> <a,b,c,d>      play a move (first matching candidate)
  layout transpose <p0 p1 p2 p3>
  layout swap_axis <i> <j>
  layout move_axis <src> <dst>
  layout reshape_axis <i> <j> <s0 s1 s2 s3>
                                reshape the board with your Alien
  save <file>                   write the game as JSON
  load <file>                   replace the game with a saved one
  help                          this text
  quit                          leave";

/// Parse one input line; `Ok(None)` for blank lines
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    let Some((verb, rest)) = split_verb(line) else {
        return Ok(None);
    };

    let command = match verb {
        "help" | "?" => Command::Help,
        "board" => Command::Board,
        "status" => Command::Status,
        "winner" => Command::Winner,
        "quit" | "exit" => Command::Quit,
        "moves" => Command::Moves(parse_coord(rest)?),
        "move" => {
            let coords = split_coords(rest)?;
            match coords.as_slice() {
                [start, end] => Command::Move {
                    start: parse_coord(start)?,
                    end: parse_coord(end)?,
                },
                _ => bail!("move needs a start and an end cell"),
            }
        }
        "layout" => Command::Layout(parse_layout(rest)?),
        "save" => Command::Save(parse_path(rest)?),
        "load" => Command::Load(parse_path(rest)?),
        other => bail!("Unknown command '{}' (try 'help')", other),
    };
    Ok(Some(command))
}

fn split_verb(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    })
}

fn parse_path(rest: &str) -> Result<PathBuf> {
    if rest.is_empty() {
        bail!("missing file name");
    }
    Ok(PathBuf::from(rest))
}

/// Split `"(1,1,1,1) (2, 1, 1, 1)"` into one string per coordinate
fn split_coords(rest: &str) -> Result<Vec<String>> {
    if rest.contains('(') {
        let mut coords = Vec::new();
        let mut remaining = rest;
        while let Some(open) = remaining.find('(') {
            let close = remaining[open..]
                .find(')')
                .ok_or_else(|| anyhow!("unbalanced parentheses in '{}'", rest))?;
            coords.push(remaining[open..open + close + 1].to_string());
            remaining = &remaining[open + close + 1..];
        }
        return Ok(coords);
    }
    Ok(rest.split_whitespace().map(str::to_string).collect())
}

pub fn parse_coord(text: &str) -> Result<Coord> {
    let inner = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')');
    let values = inner
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .with_context(|| format!("bad coordinate component '{}'", part.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    match values.as_slice() {
        [a, b, c, d] => Ok(Coord::new(*a, *b, *c, *d)),
        _ => bail!("expected {} components in '{}', got {}", DIMS, text.trim(), values.len()),
    }
}

fn parse_numbers(text: &str) -> Result<Vec<usize>> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .with_context(|| format!("'{}' is not an axis or extent", part))
        })
        .collect()
}

pub fn parse_layout(rest: &str) -> Result<LayoutOp> {
    let (operation, params) = split_verb(rest).ok_or_else(|| anyhow!("missing layout operation"))?;
    let numbers = parse_numbers(params)?;

    let op = match (operation, numbers.as_slice()) {
        ("transpose", &[a, b, c, d]) => LayoutOp::Transpose { axes: [a, b, c, d] },
        ("swap_axis", &[a, b]) => LayoutOp::SwapAxis { axes: [a, b] },
        ("move_axis", &[source, destination]) => LayoutOp::MoveAxis { source, destination },
        ("reshape_axis", &[i, j, s0, s1, s2, s3]) => LayoutOp::ReshapeAxis {
            axis_pair: [i, j],
            new_shape: [s0, s1, s2, s3],
        },
        ("transpose" | "swap_axis" | "move_axis" | "reshape_axis", _) => {
            bail!("wrong number of parameters for {} (try 'help')", operation)
        }
        (other, _) => bail!("Unknown layout operation '{}'", other),
    };
    Ok(op)
}
