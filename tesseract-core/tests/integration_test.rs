//! Integration tests for the Tesseract rules engine
//!
//! Exercises the public engine API end to end: movement, scratches, layout
//! operations, elimination and save/load.

use tesseract_core::{
    board::Board,
    game::GameEngine,
    pieces::{Piece, PieceKind},
    rules::{LayoutOp, Metadata, MoveType},
    Coord, GameConfig, GameError, Shape,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Two kings in opposite corners of an empty 4x4x4x4 board
fn duel() -> GameEngine {
    let mut engine = GameEngine::empty(GameConfig::default()).unwrap();
    engine.place(PieceKind::King, 0, Coord::ORIGIN).unwrap();
    engine.place(PieceKind::King, 1, Coord::new(3, 3, 3, 3)).unwrap();
    engine
}

fn kind_at(engine: &GameEngine, coord: Coord) -> Option<PieceKind> {
    engine.board().piece_at(coord).map(|p| p.kind)
}

// ============================================================================
// MOVEMENT
// ============================================================================

#[test]
fn test_rook_twelve_moves_from_center() {
    let mut engine = duel();
    engine.place(PieceKind::Rook, 0, Coord::new(1, 1, 1, 1)).unwrap();
    assert_eq!(engine.legal_moves_from(Coord::new(1, 1, 1, 1)).len(), 12);
}

#[test]
fn test_knight_targets() {
    let mut engine = duel();
    engine.place(PieceKind::Knight, 0, Coord::new(1, 1, 1, 1)).unwrap();
    let moves = engine.legal_moves_from(Coord::new(1, 1, 1, 1));
    assert!(moves.iter().any(|m| m.end == Coord::new(3, 2, 1, 1)));
    assert!(moves.iter().any(|m| m.end == Coord::new(0, 3, 1, 1)));
    assert!(moves.iter().all(|m| engine.shape().contains(m.end)));
}

#[test]
fn test_pawn_double_step_then_single() {
    let mut engine = duel();
    engine.place(PieceKind::Pawn, 0, Coord::new(1, 0, 2, 0)).unwrap();
    engine
        .execute(0, Coord::new(1, 0, 2, 0), Coord::new(3, 0, 2, 0), None)
        .unwrap();
    assert_eq!(kind_at(&engine, Coord::new(3, 0, 2, 0)), Some(PieceKind::Pawn));
    // At the far edge: nothing ahead
    assert!(engine.legal_moves_from(Coord::new(3, 0, 2, 0)).is_empty());
}

// ============================================================================
// SCRATCH
// ============================================================================

#[test]
fn test_cat_scratch_degrades_rook() {
    let mut engine = duel();
    engine.place(PieceKind::Cat, 0, Coord::new(1, 1, 1, 1)).unwrap();
    engine.place(PieceKind::Rook, 1, Coord::new(2, 0, 1, 1)).unwrap();

    let moves = engine.legal_moves_from(Coord::new(1, 1, 1, 1));
    assert!(moves
        .iter()
        .any(|m| m.move_type == MoveType::Scratch && m.end == Coord::new(2, 0, 1, 1)));

    engine
        .execute(0, Coord::new(1, 1, 1, 1), Coord::new(2, 0, 1, 1), None)
        .unwrap();
    assert!(engine.board().piece_at(Coord::new(2, 0, 1, 1)).unwrap().scratched);
    assert_eq!(kind_at(&engine, Coord::new(1, 1, 1, 1)), Some(PieceKind::Cat));

    // Player 1's profile runs down axis 0 from home 2, so the rook now steps
    // like a pawn: one cell forward plus a diagonal capture of the cat
    let rook_moves = engine.legal_moves_from(Coord::new(2, 0, 1, 1));
    let ends: Vec<(Coord, MoveType)> = rook_moves.iter().map(|m| (m.end, m.move_type)).collect();
    assert_eq!(
        ends,
        vec![
            (Coord::new(1, 0, 1, 1), MoveType::Move),
            (Coord::new(0, 0, 1, 1), MoveType::Move),
            (Coord::new(1, 1, 1, 1), MoveType::Capture),
        ]
    );
}

#[test]
fn test_failed_execute_has_no_effect() {
    let mut engine = duel();
    engine.place(PieceKind::Rook, 0, Coord::new(0, 1, 0, 0)).unwrap();
    let before = engine.to_saved();

    let err = engine
        .execute(0, Coord::new(0, 1, 0, 0), Coord::new(1, 2, 0, 0), None)
        .unwrap_err();
    assert!(matches!(err, GameError::IllegalMove { .. }));
    assert_eq!(engine.to_saved(), before);
}

// ============================================================================
// LAYOUT
// ============================================================================

#[test]
fn test_alien_swap_axis_anchor() {
    let mut board = Board::new(Shape::new([3, 3, 3, 3]).unwrap());
    let alien = board.place(Piece::new(PieceKind::Alien, 0), Coord::ORIGIN).unwrap();
    let pawn = board.place(Piece::new(PieceKind::Pawn, 1), Coord::new(1, 0, 0, 0)).unwrap();

    board.apply_layout(alien, &LayoutOp::SwapAxis { axes: [0, 1] }).unwrap();
    assert_eq!(board.shape(), Shape::new([3, 3, 3, 3]).unwrap());
    assert_eq!(board.position_of(alien), Some(Coord::ORIGIN));
    assert_eq!(board.position_of(pawn), Some(Coord::new(0, 1, 0, 0)));
}

#[test]
fn test_alien_reshape_keeps_piece_count() {
    let mut engine = GameEngine::new(GameConfig::default()).unwrap();
    let count = engine.board().len();
    let alien = engine
        .board()
        .pieces()
        .find(|(_, _, p)| p.owner == 0 && p.kind == PieceKind::Alien)
        .map(|(coord, _, _)| coord)
        .unwrap();

    let request = LayoutOp::ReshapeAxis { axis_pair: [0, 1], new_shape: [2, 8, 4, 4] }.to_metadata();
    engine.execute(0, alien, Coord::SENTINEL, Some(&request)).unwrap();

    assert_eq!(engine.shape(), Shape::new([2, 8, 4, 4]).unwrap());
    assert_eq!(engine.board().len(), count);
    assert_eq!(kind_at(&engine, alien), Some(PieceKind::Alien));
    assert_eq!(engine.current_player_id(), Some(1));
}

#[test]
fn test_layout_conflict_leaves_game_untouched() {
    let mut engine = duel();
    engine.place(PieceKind::Alien, 0, Coord::new(0, 1, 0, 0)).unwrap();
    engine.place(PieceKind::Pawn, 1, Coord::new(1, 0, 0, 0)).unwrap();
    let before = engine.to_saved();

    let result = engine.perform_layout(0, &LayoutOp::SwapAxis { axes: [0, 1] });
    assert_eq!(result, Err(GameError::CellConflict(Coord::new(0, 1, 0, 0))));
    assert_eq!(engine.to_saved(), before);
}

#[test]
fn test_perform_layout_bad_parameters() {
    let mut engine = duel();
    engine.place(PieceKind::Alien, 0, Coord::new(1, 1, 1, 1)).unwrap();
    assert!(matches!(
        engine.perform_layout(0, &LayoutOp::Transpose { axes: [0, 0, 1, 2] }),
        Err(GameError::InvalidPermutation(_))
    ));
    assert_eq!(engine.turn_index(), 0);
}

#[test]
fn test_layout_metadata_selects_exact_candidate() {
    let mut engine = duel();
    engine.place(PieceKind::Alien, 0, Coord::new(1, 1, 1, 1)).unwrap();
    engine.place(PieceKind::Rook, 1, Coord::new(2, 0, 0, 0)).unwrap();

    let request = Metadata::new()
        .with("operation", "move_axis")
        .with("source", 0)
        .with("destination", 3);
    engine
        .execute(0, Coord::new(1, 1, 1, 1), Coord::SENTINEL, Some(&request))
        .unwrap();
    // Axis 0 moved last: (2,0,0,0) -> (0,0,0,2)
    assert_eq!(kind_at(&engine, Coord::new(0, 0, 0, 2)), Some(PieceKind::Rook));
}

// ============================================================================
// ELIMINATION
// ============================================================================

#[test]
fn test_capturing_king_decides_winner() {
    let mut engine = duel();
    engine.place(PieceKind::Rook, 0, Coord::new(3, 3, 0, 3)).unwrap();
    engine
        .execute(0, Coord::new(3, 3, 0, 3), Coord::new(3, 3, 3, 3), None)
        .unwrap();

    assert_eq!(engine.active_players(), &[0]);
    assert_eq!(engine.winner(), Some(0));
    assert_eq!(engine.players().len(), 2);

    engine
        .execute(0, Coord::ORIGIN, Coord::new(0, 0, 0, 1), None)
        .unwrap();
    assert_eq!(engine.turn_index(), 0);
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn test_save_load_roundtrip() {
    let mut engine = GameEngine::new(GameConfig::default()).unwrap();
    // Opening pawn fronts are blocked; take the enemy pawn diagonally instead
    let outcome = engine
        .execute(0, Coord::new(1, 1, 1, 1), Coord::new(2, 1, 2, 1), None)
        .unwrap();
    assert!(outcome.ends_with("capturing Pawn"));

    let path = std::env::temp_dir().join(format!("tesseract-save-{}.json", std::process::id()));
    engine.save(&path).unwrap();
    let loaded = GameEngine::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.to_saved(), engine.to_saved());
    assert_eq!(loaded.current_player_id(), Some(1));
    assert_eq!(loaded.shape(), engine.shape());
    assert_eq!(loaded.board_snapshot(), engine.board_snapshot());
    assert_eq!(loaded.king_position(0), engine.king_position(0));
    assert_eq!(loaded.captured(0), &["Pawn".to_string()]);
    assert!(loaded.board().piece_at(Coord::new(2, 1, 2, 1)).unwrap().has_moved);
}

#[test]
fn test_load_after_reshape() {
    let mut engine = duel();
    engine.place(PieceKind::Alien, 0, Coord::new(1, 0, 1, 1)).unwrap();
    engine
        .perform_layout(0, &LayoutOp::ReshapeAxis { axis_pair: [1, 3], new_shape: [4, 1, 4, 16] })
        .unwrap();

    let loaded = GameEngine::from_json(&engine.to_json().unwrap()).unwrap();
    assert_eq!(loaded.shape(), Shape::new([4, 1, 4, 16]).unwrap());
    assert_eq!(loaded.board_snapshot(), engine.board_snapshot());
}
