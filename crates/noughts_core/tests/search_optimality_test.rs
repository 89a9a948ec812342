//! Minimax optimality: the searching side never loses, whatever the opponent plays.

use noughts_core::{Game, GameOutcome, Mark, Move, best_move};

/// Walks every opponent reply; the searcher answers with `best_move`.
/// Returns the number of finished games reached.
fn explore(game: &Game, searcher: Mark, check: &dyn Fn(GameOutcome, &Game)) -> usize {
    let outcome = game.outcome();
    if outcome.is_over() {
        check(outcome, game);
        return 1;
    }

    if game.to_move() == searcher {
        let best = best_move(game.board(), searcher).expect("game in progress");
        let mut next = game.clone();
        next.play(best.mv).expect("search returns a legal move");
        explore(&next, searcher, check)
    } else {
        game.board()
            .empty_cells()
            .map(|(row, col)| {
                let mut next = game.clone();
                next.play(Move::new(row, col)).expect("empty cell");
                explore(&next, searcher, check)
            })
            .sum()
    }
}

fn never_loses(searcher: Mark) -> impl Fn(GameOutcome, &Game) {
    move |outcome: GameOutcome, game: &Game| {
        assert_ne!(
            outcome,
            GameOutcome::Won(searcher.opponent()),
            "searcher {searcher} lost:\n{}",
            game.board().render()
        );
    }
}

#[test]
fn test_search_as_first_player_never_loses() {
    let games = explore(&Game::new(), Mark::X, &never_loses(Mark::X));
    assert!(games > 0);
}

#[test]
fn test_search_as_second_player_never_loses() {
    let games = explore(&Game::new(), Mark::O, &never_loses(Mark::O));
    assert!(games > 0);
}

#[test]
fn test_forced_win_is_converted() {
    // X corner, O adjacent edge, X centre: X has a forced win.
    let mut game = Game::new();
    for text in ["0-0", "0-1", "1-1"] {
        game.play(Move::parse(text).unwrap()).unwrap();
    }
    // O to move: every O reply still loses against perfect play.
    let games = explore(&game, Mark::X, &|outcome: GameOutcome, game: &Game| {
        assert_eq!(outcome, GameOutcome::Won(Mark::X), "\n{}", game.board().render());
    });
    assert!(games > 0);
}

#[test]
fn test_self_play_is_a_draw() {
    let mut game = Game::new();
    while !game.outcome().is_over() {
        let best = best_move(game.board(), game.to_move()).expect("game in progress");
        game.play(best.mv).unwrap();
    }
    assert_eq!(game.outcome(), GameOutcome::Draw);
}
