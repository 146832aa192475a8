use crate::core::{Board, ScoreTable, SimpleRng};
use crate::types::{Coord, MatchCounts, MoveError, MoveSource, ResolveOutcome};

/// Outcome of playing one move on a scratch copy of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Simulation {
    pub counts: MatchCounts,
    pub chain: u32,
    pub points: u32,
}

/// Play `a <-> b` on a copy of `board` and run the cascade to the end.
///
/// The copy carries the board's RNG, so refills (and therefore chain
/// reactions) come out exactly as they will in the real game.
pub fn simulate(
    board: &Board,
    scores: &ScoreTable,
    a: Coord,
    b: Coord,
) -> Result<Simulation, MoveError> {
    let mut scratch = board.clone();
    scratch.check_swap(a, b)?;
    scratch.swap(a, b);

    let mut sim = Simulation::default();
    while let ResolveOutcome::Cleared(counts) = scratch.resolve_matches() {
        sim.chain += 1;
        sim.counts.add(counts);
        sim.points = sim.points.saturating_add(scores.points(&counts));
        scratch.collapse_fully();
    }
    Ok(sim)
}

/// Picks the legal move with the highest cascade score.
///
/// Ties go to the first move in scan order (top-left first).
#[derive(Debug, Clone, Default)]
pub struct GreedyPolicy {
    scores: ScoreTable,
    moves: Vec<(Coord, Coord)>,
    planned: Option<(Coord, Coord)>,
    rejected: u32,
}

impl GreedyPolicy {
    pub fn new(scores: ScoreTable) -> Self {
        Self {
            scores,
            ..Self::default()
        }
    }

    /// Best move and its simulated outcome, or `None` if nothing is legal.
    pub fn best_move(&mut self, board: &Board) -> Option<(Coord, Coord, Simulation)> {
        let mut scratch = board.clone();
        scratch.legal_moves_into(&mut self.moves);

        let mut best: Option<(Coord, Coord, Simulation)> = None;
        for &(a, b) in &self.moves {
            let Ok(sim) = simulate(board, &self.scores, a, b) else {
                continue;
            };
            if best.map_or(true, |(_, _, s)| sim.points > s.points) {
                best = Some((a, b, sim));
            }
        }
        best
    }

    /// Decide the next move for `board`. Returns the planned pair.
    pub fn plan(&mut self, board: &Board) -> Option<(Coord, Coord)> {
        self.planned = self.best_move(board).map(|(a, b, _)| (a, b));
        self.planned
    }

    pub fn planned(&self) -> Option<(Coord, Coord)> {
        self.planned
    }

    /// Proposals the controller refused (should stay 0)
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}

impl MoveSource for GreedyPolicy {
    fn propose_move(&mut self) -> Option<(Coord, Coord)> {
        self.planned.take()
    }

    fn feedback(&mut self, result: Result<(), MoveError>) {
        if result.is_err() {
            self.rejected += 1;
        }
    }
}

/// Picks uniformly among the legal moves, from its own seeded stream.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: SimpleRng,
    moves: Vec<(Coord, Coord)>,
    planned: Option<(Coord, Coord)>,
}

impl RandomPolicy {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            moves: Vec::new(),
            planned: None,
        }
    }

    pub fn plan(&mut self, board: &Board) -> Option<(Coord, Coord)> {
        let mut scratch = board.clone();
        scratch.legal_moves_into(&mut self.moves);
        self.planned = self.rng.choose(&self.moves);
        self.planned
    }
}

impl MoveSource for RandomPolicy {
    fn propose_move(&mut self) -> Option<(Coord, Coord)> {
        self.planned.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{one_move_rows, quiet_rows};
    use crate::core::{CascadeController, GameConfig};

    #[test]
    fn simulate_rejects_illegal_moves() {
        let board = Board::from_kinds(&GameConfig::default(), &quiet_rows()).unwrap();
        let scores = ScoreTable::default();
        assert!(matches!(
            simulate(&board, &scores, Coord::new(0, 0), Coord::new(5, 5)),
            Err(MoveError::InvalidMove { .. })
        ));
        assert!(matches!(
            simulate(&board, &scores, Coord::new(0, 0), Coord::new(0, 1)),
            Err(MoveError::NoMatch { .. })
        ));
    }

    #[test]
    fn greedy_picks_highest_scoring_move() {
        let config = GameConfig::default();
        // Three-making move: 5 5 _ 5 in row 7, swap (7,2)<->(7,3).
        let mut rows = one_move_rows();
        // Four-making move: 4 at (0,6), (1,6), (3,6) and (2,7).
        rows[0][6] = 4;
        rows[1][6] = 4;
        rows[3][6] = 4;
        rows[2][7] = 4;
        let board = Board::from_kinds(&config, &rows).unwrap();

        let four = simulate(&board, &config.scores, Coord::new(2, 6), Coord::new(2, 7)).unwrap();
        assert!(four.counts.four_runs >= 1);
        let three = simulate(&board, &config.scores, Coord::new(7, 2), Coord::new(7, 3)).unwrap();
        assert!(three.counts.three_runs >= 1);

        let mut greedy = GreedyPolicy::new(config.scores);
        let (_, _, best) = greedy.best_move(&board).unwrap();
        assert!(best.points >= four.points);
        assert!(best.points >= three.points);
    }

    #[test]
    fn simulation_predicts_the_real_cascade() {
        let config = GameConfig::default().with_seed(2024);
        let mut controller = CascadeController::new(config).unwrap();
        let mut greedy = GreedyPolicy::new(config.scores);

        for _ in 0..20 {
            let Some((a, b, sim)) = greedy.best_move(controller.board()) else {
                break;
            };
            let report = controller.play(a, b).unwrap();
            assert_eq!(report.score_delta, sim.points);
            assert_eq!(report.counts, sim.counts);
            assert_eq!(report.chain, sim.chain);
        }
    }

    #[test]
    fn greedy_drives_controller_as_move_source() {
        let config = GameConfig::default().with_seed(5);
        let mut controller = CascadeController::new(config).unwrap();
        let mut greedy = GreedyPolicy::new(config.scores);

        assert!(greedy.plan(controller.board()).is_some());
        let mut started = false;
        for _ in 0..4 {
            if let crate::core::TickEvent::SwapStarted { .. } = controller.tick(&mut greedy) {
                started = true;
                break;
            }
        }
        assert!(started);
        assert_eq!(greedy.rejected(), 0);
        assert_eq!(greedy.planned(), None);
    }

    #[test]
    fn random_policy_only_plans_legal_moves() {
        let config = GameConfig::default().with_seed(77);
        let mut board = Board::new(&config).unwrap();
        let mut random = RandomPolicy::new(1);
        for _ in 0..10 {
            let (a, b) = random.plan(&board).unwrap();
            assert!(board.is_legal_swap(a, b));
        }
    }
}
