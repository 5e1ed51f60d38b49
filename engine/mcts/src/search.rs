//! Time-budgeted tree search.
//!
//! Every simulation runs four phases:
//! 1. Selection: descend by UCT value to a leaf, replaying moves on a copy
//!    of the board
//! 2. Expansion: ask the candidate generator for the leaf's moves, add one
//!    child per move and step into one of them at random
//! 3. Rollout: play uniformly random moves until one side connects
//! 4. Backup: credit the result to every node on the path
//!
//! The tree and the authoritative board survive between turns. Committing a
//! real move promotes the matching child to root and discards its siblings.

use std::time::Duration;

use hex_core::{Board, BoardError, ConnectivityScratch, Move, Side};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::config::MctsConfig;
use crate::evaluator::{CandidateGenerator, EvaluatorError};
use crate::node::{NodeId, SearchNode};
use crate::tree::{SearchTree, TreeStats};

/// Errors that can occur during search.
///
/// Apart from `Evaluator`, every variant is a broken invariant: the search
/// cannot continue without corrupting its statistics.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Board invariant violated: {0}")]
    Board(#[from] BoardError),

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("Candidate generator proposed illegal move {mv} for {side}")]
    IllegalCandidate { mv: Move, side: Side },

    #[error("Root has no children on a non-terminal board")]
    NoChildren,

    #[error("Rollout filled the board without a winner")]
    NoWinner,

    #[error("Invalid tree state: {0}")]
    InvalidState(String),
}

/// Counters from the most recent call to `search` or `run_simulations`.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Completed simulations
    pub simulations: u32,
    /// Wall-clock time as measured by the explorer's clock
    pub elapsed: Duration,
    /// Simulations whose leaf was already won
    pub terminal_hits: u32,
    /// Simulations whose leaf got no candidates
    pub dead_ends: u32,
    /// Nodes added by expansion
    pub expanded_nodes: u32,
}

/// Per-child statistics at the root, in creation order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildStats {
    pub mv: Move,
    pub visits: u32,
    pub reward: f64,
}

impl ChildStats {
    /// Mean reward for the side making the root move, 0.0 if unvisited.
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.reward / self.visits as f64
        }
    }
}

/// Search session owning the tree and the real game position.
pub struct Explorer<G: CandidateGenerator> {
    tree: SearchTree,
    /// Position after every committed real move, never a simulated one
    board: Board,
    generator: G,
    config: MctsConfig,
    clock: Box<dyn Clock>,
    rng: ChaCha20Rng,
    scratch: ConnectivityScratch,
    stats: SearchStats,
}

impl<G: CandidateGenerator> std::fmt::Debug for Explorer<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("to_play", &self.to_play())
            .field("stones", &self.board.stone_count())
            .field("tree_nodes", &self.tree.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<G: CandidateGenerator> Explorer<G> {
    /// Start a session on `board` with `to_play` to move.
    pub fn new(
        board: Board,
        to_play: Side,
        generator: G,
        config: MctsConfig,
        rng: ChaCha20Rng,
    ) -> Self {
        let scratch = ConnectivityScratch::new(board.size());
        Self {
            tree: SearchTree::new(to_play),
            board,
            generator,
            config,
            clock: Box::new(SystemClock::new()),
            rng,
            scratch,
            stats: SearchStats::default(),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The authoritative board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Counters from the last search.
    pub fn last_stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Side to move in the real game.
    pub fn to_play(&self) -> Side {
        self.tree.get(self.tree.root()).next_to_move()
    }

    /// Whether the side that made the last real move has already won.
    pub fn is_terminal(&self) -> bool {
        let mover = self.tree.get(self.tree.root()).mover;
        self.board.has_connected(mover)
    }

    /// Search for the configured time budget.
    pub fn run(&mut self) -> Result<u32, SearchError> {
        self.search(self.config.time_budget)
    }

    /// Run simulations until `budget` has elapsed and return how many
    /// completed. A simulation already started always finishes, so the
    /// loop may overrun the budget by one rollout.
    pub fn search(&mut self, budget: Duration) -> Result<u32, SearchError> {
        self.stats = SearchStats::default();
        let start = self.clock.elapsed();
        let mut simulations = 0u32;

        loop {
            let elapsed = self.clock.elapsed().saturating_sub(start);
            if elapsed >= budget {
                self.stats.elapsed = elapsed;
                break;
            }
            self.simulate()?;
            simulations += 1;
        }

        self.finish(simulations);
        Ok(simulations)
    }

    /// Run exactly `n` simulations regardless of time.
    pub fn run_simulations(&mut self, n: u32) -> Result<u32, SearchError> {
        self.stats = SearchStats::default();
        let start = self.clock.elapsed();
        for _ in 0..n {
            self.simulate()?;
        }
        self.stats.elapsed = self.clock.elapsed().saturating_sub(start);
        self.finish(n);
        Ok(n)
    }

    fn finish(&mut self, simulations: u32) {
        self.stats.simulations = simulations;
        let tree = self.tree.stats();
        debug!(
            simulations,
            elapsed_ms = self.stats.elapsed.as_millis() as u64,
            terminal_hits = self.stats.terminal_hits,
            dead_ends = self.stats.dead_ends,
            tree_nodes = tree.total_nodes,
            root_visits = tree.root_visits,
            max_depth = tree.max_depth,
            "Search complete"
        );
    }

    /// Run a single simulation (select -> expand -> rollout -> backup).
    fn simulate(&mut self) -> Result<(), SearchError> {
        let (leaf, mut board) = self.select()?;
        let (node, to_play) = self.expand(leaf, &mut board)?;
        let winner = self.rollout(board, to_play)?;
        self.backup(node, to_play, winner);

        trace!(leaf = node.0, winner = %winner, "Simulation complete");
        Ok(())
    }

    /// Descend from the root to a leaf, playing each chosen move on a copy
    /// of the authoritative board.
    fn select(&mut self) -> Result<(NodeId, Board), SearchError> {
        let mut current = self.tree.root();
        let mut board = self.board.clone();

        while !self.tree.get(current).is_leaf() {
            current = self
                .tree
                .select_child(current, self.config.exploration, &mut self.rng)
                .ok_or_else(|| SearchError::InvalidState("no child selected".into()))?;
            let node = self.tree.get(current);
            play_node(&mut board, node)?;
        }

        Ok((current, board))
    }

    /// Grow one generation below `leaf` and step into a random new child.
    ///
    /// Returns the node to simulate from and the side to move there. A leaf
    /// that is already won, or that gets no candidates, is simulated itself.
    fn expand(&mut self, leaf: NodeId, board: &mut Board) -> Result<(NodeId, Side), SearchError> {
        let (mover, to_play) = {
            let node = self.tree.get(leaf);
            (node.mover, node.next_to_move())
        };

        if board.has_connected_with(mover, &mut self.scratch) {
            self.stats.terminal_hits += 1;
            return Ok((leaf, to_play));
        }

        let candidates =
            self.generator
                .ranked_candidates(board, to_play, self.config.candidate_limit)?;
        for mv in candidates.into_iter().take(self.config.candidate_limit) {
            if !board.is_legal(mv, to_play) {
                return Err(SearchError::IllegalCandidate { mv, side: to_play });
            }
            self.tree.add_child(leaf, mv);
        }

        let children = &self.tree.get(leaf).children;
        self.stats.expanded_nodes += children.len() as u32;
        let Some(&(_, child)) = children.choose(&mut self.rng) else {
            self.stats.dead_ends += 1;
            debug!(leaf = leaf.0, "No candidates, simulating from leaf");
            return Ok((leaf, to_play));
        };

        let node = self.tree.get(child);
        play_node(board, node)?;
        Ok((child, node.next_to_move()))
    }

    /// Random playout from `board` with `to_play` to move; returns the winner.
    fn rollout(&mut self, mut board: Board, to_play: Side) -> Result<Side, SearchError> {
        let last = to_play.opponent();
        if board.has_connected_with(last, &mut self.scratch) {
            return Ok(last);
        }

        let mut moves = board.empty_cells();
        moves.shuffle(&mut self.rng);

        let mut side = to_play;
        for mv in moves {
            board.play(mv, side)?;
            if board.has_connected_with(side, &mut self.scratch) {
                return Ok(side);
            }
            side = side.opponent();
        }

        Err(SearchError::NoWinner)
    }

    /// Credit one simulation to the path from `leaf` to the root.
    ///
    /// The leaf's statistics belong to the side that moved into it, which is
    /// the opponent of `to_play`; it scores 1 unless `to_play` won.
    pub(crate) fn backup(&mut self, leaf: NodeId, to_play: Side, winner: Side) {
        let reward = if winner == to_play { 0.0 } else { 1.0 };
        self.tree.backup(leaf, reward);
    }

    /// Most visited root move, ties broken at random.
    ///
    /// `None` once the game is over.
    pub fn best_move(&mut self) -> Result<Option<Move>, SearchError> {
        if self.is_terminal() {
            return Ok(None);
        }
        self.tree
            .most_visited_child(&mut self.rng)
            .map(|(mv, _)| Some(mv))
            .ok_or(SearchError::NoChildren)
    }

    /// Play a real move by the side to move.
    ///
    /// The matching child becomes the new root (a fresh one if the move was
    /// never explored) and all other root children are freed.
    pub fn commit_move(&mut self, mv: Move) -> Result<(), SearchError> {
        let mover = self.to_play();
        self.board.play(mv, mover)?;
        let explored = self.tree.get(self.tree.root()).child(mv).is_some();
        self.tree.promote_move(mv);

        debug!(
            mv = %mv,
            side = %mover,
            explored,
            tree_nodes = self.tree.len(),
            "Committed move"
        );
        Ok(())
    }

    /// Visit and reward totals of every root child, in creation order.
    pub fn root_children(&self) -> Vec<ChildStats> {
        let root = self.tree.get(self.tree.root());
        root.children
            .iter()
            .map(|(mv, id)| {
                let node = self.tree.get(*id);
                ChildStats {
                    mv: *mv,
                    visits: node.visits,
                    reward: node.reward,
                }
            })
            .collect()
    }

    /// Get statistics about the tree.
    pub fn tree_stats(&self) -> TreeStats {
        self.tree.stats()
    }
}

fn play_node(board: &mut Board, node: &SearchNode) -> Result<(), SearchError> {
    let mv = node
        .mv
        .ok_or_else(|| SearchError::InvalidState("non-root node without a move".into()))?;
    board.play(mv, node.mover)?;
    Ok(())
}
