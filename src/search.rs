/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    cmp::Reverse,
    fmt,
    marker::PhantomData,
    ops::{Deref, Neg},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use arrayvec::ArrayVec;
use uci_parser::{UciInfo, UciResponse};

use crate::{
    tune, value_of, Evaluator, HistoryTable, KillerTable, LogLevel, Move, MoveList, Piece,
    PieceKind, Position, Score, TTable, TTableEntry, ZobristKey,
};

/// Maximum depth that iterative deepening will search to.
pub const MAX_DEPTH: u8 = 64;

/// Maximum distance from the root, in plies, that any node can be.
///
/// Bounds the quiescence search and sizes the per-ply tables.
pub const MAX_PLY: usize = 128;

/// A marker trait for the types of nodes encountered during search.
trait NodeType {
    /// Is this node the first searched?
    const ROOT: bool;

    /// Is this node a PV node?
    const PV: bool;
}

/// First node searched.
struct RootNode;
impl NodeType for RootNode {
    const ROOT: bool = true;
    const PV: bool = true;
}

/// A node on the principal variation, searched with a non-null window.
struct PvNode;
impl NodeType for PvNode {
    const ROOT: bool = false;
    const PV: bool = true;
}

/// A node not on the principal variation, searched with a null window.
struct NonPvNode;
impl NodeType for NonPvNode {
    const ROOT: bool = false;
    const PV: bool = false;
}

/// Represents the best sequence of moves found during a search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrincipalVariation(ArrayVec<Move, MAX_PLY>);

impl PrincipalVariation {
    /// An empty PV.
    pub const EMPTY: Self = Self(ArrayVec::new_const());

    /// Builds a PV from a line of moves, keeping at most [`MAX_PLY`] of them.
    #[inline(always)]
    fn from_line(line: &[Move]) -> Self {
        Self(line.iter().copied().take(MAX_PLY).collect())
    }
}

impl Default for PrincipalVariation {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Deref for PrincipalVariation {
    type Target = [Move];
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for PrincipalVariation {
    /// Moves separated by spaces, as in a UCI `pv` field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.0.iter().map(Move::to_string).collect::<Vec<_>>();
        write!(f, "{}", line.join(" "))
    }
}

/// Bounds within an alpha-beta search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBounds {
    /// Lower bound.
    ///
    /// We are guaranteed a score that is AT LEAST `alpha`.
    /// During search, if no move can raise `alpha`, we are said to have "failed low."
    ///
    /// On a fail-low, we do not have a "best move."
    pub alpha: Score,

    /// Upper bound.
    ///
    /// Our opponent is guaranteed a score that is AT MOST `beta`.
    /// During search, if a move scores higher than `beta`, we are said to have "failed high."
    pub beta: Score,
}

impl SearchBounds {
    /// Create a new [`SearchBounds`] from the provided `alpha` and `beta` values.
    #[inline(always)]
    pub const fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }

    /// An aspiration window of `delta` on either side of `guess`, never wider than the full window.
    #[inline(always)]
    fn around(guess: Score, delta: i32) -> Self {
        Self::new(
            (guess - delta).max(Score::ALPHA),
            (guess + delta).min(Score::BETA),
        )
    }

    /// Create a "null window" around `alpha`.
    #[inline(always)]
    fn null_alpha(self) -> Self {
        Self::new(self.alpha, self.alpha + 1)
    }

    /// Create a "null window" around `beta`.
    #[inline(always)]
    fn null_beta(self) -> Self {
        Self::new(self.beta - 1, self.beta)
    }

    /// Returns `true` if `score` lies strictly inside these bounds.
    #[inline(always)]
    fn contains(&self, score: Score) -> bool {
        self.alpha < score && score < self.beta
    }
}

impl Neg for SearchBounds {
    type Output = Self;
    /// Negating a [`SearchBounds`] swaps the `alpha` and `beta` fields and negates them both.
    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self {
            alpha: -self.beta,
            beta: -self.alpha,
        }
    }
}

impl Default for SearchBounds {
    /// Default [`SearchBounds`] are a `(-infinity, infinity)`.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Score::ALPHA, Score::BETA)
    }
}

/// What a single completed iteration of iterative deepening found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IterationReport {
    /// Depth of this iteration.
    pub depth: u8,

    /// Score of the root position.
    pub score: Score,

    /// Nodes searched so far, across all iterations.
    pub nodes: u64,

    /// Principal variation of this iteration.
    pub pv: PrincipalVariation,
}

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched, including those of a discarded final iteration.
    pub nodes: u64,

    /// Best move found during the search.
    ///
    /// `None` only if the root has no legal moves.
    pub bestmove: Option<Move>,

    /// Score of the root position from the side-to-move's perspective.
    pub score: Score,

    /// The depth of the deepest completed iteration.
    pub depth: u8,

    /// Principal variation of the deepest completed iteration.
    pub pv: PrincipalVariation,

    /// Every completed iteration, shallowest first.
    pub iterations: Vec<IterationReport>,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: Score::ALPHA,
            depth: 0,
            pv: PrincipalVariation::EMPTY,
            iterations: Vec::new(),
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    ///
    /// Depth 1 is always searched, even if this is `0`.
    pub max_depth: u8,

    /// Node allowance.
    ///
    /// If the search exceeds this many nodes, it will exit as quickly as possible.
    pub max_nodes: u64,

    /// Start time of the search.
    pub starttime: Instant,

    /// Soft limit on search time.
    ///
    /// No new iteration of iterative deepening is started once this has elapsed.
    pub soft_timeout: Duration,

    /// Hard limit on search time.
    ///
    /// During *any* point in the search past depth 1, if this limit is exceeded, the search will cancel.
    pub hard_timeout: Duration,
}

impl SearchConfig {
    /// A config that searches for at most `movetime`, to any depth.
    #[inline(always)]
    pub fn with_movetime(movetime: Duration) -> Self {
        Self {
            soft_timeout: movetime,
            hard_timeout: movetime,
            ..Default::default()
        }
    }

    /// A config that searches to exactly `depth`, with no other limits.
    #[inline(always)]
    pub fn with_depth(depth: u8) -> Self {
        Self {
            max_depth: depth,
            ..Default::default()
        }
    }
}

impl Default for SearchConfig {
    /// A default [`SearchConfig`] will permit an "infinite" search, bounded only by [`MAX_DEPTH`].
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_nodes: u64::MAX,
            starttime: Instant::now(),
            soft_timeout: Duration::MAX,
            hard_timeout: Duration::MAX,
        }
    }
}

/// Executes a search on a position.
///
/// Everything besides the transposition table lives only as long as one call to [`Search::start`].
pub struct Search<'a, Log, E> {
    /// Number of nodes searched.
    nodes: u64,

    /// An atomic flag to determine if the search should be cancelled at any time.
    ///
    /// If this is ever `false`, the search must exit as soon as possible.
    is_searching: Arc<AtomicBool>,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Transposition table used to cache information during search.
    ttable: &'a mut TTable,

    /// Scores the leaves of the search.
    evaluator: E,

    /// Quiet moves that caused beta cutoffs, by piece and target square.
    history: HistoryTable,

    /// Quiet moves that caused beta cutoffs, by ply.
    killers: KillerTable,

    /// Triangular PV table. The line found at `ply` lives in `pv_table[ply][ply..pv_length[ply]]`.
    pv_table: Box<[[Move; MAX_PLY]; MAX_PLY]>,

    /// One past the end of each ply's line in `pv_table`.
    pv_length: [usize; MAX_PLY],

    /// PV of the last completed iteration, searched first in the next one.
    prev_pv: PrincipalVariation,

    /// Whether the current node is still on `prev_pv`.
    follow_pv: bool,

    /// Keys of the game so far and the current search path.
    ///
    /// `None` marks an irreversible move; nothing before it can repeat.
    path: Vec<Option<ZobristKey>>,

    /// Whether the current iteration may be interrupted.
    can_stop: bool,

    /// Set once the search has been interrupted; every node then unwinds.
    stopped: bool,

    /// Marker for the level of logging to print.
    log: PhantomData<&'a Log>,
}

impl<'a, Log: LogLevel, E: Evaluator> Search<'a, Log, E> {
    /// Construct a new [`Search`] instance to execute.
    #[inline(always)]
    pub fn new(
        is_searching: Arc<AtomicBool>,
        config: SearchConfig,
        ttable: &'a mut TTable,
        evaluator: E,
    ) -> Self {
        Self {
            nodes: 0,
            is_searching,
            config,
            ttable,
            evaluator,
            history: HistoryTable::default(),
            killers: KillerTable::default(),
            pv_table: Box::new([[Move::NULL; MAX_PLY]; MAX_PLY]),
            pv_length: [0; MAX_PLY],
            prev_pv: PrincipalVariation::EMPTY,
            follow_pv: false,
            path: Vec::new(),
            can_stop: false,
            stopped: false,
            log: PhantomData,
        }
    }

    /// Seeds the keys of the positions played before the root, oldest first.
    ///
    /// Reaching any of them again inside the tree scores as a draw. Only keys since the last
    /// irreversible move matter, but passing the whole game is harmless.
    #[inline(always)]
    pub fn with_history(mut self, keys: impl IntoIterator<Item = ZobristKey>) -> Self {
        self.path = keys.into_iter().map(Some).collect();
        self
    }

    /// Start the search on the supplied [`Position`], returning a [`SearchResult`].
    ///
    /// This is the entrypoint of the search, and prints UCI info before starting iterative deepening,
    /// concluding by sending the `bestmove` message and exiting.
    #[inline(always)]
    pub fn start(mut self, position: &Position) -> SearchResult {
        if Log::DEBUG {
            self.send_string(format!("Starting search on {:?}", position.to_fen()));

            let soft = self.config.soft_timeout.as_millis();
            let hard = self.config.hard_timeout.as_millis();
            let nodes = self.config.max_nodes;
            let depth = self.config.max_depth;

            if soft < Duration::MAX.as_millis() {
                self.send_string(format!("Soft timeout := {soft}ms"));
            }
            if hard < Duration::MAX.as_millis() {
                self.send_string(format!("Hard timeout := {hard}ms"));
            }
            if nodes < u64::MAX {
                self.send_string(format!("Max nodes := {nodes} nodes"));
            }
            if depth < MAX_DEPTH {
                self.send_string(format!("Max depth := {depth}"));
            }
        }

        let res = self.iterative_deepening(position);

        if Log::DEBUG {
            let hits = self.ttable.hits;
            let accesses = self.ttable.accesses;
            let hit_rate = hits as f32 / accesses.max(1) as f32 * 100.0;
            let collisions = self.ttable.collisions;
            let info = format!("TT stats: {hits} hits / {accesses} accesses ({hit_rate:.2}% hit rate), {collisions} collisions");
            self.send_string(info);
        }

        // Search has ended; send bestmove
        if Log::INFO {
            self.send_response(UciResponse::BestMove {
                bestmove: res.bestmove.map(|mv| mv.to_string()),
                ponder: None,
            });
        }

        // Search has concluded, alert other thread(s) that we are no longer searching
        self.is_searching.store(false, Ordering::Relaxed);

        res
    }

    /// Sends a [`UciResponse`] to `stdout`.
    #[inline(always)]
    fn send_response<T: fmt::Display>(&self, response: UciResponse<T>) {
        println!("{response}");
    }

    /// Sends a [`UciInfo`] to `stdout`.
    #[inline(always)]
    fn send_info(&self, info: UciInfo) {
        let resp = UciResponse::info(info);
        self.send_response(resp);
    }

    /// Sends UCI info about a completed iteration.
    #[inline(always)]
    fn send_iteration_info(&self, report: &IterationReport) {
        let elapsed = self.config.starttime.elapsed();

        self.send_info(
            UciInfo::new()
                .depth(report.depth)
                .nodes(report.nodes)
                .score(report.score.into_uci())
                .nps((report.nodes as f32 / elapsed.as_secs_f32()).trunc())
                .time(elapsed.as_millis())
                .pv(report.pv.iter().map(Move::to_string)),
        );
    }

    /// Helper to send a [`UciInfo`] containing only a `string` message to `stdout`.
    #[inline(always)]
    fn send_string<T: fmt::Display>(&self, string: T) {
        self.send_response(UciResponse::info_string(string));
    }

    /// Performs [iterative deepening](https://www.chessprogramming.org/Iterative_Deepening) (ID) on the Search's position.
    ///
    /// Each iteration's score centers an [aspiration window](https://www.chessprogramming.org/Aspiration_Windows)
    /// for the next. A score outside that window is never trusted: the same depth is searched again with a full window.
    ///
    /// An interrupted iteration is thrown away, and the result of the previous one is returned.
    fn iterative_deepening(&mut self, position: &Position) -> SearchResult {
        // Initialize `bestmove` to the first move available
        let mut result = SearchResult {
            bestmove: position.legal_moves().first().copied(),
            ..Default::default()
        };

        self.path.push(Some(position.key()));

        for depth in 1..=self.config.max_depth.max(1) {
            // Depth 1 always runs to completion; after that, only start an iteration if there is time for it
            if depth > 1
                && (self.config.starttime.elapsed() >= self.config.soft_timeout
                    || self.search_cancelled())
            {
                break;
            }
            self.can_stop = depth > 1;

            // No window around a mate score, since those shift between iterations
            let bounds = match result.iterations.last() {
                Some(prev) if !prev.score.is_mate() => {
                    SearchBounds::around(prev.score, tune::aspiration_window_delta!())
                }
                _ => SearchBounds::default(),
            };

            self.follow_pv = true;
            let mut score = self.negamax::<RootNode>(position, depth, 0, bounds, true);

            if !self.stopped && !bounds.contains(score) && bounds != SearchBounds::default() {
                if Log::DEBUG {
                    self.send_string(format!(
                        "Depth {depth} scored {score} outside of [{}, {}]; searching again",
                        bounds.alpha.inner(),
                        bounds.beta.inner()
                    ));
                }

                self.follow_pv = true;
                score =
                    self.negamax::<RootNode>(position, depth, 0, SearchBounds::default(), true);
            }

            if self.stopped {
                if Log::DEBUG {
                    self.send_string(format!("Search cancelled during depth {depth}"));
                }
                break;
            }

            let pv = PrincipalVariation::from_line(&self.pv_table[0][..self.pv_length[0]]);
            let report = IterationReport {
                depth,
                score,
                nodes: self.nodes,
                pv: pv.clone(),
            };

            if Log::INFO {
                self.send_iteration_info(&report);
            }

            result.bestmove = pv.first().copied();
            result.score = score;
            result.depth = depth;
            result.pv = pv.clone();
            result.iterations.push(report);

            self.prev_pv = pv;
        }

        result.nodes = self.nodes;

        // ID loop has concluded (either by finishing or timing out),
        // so we return the result from the last successfully-completed search.
        result
    }

    /// Primary location of search logic.
    ///
    /// Uses the [negamax](https://www.chessprogramming.org/Negamax) algorithm in a
    /// [fail soft](https://www.chessprogramming.org/Alpha-Beta#Negamax_Framework) framework,
    /// with [principal variation search](https://www.chessprogramming.org/Principal_Variation_Search).
    fn negamax<Node: NodeType>(
        &mut self,
        position: &Position,
        depth: u8,
        ply: usize,
        mut bounds: SearchBounds,
        allow_null: bool,
    ) -> Score {
        self.pv_length[ply] = ply;

        if !Node::ROOT && self.is_repetition(position.key()) {
            return Score::DRAW;
        }

        /****************************************************************************************************
         * TT Cutoffs: https://www.chessprogramming.org/Transposition_Table#Transposition_Table_Cutoffs
         *
         * Not in PV nodes, where only the stored move is used.
         ****************************************************************************************************/
        if !Node::PV {
            if let Some(tt_score) = self.probe_tt(position.key(), depth, ply, bounds) {
                return tt_score;
            }
        }

        if depth == 0 {
            return self.quiescence(position, ply, bounds);
        }

        self.nodes += 1;
        if self.should_stop() {
            return Score::DRAW;
        }

        if ply >= MAX_PLY - 1 {
            return self.evaluator.evaluate(position);
        }

        let in_check = position.is_check();

        /****************************************************************************************************
         * Null Move Pruning: https://www.chessprogramming.org/Null_Move_Pruning
         *
         * If we can afford to skip our turn and still fail high, our opponent would never let us get here.
         ****************************************************************************************************/
        if !Node::PV
            && allow_null
            && !in_check
            && depth >= tune::min_nmp_depth!()
            && position.has_non_pawn_material(position.side_to_move())
        {
            let mut null = *position;
            null.make_null_move();

            self.path.push(None);
            self.path.push(Some(null.key()));
            let score = -self.negamax::<NonPvNode>(
                &null,
                depth - 1 - tune::nmp_reduction!(),
                ply + 1,
                -bounds.null_beta(),
                false,
            );
            self.path.truncate(self.path.len() - 2);

            if self.stopped {
                return Score::DRAW;
            }

            if score >= bounds.beta {
                // Mates found after passing can't be trusted
                return if score.is_mate() { bounds.beta } else { score };
            }
        }

        let tt_move = self.get_tt_bestmove(position.key());
        let mut moves = position.pseudo_legal_moves();
        let pv_move = self.pv_move(ply, &moves);
        moves.sort_by_cached_key(|&mv| Reverse(self.score_move(mv, ply, pv_move, tt_move)));

        // Start with a *really bad* initial score
        let mut best = Score::ALPHA;
        let mut bestmove = Move::NULL;
        let original_alpha = bounds.alpha;
        let mut moves_searched = 0;

        /****************************************************************************************************
         * Primary move loop
         ****************************************************************************************************/
        for mv in moves {
            // Copy-make; an illegal move leaves only the discarded copy behind
            let Some(new) = position.with_move_made(mv) else {
                continue;
            };

            self.enter(mv, new.key());

            let score = if moves_searched == 0 {
                // The first move keeps this node's type
                if Node::PV {
                    -self.negamax::<PvNode>(&new, depth - 1, ply + 1, -bounds, true)
                } else {
                    -self.negamax::<NonPvNode>(&new, depth - 1, ply + 1, -bounds, true)
                }
            } else {
                /****************************************************************************************************
                 * Late Move Reductions: https://www.chessprogramming.org/Late_Move_Reductions
                 *
                 * Late quiet moves are probably bad, so look at them with less depth first.
                 ****************************************************************************************************/
                let reduce = moves_searched >= tune::min_lmr_moves!()
                    && depth >= tune::min_lmr_depth!()
                    && !in_check
                    && mv.is_quiet()
                    && !new.is_check();

                let mut score = if reduce {
                    -self.negamax::<NonPvNode>(
                        &new,
                        depth - tune::lmr_reduction!(),
                        ply + 1,
                        -bounds.null_alpha(),
                        true,
                    )
                } else {
                    // Force the full-depth probe below
                    bounds.alpha + 1
                };

                /****************************************************************************************************
                 * Principal Variation Search: https://www.chessprogramming.org/Principal_Variation_Search
                 *
                 * Everything after the first move only has to prove it is no better than alpha, which a null window does cheaply.
                 ****************************************************************************************************/
                if score > bounds.alpha {
                    score = -self.negamax::<NonPvNode>(
                        &new,
                        depth - 1,
                        ply + 1,
                        -bounds.null_alpha(),
                        true,
                    );

                    if Node::PV && bounds.contains(score) {
                        score = -self.negamax::<PvNode>(&new, depth - 1, ply + 1, -bounds, true);
                    }
                }

                score
            };

            self.leave(mv);
            moves_searched += 1;

            if self.stopped {
                return Score::DRAW;
            }

            /****************************************************************************************************
             * Score evaluation & bounds adjustments
             ****************************************************************************************************/
            if score > best {
                best = score;

                if score > bounds.alpha {
                    bounds.alpha = score;
                    bestmove = mv;
                    self.update_pv(ply, mv);
                }

                // Fail high
                if score >= bounds.beta {
                    if mv.is_quiet() {
                        self.killers.store(ply, mv);
                        self.history.update(mv, depth);
                    }
                    break;
                }
            }
        }

        // If there are no legal moves, it's either mate or a draw.
        if moves_searched == 0 {
            return if in_check {
                // Offset by ply to prefer earlier mates
                Score::mated_in(ply)
            } else {
                Score::DRAW
            };
        }

        self.save_to_tt(
            position.key(),
            bestmove,
            best,
            SearchBounds::new(original_alpha, bounds.beta),
            depth,
            ply,
        );

        best
    }

    /// Quiescence Search (QSearch)
    ///
    /// A search that looks at only captures, called when [`Search::negamax`] reaches a depth of 0.
    /// Standing pat, or stopping here, is always an option, since captures are never forced.
    fn quiescence(&mut self, position: &Position, ply: usize, mut bounds: SearchBounds) -> Score {
        self.pv_length[ply] = ply;
        self.nodes += 1;

        if self.should_stop() {
            return Score::DRAW;
        }

        // Evaluate the current position, to serve as our baseline
        let stand_pat = self.evaluator.evaluate(position);

        if ply >= MAX_PLY - 1 {
            return stand_pat;
        }

        // Beta cutoff; this position is "too good" and our opponent would never let us get here
        if stand_pat >= bounds.beta {
            return stand_pat;
        } else if stand_pat > bounds.alpha {
            bounds.alpha = stand_pat;
        }

        let mut captures = position
            .pseudo_legal_moves()
            .into_iter()
            .filter(Move::is_capture)
            .collect::<MoveList>();
        captures.sort_by_cached_key(|&mv| Reverse(mvv_lva(mv)));

        let mut best = stand_pat;

        for mv in captures {
            let mut new = *position;
            if !new.make_move(mv, true) {
                continue;
            }

            let score = -self.quiescence(&new, ply + 1, -bounds);

            if self.stopped {
                return Score::DRAW;
            }

            if score > best {
                best = score;

                if score > bounds.alpha {
                    bounds.alpha = score;
                }

                if score >= bounds.beta {
                    break;
                }
            }
        }

        best // fail-soft
    }

    /// Checks if we've exceeded any conditions that would warrant the search to end.
    #[inline(always)]
    fn search_cancelled(&self) -> bool {
        // Condition 1: We've exceeded the hard limit of our allotted search time
        self.config.starttime.elapsed() >= self.config.hard_timeout ||
        // Condition 2: The search was stopped by an external factor, like the `stop` command
        !self.is_searching.load(Ordering::Relaxed) ||
        // Condition 3: We've exceeded the maximum amount of nodes we're allowed to search
        self.nodes >= self.config.max_nodes
    }

    /// Latches [`Search::search_cancelled`] into `stopped`, unless the current iteration must finish.
    #[inline(always)]
    fn should_stop(&mut self) -> bool {
        if !self.stopped && self.can_stop && self.search_cancelled() {
            self.stopped = true;
        }
        self.stopped
    }

    /// Returns `true` if `key` occurred earlier on the path, with no irreversible move in between.
    #[inline(always)]
    fn is_repetition(&self, key: ZobristKey) -> bool {
        // The last entry is this position itself
        self.path
            .iter()
            .rev()
            .skip(1)
            .map_while(|&entry| entry)
            .any(|prev| prev == key)
    }

    /// Records the position reached by `mv` on the search path.
    #[inline(always)]
    fn enter(&mut self, mv: Move, key: ZobristKey) {
        if is_irreversible(mv) {
            self.path.push(None);
        }
        self.path.push(Some(key));
    }

    /// Undoes [`Search::enter`].
    #[inline(always)]
    fn leave(&mut self, mv: Move) {
        self.path.pop();
        if is_irreversible(mv) {
            self.path.pop();
        }
    }

    /// Copies the child's line behind `mv` into this ply's line.
    #[inline(always)]
    fn update_pv(&mut self, ply: usize, mv: Move) {
        let child_len = self.pv_length[ply + 1];

        self.pv_table[ply][ply] = mv;
        for next in ply + 1..child_len {
            self.pv_table[ply][next] = self.pv_table[ply + 1][next];
        }
        self.pv_length[ply] = child_len;
    }

    /// The previous iteration's move at `ply`, if this node is still following its PV and the move is available here.
    ///
    /// Following stops for good once a node strays from the line.
    #[inline(always)]
    fn pv_move(&mut self, ply: usize, moves: &MoveList) -> Option<Move> {
        if !self.follow_pv {
            return None;
        }

        let pv_move = self
            .prev_pv
            .get(ply)
            .copied()
            .filter(|mv| moves.contains(mv));

        self.follow_pv = pv_move.is_some();
        pv_move
    }

    /// Saves the provided data to an entry in the TTable.
    #[inline(always)]
    fn save_to_tt(
        &mut self,
        key: ZobristKey,
        bestmove: Move,
        score: Score,
        bounds: SearchBounds,
        depth: u8,
        ply: usize,
    ) {
        let entry = TTableEntry::new(key, bestmove, score, bounds, depth, ply);
        let old = self.ttable.store(entry);

        if Log::DEBUG {
            // If a previous entry existed and had a *different* key, this was a collision
            if old.is_some_and(|old| old.key != key) {
                self.ttable.collisions += 1;
            }
        }
    }

    /// Gets the bestmove for the provided position from the TTable, if it exists.
    #[inline(always)]
    fn get_tt_bestmove(&mut self, key: ZobristKey) -> Option<Move> {
        let mv = self
            .ttable
            .get(&key)
            .map(|entry| entry.bestmove)
            .filter(|mv| !mv.is_null());

        if Log::DEBUG {
            // Regardless whether this was a hit, it was still an access
            self.ttable.accesses += 1;

            // If a move was found, this was a hit
            if mv.is_some() {
                self.ttable.hits += 1;
            }
        }

        mv
    }

    /// Probes the [`TTable`] for an entry at the provided `key`, returning that entry's score, if appropriate.
    ///
    /// Only entries from at least `depth` are considered. See [`TTableEntry::try_score`] for the rest.
    #[inline(always)]
    fn probe_tt(
        &self,
        key: ZobristKey,
        depth: u8,
        ply: usize,
        bounds: SearchBounds,
    ) -> Option<Score> {
        self.ttable
            .get(&key)
            .filter(|entry| entry.depth >= depth)
            .and_then(|entry| entry.try_score(bounds, ply))
    }

    /// Applies a score to the provided move, intended to be used when ordering moves during search.
    ///
    /// Higher is searched first.
    #[inline(always)]
    fn score_move(
        &self,
        mv: Move,
        ply: usize,
        pv_move: Option<Move>,
        tt_move: Option<Move>,
    ) -> i32 {
        let [first_killer, second_killer] = self.killers.get(ply);

        if pv_move == Some(mv) {
            tune::pv_move_score!()
        } else if tt_move == Some(mv) {
            tune::tt_move_score!()
        } else if mv.is_capture() {
            tune::capture_base_score!() + mvv_lva(mv)
        } else if mv == first_killer {
            tune::first_killer_score!()
        } else if mv == second_killer {
            tune::second_killer_score!()
        } else {
            self.history.score(mv)
        }
    }
}

/// Moves after which no earlier position can occur again.
#[inline(always)]
fn is_irreversible(mv: Move) -> bool {
    mv.is_capture() || mv.is_castle() || mv.piece().kind() == PieceKind::Pawn
}

/// MVV-LVA score of a capture; zero for anything else.
#[inline(always)]
fn mvv_lva(mv: Move) -> i32 {
    mv.captured()
        .map_or(0, |victim| MVV_LVA[mv.piece()][victim])
}

/// This table represents values for [MVV-LVA](https://www.chessprogramming.org/MVV-LVA) move ordering.
///
/// It is indexed by `[attacker][victim]`, and yields `10 * victim - attacker`, using [`value_of`].
///
/// Capturing a King or a piece of one's own color never happens, and scores 0.
const MVV_LVA: [[i32; Piece::COUNT]; Piece::COUNT] = {
    let mut matrix = [[0; Piece::COUNT]; Piece::COUNT];

    let mut attacker = 0;
    while attacker < Piece::COUNT {
        let mut victim = 0;
        while victim < Piece::COUNT {
            if let (Some(atk), Some(vtm)) = (Piece::from_index(attacker), Piece::from_index(victim))
            {
                let can_capture = atk.color().index() != vtm.color().index()
                    && !matches!(vtm.kind(), PieceKind::King);

                if can_capture {
                    matrix[attacker][victim] = 10 * value_of(vtm.kind()) - value_of(atk.kind());
                }
            }
            victim += 1;
        }
        attacker += 1;
    }
    matrix
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    fn run_search(fen: &str, config: SearchConfig) -> SearchResult {
        let mut ttable = TTable::new(1);
        run_search_with(fen, config, &mut ttable, [])
    }

    fn run_search_with(
        fen: &str,
        config: SearchConfig,
        ttable: &mut TTable,
        history: impl IntoIterator<Item = ZobristKey>,
    ) -> SearchResult {
        let is_searching = Arc::new(AtomicBool::new(true));
        let position = fen.parse().unwrap();

        Search::<LogNone, _>::new(is_searching, config, ttable, MaterialEvaluator)
            .with_history(history)
            .start(&position)
    }

    fn ensure_is_mate_in(fen: &str, config: SearchConfig, moves: i32) -> SearchResult {
        let res = run_search(fen, config);
        assert!(
            res.score.is_mate(),
            "Search on {fen:?} with config {config:#?} produced result that is not mate.\nResult: {res:#?}"
        );
        assert_eq!(
            res.score.moves_to_mate(),
            moves,
            "Search on {fen:?} with config {config:#?} produced result not mate in {moves}.\nResult: {res:#?}"
        );
        res
    }

    #[test]
    fn test_white_mate_in_1() {
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        let res = ensure_is_mate_in(fen, SearchConfig::with_depth(2), 1);

        // Every mate is equally short, so just check the move does mate
        let pos: Position = fen.parse().unwrap();
        let mated = pos.with_move_made(res.bestmove.unwrap()).unwrap();
        assert!(mated.is_check());
        assert!(mated.legal_moves().is_empty());
        assert_eq!(res.score, Score::MATE - 1);
    }

    #[test]
    fn test_black_mated_in_1() {
        let fen = "1k6/8/KQ6/2Q5/8/8/8/8 b - - 0 1";
        let res = ensure_is_mate_in(fen, SearchConfig::with_depth(3), -1);
        assert_eq!(res.bestmove.unwrap(), "b8a8");
        assert_eq!(res.score, Score::mated_in(2));
    }

    #[test]
    fn test_checkmated_root_has_no_move() {
        let fen = "k7/1Q6/K7/8/8/8/8/8 b - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(3));
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, Score::mated_in(0));
    }

    #[test]
    fn test_stalemate() {
        let fen = "k7/8/KQ6/8/8/8/8/8 b - - 0 1";
        let res = run_search(fen, SearchConfig::default());
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, Score::DRAW);
    }

    #[test]
    fn test_obvious_capture_promote() {
        // Pawn should take queen and also promote to queen
        let fen = "3q1n2/4P3/8/8/8/8/k7/7K w - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(1));
        assert_eq!(res.bestmove.unwrap(), "e7d8q");
    }

    #[test]
    fn test_quiescence_sees_recapture() {
        // Taking the defended pawn loses the queen
        let fen = "4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(1));
        assert_ne!(res.bestmove.unwrap(), "d1d5");
        assert!(res.score >= Score::new(0));
    }

    #[test]
    fn test_quick_search_finds_move() {
        // If *any* legal move is available, it should be found, regardless of how much time was given.
        let config = SearchConfig::with_movetime(Duration::ZERO);
        let res = run_search(FEN_STARTPOS, config);
        assert!(res.bestmove.is_some());
        assert_eq!(res.depth, 1);
    }

    #[test]
    fn test_stopped_search_still_completes_depth_one() {
        let mut ttable = TTable::new(1);
        let position = Position::default();

        let res = Search::<LogNone, _>::new(
            Arc::new(AtomicBool::new(false)),
            SearchConfig::default(),
            &mut ttable,
            MaterialEvaluator,
        )
        .start(&position);

        assert_eq!(res.depth, 1);
        assert_eq!(res.iterations.len(), 1);
        assert!(res.bestmove.is_some());
    }

    #[test]
    fn test_node_limit() {
        let config = SearchConfig {
            max_nodes: 5_000,
            ..Default::default()
        };
        let res = run_search(FEN_KIWIPETE, config);
        assert!(res.bestmove.is_some());
        assert!(res.depth < MAX_DEPTH);
    }

    #[test]
    fn test_iterations_and_pv_are_playable() {
        let res = run_search(FEN_KIWIPETE, SearchConfig::with_depth(4));

        let depths = res.iterations.iter().map(|it| it.depth).collect::<Vec<_>>();
        assert_eq!(depths, [1, 2, 3, 4]);
        assert_eq!(res.depth, 4);
        assert_eq!(res.pv, res.iterations[3].pv);
        assert_eq!(res.bestmove, res.pv.first().copied());

        // Node counts only grow
        assert!(res.iterations.windows(2).all(|w| w[0].nodes <= w[1].nodes));

        let mut pos = Position::from_fen(FEN_KIWIPETE).unwrap();
        for &mv in res.pv.iter() {
            assert!(pos.legal_moves().contains(&mv), "{mv} is not legal in {pos}");
            pos = pos.with_move_made(mv).unwrap();
        }
    }

    #[test]
    fn test_failed_aspiration_is_searched_again() {
        // Nc7+ forks King and Queen, which only shows from depth 2 onwards
        let fen = "q3k3/8/8/3N4/8/8/8/4K3 w - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(3));

        let depths = res.iterations.iter().map(|it| it.depth).collect::<Vec<_>>();
        assert_eq!(depths, [1, 2, 3]);

        let (first, second) = (res.iterations[0].score, res.iterations[1].score);
        assert!(
            (second - first).inner() > tune::aspiration_window_delta!(),
            "{first} -> {second} stayed inside the window"
        );

        // Same depth, full window, nothing cached
        let mut ttable = TTable::new(1);
        let mut search = Search::<LogNone, _>::new(
            Arc::new(AtomicBool::new(true)),
            SearchConfig::default(),
            &mut ttable,
            MaterialEvaluator,
        );
        let position = Position::from_fen(fen).unwrap();
        let full = search.negamax::<RootNode>(&position, 2, 0, SearchBounds::default(), true);

        assert_eq!(second, full);
        assert_eq!(second, Score::new(value_of(PieceKind::Knight)));
    }

    #[test]
    fn test_root_is_stored_in_ttable() {
        let mut ttable = TTable::new(1);
        let res = run_search_with(FEN_STARTPOS, SearchConfig::with_depth(3), &mut ttable, []);

        let entry = ttable.get(&Position::default().key()).copied().unwrap();
        assert_eq!(entry.depth, 3);
        assert_eq!(Some(entry.bestmove), res.bestmove);
    }

    #[test]
    fn test_history_repetition_is_a_draw() {
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        let pos: Position = fen.parse().unwrap();
        let seen = pos.with_move_made(pos.find_move("b6a7").unwrap()).unwrap();

        let mut ttable = TTable::new(1);
        let res = run_search_with(fen, SearchConfig::with_depth(2), &mut ttable, [seen.key()]);

        // Another mate is available, and the repeated one is worth nothing
        assert_ne!(res.bestmove.unwrap(), "b6a7");
        assert_eq!(res.score, Score::MATE - 1);
    }

    #[test]
    fn test_irreversible_moves_block_repetitions() {
        let mut ttable = TTable::new(1);
        let mut search = Search::<LogNone, _>::new(
            Arc::new(AtomicBool::new(true)),
            SearchConfig::default(),
            &mut ttable,
            MaterialEvaluator,
        );

        let a = Position::default().key();
        let b = Position::from_fen(FEN_KIWIPETE).unwrap().key();
        let pawn_push = Move::new(
            Square::E2,
            Square::E4,
            Piece::WHITE_PAWN,
            None,
            None,
            true,
            false,
            false,
        );

        search.path = vec![Some(a)];
        search.enter(Move::quiet(Square::G1, Square::F3, Piece::WHITE_KNIGHT), b);
        search.enter(Move::quiet(Square::F3, Square::G1, Piece::WHITE_KNIGHT), a);
        assert!(search.is_repetition(a));

        search.leave(Move::quiet(Square::F3, Square::G1, Piece::WHITE_KNIGHT));
        search.enter(pawn_push, a);
        assert!(!search.is_repetition(a));

        search.leave(pawn_push);
        assert_eq!(search.path, [Some(a), Some(b)]);
    }

    #[test]
    fn test_mvv_lva_prefers_big_victims_and_small_attackers() {
        let pxq = MVV_LVA[Piece::WHITE_PAWN][Piece::BLACK_QUEEN];
        let qxq = MVV_LVA[Piece::WHITE_QUEEN][Piece::BLACK_QUEEN];
        let pxr = MVV_LVA[Piece::WHITE_PAWN][Piece::BLACK_ROOK];

        assert!(pxq > qxq);
        assert!(qxq > pxr);
        assert_eq!(MVV_LVA[Piece::WHITE_PAWN][Piece::WHITE_QUEEN], 0);
        assert_eq!(MVV_LVA[Piece::BLACK_QUEEN][Piece::WHITE_KING], 0);
    }
}
