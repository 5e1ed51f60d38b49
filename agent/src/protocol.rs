//! Line protocol spoken with the game server.
//!
//! Messages arrive newline-framed and `;`-separated:
//!
//! ```text
//! START;<size>;<R|B>                  game begins, we play the given colour
//! CHANGE;<row,col|SWAP>;<board>;<R|B|END>
//!                                     a move was played, next colour to move
//! END                                 the server is done with us
//! ```
//!
//! We answer with `row,col\n` or `SWAP\n` whenever it is our turn.
//!
//! The server keeps the board fixed and exchanges the players' colours on a
//! swap. The engine keeps our colour fixed and rotates the board instead, so
//! once a swap has happened every coordinate is transposed at this boundary.

use anyhow::{anyhow, Context, Result};
use hex_core::{Board, Move, Side};
use mcts::{CandidateGenerator, FusionConfig, MctsConfig, PositionScorer};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, trace, warn};

use crate::decision::Decider;

#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    #[error("Malformed message {line:?}: {reason}")]
    Malformed { line: String, reason: String },

    #[error("Unknown message kind {0:?}")]
    Unknown(String),
}

/// A parsed server message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Start { size: usize, colour: Side },
    Change {
        mv: Move,
        board: String,
        /// Colour to move next, `None` when the game has ended
        next: Option<Side>,
    },
    End,
}

/// Parse one line from the server.
pub fn parse_message(line: &str) -> Result<Message, ProtocolError> {
    let line = line.trim();
    let malformed = |reason: &str| ProtocolError::Malformed {
        line: line.to_string(),
        reason: reason.to_string(),
    };
    let fields: Vec<&str> = line.split(';').collect();

    match fields.as_slice() {
        ["START", size, colour] => {
            let size = size
                .parse::<usize>()
                .ok()
                .filter(|s| (1..=hex_core::MAX_SIZE).contains(s))
                .ok_or_else(|| malformed("board size"))?;
            let colour = parse_colour(colour).ok_or_else(|| malformed("colour"))?;
            Ok(Message::Start { size, colour })
        }
        ["CHANGE", mv, board, next] => {
            let mv = parse_move(mv).ok_or_else(|| malformed("move"))?;
            let next = match *next {
                "END" => None,
                other => Some(parse_colour(other).ok_or_else(|| malformed("next colour"))?),
            };
            Ok(Message::Change {
                mv,
                board: board.to_string(),
                next,
            })
        }
        ["END", ..] => Ok(Message::End),
        ["START", ..] | ["CHANGE", ..] => Err(malformed("wrong number of fields")),
        [kind, ..] => Err(ProtocolError::Unknown(kind.to_string())),
        [] => Err(ProtocolError::Unknown(String::new())),
    }
}

fn parse_colour(s: &str) -> Option<Side> {
    match s {
        "R" => Some(Side::Red),
        "B" => Some(Side::Blue),
        _ => None,
    }
}

fn parse_move(s: &str) -> Option<Move> {
    if s == "SWAP" {
        return Some(Move::Swap);
    }
    let (row, col) = s.split_once(',')?;
    Some(Move::place(row.trim().parse().ok()?, col.trim().parse().ok()?))
}

/// Board sent by the server: rows separated by commas, `R`, `B` or `0`.
pub fn parse_board(s: &str) -> Option<Board> {
    let rows: Vec<&str> = s.split(',').collect();
    Board::from_rows(&rows).ok()
}

/// Wire form of a move, newline included.
pub fn format_move(mv: Move) -> String {
    format!("{mv}\n")
}

/// What the connection loop should do after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Wait,
    Think,
    Finish,
}

/// Everything needed to start a decider once the server names the game.
#[derive(Debug, Clone)]
pub struct Settings<G, S> {
    pub generator: G,
    pub scorer: S,
    pub mcts: MctsConfig,
    pub fusion: FusionConfig,
    pub opening_book: bool,
}

/// Protocol state for one connection.
pub struct Session<G: CandidateGenerator, S> {
    settings: Settings<G, S>,
    rng: ChaCha20Rng,
    decider: Option<Decider<G, S>>,
    /// Whether a swap has exchanged the server colours
    swapped: bool,
    /// We sent SWAP and its echo has not arrived yet
    sent_swap: bool,
}

impl<G, S> Session<G, S>
where
    G: CandidateGenerator + Clone,
    S: PositionScorer + Clone,
{
    pub fn new(settings: Settings<G, S>, rng: ChaCha20Rng) -> Self {
        Self {
            settings,
            rng,
            decider: None,
            swapped: false,
            sent_swap: false,
        }
    }

    #[allow(dead_code)]
    pub fn decider(&self) -> Option<&Decider<G, S>> {
        self.decider.as_ref()
    }

    #[allow(dead_code)]
    pub fn is_swapped(&self) -> bool {
        self.swapped
    }

    /// Our colour as the server currently sees it.
    fn server_colour(&self, side: Side) -> Side {
        if self.swapped {
            side.opponent()
        } else {
            side
        }
    }

    /// Map a coordinate between the server and engine frames. The mapping
    /// is its own inverse.
    fn translate(&self, mv: Move) -> Move {
        if self.swapped {
            mv.transposed()
        } else {
            mv
        }
    }

    /// Update the game with one server message.
    pub fn handle(&mut self, message: Message) -> Result<Step> {
        match message {
            Message::Start { size, colour } => {
                let settings = &self.settings;
                let mut decider = Decider::new(
                    size,
                    colour,
                    settings.generator.clone(),
                    settings.scorer.clone(),
                    settings.mcts.clone(),
                    settings.fusion.clone(),
                    ChaCha20Rng::seed_from_u64(self.rng.gen()),
                );
                if !settings.opening_book {
                    decider = decider.without_opening();
                }
                self.decider = Some(decider);
                self.swapped = false;
                self.sent_swap = false;
                info!(size, colour = %colour, "Game started");

                Ok(if colour == Side::Red {
                    Step::Think
                } else {
                    Step::Wait
                })
            }
            Message::End => Ok(Step::Finish),
            Message::Change { mv, board, next } => self.handle_change(mv, &board, next),
        }
    }

    fn handle_change(&mut self, mv: Move, board: &str, next: Option<Side>) -> Result<Step> {
        let Some(next) = next else {
            if let Some(decider) = &self.decider {
                info!(winner = ?decider.board().winner(), "Game ended");
            }
            return Ok(Step::Finish);
        };

        let side = self
            .decider
            .as_ref()
            .map(|d| d.side())
            .ok_or_else(|| anyhow!("CHANGE received before START"))?;
        let opponents_move = next == self.server_colour(side);
        let engine_move = self.translate(mv);
        let sent_swap = self.sent_swap;

        if mv.is_swap() {
            if !sent_swap {
                if let Some(decider) = self.decider.as_mut() {
                    decider
                        .commit(Move::Swap)
                        .context("applying opponent swap")?;
                }
            }
            self.sent_swap = false;
            self.swapped = !self.swapped;
            info!(ours = sent_swap, "Colours swapped");
        } else if opponents_move {
            if let Some(decider) = self.decider.as_mut() {
                decider
                    .commit(engine_move)
                    .with_context(|| format!("applying opponent move {mv}"))?;
            }
            debug!(server = %mv, engine = %engine_move, "Opponent moved");
        } else {
            trace!(mv = %mv, "Echo of our move");
        }

        self.check_board(board);

        Ok(if next == self.server_colour(side) {
            Step::Think
        } else {
            Step::Wait
        })
    }

    /// Compare the server's board with ours; disagreement is only logged.
    fn check_board(&self, board: &str) {
        let Some(decider) = &self.decider else {
            return;
        };
        let Some(server) = parse_board(board) else {
            debug!("Server board not parsed, skipping check");
            return;
        };
        let expected = if self.swapped {
            server.rotated()
        } else {
            server
        };
        if &expected != decider.board() {
            warn!(
                "Board out of sync with server\nours:\n{}server (engine frame):\n{}",
                decider.board(),
                expected
            );
        }
    }

    /// Decide our move, play it locally and return the wire reply.
    pub fn think(&mut self) -> Result<String> {
        let decider = self
            .decider
            .as_mut()
            .ok_or_else(|| anyhow!("asked to move before START"))?;
        let mv = decider.play()?;
        if mv.is_swap() {
            self.sent_swap = true;
        }
        Ok(format_move(self.translate(mv)))
    }
}

/// Drive one game over an established connection.
pub async fn run<R, W, G, S>(reader: R, mut writer: W, mut session: Session<G, S>) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    G: CandidateGenerator + Clone + Send + 'static,
    S: PositionScorer + Clone + Send + 'static,
{
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let message = match parse_message(&line) {
            Ok(message) => message,
            Err(ProtocolError::Unknown(kind)) => {
                warn!(%kind, "Skipping unknown message");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        trace!(?message, "Received");

        match session.handle(message)? {
            Step::Wait => {}
            Step::Finish => {
                info!("Server ended the game");
                return Ok(());
            }
            Step::Think => {
                // The search blocks for its whole budget
                let (returned, reply) = tokio::task::spawn_blocking(move || {
                    let reply = session.think();
                    (session, reply)
                })
                .await
                .context("search task panicked")?;
                session = returned;

                let reply = reply?;
                debug!(reply = reply.trim_end(), "Sending move");
                writer.write_all(reply.as_bytes()).await?;
                writer.flush().await?;
            }
        }
    }

    info!("Connection closed by server");
    Ok(())
}
