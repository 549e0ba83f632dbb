use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Grace period for `quit` before the engine is killed
const QUIT_POLLS: u32 = 50;
const QUIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Engine verdict on a position, always from White's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Evaluation {
    /// Positive favours White; 100 is roughly one pawn
    #[serde(rename = "cp")]
    Centipawns(i32),
    /// Moves until mate; positive means White mates
    #[serde(rename = "mate")]
    Mate(i32),
}

impl Evaluation {
    /// Flips the sign, for scores reported from Black's side
    pub fn negate(self) -> Evaluation {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(-cp),
            Evaluation::Mate(n) => Evaluation::Mate(-n),
        }
    }

    /// Value for a PGN `[%eval ...]` comment
    pub fn to_pgn_eval(self) -> String {
        match self {
            Evaluation::Centipawns(cp) => format!("{:.2}", cp as f64 / 100.0),
            Evaluation::Mate(n) => format!("#{}", n),
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => write!(f, "{:+.2}", *cp as f64 / 100.0),
            Evaluation::Mate(n) => write!(f, "#{}", n),
        }
    }
}

/// Scores positions given as FEN
pub trait Evaluator {
    fn evaluate(&mut self, fen: &str) -> Result<Evaluation>;
}

/// Stockfish (or any UCI engine) driven over stdin/stdout
pub struct StockfishEvaluator {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    depth: u32,
}

impl StockfishEvaluator {
    pub fn spawn(path: &str, depth: u32) -> Result<Self> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Engine(format!("cannot start '{}': {}", path, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Engine("engine stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Engine("engine stdout unavailable".to_string()))?;

        let mut engine = StockfishEvaluator {
            child,
            stdin,
            reader: BufReader::new(stdout),
            depth,
        };
        engine.send("uci")?;
        engine.wait_for("uciok")?;
        engine.send("isready")?;
        engine.wait_for("readyok")?;
        debug!("Started evaluation engine '{}' at depth {}", path, depth);
        Ok(engine)
    }

    fn send(&mut self, command: &str) -> Result<()> {
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self, waiting_for: &str) -> Result<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(Error::Engine(format!(
                "engine exited while waiting for '{}'",
                waiting_for
            )));
        }
        Ok(line)
    }

    fn wait_for(&mut self, target: &str) -> Result<()> {
        loop {
            if self.read_line(target)?.trim().starts_with(target) {
                return Ok(());
            }
        }
    }
}

impl Evaluator for StockfishEvaluator {
    fn evaluate(&mut self, fen: &str) -> Result<Evaluation> {
        self.send("isready")?;
        self.wait_for("readyok")?;
        self.send(&format!("position fen {}", fen))?;
        self.send(&format!("go depth {}", self.depth))?;

        let mut score = None;
        loop {
            let line = self.read_line("bestmove")?;
            let line = line.trim();
            if let Some(parsed) = parse_score(line) {
                score = Some(parsed);
            }
            if line.starts_with("bestmove") {
                break;
            }
        }

        let score = score.ok_or_else(|| Error::Engine(format!("no score reported for {}", fen)))?;
        Ok(if black_to_move(fen) { score.negate() } else { score })
    }
}

impl Drop for StockfishEvaluator {
    fn drop(&mut self) {
        if self.send("quit").is_err() {
            warn!("Evaluation engine already gone");
        }
        for _ in 0..QUIT_POLLS {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(QUIT_POLL_INTERVAL),
                Err(_) => break,
            }
        }
        warn!("Evaluation engine did not quit; killing it");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Score from an `info ... score cp|mate N ...` line, side-to-move relative
pub fn parse_score(line: &str) -> Option<Evaluation> {
    if !line.starts_with("info") {
        return None;
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    let idx = parts.iter().position(|&p| p == "score")?;
    let value: i32 = parts.get(idx + 2)?.parse().ok()?;
    match *parts.get(idx + 1)? {
        "cp" => Some(Evaluation::Centipawns(value)),
        "mate" => Some(Evaluation::Mate(value)),
        _ => None,
    }
}

fn black_to_move(fen: &str) -> bool {
    fen.split_whitespace().nth(1) == Some("b")
}
