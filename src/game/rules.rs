use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, EnPassantMode};
use tracing::debug;

use crate::error::{Error, Result};

/// What the rules engine hands back for an accepted move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    /// Standard algebraic notation, with check/mate suffix
    pub san: String,
    /// Position after the move
    pub fen: String,
}

/// Independent legality check for detected moves
pub trait RulesEngine {
    /// Plays a UCI move string, or refuses it without changing the position
    fn submit(&mut self, uci: &str) -> Result<Accepted>;

    /// Current position as FEN
    fn fen(&self) -> String;
}

/// Rules engine backed by shakmaty, starting from the standard position
#[derive(Debug, Clone, Default)]
pub struct ShakmatyRules {
    position: Chess,
}

impl ShakmatyRules {
    pub fn new() -> Self {
        ShakmatyRules {
            position: Chess::default(),
        }
    }
}

impl RulesEngine for ShakmatyRules {
    fn submit(&mut self, uci: &str) -> Result<Accepted> {
        let uci_move: UciMove = uci
            .parse()
            .map_err(|_| Error::InvalidUci(uci.to_string()))?;
        let m = uci_move
            .to_move(&self.position)
            .map_err(|e| Error::IllegalMove {
                uci: uci.to_string(),
                reason: e.to_string(),
            })?;

        let san = SanPlus::from_move_and_play_unchecked(&mut self.position, &m);
        let fen = self.fen();
        debug!("Engine accepted {} ({}): {}", uci, san, fen);

        Ok(Accepted {
            san: san.to_string(),
            fen,
        })
    }

    fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_starting_fen() {
        assert_eq!(ShakmatyRules::new().fen(), START_FEN);
    }

    #[test]
    fn test_submit_legal_move() {
        let mut rules = ShakmatyRules::new();
        let accepted = rules.submit("e2e4").unwrap();
        assert_eq!(accepted.san, "e4");
        assert_eq!(
            accepted.fen,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_submit_illegal_move_keeps_position() {
        let mut rules = ShakmatyRules::new();
        assert!(matches!(rules.submit("e2e5"), Err(Error::IllegalMove { .. })));
        assert!(matches!(rules.submit("zz"), Err(Error::InvalidUci(_))));
        assert_eq!(rules.fen(), START_FEN);
    }

    #[test]
    fn test_castling_uci() {
        let mut rules = ShakmatyRules::new();
        for uci in ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"] {
            rules.submit(uci).unwrap();
        }
        let accepted = rules.submit("e1g1").unwrap();
        assert_eq!(accepted.san, "O-O");
    }
}
