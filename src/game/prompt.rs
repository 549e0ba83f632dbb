use std::io::{self, BufRead, Write};

use crate::board::PieceKind;
use crate::error::{Error, Result};
use crate::vision::CropRect;

/// Questions the pipeline has to put to the person who took the photos
pub trait Prompter {
    /// Yes/no question; only an exact `y` counts as yes
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Piece an underpromoted pawn turned into
    fn promotion_piece(&mut self) -> Result<PieceKind>;

    /// Board rectangle within the photographs
    fn crop_rect(&mut self) -> Result<CropRect>;
}

/// Prompter reading answers line by line from a reader
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        ConsolePrompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsolePrompter { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            )));
        }
        Ok(line.trim().to_lowercase())
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self.ask(question)? == "y")
    }

    fn promotion_piece(&mut self) -> Result<PieceKind> {
        loop {
            let answer =
                self.ask("A pawn was underpromoted. What piece was it promoted to? Piece (n/b/r): ")?;
            let mut chars = answer.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if let Some(kind) = PieceKind::from_char(c).filter(|k| k.is_promotion_target()) {
                    return Ok(kind);
                }
            }
            writeln!(self.output, "Please answer with one of n, b, r or q.")?;
        }
    }

    fn crop_rect(&mut self) -> Result<CropRect> {
        loop {
            let answer = self.ask("Board rectangle as X_MIN,X_MAX,Y_MIN,Y_MAX: ")?;
            match answer.parse::<CropRect>() {
                Ok(crop) => return Ok(crop),
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompter(input: &str) -> ConsolePrompter<&[u8], Vec<u8>> {
        ConsolePrompter::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn test_confirm_requires_exact_y() {
        let mut p = prompter("y\nn\nyes\n Y \n");
        assert!(p.confirm("ok? ").unwrap());
        assert!(!p.confirm("ok? ").unwrap());
        assert!(!p.confirm("ok? ").unwrap());
        assert!(p.confirm("ok? ").unwrap());
        assert!(p.confirm("ok? ").is_err());
    }

    #[test]
    fn test_promotion_piece_reasks() {
        let mut p = prompter("k\nxyz\nN\n");
        assert_eq!(p.promotion_piece().unwrap(), PieceKind::Knight);
    }

    #[test]
    fn test_crop_rect_reasks() {
        let mut p = prompter("1,2\n0,100,10,90\n");
        let crop = p.crop_rect().unwrap();
        assert_eq!(crop, CropRect { x_min: 0, x_max: 100, y_min: 10, y_max: 90 });
    }
}
