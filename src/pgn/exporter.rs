use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::game::MoveRecord;

/// Values for the Seven Tag Roster
#[derive(Debug, Clone)]
pub struct GameHeaders {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
}

impl Default for GameHeaders {
    fn default() -> Self {
        GameHeaders {
            event: "?".to_string(),
            site: "?".to_string(),
            date: "????.??.??".to_string(),
            round: "?".to_string(),
            white: "?".to_string(),
            black: "?".to_string(),
        }
    }
}

/// PGN writer for a reconstructed game
pub struct PgnExporter {
    include_comments: bool,
    result: String,
}

impl PgnExporter {
    pub fn new() -> Self {
        PgnExporter {
            include_comments: false,
            result: "*".to_string(),
        }
    }

    /// Adds `[%eval ...]` comments for evaluated moves
    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    pub fn with_result(mut self, result: &str) -> Self {
        self.result = result.to_string();
        self
    }

    /// Writes the game to a file, returning the number of half-moves written
    pub fn export(&self, records: &[MoveRecord], headers: &GameHeaders, output_path: &Path) -> io::Result<usize> {
        let file = File::create(output_path)?;
        let mut writer = BufWriter::new(file);
        self.write_game(&mut writer, records, headers)?;
        writer.flush()?;
        Ok(records.len())
    }

    /// The whole game as a PGN string
    pub fn render(&self, records: &[MoveRecord], headers: &GameHeaders) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_game(&mut buffer, records, headers);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn write_game<W: Write>(&self, writer: &mut W, records: &[MoveRecord], headers: &GameHeaders) -> io::Result<()> {
        self.write_headers(writer, records, headers)?;
        self.write_moves(writer, records)?;
        writeln!(writer, "{}", self.result)?;
        Ok(())
    }

    fn write_headers<W: Write>(&self, writer: &mut W, records: &[MoveRecord], headers: &GameHeaders) -> io::Result<()> {
        writeln!(writer, "[Event \"{}\"]", headers.event)?;
        writeln!(writer, "[Site \"{}\"]", headers.site)?;
        writeln!(writer, "[Date \"{}\"]", headers.date)?;
        writeln!(writer, "[Round \"{}\"]", headers.round)?;
        writeln!(writer, "[White \"{}\"]", headers.white)?;
        writeln!(writer, "[Black \"{}\"]", headers.black)?;
        writeln!(writer, "[Result \"{}\"]", self.result)?;
        writeln!(writer, "[PlyCount \"{}\"]", records.len())?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_moves<W: Write>(&self, writer: &mut W, records: &[MoveRecord]) -> io::Result<()> {
        let mut move_number = 1;
        for (i, record) in records.iter().enumerate() {
            if i % 2 == 0 {
                write!(writer, "{}. ", move_number)?;
            }

            write!(writer, "{} ", record.san)?;

            if self.include_comments {
                if let Some(evaluation) = record.evaluation {
                    write!(writer, "{{ [%eval {}] }} ", evaluation.to_pgn_eval())?;
                    // Black's move needs its number repeated after a comment
                    if i % 2 == 0 && i + 1 < records.len() {
                        write!(writer, "{}... ", move_number)?;
                    }
                }
            }

            if i % 2 == 1 {
                move_number += 1;
                if i % 20 == 19 {
                    writeln!(writer)?; // Line break every 10 moves
                }
            }
        }

        if !records.is_empty() && records.len() % 20 != 0 {
            writeln!(writer)?;
        }
        Ok(())
    }
}

impl Default for PgnExporter {
    fn default() -> Self {
        Self::new()
    }
}
