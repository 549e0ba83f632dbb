use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::game::{Evaluation, GameState};

/// Position and evaluation after every move, keyed by move number
#[derive(Debug, Serialize)]
pub struct PositionLog<'a> {
    pub positions: &'a BTreeMap<u32, String>,
    pub evaluations: &'a BTreeMap<u32, Evaluation>,
}

impl<'a> PositionLog<'a> {
    pub fn from_state(state: &'a GameState) -> Self {
        PositionLog {
            positions: &state.positions,
            evaluations: &state.evaluations,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
