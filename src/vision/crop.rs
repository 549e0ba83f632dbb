use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Pixel rectangle holding the board, as `(x_min, x_max, y_min, y_max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.x_max.saturating_sub(self.x_min)
    }

    pub fn height(&self) -> u32 {
        self.y_max.saturating_sub(self.y_min)
    }

    /// Checks the rectangle is non-empty and lies inside a `width`x`height` image
    pub fn validate(&self, width: u32, height: u32) -> Result<()> {
        if self.width() == 0 || self.height() == 0 || self.x_max > width || self.y_max > height {
            return Err(Error::InvalidCrop {
                x_min: self.x_min,
                x_max: self.x_max,
                y_min: self.y_min,
                y_max: self.y_max,
                width,
                height,
            });
        }
        Ok(())
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x_min, self.x_max, self.y_min, self.y_max)
    }
}

impl FromStr for CropRect {
    type Err = String;

    /// Parses `X_MIN,X_MAX,Y_MIN,Y_MAX` (commas or whitespace)
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let values = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|e| format!("invalid coordinate '{}': {}", part, e))
            })
            .collect::<std::result::Result<Vec<u32>, String>>()?;

        match values.as_slice() {
            &[x_min, x_max, y_min, y_max] => {
                if x_min >= x_max || y_min >= y_max {
                    return Err(format!("empty crop rectangle '{}'", s));
                }
                Ok(CropRect { x_min, x_max, y_min, y_max })
            }
            _ => Err(format!("expected 4 values X_MIN,X_MAX,Y_MIN,Y_MAX, got {}", values.len())),
        }
    }
}
