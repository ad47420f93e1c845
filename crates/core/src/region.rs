use std::fmt;

use crate::error::FingerprintError;

/// Zero-based source span `start_row:start_col .. end_row:end_col`.
///
/// Field order defines the ordering: start row, start column, end row, end
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Region {
    start_row: u32,
    start_col: u32,
    end_row: u32,
    end_col: u32,
}

impl Region {
    pub fn new(
        start_row: u32,
        start_col: u32,
        end_row: u32,
        end_col: u32,
    ) -> Result<Self, FingerprintError> {
        if !Self::is_valid(start_row, start_col, end_row, end_col) {
            return Err(FingerprintError::InvalidRegion {
                start_row,
                start_col,
                end_row,
                end_col,
            });
        }
        Ok(Self {
            start_row,
            start_col,
            end_row,
            end_col,
        })
    }

    /// Span on one row; `start_col <= end_col` is the caller's responsibility.
    pub(crate) fn single_row(row: u32, start_col: u32, end_col: u32) -> Self {
        debug_assert!(start_col <= end_col);
        Self {
            start_row: row,
            start_col,
            end_row: row,
            end_col,
        }
    }

    pub fn is_valid(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> bool {
        start_row < end_row || (start_row == end_row && start_col <= end_col)
    }

    pub fn start_row(&self) -> u32 {
        self.start_row
    }

    pub fn start_col(&self) -> u32 {
        self.start_col
    }

    pub fn end_row(&self) -> u32 {
        self.end_row
    }

    pub fn end_col(&self) -> u32 {
        self.end_col
    }

    /// True unless the earlier region ends strictly before the later one starts.
    pub fn overlaps_with(&self, other: &Region) -> bool {
        let (first, second) = if self <= other {
            (self, other)
        } else {
            (other, self)
        };
        (first.end_row, first.end_col) >= (second.start_row, second.start_col)
    }

    /// Smallest region covering both inputs.
    pub fn merge(&self, other: &Region) -> Region {
        let (start_row, start_col) =
            (self.start_row, self.start_col).min((other.start_row, other.start_col));
        let (end_row, end_col) = (self.end_row, self.end_col).max((other.end_row, other.end_col));
        Region {
            start_row,
            start_col,
            end_row,
            end_col,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_row, self.start_col, self.end_row, self.end_col
        )
    }
}
