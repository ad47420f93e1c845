use crate::error::FingerprintError;
use crate::region::Region;

/// A source file after tokenization: normalized tokens plus the source span of
/// each token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedFile {
    path: String,
    content: String,
    tokens: Vec<String>,
    regions: Vec<Region>,
}

impl TokenizedFile {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        tokens: Vec<String>,
        regions: Vec<Region>,
    ) -> Result<Self, FingerprintError> {
        if tokens.len() != regions.len() {
            return Err(FingerprintError::MismatchedRegions {
                tokens: tokens.len(),
                regions: regions.len(),
            });
        }
        Ok(Self {
            path: path.into(),
            content: content.into(),
            tokens,
            regions,
        })
    }

    /// Builds a file from bare tokens. Token `i` is placed at row 0, columns
    /// `i..i + 1`, and the content is the tokens joined by spaces.
    pub fn from_tokens<S: Into<String>>(
        path: impl Into<String>,
        tokens: impl IntoIterator<Item = S>,
    ) -> Self {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let regions = (0..tokens.len())
            .map(|i| {
                let col = i as u32;
                Region::single_row(0, col, col.saturating_add(1))
            })
            .collect();
        Self {
            path: path.into(),
            content: tokens.join(" "),
            tokens,
            regions,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Region covering tokens `start..=stop`.
    pub fn span_region(&self, start: usize, stop: usize) -> Option<Region> {
        let first = self.regions.get(start)?;
        let last = self.regions.get(stop)?;
        Some(first.merge(last))
    }

    /// Source lines `region.start_row()..=region.end_row()`, truncated to
    /// `max_chars` bytes on a char boundary.
    pub fn preview(&self, region: &Region, max_chars: usize) -> String {
        let mut out = String::new();
        for (row, line) in self.content.lines().enumerate() {
            let row = row as u32;
            if row < region.start_row() {
                continue;
            }
            if row > region.end_row() {
                break;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(line);
            if out.len() >= max_chars {
                let mut cut = max_chars;
                while !out.is_char_boundary(cut) {
                    cut -= 1;
                }
                out.truncate(cut);
                break;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_lengths() {
        let err = TokenizedFile::new(
            "a.txt",
            "x y",
            vec!["ID".into(), "ID".into()],
            vec![Region::new(0, 0, 0, 1).unwrap()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            FingerprintError::MismatchedRegions {
                tokens: 2,
                regions: 1
            }
        );
    }

    #[test]
    fn from_tokens_lays_tokens_on_one_row() {
        let file = TokenizedFile::from_tokens("a", ["IF", "ID", "THEN"]);
        assert_eq!(file.len(), 3);
        assert_eq!(file.content(), "IF ID THEN");
        assert_eq!(file.span_region(1, 2), Some(Region::new(0, 1, 0, 3).unwrap()));
        assert_eq!(file.span_region(2, 3), None);
    }

    #[test]
    fn preview_returns_covered_lines() {
        let file = TokenizedFile::new(
            "a.c",
            "int a;\nint b;\nint c;\n",
            vec!["ID".into()],
            vec![Region::new(1, 0, 2, 6).unwrap()],
        )
        .unwrap();
        let region = Region::new(1, 0, 2, 6).unwrap();
        assert_eq!(file.preview(&region, 120), "int b;\nint c;");
        assert_eq!(file.preview(&region, 4), "int ");
    }
}
