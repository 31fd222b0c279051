use crate::syntax::SyntaxTree;
use serde::Serialize;

/// Single position in a source file (1-based line/column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Span in a source file (1-based line/column positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start: Position {
                line: start_line,
                column: start_column,
            },
            end: Position {
                line: end_line,
                column: end_column,
            },
        }
    }

    /// Zero-width span at the top of a file, used when no position is known.
    #[must_use]
    pub fn top() -> Self {
        Self::new(1, 1, 1, 1)
    }
}

/// A resolved source position: file plus span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    pub span: Span,
}

/// Remaps diagnostic locations out of generated-file coordinates.
///
/// Compilation units produced by a templating tool carry a line mapping back
/// to the original source. Diagnostics reported against such a unit should
/// point at the original file, not the generated artifact.
pub struct LocationMapper;

impl LocationMapper {
    /// Return `location` remapped to original-source coordinates when `tree`
    /// is generated and carries mapping metadata covering the span.
    ///
    /// Non-generated trees, and generated trees without a covering mapped
    /// region, yield the location unchanged. Missing mapping metadata is not
    /// an error; the generated coordinates are the fallback.
    pub fn map_if_generated(tree: &SyntaxTree, location: &Location) -> Location {
        let Some(info) = tree.generated() else {
            return location.clone();
        };

        let start_line = location.span.start.line;
        for region in &info.regions {
            if start_line < region.generated_start_line || start_line > region.generated_end_line {
                continue;
            }

            // Columns survive the template expansion unchanged; only the file
            // and line numbers shift.
            let delta = region.original_start_line as isize - region.generated_start_line as isize;
            let remap = |pos: Position| Position {
                line: pos.line.saturating_add_signed(delta),
                column: pos.column,
            };

            return Location {
                file: region.original_file.clone(),
                span: Span {
                    start: remap(location.span.start),
                    end: remap(location.span.end),
                },
            };
        }

        location.clone()
    }
}
