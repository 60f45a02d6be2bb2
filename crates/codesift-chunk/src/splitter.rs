/// Separator ladder tried from coarsest to finest. The empty string is the
/// terminal rung: split at character boundaries.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character splitter with overlap.
///
/// Text is cut along the coarsest separator whose pieces fit within
/// `chunk_size` characters; oversized pieces recurse onto finer separators.
/// Consecutive chunks share up to `chunk_overlap` trailing characters so a
/// construct cut at a boundary still appears whole in one of its neighbors.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Overlap is clamped below `chunk_size` so every step makes progress.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Split `text` into non-empty chunks. Whitespace-only input yields
    /// nothing.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_level(text, &SEPARATORS)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect()
    }

    fn split_level(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if text.chars().count() <= self.chunk_size {
            return vec![text.to_string()];
        }
        let Some((separator, finer)) = separators.split_first() else {
            return self.hard_split(text);
        };
        if separator.is_empty() {
            return self.hard_split(text);
        }

        let pieces: Vec<&str> = text.split(separator).collect();
        if pieces.len() == 1 {
            return self.split_level(text, finer);
        }

        let mut chunks = Vec::new();
        let mut current = String::new();
        for piece in pieces {
            if piece.chars().count() > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                chunks.extend(self.split_level(piece, finer));
                continue;
            }

            let projected = current.chars().count()
                + if current.is_empty() {
                    0
                } else {
                    separator.chars().count()
                }
                + piece.chars().count();
            if projected > self.chunk_size && !current.is_empty() {
                let overlap = self.tail(&current);
                chunks.push(std::mem::take(&mut current));
                current = overlap;
            }
            if !current.is_empty() {
                current.push_str(separator);
            }
            current.push_str(piece);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    /// Character-boundary windows: the terminal rung when no separator
    /// divides the text.
    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = (self.chunk_size - self.chunk_overlap).max(1);
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }

    /// Last `chunk_overlap` characters of a finished chunk.
    fn tail(&self, chunk: &str) -> String {
        if self.chunk_overlap == 0 {
            return String::new();
        }
        let chars: Vec<char> = chunk.chars().collect();
        let start = chars.len().saturating_sub(self.chunk_overlap);
        chars[start..].iter().collect()
    }
}
