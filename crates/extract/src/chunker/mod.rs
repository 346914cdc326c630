//! Bounded-size text chunking for assistant submission.
//!
//! Splits pages of fragments into chunks no longer than a configured
//! character budget. Fragments are never split: a fragment that would
//! push the current chunk past the budget starts a new one, and a
//! fragment longer than the budget becomes its own oversized chunk.
//! Chunks never span page boundaries.

mod types;

pub use types::{Chunk, ChunkConfig};

use crate::Page;

/// Split pages into an ordered sequence of bounded-size chunks.
pub fn chunk_pages(pages: &[Page], config: &ChunkConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    for page in pages {
        let mut acc = String::new();
        let mut acc_chars = 0usize;

        for fragment in &page.fragments {
            let fragment_chars = fragment.text.chars().count();

            if acc_chars + fragment_chars > config.max_chars {
                if !acc.is_empty() {
                    chunks.push(Chunk {
                        content: std::mem::take(&mut acc),
                        page_number: page.number,
                    });
                }
                acc.push_str(&fragment.text);
                acc_chars = fragment_chars;
            } else {
                acc.push_str(&fragment.text);
                acc_chars += fragment_chars;
            }
        }

        if !acc.is_empty() {
            chunks.push(Chunk {
                content: acc,
                page_number: page.number,
            });
        }
    }

    chunks
}
