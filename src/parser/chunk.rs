use serde::Serialize;

use super::assemble::VerseRecord;

pub const DEFAULT_MAX_BLOCK_CHARS: usize = 5000;

/// Contiguous run of records kept under a character budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub index: usize,
    pub chars: usize,
    pub records: Vec<VerseRecord>,
}

/// Greedy left-to-right packing. A record never gets split, so one longer
/// than `max_chars` becomes a block of its own.
pub fn chunk(records: &[VerseRecord], max_chars: usize) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Vec<VerseRecord> = Vec::new();
    let mut chars = 0usize;

    for record in records {
        let len = record.char_len();
        if chars + len > max_chars && !current.is_empty() {
            blocks.push(Block {
                index: blocks.len() + 1,
                chars,
                records: std::mem::take(&mut current),
            });
            chars = 0;
        }
        current.push(record.clone());
        chars += len;
    }

    if !current.is_empty() {
        blocks.push(Block {
            index: blocks.len() + 1,
            chars,
            records: current,
        });
    }

    blocks
}
