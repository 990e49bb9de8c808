use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::parser::chunk::Block;

/// Fresh database at `path`; any previous export is replaced.
pub fn connect(path: &Path) -> Result<Connection> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("cannot replace {}", path.display()))?;
    }
    let conn = Connection::open(path)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS verses (
            position INTEGER PRIMARY KEY,
            book     TEXT,
            chapter  INTEGER,
            verse    INTEGER,
            text     TEXT NOT NULL,
            block    INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_verses_ref ON verses(book, chapter, verse);
        CREATE INDEX IF NOT EXISTS idx_verses_block ON verses(block);
        ",
    )?;
    Ok(())
}

pub fn save_blocks(conn: &Connection, blocks: &[Block]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut position = 0usize;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO verses (position, book, chapter, verse, text, block)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for block in blocks {
            for r in &block.records {
                position += 1;
                stmt.execute(rusqlite::params![
                    position as i64,
                    r.book,
                    r.chapter,
                    r.verse,
                    r.text,
                    block.index as i64,
                ])?;
            }
        }
    }
    tx.commit()?;
    Ok(position)
}

/// Write the blocked record sequence as a standalone SQLite file.
pub fn export(path: &Path, blocks: &[Block]) -> Result<usize> {
    let conn = connect(path)?;
    init_schema(&conn)?;
    save_blocks(&conn, blocks)
}
