//! Entity reads and writes. Upserts leave embedding columns untouched so a
//! changed text shows up as stale instead of silently losing its vector.

use rusqlite::{params, Connection, OptionalExtension, Row};

use sift_core::errors::SiftResult;
use sift_core::models::{Corpus, DisplayFields, Entity};

use crate::to_storage_err;

/// Columns read by [`parse_entity_row`], in order.
pub(crate) const ENTITY_COLUMNS: &str = "id, name, description, category, tags";

pub fn upsert_entity(conn: &Connection, entity: &Entity) -> SiftResult<()> {
    let tags = serde_json::to_string(&entity.fields.tags)?;
    conn.execute(
        &format!(
            "INSERT INTO {t} (id, name, description, category, tags)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                category = excluded.category,
                tags = excluded.tags,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            t = entity.corpus.as_str()
        ),
        params![
            entity.id,
            entity.fields.name,
            entity.fields.description,
            entity.fields.category,
            tags
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_entity(conn: &Connection, corpus: Corpus, id: &str) -> SiftResult<Option<Entity>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {ENTITY_COLUMNS} FROM {t} WHERE id = ?1",
                t = corpus.as_str()
            ),
            params![id],
            |row| Ok(parse_entity_row(row, corpus, 0)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    row.transpose()
}

pub fn remove_entity(conn: &Connection, corpus: Corpus, id: &str) -> SiftResult<bool> {
    let removed = conn
        .execute(
            &format!("DELETE FROM {t} WHERE id = ?1", t = corpus.as_str()),
            params![id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(removed > 0)
}

pub fn count_entities(conn: &Connection, corpus: Corpus) -> SiftResult<usize> {
    let count: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM {t}", t = corpus.as_str()),
            [],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

/// Parse the five [`ENTITY_COLUMNS`] starting at column `offset`.
pub(crate) fn parse_entity_row(row: &Row<'_>, corpus: Corpus, offset: usize) -> SiftResult<Entity> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());
    let id: String = row.get(offset).map_err(get_err)?;
    let name: String = row.get(offset + 1).map_err(get_err)?;
    let description: String = row.get(offset + 2).map_err(get_err)?;
    let category: Option<String> = row.get(offset + 3).map_err(get_err)?;
    let tags_json: String = row.get(offset + 4).map_err(get_err)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)?;
    Ok(Entity {
        id,
        corpus,
        fields: DisplayFields {
            name,
            description,
            category,
            tags,
        },
    })
}
