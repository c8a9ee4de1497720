//! v001: `nodes` and `templates` entity tables with external-content FTS5
//! indexes kept in sync by triggers.

use rusqlite::Connection;

use sift_core::errors::SiftResult;
use sift_core::models::Corpus;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> SiftResult<()> {
    for corpus in Corpus::ALL {
        conn.execute_batch(&entity_table_sql(corpus.as_str()))
            .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

fn entity_table_sql(t: &str) -> String {
    format!(
        "
        CREATE TABLE IF NOT EXISTS {t} (
            id           TEXT PRIMARY KEY,
            name         TEXT NOT NULL,
            description  TEXT NOT NULL DEFAULT '',
            category     TEXT,
            tags         TEXT NOT NULL DEFAULT '[]',
            updated_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE VIRTUAL TABLE IF NOT EXISTS {t}_fts USING fts5(
            name, description, category, tags,
            content='{t}', content_rowid='rowid'
        );

        CREATE TRIGGER IF NOT EXISTS {t}_fts_insert AFTER INSERT ON {t} BEGIN
            INSERT INTO {t}_fts(rowid, name, description, category, tags)
            VALUES (new.rowid, new.name, new.description, new.category, new.tags);
        END;

        CREATE TRIGGER IF NOT EXISTS {t}_fts_delete AFTER DELETE ON {t} BEGIN
            INSERT INTO {t}_fts({t}_fts, rowid, name, description, category, tags)
            VALUES ('delete', old.rowid, old.name, old.description, old.category, old.tags);
        END;

        CREATE TRIGGER IF NOT EXISTS {t}_fts_update
        AFTER UPDATE OF name, description, category, tags ON {t} BEGIN
            INSERT INTO {t}_fts({t}_fts, rowid, name, description, category, tags)
            VALUES ('delete', old.rowid, old.name, old.description, old.category, old.tags);
            INSERT INTO {t}_fts(rowid, name, description, category, tags)
            VALUES (new.rowid, new.name, new.description, new.category, new.tags);
        END;
        "
    )
}
