use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (document collection)");
        conn.execute_batch(
            "
            CREATE TABLE documents (
                seq         INTEGER PRIMARY KEY AUTOINCREMENT,
                id          TEXT NOT NULL UNIQUE,
                type        TEXT NOT NULL,
                body        TEXT NOT NULL,
                version     INTEGER NOT NULL DEFAULT 1
            );

            CREATE INDEX idx_documents_type_seq
                ON documents(type, seq);

            -- Credential lookups filter on the email inside the JSON body
            CREATE INDEX idx_documents_user_email
                ON documents(type, json_extract(body, '$.email'));

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
