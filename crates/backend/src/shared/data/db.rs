use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Локальные таблицы (журнал, история контактов, коммуникации)
const LOCAL_TABLES: &[(&str, &str)] = &[
    (
        "system_log",
        r#"
        CREATE TABLE system_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            source TEXT NOT NULL,
            level TEXT NOT NULL DEFAULT 'info',
            category TEXT NOT NULL,
            message TEXT NOT NULL
        );
    "#,
    ),
    (
        "contact_tracking",
        r#"
        CREATE TABLE contact_tracking (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            phone TEXT NOT NULL,
            customer_doc TEXT,
            campaign_id TEXT,
            status TEXT NOT NULL,
            last_contacted_at TEXT NOT NULL
        );
    "#,
    ),
    (
        "communication_log",
        r#"
        CREATE TABLE communication_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            phone TEXT NOT NULL,
            customer_doc TEXT,
            channel TEXT NOT NULL DEFAULT 'whatsapp',
            direction TEXT NOT NULL,
            kind TEXT NOT NULL,
            message TEXT NOT NULL,
            campaign_id TEXT,
            created_at TEXT NOT NULL
        );
    "#,
    ),
];

const LOCAL_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_contact_tracking_phone ON contact_tracking (phone);",
    "CREATE INDEX IF NOT EXISTS idx_communication_log_phone ON communication_log (phone);",
];

/// sqlite URL для файла БД; относительный путь считается от текущего каталога
fn sqlite_url(db_file: &str) -> anyhow::Result<String> {
    let path = std::path::Path::new(db_file);
    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    // Windows: C:/... -> /C:/...
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let prefix = if !normalized.starts_with('/') && normalized.contains(':') {
        "/"
    } else {
        ""
    };
    Ok(format!("sqlite://{}{}?mode=rwc", prefix, normalized))
}

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/app.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Database::connect(sqlite_url(db_file)?).await?;
    ensure_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Создать недостающие таблицы
pub async fn ensure_schema<C: ConnectionTrait>(conn: &C) -> anyhow::Result<()> {
    for (table, ddl) in LOCAL_TABLES {
        let exists = conn
            .query_all(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name = ?;",
                [(*table).into()],
            ))
            .await?;

        if exists.is_empty() {
            tracing::info!("Creating {} table", table);
            conn.execute(Statement::from_string(
                DatabaseBackend::Sqlite,
                ddl.to_string(),
            ))
            .await?;
        }
    }

    for ddl in LOCAL_INDEXES {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            ddl.to_string(),
        ))
        .await?;
    }

    Ok(())
}

pub fn get_connection() -> anyhow::Result<&'static DatabaseConnection> {
    DB_CONN
        .get()
        .ok_or_else(|| anyhow::anyhow!("Database connection has not been initialized"))
}

/// In-memory БД со схемой, для тестов репозиториев
#[cfg(test)]
pub async fn memory_connection() -> DatabaseConnection {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    ensure_schema(&conn).await.unwrap();
    conn
}
