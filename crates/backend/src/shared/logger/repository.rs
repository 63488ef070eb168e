use chrono::Utc;
use contracts::shared::logger::{LogEntry, LogLevel};
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "system_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: String,
    pub source: String,
    pub level: String,
    pub category: String,
    pub message: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LogEntry {
    fn from(m: Model) -> Self {
        LogEntry {
            id: m.id,
            timestamp: m.timestamp,
            source: m.source,
            level: LogLevel::parse(&m.level),
            category: m.category,
            message: m.message,
        }
    }
}

/// Добавить запись в журнал в фоне
pub fn log_event_internal(source: &str, level: LogLevel, category: &str, message: &str) {
    let source = source.to_string();
    let category = category.to_string();
    let message = message.to_string();

    tokio::spawn(async move {
        let result = match get_connection() {
            Ok(conn) => insert(conn, &source, level, &category, &message).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to log event: {}", e);
        }
    });
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    source: &str,
    level: LogLevel,
    category: &str,
    message: &str,
) -> anyhow::Result<()> {
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();

    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        timestamp: Set(now),
        source: Set(source.to_string()),
        level: Set(level.as_str().to_string()),
        category: Set(category.to_string()),
        message: Set(message.to_string()),
    };

    active.insert(conn).await?;
    Ok(())
}

/// Добавить запись в журнал
pub async fn log_event(
    source: &str,
    level: LogLevel,
    category: &str,
    message: &str,
) -> anyhow::Result<()> {
    insert(get_connection()?, source, level, category, message).await
}

pub async fn list<C: ConnectionTrait>(conn: &C, limit: Option<u64>) -> anyhow::Result<Vec<LogEntry>> {
    let mut query = Entity::find().order_by_desc(Column::Id);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    Ok(query.all(conn).await?.into_iter().map(Into::into).collect())
}

/// Записи журнала, новые сверху
pub async fn get_all_logs(limit: Option<u64>) -> anyhow::Result<Vec<LogEntry>> {
    list(get_connection()?, limit).await
}

pub async fn clear_all_logs() -> anyhow::Result<()> {
    Entity::delete_many().exec(get_connection()?).await?;
    Ok(())
}
