use chrono::{NaiveDateTime, Utc};
use contracts::shared::communication::ContactTracking;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};
use std::collections::HashSet;

use crate::shared::data::db::get_connection;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contact_tracking")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub phone: String,
    pub customer_doc: Option<String>,
    pub campaign_id: Option<String>,
    pub status: String,
    pub last_contacted_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ContactTracking {
    fn from(m: Model) -> Self {
        ContactTracking {
            phone: m.phone,
            customer_doc: m.customer_doc,
            campaign_id: m.campaign_id,
            status: m.status,
            last_contacted_at: m.last_contacted_at,
        }
    }
}

pub async fn record_at<C: ConnectionTrait>(
    conn: &C,
    phone: &str,
    customer_doc: Option<&str>,
    campaign_id: Option<&str>,
    status: &str,
    at: NaiveDateTime,
) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        phone: Set(phone.to_string()),
        customer_doc: Set(customer_doc.map(str::to_string)),
        campaign_id: Set(campaign_id.map(str::to_string)),
        status: Set(status.to_string()),
        last_contacted_at: Set(at.format(TS_FORMAT).to_string()),
    };
    active.insert(conn).await?;
    Ok(())
}

/// Зафиксировать контакт с клиентом (время = сейчас, UTC)
pub async fn record(
    phone: &str,
    customer_doc: Option<&str>,
    campaign_id: Option<&str>,
    status: &str,
) -> anyhow::Result<()> {
    record_at(
        get_connection()?,
        phone,
        customer_doc,
        campaign_id,
        status,
        Utc::now().naive_utc(),
    )
    .await
}

/// Телефоны с успешным контактом начиная с `since`
pub async fn contacted_since<C: ConnectionTrait>(
    conn: &C,
    since: NaiveDateTime,
) -> anyhow::Result<HashSet<String>> {
    let rows = Entity::find()
        .filter(Column::Status.eq("sent"))
        .filter(Column::LastContactedAt.gte(since.format(TS_FORMAT).to_string()))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|m| m.phone).collect())
}

pub async fn recently_contacted(cooldown_days: i64) -> anyhow::Result<HashSet<String>> {
    let since = Utc::now().naive_utc() - chrono::Duration::days(cooldown_days.max(0));
    contacted_since(get_connection()?, since).await
}

pub async fn history<C: ConnectionTrait>(conn: &C, phone: &str) -> anyhow::Result<Vec<ContactTracking>> {
    Ok(Entity::find()
        .filter(Column::Phone.eq(phone))
        .order_by_desc(Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

pub async fn history_for_phone(phone: &str) -> anyhow::Result<Vec<ContactTracking>> {
    history(get_connection()?, phone).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_contacted_since_only_counts_recent_sent() {
        let conn = memory_connection().await;
        record_at(&conn, "+5511999990001", None, Some("c1"), "sent", at(1)).await.unwrap();
        record_at(&conn, "+5511999990002", None, Some("c1"), "sent", at(9)).await.unwrap();
        record_at(&conn, "+5511999990003", None, Some("c1"), "failed", at(9)).await.unwrap();

        let recent = contacted_since(&conn, at(5)).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent.contains("+5511999990002"));

        let history = history(&conn, "+5511999990001").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].campaign_id.as_deref(), Some("c1"));
    }
}
