use chrono::Utc;
use contracts::shared::communication::{CommunicationEntry, CreateCommunicationRequest};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, QuerySelect, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "communication_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub phone: String,
    pub customer_doc: Option<String>,
    pub channel: String,
    pub direction: String,
    pub kind: String,
    pub message: String,
    pub campaign_id: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CommunicationEntry {
    fn from(m: Model) -> Self {
        CommunicationEntry {
            id: m.id,
            phone: m.phone,
            customer_doc: m.customer_doc,
            channel: m.channel,
            direction: m.direction,
            kind: m.kind,
            message: m.message,
            campaign_id: m.campaign_id,
            created_at: m.created_at,
        }
    }
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    request: &CreateCommunicationRequest,
    campaign_id: Option<&str>,
) -> anyhow::Result<CommunicationEntry> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        phone: Set(request.phone.clone()),
        customer_doc: Set(request.customer_doc.clone()),
        channel: Set(request.channel.clone()),
        direction: Set(request.direction.clone()),
        kind: Set(request.kind.clone()),
        message: Set(request.message.clone()),
        campaign_id: Set(campaign_id.map(str::to_string)),
        created_at: Set(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
    };
    let model = active.insert(conn).await?;
    Ok(model.into())
}

/// Добавить запись в журнал коммуникаций
pub async fn add(
    request: &CreateCommunicationRequest,
    campaign_id: Option<&str>,
) -> anyhow::Result<CommunicationEntry> {
    insert(get_connection()?, request, campaign_id).await
}

pub async fn list_by_phone<C: ConnectionTrait>(
    conn: &C,
    phone: &str,
    limit: u64,
) -> anyhow::Result<Vec<CommunicationEntry>> {
    Ok(Entity::find()
        .filter(Column::Phone.eq(phone))
        .order_by_desc(Column::Id)
        .limit(limit)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// История коммуникаций по телефону, новые сверху
pub async fn history(phone: &str, limit: u64) -> anyhow::Result<Vec<CommunicationEntry>> {
    list_by_phone(get_connection()?, phone, limit).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::memory_connection;

    fn request(phone: &str, message: &str) -> CreateCommunicationRequest {
        CreateCommunicationRequest {
            phone: phone.to_string(),
            customer_doc: None,
            channel: "whatsapp".to_string(),
            direction: "outbound".to_string(),
            kind: "campaign".to_string(),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_by_phone() {
        let conn = memory_connection().await;
        insert(&conn, &request("+5511999990001", "primeira"), Some("c1")).await.unwrap();
        insert(&conn, &request("+5511999990001", "segunda"), None).await.unwrap();
        insert(&conn, &request("+5511999990002", "outra"), None).await.unwrap();

        let entries = list_by_phone(&conn, "+5511999990001", 10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "segunda");
        assert_eq!(entries[1].campaign_id.as_deref(), Some("c1"));
    }
}
