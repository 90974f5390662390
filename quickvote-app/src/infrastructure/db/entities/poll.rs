use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "polls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub options: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub votes: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub voters: Json,
    pub category: String,
    #[sea_orm(indexed)]
    pub user_id: String,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_poll::Entity")]
    UserPolls,
}

impl Related<super::user_poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserPolls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
