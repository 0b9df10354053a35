use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "upload")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Original upload filename, shown to the owner only.
    pub filename: String,

    /// Flat name of the blob inside the upload directory.
    #[sea_orm(unique)]
    pub storage_key: String,

    pub uploaded_at: DateTimeUtc,

    pub account_id: i32,
    #[sea_orm(belongs_to, from = "account_id", to = "id")]
    pub account: HasOne<super::account::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
