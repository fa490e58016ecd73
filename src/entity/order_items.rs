use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    pub product_snapshot_id: i64,
    pub store_id: i64,
    pub quantity: i32,
    pub line_total: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Orders,
    #[sea_orm(
        belongs_to = "super::product_snapshots::Entity",
        from = "Column::ProductSnapshotId",
        to = "super::product_snapshots::Column::Id"
    )]
    ProductSnapshots,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::product_snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
