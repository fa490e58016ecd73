use sea_orm::entity::prelude::*;

/// Frozen copy of a product as it was sold. `product_id` is a plain
/// back-reference with no foreign key, so the row survives product deletion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product_snapshots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub slug: String,
    pub reseller_price: i64,
    pub consumer_price: i64,
    pub description: String,
    pub store_id: i64,
    pub category_id: i64,
    pub photos_json: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
