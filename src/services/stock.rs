use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    sea_query::{Expr, SimpleExpr},
};

use crate::{
    entity::products::{Column as ProdCol, Entity as Products},
    error::OrderError,
};

/// Takes `quantity` units out of a product's stock.
///
/// Runs as one conditional `UPDATE ... WHERE stock >= quantity`, so two
/// concurrent orders can never both claim the last units: the row lock taken
/// by the first update makes the second re-check the predicate after it
/// commits. Zero affected rows means the product is gone or short on stock.
pub async fn decrement<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
    quantity: i32,
) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::InvalidQuantity { product_id });
    }

    let result = Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(quantity))
        .col_expr(ProdCol::UpdatedAt, SimpleExpr::from(Expr::current_timestamp()))
        .filter(ProdCol::Id.eq(product_id))
        .filter(ProdCol::Stock.gte(quantity))
        .exec(conn)
        .await?;

    if result.rows_affected != 1 {
        tracing::info!(product_id, quantity, "stock decrement rejected");
        return Err(OrderError::InsufficientStock(product_id));
    }
    Ok(())
}
