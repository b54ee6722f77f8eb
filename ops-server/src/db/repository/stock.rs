//! Stock Repository (stock-in records + movement ledger)
//!
//! Every quantity change goes through [`apply_movement`], which writes the
//! new balance and its history row on the same connection. Callers own the
//! transaction.

use super::{DEFAULT_LIST_LIMIT, RepoError, RepoResult, like_pattern};
use crate::utils::quantity;
use shared::ErrorCode;
use shared::models::{
    HistoryQuery, StockHistory, StockIn, StockInCreate, StockInUpdate, StockMovement, StockQuery,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, product_name, sku, category, unit, quantity, unit_price, reorder_level, \
                       store, supplier, notes, created_at, updated_at";

const HISTORY_COLUMNS: &str =
    "id, stock_in_id, movement, quantity, balance_after, reference, note, created_by, created_at";

pub(crate) fn not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::StockNotFound, format!("Stock item {id} not found"))
}

fn sku_taken(err: RepoError) -> RepoError {
    err.duplicate_as(ErrorCode::StockSkuExists, "SKU already exists")
}

/// Who/why of a movement
#[derive(Debug, Clone, Default)]
pub struct MovementMeta<'a> {
    pub reference: Option<&'a str>,
    pub note: Option<&'a str>,
    pub created_by: Option<i64>,
}

pub async fn find_all(pool: &SqlitePool, query: &StockQuery) -> RepoResult<Vec<StockIn>> {
    let search = query.search.as_deref().map(like_pattern);
    let items = sqlx::query_as::<_, StockIn>(&format!(
        "SELECT {COLUMNS} FROM stock_in \
         WHERE (?1 IS NULL OR store = ?1) \
           AND (?2 IS NULL OR product_name LIKE ?2 OR sku LIKE ?2 OR category LIKE ?2) \
           AND (?3 = 0 OR quantity <= reorder_level) \
         ORDER BY store, product_name"
    ))
    .bind(query.store.as_deref())
    .bind(search)
    .bind(query.low_stock)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<StockIn>> {
    let mut conn = pool.acquire().await?;
    find_by_id_in(&mut conn, id).await
}

pub async fn find_by_id_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<StockIn>> {
    let item = sqlx::query_as::<_, StockIn>(&format!("SELECT {COLUMNS} FROM stock_in WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(item)
}

/// Set the balance to `balance_after` and append the ledger row
async fn apply_movement(
    conn: &mut SqliteConnection,
    stock_in_id: i64,
    movement: StockMovement,
    delta: f64,
    balance_after: f64,
    meta: &MovementMeta<'_>,
) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query("UPDATE stock_in SET quantity = ?, updated_at = ? WHERE id = ?")
        .bind(balance_after)
        .bind(now)
        .bind(stock_in_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT INTO stock_history (id, stock_in_id, movement, quantity, balance_after, reference, note, created_by, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(snowflake_id())
    .bind(stock_in_id)
    .bind(movement)
    .bind(delta)
    .bind(balance_after)
    .bind(meta.reference)
    .bind(meta.note)
    .bind(meta.created_by)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Take `amount` out of stock (`OUT` row, negative quantity)
///
/// Fails with `StockInsufficient` when the balance would go negative.
pub async fn draw(
    conn: &mut SqliteConnection,
    stock_in_id: i64,
    amount: f64,
    meta: &MovementMeta<'_>,
) -> RepoResult<StockIn> {
    let item = find_by_id_in(conn, stock_in_id)
        .await?
        .ok_or_else(|| not_found(stock_in_id))?;
    if !quantity::gte(item.quantity, amount) {
        return Err(RepoError::rule(
            ErrorCode::StockInsufficient,
            format!(
                "Insufficient stock for {}: {} {} on hand, {} requested",
                item.product_name, item.quantity, item.unit, amount
            ),
        ));
    }
    let balance = quantity::sub(item.quantity, amount);
    apply_movement(
        conn,
        stock_in_id,
        StockMovement::Out,
        -quantity::to_f64(quantity::to_decimal(amount)),
        balance,
        meta,
    )
    .await?;
    find_by_id_in(conn, stock_in_id)
        .await?
        .ok_or_else(|| not_found(stock_in_id))
}

/// Add `amount` to stock (`IN` row)
pub async fn put(
    conn: &mut SqliteConnection,
    stock_in_id: i64,
    amount: f64,
    meta: &MovementMeta<'_>,
) -> RepoResult<StockIn> {
    let item = find_by_id_in(conn, stock_in_id)
        .await?
        .ok_or_else(|| not_found(stock_in_id))?;
    let balance = quantity::add(item.quantity, amount);
    apply_movement(conn, stock_in_id, StockMovement::In, amount, balance, meta).await?;
    find_by_id_in(conn, stock_in_id)
        .await?
        .ok_or_else(|| not_found(stock_in_id))
}

pub async fn create(
    pool: &SqlitePool,
    data: StockInCreate,
    created_by: Option<i64>,
) -> RepoResult<StockIn> {
    let id = snowflake_id();
    let now = now_millis();
    let opening = quantity::to_f64(quantity::to_decimal(data.quantity));

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO stock_in (id, product_name, sku, category, unit, quantity, unit_price, reorder_level, \
         store, supplier, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
    )
    .bind(id)
    .bind(data.product_name.trim())
    .bind(data.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()))
    .bind(data.category)
    .bind(data.unit.unwrap_or_else(|| "pcs".to_string()))
    .bind(data.unit_price)
    .bind(data.reorder_level.unwrap_or(0.0))
    .bind(data.store.trim())
    .bind(data.supplier)
    .bind(data.notes)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| sku_taken(e.into()))?;

    if quantity::is_positive(opening) {
        let meta = MovementMeta {
            reference: None,
            note: Some("Opening balance"),
            created_by,
        };
        apply_movement(&mut tx, id, StockMovement::In, opening, opening, &meta).await?;
    }

    let item = find_by_id_in(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;
    Ok(item)
}

/// Edit descriptive fields; a changed quantity is booked as an `ADJUSTMENT`
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: StockInUpdate,
    created_by: Option<i64>,
) -> RepoResult<StockIn> {
    let mut tx = pool.begin().await?;
    let current = find_by_id_in(&mut tx, id).await?.ok_or_else(|| not_found(id))?;

    sqlx::query(
        "UPDATE stock_in SET product_name = COALESCE(?1, product_name), sku = COALESCE(?2, sku), \
         category = COALESCE(?3, category), unit = COALESCE(?4, unit), unit_price = COALESCE(?5, unit_price), \
         reorder_level = COALESCE(?6, reorder_level), store = COALESCE(?7, store), \
         supplier = COALESCE(?8, supplier), notes = COALESCE(?9, notes), updated_at = ?10 WHERE id = ?11",
    )
    .bind(data.product_name.as_deref().map(str::trim))
    .bind(data.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()))
    .bind(data.category)
    .bind(data.unit)
    .bind(data.unit_price)
    .bind(data.reorder_level)
    .bind(data.store.as_deref().map(str::trim))
    .bind(data.supplier)
    .bind(data.notes)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| sku_taken(e.into()))?;

    if let Some(new_quantity) = data.quantity {
        let delta = quantity::sub(new_quantity, current.quantity);
        if delta != 0.0 {
            let meta = MovementMeta {
                reference: None,
                note: Some("Manual adjustment"),
                created_by,
            };
            let balance = quantity::to_f64(quantity::to_decimal(new_quantity));
            apply_movement(&mut tx, id, StockMovement::Adjustment, delta, balance, &meta).await?;
        }
    }

    let item = find_by_id_in(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;
    Ok(item)
}

pub async fn restock(
    pool: &SqlitePool,
    id: i64,
    amount: f64,
    note: Option<&str>,
    created_by: Option<i64>,
) -> RepoResult<StockIn> {
    let mut tx = pool.begin().await?;
    let meta = MovementMeta {
        reference: None,
        note,
        created_by,
    };
    let item = put(&mut tx, id, amount, &meta).await?;
    tx.commit().await?;
    Ok(item)
}

pub async fn history(pool: &SqlitePool, query: &HistoryQuery) -> RepoResult<Vec<StockHistory>> {
    let limit = query
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(DEFAULT_LIST_LIMIT);
    let rows = sqlx::query_as::<_, StockHistory>(&format!(
        "SELECT {HISTORY_COLUMNS} FROM stock_history \
         WHERE (?1 IS NULL OR stock_in_id = ?1) \
         ORDER BY created_at DESC, rowid DESC LIMIT ?2"
    ))
    .bind(query.stock_in_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Delete, refused while a non-terminal request still references the item
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let open = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM request_item ri JOIN request r ON r.id = ri.request_id \
         WHERE ri.stock_in_id = ? AND r.status NOT IN ('CLOSED', 'REJECTED')",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if open > 0 {
        return Err(RepoError::rule(
            ErrorCode::StockInUse,
            format!("Stock item {id} is used by {open} open request line(s)"),
        ));
    }
    let rows = sqlx::query("DELETE FROM stock_in WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn cement(quantity: f64) -> StockInCreate {
        StockInCreate {
            product_name: "Cement".into(),
            sku: Some("CEM-50".into()),
            category: None,
            unit: Some("bag".into()),
            quantity,
            unit_price: None,
            reorder_level: Some(5.0),
            store: "Main store".into(),
            supplier: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_writes_opening_history() {
        let db = DbService::in_memory().await.unwrap();
        let item = create(&db.pool, cement(20.0), None).await.unwrap();
        assert_eq!(item.quantity, 20.0);

        let rows = history(
            &db.pool,
            &HistoryQuery {
                stock_in_id: Some(item.id),
                limit: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].movement, StockMovement::In);
        assert_eq!(rows[0].balance_after, 20.0);
    }

    #[tokio::test]
    async fn test_draw_refuses_negative_balance() {
        let db = DbService::in_memory().await.unwrap();
        let item = create(&db.pool, cement(2.5), None).await.unwrap();

        let mut conn = db.pool.acquire().await.unwrap();
        let after = draw(&mut conn, item.id, 1.2, &MovementMeta::default())
            .await
            .unwrap();
        assert_eq!(after.quantity, 1.3);

        let err = draw(&mut conn, item.id, 1.31, &MovementMeta::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Rule(ErrorCode::StockInsufficient, _)));
    }

    #[tokio::test]
    async fn test_update_quantity_books_adjustment() {
        let db = DbService::in_memory().await.unwrap();
        let item = create(&db.pool, cement(10.0), None).await.unwrap();
        let updated = update(
            &db.pool,
            item.id,
            StockInUpdate {
                quantity: Some(7.5),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
        assert_eq!(updated.quantity, 7.5);

        let rows = history(&db.pool, &HistoryQuery::default()).await.unwrap();
        let adjustment = rows
            .iter()
            .find(|r| r.movement == StockMovement::Adjustment)
            .unwrap();
        assert_eq!(adjustment.quantity, -2.5);
    }

    #[tokio::test]
    async fn test_duplicate_sku() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, cement(1.0), None).await.unwrap();
        let err = create(&db.pool, cement(1.0), None).await.unwrap_err();
        assert!(matches!(err, RepoError::Rule(ErrorCode::StockSkuExists, _)));
    }

    #[tokio::test]
    async fn test_low_stock_filter() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, cement(3.0), None).await.unwrap();
        let mut plenty = cement(50.0);
        plenty.sku = None;
        plenty.product_name = "Sand".into();
        create(&db.pool, plenty, None).await.unwrap();

        let low = find_all(
            &db.pool,
            &StockQuery {
                low_stock: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].product_name, "Cement");
    }
}
