use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, OrderItemId};
use domain::{
    Customer, CustomerFilter, CustomerRepository, Money, Order, OrderFilter, OrderItem,
    OrderRepository, Result,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Row};

use crate::error::{
    customer_has_orders, customer_id_invalid, customer_name_required, customer_not_found,
    id_not_positive, order_invalid, order_not_found, order_without_items, store_error,
};

const CUSTOMER_COLUMNS: &str = "id, name, email, registered_at";
const ORDER_COLUMNS: &str =
    "id, customer_id, created_at, delivery_date, status, total_amount_cents, notes";
const ITEM_COLUMNS: &str = "id, order_id, product_name, quantity, unit_price_cents";

/// Opens a connection pool.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Runs the database migrations.
pub async fn run_migrations(
    pool: &PgPool,
) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

fn row_to_customer(row: PgRow) -> std::result::Result<Customer, sqlx::Error> {
    Ok(Customer {
        id: CustomerId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        registered_at: row.try_get::<DateTime<Utc>, _>("registered_at")?,
    })
}

fn row_to_order(row: PgRow) -> std::result::Result<Order, sqlx::Error> {
    Ok(Order {
        id: OrderId::new(row.try_get("id")?),
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        created_at: row.try_get("created_at")?,
        delivery_date: row.try_get("delivery_date")?,
        status: row.try_get("status")?,
        total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
        notes: row.try_get("notes")?,
        items: Vec::new(),
    })
}

fn row_to_item(row: PgRow) -> std::result::Result<OrderItem, sqlx::Error> {
    Ok(OrderItem {
        id: OrderItemId::new(row.try_get("id")?),
        order_id: OrderId::new(row.try_get("order_id")?),
        product_name: row.try_get("product_name")?,
        quantity: row.try_get("quantity")?,
        unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
    })
}

/// PostgreSQL-backed customer repository.
#[derive(Clone)]
pub struct PostgresCustomerRepository {
    pool: PgPool,
}

impl PostgresCustomerRepository {
    /// Creates a new repository over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: CustomerFilter) -> Result<Vec<Customer>> {
        let mut sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if filter.effective_id().is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND id = ${param_count}"));
        }
        if filter.effective_name().is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND strpos(name, ${param_count}) > 0"));
        }
        if filter.effective_email().is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND strpos(email, ${param_count}) > 0"));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut query = sqlx::query(&sql);
        if let Some(id) = filter.effective_id() {
            query = query.bind(id.as_i64());
        }
        if let Some(name) = filter.effective_name() {
            query = query.bind(name);
        }
        if let Some(email) = filter.effective_email() {
            query = query.bind(email);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("loading customers"))?;
        rows.into_iter()
            .map(row_to_customer)
            .collect::<std::result::Result<_, _>>()
            .map_err(store_error("loading customers"))
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: CustomerId) -> Result<Customer> {
        if !id.is_valid() {
            return Err(id_not_positive());
        }

        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("loading customer"))?
        .ok_or_else(|| customer_not_found(id))?;

        row_to_customer(row).map_err(store_error("loading customer"))
    }

    #[tracing::instrument(skip(self, customer), fields(name = %customer.name))]
    async fn create(&self, mut customer: Customer) -> Result<Customer> {
        if !customer.has_name() {
            return Err(customer_name_required());
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO customers (name, email, registered_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.registered_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("saving customer"))?;

        customer.id = CustomerId::new(id);
        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    #[tracing::instrument(skip(self, customer), fields(customer_id = %customer.id))]
    async fn update(&self, customer: Customer) -> Result<Customer> {
        if !customer.id.is_valid() {
            return Err(customer_id_invalid());
        }
        if !customer.has_name() {
            return Err(customer_name_required());
        }

        let result = sqlx::query(
            "UPDATE customers SET name = $2, email = $3, registered_at = $4 WHERE id = $1",
        )
        .bind(customer.id.as_i64())
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.registered_at)
        .execute(&self.pool)
        .await
        .map_err(store_error("updating customer"))?;

        if result.rows_affected() == 0 {
            return Err(customer_not_found(customer.id));
        }
        Ok(customer)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: CustomerId) -> Result<Customer> {
        if !id.is_valid() {
            return Err(id_not_positive());
        }

        let deleted = sqlx::query(&format!(
            "DELETE FROM customers WHERE id = $1 RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await;

        let row = match deleted {
            Ok(Some(row)) => row,
            Ok(None) => return Err(customer_not_found(id)),
            Err(sqlx::Error::Database(ref db_err)) if db_err.is_foreign_key_violation() => {
                return Err(customer_has_orders(id));
            }
            Err(e) => return Err(store_error("deleting customer")(e)),
        };

        tracing::info!(customer_id = %id, "customer deleted");
        row_to_customer(row).map_err(store_error("deleting customer"))
    }

    async fn exists(&self, id: CustomerId) -> Result<bool> {
        customer_exists(&self.pool, id)
            .await
            .map_err(store_error("loading customer"))
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error("counting customers"))?;
        Ok(count as usize)
    }
}

async fn customer_exists<'e, E>(
    executor: E,
    id: CustomerId,
) -> std::result::Result<bool, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)")
        .bind(id.as_i64())
        .fetch_one(executor)
        .await
}

/// PostgreSQL-backed order repository.
///
/// Orders and their items are written in one transaction; items are always
/// returned ordered by id.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new repository over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Loads the items of the given orders, grouped by order.
    async fn load_items(
        &self,
        order_ids: &[i64],
    ) -> std::result::Result<HashMap<OrderId, Vec<OrderItem>>, sqlx::Error> {
        let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(grouped);
        }

        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id ASC"
        ))
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            let item = row_to_item(row)?;
            grouped.entry(item.order_id).or_default().push(item);
        }
        Ok(grouped)
    }
}

/// Inserts every item of the order, assigning keys and the owning order id.
async fn insert_items(
    conn: &mut PgConnection,
    order: &mut Order,
) -> std::result::Result<(), sqlx::Error> {
    for item in &mut order.items {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO order_items (order_id, product_name, quantity, unit_price_cents)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(order.id.as_i64())
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price.cents())
        .fetch_one(&mut *conn)
        .await?;

        item.id = OrderItemId::new(id);
        item.order_id = order.id;
    }
    Ok(())
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query; NULL delivery dates never satisfy a bound
        if filter.customer_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND customer_id = ${param_count}"));
        }
        if filter.date_from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND delivery_date >= ${param_count}"));
        }
        if filter.date_to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND delivery_date <= ${param_count}"));
        }
        if filter.effective_status().is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut query = sqlx::query(&sql);
        if let Some(customer_id) = filter.customer_id {
            query = query.bind(customer_id.as_i64());
        }
        if let Some(from) = filter.date_from {
            query = query.bind(from);
        }
        if let Some(to) = filter.date_to {
            query = query.bind(to);
        }
        if let Some(status) = filter.effective_status() {
            query = query.bind(status);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("loading orders"))?;
        let mut orders = rows
            .into_iter()
            .map(row_to_order)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(store_error("loading orders"))?;

        let ids: Vec<i64> = orders.iter().map(|o| o.id.as_i64()).collect();
        let mut items = self
            .load_items(&ids)
            .await
            .map_err(store_error("loading orders"))?;
        for order in &mut orders {
            order.items = items.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: OrderId) -> Result<Order> {
        if !id.is_valid() {
            return Err(id_not_positive());
        }

        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("loading order"))?
            .ok_or_else(|| order_not_found(id))?;

        let mut order = row_to_order(row).map_err(store_error("loading order"))?;
        order.items = self
            .load_items(&[id.as_i64()])
            .await
            .map_err(store_error("loading order"))?
            .remove(&id)
            .unwrap_or_default();
        Ok(order)
    }

    #[tracing::instrument(skip(self, order), fields(customer_id = %order.customer_id))]
    async fn create(&self, mut order: Order) -> Result<Order> {
        if order.items.is_empty() {
            return Err(order_without_items());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_error("creating order"))?;

        if !customer_exists(&mut *tx, order.customer_id)
            .await
            .map_err(store_error("creating order"))?
        {
            return Err(customer_not_found(order.customer_id));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders
                (customer_id, created_at, delivery_date, status, total_amount_cents, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(order.customer_id.as_i64())
        .bind(order.created_at)
        .bind(order.delivery_date)
        .bind(&order.status)
        .bind(order.total_amount.cents())
        .bind(&order.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_error("creating order"))?;
        order.id = OrderId::new(id);

        insert_items(&mut *tx, &mut order)
            .await
            .map_err(store_error("creating order"))?;

        tx.commit().await.map_err(store_error("creating order"))?;
        tracing::info!(order_id = %order.id, items = order.items.len(), "order created");
        Ok(order)
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    async fn update(&self, mut order: Order) -> Result<Order> {
        if !order.id.is_valid() {
            return Err(order_invalid());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_error("updating order"))?;

        if !customer_exists(&mut *tx, order.customer_id)
            .await
            .map_err(store_error("updating order"))?
        {
            return Err(customer_not_found(order.customer_id));
        }

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET customer_id = $2, created_at = $3, delivery_date = $4, status = $5,
                total_amount_cents = $6, notes = $7
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_i64())
        .bind(order.customer_id.as_i64())
        .bind(order.created_at)
        .bind(order.delivery_date)
        .bind(&order.status)
        .bind(order.total_amount.cents())
        .bind(&order.notes)
        .execute(&mut *tx)
        .await
        .map_err(store_error("updating order"))?;

        if result.rows_affected() == 0 {
            return Err(order_not_found(order.id));
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order.id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(store_error("updating order"))?;
        insert_items(&mut *tx, &mut order)
            .await
            .map_err(store_error("updating order"))?;

        tx.commit().await.map_err(store_error("updating order"))?;
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: OrderId) -> Result<Order> {
        let mut order = self.get(id).await?;

        let deleted = sqlx::query(&format!(
            "DELETE FROM orders WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("deleting order"))?
        .ok_or_else(|| order_not_found(id))?;

        // Items go with the order (ON DELETE CASCADE); return the snapshot
        // loaded above with the scalar fields as they were at deletion.
        let items = std::mem::take(&mut order.items);
        order = row_to_order(deleted).map_err(store_error("deleting order"))?;
        order.items = items;

        tracing::info!(order_id = %id, "order deleted");
        Ok(order)
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error("counting orders"))?;
        Ok(count as usize)
    }
}
