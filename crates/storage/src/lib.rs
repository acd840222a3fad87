use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{migrate::MigrateError, sqlite::SqlitePoolOptions, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use food_ordering_core::catalog::{compare_names, sort_by_name};
use food_ordering_core::types::{
    Category, CategorySummary, Item, ItemType, Order, OrderLine, Restaurant,
};

const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(StorageError::Connect)?;

        apply_pragmas(&pool).await?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle for item lookups.
    pub fn items(&self) -> ItemRepository {
        ItemRepository {
            pool: self.pool.clone(),
        }
    }

    /// Returns a handle for restaurants and their menus.
    pub fn restaurants(&self) -> RestaurantRepository {
        RestaurantRepository {
            pool: self.pool.clone(),
        }
    }

    /// Returns a handle for categories.
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository {
            pool: self.pool.clone(),
        }
    }

    /// Returns a handle for historical orders.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn apply_pragmas(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query("PRAGMA foreign_keys = ON;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA journal_mode = WAL;")
        .fetch_one(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA synchronous = NORMAL;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA busy_timeout = 5000;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    Ok(())
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to apply pragma: {0}")]
    Pragma(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Raw `item` row before its categories are attached.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i64,
    uuid: String,
    item_name: String,
    price: i64,
    #[sqlx(rename = "type")]
    item_type: i64,
}

impl ItemRow {
    fn into_domain(self, category_ids: Vec<String>) -> Result<Item, ItemError> {
        let item_type = ItemType::from_db(self.item_type).ok_or_else(|| ItemError::InvalidType {
            uuid: self.uuid.clone(),
            code: self.item_type,
        })?;
        Ok(Item {
            id: self.uuid,
            name: self.item_name,
            price: self.price,
            item_type,
            category_ids,
        })
    }
}

/// Joins item rows with `(item row id, category uuid)` pairs, preserving row order.
fn attach_categories(
    rows: Vec<ItemRow>,
    pairs: Vec<(i64, String)>,
) -> Result<Vec<Item>, ItemError> {
    let mut by_item: HashMap<i64, Vec<String>> = HashMap::new();
    for (item_id, category_uuid) in pairs {
        by_item.entry(item_id).or_default().push(category_uuid);
    }

    rows.into_iter()
        .map(|row| {
            let categories = by_item.remove(&row.id).unwrap_or_default();
            row.into_domain(categories)
        })
        .collect()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(SQLITE_CONSTRAINT_UNIQUE)
        }
        _ => false,
    }
}

/// Repository resolving single items by identifier.
#[derive(Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Loads the item with the given identifier, or `None` when no row matches.
    pub async fn fetch_by_uuid(&self, uuid: &str) -> Result<Option<Item>, ItemError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, uuid, item_name, price, type FROM item WHERE uuid = ?",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let pairs = sqlx::query_as::<_, (i64, String)>(
            "SELECT ci.item_id, c.uuid \
               FROM category_item AS ci \
               JOIN category AS c ON c.id = ci.category_id \
              WHERE ci.item_id = ? \
              ORDER BY ci.id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let mut items = attach_categories(vec![row], pairs)?;
        Ok(items.pop())
    }

    /// Inserts a new item. Category and restaurant links are added separately.
    pub async fn insert(&self, item: &NewItem<'_>) -> Result<(), ItemError> {
        sqlx::query("INSERT INTO item (uuid, item_name, price, type) VALUES (?, ?, ?, ?)")
            .bind(item.uuid)
            .bind(item.name)
            .bind(item.price)
            .bind(item.item_type.as_db())
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    ItemError::Duplicate
                } else {
                    ItemError::Database(err)
                }
            })?;
        Ok(())
    }
}

/// Parameters required to insert an item.
pub struct NewItem<'a> {
    pub uuid: &'a str,
    pub name: &'a str,
    pub price: i64,
    pub item_type: ItemType,
}

/// Errors that can occur while reading or writing items.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("item with the same uuid already exists")]
    Duplicate,
    #[error("item {uuid} has unknown type code {code}")]
    InvalidType { uuid: String, code: i64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository for restaurants and their item sets.
#[derive(Clone)]
pub struct RestaurantRepository {
    pool: SqlitePool,
}

impl RestaurantRepository {
    /// Loads the restaurant together with every item it serves.
    pub async fn fetch_by_uuid(&self, uuid: &str) -> Result<Option<Restaurant>, RestaurantError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, uuid, restaurant_name FROM restaurant WHERE uuid = ?",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        let Some((row_id, uuid, name)) = row else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT i.id, i.uuid, i.item_name, i.price, i.type \
               FROM item AS i \
               JOIN restaurant_item AS ri ON ri.item_id = i.id \
              WHERE ri.restaurant_id = ? \
              ORDER BY ri.id",
        )
        .bind(row_id)
        .fetch_all(&self.pool)
        .await?;

        let pairs = sqlx::query_as::<_, (i64, String)>(
            "SELECT ci.item_id, c.uuid \
               FROM category_item AS ci \
               JOIN category AS c ON c.id = ci.category_id \
               JOIN restaurant_item AS ri ON ri.item_id = ci.item_id \
              WHERE ri.restaurant_id = ? \
              ORDER BY ci.id",
        )
        .bind(row_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Restaurant {
            id: uuid,
            name,
            items: attach_categories(rows, pairs)?,
        }))
    }

    /// Inserts a new restaurant without items.
    pub async fn insert(&self, restaurant: &NewRestaurant<'_>) -> Result<(), RestaurantError> {
        sqlx::query("INSERT INTO restaurant (uuid, restaurant_name) VALUES (?, ?)")
            .bind(restaurant.uuid)
            .bind(restaurant.name)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RestaurantError::Duplicate
                } else {
                    RestaurantError::Database(err)
                }
            })?;
        Ok(())
    }

    /// Adds an existing item to the restaurant's menu.
    pub async fn add_item(
        &self,
        restaurant_uuid: &str,
        item_uuid: &str,
    ) -> Result<(), RestaurantError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO restaurant_item (restaurant_id, item_id) \
             SELECT r.id, i.id FROM restaurant AS r, item AS i \
              WHERE r.uuid = ? AND i.uuid = ?",
        )
        .bind(restaurant_uuid)
        .bind(item_uuid)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 && !self.has_item(restaurant_uuid, item_uuid).await? {
            return Err(RestaurantError::MissingLink {
                restaurant: restaurant_uuid.to_string(),
                item: item_uuid.to_string(),
            });
        }
        Ok(())
    }

    async fn has_item(&self, restaurant_uuid: &str, item_uuid: &str) -> Result<bool, sqlx::Error> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM restaurant_item AS ri \
               JOIN restaurant AS r ON r.id = ri.restaurant_id \
               JOIN item AS i ON i.id = ri.item_id \
              WHERE r.uuid = ? AND i.uuid = ?",
        )
        .bind(restaurant_uuid)
        .bind(item_uuid)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 > 0)
    }
}

/// Parameters required to insert a restaurant.
pub struct NewRestaurant<'a> {
    pub uuid: &'a str,
    pub name: &'a str,
}

/// Errors that can occur while reading or writing restaurants.
#[derive(Debug, Error)]
pub enum RestaurantError {
    #[error("restaurant with the same uuid already exists")]
    Duplicate,
    #[error("restaurant {restaurant} or item {item} does not exist")]
    MissingLink { restaurant: String, item: String },
    #[error("failed to decode item: {0}")]
    Item(#[from] ItemError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository for categories and the items grouped under them.
#[derive(Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Loads a category with its items ordered by name.
    pub async fn fetch_by_uuid(&self, uuid: &str) -> Result<Option<Category>, CategoryError> {
        let row = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, uuid, category_name FROM category WHERE uuid = ?",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        let Some((row_id, uuid, name)) = row else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT i.id, i.uuid, i.item_name, i.price, i.type \
               FROM item AS i \
               JOIN category_item AS ci ON ci.item_id = i.id \
              WHERE ci.category_id = ?",
        )
        .bind(row_id)
        .fetch_all(&self.pool)
        .await?;

        let pairs = sqlx::query_as::<_, (i64, String)>(
            "SELECT ci.item_id, c.uuid \
               FROM category_item AS ci \
               JOIN category AS c ON c.id = ci.category_id \
              WHERE ci.item_id IN (SELECT item_id FROM category_item WHERE category_id = ?) \
              ORDER BY ci.id",
        )
        .bind(row_id)
        .fetch_all(&self.pool)
        .await?;

        let mut items = attach_categories(rows, pairs)?;
        sort_by_name(&mut items);

        Ok(Some(Category {
            id: uuid,
            name,
            items,
        }))
    }

    /// Lists every category ordered case-insensitively by name.
    pub async fn list_ordered_by_name(&self) -> Result<Vec<CategorySummary>, CategoryError> {
        let rows =
            sqlx::query_as::<_, (String, String)>("SELECT uuid, category_name FROM category")
                .fetch_all(&self.pool)
                .await?;

        Ok(summaries_by_name(rows))
    }

    /// Inserts a new, empty category.
    pub async fn insert(&self, category: &NewCategory<'_>) -> Result<(), CategoryError> {
        sqlx::query("INSERT INTO category (uuid, category_name) VALUES (?, ?)")
            .bind(category.uuid)
            .bind(category.name)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    CategoryError::Duplicate
                } else {
                    CategoryError::Database(err)
                }
            })?;
        Ok(())
    }

    /// Files an existing item under the category.
    pub async fn add_item(
        &self,
        category_uuid: &str,
        item_uuid: &str,
    ) -> Result<(), CategoryError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO category_item (category_id, item_id) \
             SELECT c.id, i.id FROM category AS c, item AS i \
              WHERE c.uuid = ? AND i.uuid = ?",
        )
        .bind(category_uuid)
        .bind(item_uuid)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let linked = sqlx::query_as::<_, (i64,)>(
                "SELECT COUNT(*) FROM category_item AS ci \
                   JOIN category AS c ON c.id = ci.category_id \
                   JOIN item AS i ON i.id = ci.item_id \
                  WHERE c.uuid = ? AND i.uuid = ?",
            )
            .bind(category_uuid)
            .bind(item_uuid)
            .fetch_one(&self.pool)
            .await?;

            if linked.0 == 0 {
                return Err(CategoryError::MissingLink {
                    category: category_uuid.to_string(),
                    item: item_uuid.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn summaries_by_name(rows: Vec<(String, String)>) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = rows
        .into_iter()
        .map(|(id, name)| CategorySummary { id, name })
        .collect();
    summaries.sort_by(|left, right| {
        compare_names(&left.name, &right.name)
            .then_with(|| left.name.cmp(&right.name))
            .then_with(|| left.id.cmp(&right.id))
    });
    summaries
}

/// Parameters required to insert a category.
pub struct NewCategory<'a> {
    pub uuid: &'a str,
    pub name: &'a str,
}

/// Errors that can occur while reading or writing categories.
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("category with the same uuid already exists")]
    Duplicate,
    #[error("category {category} or item {item} does not exist")]
    MissingLink { category: String, item: String },
    #[error("failed to decode item: {0}")]
    Item(#[from] ItemError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository for historical orders.
#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    uuid: String,
    restaurant_uuid: String,
    date: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: i64,
    item_uuid: String,
    quantity: i64,
    price: i64,
}

impl OrderRepository {
    /// Lists every order placed against the restaurant.
    ///
    /// Orders are returned oldest first (ties by insertion), each with its lines
    /// in insertion order.
    pub async fn list_for_restaurant(
        &self,
        restaurant_uuid: &str,
    ) -> Result<Vec<Order>, OrderError> {
        let orders = sqlx::query_as::<_, OrderRow>(
            "SELECT o.id, o.uuid, r.uuid AS restaurant_uuid, o.date \
               FROM orders AS o \
               JOIN restaurant AS r ON r.id = o.restaurant_id \
              WHERE r.uuid = ? \
              ORDER BY o.date ASC, o.id ASC",
        )
        .bind(restaurant_uuid)
        .fetch_all(&self.pool)
        .await?;

        let lines = sqlx::query_as::<_, OrderLineRow>(
            "SELECT oi.order_id, i.uuid AS item_uuid, oi.quantity, oi.price \
               FROM order_item AS oi \
               JOIN item AS i ON i.id = oi.item_id \
               JOIN orders AS o ON o.id = oi.order_id \
               JOIN restaurant AS r ON r.id = o.restaurant_id \
              WHERE r.uuid = ? \
              ORDER BY oi.order_id ASC, oi.id ASC",
        )
        .bind(restaurant_uuid)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
        for line in lines {
            let quantity =
                u32::try_from(line.quantity).map_err(|_| OrderError::InvalidQuantity {
                    item: line.item_uuid.clone(),
                    quantity: line.quantity,
                })?;
            by_order.entry(line.order_id).or_default().push(OrderLine {
                item_id: line.item_uuid,
                quantity,
                price: line.price,
            });
        }

        Ok(orders
            .into_iter()
            .map(|row| Order {
                lines: by_order.remove(&row.id).unwrap_or_default(),
                id: row.uuid,
                restaurant_id: row.restaurant_uuid,
                placed_at: row.date,
            })
            .collect())
    }

    /// Records an order and its lines in a single transaction, returning the order uuid.
    pub async fn insert(&self, order: &NewOrder<'_>) -> Result<String, OrderError> {
        let uuid = order
            .uuid
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO orders (uuid, restaurant_id, date) \
             SELECT ?, id, ? FROM restaurant WHERE uuid = ?",
        )
        .bind(&uuid)
        .bind(to_rfc3339(order.placed_at))
        .bind(order.restaurant_uuid)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                OrderError::Duplicate
            } else {
                OrderError::Database(err)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(OrderError::MissingRestaurant);
        }
        let order_id = result.last_insert_rowid();

        for line in order.lines {
            let inserted = sqlx::query(
                "INSERT INTO order_item (order_id, item_id, quantity, price) \
                 SELECT ?, id, ?, ? FROM item WHERE uuid = ?",
            )
            .bind(order_id)
            .bind(i64::from(line.quantity))
            .bind(line.price)
            .bind(line.item_uuid)
            .execute(&mut *tx)
            .await?;

            if inserted.rows_affected() == 0 {
                return Err(OrderError::MissingItem(line.item_uuid.to_string()));
            }
        }

        tx.commit().await?;
        Ok(uuid)
    }
}

/// Parameters required to record an order.
pub struct NewOrder<'a> {
    /// Generated when absent.
    pub uuid: Option<&'a str>,
    pub restaurant_uuid: &'a str,
    pub placed_at: DateTime<Utc>,
    pub lines: &'a [NewOrderLine<'a>],
}

/// One line of a [`NewOrder`].
pub struct NewOrderLine<'a> {
    pub item_uuid: &'a str,
    pub quantity: u32,
    pub price: i64,
}

/// Errors that can occur while reading or writing orders.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order with the same uuid already exists")]
    Duplicate,
    #[error("restaurant for order does not exist")]
    MissingRestaurant,
    #[error("item {0} referenced by order does not exist")]
    MissingItem(String),
    #[error("order line for item {item} has out-of-range quantity {quantity}")]
    InvalidQuantity { item: String, quantity: i64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn to_rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    async fn setup_db() -> Database {
        let db = Database::connect("sqlite::memory:?cache=shared")
            .await
            .expect("connect");
        db.run_migrations().await.expect("migrations");

        db.restaurants()
            .insert(&NewRestaurant {
                uuid: "r-1",
                name: "Dosa Corner",
            })
            .await
            .expect("insert restaurant");

        for (uuid, name) in [("c-veg", "Veg"), ("c-des", "desserts")] {
            db.categories()
                .insert(&NewCategory { uuid, name })
                .await
                .expect("insert category");
        }

        for (uuid, name, item_type) in [
            ("i-banana", "banana split", ItemType::Veg),
            ("i-apple", "Apple pie", ItemType::Veg),
            ("i-chicken", "Chicken Curry", ItemType::NonVeg),
        ] {
            db.items()
                .insert(&NewItem {
                    uuid,
                    name,
                    price: 120,
                    item_type,
                })
                .await
                .expect("insert item");
            db.restaurants()
                .add_item("r-1", uuid)
                .await
                .expect("link restaurant");
        }

        for (category, item) in [
            ("c-veg", "i-banana"),
            ("c-veg", "i-apple"),
            ("c-des", "i-banana"),
        ] {
            db.categories()
                .add_item(category, item)
                .await
                .expect("link category");
        }

        db
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    #[tokio::test]
    async fn migrations_apply() {
        let db = Database::connect("sqlite::memory:?cache=shared")
            .await
            .expect("connect");
        db.run_migrations().await.expect("migrations");

        let tables: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
                .fetch_one(db.pool())
                .await
                .expect("fetch tables");
        assert!(tables.0 >= 7, "expected catalog tables to be created");
    }

    #[tokio::test]
    async fn fetch_item_returns_categories() {
        let db = setup_db().await;
        let item = db
            .items()
            .fetch_by_uuid("i-banana")
            .await
            .expect("query")
            .expect("item exists");

        assert_eq!(item.name, "banana split");
        assert_eq!(item.item_type, ItemType::Veg);
        assert_eq!(item.category_ids, vec!["c-veg", "c-des"]);
    }

    #[tokio::test]
    async fn fetch_item_returns_none_when_missing() {
        let db = setup_db().await;
        let item = db.items().fetch_by_uuid("nonexistent").await.expect("query");
        assert!(item.is_none());
    }

    #[tokio::test]
    async fn insert_item_rejects_duplicate_uuid() {
        let db = setup_db().await;
        let err = db
            .items()
            .insert(&NewItem {
                uuid: "i-apple",
                name: "Another pie",
                price: 10,
                item_type: ItemType::Veg,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::Duplicate));
    }

    #[tokio::test]
    async fn fetch_restaurant_loads_items() {
        let db = setup_db().await;
        let restaurant = db
            .restaurants()
            .fetch_by_uuid("r-1")
            .await
            .expect("query")
            .expect("restaurant exists");

        assert_eq!(restaurant.name, "Dosa Corner");
        let ids: Vec<_> = restaurant.items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["i-banana", "i-apple", "i-chicken"]);
        let chicken = restaurant
            .items
            .iter()
            .find(|item| item.id == "i-chicken")
            .expect("chicken listed");
        assert!(chicken.category_ids.is_empty());
    }

    #[tokio::test]
    async fn fetch_restaurant_returns_none_when_missing() {
        let db = setup_db().await;
        assert!(db
            .restaurants()
            .fetch_by_uuid("missing")
            .await
            .expect("query")
            .is_none());
    }

    #[tokio::test]
    async fn add_item_errors_for_unknown_restaurant() {
        let db = setup_db().await;
        let err = db
            .restaurants()
            .add_item("missing", "i-apple")
            .await
            .unwrap_err();
        assert!(matches!(err, RestaurantError::MissingLink { .. }));
    }

    #[tokio::test]
    async fn category_items_are_sorted_case_insensitively() {
        let db = setup_db().await;
        let category = db
            .categories()
            .fetch_by_uuid("c-veg")
            .await
            .expect("query")
            .expect("category exists");

        let names: Vec<_> = category.items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Apple pie", "banana split"]);
    }

    #[tokio::test]
    async fn list_categories_orders_by_name() {
        let db = setup_db().await;
        db.categories()
            .insert(&NewCategory {
                uuid: "c-bev",
                name: "Beverages",
            })
            .await
            .expect("insert");

        let categories = db.categories().list_ordered_by_name().await.expect("query");
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Beverages", "desserts", "Veg"]);
    }

    #[tokio::test]
    async fn orders_are_listed_oldest_first_with_lines() {
        let db = setup_db().await;
        let repo = db.orders();
        repo.insert(&NewOrder {
            uuid: Some("o-late"),
            restaurant_uuid: "r-1",
            placed_at: at(30),
            lines: &[NewOrderLine {
                item_uuid: "i-apple",
                quantity: 1,
                price: 120,
            }],
        })
        .await
        .expect("insert late");
        repo.insert(&NewOrder {
            uuid: Some("o-early"),
            restaurant_uuid: "r-1",
            placed_at: at(0),
            lines: &[
                NewOrderLine {
                    item_uuid: "i-banana",
                    quantity: 2,
                    price: 240,
                },
                NewOrderLine {
                    item_uuid: "i-chicken",
                    quantity: 1,
                    price: 120,
                },
            ],
        })
        .await
        .expect("insert early");

        let orders = repo.list_for_restaurant("r-1").await.expect("query");
        let ids: Vec<_> = orders.iter().map(|order| order.id.as_str()).collect();
        assert_eq!(ids, vec!["o-early", "o-late"]);
        assert_eq!(orders[0].restaurant_id, "r-1");
        assert_eq!(orders[0].placed_at, at(0));
        let lines: Vec<_> = orders[0]
            .lines
            .iter()
            .map(|line| (line.item_id.as_str(), line.quantity))
            .collect();
        assert_eq!(lines, vec![("i-banana", 2), ("i-chicken", 1)]);
    }

    #[tokio::test]
    async fn insert_order_rolls_back_on_missing_item() {
        let db = setup_db().await;
        let repo = db.orders();
        let err = repo
            .insert(&NewOrder {
                uuid: None,
                restaurant_uuid: "r-1",
                placed_at: at(0),
                lines: &[NewOrderLine {
                    item_uuid: "ghost",
                    quantity: 1,
                    price: 1,
                }],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::MissingItem(ref uuid) if uuid == "ghost"));

        let orders = repo.list_for_restaurant("r-1").await.expect("query");
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn listing_rejects_quantity_outside_u32() {
        let db = setup_db().await;
        let repo = db.orders();
        repo.insert(&NewOrder {
            uuid: Some("o-bulk"),
            restaurant_uuid: "r-1",
            placed_at: at(0),
            lines: &[NewOrderLine {
                item_uuid: "i-apple",
                quantity: 1,
                price: 120,
            }],
        })
        .await
        .expect("insert");

        sqlx::query("UPDATE order_item SET quantity = ?")
            .bind(i64::from(u32::MAX) + 1)
            .execute(db.pool())
            .await
            .expect("update quantity");

        let err = repo.list_for_restaurant("r-1").await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidQuantity { ref item, quantity }
                if item == "i-apple" && quantity == i64::from(u32::MAX) + 1
        ));
    }

    #[tokio::test]
    async fn insert_order_errors_for_unknown_restaurant() {
        let db = setup_db().await;
        let err = db
            .orders()
            .insert(&NewOrder {
                uuid: None,
                restaurant_uuid: "missing",
                placed_at: at(0),
                lines: &[],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::MissingRestaurant));
    }
}
