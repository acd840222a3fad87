use chrono::{Duration, TimeZone, Utc};
use food_ordering_core::types::ItemType;
use food_ordering_storage::{
    Database, NewCategory, NewItem, NewOrder, NewOrderLine, NewRestaurant,
};

/// In-memory database with two restaurants, three categories and a small order history.
///
/// Restaurant `r-1` order counts: `i-apple` 3, `i-banana` 1, `i-chicken` 1,
/// `i-paneer` never ordered. `i-banana` is seen before `i-chicken`.
pub async fn seeded_database() -> Database {
    let db = Database::connect("sqlite::memory:?cache=shared")
        .await
        .expect("connect");
    db.run_migrations().await.expect("migrations");

    for (uuid, name) in [("r-1", "Spice Route"), ("r-2", "Burger Barn")] {
        db.restaurants()
            .insert(&NewRestaurant { uuid, name })
            .await
            .expect("insert restaurant");
    }

    for (uuid, name) in [("c-veg", "Veg"), ("c-nonveg", "Non-Veg"), ("c-des", "Desserts")] {
        db.categories()
            .insert(&NewCategory { uuid, name })
            .await
            .expect("insert category");
    }

    let items: [(&str, &str, i64, ItemType, &str, &[&str]); 5] = [
        ("i-apple", "Apple pie", 150, ItemType::Veg, "r-1", &["c-veg", "c-des"]),
        ("i-banana", "banana split", 180, ItemType::Veg, "r-1", &["c-veg", "c-des"]),
        ("i-paneer", "Paneer Tikka", 240, ItemType::Veg, "r-1", &["c-veg"]),
        ("i-chicken", "Chicken Curry", 320, ItemType::NonVeg, "r-1", &["c-nonveg"]),
        ("i-burger", "Chicken Burger", 200, ItemType::NonVeg, "r-2", &["c-nonveg"]),
    ];

    for (uuid, name, price, item_type, restaurant, categories) in items {
        db.items()
            .insert(&NewItem {
                uuid,
                name,
                price,
                item_type,
            })
            .await
            .expect("insert item");
        db.restaurants()
            .add_item(restaurant, uuid)
            .await
            .expect("link restaurant");
        for category in categories {
            db.categories()
                .add_item(category, uuid)
                .await
                .expect("link category");
        }
    }

    let start = Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap();
    let orders: [(&str, &str, i64, &[&str]); 4] = [
        ("o-1", "r-1", 0, &["i-banana", "i-apple"]),
        ("o-2", "r-1", 10, &["i-apple", "i-chicken"]),
        ("o-3", "r-1", 20, &["i-apple"]),
        ("o-4", "r-2", 5, &["i-burger", "i-burger"]),
    ];

    for (uuid, restaurant, minutes, item_ids) in orders {
        let lines: Vec<NewOrderLine<'_>> = item_ids
            .iter()
            .map(|&item_uuid| NewOrderLine {
                item_uuid,
                quantity: 1,
                price: 100,
            })
            .collect();
        db.orders()
            .insert(&NewOrder {
                uuid: Some(uuid),
                restaurant_uuid: restaurant,
                placed_at: start + Duration::minutes(minutes),
                lines: &lines,
            })
            .await
            .expect("insert order");
    }

    db
}
