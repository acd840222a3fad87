use std::collections::HashMap;

use crate::types::Order;

/// Number of order lines that referenced a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCount {
    pub item_id: String,
    pub count: u32,
}

/// Counts how many order lines reference each item.
///
/// Orders that belong to a different restaurant are skipped. Each line counts
/// once regardless of its quantity. Entries are returned in the order their
/// item was first seen while walking `orders` and their lines.
pub fn count_item_orders(restaurant_id: &str, orders: &[Order]) -> Vec<ItemCount> {
    let mut counts: Vec<ItemCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    let lines = orders
        .iter()
        .filter(|order| order.restaurant_id == restaurant_id)
        .flat_map(|order| order.lines.iter());

    for line in lines {
        match index.get(line.item_id.as_str()) {
            Some(&position) => counts[position].count += 1,
            None => {
                index.insert(line.item_id.as_str(), counts.len());
                counts.push(ItemCount {
                    item_id: line.item_id.clone(),
                    count: 1,
                });
            }
        }
    }

    counts
}

/// Ranks items by descending order count.
///
/// Ties keep first-seen order because the sort is stable over the
/// insertion-ordered counts from [`count_item_orders`].
pub fn rank_by_popularity(restaurant_id: &str, orders: &[Order]) -> Vec<ItemCount> {
    let mut ranked = count_item_orders(restaurant_id, orders);
    ranked.sort_by(|left, right| right.count.cmp(&left.count));
    ranked
}
