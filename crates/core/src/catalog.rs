use std::cmp::Ordering;

use crate::types::Item;

/// Keeps the items listed under `category_id` and orders them by name.
///
/// Names are compared case-insensitively without regard to locale. Names that
/// only differ in case fall back to the exact name and then the identifier so
/// the result does not depend on the input order.
pub fn items_in_category<I>(items: I, category_id: &str) -> Vec<Item>
where
    I: IntoIterator<Item = Item>,
{
    let mut filtered: Vec<Item> = items
        .into_iter()
        .filter(|item| item.in_category(category_id))
        .collect();
    sort_by_name(&mut filtered);
    filtered
}

/// Sorts items in place using [`compare_names`].
pub fn sort_by_name(items: &mut [Item]) {
    items.sort_by(|left, right| {
        compare_names(&left.name, &right.name)
            .then_with(|| left.name.cmp(&right.name))
            .then_with(|| left.id.cmp(&right.id))
    });
}

/// Case-insensitive, locale-independent name ordering.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
}
