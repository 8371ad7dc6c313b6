use std::collections::HashSet;

use super::aggregator::ConsolidatedList;

/// Store mode: the list without the items whose check id is in `checked`.
///
/// Every category stays present, possibly empty.
pub fn filter_checked(list: &ConsolidatedList, checked: &HashSet<String>) -> ConsolidatedList {
    let mut filtered = ConsolidatedList::empty();
    for item in list.items() {
        if !checked.contains(&item.check_id()) {
            filtered.push(item.clone());
        }
    }
    filtered
}

/// Plain-text rendering used for clipboard export.
///
/// One `__Category__` header per non-empty category, in enumeration order,
/// followed by one `{quantity} {unit} {name}` line per item. Blocks are
/// separated by a blank line.
pub fn format_for_export(list: &ConsolidatedList) -> String {
    let blocks: Vec<String> = list
        .iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(category, items)| {
            let mut block = format!("__{}__\n", category);
            for item in items {
                block.push_str(&format!("{} {} {}\n", item.quantity, item.unit, item.name));
            }
            block
        })
        .collect();

    blocks.join("\n")
}
