// src/render/pagination.rs

/// One page of items laid out in rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub rows: Vec<Vec<T>>,
    pub has_prev: bool,
    pub has_next: bool,
    /// The page actually shown after clamping.
    pub page_index: usize,
    pub total_pages: usize,
}

/// Lays `items` out `row_width` per row, `max_rows` rows per page.
///
/// Out-of-range page indices clamp to the nearest valid page. No items gives
/// an empty page with no scroll controls.
pub fn paginate<T: Clone>(items: &[T], page_index: usize, row_width: usize, max_rows: usize) -> Page<T> {
    let row_width = row_width.max(1);
    let max_rows = max_rows.max(1);

    let all_rows: Vec<Vec<T>> = items.chunks(row_width).map(|c| c.to_vec()).collect();
    if all_rows.is_empty() {
        return Page {
            rows: Vec::new(),
            has_prev: false,
            has_next: false,
            page_index: 0,
            total_pages: 0,
        };
    }

    let total_pages = all_rows.len().div_ceil(max_rows);
    let page_index = page_index.min(total_pages - 1);
    let rows = all_rows
        .into_iter()
        .skip(page_index * max_rows)
        .take(max_rows)
        .collect();

    Page {
        rows,
        has_prev: page_index > 0,
        has_next: page_index + 1 < total_pages,
        page_index,
        total_pages,
    }
}
