//! Key-shape detection for keyed maps: dense `row_col` matrices and dense
//! integer-keyed arrays. Records are whatever matches neither.
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static CELL_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)_(\d+)$").expect("static regex"));
static INDEX_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("static regex"));

/// Cells of a fully dense `row_col` matrix, row-major; `None` on any gap or foreign key.
pub fn matrix_cells(map: &Map<String, Value>) -> Option<Vec<Vec<&Value>>> {
    if map.is_empty() {
        return None;
    }
    let mut coords = Vec::with_capacity(map.len());
    for (key, value) in map {
        let caps = CELL_KEY.captures(key)?;
        let row: usize = caps[1].parse().ok()?;
        let col: usize = caps[2].parse().ok()?;
        coords.push((row, col, value));
    }
    let rows = coords.iter().map(|(r, _, _)| *r).max()?.checked_add(1)?;
    let cols = coords.iter().map(|(_, c, _)| *c).max()?.checked_add(1)?;
    // a dense grid can't have more cells than keys; bail before allocating
    if rows.checked_mul(cols)? > coords.len() {
        return None;
    }
    let mut grid: Vec<Vec<Option<&Value>>> = vec![vec![None; cols]; rows];
    for (row, col, value) in coords {
        grid[row][col] = Some(value);
    }
    grid.into_iter()
        .map(|row| row.into_iter().collect::<Option<Vec<_>>>())
        .collect()
}

/// Elements of a map keyed exactly `0..n`, ordered by numeric key value.
pub fn array_items(map: &Map<String, Value>) -> Option<Vec<&Value>> {
    if map.is_empty() {
        return None;
    }
    let mut indexed = Vec::with_capacity(map.len());
    for (key, value) in map {
        if !INDEX_KEY.is_match(key) {
            return None;
        }
        let index: usize = key.parse().ok()?;
        indexed.push((index, value));
    }
    indexed.sort_by_key(|(index, _)| *index);
    let dense = indexed.iter().enumerate().all(|(expected, (index, _))| expected == *index);
    if !dense {
        return None;
    }
    Some(indexed.into_iter().map(|(_, value)| value).collect())
}
