use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::hits::IntersectionHits;
use crate::model::pool::{Direction, PoolLabel, parse_pair};
use crate::report::ReportError;
use crate::table::{Column, DEFAULT_SEPARATOR, Table, TableError};

pub const GRID_FILENAME: &str = "intersection_grid.txt";
pub const LIST_PREFIX: &str = "intersection_hit";
pub const GRID_PREFIX: &str = "intersection_grid";

/// H1..H12 rows by V1..V12 columns; each cell lists that pair's identities,
/// sorted and space separated.
pub fn build_grid<'a, I>(pairs: I) -> Result<Table, TableError>
where
    I: IntoIterator<Item = (PoolLabel, PoolLabel, &'a str)>,
{
    let mut cells: BTreeMap<(PoolLabel, PoolLabel), Vec<&str>> = BTreeMap::new();
    for (h, v, identity) in pairs {
        cells.entry((h, v)).or_default().push(identity);
    }
    for ids in cells.values_mut() {
        ids.sort_unstable();
    }

    let rows: Vec<PoolLabel> = PoolLabel::all(Direction::Horizontal).collect();
    let mut data = vec![(
        "pool".to_string(),
        Column::Str(rows.iter().map(|h| h.to_string()).collect()),
    )];
    for v in PoolLabel::all(Direction::Vertical) {
        let column = rows
            .iter()
            .map(|&h| cells.get(&(h, v)).map(|ids| ids.join(" ")).unwrap_or_default())
            .collect();
        data.push((v.to_string(), Column::Str(column)));
    }
    Table::from_columns(data)
}

pub fn write_grid(hits: &IntersectionHits, path: &Path) -> Result<(), TableError> {
    let grid = build_grid(
        hits.keys()
            .map(|k| (k.horizontal, k.vertical, k.identity.as_str())),
    )?;
    grid.write(path, None, None, DEFAULT_SEPARATOR)
}

/// Grid from an `intersection_hit` table (`pair`, `id` columns).
pub fn grid_from_list(list: &Table) -> Result<Table, ReportError> {
    let pairs = list.string_column("pair")?;
    let ids = list.string_column("id")?;
    let mut parsed = Vec::with_capacity(pairs.len());
    for (pair, id) in pairs.iter().zip(&ids) {
        let (h, v) = parse_pair(pair).ok_or_else(|| ReportError::BadPair(pair.clone()))?;
        parsed.push((h, v, id.as_str()));
    }
    tracing::info!(hits = parsed.len(), "grid hits");
    Ok(build_grid(parsed)?)
}

/// Rebuilds a grid for every `intersection_hit*` file in `dir`, naming each
/// output by swapping the prefix for `intersection_grid`.
pub fn make_grid_for_dir(dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    tracing::info!(dir = %dir.display(), "building grids");
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(LIST_PREFIX))
        .collect();
    names.sort();

    let mut written = Vec::with_capacity(names.len());
    for name in names {
        let grid_name = format!("{}{}", GRID_PREFIX, &name[LIST_PREFIX.len()..]);
        let list_path = dir.join(&name);
        let grid_path = dir.join(&grid_name);
        tracing::info!(list = %list_path.display(), grid = %grid_path.display(), "grid");
        let list = Table::from_file_keep_text(&list_path, DEFAULT_SEPARATOR, &["pair", "id"])?;
        grid_from_list(&list)?.write(&grid_path, None, None, DEFAULT_SEPARATOR)?;
        written.push(grid_path);
    }
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/grid.rs"]
mod tests;
