use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use crate::input::gpr::GprDocument;
use crate::input::{GprFile, InputError};
use crate::model::thresholds::CONTROL_TOKEN;
use crate::table::{Column, DEFAULT_SEPARATOR, Table, TableError};

const ND_NAMES: &[&str] = &["ND", "nd", "N.D."];
const IGG_NAME: &str = "IgG";
/// Matched against GPR text, so read verbatim.
const TEXT_COLUMNS: &[&str] = &["id", "name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Columns `id`, `name`; every pair is a control.
    Simple,
    /// Columns `id`, `name`, `control`, `exptl` as written by [`tally_controls`].
    Tally,
}

/// Known control `(ID, Name)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlSet {
    pairs: BTreeSet<(String, String)>,
}

impl ControlSet {
    pub fn insert(&mut self, id: &str, name: &str) {
        self.pairs.insert((id.to_string(), name.to_string()));
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str, name: &str) -> bool {
        self.pairs.contains(&(id.to_string(), name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Masking only looks at the ID half of each pair.
    pub fn ids(&self) -> HashSet<&str> {
        self.pairs.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn to_table(&self) -> Result<Table, TableError> {
        let ids = self.pairs.iter().map(|(id, _)| id.clone()).collect();
        let names = self.pairs.iter().map(|(_, name)| name.clone()).collect();
        Table::from_columns([("id", Column::Str(ids)), ("name", Column::Str(names))])
    }

    pub fn write(&self, path: &Path) -> Result<(), TableError> {
        self.to_table()?.write(path, None, None, DEFAULT_SEPARATOR)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedControls {
    pub controls: ControlSet,
    /// `id`, `cnt`, `names` summary, tally mode only.
    pub id_to_names: Option<Table>,
}

pub fn load_controls(path: &Path, mode: ControlMode) -> Result<LoadedControls, InputError> {
    tracing::info!(path = %path.display(), mode = ?mode, "reading controls");
    let table = Table::from_file_keep_text(path, DEFAULT_SEPARATOR, TEXT_COLUMNS)?;
    let loaded = match mode {
        ControlMode::Simple => LoadedControls {
            controls: controls_simple(&table)?,
            id_to_names: None,
        },
        ControlMode::Tally => {
            let (controls, id_to_names) = controls_tally(&table)?;
            LoadedControls {
                controls,
                id_to_names: Some(id_to_names),
            }
        }
    };
    tracing::info!(pairs = loaded.controls.len(), "controls loaded");
    Ok(loaded)
}

pub fn controls_simple(table: &Table) -> Result<ControlSet, TableError> {
    let ids = table.string_column("id")?;
    let names = table.string_column("name")?;
    let mut controls = ControlSet::default();
    for (id, name) in ids.iter().zip(&names) {
        controls.insert(id, name);
    }
    Ok(controls)
}

/// A pair is a control when it was flagged at least as often as not, or when
/// its name or ID marks it as one.
pub fn controls_tally(table: &Table) -> Result<(ControlSet, Table), TableError> {
    let ids = table.string_column("id")?;
    let names = table.string_column("name")?;
    let control = table.numeric_column("control")?;
    let exptl = table.numeric_column("exptl")?;

    let mut controls = ControlSet::default();
    for (((id, name), c), e) in ids.iter().zip(&names).zip(&control).zip(&exptl) {
        let is_nd = ND_NAMES.contains(&name.as_str());
        let is_control = id == CONTROL_TOKEN;
        let is_igg = name == IGG_NAME;
        if c >= e || is_nd || is_control || is_igg {
            controls.insert(id, name);
        }
    }
    controls.insert(CONTROL_TOKEN, IGG_NAME);

    let mut id_to_name: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (id, name) in ids.iter().zip(&names) {
        id_to_name.entry(id.as_str()).or_default().insert(name.as_str());
    }
    let mut out_ids = Vec::with_capacity(id_to_name.len());
    let mut out_cnts = Vec::with_capacity(id_to_name.len());
    let mut out_names = Vec::with_capacity(id_to_name.len());
    for (id, names) in id_to_name {
        out_ids.push(id.to_string());
        out_cnts.push(names.len() as i64);
        out_names.push(names.into_iter().collect::<Vec<_>>().join(","));
    }
    let id_to_names = Table::from_columns([
        ("id", Column::Str(out_ids)),
        ("cnt", Column::Int(out_cnts)),
        ("names", Column::Str(out_names)),
    ])?;
    Ok((controls, id_to_names))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlTally {
    pub control: i64,
    pub exptl: i64,
}

/// Counts, per `(ID, Name)`, how many spots were flagged bad versus kept.
pub fn tally_controls(
    files: &[GprFile],
    flag_bad: i64,
) -> Result<BTreeMap<(String, String), ControlTally>, InputError> {
    let mut tally: BTreeMap<(String, String), ControlTally> = BTreeMap::new();
    for file in files {
        let gpr = GprDocument::from_file(&file.path)?;
        let table = gpr.table();
        let ids = table.str_column("ID")?;
        let names = table.str_column("Name")?;
        let flags = table.int_column("Flags")?;
        for ((id, name), &flag) in ids.iter().zip(names).zip(flags) {
            let entry = tally.entry((id.clone(), name.clone())).or_default();
            if flag <= flag_bad {
                entry.control += 1;
            } else {
                entry.exptl += 1;
            }
        }
        tracing::info!(file = %file.file_name, pairs = tally.len(), "controls tallied");
    }
    Ok(tally)
}

pub fn tally_to_table(
    tally: &BTreeMap<(String, String), ControlTally>,
) -> Result<Table, TableError> {
    let mut ids = Vec::with_capacity(tally.len());
    let mut names = Vec::with_capacity(tally.len());
    let mut control = Vec::with_capacity(tally.len());
    let mut exptl = Vec::with_capacity(tally.len());
    for ((id, name), t) in tally {
        ids.push(id.clone());
        names.push(name.clone());
        control.push(t.control);
        exptl.push(t.exptl);
    }
    Table::from_columns([
        ("id", Column::Str(ids)),
        ("name", Column::Str(names)),
        ("control", Column::Int(control)),
        ("exptl", Column::Int(exptl)),
    ])
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/controls.rs"]
mod tests;
