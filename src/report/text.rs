use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use crate::input::gpr::GprDocument;
use crate::report::ReportError;

const MANY: usize = 6;

fn histogram<I: IntoIterator<Item = usize>>(counts: I) -> BTreeMap<usize, usize> {
    let mut hist = BTreeMap::new();
    for c in counts {
        *hist.entry(c).or_insert(0) += 1;
    }
    hist
}

fn push_hist(out: &mut String, hist: &BTreeMap<usize, usize>, key: &str, value: &str) {
    let _ = writeln!(out, "{}\t{}", key, value);
    for (k, v) in hist {
        let _ = writeln!(out, "{}\t{}", k, v);
    }
}

/// Spot histograms split by flag state, for eyeballing a GPR before a run.
pub fn render_inspect_text(gpr: &GprDocument, flag_bad: i64) -> Result<String, ReportError> {
    let table = gpr.table();
    let names = table.str_column("Name")?;
    let ids = table.str_column("ID")?;
    let flags = table.int_column("Flags")?;

    let mut out = String::new();
    let mut id_states: BTreeMap<&str, BTreeSet<bool>> = BTreeMap::new();
    let mut id_to_name: BTreeMap<&str, &str> = BTreeMap::new();

    for masked in [false, true] {
        let mut name_rows: BTreeMap<&str, usize> = BTreeMap::new();
        let mut id_rows: BTreeMap<&str, usize> = BTreeMap::new();
        let mut name_ids: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for ((name, id), &flag) in names.iter().zip(ids).zip(flags) {
            if (flag <= flag_bad) != masked {
                continue;
            }
            let (name, id) = (name.as_str(), id.as_str());
            id_states.entry(id).or_default().insert(masked);
            id_to_name.insert(id, name);
            *name_rows.entry(name).or_insert(0) += 1;
            *id_rows.entry(id).or_insert(0) += 1;
            name_ids.entry(name).or_default().insert(id);
        }

        let _ = writeln!(out, "\nhistogram for mask = {}", masked);
        push_hist(
            &mut out,
            &histogram(name_ids.values().map(BTreeSet::len)),
            "ids_per_name",
            "number_of_names",
        );
        push_hist(
            &mut out,
            &histogram(name_rows.values().copied()),
            "rows_per_name",
            "number_of_names",
        );
        push_hist(
            &mut out,
            &histogram(id_rows.values().copied()),
            "rows_per_id",
            "number_of_ids",
        );

        let _ = writeln!(out, "\nnames with many ids for mask = {}", masked);
        for (name, set) in &name_ids {
            if set.len() >= MANY {
                let _ = writeln!(out, "{}\t{}", name, set.len());
            }
        }
        let _ = writeln!(out, "\nids with many rows for mask = {}", masked);
        for (id, &cnt) in &id_rows {
            if cnt >= MANY {
                let name = id_to_name.get(id).copied().unwrap_or_default();
                let _ = writeln!(out, "{}\t{}\t{}", name, id, cnt);
            }
        }
    }

    let _ = writeln!(out, "\nids with both mask states");
    for (id, states) in &id_states {
        if states.len() != 1 {
            let name = id_to_name.get(id).copied().unwrap_or_default();
            let _ = writeln!(out, "id {} named {} has {} masks", id, name, states.len());
        }
    }

    let _ = writeln!(out, "\nids with several names");
    for (id, joined) in gpr.id_to_names()? {
        if joined.contains(';') {
            let _ = writeln!(out, "{}\t{}", id, joined);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
