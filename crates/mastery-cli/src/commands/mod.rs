pub mod graph;
pub mod init;
pub mod report;
pub mod show;
pub mod sync;

use comfy_table::Table;

use mastery_core::model::{display_name_for, MasteryResult};
use mastery_core::record::LearnerRecord;

/// Table of scored topics, strongest peak first. Returns the table and the
/// number of topics left out because they have no score yet.
pub(crate) fn mastery_table<'a, I>(rows: I) -> (Table, usize)
where
    I: IntoIterator<Item = (&'a str, MasteryResult, usize)>,
{
    let mut rows: Vec<_> = rows.into_iter().collect();
    let total = rows.len();
    rows.retain(|(_, r, _)| r.peak > 0.0);
    rows.sort_by(|a, b| b.1.peak.total_cmp(&a.1.peak).then_with(|| a.0.cmp(b.0)));

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Current", "Peak", "Retained", "Bins"]);
    for (slug, result, bins) in &rows {
        table.add_row(vec![
            display_name_for(slug),
            format!("{:.1}", result.current),
            format!("{:.1}", result.peak),
            format!("{:.0}%", result.current / result.peak * 100.0),
            bins.to_string(),
        ]);
    }
    (table, total - rows.len())
}

/// Print every scored topic of a stored record.
pub(crate) fn print_record(record: &LearnerRecord) {
    let (table, unscored) = mastery_table(record.topics.iter().map(|(slug, t)| {
        let bins = record.bins.get(slug).map_or(0, |b| b.len());
        let result = MasteryResult {
            current: t.current,
            peak: t.peak,
        };
        (slug.as_str(), result, bins)
    }));
    println!("{table}");
    if unscored > 0 {
        println!("{unscored} topics not yet scored.");
    }
}
