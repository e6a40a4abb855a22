//! Console formatting for pair tables, symbol vectors and run summaries.

use crate::{
    trainer::{StopReason, TrainOutput},
    types::{FrequencyTable, PairFreq, Symbol, SymbolPair},
};

/// Formats up to `limit` pairs as `left,right -> count` lines.
///
/// Ordered by descending count, then ascending pair, so the first line is the
/// pair the selector would choose.
pub fn format_pair_table(freqs: &FrequencyTable, limit: usize) -> String {
    let mut rows: Vec<(SymbolPair, PairFreq)> = freqs.iter().map(|(&p, &f)| (p, f)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    rows.into_iter()
        .take(limit)
        .map(|(pair, freq)| format!("{},{} -> {}\n", pair.left(), pair.right(), freq))
        .collect()
}

/// Formats the symbols space-separated, followed by a total line.
pub fn format_symbols(symbols: &[Symbol]) -> String {
    let line: String = symbols.iter().map(|s| format!("{s} ")).collect();
    format!("{line}\nTotal symbols: {}\n", symbols.len())
}

/// Formats sizes, merges performed and the compression ratio (one decimal).
pub fn format_summary(output: &TrainOutput) -> String {
    let mut lines = vec![
        format!("Original size: {}", output.original_len()),
        format!("New size: {}", output.final_len()),
        format!("Merges: {}", output.merges().len()),
    ];
    if let StopReason::Exhausted {
        requested,
        performed,
    } = output.stop_reason()
    {
        lines.push(format!(
            "Stopped early: {performed} of {requested} merges (no pairs left)"
        ));
    }
    lines.push(format!("Compression ratio: {:.1}X", output.compression_ratio()));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
