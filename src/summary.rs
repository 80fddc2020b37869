// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::structs::StatsSnapshot;
use std::fmt::Display;

/// Column headers of the shutdown summary table.
pub(crate) const SUMMARY_HDRS: [&str; 7] =
    ["Symbol", "Admitted", "Last", "Mean", "Min", "Max", "Stdev"];

/// Format a single row with padding
fn format_row(row: &[String], widths: &[usize]) -> String {
    row.iter()
        .enumerate()
        .map(|(i, item)| format!("{item:<w$}", w = widths[i]))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a collection of rows as a table for printing.
///
/// ## Arguments
/// * `data` - Iterator of rows (each row is an iterator of items)
/// * `headers` - Optional slice of column headers
///
/// ## Returns
///   * Vec of Strings containing the formatted table
pub(crate) fn simple_tabulate<I, R, T>(data: I, headers: Option<&[&str]>) -> Vec<String>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = T>,
    T: Display,
{
    let mut rows: Vec<Vec<String>> = Vec::new();
    if let Some(hdrs) = headers {
        rows.push(hdrs.iter().map(|h: &&str| h.to_string()).collect());
    }
    for row in data {
        rows.push(row.into_iter().map(|item| item.to_string()).collect());
    }
    if rows.is_empty() {
        return Vec::new();
    }

    // Maximum width needed for each column
    let columns: usize = rows.iter().map(|r: &Vec<String>| r.len()).max().unwrap_or(1);
    let mut widths: Vec<usize> = vec![0; columns];
    for row in &rows {
        for (i, item) in row.iter().enumerate() {
            widths[i] = widths[i].max(item.chars().count());
        }
    }

    let mut out: Vec<String> = Vec::with_capacity(rows.len() + 1);
    let mut it = rows.iter();
    if headers.is_some() {
        if let Some(hdr) = it.next() {
            out.push(format_row(hdr, &widths));
            out.push(widths.iter().map(|w: &usize| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
        }
    }
    out.extend(it.map(|row: &Vec<String>| format_row(row, &widths)));
    out
}

/// Turn registry summary rows into display rows matching [SUMMARY_HDRS].
pub(crate) fn summary_rows(rows: &[(String, u64, StatsSnapshot)]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|(symbol, admitted, snap)| {
            vec![
                symbol.clone(),
                admitted.to_string(),
                format!("{:.4}", snap.last),
                format!("{:.4}", snap.avg),
                format!("{:.4}", snap.min),
                format!("{:.4}", snap.max),
                format!("{:.4}", snap.var.sqrt()),
            ]
        })
        .collect()
}
