use crossterm::style::Stylize;

use super::builder::{Alignment, CellColor, ChainReport, Column};

/// Render the report as a box-drawn table. `colored` wraps every body cell
/// in its column's ANSI color; padding is computed on the plain text.
pub fn render(columns: &[Column], report: &ChainReport, colored: bool) -> String {
    let header: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let body: Vec<Vec<String>> = report
        .all_rows()
        .map(|row| columns.iter().map(|c| row.cell(&c.name)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, _)| {
            body.iter()
                .map(|cells| cells[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&border(&widths, '┌', '┬', '┐'));
    out.push_str(&line(columns, &header, &widths, false));
    out.push_str(&border(&widths, '├', '┼', '┤'));
    for cells in &body {
        out.push_str(&line(columns, cells, &widths, colored));
    }
    out.push_str(&border(&widths, '└', '┴', '┘'));
    out
}

/// Print the report to stdout.
pub fn print(columns: &[Column], report: &ChainReport) {
    print!("{}", render(columns, report, true));
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}\n", segments.join(&mid.to_string()))
}

fn line(columns: &[Column], cells: &[String], widths: &[usize], colored: bool) -> String {
    let rendered: Vec<String> = columns
        .iter()
        .zip(cells)
        .zip(widths)
        .map(|((column, cell), width)| {
            let padded = match column.alignment {
                Alignment::Left => format!("{cell:<width$}"),
                Alignment::Right => format!("{cell:>width$}"),
            };
            if !colored {
                return padded;
            }
            match column.color {
                CellColor::Green => padded.green().to_string(),
                CellColor::Cyan => padded.cyan().to_string(),
            }
        })
        .collect();

    format!("│ {} │\n", rendered.join(" │ "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Wallet, RawResultSet};
    use crate::networks::{Chain, NetworkEntry};
    use crate::report::builder::{ReportBuilder, ReportMode};
    use alloy::primitives::{Address, U256};
    use rust_decimal::Decimal;

    fn sample() -> (ReportBuilder, ChainReport) {
        let network = NetworkEntry::new(Chain::Celo, Decimal::from(2));
        let address = Address::with_last_byte(9);
        let raw = RawResultSet {
            chain: Chain::Celo,
            wallets: vec![Wallet {
                address,
                label: "0xWALLET".into(),
            }],
            tx_counts: vec![42],
            native: vec![U256::from(500_000_000_000_000_000u128)],
            tokens: network.tokens.keys().map(|c| (*c, vec![U256::ZERO])).collect(),
        };
        let mut builder = ReportBuilder::new();
        let report = builder.aggregate(&raw, &network, ReportMode::Single).unwrap();
        (builder, report)
    }

    #[test]
    fn test_render_plain_layout() {
        let (builder, report) = sample();
        let out = render(builder.columns(), &report, false);
        let lines: Vec<&str> = out.lines().collect();

        // top border, header, separator, 1 wallet + totals, bottom border
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("Tx count"));
        assert!(lines[1].contains("Celo"));
        assert!(lines[3].contains("0.500 CELO"));
        assert!(lines[4].contains("Total"));
        // every line has the same visible width
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_render_colored_contains_escape_codes() {
        let (builder, report) = sample();
        let out = render(builder.columns(), &report, true);
        assert!(out.contains("\u{1b}["));
    }
}
