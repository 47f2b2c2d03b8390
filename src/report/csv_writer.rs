use std::path::{Path, PathBuf};

use super::builder::{ChainReport, Column};
use crate::errors::ReportError;

/// `<dir>/balances_<name>.csv`
pub fn csv_path(results_dir: &Path, name: &str) -> PathBuf {
    results_dir.join(format!("balances_{name}.csv"))
}

/// Write the report, replacing any earlier file for the same name.
/// The header is the column list as it stands at call time.
pub async fn save_csv(
    results_dir: &Path,
    columns: &[Column],
    report: &ChainReport,
) -> Result<PathBuf, ReportError> {
    tokio::fs::create_dir_all(results_dir)
        .await
        .map_err(|source| ReportError::Io {
            path: results_dir.display().to_string(),
            source,
        })?;

    let path = csv_path(results_dir, &report.name);
    let content = render_csv(columns, report).map_err(|source| ReportError::Csv {
        path: path.display().to_string(),
        source,
    })?;
    tokio::fs::write(&path, content)
        .await
        .map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })?;

    tracing::info!(path = %path.display(), rows = report.rows.len() + 1, "CSV saved");
    Ok(path)
}

/// Header plus one record per row, totals last.
pub fn render_csv(columns: &[Column], report: &ChainReport) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|c| c.name.as_str()))?;

    for row in report.all_rows() {
        writer.write_record(columns.iter().map(|c| row.cell(&c.name)))?;
    }

    writer.into_inner().map_err(|e| {
        let source = e.error();
        csv::Error::from(std::io::Error::new(source.kind(), source.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawResultSet, Wallet};
    use crate::networks::{Chain, NetworkEntry};
    use crate::report::builder::{ReportBuilder, ReportMode};
    use alloy::primitives::{Address, U256};
    use rust_decimal::Decimal;

    #[test]
    fn test_csv_path() {
        assert_eq!(
            csv_path(Path::new("results"), "opBNB"),
            PathBuf::from("results/balances_opBNB.csv")
        );
    }

    #[test]
    fn test_render_header_rows_and_totals() {
        let network = NetworkEntry::new(Chain::Klaytn, Decimal::ONE);
        let raw = RawResultSet {
            chain: Chain::Klaytn,
            wallets: vec![Wallet {
                address: Address::with_last_byte(1),
                label: "0x01".into(),
            }],
            tx_counts: vec![7],
            native: vec![U256::ZERO],
            tokens: network.tokens.keys().map(|c| (*c, vec![U256::ZERO])).collect(),
        };
        let mut builder = ReportBuilder::new();
        let report = builder.aggregate(&raw, &network, ReportMode::All).unwrap();

        let text = String::from_utf8(render_csv(builder.columns(), &report).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "n,wallet,Tx count,Native,NativeUSD,USDT,USDC,DAI,Klaytn");
        assert_eq!(lines[1], "1,0x01,7,0.000,0.00,0.0,0,0,0.00");
        assert_eq!(lines[2], "2,Total,,0,0,0,0,0,0");
    }
}
