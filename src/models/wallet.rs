use std::path::Path;

use alloy::primitives::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletListError {
    #[error("failed to read wallet list {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: invalid wallet address {value:?}")]
    InvalidAddress {
        path: String,
        line: usize,
        value: String,
    },
}

/// One line of the wallet list. `label` keeps the text as written so the
/// report shows addresses the way the user typed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    pub address: Address,
    pub label: String,
}

/// Read the wallet list from disk. Called at the start of every fetch attempt
/// so edits to the file are picked up between chains.
pub async fn read_wallets(path: &Path) -> Result<Vec<Wallet>, WalletListError> {
    let display = path.display().to_string();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| WalletListError::Read {
            path: display.clone(),
            source,
        })?;

    parse_wallets(&display, &content)
}

/// One address per line; blank lines and `#` comments are skipped.
pub fn parse_wallets(path: &str, content: &str) -> Result<Vec<Wallet>, WalletListError> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| {
            let address = line
                .parse::<Address>()
                .map_err(|_| WalletListError::InvalidAddress {
                    path: path.to_string(),
                    line: line_no,
                    value: line.to_string(),
                })?;
            Ok(Wallet {
                address,
                label: line.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_and_comments() {
        let content = "\n# team wallets\n0x00000000000000000000000000000000000000aa\n\n  0x00000000000000000000000000000000000000Bb  \n";
        let wallets = parse_wallets("evm.txt", content).unwrap();
        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].label, "0x00000000000000000000000000000000000000aa");
        assert_eq!(wallets[1].label, "0x00000000000000000000000000000000000000Bb");
    }

    #[test]
    fn test_parse_reports_line_number() {
        let content = "0x00000000000000000000000000000000000000aa\nnot-an-address\n";
        let err = parse_wallets("evm.txt", content).unwrap_err();
        match err {
            WalletListError::InvalidAddress { line, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(value, "not-an-address");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = read_wallets(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletListError::Read { .. }));
    }
}
