use std::path::PathBuf;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::fetcher::BalanceFetcher;
use crate::networks::{
    AlloyClientFactory, ClientFactory, NetworkRegistry, PriceClient, ReportTarget,
};
use crate::report::{self, ChainReport, ReportBuilder, ReportMode};

/// Ties registry, fetcher and report builder together for one process.
///
/// The builder lives as long as the service, so report columns accumulate
/// across calls: two single-chain reports in a row produce a CSV whose
/// header carries both chain columns.
pub struct BalanceService<F> {
    registry: NetworkRegistry,
    fetcher: BalanceFetcher<F>,
    builder: ReportBuilder,
    results_dir: PathBuf,
}

impl BalanceService<AlloyClientFactory> {
    /// Load native prices for every chain `target` needs and wire the
    /// alloy-backed fetcher. A failed price lookup aborts here.
    pub async fn connect(config: &AppConfig, target: ReportTarget) -> Result<Self, ServiceError> {
        let price_client = PriceClient::new(reqwest::Client::new(), config.price_api_url.clone());
        let registry = NetworkRegistry::load(&price_client, &target.chains()).await?;

        let factory = AlloyClientFactory::new(config.rpc_pools.clone(), config.multicall_address);
        let fetcher = BalanceFetcher::new(factory, config.wallets_path.clone(), config.max_retries);

        Ok(Self::new(registry, fetcher, config.results_dir.clone()))
    }
}

impl<F: ClientFactory> BalanceService<F> {
    pub fn new(
        registry: NetworkRegistry,
        fetcher: BalanceFetcher<F>,
        results_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            builder: ReportBuilder::new(),
            results_dir: results_dir.into(),
        }
    }

    pub fn builder(&self) -> &ReportBuilder {
        &self.builder
    }

    /// Fetch, print the console table, then save the CSV.
    pub async fn fetch_print_and_save(&mut self, target: ReportTarget) -> Result<PathBuf, ServiceError> {
        let report = self.collect(target, ReportMode::Single).await?;
        report::table::print(self.builder.columns(), &report);
        Ok(report::save_csv(&self.results_dir, self.builder.columns(), &report).await?)
    }

    /// Fetch, save the CSV and hand the rows back to the caller.
    pub async fn fetch_and_save(&mut self, target: ReportTarget) -> Result<ChainReport, ServiceError> {
        let report = self.collect(target, ReportMode::Structured).await?;
        report::save_csv(&self.results_dir, self.builder.columns(), &report).await?;
        Ok(report)
    }

    async fn collect(&mut self, target: ReportTarget, mode: ReportMode) -> Result<ChainReport, ServiceError> {
        match target {
            ReportTarget::Chain(chain) => {
                let network = self.registry.get(chain)?;
                let raw = self.fetcher.fetch(network).await?;
                Ok(self.builder.aggregate(&raw, network, mode)?)
            }
            ReportTarget::All => {
                let chains: Vec<_> = self.registry.chains().collect();
                let mut reports = Vec::with_capacity(chains.len());

                for chain in chains {
                    let network = self.registry.get(chain)?;
                    match self.fetcher.fetch(network).await {
                        Ok(raw) => reports.push(self.builder.aggregate(&raw, network, ReportMode::All)?),
                        Err(e) => {
                            tracing::error!(chain = %chain, error = %e, "Chain skipped in multi-chain report");
                        }
                    }
                }

                if reports.is_empty() {
                    return Err(ServiceError::NothingFetched);
                }

                tracing::info!(chains = reports.len(), "Multi-chain report assembled");
                Ok(self.builder.merge(&reports))
            }
        }
    }
}
