/*
[INPUT]:  Validated GinkgoConfig
[OUTPUT]: Running REST queue plus rates/events streams feeding the advisor
[POS]:    Orchestration layer - startup and shutdown of the trading session
[UPDATE]: When changing what the runner starts or how it stops
*/

use std::sync::Arc;

use anyhow::Context;
use ginkgo_adapter::{
    AccountSession, AccountsQuery, OandaApi, OandaStream, StreamKind, StreamQuery,
};
use tracing::{info, warn};

use crate::GinkgoConfig;
use crate::advisor::ExpertAdvisor;

/// One trading session: the request queue, its account view and the streams
#[derive(Debug)]
pub struct Trader {
    session: AccountSession,
    rates: OandaStream,
    events: Option<OandaStream>,
    advisor: Arc<ExpertAdvisor>,
}

impl Trader {
    /// Build clients for the configured environment and start everything
    pub async fn connect(config: &GinkgoConfig) -> anyhow::Result<Self> {
        let token = Some(config.access_token.as_str());
        let api = OandaApi::new(config.environment, token).context("create rest client")?;
        let rates = OandaStream::new(config.environment, token, StreamKind::Rates)
            .context("create rates stream")?;
        let events = if config.stream_events {
            Some(
                OandaStream::new(config.environment, token, StreamKind::Events)
                    .context("create events stream")?,
            )
        } else {
            None
        };
        Self::start_with(config, api, rates, events).await
    }

    /// Start from prebuilt clients
    pub async fn start_with(
        config: &GinkgoConfig,
        api: OandaApi,
        rates: OandaStream,
        events: Option<OandaStream>,
    ) -> anyhow::Result<Self> {
        api.init().context("start request queue")?;
        let api = Arc::new(api);
        let session = AccountSession::new(api.clone(), config.account_id);

        match api.get_accounts(&AccountsQuery::default())?.await {
            Ok(response) => {
                for account in &response.accounts {
                    info!(
                        account_id = account.account_id,
                        name = %account.account_name,
                        currency = %account.account_currency,
                        margin_rate = %account.margin_rate,
                        "account available"
                    );
                }
            }
            Err(err) => warn!(error = %err, "account listing failed"),
        }

        let advisor = Arc::new(ExpertAdvisor::new());
        let rates_query = StreamQuery::rates(config.account_id, config.instruments.iter().cloned())
            .ignore_heartbeat(config.ignore_heartbeat);
        rates
            .start(&rates_query, advisor.clone())
            .context("start rates stream")?;

        if let Some(events) = &events {
            let events_query =
                StreamQuery::events(vec![config.account_id]).ignore_heartbeat(config.ignore_heartbeat);
            events
                .start(&events_query, advisor.clone())
                .context("start events stream")?;
        }

        info!(
            account_id = config.account_id,
            instruments = ?config.instruments,
            events = events.is_some(),
            "trader started"
        );
        Ok(Self {
            session,
            rates,
            events,
            advisor,
        })
    }

    pub fn advisor(&self) -> &Arc<ExpertAdvisor> {
        &self.advisor
    }

    pub fn session(&self) -> &AccountSession {
        &self.session
    }

    /// Stop the streams, then the request queue
    pub async fn shutdown(self) {
        self.rates.stop().await;
        if let Some(events) = &self.events {
            events.stop().await;
        }
        self.session.api().deinit().await;
        self.advisor.log_summary();
        info!("trader stopped");
    }
}
