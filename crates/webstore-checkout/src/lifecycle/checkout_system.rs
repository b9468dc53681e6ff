use crate::config::CheckoutConfig;
use crate::delivery::MinecraftService;
use crate::error::PollError;
use crate::http::HttpOrderQuery;
use crate::identifier::order_id_from_query;
use crate::poller::{OrderPoller, PollerConfig, PollerHandle};
use crate::query::OrderQuery;
use order_store::{OrderActor, StoreClient};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{error, info};

/// First id handed out by the in-process store.
const FIRST_ORDER_ID: u64 = 1;

/// Runtime orchestrator for the checkout confirmation flow.
///
/// Owns the order store actor and starts one poller per confirmation page
/// visit. Pollers query the HTTP order API when `ORDER_API_URL` is configured
/// and the in-process store otherwise.
pub struct CheckoutSystem {
    /// Client for the in-process order store. The payment webhook side uses
    /// it to place and complete orders.
    pub store_client: StoreClient,

    query: Arc<dyn OrderQuery>,
    poller_config: PollerConfig,
    delivery: Option<MinecraftService>,
    pollers: Mutex<Vec<AbortHandle>>,
    handles: Vec<JoinHandle<()>>,
}

impl CheckoutSystem {
    /// Spawns the order store and wires the query backend.
    ///
    /// Fails only when the HTTP client for `ORDER_API_URL` cannot be built;
    /// nothing is spawned in that case.
    pub fn new(config: CheckoutConfig) -> Result<Self, String> {
        let http_query = match &config.order_api_url {
            Some(url) => {
                let query = HttpOrderQuery::new(url.clone())
                    .map_err(|e| format!("HTTP client setup failed: {e}"))?;
                info!(url = %url, "Polling the HTTP order API");
                Some(query)
            }
            None => None,
        };

        let (store_actor, store_client) = OrderActor::new(32, FIRST_ORDER_ID);
        let store_handle = tokio::spawn(store_actor.run());

        let query: Arc<dyn OrderQuery> = match http_query {
            Some(query) => Arc::new(query),
            None => Arc::new(store_client.clone()),
        };

        let delivery = config
            .minecraft
            .map(|mc| MinecraftService::new(mc.api_url, mc.token));

        Ok(Self {
            store_client,
            query,
            poller_config: config.poller,
            delivery,
            pollers: Mutex::new(Vec::new()),
            handles: vec![store_handle],
        })
    }

    /// Starts confirming the order named in a redirect query string.
    ///
    /// Fails without spawning anything when the identifier is missing or
    /// malformed.
    pub fn confirm(&self, query_string: &str) -> Result<PollerHandle, PollError> {
        let order_id = order_id_from_query(query_string)?;
        info!(order_id = %order_id, "Starting order confirmation");

        let handle =
            OrderPoller::new(self.query.clone(), self.poller_config.clone()).spawn(order_id);

        // A poisoned registry still has to track the poller: it holds a store
        // client that shutdown must release.
        let mut pollers = self.pollers.lock().unwrap_or_else(PoisonError::into_inner);
        pollers.retain(|poller| !poller.is_finished());
        pollers.push(handle.abort_handle());
        Ok(handle)
    }

    /// The command delivery client, when one is configured.
    pub fn delivery(&self) -> Option<&MinecraftService> {
        self.delivery.as_ref()
    }

    /// Stops every poller, closes the store and waits for it to exit.
    ///
    /// Pollers still running at this point are aborted; joining their handles
    /// afterwards yields a cancelled `JoinError`.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down checkout system...");

        let pollers = self
            .pollers
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        for poller in pollers {
            poller.abort();
        }

        drop(self.query);
        drop(self.store_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Store task failed: {:?}", e);
                return Err(format!("Store task failed: {:?}", e));
            }
        }

        info!("Checkout system shutdown complete.");
        Ok(())
    }
}
