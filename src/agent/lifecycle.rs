//! Install and activate lifecycle tasks.

use futures::future::{join_all, try_join_all};
use tracing::{debug, info, warn};

use crate::error::{AgentError, NetworkError, Result};
use crate::request::{FetchRequest, StoredResponse};

use super::{Agent, LifecycleState};

impl Agent {
    /// Install this agent version: precache the asset manifest into the
    /// current-version store.
    ///
    /// The precache is an all-or-nothing batch. Every manifest URL is fetched
    /// concurrently; entries are only written once every fetch has succeeded,
    /// so a failed install leaves no manifest entry observable. On failure
    /// the agent becomes `Redundant` and the previously active version stays
    /// in control.
    ///
    /// Skip-waiting is requested up front, trading the standard two-version
    /// overlap for immediate takeover on the next activation.
    pub async fn install(&self) -> Result<()> {
        self.transition(LifecycleState::Unregistered, LifecycleState::Installing)
            .await?;

        let name = self.config.cache_name();
        info!(version = name, "Installing");

        if let Err(e) = self.control.skip_waiting().await {
            // The request is advisory; a failure only delays takeover
            warn!(error = %e, "Skip-waiting request failed");
        }

        match self.precache().await {
            Ok(count) => {
                info!(version = name, entries = count, "Install complete");
                self.set_state(LifecycleState::Installed).await;
                Ok(())
            }
            Err(e) => {
                warn!(version = name, error = %e, "Install failed");
                self.set_state(LifecycleState::Redundant).await;
                Err(e)
            }
        }
    }

    /// Fetch and store every manifest URL. Returns the number of entries
    /// written.
    async fn precache(&self) -> Result<usize> {
        let name = self.config.cache_name();
        self.store.open(name).await?;

        // Phase 1: fetch everything concurrently; any failure (including a
        // non-success status) fails the whole batch before anything is
        // written.
        let fetches = self.config.manifest.iter().map(|url| {
            let request = FetchRequest::get(url.clone());
            async move {
                let response = self.network.fetch(&request).await.map_err(|source| {
                    AgentError::Precache {
                        url: url.clone(),
                        source,
                    }
                })?;
                if !response.is_success() {
                    return Err(AgentError::Precache {
                        url: url.clone(),
                        source: NetworkError::Status {
                            status: response.status,
                        },
                    });
                }
                Ok::<_, AgentError>((request, response))
            }
        });
        let fetched: Vec<(FetchRequest, StoredResponse)> = try_join_all(fetches).await?;

        // Phase 2: write the batch. A write failure deletes the partially
        // populated store so the atomicity contract still holds.
        let count = fetched.len();
        for (request, response) in fetched {
            if let Err(e) = self.store.put(name, &request.key(), response).await {
                if let Err(del) = self.store.delete(name).await {
                    warn!(version = name, error = %del, "Failed to clear store after write error");
                }
                return Err(e.into());
            }
            debug!(url = %request.url, "Precached");
        }

        Ok(count)
    }

    /// Activate this agent version: sweep stale stores, then claim all open
    /// pages.
    ///
    /// Every store whose name differs from the current version is deleted;
    /// deletions run concurrently and all settle before control is claimed.
    /// A single deletion failure is logged and neither cancels sibling
    /// deletions nor blocks the claim - the stale store lingers as an
    /// accepted degraded state.
    pub async fn activate(&self) -> Result<()> {
        self.transition(LifecycleState::Installed, LifecycleState::Activating)
            .await?;

        let current = self.config.cache_name();
        info!(version = current, "Activating, sweeping old stores");

        let names = match self.store.keys().await {
            Ok(names) => names,
            Err(e) => {
                // Old stores linger until the next activation; not fatal
                warn!(error = %e, "Could not enumerate stores, skipping sweep");
                Vec::new()
            }
        };

        let deletions = names
            .iter()
            .filter(|name| name.as_str() != current)
            .map(|name| async move {
                match self.store.delete(name).await {
                    Ok(_) => info!(store = %name, "Deleted old store"),
                    Err(e) => warn!(store = %name, error = %e, "Failed to delete old store"),
                }
            });
        join_all(deletions).await;

        if let Err(e) = self.control.claim_clients().await {
            // Open pages keep their previous worker until reload
            warn!(error = %e, "Claiming clients failed");
        }

        self.set_state(LifecycleState::Active).await;
        info!(version = current, "Active and controlling pages");
        Ok(())
    }
}
