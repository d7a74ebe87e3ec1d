use log::debug;
use parking_lot::Mutex;

use super::{ConnectionProvider, Endpoint, ProviderState};
use crate::db::repository::RepositoryResult;

/// Provider for a database host reachable without a tunnel.
#[derive(Debug)]
pub struct DirectProvider {
    endpoint: Endpoint,
    state: Mutex<ProviderState>,
}

impl DirectProvider {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            state: Mutex::new(ProviderState::Open),
        }
    }
}

impl ConnectionProvider for DirectProvider {
    fn acquire(&self) -> RepositoryResult<Endpoint> {
        let mut state = self.state.lock();
        if *state != ProviderState::Open {
            debug!("Re-opening direct provider for {}", self.endpoint);
            *state = ProviderState::Open;
        }
        Ok(self.endpoint.clone())
    }

    fn release(&self, _endpoint: &Endpoint) {}

    fn state(&self) -> ProviderState {
        *self.state.lock()
    }

    fn shutdown(&self) {
        *self.state.lock() = ProviderState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_and_reacquire() {
        let provider = DirectProvider::new(Endpoint::new("db", 6543));
        provider.shutdown();
        assert_eq!(provider.state(), ProviderState::Closed);

        let endpoint = provider.acquire().unwrap();
        assert_eq!(endpoint.port, 6543);
        assert_eq!(provider.state(), ProviderState::Open);
        provider.release(&endpoint);
        assert_eq!(provider.state(), ProviderState::Open);
    }
}
