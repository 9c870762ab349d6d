//! Application state shared across handlers.

use railboard_core::{ArrivalStore, DepartureStore, ServiceStore, Stores};

/// Shared application state.
///
/// Holds the stores the API reads from. Cloning is cheap; the stores do
/// their own locking.
#[derive(Clone, Default)]
pub struct AppState {
    stores: Stores,
}

impl AppState {
    /// Create application state over already populated stores.
    #[must_use]
    pub const fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// The arrival store.
    #[must_use]
    pub fn arrivals(&self) -> &ArrivalStore {
        &self.stores.arrivals
    }

    /// The departure store.
    #[must_use]
    pub fn departures(&self) -> &DepartureStore {
        &self.stores.departures
    }

    /// The service store.
    #[must_use]
    pub fn services(&self) -> &ServiceStore {
        &self.stores.services
    }

    /// All three stores.
    #[must_use]
    pub const fn stores(&self) -> &Stores {
        &self.stores
    }
}
