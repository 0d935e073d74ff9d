//! Application state container.
//!
//! Services are constructed once here and passed where needed - no
//! module-level singletons. The container lives for the session; dropping it
//! tears everything down.

use sunrise_core::Observable;

use crate::commerce::PlatformClient;
use crate::config::SunriseConfig;
use crate::services::navigation::NavigationService;
use crate::services::wishlist::WishListService;

/// Shared application state for one customer session.
pub struct AppState {
    /// The platform API client; cheap to clone.
    pub client: PlatformClient,
    /// Wish-list synchronizer.
    pub wish_list: WishListService<PlatformClient>,
    /// Category navigation.
    pub navigation: NavigationService<PlatformClient>,
    /// "Is authenticated" signal gating wish-list features.
    pub authenticated: Observable<bool>,
}

impl AppState {
    /// Build the session's services from configuration.
    #[must_use]
    pub fn new(config: &SunriseConfig) -> Self {
        let client = PlatformClient::new(config);
        let authenticated = Observable::new(false);

        Self {
            wish_list: WishListService::new(
                client.clone(),
                config.display_context(),
                authenticated.clone(),
            ),
            navigation: NavigationService::new(
                client.clone(),
                config.navigation_external_id.clone(),
            ),
            client,
            authenticated,
        }
    }
}
