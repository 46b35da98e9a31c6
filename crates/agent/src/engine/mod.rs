//! Order Engine
//!
//! Drives each customer from a free-text order to a confirmed, routed order.
//!
//! The implementation is split into focused submodules:
//! - `processing`: `handle_message` and the per-state handlers
//! - `location`: address resolution, outlet selection and the `nearby:` command

mod location;
mod processing;

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use order_engine_config::{BranchesConfig, CatalogConfig, Settings};
use order_engine_core::{
    Branch, CatalogIndex, ConversationEntry, ConversationState, DraftOrder, GeoPoint, Geocoder,
    NearbyOption,
};
use order_engine_location::{BranchDirectory, CityFallback, LocationResolver, NominatimGeocoder};
use order_engine_persistence::PersistenceLayer;
use order_engine_text_processing::{
    HttpZeroShotBackend, IntentClassifier, ItemExtractor, MenuMatcher, RuleBasedClassifier,
    ZeroShotClassifier,
};

use crate::routing::MessageRouter;
use crate::{templates, EngineConfig, Result};

/// Conversational order engine
///
/// One instance serves every customer. Turns for the same customer are
/// serialized; different customers proceed independently.
pub struct OrderEngine {
    pub(crate) config: EngineConfig,
    /// Swapped wholesale by `replace_catalog`
    pub(crate) catalog: RwLock<Arc<CatalogIndex>>,
    pub(crate) extractor: ItemExtractor,
    pub(crate) matcher: MenuMatcher,
    pub(crate) classifier: IntentClassifier,
    pub(crate) resolver: LocationResolver,
    pub(crate) router: MessageRouter,
    pub(crate) store: PersistenceLayer,
    pub(crate) customer_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl OrderEngine {
    pub fn new(
        config: EngineConfig,
        catalog: CatalogIndex,
        classifier: IntentClassifier,
        resolver: LocationResolver,
        store: PersistenceLayer,
    ) -> Result<Self> {
        let extractor = ItemExtractor::new(config.matcher.metric, config.matcher.fuzzy_threshold)?;
        let matcher = MenuMatcher::new(config.matcher.clone());

        tracing::info!(
            items = catalog.len(),
            branches = resolver.directory().active_branches().count(),
            zero_shot = classifier.has_zero_shot(),
            sessions_distributed = store.sessions.is_distributed(),
            "Order engine ready"
        );

        Ok(Self {
            config,
            catalog: RwLock::new(Arc::new(catalog)),
            extractor,
            matcher,
            classifier,
            resolver,
            router: MessageRouter::new()?,
            store,
            customer_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Build everything the settings describe: domain files, geocoder and classifier
    pub fn from_settings(settings: &Settings, store: PersistenceLayer) -> Result<Self> {
        let config = EngineConfig::from_settings(settings)?;

        let catalog =
            CatalogConfig::load_or_builtin(settings.domain.catalog_path.as_deref())?.into_index()?;
        let branches = BranchesConfig::load_or_builtin(settings.domain.branches_path.as_deref())?;

        let geocoder: Option<Arc<dyn Geocoder>> = if settings.geocoding.enabled {
            Some(Arc::new(NominatimGeocoder::new(&settings.geocoding)?))
        } else {
            None
        };
        let resolver = LocationResolver::new(
            geocoder,
            CityFallback::from_config(&branches),
            BranchDirectory::from_config(&branches),
            Duration::from_secs(settings.geocoding.timeout_secs),
            settings.geocoding.max_attempts,
        );

        let classifier_settings = &settings.classifier;
        let timeout = Duration::from_millis(classifier_settings.zero_shot_timeout_ms);
        let zero_shot = match (
            classifier_settings.zero_shot_enabled,
            classifier_settings.zero_shot_endpoint.as_deref(),
        ) {
            (true, Some(endpoint)) => {
                let backend = HttpZeroShotBackend::new(endpoint, timeout)?;
                Some(Arc::new(ZeroShotClassifier::new(Arc::new(backend)))
                    as Arc<dyn order_engine_core::Classifier>)
            },
            (true, None) => {
                tracing::warn!("Zero-shot classifier enabled without an endpoint, using rules only");
                None
            },
            (false, _) => None,
        };
        let classifier = IntentClassifier::new(
            RuleBasedClassifier::new(),
            zero_shot,
            classifier_settings.zero_shot_threshold,
            timeout,
        );

        Self::new(config, catalog, classifier, resolver, store)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current catalog snapshot
    pub fn catalog(&self) -> Arc<CatalogIndex> {
        self.catalog.read().clone()
    }

    /// Swap in a new catalog. Turns already running keep the snapshot they started with.
    pub fn replace_catalog(&self, catalog: CatalogIndex) {
        let items = catalog.len();
        *self.catalog.write() = Arc::new(catalog);
        tracing::info!(items, "Catalog replaced");
    }

    /// Rendered menu text
    pub fn menu(&self) -> String {
        templates::menu(&self.catalog())
    }

    pub fn branches(&self) -> Vec<Branch> {
        self.resolver.directory().active_branches().cloned().collect()
    }

    pub async fn get_user_state(&self, customer_id: &str) -> Result<ConversationState> {
        Ok(self
            .store
            .sessions
            .get(customer_id)
            .await?
            .map(|s| s.state)
            .unwrap_or_default())
    }

    /// The customer's in-flight draft, if any
    pub async fn get_pending_order(&self, customer_id: &str) -> Result<Option<DraftOrder>> {
        let Some(order_id) = self
            .store
            .sessions
            .get(customer_id)
            .await?
            .and_then(|s| s.active_order_id)
        else {
            return Ok(None);
        };
        Ok(self
            .store
            .orders
            .get(order_id)
            .await?
            .filter(|o| o.is_draft() && o.customer_id == customer_id))
    }

    /// Outlets around a coordinate, default radius and limit
    pub fn get_nearby(&self, lat: f64, lon: f64) -> Vec<NearbyOption> {
        self.resolver.rank_nearby(
            GeoPoint::new(lat, lon),
            self.config.nearby.radius_km,
            self.config.nearby.limit,
        )
    }

    /// Logged messages, oldest first
    pub async fn conversation_history(
        &self,
        customer_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ConversationEntry>> {
        let limit = limit.unwrap_or(self.config.history_limit);
        Ok(self.store.log.history(customer_id, limit).await?)
    }

    /// Orders in any status, newest first
    pub async fn order_history(&self, customer_id: &str, limit: usize) -> Result<Vec<DraftOrder>> {
        Ok(self.store.orders.list_for_customer(customer_id, limit).await?)
    }

    /// Drop expired location scratch and idle per-customer locks
    pub async fn purge_expired(&self) -> Result<usize> {
        let purged = self.store.scratch.purge_expired().await?;
        self.customer_locks
            .lock()
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        Ok(purged)
    }

    fn customer_lock(&self, customer_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.customer_locks
            .lock()
            .entry(customer_id.to_string())
            .or_default()
            .clone()
    }
}
