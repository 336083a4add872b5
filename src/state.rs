use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::engine::cooldown::CooldownTracker;
use crate::location::PlaceResolver;
use crate::models::location::UserLocation;
use crate::models::notify::NotifyRequest;
use crate::models::worker::Worker;
use crate::observability::metrics::Metrics;
use crate::store::KeyValueStore;

pub struct AppState {
    pub workers: DashMap<Uuid, Worker>,
    pub cooldowns: CooldownTracker,
    pub location: RwLock<Option<UserLocation>>,
    pub resolver: PlaceResolver,
    pub store: Arc<dyn KeyValueStore>,
    pub default_radius_km: f64,
    pub notify_tx: mpsc::Sender<NotifyRequest>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        resolver: PlaceResolver,
        store: Arc<dyn KeyValueStore>,
        cooldowns: CooldownTracker,
        default_radius_km: f64,
        notify_queue_size: usize,
    ) -> (Self, mpsc::Receiver<NotifyRequest>) {
        let (notify_tx, notify_rx) = mpsc::channel(notify_queue_size);

        (
            Self {
                workers: DashMap::new(),
                cooldowns,
                location: RwLock::new(None),
                resolver,
                store,
                default_radius_km,
                notify_tx,
                metrics: Metrics::new(),
            },
            notify_rx,
        )
    }
}
