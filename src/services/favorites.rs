use crate::models::Place;
use crate::services::queue::completion;
use crate::services::store::{load_json, save_json, KeyValueStore, StoreError, StoreKey};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

enum Command {
    Load { done: oneshot::Sender<Vec<Place>> },
    Toggle { place: Place, done: oneshot::Sender<Vec<Place>> },
    Clear { done: oneshot::Sender<Vec<Place>> },
}

/// Owner of the user's saved places
///
/// Mutations are queued to a single worker task and applied strictly in the
/// order they were issued. Each mutation persists the whole collection and
/// only then becomes visible (write-then-reflect); a failed write leaves the
/// favorites as they were. Storage failures are logged, never returned.
pub struct FavoritesManager {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<Vec<Place>>,
    worker: JoinHandle<()>,
}

impl FavoritesManager {
    /// Load favorites from the store and start the write queue
    pub async fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let (state_tx, state) = watch::channel(Vec::new());
        let mut worker = FavoritesWorker {
            store,
            favorites: Vec::new(),
            state: state_tx,
        };
        worker.load().await;

        let (commands, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(worker.run(rx));

        Self {
            commands,
            state,
            worker,
        }
    }

    /// Current favorites, in the order they were added
    pub fn favorites(&self) -> Vec<Place> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Place>> {
        self.state.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    pub fn is_favorite(&self, place_id: &str) -> bool {
        self.state.borrow().iter().any(|fav| fav.id == place_id)
    }

    /// Header text for the favorites screen
    pub fn saved_places_label(&self) -> String {
        Self::label_for(self.len())
    }

    /// Header text for a list of `count` favorites
    pub fn label_for(count: usize) -> String {
        match count {
            1 => "1 saved place".to_string(),
            n => format!("{} saved places", n),
        }
    }

    /// Re-read favorites from the store
    pub fn load(&self) -> impl Future<Output = Vec<Place>> + Send + 'static {
        let (done, reply) = oneshot::channel();
        self.submit(Command::Load { done }, reply)
    }

    /// Add `place`, or remove the favorite with the same id
    pub fn toggle(&self, place: Place) -> impl Future<Output = Vec<Place>> + Send + 'static {
        let (done, reply) = oneshot::channel();
        self.submit(Command::Toggle { place, done }, reply)
    }

    /// Remove every favorite
    pub fn clear(&self) -> impl Future<Output = Vec<Place>> + Send + 'static {
        let (done, reply) = oneshot::channel();
        self.submit(Command::Clear { done }, reply)
    }

    /// Stop accepting writes and wait for queued ones to finish
    pub async fn dispose(self) {
        drop(self.commands);
        if let Err(e) = self.worker.await {
            tracing::error!("Favorites worker panicked: {}", e);
        }
    }

    // The command is enqueued before the returned future is polled, so
    // issue order is call order.
    fn submit(
        &self,
        command: Command,
        reply: oneshot::Receiver<Vec<Place>>,
    ) -> impl Future<Output = Vec<Place>> + Send + 'static {
        if self.commands.send(command).is_err() {
            tracing::warn!("Favorites queue is closed, dropping request");
        }
        completion(reply, self.state.clone())
    }
}

struct FavoritesWorker {
    store: Arc<dyn KeyValueStore>,
    favorites: Vec<Place>,
    state: watch::Sender<Vec<Place>>,
}

impl FavoritesWorker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            let (result, done) = match command {
                Command::Load { done } => {
                    self.load().await;
                    (self.favorites.clone(), done)
                }
                Command::Toggle { place, done } => (self.toggle(place).await, done),
                Command::Clear { done } => {
                    self.persist(Vec::new()).await;
                    (self.favorites.clone(), done)
                }
            };
            // Caller may have stopped waiting
            let _ = done.send(result);
        }
        tracing::debug!("Favorites worker stopped");
    }

    async fn load(&mut self) {
        match load_json::<Vec<Place>>(self.store.as_ref(), StoreKey::FAVORITES).await {
            Ok(Some(stored)) => self.reflect(dedup_by_id(stored)),
            Ok(None) => self.reflect(Vec::new()),
            Err(e) => tracing::error!("Error loading favorites: {}", e),
        }
    }

    async fn toggle(&mut self, place: Place) -> Vec<Place> {
        let next = if self.favorites.iter().any(|fav| fav.id == place.id) {
            tracing::debug!("Removing favorite {}", place.id);
            self.favorites
                .iter()
                .filter(|fav| fav.id != place.id)
                .cloned()
                .collect()
        } else {
            tracing::debug!("Adding favorite {}", place.id);
            let mut next = self.favorites.clone();
            next.push(place);
            next
        };

        self.persist(next).await;
        self.favorites.clone()
    }

    async fn persist(&mut self, next: Vec<Place>) {
        if let Err(e) = self.save(&next).await {
            tracing::error!("Error saving favorites: {}", e);
            return;
        }
        self.reflect(next);
    }

    async fn save(&self, next: &[Place]) -> Result<(), StoreError> {
        save_json(self.store.as_ref(), StoreKey::FAVORITES, next).await
    }

    fn reflect(&mut self, favorites: Vec<Place>) {
        self.favorites = favorites;
        self.state.send_replace(self.favorites.clone());
    }
}

/// Drop repeated ids from a stored collection, keeping the first occurrence
fn dedup_by_id(places: Vec<Place>) -> Vec<Place> {
    let mut seen = std::collections::HashSet::new();
    places
        .into_iter()
        .filter(|place| seen.insert(place.id.clone()))
        .collect()
}
