use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::cache::store::{Admission, CacheStore};
use crate::cache::tags::{QueryKey, Tag};
use crate::config::Config;
use crate::endpoints::{auth, users, MutationDef, QueryDef};
use crate::error::ApiError;
use crate::models::user::User;
use crate::observability::metrics::Metrics;
use crate::session::SessionHint;
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<ApiError>,
}

impl<T> QueryState<T> {
    pub fn uninitialized() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub skip: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// Skip unless the session hint says a session may exist.
    pub fn unless_session(session: &SessionHint) -> Self {
        Self {
            skip: !session.is_hinted(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CacheEvent {
    Invalidated { tag: Tag },
    RowPatched { tag: Tag, id: String },
    Reset,
}

struct Subscription {
    def: QueryDef,
    tx: watch::Sender<QueryState<Value>>,
    handles: AtomicUsize,
}

struct ClientInner {
    transport: Transport,
    cache: CacheStore,
    session: SessionHint,
    metrics: Metrics,
    subscriptions: DashMap<QueryKey, Arc<Subscription>>,
    events_tx: broadcast::Sender<CacheEvent>,
}

#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<ClientInner>,
}

impl QueryClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let transport = Transport::new(config)?;
        let (events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                cache: CacheStore::new(config.stale_after_secs),
                session: SessionHint::new(),
                metrics: Metrics::new(),
                subscriptions: DashMap::new(),
                events_tx,
            }),
        })
    }

    pub fn session(&self) -> SessionHint {
        self.inner.session.clone()
    }

    pub fn metrics(&self) -> Metrics {
        self.inner.metrics.clone()
    }

    pub fn events(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events_tx.subscribe()
    }

    /// One-shot cached read. `Ok(None)` means the query was skipped.
    pub async fn query<T: DeserializeOwned>(
        &self,
        def: &QueryDef,
        opts: &QueryOptions,
    ) -> Result<Option<T>, ApiError> {
        if opts.skip {
            return Ok(None);
        }

        let value = self.inner.fetch_value(def, false).await?;
        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Live subscription: snapshots arrive through the returned handle, and
    /// invalidation of any provided tag re-executes the query while the
    /// handle is alive.
    pub fn subscribe<T: DeserializeOwned>(
        &self,
        def: QueryDef,
        opts: QueryOptions,
    ) -> QueryHandle<T> {
        if opts.skip {
            let (tx, rx) = watch::channel(QueryState::uninitialized());
            return QueryHandle {
                rx,
                _guard: None,
                detached_tx: Some(tx),
                _marker: PhantomData,
            };
        }

        let key = def.key();
        // Handle count moves while the map entry is held, so a concurrent
        // last-handle drop cannot remove the subscription underneath us.
        let sub = {
            let entry = self
                .inner
                .subscriptions
                .entry(key.clone())
                .or_insert_with(|| {
                    let (tx, _rx) = watch::channel(QueryState::loading());
                    Arc::new(Subscription {
                        def,
                        tx,
                        handles: AtomicUsize::new(0),
                    })
                });
            entry.handles.fetch_add(1, Ordering::SeqCst);
            entry.clone()
        };

        let rx = sub.tx.subscribe();

        let inner = self.inner.clone();
        let fetch_key = key.clone();
        tokio::spawn(async move {
            inner.run_query(&fetch_key, false).await;
        });

        QueryHandle {
            rx,
            _guard: Some(Arc::new(SubGuard {
                inner: self.inner.clone(),
                key,
            })),
            detached_tx: None,
            _marker: PhantomData,
        }
    }

    /// Execute a mutation and apply its declared cache effects: the row
    /// patch first, so an open view updates without waiting for a list
    /// refetch, then the coarse tag invalidation.
    pub async fn mutate<T: DeserializeOwned>(&self, def: MutationDef) -> Result<T, ApiError> {
        let result = self
            .inner
            .transport
            .send(def.method, &def.path, &[], def.body.as_ref())
            .await;

        match result {
            Ok(value) => {
                self.inner
                    .metrics
                    .requests_total
                    .with_label_values(&["success"])
                    .inc();

                if let Some(patch) = &def.patch {
                    let patched = self.inner.cache.patch_row(patch.tag, &patch.id, &value);
                    for key in &patched {
                        if let Some(sub) = self.inner.subscriptions.get(key) {
                            if let Some(current) = self.inner.cache.get(key) {
                                let _ = sub.tx.send(QueryState {
                                    data: Some(current),
                                    is_loading: false,
                                    error: None,
                                });
                            }
                        }
                    }
                    if !patched.is_empty() {
                        let _ = self.inner.events_tx.send(CacheEvent::RowPatched {
                            tag: patch.tag,
                            id: patch.id.clone(),
                        });
                    }
                }

                self.invalidate_tags(&def.invalidates);

                serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
            }
            Err(err) => {
                self.inner
                    .metrics
                    .requests_total
                    .with_label_values(&["error"])
                    .inc();
                Err(err)
            }
        }
    }

    /// Mark every cache entry under `tags` stale and refetch the ones with a
    /// live subscription. Unsubscribed entries refetch lazily on next read.
    pub fn invalidate_tags(&self, tags: &[Tag]) {
        if tags.is_empty() {
            return;
        }

        let affected = self.inner.cache.invalidate(tags);

        for tag in tags {
            self.inner
                .metrics
                .invalidations_total
                .with_label_values(&[tag.as_str()])
                .inc();
            let _ = self.inner.events_tx.send(CacheEvent::Invalidated { tag: *tag });
        }

        for key in affected {
            let live = self
                .inner
                .subscriptions
                .get(&key)
                .map(|sub| sub.handles.load(Ordering::SeqCst) > 0)
                .unwrap_or(false);

            if live {
                let inner = self.inner.clone();
                tokio::spawn(async move {
                    inner.run_query(&key, true).await;
                });
            }
        }
    }

    pub async fn login(&self, payload: &auth::LoginPayload) -> Result<User, ApiError> {
        let def = auth::login(payload)?;
        let user: User = self.mutate(def).await?;

        self.inner.session.mark_authenticated(user.clone());
        info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    /// Fetch own profile, gated on the session hint. `Ok(None)` means no
    /// session was hinted and nothing was sent.
    pub async fn load_profile(&self) -> Result<Option<User>, ApiError> {
        let opts = QueryOptions::unless_session(&self.inner.session);
        let profile: Option<User> = self.query(&users::me(), &opts).await?;

        if let Some(user) = &profile {
            self.inner.session.store_profile(user.clone());
        }
        Ok(profile)
    }

    /// Best-effort logout: local session state and the cache are dropped
    /// unconditionally, whatever the server answered.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let def = auth::logout();
        let result = self
            .inner
            .transport
            .send(def.method, &def.path, &[], def.body.as_ref())
            .await;

        self.inner.session.clear();
        self.inner.cache.reset();
        let _ = self.inner.events_tx.send(CacheEvent::Reset);
        for entry in self.inner.subscriptions.iter() {
            let _ = entry.tx.send(QueryState::uninitialized());
        }

        match result {
            Ok(_) => {
                info!("logged out");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "server-side logout failed; local session cleared anyway");
                Err(err)
            }
        }
    }
}

impl ClientInner {
    async fn fetch_value(self: &Arc<Self>, def: &QueryDef, force: bool) -> Result<Value, ApiError> {
        let key = def.key();

        match self.cache.admit(&key, &def.provides, force) {
            Admission::Hit(value) => {
                self.metrics.cache_hits_total.inc();
                Ok(value)
            }
            Admission::Waiter(mut rx) => {
                self.metrics.inflight_joins_total.inc();
                let outcome = rx
                    .wait_for(|outcome| outcome.is_some())
                    .await
                    .map_err(|_| {
                        ApiError::Internal("in-flight request was abandoned".to_string())
                    })?;
                match &*outcome {
                    Some(result) => result.clone(),
                    None => Err(ApiError::Internal(
                        "in-flight request yielded no outcome".to_string(),
                    )),
                }
            }
            Admission::Owner(tx) => {
                let result = self.transport.get(&def.path, &def.query).await;
                let outcome = if result.is_ok() { "success" } else { "error" };
                self.metrics.requests_total.with_label_values(&[outcome]).inc();

                let invalidated_mid_flight =
                    self.cache.complete_fetch(&key, result.clone(), tx);
                if invalidated_mid_flight {
                    self.refetch_if_subscribed(&key);
                }
                result
            }
        }
    }

    /// A fetch that raced an invalidation landed stale; re-run it for any
    /// live subscriber so the screen ends up on post-mutation data.
    fn refetch_if_subscribed(self: &Arc<Self>, key: &QueryKey) {
        let live = self
            .subscriptions
            .get(key)
            .map(|sub| sub.handles.load(Ordering::SeqCst) > 0)
            .unwrap_or(false);

        if live {
            let inner = Arc::clone(self);
            let key = key.clone();
            tokio::spawn(async move {
                inner.run_query(&key, true).await;
            });
        }
    }

    /// Re-execute a subscribed query and push its snapshots. Data already on
    /// screen stays visible through the loading phase and on failure.
    async fn run_query(self: &Arc<Self>, key: &QueryKey, force: bool) {
        let Some(sub) = self.subscriptions.get(key).map(|entry| entry.clone()) else {
            return;
        };

        let previous = sub.tx.borrow().data.clone();
        let _ = sub.tx.send(QueryState {
            data: previous.clone(),
            is_loading: true,
            error: None,
        });

        match self.fetch_value(&sub.def, force).await {
            Ok(value) => {
                let _ = sub.tx.send(QueryState {
                    data: Some(value),
                    is_loading: false,
                    error: None,
                });
            }
            Err(err) => {
                let _ = sub.tx.send(QueryState {
                    data: previous,
                    is_loading: false,
                    error: Some(err),
                });
            }
        }
    }
}

struct SubGuard {
    inner: Arc<ClientInner>,
    key: QueryKey,
}

impl Drop for SubGuard {
    fn drop(&mut self) {
        // Decrement and remove under the same map entry `subscribe` uses, so
        // the two never interleave on a shared subscription.
        if let Entry::Occupied(occupied) = self.inner.subscriptions.entry(self.key.clone()) {
            if occupied.get().handles.fetch_sub(1, Ordering::SeqCst) == 1 {
                occupied.remove();
            }
        }
    }
}

pub struct QueryHandle<T> {
    rx: watch::Receiver<QueryState<Value>>,
    _guard: Option<Arc<SubGuard>>,
    detached_tx: Option<watch::Sender<QueryState<Value>>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> QueryHandle<T> {
    pub fn current(&self) -> QueryState<T> {
        decode(self.rx.borrow().clone())
    }

    /// Wait for the next snapshot. A skipped handle never produces one, so
    /// it resolves immediately with its uninitialized state.
    pub async fn changed(&mut self) -> QueryState<T> {
        if self.detached_tx.is_some() {
            return self.current();
        }
        let _ = self.rx.changed().await;
        self.current()
    }

    /// Wait until the query is not loading and return that snapshot.
    pub async fn settled(&mut self) -> QueryState<T> {
        loop {
            let raw = self.rx.borrow_and_update().clone();
            if !raw.is_loading {
                return decode(raw);
            }
            if self.rx.changed().await.is_err() {
                return self.current();
            }
        }
    }
}

fn decode<T: DeserializeOwned>(raw: QueryState<Value>) -> QueryState<T> {
    let QueryState {
        data,
        is_loading,
        error,
    } = raw;

    match data {
        Some(value) => match serde_json::from_value::<T>(value) {
            Ok(data) => QueryState {
                data: Some(data),
                is_loading,
                error,
            },
            Err(err) => QueryState {
                data: None,
                is_loading,
                error: Some(ApiError::Decode(err.to_string())),
            },
        },
        None => QueryState {
            data: None,
            is_loading,
            error,
        },
    }
}
