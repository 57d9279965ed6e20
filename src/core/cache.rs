use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_CAPACITY: usize = 32;

/// Source of the current instant for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_nanos
            .fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

struct CacheValue<V> {
    value: V,
    inserted_at: Instant,
    last_used: u64,
}

struct CacheState<K, V> {
    entries: HashMap<K, CacheValue<V>>,
    tick: u64,
}

impl<K: Eq + Hash + Clone, V> CacheState<K, V> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn least_recently_used(&self) -> Option<K> {
        self.entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone())
    }
}

/// In-memory cache with a fixed time-to-live and a bounded entry count.
///
/// Entries older than `ttl` are treated as absent. When the cache is full the
/// least recently used entry is evicted to make room.
#[derive(Clone)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<CacheState<K, V>>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self::with_clock(ttl, capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                tick: 0,
            })),
            ttl,
            capacity: capacity.max(1),
            clock,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut cache = self.inner.lock().await;
        let tick = cache.next_tick();

        let expired = match cache.entries.get_mut(key) {
            Some(entry) if now.duration_since(entry.inserted_at) >= self.ttl => true,
            Some(entry) => {
                entry.last_used = tick;
                debug!("Cache HIT for key: {:?}", key);
                return Some(entry.value.clone());
            }
            None => false,
        };

        if expired {
            debug!("Cache entry expired for key: {:?}", key);
            cache.entries.remove(key);
        } else {
            debug!("Cache MISS for key: {:?}", key);
        }
        None
    }

    pub async fn put(&self, key: K, value: V) {
        let now = self.clock.now();
        let mut cache = self.inner.lock().await;
        let tick = cache.next_tick();

        // Expired entries never count against capacity
        let ttl = self.ttl;
        cache.entries.retain(|k, entry| {
            let live = now.duration_since(entry.inserted_at) < ttl;
            if !live {
                debug!("Cache entry expired for key: {:?}", k);
            }
            live
        });

        if !cache.entries.contains_key(&key) && cache.entries.len() >= self.capacity {
            if let Some(evicted) = cache.least_recently_used() {
                debug!("Cache EVICT for key: {:?}", evicted);
                cache.entries.remove(&evicted);
            }
        }

        debug!("Cache PUT for key: {:?}", key);
        cache.entries.insert(
            key,
            CacheValue {
                value,
                inserted_at: now,
                last_used: tick,
            },
        );
    }

    pub async fn remove(&self, key: &K) {
        let mut cache = self.inner.lock().await;
        cache.entries.remove(key);
        debug!("Cache REMOVE for key: {:?}", key);
    }

    pub async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.entries.clear();
        debug!("Cache CLEAR");
    }

    /// Number of stored entries, expired ones included until they are touched.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}
