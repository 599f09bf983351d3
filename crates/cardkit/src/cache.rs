//! Memoizing texture cache keyed by resource id.
//!
//! Every id is loaded at most once for the lifetime of the cache. The first
//! request inserts a `Pending` slot under the lock and dispatches the load;
//! later requests for the same id see that slot and never reach the loader.
//! Loads either run inline on the caller's thread or on the rayon pool, and
//! their result replaces the slot under the same lock, so a reader sees either
//! the fallback texture or the finished one, never a partial state.
//!
//! Failed ids stay failed: the fallback is served for them permanently and a
//! [`ResourceLoadFailure`] is pushed to the failure channel.

use crate::{
    catalog::ResourceId,
    error::{LoadError, ResourceLoadFailure},
};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};

/// Decoded RGBA8 pixels, row-major, no padding.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, LoadError> {
        let tex = Self { width, height, rgba };
        tex.validate()?;
        Ok(tex)
    }

    /// Checks that the pixel buffer is non-empty and exactly `width * height * 4` bytes.
    pub fn validate(&self) -> Result<(), LoadError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.rgba.len() != expected || expected == 0 {
            return Err(LoadError::BadDimensions {
                expected,
                got: self.rgba.len(),
            });
        }
        Ok(())
    }

    /// Whether both sides are at most `max` pixels.
    pub fn fits(&self, max: u32) -> bool {
        self.width <= max && self.height <= max
    }

    /// A `size`×`size` checkerboard with `cell`-pixel squares.
    pub fn checkerboard(size: u32, cell: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = cell.max(1);
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let px = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
                rgba.extend_from_slice(&px);
            }
        }
        Self {
            width: size,
            height: size,
            rgba,
        }
    }

    /// Placeholder served while a load is pending or after it failed.
    pub fn fallback() -> Self {
        Self::checkerboard(8, 2, [255, 0, 255, 255], [16, 16, 16, 255])
    }
}

impl std::fmt::Debug for TextureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Largest texture side accepted until the host reports its own limit.
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// Host-provided source of decoded image data.
pub trait ResourceLoader: Send + Sync + 'static {
    fn load(&self, id: &ResourceId) -> Result<TextureData, LoadError>;
}

/// Where loads execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// On the thread that first requests the id.
    Inline,
    /// On the rayon global pool.
    #[default]
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Unrequested,
    Pending,
    Ready,
    Failed,
}

enum Slot {
    Pending,
    Ready(Arc<TextureData>),
    Failed,
}

struct Shared {
    slots: Mutex<HashMap<ResourceId, Slot>>,
    in_flight: AtomicUsize,
    revision: AtomicU64,
    max_dimension: AtomicU32,
    failures: Sender<ResourceLoadFailure>,
}

pub struct ResourceCache {
    loader: Arc<dyn ResourceLoader>,
    mode: LoadMode,
    fallback: Arc<TextureData>,
    shared: Arc<Shared>,
    failures_rx: Receiver<ResourceLoadFailure>,
}

impl ResourceCache {
    pub fn new(loader: Arc<dyn ResourceLoader>, mode: LoadMode) -> Self {
        Self::with_fallback(loader, mode, TextureData::fallback())
    }

    pub fn with_fallback(
        loader: Arc<dyn ResourceLoader>,
        mode: LoadMode,
        fallback: TextureData,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            loader,
            mode,
            fallback: Arc::new(fallback),
            shared: Arc::new(Shared {
                slots: Mutex::new(HashMap::new()),
                in_flight: AtomicUsize::new(0),
                revision: AtomicU64::new(0),
                max_dimension: AtomicU32::new(DEFAULT_MAX_DIMENSION),
                failures: tx,
            }),
            failures_rx: rx,
        }
    }

    /// Returns the texture for `id`, or the fallback while it is pending or
    /// if it failed. Never blocks on a load issued by another caller.
    pub fn get(&self, id: &ResourceId) -> Arc<TextureData> {
        // Inline loads have already settled the slot by the time this returns.
        self.request(id);
        self.peek(id)
    }

    /// Requests every id without waiting for any of them.
    pub fn preload<'a, I>(&self, ids: I)
    where
        I: IntoIterator<Item = &'a ResourceId>,
    {
        let mut issued = 0usize;
        for id in ids {
            if self.request(id) {
                issued += 1;
            }
        }
        log::info!("Preloading {} texture(s) ({:?})", issued, self.mode);
    }

    pub fn status(&self, id: &ResourceId) -> SlotStatus {
        match self.shared.slots.lock().get(id) {
            None => SlotStatus::Unrequested,
            Some(Slot::Pending) => SlotStatus::Pending,
            Some(Slot::Ready(_)) => SlotStatus::Ready,
            Some(Slot::Failed) => SlotStatus::Failed,
        }
    }

    /// True when no load is in flight.
    pub fn is_settled(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire) == 0
    }

    /// Bumped every time a load finishes, successfully or not.
    pub fn revision(&self) -> u64 {
        self.shared.revision.load(Ordering::Acquire)
    }

    pub fn failed_count(&self) -> usize {
        self.shared
            .slots
            .lock()
            .values()
            .filter(|s| matches!(s, Slot::Failed))
            .count()
    }

    /// Loads finishing after this call reject textures with a side above `max`.
    pub fn set_max_dimension(&self, max: u32) {
        self.shared.max_dimension.store(max.max(1), Ordering::Release);
    }

    pub fn max_dimension(&self) -> u32 {
        self.shared.max_dimension.load(Ordering::Acquire)
    }

    pub fn fallback(&self) -> &Arc<TextureData> {
        &self.fallback
    }

    /// Receiver for load failures. Every clone sees each failure once between them.
    pub fn failures(&self) -> Receiver<ResourceLoadFailure> {
        self.failures_rx.clone()
    }

    fn peek(&self, id: &ResourceId) -> Arc<TextureData> {
        match self.shared.slots.lock().get(id) {
            Some(Slot::Ready(tex)) => Arc::clone(tex),
            _ => Arc::clone(&self.fallback),
        }
    }

    /// Inserts a pending slot and dispatches the load if `id` was never seen.
    /// Returns whether a load was issued.
    fn request(&self, id: &ResourceId) -> bool {
        {
            let mut slots = self.shared.slots.lock();
            if slots.contains_key(id) {
                return false;
            }
            slots.insert(id.clone(), Slot::Pending);
            self.shared.in_flight.fetch_add(1, Ordering::AcqRel);
        }

        log::debug!("Loading texture '{}'", id);

        let shared = Arc::clone(&self.shared);
        let loader = Arc::clone(&self.loader);
        let id = id.clone();
        match self.mode {
            LoadMode::Inline => run_load(&shared, loader.as_ref(), id),
            LoadMode::Background => {
                rayon::spawn(move || run_load(&shared, loader.as_ref(), id));
            }
        }
        true
    }
}

fn run_load(shared: &Shared, loader: &dyn ResourceLoader, id: ResourceId) {
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| loader.load(&id)))
        .unwrap_or_else(|_| Err(LoadError::Decode("loader panicked".into())))
        .and_then(|tex| {
            tex.validate()?;
            let max = shared.max_dimension.load(Ordering::Acquire);
            if !tex.fits(max) {
                return Err(LoadError::TooLarge {
                    width: tex.width,
                    height: tex.height,
                    max,
                });
            }
            Ok(tex)
        });

    let failure = {
        let mut slots = shared.slots.lock();
        match result {
            Ok(tex) => {
                log::debug!("Loaded texture '{}' ({}x{})", id, tex.width, tex.height);
                slots.insert(id, Slot::Ready(Arc::new(tex)));
                None
            }
            Err(reason) => {
                slots.insert(id.clone(), Slot::Failed);
                Some(ResourceLoadFailure { id, reason })
            }
        }
    };

    shared.revision.fetch_add(1, Ordering::AcqRel);
    shared.in_flight.fetch_sub(1, Ordering::AcqRel);

    if let Some(failure) = failure {
        log::warn!("{}; using fallback texture", failure);
        // Nobody listening is fine.
        let _ = shared.failures.send(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Counts calls per id; ids starting with "missing" fail.
    #[derive(Default)]
    struct CountingLoader {
        calls: Mutex<HashMap<String, usize>>,
        delay: Option<Duration>,
    }

    impl CountingLoader {
        fn calls(&self, id: &str) -> usize {
            self.calls.lock().get(id).copied().unwrap_or(0)
        }
    }

    impl ResourceLoader for CountingLoader {
        fn load(&self, id: &ResourceId) -> Result<TextureData, LoadError> {
            *self.calls.lock().entry(id.to_string()).or_default() += 1;
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            if id.as_str().starts_with("missing") {
                return Err(LoadError::NotFound(id.to_string()));
            }
            TextureData::new(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 255])
        }
    }

    fn wait_settled(cache: &ResourceCache) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cache.is_settled() {
            assert!(Instant::now() < deadline, "loads did not settle");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn inline_get_loads_once_and_returns_same_texture() {
        let loader = Arc::new(CountingLoader::default());
        let cache = ResourceCache::new(loader.clone(), LoadMode::Inline);
        let id = ResourceId::new("/art.webp");

        let a = cache.get(&id);
        let b = cache.get(&id);

        assert_eq!(loader.calls("/art.webp"), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.width, 2);
        assert_eq!(cache.status(&id), SlotStatus::Ready);
    }

    #[test]
    fn failed_load_serves_fallback_and_reports_once() {
        let loader = Arc::new(CountingLoader::default());
        let cache = ResourceCache::new(loader.clone(), LoadMode::Inline);
        let failures = cache.failures();
        let id = ResourceId::new("missing.png");

        let first = cache.get(&id);
        let second = cache.get(&id);

        assert!(Arc::ptr_eq(&first, cache.fallback()));
        assert!(Arc::ptr_eq(&second, cache.fallback()));
        assert_eq!(loader.calls("missing.png"), 1);
        assert_eq!(cache.status(&id), SlotStatus::Failed);
        assert_eq!(cache.failed_count(), 1);

        let failure = failures.try_recv().unwrap();
        assert_eq!(failure.id, id);
        assert!(matches!(failure.reason, LoadError::NotFound(_)));
        assert!(failures.try_recv().is_err());
    }

    #[test]
    fn background_requests_are_deduplicated_while_in_flight() {
        let loader = Arc::new(CountingLoader {
            delay: Some(Duration::from_millis(30)),
            ..Default::default()
        });
        let cache = ResourceCache::new(loader.clone(), LoadMode::Background);
        let id = ResourceId::new("/slow.webp");

        // Still pending: the fallback comes back immediately.
        let early = cache.get(&id);
        assert!(Arc::ptr_eq(&early, cache.fallback()));
        for _ in 0..10 {
            cache.get(&id);
        }

        wait_settled(&cache);
        assert_eq!(loader.calls("/slow.webp"), 1);
        let late = cache.get(&id);
        assert!(!Arc::ptr_eq(&late, cache.fallback()));
        assert_eq!(cache.revision(), 1);
    }

    #[test]
    fn preload_issues_each_id_once() {
        let loader = Arc::new(CountingLoader::default());
        let cache = ResourceCache::new(loader.clone(), LoadMode::Background);
        let ids: Vec<ResourceId> = ["a", "b", "a", "missing-c"]
            .into_iter()
            .map(ResourceId::new)
            .collect();

        cache.preload(&ids);
        cache.preload(&ids);
        wait_settled(&cache);

        assert_eq!(loader.calls("a"), 1);
        assert_eq!(loader.calls("b"), 1);
        assert_eq!(loader.calls("missing-c"), 1);
        assert_eq!(cache.status(&ResourceId::new("b")), SlotStatus::Ready);
        assert_eq!(cache.status(&ResourceId::new("zzz")), SlotStatus::Unrequested);
    }

    #[test]
    fn panicking_loader_degrades_to_failure() {
        struct Boom;
        impl ResourceLoader for Boom {
            fn load(&self, _: &ResourceId) -> Result<TextureData, LoadError> {
                panic!("decoder exploded");
            }
        }
        let cache = ResourceCache::new(Arc::new(Boom), LoadMode::Inline);
        let id = ResourceId::new("x");
        let tex = cache.get(&id);
        assert!(Arc::ptr_eq(&tex, cache.fallback()));
        assert_eq!(cache.status(&id), SlotStatus::Failed);
        assert!(cache.is_settled());
    }

    /// Hands back whatever texture it was built with, bypassing `TextureData::new`.
    struct Fixed(TextureData);

    impl ResourceLoader for Fixed {
        fn load(&self, _: &ResourceId) -> Result<TextureData, LoadError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn malformed_loader_output_is_a_failure() {
        let bad = TextureData {
            width: 4,
            height: 4,
            rgba: vec![0; 4],
        };
        let cache = ResourceCache::new(Arc::new(Fixed(bad)), LoadMode::Inline);
        let failures = cache.failures();
        let id = ResourceId::new("/short.webp");

        assert!(Arc::ptr_eq(&cache.get(&id), cache.fallback()));
        assert_eq!(cache.status(&id), SlotStatus::Failed);
        let failure = failures.try_recv().unwrap();
        assert!(matches!(
            failure.reason,
            LoadError::BadDimensions { expected: 64, got: 4 }
        ));
    }

    #[test]
    fn oversized_texture_is_a_failure() {
        let huge = TextureData {
            width: 16384,
            height: 16384,
            rgba: vec![0; 4],
        };
        let cache = ResourceCache::new(Arc::new(Fixed(huge)), LoadMode::Inline);
        let id = ResourceId::new("/huge.webp");
        assert!(Arc::ptr_eq(&cache.get(&id), cache.fallback()));
        assert_eq!(cache.status(&id), SlotStatus::Failed);

        let wide = TextureData::new(8, 2, vec![7; 64]).unwrap();
        let cache = ResourceCache::new(Arc::new(Fixed(wide)), LoadMode::Inline);
        cache.set_max_dimension(4);
        let failures = cache.failures();
        let id = ResourceId::new("/wide.webp");
        assert!(Arc::ptr_eq(&cache.get(&id), cache.fallback()));
        assert_eq!(cache.status(&id), SlotStatus::Failed);
        assert!(matches!(
            failures.try_recv().unwrap().reason,
            LoadError::TooLarge { width: 8, height: 2, max: 4 }
        ));
    }

    #[test]
    fn texture_within_limit_is_ready() {
        let tex = TextureData::new(4, 4, vec![9; 64]).unwrap();
        let cache = ResourceCache::new(Arc::new(Fixed(tex)), LoadMode::Inline);
        cache.set_max_dimension(4);
        let id = ResourceId::new("/ok.webp");
        assert_eq!(cache.get(&id).width, 4);
        assert_eq!(cache.status(&id), SlotStatus::Ready);
    }

    #[test]
    fn texture_data_validates_length() {
        assert!(TextureData::new(2, 2, vec![0; 15]).is_err());
        assert!(TextureData::new(0, 0, vec![]).is_err());
        let fb = TextureData::fallback();
        assert_eq!(fb.rgba.len(), (fb.width * fb.height * 4) as usize);
    }
}
