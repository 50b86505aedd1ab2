use std::collections::{HashMap, VecDeque};

use crate::assets::{AssetFetcher, ImageRef, PreparedImage, decode::decode_asset};

/// Lifecycle of one cached image reference.
#[derive(Clone, Debug)]
pub enum LoadState {
    /// Queued for decode; no pixels yet.
    Pending,
    /// Decoded and drawable.
    Ready(PreparedImage),
    /// Fetch or decode failed. Renderers draw nothing for this layer.
    Unavailable,
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn image(&self) -> Option<&PreparedImage> {
        match self {
            Self::Ready(img) => Some(img),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Ready,
    Unavailable,
}

/// Completion notification produced by [`ImageCache::pump`].
#[derive(Clone, Debug)]
pub struct LoadEvent {
    pub image_ref: ImageRef,
    pub outcome: LoadOutcome,
}

struct Entry {
    state: LoadState,
    job: u64,
}

/// Decode-once image cache with cooperative loading.
///
/// `request` registers interest in a ref; repeated requests for the same ref
/// share the single pending decode. The host event loop calls `pump` to run
/// one queued decode at a time; the result is applied only if the entry still
/// exists and still belongs to the job that queued it (stale-result discard),
/// so a superseded selection can never overwrite a newer one.
pub struct ImageCache {
    entries: HashMap<ImageRef, Entry>,
    queue: VecDeque<(ImageRef, u64)>,
    decode_counts: HashMap<ImageRef, u64>,
    next_job: u64,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            queue: VecDeque::new(),
            decode_counts: HashMap::new(),
            next_job: 0,
        }
    }

    /// Register interest in `image_ref` and return its current state.
    ///
    /// A ref that is already pending, ready, or unavailable is not re-queued.
    pub fn request(&mut self, image_ref: &ImageRef) -> &LoadState {
        if !self.entries.contains_key(image_ref) {
            let job = self.next_job;
            self.next_job += 1;
            self.entries.insert(
                image_ref.clone(),
                Entry {
                    state: LoadState::Pending,
                    job,
                },
            );
            self.queue.push_back((image_ref.clone(), job));
        }
        &self.entries[image_ref].state
    }

    pub fn state(&self, image_ref: &ImageRef) -> Option<&LoadState> {
        self.entries.get(image_ref).map(|e| &e.state)
    }

    pub fn ready_image(&self, image_ref: &ImageRef) -> Option<&PreparedImage> {
        self.state(image_ref).and_then(LoadState::image)
    }

    /// Drop the cache entry for `image_ref`.
    ///
    /// An in-flight decode for the dropped entry is discarded when it
    /// completes; a later `request` starts a fresh load under a new job id.
    pub fn invalidate(&mut self, image_ref: &ImageRef) {
        self.entries.remove(image_ref);
    }

    /// How many times `image_ref` has actually been decoded.
    pub fn decode_count(&self, image_ref: &ImageRef) -> u64 {
        self.decode_counts.get(image_ref).copied().unwrap_or(0)
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Run at most one queued decode. Returns the completion event, or `None`
    /// when nothing (current) was queued.
    #[tracing::instrument(skip_all)]
    pub fn pump(&mut self, fetcher: &dyn AssetFetcher) -> Option<LoadEvent> {
        while let Some((image_ref, job)) = self.queue.pop_front() {
            let still_current = self
                .entries
                .get(&image_ref)
                .is_some_and(|e| e.job == job && e.state.is_pending());
            if !still_current {
                tracing::debug!(%image_ref, "discarding stale decode job");
                continue;
            }

            *self.decode_counts.entry(image_ref.clone()).or_insert(0) += 1;
            let state = match fetcher
                .fetch(&image_ref)
                .and_then(|bytes| decode_asset(&image_ref, &bytes))
            {
                Ok(img) => LoadState::Ready(img),
                Err(err) => {
                    tracing::warn!(%image_ref, error = %err, "image load failed; marking unavailable");
                    LoadState::Unavailable
                }
            };

            let outcome = match &state {
                LoadState::Ready(_) => LoadOutcome::Ready,
                _ => LoadOutcome::Unavailable,
            };

            // Re-check identity: the entry may have been invalidated by a
            // selection change between pop and decode completion.
            let applied = match self.entries.get_mut(&image_ref) {
                Some(entry) if entry.job == job && entry.state.is_pending() => {
                    entry.state = state;
                    true
                }
                _ => false,
            };
            if !applied {
                tracing::debug!(%image_ref, "decode result superseded; dropped");
                continue;
            }

            return Some(LoadEvent { image_ref, outcome });
        }
        None
    }

    /// Drain the queue, collecting every completion event.
    pub fn pump_all(&mut self, fetcher: &dyn AssetFetcher) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Some(ev) = self.pump(fetcher) {
            events.push(ev);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::{PreviewError, PreviewResult};

    struct MemFetcher(HashMap<String, Vec<u8>>);

    impl AssetFetcher for MemFetcher {
        fn fetch(&self, image_ref: &ImageRef) -> PreviewResult<Vec<u8>> {
            self.0
                .get(image_ref.source())
                .cloned()
                .ok_or_else(|| PreviewError::decode("missing"))
        }
    }

    fn png_1x1(rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn fetcher_with(name: &str, bytes: Vec<u8>) -> MemFetcher {
        let mut map = HashMap::new();
        map.insert(name.to_string(), bytes);
        MemFetcher(map)
    }

    #[test]
    fn repeated_requests_decode_once() {
        let r = ImageRef::new("img.png").unwrap();
        let fetcher = fetcher_with("img.png", png_1x1([1, 2, 3, 255]));

        let mut cache = ImageCache::new();
        cache.request(&r);
        cache.request(&r);
        let events = cache.pump_all(&fetcher);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome, LoadOutcome::Ready);

        cache.request(&r);
        assert!(cache.pump(&fetcher).is_none());
        assert_eq!(cache.decode_count(&r), 1);
        assert!(cache.ready_image(&r).is_some());
    }

    #[test]
    fn failed_decode_resolves_unavailable_without_error() {
        let r = ImageRef::new("broken.png").unwrap();
        let fetcher = fetcher_with("broken.png", b"not a png".to_vec());

        let mut cache = ImageCache::new();
        cache.request(&r);
        let ev = cache.pump(&fetcher).unwrap();
        assert_eq!(ev.outcome, LoadOutcome::Unavailable);
        assert!(matches!(cache.state(&r), Some(LoadState::Unavailable)));
    }

    #[test]
    fn missing_asset_resolves_unavailable() {
        let r = ImageRef::new("absent.png").unwrap();
        let fetcher = MemFetcher(HashMap::new());

        let mut cache = ImageCache::new();
        cache.request(&r);
        let ev = cache.pump(&fetcher).unwrap();
        assert_eq!(ev.outcome, LoadOutcome::Unavailable);
    }

    #[test]
    fn invalidated_entry_discards_inflight_decode() {
        let r = ImageRef::new("img.png").unwrap();
        let fetcher = fetcher_with("img.png", png_1x1([9, 9, 9, 255]));

        let mut cache = ImageCache::new();
        cache.request(&r);
        cache.invalidate(&r);

        // The queued job is stale: pumping must not resurrect the entry.
        assert!(cache.pump(&fetcher).is_none());
        assert!(cache.state(&r).is_none());
        assert_eq!(cache.decode_count(&r), 0);
    }

    #[test]
    fn reload_after_invalidate_uses_fresh_job() {
        let r = ImageRef::new("img.png").unwrap();
        let fetcher = fetcher_with("img.png", png_1x1([4, 5, 6, 255]));

        let mut cache = ImageCache::new();
        cache.request(&r);
        cache.invalidate(&r);
        cache.request(&r);

        let events = cache.pump_all(&fetcher);
        assert_eq!(events.len(), 1);
        assert_eq!(cache.decode_count(&r), 1);
        assert!(cache.ready_image(&r).is_some());
    }
}
