//! The load, decode, correct and recognize pipeline for one container.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

use super::guard::{SessionGuard, Teardown};
use super::{SessionError, SessionEvent, SessionParams};
use crate::config::ViewerConfig;
use crate::container::{load_buffer_with_limit, scan, ImageBuffer, SubImageRange};
use crate::decode::{decode_bounded, DecodeError, DecodeOptions, DecodedImage};
use crate::orient::{orientation_or_normal, Orientation};
use crate::pager::PagedImageCache;
use crate::recognize::{CodeDetector, RecognitionCoordinator};

/// Entry point for viewing one container.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewingSession;

impl ViewingSession {
    /// Start a session for `params` on the current Tokio runtime.
    ///
    /// Returns a handle for teardown and the receiver the interactive thread
    /// drains. The session ends with exactly one `Completed` or `Failed` event
    /// unless it is cancelled first.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start<D>(
        params: SessionParams,
        config: &ViewerConfig,
        detector: D,
    ) -> (SessionHandle, UnboundedReceiver<SessionEvent>)
    where
        D: CodeDetector + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let teardown = Arc::new(Teardown::default());
        let cache = PagedImageCache::new();
        let guard = SessionGuard::new(teardown.clone(), tx, cache.clone());

        let pipeline = Pipeline {
            params,
            options: config.decode_options(),
            max_file_size: config.max_file_size,
            coordinator: Arc::new(RecognitionCoordinator::new(
                detector,
                config.reference_code(),
            )),
            guard,
        };
        let task = tokio::spawn(pipeline.drive());

        let handle = SessionHandle {
            teardown,
            cache,
            task: Some(task),
        };
        (handle, rx)
    }
}

/// Owner-side handle of a running session.
///
/// Dropping the handle tears the session down.
#[derive(Debug)]
pub struct SessionHandle {
    teardown: Arc<Teardown>,
    cache: PagedImageCache,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Tear the session down. No page is appended and no event is sent once
    /// this returns.
    pub fn cancel(&self) {
        self.teardown.cancel();
        if let Some(task) = &self.task {
            task.abort();
        }
        log::debug!("Session cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.teardown.is_cancelled()
    }

    /// Pages decoded so far.
    pub fn cache(&self) -> &PagedImageCache {
        &self.cache
    }

    /// Wait for the session task to finish.
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    log::error!("Session task failed: {}", err);
                }
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.teardown.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct Pipeline<D> {
    params: SessionParams,
    options: DecodeOptions,
    max_file_size: u64,
    coordinator: Arc<RecognitionCoordinator<D>>,
    guard: SessionGuard,
}

impl<D: CodeDetector + 'static> Pipeline<D> {
    async fn drive(self) {
        let guard = self.guard.clone();
        match self.run().await {
            Ok(()) => {
                guard.emit(SessionEvent::Completed);
            }
            Err(SessionError::Cancelled) => log::debug!("Session stopped after teardown"),
            Err(err) => {
                log::error!("Session failed: {}", err);
                guard.emit(SessionEvent::Failed(err));
            }
        }
    }

    async fn run(self) -> Result<(), SessionError> {
        let Pipeline {
            params,
            options,
            max_file_size,
            coordinator,
            guard,
        } = self;

        let path = params.path.clone();
        let buffer = blocking(move || load_buffer_with_limit(&path, max_file_size)).await??;
        let ranges = scan(&buffer)?;
        let (&primary_range, secondary_ranges) = ranges
            .split_first()
            .ok_or_else(|| SessionError::Worker("scan returned no ranges".to_string()))?;

        if !params.has_secondary && !secondary_ranges.is_empty() {
            log::debug!(
                "Ignoring {} extra sub-image(s) in {}",
                secondary_ranges.len(),
                params.path.display()
            );
        }
        if params.has_secondary && secondary_ranges.is_empty() {
            log::warn!(
                "Secondary image expected but {} holds a single image",
                params.path.display()
            );
        }

        if guard.is_cancelled() {
            return Err(SessionError::Cancelled);
        }

        let orientation = params.orientation;
        let primary = {
            let buffer = buffer.clone();
            blocking(move || decode_primary(&buffer, primary_range, &options, orientation))
                .await??
        };
        let primary = Arc::new(primary);
        guard.append(primary.clone())?;

        let recognition = {
            let guard = guard.clone();
            tokio::spawn(async move {
                let outcome = coordinator.recognize(primary).await;
                log::info!("Recognition resolved: {:?}", outcome.verdict());
                guard.dispatch_outcome(outcome);
            })
        };

        if params.has_secondary {
            for (index, &range) in secondary_ranges.iter().enumerate() {
                let sub_image = index + 2;
                let buffer = buffer.clone();
                match blocking(move || decode_bounded(&buffer, range, &options)).await? {
                    Ok(image) => {
                        guard.append(Arc::new(image))?;
                    }
                    Err(reason) => {
                        log::warn!("Sub-image {} unavailable: {}", sub_image, reason);
                        guard.emit(SessionEvent::SecondaryUnavailable { sub_image, reason });
                    }
                }
            }
        }

        recognition
            .await
            .map_err(|err| SessionError::Worker(err.to_string()))?;
        Ok(())
    }
}

/// Decode the primary sub-image and apply the capture orientation.
///
/// Without an explicit orientation the EXIF tag of the primary image is used.
fn decode_primary(
    buffer: &ImageBuffer,
    range: SubImageRange,
    options: &DecodeOptions,
    orientation: Option<Orientation>,
) -> Result<DecodedImage, DecodeError> {
    let decoded = decode_bounded(buffer, range, options)?;
    let orientation = orientation.unwrap_or_else(|| {
        buffer
            .slice(range)
            .map(orientation_or_normal)
            .unwrap_or_default()
    });
    let transform = orientation.transform();
    if transform.is_identity() {
        return Ok(decoded);
    }
    log::debug!("Correcting primary image for {:?}", orientation);
    Ok(transform.correct(&decoded))
}

async fn blocking<T, F>(f: F) -> Result<T, SessionError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| SessionError::Worker(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerError;
    use crate::recognize::{
        Barcode, BarcodeFormat, DetectError, RecognitionOutcome, DEFAULT_REFERENCE_CODE,
    };
    use crate::test_support::{container, encode_jpeg, gradient_image, with_exif_orientation};
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tokio::sync::Notify;

    struct FixedDetector(Result<Vec<Barcode>, DetectError>);

    impl CodeDetector for FixedDetector {
        async fn detect(&self, _image: Arc<DecodedImage>) -> Result<Vec<Barcode>, DetectError> {
            self.0.clone()
        }
    }

    /// Detector that waits for the test to open the gate.
    struct GatedDetector {
        gate: Arc<Notify>,
    }

    impl CodeDetector for GatedDetector {
        async fn detect(&self, _image: Arc<DecodedImage>) -> Result<Vec<Barcode>, DetectError> {
            self.gate.notified().await;
            Ok(vec![Barcode::new(DEFAULT_REFERENCE_CODE, BarcodeFormat::Ean13)])
        }
    }

    fn no_code() -> FixedDetector {
        FixedDetector(Ok(vec![]))
    }

    fn unique_temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("depthview-session-{nanos}-{name}"))
    }

    fn write_container(name: &str, parts: &[&[u8]]) -> PathBuf {
        let path = unique_temp_path(name);
        std::fs::write(&path, container(parts)).unwrap();
        path
    }

    async fn collect(mut rx: UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let drain = async {
            while let Some(event) = rx.recv().await {
                events.push(event);
            }
        };
        tokio::time::timeout(Duration::from_secs(30), drain)
            .await
            .expect("session should close its channel");
        events
    }

    fn pages(events: &[SessionEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::PageAppended { page } => Some(*page),
                _ => None,
            })
            .collect()
    }

    fn outcomes(events: &[SessionEvent]) -> Vec<&RecognitionOutcome> {
        events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::Recognized(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_primary_and_secondary_in_order() {
        let primary = encode_jpeg(&gradient_image(40, 30));
        let depth = encode_jpeg(&gradient_image(20, 16));
        let path = write_container("two.jpg", &[&primary, &depth]);

        let params = SessionParams::new(&path)
            .with_orientation(Orientation::Normal)
            .with_secondary(true);
        let (handle, rx) = ViewingSession::start(params, &ViewerConfig::default(), no_code());
        let events = collect(rx).await;

        assert_eq!(pages(&events), vec![1, 2]);
        assert_eq!(outcomes(&events), vec![&RecognitionOutcome::NoCode]);
        assert!(matches!(events.last(), Some(SessionEvent::Completed)));

        let cache = handle.cache();
        assert_eq!(cache.count(), 2);
        let first = cache.page(1).unwrap();
        assert_eq!((first.width, first.height), (40, 30));
        let second = cache.page(2).unwrap();
        assert_eq!((second.width, second.height), (20, 16));

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_secondary_ignored_without_flag() {
        let primary = encode_jpeg(&gradient_image(16, 16));
        let depth = encode_jpeg(&gradient_image(8, 8));
        let path = write_container("primary-only.jpg", &[&primary, &depth]);

        let (handle, rx) = ViewingSession::start(
            SessionParams::new(&path),
            &ViewerConfig::default(),
            no_code(),
        );
        let events = collect(rx).await;

        assert_eq!(pages(&events), vec![1]);
        assert_eq!(handle.cache().count(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_orientation_applied_to_primary_only() {
        let primary = encode_jpeg(&gradient_image(40, 20));
        let depth = encode_jpeg(&gradient_image(16, 8));
        let path = write_container("rotated.jpg", &[&primary, &depth]);

        let params = SessionParams::new(&path)
            .with_orientation(Orientation::Rotate90CW)
            .with_secondary(true);
        let (handle, rx) = ViewingSession::start(params, &ViewerConfig::default(), no_code());
        collect(rx).await;

        let first = handle.cache().page(1).unwrap();
        assert_eq!((first.width, first.height), (20, 40));
        let second = handle.cache().page(2).unwrap();
        assert_eq!((second.width, second.height), (16, 8));

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_exif_orientation_fallback() {
        let primary = with_exif_orientation(&encode_jpeg(&gradient_image(24, 12)), 6);
        let path = write_container("exif.jpg", &[&primary]);

        let (handle, rx) = ViewingSession::start(
            SessionParams::new(&path),
            &ViewerConfig::default(),
            no_code(),
        );
        collect(rx).await;

        let first = handle.cache().page(1).unwrap();
        assert_eq!((first.width, first.height), (12, 24));

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_primary_downsampled_to_cap() {
        let primary = encode_jpeg(&gradient_image(120, 90));
        let path = write_container("large.jpg", &[&primary]);

        let config = ViewerConfig {
            downsample_cap: 30,
            ..ViewerConfig::default()
        };
        let (handle, rx) = ViewingSession::start(SessionParams::new(&path), &config, no_code());
        collect(rx).await;

        // factor = max(120/30+1, 90/30+1) = 5
        let first = handle.cache().page(1).unwrap();
        assert_eq!((first.width, first.height), (24, 18));

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_match_found_outcome() {
        let primary = encode_jpeg(&gradient_image(8, 8));
        let path = write_container("match.jpg", &[&primary]);
        let code = Barcode::new(DEFAULT_REFERENCE_CODE, BarcodeFormat::Ean13);

        let (_handle, rx) = ViewingSession::start(
            SessionParams::new(&path),
            &ViewerConfig::default(),
            FixedDetector(Ok(vec![code.clone()])),
        );
        let events = collect(rx).await;

        assert_eq!(outcomes(&events), vec![&RecognitionOutcome::MatchFound(code)]);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_detector_failure_reported_once() {
        let primary = encode_jpeg(&gradient_image(8, 8));
        let path = write_container("detect-fail.jpg", &[&primary]);

        let (_handle, rx) = ViewingSession::start(
            SessionParams::new(&path),
            &ViewerConfig::default(),
            FixedDetector(Err(DetectError("offline".into()))),
        );
        let events = collect(rx).await;

        assert_eq!(
            outcomes(&events),
            vec![&RecognitionOutcome::Failed(DetectError("offline".into()))]
        );
        assert!(matches!(events.last(), Some(SessionEvent::Completed)));

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_corrupt_secondary_is_not_fatal() {
        let primary = encode_jpeg(&gradient_image(16, 12));
        let garbage: &[u8] = &[0x00, 0x11, 0x22, 0xFF, 0xD9];
        let path = write_container("bad-depth.jpg", &[&primary, garbage]);

        let params = SessionParams::new(&path).with_secondary(true);
        let (handle, rx) = ViewingSession::start(params, &ViewerConfig::default(), no_code());
        let events = collect(rx).await;

        assert_eq!(pages(&events), vec![1]);
        assert!(events.iter().any(|event| matches!(
            event,
            SessionEvent::SecondaryUnavailable { sub_image: 2, .. }
        )));
        assert_eq!(outcomes(&events).len(), 1);
        assert!(matches!(events.last(), Some(SessionEvent::Completed)));
        assert_eq!(handle.cache().count(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let path = unique_temp_path("missing.jpg");
        let (handle, rx) = ViewingSession::start(
            SessionParams::new(&path),
            &ViewerConfig::default(),
            no_code(),
        );
        let events = collect(rx).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            SessionEvent::Failed(SessionError::Container(ContainerError::Io { .. }))
        ));
        assert!(handle.cache().is_empty());
    }

    #[tokio::test]
    async fn test_no_delimiter_fails() {
        let path = write_container("no-marker.bin", &[&[0x01, 0x02, 0x03]]);
        let (_handle, rx) = ViewingSession::start(
            SessionParams::new(&path),
            &ViewerConfig::default(),
            no_code(),
        );
        let events = collect(rx).await;

        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Failed(SessionError::Container(
                ContainerError::NoDelimiterFound { scanned: 3 }
            ))]
        ));

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_corrupt_primary_fails() {
        let path = write_container("bad-primary.jpg", &[&[0x00, 0x01, 0xFF, 0xD9]]);
        let (handle, rx) = ViewingSession::start(
            SessionParams::new(&path),
            &ViewerConfig::default(),
            no_code(),
        );
        let events = collect(rx).await;

        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Failed(SessionError::PrimaryDecode(_))]
        ));
        assert!(handle.cache().is_empty());

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_cancel_suppresses_outcome() {
        let primary = encode_jpeg(&gradient_image(8, 8));
        let path = write_container("cancel.jpg", &[&primary]);
        let gate = Arc::new(Notify::new());

        let (handle, mut rx) = ViewingSession::start(
            SessionParams::new(&path),
            &ViewerConfig::default(),
            GatedDetector { gate: gate.clone() },
        );

        let first = rx.recv().await;
        assert!(matches!(first, Some(SessionEvent::PageAppended { page: 1 })));

        handle.cancel();
        assert!(handle.is_cancelled());
        gate.notify_one();

        let rest = collect(rx).await;
        assert!(rest.is_empty(), "unexpected events after teardown: {rest:?}");
        assert_eq!(handle.cache().count(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_drop_handle_tears_down() {
        let primary = encode_jpeg(&gradient_image(8, 8));
        let path = write_container("drop.jpg", &[&primary]);
        let gate = Arc::new(Notify::new());

        let (handle, mut rx) = ViewingSession::start(
            SessionParams::new(&path),
            &ViewerConfig::default(),
            GatedDetector { gate: gate.clone() },
        );
        let cache = handle.cache().clone();

        assert!(matches!(
            rx.recv().await,
            Some(SessionEvent::PageAppended { page: 1 })
        ));
        drop(handle);
        gate.notify_one();

        assert!(collect(rx).await.is_empty());
        assert_eq!(cache.count(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_join_after_completion() {
        let primary = encode_jpeg(&gradient_image(8, 8));
        let path = write_container("join.jpg", &[&primary]);

        let (handle, rx) = ViewingSession::start(
            SessionParams::new(&path),
            &ViewerConfig::default(),
            no_code(),
        );
        handle.join().await;

        let events = collect(rx).await;
        assert!(matches!(events.last(), Some(SessionEvent::Completed)));

        std::fs::remove_file(&path).ok();
    }
}
