//! Camera stream ownership
//!
//! The camera is the one resource in the app with an explicit
//! acquire/release discipline: a [`CameraFeed`] exclusively owns its stream
//! for its lifetime, stops all tracks exactly once per open/close cycle,
//! and stops on drop so abrupt teardown cannot leak a live stream.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// A platform image stream. Implementations wrap whatever capture backend
/// is available (or a picked still image).
pub trait CameraStream: Send {
    /// Latest frame as encoded image bytes, if one is available.
    fn frame(&mut self) -> Option<Vec<u8>>;

    /// Stop all tracks and release the underlying device.
    fn stop_tracks(&mut self);
}

/// Stream over an already-loaded still image (e.g. a picked file); a single
/// frame that is handed out once.
pub struct StillImageStream {
    bytes: Option<Vec<u8>>,
}

impl StillImageStream {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes: Some(bytes) }
    }
}

impl CameraStream for StillImageStream {
    fn frame(&mut self) -> Option<Vec<u8>> {
        self.bytes.take()
    }

    fn stop_tracks(&mut self) {
        self.bytes = None;
    }
}

/// Exclusive owner of an open camera stream.
pub struct CameraFeed {
    stream: Option<Box<dyn CameraStream>>,
}

impl CameraFeed {
    /// Take ownership of a freshly opened stream.
    pub fn open(stream: Box<dyn CameraStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    /// Whether the stream is still live.
    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }

    /// Capture the current frame as a base64 payload ready for the chat
    /// endpoint.
    pub fn capture_base64(&mut self) -> Option<String> {
        let frame = self.stream.as_mut()?.frame()?;
        Some(BASE64.encode(frame))
    }

    /// Stop the stream. Safe to call more than once; tracks are only
    /// stopped on the first call.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
        }
    }
}

impl Drop for CameraFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockStream {
        stops: Arc<AtomicUsize>,
    }

    impl CameraStream for MockStream {
        fn frame(&mut self) -> Option<Vec<u8>> {
            Some(vec![0xFF, 0xD8, 0xFF])
        }

        fn stop_tracks(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn tracks_stop_exactly_once_per_cycle() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut feed = CameraFeed::open(Box::new(MockStream {
            stops: stops.clone(),
        }));
        assert!(feed.is_live());

        feed.stop();
        feed.stop(); // repeated stop is a no-op
        drop(feed); // drop after stop does not stop again
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn abrupt_teardown_stops_tracks() {
        let stops = Arc::new(AtomicUsize::new(0));
        {
            let feed = CameraFeed::open(Box::new(MockStream {
                stops: stops.clone(),
            }));
            assert!(feed.is_live());
            // dropped without an explicit stop
        }
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn capture_encodes_the_frame() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut feed = CameraFeed::open(Box::new(MockStream {
            stops: stops.clone(),
        }));
        let payload = feed.capture_base64().unwrap();
        assert_eq!(payload, BASE64.encode([0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn still_image_stream_hands_out_one_frame() {
        let mut feed = CameraFeed::open(Box::new(StillImageStream::new(vec![1, 2, 3])));
        assert!(feed.capture_base64().is_some());
        assert!(feed.capture_base64().is_none());
    }
}
