use parking_lot::Mutex;

use crate::models::camera_models::PixelFormat;
use crate::models::frame::FrameBuffer;
use crate::pipeline::convert;
use crate::pipeline::throttle::FrameThrottle;
use crate::traits::capture_backend::FrameSink;

/// Receives raw frame buffers from the platform backend, applies the frame
/// throttle, normalizes the pixel format, and publishes to subscribers.
///
/// `handle_frame` runs on the backend's delivery thread; subscribers are
/// invoked synchronously and must copy or fully consume the buffer before
/// returning. The scratch buffer for format conversion is owned here rather
/// than captured by the delivery closure, so its reuse is explicit state.
pub struct FrameDeliveryPipeline {
    throttle: FrameThrottle,
    scratch: Mutex<Vec<u8>>,
    subscribers: Mutex<Vec<FrameSink>>,
}

impl FrameDeliveryPipeline {
    pub fn new(frame_divisor: u32) -> Self {
        Self {
            throttle: FrameThrottle::new(frame_divisor),
            scratch: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a subscriber (barcode scanner, UI overlay, ...).
    pub fn subscribe(&self, sink: FrameSink) {
        self.subscribers.lock().push(sink);
    }

    pub fn set_frame_divisor(&self, divisor: u32) {
        self.throttle.set_divisor(divisor);
    }

    pub fn frame_divisor(&self) -> u32 {
        self.throttle.divisor()
    }

    /// Frames received so far, forwarded or not.
    pub fn frames_received(&self) -> u64 {
        self.throttle.frame_count()
    }

    /// Entry point for the backend's frame callback.
    pub fn handle_frame(&self, frame: &FrameBuffer<'_>) {
        if !self.throttle.should_analyze() {
            return;
        }

        if frame.format == PixelFormat::Bgra32 {
            self.dispatch(frame);
            return;
        }

        // Holding the scratch lock across dispatch keeps the normalized
        // buffer valid for exactly the duration of the synchronous calls.
        let mut scratch = self.scratch.lock();
        convert::normalize_to_bgra(frame, &mut scratch);
        let normalized = FrameBuffer {
            data: &scratch,
            width: frame.width,
            height: frame.height,
            format: PixelFormat::Bgra32,
        };
        self.dispatch(&normalized);
    }

    fn dispatch(&self, frame: &FrameBuffer<'_>) {
        let subscribers = self.subscribers.lock();
        for sink in subscribers.iter() {
            sink(frame);
        }
    }
}

impl Default for FrameDeliveryPipeline {
    fn default() -> Self {
        Self::new(crate::pipeline::throttle::DEFAULT_FRAME_DIVISOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_sink(counter: Arc<AtomicUsize>) -> FrameSink {
        Arc::new(move |_frame| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn forwards_only_every_nth_frame() {
        let pipeline = FrameDeliveryPipeline::new(5);
        let count = Arc::new(AtomicUsize::new(0));
        pipeline.subscribe(counting_sink(Arc::clone(&count)));

        let data = vec![0u8; 16];
        let frame = FrameBuffer::new(&data, 2, 2, PixelFormat::Bgra32).unwrap();
        for _ in 0..10 {
            pipeline.handle_frame(&frame);
        }

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(pipeline.frames_received(), 10);
    }

    #[test]
    fn normalizes_non_bgra_frames_before_dispatch() {
        let pipeline = FrameDeliveryPipeline::new(1);
        let seen: Arc<Mutex<Vec<(PixelFormat, Vec<u8>)>>> = Arc::new(Mutex::new(Vec::new()));

        let sink_seen = Arc::clone(&seen);
        pipeline.subscribe(Arc::new(move |frame| {
            sink_seen
                .lock()
                .push((frame.format, frame.data.to_vec()));
        }));

        let gray = [7u8, 9u8];
        let frame = FrameBuffer::new(&gray, 2, 1, PixelFormat::Gray8).unwrap();
        pipeline.handle_frame(&frame);

        let captured = seen.lock();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].0, PixelFormat::Bgra32);
        assert_eq!(captured[0].1, vec![7, 7, 7, 255, 9, 9, 9, 255]);
    }

    #[test]
    fn all_subscribers_receive_forwarded_frames() {
        let pipeline = FrameDeliveryPipeline::new(1);
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        pipeline.subscribe(counting_sink(Arc::clone(&first)));
        pipeline.subscribe(counting_sink(Arc::clone(&second)));

        let data = vec![0u8; 4];
        let frame = FrameBuffer::new(&data, 1, 1, PixelFormat::Bgra32).unwrap();
        pipeline.handle_frame(&frame);

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn divisor_change_applies_without_reset() {
        let pipeline = FrameDeliveryPipeline::new(2);
        let count = Arc::new(AtomicUsize::new(0));
        pipeline.subscribe(counting_sink(Arc::clone(&count)));

        let data = vec![0u8; 4];
        let frame = FrameBuffer::new(&data, 1, 1, PixelFormat::Bgra32).unwrap();

        // indices 0..4, divisor 2: forwarded at 0 and 2
        for _ in 0..4 {
            pipeline.handle_frame(&frame);
        }
        pipeline.set_frame_divisor(3);
        // indices 4..10, divisor 3: forwarded at 6 and 9
        for _ in 4..10 {
            pipeline.handle_frame(&frame);
        }

        assert_eq!(count.load(Ordering::SeqCst), 4);
    }
}
