use std::sync::Arc;

use parking_lot::Mutex;

use super::{BarcodeDecoder, BarcodeResult, DecodeOptions};
use crate::pipeline::delivery::FrameDeliveryPipeline;
use crate::traits::capture_backend::FrameSink;

/// Callback invoked with the symbols found in one frame. Never called with
/// an empty slice.
pub type DetectionSink = Arc<dyn Fn(&[BarcodeResult]) + Send + Sync + 'static>;

/// Frame-pipeline subscriber that feeds frames to a barcode decoder and
/// raises a detection callback on hits.
///
/// Runs synchronously inside the frame delivery dispatch; the frame throttle
/// upstream keeps the decode rate bounded.
pub struct BarcodeScanner {
    decoder: Arc<dyn BarcodeDecoder>,
    options: Mutex<DecodeOptions>,
    on_detected: DetectionSink,
}

impl BarcodeScanner {
    pub fn new(
        decoder: Arc<dyn BarcodeDecoder>,
        options: DecodeOptions,
        on_detected: DetectionSink,
    ) -> Self {
        Self {
            decoder,
            options: Mutex::new(options),
            on_detected,
        }
    }

    /// Replace the reader options; takes effect on the next frame.
    pub fn set_options(&self, options: DecodeOptions) {
        *self.options.lock() = options;
    }

    pub fn options(&self) -> DecodeOptions {
        *self.options.lock()
    }

    /// Subscribe this scanner to a frame pipeline.
    pub fn attach(self: &Arc<Self>, pipeline: &FrameDeliveryPipeline) {
        pipeline.subscribe(self.clone().into_sink());
    }

    /// Adapt the scanner into a pipeline frame sink.
    pub fn into_sink(self: Arc<Self>) -> FrameSink {
        Arc::new(move |frame| {
            let options = self.options();
            let mut results = self.decoder.decode(frame, &options);
            if results.is_empty() {
                return;
            }
            if !options.multiple {
                results.truncate(1);
            }
            (self.on_detected)(&results);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::BarcodeFormat;
    use crate::models::camera_models::PixelFormat;
    use crate::models::frame::FrameBuffer;

    /// Decoder stub returning a fixed result set.
    struct FixedDecoder(Vec<BarcodeResult>);

    impl BarcodeDecoder for FixedDecoder {
        fn decode(&self, _frame: &FrameBuffer<'_>, _options: &DecodeOptions) -> Vec<BarcodeResult> {
            self.0.clone()
        }

        fn supported_formats(&self) -> &[BarcodeFormat] {
            &[BarcodeFormat::QrCode]
        }
    }

    fn result(text: &str) -> BarcodeResult {
        BarcodeResult {
            text: text.into(),
            format: BarcodeFormat::QrCode,
        }
    }

    fn run_scanner(decoded: Vec<BarcodeResult>, options: DecodeOptions) -> Vec<Vec<BarcodeResult>> {
        let seen: Arc<Mutex<Vec<Vec<BarcodeResult>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);

        let scanner = Arc::new(BarcodeScanner::new(
            Arc::new(FixedDecoder(decoded)),
            options,
            Arc::new(move |results| sink_seen.lock().push(results.to_vec())),
        ));

        let pipeline = FrameDeliveryPipeline::new(1);
        scanner.attach(&pipeline);

        let data = vec![0u8; 4];
        let frame = FrameBuffer::new(&data, 1, 1, PixelFormat::Bgra32).unwrap();
        pipeline.handle_frame(&frame);

        let captured = seen.lock().clone();
        captured
    }

    #[test]
    fn empty_decode_raises_no_detection() {
        let captured = run_scanner(Vec::new(), DecodeOptions::default());
        assert!(captured.is_empty());
    }

    #[test]
    fn single_mode_truncates_to_first_result() {
        let captured = run_scanner(
            vec![result("a"), result("b")],
            DecodeOptions {
                multiple: false,
                ..Default::default()
            },
        );
        assert_eq!(captured, vec![vec![result("a")]]);
    }

    #[test]
    fn multiple_mode_reports_all_results() {
        let captured = run_scanner(
            vec![result("a"), result("b")],
            DecodeOptions {
                multiple: true,
                ..Default::default()
            },
        );
        assert_eq!(captured, vec![vec![result("a"), result("b")]]);
    }
}
