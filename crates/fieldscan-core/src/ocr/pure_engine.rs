//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.
//!
//! The underlying `OcrEngine` keeps per-session plan caches in `RefCell`s and
//! cannot leave the thread that built it. It lives on a dedicated worker
//! thread; [`PureOcrEngine`] only holds the job channel.

use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::FieldscanConfig;

use super::{join_lines, sort_by_reading_order, TextBox, TextRecognizer};

type Reply = Result<Vec<TextBox>, OcrError>;
type Job = (DynamicImage, Sender<Reply>);

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    jobs: Sender<Job>,
}

impl PureOcrEngine {
    /// Create an engine from the configured model directory.
    ///
    /// Models are loaded on the worker thread; a load failure is reported
    /// back here before the engine is returned.
    pub fn from_config(config: &FieldscanConfig) -> Result<Self, OcrError> {
        let det_path = config.model_path(&config.models.detection_model);
        let rec_path = config.model_path(&config.models.recognition_model);
        let dict_path = config.model_path(&config.models.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let keep_unk = config.ocr.keep_unk;
        let (jobs, job_rx) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), OcrError>>();

        thread::Builder::new()
            .name("pure-onnx-ocr".to_string())
            .spawn(move || {
                let engine = match build(det_path, rec_path, dict_path) {
                    Ok(engine) => {
                        let _ = ready_tx.send(Ok(()));
                        engine
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                for (image, reply) in job_rx {
                    let _ = reply.send(process(&engine, &image, keep_unk));
                }

                debug!("pure-onnx-ocr worker stopped");
            })
            .map_err(|e| OcrError::ModelLoad(format!("failed to start OCR worker: {}", e)))?;

        ready_rx.recv().map_err(|_| {
            OcrError::ModelLoad("OCR worker exited during startup".to_string())
        })??;

        info!(
            "Loaded pure-onnx-ocr engine from {}",
            config.models.model_dir.display()
        );

        Ok(Self { jobs })
    }

    /// Run detection and recognition, returning boxes in reading order.
    pub fn process(&self, image: &DynamicImage) -> Result<Vec<TextBox>, OcrError> {
        let (reply_tx, reply_rx) = mpsc::channel();

        self.jobs
            .send((image.clone(), reply_tx))
            .map_err(|_| OcrError::Recognition("OCR worker is not running".to_string()))?;

        reply_rx.recv().map_err(|_| {
            warn!("pure-onnx-ocr worker dropped a job");
            OcrError::Recognition("OCR worker stopped before replying".to_string())
        })?
    }
}

impl TextRecognizer for PureOcrEngine {
    fn name(&self) -> &'static str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        Ok(join_lines(&self.process(image)?))
    }
}

fn build(
    det_path: PathBuf,
    rec_path: PathBuf,
    dict_path: PathBuf,
) -> Result<pure_onnx_ocr::engine::OcrEngine, OcrError> {
    pure_onnx_ocr::engine::OcrEngineBuilder::new()
        .det_model_path(det_path)
        .rec_model_path(rec_path)
        .dictionary_path(dict_path)
        .build()
        .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))
}

fn process(
    engine: &pure_onnx_ocr::engine::OcrEngine,
    image: &DynamicImage,
    keep_unk: bool,
) -> Reply {
    let start = Instant::now();
    let (width, height) = image.dimensions();

    debug!("Processing image: {}x{}", width, height);

    let results = engine
        .run_from_image(image)
        .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

    debug!("pure-onnx-ocr returned {} text regions", results.len());

    let mut text_boxes: Vec<TextBox> = results
        .iter()
        .map(|r| TextBox {
            bbox: polygon_to_bbox(&r.bounding_box),
            text: clean_text(&r.text, keep_unk),
            confidence: r.confidence,
        })
        .collect();

    sort_by_reading_order(&mut text_boxes);

    info!(
        "OCR complete: {} text boxes in {}ms",
        text_boxes.len(),
        start.elapsed().as_millis()
    );

    Ok(text_boxes)
}

/// Replace the recognizer's `[UNK]` token with a space unless asked to keep it.
fn clean_text(text: &str, keep_unk: bool) -> String {
    if keep_unk {
        text.to_string()
    } else {
        text.replace("[UNK]", " ")
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
