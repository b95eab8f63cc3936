//! Background decoding with a result channel
//!
//! Jobs run on the rayon pool and every outcome, success or failure, is
//! posted to the returned receiver tagged with its job id. A failed item
//! never stops the batch. Dropping the receiver abandons the batch: calls
//! already running finish and their results are discarded.

use crate::JxlCoder;
use jxlcoder_core::{DecodeOptions, JxlResult, PixelBuffer};
use log::trace;
use rayon::prelude::*;
use std::sync::mpsc;
use std::sync::Arc;

/// One image to decode
#[derive(Debug, Clone)]
pub struct DecodeJob {
    pub id: usize,
    pub data: Arc<[u8]>,
    pub options: DecodeOptions,
}

impl DecodeJob {
    pub fn new(id: usize, data: impl Into<Arc<[u8]>>, options: DecodeOptions) -> Self {
        Self {
            id,
            data: data.into(),
            options,
        }
    }
}

/// Result of one [`DecodeJob`]
#[derive(Debug)]
pub struct DecodeOutcome {
    pub id: usize,
    pub result: JxlResult<PixelBuffer>,
}

/// Decode `jobs` in the background
///
/// Returns immediately. Outcomes arrive in completion order; the channel
/// closes once every job has reported.
pub fn spawn_decode_batch(coder: Arc<JxlCoder>, jobs: Vec<DecodeJob>) -> mpsc::Receiver<DecodeOutcome> {
    let (tx, rx) = mpsc::channel();

    rayon::spawn(move || {
        jobs.into_par_iter().for_each_with(tx, |tx, job| {
            let result = coder.decode(&job.data, &job.options);
            if tx.send(DecodeOutcome { id: job.id, result }).is_err() {
                trace!("batch receiver dropped, discarding job {}", job.id);
            }
        });
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxlcoder_core::{EncodeSettings, JxlError, PixelFormat};

    #[test]
    fn test_batch_reports_every_job() {
        let coder = Arc::new(JxlCoder::new());
        let pixels = PixelBuffer::new(6, 5, PixelFormat::Rgba8888).unwrap();
        let good = coder.encode(&pixels, &EncodeSettings::new()).unwrap();

        let jobs = vec![
            DecodeJob::new(0, good.clone(), DecodeOptions::new()),
            DecodeJob::new(1, b"not an image".to_vec(), DecodeOptions::new()),
            DecodeJob::new(2, good, DecodeOptions::new().bounds(3, 3)),
        ];

        let mut outcomes: Vec<DecodeOutcome> = spawn_decode_batch(coder, jobs).iter().collect();
        outcomes.sort_by_key(|o| o.id);

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(JxlError::UnsupportedFormat)
        ));
        let scaled = outcomes[2].result.as_ref().unwrap();
        assert!(scaled.width() <= 3 && scaled.height() <= 3);
    }

    #[test]
    fn test_empty_batch_closes() {
        let rx = spawn_decode_batch(Arc::new(JxlCoder::new()), Vec::new());
        assert!(rx.recv().is_err());
    }
}
