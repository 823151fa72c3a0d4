use crate::models::audio_models::{PcmBlock, PcmData, SampleFormat};

/// Accumulates the blocks delivered by the driver during one take.
///
/// Unlike a ring buffer nothing is ever dropped: a take is kept whole until
/// it is drained. Wrap in `parking_lot::Mutex` for cross-thread access; the
/// session does this and checks its state under the same lock.
#[derive(Debug)]
pub struct CaptureBuffer {
    format: SampleFormat,
    blocks: Vec<PcmBlock>,
    samples: usize,
}

impl CaptureBuffer {
    pub fn new(format: SampleFormat) -> Self {
        Self {
            format,
            blocks: Vec::new(),
            samples: 0,
        }
    }

    /// Append one block. Amortized O(1); the block is moved, not copied.
    ///
    /// Blocks in a different format than the buffer's are a caller bug.
    pub fn append(&mut self, block: PcmBlock) {
        debug_assert_eq!(block.format(), self.format, "block format mismatch");
        if block.is_empty() {
            return;
        }
        self.samples += block.len();
        self.blocks.push(block);
    }

    /// Concatenate every block in arrival order and reset the buffer.
    pub fn drain(&mut self) -> PcmData {
        let blocks = std::mem::take(&mut self.blocks);
        let total = std::mem::replace(&mut self.samples, 0);

        match self.format {
            SampleFormat::F32 => {
                let mut out = Vec::with_capacity(total);
                for block in blocks {
                    if let PcmBlock::F32(samples) = block {
                        out.extend_from_slice(&samples);
                    }
                }
                PcmData::F32(out)
            }
            SampleFormat::I32 => {
                let mut out = Vec::with_capacity(total);
                for block in blocks {
                    if let PcmBlock::I32(samples) = block {
                        out.extend_from_slice(&samples);
                    }
                }
                PcmData::I32(out)
            }
        }
    }

    /// Drop everything and switch to `format` for the next take.
    pub fn reset(&mut self, format: SampleFormat) {
        self.blocks.clear();
        self.samples = 0;
        self.format = format;
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Samples across all channels.
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    pub fn frame_count(&self, channels: u16) -> usize {
        self.samples / channels.max(1) as usize
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }
}
