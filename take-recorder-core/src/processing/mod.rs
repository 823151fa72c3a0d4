pub mod capture_buffer;
pub mod wav_format;
