//! Pipeline stages for link-to-text extraction.
//!
//! Each submodule implements one step, so each can be tested on its own and
//! swapped (a different host, a different OCR engine) without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! link ──▶ fetch ──▶ extract ─┬─▶ text   (lopdf text layer)
//! (FileId)  (bytes)           └─▶ ocr    (render ─▶ tesseract)
//! ```
//!
//! 1. [`link`]: pull the file identifier out of a sharing URL; pure
//! 2. [`fetch`]: download the bytes, handling the confirmation interstitial;
//!    the only stage with network I/O
//! 3. [`extract`]: the [`extract::TextExtractor`] contract and strategy selection
//! 4. [`text`]: embedded-text strategy
//! 5. [`render`]: rasterise pages via pdfium for OCR
//! 6. [`ocr`]: optical-recognition strategy via tesseract

pub mod extract;
pub mod fetch;
pub mod link;
pub mod ocr;
pub mod render;
pub mod text;
