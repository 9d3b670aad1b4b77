//! PDF rasterisation for the OCR strategy, via pdfium.
//!
//! Pages are rendered one at a time and handed to a callback, so only a
//! single page bitmap is alive at once no matter how long the document is.
//! Callers run this on the blocking pool; pdfium is not async-safe.
//!
//! The pdfium shared library is bound per call from an explicit directory,
//! or from the system library search path when none is configured.

use crate::error::ExtractionError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Load the pdfium library from `library_dir`, or the system path.
pub fn bind_pdfium(library_dir: Option<&Path>) -> Result<Pdfium, ExtractionError> {
    let bindings = match library_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExtractionError::RendererUnavailable(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Render every page of `bytes` at `dpi`, in order, calling `on_page` with
/// the 1-based page number and the image.
///
/// Returns the number of pages in the document. Stops at the first error,
/// whether from pdfium or from `on_page`.
pub fn render_pages<F>(
    pdfium: &Pdfium,
    bytes: &[u8],
    dpi: u32,
    mut on_page: F,
) -> Result<usize, ExtractionError>
where
    F: FnMut(usize, DynamicImage) -> Result<(), ExtractionError>,
{
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| ExtractionError::InvalidDocument {
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    // 72 DPI renders one pixel per PDF point, the page's intrinsic size.
    let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ExtractionError::RenderFailed {
                page: page_num,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );

        on_page(page_num, image)?;
    }

    Ok(total_pages)
}
