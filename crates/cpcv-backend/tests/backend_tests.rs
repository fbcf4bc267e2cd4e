//! End-to-end conversion tests through the public extractor API.
//!
//! PDF tests use an in-memory rasterizer; the pdfium-backed test is ignored
//! unless the library is installed.

use base64::Engine;
use cpcv_backend::pdf::PageSink;
use cpcv_backend::{
    ContentExtractor, DocumentExtractor, EvidenceAggregator, PageRasterizer, RenderOptions,
};
use cpcv_core::{Category, ContentFragment, UploadSet, UploadedFile};
use image::{DynamicImage, Rgb, RgbImage};
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"<Types/>").unwrap();
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// Produces `pages` solid bitmaps; page n is (10 + n) pixels wide.
struct FakeRasterizer {
    pages: u32,
    fail_on: Option<u32>,
}

impl PageRasterizer for FakeRasterizer {
    fn render_pages(
        &self,
        _pdf: &[u8],
        _scale: f32,
        on_page: &mut PageSink<'_>,
    ) -> anyhow::Result<u32> {
        for page in 1..=self.pages {
            if self.fail_on == Some(page) {
                anyhow::bail!("Failed to render page {page}");
            }
            let bitmap = RgbImage::from_pixel(10 + page, 6, Rgb([200, 200, 200]));
            on_page(page, DynamicImage::ImageRgb8(bitmap))?;
        }
        Ok(self.pages)
    }
}

fn pdf_extractor(pages: u32, fail_on: Option<u32>) -> DocumentExtractor {
    DocumentExtractor::with_rasterizer(Arc::new(FakeRasterizer { pages, fail_on }))
}

fn decode(fragment: &ContentFragment) -> DynamicImage {
    let ContentFragment::Image { mime_type, data } = fragment else {
        panic!("expected an image fragment, got {fragment:?}");
    };
    assert_eq!(mime_type, "image/jpeg");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .unwrap();
    image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap()
}

#[test]
fn test_docx_text_fragment() {
    let file = UploadedFile::new(
        Category::Contract,
        "cpcv.docx",
        DOCX_MIME,
        docx(&["CONTRATO-PROMESSA DE COMPRA E VENDA", "Preço: 250.000,00 EUR"]),
    );

    let fragments = DocumentExtractor::new().extract(&file).unwrap();
    assert_eq!(
        fragments,
        vec![ContentFragment::text(
            "[Conteúdo do Documento cpcv.docx]:\nCONTRATO-PROMESSA DE COMPRA E VENDA\n\nPreço: 250.000,00 EUR",
            "cpcv.docx",
        )]
    );
}

#[test]
fn test_docx_detected_by_extension() {
    let file = UploadedFile::new(
        Category::Contract,
        "CPCV.DOCX",
        "application/octet-stream",
        docx(&["Fração A"]),
    );

    let fragments = DocumentExtractor::new().extract(&file).unwrap();
    assert_eq!(fragments.len(), 1);
    assert!(!fragments[0].is_image());
}

#[test]
fn test_pdf_one_jpeg_per_page_in_order() {
    let file = UploadedFile::new(Category::Property, "caderneta.pdf", "application/pdf", b"%PDF-1.7".to_vec());

    let fragments = pdf_extractor(3, None).extract(&file).unwrap();
    assert_eq!(fragments.len(), 3);
    for (i, fragment) in fragments.iter().enumerate() {
        let page = decode(fragment);
        assert_eq!(page.width(), 11 + i as u32);
        assert_eq!(page.height(), 6);
    }
}

#[test]
fn test_pdf_page_failure_fails_the_file() {
    let file = UploadedFile::new(Category::Property, "certidao.pdf", "application/pdf", b"%PDF-1.4".to_vec());

    let err = pdf_extractor(4, Some(3)).extract(&file).unwrap_err();
    assert!(err.is_conversion());
    let message = err.to_string();
    assert!(message.contains("certidao.pdf"), "{message}");
    assert!(message.contains("page 3"), "{message}");
}

#[test]
fn test_render_options_are_carried() {
    let options = RenderOptions {
        scale: 1.5,
        jpeg_quality: 60,
    };
    let extractor = pdf_extractor(1, None).with_options(options);
    assert_eq!(extractor.options(), options);
}

#[test]
fn test_unsupported_spreadsheet_is_skipped() {
    let file = UploadedFile::new(
        Category::Owner,
        "contas.xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        docx(&["not really a spreadsheet"]),
    );
    assert!(DocumentExtractor::new().extract(&file).unwrap().is_empty());
}

#[tokio::test]
async fn test_aggregated_payload_layout() {
    let files: UploadSet = [
        UploadedFile::new(Category::Contract, "cpcv.docx", DOCX_MIME, docx(&["CPCV"])),
        UploadedFile::new(Category::Owner, "cc.png", "image/png", vec![1_u8, 2, 3]),
        UploadedFile::new(Category::Property, "caderneta.pdf", "application/pdf", b"%PDF".to_vec()),
    ]
    .into_iter()
    .collect();

    let payload = EvidenceAggregator::new(Arc::new(pdf_extractor(2, None)))
        .aggregate(&files)
        .await
        .unwrap()
        .into_payload();

    // 4 markers + 1 image + 2 pages + 1 text
    assert_eq!(payload.len(), 8);
    assert_eq!(payload[0], ContentFragment::marker("--- SECTION 1: OWNER DOCUMENTS ---"));
    assert_eq!(payload[1], ContentFragment::image("image/png", &[1, 2, 3]));
    assert_eq!(payload[2], ContentFragment::marker("--- SECTION 2: BUYER DOCUMENTS ---"));
    assert_eq!(payload[3], ContentFragment::marker("--- SECTION 3: PROPERTY DOCUMENTS ---"));
    assert!(payload[4].is_image() && payload[5].is_image());
    assert_eq!(payload[6], ContentFragment::marker("--- SECTION 4: CPCV ---"));
    assert_eq!(
        payload[7],
        ContentFragment::text("[Conteúdo do Documento cpcv.docx]:\nCPCV", "cpcv.docx")
    );
}

#[test]
#[ignore = "requires libpdfium"]
fn test_pdfium_rejects_garbage() {
    let file = UploadedFile::new(Category::Property, "bad.pdf", "application/pdf", b"not a pdf".to_vec());
    let err = DocumentExtractor::new().extract(&file).unwrap_err();
    assert!(err.is_conversion());
}
