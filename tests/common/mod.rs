//! Shared helpers for integration tests.
//!
//! PDFs are generated in memory with lopdf so no fixture files or native
//! libraries are needed.

#![allow(dead_code)]

use async_trait::async_trait;
use drivetext::{DocumentFetcher, DownloadError, FetchedDocument, FileId};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Build a PDF with one page per entry, each page drawing its string in
/// Courier.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("serialise pdf");
    buf
}

/// What a [`StaticFetcher`] answers with.
pub enum Reply {
    Bytes(Vec<u8>),
    NotFound,
}

/// Fetcher returning a canned reply and recording the ids it was asked for.
pub struct StaticFetcher {
    reply: Reply,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, file_id: &FileId) -> Result<FetchedDocument, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(file_id.to_string());
        match &self.reply {
            Reply::Bytes(bytes) => Ok(FetchedDocument::Memory(bytes.clone())),
            Reply::NotFound => Err(DownloadError::Status {
                url: format!("https://drive.google.com/uc?export=download&id={file_id}"),
                status: 404,
            }),
        }
    }
}
