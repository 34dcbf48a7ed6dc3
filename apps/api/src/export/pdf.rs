//! PDF contact-sheet writer.
//!
//! Images are embedded as DCT (JPEG) XObjects and drawn with a single `cm`/`Do`
//! pair each. Pages are buffered as operation lists and only assembled into the
//! page tree on `finalize`.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as PdfDocument, Object, ObjectId, Stream};

use crate::export::fetch::RasterImage;
use crate::export::jpeg::{encode_jpeg, EMBED_QUALITY};
use crate::export::ExportError;
use crate::layout::geometry::{A4_HEIGHT_PT, A4_WIDTH_PT};
use crate::layout::{build_document, Document, Rect};

/// Index of a page opened with [`DocumentWriter::new_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHandle(usize);

/// Sink for laid-out pages.
pub trait DocumentWriter {
    fn new_page(&mut self) -> PageHandle;
    fn place(&mut self, page: PageHandle, image: &RasterImage, rect: Rect) -> Result<(), ExportError>;
    fn finalize(self) -> Result<Vec<u8>, ExportError>;
}

#[derive(Default)]
struct PendingPage {
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

pub struct PdfDocumentWriter {
    doc: PdfDocument,
    pages_id: ObjectId,
    page_width: f64,
    page_height: f64,
    pages: Vec<PendingPage>,
    image_count: usize,
}

impl PdfDocumentWriter {
    pub fn new(page_width: f64, page_height: f64) -> Self {
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_width,
            page_height,
            pages: Vec::new(),
            image_count: 0,
        }
    }

    pub fn a4() -> Self {
        Self::new(A4_WIDTH_PT, A4_HEIGHT_PT)
    }

    fn add_image(&mut self, image: &RasterImage) -> Result<ObjectId, ExportError> {
        let jpeg = encode_jpeg(image, EMBED_QUALITY)?;
        let dict = Dictionary::from_iter([
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(i64::from(image.width()))),
            ("Height", Object::Integer(i64::from(image.height()))),
            ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(b"DCTDecode".to_vec())),
        ]);
        // DCT data is already compressed; keep lopdf from deflating it again.
        let stream = Stream::new(dict, jpeg).with_compression(false);
        Ok(self.doc.add_object(stream))
    }
}

impl DocumentWriter for PdfDocumentWriter {
    fn new_page(&mut self) -> PageHandle {
        self.pages.push(PendingPage::default());
        PageHandle(self.pages.len() - 1)
    }

    fn place(&mut self, page: PageHandle, image: &RasterImage, rect: Rect) -> Result<(), ExportError> {
        if page.0 >= self.pages.len() {
            return Err(ExportError::Pdf(format!("page {} was never opened", page.0)));
        }

        let image_id = self.add_image(image)?;
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);

        let pending = &mut self.pages[page.0];
        pending.xobjects.set(name.as_bytes().to_vec(), Object::Reference(image_id));
        pending.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (rect.width as f32).into(),
                    0.into(),
                    0.into(),
                    (rect.height as f32).into(),
                    (rect.x as f32).into(),
                    (rect.y as f32).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    fn finalize(mut self) -> Result<Vec<u8>, ExportError> {
        let media_box = Object::Array(vec![
            0.into(),
            0.into(),
            (self.page_width as f32).into(),
            (self.page_height as f32).into(),
        ]);

        let mut kids = Vec::with_capacity(self.pages.len());
        for pending in std::mem::take(&mut self.pages) {
            let content = Content {
                operations: pending.operations,
            }
            .encode()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
            let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

            let resources = Dictionary::from_iter([("XObject", Object::Dictionary(pending.xobjects))]);
            let page_id = self.doc.add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(self.pages_id)),
                ("MediaBox", media_box.clone()),
                ("Resources", Object::Dictionary(resources)),
                ("Contents", Object::Reference(content_id)),
            ]));
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(count)),
            ])),
        );

        let catalog_id = self.doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.compress();

        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        Ok(out)
    }
}

/// Streams a laid-out document into `writer`, one page at a time.
pub fn write_document<W: DocumentWriter>(
    document: &Document,
    images: &[RasterImage],
    mut writer: W,
) -> Result<Vec<u8>, ExportError> {
    for page in &document.pages {
        let handle = writer.new_page();
        for placed in &page.placements {
            let image = images.get(placed.image_index).ok_or_else(|| {
                ExportError::Pdf(format!("placement refers to missing image {}", placed.image_index))
            })?;
            writer.place(handle, image, placed.rect)?;
        }
    }
    writer.finalize()
}

/// Lays out `images` with the requested grid and renders them to an A4 PDF.
pub fn build_contact_sheet(
    images: &[RasterImage],
    layout_key: &str,
    stretch: bool,
) -> Result<Vec<u8>, ExportError> {
    let document = build_document(images, layout_key, stretch)?;
    write_document(&document, images, PdfDocumentWriter::a4())
}
