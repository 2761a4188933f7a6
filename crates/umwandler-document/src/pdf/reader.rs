// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: inspect existing PDF documents and lift their pages into other
// documents as reusable Form XObjects, using the `lopdf` crate.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, instrument, warn};
use umwandler_core::Format;
use umwandler_core::error::{ConvertError, Result};

/// A page of one document imported into another as a Form XObject.
#[derive(Debug, Clone, Copy)]
pub struct ImportedPage {
    /// Object id of the Form XObject in the target document.
    pub form_id: ObjectId,
    /// The source page's MediaBox: `[x0, y0, x1, y1]` in points.
    pub bbox: [f32; 4],
}

impl ImportedPage {
    pub fn width(&self) -> f32 {
        self.bbox[2] - self.bbox[0]
    }

    pub fn height(&self) -> f32 {
        self.bbox[3] - self.bbox[1]
    }
}

/// Reads existing PDF documents.
///
/// Wraps `lopdf::Document`; used to inspect page geometry and to carry pages
/// from intermediate PDFs into composed output.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| ConvertError::Decode {
            format: Format::Pdf,
            detail: format!("failed to load PDF from memory: {}", err),
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// MediaBox of page `page_number` (1-indexed), following inheritance
    /// through the page tree.
    pub fn media_box(&self, page_number: u32) -> Result<[f32; 4]> {
        let page_id = self.page_id(page_number)?;
        let mut current = Some(page_id);

        while let Some(node_id) = current {
            let node = self.document.get_dictionary(node_id).map_err(pdf_error)?;
            if let Ok(media_box) = node.get(b"MediaBox") {
                return parse_rectangle(&self.document, media_box);
            }
            current = match node.get(b"Parent") {
                Ok(Object::Reference(parent)) => Some(*parent),
                _ => None,
            };
        }

        // PDF default when no MediaBox is present anywhere: US Letter.
        warn!(page_number, "page has no MediaBox, assuming Letter");
        Ok([0.0, 0.0, 612.0, 792.0])
    }

    /// Copy page `page_number` (1-indexed) into `target` as a Form XObject.
    ///
    /// The page's content streams become the form's content, and its resources
    /// (fonts, images, patterns, graphics states) are deep-cloned into
    /// `target`.
    #[instrument(skip(self, target))]
    pub fn import_page_as_form(
        &self,
        page_number: u32,
        target: &mut Document,
    ) -> Result<ImportedPage> {
        let page_id = self.page_id(page_number)?;
        let bbox = self.media_box(page_number)?;
        let content = self.document.get_page_content(page_id).map_err(pdf_error)?;

        let page = self.document.get_dictionary(page_id).map_err(pdf_error)?;
        let resources = match page.get(b"Resources") {
            Ok(resources) => ObjectCloner::new(&self.document).clone_object(target, resources)?,
            Err(_) => Object::Dictionary(Dictionary::new()),
        };

        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => bbox.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
                "Resources" => resources,
            },
            content,
        );
        let form_id = target.add_object(form);

        debug!(?form_id, ?bbox, "Page imported as form");
        Ok(ImportedPage { form_id, bbox })
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            ConvertError::Decode {
                format: Format::Pdf,
                detail: format!(
                    "page {} out of range (document has {} pages)",
                    page_number,
                    pages.len()
                ),
            }
        })
    }
}

fn pdf_error(err: lopdf::Error) -> ConvertError {
    ConvertError::Decode {
        format: Format::Pdf,
        detail: err.to_string(),
    }
}

/// Read a `[x0 y0 x1 y1]` rectangle, resolving an indirect array if needed.
fn parse_rectangle(document: &Document, object: &Object) -> Result<[f32; 4]> {
    let array = match object {
        Object::Reference(id) => document
            .get_object(*id)
            .and_then(Object::as_array)
            .map_err(pdf_error)?,
        other => other.as_array().map_err(pdf_error)?,
    };

    if array.len() != 4 {
        return Err(ConvertError::Decode {
            format: Format::Pdf,
            detail: format!("rectangle has {} entries", array.len()),
        });
    }

    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(array) {
        *slot = value.as_float().map_err(pdf_error)?;
    }
    // Normalise so x0 <= x1 and y0 <= y1.
    Ok([
        rect[0].min(rect[2]),
        rect[1].min(rect[3]),
        rect[0].max(rect[2]),
        rect[1].max(rect[3]),
    ])
}

/// Copies objects from one document into another.
///
/// Each source object is copied at most once: later references to it reuse
/// the first copy, which also makes reference cycles terminate. `/Parent`
/// entries are dropped so a page's tree does not come along.
struct ObjectCloner<'a> {
    source: &'a Document,
    copied: BTreeMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCloner<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            copied: BTreeMap::new(),
        }
    }

    fn clone_object(&mut self, target: &mut Document, object: &Object) -> Result<Object> {
        match object {
            Object::Dictionary(dict) => {
                Ok(Object::Dictionary(self.clone_dictionary(target, dict)?))
            }
            Object::Array(arr) => {
                let mut new_arr = Vec::with_capacity(arr.len());
                for item in arr {
                    new_arr.push(self.clone_object(target, item)?);
                }
                Ok(Object::Array(new_arr))
            }
            Object::Reference(ref_id) => self.clone_reference(target, *ref_id),
            Object::Stream(stream) => {
                let new_dict = self.clone_dictionary(target, &stream.dict)?;
                // Keep the encoded bytes as-is; /Filter and /Length travel with the dict.
                Ok(Object::Stream(
                    Stream::new(new_dict, stream.content.clone()).with_compression(false),
                ))
            }
            other => Ok(other.clone()),
        }
    }

    fn clone_reference(&mut self, target: &mut Document, ref_id: ObjectId) -> Result<Object> {
        if let Some(new_id) = self.copied.get(&ref_id) {
            return Ok(Object::Reference(*new_id));
        }

        let referenced = match self.source.get_object(ref_id) {
            Ok(referenced) => referenced,
            Err(err) => {
                warn!(?ref_id, %err, "Cannot resolve reference, using Null");
                return Ok(Object::Null);
            }
        };

        // Reserve the target id before descending so a cycle back to this
        // object resolves to the reservation.
        let new_id = target.new_object_id();
        self.copied.insert(ref_id, new_id);
        let cloned = self.clone_object(target, referenced)?;
        target.objects.insert(new_id, cloned);
        Ok(Object::Reference(new_id))
    }

    fn clone_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Result<Dictionary> {
        let mut new_dict = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            new_dict.set(key.clone(), self.clone_object(target, value)?);
        }
        Ok(new_dict)
    }
}
