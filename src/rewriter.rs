use crate::{pdf_utils, MetadataField, MetadataValues, Result, UpdateError};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::BTreeSet;

/// Page attributes a page may take from an ancestor `/Pages` node.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Object types that are rebuilt rather than carried over.
const REBUILT_TYPES: [&[u8]; 5] = [b"Catalog", b"Pages", b"Page", b"Outlines", b"Outline"];

// ── MetadataRewriter ─────────────────────────────────────────────────────────

/// Builds a fresh document from the pages of a source document and stamps
/// the configured Producer/Creator onto it.
///
/// ```no_run
/// use lopdf::Document;
/// use pdfmetaupdate::{MetadataRewriter, MetadataValues};
///
/// let values = MetadataValues::new("Acme PDF", "Scanner 3");
/// let source = Document::load("in.pdf").unwrap();
/// let mut copy = MetadataRewriter::new(&values).rebuild("in.pdf", &source).unwrap();
/// copy.save("out.pdf").unwrap();
/// ```
pub struct MetadataRewriter<'a> {
    values: &'a MetadataValues,
    compress: bool,
}

impl<'a> MetadataRewriter<'a> {
    pub fn new(values: &'a MetadataValues) -> Self {
        Self {
            values,
            compress: true,
        }
    }

    /// Toggle Flate compression of unfiltered streams in rebuilt documents.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Copy every page of `source` into a new document.
    ///
    /// The page tree is flattened under a single `/Pages` node, attributes
    /// inherited from ancestor nodes are pinned onto each page, and the new
    /// Info dictionary holds exactly `/Producer` and `/Creator`. `name` is
    /// only used for diagnostics.
    pub fn rebuild(&self, name: &str, source: &Document) -> Result<Document> {
        let pages = source.get_pages();
        if pages.is_empty() {
            return Err(UpdateError::InvalidDocument {
                file: name.to_owned(),
                reason: "document has no pages".into(),
            });
        }

        let mut document = Document::with_version(source.version.clone());
        document.max_id = source
            .objects
            .keys()
            .map(|(id, _)| *id)
            .max()
            .unwrap_or(0)
            .max(source.max_id);

        for (id, object) in &source.objects {
            if !is_rebuilt(object) {
                document.objects.insert(*id, object.clone());
            }
        }

        let pages_id = document.new_object_id();
        let mut kids = Vec::with_capacity(pages.len());

        for page_id in pages.values() {
            let mut page = source
                .get_object(*page_id)
                .and_then(Object::as_dict)
                .map_err(|e| UpdateError::InvalidDocument {
                    file: name.to_owned(),
                    reason: format!("unreadable page {page_id:?}: {e}"),
                })?
                .clone();

            inherit_attributes(source, &mut page);
            page.set("Parent", pages_id);

            document.objects.insert(*page_id, Object::Dictionary(page));
            kids.push(Object::Reference(*page_id));
        }

        let count = i64::try_from(kids.len()).map_err(|_| UpdateError::InvalidDocument {
            file: name.to_owned(),
            reason: format!("page count {} out of range", kids.len()),
        })?;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = document.add_object(self.info_dictionary());

        document.trailer.set("Root", catalog_id);
        document.trailer.set("Info", info_id);

        let pruned = document.prune_objects();
        log::debug!("{name}: dropped {} unreachable object(s)", pruned.len());

        document.renumber_objects();
        if self.compress {
            document.compress();
        }

        Ok(document)
    }

    fn info_dictionary(&self) -> Dictionary {
        let mut info = Dictionary::new();
        for field in MetadataField::ALL {
            info.set(field.key(), pdf_utils::text_string(self.values.get(field)));
        }
        info
    }
}

fn is_rebuilt(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .map(|type_name| REBUILT_TYPES.contains(&type_name))
        .unwrap_or(false)
}

/// Walk up the `/Parent` chain and copy inheritable attributes the page does
/// not set itself. The nearest ancestor wins.
fn inherit_attributes(source: &Document, page: &mut Dictionary) {
    let mut seen: BTreeSet<ObjectId> = BTreeSet::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(node_id) = parent {
        if !seen.insert(node_id) {
            log::warn!("page tree loops back to {node_id:?}");
            break;
        }
        let Ok(node) = source.get_object(node_id).and_then(Object::as_dict) else {
            break;
        };

        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key, value.clone());
                }
            }
        }

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;

    /// Two pages under an intermediate node that carries MediaBox and
    /// Resources, plus an Info dictionary and an outline root.
    fn nested_document() -> Document {
        let mut doc = Document::with_version("1.6");
        let root_pages_id = doc.new_object_id();
        let mid_pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));

        let first = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => mid_pages_id,
            "Contents" => content_id,
        });
        let second = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => mid_pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 200.into()],
        });

        doc.objects.insert(
            mid_pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Parent" => root_pages_id,
                "Kids" => vec![first.into(), second.into()],
                "Count" => 2,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        doc.objects.insert(
            root_pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![mid_pages_id.into()],
                "Count" => 2,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
                "Rotate" => 90,
            }),
        );

        let outlines_id = doc.add_object(dictionary! { "Type" => "Outlines", "Count" => 0 });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => root_pages_id,
            "Outlines" => outlines_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal("Old Producer"),
            "Title" => Object::string_literal("Kept nowhere"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc
    }

    fn page_dicts(doc: &Document) -> Vec<Dictionary> {
        doc.get_pages()
            .values()
            .map(|id| doc.get_object(*id).unwrap().as_dict().unwrap().clone())
            .collect()
    }

    fn rebuild(values: &MetadataValues) -> Document {
        MetadataRewriter::new(values)
            .with_compression(false)
            .rebuild("nested.pdf", &nested_document())
            .unwrap()
    }

    #[test]
    fn keeps_page_count_and_version() {
        let doc = rebuild(&MetadataValues::new("P", "C"));
        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(doc.version, "1.6");
    }

    #[test]
    fn info_holds_only_producer_and_creator() {
        let doc = rebuild(&MetadataValues::new("New Producer", "New Creator"));

        assert_eq!(
            MetadataValues::from_document(&doc),
            MetadataValues::new("New Producer", "New Creator")
        );

        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_object(info_id).unwrap().as_dict().unwrap();
        assert_eq!(info.len(), 2);
        assert!(!info.has(b"Title"));
    }

    #[test]
    fn flattens_page_tree_under_one_parent() {
        let doc = rebuild(&MetadataValues::new("P", "C"));
        let catalog = doc.catalog().unwrap();
        let pages_id = catalog.get(b"Pages").unwrap().as_reference().unwrap();
        let pages = doc.get_object(pages_id).unwrap().as_dict().unwrap();

        assert_eq!(pages.get(b"Count").unwrap().as_i64().unwrap(), 2);
        assert!(!pages.has(b"Parent"));
        for page in page_dicts(&doc) {
            assert_eq!(page.get(b"Parent").unwrap().as_reference().unwrap(), pages_id);
        }
        assert!(!catalog.has(b"Outlines"));
    }

    #[test]
    fn pins_inherited_attributes_onto_pages() {
        let doc = rebuild(&MetadataValues::new("P", "C"));
        let pages = page_dicts(&doc);

        let first_box = pages[0].get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(first_box[2].as_i64().unwrap(), 612);

        // A page's own value wins over the inherited one.
        let second_box = pages[1].get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(second_box[2].as_i64().unwrap(), 200);

        for page in &pages {
            assert!(page.has(b"Resources"));
            assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
        }
    }

    #[test]
    fn drops_unreachable_objects() {
        let doc = rebuild(&MetadataValues::new("P", "C"));
        let leftovers = doc
            .objects
            .values()
            .filter_map(|o| o.as_dict().ok())
            .filter(|d| {
                d.get(b"Type")
                    .and_then(Object::as_name)
                    .map(|t| t == b"Outlines")
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(leftovers, 0);
        assert!(doc.objects.values().all(|o| {
            o.as_dict()
                .map(|d| !d.has(b"Title"))
                .unwrap_or(true)
        }));
    }

    #[test]
    fn rejects_documents_without_pages() {
        let values = MetadataValues::new("P", "C");
        let err = MetadataRewriter::new(&values)
            .rebuild("empty.pdf", &Document::with_version("1.5"))
            .unwrap_err();
        assert!(matches!(err, UpdateError::InvalidDocument { ref file, .. } if file == "empty.pdf"));
    }

    #[test]
    fn same_values_give_same_info() {
        let values = MetadataValues::new("Acme", "Grüße");
        let first = MetadataValues::from_document(&rebuild(&values));
        let second = MetadataValues::from_document(&rebuild(&values));
        assert_eq!(first, second);
        assert_eq!(first, values);
    }
}
