//! Concatenation of keyframe images into a PDF document.

use super::WriteError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::PathBuf;

/// Builds a document from an ordered list of images.
pub trait DocumentAssembler {
    /// Returns the encoded document, one page per image, in the given order.
    fn assemble(&self, images: &[PathBuf]) -> Result<Vec<u8>, WriteError>;
}

/// One page per image, each page exactly the size of its image in points.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfAssembler;

impl PdfAssembler {
    /// Creates the assembler.
    pub fn new() -> Self {
        Self
    }
}

fn int(v: u32) -> Object {
    Object::Integer(i64::from(v))
}

fn pdf_error(e: lopdf::Error) -> WriteError {
    WriteError::Pdf(e.to_string())
}

impl DocumentAssembler for PdfAssembler {
    fn assemble(&self, images: &[PathBuf]) -> Result<Vec<u8>, WriteError> {
        if images.is_empty() {
            return Err(WriteError::NoImages);
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(images.len());

        for path in images {
            let raster = image::open(path)
                .map_err(|source| WriteError::Image {
                    path: path.clone(),
                    source,
                })?
                .to_rgb8();
            let (width, height) = raster.dimensions();

            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => int(width),
                    "Height" => int(height),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => Object::Integer(8),
                },
                raster.into_raw(),
            ));

            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![int(width), int(0), int(0), int(height), int(0), int(0)],
                    ),
                    Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(pdf_error)?));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![int(0), int(0), int(width), int(height)],
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im0" => image_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(|e| WriteError::Pdf(e.to_string()))?;
        tracing::debug!(pages = count, bytes = bytes.len(), "Document assembled");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            PdfAssembler::new().assemble(&[]),
            Err(WriteError::NoImages)
        ));
    }

    #[test]
    fn test_one_page_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..3)
            .map(|i| {
                let path = dir.path().join(format!("{i:03}_0.00.png"));
                RgbImage::from_pixel(20 + i, 10, Rgb([i as u8 * 40, 0, 0]))
                    .save(&path)
                    .unwrap();
                path
            })
            .collect();

        let bytes = PdfAssembler::new().assemble(&paths).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_unreadable_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        assert!(matches!(
            PdfAssembler::new().assemble(&[path]),
            Err(WriteError::Image { .. })
        ));
    }
}
