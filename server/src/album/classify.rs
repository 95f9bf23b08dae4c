use crate::dav::AlbumEntry;

const IMAGE_PREFIX: &str = "image/";

/// An album image and the public paths derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub name: String,
    pub display_url: String,
    pub meta_url: String,
}

impl ImageRef {
    fn from_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_url: format!("/api/image/{}", name),
            meta_url: format!("/api/exif/{}", name),
        }
    }
}

/// Last `/`-separated segment of an href
pub fn entry_name(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or(href)
}

pub fn is_image(entry: &AlbumEntry) -> bool {
    entry
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with(IMAGE_PREFIX))
}

/// Keep image entries, in listing order
pub fn classify_images(entries: &[AlbumEntry]) -> Vec<ImageRef> {
    entries
        .iter()
        .filter(|e| is_image(e))
        .map(|e| ImageRef::from_name(entry_name(&e.href)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(href: &str, content_type: Option<&str>) -> AlbumEntry {
        AlbumEntry {
            href: href.to_string(),
            content_type: content_type.map(str::to_string),
        }
    }

    #[test]
    fn test_entry_name() {
        assert_eq!(entry_name("/dav/albums/summer/photo1.jpg"), "photo1.jpg");
        assert_eq!(entry_name("photo1.jpg"), "photo1.jpg");
        assert_eq!(entry_name("/dav/albums/summer/"), "");
    }

    #[test]
    fn test_keeps_only_images_in_order() {
        let entries = vec![
            entry("/a/", None),
            entry("/a/photo1.jpg", Some("image/jpeg")),
            entry("/a/notes.txt", Some("text/plain")),
            entry("/a/scan.pdf", Some("application/pdf")),
            entry("/a/photo2.png", Some("image/png")),
        ];

        let images = classify_images(&entries);
        assert_eq!(
            images,
            vec![
                ImageRef {
                    name: "photo1.jpg".into(),
                    display_url: "/api/image/photo1.jpg".into(),
                    meta_url: "/api/exif/photo1.jpg".into(),
                },
                ImageRef {
                    name: "photo2.png".into(),
                    display_url: "/api/image/photo2.png".into(),
                    meta_url: "/api/exif/photo2.png".into(),
                },
            ]
        );
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let entries = vec![entry("/a/x.jpg", Some("IMAGE/JPEG"))];
        assert!(classify_images(&entries).is_empty());
    }

    #[test]
    fn test_missing_content_type_excluded() {
        let entries = vec![entry("/a/photo.jpg", None)];
        assert!(classify_images(&entries).is_empty());
    }
}
