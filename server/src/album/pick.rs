use super::classify::entry_name;
use crate::dav::AlbumEntry;
use rand::seq::IndexedRandom;
use rand::Rng;

/// `.jpg` / `.jpeg`, any case
pub fn is_jpeg_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".jpeg")
}

/// Entries eligible for random selection, decided by file extension only
pub fn eligible_entries(entries: &[AlbumEntry]) -> Vec<&AlbumEntry> {
    entries
        .iter()
        .filter(|e| is_jpeg_name(entry_name(&e.href)))
        .collect()
}

/// Uniform pick over the eligible set
pub fn choose_entry<'a, R>(eligible: &[&'a AlbumEntry], rng: &mut R) -> Option<&'a AlbumEntry>
where
    R: Rng + ?Sized,
{
    eligible.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(href: &str, content_type: &str) -> AlbumEntry {
        AlbumEntry {
            href: href.to_string(),
            content_type: Some(content_type.to_string()),
        }
    }

    #[test]
    fn test_jpeg_names() {
        for name in ["a.jpg", "a.JPG", "a.jpeg", "a.JPEG", "a.JpEg"] {
            assert!(is_jpeg_name(name), "{}", name);
        }
        for name in ["a.png", "a.cr2", "a.jpg.txt", "jpg", ""] {
            assert!(!is_jpeg_name(name), "{}", name);
        }
    }

    #[test]
    fn test_eligibility_ignores_content_type() {
        let entries = vec![
            entry("/a/raw.cr2", "image/x-canon-cr2"),
            entry("/a/photo2.png", "image/png"),
            entry("/a/photo1.jpg", "image/jpeg"),
            entry("/a/IMG_01.JPEG", "application/octet-stream"),
        ];

        let names: Vec<&str> = eligible_entries(&entries)
            .into_iter()
            .map(|e| entry_name(&e.href))
            .collect();
        assert_eq!(names, vec!["photo1.jpg", "IMG_01.JPEG"]);
    }

    #[test]
    fn test_choose_only_from_eligible() {
        let entries = vec![
            entry("/a/photo1.jpg", "image/jpeg"),
            entry("/a/photo2.png", "image/png"),
            entry("/a/notes.txt", "text/plain"),
        ];
        let eligible = eligible_entries(&entries);
        let mut rng = rand::rng();

        for _ in 0..100 {
            let picked = choose_entry(&eligible, &mut rng).unwrap();
            assert_eq!(entry_name(&picked.href), "photo1.jpg");
        }
    }

    #[test]
    fn test_choose_reaches_every_entry() {
        let entries = vec![entry("/a/1.jpg", "image/jpeg"), entry("/a/2.jpg", "image/jpeg")];
        let eligible = eligible_entries(&entries);
        let mut rng = rand::rng();

        let mut seen = [false; 2];
        for _ in 0..200 {
            let picked = choose_entry(&eligible, &mut rng).unwrap();
            match entry_name(&picked.href) {
                "1.jpg" => seen[0] = true,
                _ => seen[1] = true,
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_choose_from_empty_set() {
        let mut rng = rand::rng();
        assert!(choose_entry(&[], &mut rng).is_none());
    }
}
