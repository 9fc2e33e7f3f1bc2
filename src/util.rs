//! File naming helpers shared by staging and rendering.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static ILLEGAL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[/\\?%*:|"'<>.,;=\s+&#]+"#).expect("valid file name pattern")
});

/// Strip characters that are unsafe in file names.
///
/// Removes path separators, quotes, wildcards, whitespace and the punctuation
/// that e-readers and shells tend to choke on. The result is used verbatim as
/// a file stem, so two titles that differ only in stripped characters map to
/// the same name.
///
/// Sanitizing is idempotent: a sanitized string contains none of the stripped
/// characters.
///
/// ```
/// use ebookmaker::format_file_name;
///
/// assert_eq!(format_file_name("Chapter 1: Intro"), "Chapter1Intro");
/// ```
pub fn format_file_name(name: &str) -> String {
    ILLEGAL_CHARS.replace_all(name, "").into_owned()
}

/// Guess media type from file extension.
pub(crate) fn guess_media_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xhtml" | "html" | "htm" => "application/xhtml+xml",
        "css" => "text/css",
        "js" => "application/javascript",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ncx" => "application/x-dtbncx+xml",
        "opf" => "application/oebps-package+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_file_name() {
        assert_eq!(format_file_name("a/b\\c"), "abc");
        assert_eq!(format_file_name("Who? What*"), "WhoWhat");
        assert_eq!(format_file_name("\"quoted\" 'single'"), "quotedsingle");
        assert_eq!(format_file_name("1+1=2 & <ok>;"), "112ok");
        assert_eq!(format_file_name("file.name,v#1"), "filenamev1");
        assert_eq!(format_file_name("第一章 开始"), "第一章开始");
    }

    #[test]
    fn test_format_file_name_empty() {
        assert_eq!(format_file_name(""), "");
        assert_eq!(format_file_name(" . "), "");
    }

    #[test]
    fn test_guess_media_type() {
        assert_eq!(guess_media_type("chapter.html"), "application/xhtml+xml");
        assert_eq!(guess_media_type("style.css"), "text/css");
        assert_eq!(guess_media_type("cover.JPG"), "image/jpeg");
        assert_eq!(guess_media_type("notes"), "application/octet-stream");
    }

    proptest! {
        #[test]
        fn prop_format_file_name_is_idempotent(s in ".{0,40}") {
            let once = format_file_name(&s);
            prop_assert_eq!(format_file_name(&once), once.clone());
        }

        #[test]
        fn prop_format_file_name_has_no_separators(s in ".{0,40}") {
            let name = format_file_name(&s);
            prop_assert!(!name.contains('/'));
            prop_assert!(!name.contains('\\'));
            prop_assert!(!name.contains('.'));
            prop_assert!(!name.chars().any(char::is_whitespace));
        }
    }
}
