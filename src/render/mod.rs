//! Control documents: navigation map, HTML table of contents, package manifest.
//!
//! Each document is produced by rendering a named [`Template`] against a
//! [`Context`] and written into the staging directory, overwriting any
//! previous copy.

mod templates;

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::toc::Heading;
use crate::util::format_file_name;

pub use templates::{NCX_FILE, TOC_FILE};

/// Author written when the book has none.
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// Values substituted into a template.
///
/// Templates read only the fields they need; anything left unset renders
/// as empty (or the template's own default).
#[derive(Debug, Clone, Copy, Default)]
pub struct Context<'a> {
    pub headings: &'a [Heading],
    pub title: Option<&'a str>,
    pub author: Option<&'a str>,
    pub language: Option<&'a str>,
    /// Staged cover image file name.
    pub cover: Option<&'a str>,
    /// Extra staged files to list in the manifest.
    pub assets: &'a [String],
}

impl Context<'_> {
    /// Stable book identifier derived from the title.
    fn identifier(&self) -> String {
        format!(
            "urn:ebookmaker:{}",
            format_file_name(self.title.unwrap_or_default())
        )
    }
}

/// A named control-document template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// NCX navigation map.
    Ncx,
    /// Human-readable table of contents page.
    TocHtml,
    /// OPF package manifest.
    Opf,
}

impl Template {
    pub fn name(&self) -> &'static str {
        match self {
            Template::Ncx => "toc.xml",
            Template::TocHtml => "toc.html",
            Template::Opf => "opf.xml",
        }
    }

    pub fn render(&self, ctx: &Context<'_>) -> String {
        match self {
            Template::Ncx => templates::ncx(ctx),
            Template::TocHtml => templates::toc_html(ctx),
            Template::Opf => templates::opf(ctx),
        }
    }
}

/// Book-level values shared by the navigation map and the manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookInfo<'a> {
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub language: &'a str,
    pub cover: Option<&'a str>,
    pub assets: &'a [String],
}

/// Writes control documents into a directory.
pub struct Renderer<'a> {
    dir: &'a Path,
}

impl<'a> Renderer<'a> {
    pub fn new(dir: &'a Path) -> Self {
        Self { dir }
    }

    fn render_file(&self, template: Template, ctx: &Context<'_>, file_name: &str) -> Result<()> {
        fs::write(self.dir.join(file_name), template.render(ctx))?;
        Ok(())
    }

    /// Render `toc.ncx`; returns the file name.
    pub fn render_toc_ncx(&self, headings: &[Heading], info: &BookInfo<'_>) -> Result<String> {
        let ctx = Context {
            headings,
            title: Some(info.title),
            author: Some(info.author.unwrap_or(DEFAULT_AUTHOR)),
            ..Context::default()
        };
        self.render_file(Template::Ncx, &ctx, NCX_FILE)?;
        Ok(NCX_FILE.to_string())
    }

    /// Render `toc.html`; returns the file name.
    pub fn render_toc_html(&self, headings: &[Heading]) -> Result<String> {
        let ctx = Context {
            headings,
            ..Context::default()
        };
        self.render_file(Template::TocHtml, &ctx, TOC_FILE)?;
        Ok(TOC_FILE.to_string())
    }

    /// Render the package manifest, named after the book title; returns the
    /// file name.
    pub fn render_opf(&self, headings: &[Heading], info: &BookInfo<'_>) -> Result<String> {
        let file_name = manifest_file_name(info.title);
        let ctx = Context {
            headings,
            title: Some(info.title),
            author: Some(info.author.unwrap_or(DEFAULT_AUTHOR)),
            language: Some(info.language),
            cover: info.cover,
            assets: info.assets,
        };
        self.render_file(Template::Opf, &ctx, &file_name)?;
        Ok(file_name)
    }
}

/// Manifest file name for a book title.
pub fn manifest_file_name(title: &str) -> String {
    format!("{}.opf", format_file_name(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;
    use quick_xml::events::Event;

    fn headings() -> Vec<Heading> {
        vec![
            Heading {
                title: "One & Only".to_string(),
                play_order: 2,
                file_name: "OneOnly.html".to_string(),
                children: vec![Heading {
                    title: "Sub".to_string(),
                    play_order: 3,
                    file_name: "Sub.html".to_string(),
                    children: Vec::new(),
                }],
            },
            Heading {
                title: "Two".to_string(),
                play_order: 4,
                file_name: "Two.html".to_string(),
                children: Vec::new(),
            },
        ]
    }

    /// Collect `(local element name, attribute value)` pairs for one attribute.
    fn attr_values(xml: &str, element: &[u8], attr: &[u8]) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut out = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == element => {
                    for a in e.attributes().flatten() {
                        if a.key.as_ref() == attr {
                            out.push(String::from_utf8(a.value.to_vec()).unwrap());
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        out
    }

    #[test]
    fn test_template_names() {
        assert_eq!(Template::Ncx.name(), "toc.xml");
        assert_eq!(Template::TocHtml.name(), "toc.html");
        assert_eq!(Template::Opf.name(), "opf.xml");
    }

    #[test]
    fn test_ncx_play_orders() {
        let hs = headings();
        let ctx = Context {
            headings: &hs,
            title: Some("Book"),
            author: Some("Me"),
            ..Context::default()
        };
        let ncx = Template::Ncx.render(&ctx);

        assert_eq!(attr_values(&ncx, b"navPoint", b"playOrder"), ["1", "2", "3", "4"]);
        assert_eq!(
            attr_values(&ncx, b"content", b"src"),
            ["toc.html", "OneOnly.html", "Sub.html", "Two.html"]
        );
        assert!(ncx.contains("<text>One &amp; Only</text>"));
        assert!(ncx.contains("<docAuthor><text>Me</text></docAuthor>"));
        assert!(ncx.contains("name=\"dtb:depth\" content=\"2\""));
    }

    #[test]
    fn test_toc_html_nests_children() {
        let hs = headings();
        let ctx = Context {
            headings: &hs,
            ..Context::default()
        };
        let html = Template::TocHtml.render(&ctx);

        assert_eq!(
            attr_values(&html, b"a", b"href"),
            ["OneOnly.html", "Sub.html", "Two.html"]
        );
        assert_eq!(html.matches("<ul>").count(), 2);
    }

    #[test]
    fn test_opf_manifest_and_spine() {
        let hs = headings();
        let assets = vec!["pic.png".to_string()];
        let ctx = Context {
            headings: &hs,
            title: Some("My Book"),
            author: Some("Me"),
            language: Some("en"),
            cover: Some("cover.jpg"),
            assets: &assets,
        };
        let opf = Template::Opf.render(&ctx);

        assert_eq!(
            attr_values(&opf, b"item", b"href"),
            ["cover.jpg", "toc.html", "toc.ncx", "OneOnly.html", "Sub.html", "Two.html", "pic.png"]
        );
        assert_eq!(
            attr_values(&opf, b"itemref", b"idref"),
            ["toc", "item-2", "item-3", "item-4"]
        );
        assert!(opf.contains("<dc:title>My Book</dc:title>"));
        assert!(opf.contains("urn:ebookmaker:MyBook"));
        assert!(opf.contains("media-type=\"image/png\""));
    }

    #[test]
    fn test_renderer_writes_files_with_author_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = Renderer::new(dir.path());
        let hs = headings();
        let info = BookInfo {
            title: "My Book",
            language: "en",
            ..BookInfo::default()
        };

        assert_eq!(renderer.render_toc_ncx(&hs, &info).unwrap(), "toc.ncx");
        assert_eq!(renderer.render_toc_html(&hs).unwrap(), "toc.html");
        assert_eq!(renderer.render_opf(&hs, &info).unwrap(), "MyBook.opf");

        let ncx = fs::read_to_string(dir.path().join("toc.ncx")).unwrap();
        assert!(ncx.contains(&format!("<text>{DEFAULT_AUTHOR}</text>")));
        let opf = fs::read_to_string(dir.path().join("MyBook.opf")).unwrap();
        assert!(opf.contains(DEFAULT_AUTHOR));
        assert!(!opf.contains("cover-image"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let hs = headings();
        let ctx = Context {
            headings: &hs,
            title: Some("Book"),
            ..Context::default()
        };
        assert_eq!(Template::Opf.render(&ctx), Template::Opf.render(&ctx));
    }
}
