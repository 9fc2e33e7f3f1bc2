//! The three control-document templates.
//!
//! Each template is a plain function of a [`Context`]; output depends on
//! nothing else, so rendering the same context twice yields identical text.

use std::fmt::Write;

use quick_xml::escape::escape;

use super::Context;
use crate::toc::{self, Heading, ROOT_PLAY_ORDER};

pub const TOC_FILE: &str = "toc.html";
pub const NCX_FILE: &str = "toc.ncx";
const TOC_LABEL: &str = "Table of Contents";

pub(super) fn ncx(ctx: &Context<'_>) -> String {
    let title = escape(ctx.title.unwrap_or_default());
    let author = escape(ctx.author.unwrap_or_default());
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
"#,
    );
    let _ = writeln!(
        ncx,
        "    <meta name=\"dtb:uid\" content=\"{}\"/>",
        escape(&ctx.identifier())
    );
    let _ = writeln!(
        ncx,
        "    <meta name=\"dtb:depth\" content=\"{}\"/>",
        toc::depth(ctx.headings).max(1)
    );
    ncx.push_str(
        r#"    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
"#,
    );
    let _ = writeln!(ncx, "  <docTitle><text>{title}</text></docTitle>");
    let _ = writeln!(ncx, "  <docAuthor><text>{author}</text></docAuthor>");
    ncx.push_str("  <navMap>\n");
    let _ = writeln!(
        ncx,
        "    <navPoint id=\"navPoint-{ROOT_PLAY_ORDER}\" playOrder=\"{ROOT_PLAY_ORDER}\">"
    );
    let _ = writeln!(ncx, "      <navLabel><text>{TOC_LABEL}</text></navLabel>");
    let _ = writeln!(ncx, "      <content src=\"{TOC_FILE}\"/>");
    ncx.push_str("    </navPoint>\n");
    write_nav_points(&mut ncx, ctx.headings, 2);
    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

fn write_nav_points(ncx: &mut String, headings: &[Heading], indent: usize) {
    let pad = "  ".repeat(indent);

    for h in headings {
        let _ = writeln!(
            ncx,
            "{pad}<navPoint id=\"navPoint-{0}\" playOrder=\"{0}\">",
            h.play_order
        );
        let _ = writeln!(
            ncx,
            "{pad}  <navLabel><text>{}</text></navLabel>",
            escape(&h.title)
        );
        let _ = writeln!(ncx, "{pad}  <content src=\"{}\"/>", escape(&h.file_name));
        write_nav_points(ncx, &h.children, indent + 1);
        let _ = writeln!(ncx, "{pad}</navPoint>");
    }
}

pub(super) fn toc_html(ctx: &Context<'_>) -> String {
    let mut html = String::new();
    html.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
  <meta http-equiv="Content-Type" content="text/html; charset=utf-8"/>
"#,
    );
    let _ = writeln!(html, "  <title>{TOC_LABEL}</title>");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "  <h1>{TOC_LABEL}</h1>");
    write_list(&mut html, ctx.headings, 1);
    html.push_str("</body>\n</html>\n");
    html
}

fn write_list(html: &mut String, headings: &[Heading], indent: usize) {
    if headings.is_empty() {
        return;
    }
    let pad = "  ".repeat(indent);
    let _ = writeln!(html, "{pad}<ul>");
    for h in headings {
        let link = format!(
            "<a href=\"{}\">{}</a>",
            escape(&h.file_name),
            escape(&h.title)
        );
        if h.children.is_empty() {
            let _ = writeln!(html, "{pad}  <li>{link}</li>");
        } else {
            let _ = writeln!(html, "{pad}  <li>{link}");
            write_list(html, &h.children, indent + 2);
            let _ = writeln!(html, "{pad}  </li>");
        }
    }
    let _ = writeln!(html, "{pad}</ul>");
}

pub(super) fn opf(ctx: &Context<'_>) -> String {
    let title = escape(ctx.title.unwrap_or_default());
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
    );
    let _ = writeln!(opf, "    <dc:title>{title}</dc:title>");
    let _ = writeln!(
        opf,
        "    <dc:creator opf:role=\"aut\">{}</dc:creator>",
        escape(ctx.author.unwrap_or_default())
    );
    let _ = writeln!(
        opf,
        "    <dc:language>{}</dc:language>",
        escape(ctx.language.unwrap_or("en"))
    );
    let _ = writeln!(
        opf,
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>",
        escape(&ctx.identifier())
    );
    if ctx.cover.is_some() {
        opf.push_str("    <meta name=\"cover\" content=\"cover-image\"/>\n");
    }
    opf.push_str("  </metadata>\n  <manifest>\n");

    if let Some(cover) = ctx.cover {
        write_item(&mut opf, "cover-image", cover);
    }
    write_item(&mut opf, "toc", TOC_FILE);
    write_item(&mut opf, "ncx", NCX_FILE);
    let mut spine = Vec::new();
    for_each_heading(ctx.headings, &mut |h| {
        let id = format!("item-{}", h.play_order);
        write_item(&mut opf, &id, &h.file_name);
        spine.push(id);
    });
    for (i, asset) in ctx.assets.iter().enumerate() {
        write_item(&mut opf, &format!("asset-{i}"), asset);
    }

    opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");
    opf.push_str("    <itemref idref=\"toc\"/>\n");
    for id in &spine {
        let _ = writeln!(opf, "    <itemref idref=\"{id}\"/>");
    }
    opf.push_str("  </spine>\n  <guide>\n");
    let _ = writeln!(
        opf,
        "    <reference type=\"toc\" title=\"{TOC_LABEL}\" href=\"{TOC_FILE}\"/>"
    );
    if let Some(first) = ctx.headings.first() {
        let _ = writeln!(
            opf,
            "    <reference type=\"text\" title=\"{}\" href=\"{}\"/>",
            escape(&first.title),
            escape(&first.file_name)
        );
    }
    opf.push_str("  </guide>\n</package>\n");
    opf
}

fn write_item(opf: &mut String, id: &str, href: &str) {
    let _ = writeln!(
        opf,
        "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>",
        escape(id),
        escape(href),
        crate::util::guess_media_type(href)
    );
}

fn for_each_heading(headings: &[Heading], f: &mut impl FnMut(&Heading)) {
    for h in headings {
        f(h);
        for_each_heading(&h.children, f);
    }
}
