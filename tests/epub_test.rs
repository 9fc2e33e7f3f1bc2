//! EPUB packaging tests.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use ebookmaker::{Book, EpubConfig, Format, PackageConfig};
use tempfile::TempDir;
use zip::ZipArchive;

fn read_entry(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut body = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|e| panic!("missing {name}: {e}"))
        .read_to_string(&mut body)
        .unwrap();
    body
}

fn entry_names(path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(str::to_string).collect()
}

#[test]
fn test_write_epub() {
    let out = TempDir::new().unwrap();
    let dest = out.path().join("t.epub");

    let mut book = Book::new("T", Format::Epub).unwrap();
    book.create_chapter("C1").unwrap().set_content("<p>hi</p>");
    book.save(&dest).unwrap();

    assert_eq!(read_entry(&dest, "C1.html"), "<p>hi</p>");
    let names = entry_names(&dest);
    assert_eq!(names[0], "mimetype");
    for expected in ["T.opf", "toc.ncx", "toc.html", "cover.jpg", "META-INF/container.xml"] {
        assert!(names.contains(&expected.to_string()), "missing {expected}");
    }

    let opf = read_entry(&dest, "T.opf");
    assert!(opf.contains("<dc:title>T</dc:title>"));
    assert!(opf.contains("href=\"C1.html\""));
    assert!(read_entry(&dest, "META-INF/container.xml").contains("full-path=\"T.opf\""));
}

#[test]
fn test_epub_with_subchapters_and_assets() {
    let src = TempDir::new().unwrap();
    let image = src.path().join("diagram.png");
    fs::write(&image, b"not really a png").unwrap();
    let cover = src.path().join("front.png");
    fs::write(&cover, b"cover bytes").unwrap();

    let mut book = Book::new("Field Guide", Format::Epub).unwrap();
    book.set_author("A. Writer").set_language("de");
    book.set_cover_path(&cover).unwrap();
    let part = book.create_chapter("Part I").unwrap();
    part.set_content("<h1>Part I</h1>")
        .add_static_files([&image])
        .unwrap();
    part.create_subchapter("Birds")
        .unwrap()
        .set_content("<p>birds</p>");
    book.create_chapter("Part II").unwrap().set_content("<h1>Part II</h1>");

    let artifact = book.build().unwrap();
    assert_eq!(artifact.file_name().unwrap(), "FieldGuide.epub");

    let names = entry_names(&artifact);
    for expected in ["PartI.html", "Birds.html", "PartII.html", "diagram.png", "cover.png"] {
        assert!(names.contains(&expected.to_string()), "missing {expected}");
    }
    assert!(!names.iter().any(|n| n.ends_with(".epub")));

    let ncx = read_entry(&artifact, "toc.ncx");
    let orders: Vec<_> = ncx
        .match_indices("playOrder=\"")
        .map(|(i, m)| {
            let rest = &ncx[i + m.len()..];
            rest[..rest.find('"').unwrap()].parse::<usize>().unwrap()
        })
        .collect();
    assert_eq!(orders, [1, 2, 3, 4]);
    assert!(ncx.contains("<docAuthor><text>A. Writer</text></docAuthor>"));

    let opf = read_entry(&artifact, "FieldGuide.opf");
    assert!(opf.contains("<dc:language>de</dc:language>"));
    assert!(opf.contains("href=\"diagram.png\" media-type=\"image/png\""));
    assert!(opf.contains("<meta name=\"cover\" content=\"cover-image\"/>"));
    assert_eq!(read_entry(&artifact, "cover.png"), "cover bytes");
}

#[test]
fn test_save_twice_is_byte_identical() {
    let out = TempDir::new().unwrap();
    let dest = out.path().join("book.epub");

    let mut book = Book::new("Same", Format::Epub).unwrap();
    book.set_package_config(PackageConfig {
        epub: EpubConfig {
            compression_level: Some(9),
        },
        ..PackageConfig::default()
    });
    let chapter = book.create_chapter("One").unwrap();
    chapter.set_content("<p>one</p>");
    chapter.create_subchapter("One A").unwrap().set_content("<p>a</p>");

    book.save(&dest).unwrap();
    let first = fs::read(&dest).unwrap();
    book.save(&dest).unwrap();
    let second = fs::read(&dest).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_save_to_artifact_path_is_noop() {
    let mut book = Book::new("Here", Format::Epub).unwrap();
    book.create_chapter("One").unwrap().set_content("<p>1</p>");

    let artifact = book.artifact_path();
    book.save(&artifact).unwrap();
    assert_eq!(read_entry(&artifact, "One.html"), "<p>1</p>");
}

#[test]
fn test_chapter_edits_show_up_in_next_build() {
    let out = TempDir::new().unwrap();
    let dest = out.path().join("book.epub");

    let mut book = Book::new("Edit", Format::Epub).unwrap();
    book.create_chapter("One").unwrap().set_content("<p>old</p>");
    book.save(&dest).unwrap();
    assert_eq!(read_entry(&dest, "One.html"), "<p>old</p>");

    book.create_chapter("Two").unwrap().set_content("<p>two</p>");
    book.save(&dest).unwrap();
    assert_eq!(read_entry(&dest, "Two.html"), "<p>two</p>");
    assert!(read_entry(&dest, "toc.ncx").contains("playOrder=\"3\""));
}
