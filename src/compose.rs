// Copyright © 2016, Peter Atashian
use crate::{escape, template, Error, Page, Site};
use std::fs;
use std::path::Path;

pub fn read_source(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        action: "read",
        path: path.to_owned(),
        source,
    })
}

// Without a source the decoded string is used as is, braces and all.
pub fn compose_text(format: &str, source: Option<&str>) -> Result<String, Error> {
    let format = escape::decode(format)?;
    match source {
        Some(content) => template::format_positional(&format, content),
        None => Ok(format.into_owned()),
    }
}

pub fn save_text<S: Site + ?Sized>(site: &S, title: &str, text: String, summary: &str) -> Result<(), Error> {
    let mut page = Page::new(site, title);
    page.set_text(text);
    page.save(summary, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::mock::{RecordingSite, Save};
    use std::io::Write;

    #[test]
    fn no_source_is_decoded_verbatim() {
        assert_eq!(compose_text(r"{{Data}}\n{}", None).unwrap(), "{{Data}}\n{}");
        assert_eq!(compose_text("plain", None).unwrap(), "plain");
    }

    #[test]
    fn source_fills_placeholder() {
        let text = compose_text(r"<pre>\n{}\n</pre>", Some("{\"a\": 1}")).unwrap();
        assert_eq!(text, "<pre>\n{\"a\": 1}\n</pre>");
    }

    #[test]
    fn source_without_placeholder_is_unused() {
        assert_eq!(compose_text(r"fixed\ttext", Some("ignored")).unwrap(), "fixed\ttext");
    }

    #[test]
    fn empty_source_still_formats() {
        assert_eq!(compose_text("[{}] {{x}}", Some("")).unwrap(), "[] {x}");
    }

    #[test]
    fn bad_escape_is_reported() {
        assert!(matches!(compose_text(r"\x", Some("a")), Err(Error::Escape { .. })));
    }

    #[test]
    fn read_source_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "line one\nline two\n").unwrap();
        assert_eq!(read_source(file.path()).unwrap(), "line one\nline two\n");
    }

    #[test]
    fn read_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match read_source(&path) {
            Err(Error::Io { action, path: p, .. }) => {
                assert_eq!(action, "read");
                assert_eq!(p, path);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn save_overwrites_without_loading() {
        let site = RecordingSite::with_page("Module:data/json", "old contents");
        save_text(&site, "Module:data/json", "new".into(), "update data").unwrap();
        assert!(site.reads.borrow().is_empty());
        assert_eq!(
            *site.saves.borrow(),
            [Save {
                title: "Module:data/json".into(),
                text: "new".into(),
                summary: "update data".into(),
                minor: false,
            }]
        );
    }
}
