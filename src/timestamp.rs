// Copyright © 2016, Peter Atashian
use crate::{Error, Page, Site};
use log::info;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(<!-- (\{\{subst:.+?\}\}) -->).*$").unwrap());

// Only the shape is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpDate(String);
impl DumpDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl FromStr for DumpDate {
    type Err = Error;
    fn from_str(s: &str) -> Result<DumpDate, Error> {
        if DATE.is_match(s) {
            Ok(DumpDate(s.to_owned()))
        } else {
            Err(Error::Date(s.to_owned()))
        }
    }
}
impl fmt::Display for DumpDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Everything after the first marker comment is dropped. Text without a marker
// comes back borrowed.
pub fn rewrite_marker<'t>(text: &'t str, date: &DumpDate) -> Cow<'t, str> {
    MARKER.replace(text, |caps: &Captures| {
        format!("{}\n{}", &caps[1], caps[2].replace("...", date.as_str()))
    })
}

pub fn update_timestamp<S: Site + ?Sized>(
    site: &S,
    title: &str,
    date: &DumpDate,
    summary: &str,
) -> Result<(), Error> {
    let mut page = Page::new(site, title);
    let text = match rewrite_marker(page.text()?, date) {
        Cow::Borrowed(text) => {
            info!("No marker comment on {}, saving text unchanged", title);
            text.to_owned()
        }
        Cow::Owned(text) => text,
    };
    page.set_text(text);
    page.save(summary, false)
}
