// Copyright © 2016, Peter Atashian
use crate::{Csrf, Error, Mediawiki};
use log::info;

pub trait Site {
    fn read_text(&self, title: &str) -> Result<String, Error>;
    fn save_text(&self, title: &str, text: &str, summary: &str, minor: bool) -> Result<(), Error>;
}
impl Site for Mediawiki {
    fn read_text(&self, title: &str) -> Result<String, Error> {
        let text = self.read_page(title)?;
        info!("Loaded {} ({} bytes)", title, text.len());
        Ok(text)
    }
    fn save_text(&self, title: &str, text: &str, summary: &str, minor: bool) -> Result<(), Error> {
        let token = self.get_token::<Csrf>()?;
        self.edit_page(&token, title, text, summary, minor)?;
        info!("Saved {}", title);
        Ok(())
    }
}

// Nothing is fetched until the text is asked for.
pub struct Page<'a, S: Site + ?Sized> {
    site: &'a S,
    title: String,
    text: Option<String>,
}
impl<'a, S: Site + ?Sized> Page<'a, S> {
    pub fn new(site: &'a S, title: &str) -> Page<'a, S> {
        Page {
            site,
            title: title.to_owned(),
            text: None,
        }
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    fn load(&mut self) -> Result<(), Error> {
        if self.text.is_none() {
            self.text = Some(self.site.read_text(&self.title)?);
        }
        Ok(())
    }
    pub fn text(&mut self) -> Result<&str, Error> {
        self.load()?;
        Ok(self.text.as_deref().unwrap_or_default())
    }
    pub fn set_text(&mut self, text: String) {
        self.text = Some(text);
    }
    pub fn save(&mut self, summary: &str, minor: bool) -> Result<(), Error> {
        self.load()?;
        let text = self.text.as_deref().unwrap_or_default();
        self.site.save_text(&self.title, text, summary, minor)
    }
}
