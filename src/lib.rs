// Copyright © 2014, Peter Atashian

use cookie::{Cookie, CookieJar};
use log::{debug, info};
use reqwest::blocking::{Client, Response};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::Method;
use serde::Deserialize;
use std::cell::RefCell;
use std::fs;
use std::io::Error as IoError;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub mod compose;
pub mod escape;
pub mod page;
pub mod template;
pub mod timestamp;

pub use page::{Page, Site};

pub type Json = serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected response: {0}")]
    Json(Json),
    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: IoError,
    },
    #[error("login failed: {0}")]
    Login(Json),
    #[error("API error {code}: {info}")]
    Api { code: String, info: String },
    #[error("page '{0}' does not exist")]
    MissingPage(String),
    #[error("Date '{0}' should be in yyyy-mm-dd format")]
    Date(String),
    #[error("can't decode escape at position {position}: {message}")]
    Escape {
        position: usize,
        message: &'static str,
    },
    #[error("bad format string at position {position}: {message}")]
    Format {
        position: usize,
        message: &'static str,
    },
}

trait JsonFun {
    fn field(&self, key: &str) -> Result<&Json, Error>;
    fn string(&self) -> Result<&str, Error>;
}
impl JsonFun for Json {
    fn field(&self, key: &str) -> Result<&Json, Error> {
        self.get(key).ok_or_else(|| Error::Json(self.clone()))
    }
    fn string(&self) -> Result<&str, Error> {
        self.as_str().ok_or_else(|| Error::Json(self.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub useragent: String,
    pub username: String,
    pub password: String,
    pub baseapi: String,
}

pub trait TokenType {
    const NAME: &'static str;
}
#[derive(Debug)]
pub struct Csrf;
impl TokenType for Csrf {
    const NAME: &'static str = "csrf";
}
#[derive(Debug)]
pub struct Login;
impl TokenType for Login {
    const NAME: &'static str = "login";
}
#[derive(Debug)]
pub struct Token<T: TokenType>(pub String, PhantomData<T>);

pub struct Mediawiki {
    client: Client,
    cookies: RefCell<CookieJar>,
    config: Config,
}
impl Mediawiki {
    fn do_request(&self, method: Method, args: &[(String, String)]) -> Result<Response, Error> {
        let mut request = self.client.request(method.clone(), &self.config.baseapi);
        request = if method == Method::POST {
            request.form(args)
        } else {
            request.query(args)
        };
        let cookies = self
            .cookies
            .borrow()
            .iter()
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect::<Vec<_>>()
            .join("; ");
        if !cookies.is_empty() {
            request = request.header(COOKIE, cookies);
        }
        let response = request.send()?.error_for_status()?;
        let mut jar = self.cookies.borrow_mut();
        for value in response.headers().get_all(SET_COOKIE) {
            if let Some(cookie) = value.to_str().ok().and_then(|v| Cookie::parse(v.to_owned()).ok()) {
                jar.add(cookie);
            }
        }
        Ok(response)
    }
    fn call(&self, method: Method, args: &[(String, String)]) -> Result<Json, Error> {
        debug!(
            "{} action={:?}",
            method,
            args.iter().find(|(k, _)| k == "action").map(|(_, v)| v)
        );
        let body = self.do_request(method, args)?.text()?;
        let json: Json = serde_json::from_str(&body)?;
        check_error(&json)?;
        Ok(json)
    }
    pub fn request(&self) -> RequestBuilder {
        RequestBuilder {
            mw: self,
            args: vec![
                ("format".into(), "json".into()),
                ("formatversion".into(), "2".into()),
            ],
        }
    }
    pub fn get_token<T: TokenType>(&self) -> Result<Token<T>, Error> {
        let mut request = self.request();
        request.arg("action", "query");
        request.arg("meta", "tokens");
        request.arg("type", T::NAME);
        let json = request.get()?;
        let token = json
            .field("query")?
            .field("tokens")?
            .field(&format!("{}token", T::NAME))?
            .string()?;
        Ok(Token(token.to_owned(), PhantomData))
    }
    fn do_login(&self, token: &str, retry: bool) -> Result<(), Error> {
        let mut request = self.request();
        request.arg("action", "login");
        request.arg("lgname", &*self.config.username);
        request.arg("lgpassword", &*self.config.password);
        request.arg("lgtoken", token);
        let json = request.post()?;
        let inner = json.field("login")?;
        match inner.field("result")?.string()? {
            "NeedToken" if retry => self.do_login(inner.field("token")?.string()?, false),
            "Success" => {
                info!("Logged in to MediaWiki as {}", self.config.username);
                Ok(())
            }
            _ => Err(Error::Login(json.clone())),
        }
    }
    pub fn login(config: Config) -> Result<Mediawiki, Error> {
        let client = Client::builder().user_agent(config.useragent.clone()).build()?;
        let mw = Mediawiki {
            client,
            cookies: RefCell::new(CookieJar::new()),
            config,
        };
        let token = mw.get_token::<Login>()?;
        mw.do_login(&token.0, true)?;
        Ok(mw)
    }
    pub fn login_path<P: AsRef<Path>>(path: P) -> Result<Mediawiki, Error> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| Error::Io {
            action: "read config",
            path: path.to_owned(),
            source,
        })?;
        let config: Config = serde_json::from_str(&data)?;
        Mediawiki::login(config)
    }
    pub fn read_page(&self, title: &str) -> Result<String, Error> {
        let mut request = self.request();
        request.arg("action", "query");
        request.arg("prop", "revisions");
        request.arg("rvprop", "content");
        request.arg("rvslots", "main");
        request.arg("titles", title);
        page_text(&request.get()?, title)
    }
    pub fn edit_page(
        &self,
        token: &Token<Csrf>,
        title: &str,
        text: &str,
        summary: &str,
        minor: bool,
    ) -> Result<Json, Error> {
        let mut request = self.request();
        request.arg("action", "edit");
        request.arg("title", title);
        request.arg("text", text);
        request.arg("summary", summary);
        request.arg(if minor { "minor" } else { "notminor" }, "1");
        request.arg("token", &*token.0);
        let json = request.post()?;
        edit_result(&json)?;
        Ok(json)
    }
}

pub struct RequestBuilder<'a> {
    mw: &'a Mediawiki,
    args: Vec<(String, String)>,
}
impl<'a> RequestBuilder<'a> {
    pub fn arg<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.args.push((key.into(), value.into()));
    }
    pub fn get(&self) -> Result<Json, Error> {
        self.mw.call(Method::GET, &self.args)
    }
    pub fn post(&self) -> Result<Json, Error> {
        self.mw.call(Method::POST, &self.args)
    }
}

fn check_error(json: &Json) -> Result<(), Error> {
    match json.get("error") {
        Some(error) => Err(Error::Api {
            code: error.field("code")?.string()?.to_owned(),
            info: error.get("info").and_then(Json::as_str).unwrap_or_default().to_owned(),
        }),
        None => Ok(()),
    }
}

fn page_text(json: &Json, title: &str) -> Result<String, Error> {
    let page = json
        .field("query")?
        .field("pages")?
        .get(0)
        .ok_or_else(|| Error::Json(json.clone()))?;
    if page.get("missing").is_some() || page.get("invalid").is_some() {
        return Err(Error::MissingPage(title.to_owned()));
    }
    let content = page
        .field("revisions")?
        .get(0)
        .ok_or_else(|| Error::Json(page.clone()))?
        .field("slots")?
        .field("main")?
        .field("content")?
        .string()?;
    Ok(content.to_owned())
}

fn edit_result(json: &Json) -> Result<(), Error> {
    let edit = json.field("edit")?;
    match edit.field("result")?.string()? {
        "Success" => Ok(()),
        result => Err(Error::Api {
            code: result.to_owned(),
            info: edit.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_text_reads_main_slot() {
        let json = json!({
            "batchcomplete": true,
            "query": {"pages": [{
                "pageid": 12,
                "ns": 0,
                "title": "Data",
                "revisions": [{"slots": {"main": {
                    "contentmodel": "wikitext",
                    "contentformat": "text/x-wiki",
                    "content": "hello\nworld"
                }}}]
            }]}
        });
        assert_eq!(page_text(&json, "Data").unwrap(), "hello\nworld");
    }

    #[test]
    fn page_text_missing_page() {
        let json = json!({"query": {"pages": [{"ns": 0, "title": "Nope", "missing": true}]}});
        match page_text(&json, "Nope") {
            Err(Error::MissingPage(title)) => assert_eq!(title, "Nope"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn page_text_invalid_title() {
        let json = json!({"query": {"pages": [{
            "title": "<bad>",
            "invalidreason": "The requested page title contains invalid characters",
            "invalid": true
        }]}});
        assert!(matches!(page_text(&json, "<bad>"), Err(Error::MissingPage(_))));
    }

    #[test]
    fn page_text_malformed_response() {
        let json = json!({"query": {}});
        assert!(matches!(page_text(&json, "Data"), Err(Error::Json(_))));
    }

    #[test]
    fn api_error_is_surfaced() {
        let json = json!({"error": {"code": "badtoken", "info": "Invalid CSRF token."}});
        match check_error(&json) {
            Err(Error::Api { code, info }) => {
                assert_eq!(code, "badtoken");
                assert_eq!(info, "Invalid CSRF token.");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(check_error(&json!({"edit": {}})).is_ok());
    }

    #[test]
    fn edit_result_success_and_failure() {
        let ok = json!({"edit": {"result": "Success", "pageid": 3, "title": "Data", "nochange": true}});
        assert!(edit_result(&ok).is_ok());
        let failed = json!({"edit": {"result": "Failure", "captcha": {}}});
        match edit_result(&failed) {
            Err(Error::Api { code, .. }) => assert_eq!(code, "Failure"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn config_from_json() {
        let config: Config = serde_json::from_str(
            r#"{"useragent": "bot", "username": "u", "password": "p", "baseapi": "https://example.org/api.php"}"#,
        )
        .unwrap();
        assert_eq!(config.baseapi, "https://example.org/api.php");
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::Date("2024/06/01".into()).to_string(),
            "Date '2024/06/01' should be in yyyy-mm-dd format"
        );
        let err = Error::Io {
            action: "read config",
            path: PathBuf::from("wiki.json"),
            source: IoError::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("failed to read config wiki.json: "));
    }
}
