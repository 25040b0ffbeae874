//! Captcha sessions.

use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderValue, SET_COOKIE};

/// A solved captcha together with the cookies issued alongside it.
///
/// Sessions are never mutated after creation; renewing one replaces it.
pub struct Session {
    timestamp: i64,
    captcha_answer: i64,
    cookies: Arc<Jar>,
}

impl Session {
    pub(crate) fn new(timestamp: i64, captcha_answer: i64, cookies: Arc<Jar>) -> Self {
        Self {
            timestamp,
            captcha_answer,
            cookies,
        }
    }

    /// Epoch milliseconds the captcha was requested at, sent back as `_`.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn captcha_answer(&self) -> i64 {
        self.captcha_answer
    }

    /// `Cookie` header value for a request to `url`, if any cookie applies.
    pub fn cookie_header(&self, url: &Url) -> Option<HeaderValue> {
        self.cookies.cookies(url)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("timestamp", &self.timestamp)
            .field("captcha_answer", &self.captcha_answer)
            .finish_non_exhaustive()
    }
}

/// Record every `Set-Cookie` header of a response in `jar`.
pub(crate) fn store_cookies(jar: &Jar, response: &reqwest::Response) {
    let mut headers = response.headers().get_all(SET_COOKIE).iter();
    jar.set_cookies(&mut headers, response.url());
}
