// src/source/mod.rs
pub mod html;

use anyhow::Result;
use once_cell::sync::OnceCell;
use regex::Regex;

/// Placeholder used when an item carries no usable time label.
pub const UNKNOWN_TIME: &str = "Unknown time";

/// One short news item, newest first in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub time_label: String,
    pub heading: String,
    pub body: String,
}

impl NewsItem {
    pub fn new(
        time_label: impl Into<String>,
        heading: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            time_label: time_label.into(),
            heading: heading.into(),
            body: body.into(),
        }
    }
}

/// Ordered list of items as fetched (newest first).
pub type Batch = Vec<NewsItem>;

#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self) -> Result<Batch>;
    fn name(&self) -> &str;
}

/// Strip photo credits and share-link residue from a scraped body and make
/// sure every period is followed by a space.
pub fn clean_body(s: &str) -> String {
    static RE_PHOTO: OnceCell<Regex> = OnceCell::new();
    let re_photo = RE_PHOTO.get_or_init(|| Regex::new(r"\(Foto.+\)").unwrap());
    let out = re_photo.replace_all(s, "");
    let out = out
        .replace("/ritzau/", "")
        .replace("/Ritzau/", "")
        .replace("FacebookTwitterKopier Link", "");
    space_after_period(&out)
}

fn space_after_period(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut pending = false;
    for c in s.chars() {
        if c == '.' {
            pending = true;
        } else if pending {
            pending = false;
            if c != ' ' {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}

/// Fixed batch, used by tests and by the debug replay path.
pub struct StaticNewsSource {
    items: Batch,
}

impl StaticNewsSource {
    pub fn new(items: Batch) -> Self {
        Self { items }
    }
}

#[async_trait::async_trait]
impl NewsSource for StaticNewsSource {
    async fn fetch(&self) -> Result<Batch> {
        Ok(self.items.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_credit_and_agency_tag_removed() {
        let s = "Politiet efterforsker. (Foto: Ida Marie Odgaard © Ritzau Scanpix)/ritzau/";
        assert_eq!(clean_body(s), "Politiet efterforsker. ");
    }

    #[test]
    fn period_gets_trailing_space() {
        assert_eq!(clean_body("Slut.Ny sætning. Ok."), "Slut. Ny sætning. Ok.");
    }

    #[test]
    fn consecutive_periods_only_space_once() {
        assert_eq!(clean_body("Vent...nu"), "Vent... nu");
    }

    #[test]
    fn share_caption_removed() {
        assert_eq!(clean_body("TekstFacebookTwitterKopier Link"), "Tekst");
    }
}
