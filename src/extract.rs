use scraper::{Html, Selector};

use crate::types::MetaTags;

/// Trimmed, with empty mapped to `None`.
fn clean(raw: &str) -> Option<String> {
    let s = raw.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// `attr` of the first element matching `css`. Later duplicates are ignored,
/// even when the first one is empty.
fn first_attr(doc: &Html, css: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(css).ok()?;
    let el = doc.select(&sel).next()?;
    clean(el.value().attr(attr)?)
}

fn meta_name(doc: &Html, name: &str) -> Option<String> {
    first_attr(doc, &format!("meta[name=\"{name}\"]"), "content")
}

fn meta_property(doc: &Html, property: &str) -> Option<String> {
    first_attr(doc, &format!("meta[property=\"{property}\"]"), "content")
}

/// Pull the SEO-relevant tags out of a page. Never fails; broken markup
/// yields whatever the parser recovers.
pub fn extract_meta_tags(html: &str) -> MetaTags {
    let doc = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .and_then(|n| clean(&n.text().collect::<String>()));

    MetaTags {
        title,
        description: meta_name(&doc, "description"),
        keywords: meta_name(&doc, "keywords"),
        og_title: meta_property(&doc, "og:title"),
        og_description: meta_property(&doc, "og:description"),
        og_image: meta_property(&doc, "og:image"),
        og_url: meta_property(&doc, "og:url"),
        og_type: meta_property(&doc, "og:type"),
        twitter_card: meta_name(&doc, "twitter:card"),
        twitter_title: meta_name(&doc, "twitter:title"),
        twitter_description: meta_name(&doc, "twitter:description"),
        twitter_image: meta_name(&doc, "twitter:image"),
        twitter_site: meta_name(&doc, "twitter:site"),
        viewport: meta_name(&doc, "viewport"),
        robots: meta_name(&doc, "robots"),
        canonical: first_attr(&doc, "link[rel=\"canonical\"]", "href"),
    }
}
