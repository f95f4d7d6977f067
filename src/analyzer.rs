//! Rule-based scoring of extracted meta tags.
//!
//! Every rule looks at the tags on its own; none sees what an earlier rule
//! produced. Deductions add up, so rule order only decides where issues and
//! recommendations land in the output.

use crate::types::{AnalysisResult, CharacterCounts, Issue, Kind, MetaTags, Recommendation, Severity};

pub const TITLE_MIN: usize = 30;
pub const TITLE_MAX: usize = 60;
pub const DESCRIPTION_MIN: usize = 120;
pub const DESCRIPTION_MAX: usize = 160;

/// Running score at or above which the structured-data tip is added.
pub const STRUCTURED_DATA_THRESHOLD: u32 = 90;

const MAX_SCORE: u32 = 100;

/// What a single rule contributes when it fires.
struct Finding {
    deduction: u32,
    issue: Option<Issue>,
    recommendation: Recommendation,
}

type Rule = fn(&MetaTags) -> Option<Finding>;

/// Applied in this order.
const RULES: &[Rule] = &[title, description, open_graph, twitter_card, viewport];

/// Score `tags` for `url`. Pure and deterministic.
pub fn evaluate(url: &str, tags: &MetaTags) -> AnalysisResult {
    let mut deducted = 0u32;
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    for finding in RULES.iter().filter_map(|rule| rule(tags)) {
        deducted += finding.deduction;
        issues.extend(finding.issue);
        recommendations.push(finding.recommendation);
    }

    let score = MAX_SCORE.saturating_sub(deducted);
    if score >= STRUCTURED_DATA_THRESHOLD {
        recommendations.push(Recommendation {
            kind: Kind::Info,
            title: "Consider Structured Data".into(),
            description: "Add JSON-LD structured data to help search engines better understand your content.".into(),
            priority: Severity::Low,
            field: None,
        });
    }

    AnalysisResult {
        url: url.to_string(),
        meta_tags: tags.clone(),
        score,
        issues,
        recommendations,
        character_counts: CharacterCounts {
            title: char_len(&tags.title),
            description: char_len(&tags.description),
        },
    }
}

/// Empty strings count as missing.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Length in UTF-16 code units.
fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn char_len(value: &Option<String>) -> usize {
    present(value).map_or(0, text_len)
}

fn count_present(values: &[&Option<String>]) -> usize {
    values.iter().filter(|v| present(v).is_some()).count()
}

fn finding(
    deduction: u32,
    kind: Kind,
    field: &str,
    severity: Severity,
    message: &str,
    title: &str,
    description: String,
) -> Finding {
    Finding {
        deduction,
        issue: Some(Issue {
            kind,
            field: field.to_string(),
            message: message.to_string(),
            severity,
        }),
        recommendation: Recommendation {
            kind,
            title: title.to_string(),
            description,
            priority: severity,
            field: Some(field.to_string()),
        },
    }
}

fn title(tags: &MetaTags) -> Option<Finding> {
    let Some(title) = present(&tags.title) else {
        return Some(finding(
            20,
            Kind::Error,
            "title",
            Severity::Critical,
            "Title tag is missing",
            "Add Title Tag",
            "Every page must have a unique, descriptive title tag between 30-60 characters.".into(),
        ));
    };

    let len = text_len(title);
    if len < TITLE_MIN {
        Some(finding(
            5,
            Kind::Warning,
            "title",
            Severity::Medium,
            "Title tag is too short",
            "Expand Title Tag",
            "Title is too short. Consider expanding it to 30-60 characters for better SEO.".into(),
        ))
    } else if len > TITLE_MAX {
        Some(finding(
            5,
            Kind::Warning,
            "title",
            Severity::Medium,
            "Title tag is too long",
            "Shorten Title Tag",
            "Title is too long and may be truncated in search results. Keep it under 60 characters."
                .into(),
        ))
    } else {
        None
    }
}

fn description(tags: &MetaTags) -> Option<Finding> {
    let Some(description) = present(&tags.description) else {
        return Some(finding(
            15,
            Kind::Error,
            "description",
            Severity::High,
            "Meta description is missing",
            "Add Meta Description",
            "Add a compelling meta description between 120-160 characters to improve click-through rates."
                .into(),
        ));
    };

    let len = text_len(description);
    if len < DESCRIPTION_MIN {
        Some(finding(
            5,
            Kind::Warning,
            "description",
            Severity::Medium,
            "Meta description is too short",
            "Expand Meta Description",
            "Meta description is too short. Expand it to 120-160 characters for better visibility."
                .into(),
        ))
    } else if len > DESCRIPTION_MAX {
        Some(finding(
            5,
            Kind::Warning,
            "description",
            Severity::Medium,
            "Meta description is too long",
            "Shorten Meta Description",
            format!(
                "Meta description is {} characters too long and may be truncated in search results.",
                len - DESCRIPTION_MAX
            ),
        ))
    } else {
        None
    }
}

fn open_graph(tags: &MetaTags) -> Option<Finding> {
    const TOTAL: usize = 4;
    let found = count_present(&[&tags.og_title, &tags.og_description, &tags.og_image, &tags.og_url]);

    match found {
        0 => Some(finding(
            10,
            Kind::Warning,
            "og",
            Severity::Medium,
            "Open Graph tags are missing",
            "Add Open Graph Tags",
            "Add Open Graph tags (og:title, og:description, og:image, og:url) to improve social media sharing."
                .into(),
        )),
        n if n < TOTAL => Some(finding(
            5,
            Kind::Warning,
            "og",
            Severity::Low,
            "Some Open Graph tags are missing",
            "Complete Open Graph Tags",
            format!(
                "{} Open Graph tags are missing. Complete the set for better social sharing.",
                TOTAL - n
            ),
        )),
        _ => None,
    }
}

fn twitter_card(tags: &MetaTags) -> Option<Finding> {
    const TOTAL: usize = 3;
    let found = count_present(&[&tags.twitter_card, &tags.twitter_title, &tags.twitter_description]);

    match found {
        0 => Some(finding(
            5,
            Kind::Warning,
            "twitter",
            Severity::Low,
            "Twitter Card tags are missing",
            "Add Twitter Card Tags",
            "Add Twitter Card tags (twitter:card, twitter:title, twitter:description) for better Twitter sharing."
                .into(),
        )),
        // Partial sets cost a little but are not reported as an issue.
        n if n < TOTAL => Some(Finding {
            deduction: 2,
            issue: None,
            recommendation: Recommendation {
                kind: Kind::Info,
                title: "Complete Twitter Card Tags".into(),
                description:
                    "Consider adding missing Twitter Card tags for optimal Twitter sharing experience."
                        .into(),
                priority: Severity::Low,
                field: Some("twitter".into()),
            },
        }),
        _ => None,
    }
}

fn viewport(tags: &MetaTags) -> Option<Finding> {
    if present(&tags.viewport).is_some() {
        return None;
    }
    Some(finding(
        5,
        Kind::Warning,
        "viewport",
        Severity::Medium,
        "Viewport meta tag is missing",
        "Add Viewport Meta Tag",
        "Add viewport meta tag for better mobile responsiveness: <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
            .into(),
    ))
}
