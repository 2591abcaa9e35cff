//! Locating prompt cards in the source document.

use scraper::{ElementRef, Html, Selector};

use crate::config::SelectorConfig;
use crate::error::{PipelineError, Result};
use crate::models::{PromptRecord, RequiredField};
use crate::utils::normalize_whitespace;

/// Compiled selectors for cards and their fields.
#[derive(Debug, Clone)]
pub struct CardSelectors {
    card: Selector,
    category: Selector,
    title: Selector,
    prompt: Selector,
    image: Selector,
}

impl CardSelectors {
    pub fn from_config(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            card: parse_selector(&config.card)?,
            category: parse_selector(&config.category)?,
            title: parse_selector(&config.title)?,
            prompt: parse_selector(&config.prompt)?,
            image: parse_selector(&config.image)?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PipelineError::Selector(format!("{}: {:?}", css, e)))
}

/// What a single card turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardOutcome {
    Extracted(PromptRecord),
    Skipped {
        /// Best-effort title for the log line (may be empty).
        title: String,
        missing: RequiredField,
    },
}

/// Parse every card in `html`, in document order.
pub fn parse_cards(html: &str, selectors: &CardSelectors) -> Vec<CardOutcome> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.card)
        .map(|card| parse_card(card, selectors))
        .collect()
}

/// Pull fields out of one card. Missing sub-elements become empty strings;
/// a blank required field turns the card into a skip.
fn parse_card(card: ElementRef<'_>, selectors: &CardSelectors) -> CardOutcome {
    let image = card.select(&selectors.image).next();

    let record = PromptRecord {
        title: first_text(card, &selectors.title),
        category: first_text(card, &selectors.category),
        prompt_text: first_text(card, &selectors.prompt),
        image_url: image_attr(image, "src").trim().to_string(),
        image_alt: normalize_whitespace(image_attr(image, "alt")),
    };

    match record.missing_field() {
        Some(missing) => CardOutcome::Skipped {
            title: record.title,
            missing,
        },
        None => CardOutcome::Extracted(record),
    }
}

fn image_attr<'a>(image: Option<ElementRef<'a>>, name: &str) -> &'a str {
    image
        .and_then(|img| img.value().attr(name))
        .unwrap_or_default()
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> String {
    card.select(selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> CardSelectors {
        CardSelectors::from_config(&SelectorConfig::default()).unwrap()
    }

    fn card(category: &str, title: &str, prompt: &str, img: &str) -> String {
        format!(
            r#"<div class="bg-white rounded-xl overflow-hidden shadow-lg hover:shadow-xl transition-shadow duration-300 flex flex-col h-full">
                 {img}
                 <div class="p-4">
                   {category}
                   {title}
                   {prompt}
                 </div>
               </div>"#
        )
    }

    #[test]
    fn test_extracts_all_fields() {
        let html = card(
            r#"<span class="bg-blue-500 text-white text-xs font-bold px-2.5 py-0.5 rounded-full">Portrait</span>"#,
            r#"<h3 class="text-lg font-bold text-gray-800 mb-2 line-clamp-1">  Golden hour </h3>"#,
            "<p class=\"whitespace-pre-wrap line-clamp-3\">warm light,\n\n\t  film grain</p>",
            r#"<img src=" https://cdn.example.com/golden.png " alt="A  portrait">"#,
        );

        let outcomes = parse_cards(&html, &selectors());
        assert_eq!(
            outcomes,
            vec![CardOutcome::Extracted(PromptRecord {
                title: "Golden hour".to_string(),
                category: "Portrait".to_string(),
                prompt_text: "warm light, film grain".to_string(),
                image_url: "https://cdn.example.com/golden.png".to_string(),
                image_alt: "A portrait".to_string(),
            })]
        );
    }

    #[test]
    fn test_missing_image_yields_empty_fields() {
        let html = card(
            r#"<span class="bg-blue-500 rounded-full">Anime</span>"#,
            r#"<h3 class="text-lg font-bold">Sakura</h3>"#,
            r#"<p class="whitespace-pre-wrap">petals</p>"#,
            "",
        );
        match &parse_cards(&html, &selectors())[0] {
            CardOutcome::Extracted(record) => {
                assert!(record.image_url.is_empty());
                assert!(record.image_alt.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_card_without_title_is_skipped() {
        let html = card(
            r#"<span class="bg-blue-500 rounded-full">Anime</span>"#,
            "",
            r#"<p class="whitespace-pre-wrap">petals</p>"#,
            r#"<img src="https://cdn.example.com/x.png">"#,
        );
        assert_eq!(
            parse_cards(&html, &selectors()),
            vec![CardOutcome::Skipped {
                title: String::new(),
                missing: RequiredField::Title,
            }]
        );
    }

    #[test]
    fn test_non_card_markup_is_ignored() {
        let html = r#"<div class="bg-white"><h3 class="text-lg font-bold">Nav</h3></div>"#;
        assert!(parse_cards(html, &selectors()).is_empty());
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let config = SelectorConfig {
            card: "div[".to_string(),
            ..SelectorConfig::default()
        };
        assert!(matches!(
            CardSelectors::from_config(&config),
            Err(PipelineError::Selector(_))
        ));
    }
}
