//! Render descriptors - what each renderer back-end receives per block.
//!
//! [`render`] is total over block type names: every known type maps to its
//! own descriptor and anything else, including legacy types still stored in
//! old pages, maps to [`RenderDescriptor::Unknown`]. The editor preview, the
//! live canvas and the public page all consume the same descriptors.

use crate::core::block::{Block, BlockId, BlockType, Configuration};
use crate::core::page::Page;
use crate::errors::{Error, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

#[allow(clippy::expect_used)]
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Characters of text shown in a text block preview.
pub const PREVIEW_LEN: usize = 50;

const DEFAULT_OVERLAY_OPACITY: u8 = 40;
const DEFAULT_CUSTOM_HEIGHT: u32 = 48;
const DEFAULT_MAX_WIDTH: &str = "800px";

/// Button label and target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Button label
    pub text: String,
    /// Target URL or path
    pub href: String,
}

/// One image of a gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    /// Image URL
    pub url: String,
    /// Optional caption
    pub caption: Option<String>,
}

/// One FAQ entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaqItem {
    /// The question
    pub question: String,
    /// The answer
    pub answer: String,
}

/// Settings shared by the scroll-triggered entrance animations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    /// Effect name, e.g. `fade` or `slide-up`
    pub effect: String,
    /// Seconds
    pub duration: f64,
    /// Seconds
    pub delay: f64,
    /// Easing curve name
    pub easing: String,
    /// Viewport position that triggers the animation
    pub trigger: String,
    /// Animate only the first time the block enters the viewport
    pub once: bool,
}

/// Structured description of a block for any renderer back-end.
///
/// Each variant carries everything its renderers draw; there are no
/// back-end specific settings outside the descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderDescriptor {
    /// Full-width banner
    Hero {
        /// Headline
        title: Option<String>,
        /// Line below the headline
        subtitle: Option<String>,
        /// Background image
        image_url: Option<String>,
        /// Tint laid over the background image
        overlay_color: String,
        /// Tint strength in percent, 0 to 100. Missing means 40; an explicit
        /// 0 is kept and gives an untinted image.
        overlay_opacity: u8,
        /// Colour of title and subtitle
        text_color: String,
        /// `left`, `center` or `right`
        text_alignment: String,
        /// Named banner height
        height: String,
        /// Main button
        button: Option<Link>,
        /// Main button look, e.g. `outline` or `dark`
        button_style: Option<String>,
        /// Second button, only when switched on
        secondary_button: Option<Link>,
    },
    /// Rich text section
    Text {
        /// Stored HTML
        content: String,
        /// Tag-free excerpt for the editor
        preview: String,
        /// `left`, `center` or `right`
        alignment: String,
        /// Named prose size
        text_size: String,
        /// CSS width limit
        max_width: String,
        /// Text colour override
        text_color: Option<String>,
        /// Section background
        background_color: Option<String>,
    },
    /// Grid of icon features
    FeatureGrid {
        /// Heading
        title: Option<String>,
        /// Line below the heading
        subtitle: Option<String>,
        /// Raw feature entries (`icon`, `title`, `description`)
        features: Vec<Value>,
        /// Number of features
        item_count: usize,
        /// Grid columns, 2 to 4
        columns: u8,
    },
    /// Call to action band
    Cta {
        /// Heading
        title: Option<String>,
        /// Body text
        description: Option<String>,
        /// The action
        button: Option<Link>,
        /// Band background
        background_color: String,
        /// Band text colour
        text_color: String,
    },
    /// Accordion of questions
    Faq {
        /// Heading
        title: Option<String>,
        /// Entries with a question
        items: Vec<FaqItem>,
        /// Number of entries
        item_count: usize,
    },
    /// Embedded video
    Video {
        /// Heading
        title: Option<String>,
        /// `None` until a URL is configured
        embed_url: Option<String>,
        /// Player frame ratio such as `16:9`
        aspect_ratio: String,
        /// CSS width limit
        max_width: String,
        /// Start playing on load
        autoplay: bool,
        /// Show player controls
        controls: bool,
    },
    /// Selected catalog products
    ProductShowcase {
        /// Heading
        title: Option<String>,
        /// Article numbers in display order
        products: Vec<String>,
        /// Number of products
        item_count: usize,
        /// Grid columns, 2 to 4
        columns: u8,
        /// Show prices on the cards
        show_price: bool,
        /// Card look, e.g. `minimal` or `bordered`
        card_style: Option<String>,
    },
    /// Image grid
    ImageGallery {
        /// Heading
        title: Option<String>,
        /// Images with a URL
        images: Vec<GalleryImage>,
        /// Number of images
        item_count: usize,
        /// Grid columns, 1 to 4
        columns: u8,
        /// Named gap between images
        gap: String,
        /// Named tile ratio, e.g. `square` or `wide`
        aspect_ratio: String,
        /// Named corner rounding
        rounded: String,
        /// Open images in a lightbox on click
        enable_lightbox: bool,
    },
    /// Vertical whitespace
    Spacer {
        /// Height in pixels
        height_px: u32,
        /// Draw a line through the middle
        show_line: bool,
    },
    /// Horizontal rule
    Divider {
        /// CSS border style
        style: String,
        /// Line colour
        color: String,
        /// `full`, `medium` or `small`
        width: String,
        /// Line thickness in pixels
        thickness: u32,
    },
    /// Raw HTML, inserted as is
    CustomHtml {
        /// The markup
        html: String,
    },
    /// Image animated into view while scrolling
    ScrollRevealImage {
        /// Image URL
        image: Option<String>,
        /// Alternative text
        alt: String,
        /// Entrance animation
        animation: Animation,
        /// CSS aspect ratio or `auto`
        aspect_ratio: String,
    },
    /// Section over a parallax background
    ScrollParallaxSection {
        /// Background image
        background_image: Option<String>,
        /// Tint over the background
        overlay_color: String,
        /// Background speed factor, -1 to 1
        parallax_speed: f64,
        /// CSS height
        height: String,
        /// Heading
        heading: Option<String>,
        /// Line below the heading
        subheading: Option<String>,
        /// Animation of the text content
        content_animation: String,
        /// Text alignment
        text_align: String,
    },
    /// Pinned section stepping through panels
    PinnedScrollSection {
        /// Section background
        background_color: String,
        /// Scroll length in viewport heights
        pin_duration: f64,
        /// Raw panel entries (`heading`, `text`, `image`)
        panels: Vec<Value>,
        /// Panel change effect
        transition_type: String,
        /// Show a progress indicator
        progress_indicator: bool,
    },
    /// Gallery scrolling sideways
    HorizontalGalleryScroll {
        /// Images with a URL
        images: Vec<GalleryImage>,
        /// Number of images
        item_count: usize,
        /// Section background
        background_color: String,
        /// Named image size
        image_size: String,
        /// Gap in pixels
        gap: u32,
        /// Speed factor
        scroll_speed: f64,
        /// Show image captions
        show_captions: bool,
        /// `left` or `right`
        direction: String,
    },
    /// Timeline built up while scrolling
    ScrollTimeline {
        /// Raw entries (`date`, `title`, `description`, `image`)
        items: Vec<Value>,
        /// Number of entries
        item_count: usize,
        /// Entry layout, e.g. `alternating`
        layout: String,
        /// Colour of the centre line
        line_color: String,
        /// Colour of the entry dots
        dot_color: String,
        /// Entry animation
        item_animation: String,
        /// Delay between entries in seconds
        stagger: f64,
        /// Fill the line while scrolling
        progress_line: bool,
    },
    /// A type name outside the known set
    Unknown {
        /// The stored type name
        block_type: String,
    },
}

impl RenderDescriptor {
    /// True for the descriptor of an unrecognized block type.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}

/// Typed read access to a block configuration.
struct Settings<'a>(&'a Configuration);

impl Settings<'_> {
    /// Non-blank string value.
    fn text(&self, key: &str) -> Option<String> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_string())
    }

    fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Array value; JSON-encoded strings are accepted too, unparsable ones
    /// count as empty.
    fn list(&self, key: &str) -> Vec<Value> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::String(encoded)) => serde_json::from_str::<Vec<Value>>(encoded)
                .unwrap_or_else(|err| {
                    debug!("Ignoring unparsable '{key}' list: {err}");
                    Vec::new()
                }),
            _ => Vec::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn bounded(&self, key: &str, default: u8, min: u8, max: u8) -> u8 {
        self.number(key)
            .map_or(default, |value| value.round().clamp(f64::from(min), f64::from(max)) as u8)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn whole(&self, key: &str, default: u32) -> u32 {
        self.number(key)
            .filter(|value| value.is_finite())
            .map_or(default, |value| value.round().clamp(0.0, f64::from(u32::MAX)) as u32)
    }

    fn link(&self, text_key: &str, href_key: &str) -> Option<Link> {
        Some(Link {
            text: self.text(text_key)?,
            href: self.text_or(href_key, "/"),
        })
    }

    /// Article numbers from a list of strings or of product objects.
    fn article_numbers(&self, key: &str) -> Vec<String> {
        self.list(key).iter().filter_map(article_number).collect()
    }

    fn images(&self, key: &str) -> Vec<GalleryImage> {
        self.list(key).iter().filter_map(gallery_image).collect()
    }
}

fn article_number(value: &Value) -> Option<String> {
    let number = match value {
        Value::String(number) => number.as_str(),
        Value::Object(product) => ["articlenr", "article_number", "id"]
            .iter()
            .find_map(|key| product.get(*key).and_then(Value::as_str))?,
        _ => return None,
    };
    let number = number.trim();
    (!number.is_empty()).then(|| number.to_string())
}

fn gallery_image(value: &Value) -> Option<GalleryImage> {
    match value {
        Value::String(url) if !url.trim().is_empty() => Some(GalleryImage {
            url: url.clone(),
            caption: None,
        }),
        Value::Object(image) => {
            let url = ["url", "image_url", "src"]
                .iter()
                .find_map(|key| image.get(*key).and_then(Value::as_str))
                .filter(|url| !url.trim().is_empty())?;
            Some(GalleryImage {
                url: url.to_string(),
                caption: image
                    .get("caption")
                    .and_then(Value::as_str)
                    .filter(|caption| !caption.is_empty())
                    .map(str::to_string),
            })
        }
        _ => None,
    }
}

/// Strips HTML tags and cuts the text to [`PREVIEW_LEN`] characters,
/// appending `...` only when something was cut.
#[must_use]
pub fn text_preview(html: &str) -> String {
    let plain = HTML_TAG.replace_all(html, "");
    let plain = plain.trim();
    if plain.chars().count() > PREVIEW_LEN {
        let cut: String = plain.chars().take(PREVIEW_LEN).collect();
        format!("{cut}...")
    } else {
        plain.to_string()
    }
}

/// Turns `YouTube` and Vimeo page URLs into embeddable player URLs.
///
/// Other URLs pass through unchanged.
#[must_use]
pub fn video_embed_url(url: &str) -> String {
    let url = url.trim();
    let last_segment = |url: &str| {
        url.split(['?', '#'])
            .next()
            .unwrap_or(url)
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    };

    if url.contains("youtu.be") {
        return format!("https://www.youtube.com/embed/{}", last_segment(url));
    }
    if url.contains("youtube.com") {
        if url.contains("/embed/") {
            return url.to_string();
        }
        let video_id = url
            .split_once('?')
            .map(|(_, query)| query)
            .unwrap_or_default()
            .split('&')
            .find_map(|pair| pair.strip_prefix("v="))
            .unwrap_or_default();
        return format!("https://www.youtube.com/embed/{video_id}");
    }
    if url.contains("vimeo.com") && !url.contains("player.vimeo.com") {
        return format!("https://player.vimeo.com/video/{}", last_segment(url));
    }
    url.to_string()
}

/// Spacer height in pixels for a named size.
#[must_use]
pub fn spacer_height(config: &Configuration) -> u32 {
    let settings = Settings(config);
    match settings.text("height").as_deref() {
        Some("small") => 24,
        Some("large") => 96,
        Some("xl") => 144,
        Some("custom") => settings.whole("custom_height", DEFAULT_CUSTOM_HEIGHT),
        _ => 48,
    }
}

/// Describes a block for the renderer back-ends. Never fails.
#[must_use]
pub fn render(block: &Block) -> RenderDescriptor {
    let Some(kind) = block.kind() else {
        return RenderDescriptor::Unknown {
            block_type: block.block_type.clone(),
        };
    };
    let config = Settings(&block.configuration);

    match kind {
        BlockType::Hero => RenderDescriptor::Hero {
            title: config.text("title"),
            subtitle: config.text("subtitle"),
            image_url: config.text("image_url"),
            overlay_color: config.text_or("overlay_color", "#000000"),
            overlay_opacity: config.bounded("overlay_opacity", DEFAULT_OVERLAY_OPACITY, 0, 100),
            text_color: config.text_or("text_color", "#ffffff"),
            text_alignment: config.text_or("text_alignment", "center"),
            height: config.text_or("height", "large"),
            button: config.link("button_text", "button_link"),
            button_style: config.text("button_style"),
            secondary_button: if config.flag("show_secondary_button", false) {
                config.link("secondary_button_text", "secondary_button_link")
            } else {
                None
            },
        },
        BlockType::Text => {
            let content = config.text("content").unwrap_or_default();
            RenderDescriptor::Text {
                preview: text_preview(&content),
                content,
                alignment: config.text_or("alignment", "left"),
                text_size: config.text_or("text_size", "normal"),
                max_width: config.text_or("max_width", DEFAULT_MAX_WIDTH),
                text_color: config.text("text_color"),
                background_color: config.text("background_color"),
            }
        }
        BlockType::FeatureGrid => {
            let features = config.list("features");
            RenderDescriptor::FeatureGrid {
                title: config.text("title"),
                subtitle: config.text("subtitle"),
                item_count: features.len(),
                features,
                columns: config.bounded("columns", 3, 2, 4),
            }
        }
        BlockType::Cta => RenderDescriptor::Cta {
            title: config.text("title"),
            description: config.text("description"),
            button: config.link("button_text", "button_link"),
            background_color: config.text_or("background_color", "#000000"),
            text_color: config.text_or("text_color", "#ffffff"),
        },
        BlockType::Faq => {
            let key = if block.configuration.contains_key("items") {
                "items"
            } else {
                "faqs"
            };
            let items: Vec<FaqItem> = config
                .list(key)
                .iter()
                .filter_map(|item| {
                    Some(FaqItem {
                        question: item.get("question")?.as_str()?.to_string(),
                        answer: item
                            .get("answer")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    })
                })
                .collect();
            RenderDescriptor::Faq {
                title: config.text("title"),
                item_count: items.len(),
                items,
            }
        }
        BlockType::Video => RenderDescriptor::Video {
            title: config.text("title"),
            embed_url: config.text("video_url").map(|url| video_embed_url(&url)),
            aspect_ratio: config.text("aspect_ratio").unwrap_or_else(|| {
                let vertical = matches!(
                    config.text("layout").as_deref(),
                    Some("vertical_left" | "vertical_right")
                );
                let ratio = if vertical { "9:16" } else { "16:9" };
                ratio.to_string()
            }),
            max_width: config.text_or("max_width", DEFAULT_MAX_WIDTH),
            autoplay: config.flag("autoplay", false),
            controls: config.flag("controls", true),
        },
        BlockType::ProductShowcase => {
            let mut products = config.article_numbers("products");
            if products.is_empty() {
                products = config.article_numbers("product_ids");
            }
            RenderDescriptor::ProductShowcase {
                title: config.text("title"),
                item_count: products.len(),
                products,
                columns: config.bounded("columns", 4, 2, 4),
                show_price: config.flag("show_price", true),
                card_style: config.text("card_style"),
            }
        }
        BlockType::ImageGallery => {
            let images = config.images("images");
            RenderDescriptor::ImageGallery {
                title: config.text("title"),
                item_count: images.len(),
                images,
                columns: config.bounded("columns", 3, 1, 4),
                gap: config.text_or("gap", "medium"),
                aspect_ratio: config.text_or("aspect_ratio", "square"),
                rounded: config.text_or("rounded", "medium"),
                enable_lightbox: config.flag("enable_lightbox", true),
            }
        }
        BlockType::Spacer => RenderDescriptor::Spacer {
            height_px: spacer_height(&block.configuration),
            show_line: config.flag("show_line", false),
        },
        BlockType::Divider => RenderDescriptor::Divider {
            style: config.text_or("style", "solid"),
            color: config.text_or("color", "#e5e7eb"),
            width: config.text_or("width", "full"),
            thickness: config.whole("thickness", 1),
        },
        BlockType::CustomHtml => RenderDescriptor::CustomHtml {
            html: config.text("html").unwrap_or_default(),
        },
        BlockType::ScrollRevealImage => RenderDescriptor::ScrollRevealImage {
            image: config.text("image"),
            alt: config.text_or("alt", ""),
            animation: Animation {
                effect: config.text_or("animation", "fade"),
                duration: config.number_or("duration", 0.8),
                delay: config.number_or("delay", 0.0),
                easing: config.text_or("easing", "power3"),
                trigger: config.text_or("trigger", "75%"),
                once: config.flag("once", true),
            },
            aspect_ratio: config.text_or("aspectRatio", "auto"),
        },
        BlockType::ScrollParallaxSection => RenderDescriptor::ScrollParallaxSection {
            background_image: config.text("backgroundImage"),
            overlay_color: config.text_or("overlayColor", "rgba(0,0,0,0.4)"),
            parallax_speed: config.number_or("parallaxSpeed", 0.5).clamp(-1.0, 1.0),
            height: config.text_or("height", "75vh"),
            heading: config.text("heading"),
            subheading: config.text("subheading"),
            content_animation: config.text_or("contentAnimation", "slide-up"),
            text_align: config.text_or("textAlign", "center"),
        },
        BlockType::PinnedScrollSection => RenderDescriptor::PinnedScrollSection {
            background_color: config.text_or("backgroundColor", "#000000"),
            pin_duration: config.number_or("pinDuration", 2.0),
            panels: config.list("panels"),
            transition_type: config.text_or("transitionType", "fade"),
            progress_indicator: config.flag("progressIndicator", true),
        },
        BlockType::HorizontalGalleryScroll => {
            let images = config.images("images");
            RenderDescriptor::HorizontalGalleryScroll {
                item_count: images.len(),
                images,
                background_color: config.text_or("backgroundColor", "#fafafa"),
                image_size: config.text_or("imageSize", "medium"),
                gap: config.whole("gap", 24),
                scroll_speed: config.number_or("scrollSpeed", 1.0),
                show_captions: config.flag("showCaptions", false),
                direction: config.text_or("direction", "left"),
            }
        }
        BlockType::ScrollTimeline => {
            let items = config.list("items");
            RenderDescriptor::ScrollTimeline {
                item_count: items.len(),
                items,
                layout: config.text_or("layout", "alternating"),
                line_color: config.text_or("lineColor", "#000000"),
                dot_color: config.text_or("dotColor", "#000000"),
                item_animation: config.text_or("itemAnimation", "slide-up"),
                stagger: config.number_or("stagger", 0.1),
                progress_line: config.flag("progressLine", true),
            }
        }
    }
}

/// One line of the editor's block list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    /// German label, or the raw type name for unknown types
    pub label: String,
    /// Shown as "Versteckt" in the editor
    pub hidden: bool,
    /// Short content hint, when the block type has one
    pub detail: Option<String>,
}

/// Editor list entry for a block.
#[must_use]
pub fn summary(block: &Block) -> BlockSummary {
    let detail = match render(block) {
        RenderDescriptor::Hero { title, .. } => title,
        RenderDescriptor::Text { preview, .. } => Some(preview).filter(|p| !p.is_empty()),
        RenderDescriptor::ProductShowcase { item_count, .. } if item_count > 0 => {
            Some(format!("{item_count} Produkt(e) ausgewählt"))
        }
        RenderDescriptor::ImageGallery { item_count, .. } if item_count > 0 => {
            Some(format!("{item_count} Bild(er)"))
        }
        _ => None,
    };
    BlockSummary {
        label: block
            .kind()
            .map_or_else(|| block.block_type.clone(), |kind| kind.label().to_string()),
        hidden: !block.is_visible,
        detail,
    }
}

/// Which back-end a page is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderTarget {
    /// Admin block list; hidden blocks stay, flagged
    EditorPreview,
    /// Live canvas next to the editor
    LiveCanvas,
    /// Public storefront page
    PublicPage,
}

/// A block's descriptor together with its identity on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBlock {
    /// Block identifier
    pub id: BlockId,
    /// Position on the page
    pub order: usize,
    /// Only ever `true` in the editor preview
    pub hidden: bool,
    /// What to draw
    pub descriptor: RenderDescriptor,
}

/// Renders a page's blocks for one back-end.
///
/// # Errors
/// Returns [`Error::PageNotPublished`] when a draft is rendered for the
/// public page.
pub fn render_page(page: &Page, target: RenderTarget) -> Result<Vec<RenderedBlock>> {
    if target == RenderTarget::PublicPage && !page.is_published() {
        return Err(Error::PageNotPublished {
            slug: page.slug.clone(),
        });
    }
    Ok(page
        .blocks
        .iter()
        .filter(|block| block.is_visible || target == RenderTarget::EditorPreview)
        .map(|block| RenderedBlock {
            id: block.id,
            order: block.order,
            hidden: !block.is_visible,
            descriptor: render(block),
        })
        .collect())
}
