//! Content blocks - the typed units a page is composed of.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Free-form block configuration; legal keys depend on the block type.
pub type Configuration = Map<String, Value>;

/// The closed set of block types the editor can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Full-width banner with image, title and button
    Hero,
    /// Rich text
    Text,
    /// Grid of features with icons
    FeatureGrid,
    /// Highlighted call to action
    Cta,
    /// Accordion of questions and answers
    Faq,
    /// Embedded `YouTube` or Vimeo video
    Video,
    /// Selected products
    ProductShowcase,
    /// Grid of images
    ImageGallery,
    /// Vertical space
    Spacer,
    /// Horizontal rule
    Divider,
    /// Raw HTML
    CustomHtml,
    /// Image animating into view on scroll
    ScrollRevealImage,
    /// Section with parallax background
    ScrollParallaxSection,
    /// Section pinned while its panels scroll through
    PinnedScrollSection,
    /// Gallery moving sideways on vertical scroll
    HorizontalGalleryScroll,
    /// Timeline revealing its items on scroll
    ScrollTimeline,
}

impl BlockType {
    /// Every block type, in editor menu order.
    pub const ALL: [Self; 16] = [
        Self::Hero,
        Self::Text,
        Self::ImageGallery,
        Self::FeatureGrid,
        Self::Cta,
        Self::Faq,
        Self::Video,
        Self::ProductShowcase,
        Self::Spacer,
        Self::Divider,
        Self::CustomHtml,
        Self::ScrollRevealImage,
        Self::ScrollParallaxSection,
        Self::PinnedScrollSection,
        Self::HorizontalGalleryScroll,
        Self::ScrollTimeline,
    ];

    /// Stored type name, e.g. `feature_grid`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Text => "text",
            Self::FeatureGrid => "feature_grid",
            Self::Cta => "cta",
            Self::Faq => "faq",
            Self::Video => "video",
            Self::ProductShowcase => "product_showcase",
            Self::ImageGallery => "image_gallery",
            Self::Spacer => "spacer",
            Self::Divider => "divider",
            Self::CustomHtml => "custom_html",
            Self::ScrollRevealImage => "scroll_reveal_image",
            Self::ScrollParallaxSection => "scroll_parallax_section",
            Self::PinnedScrollSection => "pinned_scroll_section",
            Self::HorizontalGalleryScroll => "horizontal_gallery_scroll",
            Self::ScrollTimeline => "scroll_timeline",
        }
    }

    /// Parses a stored type name. Unknown and legacy names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// German label shown in the editor.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hero => "Hero Banner",
            Self::Text => "Text Block",
            Self::FeatureGrid => "Feature Grid",
            Self::Cta => "Call to Action",
            Self::Faq => "FAQ",
            Self::Video => "Video",
            Self::ProductShowcase => "Produkt Showcase",
            Self::ImageGallery => "Bildergalerie",
            Self::Spacer => "Abstand",
            Self::Divider => "Trennlinie",
            Self::CustomHtml => "Custom HTML",
            Self::ScrollRevealImage => "Scroll Reveal Bild",
            Self::ScrollParallaxSection => "Parallax Sektion",
            Self::PinnedScrollSection => "Pinned Scroll",
            Self::HorizontalGalleryScroll => "Horizontal Galerie",
            Self::ScrollTimeline => "Scroll Timeline",
        }
    }

    /// True for the five scroll-driven animation blocks.
    #[must_use]
    pub const fn is_scroll_animation(self) -> bool {
        matches!(
            self,
            Self::ScrollRevealImage
                | Self::ScrollParallaxSection
                | Self::PinnedScrollSection
                | Self::HorizontalGalleryScroll
                | Self::ScrollTimeline
        )
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a block, unique within the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub i64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One content unit, owned by exactly one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block identifier
    pub id: BlockId,
    /// Stored type name; may hold legacy names outside [`BlockType`]
    #[serde(rename = "type")]
    pub block_type: String,
    /// Zero-based position within the page
    pub order: usize,
    /// Hidden blocks are kept but not shown publicly
    pub is_visible: bool,
    /// Type-specific settings
    pub configuration: Configuration,
}

impl Block {
    /// Creates a visible block of a known type.
    #[must_use]
    pub fn new(id: BlockId, kind: BlockType, order: usize, configuration: Configuration) -> Self {
        Self {
            id,
            block_type: kind.as_str().to_string(),
            order,
            is_visible: true,
            configuration,
        }
    }

    /// The parsed block type, `None` for unknown names.
    #[must_use]
    pub fn kind(&self) -> Option<BlockType> {
        BlockType::parse(&self.block_type)
    }

    /// String setting, ignoring non-string values.
    #[must_use]
    pub fn str_setting(&self, key: &str) -> Option<&str> {
        self.configuration.get(key).and_then(Value::as_str)
    }
}
