//! Block templates offered by the page editor.

use crate::core::block::{BlockType, Configuration};
use serde::Serialize;
use serde_json::{Value, json};

/// Editor template for one block type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockTemplate {
    /// Block type the template creates
    pub block_type: BlockType,
    /// German label
    pub label: &'static str,
    /// Short German description
    pub description: &'static str,
    /// Icon name used by the editor
    pub icon: &'static str,
    /// Configuration a new block starts with
    pub default_config: Configuration,
}

fn object(value: Value) -> Configuration {
    match value {
        Value::Object(map) => map,
        _ => Configuration::new(),
    }
}

const fn describe(kind: BlockType) -> (&'static str, &'static str) {
    match kind {
        BlockType::Hero => ("Bild, Titel und Button über die volle Breite", "Image"),
        BlockType::Text => ("Formatierter Textinhalt", "FileText"),
        BlockType::ImageGallery => ("Bilderraster mit optionalen Beschriftungen", "Grid"),
        BlockType::FeatureGrid => ("Raster von Vorteilen mit Icons", "LayoutGrid"),
        BlockType::Cta => ("Hervorgehobener Handlungsaufruf", "MousePointer"),
        BlockType::Faq => ("Häufige Fragen als Akkordeon", "HelpCircle"),
        BlockType::Video => ("Eingebettetes YouTube- oder Vimeo-Video", "Video"),
        BlockType::ProductShowcase => ("Ausgewählte Produkte anzeigen", "ShoppingBag"),
        BlockType::Spacer => ("Vertikaler Abstand zwischen Blöcken", "Minus"),
        BlockType::Divider => ("Horizontale Trennlinie", "Minus"),
        BlockType::CustomHtml => ("Eigener HTML-Code", "Code"),
        BlockType::ScrollRevealImage => ("Bild, das beim Scrollen eingeblendet wird", "image"),
        BlockType::ScrollParallaxSection => ("Sektion mit Parallax-Hintergrund", "layers"),
        BlockType::PinnedScrollSection => {
            ("Fixierte Sektion mit durchlaufenden Panels", "pin")
        }
        BlockType::HorizontalGalleryScroll => {
            ("Galerie, die beim Scrollen seitlich läuft", "gallery")
        }
        BlockType::ScrollTimeline => ("Zeitleiste, die sich beim Scrollen aufbaut", "timeline"),
    }
}

/// Configuration a freshly added block of `kind` starts with.
#[must_use]
pub fn default_configuration(kind: BlockType) -> Configuration {
    let value = match kind {
        BlockType::Hero => json!({
            "image_url": "",
            "title": "Hero Title",
            "subtitle": "Subtitle text goes here",
            "button_text": "Learn More",
            "button_link": "/",
            "overlay_opacity": 40,
            "text_alignment": "center",
            "height": "large"
        }),
        BlockType::Text => json!({
            "content": "<p>Enter your content here...</p>",
            "alignment": "left",
            "max_width": "800px"
        }),
        BlockType::ImageGallery => json!({
            "title": "",
            "images": [],
            "columns": 3,
            "gap": "medium"
        }),
        BlockType::FeatureGrid => json!({
            "title": "Our Features",
            "subtitle": "",
            "features": [
                {"icon": "Star", "title": "Feature 1", "description": "Description here"},
                {"icon": "Heart", "title": "Feature 2", "description": "Description here"},
                {"icon": "Shield", "title": "Feature 3", "description": "Description here"}
            ],
            "columns": 3
        }),
        BlockType::Cta => json!({
            "title": "Ready to get started?",
            "description": "Take action today",
            "button_text": "Get Started",
            "button_link": "/",
            "background_color": "#000000",
            "text_color": "#ffffff"
        }),
        BlockType::Faq => json!({
            "title": "Frequently Asked Questions",
            "items": [
                {"question": "Question 1?", "answer": "Answer 1"},
                {"question": "Question 2?", "answer": "Answer 2"}
            ]
        }),
        BlockType::Video => json!({
            "title": "",
            "video_url": "",
            "autoplay": false,
            "controls": true
        }),
        BlockType::ProductShowcase => json!({
            "title": "Featured Products",
            "product_ids": [],
            "columns": 4
        }),
        BlockType::Spacer => json!({"height": "medium", "custom_height": 48}),
        BlockType::Divider => json!({"style": "solid", "color": "#e5e7eb", "width": "full"}),
        BlockType::CustomHtml => json!({"html": ""}),
        BlockType::ScrollRevealImage => json!({
            "image": "/placeholder.jpg",
            "alt": "Scroll reveal image",
            "animation": "fade",
            "duration": 0.8,
            "delay": 0,
            "easing": "power3",
            "trigger": "75%",
            "once": true,
            "aspectRatio": "auto"
        }),
        BlockType::ScrollParallaxSection => json!({
            "backgroundImage": "/placeholder-bg.jpg",
            "overlayColor": "rgba(0,0,0,0.4)",
            "parallaxSpeed": 0.5,
            "height": "75vh",
            "heading": "Parallax Section",
            "subheading": "Scroll to see the effect",
            "contentAnimation": "slide-up",
            "textAlign": "center"
        }),
        BlockType::PinnedScrollSection => json!({
            "backgroundColor": "#000000",
            "pinDuration": 2,
            "panels": [
                {"heading": "Innovation", "text": "Pushing boundaries with cutting-edge technology", "image": ""},
                {"heading": "Design", "text": "Crafted with precision and attention to detail", "image": ""},
                {"heading": "Performance", "text": "Engineered for maximum efficiency", "image": ""}
            ],
            "transitionType": "fade",
            "progressIndicator": true
        }),
        BlockType::HorizontalGalleryScroll => json!({
            "images": [],
            "backgroundColor": "#fafafa",
            "imageSize": "medium",
            "gap": 24,
            "scrollSpeed": 1,
            "showCaptions": false,
            "direction": "left"
        }),
        BlockType::ScrollTimeline => json!({
            "items": [
                {"date": "2024", "title": "Launch", "description": "Initial product launch", "image": ""},
                {"date": "2025", "title": "Growth", "description": "Expanding our reach", "image": ""},
                {"date": "2026", "title": "Innovation", "description": "Next generation features", "image": ""}
            ],
            "layout": "alternating",
            "lineColor": "#000000",
            "dotColor": "#000000",
            "itemAnimation": "slide-up",
            "stagger": 0.1,
            "progressLine": true
        }),
    };
    object(value)
}

/// The template for one block type.
#[must_use]
pub fn template(kind: BlockType) -> BlockTemplate {
    let (description, icon) = describe(kind);
    BlockTemplate {
        block_type: kind,
        label: kind.label(),
        description,
        icon,
        default_config: default_configuration(kind),
    }
}

/// Templates for every block type, in editor menu order.
#[must_use]
pub fn templates() -> Vec<BlockTemplate> {
    BlockType::ALL.into_iter().map(template).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_a_template() {
        let all = templates();
        assert_eq!(all.len(), BlockType::ALL.len());
        for template in &all {
            assert!(!template.label.is_empty());
            assert!(!template.icon.is_empty());
        }
        assert!(all.iter().all(|t| !t.default_config.is_empty()));
    }

    #[test]
    fn test_default_configuration_values() {
        let hero = default_configuration(BlockType::Hero);
        assert_eq!(hero["overlay_opacity"], 40);
        assert_eq!(hero["title"], "Hero Title");

        let spacer = default_configuration(BlockType::Spacer);
        assert_eq!(spacer["custom_height"], 48);

        let timeline = default_configuration(BlockType::ScrollTimeline);
        assert_eq!(timeline["items"].as_array().map(Vec::len), Some(3));
    }
}
