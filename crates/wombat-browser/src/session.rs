//! Render session context.
//!
//! A session owns every cache and counter that outlives a single render:
//! declaration and parse caches, the attachment image cache, the
//! attachment id generator and the debug log. It is passed explicitly to
//! the pipeline; nothing here is process-global.

use std::sync::Arc;

use fontdue::Font;
use wombat_common::debug_log::DebugLog;
use wombat_css::{
    AttachmentIdGenerator, DeclarationCache, DefaultAttributeStyler, FontDescriptor, GreedyShaper,
    RenderConfig, StyleContainer, StyleContext, TagRegistry,
};
use wombat_css::style::DEFAULT_FONT_SIZE;
use wombat_dom::ParsedNode;
use wombat_html::ParseCache;

use crate::font_metrics::DocumentFontMetrics;
use crate::image_cache::AttachmentImageCache;

/// The shaping engine a session lays out with.
pub type DocumentShaper = GreedyShaper<DocumentFontMetrics>;

/// Caches, configuration and fonts shared by successive renders.
pub struct RenderSession {
    config: RenderConfig,
    registry: TagRegistry,
    styler: DefaultAttributeStyler,
    declarations: DeclarationCache,
    parses: ParseCache,
    images: AttachmentImageCache,
    ids: AttachmentIdGenerator,
    debug: Arc<DebugLog>,
    font: Option<Arc<Font>>,
    initial: Arc<StyleContainer>,
    metrics: DocumentFontMetrics,
    shaper: Arc<DocumentShaper>,
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl RenderSession {
    /// Create a session with caches sized by `config`, the default tag
    /// registry, approximate font metrics and a disabled debug log.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        let metrics = DocumentFontMetrics::default();
        Self {
            registry: TagRegistry::default(),
            styler: DefaultAttributeStyler,
            declarations: DeclarationCache::new(config.declaration_cache_capacity),
            parses: ParseCache::new(config.parse_cache_capacity),
            images: AttachmentImageCache::from_config(&config),
            ids: AttachmentIdGenerator::new(),
            debug: Arc::new(DebugLog::disabled()),
            font: None,
            initial: Arc::new(StyleContainer::with_font(FontDescriptor::system(
                DEFAULT_FONT_SIZE,
            ))),
            shaper: Arc::new(GreedyShaper::new(metrics.clone())),
            metrics,
            config,
        }
    }

    /// Measure and rasterize with `font`.
    #[must_use]
    pub fn with_font(mut self, font: Font) -> Self {
        let font = Arc::new(font);
        self.metrics = DocumentFontMetrics::for_font(Some(&font));
        self.shaper = Arc::new(GreedyShaper::new(self.metrics.clone()));
        self.font = Some(font);
        self
    }

    /// Replace the tag registry.
    #[must_use]
    pub fn with_registry(mut self, registry: TagRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Record engine events into `debug`.
    #[must_use]
    pub fn with_debug_log(mut self, debug: Arc<DebugLog>) -> Self {
        self.debug = debug;
        self
    }

    /// Parse `html` through the parse cache.
    ///
    /// Restarts attachment ids at zero, so an unchanged document gets the
    /// same ids as its previous render.
    pub fn parse(&self, html: &str) -> Arc<ParsedNode> {
        self.ids.reset();
        self.parses.parse(html, self.config.minify)
    }

    /// Styling inputs for the render-tree builder.
    #[must_use]
    pub fn style_context(&self) -> StyleContext<'_> {
        StyleContext {
            declarations: &self.declarations,
            metrics: &self.metrics,
            ruby_scale: self.config.ruby_scale,
        }
    }

    /// Style of the document root before any attribute applies.
    #[must_use]
    pub fn initial_style(&self) -> Arc<StyleContainer> {
        Arc::clone(&self.initial)
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Tag registry.
    #[must_use]
    pub const fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Attribute styler.
    #[must_use]
    pub const fn styler(&self) -> &DefaultAttributeStyler {
        &self.styler
    }

    /// Declaration cache.
    #[must_use]
    pub const fn declarations(&self) -> &DeclarationCache {
        &self.declarations
    }

    /// Parse cache.
    #[must_use]
    pub const fn parses(&self) -> &ParseCache {
        &self.parses
    }

    /// Attachment image cache.
    #[must_use]
    pub const fn images(&self) -> &AttachmentImageCache {
        &self.images
    }

    /// Attachment id generator.
    #[must_use]
    pub const fn ids(&self) -> &AttachmentIdGenerator {
        &self.ids
    }

    /// Debug log.
    #[must_use]
    pub const fn debug_log(&self) -> &Arc<DebugLog> {
        &self.debug
    }

    /// Loaded font, if any.
    #[must_use]
    pub const fn font(&self) -> Option<&Arc<Font>> {
        self.font.as_ref()
    }

    /// Font metrics.
    #[must_use]
    pub const fn metrics(&self) -> &DocumentFontMetrics {
        &self.metrics
    }

    /// Shaping engine.
    #[must_use]
    pub const fn shaper(&self) -> &Arc<DocumentShaper> {
        &self.shaper
    }
}
