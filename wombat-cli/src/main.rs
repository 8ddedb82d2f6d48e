//! Wombat CLI
//!
//! Renders a document headlessly and prints its parsed tree, render tree,
//! block spacing and settled attachment frames.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use owo_colors::OwoColorize;
use wombat_browser::{RenderSession, RenderedDocument, find_system_font, load_font, render_document};
use wombat_common::debug_log::DebugLog;
use wombat_css::{BlockElement, InlineContent, RenderConfig, RenderElement, TEXT_TAG};
use wombat_dom::print_tree;

/// Wombat: render-tree and attachment layout inspector
#[derive(Parser, Debug)]
#[command(name = "wombat")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Inspect a file
    wombat ./page.html

    # Parse inline HTML in a 320px container
    wombat --width 320 --html '<p>Hello <img width="16" height="16"> world</p>'

    # Ruby measured with a real font
    wombat --font ./NotoSansJP.ttf --html '<ruby>漢字<rt>かんじ</rt></ruby>'

    # Machine-readable output
    wombat --json ./page.html
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse an HTML string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Container width in pixels
    #[arg(long, default_value = "400")]
    width: f32,

    /// Render configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Measure with this font file
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Measure with the first system font found
    #[arg(long, conflicts_with = "font")]
    system_font: bool,

    /// Print the rendered document as JSON
    #[arg(long)]
    json: bool,

    /// Print the layout engine's debug log
    #[arg(long)]
    debug_log: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let html = load_html(&cli)?;
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };

    let debug = Arc::new(if cli.debug_log {
        DebugLog::new()
    } else {
        DebugLog::disabled()
    });
    let mut session = RenderSession::new(config).with_debug_log(Arc::clone(&debug));
    if let Some(path) = &cli.font {
        let font =
            load_font(path).with_context(|| format!("failed to load font {}", path.display()))?;
        session = session.with_font(font);
    } else if cli.system_font {
        match find_system_font() {
            Some((path, font)) => {
                log::info!("using system font {}", path.display());
                session = session.with_font(font);
            }
            None => log::warn!("no system font found, using approximate metrics"),
        }
    }

    let document = render_document(&html, cli.width, &session);

    if cli.json {
        let json = serde_json::to_string_pretty(&document)
            .context("failed to serialize the rendered document")?;
        println!("{json}");
    } else {
        println!("=== Parsed Tree ===");
        print!("{}", print_tree(&session.parse(&html)));
        println!("\n=== Render Tree ===");
        print_render_tree(&document.root, 0);
        println!("\n=== Blocks ===");
        print_blocks(&document);
        println!("\n=== Attachment Frames (width {}) ===", cli.width);
        print_frames(&document);
        print_cache_stats(&session);
    }

    if cli.debug_log {
        println!("\n=== Debug Log ===");
        print!("{}", debug.dump());
    }
    Ok(())
}

/// Load markup from CLI arguments
fn load_html(cli: &Cli) -> Result<String> {
    if let Some(html) = &cli.html {
        Ok(html.clone())
    } else if let Some(path) = &cli.path {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        anyhow::bail!("a file path or --html is required")
    }
}

fn load_config(path: &Path) -> Result<RenderConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn print_render_tree(block: &BlockElement, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}{}", format!("<{}>", block.tag).cyan().bold());
    for child in &block.children {
        match child {
            RenderElement::Block(inner) => print_render_tree(inner, depth + 1),
            RenderElement::Inline(inline) => match &inline.content {
                InlineContent::Text(text) if inline.tag == TEXT_TAG => {
                    println!("{indent}  {}", format!("{text:?}").green());
                }
                InlineContent::Text(text) => {
                    println!("{indent}  {} {}", inline.tag.dimmed(), format!("{text:?}").green());
                }
                InlineContent::Attachment => {
                    let attributes: Vec<String> = inline
                        .attributes
                        .iter()
                        .map(|(name, value)| format!("{name}={value:?}"))
                        .collect();
                    println!(
                        "{indent}  {} {}",
                        format!("[{}]", inline.tag).yellow().bold(),
                        attributes.join(" ").dimmed()
                    );
                }
            },
        }
    }
}

fn print_blocks(document: &RenderedDocument) {
    for block in &document.blocks {
        let indent = "  ".repeat(block.path.len());
        println!(
            "{indent}{} width {:.1}  margins {:.1}/{:.1}  gaps {:?}  trailing {:.1}",
            format!("<{}>", block.tag).cyan(),
            block.content_width,
            block.layout.outer.top,
            block.layout.outer.bottom,
            block.layout.gaps,
            block.layout.trailing
        );
    }
}

fn print_frames(document: &RenderedDocument) {
    let frames = document.frames();
    if frames.is_empty() {
        println!("{}", "(no attachments)".dimmed());
        return;
    }
    for (id, frame) in frames {
        println!(
            "{}  {:.2}x{:.2} at ({:.2}, {:.2})",
            id.to_string().yellow(),
            frame.size.width,
            frame.size.height,
            frame.offset.x,
            frame.offset.y
        );
    }
}

fn print_cache_stats(session: &RenderSession) {
    let parses = session.parses().stats();
    let declarations = session.declarations().stats();
    let images = session.images().stats();
    println!("\n=== Caches ===");
    println!("parse        hits {} misses {}", parses.hits, parses.misses);
    println!(
        "declarations hits {} misses {}",
        declarations.hits, declarations.misses
    );
    println!(
        "images       hits {} misses {} evictions {} ({} bytes)",
        images.hits,
        images.misses,
        images.evictions,
        session.images().total_cost()
    );
}
