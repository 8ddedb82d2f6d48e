//! Integration tests for the attachment image cache.

use std::cell::Cell;
use std::sync::Arc;

use wombat_browser::{AttachmentImage, AttachmentImageCache, AttachmentImageKey};
use wombat_css::Size;

fn key(hash: u64) -> AttachmentImageKey {
    AttachmentImageKey::new(hash, Size::new(4.0, 4.0), "system-ui", 16.0)
}

fn image(side: u32) -> Arc<AttachmentImage> {
    Arc::new(AttachmentImage::transparent(side, side))
}

#[test]
fn test_key_rounds_size_up() {
    let key = AttachmentImageKey::new(1, Size::new(10.2, 3.9), "serif", 12.0);
    assert_eq!((key.width, key.height), (11, 4));
    assert_ne!(key, AttachmentImageKey::new(1, Size::new(10.2, 3.9), "serif", 13.0));
}

#[test]
fn test_cost_is_four_bytes_per_pixel() {
    let cache = AttachmentImageCache::default();
    assert!(cache.insert(key(1), image(4)));
    assert_eq!(cache.total_cost(), 64);
}

#[test]
fn test_count_limit_evicts_least_recent() {
    let cache = AttachmentImageCache::new(2, 1 << 20);
    assert!(cache.insert(key(1), image(1)));
    assert!(cache.insert(key(2), image(1)));
    let _ = cache.get(&key(1));
    assert!(cache.insert(key(3), image(1)));
    assert_eq!(cache.len(), 2);
    assert!(cache.get(&key(1)).is_some());
    assert!(cache.get(&key(2)).is_none());
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_cost_limit_evicts_until_under() {
    // Two 4×4 images (64 bytes each) fit in 150 bytes; a third does not.
    let cache = AttachmentImageCache::new(10, 150);
    assert!(cache.insert(key(1), image(4)));
    assert!(cache.insert(key(2), image(4)));
    assert!(cache.insert(key(3), image(4)));
    assert_eq!(cache.len(), 2);
    assert!(cache.total_cost() <= 150);
    assert!(cache.get(&key(1)).is_none());
}

#[test]
fn test_oversized_image_is_not_stored() {
    let cache = AttachmentImageCache::new(10, 16);
    assert!(!cache.insert(key(1), image(4)));
    assert!(cache.is_empty());
}

#[test]
fn test_get_or_render_renders_once() {
    let cache = AttachmentImageCache::default();
    let renders = Cell::new(0);
    let render = || {
        renders.set(renders.get() + 1);
        AttachmentImage::transparent(2, 2)
    };
    let first = cache.get_or_render(key(7), render);
    let second = cache.get_or_render(key(7), render);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(renders.get(), 1);
    assert_eq!(cache.stats().hits, 1);
}
