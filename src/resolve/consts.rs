use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

/// Inline action on the detail page's play button wrapping the content id
pub(crate) const PLAY_EPISODE_PREFIX: &str = "PlayEpisode('";
pub(crate) const PLAY_EPISODE_SUFFIX_LEN: usize = 2;

// Detail page
selector!(PLAY_BUTTON_SELECTOR, "div.external-btn[onclick]");

// Search redirect page
selector!(ANCHOR_SELECTOR, "a[href]");

// Download list page
selector!(DOWNLOAD_ITEM_SELECTOR, "div.inner-box--list > div.inner-box--item");
selector!(DOWNLOAD_LABEL_SELECTOR, "div.inner-box--label");
selector!(DOWNLOAD_LINK_SELECTOR, "div.inner-box--link.main > a[href]");
