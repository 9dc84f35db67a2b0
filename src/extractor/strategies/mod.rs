// Concrete extraction strategies, in priority order
//
// watch-page (0): canonical desktop page scrape
// variant-page (1): alternate document shapes, fingerprints, mobile host
// yt-dlp (2): external tool fallback

mod variant;
mod watch_page;
mod ytdlp;

pub use variant::VariantPageStrategy;
pub use watch_page::WatchPageStrategy;
pub use ytdlp::YtDlpStrategy;
