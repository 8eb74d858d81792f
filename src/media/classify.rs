//! Content classification of submission links.
//!
//! Classification is a fixed, ordered rule table evaluated top to bottom; the
//! first matching rule decides the [`ContentKind`]. Rules never perform I/O
//! and treat malformed URLs as "no match".

use std::fmt;

use url::Url;

use crate::api::types::Submission;

/// Kind of remote content a submission links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    DirectImage,
    DirectVideo,
    RedditGallery,
    RedditVideo,
    GfycatOrRedgifs,
    ImgurAlbum,
    ImgurImage,
    SelfPost,
    GenericVideoSite,
    Unclassified,
}

impl ContentKind {
    /// Whether downloading this kind is disabled by `skip_videos`.
    pub fn is_video(&self) -> bool {
        matches!(
            self,
            ContentKind::DirectVideo
                | ContentKind::RedditVideo
                | ContentKind::GfycatOrRedgifs
                | ContentKind::GenericVideoSite
        )
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentKind::DirectImage => "direct image link",
            ContentKind::DirectVideo => "direct video link",
            ContentKind::RedditGallery => "reddit gallery",
            ContentKind::RedditVideo => "reddit video",
            ContentKind::GfycatOrRedgifs => "gfycat/redgifs link",
            ContentKind::ImgurAlbum => "imgur album",
            ContentKind::ImgurImage => "imgur image",
            ContentKind::SelfPost => "self post",
            ContentKind::GenericVideoSite => "video site link",
            ContentKind::Unclassified => "unclassified link",
        };
        write!(f, "{}", label)
    }
}

/// Image extensions recognised as direct links.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif"];

/// Video extensions recognised as direct links.
pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4"];

/// Hosts downloaded with yt-dlp without probing first.
pub const KNOWN_VIDEO_HOSTS: &[&str] = &["www.youtube.com", "youtube.com", "youtu.be", "m.youtube.com"];

/// The link under classification.
struct Link<'a> {
    raw: &'a str,
    parsed: Option<Url>,
    submission: &'a Submission,
}

impl Link<'_> {
    fn host(&self) -> Option<&str> {
        self.parsed.as_ref()?.host_str()
    }

    /// Lowercased last path segment.
    fn filename(&self) -> Option<String> {
        let segment = self.parsed.as_ref()?.path_segments()?.last()?;
        if segment.is_empty() {
            None
        } else {
            Some(segment.to_lowercase())
        }
    }

    fn lowercase_path(&self) -> Option<String> {
        Some(self.parsed.as_ref()?.path().to_lowercase())
    }
}

type Predicate = fn(&Link<'_>) -> bool;

/// Classification rules, in precedence order.
const RULES: &[(Predicate, ContentKind)] = &[
    (is_direct_image, ContentKind::DirectImage),
    (is_direct_video, ContentKind::DirectVideo),
    (is_reddit_gallery, ContentKind::RedditGallery),
    (is_reddit_video, ContentKind::RedditVideo),
    (is_gfycat_or_redgifs, ContentKind::GfycatOrRedgifs),
    (is_imgur_album, ContentKind::ImgurAlbum),
    (is_imgur_image, ContentKind::ImgurImage),
    (is_self_post, ContentKind::SelfPost),
    (is_known_video_site, ContentKind::GenericVideoSite),
];

/// Classify a submission link.
///
/// Links on unknown hosts come back as [`ContentKind::Unclassified`]; the
/// caller may still upgrade them to [`ContentKind::GenericVideoSite`] after
/// probing with yt-dlp.
pub fn classify(url: &str, submission: &Submission) -> ContentKind {
    let link = Link {
        raw: url,
        parsed: Url::parse(url.trim()).ok(),
        submission,
    };

    RULES
        .iter()
        .find(|(matches, _)| matches(&link))
        .map(|(_, kind)| *kind)
        .unwrap_or(ContentKind::Unclassified)
}

fn has_extension(link: &Link<'_>, extensions: &[&str]) -> bool {
    match link.filename() {
        Some(name) => !name.contains(".gifv") && extensions.iter().any(|ext| name.ends_with(ext)),
        None => false,
    }
}

fn is_direct_image(link: &Link<'_>) -> bool {
    has_extension(link, IMAGE_EXTENSIONS)
}

fn is_direct_video(link: &Link<'_>) -> bool {
    has_extension(link, VIDEO_EXTENSIONS)
}

fn is_reddit_gallery(link: &Link<'_>) -> bool {
    link.raw.contains("reddit.com/gallery/")
}

fn is_reddit_video(link: &Link<'_>) -> bool {
    link.host() == Some("v.redd.it")
}

fn is_gfycat_or_redgifs(link: &Link<'_>) -> bool {
    link.host()
        .is_some_and(|host| host.contains("gfycat.com") || host.contains("redgifs.com"))
}

fn is_imgur(link: &Link<'_>) -> bool {
    link.host().is_some_and(|host| host.ends_with("imgur.com"))
}

fn is_imgur_album(link: &Link<'_>) -> bool {
    is_imgur(link)
        && link
            .lowercase_path()
            .is_some_and(|path| path.starts_with("/a/") || path.starts_with("/gallery/"))
}

fn is_imgur_image(link: &Link<'_>) -> bool {
    is_imgur(link)
}

fn is_self_post(link: &Link<'_>) -> bool {
    link.submission.is_self
}

fn is_known_video_site(link: &Link<'_>) -> bool {
    link.host().is_some_and(|host| KNOWN_VIDEO_HOSTS.contains(&host))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_url(url: &str) -> ContentKind {
        classify(url, &Submission::default())
    }

    #[test]
    fn test_direct_links() {
        assert_eq!(classify_url("https://i.redd.it/abc.jpg"), ContentKind::DirectImage);
        assert_eq!(classify_url("https://i.redd.it/abc.PNG"), ContentKind::DirectImage);
        assert_eq!(classify_url("https://example.com/a/b.jpeg"), ContentKind::DirectImage);
        assert_eq!(classify_url("https://example.com/clip.gif"), ContentKind::DirectImage);
        assert_eq!(classify_url("https://example.com/clip.MP4"), ContentKind::DirectVideo);
    }

    #[test]
    fn test_query_string_does_not_change_result() {
        for url in [
            "https://i.redd.it/abc.jpg",
            "https://example.com/clip.mp4",
            "https://v.redd.it/xyz",
            "https://imgur.com/a/Ab12C",
        ] {
            let with_query = format!("{}?width=640&format=png", url);
            assert_eq!(classify_url(url), classify_url(&with_query), "{}", url);
        }
    }

    #[test]
    fn test_gifv_is_not_direct() {
        assert_eq!(classify_url("https://i.imgur.com/abcde.gifv"), ContentKind::ImgurImage);
        assert_eq!(classify_url("https://example.com/abcde.gifv"), ContentKind::Unclassified);
    }

    #[test]
    fn test_hosts() {
        assert_eq!(
            classify_url("https://www.reddit.com/gallery/abc123"),
            ContentKind::RedditGallery
        );
        assert_eq!(classify_url("https://v.redd.it/xyz"), ContentKind::RedditVideo);
        assert_eq!(classify_url("https://gfycat.com/SomeCat"), ContentKind::GfycatOrRedgifs);
        assert_eq!(
            classify_url("https://www.redgifs.com/watch/thing"),
            ContentKind::GfycatOrRedgifs
        );
        assert_eq!(classify_url("https://imgur.com/a/Ab12C"), ContentKind::ImgurAlbum);
        assert_eq!(classify_url("https://imgur.com/gallery/Ab12C"), ContentKind::ImgurAlbum);
        assert_eq!(classify_url("https://imgur.com/Ab12Cde"), ContentKind::ImgurImage);
        assert_eq!(classify_url("https://youtu.be/dQw4w9WgXcQ"), ContentKind::GenericVideoSite);
        assert_eq!(classify_url("https://example.com/page"), ContentKind::Unclassified);
    }

    #[test]
    fn test_precedence() {
        // Direct link beats every host rule.
        assert_eq!(classify_url("https://i.imgur.com/abcde.jpg"), ContentKind::DirectImage);
        assert_eq!(classify_url("https://imgur.com/a/abcde.png"), ContentKind::DirectImage);
        // Gallery substring beats the imgur album rule.
        assert_eq!(
            classify_url("https://imgur.com/gallery/x?from=reddit.com/gallery/abc"),
            ContentKind::RedditGallery
        );
    }

    #[test]
    fn test_self_post() {
        let submission = Submission {
            is_self: true,
            ..Default::default()
        };
        assert_eq!(
            classify("https://www.reddit.com/r/rust/comments/abc/title/", &submission),
            ContentKind::SelfPost
        );
        // Host rules run first.
        assert_eq!(classify("https://v.redd.it/xyz", &submission), ContentKind::RedditVideo);
    }

    #[test]
    fn test_malformed_urls() {
        assert_eq!(classify_url(""), ContentKind::Unclassified);
        assert_eq!(classify_url("not a url at all.jpg"), ContentKind::Unclassified);
        assert_eq!(classify_url("http://[::1"), ContentKind::Unclassified);
    }

    #[test]
    fn test_video_kinds() {
        assert!(ContentKind::RedditVideo.is_video());
        assert!(ContentKind::GenericVideoSite.is_video());
        assert!(!ContentKind::RedditGallery.is_video());
    }
}
