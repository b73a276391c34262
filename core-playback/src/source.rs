//! Data source resolution for each backend.
//!
//! The streaming backend needs a concrete media-source pipeline picked from
//! the URI scheme and extension; the native decoder needs to know whether to
//! open a URI or go through the raw-resource provider.

use crate::error::{PlaybackError, Result};
use bridge_traits::playback::{DataSource, MediaSource, NativeMediaLocator};

const RAW_RESOURCE_SCHEME: &str = "android.resource://";

/// Fails for sources that carry neither a URL nor a raw resource id.
pub fn validate(source: &DataSource) -> Result<()> {
    if source.raw_id().is_none() && source.media_url().trim().is_empty() {
        return Err(PlaybackError::InvalidSource(format!(
            "'{}' has no media url or raw resource id",
            source.title()
        )));
    }
    Ok(())
}

/// Picks the streaming pipeline for `source`.
///
/// Unrecognised schemes and extensions fall back to progressive download.
pub fn resolve_streaming(source: &DataSource) -> Result<MediaSource> {
    validate(source)?;

    if let Some(raw_id) = source.raw_id() {
        return Ok(MediaSource::RawResource { raw_id });
    }

    let uri = source.media_url().to_string();
    if source.is_rtmp() {
        return Ok(MediaSource::Rtmp { uri });
    }
    if source.is_asset() {
        return Ok(MediaSource::Progressive { uri });
    }

    let path = uri_path(&uri).to_ascii_lowercase();
    let media = if path.ends_with(".mpd") {
        MediaSource::Dash { uri }
    } else if path.ends_with(".m3u8") {
        MediaSource::Hls { uri }
    } else if is_smooth_streaming(&path) {
        MediaSource::SmoothStreaming { uri }
    } else {
        MediaSource::Progressive { uri }
    };
    Ok(media)
}

/// Picks how the native decoder opens `source`.
///
/// `resource_package` is the host package that owns raw resources.
pub fn resolve_native(source: &DataSource, resource_package: &str) -> Result<NativeMediaLocator> {
    validate(source)?;

    if let Some(raw_id) = source.raw_id() {
        return Ok(NativeMediaLocator::RawResource(format!(
            "{}{}/{}",
            RAW_RESOURCE_SCHEME, resource_package, raw_id
        )));
    }

    let url = source.media_url();
    if url.starts_with(RAW_RESOURCE_SCHEME) {
        return Ok(NativeMediaLocator::RawResource(url.to_string()));
    }
    if source.is_asset() {
        return Err(PlaybackError::UnsupportedSource(
            "native decoder cannot open asset paths".to_string(),
        ));
    }

    Ok(NativeMediaLocator::Uri(url.to_string()))
}

/// URI without query string or fragment.
fn uri_path(uri: &str) -> &str {
    let end = uri.find(['?', '#']).unwrap_or(uri.len());
    &uri[..end]
}

fn is_smooth_streaming(path: &str) -> bool {
    let path = path.strip_suffix("/manifest").unwrap_or(path);
    path.ends_with(".ism") || path.ends_with(".isml")
}
