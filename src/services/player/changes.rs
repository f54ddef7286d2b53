use async_stream::stream;
use futures::{Stream, StreamExt};
use tracing::debug;

use super::{TrackChanged, TrackChanges};

/// Turn a stream of observed track URIs into track change notifications.
///
/// Players re-send metadata for art and length updates, so a URI equal to
/// the previous one is dropped. `None` (no URI in the metadata) is always
/// forwarded. `initial` is the URI playing when the subscription starts.
pub fn dedupe_by_uri<S>(initial: Option<String>, uris: S) -> TrackChanges
where
    S: Stream<Item = Option<String>> + Send + 'static,
{
    let mut uris = uris.boxed();
    let mut last_uri = initial;

    stream! {
        while let Some(uri) = uris.next().await {
            if uri.is_some() && uri == last_uri {
                continue;
            }

            last_uri = uri.clone();
            yield TrackChanged { uri };
        }

        debug!("Metadata change stream ended");
    }
    .boxed()
}
