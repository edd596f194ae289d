mod media;
mod model;
mod store;

pub use {
    media::MediaLibrary,
    model::{Dream, NewDream, VIDEO_URL_PREFIX, sort_newest_first, video_url},
    store::DreamStore,
};
