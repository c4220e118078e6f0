//! View assemblers and response envelope

pub mod assemble;
pub mod response;

pub use assemble::{
    download_links, full_info, subtitles, thumbnails, DownloadLink, Projection, PlaylistView,
};
pub use response::{
    Envelope, ErrorBody, RequestedView, ResponseBody, ServiceResponse, UrlResponse, View,
};
