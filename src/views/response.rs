//! Caller-facing response envelope

use crate::cache::CacheView;
use crate::formats::FormatToken;
use crate::normalizer::{ExtractionFailure, ExtractionResult, FailureKind};
use crate::utils::error::VidmetaError;
use crate::views::assemble::{self, InfoView, LinksView, SubtitlesView, ThumbnailsView};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const INTERNAL_ERROR_DETAIL: &str =
    "An unexpected error occurred while processing your request";

/// Which projection the caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedView {
    Info,
    DownloadLinks,
    Subtitles,
    Thumbnails,
}

impl RequestedView {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestedView::Info => "info",
            RequestedView::DownloadLinks => "links",
            RequestedView::Subtitles => "subtitles",
            RequestedView::Thumbnails => "thumbnails",
        }
    }

    /// Cache slot whose computation feeds this view
    pub fn cache_view(&self, format: FormatToken) -> CacheView {
        match self {
            RequestedView::Info | RequestedView::DownloadLinks => CacheView::Format(format),
            RequestedView::Subtitles => CacheView::Subtitles,
            RequestedView::Thumbnails => CacheView::Thumbnails,
        }
    }

    pub fn assemble(&self, result: &ExtractionResult) -> Result<View, ExtractionFailure> {
        Ok(match self {
            RequestedView::Info => View::Info(assemble::full_info(result)?),
            RequestedView::DownloadLinks => View::DownloadLinks(assemble::download_links(result)?),
            RequestedView::Subtitles => View::Subtitles(assemble::subtitles(result)?),
            RequestedView::Thumbnails => View::Thumbnails(assemble::thumbnails(result)?),
        })
    }
}

impl FromStr for RequestedView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" | "get-info" => Ok(RequestedView::Info),
            "links" | "download-links" | "get-download-links" => Ok(RequestedView::DownloadLinks),
            "subtitles" | "get-subtitles" => Ok(RequestedView::Subtitles),
            "thumbnails" | "get-thumbnails" => Ok(RequestedView::Thumbnails),
            other => Err(format!(
                "Unknown view '{}'. Expected one of: info, links, subtitles, thumbnails",
                other
            )),
        }
    }
}

impl fmt::Display for RequestedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum View {
    Info(InfoView),
    DownloadLinks(LinksView),
    Subtitles(SubtitlesView),
    Thumbnails(ThumbnailsView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Classified failures carry their normalized message, everything else
    /// gets a generic error with the raw detail alongside.
    pub fn from_failure(failure: &ExtractionFailure) -> Self {
        match failure.kind {
            FailureKind::Unknown => Self {
                error: UNEXPECTED_ERROR.to_string(),
                message: Some(failure.message.clone()),
            },
            _ => Self {
                error: failure.message.clone(),
                message: None,
            },
        }
    }

    /// Server-side errors are reported generically
    pub fn from_error(error: &VidmetaError) -> Self {
        if error.status_code() >= 500 {
            Self {
                error: INTERNAL_ERROR.to_string(),
                message: Some(INTERNAL_ERROR_DETAIL.to_string()),
            }
        } else {
            Self {
                error: error.to_string(),
                message: None,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    View(View),
    Error(ErrorBody),
}

/// Outcome for one URL of a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlResponse {
    pub url: String,
    pub success: bool,
    #[serde(flatten)]
    pub body: ResponseBody,
    #[serde(skip)]
    pub status: u16,
}

impl UrlResponse {
    pub fn from_view(url: impl Into<String>, view: View) -> Self {
        Self {
            url: url.into(),
            success: true,
            body: ResponseBody::View(view),
            status: 200,
        }
    }

    pub fn from_failure(url: impl Into<String>, failure: &ExtractionFailure) -> Self {
        Self {
            url: url.into(),
            success: false,
            body: ResponseBody::Error(ErrorBody::from_failure(failure)),
            status: 400,
        }
    }

    /// A request-level error for one URL; detail stays in the log
    pub fn from_error(url: impl Into<String>, error: &VidmetaError) -> Self {
        Self {
            url: url.into(),
            success: false,
            body: ResponseBody::Error(ErrorBody::from_error(error)),
            status: error.status_code(),
        }
    }

    pub fn view(&self) -> Option<&View> {
        match &self.body {
            ResponseBody::View(view) => Some(view),
            ResponseBody::Error(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub success: bool,
    #[serde(flatten)]
    pub body: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Single(UrlResponse),
    Batch { results: Vec<UrlResponse> },
    Rejected(Rejection),
}

/// Body plus the HTTP-style status the surrounding service answers with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceResponse {
    #[serde(skip)]
    pub status: u16,
    #[serde(flatten)]
    pub body: Envelope,
}

impl ServiceResponse {
    /// A single URL answers with its own status, a batch always with 200
    pub fn from_results(mut results: Vec<UrlResponse>) -> Self {
        if results.len() == 1 {
            if let Some(only) = results.pop() {
                return Self {
                    status: only.status,
                    body: Envelope::Single(only),
                };
            }
        }
        Self {
            status: 200,
            body: Envelope::Batch { results },
        }
    }

    /// The request as a whole could not be answered
    pub fn rejected(error: &VidmetaError) -> Self {
        Self {
            status: error.status_code(),
            body: Envelope::Rejected(Rejection {
                success: false,
                body: ErrorBody::from_error(error),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Per-URL results in request order
    pub fn results(&self) -> Vec<&UrlResponse> {
        match &self.body {
            Envelope::Single(one) => vec![one],
            Envelope::Batch { results } => results.iter().collect(),
            Envelope::Rejected(_) => Vec::new(),
        }
    }
}
