//! Format tokens and their translation into engine options

pub mod resolver;
pub mod token;

pub use resolver::{ExtractionOptions, FormatResolver};
pub use token::{FormatCategory, FormatToken, UnsupportedFormat};

use serde::Serialize;

/// Supported tokens grouped the way callers browse them
#[derive(Debug, Clone, Serialize)]
pub struct FormatCatalogue {
    pub success: bool,
    pub supported_formats: Vec<FormatToken>,
    pub format_categories: FormatCategories,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatCategories {
    pub quality: Vec<FormatToken>,
    pub resolution: Vec<FormatToken>,
    pub video_formats: Vec<FormatToken>,
    pub audio_formats: Vec<FormatToken>,
}

pub fn supported_formats() -> FormatCatalogue {
    let by = |category: FormatCategory| -> Vec<FormatToken> {
        FormatToken::ALL
            .into_iter()
            .filter(|token| token.category() == category)
            .collect()
    };

    FormatCatalogue {
        success: true,
        supported_formats: FormatToken::ALL.to_vec(),
        format_categories: FormatCategories {
            quality: by(FormatCategory::Quality),
            resolution: by(FormatCategory::Resolution),
            video_formats: by(FormatCategory::VideoContainer),
            audio_formats: by(FormatCategory::AudioCodec),
        },
    }
}
