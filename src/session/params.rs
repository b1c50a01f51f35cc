//! Session configuration and its normalization into the native record
//!
//! Callers describe a job as an audio or a video variant. The native
//! initializer takes one fixed-arity record instead, so the normalizer
//! resolves the variant into `is_video` and always fills `pixel_format`.

use crate::ffi::HandlerParams;
use serde::{Deserialize, Serialize};
use std::ffi::{CStr, CString};
use std::str::FromStr;

use super::{SessionError, SessionResult};

/// Pixel format sent for audio jobs
///
/// The initializer reads the field unconditionally, so audio jobs must still
/// pass a string. The wrapper ignores it when `is_video` is false.
pub const PIXEL_FORMAT_PLACEHOLDER: &str = "dummy";

// ============================================================================
// Caller-facing configuration
// ============================================================================

/// Kind of stream a session transcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl FromStr for MediaKind {
    type Err = SessionError;

    fn from_str(s: &str) -> SessionResult<Self> {
        match s {
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            other => Err(SessionError::InvalidConfig(format!(
                "unknown session type `{}`",
                other
            ))),
        }
    }
}

/// Fields shared by audio and video jobs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommonParams {
    /// Input file path
    pub input: String,
    /// Output file path
    pub output: String,
    /// Filter chain description
    pub filters: String,
    /// Output container format (e.g. "mp4")
    pub format: String,
    /// Encoder name (e.g. "aac", "libx264")
    pub encoder: String,
    /// Encoder options, e.g. "b 64k" or "preset ultrafast,crf 23"
    pub encoder_params: String,
}

/// Session configuration, immutable once handed to [`normalize`]
///
/// Serialized as a flat object with a `type` discriminator:
///
/// ```json
/// { "type": "video", "input": "/tmp/in.mp4", "output": "/tmp/out.mp4",
///   "filters": "dblur", "format": "mp4", "encoder": "libx264",
///   "encoderParams": "preset ultrafast", "pixelFormat": "yuv420p" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireConfig", into = "WireConfig")]
pub enum SessionConfig {
    Audio(CommonParams),
    Video {
        common: CommonParams,
        pixel_format: String,
    },
}

impl SessionConfig {
    pub fn audio(common: CommonParams) -> Self {
        SessionConfig::Audio(common)
    }

    pub fn video(common: CommonParams, pixel_format: impl Into<String>) -> Self {
        SessionConfig::Video {
            common,
            pixel_format: pixel_format.into(),
        }
    }

    /// Build the variant named by `kind`; video requires a pixel format
    pub fn from_parts(
        kind: MediaKind,
        common: CommonParams,
        pixel_format: Option<String>,
    ) -> SessionResult<Self> {
        match (kind, pixel_format) {
            (MediaKind::Audio, _) => Ok(SessionConfig::Audio(common)),
            (MediaKind::Video, Some(pixel_format)) => Ok(SessionConfig::Video {
                common,
                pixel_format,
            }),
            (MediaKind::Video, None) => Err(SessionError::InvalidConfig(
                "video sessions require `pixelFormat`".to_string(),
            )),
        }
    }

    #[inline]
    pub fn kind(&self) -> MediaKind {
        match self {
            SessionConfig::Audio(_) => MediaKind::Audio,
            SessionConfig::Video { .. } => MediaKind::Video,
        }
    }

    #[inline]
    pub fn is_video(&self) -> bool {
        self.kind() == MediaKind::Video
    }

    pub fn common(&self) -> &CommonParams {
        match self {
            SessionConfig::Audio(common) | SessionConfig::Video { common, .. } => common,
        }
    }

    /// Pixel format for video jobs, `None` for audio
    pub fn pixel_format(&self) -> Option<&str> {
        match self {
            SessionConfig::Audio(_) => None,
            SessionConfig::Video { pixel_format, .. } => Some(pixel_format),
        }
    }

    /// Parse a JSON job description
    pub fn from_json(json: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Flat serde shape of [`SessionConfig`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireConfig {
    #[serde(rename = "type")]
    kind: MediaKind,
    input: String,
    output: String,
    filters: String,
    format: String,
    encoder: String,
    #[serde(default)]
    encoder_params: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pixel_format: Option<String>,
}

impl TryFrom<WireConfig> for SessionConfig {
    type Error = SessionError;

    fn try_from(wire: WireConfig) -> SessionResult<Self> {
        let common = CommonParams {
            input: wire.input,
            output: wire.output,
            filters: wire.filters,
            format: wire.format,
            encoder: wire.encoder,
            encoder_params: wire.encoder_params,
        };
        SessionConfig::from_parts(wire.kind, common, wire.pixel_format)
    }
}

impl From<SessionConfig> for WireConfig {
    fn from(config: SessionConfig) -> Self {
        let kind = config.kind();
        let (common, pixel_format) = match config {
            SessionConfig::Audio(common) => (common, None),
            SessionConfig::Video {
                common,
                pixel_format,
            } => (common, Some(pixel_format)),
        };
        Self {
            kind,
            input: common.input,
            output: common.output,
            filters: common.filters,
            format: common.format,
            encoder: common.encoder,
            encoder_params: common.encoder_params,
            pixel_format,
        }
    }
}

// ============================================================================
// Normalized record
// ============================================================================

/// The flat record `init_handler` requires, with every field present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedParams {
    pub input: CString,
    pub output: CString,
    pub filters: CString,
    pub format: CString,
    pub encoder: CString,
    pub encoder_params: CString,
    pub pixel_format: CString,
    pub is_video: bool,
}

impl NormalizedParams {
    /// Borrow the strings as a `#[repr(C)]` record
    ///
    /// The returned pointers are valid while `self` is alive.
    pub fn as_raw(&self) -> HandlerParams {
        HandlerParams {
            input: self.input.as_ptr(),
            output: self.output.as_ptr(),
            filters: self.filters.as_ptr(),
            format: self.format.as_ptr(),
            encoder: self.encoder.as_ptr(),
            encoder_params: self.encoder_params.as_ptr(),
            pixel_format: self.pixel_format.as_ptr(),
            is_video: self.is_video,
        }
    }

    pub fn pixel_format(&self) -> &CStr {
        &self.pixel_format
    }
}

fn c_string(field: &str, value: &str) -> SessionResult<CString> {
    CString::new(value)
        .map_err(|_| SessionError::InvalidConfig(format!("`{}` contains a NUL byte", field)))
}

/// Resolve a [`SessionConfig`] into the native record
///
/// Pure apart from validation: fails only if a field cannot be passed as a C
/// string.
pub fn normalize(config: &SessionConfig) -> SessionResult<NormalizedParams> {
    let common = config.common();
    let pixel_format = config.pixel_format().unwrap_or(PIXEL_FORMAT_PLACEHOLDER);

    Ok(NormalizedParams {
        input: c_string("input", &common.input)?,
        output: c_string("output", &common.output)?,
        filters: c_string("filters", &common.filters)?,
        format: c_string("format", &common.format)?,
        encoder: c_string("encoder", &common.encoder)?,
        encoder_params: c_string("encoderParams", &common.encoder_params)?,
        pixel_format: c_string("pixelFormat", pixel_format)?,
        is_video: config.is_video(),
    })
}
