//! Platform identifiers and the static platform registry

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier for a supported social platform.
///
/// Used as a lookup key into the registry and as the path discriminant
/// for backend requests (kebab-case wire form, e.g. `linkedin`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    LinkedIn,
    Twitter,
    Facebook,
    Instagram,
    YouTube,
    TikTok,
}

/// All supported platforms, in display order.
pub const ALL_PLATFORMS: [PlatformId; 6] = [
    PlatformId::LinkedIn,
    PlatformId::Twitter,
    PlatformId::Facebook,
    PlatformId::Instagram,
    PlatformId::YouTube,
    PlatformId::TikTok,
];

/// Registry entry for one platform: display copy and the permissions
/// the user grants during authorization.
#[derive(Debug, Clone, Copy)]
pub struct PlatformInfo {
    pub display_name: &'static str,
    pub color_token: &'static str,
    pub description: &'static str,
    pub required_permissions: &'static [&'static str],
}

const LINKEDIN: PlatformInfo = PlatformInfo {
    display_name: "LinkedIn",
    color_token: "brand.linkedin",
    description: "Share updates and articles with your professional network",
    required_permissions: &[
        "Create and publish posts on your behalf",
        "Read your profile information",
        "Access follower and engagement statistics",
    ],
};

const TWITTER: PlatformInfo = PlatformInfo {
    display_name: "Twitter / X",
    color_token: "brand.twitter",
    description: "Post tweets and threads to your timeline",
    required_permissions: &[
        "Post tweets on your behalf",
        "Read your profile and timeline",
        "Upload media",
    ],
};

const FACEBOOK: PlatformInfo = PlatformInfo {
    display_name: "Facebook",
    color_token: "brand.facebook",
    description: "Publish to your Facebook pages",
    required_permissions: &[
        "Manage and publish to your pages",
        "Read page engagement metrics",
    ],
};

const INSTAGRAM: PlatformInfo = PlatformInfo {
    display_name: "Instagram",
    color_token: "brand.instagram",
    description: "Schedule photos, reels, and stories",
    required_permissions: &[
        "Publish content to your professional account",
        "Read media insights",
    ],
};

const YOUTUBE: PlatformInfo = PlatformInfo {
    display_name: "YouTube",
    color_token: "brand.youtube",
    description: "Upload videos and manage your channel",
    required_permissions: &["Upload and manage videos", "Read channel analytics"],
};

const TIKTOK: PlatformInfo = PlatformInfo {
    display_name: "TikTok",
    color_token: "brand.tiktok",
    description: "Post videos to your TikTok account",
    required_permissions: &[
        "Post videos on your behalf",
        "Read your profile information",
    ],
};

impl PlatformId {
    /// Wire form used in backend request paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::LinkedIn => "linkedin",
            PlatformId::Twitter => "twitter",
            PlatformId::Facebook => "facebook",
            PlatformId::Instagram => "instagram",
            PlatformId::YouTube => "youtube",
            PlatformId::TikTok => "tiktok",
        }
    }

    /// Registry lookup. Pure, no errors: every id has an entry.
    pub fn info(&self) -> &'static PlatformInfo {
        match self {
            PlatformId::LinkedIn => &LINKEDIN,
            PlatformId::Twitter => &TWITTER,
            PlatformId::Facebook => &FACEBOOK,
            PlatformId::Instagram => &INSTAGRAM,
            PlatformId::YouTube => &YOUTUBE,
            PlatformId::TikTok => &TIKTOK,
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_PLATFORMS
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::unsupported_platform(s))
    }
}
