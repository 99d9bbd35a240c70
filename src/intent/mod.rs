//! Intent classification for incoming commands

use serde::{Deserialize, Serialize};

/// Phrases that mark a command as a camera request
pub const CAMERA_KEYWORDS: &[&str] = &[
    "show", "display", "view", "check", "see", "look at", "watch", "camera",
];

/// Classified purpose of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    DeviceControl,
    CameraQuery,
}

/// Case-insensitive substring test against [`CAMERA_KEYWORDS`].
///
/// An empty command classifies as `DeviceControl`; callers reject empty input
/// before reaching this point.
pub fn classify(command: &str) -> Intent {
    let command_lower = command.to_lowercase();

    if CAMERA_KEYWORDS
        .iter()
        .any(|keyword| command_lower.contains(keyword))
    {
        Intent::CameraQuery
    } else {
        Intent::DeviceControl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Show me the front door")]
    #[case("DISPLAY the garage")]
    #[case("can I view the patio")]
    #[case("check the driveway")]
    #[case("let me see the road")]
    #[case("Look At the backyard")]
    #[case("watch the doorbell")]
    #[case("garage camera")]
    fn test_camera_queries(#[case] command: &str) {
        assert_eq!(classify(command), Intent::CameraQuery);
    }

    #[rstest]
    #[case("turn on kitchen lights")]
    #[case("Set temperature to 72 degrees")]
    #[case("good night")]
    #[case("")]
    fn test_device_control(#[case] command: &str) {
        assert_eq!(classify(command), Intent::DeviceControl);
    }
}
