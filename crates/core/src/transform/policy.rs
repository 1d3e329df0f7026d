//! Canonical output sizes per asset kind.

use crate::catalog::AssetKind;

/// Stretch target for an asset kind, or `None` to keep the bytes untouched.
pub fn target_size(kind: AssetKind) -> Option<(u32, u32)> {
    match kind {
        AssetKind::Banner | AssetKind::Background => Some((1280, 720)),
        AssetKind::Poster => Some((400, 600)),
        AssetKind::Fanart => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_sizes() {
        assert_eq!(target_size(AssetKind::Poster), Some((400, 600)));
        assert_eq!(target_size(AssetKind::Banner), Some((1280, 720)));
        assert_eq!(target_size(AssetKind::Background), Some((1280, 720)));
        assert_eq!(target_size(AssetKind::Fanart), None);
    }

    #[test]
    fn test_target_size_matches_requires_transform() {
        for kind in [
            AssetKind::Poster,
            AssetKind::Banner,
            AssetKind::Fanart,
            AssetKind::Background,
        ] {
            assert_eq!(target_size(kind).is_some(), kind.requires_transform());
        }
    }
}
