//! Concat demuxer manifest.

use std::path::Path;

/// Render an ordered segment list in ffmpeg concat-demuxer syntax.
pub fn render_manifest<P: AsRef<Path>>(segments: &[P]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push_str("file '");
        out.push_str(&quote(segment.as_ref()));
        out.push_str("'\n");
    }
    out
}

/// Escape single quotes for a single-quoted manifest entry.
fn quote(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn lines_follow_segment_order() {
        let manifest = render_manifest(&[
            PathBuf::from("/s/head.mp3"),
            PathBuf::from("/s/body.mp3"),
            PathBuf::from("/s/silence.mp3"),
        ]);
        assert_eq!(
            manifest,
            "file '/s/head.mp3'\nfile '/s/body.mp3'\nfile '/s/silence.mp3'\n"
        );
    }

    #[test]
    fn quotes_are_escaped() {
        let manifest = render_manifest(&[PathBuf::from("/s/it's here.mp3")]);
        assert_eq!(manifest, "file '/s/it'\\''s here.mp3'\n");
    }
}
