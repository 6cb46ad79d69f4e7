//! ffmpeg command options builder.
//!
//! Converts a [`TranscodeRequest`] into command-line tokens. Every
//! invocation overwrites its output (`-y`), since outputs always live in a
//! scratch directory or have already passed the overwrite policy.

use std::path::{Path, PathBuf};

use crate::models::{CanonicalForm, MasteringProfile};

/// One call into the transcoding engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscodeRequest {
    /// Dynamics chain + loudness normalization, encoded to canonical form.
    Master {
        input: PathBuf,
        output: PathBuf,
        profile: MasteringProfile,
        form: CanonicalForm,
    },
    /// Re-encode an asset to canonical form.
    Canonicalize {
        input: PathBuf,
        output: PathBuf,
        form: CanonicalForm,
    },
    /// Synthesize a silent clip.
    GenerateSilence {
        output: PathBuf,
        duration_secs: u32,
        form: CanonicalForm,
    },
    /// Lossless concatenation of the segments listed in a manifest.
    Concat { manifest: PathBuf, output: PathBuf },
}

impl TranscodeRequest {
    /// File the request produces.
    pub fn output(&self) -> &Path {
        match self {
            TranscodeRequest::Master { output, .. }
            | TranscodeRequest::Canonicalize { output, .. }
            | TranscodeRequest::GenerateSilence { output, .. }
            | TranscodeRequest::Concat { output, .. } => output,
        }
    }

    /// Short operation name for logs and journals.
    pub fn label(&self) -> &'static str {
        match self {
            TranscodeRequest::Master { .. } => "master",
            TranscodeRequest::Canonicalize { .. } => "canonicalize",
            TranscodeRequest::GenerateSilence { .. } => "generate-silence",
            TranscodeRequest::Concat { .. } => "concat",
        }
    }
}

/// Builder for ffmpeg command-line options.
pub struct FfmpegArgsBuilder<'a> {
    request: &'a TranscodeRequest,
}

impl<'a> FfmpegArgsBuilder<'a> {
    pub fn new(request: &'a TranscodeRequest) -> Self {
        Self { request }
    }

    /// Build the complete token list (without the program name).
    pub fn build(&self) -> Vec<String> {
        let mut tokens = vec!["-hide_banner".to_string(), "-y".to_string()];

        match self.request {
            TranscodeRequest::Master {
                input,
                output,
                profile,
                form,
            } => {
                push_input(&mut tokens, input);
                tokens.push("-af".to_string());
                tokens.push(profile.filter_chain());
                tokens.push("-c:a".to_string());
                tokens.push(form.codec.clone());
                tokens.push("-b:a".to_string());
                tokens.push(form.bitrate_arg());
                add_layout(&mut tokens, form);
                push_path(&mut tokens, output);
            }
            TranscodeRequest::Canonicalize {
                input,
                output,
                form,
            } => {
                push_input(&mut tokens, input);
                add_layout(&mut tokens, form);
                tokens.push("-c:a".to_string());
                tokens.push(form.codec.clone());
                tokens.push("-b:a".to_string());
                tokens.push(form.bitrate_arg());
                push_path(&mut tokens, output);
            }
            TranscodeRequest::GenerateSilence {
                output,
                duration_secs,
                form,
            } => {
                tokens.push("-f".to_string());
                tokens.push("lavfi".to_string());
                tokens.push("-i".to_string());
                tokens.push(format!(
                    "anullsrc=r={}:cl={}",
                    form.sample_rate,
                    form.channel_layout()
                ));
                tokens.push("-t".to_string());
                tokens.push(duration_secs.to_string());
                tokens.push("-acodec".to_string());
                tokens.push(form.codec.clone());
                tokens.push("-b:a".to_string());
                tokens.push(form.bitrate_arg());
                push_path(&mut tokens, output);
            }
            TranscodeRequest::Concat { manifest, output } => {
                tokens.push("-f".to_string());
                tokens.push("concat".to_string());
                tokens.push("-safe".to_string());
                tokens.push("0".to_string());
                push_input(&mut tokens, manifest);
                tokens.push("-c".to_string());
                tokens.push("copy".to_string());
                push_path(&mut tokens, output);
            }
        }

        tokens
    }
}

fn push_input(tokens: &mut Vec<String>, input: &Path) {
    tokens.push("-i".to_string());
    push_path(tokens, input);
}

fn push_path(tokens: &mut Vec<String>, path: &Path) {
    tokens.push(path.to_string_lossy().to_string());
}

/// Sample rate and channel count.
fn add_layout(tokens: &mut Vec<String>, form: &CanonicalForm) {
    tokens.push("-ar".to_string());
    tokens.push(form.sample_rate.to_string());
    tokens.push("-ac".to_string());
    tokens.push(form.channels.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(request: &TranscodeRequest) -> Vec<String> {
        FfmpegArgsBuilder::new(request).build()
    }

    #[test]
    fn silence_uses_lavfi_source() {
        let tokens = build(&TranscodeRequest::GenerateSilence {
            output: PathBuf::from("/a/silence_1s.mp3"),
            duration_secs: 1,
            form: CanonicalForm::default(),
        });
        assert_eq!(
            tokens.join(" "),
            "-hide_banner -y -f lavfi -i anullsrc=r=48000:cl=stereo -t 1 \
             -acodec libmp3lame -b:a 192k /a/silence_1s.mp3"
        );
    }

    #[test]
    fn canonicalize_forces_layout_and_bitrate() {
        let tokens = build(&TranscodeRequest::Canonicalize {
            input: PathBuf::from("/a/avo_head.mp3"),
            output: PathBuf::from("/tmp/job/head.mp3"),
            form: CanonicalForm::default(),
        });
        let joined = tokens.join(" ");
        assert!(joined.contains("-i /a/avo_head.mp3"));
        assert!(joined.contains("-ar 48000 -ac 2"));
        assert!(joined.contains("-b:a 192k"));
        assert_eq!(tokens.last().unwrap(), "/tmp/job/head.mp3");
    }

    #[test]
    fn master_carries_filter_chain() {
        let request = TranscodeRequest::Master {
            input: PathBuf::from("clip.wav"),
            output: PathBuf::from("/tmp/job/body.mp3"),
            profile: MasteringProfile::audiovault(),
            form: CanonicalForm::default(),
        };
        let tokens = build(&request);
        let af = tokens.iter().position(|t| t == "-af").unwrap();
        assert!(tokens[af + 1].contains("loudnorm=I=-16.3:LRA=5:TP=-2.6"));
        assert_eq!(request.label(), "master");
        assert_eq!(request.output(), Path::new("/tmp/job/body.mp3"));
    }

    #[test]
    fn concat_copies_streams() {
        let tokens = build(&TranscodeRequest::Concat {
            manifest: PathBuf::from("/tmp/job/segments.txt"),
            output: PathBuf::from("/out/clip.mp3"),
        });
        assert_eq!(
            tokens.join(" "),
            "-hide_banner -y -f concat -safe 0 -i /tmp/job/segments.txt -c copy /out/clip.mp3"
        );
    }
}
