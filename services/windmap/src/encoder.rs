//! Frame sequence encoders.
//!
//! `ffmpeg` and ImageMagick `convert` are driven as child processes fed raw
//! RGBA on stdin. The native GIF encoder runs in-process.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, RgbaImage};
use renderer::Frame;
use thiserror::Error;
use tracing::{debug, info};

/// Speed/quality trade-off for the native GIF quantizer (1 slowest, 30 fastest).
const NATIVE_GIF_SPEED: i32 = 10;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Encoder program not found: {program}")]
    EncoderNotFound { program: String },

    #[error("{program} exited with {status}: {stderr}")]
    EncoderFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("No frames to encode")]
    EmptySequence,

    #[error("Frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    FrameSizeMismatch {
        index: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("Frame {index} has {actual} bytes, expected {expected}")]
    FrameBufferSize {
        index: usize,
        actual: usize,
        expected: usize,
    },

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(u32),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Writes a sequence of equally sized frames to a file.
pub trait FrameEncoder {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Encode `frames` at `fps` frames per second into `output`.
    fn encode(&self, frames: &[Frame], fps: u32, output: &Path) -> Result<(), EncodeError>;
}

/// Check frames are non-empty, equally sized and complete. Returns the size.
pub fn check_frames(frames: &[Frame]) -> Result<(u32, u32), EncodeError> {
    let first = frames.first().ok_or(EncodeError::EmptySequence)?;
    let (width, height) = (first.width, first.height);
    let expected = width as usize * height as usize * 4;

    for (index, frame) in frames.iter().enumerate() {
        if frame.width != width || frame.height != height {
            return Err(EncodeError::FrameSizeMismatch {
                index,
                width: frame.width,
                height: frame.height,
                expected_width: width,
                expected_height: height,
            });
        }
        if frame.pixels.len() != expected {
            return Err(EncodeError::FrameBufferSize {
                index,
                actual: frame.pixels.len(),
                expected,
            });
        }
    }
    Ok((width, height))
}

/// H.264 video through `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(width: u32, height: u32, fps: u32, output: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-vcodec".to_string(),
            "rawvideo".to_string(),
            "-s".to_string(),
            format!("{}x{}", width, height),
            "-pix_fmt".to_string(),
            "rgba".to_string(),
            "-r".to_string(),
            fps.to_string(),
            "-i".to_string(),
            "pipe:".to_string(),
            "-vcodec".to_string(),
            "h264".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-y".to_string(),
            output.display().to_string(),
        ]
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FrameEncoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn encode(&self, frames: &[Frame], fps: u32, output: &Path) -> Result<(), EncodeError> {
        if fps == 0 {
            return Err(EncodeError::InvalidFrameRate(fps));
        }
        let (width, height) = check_frames(frames)?;
        let args = Self::args(width, height, fps, output);
        pipe_frames(&self.program, &args, frames)?;
        info!(path = %output.display(), frames = frames.len(), fps, "Wrote video");
        Ok(())
    }
}

/// Looping GIF through ImageMagick `convert`.
#[derive(Debug, Clone)]
pub struct ImageMagickEncoder {
    program: PathBuf,
}

impl ImageMagickEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(width: u32, height: u32, fps: u32, output: &Path) -> Vec<String> {
        vec![
            "-size".to_string(),
            format!("{}x{}", width, height),
            "-depth".to_string(),
            "8".to_string(),
            // Delay in ticks of 1/fps seconds each
            "-delay".to_string(),
            format!("1x{}", fps),
            "-loop".to_string(),
            "0".to_string(),
            "rgba:-".to_string(),
            output.display().to_string(),
        ]
    }
}

impl Default for ImageMagickEncoder {
    fn default() -> Self {
        Self::new("convert")
    }
}

impl FrameEncoder for ImageMagickEncoder {
    fn name(&self) -> &str {
        "imagemagick"
    }

    fn encode(&self, frames: &[Frame], fps: u32, output: &Path) -> Result<(), EncodeError> {
        if fps == 0 {
            return Err(EncodeError::InvalidFrameRate(fps));
        }
        let (width, height) = check_frames(frames)?;
        let args = Self::args(width, height, fps, output);
        pipe_frames(&self.program, &args, frames)?;
        info!(path = %output.display(), frames = frames.len(), fps, "Wrote GIF");
        Ok(())
    }
}

/// Looping GIF encoded in-process.
#[derive(Debug, Clone, Default)]
pub struct NativeGifEncoder;

impl FrameEncoder for NativeGifEncoder {
    fn name(&self) -> &str {
        "native-gif"
    }

    fn encode(&self, frames: &[Frame], fps: u32, output: &Path) -> Result<(), EncodeError> {
        if fps == 0 {
            return Err(EncodeError::InvalidFrameRate(fps));
        }
        check_frames(frames)?;

        let file = File::create(output)?;
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), NATIVE_GIF_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = Delay::from_numer_denom_ms(1000, fps);
        for (index, frame) in frames.iter().enumerate() {
            let buffer = RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone())
                .ok_or(EncodeError::FrameBufferSize {
                    index,
                    actual: frame.pixels.len(),
                    expected: frame.width as usize * frame.height as usize * 4,
                })?;
            encoder.encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))?;
        }

        info!(path = %output.display(), frames = frames.len(), fps, "Wrote GIF");
        Ok(())
    }
}

/// Run `program args...`, stream every frame's raw RGBA into its stdin and
/// wait for it to exit.
///
/// Stderr is drained on its own thread while frames are written, so an
/// encoder that logs heavily before it has consumed its input cannot stall
/// on a full pipe.
fn pipe_frames(program: &Path, args: &[String], frames: &[Frame]) -> Result<(), EncodeError> {
    let program_name = program.display().to_string();
    debug!(program = %program_name, args = ?args, "Spawning encoder");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => EncodeError::EncoderNotFound {
                program: program_name.clone(),
            },
            _ => EncodeError::Io(e),
        })?;

    let stderr_reader = child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            // A read error only loses diagnostics
            let _ = stderr.read_to_end(&mut buf);
            buf
        })
    });

    let write_result = write_frames(&mut child, frames);
    let status = child.wait()?;
    let stderr = stderr_reader
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();

    if !status.success() {
        return Err(EncodeError::EncoderFailed {
            program: program_name,
            status,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }
    if !stderr.is_empty() {
        debug!(program = %program_name, bytes = stderr.len(), "Encoder wrote to stderr");
    }
    write_result?;
    Ok(())
}

fn write_frames(child: &mut Child, frames: &[Frame]) -> io::Result<()> {
    // Dropped at the end of this function, closing the pipe
    let Some(stdin) = child.stdin.take() else {
        return Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "encoder stdin unavailable",
        ));
    };
    let mut stdin = BufWriter::new(stdin);
    for frame in frames {
        stdin.write_all(&frame.pixels)?;
    }
    stdin.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::create_grey_frame_pixels;

    fn frames(n: usize, width: u32, height: u32) -> Vec<Frame> {
        (0..n)
            .map(|_| {
                Frame::new(
                    width,
                    height,
                    create_grey_frame_pixels(width as usize, height as usize),
                )
            })
            .collect()
    }

    #[test]
    fn test_check_frames() {
        assert_eq!(check_frames(&frames(3, 4, 2)).unwrap(), (4, 2));
        assert!(matches!(check_frames(&[]), Err(EncodeError::EmptySequence)));

        let mut mixed = frames(2, 4, 2);
        mixed.push(frames(1, 2, 4).remove(0));
        assert!(matches!(
            check_frames(&mixed),
            Err(EncodeError::FrameSizeMismatch { index: 2, .. })
        ));

        let short = vec![Frame::new(4, 2, vec![0; 10])];
        assert!(matches!(
            check_frames(&short),
            Err(EncodeError::FrameBufferSize { index: 0, .. })
        ));
    }

    #[test]
    fn test_ffmpeg_args() {
        let args = FfmpegEncoder::args(1000, 600, 60, Path::new("out/wind.mp4"));
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo"));
        assert!(joined.contains("-s 1000x600 -pix_fmt rgba -r 60 -i pipe:"));
        assert!(joined.contains("-vcodec h264 -pix_fmt yuv420p -y out/wind.mp4"));
    }

    #[test]
    fn test_imagemagick_args() {
        let args = ImageMagickEncoder::args(1000, 600, 30, Path::new("wind.gif"));
        assert_eq!(
            args.join(" "),
            "-size 1000x600 -depth 8 -delay 1x30 -loop 0 rgba:- wind.gif"
        );
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = FfmpegEncoder::new("/nonexistent/bin/ffmpeg-windmap");
        let err = encoder
            .encode(&frames(2, 4, 4), 60, &dir.path().join("wind.mp4"))
            .unwrap_err();
        assert!(matches!(err, EncodeError::EncoderNotFound { .. }));
    }

    /// Run `sh -c script` as an encoder on a watcher thread, failing the
    /// test instead of hanging if it never returns.
    #[cfg(unix)]
    fn pipe_through_shell(script: &'static str) -> Result<(), EncodeError> {
        use std::sync::mpsc;
        use std::time::Duration;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let args = vec!["-c".to_string(), script.to_string()];
            let _ = tx.send(pipe_frames(Path::new("sh"), &args, &frames(3, 120, 80)));
        });
        rx.recv_timeout(Duration::from_secs(30))
            .expect("encoder did not finish within 30 s")
    }

    #[cfg(unix)]
    #[test]
    fn test_noisy_encoder_does_not_stall() {
        // 200 KB of diagnostics before any input is read
        let result = pipe_through_shell("head -c 200000 /dev/zero >&2; cat > /dev/null");
        assert!(result.is_ok(), "{:?}", result);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_encoder_reports_stderr() {
        let err = pipe_through_shell("cat > /dev/null; echo 'bad codec' >&2; exit 3").unwrap_err();
        match err {
            EncodeError::EncoderFailed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "bad codec");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_noisy_failing_encoder_returns() {
        // Exits without reading stdin after flooding stderr
        let err = pipe_through_shell("head -c 200000 /dev/zero >&2; exit 1").unwrap_err();
        assert!(matches!(err, EncodeError::EncoderFailed { .. }));
    }

    #[test]
    fn test_zero_fps_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = NativeGifEncoder
            .encode(&frames(1, 4, 4), 0, &dir.path().join("wind.gif"))
            .unwrap_err();
        assert!(matches!(err, EncodeError::InvalidFrameRate(0)));
    }

    #[test]
    fn test_native_gif_roundtrip() {
        use image::AnimationDecoder;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wind.gif");
        NativeGifEncoder.encode(&frames(3, 8, 6), 30, &path).unwrap();

        let file = std::io::BufReader::new(File::open(&path).unwrap());
        let decoder = image::codecs::gif::GifDecoder::new(file).unwrap();
        let decoded = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].buffer().dimensions(), (8, 6));
    }
}
