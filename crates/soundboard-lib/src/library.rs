//! Sound library — the clips found in the skill's `sounds/` directory.
//!
//! Loaded once, never modified afterwards. Order follows the directory
//! listing.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use tracing::debug;

use crate::error::{Result, SkillError};

#[derive(Debug, Clone, Default)]
pub struct SoundLibrary {
    paths: Vec<PathBuf>,
}

impl SoundLibrary {
    /// Scan `dir` for files whose extension is in `extensions` (no dot,
    /// case-sensitive).
    pub fn load(dir: &Path, extensions: &[&str]) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|source| SkillError::SoundDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let allowed = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext));
            if allowed && path.is_file() {
                paths.push(path);
            }
        }

        debug!("library: {} clips in {}", paths.len(), dir.display());
        Ok(Self { paths })
    }

    /// Build a library from known paths.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Pick one clip uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Path> {
        self.paths
            .choose(rng)
            .map(PathBuf::as_path)
            .ok_or(SkillError::EmptyLibrary)
    }
}

/// Reads a clip's playing time from its metadata.
pub trait DurationProbe: Send + Sync {
    fn duration(&self, path: &Path) -> Result<Duration>;
}

/// Duration probe reading MP3 stream parameters with symphonia.
///
/// The file is handed to symphonia as a plain `File` so the stream length is
/// known; constant-bitrate MP3s without a Xing/Info header only get a frame
/// count estimated from that length.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaProbe;

impl DurationProbe for SymphoniaProbe {
    fn duration(&self, path: &Path) -> Result<Duration> {
        let metadata_err = |reason: String| SkillError::Metadata {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| metadata_err(e.to_string()))?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, stream, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| metadata_err(e.to_string()))?;
        let track = probed
            .format
            .default_track()
            .ok_or_else(|| metadata_err("no audio track".into()))?;
        let params = &track.codec_params;

        let time_base = params
            .time_base
            .or_else(|| params.sample_rate.map(|rate| TimeBase::new(1, rate)))
            .ok_or_else(|| metadata_err("no time base".into()))?;
        let frames = params
            .n_frames
            .ok_or_else(|| metadata_err("duration not recorded".into()))?;

        let time = time_base.calc_time(frames);
        Ok(Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac))
    }
}
