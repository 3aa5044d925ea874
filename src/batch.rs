use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::{debug, error, info, warn};

use crate::codec::{CodecError, ImageCodec};
use crate::encoder::{OutputFormat, DEFAULT_JPEG_QUALITY};
use crate::fetcher::{FetchError, Fetcher};

/// One image to download. `destination` is relative to the output root.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadTask {
    destination: PathBuf,
    url: String,
    format: Option<OutputFormat>,
}

impl DownloadTask {
    pub fn new<P: Into<PathBuf>, U: Into<String>>(destination: P, url: U) -> DownloadTask {
        DownloadTask {
            destination: destination.into(),
            url: url.into(),
            format: None,
        }
    }

    /// Overrides the format otherwise picked from the destination extension.
    pub fn with_format(mut self, format: OutputFormat) -> DownloadTask {
        self.format = Some(format);
        self
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }
}

#[derive(Debug, Clone, Default)]
pub struct Batch {
    tasks: Vec<DownloadTask>,
}

impl Batch {
    /// Duplicate destinations are allowed but not meaningful: whichever task
    /// runs last owns the file.
    pub fn new(tasks: Vec<DownloadTask>) -> Batch {
        let batch = Batch { tasks };
        for destination in batch.duplicate_destinations() {
            warn!("Destination {} appears more than once in the batch", destination.display());
        }
        batch
    }

    /// Destinations claimed by more than one task, in order of their second
    /// appearance.
    pub fn duplicate_destinations(&self) -> Vec<&Path> {
        let mut seen = HashSet::new();
        self.tasks
            .iter()
            .map(|task| task.destination.as_path())
            .filter(|destination| !seen.insert(*destination))
            .collect()
    }

    pub fn tasks(&self) -> &[DownloadTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Success { destination: PathBuf },
    HttpFailure { destination: PathBuf, status_code: u16 },
    TransportFailure { destination: PathBuf, cause: String },
    DecodeFailure { destination: PathBuf, cause: CodecError },
    WriteFailure { destination: PathBuf, cause: String },
}

impl FetchOutcome {
    pub fn destination(&self) -> &Path {
        match self {
            FetchOutcome::Success { destination }
            | FetchOutcome::HttpFailure { destination, .. }
            | FetchOutcome::TransportFailure { destination, .. }
            | FetchOutcome::DecodeFailure { destination, .. }
            | FetchOutcome::WriteFailure { destination, .. } => destination,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

impl Display for FetchOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchOutcome::Success { destination } => write!(f, "Downloaded {}", destination.display()),
            FetchOutcome::HttpFailure { destination, status_code } => {
                write!(f, "Failed to download {}: Status code {}", destination.display(), status_code)
            }
            FetchOutcome::TransportFailure { destination, cause } | FetchOutcome::WriteFailure { destination, cause } => {
                write!(f, "Error downloading {}: {}", destination.display(), cause)
            }
            FetchOutcome::DecodeFailure { destination, cause } => {
                write!(f, "Error downloading {}: {}", destination.display(), cause)
            }
        }
    }
}

pub struct BatchFetcher {
    fetcher: Box<dyn Fetcher + Send + Sync>,
    codec: ImageCodec,
    jpeg_quality: u8,
}

impl BatchFetcher {
    pub fn new(fetcher: Box<dyn Fetcher + Send + Sync>, codec: ImageCodec) -> BatchFetcher {
        BatchFetcher {
            fetcher,
            codec,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, jpeg_quality: u8) -> BatchFetcher {
        self.jpeg_quality = jpeg_quality;
        self
    }

    /// Processes every task in order and returns one outcome per task, at
    /// the same position. Failures are recorded, never raised.
    pub fn run(&self, batch: &Batch, output_root: &Path) -> Vec<FetchOutcome> {
        if let Err(e) = fs::create_dir_all(output_root) {
            error!("Cannot create output root {}: {}", output_root.display(), e);
        }

        batch
            .tasks()
            .iter()
            .map(|task| {
                let outcome = self.process(task, output_root);
                if outcome.is_success() {
                    info!("{}", outcome);
                } else {
                    warn!("{}", outcome);
                }
                outcome
            })
            .collect()
    }

    fn process(&self, task: &DownloadTask, output_root: &Path) -> FetchOutcome {
        let destination = task.destination.clone();
        info!("Fetching {} into {}", task.url(), destination.display());

        let resource = match self.fetcher.fetch(task.url()) {
            Ok(resource) => resource,
            Err(FetchError::Status(status_code)) => {
                return FetchOutcome::HttpFailure { destination, status_code };
            }
            Err(e) => {
                return FetchOutcome::TransportFailure { destination, cause: e.to_string() };
            }
        };

        let output_format = task
            .format()
            .unwrap_or_else(|| OutputFormat::from_path(&destination, self.jpeg_quality));
        debug!("Received {} ({} bytes) from {}, converting to {}", resource.content_type, resource.content.len(), resource.url, output_format);

        let encoded = match self.codec.normalize(&resource.content, &output_format) {
            Ok(encoded) => encoded,
            Err(cause) => return FetchOutcome::DecodeFailure { destination, cause },
        };
        debug!("Encoded {} bytes of {}", encoded.image.len(), encoded.content_type);

        if let Err(e) = write_under(output_root, &destination, &encoded.image) {
            return FetchOutcome::WriteFailure { destination, cause: e.to_string() };
        }

        FetchOutcome::Success { destination }
    }
}

/// Writes `content` to `output_root/destination`, creating parent
/// directories. Not atomic: an interrupted write leaves a partial file.
fn write_under(output_root: &Path, destination: &Path, content: &[u8]) -> io::Result<()> {
    let escapes = destination
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || destination.as_os_str().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a path inside the output root", destination.display()),
        ));
    }

    let path = output_root.join(destination);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)
}
