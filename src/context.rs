//! The execution context every pipeline stage runs against.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use glob::glob;
use itertools::Either;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::PipelineError;

/// Number of shuffle buckets used when nothing else is configured.
pub const DEFAULT_PARTITIONS: u32 = 11;

#[derive(Debug, Clone)]
pub struct Config {
    /// Name the job is logged under.
    pub app_name: String,
    /// Where the job runs. Only `local` is understood.
    pub master: String,
    /// Number of buckets a shuffle spreads keys over.
    pub num_partitions: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "sparklite".to_string(),
            master: "local".to_string(),
            num_partitions: DEFAULT_PARTITIONS,
        }
    }
}

impl Config {
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn with_partitions(mut self, num_partitions: u32) -> Self {
        self.num_partitions = num_partitions;
        self
    }

    pub fn with_master(mut self, master: impl Into<String>) -> Self {
        self.master = master.into();
        self
    }
}

/// Handle to the local engine.
///
/// Created once by the caller and borrowed by every [`Dataset`] built from it,
/// so there is no process-wide engine state.
#[derive(Debug)]
pub struct Context {
    config: Config,
}

impl Context {
    pub fn new(config: Config) -> Result<Self> {
        if config.num_partitions == 0 {
            return Err(PipelineError::Config("partition count must be at least 1".into()).into());
        }
        if config.master != "local" {
            return Err(PipelineError::Config(format!(
                "unsupported master `{}`, only `local` is available",
                config.master
            ))
            .into());
        }
        info!(app = %config.app_name, partitions = config.num_partitions, "context created");
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn num_partitions(&self) -> u32 {
        self.config.num_partitions
    }

    /// Lines of every file matching `pattern`, files taken in path order.
    ///
    /// An existing file is read as is, even if its name has glob characters.
    /// The pattern is resolved right away, so a missing input fails here.
    /// File contents are only read once the dataset is pulled.
    pub fn text_file(&self, pattern: &str) -> Result<Dataset<'_, String>> {
        let paths = resolve_input(pattern)?;
        debug!(pattern, files = paths.len(), "resolved input");

        let iter = paths.into_iter().flat_map(|path| match read_lines(&path) {
            Ok(lines) => Either::Left(lines.into_iter().map(Ok)),
            Err(e) => Either::Right(std::iter::once(Err(e))),
        });
        Ok(Dataset::new(self, iter))
    }

    /// A dataset over items already in memory.
    pub fn parallelize<'a, T: 'a>(&'a self, items: Vec<T>) -> Dataset<'a, T> {
        Dataset::new(self, items.into_iter().map(Ok))
    }
}

fn resolve_input(pattern: &str) -> Result<Vec<PathBuf>> {
    let literal = Path::new(pattern);
    if literal.is_file() {
        return Ok(vec![literal.to_path_buf()]);
    }

    let mut paths = glob(pattern)
        .with_context(|| format!("bad input pattern `{pattern}`"))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("expanding `{pattern}`"))?;
    paths.retain(|p| p.is_file());
    if paths.is_empty() {
        return Err(PipelineError::InputNotFound {
            pattern: pattern.to_string(),
        }
        .into());
    }
    paths.sort();
    Ok(paths)
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let mut buf = Vec::new();
    {
        // scoped so the file is closed right after reading
        let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        file.read_to_end(&mut buf)?;
    }
    debug!(path = %path.display(), bytes = buf.len(), "read input file");
    let text = String::from_utf8(buf)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}
