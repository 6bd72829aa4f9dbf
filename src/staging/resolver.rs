use super::directory::StagingDirectory;
use super::probe::{select_strategy, StagingProbe, StagingStrategy, SystemProbe};
use crate::config::StagingSettings;
use crate::error::{VidsealError, VidsealResult};
use crate::logger::LogLevel;
use crate::vidseal_log;
use std::fs;
use std::io;
use std::sync::Arc;
use uuid::Uuid;

/// Picks and creates the staging directory for a run
pub struct StagingResolver {
    probe: Arc<dyn StagingProbe>,
    settings: StagingSettings,
}

impl StagingResolver {
    pub fn new(settings: StagingSettings) -> Self {
        Self {
            probe: Arc::new(SystemProbe),
            settings,
        }
    }

    /// Replace the filesystem probe (fake mounts in tests)
    pub fn with_probe(mut self, probe: Arc<dyn StagingProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn settings(&self) -> &StagingSettings {
        &self.settings
    }

    /// Create a fresh, uniquely named staging directory
    ///
    /// The RAM mount is tried first. If the probe rejects it, or creating the
    /// directory there fails, the generic temporary area is used instead.
    pub fn resolve(&self) -> VidsealResult<StagingDirectory> {
        let strategy = select_strategy(self.probe.as_ref(), &self.settings.ram_root);

        match create_in(&strategy, &self.settings.dir_prefix) {
            Ok(staging) => Ok(staging),
            Err(e) if strategy.is_ram_backed() => {
                vidseal_log!(
                    LogLevel::Warn,
                    "staging",
                    "Cannot stage under {} ({}), falling back to temporary area",
                    strategy.root().display(),
                    e
                );
                let fallback = StagingStrategy::GenericTemp(self.probe.fallback_root());
                create_in(&fallback, &self.settings.dir_prefix).map_err(|source| {
                    VidsealError::StagingUnavailable {
                        root: fallback.root().to_path_buf(),
                        source,
                    }
                })
            }
            Err(source) => Err(VidsealError::StagingUnavailable {
                root: strategy.root().to_path_buf(),
                source,
            }),
        }
    }
}

fn create_in(strategy: &StagingStrategy, prefix: &str) -> io::Result<StagingDirectory> {
    let token = Uuid::new_v4().simple().to_string();
    let path = strategy.root().join(format!("{}{}", prefix, token));

    // create (not create_all): an existing directory is never reused
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(&path)?;

    vidseal_log!(
        LogLevel::Info,
        "staging",
        "Created {} staging directory {}",
        strategy.label(),
        path.display()
    );

    Ok(StagingDirectory::new(path, token, strategy.clone()))
}
