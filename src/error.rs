use std::path::PathBuf;

/// Problems that stop a run before any file is touched
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing setting: {name} (pass {flag} or set {env} in the environment or .env file)")]
    MissingSetting {
        name: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("input folder {0:?} does not exist")]
    InputDirMissing(PathBuf),

    #[error("cannot create output folder {path:?}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
