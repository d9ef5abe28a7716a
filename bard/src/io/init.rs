//! Startup: environment file, output directories, and config.
//!
//! Every command runs [`init_workspace`] first and works from the returned
//! [`Workspace`] instead of process-wide state.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use super::config::{BardConfig, load_config};
use super::providers::Credentials;
use crate::core::slug::title_stem;
use crate::error::ConfigError;

/// All canonical paths for a workspace root.
#[derive(Debug, Clone)]
pub struct BardPaths {
    pub root: PathBuf,
    pub env_path: PathBuf,
    pub config_path: PathBuf,
    pub md_dir: PathBuf,
    pub plots_dir: PathBuf,
    pub html_dir: PathBuf,
}

impl BardPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            env_path: root.join(".env"),
            config_path: root.join("bard.toml"),
            md_dir: root.join("md"),
            plots_dir: root.join("plots"),
            html_dir: root.join("html"),
            root,
        }
    }

    /// `plots/<title slug>.txt`
    pub fn plot_path(&self, title: &str) -> PathBuf {
        self.plots_dir.join(format!("{}.txt", title_stem(title)))
    }

    /// `md/<title slug>.md`
    pub fn draft_path(&self, title: &str) -> PathBuf {
        self.md_dir.join(format!("{}.md", title_stem(title)))
    }

    /// `html/<file name of output>`; any directory part of `output` is dropped.
    pub fn html_path(&self, output: &Path) -> PathBuf {
        match output.file_name() {
            Some(name) => self.html_dir.join(name),
            None => self.html_dir.join("output.html"),
        }
    }

    /// Resolve a user-supplied path against the root unless already absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// A workspace that passed startup.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub paths: BardPaths,
    pub config: BardConfig,
    pub credentials: Credentials,
}

impl Workspace {
    /// Absolute path of the configured HTML template.
    pub fn template_path(&self) -> PathBuf {
        self.paths.resolve(&self.config.template_path)
    }
}

/// Load `.env`, create output directories, and load `bard.toml`.
///
/// A missing `.env` is fatal. Directories are created only if absent.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn init_workspace(root: &Path) -> Result<Workspace> {
    let paths = BardPaths::new(root);

    dotenvy::from_path(&paths.env_path).map_err(|err| ConfigError::MissingEnvFile {
        path: paths.env_path.clone(),
        reason: err.to_string(),
    })?;
    debug!(path = %paths.env_path.display(), "loaded environment file");

    create_dir(&paths.md_dir)?;
    create_dir(&paths.plots_dir)?;
    create_dir(&paths.html_dir)?;

    let config = load_config(&paths.config_path)?;
    let credentials = Credentials::from_env();
    info!(config = %paths.config_path.display(), "workspace ready");

    Ok(Workspace {
        paths,
        config,
        credentials,
    })
}

fn create_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).with_context(|| format!("create directory {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifies startup creates md/, plots/ and html/ next to the env file.
    #[test]
    fn init_creates_output_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(".env"), "").expect("write env");

        let ws = init_workspace(temp.path()).expect("init");

        assert!(ws.paths.md_dir.is_dir());
        assert!(ws.paths.plots_dir.is_dir());
        assert!(ws.paths.html_dir.is_dir());
        assert_eq!(ws.config, BardConfig::default());
    }

    /// Verifies a second startup leaves existing outputs alone.
    #[test]
    fn init_is_idempotent() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(".env"), "").expect("write env");
        let ws = init_workspace(temp.path()).expect("init");
        let kept = ws.paths.md_dir.join("kept.md");
        fs::write(&kept, "keep me").expect("write");

        init_workspace(temp.path()).expect("re-init");

        assert_eq!(fs::read_to_string(&kept).expect("read"), "keep me");
    }

    #[test]
    fn init_without_env_file_is_a_config_error() {
        let temp = tempfile::tempdir().expect("tempdir");

        let err = init_workspace(temp.path()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingEnvFile { .. })
        ));
        assert!(!temp.path().join("md").exists());
    }

    #[test]
    fn output_paths_follow_title_slug() {
        let paths = BardPaths::new("/work");
        assert_eq!(
            paths.plot_path("My AI Generated Story"),
            PathBuf::from("/work/plots/my-ai-generated-story.txt")
        );
        assert_eq!(
            paths.draft_path("Night Train"),
            PathBuf::from("/work/md/night-train.md")
        );
        assert_eq!(
            paths.html_path(Path::new("out/story.html")),
            PathBuf::from("/work/html/story.html")
        );
    }
}
