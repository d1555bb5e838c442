use std::{
    io,
    path::{Path, PathBuf},
};

use fs_err as fs;
use serde::Deserialize;
use thiserror::Error;

use crate::{glob::InputGlob, metadata::MetadataFormat, options::Options};

static CONFIG_FILENAME: &str = "tpack.toml";

static DEFAULT_GLOB: &str = "*.png";
static DEFAULT_OUTPUT: &str = "output.png";
static DEFAULT_METADATA_OUTPUT: &str = "output.cfg";
const DEFAULT_CANVAS_SIZE: u32 = 512;

/// Project settings, contained in a tpack.toml file.
///
/// Every field is optional. Anything given on the command line wins over the
/// project file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Padding between packed images, in pixels.
    pub padding: Option<u32>,

    /// The width and height of the output canvas.
    pub canvas_size: Option<(u32, u32)>,

    /// Which files in the image directory should be packed.
    pub glob: Option<InputGlob>,

    /// Where to write the packed image.
    pub output: Option<PathBuf>,

    /// Where to write the placement description.
    pub metadata_output: Option<PathBuf>,

    pub metadata_format: Option<MetadataFormat>,

    /// Template used when `metadata-format` is `template`.
    pub template: Option<PathBuf>,

    pub alpha_bleed: Option<bool>,

    /// The path that this config came from. Paths in this config are relative
    /// to the folder containing it.
    #[serde(skip)]
    pub file_path: PathBuf,
}

impl ProjectConfig {
    pub fn read_from_folder_or_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        if meta.is_file() {
            Self::read_from_file(path)
        } else {
            Self::read_from_folder(path)
        }
    }

    pub fn read_from_folder<P: AsRef<Path>>(folder_path: P) -> Result<Self, ConfigError> {
        let file_path = folder_path.as_ref().join(CONFIG_FILENAME);

        Self::read_from_file(file_path)
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        let mut config: Self = toml::from_slice(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_owned(),
            source,
        })?;
        config.file_path = path.to_owned();

        Ok(config)
    }

    /// The path that paths in this config should be considered relative to.
    pub fn folder(&self) -> &Path {
        self.file_path.parent().unwrap_or_else(|| Path::new(""))
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        self.folder().join(path)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{source} in {}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid glob {glob:?}: {source}")]
    Glob {
        glob: String,
        source: globset::Error,
    },

    #[error("the canvas must be at least 1x1 pixels, but was {0}x{1}")]
    EmptyCanvas(u32, u32),

    #[error("metadata format 'template' needs a template file, given with --template")]
    MissingTemplate,
}

impl ConfigError {
    /// Tells whether this ConfigError originated because of a path not
    /// existing.
    ///
    /// This lets `ProjectConfig::read_from_folder` be used without first
    /// checking whether the folder has a project file.
    pub fn is_not_found(&self) -> bool {
        match self {
            ConfigError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Everything a packing run needs to know, after merging command line options,
/// the project file, and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub dir: PathBuf,
    pub glob: InputGlob,
    pub padding: u32,
    pub canvas_size: (u32, u32),
    pub output: PathBuf,
    pub metadata_output: PathBuf,
    pub metadata_format: MetadataFormat,
    pub template: Option<PathBuf>,
    pub alpha_bleed: bool,
    pub allow_partial: bool,
}

impl Settings {
    /// Loads the project file that applies to these options, if any, and
    /// merges it with them.
    pub fn load(options: &Options) -> Result<Self, ConfigError> {
        let project = match &options.project {
            Some(path) => ProjectConfig::read_from_folder_or_file(path)?,
            None => match ProjectConfig::read_from_folder(&options.dir) {
                Ok(config) => config,
                Err(err) if err.is_not_found() => ProjectConfig::default(),
                Err(err) => return Err(err),
            },
        };

        if !project.file_path.as_os_str().is_empty() {
            log::info!("Using project file {}", project.file_path.display());
        }

        Self::resolve(options, &project)
    }

    pub fn resolve(options: &Options, project: &ProjectConfig) -> Result<Self, ConfigError> {
        let glob = match &options.glob {
            Some(pattern) => InputGlob::new(pattern).map_err(|source| ConfigError::Glob {
                glob: pattern.clone(),
                source,
            })?,
            None => match &project.glob {
                Some(glob) => glob.clone(),
                None => InputGlob::new(DEFAULT_GLOB).map_err(|source| ConfigError::Glob {
                    glob: DEFAULT_GLOB.to_owned(),
                    source,
                })?,
            },
        };

        let project_size = project.canvas_size;
        let square = options.size.map(|size| (size, size));
        let base_size = square
            .or(project_size)
            .unwrap_or((DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE));
        let canvas_size = (
            options.width.unwrap_or(base_size.0),
            options.height.unwrap_or(base_size.1),
        );

        if canvas_size.0 == 0 || canvas_size.1 == 0 {
            return Err(ConfigError::EmptyCanvas(canvas_size.0, canvas_size.1));
        }

        let output = options
            .output
            .clone()
            .or_else(|| project.output.as_ref().map(|path| project.resolve_path(path)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let metadata_output = options
            .config_output
            .clone()
            .or_else(|| {
                project
                    .metadata_output
                    .as_ref()
                    .map(|path| project.resolve_path(path))
            })
            .unwrap_or_else(|| PathBuf::from(DEFAULT_METADATA_OUTPUT));

        let template = options
            .template
            .clone()
            .or_else(|| project.template.as_ref().map(|path| project.resolve_path(path)));

        // A template on the command line means the user wants it used, even if
        // the project file picks another format.
        let metadata_format = match (options.format, &options.template) {
            (Some(format), _) => format,
            (None, Some(_)) => MetadataFormat::Template,
            (None, None) => match (project.metadata_format, &template) {
                (Some(format), _) => format,
                (None, Some(_)) => MetadataFormat::Template,
                (None, None) => MetadataFormat::Json,
            },
        };

        if metadata_format == MetadataFormat::Template && template.is_none() {
            return Err(ConfigError::MissingTemplate);
        }

        Ok(Settings {
            dir: options.dir.clone(),
            glob,
            padding: options.padding.or(project.padding).unwrap_or(0),
            canvas_size,
            output,
            metadata_output,
            metadata_format,
            template,
            alpha_bleed: options.alpha_bleed || project.alpha_bleed.unwrap_or(false),
            allow_partial: options.allow_partial,
        })
    }
}
