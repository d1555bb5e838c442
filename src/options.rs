use std::path::PathBuf;

use structopt::StructOpt;

use crate::metadata::MetadataFormat;

#[derive(Debug, StructOpt)]
#[structopt(about = "Packs a directory of images into a single sprite atlas")]
pub struct Options {
    /// The directory to look for images in.
    #[structopt(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// A tpack.toml project file to read settings from. Defaults to the
    /// tpack.toml in the image directory, if there is one.
    #[structopt(long)]
    pub project: Option<PathBuf>,

    /// Padding between packed images, in pixels.
    #[structopt(short, long)]
    pub padding: Option<u32>,

    /// The width and height of the square output canvas, in pixels.
    #[structopt(short, long)]
    pub size: Option<u32>,

    /// Overrides the canvas width set by --size.
    #[structopt(long)]
    pub width: Option<u32>,

    /// Overrides the canvas height set by --size.
    #[structopt(long)]
    pub height: Option<u32>,

    /// Where to write the packed PNG image.
    #[structopt(short, long)]
    pub output: Option<PathBuf>,

    /// Where to write the file describing where each image was placed.
    #[structopt(short = "c", long)]
    pub config_output: Option<PathBuf>,

    /// A text template used to generate the placement description. Implies
    /// `--format template`.
    #[structopt(short, long)]
    pub template: Option<PathBuf>,

    /// The format of the placement description.
    ///
    /// Options: json, toml, lua, template
    #[structopt(short, long)]
    pub format: Option<MetadataFormat>,

    /// Only images whose path relative to --dir matches this glob are packed.
    /// Defaults to "*.png".
    #[structopt(long)]
    pub glob: Option<String>,

    /// Fill fully transparent pixels with the color of their nearest visible
    /// neighbors, which avoids dark fringes when the atlas is filtered.
    #[structopt(long)]
    pub alpha_bleed: bool,

    /// Still write the image and description for the images that fit when
    /// packing fails partway through.
    #[structopt(long)]
    pub allow_partial: bool,

    /// Log each image as it's loaded, along with other progress information.
    #[structopt(short, long)]
    pub verbose: bool,
}
