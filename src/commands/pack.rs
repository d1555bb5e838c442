use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};
use packos::{sort_by_padded_area, Canvas, GreedyPacker, PackError, PackSummary, Rect};

use crate::{
    alpha_bleed::alpha_bleed,
    config::Settings,
    image::Image,
    inputs::{discover_inputs, InputFile},
    metadata::AtlasMetadata,
    options::Options,
    spritesheet::{ImageId, SpriteSources, Spritesheet},
};

pub fn pack(options: Options) -> anyhow::Result<()> {
    let settings = Settings::load(&options).context("couldn't load settings")?;
    let show_progress = !options.verbose;

    let mut session = PackSession::new(settings);
    session.discover_inputs()?;
    session.load_images(show_progress)?;

    let result = session.pack();

    match &result {
        Ok(summary) => log::info!("Packed {} images", summary.placed),
        Err(err) if session.settings.allow_partial => {
            log::warn!("{}; writing the {} images that fit", err, err.index());
        }
        Err(err) => bail!("{}", err),
    }

    session.write_outputs()?;

    if let Err(err) = result {
        bail!("{}", err);
    }

    Ok(())
}

/// A pack session holds all of the state for a single run of tpack.
struct PackSession {
    settings: Settings,

    /// Image files found in the input directory, in name order.
    inputs: Vec<InputFile>,

    sources: SpriteSources,

    /// One rectangle per decoded input, in packing order once packed.
    rects: Vec<Rect<ImageId>>,
}

impl PackSession {
    fn new(settings: Settings) -> Self {
        log::trace!("Starting new pack session");

        Self {
            settings,
            inputs: Vec::new(),
            sources: SpriteSources::new(),
            rects: Vec::new(),
        }
    }

    fn discover_inputs(&mut self) -> anyhow::Result<()> {
        let settings = &self.settings;

        self.inputs = discover_inputs(&settings.dir, &settings.glob).with_context(|| {
            format!("couldn't search {} for images", settings.dir.display())
        })?;

        // Files written by an earlier run must not be packed again.
        let outputs: Vec<PathBuf> = [&settings.output, &settings.metadata_output]
            .iter()
            .filter_map(|path| fs::canonicalize(path).ok())
            .collect();

        self.inputs.retain(|input| {
            let is_output = fs::canonicalize(&input.path)
                .map(|path| outputs.contains(&path))
                .unwrap_or(false);

            if is_output {
                log::info!("Skipping {}, which is an output of this run", input.name);
            }

            !is_output
        });

        if self.inputs.is_empty() {
            log::warn!(
                "No images in {} matched '{}'",
                settings.dir.display(),
                settings.glob
            );
        }

        Ok(())
    }

    fn load_images(&mut self, show_progress: bool) -> anyhow::Result<()> {
        let progress = if show_progress {
            ProgressBar::new(self.inputs.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(ProgressStyle::default_bar().template("{bar:40} {pos}/{len} {msg}"));

        for input in &self.inputs {
            progress.set_message(input.name.clone());

            let contents = fs::read(&input.path)?;
            let image = Image::decode_png(contents.as_slice())
                .with_context(|| format!("couldn't decode {}", input.path.display()))?;

            let (width, height) = image.size();
            log::info!("Image {}: {}x{}", input.name, width, height);

            let id = self.sources.insert(image);
            self.rects.push(Rect::new(
                (width, height),
                self.settings.padding,
                input.name.clone(),
                id,
            ));

            progress.inc(1);
        }

        progress.finish_and_clear();

        Ok(())
    }

    fn pack(&mut self) -> Result<PackSummary, PackError> {
        sort_by_padded_area(&mut self.rects);

        GreedyPacker::with_size(self.settings.canvas_size).pack(&mut self.rects)
    }

    fn write_outputs(&self) -> anyhow::Result<()> {
        let settings = &self.settings;
        let (width, height) = settings.canvas_size;

        let mut sheet = Spritesheet::compose(Canvas::new(width, height), &self.rects, &self.sources);
        log::trace!("{:?}", sheet);

        if settings.alpha_bleed {
            alpha_bleed(sheet.image_mut());
        }

        let mut encoded = Vec::new();
        sheet
            .image()
            .encode_png(&mut encoded)
            .context("couldn't encode the packed image")?;
        let hash = blake3::hash(&encoded).to_hex().to_string();

        write_file(&settings.output, &encoded)?;
        log::info!("Wrote {}", settings.output.display());

        let template = match &settings.template {
            Some(path) => Some(fs::read_to_string(path)?),
            None => None,
        };

        let image_name = settings
            .output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let metadata = AtlasMetadata::new(&sheet, image_name, hash);
        let rendered = metadata
            .render(settings.metadata_format, template.as_deref())
            .context("couldn't generate the placement description")?;

        write_file(&settings.metadata_output, rendered.as_bytes())?;
        log::info!("Wrote {}", settings.metadata_output.display());

        Ok(())
    }
}

fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, contents)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    use structopt::StructOpt;

    use crate::image::Pixel;

    fn write_png(path: &Path, size: (u32, u32), pixel: Pixel) {
        let mut image = Image::new_empty_rgba8(size);
        for y in 0..size.1 {
            for x in 0..size.0 {
                image.set_pixel((x, y), pixel);
            }
        }

        let mut encoded = Vec::new();
        image.encode_png(&mut encoded).unwrap();
        fs::write(path, encoded).unwrap();
    }

    fn run(dir: &Path, extra: &[&str]) -> anyhow::Result<()> {
        let dir_arg = dir.display().to_string();
        let output = dir.join("out/atlas.png").display().to_string();
        let metadata = dir.join("out/atlas.json").display().to_string();

        let mut args = vec!["tpack", "-d", &dir_arg, "-o", &output, "-c", &metadata];
        args.extend_from_slice(extra);

        pack(Options::from_iter(args))
    }

    fn read_metadata(dir: &Path) -> serde_json::Value {
        let contents = fs::read_to_string(dir.join("out/atlas.json")).unwrap();
        serde_json::from_str(&contents).unwrap()
    }

    #[test]
    fn packs_directory() {
        let dir = tempfile::tempdir().unwrap();
        let red = Pixel::new(255, 0, 0, 255);
        write_png(&dir.path().join("small.png"), (4, 4), red);
        write_png(&dir.path().join("big.png"), (8, 8), red);

        run(dir.path(), &["-s", "16", "-p", "1"]).unwrap();

        let atlas_bytes = fs::read(dir.path().join("out/atlas.png")).unwrap();
        let atlas = Image::decode_png(atlas_bytes.as_slice()).unwrap();
        assert_eq!(atlas.size(), (16, 16));
        assert_eq!(atlas.get_pixel((0, 0)), red);
        assert_eq!(atlas.get_pixel((8, 0)), Pixel::new(0, 0, 0, 0));
        assert_eq!(atlas.get_pixel((9, 0)), red);

        let metadata = read_metadata(dir.path());
        assert_eq!(metadata["image"]["name"], "atlas.png");
        assert_eq!(
            metadata["image"]["hash"],
            blake3::hash(&atlas_bytes).to_hex().to_string()
        );
        assert_eq!(metadata["sprites"][0]["name"], "big.png");
        assert_eq!(metadata["sprites"][1]["name_id"], "small");
        assert_eq!(metadata["sprites"][1]["x"], 9);
    }

    #[test]
    fn rerun_skips_own_output() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a.png"), (8, 8), Pixel::new(4, 4, 4, 255));

        let dir_arg = dir.path().display().to_string();
        let output = dir.path().join("output.png").display().to_string();
        let metadata = dir.path().join("output.json").display().to_string();
        let args = vec!["tpack", "-d", &dir_arg, "-o", &output, "-c", &metadata, "-s", "16"];

        pack(Options::from_iter(args.iter().copied())).unwrap();
        let first = fs::read(dir.path().join("output.png")).unwrap();

        pack(Options::from_iter(args.iter().copied())).unwrap();
        let second = fs::read(dir.path().join("output.png")).unwrap();

        assert_eq!(first, second);

        let contents = fs::read_to_string(dir.path().join("output.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["sprites"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn empty_directory_writes_toml() {
        let dir = tempfile::tempdir().unwrap();

        run(dir.path(), &["-s", "8", "-f", "toml"]).unwrap();

        let contents = fs::read_to_string(dir.path().join("out/atlas.json")).unwrap();
        let value: toml::Value = toml::from_str(&contents).unwrap();
        assert_eq!(value["sprites"].as_array().map(Vec::len), Some(0));
        assert_eq!(value["image"]["width"].as_integer(), Some(8));
    }

    #[test]
    fn overflow_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("huge.png"), (40, 40), Pixel::new(1, 1, 1, 255));

        let err = run(dir.path(), &["-s", "32"]).unwrap_err();

        assert!(err.to_string().contains("huge.png"));
        assert!(!dir.path().join("out/atlas.png").exists());
    }

    #[test]
    fn partial_output_keeps_packed_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a.png"), (16, 16), Pixel::new(1, 1, 1, 255));
        write_png(&dir.path().join("b.png"), (16, 16), Pixel::new(2, 2, 2, 255));
        write_png(&dir.path().join("c.png"), (1, 1), Pixel::new(3, 3, 3, 255));

        let err = run(dir.path(), &["-s", "16", "--allow-partial"]).unwrap_err();

        assert!(err.to_string().contains("b.png"));

        let metadata = read_metadata(dir.path());
        let sprites = metadata["sprites"].as_array().unwrap();
        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0]["name"], "a.png");
    }

    #[test]
    fn settings_come_from_project_file() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("tile.png"), (8, 8), Pixel::new(9, 9, 9, 255));
        fs::write(
            dir.path().join("tpack.toml"),
            "canvas-size = [8, 8]\nmetadata-format = \"lua\"\n",
        )
        .unwrap();

        run(dir.path(), &[]).unwrap();

        let contents = fs::read_to_string(dir.path().join("out/atlas.json")).unwrap();
        assert!(contents.starts_with("-- Generated by tpack."));

        let atlas_bytes = fs::read(dir.path().join("out/atlas.png")).unwrap();
        let atlas = Image::decode_png(atlas_bytes.as_slice()).unwrap();
        assert_eq!(atlas.size(), (8, 8));
    }

    #[test]
    fn template_output() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("gem.png"), (3, 5), Pixel::new(0, 255, 0, 255));
        let template = dir.path().join("sprites.tpl");
        fs::write(
            &template,
            "{{.img.W}}x{{.img.H}}\n{{range .rects}}{{.NameId}} {{.X}} {{.Y}} {{.W}} {{.H}}\n{{end}}",
        )
        .unwrap();

        let template_arg = template.display().to_string();
        run(dir.path(), &["-s", "8", "-t", &template_arg]).unwrap();

        let contents = fs::read_to_string(dir.path().join("out/atlas.json")).unwrap();
        assert_eq!(contents, "8x8\ngem 0 0 3 5\n");
    }
}
