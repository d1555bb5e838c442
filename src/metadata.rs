//! Describes where every sprite ended up, for engines and build scripts that
//! consume the packed image.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    lua_ast::{Block, Literal, Statement, TableLiteral},
    spritesheet::Spritesheet,
    template::{Template, TemplateError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataFormat {
    Json,
    Toml,

    /// A Lua module returning a table keyed by sprite name. Each entry has
    /// `Image`, `ImageRectOffset` and `ImageRectSize`, laid out the same way
    /// as the properties on Roblox's `ImageLabel`.
    Lua,

    /// A user-supplied text template.
    Template,
}

impl FromStr for MetadataFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<MetadataFormat, Self::Err> {
        match value {
            "json" => Ok(MetadataFormat::Json),
            "toml" => Ok(MetadataFormat::Toml),
            "lua" => Ok(MetadataFormat::Lua),
            "template" => Ok(MetadataFormat::Template),

            _ => Err(String::from(
                "Invalid metadata format. Valid options are 'json', 'toml', 'lua' and 'template'.",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtlasMetadata {
    pub image: ImageMetadata,
    pub sprites: Vec<SpriteMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    /// File name of the packed image.
    pub name: String,
    pub width: u32,
    pub height: u32,

    /// Hex-encoded BLAKE3 hash of the encoded PNG.
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpriteMetadata {
    pub name: String,
    pub name_id: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::ser::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("the template format needs a template")]
    MissingTemplate,
}

impl AtlasMetadata {
    pub fn new(sheet: &Spritesheet, image_name: String, hash: String) -> Self {
        let (width, height) = sheet.dimensions();

        let sprites = sheet
            .slices()
            .iter()
            .map(|slice| {
                let (width, height) = slice.size();

                SpriteMetadata {
                    name: slice.name.clone(),
                    name_id: slice.name_id.clone(),
                    x: slice.min.0,
                    y: slice.min.1,
                    width,
                    height,
                }
            })
            .collect();

        Self {
            image: ImageMetadata {
                name: image_name,
                width,
                height,
                hash,
            },
            sprites,
        }
    }

    /// Renders this description. `template` is the source of the template to
    /// use with `MetadataFormat::Template`, and is ignored otherwise.
    pub fn render(
        &self,
        format: MetadataFormat,
        template: Option<&str>,
    ) -> Result<String, MetadataError> {
        match format {
            MetadataFormat::Json => {
                let mut output = serde_json::to_string_pretty(self)?;
                output.push('\n');
                Ok(output)
            }
            MetadataFormat::Toml => {
                // Going through a Value puts plain keys like an empty
                // `sprites` ahead of the `[image]` table.
                let value = toml::Value::try_from(self)?;
                Ok(toml::to_string_pretty(&value)?)
            }
            MetadataFormat::Lua => Ok(self.to_lua().to_string()),
            MetadataFormat::Template => {
                let source = template.ok_or(MetadataError::MissingTemplate)?;
                Ok(Template::parse(source)?.render(self))
            }
        }
    }

    fn to_lua(&self) -> Block {
        let vector2 = |x: u32, y: u32| TableLiteral::new().with("X", x).with("Y", y);

        let sprites = self
            .sprites
            .iter()
            .fold(TableLiteral::new(), |table, sprite| {
                let entry = TableLiteral::new()
                    .with("Image", self.image.name.as_str())
                    .with("ImageRectOffset", vector2(sprite.x, sprite.y))
                    .with("ImageRectSize", vector2(sprite.width, sprite.height));

                table.with(sprite.name.as_str(), entry)
            });

        let root = TableLiteral::new()
            .with("Image", self.image.name.as_str())
            .with("Size", vector2(self.image.width, self.image.height))
            .with("Hash", self.image.hash.as_str())
            .with("Sprites", sprites);

        Block {
            statements: vec![
                Statement::Comment("Generated by tpack. Do not edit.".to_owned()),
                Statement::Return(Literal::from(root)),
            ],
        }
    }
}
