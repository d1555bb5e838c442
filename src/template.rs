//! A small text template language for describing a spritesheet in whatever
//! format a game engine wants.
//!
//! Templates are plain text with actions between `{{` and `}}`:
//!
//! * `{{.img.W}}`, `{{.img.H}}`, `{{.img.Name}}`, `{{.img.Hash}}` describe the
//!   packed image.
//! * `{{range .rects}} ... {{end}}` repeats its body once per packed sprite.
//!   Inside it, `{{.Name}}`, `{{.NameId}}`, `{{.X}}`, `{{.Y}}`, `{{.W}}` and
//!   `{{.H}}` describe the current sprite, and `$.img.*` still reaches the
//!   packed image.
//! * `{{-` trims whitespace before an action, and `-}}` trims whitespace after
//!   it.

use regex::Regex;
use thiserror::Error;

use crate::metadata::{AtlasMetadata, SpriteMetadata};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown field {field:?} on line {line}")]
    UnknownField { field: String, line: usize },

    #[error("unsupported action {action:?} on line {line}")]
    UnsupportedAction { action: String, line: usize },

    #[error("{{{{end}}}} on line {line} doesn't close a {{{{range}}}}")]
    UnexpectedEnd { line: usize },

    #[error("{{{{range}}}} can't be nested, found on line {line}")]
    NestedRange { line: usize },

    #[error("{{{{range}}}} on line {line} is never closed with {{{{end}}}}")]
    UnclosedRange { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageField {
    Width,
    Height,
    Name,
    Hash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpriteField {
    Name,
    NameId,
    X,
    Y,
    Width,
    Height,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Image(ImageField),
    Sprite(SpriteField),
    Range(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        lazy_static::lazy_static! {
            static ref ACTION: Regex = Regex::new(r"\{\{(-\s)?\s*(.*?)\s*(\s-)?\}\}").unwrap();
        }

        let mut nodes = Vec::new();
        // Body of the range being parsed, and the line it started on.
        let mut range: Option<(Vec<Node>, usize)> = None;

        let mut last_end = 0;
        let mut trim_next_text = false;

        for captures in ACTION.captures_iter(source) {
            let whole = match captures.get(0) {
                Some(whole) => whole,
                None => continue,
            };
            let line = source[..whole.start()].matches('\n').count() + 1;

            let mut text = &source[last_end..whole.start()];
            if trim_next_text {
                text = text.trim_start();
            }
            if captures.get(1).is_some() {
                text = text.trim_end();
            }
            trim_next_text = captures.get(3).is_some();
            last_end = whole.end();

            let target = match &mut range {
                Some((body, _)) => body,
                None => &mut nodes,
            };
            if !text.is_empty() {
                target.push(Node::Text(text.to_owned()));
            }

            let action = captures.get(2).map(|m| m.as_str()).unwrap_or("");

            if action == "range .rects" || action == "range $.rects" {
                if range.is_some() {
                    return Err(TemplateError::NestedRange { line });
                }
                range = Some((Vec::new(), line));
            } else if action == "end" {
                match range.take() {
                    Some((body, _)) => nodes.push(Node::Range(body)),
                    None => return Err(TemplateError::UnexpectedEnd { line }),
                }
            } else if action.starts_with('.') || action.starts_with("$.") {
                let node = parse_field(action, range.is_some()).ok_or_else(|| {
                    TemplateError::UnknownField {
                        field: action.to_owned(),
                        line,
                    }
                })?;

                match &mut range {
                    Some((body, _)) => body.push(node),
                    None => nodes.push(node),
                }
            } else {
                return Err(TemplateError::UnsupportedAction {
                    action: action.to_owned(),
                    line,
                });
            }
        }

        if let Some((_, line)) = range {
            return Err(TemplateError::UnclosedRange { line });
        }

        let mut text = &source[last_end..];
        if trim_next_text {
            text = text.trim_start();
        }
        if !text.is_empty() {
            nodes.push(Node::Text(text.to_owned()));
        }

        Ok(Template { nodes })
    }

    pub fn render(&self, metadata: &AtlasMetadata) -> String {
        let mut output = String::new();
        render_nodes(&self.nodes, metadata, None, &mut output);
        output
    }
}

fn parse_field(action: &str, in_range: bool) -> Option<Node> {
    let image_field = |name: &str| match name {
        "W" => Some(ImageField::Width),
        "H" => Some(ImageField::Height),
        "Name" => Some(ImageField::Name),
        "Hash" => Some(ImageField::Hash),
        _ => None,
    };

    if let Some(name) = action.strip_prefix("$.img.") {
        return image_field(name).map(Node::Image);
    }

    let name = action.strip_prefix('.')?;

    if !in_range {
        return name
            .strip_prefix("img.")
            .and_then(image_field)
            .map(Node::Image);
    }

    let field = match name {
        "Name" => SpriteField::Name,
        "NameId" => SpriteField::NameId,
        "X" => SpriteField::X,
        "Y" => SpriteField::Y,
        "W" => SpriteField::Width,
        "H" => SpriteField::Height,
        _ => return None,
    };

    Some(Node::Sprite(field))
}

fn render_nodes(
    nodes: &[Node],
    metadata: &AtlasMetadata,
    sprite: Option<&SpriteMetadata>,
    output: &mut String,
) {
    for node in nodes {
        match node {
            Node::Text(text) => output.push_str(text),
            Node::Image(field) => {
                let image = &metadata.image;
                let value = match field {
                    ImageField::Width => image.width.to_string(),
                    ImageField::Height => image.height.to_string(),
                    ImageField::Name => image.name.clone(),
                    ImageField::Hash => image.hash.clone(),
                };
                output.push_str(&value);
            }
            Node::Sprite(field) => {
                // Sprite fields only parse inside a range, which always
                // renders with a sprite.
                if let Some(sprite) = sprite {
                    let value = match field {
                        SpriteField::Name => sprite.name.clone(),
                        SpriteField::NameId => sprite.name_id.clone(),
                        SpriteField::X => sprite.x.to_string(),
                        SpriteField::Y => sprite.y.to_string(),
                        SpriteField::Width => sprite.width.to_string(),
                        SpriteField::Height => sprite.height.to_string(),
                    };
                    output.push_str(&value);
                }
            }
            Node::Range(body) => {
                for sprite in &metadata.sprites {
                    render_nodes(body, metadata, Some(sprite), output);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::metadata::ImageMetadata;

    fn metadata() -> AtlasMetadata {
        AtlasMetadata {
            image: ImageMetadata {
                name: "atlas.png".to_owned(),
                width: 64,
                height: 32,
                hash: "abc123".to_owned(),
            },
            sprites: vec![
                SpriteMetadata {
                    name: "hero-idle.png".to_owned(),
                    name_id: "hero_idle".to_owned(),
                    x: 0,
                    y: 0,
                    width: 16,
                    height: 24,
                },
                SpriteMetadata {
                    name: "coin.png".to_owned(),
                    name_id: "coin".to_owned(),
                    x: 18,
                    y: 0,
                    width: 8,
                    height: 8,
                },
            ],
        }
    }

    fn render(source: &str) -> String {
        Template::parse(source).unwrap().render(&metadata())
    }

    #[test]
    fn image_fields() {
        assert_eq!(
            render("{{.img.Name}} {{.img.W}}x{{.img.H}} {{ .img.Hash }}"),
            "atlas.png 64x32 abc123"
        );
    }

    #[test]
    fn range_over_sprites() {
        let source = "size {{.img.W}} {{.img.H}}\n\
                      {{range .rects}}{{.NameId}} = {{.X}},{{.Y}},{{.W}},{{.H}} of {{$.img.Name}}\n{{end}}";

        assert_eq!(
            render(source),
            "size 64 32\n\
             hero_idle = 0,0,16,24 of atlas.png\n\
             coin = 18,0,8,8 of atlas.png\n"
        );
    }

    #[test]
    fn trim_markers() {
        let source = "[\n  {{- range .rects}}\n  \"{{.Name}}\",\n  {{- end}}\n]";

        assert_eq!(render(source), "[\n  \"hero-idle.png\",\n  \"coin.png\",\n]");
    }

    #[test]
    fn trim_after_action() {
        assert_eq!(render("{{.img.W -}}   \n  px"), "64px");
    }

    #[test]
    fn unknown_fields_are_errors() {
        assert_eq!(
            Template::parse("ok\n{{.img.Depth}}"),
            Err(TemplateError::UnknownField {
                field: ".img.Depth".to_owned(),
                line: 2,
            })
        );

        // Sprite fields only make sense inside a range.
        assert!(matches!(
            Template::parse("{{.Name}}"),
            Err(TemplateError::UnknownField { .. })
        ));
    }

    #[test]
    fn structure_errors() {
        assert_eq!(
            Template::parse("{{end}}"),
            Err(TemplateError::UnexpectedEnd { line: 1 })
        );
        assert_eq!(
            Template::parse("\n{{range .rects}}"),
            Err(TemplateError::UnclosedRange { line: 2 })
        );
        assert_eq!(
            Template::parse("{{range .rects}}{{range .rects}}{{end}}{{end}}"),
            Err(TemplateError::NestedRange { line: 1 })
        );
        assert!(matches!(
            Template::parse("{{if .X}}"),
            Err(TemplateError::UnsupportedAction { .. })
        ));
    }
}
