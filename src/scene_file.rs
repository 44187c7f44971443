//! Loader for the small space-separated scene text format described in
//! SPEC_FULL.md §4.8. Three commands: `s` (grid size), `w` (one row of
//! tile ids), `t` (append a wall to a tile). Blank lines and `#`
//! comments are skipped. Any malformed line aborts the whole load and
//! the partially built scene is discarded.

use std::fmt;
use std::path::Path;

use log::warn;
use thiserror::Error;

use crate::math::LinearFunc;
use crate::world::{Scene, TextureBank, Wall};

/// What went wrong, independent of which line it happened on.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SceneFileErrorKind {
    #[error("could not read the scene file")]
    FailedToRead,
    #[error("unknown command `{0}`")]
    OperationNotAvailable(String),
    #[error("expected a number, found `{0}`")]
    UnknownNumberFormat(String),
    #[error("wrong number of arguments for `{cmd}`: expected {expected}, got {got}")]
    InvalidArgumentCount {
        cmd: char,
        expected: usize,
        got: usize,
    },
    #[error("expected a quoted string, found `{0}`")]
    UnknownStringFormat(String),
}

/// A parse failure, with the 1-based source line it occurred on.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SceneFileError {
    pub line: usize,
    pub kind: SceneFileErrorKind,
}

impl fmt::Display for SceneFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for SceneFileError {}

/// Number of tokens after the command letter in a `t` line (includes
/// the format's reserved placeholder fields, kept for compatibility
/// with scene files written against the richer upstream grammar).
const WALL_LINE_ARGS: usize = 20;

fn parse_num<T: std::str::FromStr>(tok: &str, line: usize) -> Result<T, SceneFileError> {
    tok.parse::<T>().map_err(|_| SceneFileError {
        line,
        kind: SceneFileErrorKind::UnknownNumberFormat(tok.to_string()),
    })
}

fn parse_bool(tok: &str, line: usize) -> Result<bool, SceneFileError> {
    match tok {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(SceneFileError {
            line,
            kind: SceneFileErrorKind::UnknownNumberFormat(tok.to_string()),
        }),
    }
}

fn parse_quoted(tok: &str, line: usize) -> Result<&str, SceneFileError> {
    if tok.len() >= 2 && tok.starts_with('"') && tok.ends_with('"') {
        Ok(&tok[1..tok.len() - 1])
    } else {
        Err(SceneFileError {
            line,
            kind: SceneFileErrorKind::UnknownStringFormat(tok.to_string()),
        })
    }
}

fn require_args(
    cmd: char,
    toks: &[&str],
    expected: usize,
    line: usize,
) -> Result<(), SceneFileError> {
    if toks.len() != expected {
        Err(SceneFileError {
            line,
            kind: SceneFileErrorKind::InvalidArgumentCount {
                cmd,
                expected,
                got: toks.len(),
            },
        })
    } else {
        Ok(())
    }
}

/// Parse a scene from `text`, resolving texture paths relative to
/// `base_dir` and registering decoded textures in `textures`. A texture
/// that fails to decode is logged and the wall keeps [`crate::world::NO_TEXTURE`].
pub fn parse_scene(
    text: &str,
    base_dir: &Path,
    textures: &mut TextureBank,
) -> Result<Scene, SceneFileError> {
    let mut scene: Option<Scene> = None;
    // Count of `w` rows consumed so far. The first row after `s` is the
    // topmost (`j = height - 1`), decrementing with each subsequent line,
    // per SPEC_FULL.md §4.8 and the original loader's `wdh--` convention.
    let mut rows_filled: usize = 0;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let toks: Vec<&str> = line.split_whitespace().collect();
        let cmd = toks[0];
        let args = &toks[1..];
        if cmd.len() != 1 {
            return Err(SceneFileError {
                line: line_no,
                kind: SceneFileErrorKind::OperationNotAvailable(cmd.to_string()),
            });
        }

        match cmd.chars().next().unwrap() {
            's' => {
                require_args('s', args, 2, line_no)?;
                let w: usize = parse_num(args[0], line_no)?;
                let h: usize = parse_num(args[1], line_no)?;
                scene = Some(Scene::new(w, h));
                rows_filled = 0;
            }
            'w' => {
                let s = scene.as_mut().ok_or_else(|| SceneFileError {
                    line: line_no,
                    kind: SceneFileErrorKind::OperationNotAvailable("w before s".into()),
                })?;
                require_args('w', args, s.width(), line_no)?;
                if rows_filled >= s.height() {
                    return Err(SceneFileError {
                        line: line_no,
                        kind: SceneFileErrorKind::InvalidArgumentCount {
                            cmd: 'w',
                            expected: s.height(),
                            got: rows_filled + 1,
                        },
                    });
                }
                let j = s.height() - 1 - rows_filled;
                for (i, tok) in args.iter().enumerate() {
                    let id: u16 = parse_num(tok, line_no)?;
                    s.set_tile(i, j, id);
                }
                rows_filled += 1;
            }
            't' => {
                let s = scene.as_mut().ok_or_else(|| SceneFileError {
                    line: line_no,
                    kind: SceneFileErrorKind::OperationNotAvailable("t before s".into()),
                })?;
                require_args('t', args, WALL_LINE_ARGS, line_no)?;

                let tile_id: u16 = parse_num(args[0], line_no)?;
                let slope: f32 = parse_num(args[2], line_no)?;
                let height: f32 = parse_num(args[3], line_no)?;
                let x_min: f32 = parse_num(args[5], line_no)?;
                let x_max: f32 = parse_num(args[6], line_no)?;
                let y_min: f32 = parse_num(args[7], line_no)?;
                let y_max: f32 = parse_num(args[8], line_no)?;
                let h_min: f32 = parse_num(args[9], line_no)?;
                let h_max: f32 = parse_num(args[10], line_no)?;
                let blocks_ray = parse_bool(args[12], line_no)?;
                let r: u8 = parse_num(args[14], line_no)?;
                let g: u8 = parse_num(args[15], line_no)?;
                let b: u8 = parse_num(args[16], line_no)?;
                let a: u8 = parse_num(args[17], line_no)?;
                let tex_path = parse_quoted(args[19], line_no)?;

                let tint = ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
                let func = LinearFunc::new(slope, height, x_min, x_max, y_min, y_max);
                let mut wall = Wall::new(func, h_min, h_max, tint, blocks_ray);

                if tex_path != "-" {
                    let full_path = base_dir.join(tex_path);
                    match textures.id(tex_path) {
                        Some(id) => wall.tex_id = id,
                        None => match load_png_texture(&full_path) {
                            Ok(tex) => {
                                wall.tex_id = textures
                                    .insert(tex_path, tex)
                                    .expect("checked id() above for duplicates");
                            }
                            Err(err) => {
                                warn!(
                                    "line {line_no}: failed to load texture `{}`: {err}",
                                    full_path.display()
                                );
                            }
                        },
                    }
                }

                s.add_wall(tile_id, wall);
            }
            other => {
                return Err(SceneFileError {
                    line: line_no,
                    kind: SceneFileErrorKind::OperationNotAvailable(other.to_string()),
                });
            }
        }
    }

    scene.ok_or(SceneFileError {
        line: 0,
        kind: SceneFileErrorKind::FailedToRead,
    })
}

/// Load a scene directly from a file on disk, resolving relative texture
/// paths against its parent directory.
pub fn load_scene_file(
    path: &Path,
    textures: &mut TextureBank,
) -> Result<Scene, SceneFileError> {
    let text = std::fs::read_to_string(path).map_err(|_| SceneFileError {
        line: 0,
        kind: SceneFileErrorKind::FailedToRead,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene(&text, base_dir, textures)
}

/// Decode a PNG into bottom-left-origin RGBA8, the orientation
/// [`crate::world::Texture`] expects. The flip happens once here, never
/// per-sample in the hot texture-lookup path.
fn load_png_texture(path: &Path) -> Result<crate::world::Texture, image::ImageError> {
    let img = image::open(path)?.to_rgba8();
    let (w, h) = img.dimensions();
    let (w, h) = (w as usize, h as usize);
    let mut pixels = vec![0u32; w * h];
    for (x, y, px) in img.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let argb = ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
        let dst_row = h - 1 - y as usize;
        pixels[dst_row * w + x as usize] = argb;
    }
    Ok(crate::world::Texture { w, h, pixels })
}
