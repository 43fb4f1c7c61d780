//! Font discovery and glyph outlines.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve};
use kurbo::{BezPath, PathEl, Point};

use instavid_common::error::{InstavidError, InstavidResult};

use crate::surface::{FontSpec, TextBaseline};

/// One loaded face.
#[derive(Clone)]
pub struct FontFace {
    /// Lowercased family name without spaces, dashes or underscores.
    pub family: String,
    pub weight: u16,
    pub italic: bool,
    pub path: Option<PathBuf>,
    font: FontArc,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("italic", &self.italic)
            .field("path", &self.path)
            .finish()
    }
}

/// Faces indexed by family, weight and style.
#[derive(Debug, Clone, Default)]
pub struct FontBook {
    faces: Vec<FontFace>,
}

impl FontBook {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every `.ttf`/`.otf` file found under `dirs`, recursively.
    /// Unreadable files are skipped with a warning.
    pub fn load_dirs(dirs: &[PathBuf]) -> Self {
        let mut book = Self::empty();
        for dir in dirs {
            if dir.is_dir() {
                book.scan_dir(dir, 0);
            }
        }
        tracing::info!(faces = book.faces.len(), dirs = dirs.len(), "Loaded fonts");
        book
    }

    fn scan_dir(&mut self, dir: &Path, depth: usize) {
        if depth > 6 {
            return;
        }
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "Skipping font directory");
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                self.scan_dir(&path, depth + 1);
            } else if is_font_file(&path) {
                if let Err(e) = self.add_file(&path) {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to load font");
                }
            }
        }
    }

    /// Load one font file, deriving family, weight and style from its name.
    pub fn add_file(&mut self, path: &Path) -> InstavidResult<()> {
        let bytes = std::fs::read(path)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| InstavidError::render(format!("Unusable font file name: {}", path.display())))?;
        let (family, weight, italic) = parse_font_name(stem);
        self.add_bytes(&family, weight, italic, bytes)?;
        if let Some(face) = self.faces.last_mut() {
            face.path = Some(path.to_path_buf());
        }
        Ok(())
    }

    pub fn add_bytes(&mut self, family: &str, weight: u16, italic: bool, bytes: Vec<u8>) -> InstavidResult<()> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| InstavidError::render(format!("Invalid font data for {family}: {e}")))?;
        self.faces.push(FontFace {
            family: normalize_family(family),
            weight,
            italic,
            path: None,
            font,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }

    /// Best face for `spec`: same family with the closest weight (matching
    /// style preferred), else the closest weight of any family.
    pub fn lookup(&self, spec: &FontSpec) -> Option<&FontFace> {
        let family = normalize_family(&spec.family);
        let score = |f: &FontFace| {
            let style_penalty = if f.italic == spec.italic { 0 } else { 1000 };
            (f.weight as i32 - spec.weight as i32).abs() + style_penalty
        };
        self.faces
            .iter()
            .filter(|f| f.family == family)
            .min_by_key(|f| score(f))
            .or_else(|| self.faces.iter().min_by_key(|f| score(f)))
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf"))
        .unwrap_or(false)
}

pub fn normalize_family(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// `Inter-SemiBoldItalic` → (`inter`, 600, true). Variable font stems such
/// as `Inter[wght]` map to the regular weight.
pub fn parse_font_name(stem: &str) -> (String, u16, bool) {
    let base = stem.split('[').next().unwrap_or(stem);
    let (family, style) = match base.split_once('-') {
        Some((family, style)) => (family, style.to_ascii_lowercase()),
        None => (base, String::new()),
    };
    let italic = style.contains("italic") || style.contains("oblique");
    let style = style.replace("italic", "").replace("oblique", "");

    let weight = match style.as_str() {
        "thin" | "hairline" => 100,
        "extralight" | "ultralight" => 200,
        "light" => 300,
        "medium" => 500,
        "semibold" | "demibold" => 600,
        "bold" => 700,
        "extrabold" | "ultrabold" => 800,
        "black" | "heavy" => 900,
        _ => 400,
    };
    (normalize_family(family), weight, italic)
}

/// Glyph run laid out along a baseline, in local units.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub advance: f64,
    /// Glyph outlines, one closed subpath per contour.
    pub path: BezPath,
}

impl FontFace {
    fn scale(&self, size: f64) -> f64 {
        let upem = self.font.units_per_em().unwrap_or(1000.0) as f64;
        size / upem
    }

    fn glyph_ids(&self, text: &str) -> Vec<GlyphId> {
        text.chars().map(|c| self.font.glyph_id(c)).collect()
    }

    /// Total advance width of `text` at `size`, kerning included.
    pub fn measure(&self, text: &str, size: f64) -> f64 {
        let k = self.scale(size);
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for id in self.glyph_ids(text) {
            if let Some(p) = prev {
                width += self.font.kern_unscaled(p, id) as f64 * k;
            }
            width += self.font.h_advance_unscaled(id) as f64 * k;
            prev = Some(id);
        }
        width
    }

    /// Offset from the draw `y` to the alphabetic baseline.
    pub fn baseline_offset(&self, size: f64, baseline: TextBaseline) -> f64 {
        match baseline {
            TextBaseline::Alphabetic => 0.0,
            TextBaseline::Middle => {
                let k = self.scale(size);
                let ascent = self.font.ascent_unscaled() as f64;
                let descent = self.font.descent_unscaled() as f64;
                (ascent + descent) / 2.0 * k
            }
        }
    }

    /// Outline `text` with its left edge at `x` and its baseline at
    /// `baseline_y`.
    pub fn layout(&self, text: &str, x: f64, baseline_y: f64, size: f64) -> TextRun {
        let k = self.scale(size);
        let mut pen = x;
        let mut path = BezPath::new();
        let mut prev: Option<GlyphId> = None;

        for id in self.glyph_ids(text) {
            if let Some(p) = prev {
                pen += self.font.kern_unscaled(p, id) as f64 * k;
            }
            if let Some(outline) = self.font.outline(id) {
                let to_local = |p: ab_glyph::Point| Point::new(pen + p.x as f64 * k, baseline_y - p.y as f64 * k);
                let mut last: Option<Point> = None;
                for curve in &outline.curves {
                    let (start, el, end) = match curve {
                        OutlineCurve::Line(a, b) => (to_local(*a), PathEl::LineTo(to_local(*b)), to_local(*b)),
                        OutlineCurve::Quad(a, c, b) => {
                            (to_local(*a), PathEl::QuadTo(to_local(*c), to_local(*b)), to_local(*b))
                        }
                        OutlineCurve::Cubic(a, c1, c2, b) => (
                            to_local(*a),
                            PathEl::CurveTo(to_local(*c1), to_local(*c2), to_local(*b)),
                            to_local(*b),
                        ),
                    };
                    let continues = last.map(|l| l.distance(start) < 1e-6).unwrap_or(false);
                    if !continues {
                        if last.is_some() {
                            path.close_path();
                        }
                        path.move_to(start);
                    }
                    path.push(el);
                    last = Some(end);
                }
                if last.is_some() {
                    path.close_path();
                }
            }
            pen += self.font.h_advance_unscaled(id) as f64 * k;
            prev = Some(id);
        }

        TextRun {
            advance: pen - x,
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_font_name() {
        assert_eq!(parse_font_name("Inter-SemiBoldItalic"), ("inter".into(), 600, true));
        assert_eq!(parse_font_name("Outfit-ExtraBold"), ("outfit".into(), 800, false));
        assert_eq!(parse_font_name("SpaceMono-Regular"), ("spacemono".into(), 400, false));
        assert_eq!(parse_font_name("PlayfairDisplay-Italic"), ("playfairdisplay".into(), 400, true));
        assert_eq!(parse_font_name("Inter[wght]"), ("inter".into(), 400, false));
    }

    #[test]
    fn test_normalize_family_matches_display_names() {
        assert_eq!(normalize_family("Playfair Display"), "playfairdisplay");
        assert_eq!(normalize_family("Space_Mono"), "spacemono");
    }

    #[test]
    fn test_empty_book_has_no_match() {
        let book = FontBook::empty();
        assert!(book.is_empty());
        assert!(book.lookup(&FontSpec::new("Inter", 12.0, 400)).is_none());
    }

    #[test]
    fn test_invalid_font_bytes_are_rejected() {
        let mut book = FontBook::empty();
        assert!(book.add_bytes("Broken", 400, false, vec![0, 1, 2, 3]).is_err());
        assert!(book.is_empty());
    }

    #[test]
    fn test_scan_ignores_non_font_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join("Broken-Bold.ttf"), [0u8; 8]).unwrap();
        let book = FontBook::load_dirs(&[dir.path().to_path_buf()]);
        assert!(book.is_empty());
    }
}
