//! CSS-style color values.
//!
//! Element styles are authored as the strings a designer would type
//! (`#6366f1`, `rgba(255, 255, 255, 0.8)`, `hsl(200, 80%, 60%)`), parsed once
//! into straight (non-premultiplied) RGBA.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Straight-alpha RGBA color. Channels are 0-255, alpha is 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{input}': {reason}")]
pub struct ColorParseError {
    pub input: String,
    pub reason: String,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from hue (degrees), saturation and lightness (0.0-1.0).
    pub fn hsl(h: f64, s: f64, l: f64) -> Self {
        Self::hsla(h, s, l, 1.0)
    }

    pub fn hsla(h: f64, s: f64, l: f64, a: f32) -> Self {
        let h = h.rem_euclid(360.0) / 360.0;
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            let v = channel(l);
            return Self::rgba(v, v, v, a);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self::rgba(
            channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            channel(hue_to_rgb(p, q, h)),
            channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
            a,
        )
    }

    /// Brighten every channel by `round(2.55 × percent)`, saturating.
    pub fn lighten(self, percent: f64) -> Self {
        let amount = (2.55 * percent).round() as i32;
        let shift = |c: u8| (c as i32 + amount).clamp(0, 255) as u8;
        Self {
            r: shift(self.r),
            g: shift(self.g),
            b: shift(self.b),
            a: self.a,
        }
    }

    /// Linear interpolation in straight RGBA.
    pub fn mix(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// 8-bit RGBA, alpha rounded.
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, (self.a.clamp(0.0, 1.0) * 255.0).round() as u8]
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = |reason: &str| ColorParseError {
            input: input.to_string(),
            reason: reason.to_string(),
        };
        let s = input.trim().to_ascii_lowercase();

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| err("expected #rgb, #rrggbb or #rrggbbaa"));
        }

        match s.as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            "transparent" => return Ok(Self::TRANSPARENT),
            _ => {}
        }

        let (func, args) = s
            .split_once('(')
            .and_then(|(f, rest)| rest.strip_suffix(')').map(|a| (f.trim(), a)))
            .ok_or_else(|| err("unrecognized color syntax"))?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();

        match (func, parts.len()) {
            ("rgb", 3) | ("rgba", 4) => {
                let c = |i: usize| -> Result<u8, ColorParseError> {
                    parts[i]
                        .parse::<f64>()
                        .map(|v| v.round().clamp(0.0, 255.0) as u8)
                        .map_err(|_| err("channel is not a number"))
                };
                let a = if parts.len() == 4 {
                    parse_alpha(parts[3]).ok_or_else(|| err("alpha is not a number"))?
                } else {
                    1.0
                };
                Ok(Self::rgba(c(0)?, c(1)?, c(2)?, a))
            }
            ("hsl", 3) | ("hsla", 4) => {
                let h = parts[0]
                    .trim_end_matches("deg")
                    .parse::<f64>()
                    .map_err(|_| err("hue is not a number"))?;
                let s = parse_percent(parts[1]).ok_or_else(|| err("saturation is not a percentage"))?;
                let l = parse_percent(parts[2]).ok_or_else(|| err("lightness is not a percentage"))?;
                let a = if parts.len() == 4 {
                    parse_alpha(parts[3]).ok_or_else(|| err("alpha is not a number"))?
                } else {
                    1.0
                };
                Ok(Self::hsla(h, s, l, a))
            }
            _ => Err(err("unsupported color function")),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)? as f32 / 255.0)),
        _ => None,
    }
}

fn parse_percent(s: &str) -> Option<f64> {
    s.strip_suffix('%')?.trim().parse::<f64>().ok().map(|v| v / 100.0)
}

fn parse_alpha(s: &str) -> Option<f32> {
    match s.strip_suffix('%') {
        Some(p) => p.trim().parse::<f32>().ok().map(|v| (v / 100.0).clamp(0.0, 1.0)),
        None => s.parse::<f32>().ok().map(|v| v.clamp(0.0, 1.0)),
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            // two decimals is enough to round-trip the authored values
            let a = (self.a * 100.0).round() / 100.0;
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
