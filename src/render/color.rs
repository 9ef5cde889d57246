//! Color Module
//! Named color schemes and categorical/sequential color scales.

use palette::{Mix, Srgb};

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb`, `#rgb` or one of a few CSS names.
    pub fn parse(s: &str) -> Option<Rgb> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<Vec<u8>>>()?;
            return match digits.len() {
                6 => Some(Rgb(
                    digits[0] * 16 + digits[1],
                    digits[2] * 16 + digits[3],
                    digits[4] * 16 + digits[5],
                )),
                3 => Some(Rgb(digits[0] * 17, digits[1] * 17, digits[2] * 17)),
                _ => None,
            };
        }
        match s.to_ascii_lowercase().as_str() {
            "black" => Some(Rgb(0, 0, 0)),
            "white" => Some(Rgb(255, 255, 255)),
            "gray" | "grey" => Some(Rgb(128, 128, 128)),
            "red" => Some(Rgb(255, 0, 0)),
            "green" => Some(Rgb(0, 128, 0)),
            "blue" => Some(Rgb(0, 0, 255)),
            "orange" => Some(Rgb(255, 165, 0)),
            "steelblue" => Some(Rgb(70, 130, 180)),
            "firebrick" => Some(Rgb(178, 34, 34)),
            "teal" => Some(Rgb(0, 128, 128)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn mix(self, other: Rgb, t: f64) -> Rgb {
        let a: Srgb<f32> = Srgb::new(self.0, self.1, self.2).into_format();
        let b: Srgb<f32> = Srgb::new(other.0, other.1, other.2).into_format();
        let c: Srgb<u8> = a.mix(b, t.clamp(0.0, 1.0) as f32).into_format();
        Rgb(c.red, c.green, c.blue)
    }
}

/// Default fill of marks without a color encoding.
pub const DEFAULT_MARK_COLOR: Rgb = Rgb(0x4c, 0x78, 0xa8);

const TABLEAU10: [Rgb; 10] = [
    Rgb(0x4c, 0x78, 0xa8),
    Rgb(0xf5, 0x85, 0x18),
    Rgb(0xe4, 0x57, 0x56),
    Rgb(0x72, 0xb7, 0xb2),
    Rgb(0x54, 0xa2, 0x4b),
    Rgb(0xee, 0xca, 0x3b),
    Rgb(0xb2, 0x79, 0xa2),
    Rgb(0xff, 0x9d, 0xa6),
    Rgb(0x9d, 0x75, 0x5d),
    Rgb(0xba, 0xb0, 0xac),
];

const CATEGORY10: [Rgb; 10] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xe3, 0x77, 0xc2),
    Rgb(0x7f, 0x7f, 0x7f),
    Rgb(0xbc, 0xbd, 0x22),
    Rgb(0x17, 0xbe, 0xcf),
];

const BLUES: [Rgb; 8] = [
    Rgb(0xde, 0xeb, 0xf7),
    Rgb(0xc6, 0xdb, 0xef),
    Rgb(0x9e, 0xca, 0xe1),
    Rgb(0x6b, 0xae, 0xd6),
    Rgb(0x42, 0x92, 0xc6),
    Rgb(0x21, 0x71, 0xb5),
    Rgb(0x08, 0x51, 0x9c),
    Rgb(0x08, 0x30, 0x6b),
];

const GREENS: [Rgb; 8] = [
    Rgb(0xe5, 0xf5, 0xe0),
    Rgb(0xc7, 0xe9, 0xc0),
    Rgb(0xa1, 0xd9, 0x9b),
    Rgb(0x74, 0xc4, 0x76),
    Rgb(0x41, 0xab, 0x5d),
    Rgb(0x23, 0x8b, 0x45),
    Rgb(0x00, 0x6d, 0x2c),
    Rgb(0x00, 0x44, 0x1b),
];

const VIRIDIS: [Rgb; 10] = [
    Rgb(0x44, 0x01, 0x54),
    Rgb(0x48, 0x28, 0x78),
    Rgb(0x3e, 0x49, 0x89),
    Rgb(0x31, 0x68, 0x8e),
    Rgb(0x26, 0x82, 0x8e),
    Rgb(0x1f, 0x9e, 0x89),
    Rgb(0x35, 0xb7, 0x79),
    Rgb(0x6e, 0xce, 0x58),
    Rgb(0xb5, 0xde, 0x2b),
    Rgb(0xfd, 0xe7, 0x25),
];

const MAGMA: [Rgb; 10] = [
    Rgb(0x00, 0x00, 0x04),
    Rgb(0x18, 0x0f, 0x3d),
    Rgb(0x44, 0x0f, 0x76),
    Rgb(0x72, 0x1f, 0x81),
    Rgb(0x9e, 0x2f, 0x7f),
    Rgb(0xcd, 0x40, 0x71),
    Rgb(0xf1, 0x60, 0x5d),
    Rgb(0xfd, 0x96, 0x68),
    Rgb(0xfe, 0xca, 0x8d),
    Rgb(0xfc, 0xfd, 0xbf),
];

const SPECTRAL: [Rgb; 11] = [
    Rgb(0x9e, 0x01, 0x42),
    Rgb(0xd5, 0x3e, 0x4f),
    Rgb(0xf4, 0x6d, 0x43),
    Rgb(0xfd, 0xae, 0x61),
    Rgb(0xfe, 0xe0, 0x8b),
    Rgb(0xff, 0xff, 0xbf),
    Rgb(0xe6, 0xf5, 0x98),
    Rgb(0xab, 0xdd, 0xa4),
    Rgb(0x66, 0xc2, 0xa5),
    Rgb(0x32, 0x88, 0xbd),
    Rgb(0x5e, 0x4f, 0xa2),
];

/// A named palette. Categorical schemes cycle, the others interpolate.
#[derive(Debug)]
pub struct Scheme {
    pub name: &'static str,
    stops: &'static [Rgb],
    categorical: bool,
}

static SCHEMES: [Scheme; 7] = [
    Scheme { name: "tableau10", stops: &TABLEAU10, categorical: true },
    Scheme { name: "category10", stops: &CATEGORY10, categorical: true },
    Scheme { name: "blues", stops: &BLUES, categorical: false },
    Scheme { name: "greens", stops: &GREENS, categorical: false },
    Scheme { name: "viridis", stops: &VIRIDIS, categorical: false },
    Scheme { name: "magma", stops: &MAGMA, categorical: false },
    Scheme { name: "spectral", stops: &SPECTRAL, categorical: false },
];

/// Case-insensitive lookup.
pub fn lookup_scheme(name: &str) -> Option<&'static Scheme> {
    let name = name.to_ascii_lowercase();
    SCHEMES.iter().find(|s| s.name == name)
}

impl Scheme {
    /// Color at `t` in [0, 1].
    pub fn interpolate(&self, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let last = self.stops.len() - 1;
        let pos = t * last as f64;
        let lower = pos.floor() as usize;
        if lower >= last {
            return self.stops[last];
        }
        self.stops[lower].mix(self.stops[lower + 1], pos - lower as f64)
    }

    /// `n` colors for a discrete domain.
    pub fn sample(&self, n: usize) -> Vec<Rgb> {
        if self.categorical {
            return (0..n).map(|i| self.stops[i % self.stops.len()]).collect();
        }
        match n {
            0 => Vec::new(),
            1 => vec![self.interpolate(0.5)],
            _ => (0..n)
                .map(|i| self.interpolate(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }

    pub fn is_categorical(&self) -> bool {
        self.categorical
    }
}

/// Maps encoded values to colors.
#[derive(Debug, Clone)]
pub enum ColorScale {
    Categorical { domain: Vec<String>, colors: Vec<Rgb> },
    Sequential { min: f64, max: f64, scheme: &'static Scheme },
}

impl ColorScale {
    pub fn categorical(domain: Vec<String>, scheme: &'static Scheme) -> Self {
        let colors = scheme.sample(domain.len());
        ColorScale::Categorical { domain, colors }
    }

    pub fn sequential(min: f64, max: f64, scheme: &'static Scheme) -> Self {
        ColorScale::Sequential { min, max, scheme }
    }

    pub fn map_key(&self, key: &str) -> Option<Rgb> {
        match self {
            ColorScale::Categorical { domain, colors } => {
                domain.iter().position(|d| d == key).map(|i| colors[i])
            }
            ColorScale::Sequential { .. } => None,
        }
    }

    pub fn map_number(&self, v: f64) -> Option<Rgb> {
        match self {
            ColorScale::Sequential { min, max, scheme } => {
                let t = if max > min { (v - min) / (max - min) } else { 0.5 };
                Some(scheme.interpolate(t))
            }
            ColorScale::Categorical { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_names() {
        assert_eq!(Rgb::parse("#4c78a8"), Some(DEFAULT_MARK_COLOR));
        assert_eq!(Rgb::parse("#fff"), Some(Rgb(255, 255, 255)));
        assert_eq!(Rgb::parse("SteelBlue"), Some(Rgb(70, 130, 180)));
        assert_eq!(Rgb::parse("#12"), None);
        assert_eq!(Rgb::parse("not-a-color"), None);
        assert_eq!(Rgb(1, 2, 255).to_hex(), "#0102ff");
    }

    #[test]
    fn test_scheme_lookup_ignores_case() {
        assert_eq!(lookup_scheme("Magma").map(|s| s.name), Some("magma"));
        assert!(lookup_scheme("spectral").is_some());
        assert!(lookup_scheme("nope").is_none());
    }

    #[test]
    fn test_interpolate_hits_endpoints() {
        let magma = lookup_scheme("magma").unwrap();
        assert_eq!(magma.interpolate(0.0), MAGMA[0]);
        assert_eq!(magma.interpolate(1.0), MAGMA[9]);
    }

    #[test]
    fn test_categorical_sampling_cycles() {
        let tableau = lookup_scheme("tableau10").unwrap();
        let colors = tableau.sample(12);
        assert_eq!(colors[0], colors[10]);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn test_sequential_scale_maps_range() {
        let scale = ColorScale::sequential(1.0, 157.0, lookup_scheme("magma").unwrap());
        assert_eq!(scale.map_number(1.0), Some(MAGMA[0]));
        assert_eq!(scale.map_number(157.0), Some(MAGMA[9]));
        assert_eq!(scale.map_key("x"), None);
    }
}
