//! Hue buckets and evocative palette names.
//!
//! A synthesized palette is named after the hue family of one representative
//! color. Within a family the lightness tier (and, for mid tones, saturation)
//! narrows the candidate list; the first candidate the caller reports as free
//! wins.

use crate::hsl::Hsl;

/// Saturation below which a color is treated as achromatic.
pub const ACHROMATIC_SATURATION: f64 = 0.1;
pub const LIGHT_TIER_MIN: f64 = 0.65;
pub const DARK_TIER_MAX: f64 = 0.35;
pub const MUTED_SATURATION_MAX: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HueFamily {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightnessTier {
    Light,
    Vivid,
    Muted,
    Dark,
}

impl HueFamily {
    pub fn from_hsl(hsl: &Hsl) -> Self {
        if hsl.s < ACHROMATIC_SATURATION {
            return HueFamily::Neutral;
        }
        match hsl.h {
            h if !(15.0..345.0).contains(&h) => HueFamily::Red,
            h if h < 45.0 => HueFamily::Orange,
            h if h < 70.0 => HueFamily::Yellow,
            h if h < 165.0 => HueFamily::Green,
            h if h < 200.0 => HueFamily::Cyan,
            h if h < 255.0 => HueFamily::Blue,
            _ => HueFamily::Purple,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HueFamily::Red => "red",
            HueFamily::Orange => "orange",
            HueFamily::Yellow => "yellow",
            HueFamily::Green => "green",
            HueFamily::Cyan => "cyan",
            HueFamily::Blue => "blue",
            HueFamily::Purple => "purple",
            HueFamily::Neutral => "neutral",
        }
    }

    /// Candidate names for this family at the given tier, most preferred first.
    pub fn candidates(self, tier: LightnessTier) -> &'static [&'static str] {
        use LightnessTier::*;
        match (self, tier) {
            (HueFamily::Red, Light) => &["coral", "peach", "rose"],
            (HueFamily::Red, Dark) => &["ruby", "garnet", "maroon"],
            (HueFamily::Red, Muted) => &["brick", "clay", "terracotta"],
            (HueFamily::Red, Vivid) => &["red", "crimson", "scarlet"],
            (HueFamily::Orange, Light) => &["amber", "apricot", "sand"],
            (HueFamily::Orange, Dark) => &["rust", "copper", "brown"],
            (HueFamily::Orange, Muted) => &["tan", "bronze", "caramel"],
            (HueFamily::Orange, Vivid) => &["orange", "tangerine", "pumpkin"],
            (HueFamily::Yellow, Light) => &["lemon", "butter", "cream"],
            (HueFamily::Yellow, Dark) => &["olive", "ochre", "mustard"],
            (HueFamily::Yellow, Muted) => &["khaki", "wheat", "straw"],
            (HueFamily::Yellow, Vivid) => &["yellow", "gold", "sunflower"],
            (HueFamily::Green, Light) => &["mint", "pistachio", "celery"],
            (HueFamily::Green, Dark) => &["forest", "pine", "emerald"],
            (HueFamily::Green, Muted) => &["sage", "moss", "fern"],
            (HueFamily::Green, Vivid) => &["green", "lime", "jade"],
            (HueFamily::Cyan, Light) => &["aqua", "seafoam", "ice"],
            (HueFamily::Cyan, Dark) => &["teal", "petrol", "lagoon"],
            (HueFamily::Cyan, Muted) => &["spruce", "harbor", "eucalyptus"],
            (HueFamily::Cyan, Vivid) => &["cyan", "turquoise", "cerulean"],
            (HueFamily::Blue, Light) => &["sky", "azure", "powder"],
            (HueFamily::Blue, Dark) => &["navy", "indigo", "midnight"],
            (HueFamily::Blue, Muted) => &["denim", "steel", "dusk"],
            (HueFamily::Blue, Vivid) => &["blue", "cobalt", "sapphire"],
            (HueFamily::Purple, Light) => &["lavender", "lilac", "orchid"],
            (HueFamily::Purple, Dark) => &["plum", "eggplant", "aubergine"],
            (HueFamily::Purple, Muted) => &["mauve", "heather", "thistle"],
            (HueFamily::Purple, Vivid) => &["purple", "violet", "magenta"],
            (HueFamily::Neutral, Light) => &["silver", "mist", "cloud"],
            (HueFamily::Neutral, Dark) => &["charcoal", "graphite", "onyx"],
            (HueFamily::Neutral, Muted | Vivid) => &["gray", "slate", "stone"],
        }
    }
}

impl LightnessTier {
    pub fn from_hsl(hsl: &Hsl) -> Self {
        if hsl.l >= LIGHT_TIER_MIN {
            LightnessTier::Light
        } else if hsl.l < DARK_TIER_MAX {
            LightnessTier::Dark
        } else if hsl.s < MUTED_SATURATION_MAX {
            LightnessTier::Muted
        } else {
            LightnessTier::Vivid
        }
    }
}

/// The outcome of naming a new palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyName {
    pub name: String,
    pub family: HueFamily,
    /// Every candidate was already taken; `name` is the first candidate.
    pub exhausted: bool,
}

/// Pick a family name for `hsl`, skipping names `is_taken` rejects.
pub fn family_name(hsl: &Hsl, is_taken: impl Fn(&str) -> bool) -> FamilyName {
    let family = HueFamily::from_hsl(hsl);
    let candidates = family.candidates(LightnessTier::from_hsl(hsl));
    match candidates.iter().find(|name| !is_taken(name)) {
        Some(name) => FamilyName {
            name: (*name).to_string(),
            family,
            exhausted: false,
        },
        None => FamilyName {
            name: candidates[0].to_string(),
            family,
            exhausted: true,
        },
    }
}
