//! Style presets offered for "after" renderings

use mitsumori_types::RenovationScope;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StylePreset {
    pub id: &'static str,
    /// Display label (Japanese)
    pub label: &'static str,
    pub scope: RenovationScope,
    /// Style description handed to the image model
    pub prompt: &'static str,
}

pub const PRESETS: &[StylePreset] = &[
    StylePreset {
        id: "natural",
        label: "ナチュラル",
        scope: RenovationScope::Interior,
        prompt: "natural style with light oak flooring, white plaster-like walls, linen fabrics and soft daylight",
    },
    StylePreset {
        id: "modern",
        label: "モダン",
        scope: RenovationScope::Interior,
        prompt: "modern monotone style with grey and white surfaces, matte black fixtures and indirect lighting",
    },
    StylePreset {
        id: "japanese-modern",
        label: "和モダン",
        scope: RenovationScope::Interior,
        prompt: "Japanese modern style (和モダン) with tatami or dark wood flooring, shoji-like partitions and earthy tones",
    },
    StylePreset {
        id: "scandinavian",
        label: "北欧",
        scope: RenovationScope::Interior,
        prompt: "Scandinavian style with birch wood, pale blue-grey accent wall and simple functional furniture",
    },
    StylePreset {
        id: "industrial",
        label: "インダストリアル",
        scope: RenovationScope::Interior,
        prompt: "industrial style with exposed concrete texture, black steel details and vintage wood",
    },
    StylePreset {
        id: "modern-siding",
        label: "モダン外壁",
        scope: RenovationScope::Exterior,
        prompt: "modern facade with dark grey metal siding (ガルバリウム), white window frames and clean lines",
    },
    StylePreset {
        id: "japanese-traditional",
        label: "和風外観",
        scope: RenovationScope::Exterior,
        prompt: "traditional Japanese exterior with cedar board siding (焼杉), off-white plaster and dark roof tiles",
    },
    StylePreset {
        id: "south-european",
        label: "南欧風",
        scope: RenovationScope::Exterior,
        prompt: "South-European exterior with warm ivory stucco walls, terracotta roof and wrought-iron accents",
    },
];

pub fn find_preset(id: &str) -> Option<&'static StylePreset> {
    PRESETS.iter().find(|p| p.id == id)
}

pub fn presets_for(scope: RenovationScope) -> impl Iterator<Item = &'static StylePreset> {
    PRESETS.iter().filter(move |p| p.scope == scope)
}
