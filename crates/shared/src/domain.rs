use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Acid/base nature of a solution. Serialized with the classroom labels used in
/// the submission file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    #[serde(rename = "산성")]
    Acidic,
    #[serde(rename = "염기성")]
    Basic,
}

impl Property {
    pub const ALL: [Property; 2] = [Property::Acidic, Property::Basic];

    pub fn label(self) -> &'static str {
        match self {
            Property::Acidic => "산성",
            Property::Basic => "염기성",
        }
    }

    /// Stable key used in HTML forms.
    pub fn key(self) -> &'static str {
        match self {
            Property::Acidic => "acidic",
            Property::Basic => "basic",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == raw.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    #[serde(rename = "리트머스 종이")]
    LitmusPaper,
    #[serde(rename = "페놀프탈레인 용액")]
    Phenolphthalein,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 2] =
        [IndicatorKind::LitmusPaper, IndicatorKind::Phenolphthalein];

    pub fn label(self) -> &'static str {
        match self {
            IndicatorKind::LitmusPaper => "리트머스 종이",
            IndicatorKind::Phenolphthalein => "페놀프탈레인 용액",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            IndicatorKind::LitmusPaper => "litmus_paper",
            IndicatorKind::Phenolphthalein => "phenolphthalein",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.key() == raw.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionEntry {
    pub name: String,
    pub property: Property,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentSelection {
    pub solution: SolutionEntry,
    pub indicator: IndicatorKind,
}

impl ExperimentSelection {
    pub fn outcome(&self) -> Outcome {
        Outcome::observe(self.indicator, self.solution.property)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Ready,
    Result,
    Done,
}

/// What the learner sees after dipping an indicator into a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    LitmusTurnedRed,
    LitmusTurnedBlue,
    PhenolphthaleinColorless,
    PhenolphthaleinPink,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::LitmusTurnedRed,
        Outcome::LitmusTurnedBlue,
        Outcome::PhenolphthaleinColorless,
        Outcome::PhenolphthaleinPink,
    ];

    pub fn observe(indicator: IndicatorKind, property: Property) -> Self {
        match (indicator, property) {
            (IndicatorKind::LitmusPaper, Property::Acidic) => Outcome::LitmusTurnedRed,
            (IndicatorKind::LitmusPaper, Property::Basic) => Outcome::LitmusTurnedBlue,
            (IndicatorKind::Phenolphthalein, Property::Acidic) => {
                Outcome::PhenolphthaleinColorless
            }
            (IndicatorKind::Phenolphthalein, Property::Basic) => Outcome::PhenolphthaleinPink,
        }
    }

    pub fn asset_file(self) -> &'static str {
        match self {
            Outcome::LitmusTurnedRed => "litmus_red.png",
            Outcome::LitmusTurnedBlue => "litmus_blue.png",
            Outcome::PhenolphthaleinColorless => "phenol_colorless.png",
            Outcome::PhenolphthaleinPink => "phenol_red.png",
        }
    }

    pub fn from_asset_file(file: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.asset_file() == file)
    }

    pub fn caption(self) -> &'static str {
        match self {
            Outcome::LitmusTurnedRed => "푸른색 리트머스 종이가 붉게 변했습니다.",
            Outcome::LitmusTurnedBlue => "붉은색 리트머스 종이가 푸르게 변했습니다.",
            Outcome::PhenolphthaleinColorless => "페놀프탈레인 용액의 색이 변하지 않았습니다.",
            Outcome::PhenolphthaleinPink => "페놀프탈레인 용액이 붉은색으로 변했습니다.",
        }
    }

    /// Placeholder swatch color, RGB.
    pub fn swatch(self) -> [u8; 3] {
        match self {
            Outcome::LitmusTurnedRed => [0xFF, 0x57, 0x33],
            Outcome::LitmusTurnedBlue => [0x33, 0x5B, 0xFF],
            Outcome::PhenolphthaleinColorless => [0xE0, 0xE0, 0xE0],
            Outcome::PhenolphthaleinPink => [0xFF, 0x33, 0xA1],
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
