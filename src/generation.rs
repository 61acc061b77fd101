use serde::{Deserialize, Serialize};

/// Inclusive id window used to scope a view to one generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeScope {
    pub start: u32,
    pub end: u32,
}

impl RangeScope {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, id: u32) -> bool {
        id >= self.start && id <= self.end
    }

    /// Number of ids in the window. An inverted window is empty.
    pub fn size(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Generation {
    pub number: u8,
    pub numeral: &'static str,
    pub region: &'static str,
    pub start: u32,
    pub end: u32,
    pub blurb: &'static str,
}

impl Generation {
    pub fn scope(&self) -> RangeScope {
        RangeScope::new(self.start, self.end)
    }

    pub fn title(&self) -> String {
        format!("Generation {} - {}", self.numeral, self.region)
    }
}

pub const GENERATIONS: [Generation; 8] = [
    Generation {
        number: 1,
        numeral: "I",
        region: "Kanto",
        start: 1,
        end: 151,
        blurb: "The original 150 Pokemon that started it all",
    },
    Generation {
        number: 2,
        numeral: "II",
        region: "Johto",
        start: 152,
        end: 251,
        blurb: "Gold, Silver & Crystal introduced 100 new Pokemon",
    },
    Generation {
        number: 3,
        numeral: "III",
        region: "Hoenn",
        start: 252,
        end: 386,
        blurb: "Ruby, Sapphire & Emerald with abilities system",
    },
    Generation {
        number: 4,
        numeral: "IV",
        region: "Sinnoh",
        start: 387,
        end: 493,
        blurb: "Diamond, Pearl & Platinum with physical/special split",
    },
    Generation {
        number: 5,
        numeral: "V",
        region: "Unova",
        start: 494,
        end: 649,
        blurb: "Black & White with only new Pokemon until postgame",
    },
    Generation {
        number: 6,
        numeral: "VI",
        region: "Kalos",
        start: 650,
        end: 721,
        blurb: "X & Y introduced 3D graphics and Fairy type",
    },
    Generation {
        number: 7,
        numeral: "VII",
        region: "Alola",
        start: 722,
        end: 809,
        blurb: "Sun & Moon with Z-Moves and regional variants",
    },
    Generation {
        number: 8,
        numeral: "VIII",
        region: "Galar",
        start: 810,
        end: 905,
        blurb: "Sword & Shield with Dynamax and Wild Area",
    },
];

pub fn generation(number: u8) -> Option<&'static Generation> {
    GENERATIONS.iter().find(|gen| gen.number == number)
}
