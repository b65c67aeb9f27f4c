use serde::Deserialize;
use std::fmt;

/// The fixed sport table of the Endomondo export. Activity records carry an
/// index into this table, not a name.
const SPORT_NAMES: [&str; 51] = [
    "RUNNING",
    "CYCLING_TRANSPORT",
    "CYCLING_SPORT",
    "MOUNTAIN_BIKING",
    "SKATING",
    "ROLLER_SKIING",
    "SKIING_CROSS_COUNTRY",
    "SKIING_DOWNHILL",
    "SNOWBOARDING",
    "KAYAKING",
    "KITE_SURFING",
    "ROWING",
    "SAILING",
    "WINDSURFING",
    "FITNESS_WALKING",
    "GOLFING",
    "HIKING",
    "ORIENTEERING",
    "WALKING",
    "RIDING",
    "SWIMMING",
    "SPINNING",
    "OTHER",
    "AEROBICS",
    "BADMINTON",
    "BASEBALL",
    "BASKETBALL",
    "BOXING",
    "CLIMBING_STAIRS",
    "CRICKET",
    "CROSS_TRAINING",
    "DANCING",
    "FENCING",
    "FOOTBALL_AMERICAN",
    "FOOTBALL_RUGBY",
    "FOOTBALL_SOCCER",
    "HANDBALL",
    "HOCKEY",
    "PILATES",
    "POLO",
    "SCUBA_DIVING",
    "SQUASH",
    "TABLE_TENNIS",
    "TENNIS",
    "VOLLEYBALL_BEACH",
    "VOLLEYBALL_INDOOR",
    "WEIGHT_TRAINING",
    "YOGA",
    "MARTIAL_ARTS",
    "GYMNASTICS",
    "STEP_COUNTER",
];

/// Sport index as stored in the export files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Sport(pub u32);

impl Sport {
    /// Raw table key, e.g. `MOUNTAIN_BIKING`. Out-of-range indexes map to
    /// `OTHER`.
    pub fn key(self) -> &'static str {
        SPORT_NAMES
            .get(self.0 as usize)
            .copied()
            .unwrap_or("OTHER")
    }

    /// Display name: underscores become spaces, first letter upper, the
    /// rest lower. `MOUNTAIN_BIKING` renders as "Mountain biking".
    pub fn label(self) -> String {
        let name = self.key().replace('_', " ");
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => {
                let mut out: String = first.to_uppercase().collect();
                out.push_str(&chars.as_str().to_lowercase());
                out
            }
            None => name,
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
