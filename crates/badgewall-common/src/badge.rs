//! Badge catalogue — the course passes shown on the wall.
//!
//! Each badge is a token id on the pass contract. Holding a positive balance
//! of that id means the course was completed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Intro,
    Advanced,
}

impl Badge {
    pub const ALL: [Badge; 2] = [Badge::Intro, Badge::Advanced];

    /// Token id queried with `balanceOf(owner, id)`.
    pub fn token_id(self) -> u64 {
        match self {
            Self::Intro => 0,
            Self::Advanced => 1,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Intro => "WTF Solidity Intro Pass (Test)",
            Self::Advanced => "WTF Solidity Advanced Pass (Test)",
        }
    }

    pub fn image_url(self) -> &'static str {
        match self {
            Self::Intro => {
                "https://gateway.ipfs.io/ipfs/QmaVBkNVSVMtXriFZG4YfwP5q8WaWeJNWxFywFK3YVAYvR"
            }
            Self::Advanced => {
                "https://gateway.ipfs.io/ipfs/QmeVLGY4oTnj2VMmkSXtKucjTaN6i5dXGaRBpf6WzRmDHW"
            }
        }
    }
}
