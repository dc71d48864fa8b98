//! 段位与等级推导
//!
//! 段位、等级和等级内经验都是 `total_xp` 的纯函数，不做持久化。

use serde::Serialize;

/// 每级所需经验
pub const XP_PER_LEVEL: u32 = 100;

/// 段位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RankTier {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

/// 段位门槛，按从高到低排列
const THRESHOLDS: [(u32, RankTier); 6] = [
    (8000, RankTier::C2),
    (5000, RankTier::C1),
    (2500, RankTier::B2),
    (1000, RankTier::B1),
    (300, RankTier::A2),
    (0, RankTier::A1),
];

impl RankTier {
    pub const fn name(self) -> &'static str {
        match self {
            RankTier::C2 => "Sang Penakluk Kamus",
            RankTier::C1 => "Kaisar Oxford",
            RankTier::B2 => "Panglima Bahasa",
            RankTier::B1 => "Pangeran Kosakata",
            RankTier::A2 => "Perintis Makna",
            RankTier::A1 => "Pengembara Kata",
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            RankTier::C2 => "C2",
            RankTier::C1 => "C1",
            RankTier::B2 => "B2",
            RankTier::B1 => "B1",
            RankTier::A2 => "A2",
            RankTier::A1 => "A1",
        }
    }
}

/// 根据累计经验计算段位
pub fn rank(xp: u32) -> RankTier {
    THRESHOLDS
        .iter()
        .find(|(min, _)| xp >= *min)
        .map(|(_, tier)| *tier)
        .unwrap_or(RankTier::A1)
}

/// 等级：`floor(xp / 100) + 1`
pub fn level(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// 当前等级内的经验，同时用作 0-100 的进度条百分比
pub fn xp_within_level(xp: u32) -> u32 {
    xp % XP_PER_LEVEL
}
