//! Verse coordinates and navigation over the fixed chapter-length table

use rand::Rng;
use std::fmt;

/// Number of surahs
pub const SURAH_COUNT: u16 = 114;

/// Total number of ayahs across all surahs
pub const TOTAL_AYAHS: usize = 6236;

/// Ayah count of each surah, index 0 is surah 1
pub const SURAH_LENGTHS: [u16; SURAH_COUNT as usize] = [
    7, 286, 200, 176, 120, 165, 206, 75, 129, 109, 123, 111, 43, 52, 99, 128, 111, 110, 98, 135,
    112, 78, 118, 64, 77, 227, 93, 88, 69, 60, 34, 30, 73, 54, 45, 83, 182, 88, 75, 85, 54, 53,
    89, 59, 37, 35, 38, 29, 18, 45, 60, 49, 62, 55, 78, 96, 29, 22, 24, 13, 14, 11, 11, 18, 12,
    12, 30, 52, 52, 44, 28, 28, 20, 56, 40, 31, 50, 40, 46, 42, 29, 19, 36, 25, 22, 17, 19, 26,
    30, 20, 15, 21, 11, 8, 8, 19, 5, 8, 8, 11, 11, 8, 3, 9, 5, 4, 7, 3, 6, 3, 5, 4, 5, 6,
];

/// Length of a surah, `None` outside 1..=114
pub fn surah_length(surah: u16) -> Option<u16> {
    if surah == 0 {
        return None;
    }
    SURAH_LENGTHS.get(usize::from(surah) - 1).copied()
}

/// True iff `surah:ayah` addresses an ayah of the Qur'an
pub fn exists(surah: u32, ayah: u32) -> bool {
    u16::try_from(surah)
        .ok()
        .and_then(surah_length)
        .is_some_and(|len| ayah >= 1 && ayah <= u32::from(len))
}

/// A valid (surah, ayah) coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerseRef {
    pub surah: u16,
    pub ayah: u16,
}

impl VerseRef {
    /// The first ayah of the Qur'an
    pub const FIRST: VerseRef = VerseRef { surah: 1, ayah: 1 };

    /// Build a coordinate, `None` if it does not exist
    pub fn new(surah: u32, ayah: u32) -> Option<Self> {
        if exists(surah, ayah) {
            Some(Self {
                surah: surah as u16,
                ayah: ayah as u16,
            })
        } else {
            None
        }
    }

    /// Next ayah, continuing into the next surah and wrapping 114 → 1
    pub fn next(self) -> Self {
        let length = surah_length(self.surah).unwrap_or(1);
        if self.ayah >= length {
            let surah = if self.surah < SURAH_COUNT { self.surah + 1 } else { 1 };
            Self { surah, ayah: 1 }
        } else {
            Self {
                surah: self.surah,
                ayah: self.ayah + 1,
            }
        }
    }

    /// Previous ayah, continuing into the last ayah of the previous surah
    /// and wrapping 1 → 114
    pub fn previous(self) -> Self {
        if self.ayah <= 1 {
            let surah = if self.surah > 1 { self.surah - 1 } else { SURAH_COUNT };
            Self {
                surah,
                ayah: surah_length(surah).unwrap_or(1),
            }
        } else {
            Self {
                surah: self.surah,
                ayah: self.ayah - 1,
            }
        }
    }

    /// Random ayah: surah uniform over 1..=114, then ayah uniform within it.
    ///
    /// Ayahs of short surahs are therefore more likely than ayahs of long
    /// ones; the distribution is not uniform over all 6236 ayahs.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let surah = rng.gen_range(1..=SURAH_COUNT);
        let length = surah_length(surah).unwrap_or(1);
        let ayah = rng.gen_range(1..=length);
        Self { surah, ayah }
    }
}

impl Default for VerseRef {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.surah, self.ayah)
    }
}
