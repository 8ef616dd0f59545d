//! Experience curve and the stat scaling applied before units are built.

/// Level reached with `xp` experience when the first level costs `scale` points
/// and every further level costs half again as much as the one before.
pub fn level_from_xp(mut xp: u64, mut scale: u64) -> u32 {
    let mut level = 0;

    if scale == 0 {
        return level;
    }

    while xp > scale {
        level += 1;
        xp -= scale;
        scale += scale / 2;
    }

    level
}

/// `base` grown by 2% of itself per level, truncating.
pub fn scaled_stat(base: i32, level: u32) -> i32 {
    let level = i32::try_from(level).unwrap_or(i32::MAX);
    base.saturating_add(base.saturating_mul(2).saturating_mul(level) / 100)
}
