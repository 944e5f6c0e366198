//! EH: water efficiency
//!
//! Rewards layouts that use most of the weekly water allowance without
//! crossing it. The sweet spot is 80–95 % utilization; the score falls off
//! linearly below, decays toward the cap above 95 %, and is punished at
//! double rate once the allowance is exceeded.

pub fn calculate_eh(total_weekly_water: f64, max_water_weekly: f64) -> f64 {
    if max_water_weekly == 0.0 {
        return 1.0;
    }

    let u = total_weekly_water / max_water_weekly;

    let score = if u > 1.0 {
        (1.0 - (u - 1.0) * 2.0).max(0.0)
    } else if u > 0.95 {
        1.0 - (u - 0.95) * 2.0
    } else if u >= 0.80 {
        1.0
    } else {
        u / 0.80
    };

    score.clamp(0.0, 1.0)
}
