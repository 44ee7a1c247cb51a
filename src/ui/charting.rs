use std::time::Duration;

/// X (seconds) and Y (wpm) bounds for the results chart. Without points the
/// x axis spans the configured session length.
pub fn compute_chart_params(wpm_coords: &[(f64, f64)], duration: Duration) -> (f64, f64) {
    let highest_wpm = wpm_coords
        .iter()
        .map(|&(_, wpm)| wpm)
        .fold(0.0, f64::max);

    let overall_duration = wpm_coords
        .last()
        .map_or(duration.as_secs_f64(), |&(t, _)| t)
        .max(1.0);

    (overall_duration, highest_wpm.round())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
