use crate::run::CpuSeconds;

const RULE: &str = "============================================================";

/// The integral alone, two decimals.
pub fn terse(result: &CpuSeconds) -> String {
    format!("{:.2}", result.integral)
}

/// Framed multi-line report with the sample statistics behind the integral.
pub fn verbose(result: &CpuSeconds) -> String {
    let s = &result.summary;
    let unit = &result.unit;
    let area_unit = if unit.is_empty() {
        "s".to_string()
    } else {
        format!("{}-s", unit)
    };

    [
        String::new(),
        RULE.to_string(),
        "CPU-Seconds Calculation Results".to_string(),
        RULE.to_string(),
        format!("Results directory: {}", result.dir.display()),
        format!("Metric: {}", result.metric),
        format!("Data points: {}", s.samples),
        format!("Time range: {:.2}s to {:.2}s", s.first, s.last),
        format!("Duration: {:.2}s", s.duration),
        format!("Average: {:.2}{}", s.mean, unit),
        format!("Max: {:.2}{}", s.max, unit),
        format!("Min: {:.2}{}", s.min, unit),
        String::new(),
        format!(
            "CPU-seconds (area under curve): {:.2} {}",
            result.integral, area_unit
        ),
        RULE.to_string(),
    ]
    .join("\n")
}
