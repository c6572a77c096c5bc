use crate::error::MetricsError;
use crate::layout::RunLayout;
use crate::model::AlignedTable;
use serde::Serialize;
use std::path::Path;

// matplotlib's tab10, in the order metrics appear in the layout.
const PALETTE: [&str; 10] = [
    "#d62728", "#9467bd", "#2ca02c", "#ff7f0e", "#1f77b4", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, Serialize)]
pub struct LineView {
    pub label: String,
    pub color: String,
    /// (x, y) pairs; rows where the metric has no reading are left out.
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub title: String,
    pub unit: String,
    pub lines: Vec<LineView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub run: String,
    pub x_label: String,
    pub panels: Vec<PanelView>,
}

/// One panel per layout panel, one line per metric, all sharing the table's x axis.
pub fn build_chart_data(
    run_dir: &Path,
    table: &AlignedTable,
    layout: &RunLayout,
) -> Result<ChartData, MetricsError> {
    let x: Vec<f64> = table.keys().iter().map(|k| k.as_f64()).collect();

    let mut panels = Vec::new();
    let mut color_ix = 0usize;
    for (title, metrics) in layout.panels() {
        let mut lines = Vec::with_capacity(metrics.len());
        for m in &metrics {
            let column = table
                .column(&m.name)
                .ok_or_else(|| MetricsError::UnknownColumn {
                    name: m.name.clone(),
                })?;
            let points = x
                .iter()
                .zip(column)
                .filter_map(|(x, y)| y.map(|y| [*x, y]))
                .collect();
            lines.push(LineView {
                label: m.name.clone(),
                color: PALETTE[color_ix % PALETTE.len()].to_string(),
                points,
            });
            color_ix += 1;
        }
        panels.push(PanelView {
            title: title.to_string(),
            unit: metrics.first().map(|m| m.unit.clone()).unwrap_or_default(),
            lines,
        });
    }

    Ok(ChartData {
        run: run_dir.display().to_string(),
        x_label: "Time (seconds)".to_string(),
        panels,
    })
}

/// Render a self-contained HTML chart page (data embedded as JSON).
///
/// Important: we avoid `format!()` because the page contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(data: &ChartData) -> anyhow::Result<String> {
    // "</" would end the script element early.
    let json = serde_json::to_string(data)?.replace("</", "<\\/");

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Resource Usage</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .main { padding: 12px 16px; }
  .panel { margin-bottom: 18px; }
  .panel h3 { margin: 4px 0; font-size: 16px; }
  .legend { font-size: 13px; color: #555; display: flex; gap: 12px; }
  .swatch { display: inline-block; width: 12px; height: 3px; vertical-align: middle; margin-right: 4px; }
  svg text { font-size: 11px; fill: #555; font-variant-numeric: tabular-nums; }
  .grid { stroke: #000; stroke-opacity: 0.08; }
  .axis { stroke: #999; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>
<div class="main" id="panels"></div>

<script>
// Embedded chart data (JSON object literal)
const DATA = __DATA__;

const W = 1100, H = 220;
const M = { left: 70, right: 16, top: 10, bottom: 28 };

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function fmt(x) {
  const a = Math.abs(x);
  if (a >= 1e6 || (a > 0 && a < 1e-2)) return x.toExponential(2);
  return (Math.round(x * 100) / 100).toString();
}

function extent(values) {
  let lo = Infinity, hi = -Infinity;
  for (const v of values) { if (v < lo) lo = v; if (v > hi) hi = v; }
  if (lo === Infinity) return [0, 1];
  if (lo === hi) return [lo - 1, hi + 1];
  return [lo, hi];
}

// Shared x range across panels.
const X = extent(DATA.panels.flatMap(p => p.lines.flatMap(l => l.points.map(pt => pt[0]))));

function renderSummary() {
  const samples = DATA.panels.reduce((n, p) => n + p.lines.reduce((m, l) => m + l.points.length, 0), 0);
  document.getElementById("summary").innerHTML = `
    <span class="pill">run: <b>${escapeHtml(DATA.run)}</b></span>
    <span class="pill">panels: <b>${DATA.panels.length}</b></span>
    <span class="pill">samples: <b>${samples}</b></span>
    <span class="pill">time: <b>${fmt(X[0])}s to ${fmt(X[1])}s</b></span>
  `;
}

function renderPanel(panel, isLast) {
  const Y = extent(panel.lines.flatMap(l => l.points.map(pt => pt[1])));
  const sx = x => M.left + (x - X[0]) / (X[1] - X[0]) * (W - M.left - M.right);
  const sy = y => H - M.bottom - (y - Y[0]) / (Y[1] - Y[0]) * (H - M.top - M.bottom);

  let svg = `<svg width="${W}" height="${H}" viewBox="0 0 ${W} ${H}">`;
  for (let i = 0; i <= 4; i++) {
    const yv = Y[0] + (Y[1] - Y[0]) * i / 4;
    const xv = X[0] + (X[1] - X[0]) * i / 4;
    svg += `<line class="grid" x1="${M.left}" x2="${W - M.right}" y1="${sy(yv)}" y2="${sy(yv)}"/>`;
    svg += `<text x="${M.left - 6}" y="${sy(yv) + 4}" text-anchor="end">${fmt(yv)}</text>`;
    svg += `<line class="grid" x1="${sx(xv)}" x2="${sx(xv)}" y1="${M.top}" y2="${H - M.bottom}"/>`;
    if (isLast) {
      svg += `<text x="${sx(xv)}" y="${H - 10}" text-anchor="middle">${fmt(xv)}</text>`;
    }
  }
  svg += `<line class="axis" x1="${M.left}" x2="${M.left}" y1="${M.top}" y2="${H - M.bottom}"/>`;
  svg += `<line class="axis" x1="${M.left}" x2="${W - M.right}" y1="${H - M.bottom}" y2="${H - M.bottom}"/>`;
  for (const line of panel.lines) {
    const pts = line.points.map(pt => `${sx(pt[0]).toFixed(1)},${sy(pt[1]).toFixed(1)}`).join(" ");
    svg += `<polyline fill="none" stroke="${line.color}" stroke-width="1.5" stroke-opacity="0.7" points="${pts}"/>`;
  }
  svg += `</svg>`;

  const legend = panel.lines.map(l =>
    `<span><span class="swatch" style="background:${l.color}"></span>${escapeHtml(l.label)}</span>`
  ).join("");
  const unit = panel.unit ? ` (${escapeHtml(panel.unit)})` : "";
  const xlabel = isLast ? `<div class="legend">${escapeHtml(DATA.x_label)}</div>` : "";

  const el = document.createElement("div");
  el.className = "panel";
  el.innerHTML = `<h3>${escapeHtml(panel.title)}${unit}</h3><div class="legend">${legend}</div>${svg}${xlabel}`;
  document.getElementById("panels").appendChild(el);
}

renderSummary();
DATA.panels.forEach((p, i) => renderPanel(p, i === DATA.panels.length - 1));
</script>
</body>
</html>
"#;

    Ok(TEMPLATE.replace("__DATA__", &json))
}
