use datatest_stable::Utf8Path;
use facet_svg::{Svg, SvgNode, facet_xml};
use framegeo::{
    Batch, BottomBracketMethod, LayoutMode, NotDrawable, RenderOptions, SolvedBike,
    SolverOptions, load_bikes, render, solve_batch, sort_by_stack,
};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Tolerance for geometric invariants, in millimetres
const TOLERANCE: f64 = 1e-6;

/// What a `<name>.bikes.json` document should produce, read from `<name>.expected.json`
#[derive(Debug, Deserialize)]
struct Expected {
    /// Ids of drawable bikes, in stack order
    drawable: Vec<String>,
    /// Skipped ids, in stack order, mapped to "missing" or "degenerate"
    skipped: serde_json::Map<String, serde_json::Value>,
}

fn expected_for(path: &Utf8Path) -> datatest_stable::Result<Expected> {
    let name = path.file_name().ok_or("no file name")?;
    let stem = name.strip_suffix(".bikes.json").ok_or("unexpected data file name")?;
    let sidecar = path.with_file_name(format!("{stem}.expected.json"));
    let text = std::fs::read_to_string(&sidecar)?;
    Ok(serde_json::from_str(&text)?)
}

// =============================================================================
// Invariants
// =============================================================================

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < TOLERANCE
}

fn check_invariants(bike: &SolvedBike) -> Result<(), String> {
    let p = &bike.points;
    let params = &bike.params;
    let mut failures = Vec::new();

    let mut expect = |ok: bool, what: &str| {
        if !ok {
            failures.push(what.to_string());
        }
    };

    expect(
        p.iter().all(|(_, pt)| pt.is_finite()),
        "every point is finite",
    );
    expect(
        close(p.rear_wheel.distance(p.front_wheel).raw(), params.wheelbase.raw()),
        "wheels are a wheelbase apart",
    );
    expect(
        close(
            p.bottom_bracket.x.raw() - p.rear_wheel.x.raw(),
            params.chainstay.raw().hypot(params.bb_drop.raw()),
        ),
        "bottom bracket run follows the chart formula",
    );
    expect(
        close(p.bottom_bracket.y.raw() - p.rear_wheel.y.raw(), params.bb_drop.raw()),
        "bottom bracket sits bb_drop below the axles",
    );
    expect(
        close(
            p.bottom_bracket.y.raw() - p.steering_axis_top.y.raw(),
            params.stack.raw(),
        ),
        "head tube top sits stack above the bottom bracket",
    );
    expect(
        close(
            p.steering_axis_top.x.raw() - p.bottom_bracket.x.raw(),
            params.reach.raw(),
        ),
        "head tube top sits reach ahead of the bottom bracket",
    );
    expect(
        close(
            p.steering_axis_top.distance(p.head_tube_bottom).raw(),
            params.head_tube.raw(),
        ),
        "head tube keeps its length",
    );
    expect(
        close(
            p.bottom_bracket.distance(p.seat_tube_top).raw(),
            params.seat_tube_length.raw(),
        ),
        "seat tube keeps its length",
    );

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{}: {}", bike.id, failures.join(", ")))
    }
}

fn skip_kind(reason: &NotDrawable) -> &'static str {
    match reason {
        NotDrawable::InvalidParameters { .. } if reason.is_missing_data() => "missing",
        NotDrawable::InvalidParameters { .. } => "invalid",
        NotDrawable::DegenerateGeometry { .. } => "degenerate",
    }
}

fn check_batch(batch: &Batch, expected: &Expected) -> Result<(), String> {
    let drawable: Vec<_> = batch.drawable.iter().map(|b| b.id.clone()).collect();
    if drawable != expected.drawable {
        return Err(format!(
            "drawable bikes: expected {:?}, got {drawable:?}",
            expected.drawable
        ));
    }

    let skipped: Vec<(String, String)> = batch
        .skipped
        .iter()
        .map(|s| (s.id.clone(), skip_kind(&s.reason).to_string()))
        .collect();
    let wanted: Vec<(String, String)> = expected
        .skipped
        .iter()
        .map(|(id, kind)| (id.clone(), kind.as_str().unwrap_or_default().to_string()))
        .collect();
    if skipped != wanted {
        return Err(format!("skipped bikes: expected {wanted:?}, got {skipped:?}"));
    }
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

/// Ids of the top-level bike groups
fn bike_group_ids(svg: &Svg) -> Vec<String> {
    svg.children
        .iter()
        .filter_map(|node| match node {
            SvgNode::G(g) if g.class.as_deref() == Some("bike") => g.id.clone(),
            _ => None,
        })
        .collect()
}

fn element_counts(svg: &Svg) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for node in svg.descendants() {
        let kind = match node {
            SvgNode::G(_) => "g",
            SvgNode::Style(_) => "style",
            SvgNode::Line(_) => "line",
            SvgNode::Circle(_) => "circle",
            SvgNode::Text(_) => "text",
        };
        *counts.entry(kind).or_insert(0) += 1;
    }
    counts
}

fn check_render(bikes: &[SolvedBike], layout: LayoutMode) -> Result<(), String> {
    let options = RenderOptions {
        layout,
        labels: true,
        ..RenderOptions::default()
    };
    let out = render(bikes, &options).map_err(|e| format!("{layout:?} render failed: {e}"))?;
    let svg: Svg = facet_xml::from_str(&out).map_err(|e| format!("XML parse error: {e}"))?;

    let groups = bike_group_ids(&svg);
    if groups.len() != bikes.len() {
        return Err(format!(
            "{layout:?}: expected {} bike groups, got {groups:?}",
            bikes.len()
        ));
    }

    // Per bike: bottom bracket + two wheels, one label
    let counts = element_counts(&svg);
    let circles = counts.get("circle").copied().unwrap_or(0);
    let texts = counts.get("text").copied().unwrap_or(0);
    if circles != 3 * bikes.len() || texts != bikes.len() {
        return Err(format!("{layout:?}: unexpected element counts {counts:?}"));
    }

    for node in svg.descendants() {
        if let SvgNode::Circle(c) = node {
            let (cx, cy, r) = (
                c.cx.unwrap_or_default(),
                c.cy.unwrap_or_default(),
                c.r.unwrap_or_default(),
            );
            let inside = cx - r >= 0.0
                && cx + r <= options.width
                && cy - r >= 0.0
                && cy + r <= options.height;
            if !inside {
                return Err(format!("{layout:?}: circle at ({cx}, {cy}) r={r} leaves the viewport"));
            }
        }
    }
    Ok(())
}

// =============================================================================
// Test Entry Point
// =============================================================================

fn test_bike_file(path: &Utf8Path) -> datatest_stable::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let source = std::fs::read_to_string(path)?;
    let expected = expected_for(path)?;

    let mut records = load_bikes(path.as_str(), &source)?;
    tracing::debug!(%path, records = records.len(), "loaded");
    sort_by_stack(&mut records);

    let batch = solve_batch(&records, &SolverOptions::default());
    check_batch(&batch, &expected)?;
    for bike in &batch.drawable {
        check_invariants(bike)?;
    }

    // With the right-triangle method the chainstay keeps its length
    let right_triangle = SolverOptions {
        bottom_bracket: BottomBracketMethod::RightTriangle,
        ..SolverOptions::default()
    };
    for bike in &solve_batch(&records, &right_triangle).drawable {
        let drawn = bike.points.rear_wheel.distance(bike.points.bottom_bracket).raw();
        if !close(drawn, bike.params.chainstay.raw()) {
            return Err(format!("{}: chainstay is not the hypotenuse", bike.id).into());
        }
    }

    // Solving again gives bit-identical points
    let again = solve_batch(&records, &SolverOptions::default());
    if again != batch {
        return Err(format!("{path}: solving is not deterministic").into());
    }

    // The cockpit extension never changes the frame itself
    let with_cockpit = solve_batch(&records, &SolverOptions::default().with_cockpit());
    for (plain, cockpit) in batch.drawable.iter().zip(&with_cockpit.drawable) {
        if plain.points.steering_axis_top != cockpit.points.steering_axis_top
            || cockpit.points.seat_post_top.is_none()
            || cockpit.points.handlebar_post_top.is_none()
        {
            return Err(format!("{}: cockpit extension disturbed the frame", plain.id).into());
        }
    }

    check_render(&batch.drawable, LayoutMode::Overlay)?;
    check_render(&batch.drawable, LayoutMode::Grid)?;
    Ok(())
}

datatest_stable::harness! {
    { test = test_bike_file, root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data"), pattern = r"\.bikes\.json$" },
}
