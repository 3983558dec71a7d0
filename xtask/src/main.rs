use camino::{Utf8Path, Utf8PathBuf};
use framegeo::{
    LayoutMode, RenderOptions, SolverOptions, load_bikes, render, solve_batch, sort_by_stack,
};
use miette::{IntoDiagnostic, Result, WrapErr, bail, miette};
use rayon::prelude::*;
use std::fs;

fn usage() {
    eprintln!("Usage: cargo xtask <command> [options]");
    eprintln!("Commands:");
    eprintln!("  points <bikes.json> [--json] [--cockpit]");
    eprintln!("        Print the solved frame points of every drawable bike");
    eprintln!("  render <bikes.json> [--grid] [--cockpit] [--labels] [-o out.svg]");
    eprintln!("        Draw every drawable bike to SVG (stdout unless -o is given)");
    eprintln!("  gallery <dir>");
    eprintln!("        Render every *.bikes.json in <dir> and write <dir>/gallery.html");
}

#[derive(Debug, Default)]
struct Flags {
    positional: Vec<String>,
    json: bool,
    grid: bool,
    cockpit: bool,
    labels: bool,
    output: Option<Utf8PathBuf>,
}

impl Flags {
    fn parse(args: &[String]) -> Result<Self> {
        let mut flags = Flags::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--json" => flags.json = true,
                "--grid" => flags.grid = true,
                "--cockpit" => flags.cockpit = true,
                "--labels" => flags.labels = true,
                "-o" | "--output" => {
                    let Some(path) = iter.next() else {
                        bail!("{arg} needs a path");
                    };
                    flags.output = Some(Utf8PathBuf::from(path));
                }
                other if other.starts_with('-') => bail!("unknown option: {other}"),
                other => flags.positional.push(other.to_string()),
            }
        }
        Ok(flags)
    }

    fn input(&self) -> Result<&Utf8Path> {
        match self.positional.as_slice() {
            [path] => Ok(Utf8Path::new(path)),
            [] => Err(miette!("missing input path")),
            _ => Err(miette!("expected a single input path")),
        }
    }

    fn solver_options(&self) -> SolverOptions {
        if self.cockpit {
            SolverOptions::default().with_cockpit()
        } else {
            SolverOptions::default()
        }
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            layout: if self.grid {
                LayoutMode::Grid
            } else {
                LayoutMode::Overlay
            },
            labels: self.labels,
            ..RenderOptions::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        usage();
        std::process::exit(1);
    };
    let flags = Flags::parse(rest)?;

    match command.as_str() {
        "points" => points(&flags),
        "render" => render_file(&flags),
        "gallery" => gallery(&flags),
        other => {
            usage();
            bail!("unknown command: {other}")
        }
    }
}

fn read(path: &Utf8Path) -> Result<String> {
    fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {path}"))
}

fn points(flags: &Flags) -> Result<()> {
    let path = flags.input()?;
    let source = read(path)?;
    let mut records = load_bikes(path.as_str(), &source)?;
    sort_by_stack(&mut records);
    let batch = solve_batch(&records, &flags.solver_options());

    if flags.json {
        let mut bikes = serde_json::Map::new();
        for bike in &batch.drawable {
            bikes.insert(bike.id.clone(), serde_json::to_value(&bike.points).into_diagnostic()?);
        }
        let skipped: Vec<_> = batch
            .skipped
            .iter()
            .map(|s| serde_json::json!({ "id": s.id, "reason": s.reason.to_string() }))
            .collect();
        let doc = serde_json::json!({ "bikes": bikes, "skipped": skipped });
        println!("{}", serde_json::to_string_pretty(&doc).into_diagnostic()?);
        return Ok(());
    }

    for bike in &batch.drawable {
        println!("{} (stack {})", bike.id, bike.params.stack);
        println!("{}", bike.points);
    }
    for skipped in &batch.skipped {
        println!("skipped {}: {}", skipped.id, skipped.reason);
    }
    Ok(())
}

fn render_file(flags: &Flags) -> Result<()> {
    let path = flags.input()?;
    let source = read(path)?;
    let svg = framegeo::render_json(
        path.as_str(),
        &source,
        &flags.solver_options(),
        &flags.render_options(),
    )?;

    match &flags.output {
        Some(out) => {
            fs::write(out, svg)
                .into_diagnostic()
                .wrap_err_with(|| format!("writing {out}"))?;
            tracing::info!(%out, "wrote drawing");
        }
        None => println!("{svg}"),
    }
    Ok(())
}

/// One gallery row: both layouts of a file, or why it failed
struct GalleryEntry {
    name: String,
    bikes: usize,
    skipped: Vec<String>,
    drawings: Result<(String, String), String>,
}

fn render_gallery_entry(path: &Utf8Path) -> GalleryEntry {
    let name = path.file_name().unwrap_or(path.as_str()).to_string();
    tracing::info!(%name, "rendering");

    let loaded = read(path).and_then(|source| Ok(load_bikes(path.as_str(), &source)?));
    let mut records = match loaded {
        Ok(records) => records,
        Err(err) => {
            return GalleryEntry {
                name,
                bikes: 0,
                skipped: Vec::new(),
                drawings: Err(format!("{err}")),
            };
        }
    };
    sort_by_stack(&mut records);
    let batch = solve_batch(&records, &SolverOptions::default());

    let overlay = RenderOptions {
        labels: true,
        ..RenderOptions::default()
    };
    let grid = RenderOptions {
        layout: LayoutMode::Grid,
        labels: true,
        ..RenderOptions::default()
    };
    let drawings = render(&batch.drawable, &overlay)
        .and_then(|a| Ok((a, render(&batch.drawable, &grid)?)))
        .map_err(|err| format!("{err}"));

    GalleryEntry {
        name,
        bikes: batch.drawable.len(),
        skipped: batch
            .skipped
            .iter()
            .map(|s| format!("{}: {}", s.id, s.reason))
            .collect(),
        drawings,
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Bike documents end in `.bikes.json`; other JSON (test sidecars) is skipped.
fn is_bike_file(path: &Utf8Path) -> bool {
    path.file_name().is_some_and(|name| name.ends_with(".bikes.json"))
}

fn gallery(flags: &Flags) -> Result<()> {
    let dir = flags.input()?;
    let mut files: Vec<Utf8PathBuf> = fs::read_dir(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("listing {dir}"))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| Utf8PathBuf::from_path_buf(entry.path()).ok())
        .filter(|path| is_bike_file(path))
        .collect();
    files.sort();

    let entries: Vec<GalleryEntry> = files
        .par_iter()
        .map(|path| render_gallery_entry(path))
        .collect();

    let mut html = String::new();
    html.push_str(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Frame geometry gallery</title>
    <style>
        body {
            font-family: system-ui, sans-serif;
            margin: 0;
            padding: 24px;
            background: #eee;
            color: #333;
        }
        .entry {
            background: #fff;
            border-radius: 6px;
            margin-bottom: 24px;
            padding: 16px;
        }
        .drawings {
            display: flex;
            gap: 16px;
        }
        .skipped, .error {
            color: #a33;
            white-space: pre-wrap;
        }
    </style>
</head>
<body>
<h1>Frame geometry gallery</h1>
"#,
    );

    for entry in &entries {
        html.push_str(&format!(
            "<div class=\"entry\">\n<h2>{} <small>({} drawn)</small></h2>\n",
            escape_html(&entry.name),
            entry.bikes
        ));
        match &entry.drawings {
            Ok((overlay, grid)) => {
                html.push_str("<div class=\"drawings\">\n");
                html.push_str(overlay);
                html.push_str(grid);
                html.push_str("</div>\n");
            }
            Err(err) => {
                html.push_str(&format!("<pre class=\"error\">{}</pre>\n", escape_html(err)));
            }
        }
        if !entry.skipped.is_empty() {
            html.push_str(&format!(
                "<pre class=\"skipped\">skipped:\n{}</pre>\n",
                escape_html(&entry.skipped.join("\n"))
            ));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</body>\n</html>\n");

    let output = dir.join("gallery.html");
    fs::write(&output, html)
        .into_diagnostic()
        .wrap_err_with(|| format!("writing {output}"))?;
    tracing::info!(files = entries.len(), %output, "wrote gallery");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_only_picks_bike_documents() {
        assert!(is_bike_file(Utf8Path::new("tests/data/road.bikes.json")));
        assert!(!is_bike_file(Utf8Path::new("tests/data/road.expected.json")));
        assert!(!is_bike_file(Utf8Path::new("tests/data/notes.json")));
        assert!(!is_bike_file(Utf8Path::new("tests/data")));
    }
}
