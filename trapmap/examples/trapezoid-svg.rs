use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use ordered_float::NotNan;
use rand::SeedableRng;
use trapmap::{Dataset, Point, Rect, Segment, TrapezoidalMap};

type Float = NotNan<f64>;

#[derive(Parser)]
struct Args {
    /// A text file with one segment per line, as `x0 y0 x1 y1`.
    input: PathBuf,
    output: PathBuf,

    /// Highlight the trapezoid containing this point, given as `x,y`.
    #[arg(long, value_parser = parse_point)]
    query: Option<(f64, f64)>,

    /// Seed for the insertion order.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// How much room to leave between the segments and the bounding box.
    #[arg(long, default_value_t = 1.0)]
    padding: f64,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s.split_once(',').ok_or("expected `x,y`")?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

fn point(x: f64, y: f64) -> anyhow::Result<Point<Float>> {
    Ok(Point::new(x.try_into()?, y.try_into()?))
}

fn read_segments(input: &str) -> anyhow::Result<Dataset<Float>> {
    let mut ret = Dataset::default();
    for (line_no, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let coords = line
            .split_whitespace()
            .map(|c| c.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("line {}", line_no + 1))?;
        let [x0, y0, x1, y1] = coords[..] else {
            bail!("line {}: expected 4 coordinates, got {}", line_no + 1, coords.len());
        };
        if x0 == x1 {
            bail!("line {}: vertical segments aren't supported", line_no + 1);
        }
        ret.add_segment(Segment::new(point(x0, y0)?, point(x1, y1)?));
    }
    Ok(ret)
}

pub fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let input = std::fs::read_to_string(&args.input)?;
    let dataset = read_segments(&input)?;
    if dataset.num_segments() == 0 {
        bail!("no segments in {}", args.input.display());
    }

    let mut points: Vec<Point<Float>> = dataset.points().cloned().collect();
    if let Some((x, y)) = args.query {
        points.push(point(x, y)?);
    }
    let bbox = Rect::around(&points, args.padding.try_into()?);

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(args.seed);
    let map = TrapezoidalMap::build(&dataset, bbox.clone(), &mut rng);
    info!(
        "{} segments, {} trapezoids, {} DAG nodes, DAG depth {}",
        dataset.num_segments(),
        map.trapezoids().len(),
        map.dag().len(),
        map.dag().depth()
    );

    let highlight = match args.query {
        Some((x, y)) => {
            let idx = map.locate_point(&point(x, y)?, &dataset);
            info!("({x}, {y}) is in {idx:?}: {:?}", map.trapezoid(idx).boundary());
            Some(idx)
        }
        None => None,
    };

    let min_x = bbox.min.x.into_inner();
    let min_y = bbox.min.y.into_inner();
    let max_x = bbox.max.x.into_inner();
    let max_y = bbox.max.y.into_inner();
    // SVG's y axis points down.
    let flip = |p: &Point<Float>| (p.x.into_inner(), max_y + min_y - p.y.into_inner());
    let stroke_width = (max_y - min_y).max(max_x - min_x) / 512.0;

    let mut document =
        svg::Document::new().set("viewBox", (min_x, min_y, max_x - min_x, max_y - min_y));

    for (idx, trap) in map.trapezoids().iter() {
        let [tl, tr, br, bl] = trap.corners();
        let data = svg::node::element::path::Data::new()
            .move_to(flip(tl))
            .line_to(flip(tr))
            .line_to(flip(br))
            .line_to(flip(bl))
            .close();
        let fill = if Some(idx) == highlight {
            "orange"
        } else {
            "none"
        };
        let path = svg::node::element::Path::new()
            .set("fill", fill)
            .set("stroke", "gray")
            .set("stroke-width", stroke_width / 2.0)
            .set("d", data);
        document = document.add(path);
    }

    for seg_idx in dataset.segment_indices() {
        let seg = dataset.get_segment(seg_idx);
        let data = svg::node::element::path::Data::new()
            .move_to(flip(&seg.start))
            .line_to(flip(&seg.end));
        let path = svg::node::element::Path::new()
            .set("stroke", "black")
            .set("stroke-width", stroke_width)
            .set("d", data);
        document = document.add(path);
    }

    if let Some((x, y)) = args.query {
        let (cx, cy) = flip(&point(x, y)?);
        let c = svg::node::element::Circle::new()
            .set("r", stroke_width * 2.0)
            .set("cx", cx)
            .set("cy", cy)
            .set("fill", "red");
        document = document.add(c);
    }

    svg::save(&args.output, &document)?;

    Ok(())
}
