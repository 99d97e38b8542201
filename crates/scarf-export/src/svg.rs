//! SVG export serializer.
//!
//! Renders a spiral path as a single `<path>` element using the [`svg`]
//! crate for document construction, XML escaping, and path data
//! formatting.
//!
//! Path coordinates are in the same units as the generated points. The
//! Y axis is flipped (`y -> -y`) so the drawing keeps the mathematical
//! orientation when viewed, and the `viewBox` is the bounding box of
//! everything drawn, grown by [`MARGIN`] on every side.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Path, Title};
use svg::node::{Node, Text, Value};

use scarf_spiral::{Bounds, Point};

/// Space left around the drawing, in path units.
pub const MARGIN: f64 = 10.0;

/// Metadata and extra geometry to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped by the `svg`
/// crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    ///
    /// Typically the generation parameters, so exported files are
    /// distinguishable.
    pub description: Option<&'a str>,

    /// Serialized generation config, emitted inside `<metadata>` so the
    /// drawing can be reproduced.
    pub config_json: Option<&'a str>,

    /// A closed reference curve (usually the bounding ellipse) drawn in
    /// grey behind the path.
    pub outline: Option<&'a [Point]>,
}

/// Build an SVG path `d` attribute string from points, flipping Y.
///
/// Uses `M` for the first point and `L` for the rest; `closed` adds a
/// close command. Returns an empty string for fewer than 2 points.
///
/// Coordinates are formatted by the [`svg`] crate using `f32` precision.
///
/// # Examples
///
/// ```
/// use scarf_export::svg::build_path_data;
/// use scarf_spiral::Point;
///
/// let d = build_path_data(&[Point::new(10.0, 20.0), Point::new(30.0, -40.0)], false);
/// assert_eq!(d, "M10,-20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(points: &[Point], closed: bool) -> String {
    let [first, rest @ ..] = points else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to(flipped(*first));
    for p in rest {
        data = data.line_to(flipped(*p));
    }
    if closed {
        data = data.close();
    }
    String::from(Value::from(data))
}

/// `(x, -y)`, without producing `-0`.
fn flipped(p: Point) -> (f64, f64) {
    (p.x, 0.0 - p.y)
}

/// The `viewBox` for the drawn geometry, in flipped coordinates.
fn view_box(bounds: Bounds) -> (f64, f64, f64, f64) {
    let b = bounds.expanded(MARGIN);
    (b.min_x, 0.0 - b.max_y, b.width(), b.height())
}

/// Serialize a path into an SVG document string.
///
/// An empty `points` slice yields a valid document with no path
/// element; its `viewBox` then covers only the outline, or the margin
/// around the origin when there is none.
///
/// # Examples
///
/// ```
/// use scarf_export::svg::{SvgMetadata, to_svg};
/// use scarf_spiral::Point;
///
/// let svg = to_svg(
///     &[Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
///     &SvgMetadata::default(),
/// );
/// assert!(svg.contains(r#"viewBox="-10 -15 25 25""#));
/// ```
#[must_use]
pub fn to_svg(points: &[Point], metadata: &SvgMetadata<'_>) -> String {
    let outline = metadata.outline.unwrap_or_default();
    let bounds = match (Bounds::of(points), Bounds::of(outline)) {
        (Some(p), Some(o)) => p.union(&o),
        (Some(b), None) | (None, Some(b)) => b,
        (None, None) => Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        },
    };

    let mut doc = Document::new().set("viewBox", view_box(bounds));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("scarf:config");
        config_el.assign("xmlns:scarf", "https://scarf-paths.github.io/ns/1");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    let outline_d = build_path_data(outline, true);
    if !outline_d.is_empty() {
        doc = doc.add(
            Path::new()
                .set("id", "outline")
                .set("d", outline_d)
                .set("fill", "none")
                .set("stroke", "#999999")
                .set("stroke-width", 1)
                .set("vector-effect", "non-scaling-stroke"),
        );
    }

    let d = build_path_data(points, false);
    if !d.is_empty() {
        doc = doc.add(
            Path::new()
                .set("id", "spiral")
                .set("d", d)
                .set("fill", "none")
                .set("stroke", "black")
                .set("stroke-width", 1)
                .set("vector-effect", "non-scaling-stroke"),
        );
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
