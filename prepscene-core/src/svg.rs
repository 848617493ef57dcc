/// Static vector serializer for composed drawings
use crate::compose::{compose_thumbnail, Drawing, Layer, Shape};
use crate::scene::SceneConfig;

/// Render a scene to a thumbnail SVG document.
pub fn render_thumbnail_svg(scene: &SceneConfig) -> String {
    to_svg(&compose_thumbnail(scene))
}

fn marker_id(color: &str) -> String {
    format!("arrow-{}", color.trim_start_matches('#'))
}

fn arrow_colors(drawing: &Drawing) -> Vec<&'static str> {
    let mut colors = Vec::new();
    for layer in &drawing.layers {
        let has_arrow = layer
            .shapes
            .iter()
            .any(|s| matches!(s, Shape::Polyline { arrow: true, points } if points.len() >= 2));
        if let (true, Some(color)) = (has_arrow, layer.style.stroke) {
            if !colors.contains(&color) {
                colors.push(color);
            }
        }
    }
    colors
}

/// Serialize a drawing; coordinates use two decimals so output is reproducible.
pub fn to_svg(drawing: &Drawing) -> String {
    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.2} {:.2}">"#,
        drawing.width, drawing.height, drawing.width, drawing.height
    );

    let colors = arrow_colors(drawing);
    if !colors.is_empty() {
        out.push_str("<defs>");
        for color in colors {
            out.push_str(&format!(
                r#"<marker id="{}" viewBox="0 0 10 10" refX="8" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="{}"/></marker>"#,
                marker_id(color),
                color
            ));
        }
        out.push_str("</defs>");
    }

    for layer in &drawing.layers {
        write_layer(&mut out, layer);
    }
    out.push_str("</svg>");
    out
}

fn write_layer(out: &mut String, layer: &Layer) {
    let style = &layer.style;
    out.push_str(&format!(r#"<g class="{}""#, layer.kind.name()));
    match style.stroke {
        Some(stroke) => out.push_str(&format!(
            r#" stroke="{}" stroke-width="{:.2}" stroke-opacity="{:.2}" stroke-linecap="round" stroke-linejoin="round""#,
            stroke, style.stroke_width, style.stroke_opacity
        )),
        None => out.push_str(r#" stroke="none""#),
    }
    match style.fill {
        Some(fill) => out.push_str(&format!(
            r#" fill="{}" fill-opacity="{:.2}""#,
            fill, style.fill_opacity
        )),
        None => out.push_str(r#" fill="none""#),
    }
    if let Some([dash, gap]) = style.dash {
        out.push_str(&format!(r#" stroke-dasharray="{dash:.2} {gap:.2}""#));
    }
    if style.font_size > 0.0 {
        out.push_str(&format!(
            r#" font-family="sans-serif" font-size="{:.2}" text-anchor="middle" dominant-baseline="middle""#,
            style.font_size
        ));
    }
    out.push('>');

    for shape in &layer.shapes {
        match shape {
            Shape::Line { from, to } => out.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"/>"#,
                from.x, from.y, to.x, to.y
            )),
            Shape::Polygon { points } => {
                let coords: Vec<String> = points
                    .iter()
                    .map(|p| format!("{:.2},{:.2}", p.x, p.y))
                    .collect();
                out.push_str(&format!(r#"<polygon points="{}"/>"#, coords.join(" ")));
            }
            Shape::Circle { center, radius } => out.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}"/>"#,
                center.x, center.y, radius
            )),
            Shape::Polyline { points, arrow } => {
                let Some((first, rest)) = points.split_first() else {
                    continue;
                };
                let mut d = format!("M {:.2} {:.2}", first.x, first.y);
                for p in rest {
                    d.push_str(&format!(" L {:.2} {:.2}", p.x, p.y));
                }
                match (arrow, style.stroke) {
                    (true, Some(color)) if !rest.is_empty() => out.push_str(&format!(
                        r#"<path d="{}" marker-end="url(#{})"/>"#,
                        d,
                        marker_id(color)
                    )),
                    _ => out.push_str(&format!(r#"<path d="{d}"/>"#)),
                }
            }
            Shape::Text { at, text } => out.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}">{}</text>"#,
                at.x,
                at.y,
                escape(text)
            )),
        }
    }
    out.push_str("</g>");
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Animation, AxisLabel, CubeScene, TimeAxis};
    use nalgebra::Point3;

    fn with_path() -> SceneConfig {
        SceneConfig::Cube(CubeScene {
            animation: Some(Animation::segment(
                Point3::new(0.0, 0.0, 1.4),
                Point3::new(0.0, 0.0, 0.1),
                2.0,
            )),
            ..CubeScene::default()
        })
    }

    #[test]
    fn test_static_scene_has_no_marker() {
        let svg = render_thumbnail_svg(&SceneConfig::cube());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"viewBox="0 0 120.00 120.00""#));
        assert!(!svg.contains("<defs>"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_motion_path_defines_marker_first() {
        let svg = render_thumbnail_svg(&with_path());
        let defs = svg.find("<defs>").unwrap();
        let first_group = svg.find("<g ").unwrap();
        assert!(defs < first_group);
        assert!(svg.contains("marker-end=\"url(#arrow-2563eb)\""));
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn test_ball_group_between_behind_and_in_front() {
        let svg = render_thumbnail_svg(&with_path());
        let path = svg.find(r#"class="motion-path""#).unwrap();
        let ball = svg.find(r#"class="ball""#).unwrap();
        assert!(path < ball);
        if let Some(behind) = svg.find(r#"class="front-edges-behind""#) {
            assert!(behind < path);
        }
        if let Some(front) = svg.find(r#"class="front-edges-in-front""#) {
            assert!(front > ball);
        }
    }

    #[test]
    fn test_output_is_reproducible() {
        assert_eq!(render_thumbnail_svg(&with_path()), render_thumbnail_svg(&with_path()));
    }

    #[test]
    fn test_coordinates_use_two_decimals() {
        let svg = render_thumbnail_svg(&SceneConfig::cube());
        let start = svg.find("<line x1=\"").unwrap() + "<line x1=\"".len();
        let value = &svg[start..start + svg[start..].find('"').unwrap()];
        let decimals = value.split('.').nth(1).unwrap();
        assert_eq!(decimals.len(), 2);
    }

    #[test]
    fn test_labels_are_escaped() {
        let scene = SceneConfig::TimeAxis(TimeAxis {
            labels: vec![AxisLabel {
                at: 1.0,
                text: "<now> & then".to_string(),
            }],
            ..TimeAxis::default()
        });
        let svg = render_thumbnail_svg(&scene);
        assert!(svg.contains("&lt;now&gt; &amp; then"));
    }
}
