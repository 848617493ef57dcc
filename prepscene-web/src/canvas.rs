/// Canvas 2D painter for composed drawings
use prepscene_core::compose::{arrowhead, Drawing, Layer, Shape, Style};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Arrowhead length relative to the stroke width.
const ARROW_SCALE: f32 = 4.0;

/// Paint a drawing in CSS pixels onto a backing store `pixel_ratio` times larger.
pub(crate) fn paint(
    ctx: &CanvasRenderingContext2d,
    drawing: &Drawing,
    pixel_ratio: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, f64::from(drawing.width), f64::from(drawing.height));
    ctx.set_line_cap("round");
    ctx.set_line_join("round");
    for layer in &drawing.layers {
        paint_layer(ctx, layer)?;
    }
    ctx.set_global_alpha(1.0);
    Ok(())
}

pub(crate) fn dash_pattern(style: &Style) -> Vec<f64> {
    style
        .dash
        .map(|[dash, gap]| vec![f64::from(dash), f64::from(gap)])
        .unwrap_or_default()
}

fn set_dash(ctx: &CanvasRenderingContext2d, pattern: &[f64]) -> Result<(), JsValue> {
    let array = js_sys::Array::new();
    for value in pattern {
        array.push(&JsValue::from_f64(*value));
    }
    ctx.set_line_dash(&array)
}

fn stroke(ctx: &CanvasRenderingContext2d, style: &Style) {
    ctx.set_global_alpha(f64::from(style.stroke_opacity));
    ctx.stroke();
}

fn fill(ctx: &CanvasRenderingContext2d, style: &Style) {
    ctx.set_global_alpha(f64::from(style.fill_opacity));
    ctx.fill();
}

fn paint_layer(ctx: &CanvasRenderingContext2d, layer: &Layer) -> Result<(), JsValue> {
    let style = &layer.style;
    ctx.set_line_width(f64::from(style.stroke_width));
    set_dash(ctx, &dash_pattern(style))?;
    if let Some(color) = style.stroke {
        ctx.set_stroke_style_str(color);
    }
    if let Some(color) = style.fill.or(style.stroke) {
        ctx.set_fill_style_str(color);
    }
    if style.font_size > 0.0 {
        ctx.set_font(&format!("{:.0}px sans-serif", style.font_size));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
    }

    for shape in &layer.shapes {
        match shape {
            Shape::Line { from, to } => {
                ctx.begin_path();
                ctx.move_to(f64::from(from.x), f64::from(from.y));
                ctx.line_to(f64::from(to.x), f64::from(to.y));
                stroke(ctx, style);
            }
            Shape::Polygon { points } => {
                trace(ctx, points.iter().map(|p| (p.x, p.y)));
                ctx.close_path();
                fill(ctx, style);
            }
            Shape::Circle { center, radius } => {
                ctx.begin_path();
                ctx.arc(
                    f64::from(center.x),
                    f64::from(center.y),
                    f64::from(*radius),
                    0.0,
                    std::f64::consts::TAU,
                )?;
                fill(ctx, style);
            }
            Shape::Polyline { points, arrow } => {
                trace(ctx, points.iter().map(|p| (p.x, p.y)));
                stroke(ctx, style);
                if *arrow {
                    if let Some(head) = arrowhead(points, style.stroke_width * ARROW_SCALE) {
                        set_dash(ctx, &[])?;
                        trace(ctx, head.iter().map(|p| (p.x, p.y)));
                        ctx.close_path();
                        ctx.set_global_alpha(f64::from(style.stroke_opacity));
                        ctx.fill();
                        set_dash(ctx, &dash_pattern(style))?;
                    }
                }
            }
            Shape::Text { at, text } => {
                ctx.set_global_alpha(f64::from(style.fill_opacity));
                ctx.fill_text(text, f64::from(at.x), f64::from(at.y))?;
            }
        }
    }
    Ok(())
}

fn trace(ctx: &CanvasRenderingContext2d, points: impl Iterator<Item = (f32, f32)>) {
    ctx.begin_path();
    for (i, (x, y)) in points.enumerate() {
        if i == 0 {
            ctx.move_to(f64::from(x), f64::from(y));
        } else {
            ctx.line_to(f64::from(x), f64::from(y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prepscene_core::compose::LayerKind;

    #[test]
    fn test_dash_pattern() {
        let path = Style::for_layer(LayerKind::MotionPath, 1.0);
        assert_eq!(dash_pattern(&path), vec![4.0, 3.0]);
        let edges = Style::for_layer(LayerKind::FrontEdgesInFront, 1.0);
        assert!(dash_pattern(&edges).is_empty());
    }
}
