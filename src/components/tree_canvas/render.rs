use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{CanvasState, NODE_HEIGHT, NODE_WIDTH, edge_endpoints};
use crate::tree::{GraphStore, LOADING_LABEL, NodeKind, Position, Viewport};

const ROOT_COLOR: &str = "#ff7f0e";
const NODE_COLOR: &str = "#1f77b4";
const PENDING_COLOR: &str = "#7f7f7f";
const SELECTED_COLOR: &str = "#ffd166";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(
	state: &CanvasState,
	graph: &GraphStore,
	viewport: &Viewport,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(viewport.x, viewport.y);
	let _ = ctx.scale(viewport.zoom, viewport.zoom);
	draw_edges(state, graph, viewport.zoom, ctx);
	draw_draft_edge(state, graph, viewport.zoom, ctx);
	draw_nodes(state, graph, viewport.zoom, ctx);
	ctx.restore();
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, from: Position, to: Position, arrow_size: f64) {
	let (Position { x: x1, y: y1 }, Position { x: x2, y: y2 }) = (from, to);
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);

	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(x2 - ux * arrow_size, y2 - uy * arrow_size);
	ctx.stroke();

	let _ = ctx.set_line_dash(&js_sys::Array::new());
	let (back_x, back_y) = (x2 - ux * arrow_size, y2 - uy * arrow_size);
	let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
	ctx.begin_path();
	ctx.move_to(x2, y2);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_edges(state: &CanvasState, graph: &GraphStore, k: f64, ctx: &CanvasRenderingContext2d) {
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for edge in graph.edges() {
		// Edges to nodes that are gone are not drawn
		let (Some(source), Some(target)) = (graph.node(&edge.source), graph.node(&edge.target))
		else {
			continue;
		};

		let is_highlighted = state.is_highlighted(&source.id) && state.is_highlighted(&target.id);
		let (edge_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		if state.is_selected_edge(&edge.id) {
			ctx.set_stroke_style_str(SELECTED_COLOR);
			ctx.set_fill_style_str(SELECTED_COLOR);
			ctx.set_line_width(width * 2.0);
		} else {
			ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", edge_alpha));
			ctx.set_fill_style_str(&format!("rgba(100, 180, 255, {})", edge_alpha + 0.2));
			ctx.set_line_width(width);
		}
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);
		let (from, to) = edge_endpoints(source, target);
		draw_arrow(ctx, from, to, arrow_size);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_draft_edge(
	state: &CanvasState,
	graph: &GraphStore,
	k: f64,
	ctx: &CanvasRenderingContext2d,
) {
	if !(state.drag.active && state.drag.connecting) {
		return;
	}
	let Some(source) = state.drag.node_id.as_deref().and_then(|id| graph.node(id)) else {
		return;
	};
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
	ctx.set_line_width(1.5 / k);
	let from = source.position.offset(NODE_WIDTH / 2.0, NODE_HEIGHT);
	draw_arrow(ctx, from, state.drag.pointer, 8.0 / k);
}

/// Shortens `label` with an ellipsis until it fits `max_width`.
fn fit_label(ctx: &CanvasRenderingContext2d, label: &str, max_width: f64) -> String {
	let fits = |s: &str| {
		ctx.measure_text(s)
			.map(|m| m.width() <= max_width)
			.unwrap_or(true)
	};
	if fits(label) {
		return label.to_owned();
	}
	let mut chars: Vec<char> = label.chars().collect();
	while !chars.is_empty() {
		chars.pop();
		let candidate: String = chars.iter().chain(['…'].iter()).collect();
		if fits(&candidate) {
			return candidate;
		}
	}
	String::new()
}

fn draw_nodes(state: &CanvasState, graph: &GraphStore, k: f64, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
	);
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	let root_id = graph.root().map(|n| n.id.as_str());

	for node in graph.nodes() {
		let Position { x, y } = node.position;
		let pending = node.label() == LOADING_LABEL;
		let is_root = node.kind == Some(NodeKind::Input) || root_id == Some(node.id.as_str());
		let color = if pending {
			PENDING_COLOR
		} else if is_root {
			ROOT_COLOR
		} else {
			NODE_COLOR
		};
		let alpha = if has_highlight && !state.is_highlighted(&node.id) {
			1.0 - 0.6 * t
		} else {
			1.0
		};

		ctx.set_global_alpha(alpha);
		ctx.set_fill_style_str("#24243e");
		ctx.fill_rect(x, y, NODE_WIDTH, NODE_HEIGHT);
		let selected = state.is_selected_node(&node.id);
		ctx.set_stroke_style_str(if selected { SELECTED_COLOR } else { color });
		ctx.set_line_width(if selected {
			3.0 / k.max(0.5)
		} else if state.is_hovered(&node.id) {
			(1.5 + 1.5 * t) / k.max(0.5)
		} else {
			1.5 / k.max(0.5)
		});
		ctx.stroke_rect(x, y, NODE_WIDTH, NODE_HEIGHT);

		ctx.set_fill_style_str(if pending {
			"rgba(255, 255, 255, 0.5)"
		} else {
			"rgba(255, 255, 255, 0.9)"
		});
		let text = fit_label(ctx, node.label(), NODE_WIDTH - 12.0);
		let _ = ctx.fill_text(&text, x + NODE_WIDTH / 2.0, y + NODE_HEIGHT / 2.0);
		ctx.set_global_alpha(1.0);
	}
}
